//! Fuzz target for server line parsing
//!
//! Feeds arbitrary text through parse, room tracking and event mapping,
//! none of which may panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_client::{parse_line, Event, Rooms};
use std::str;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = str::from_utf8(data) {
        if input.len() > slirc_client::MAX_LINE_LEN {
            return;
        }

        let mut rooms = Rooms::new();
        for line in input.split('\n') {
            if let Ok(record) = parse_line(line) {
                rooms.observe(&record, "me");
                let _ = Event::from_record(record);
            }
        }

        // Outbound lines must never carry a second line
        let single = slirc_client::transport::single_line(input);
        assert!(!single.contains(['\r', '\n']));
    }
});
