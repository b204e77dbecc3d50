//! Integration tests for the line parser, room tracking and event mapping.
//!
//! These feed raw server lines through the same steps the receiver takes:
//! parse, update rooms, map to an event.

use slirc_client::{parse_line, Code, Event, EventKind, Payload, Response, Rooms, Verb, NO_TOPIC};

/// Run lines through parse -> observe -> map, collecting event kinds.
fn replay(rooms: &mut Rooms, lines: &[&str]) -> Vec<EventKind> {
    lines
        .iter()
        .filter_map(|line| parse_line(line).ok())
        .filter_map(|record| {
            rooms.observe(&record, "me");
            Event::from_record(record)
        })
        .map(|event| event.kind())
        .collect()
}

#[test]
fn test_welcome_is_connection_established() {
    let record = parse_line(":irc.example.net 001 nick :Welcome").expect("Failed to parse welcome");
    assert_eq!(record.code, Code::Reply(1));
    assert_eq!(record.code_name(), "RPL_WELCOME");
    assert_eq!(record.server.as_deref(), Some("irc.example.net"));
    assert_eq!(record.message, "Welcome");

    let event = Event::from_record(record).expect("welcome maps to an event");
    assert_eq!(event.kind(), EventKind::Connected);
}

#[test]
fn test_join_is_room_activity() {
    let record = parse_line("nick!user@host JOIN #dev").expect("Failed to parse join");
    assert_eq!(record.code, Code::Verb(Verb::Join));
    assert_eq!(record.code_name(), "ROOMJOIN");
    assert_eq!(record.nick.as_deref(), Some("nick"));
    assert_eq!(record.room.as_deref(), Some("#dev"));

    let event = Event::from_record(record).expect("join maps to an event");
    assert_eq!(event.kind(), EventKind::RoomActivity);
}

#[test]
fn test_garbage_produces_nothing() {
    let mut rooms = Rooms::new();
    rooms.add_members("#dev", ["alice"]);
    let before = rooms.clone();

    let kinds = replay(&mut rooms, &["garbage\n", "", ":x!y@z NOTICE me :hi"]);
    assert!(kinds.is_empty());
    assert_eq!(rooms, before);
}

#[test]
fn test_reply_table_fields() {
    let topic = parse_line(":srv 332 me #rust :Memory safety").unwrap();
    assert_eq!(topic.code, Code::from(Response::RPL_TOPIC));
    assert_eq!(topic.room.as_deref(), Some("#rust"));
    assert_eq!(topic.message, "Memory safety");

    let names = parse_line(":srv 353 me @ #rust :@ferris +crab me").unwrap();
    assert_eq!(names.room.as_deref(), Some("#rust"));
    assert_eq!(names.message, "ferris,crab,me");

    let entry = parse_line(":srv 322 me #rust 1234 :Memory safety").unwrap();
    assert_eq!(entry.payload, Payload::ListEntry { users: 1234 });

    let unknown = parse_line(":srv 730 me :target online").unwrap();
    assert_eq!(unknown.code, Code::Reply(730));
    assert_eq!(unknown.payload, Payload::None);
    assert_eq!(unknown.message, "target online");
}

#[test]
fn test_join_flow_builds_room_state() {
    let mut rooms = Rooms::new();
    let kinds = replay(
        &mut rooms,
        &[
            ":irc.example.net 001 me :Welcome",
            ":irc.example.net 375 me :- irc.example.net Message of the day -",
            ":irc.example.net 372 me :- be nice",
            ":irc.example.net 376 me :End of /MOTD command.",
            ":me!u@h JOIN #rust",
            ":irc.example.net 331 me #rust :No topic is set",
            ":irc.example.net 353 me = #rust :me @ferris",
            ":irc.example.net 366 me #rust :End of /NAMES list.",
            ":bob!b@h JOIN #rust",
            ":ferris!f@h PRIVMSG #rust :welcome bob",
            ":Ferris!f@h QUIT :Quit: bye",
        ],
    );

    assert_eq!(
        kinds,
        vec![
            EventKind::Connected,
            EventKind::Motd,
            EventKind::Motd,
            EventKind::Motd,
            EventKind::RoomActivity,
            EventKind::RoomActivity,
            EventKind::RoomActivity,
            EventKind::RoomActivity,
            EventKind::RoomActivity,
            EventKind::DirectMessage,
            EventKind::RoomActivity,
        ]
    );

    let room = rooms.get("#rust").expect("room tracked");
    assert_eq!(room.topic(), NO_TOPIC);
    let mut members: Vec<&str> = room.members().collect();
    members.sort_unstable();
    assert_eq!(members, vec!["bob", "me"]);
}

#[test]
fn test_forwarded_join_renames_room() {
    let mut rooms = Rooms::new();
    rooms.ensure("#linux");
    let kinds = replay(
        &mut rooms,
        &[
            ":srv 470 me #linux ##linux :Forwarding to another channel",
            ":me!u@h JOIN ##linux",
            ":srv 332 me ##linux :Welcome to ##linux",
        ],
    );
    assert_eq!(kinds, vec![EventKind::RoomActivity; 3]);
    assert!(rooms.get("#linux").is_none());

    let room = rooms.get("##linux").unwrap();
    assert_eq!(room.name(), "##linux");
    assert_eq!(room.topic(), "Welcome to ##linux");
    assert!(room.has_member("ME"));
}

#[test]
fn test_room_errors_and_protocol_errors() {
    let mut rooms = Rooms::new();
    let kinds = replay(
        &mut rooms,
        &[
            ":srv 477 me #secure :Cannot join channel (+r)",
            ":srv 403 me #nope :No such channel",
            ":srv 433 * me :Nickname is already in use",
            "ERROR :Closing Link: me (Excess Flood)",
        ],
    );
    assert_eq!(
        kinds,
        vec![
            EventKind::RoomError,
            EventKind::RoomError,
            EventKind::ProtocolError,
            EventKind::ProtocolError,
        ]
    );
}

#[test]
fn test_server_ping_is_heartbeat() {
    let record = parse_line("PING :irc.example.net").unwrap();
    match Event::from_record(record) {
        Some(Event::Heartbeat(slirc_client::Beat::Ping(record))) => {
            assert_eq!(record.message, "irc.example.net");
        }
        other => panic!("expected heartbeat, got {:?}", other),
    }
}
