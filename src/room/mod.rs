//! Room state tracker.
//!
//! Keeps name, topic and member set for every joined room. It is mutated
//! only by [`Rooms::observe`] with records read from the server and by the
//! facade's own join/part calls, both of which run on the receiver's
//! sequence, so it needs no locking.
//!
//! Room names and nicks are compared with RFC 1459 case folding.

use std::collections::{BTreeMap, HashMap};

use crate::casemap::{irc_eq, NickKey};
use crate::record::{Code, Payload, Record, Verb};
use crate::response::Response;

/// Rendered by [`Room::topic`] when no topic is known.
pub const NO_TOPIC: &str = "No Topic was set";

/// One joined room.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Room {
    name: String,
    topic: Option<String>,
    members: BTreeMap<NickKey, String>,
}

impl Room {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            topic: None,
            members: BTreeMap::new(),
        }
    }

    /// Authoritative room name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Topic text, or [`NO_TOPIC`].
    pub fn topic(&self) -> &str {
        self.topic.as_deref().unwrap_or(NO_TOPIC)
    }

    /// Topic text if one is set.
    pub fn topic_text(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    /// Member nicks, in case-folded order, as first seen.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.values().map(String::as_str)
    }

    /// Number of members.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Case-insensitive membership test.
    pub fn has_member(&self, nick: &str) -> bool {
        self.members.contains_key(&NickKey::new(nick))
    }

    fn add_member(&mut self, nick: &str) {
        self.members
            .entry(NickKey::new(nick))
            .or_insert_with(|| nick.to_string());
    }

    fn remove_member(&mut self, nick: &str) -> bool {
        self.members.remove(&NickKey::new(nick)).is_some()
    }
}

/// Every tracked room, keyed by case-folded name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rooms {
    rooms: HashMap<NickKey, Room>,
}

impl Rooms {
    /// An empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the room called `name`, creating an empty one if needed.
    ///
    /// Calling this on an existing room leaves its topic and members alone.
    pub fn ensure(&mut self, name: &str) -> &mut Room {
        self.rooms
            .entry(NickKey::new(name))
            .or_insert_with(|| Room::new(name))
    }

    /// Look a room up by name.
    pub fn get(&self, name: &str) -> Option<&Room> {
        self.rooms.get(&NickKey::new(name))
    }

    /// Whether `name` is tracked.
    pub fn contains(&self, name: &str) -> bool {
        self.rooms.contains_key(&NickKey::new(name))
    }

    /// Move `old` to `new`, keeping its topic and members.
    ///
    /// Returns false and changes nothing if `old` is not tracked. If `new`
    /// is already tracked the two are merged: members are unioned and the
    /// existing topic of `new` wins.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        let Some(mut room) = self.rooms.remove(&NickKey::new(old)) else {
            return false;
        };
        room.name = new.to_string();
        if let Some(existing) = self.rooms.remove(&NickKey::new(new)) {
            if existing.topic.is_some() {
                room.topic = existing.topic;
            }
            room.members.extend(existing.members);
        }
        self.rooms.insert(NickKey::new(new), room);
        true
    }

    /// Set or clear the topic of `name`, creating the room if needed.
    pub fn set_topic(&mut self, name: &str, topic: Option<String>) {
        self.ensure(name).topic = topic;
    }

    /// Case-insensitive de-duplicating union of `nicks` into `name`.
    pub fn add_members<I, S>(&mut self, name: &str, nicks: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let room = self.ensure(name);
        for nick in nicks {
            room.add_member(nick.as_ref());
        }
    }

    /// Remove `nick` from `name`. Unknown rooms are ignored.
    pub fn remove_member(&mut self, name: &str, nick: &str) -> bool {
        self.rooms
            .get_mut(&NickKey::new(name))
            .map(|room| room.remove_member(nick))
            .unwrap_or(false)
    }

    /// Remove `nick` from every room; returns how many rooms it left.
    pub fn remove_member_everywhere(&mut self, nick: &str) -> usize {
        self.rooms
            .values_mut()
            .filter_map(|room| room.remove_member(nick).then_some(()))
            .count()
    }

    /// Stop tracking `name`.
    pub fn remove(&mut self, name: &str) -> Option<Room> {
        self.rooms.remove(&NickKey::new(name))
    }

    /// All tracked rooms, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Number of tracked rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// True when no room is tracked.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Apply the room-state effect of one record. `me` is the session's
    /// own nick, used to tell our own PART from someone else's.
    pub fn observe(&mut self, record: &Record, me: &str) {
        let Some(room) = record.room.as_deref() else {
            if let (Code::Verb(Verb::Quit), Some(nick)) = (record.code, record.nick.as_deref()) {
                self.remove_member_everywhere(nick);
            }
            return;
        };
        let nick = record.nick.as_deref();

        match record.code {
            Code::Verb(Verb::Join) => {
                self.ensure(room);
                if let Some(nick) = nick {
                    self.add_members(room, [nick]);
                }
            }
            Code::Verb(Verb::Part) => match nick {
                Some(nick) if irc_eq(nick, me) => {
                    self.remove(room);
                }
                Some(nick) => {
                    self.remove_member(room, nick);
                }
                None => {}
            },
            Code::Reply(_) => match record.code.response() {
                Some(Response::RPL_TOPIC) => self.set_topic(room, Some(record.message.clone())),
                Some(Response::RPL_NOTOPIC) => self.set_topic(room, None),
                Some(Response::RPL_NAMREPLY) => self.add_members(room, record.members()),
                Some(Response::ERR_LINKCHANNEL) => {
                    if let Payload::Forward { to } = &record.payload {
                        self.rename(room, to);
                    }
                }
                Some(resp) if resp.is_error() => self.drop_if_pending(room),
                _ => {}
            },
            _ => {}
        }
    }

    /// A join that failed leaves the locally created room without members.
    fn drop_if_pending(&mut self, name: &str) {
        let key = NickKey::new(name);
        if self.rooms.get(&key).is_some_and(|room| room.members.is_empty()) {
            self.rooms.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_line;

    fn observe(rooms: &mut Rooms, line: &str) {
        let record = parse_line(line).expect("line should parse");
        rooms.observe(&record, "me");
    }

    #[test]
    fn test_members_are_case_insensitive() {
        let mut rooms = Rooms::new();
        rooms.add_members("#dev", ["Bob", "bob", "BOB"]);
        let room = rooms.get("#DEV").unwrap();
        assert_eq!(room.member_count(), 1);
        assert_eq!(room.members().collect::<Vec<_>>(), vec!["Bob"]);
        assert!(room.has_member("bOb"));
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let mut rooms = Rooms::new();
        rooms.set_topic("#dev", Some("hacking".into()));
        rooms.add_members("#dev", ["alice"]);

        rooms.ensure("#dev");
        let room = rooms.ensure("#Dev");
        assert_eq!(room.topic(), "hacking");
        assert_eq!(room.member_count(), 1);
        assert_eq!(room.name(), "#dev");
    }

    #[test]
    fn test_topic_sentinel() {
        let mut rooms = Rooms::new();
        assert_eq!(NO_TOPIC, "No Topic was set");
        assert_eq!(rooms.ensure("#dev").topic(), NO_TOPIC);
        rooms.set_topic("#dev", Some("t".into()));
        assert_eq!(rooms.get("#dev").unwrap().topic_text(), Some("t"));
        rooms.set_topic("#dev", None);
        assert_eq!(rooms.get("#dev").unwrap().topic(), NO_TOPIC);
    }

    #[test]
    fn test_rename_preserves_state() {
        let mut rooms = Rooms::new();
        rooms.set_topic("#linux", Some("kernels".into()));
        rooms.add_members("#linux", ["alice"]);

        assert!(rooms.rename("#linux", "##linux"));
        assert!(!rooms.contains("#linux"));
        let room = rooms.get("##linux").unwrap();
        assert_eq!(room.name(), "##linux");
        assert_eq!(room.topic(), "kernels");
        assert!(room.has_member("alice"));
    }

    #[test]
    fn test_rename_unknown_is_noop() {
        let mut rooms = Rooms::new();
        rooms.ensure("#a");
        assert!(!rooms.rename("#missing", "#b"));
        assert_eq!(rooms.len(), 1);
        assert!(rooms.contains("#a"));
    }

    #[test]
    fn test_rename_merges_into_existing() {
        let mut rooms = Rooms::new();
        rooms.add_members("#old", ["alice"]);
        rooms.add_members("#new", ["bob"]);
        rooms.set_topic("#new", Some("kept".into()));

        assert!(rooms.rename("#old", "#new"));
        let room = rooms.get("#new").unwrap();
        assert_eq!(room.member_count(), 2);
        assert_eq!(room.topic(), "kept");
        assert_eq!(rooms.len(), 1);
    }

    #[test]
    fn test_remove_member_and_room() {
        let mut rooms = Rooms::new();
        rooms.add_members("#dev", ["alice", "bob"]);
        assert!(rooms.remove_member("#dev", "ALICE"));
        assert!(!rooms.remove_member("#dev", "alice"));
        assert!(!rooms.remove_member("#nowhere", "bob"));
        assert!(rooms.remove("#dev").is_some());
        assert!(rooms.is_empty());
    }

    #[test]
    fn test_observe_join_names_topic() {
        let mut rooms = Rooms::new();
        observe(&mut rooms, ":srv 353 me = #dev :@alice +bob me");
        observe(&mut rooms, ":srv 332 me #dev :Rust talk");
        observe(&mut rooms, ":carol!c@h JOIN #dev");
        observe(&mut rooms, ":Carol!c@h JOIN #dev");

        let room = rooms.get("#dev").unwrap();
        assert_eq!(room.topic(), "Rust talk");
        assert_eq!(room.member_count(), 4);
        assert!(room.has_member("carol"));
    }

    #[test]
    fn test_observe_part_and_quit() {
        let mut rooms = Rooms::new();
        rooms.add_members("#a", ["me", "bob"]);
        rooms.add_members("#b", ["me", "bob"]);

        observe(&mut rooms, ":bob!b@h QUIT :bye");
        assert!(!rooms.get("#a").unwrap().has_member("bob"));
        assert!(!rooms.get("#b").unwrap().has_member("bob"));

        observe(&mut rooms, ":ME!m@h PART #a :leaving");
        assert!(!rooms.contains("#a"));
        assert!(rooms.contains("#b"));
    }

    #[test]
    fn test_observe_forward_matches_old_name() {
        let mut rooms = Rooms::new();
        rooms.ensure("#linux");
        observe(&mut rooms, ":srv 470 me #other ##other :Forwarding");
        assert!(rooms.contains("#linux"));
        assert!(!rooms.contains("##other"));

        observe(&mut rooms, ":srv 470 me #linux ##linux :Forwarding");
        assert!(!rooms.contains("#linux"));
        assert!(rooms.contains("##linux"));
    }

    #[test]
    fn test_observe_join_error_drops_pending_room() {
        let mut rooms = Rooms::new();
        rooms.ensure("#secret");
        rooms.add_members("#busy", ["me"]);
        observe(&mut rooms, ":srv 473 me #secret :Cannot join channel (+i)");
        observe(&mut rooms, ":srv 471 me #busy :Cannot join channel (+l)");
        assert!(!rooms.contains("#secret"));
        assert!(rooms.contains("#busy"));
    }
}
