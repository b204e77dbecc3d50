//! IRC case-mapping functions.
//!
//! Nicknames and room names are case-insensitive on IRC, and under the
//! `rfc1459` mapping a few punctuation characters fold too (`[` and `{` are
//! the same character). Room membership and room lookup key on the folded
//! form so `Bob`, `bob` and `BOB` are one identity.

/// Fold one character under RFC 1459 case mapping.
#[inline]
fn fold(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        _ => c.to_ascii_lowercase(),
    }
}

/// Convert a string to IRC lowercase using RFC 1459 case mapping.
///
/// In addition to ASCII lowercase conversion, this maps:
/// - `[` → `{`
/// - `]` → `}`
/// - `\` → `|`
/// - `~` → `^`
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(fold).collect()
}

/// Compare two strings using IRC case-insensitive comparison.
pub fn irc_eq(a: &str, b: &str) -> bool {
    a.len() == b.len() && a.chars().map(fold).eq(b.chars().map(fold))
}

/// A case-folded identity for a nickname or room name.
///
/// Two keys built from names that differ only by case compare equal.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NickKey(String);

impl NickKey {
    /// Build the folded key for `name`.
    pub fn new(name: &str) -> Self {
        Self(irc_to_lower(name))
    }

    /// The folded form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NickKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_lower_maps_rfc1459_punctuation() {
        assert_eq!(irc_to_lower("Nick[Away]"), "nick{away}");
        assert_eq!(irc_to_lower("a\\b~c"), "a|b^c");
        assert_eq!(irc_to_lower("#Dev"), "#dev");
    }

    #[test]
    fn test_irc_eq() {
        assert!(irc_eq("Bob", "bob"));
        assert!(irc_eq("[x]", "{X}"));
        assert!(!irc_eq("bob", "bobby"));
        assert!(!irc_eq("alice", "alicf"));
    }

    #[test]
    fn test_nick_key_identity() {
        assert_eq!(NickKey::new("Bob"), NickKey::from("bOB"));
        assert_eq!(NickKey::new("Bob").as_str(), "bob");
    }
}
