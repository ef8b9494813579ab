//! IRC message prefix (source mask) parsing.
//!
//! Most server-relayed messages carry a `nick!user@host` prefix identifying
//! their originator. PRIVMSG, JOIN, PART, and QUIT classification all share
//! this one sub-grammar rather than each re-parsing it: nick stops at `!`,
//! user stops at `@`, host stops at the first space (already stripped by the
//! time a prefix reaches this parser).

use std::fmt;

/// Parsed identity of a message originator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prefix {
    /// Nickname, everything before the `!`.
    pub nick: String,
    /// Username (ident), between `!` and `@`.
    pub user: String,
    /// Hostname, everything after `@`.
    pub host: String,
}

impl Prefix {
    /// Parse a full `nick!user@host` mask.
    ///
    /// Returns `None` unless all three components are present; a bare server
    /// name such as `irc.example.org` is not a full mask.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let (nick, rest) = raw.split_once('!')?;
        let (user, host) = rest.split_once('@')?;
        if nick.is_empty() || host.is_empty() {
            return None;
        }
        Some(Self {
            nick: nick.to_string(),
            user: user.to_string(),
            host: host.to_string(),
        })
    }

    /// The full `nick!user@host` mask string.
    #[must_use]
    pub fn mask(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}@{}", self.nick, self.user, self.host)
    }
}
