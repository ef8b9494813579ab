//! Classified inbound events.
//!
//! Every protocol line the classifier consumes produces at most one of
//! these; [`Event::Unrecognized`] is the total fallback, so no inbound line
//! is ever unhandled.

use crate::prefix::Prefix;

/// A semantically classified protocol line.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Event {
    /// `PING` from the server; must be answered with a PONG of the same
    /// payload.
    Ping {
        /// The ping token to echo back.
        payload: String,
    },
    /// PRIVMSG addressed directly to us.
    PrivateMessage {
        /// Originator's nick.
        source: String,
        /// Message body.
        message: String,
        /// Originator's full `nick!user@host` mask.
        source_mask: Prefix,
    },
    /// PRIVMSG addressed to a channel.
    ChannelMessage {
        /// Originator's nick.
        source: String,
        /// Target channel.
        channel: String,
        /// Message body.
        message: String,
        /// Originator's full `nick!user@host` mask.
        source_mask: Prefix,
    },
    /// Someone joined a channel.
    Join {
        /// Joining nick.
        nick: String,
        /// Channel joined.
        channel: String,
        /// Full mask of the joiner.
        source_mask: Prefix,
    },
    /// Someone left a channel.
    Part {
        /// Parting nick.
        nick: String,
        /// Channel left.
        channel: String,
        /// Full mask of the parter.
        source_mask: Prefix,
    },
    /// Someone disconnected from the network.
    Quit {
        /// Quitting nick.
        nick: String,
        /// Full mask of the quitter.
        source_mask: Prefix,
    },
    /// One chunk of a channel member listing (numeric 353). Large channels
    /// arrive as several chunks.
    UserListChunk {
        /// Channel being listed.
        channel: String,
        /// Nicks in this chunk, in server order.
        names: Vec<String>,
    },
    /// End of a channel member listing (numeric 366).
    UserListEnd {
        /// Channel whose listing is complete.
        channel: String,
    },
    /// End of the server MOTD (numeric 376); marks registration complete.
    MotdEnd {
        /// The raw line, surfaced for logging.
        raw: String,
    },
    /// Any line not matching a known pattern. Not an error.
    Unrecognized {
        /// The raw line.
        raw: String,
    },
}
