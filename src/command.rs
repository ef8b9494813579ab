//! Outbound IRC commands.
//!
//! The subset of client-to-server commands this engine emits, with their
//! wire serialization: the verb, space-delimited arguments, a leading `:`
//! on the final free-text argument, and a CRLF terminator added by
//! [`Command::encode`]. `Display` renders the line without the terminator,
//! which is what log output wants.

use std::fmt::{self, Write as _};
use std::io::{self, Write};

/// An outbound IRC command.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Command {
    /// `NICK <nick>`
    Nick(String),
    /// `USER <username> 0 * :<realname>`
    User {
        /// Username (ident).
        username: String,
        /// Real name / GECOS.
        realname: String,
    },
    /// `PING :<payload>`
    Ping(String),
    /// `PONG :<payload>`
    Pong(String),
    /// `JOIN :<channel>`
    Join(String),
    /// `PART <channel>[ :<reason>]`
    Part(String, Option<String>),
    /// `PRIVMSG <target> :<message>`
    Privmsg {
        /// Channel or nick to address.
        target: String,
        /// Message body.
        message: String,
    },
    /// `QUIT[ :<reason>]`
    Quit(Option<String>),
}

/// Write a command with a freeform (always colon-prefixed) trailing argument.
fn write_cmd_freeform(f: &mut fmt::Formatter<'_>, cmd: &str, middle: &[&str], trailing: &str) -> fmt::Result {
    f.write_str(cmd)?;
    for arg in middle {
        f.write_char(' ')?;
        f.write_str(arg)?;
    }
    f.write_str(" :")?;
    f.write_str(trailing)
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Nick(nick) => write!(f, "NICK {nick}"),
            Command::User { username, realname } => {
                write_cmd_freeform(f, "USER", &[username.as_str(), "0", "*"], realname)
            }
            Command::Ping(payload) => write_cmd_freeform(f, "PING", &[], payload),
            Command::Pong(payload) => write_cmd_freeform(f, "PONG", &[], payload),
            Command::Join(channel) => write_cmd_freeform(f, "JOIN", &[], channel),
            Command::Part(channel, None) => write!(f, "PART {channel}"),
            Command::Part(channel, Some(reason)) => {
                write_cmd_freeform(f, "PART", &[channel.as_str()], reason)
            }
            Command::Privmsg { target, message } => {
                write_cmd_freeform(f, "PRIVMSG", &[target.as_str()], message)
            }
            Command::Quit(None) => f.write_str("QUIT"),
            Command::Quit(Some(reason)) => write_cmd_freeform(f, "QUIT", &[], reason),
        }
    }
}

impl Command {
    /// Encode the command as a wire line, CRLF included.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the write fails.
    pub fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(writer, "{self}\r\n")
    }

    /// The encoded wire line as bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("{self}\r\n").into_bytes()
    }
}
