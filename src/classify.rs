//! Message classification.
//!
//! [`classify`] turns one framed protocol line into an [`Event`]. It parses
//! the generic IRC line shape once (`[:prefix] <command> [params]
//! [:trailing]`) and then applies the fixed-priority dispatch: end-of-MOTD,
//! PING, PRIVMSG, member listing (353/366), JOIN, PART, QUIT, and finally
//! the [`Event::Unrecognized`] fallback. The prefix-bearing kinds all reuse
//! the [`Prefix`] sub-parser instead of carrying their own grammar.

use nom::{
    bytes::complete::take_while1,
    character::complete::char,
    combinator::opt,
    sequence::preceded,
    IResult,
};

use crate::event::Event;
use crate::prefix::Prefix;

/// Visibility markers preceding the channel token in a 353 reply.
const NAMES_VISIBILITY: [&str; 3] = ["=", "@", "*"];

/// A protocol line split into its generic components.
///
/// Borrowed slices into the input line; the semantic interpretation happens
/// in [`classify`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawLine<'a> {
    pub prefix: Option<&'a str>,
    pub command: &'a str,
    pub params: Vec<&'a str>,
}

fn parse_prefix(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_while1(|c| c != ' '))(input)
}

fn parse_command(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric())(input)
}

impl<'a> RawLine<'a> {
    /// Parse the generic line shape. Returns `None` for lines that do not
    /// even have a command token; those fall through to `Unrecognized`.
    pub(crate) fn parse(input: &'a str) -> Option<Self> {
        let (input, prefix) = opt(parse_prefix)(input).ok()?;
        let input = input.strip_prefix(' ').unwrap_or(input);
        let (input, command) = parse_command(input).ok()?;

        let mut params = Vec::new();
        let mut rest = input;
        while let Some(stripped) = rest.strip_prefix(' ') {
            if let Some(trailing) = stripped.strip_prefix(':') {
                // Trailing parameter: everything to end of line.
                params.push(trailing);
                break;
            }
            let end = stripped.find(' ').unwrap_or(stripped.len());
            if end == 0 {
                rest = stripped;
                continue;
            }
            params.push(&stripped[..end]);
            rest = &stripped[end..];
        }

        Some(Self {
            prefix,
            command,
            params,
        })
    }

    fn arg(&self, index: usize) -> Option<&'a str> {
        self.params.get(index).copied()
    }

    /// The originator's full mask, if the prefix has the `nick!user@host`
    /// form. Server prefixes yield `None`.
    fn source_mask(&self) -> Option<Prefix> {
        self.prefix.and_then(Prefix::parse)
    }
}

/// A channel token starts with `#` or `!`.
pub(crate) fn is_channel(target: &str) -> bool {
    target.starts_with('#') || target.starts_with('!')
}

/// Classify one protocol line.
///
/// Classification is total in the sense that every line yields a result:
/// `Some(Event::Unrecognized { .. })` when nothing else matches. The single
/// `None` case is a line that matches the PRIVMSG envelope (full-mask prefix
/// plus the verb) but lacks its target or body; such a line is consumed
/// with no event rather than surfaced as unrecognized.
#[must_use]
pub fn classify(line: &str) -> Option<Event> {
    let unrecognized = || {
        Some(Event::Unrecognized {
            raw: line.to_string(),
        })
    };

    // PING is the one kind the server sends without a prefix; the payload
    // is everything after the first " :", or the line's remainder when the
    // separator is absent.
    if let Some(rest) = line.strip_prefix("PING") {
        let payload = match line.split_once(" :") {
            Some((_, payload)) => payload,
            None => rest.strip_prefix(' ').unwrap_or(rest),
        };
        return Some(Event::Ping {
            payload: payload.to_string(),
        });
    }

    let Some(raw) = RawLine::parse(line) else {
        return unrecognized();
    };

    match raw.command {
        "376" if raw.prefix.is_some() => Some(Event::MotdEnd {
            raw: line.to_string(),
        }),
        "PRIVMSG" => match raw.source_mask() {
            Some(mask) => classify_privmsg(&raw, mask),
            None => unrecognized(),
        },
        "353" if raw.prefix.is_some() => classify_names_chunk(&raw).or_else(unrecognized),
        "366" if raw.prefix.is_some() => classify_names_end(&raw).or_else(unrecognized),
        "JOIN" => match (raw.source_mask(), raw.arg(0)) {
            (Some(mask), Some(channel)) if is_channel(channel) => Some(Event::Join {
                nick: mask.nick.clone(),
                channel: channel.to_string(),
                source_mask: mask,
            }),
            _ => unrecognized(),
        },
        "PART" => match (raw.source_mask(), raw.arg(0)) {
            (Some(mask), Some(channel)) if is_channel(channel) => Some(Event::Part {
                nick: mask.nick.clone(),
                channel: channel.to_string(),
                source_mask: mask,
            }),
            _ => unrecognized(),
        },
        "QUIT" => match raw.source_mask() {
            Some(mask) => Some(Event::Quit {
                nick: mask.nick.clone(),
                source_mask: mask,
            }),
            None => unrecognized(),
        },
        _ => unrecognized(),
    }
}

/// PRIVMSG envelope matched; decide channel versus private by the target
/// token. Missing target or body is the tolerated malformed case: the line
/// is consumed with no event.
fn classify_privmsg(raw: &RawLine<'_>, mask: Prefix) -> Option<Event> {
    let (target, message) = match (raw.arg(0), raw.arg(1)) {
        (Some(target), Some(message)) => (target, message),
        _ => return None,
    };

    if is_channel(target) {
        Some(Event::ChannelMessage {
            source: mask.nick.clone(),
            channel: target.to_string(),
            message: message.to_string(),
            source_mask: mask,
        })
    } else {
        Some(Event::PrivateMessage {
            source: mask.nick.clone(),
            message: message.to_string(),
            source_mask: mask,
        })
    }
}

/// Numeric 353: `:<server> 353 <target> <=|@|*> <channel> :<names>`.
/// The channel is the first token after the visibility marker; the names
/// are the whitespace-split trailing payload.
fn classify_names_chunk(raw: &RawLine<'_>) -> Option<Event> {
    let marker = raw
        .params
        .iter()
        .position(|p| NAMES_VISIBILITY.contains(p))?;
    let channel = raw.arg(marker + 1).filter(|c| is_channel(c))?;
    let names = raw
        .params
        .last()?
        .split_whitespace()
        .map(str::to_string)
        .collect();
    Some(Event::UserListChunk {
        channel: channel.to_string(),
        names,
    })
}

/// Numeric 366: `:<server> 366 <target> <channel> :<text>`.
fn classify_names_end(raw: &RawLine<'_>) -> Option<Event> {
    let channel = raw.params.iter().find(|p| is_channel(p))?;
    Some(Event::UserListEnd {
        channel: channel.to_string(),
    })
}
