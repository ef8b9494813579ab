//! Integration tests for line classification through the public API.
//!
//! Exercises the fixed-priority dispatch on real-world lines, including the
//! channel/private disambiguation and the total `Unrecognized` fallback.

use slirc_client::{classify, Event};

#[test]
fn test_channel_message_extraction() {
    let event = classify(":juke!~Jukkis@kosh.hut.fi PRIVMSG #testidevi :asdfadsf :D")
        .expect("classifiable");
    match event {
        Event::ChannelMessage {
            source,
            channel,
            message,
            source_mask,
        } => {
            assert_eq!(source, "juke");
            assert_eq!(channel, "#testidevi");
            assert_eq!(message, "asdfadsf :D");
            assert_eq!(source_mask.mask(), "juke!~Jukkis@kosh.hut.fi");
        }
        other => panic!("expected ChannelMessage, got {other:?}"),
    }
}

#[test]
fn test_private_message_extraction() {
    let event = classify(":juke!~Jukkis@kosh.hut.fi PRIVMSG Bob :hello").expect("classifiable");
    match event {
        Event::PrivateMessage {
            source,
            message,
            source_mask,
        } => {
            assert_eq!(source, "juke");
            assert_eq!(message, "hello");
            assert_eq!(source_mask.mask(), "juke!~Jukkis@kosh.hut.fi");
        }
        other => panic!("expected PrivateMessage, got {other:?}"),
    }
}

#[test]
fn test_ping_payload() {
    assert_eq!(
        classify("PING :server.example.org"),
        Some(Event::Ping {
            payload: "server.example.org".to_string()
        })
    );
}

#[test]
fn test_part_extraction() {
    let event = classify(":godlRmue!~Olog@lekvam.no PART #day9tv").expect("classifiable");
    match event {
        Event::Part {
            nick,
            channel,
            source_mask,
        } => {
            assert_eq!(nick, "godlRmue");
            assert_eq!(channel, "#day9tv");
            assert_eq!(source_mask.mask(), "godlRmue!~Olog@lekvam.no");
        }
        other => panic!("expected Part, got {other:?}"),
    }
}

#[test]
fn test_quit_extraction() {
    let event = classify(":Blackrobe!~Blackrobe@c-76-118-165-126.hsd1.ma.comcast.net QUIT :Signed off")
        .expect("classifiable");
    assert!(matches!(event, Event::Quit { ref nick, .. } if nick == "Blackrobe"));
}

#[test]
fn test_member_listing_sequence() {
    let chunk1 = classify(":server 353 irckaaja = #testidevi :irckaaja @juke").unwrap();
    let chunk2 = classify(":server 353 irckaaja = #testidevi :voi_kale").unwrap();
    let end = classify(":server 366 irckaaja #testidevi :End of /NAMES list.").unwrap();

    assert_eq!(
        chunk1,
        Event::UserListChunk {
            channel: "#testidevi".into(),
            names: vec!["irckaaja".into(), "@juke".into()],
        }
    );
    assert_eq!(
        chunk2,
        Event::UserListChunk {
            channel: "#testidevi".into(),
            names: vec!["voi_kale".into()],
        }
    );
    assert_eq!(
        end,
        Event::UserListEnd {
            channel: "#testidevi".into()
        }
    );
}

#[test]
fn test_motd_end_before_other_numerics() {
    let event = classify(":irc.quakenet.org 376 irckaaja :End of /MOTD command").unwrap();
    assert!(matches!(event, Event::MotdEnd { .. }));
}

#[test]
fn test_classification_is_total() {
    // Everything that is not one of the nine known shapes yields
    // Unrecognized, never a panic and never a silent skip.
    let lines = [
        ":server 001 irckaaja :Welcome to the QuakeNet IRC Network",
        ":server NOTICE AUTH :*** Looking up your hostname",
        "ERROR :Closing Link: irckaaja (Ping timeout)",
        ":nick!user@host TOPIC #ch :new topic",
        "MODE irckaaja +i",
        "::::",
        "",
    ];
    for line in lines {
        match classify(line) {
            Some(Event::Unrecognized { raw }) => assert_eq!(raw, line),
            other => panic!("line {line:?} classified as {other:?}"),
        }
    }
}

#[test]
fn test_malformed_privmsg_is_consumed_silently() {
    // Envelope matches (full mask + verb) but the groups are missing:
    // consumed with no event, distinct from the Unrecognized fallback.
    assert_eq!(classify(":juke!~Jukkis@kosh.hut.fi PRIVMSG"), None);
}

#[test]
fn test_privmsg_target_reuse_not_alternative_matching() {
    // The channel/private split keys on the target token itself; the same
    // token is never matched twice under different rules.
    let event = classify(":a!b@c PRIVMSG #chan :msg").unwrap();
    assert!(matches!(event, Event::ChannelMessage { channel, .. } if channel == "#chan"));

    let event = classify(":a!b@c PRIVMSG chan :msg").unwrap();
    assert!(matches!(event, Event::PrivateMessage { .. }));
}
