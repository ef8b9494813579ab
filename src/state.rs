//! Sans-IO connection state machine.
//!
//! [`SessionMachine`] owns the protocol side of the connection lifecycle:
//! it consumes classified [`Event`]s and produces [`Action`]s (commands to
//! send, the one-shot connected transition, events to dispatch to
//! collaborators). It performs no I/O, no timers, and no blocking, which
//! makes every transition unit-testable without a socket. The driver in
//! [`crate::client`] owns the socket and the reconnection policy.

use crate::classify::RawLine;
use crate::command::Command;
use crate::config::ClientConfig;
use crate::event::Event;

/// Current state of the connection lifecycle.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not connected; the initial state.
    #[default]
    Disconnected,
    /// TCP connect in flight.
    Connecting,
    /// Socket open, NICK/USER sent, waiting for the end of MOTD.
    AwaitingRegistration,
    /// Registration complete; the connection is live.
    Operating,
    /// Connection lost; waiting out the backoff before reconnecting.
    Reconnecting,
    /// Killed. Terminal: no further transitions occur.
    Terminated,
}

/// Actions produced by the state machine.
///
/// The caller is responsible for carrying each one out, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Write this command to the server.
    Send(Command),
    /// The connection just became live: notify collaborators.
    Connected,
    /// Hand this event to the dispatch table (directory + sinks).
    Dispatch(Event),
}

/// Identity and join-list parameters the machine registers with.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Primary nickname.
    pub nick: String,
    /// Fallback nickname for a 433 collision.
    pub altnick: String,
    /// Username (ident).
    pub username: String,
    /// Real name / GECOS.
    pub realname: String,
    /// Server host, used as the payload of the post-registration
    /// self-check PING.
    pub server_host: String,
    /// Channels to join once live.
    pub autojoin: Vec<String>,
}

impl From<&ClientConfig> for SessionConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            nick: config.identity.nick.clone(),
            altnick: config.identity.altnick(),
            username: config.identity.username.clone(),
            realname: config.identity.realname.clone(),
            server_host: config.server.host.clone(),
            autojoin: config.autojoin.clone(),
        }
    }
}

/// The protocol-side connection state machine.
#[derive(Clone, Debug)]
pub struct SessionMachine {
    config: SessionConfig,
    state: ConnectionState,
    /// Whether the altnick fallback was already spent on this connection.
    nick_fallback_used: bool,
}

impl SessionMachine {
    /// Create a machine in `Disconnected`.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: ConnectionState::Disconnected,
            nick_fallback_used: false,
        }
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// A TCP connect attempt is starting.
    pub fn begin_connect(&mut self) {
        self.state = ConnectionState::Connecting;
    }

    /// The TCP connect attempt failed.
    pub fn connect_failed(&mut self) {
        self.state = ConnectionState::Disconnected;
    }

    /// The socket is open: begin registration. Returns the NICK and USER
    /// lines to send, in order. Resets per-connection bookkeeping so the
    /// connected transition and the altnick fallback can fire again on this
    /// physical connection.
    #[must_use]
    pub fn start(&mut self) -> Vec<Action> {
        self.state = ConnectionState::AwaitingRegistration;
        self.nick_fallback_used = false;
        vec![
            Action::Send(Command::Nick(self.config.nick.clone())),
            Action::Send(Command::User {
                username: self.config.username.clone(),
                realname: self.config.realname.clone(),
            }),
        ]
    }

    /// A read error or orderly peer close ended the live connection.
    pub fn connection_lost(&mut self) {
        self.state = ConnectionState::Reconnecting;
    }

    /// Kill requested. Terminal.
    pub fn terminate(&mut self) {
        self.state = ConnectionState::Terminated;
    }

    /// Feed one classified event; returns the actions it provokes.
    ///
    /// Only meaningful while registering or operating; in every other state
    /// no reader is running and events are ignored.
    #[must_use]
    pub fn feed(&mut self, event: Event) -> Vec<Action> {
        match self.state {
            ConnectionState::AwaitingRegistration | ConnectionState::Operating => {
                self.feed_live(event)
            }
            _ => vec![],
        }
    }

    fn feed_live(&mut self, event: Event) -> Vec<Action> {
        match event {
            Event::Ping { payload } => vec![Action::Send(Command::Pong(payload))],
            Event::MotdEnd { raw } => self.handle_motd_end(raw),
            Event::Unrecognized { ref raw } if self.nick_collision(raw) => {
                self.nick_fallback_used = true;
                vec![Action::Send(Command::Nick(self.config.altnick.clone()))]
            }
            other => vec![Action::Dispatch(other)],
        }
    }

    /// End of MOTD marks the connection usable. Fires exactly once per
    /// physical connection: a second 376 while already `Operating` is a
    /// no-op for the transition.
    fn handle_motd_end(&mut self, raw: String) -> Vec<Action> {
        if self.state == ConnectionState::Operating {
            // Transition already fired; only surface the raw line.
            return vec![Action::Dispatch(Event::MotdEnd { raw })];
        }
        self.state = ConnectionState::Operating;

        let mut actions = vec![Action::Send(Command::Ping(self.config.server_host.clone()))];
        for channel in &self.config.autojoin {
            actions.push(Action::Send(Command::Join(channel.clone())));
        }
        actions.push(Action::Connected);
        actions
    }

    /// Numeric 433 (nickname in use) during registration, before the
    /// fallback has been spent.
    fn nick_collision(&self, raw: &str) -> bool {
        if self.state != ConnectionState::AwaitingRegistration || self.nick_fallback_used {
            return false;
        }
        RawLine::parse(raw)
            .map(|line| line.prefix.is_some() && line.command == "433")
            .unwrap_or(false)
    }
}
