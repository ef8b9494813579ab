//! Connection driver and reconnection supervisor.
//!
//! [`Client::run`] owns one connection at a time: it connects, performs the
//! NICK/USER registration, then drives a single reader loop that frames and
//! classifies every inbound line, feeds the [`SessionMachine`], and carries
//! out the actions it produces. Connection loss of any kind drops back into
//! a fixed-interval retry; only an explicit kill through the
//! [`ClientHandle`] terminates the client.
//!
//! All outbound writes are funneled through the reader loop's `select!` via
//! a command channel, so collaborators on other tasks can issue commands
//! without racing on the socket.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::channel::{ChannelDirectory, MemoryDirectory};
use crate::classify::classify;
use crate::command::Command;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::event::Event;
use crate::sink::{notify_sinks, EventSink};
use crate::state::{Action, ConnectionState, SessionMachine};
use crate::transport::Transport;

/// Fixed waits between reconnection attempts.
///
/// Not exponential: a short fixed wait after a failed connect and a longer
/// one after losing a live connection.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Wait after a socket-level connect failure.
    pub connect_wait: Duration,
    /// Wait after losing an established connection.
    pub reconnect_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            connect_wait: Duration::from_secs(30),
            reconnect_wait: Duration::from_secs(60),
        }
    }
}

/// How one connection's reader loop ended.
enum LoopExit {
    /// Kill requested; stop for good.
    Killed,
    /// Read/write error or orderly peer close; reconnect after backoff.
    ConnectionLost,
}

/// Handle for controlling a running [`Client`] from other tasks.
///
/// Cheap to clone. Commands sent through a handle are serialized onto the
/// socket by the reader loop.
#[derive(Clone)]
pub struct ClientHandle {
    commands: mpsc::UnboundedSender<Command>,
    shutdown: Arc<watch::Sender<bool>>,
    state: Arc<Mutex<ConnectionState>>,
}

impl ClientHandle {
    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state.lock().clone()
    }

    /// Whether the connection is live (registered and operating).
    #[must_use]
    pub fn is_operating(&self) -> bool {
        self.state() == ConnectionState::Operating
    }

    /// Queue a raw command for the reader loop to write.
    ///
    /// Returns `false` if the client has already terminated.
    pub fn send(&self, command: Command) -> bool {
        self.commands.send(command).is_ok()
    }

    /// Join a channel.
    pub fn join(&self, channel: &str) -> bool {
        self.send(Command::Join(channel.to_string()))
    }

    /// Part from a channel, with an optional reason.
    pub fn part(&self, channel: &str, reason: Option<&str>) -> bool {
        self.send(Command::Part(
            channel.to_string(),
            reason.map(str::to_string),
        ))
    }

    /// Send a PRIVMSG to a channel or nick.
    pub fn privmsg(&self, target: &str, message: &str) -> bool {
        self.send(Command::Privmsg {
            target: target.to_string(),
            message: message.to_string(),
        })
    }

    /// Request termination. The reader loop (or a backoff wait) observes
    /// the flag within its next wakeup; collaborators receive
    /// `on_terminate` before [`Client::run`] returns.
    pub fn kill(&self) {
        let _ = self.shutdown.send(true);
    }
}

/// A single-connection IRC client engine.
pub struct Client {
    config: ClientConfig,
    session: SessionMachine,
    directory: Arc<dyn ChannelDirectory>,
    sinks: Vec<Arc<dyn EventSink>>,
    retry: RetryPolicy,
    state: Arc<Mutex<ConnectionState>>,
    shutdown_tx: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
    commands_tx: mpsc::UnboundedSender<Command>,
    commands_rx: mpsc::UnboundedReceiver<Command>,
}

impl Client {
    /// Create a client with the bundled in-memory channel directory.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self::with_directory(config, MemoryDirectory::new())
    }

    /// Create a client with a caller-supplied channel directory.
    #[must_use]
    pub fn with_directory(config: ClientConfig, directory: Arc<dyn ChannelDirectory>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let session = SessionMachine::new((&config).into());
        Self {
            config,
            session,
            directory,
            sinks: Vec::new(),
            retry: RetryPolicy::default(),
            state: Arc::new(Mutex::new(ConnectionState::Disconnected)),
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown_rx,
            commands_tx,
            commands_rx,
        }
    }

    /// Override the reconnection waits. Mostly a test seam; the defaults
    /// are the production policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Register an event sink. Sinks are notified in registration order.
    pub fn add_sink(&mut self, sink: Arc<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// A control handle usable from any task.
    #[must_use]
    pub fn handle(&self) -> ClientHandle {
        ClientHandle {
            commands: self.commands_tx.clone(),
            shutdown: self.shutdown_tx.clone(),
            state: self.state.clone(),
        }
    }

    /// The shared channel directory.
    #[must_use]
    pub fn directory(&self) -> Arc<dyn ChannelDirectory> {
        self.directory.clone()
    }

    /// Run until killed: connect, operate, reconnect on failure.
    ///
    /// Connect failures retry after [`RetryPolicy::connect_wait`]; losing a
    /// live connection retries after [`RetryPolicy::reconnect_wait`]. Both
    /// waits are interrupted immediately by [`ClientHandle::kill`]. On
    /// return the state is `Terminated` and every sink has received
    /// `on_terminate`.
    pub async fn run(mut self) {
        let addr = self.config.address();

        while !*self.shutdown_rx.borrow() {
            self.session.begin_connect();
            self.sync_state();

            match Transport::connect(&addr).await {
                Err(err) => {
                    self.session.connect_failed();
                    self.sync_state();
                    warn!(%addr, error = %err, "connect failed");
                    if !self.wait_for_retry(self.retry.connect_wait).await {
                        break;
                    }
                }
                Ok(mut transport) => {
                    info!(%addr, "connected, registering");
                    match self.run_connection(&mut transport).await {
                        LoopExit::Killed => break,
                        LoopExit::ConnectionLost => {
                            self.session.connection_lost();
                            self.sync_state();
                            if !self.wait_for_retry(self.retry.reconnect_wait).await {
                                break;
                            }
                        }
                    }
                }
            }
        }

        self.session.terminate();
        self.sync_state();
        info!("client terminated");
        notify_sinks(&self.sinks, "terminate", |s| s.on_terminate());
    }

    /// Register and drive one physical connection to its end.
    async fn run_connection(&mut self, transport: &mut Transport) -> LoopExit {
        // Registration writes happen before the read loop starts.
        let registration = self.session.start();
        self.sync_state();
        if self.apply_actions(transport, registration).await.is_err() {
            return LoopExit::ConnectionLost;
        }

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    return LoopExit::Killed;
                }

                Some(command) = self.commands_rx.recv() => {
                    if let Err(err) = transport.send(&command).await {
                        warn!(error = %err, "write failed");
                        return LoopExit::ConnectionLost;
                    }
                }

                read = transport.read_lines() => match read {
                    Ok(Some(lines)) => {
                        for line in lines {
                            if self.handle_line(transport, &line).await.is_err() {
                                return LoopExit::ConnectionLost;
                            }
                        }
                    }
                    Ok(None) => {
                        info!("connection closed by peer");
                        return LoopExit::ConnectionLost;
                    }
                    Err(err) => {
                        warn!(error = %err, "read failed");
                        return LoopExit::ConnectionLost;
                    }
                },
            }
        }
    }

    /// Classify one framed line and carry out the resulting actions.
    async fn handle_line(&mut self, transport: &mut Transport, line: &str) -> Result<()> {
        let Some(event) = classify(line) else {
            // Tolerated malformed line: dropped, never an error.
            debug!(line = %line, "malformed line dropped");
            return Ok(());
        };
        let actions = self.session.feed(event);
        self.apply_actions(transport, actions).await
    }

    async fn apply_actions(&mut self, transport: &mut Transport, actions: Vec<Action>) -> Result<()> {
        for action in actions {
            match action {
                Action::Send(command) => transport.send(&command).await?,
                Action::Connected => {
                    self.sync_state();
                    info!("registration complete, connection live");
                    notify_sinks(&self.sinks, "connected", |s| s.on_connected());
                }
                Action::Dispatch(event) => self.dispatch(event),
            }
        }
        Ok(())
    }

    /// The `Operating` dispatch table: membership-directory updates first,
    /// then the sink fan-out.
    fn dispatch(&self, event: Event) {
        match event {
            Event::PrivateMessage {
                source,
                message,
                source_mask,
            } => {
                notify_sinks(&self.sinks, "private_message", |s| {
                    s.on_private_message(&source, &message, &source_mask)
                });
            }
            Event::ChannelMessage {
                source,
                channel,
                message,
                source_mask,
            } => {
                notify_sinks(&self.sinks, "channel_message", |s| {
                    s.on_channel_message(&source, &channel, &message, &source_mask)
                });
            }
            Event::Join {
                nick,
                channel,
                source_mask,
            } => {
                self.directory.with_channel(&channel, &mut |c| c.add_user(&nick));
                notify_sinks(&self.sinks, "join", |s| s.on_join(&nick, &channel, &source_mask));
            }
            Event::Part {
                nick,
                channel,
                source_mask,
            } => {
                // A PART for a channel we never tracked is dropped whole.
                if !self
                    .directory
                    .with_channel(&channel, &mut |c| c.remove_user(&nick))
                {
                    return;
                }
                notify_sinks(&self.sinks, "part", |s| s.on_part(&nick, &channel, &source_mask));
            }
            Event::Quit { nick, source_mask } => {
                self.directory
                    .for_each_channel(&mut |_, c| c.remove_user(&nick));
                notify_sinks(&self.sinks, "quit", |s| s.on_quit(&nick, &source_mask));
            }
            Event::UserListChunk { channel, names } => {
                // Every chunk goes through the pending list so the swap at
                // the end marker sees the whole listing. A first sight also
                // seeds the visible membership, so the channel is usable
                // even before the end marker arrives.
                let appended = self
                    .directory
                    .with_channel(&channel, &mut |c| c.append_users(names.clone()));
                if !appended {
                    self.directory.add_channel(&channel, names.clone());
                    self.directory
                        .with_channel(&channel, &mut |c| c.append_users(names.clone()));
                }
            }
            Event::UserListEnd { channel } => {
                if !self
                    .directory
                    .with_channel(&channel, &mut |c| c.end_user_list_update())
                {
                    warn!(channel = %channel, "user list ended for unknown channel");
                }
            }
            Event::MotdEnd { raw } => {
                // Repeat 376 while operating: no transition, just surfaced.
                debug!(raw = %raw, "end of MOTD");
            }
            Event::Ping { .. } => {
                // Answered by the session machine; never dispatched.
            }
            Event::Unrecognized { raw } => {
                debug!(raw = %raw, "unrecognized line");
            }
        }
    }

    /// Wait out a backoff interval unless a kill arrives first.
    /// Returns `false` when the client should stop retrying.
    async fn wait_for_retry(&mut self, wait: Duration) -> bool {
        info!(?wait, "retrying after backoff");
        tokio::select! {
            biased;
            _ = self.shutdown_rx.changed() => false,
            () = tokio::time::sleep(wait) => true,
        }
    }

    fn sync_state(&self) {
        *self.state.lock() = self.session.state().clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(addr: &str) -> ClientConfig {
        let (host, port) = addr.rsplit_once(':').unwrap();
        toml::from_str(&format!(
            r#"
                [server]
                host = "{host}"
                port = {port}

                [identity]
                nick = "irckaaja"
                username = "irckaaja"
                realname = "Irk Kaaja"
            "#
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn test_kill_before_run_terminates_immediately() {
        let client = Client::new(test_config("127.0.0.1:1"));
        let handle = client.handle();
        handle.kill();

        client.run().await;
        assert_eq!(handle.state(), ConnectionState::Terminated);
    }

    #[tokio::test]
    async fn test_kill_interrupts_connect_backoff() {
        // Port 1 refuses quickly; the client lands in its 30s connect
        // backoff, where a kill must not wait the interval out.
        let client = Client::new(test_config("127.0.0.1:1"));
        let handle = client.handle();

        let run = tokio::spawn(client.run());
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.kill();

        tokio::time::timeout(Duration::from_secs(2), run)
            .await
            .expect("kill must interrupt the backoff")
            .unwrap();
        assert_eq!(handle.state(), ConnectionState::Terminated);
    }

    #[tokio::test]
    async fn test_handle_send_after_termination_fails() {
        let client = Client::new(test_config("127.0.0.1:1"));
        let handle = client.handle();
        handle.kill();
        client.run().await;

        assert!(!handle.privmsg("#ch", "too late"));
    }
}
