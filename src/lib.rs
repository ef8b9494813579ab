//! # slirc-client
//!
//! A resilient single-connection IRC client engine: CRLF line framing over
//! a streaming socket, message classification by IRC grammar, and a
//! connection state machine that ties reading, writing, and reconnection
//! together.
//!
//! ## Features
//!
//! - Lossless line framing that tolerates arbitrary chunk boundaries
//! - Total message classification with an `Unrecognized` fallback
//! - Sans-IO session state machine, unit-testable without a socket
//! - Fixed-interval reconnection, interruptible by kill
//! - Failure-isolated event sink fan-out
//! - Channel membership tracking with chunked NAMES accumulation
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use slirc_client::{Client, ClientConfig, EventSink, Prefix};
//!
//! struct Echo;
//!
//! impl EventSink for Echo {
//!     fn on_channel_message(
//!         &self,
//!         source: &str,
//!         channel: &str,
//!         message: &str,
//!         _mask: &Prefix,
//!     ) -> anyhow::Result<()> {
//!         tracing::info!("{channel} <{source}> {message}");
//!         Ok(())
//!     }
//! }
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::load("client.toml")?;
//! let mut client = Client::new(config);
//! client.add_sink(Arc::new(Echo));
//!
//! let handle = client.handle();
//! tokio::spawn(client.run());
//!
//! // ... later, from any task:
//! handle.privmsg("#example", "hello");
//! handle.kill();
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]

pub mod channel;
pub mod classify;
pub mod client;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod framer;
pub mod prefix;
pub mod sink;
pub mod state;
pub mod transport;

pub use self::channel::{Channel, ChannelDirectory, MemoryDirectory};
pub use self::classify::classify;
pub use self::client::{Client, ClientHandle, RetryPolicy};
pub use self::command::Command;
pub use self::config::{ClientConfig, ConfigError, Identity, ServerConfig};
pub use self::error::{ClientError, Result};
pub use self::event::Event;
pub use self::framer::LineFramer;
pub use self::prefix::Prefix;
pub use self::sink::EventSink;
pub use self::state::{Action, ConnectionState, SessionMachine, SessionConfig};
pub use self::transport::Transport;
