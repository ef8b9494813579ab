//! Error types for the client engine.
//!
//! Only connection-level failures are errors here. Malformed protocol lines
//! are tolerated and dropped by the classifier, and unrecognized lines are
//! surfaced as [`Event::Unrecognized`](crate::event::Event::Unrecognized);
//! neither ever reaches this module.

use thiserror::Error;

/// Convenience type alias for Results using [`ClientError`].
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Connection-level client errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Socket-level error while establishing the TCP connection.
    ///
    /// Recovered by the reconnection supervisor's retry loop, never fatal.
    #[error("connect failed: {0}")]
    Connect(#[source] std::io::Error),

    /// Read or write error on an established connection.
    ///
    /// Recovered by transitioning to `Reconnecting`. An orderly peer close
    /// is not an error; reads report it as end-of-stream.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = ClientError::Connect(io);
        assert_eq!(format!("{}", err), "connect failed: refused");
    }

    #[test]
    fn test_transport_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let err: ClientError = io.into();
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[test]
    fn test_error_source_chaining() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let err = ClientError::Connect(io);
        let source = std::error::Error::source(&err);
        assert!(source.is_some());
        assert_eq!(source.unwrap().to_string(), "timed out");
    }
}
