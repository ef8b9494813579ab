//! Event sinks.
//!
//! Zero or more sinks receive the classified events the engine acts on.
//! Sink failures are isolated: a sink returning an error is logged and the
//! remaining sinks still receive the same event. Nothing a sink does can
//! abort the reader loop.

use crate::prefix::Prefix;
use tracing::warn;

/// A collaborator notified of classified events.
///
/// Every method returns `anyhow::Result` so failures carry context; the
/// default implementations ignore events a sink does not care about.
#[allow(unused_variables)]
pub trait EventSink: Send + Sync {
    /// The connection reached `Operating` (registration complete).
    fn on_connected(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// A PRIVMSG addressed directly to us.
    fn on_private_message(&self, source: &str, message: &str, mask: &Prefix) -> anyhow::Result<()> {
        Ok(())
    }

    /// A PRIVMSG addressed to a channel.
    fn on_channel_message(
        &self,
        source: &str,
        channel: &str,
        message: &str,
        mask: &Prefix,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    /// Someone joined a channel.
    fn on_join(&self, nick: &str, channel: &str, mask: &Prefix) -> anyhow::Result<()> {
        Ok(())
    }

    /// Someone left a channel.
    fn on_part(&self, nick: &str, channel: &str, mask: &Prefix) -> anyhow::Result<()> {
        Ok(())
    }

    /// Someone disconnected from the network.
    fn on_quit(&self, nick: &str, mask: &Prefix) -> anyhow::Result<()> {
        Ok(())
    }

    /// The client was killed; no further events will arrive.
    fn on_terminate(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Fan an event out to every sink, capturing each sink's result
/// individually so one failure cannot starve the rest.
pub(crate) fn notify_sinks<F>(sinks: &[std::sync::Arc<dyn EventSink>], what: &str, f: F)
where
    F: Fn(&dyn EventSink) -> anyhow::Result<()>,
{
    for sink in sinks {
        if let Err(err) = f(sink.as_ref()) {
            warn!(event = what, error = %err, "event sink failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting {
        joins: AtomicUsize,
    }

    impl EventSink for Counting {
        fn on_join(&self, _nick: &str, _channel: &str, _mask: &Prefix) -> anyhow::Result<()> {
            self.joins.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Failing;

    impl EventSink for Failing {
        fn on_join(&self, _nick: &str, _channel: &str, _mask: &Prefix) -> anyhow::Result<()> {
            anyhow::bail!("sink exploded")
        }
    }

    #[test]
    fn test_failing_sink_does_not_starve_others() {
        let counting = Arc::new(Counting {
            joins: AtomicUsize::new(0),
        });
        let sinks: Vec<Arc<dyn EventSink>> = vec![Arc::new(Failing), counting.clone()];

        let mask = Prefix::parse("nick!user@host").unwrap();
        notify_sinks(&sinks, "join", |s| s.on_join("nick", "#ch", &mask));

        assert_eq!(counting.joins.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_default_methods_are_noops() {
        struct Quiet;
        impl EventSink for Quiet {}

        let quiet = Quiet;
        assert!(quiet.on_connected().is_ok());
        assert!(quiet.on_terminate().is_ok());
    }
}
