//! Channel membership directory.
//!
//! The engine updates a directory as JOIN/PART/QUIT and NAMES listings
//! arrive; embedders can supply their own [`ChannelDirectory`] or use the
//! bundled [`MemoryDirectory`].
//!
//! A NAMES listing (numeric 353) for a large channel arrives as several
//! chunks followed by an end marker (366). Chunks accumulate in a pending
//! list that replaces the visible membership only when the listing ends, so
//! readers never observe a half-populated channel.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// One channel's membership state.
#[derive(Debug, Default)]
pub struct Channel {
    users: Vec<String>,
    pending: Option<Vec<String>>,
}

impl Channel {
    /// Create a channel with an initial member list.
    #[must_use]
    pub fn new(initial_users: Vec<String>) -> Self {
        Self {
            users: initial_users,
            pending: None,
        }
    }

    /// Current members, in server order.
    #[must_use]
    pub fn users(&self) -> &[String] {
        &self.users
    }

    /// Record a member joining.
    pub fn add_user(&mut self, nick: &str) {
        if !self.users.iter().any(|u| u == nick) {
            self.users.push(nick.to_string());
        }
    }

    /// Record a member leaving. Unknown nicks are ignored.
    pub fn remove_user(&mut self, nick: &str) {
        self.users.retain(|u| u != nick);
    }

    /// Start accumulating a fresh NAMES listing.
    pub fn begin_user_list_update(&mut self) {
        self.pending = Some(Vec::new());
    }

    /// Append one listing chunk. Starts an update implicitly if none is in
    /// progress, so a stray first chunk is never lost.
    pub fn append_users<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pending
            .get_or_insert_with(Vec::new)
            .extend(names.into_iter().map(Into::into));
    }

    /// Finish the listing: the accumulated names replace the membership.
    /// A no-op when no update is in progress.
    pub fn end_user_list_update(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.users = pending;
        }
    }
}

/// Directory of channels the client knows about.
///
/// Implementations must be safe to call from the reader task while other
/// tasks read membership.
pub trait ChannelDirectory: Send + Sync {
    /// Run `f` against the named channel, if present. Returns whether the
    /// channel existed.
    fn with_channel(&self, name: &str, f: &mut dyn FnMut(&mut Channel)) -> bool;

    /// Add a channel with an initial member list. Existing channels are
    /// left untouched.
    fn add_channel(&self, name: &str, initial_users: Vec<String>);

    /// Run `f` against every known channel.
    fn for_each_channel(&self, f: &mut dyn FnMut(&str, &mut Channel));
}

/// In-memory [`ChannelDirectory`].
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    channels: Mutex<HashMap<String, Channel>>,
}

impl MemoryDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Snapshot of one channel's member list, if the channel is known.
    #[must_use]
    pub fn users_of(&self, name: &str) -> Option<Vec<String>> {
        self.channels
            .lock()
            .get(name)
            .map(|c| c.users().to_vec())
    }
}

impl ChannelDirectory for MemoryDirectory {
    fn with_channel(&self, name: &str, f: &mut dyn FnMut(&mut Channel)) -> bool {
        match self.channels.lock().get_mut(name) {
            Some(channel) => {
                f(channel);
                true
            }
            None => false,
        }
    }

    fn add_channel(&self, name: &str, initial_users: Vec<String>) {
        self.channels
            .lock()
            .entry(name.to_string())
            .or_insert_with(|| Channel::new(initial_users));
    }

    fn for_each_channel(&self, f: &mut dyn FnMut(&str, &mut Channel)) {
        for (name, channel) in self.channels.lock().iter_mut() {
            f(name, channel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove_user() {
        let mut channel = Channel::new(vec!["a".into(), "b".into()]);
        channel.add_user("c");
        channel.add_user("c"); // duplicate ignored
        assert_eq!(channel.users(), ["a", "b", "c"]);
        channel.remove_user("b");
        assert_eq!(channel.users(), ["a", "c"]);
        channel.remove_user("nobody");
        assert_eq!(channel.users(), ["a", "c"]);
    }

    #[test]
    fn test_chunked_listing_swaps_at_end() {
        let mut channel = Channel::new(vec!["old".into()]);
        channel.begin_user_list_update();
        channel.append_users(["a", "b"]);
        channel.append_users(["c"]);
        // Mid-update, the old membership is still visible.
        assert_eq!(channel.users(), ["old"]);
        channel.end_user_list_update();
        assert_eq!(channel.users(), ["a", "b", "c"]);
    }

    #[test]
    fn test_append_starts_update_implicitly() {
        let mut channel = Channel::new(vec!["old".into()]);
        channel.append_users(["a"]);
        channel.end_user_list_update();
        assert_eq!(channel.users(), ["a"]);
    }

    #[test]
    fn test_end_without_update_is_noop() {
        let mut channel = Channel::new(vec!["a".into()]);
        channel.end_user_list_update();
        assert_eq!(channel.users(), ["a"]);
    }

    #[test]
    fn test_directory_add_is_idempotent() {
        let dir = MemoryDirectory::new();
        dir.add_channel("#ch", vec!["a".into()]);
        dir.add_channel("#ch", vec!["b".into()]);
        assert_eq!(dir.users_of("#ch").unwrap(), ["a"]);
        assert!(dir.users_of("#other").is_none());
    }

    #[test]
    fn test_directory_with_channel() {
        let dir = MemoryDirectory::new();
        dir.add_channel("#ch", vec![]);
        let found = dir.with_channel("#ch", &mut |c| c.add_user("x"));
        assert!(found);
        assert_eq!(dir.users_of("#ch").unwrap(), ["x"]);
        assert!(!dir.with_channel("#missing", &mut |_| {}));
    }

    #[test]
    fn test_for_each_channel() {
        let dir = MemoryDirectory::new();
        dir.add_channel("#a", vec!["quitter".into(), "x".into()]);
        dir.add_channel("#b", vec!["quitter".into()]);
        dir.for_each_channel(&mut |_, c| c.remove_user("quitter"));
        assert_eq!(dir.users_of("#a").unwrap(), ["x"]);
        assert!(dir.users_of("#b").unwrap().is_empty());
    }
}
