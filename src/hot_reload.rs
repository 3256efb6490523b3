//! Hot-reload channel
//!
//! A layout with a name listens on `layout-update__<name>`. Updates are pushed from any thread
//! (a socket reader, a file watcher) onto an [`UpdateChannel`] and queued on the subscriber's
//! receiver; the layout drains its queue from the UI thread in
//! [`Layout::poll_updates`](crate::layout::Layout::poll_updates), so widget mutation never
//! happens off that thread.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crossbeam_channel::{unbounded, Receiver, Sender};
use indexmap::IndexMap;

/// Prefix of every layout update channel
pub const CHANNEL_PREFIX: &str = "layout-update__";

pub fn channel_name(layout_name: &str) -> String {
    format!("{}{}", CHANNEL_PREFIX, layout_name)
}

/// A replacement document for a named layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutUpdate {
    pub layout_name: String,
    pub document: String,
}

impl LayoutUpdate {
    pub fn new(layout_name: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            layout_name: layout_name.into(),
            document: document.into(),
        }
    }

    pub fn channel(&self) -> String {
        channel_name(&self.layout_name)
    }
}

/// A live registration on a channel. Updates queue on it until drained.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    channel: String,
    receiver: Receiver<LayoutUpdate>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Take every queued update without blocking
    pub fn drain(&self) -> Vec<LayoutUpdate> {
        self.receiver.try_iter().collect()
    }
}

/// Named publish/subscribe transport for layout updates
pub trait UpdateChannel: Send + Sync {
    fn subscribe(&self, channel: &str) -> Subscription;

    fn unsubscribe(&self, subscription: &Subscription);

    /// Deliver to every subscriber of `channel`; returns how many received it
    fn publish(&self, channel: &str, update: LayoutUpdate) -> usize;
}

/// In-process [`UpdateChannel`] over crossbeam channels
#[derive(Debug, Default)]
pub struct UpdateBus {
    subscribers: Mutex<IndexMap<String, Vec<(u64, Sender<LayoutUpdate>)>>>,
    next_id: AtomicU64,
}

impl UpdateBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.subscribers
            .lock()
            .map(|subs| subs.get(channel).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

impl UpdateChannel for UpdateBus {
    fn subscribe(&self, channel: &str) -> Subscription {
        let (sender, receiver) = unbounded();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.entry(channel.to_string()).or_default().push((id, sender));
        }
        log::debug!("subscribed #{} to {}", id, channel);
        Subscription {
            id,
            channel: channel.to_string(),
            receiver,
        }
    }

    fn unsubscribe(&self, subscription: &Subscription) {
        if let Ok(mut subs) = self.subscribers.lock() {
            if let Some(list) = subs.get_mut(&subscription.channel) {
                list.retain(|(id, _)| *id != subscription.id);
                if list.is_empty() {
                    subs.shift_remove(&subscription.channel);
                }
            }
        }
        log::debug!("unsubscribed #{} from {}", subscription.id, subscription.channel);
    }

    fn publish(&self, channel: &str, update: LayoutUpdate) -> usize {
        let Ok(subs) = self.subscribers.lock() else {
            return 0;
        };
        subs.get(channel).map_or(0, |list| {
            list.iter()
                .filter(|(_, sender)| sender.send(update.clone()).is_ok())
                .count()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_name() {
        assert_eq!(channel_name("login"), "layout-update__login");
        assert_eq!(LayoutUpdate::new("home", "{}").channel(), "layout-update__home");
    }

    #[test]
    fn test_publish_reaches_only_its_channel() {
        let bus = UpdateBus::new();
        let login = bus.subscribe(&channel_name("login"));
        let home = bus.subscribe(&channel_name("home"));
        let delivered = bus.publish(&channel_name("login"), LayoutUpdate::new("login", "{}"));
        assert_eq!(delivered, 1);
        assert_eq!(login.drain(), vec![LayoutUpdate::new("login", "{}")]);
        assert!(home.drain().is_empty());
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = UpdateBus::new();
        let sub = bus.subscribe("layout-update__a");
        assert_eq!(bus.subscriber_count("layout-update__a"), 1);
        bus.unsubscribe(&sub);
        assert_eq!(bus.subscriber_count("layout-update__a"), 0);
        assert_eq!(bus.publish("layout-update__a", LayoutUpdate::new("a", "")), 0);
        assert!(sub.drain().is_empty());
    }

    #[test]
    fn test_publish_from_another_thread() {
        let bus = std::sync::Arc::new(UpdateBus::new());
        let sub = bus.subscribe("layout-update__remote");
        let publisher = std::sync::Arc::clone(&bus);
        std::thread::spawn(move || {
            publisher.publish("layout-update__remote", LayoutUpdate::new("remote", "<layout/>"));
        })
        .join()
        .unwrap();
        assert_eq!(sub.drain().len(), 1);
    }
}
