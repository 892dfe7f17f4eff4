//! Synchronous publish/subscribe for state-change notifications.
//!
//! Engines publish a [`Topic`] after every committed mutation; display
//! surfaces subscribe and re-read the engine snapshot they care about.
//! Delivery happens on the publishing call stack, in subscription order.
//! Late subscribers do not see earlier publications.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

/// Named change topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Progress,
    Badges,
    Challenge,
    Pomodoro,
}

impl Topic {
    pub const ALL: [Topic; 4] = [
        Topic::Progress,
        Topic::Badges,
        Topic::Challenge,
        Topic::Pomodoro,
    ];
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Topic::Progress => "progress",
            Topic::Badges => "badges",
            Topic::Challenge => "challenge",
            Topic::Pomodoro => "pomodoro",
        };
        f.write_str(name)
    }
}

type Handler = Rc<dyn Fn(Topic)>;

struct Entry {
    id: u64,
    topic: Topic,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    next_id: Cell<u64>,
    entries: RefCell<Vec<Entry>>,
}

/// Handle to a single fan-out. Clones share the same subscriber list.
#[derive(Clone, Default)]
pub struct Fanout {
    inner: Rc<Registry>,
}

/// Returned by [`Fanout::subscribe`]. Dropping it leaves the handler registered.
#[must_use = "keep the subscription to be able to unsubscribe"]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    /// Remove the handler. Unsubscribing after the fan-out is gone is a no-op.
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.entries.borrow_mut().retain(|e| e.id != self.id);
        }
    }
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(Topic) + 'static,
    {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.entries.borrow_mut().push(Entry {
            id,
            topic,
            handler: Rc::new(handler),
        });
        Subscription {
            id,
            registry: Rc::downgrade(&self.inner),
        }
    }

    /// Invoke every handler currently subscribed to `topic`.
    ///
    /// The subscriber list is snapshotted first, so handlers may subscribe,
    /// unsubscribe or publish without deadlocking the registry.
    pub fn publish(&self, topic: Topic) {
        let handlers: Vec<Handler> = self
            .inner
            .entries
            .borrow()
            .iter()
            .filter(|e| e.topic == topic)
            .map(|e| Rc::clone(&e.handler))
            .collect();
        tracing::trace!(%topic, subscribers = handlers.len(), "publish");
        for handler in handlers {
            handler(topic);
        }
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.inner
            .entries
            .borrow()
            .iter()
            .filter(|e| e.topic == topic)
            .count()
    }
}

impl fmt::Debug for Fanout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fanout")
            .field("subscribers", &self.inner.entries.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&'static str) -> Box<dyn Fn(Topic)>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log2 = Rc::clone(&log);
        let make = move |name: &'static str| {
            let log = Rc::clone(&log2);
            let handler = move |t: Topic| log.borrow_mut().push(format!("{name}:{t}"));
            Box::new(handler) as Box<dyn Fn(Topic)>
        };
        (log, make)
    }

    #[test]
    fn delivers_in_subscription_order_to_matching_topic() {
        let fanout = Fanout::new();
        let (log, make) = recorder();
        let _a = fanout.subscribe(Topic::Progress, make("a"));
        let _b = fanout.subscribe(Topic::Badges, make("b"));
        let _c = fanout.subscribe(Topic::Progress, make("c"));

        fanout.publish(Topic::Progress);
        assert_eq!(*log.borrow(), vec!["a:progress", "c:progress"]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let fanout = Fanout::new();
        let (log, make) = recorder();
        let sub = fanout.subscribe(Topic::Challenge, make("x"));
        fanout.publish(Topic::Challenge);
        sub.unsubscribe();
        fanout.publish(Topic::Challenge);
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(fanout.subscriber_count(Topic::Challenge), 0);
    }

    #[test]
    fn no_replay_for_late_subscribers() {
        let fanout = Fanout::new();
        fanout.publish(Topic::Pomodoro);
        let (log, make) = recorder();
        let _s = fanout.subscribe(Topic::Pomodoro, make("late"));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn clones_share_subscribers() {
        let fanout = Fanout::new();
        let other = fanout.clone();
        let (log, make) = recorder();
        let _s = fanout.subscribe(Topic::Badges, make("s"));
        other.publish(Topic::Badges);
        assert_eq!(*log.borrow(), vec!["s:badges"]);
    }

    #[test]
    fn handler_may_publish_and_subscribe_reentrantly() {
        let fanout = Fanout::new();
        let (log, make) = recorder();
        let _badges = fanout.subscribe(Topic::Badges, make("badges"));

        let inner = fanout.clone();
        let _chain = fanout.subscribe(Topic::Progress, move |_| {
            inner.publish(Topic::Badges);
            // Registering from inside a handler must not panic.
            let _ = inner.subscribe(Topic::Pomodoro, |_| {});
        });

        fanout.publish(Topic::Progress);
        assert_eq!(*log.borrow(), vec!["badges:badges"]);
        assert_eq!(fanout.subscriber_count(Topic::Pomodoro), 1);
    }

    #[test]
    fn unsubscribe_after_drop_is_noop() {
        let fanout = Fanout::new();
        let sub = fanout.subscribe(Topic::Progress, |_| {});
        drop(fanout);
        sub.unsubscribe();
    }
}
