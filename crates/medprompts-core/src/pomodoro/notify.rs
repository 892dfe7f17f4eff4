//! Platform notification capability.
//!
//! Optional: the pomodoro engine behaves the same whether or not permission
//! is granted, it just skips the notification.

use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPermission {
    Granted,
    Denied,
}

pub trait NotificationSink {
    fn permission(&self) -> NotificationPermission;
    fn notify(&self, title: &str, body: &str);
}

/// Sink without permission. Nothing is ever shown.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl NotificationSink for SilentSink {
    fn permission(&self) -> NotificationPermission {
        NotificationPermission::Denied
    }

    fn notify(&self, _title: &str, _body: &str) {}
}

/// Sink that keeps every notification it is given.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub sent: RefCell<Vec<(String, String)>>,
}

impl NotificationSink for RecordingSink {
    fn permission(&self) -> NotificationPermission {
        NotificationPermission::Granted
    }

    fn notify(&self, title: &str, body: &str) {
        self.sent
            .borrow_mut()
            .push((title.to_string(), body.to_string()));
    }
}

impl<T: NotificationSink + ?Sized> NotificationSink for std::rc::Rc<T> {
    fn permission(&self) -> NotificationPermission {
        (**self).permission()
    }

    fn notify(&self, title: &str, body: &str) {
        (**self).notify(title, body)
    }
}
