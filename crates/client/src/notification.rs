//! Single-slot, auto-expiring user feedback.
//!
//! [`NotificationSlot`] is the pure state machine: showing a notification
//! replaces whatever is displayed and yields a [`ClearAction`] describing
//! the deferred clear; expiring only succeeds for the notification that
//! is still displayed. [`NotificationChannel`] drives the slot on the
//! tokio runtime, cancelling the previous deferred clear whenever a new
//! notification arrives. Last call wins; nothing queues or stacks.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Default time a notification stays visible.
pub const DEFAULT_NOTIFY_DURATION: Duration = Duration::from_millis(1800);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A displayed notification. `seq` increases with every `show`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub seq: u64,
}

/// Deferred clear produced by [`NotificationSlot::show`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearAction {
    pub seq: u64,
    pub after: Duration,
}

// ---------------------------------------------------------------------------
// NotificationSlot
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct NotificationSlot {
    current: Option<Notification>,
    last_seq: u64,
}

impl NotificationSlot {
    /// Display `message`, replacing anything currently shown.
    pub fn show(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        after: Duration,
    ) -> ClearAction {
        self.last_seq += 1;
        self.current = Some(Notification {
            message: message.into(),
            kind,
            seq: self.last_seq,
        });
        ClearAction {
            seq: self.last_seq,
            after,
        }
    }

    /// Clear the slot if notification `seq` is still the one displayed.
    ///
    /// Returns `true` if something was cleared.
    pub fn expire(&mut self, seq: u64) -> bool {
        match &self.current {
            Some(current) if current.seq == seq => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    /// Clear unconditionally.
    pub fn dismiss(&mut self) -> bool {
        self.current.take().is_some()
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }
}

// ---------------------------------------------------------------------------
// NotificationChannel
// ---------------------------------------------------------------------------

struct ChannelState {
    slot: NotificationSlot,
    /// Cancels the auto-clear task of the displayed notification.
    pending_clear: Option<CancellationToken>,
}

struct ChannelInner {
    state: Mutex<ChannelState>,
    tx: watch::Sender<Option<Notification>>,
}

impl ChannelInner {
    fn expire(&self, seq: u64) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.slot.expire(seq) {
            state.pending_clear = None;
            self.tx.send_replace(None);
            tracing::trace!(seq, "Notification expired");
        }
    }
}

/// Shared notification slot. Cheap to clone; clones share the slot.
///
/// [`notify`](Self::notify) spawns the auto-clear timer, so it must be
/// called from within a tokio runtime.
#[derive(Clone)]
pub struct NotificationChannel {
    inner: Arc<ChannelInner>,
    default_duration: Duration,
}

impl NotificationChannel {
    pub fn new(default_duration: Duration) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(ChannelInner {
                state: Mutex::new(ChannelState {
                    slot: NotificationSlot::default(),
                    pending_clear: None,
                }),
                tx,
            }),
            default_duration,
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(message, NotificationKind::Success, self.default_duration);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(message, NotificationKind::Error, self.default_duration);
    }

    /// Show `message` for `duration`, replacing and cancelling the timer
    /// of any notification currently displayed.
    pub fn notify(&self, message: impl Into<String>, kind: NotificationKind, duration: Duration) {
        let token = CancellationToken::new();
        let action = {
            let mut state = self.inner.state.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(previous) = state.pending_clear.replace(token.clone()) {
                previous.cancel();
            }
            let action = state.slot.show(message, kind, duration);
            self.inner.tx.send_replace(state.slot.current().cloned());
            action
        };

        tracing::debug!(seq = action.seq, ?kind, "Notification shown");

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(action.after) => inner.expire(action.seq),
            }
        });
    }

    /// Clear the slot now and cancel its pending auto-clear.
    pub fn dismiss(&self) {
        let mut state = self.inner.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pending) = state.pending_clear.take() {
            pending.cancel();
        }
        if state.slot.dismiss() {
            self.inner.tx.send_replace(None);
        }
    }

    /// The notification currently displayed, if any.
    pub fn current(&self) -> Option<Notification> {
        self.inner.tx.borrow().clone()
    }

    /// Watch the slot; the receiver sees every replacement and clear.
    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.inner.tx.subscribe()
    }
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFY_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- slot ----

    #[test]
    fn show_replaces_current() {
        let mut slot = NotificationSlot::default();
        slot.show("first", NotificationKind::Success, DEFAULT_NOTIFY_DURATION);
        slot.show("second", NotificationKind::Error, DEFAULT_NOTIFY_DURATION);
        let current = slot.current().unwrap();
        assert_eq!(current.message, "second");
        assert_eq!(current.kind, NotificationKind::Error);
    }

    #[test]
    fn stale_expiry_does_not_clear_newer_notification() {
        let mut slot = NotificationSlot::default();
        let first = slot.show("first", NotificationKind::Success, DEFAULT_NOTIFY_DURATION);
        let second = slot.show("second", NotificationKind::Success, DEFAULT_NOTIFY_DURATION);
        assert!(!slot.expire(first.seq));
        assert_eq!(slot.current().unwrap().message, "second");
        assert!(slot.expire(second.seq));
        assert!(slot.current().is_none());
        assert!(!slot.expire(second.seq));
    }

    #[test]
    fn seq_is_monotonic() {
        let mut slot = NotificationSlot::default();
        let a = slot.show("a", NotificationKind::Success, Duration::ZERO);
        slot.dismiss();
        let b = slot.show("b", NotificationKind::Success, Duration::ZERO);
        assert!(b.seq > a.seq);
    }

    // ---- channel ----

    #[tokio::test(start_paused = true)]
    async fn notification_auto_clears_after_duration() {
        let channel = NotificationChannel::default();
        channel.success("Saved");
        assert_eq!(channel.current().unwrap().message, "Saved");

        tokio::time::sleep(Duration::from_millis(1799)).await;
        assert!(channel.current().is_some());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(channel.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn second_notification_resets_the_timer() {
        let channel = NotificationChannel::default();
        channel.success("first");

        tokio::time::sleep(Duration::from_millis(1500)).await;
        channel.error("second");

        // The first timer would have fired here.
        tokio::time::sleep(Duration::from_millis(500)).await;
        let current = channel.current().unwrap();
        assert_eq!(current.message, "second");
        assert_eq!(current.kind, NotificationKind::Error);

        tokio::time::sleep(Duration::from_millis(1400)).await;
        assert!(channel.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn subscriber_only_ever_sees_one_notification_at_a_time() {
        let channel = NotificationChannel::default();
        let rx = channel.subscribe();

        channel.success("one");
        channel.success("two");
        assert_eq!(rx.borrow().as_ref().unwrap().message, "two");

        tokio::time::sleep(DEFAULT_NOTIFY_DURATION + Duration::from_millis(1)).await;
        assert!(rx.borrow().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn custom_duration_is_honoured() {
        let channel = NotificationChannel::default();
        channel.notify("quick", NotificationKind::Success, Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(101)).await;
        assert!(channel.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dismiss_clears_immediately() {
        let channel = NotificationChannel::default();
        channel.error("boom");
        channel.dismiss();
        assert!(channel.current().is_none());

        channel.success("after");
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(channel.current().unwrap().message, "after");
    }
}
