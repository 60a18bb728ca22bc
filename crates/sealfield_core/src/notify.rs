//! Operator notifications for decrypt failures.
//!
//! After a key rotation every read of an old record fails to decrypt. To
//! avoid flooding operators, [`FailureNotifier`] sends at most one
//! notification per collection within a time window. Delivery problems are
//! swallowed: a notifier never turns a recoverable read into a failed one.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;

/// A notification could not be delivered.
#[derive(Debug, Error)]
#[error("notification not delivered: {0}")]
pub struct NotifyError(pub String);

/// Delivers messages to an operator (toast, chat, pager, ...).
pub trait Notifier: Send + Sync {
    /// Sends `message`.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery failed.
    fn notify_operator(&self, message: &str) -> Result<(), NotifyError>;
}

/// Discards every notification. Used in non-interactive contexts.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify_operator(&self, _message: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Message sent when sensitive values cannot be decrypted.
pub const DECRYPT_FAILURE_MESSAGE: &str =
    "Some sensitive field values could not be decrypted. The encryption key may have changed; run the rekey command with the previous key.";

/// Deduplicating wrapper around a [`Notifier`].
///
/// A slot for the collection is claimed before delivery and released if
/// delivery fails, so a failed attempt does not use up the window.
pub struct FailureNotifier {
    inner: Box<dyn Notifier>,
    window: Duration,
    claimed: Mutex<HashMap<String, Instant>>,
}

impl FailureNotifier {
    /// Wraps `inner`, allowing one notification per collection per `window`.
    pub fn new(inner: Box<dyn Notifier>, window: Duration) -> Self {
        Self {
            inner,
            window,
            claimed: Mutex::new(HashMap::new()),
        }
    }

    /// A notifier that never delivers anything.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Box::new(NoopNotifier), Duration::ZERO)
    }

    /// Reports a decrypt failure in `collection`.
    ///
    /// Returns `true` if a notification was delivered.
    pub fn decrypt_failed(&self, collection: &str) -> bool {
        let key = if collection.is_empty() {
            "unknown"
        } else {
            collection
        };

        if !self.try_claim(key, Instant::now()) {
            return false;
        }

        match self.inner.notify_operator(DECRYPT_FAILURE_MESSAGE) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(collection = key, error = %e, "operator notification failed");
                self.claimed.lock().remove(key);
                false
            }
        }
    }

    fn try_claim(&self, key: &str, now: Instant) -> bool {
        let mut claimed = self.claimed.lock();
        match claimed.get(key) {
            Some(at) if now.duration_since(*at) < self.window => false,
            _ => {
                claimed.insert(key.to_string(), now);
                true
            }
        }
    }
}

impl Default for FailureNotifier {
    fn default() -> Self {
        Self::disabled()
    }
}

impl std::fmt::Debug for FailureNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailureNotifier")
            .field("window", &self.window)
            .field("claimed", &self.claimed.lock().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        sent: AtomicUsize,
        fail: AtomicBool,
    }

    impl Notifier for Arc<Recorder> {
        fn notify_operator(&self, _message: &str) -> Result<(), NotifyError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(NotifyError("no session".into()));
            }
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn notifier(window: Duration) -> (FailureNotifier, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        (
            FailureNotifier::new(Box::new(recorder.clone()), window),
            recorder,
        )
    }

    #[test]
    fn dedups_within_window() {
        let (notifier, recorder) = notifier(Duration::from_secs(3600));

        assert!(notifier.decrypt_failed("contact"));
        assert!(!notifier.decrypt_failed("contact"));
        assert!(!notifier.decrypt_failed("contact"));
        assert_eq!(recorder.sent.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn collections_are_independent() {
        let (notifier, recorder) = notifier(Duration::from_secs(3600));

        assert!(notifier.decrypt_failed("contact"));
        assert!(notifier.decrypt_failed("newsletter"));
        assert_eq!(recorder.sent.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failed_delivery_releases_slot() {
        let (notifier, recorder) = notifier(Duration::from_secs(3600));

        recorder.fail.store(true, Ordering::SeqCst);
        assert!(!notifier.decrypt_failed("contact"));

        recorder.fail.store(false, Ordering::SeqCst);
        assert!(notifier.decrypt_failed("contact"));
        assert_eq!(recorder.sent.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn expired_window_allows_another() {
        let (notifier, _recorder) = notifier(Duration::from_secs(60));
        let start = Instant::now();

        assert!(notifier.try_claim("contact", start));
        assert!(!notifier.try_claim("contact", start + Duration::from_secs(30)));
        assert!(notifier.try_claim("contact", start + Duration::from_secs(61)));
    }

    #[test]
    fn empty_collection_uses_unknown_key() {
        let (notifier, recorder) = notifier(Duration::from_secs(3600));
        assert!(notifier.decrypt_failed(""));
        assert!(!notifier.decrypt_failed(""));
        assert_eq!(recorder.sent.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn noop_always_succeeds() {
        assert!(NoopNotifier.notify_operator("hello").is_ok());
    }
}
