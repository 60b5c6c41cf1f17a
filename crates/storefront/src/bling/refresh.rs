//! Single-flight coordination for token refreshes.
//!
//! When several requests hit `401 Unauthorized` at once, only the first one
//! (the leader) calls the token endpoint. Everyone else subscribes to the
//! leader's broadcast and resumes with whatever the leader obtained.
//!
//! The in-flight slot is released before the outcome is broadcast, so the
//! persisted record is always in place by the time a waiter wakes up.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use secrecy::SecretString;
use tokio::sync::broadcast;

use super::BlingError;

/// Outcome shared with waiters. Errors are flattened to their message since
/// the leader keeps the original error for itself.
type Outcome = Result<SecretString, String>;

/// Guards the refresh operation so at most one runs at a time.
#[derive(Debug, Default)]
pub struct RefreshGate {
    in_flight: Mutex<Option<broadcast::Sender<Outcome>>>,
}

enum Role {
    Leader(broadcast::Sender<Outcome>),
    Waiter(broadcast::Receiver<Outcome>),
}

/// Clears the in-flight slot when the leader finishes or is dropped.
struct SlotRelease<'a> {
    gate: &'a RefreshGate,
}

impl Drop for SlotRelease<'_> {
    fn drop(&mut self) {
        self.gate.slot().take();
    }
}

impl RefreshGate {
    /// Create an idle gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a refresh is running.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.slot().is_some()
    }

    fn slot(&self) -> MutexGuard<'_, Option<broadcast::Sender<Outcome>>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `refresh` unless one is already in flight, in which case wait for
    /// that one instead.
    ///
    /// `refresh` must persist the new token before returning it.
    ///
    /// # Errors
    ///
    /// The leader gets the error returned by `refresh` unchanged. Waiters get
    /// `BlingError::AuthExpired` carrying the leader's error message, or
    /// noting that the leader was dropped mid-refresh.
    pub async fn run<F, Fut>(&self, refresh: F) -> Result<SecretString, BlingError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SecretString, BlingError>>,
    {
        let role = {
            let mut slot = self.slot();
            if let Some(sender) = slot.as_ref() {
                Role::Waiter(sender.subscribe())
            } else {
                let (sender, _) = broadcast::channel(1);
                *slot = Some(sender.clone());
                Role::Leader(sender)
            }
        };

        match role {
            Role::Waiter(mut receiver) => {
                tracing::debug!("Token refresh already in flight, waiting for it");
                match receiver.recv().await {
                    Ok(Ok(token)) => Ok(token),
                    Ok(Err(reason)) => Err(BlingError::AuthExpired(reason)),
                    Err(_) => Err(BlingError::AuthExpired(
                        "token refresh was abandoned".to_string(),
                    )),
                }
            }
            Role::Leader(sender) => {
                let release = SlotRelease { gate: self };
                let outcome = refresh().await;
                drop(release);

                let shared = match &outcome {
                    Ok(token) => Ok(token.clone()),
                    Err(err) => Err(err.to_string()),
                };
                // No receivers just means nobody was waiting
                let _ = sender.send(shared);

                outcome
            }
        }
    }
}
