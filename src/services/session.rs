//! Session manager — the authenticated-user state machine.
//!
//! ARCHITECTURE
//! ============
//! One `SessionManager` instance per process owns the session. It publishes
//! immutable `SessionSnapshot`s through a watch channel (consumed by the
//! access guard and navigation resolver on every route evaluation) and
//! user-facing `Notice`s through a broadcast channel (the toast surface).
//! Every mutation is write-through: the store write lands before the new
//! state is published, so a present user and its persisted record can never
//! diverge.
//!
//! CONCURRENCY
//! ===========
//! Overlapping logins are resolved last-write-wins with a monotonic attempt
//! counter. A completing attempt commits only if it is still the newest;
//! superseded completions touch nothing, including the loading flag, which
//! the newest attempt owns.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use uuid::Uuid;

use crate::services::store::{SessionStore, StoreError};
use crate::services::verifier::{CredentialVerifier, VerifyError, normalize_pin};

const NOTICE_BUFFER: usize = 16;

// =============================================================================
// USER & ROLE
// =============================================================================

/// Two-valued role classification gating route access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Strict wire decoding: exactly `"user"` or `"admin"`, anything else is
    /// not a role.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated user record as returned by the credential verifier.
/// Serialized form matches the verifier wire shape (camelCase keys).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub profile_image: String,
    #[serde(default)]
    pub additional_info: HashMap<String, String>,
}

impl User {
    /// Shallow merge: present patch fields override wholesale.
    fn apply(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(profile_image) = patch.profile_image {
            self.profile_image = profile_image;
        }
        if let Some(additional_info) = patch.additional_info {
            self.additional_info = additional_info;
        }
    }
}

/// Profile fields a signed-in user may change locally. Identity fields
/// (`id`, `role`) are deliberately not here: they only ever come from the
/// verifier.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub profile_image: Option<String>,
    pub additional_info: Option<HashMap<String, String>>,
}

// =============================================================================
// SNAPSHOT & NOTICES
// =============================================================================

/// Published view of the session. `is_loading` is true while the initial
/// restore or a verification is in flight; authentication is derived from
/// `user`, never stored.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub is_loading: bool,
}

impl SessionSnapshot {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Error => f.write_str("error"),
            Self::Info => f.write_str("info"),
        }
    }
}

/// A user-facing toast event emitted by session transitions.
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub id: Uuid,
    pub level: NoticeLevel,
    pub message: String,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Why a `login` call did not establish a session.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// The PIN was empty after trimming; the verifier was never contacted.
    #[error("a PIN is required")]
    EmptyPin,
    /// A newer login attempt completed first; this one changed nothing.
    #[error("superseded by a newer login attempt")]
    Superseded,
    #[error("verification failed: {0}")]
    Verify(#[from] VerifyError),
    #[error("session store error: {0}")]
    Store(#[from] StoreError),
}

// =============================================================================
// SESSION MANAGER
// =============================================================================

/// Clears the loading flag when dropped, unless disarmed. Guarantees the
/// flag is released on every exit path of a verification.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<SessionSnapshot>,
    armed: bool,
}

impl<'a> LoadingGuard<'a> {
    fn new(state: &'a watch::Sender<SessionSnapshot>) -> Self {
        state.send_modify(|snapshot| snapshot.is_loading = true);
        Self { state, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.send_modify(|snapshot| snapshot.is_loading = false);
        }
    }
}

/// Owns session state and orchestrates it against the store and verifier.
/// Construct exactly one per process and share it via `Arc`.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    verifier: Arc<dyn CredentialVerifier>,
    state: watch::Sender<SessionSnapshot>,
    notices: broadcast::Sender<Notice>,
    attempts: AtomicU64,
}

impl SessionManager {
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, verifier: Arc<dyn CredentialVerifier>) -> Self {
        // Loading until `restore` has run, so guards defer rather than deny.
        let (state, _) = watch::channel(SessionSnapshot { user: None, is_loading: true });
        let (notices, _) = broadcast::channel(NOTICE_BUFFER);
        Self { store, verifier, state, notices, attempts: AtomicU64::new(0) }
    }

    /// Current session state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Watch the session state; the receiver always holds the latest value.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Listen for user-facing notices (the toast stream).
    #[must_use]
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Load the persisted session, if any. Called once at startup; clears
    /// the loading flag whether or not a session was found. A missing,
    /// unreadable, or malformed record starts the process signed out.
    pub fn restore(&self) {
        let restored = match self.store.load() {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!(error = %err, "session store unreadable; starting signed out");
                None
            }
        };
        match &restored {
            Some(user) => tracing::info!(user = %user.id, role = %user.role, "session restored"),
            None => tracing::debug!("no stored session"),
        }
        self.state.send_modify(|snapshot| {
            snapshot.user = restored;
            snapshot.is_loading = false;
        });
    }

    /// Verify a PIN and establish a session.
    ///
    /// On success the record is persisted, then published, then announced.
    /// On rejection or fault the current session (if any) is left untouched
    /// and a failure notice carries the verifier's reason or a generic
    /// message. The loading flag is released on every exit path.
    ///
    /// # Errors
    ///
    /// [`LoginError::EmptyPin`] for a blank PIN, [`LoginError::Superseded`]
    /// when a newer attempt finished first, [`LoginError::Verify`] for
    /// rejections and faults, [`LoginError::Store`] when persisting failed.
    pub async fn login(&self, pin: &str) -> Result<User, LoginError> {
        let Some(pin) = normalize_pin(pin) else {
            self.notify(NoticeLevel::Error, "PIN is required.");
            return Err(LoginError::EmptyPin);
        };

        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let mut loading = LoadingGuard::new(&self.state);
        tracing::debug!(attempt, "verifying PIN");

        let result = self.verifier.verify(&pin).await;

        if self.attempts.load(Ordering::SeqCst) != attempt {
            loading.disarm();
            tracing::debug!(attempt, "login attempt superseded");
            return Err(LoginError::Superseded);
        }

        match result {
            Ok(user) => {
                if let Err(err) = self.store.save(&user) {
                    tracing::warn!(error = %err, "session store write failed; login aborted");
                    self.notify(NoticeLevel::Error, "An error occurred during login.");
                    return Err(err.into());
                }
                loading.disarm();
                self.state.send_modify(|snapshot| {
                    snapshot.user = Some(user.clone());
                    snapshot.is_loading = false;
                });
                tracing::info!(user = %user.id, role = %user.role, "login succeeded");
                self.notify(NoticeLevel::Success, "Login successful!");
                Ok(user)
            }
            Err(VerifyError::Rejected { reason }) => {
                tracing::info!(attempt, "PIN rejected");
                let message = reason
                    .clone()
                    .unwrap_or_else(|| "Invalid PIN, please try again.".to_owned());
                self.notify(NoticeLevel::Error, message);
                Err(VerifyError::Rejected { reason }.into())
            }
            Err(err) => {
                tracing::warn!(error = %err, "credential verifier unreachable");
                self.notify(NoticeLevel::Error, "An error occurred during login.");
                Err(err.into())
            }
        }
    }

    /// Clear the session and erase the persisted record. Idempotent: with no
    /// active session this is a no-op beyond the notice. An erase failure is
    /// logged but never blocks signing out.
    pub fn logout(&self) {
        if let Err(err) = self.store.clear() {
            tracing::warn!(error = %err, "session store erase failed");
        }
        self.state.send_modify(|snapshot| snapshot.user = None);
        tracing::info!("signed out");
        self.notify(NoticeLevel::Info, "You have been logged out.");
    }

    /// Merge profile fields into the active session and persist the result.
    /// A no-op when signed out. Does not contact the verifier.
    ///
    /// # Errors
    ///
    /// [`StoreError`] when the merged record could not be persisted; the
    /// in-memory session is left unchanged in that case.
    pub fn update_profile(&self, patch: UserPatch) -> Result<(), StoreError> {
        let Some(mut user) = self.state.borrow().user.clone() else {
            tracing::debug!("profile update ignored; no active session");
            return Ok(());
        };
        user.apply(patch);
        if let Err(err) = self.store.save(&user) {
            tracing::warn!(error = %err, "session store write failed; profile update dropped");
            self.notify(NoticeLevel::Error, "Could not save your profile.");
            return Err(err);
        }
        self.state.send_modify(|snapshot| snapshot.user = Some(user));
        Ok(())
    }

    fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        // Send errors only mean nobody is listening; toasts are best-effort.
        let _ = self.notices.send(Notice { id: Uuid::new_v4(), level, message: message.into() });
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
