//! Client-side session lifecycle: login, persisted restore, periodic token
//! renewal, and forced logout when renewal fails.
//!
//! State transitions happen under one async mutex. Every login, logout and
//! restore bumps a session epoch; a renewal result is only applied if the epoch
//! it started under is still current, so a cancelled or superseded attempt can
//! never touch the session. A second gate keeps renewal attempts strictly
//! serialized.

use std::sync::{Arc, Weak};
use std::time::Duration;

use showcase_core::Clock;
use showcase_core::model::{RefreshToken, Session, SessionPhase, UserId};
use storage::repository::{SessionRepository, StorageError};
use tokio::sync::{Mutex, broadcast, watch};
use tracing::{debug, info, warn};

use crate::api::TokenRenewer;
use crate::error::SessionManagerError;
use crate::renewal::{RenewalTask, TickOutcome};

pub const DEFAULT_RENEW_INTERVAL: Duration = Duration::from_secs(240);
pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(300);
const MIN_RENEW_INTERVAL: Duration = Duration::from_secs(1);
const EVENT_CAPACITY: usize = 32;

/// How often the access token is renewed, and how long a fresh one lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewalPolicy {
    interval: Duration,
    access_ttl: Option<Duration>,
}

impl RenewalPolicy {
    /// Intervals below one second are raised to one second.
    #[must_use]
    pub fn new(interval: Duration, access_ttl: Option<Duration>) -> Self {
        Self {
            interval: interval.max(MIN_RENEW_INTERVAL),
            access_ttl,
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub fn access_ttl(&self) -> Option<Duration> {
        self.access_ttl
    }
}

impl Default for RenewalPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RENEW_INTERVAL, Some(DEFAULT_ACCESS_TTL))
    }
}

/// Notifications for the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { user_id: UserId },
    Restored { user_id: UserId },
    Renewed { user_id: UserId },
    LoggedOut,
    /// Renewal failed; the session is gone and the application must reload.
    ForcedLogout { reason: String },
}

/// Latest observable session state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub session: Option<Session>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Nothing usable was persisted.
    NoSession,
    /// The persisted session was renewed and is active again.
    Restored(Session),
    /// The persisted session could not be renewed and was discarded.
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewOutcome {
    Renewed(Session),
    /// Renewal failed and the session was logged out.
    LoggedOut,
    /// The session changed while the request was in flight; the result was dropped.
    Superseded,
    NoSession,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenewalOrigin {
    Manual,
    Restore,
    Scheduled { epoch: u64 },
}

#[derive(Default)]
struct State {
    current: Option<Session>,
    phase: SessionPhase,
    task: Option<RenewalTask>,
    epoch: u64,
}

impl State {
    fn cancel_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
    }
}

struct Inner {
    clock: Clock,
    policy: RenewalPolicy,
    sessions: Arc<dyn SessionRepository>,
    renewer: Arc<dyn TokenRenewer>,
    state: Mutex<State>,
    renewal_gate: Mutex<()>,
    snapshot: watch::Sender<SessionSnapshot>,
    events: broadcast::Sender<SessionEvent>,
}

/// Owns the current session and its renewal timer.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    #[must_use]
    pub fn new(
        clock: Clock,
        policy: RenewalPolicy,
        sessions: Arc<dyn SessionRepository>,
        renewer: Arc<dyn TokenRenewer>,
    ) -> Self {
        let (snapshot, _) = watch::channel(SessionSnapshot::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                clock,
                policy,
                sessions,
                renewer,
                state: Mutex::new(State::default()),
                renewal_gate: Mutex::new(()),
                snapshot,
                events,
            }),
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    #[must_use]
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.snapshot.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.inner.snapshot.borrow().phase
    }

    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.inner.snapshot.borrow().session.clone()
    }

    #[must_use]
    pub fn policy(&self) -> RenewalPolicy {
        self.inner.policy
    }

    /// Make a freshly issued session current, persist it and arm renewal.
    ///
    /// Any previous renewal task is cancelled first.
    ///
    /// # Errors
    ///
    /// Returns `SessionManagerError::Storage` if the session cannot be persisted;
    /// the manager is then logged out.
    pub async fn login(&self, session: Session) -> Result<(), SessionManagerError> {
        let inner = &self.inner;
        let mut state = inner.state.lock().await;
        state.cancel_task();
        state.epoch += 1;

        if let Err(err) = inner.sessions.save_session(&session).await {
            warn!(error = %err, "failed to persist session; staying logged out");
            state.current = None;
            state.phase = SessionPhase::LoggedOut;
            inner.publish(&state);
            return Err(err.into());
        }

        let user_id = session.user_id();
        state.current = Some(session);
        state.phase = SessionPhase::Active;
        inner.arm(&mut state);
        inner.publish(&state);
        drop(state);

        info!(%user_id, "session started");
        inner.emit(SessionEvent::LoggedIn { user_id });
        Ok(())
    }

    /// Cancel renewal, erase the persisted session and clear the current one.
    ///
    /// Calling this while already logged out only re-erases storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionManagerError::Storage` if the persisted session cannot be
    /// erased. The in-memory session is cleared regardless.
    pub async fn logout(&self) -> Result<(), SessionManagerError> {
        let mut state = self.inner.state.lock().await;
        let had_session = state.current.is_some();
        let erased = self.inner.end_session(&mut state).await;
        drop(state);

        if had_session {
            info!("session ended");
            self.inner.emit(SessionEvent::LoggedOut);
        }
        erased.map_err(Into::into)
    }

    /// Restore a persisted session on startup, validate it with one immediate
    /// renewal and arm the renewal timer.
    ///
    /// A malformed persisted session is erased and treated as no session.
    ///
    /// # Errors
    ///
    /// Returns `SessionManagerError::Storage` if storage cannot be read.
    pub async fn restore(&self) -> Result<RestoreOutcome, SessionManagerError> {
        let inner = &self.inner;
        let persisted = match inner.sessions.load_session().await {
            Ok(persisted) => persisted,
            Err(StorageError::MalformedRecord(reason)) => {
                warn!(%reason, "discarding malformed persisted session");
                if let Err(err) = inner.sessions.clear_session().await {
                    warn!(error = %err, "failed to erase malformed session");
                }
                None
            }
            Err(err) => return Err(err.into()),
        };

        let Some(session) = persisted else {
            debug!("no persisted session");
            return Ok(RestoreOutcome::NoSession);
        };

        {
            let mut state = inner.state.lock().await;
            state.cancel_task();
            state.epoch += 1;
            state.current = Some(session);
            state.phase = SessionPhase::Active;
            inner.publish(&state);
        }

        let outcome = match inner.renew_once(RenewalOrigin::Restore).await {
            RenewOutcome::Renewed(session) => {
                info!(user_id = %session.user_id(), "session restored");
                inner.emit(SessionEvent::Restored {
                    user_id: session.user_id(),
                });
                RestoreOutcome::Restored(session)
            }
            RenewOutcome::LoggedOut => RestoreOutcome::Expired,
            RenewOutcome::Superseded | RenewOutcome::NoSession => {
                self.current().map_or(RestoreOutcome::NoSession, RestoreOutcome::Restored)
            }
        };
        Ok(outcome)
    }

    /// Renew the access token now. Waits for any renewal already in flight.
    ///
    /// On failure the session is logged out and `SessionEvent::ForcedLogout` is
    /// emitted.
    pub async fn renew(&self) -> RenewOutcome {
        self.inner.renew_once(RenewalOrigin::Manual).await
    }

    /// Stop the renewal timer for process teardown. The persisted session is kept.
    pub async fn shutdown(&self) {
        let mut state = self.inner.state.lock().await;
        state.cancel_task();
        state.epoch += 1;
        if state.current.is_some() {
            state.phase = SessionPhase::Active;
        }
        self.inner.publish(&state);
    }

    /// Refresh token the armed renewal task is bound to, if one is armed.
    pub async fn renewal_binding(&self) -> Option<RefreshToken> {
        let state = self.inner.state.lock().await;
        state
            .task
            .as_ref()
            .filter(|task| !task.is_finished())
            .map(|task| task.refresh_token().clone())
    }
}

impl Inner {
    fn publish(&self, state: &State) {
        self.snapshot.send_replace(SessionSnapshot {
            phase: state.phase,
            session: state.current.clone(),
        });
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Clear the session in memory, then in storage. Returns the storage result.
    async fn end_session(&self, state: &mut State) -> Result<(), StorageError> {
        state.cancel_task();
        state.epoch += 1;
        state.current = None;
        state.phase = SessionPhase::LoggedOut;
        self.publish(state);
        self.sessions.clear_session().await
    }

    fn arm(self: &Arc<Self>, state: &mut State) {
        state.cancel_task();
        let Some(session) = state.current.as_ref() else {
            return;
        };

        let epoch = state.epoch;
        let weak: Weak<Inner> = Arc::downgrade(self);
        let task = RenewalTask::spawn(
            epoch,
            session.refresh_token().clone(),
            self.policy.interval(),
            move || {
                let weak = weak.clone();
                async move {
                    let Some(inner) = weak.upgrade() else {
                        return TickOutcome::Stop;
                    };
                    match inner.renew_once(RenewalOrigin::Scheduled { epoch }).await {
                        RenewOutcome::Renewed(_) => TickOutcome::Continue,
                        _ => TickOutcome::Stop,
                    }
                }
            },
        );
        state.task = Some(task);
    }

    async fn renew_once(self: &Arc<Self>, origin: RenewalOrigin) -> RenewOutcome {
        let _gate = self.renewal_gate.lock().await;

        let (epoch, refresh) = {
            let mut state = self.state.lock().await;
            if let RenewalOrigin::Scheduled { epoch } = origin {
                if state.epoch != epoch {
                    return RenewOutcome::Superseded;
                }
            }
            let Some(session) = state.current.as_ref() else {
                return RenewOutcome::NoSession;
            };
            let refresh = session.refresh_token().clone();
            state.phase = SessionPhase::Renewing;
            self.publish(&state);
            (state.epoch, refresh)
        };

        let result = self.renewer.renew(&refresh).await;

        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            debug!("discarding renewal result for a superseded session");
            return RenewOutcome::Superseded;
        }

        match result {
            Ok(access) => {
                let Some(session) = state.current.take() else {
                    return RenewOutcome::NoSession;
                };
                let hint = self.clock.expiry_after(self.policy.access_ttl());
                let renewed = session.with_renewed_access(access, hint);
                state.current = Some(renewed.clone());
                state.phase = SessionPhase::Active;
                if origin == RenewalOrigin::Restore {
                    self.arm(&mut state);
                }
                self.publish(&state);

                if let Err(err) = self.sessions.save_session(&renewed).await {
                    warn!(error = %err, "failed to persist renewed access token");
                }
                drop(state);

                debug!(user_id = %renewed.user_id(), "access token renewed");
                self.emit(SessionEvent::Renewed {
                    user_id: renewed.user_id(),
                });
                RenewOutcome::Renewed(renewed)
            }
            Err(err) => {
                warn!(error = %err, "token renewal failed; forcing logout");
                if matches!(origin, RenewalOrigin::Scheduled { .. }) {
                    // This very task is running; let it return instead of aborting it.
                    drop(state.task.take());
                }
                if let Err(storage_err) = self.end_session(&mut state).await {
                    warn!(error = %storage_err, "failed to erase session after renewal failure");
                }
                drop(state);

                self.emit(SessionEvent::ForcedLogout {
                    reason: err.to_string(),
                });
                RenewOutcome::LoggedOut
            }
        }
    }
}
