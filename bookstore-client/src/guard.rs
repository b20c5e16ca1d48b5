// bookstore-client/src/guard.rs
// 路由守卫 - 受保护页面的会话校验

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use shared::models::UserProfile;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::services::AuthService;

/// Resolution of a protected-route entry
#[derive(Debug, Clone, PartialEq)]
pub enum GuardState {
    /// Validation in flight; show a loading affordance
    Pending,
    Authenticated(UserProfile),
    /// Redirect to `redirect_to`, returning to `from` after login
    Unauthenticated { redirect_to: String, from: String },
}

impl GuardState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, GuardState::Authenticated(_))
    }
}

/// Gate for the main application shell
///
/// Validates the local session against the backend. When the validation
/// endpoint is unavailable the local session is trusted instead.
#[derive(Debug)]
pub struct RouteGuard {
    auth: AuthService,
    login_route: String,
    target: Mutex<String>,
    state: watch::Sender<GuardState>,
}

impl RouteGuard {
    pub fn new(auth: AuthService, login_route: impl Into<String>) -> Self {
        let (state, _) = watch::channel(GuardState::Pending);
        Self {
            auth,
            login_route: login_route.into(),
            target: Mutex::new("/".to_string()),
            state,
        }
    }

    /// Latest resolution, updated by every check
    pub fn state(&self) -> watch::Receiver<GuardState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> GuardState {
        self.state.borrow().clone()
    }

    /// Resolve an entry into the protected view at `target`
    pub async fn check(&self, target: &str) -> GuardState {
        *self.target.lock() = target.to_string();
        self.state.send_replace(GuardState::Pending);

        let resolved = self.resolve(target).await;
        tracing::debug!(path = target, authenticated = resolved.is_authenticated(), "Route guard resolved");
        self.state.send_replace(resolved.clone());
        resolved
    }

    async fn resolve(&self, target: &str) -> GuardState {
        if !self.auth.is_authenticated() {
            return self.unauthenticated(target);
        }

        match self.auth.validate_session().await {
            Ok(true) => self.local_user(target),
            Ok(false) => {
                tracing::info!(path = target, "Session rejected by backend");
                self.unauthenticated(target)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session validation unavailable, trusting local session");
                self.local_user(target)
            }
        }
    }

    fn local_user(&self, target: &str) -> GuardState {
        match self.auth.current_user() {
            Some(user) => GuardState::Authenticated(user),
            None => self.unauthenticated(target),
        }
    }

    fn unauthenticated(&self, target: &str) -> GuardState {
        GuardState::Unauthenticated {
            redirect_to: self.login_route.clone(),
            from: target.to_string(),
        }
    }

    /// Re-check the last target on every session change
    ///
    /// The task ends once the guard is dropped.
    pub fn spawn_watcher(self: &Arc<Self>) -> JoinHandle<()> {
        let mut rx = self.auth.session().subscribe();
        let guard: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        let Some(guard) = guard.upgrade() else {
                            tracing::debug!("Route guard dropped, stopping watcher");
                            break;
                        };
                        let path = guard.target.lock().clone();
                        tracing::debug!(?event, %path, "Session changed, re-checking route");
                        guard.check(&path).await;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Route guard lagged behind session events");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
