use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use chrono::Utc;
use tokio::sync::watch;
use uuid::Uuid;

use crate::{
    config::{AppConfig, StaleRedirectPolicy},
    error::NavigationError,
    guard::{Guard, ROOT_PATH},
    models::{Decision, Notice, RouteMetadata, TransitionAttempt},
    notifier::NotifierState,
    routes::{RouteTable, normalize_path},
    session::SessionState,
};

/// PendingRedirect
///
/// Handle to a notice-bearing redirect that has been decided but not yet
/// applied. Cancelling it stops the redirect from firing; cancelling after it
/// fired is a no-op.
#[derive(Debug, Clone)]
pub struct PendingRedirect {
    id: Uuid,
    target: String,
    cancel: Arc<watch::Sender<bool>>,
}

impl PendingRedirect {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }
}

/// NavigationOutcome
///
/// What happened to one `navigate` call.
#[derive(Debug, Clone)]
pub enum NavigationOutcome {
    /// The visitor is now on `path`, possibly after immediate redirects.
    Arrived {
        path: String,
        screen: Option<String>,
        redirected_from: Option<String>,
    },
    /// A notice is showing and the redirect to `target` is pending.
    Deferred {
        target: String,
        notice: Notice,
        pending: PendingRedirect,
    },
}

#[derive(Debug)]
struct NavState {
    location: String,
    history: Vec<String>,
    pending: Vec<PendingRedirect>,
}

struct Inner {
    guard: Arc<Guard>,
    routes: Arc<RouteTable>,
    sessions: SessionState,
    notifier: NotifierState,
    stale_redirects: StaleRedirectPolicy,
    max_redirect_hops: usize,
    notice_duration: Duration,
    // Serializes navigation attempts.
    serial: Mutex<()>,
    state: Mutex<NavState>,
}

/// Navigator
///
/// The routing runtime that applies guard decisions. Every call to
/// `navigate` reads a fresh session, resolves the destination through the
/// route table, and asks the guard. Immediate redirects re-enter the guard;
/// notice-bearing redirects are shown through the notifier and applied after
/// the guard's delay on a spawned task, so `navigate` must run inside a tokio
/// runtime.
///
/// Cloning is cheap; clones drive the same navigation state.
#[derive(Clone)]
pub struct Navigator {
    inner: Arc<Inner>,
}

impl Navigator {
    pub fn new(
        guard: Arc<Guard>,
        routes: Arc<RouteTable>,
        sessions: SessionState,
        notifier: NotifierState,
        config: &AppConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                guard,
                routes,
                sessions,
                notifier,
                stale_redirects: config.stale_redirects,
                max_redirect_hops: config.max_redirect_hops,
                notice_duration: config.notice_duration,
                serial: Mutex::new(()),
                state: Mutex::new(NavState {
                    location: ROOT_PATH.to_string(),
                    history: Vec::new(),
                    pending: Vec::new(),
                }),
            }),
        }
    }

    pub fn location(&self) -> String {
        self.state().location.clone()
    }

    /// Every location arrived at, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.state().history.clone()
    }

    pub fn pending_redirects(&self) -> Vec<PendingRedirect> {
        self.state().pending.clone()
    }

    /// navigate
    ///
    /// Runs one navigation attempt to completion or deferral. Under
    /// `StaleRedirectPolicy::Cancel` any redirect still pending from an
    /// earlier attempt is cancelled first.
    pub fn navigate(&self, to: &str) -> Result<NavigationOutcome, NavigationError> {
        let _serial = self.inner.serial.lock().unwrap_or_else(PoisonError::into_inner);
        let span = tracing::debug_span!("navigate", attempt = %Uuid::new_v4(), to = %to);
        let _entered = span.enter();

        if self.inner.stale_redirects == StaleRedirectPolicy::Cancel {
            self.cancel_pending();
        }

        let requested = normalize_path(to);
        let origin = self.location();
        let mut target = requested.clone();

        for _ in 0..=self.inner.max_redirect_hops {
            let (path, meta, screen) = match self.inner.routes.resolve(&target) {
                Some(resolved) => (resolved.path, resolved.entry.meta, resolved.entry.screen.clone()),
                None => (normalize_path(&target), RouteMetadata::default(), None),
            };

            let attempt = TransitionAttempt::new(path.clone(), meta, origin.clone());
            let session = self.inner.sessions.read();

            match self.inner.guard.evaluate(&attempt, &session) {
                Decision::Proceed => {
                    self.arrive(&path);
                    let redirected_from = (path != requested).then(|| requested.clone());
                    return Ok(NavigationOutcome::Arrived {
                        path,
                        screen,
                        redirected_from,
                    });
                }
                Decision::RedirectTo { path: next } => {
                    tracing::debug!(from = %path, to = %next, "immediate redirect");
                    target = next;
                }
                Decision::RedirectToAfterNotice {
                    path: next,
                    message,
                    severity,
                    delay_ms,
                } => {
                    tracing::debug!(denied = %path, redirect = %next, ?severity, "navigation denied");
                    let notice = Notice {
                        message,
                        severity,
                        duration_ms: u64::try_from(self.inner.notice_duration.as_millis())
                            .unwrap_or(u64::MAX),
                        issued_at: Utc::now(),
                    };
                    self.inner.notifier.notify(&notice);
                    let pending = self.schedule(next.clone(), Duration::from_millis(delay_ms));
                    return Ok(NavigationOutcome::Deferred {
                        target: next,
                        notice,
                        pending,
                    });
                }
            }
        }

        Err(NavigationError::RedirectLoop {
            path: requested,
            hops: self.inner.max_redirect_hops,
        })
    }

    /// Cancels every pending redirect and forgets it.
    pub fn cancel_pending(&self) {
        let cancelled: Vec<PendingRedirect> = self.state().pending.drain(..).collect();
        for pending in &cancelled {
            pending.cancel();
            tracing::debug!(target_path = %pending.target, "pending redirect cancelled");
        }
    }

    fn schedule(&self, target: String, delay: Duration) -> PendingRedirect {
        let (tx, mut rx) = watch::channel(false);
        let pending = PendingRedirect {
            id: Uuid::new_v4(),
            target,
            cancel: Arc::new(tx),
        };
        self.state().pending.push(pending.clone());

        let navigator = self.clone();
        let id = pending.id;
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => navigator.fire(id),
                _ = rx.wait_for(|cancelled| *cancelled) => {}
            }
        });

        pending
    }

    fn fire(&self, id: Uuid) {
        let target = {
            let mut state = self.state();
            let Some(pos) = state.pending.iter().position(|p| p.id == id) else {
                return;
            };
            let pending = state.pending.remove(pos);
            if pending.is_cancelled() {
                return;
            }
            pending.target
        };

        tracing::info!(target_path = %target, "applying deferred redirect");
        if let Err(e) = self.navigate(&target) {
            tracing::warn!(error = %e, "deferred redirect failed");
        }
    }

    fn arrive(&self, path: &str) {
        let mut state = self.state();
        state.location = path.to_string();
        state.history.push(path.to_string());
    }

    fn state(&self) -> MutexGuard<'_, NavState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
