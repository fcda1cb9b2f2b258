//! Auth/session simulator: token presence drives authorized request outcomes.

use crate::{AuthBehavior, Behavior, Instance, Resume, Route, TimerId, Wakeup};

impl Instance {
    pub fn has_token(&self) -> bool {
        self.state.auth_token.is_some()
    }

    /// Sets a token; `expire_after_ms` schedules its removal.
    pub fn login(&mut self, expire_after_ms: Option<u64>) -> Option<TimerId> {
        self.state.memo.logins += 1;
        let token = format!("session-{}-{}", self.record().id, self.state.memo.logins);
        self.state.auth_token = Some(token);
        self.log_event("logged in");
        expire_after_ms.map(|ms| {
            let due = self.now_ms().saturating_add(ms);
            self.timers.schedule(due, "token_expiry", Wakeup::TokenExpired)
        })
    }

    pub fn logout(&mut self) {
        self.state.auth_token = None;
        self.log_event("logged out");
    }

    pub(crate) fn expire_token(&mut self) {
        if self.state.auth_token.take().is_some() {
            self.log_event("session expired");
        }
    }

    /// Issues the authorized request: 200 with a token, 401 without.
    /// `authed_status` overrides the status used when a token is present.
    pub fn attempt_authorized_action(&mut self, authed_status: u16) -> TimerId {
        let status = if self.has_token() { authed_status } else { 401 };
        self.state.loading = true;
        let latency = self.timings.request_ms;
        self.simulated_request(latency, status, Resume::AuthorizedResult)
    }

    /// Arms the restricted/login oscillation for the redirect-loop scenario.
    /// Any pending redirect is dropped first so only one is ever live.
    pub(crate) fn arm_redirect(&mut self) {
        if !matches!(self.record().behavior, Behavior::Auth(AuthBehavior::RedirectLoop)) {
            return;
        }
        if let Some(pending) = self.redirect_timer.take() {
            self.timers.cancel(pending);
        }
        let target = match self.state.route() {
            Route::Restricted if !self.has_token() => Route::Login,
            Route::Login => Route::Restricted,
            _ => return,
        };
        let due = self.now_ms().saturating_add(self.timings.redirect_ms);
        self.redirect_timer = Some(self.timers.schedule(due, "redirect", Wakeup::Redirect(target)));
    }
}
