//! Single-slot toast with self-scheduled dismissal.
//!
//! `show` replaces whatever is in the slot and cancels its dismissal timer.
//! Repeated calls are not deduplicated.

use crate::{Instance, Toast, ToastKind, TimerId, Wakeup};

impl Instance {
    pub fn show_toast(&mut self, kind: ToastKind, message: impl Into<String>, duration_ms: u64) -> TimerId {
        if let Some(previous) = self.state.toast.take() {
            self.timers.cancel(previous.timer);
        }
        let message = message.into();
        let expires_at_ms = self.now_ms().saturating_add(duration_ms);
        let timer = self.timers.schedule(expires_at_ms, "toast", Wakeup::ToastExpired);
        self.note(
            "toast",
            crate::fields!("kind" => format!("{kind:?}"), "message" => message.clone(), "durationMs" => duration_ms),
        );
        self.state.toast = Some(Toast {
            kind,
            message,
            expires_at_ms,
            timer,
        });
        timer
    }

    pub fn show_default_toast(&mut self, kind: ToastKind, message: impl Into<String>) -> TimerId {
        let duration = self.timings.toast_ms;
        self.show_toast(kind, message, duration)
    }

    /// Clears the toast if `timer` still owns the slot.
    pub(crate) fn expire_toast(&mut self, timer: TimerId) -> bool {
        match &self.state.toast {
            Some(toast) if toast.timer == timer => {
                self.state.toast = None;
                self.note("toast_dismissed", crate::fields!());
                true
            }
            _ => false,
        }
    }
}
