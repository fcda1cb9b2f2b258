//! Fault-injection primitives: delay, simulated request, CPU burn.
//!
//! Suspensions are registered on the instance timer queue and resume the
//! scenario through a [`Resume`] continuation; nothing here blocks except
//! [`burn_cpu`], which is bounded by its iteration count.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Instance, Resume, TimerId, Wakeup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("request failed with status {status}")]
pub struct HttpError {
    pub status: u16,
}

pub type RequestOutcome = Result<HttpResponse, HttpError>;

/// Scripted outcome of a request: statuses below 400 succeed, everything
/// else fails with the same status.
pub fn request_outcome(status: u16) -> RequestOutcome {
    if status < 400 {
        Ok(HttpResponse { status })
    } else {
        Err(HttpError { status })
    }
}

/// Burns `iterations` steps of floating-point work on the calling thread.
pub fn burn_cpu(iterations: u64) -> f64 {
    let mut acc = 0.0f64;
    for i in 0..iterations {
        let x = i as f64;
        acc += (x.sqrt() * 1.000_001).sin().abs();
    }
    std::hint::black_box(acc)
}

impl Instance {
    /// Resumes `then` once `ms` milliseconds have passed.
    pub fn delay(&mut self, ms: u64, then: Resume) -> TimerId {
        let due = self.now_ms().saturating_add(ms);
        tracing::debug!(scenario = self.record().id, ms, ?then, "delay");
        self.timers.schedule(due, "delay", Wakeup::Delay(then))
    }

    /// Resumes `then` with the scripted outcome for `status` after `ms`.
    pub fn simulated_request(&mut self, ms: u64, status: u16, then: Resume) -> TimerId {
        let due = self.now_ms().saturating_add(ms);
        tracing::debug!(scenario = self.record().id, ms, status, ?then, "simulated request");
        self.note("request", crate::fields!("status" => status, "latencyMs" => ms));
        self.timers.schedule(
            due,
            "request",
            Wakeup::Response {
                then,
                outcome: request_outcome(status),
            },
        )
    }

    /// A suspension that is never resumed; only teardown removes it.
    pub fn suspend_forever(&mut self, then: Resume) -> TimerId {
        self.note("suspend_forever", crate::fields!("resume" => format!("{then:?}")));
        self.timers.park("suspend_forever", Wakeup::Delay(then))
    }
}
