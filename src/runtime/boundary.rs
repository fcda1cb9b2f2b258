//! Crash recovery boundary around one scenario instance.
//!
//! `Running` owns the instance; the first panic raised through [`CrashBoundary::guard`]
//! logs the fault, tears the instance down and moves to `Faulted` for good.

use serde::{Deserialize, Serialize};

use std::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::{Config, HarnessError, HarnessResult, Instance, ScenarioRecord, TimelineEntry};

thread_local! {
    static GUARD_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// True while the current thread is running code under a crash boundary.
/// Panic hooks use this to tell scripted faults from harness bugs.
pub fn inside_crash_boundary() -> bool {
    GUARD_DEPTH.with(|depth| depth.get() > 0)
}

fn catch_fault<R>(f: impl FnOnce() -> R) -> std::thread::Result<R> {
    GUARD_DEPTH.with(|depth| depth.set(depth.get() + 1));
    let out = catch_unwind(AssertUnwindSafe(f));
    GUARD_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    out
}

/// One caught fault, as emitted to the observability sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaultRecord {
    pub scenario_id: String,
    pub fault_message: String,
    pub time_ms: u64,
}

#[derive(Debug)]
pub enum CrashBoundary {
    Running(Box<Instance>),
    Faulted {
        fault: FaultRecord,
        timeline: Vec<TimelineEntry>,
    },
}

impl CrashBoundary {
    /// Starts `record` under the boundary. A fault in the entry hook lands
    /// directly in `Faulted`.
    pub fn launch(record: &'static ScenarioRecord, config: &Config) -> Self {
        match catch_fault(|| Instance::start(record, config)) {
            Ok(instance) => Self::Running(Box::new(instance)),
            Err(payload) => {
                let fault = FaultRecord {
                    scenario_id: record.id.to_string(),
                    fault_message: panic_message(payload.as_ref()),
                    time_ms: 0,
                };
                log_fault(&fault);
                Self::Faulted {
                    fault,
                    timeline: Vec::new(),
                }
            }
        }
    }

    /// Runs `f` against the live instance. `Ok(None)` means `f` faulted and
    /// the boundary is now `Faulted`.
    pub fn guard<R>(&mut self, f: impl FnOnce(&mut Instance) -> R) -> HarnessResult<Option<R>> {
        let Self::Running(instance) = self else {
            return Err(HarnessError::NoActiveScenario);
        };
        let payload = match catch_fault(|| f(instance.as_mut())) {
            Ok(value) => return Ok(Some(value)),
            Err(payload) => payload,
        };

        let fault = FaultRecord {
            scenario_id: instance.record().id.to_string(),
            fault_message: panic_message(payload.as_ref()),
            time_ms: instance.elapsed_ms(),
        };
        log_fault(&fault);
        instance.teardown();
        let timeline = instance.timeline().to_vec();
        *self = Self::Faulted { fault, timeline };
        Ok(None)
    }

    pub fn instance(&self) -> Option<&Instance> {
        match self {
            Self::Running(instance) => Some(instance.as_ref()),
            Self::Faulted { .. } => None,
        }
    }

    pub fn fault(&self) -> Option<&FaultRecord> {
        match self {
            Self::Running(_) => None,
            Self::Faulted { fault, .. } => Some(fault),
        }
    }

    pub fn is_faulted(&self) -> bool {
        matches!(self, Self::Faulted { .. })
    }

    pub fn timeline(&self) -> &[TimelineEntry] {
        match self {
            Self::Running(instance) => instance.timeline(),
            Self::Faulted { timeline, .. } => timeline,
        }
    }

    /// Cancels everything the live instance still has scheduled.
    pub fn teardown(&mut self) -> usize {
        match self {
            Self::Running(instance) => instance.teardown(),
            Self::Faulted { .. } => 0,
        }
    }

    /// Tears the instance down and hands back its final timeline,
    /// teardown entry included.
    pub fn close(mut self) -> Vec<TimelineEntry> {
        self.teardown();
        match self {
            Self::Running(instance) => instance.timeline().to_vec(),
            Self::Faulted { timeline, .. } => timeline,
        }
    }
}

fn log_fault(fault: &FaultRecord) {
    tracing::error!(
        scenario_id = %fault.scenario_id,
        fault_message = %fault.fault_message,
        time_ms = fault.time_ms,
        "scenario faulted"
    );
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown fault".to_string()
    }
}
