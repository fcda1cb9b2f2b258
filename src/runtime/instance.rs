//! A live scenario instance: the single owner of one `SessionState`, its
//! timer queue and its clock. Every handler and timer callback receives the
//! instance explicitly; dropping it drops every outstanding timer.

use rand_chacha::ChaCha20Rng;
use rand_core::RngCore as _;
use serde::Serialize;

use std::time::Duration;

use crate::{
    Action, Config, Input, InstanceClock, PushMode, RequestOutcome, Route, ScenarioRecord,
    SessionState, Tab, Timeline, TimelineEntry, TimerId, TimerQueue, Timings, dispatch,
    seeded_rng,
};

/// What a timer carries back into the instance when it falls due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wakeup {
    ToastExpired,
    TokenExpired,
    Redirect(Route),
    Response {
        then: Resume,
        outcome: RequestOutcome,
    },
    Delay(Resume),
}

/// Scenario continuations resumed after a suspension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resume {
    PayloadCrash,
    ConfirmSave,
    DiscardRecords,
    WriteCounter { value: i64 },
    FillTab { tab: Tab },
    Hang,
    AuthorizedResult,
    ReportOutcome,
    RepeatToast { message: String },
    Loaded,
    EscalatedIncrement,
    QueueJob,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSnapshot {
    pub scenario_id: String,
    pub title: String,
    pub now_ms: u64,
    pub elapsed_ms: u64,
    pub route: Route,
    pub palette: [String; 2],
    pub pending_timers: usize,
    pub pending_suspensions: usize,
    pub state: SessionState,
}

/// Upper bound on timers fired at a single instant within one `advance`.
pub const MAX_FIRINGS_PER_INSTANT: usize = 1_000;

#[derive(Debug)]
pub struct Instance {
    record: &'static ScenarioRecord,
    pub(crate) state: SessionState,
    pub(crate) timers: TimerQueue<Wakeup>,
    pub(crate) clock: InstanceClock,
    pub(crate) timings: Timings,
    pub(crate) rng: ChaCha20Rng,
    pub(crate) redirect_timer: Option<TimerId>,
    timeline: Timeline,
}

impl Instance {
    /// Creates fresh state for `record` and runs its entry hook.
    pub fn start(record: &'static ScenarioRecord, config: &Config) -> Self {
        let clock = InstanceClock::new(config.clock);
        let origin = clock.now_ms();
        let mut instance = Self {
            record,
            state: SessionState::new(record.id, origin),
            timers: TimerQueue::new(config.schedule, config.seed),
            clock,
            timings: config.timings.clone().sanitized(),
            rng: seeded_rng(config.seed, record.id),
            redirect_timer: None,
            timeline: Timeline::default(),
        };
        instance.note("select", crate::fields!("scenario" => record.id));
        dispatch::on_enter(&mut instance);
        instance
    }

    pub fn record(&self) -> &'static ScenarioRecord {
        self.record
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.now_ms().saturating_sub(self.state.elapsed_timer_origin)
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn pending_suspensions(&self) -> usize {
        self.timers.parked_len()
    }

    pub fn timeline(&self) -> &[TimelineEntry] {
        self.timeline.entries()
    }

    pub fn trigger(&mut self, action: Action) {
        self.note("dispatch", crate::fields!("action" => action.as_str()));
        dispatch::on_action(self, action);
    }

    pub fn input(&mut self, input: Input) {
        self.note("input", crate::fields!("input" => serde_json::to_value(&input).unwrap_or_default()));
        dispatch::on_input(self, input);
    }

    /// Runs every timer already due. Returns how many fired.
    pub fn run_due(&mut self) -> usize {
        let mut fired = 0usize;
        while let Some(item) = self.timers.pop_due(self.now_ms()) {
            self.fire(item.id, item.label, item.payload);
            fired += 1;
        }
        fired
    }

    /// Moves time forward by `d`, firing timers in due order on the way.
    /// At most [`MAX_FIRINGS_PER_INSTANT`] timers fire at one instant; the
    /// rest stay queued for the next call.
    pub fn advance(&mut self, d: Duration) -> usize {
        let target = self.now_ms().saturating_add(crate::clock::whole_millis(d));
        let mut fired = 0usize;
        let mut instant = (self.now_ms(), 0usize);
        while let Some(due) = self.timers.next_due().filter(|due| *due <= target) {
            self.clock.sleep_until(due);
            let now = self.now_ms();
            if instant.0 != now {
                instant = (now, 0);
            }
            if instant.1 >= MAX_FIRINGS_PER_INSTANT {
                tracing::warn!(
                    scenario = self.record.id,
                    at_ms = now,
                    "timers keep re-arming at the same instant; leaving them queued"
                );
                self.note("stalled", crate::fields!("atMs" => now, "pending" => self.timers.len()));
                return fired;
            }
            if let Some(item) = self.timers.pop_due(now) {
                self.fire(item.id, item.label, item.payload);
                fired += 1;
                instant.1 += 1;
            }
        }
        self.clock.sleep_until(target);
        fired
    }

    /// Cancels every timer and pending suspension owned by this instance.
    pub fn teardown(&mut self) -> usize {
        let cancelled = self.timers.cancel_all();
        self.redirect_timer = None;
        self.note("teardown", crate::fields!("cancelled" => cancelled));
        tracing::info!(scenario = self.record.id, cancelled, "scenario instance torn down");
        cancelled
    }

    pub fn snapshot(&self) -> ScenarioSnapshot {
        let (fg, bg) = self.state.palette();
        ScenarioSnapshot {
            scenario_id: self.record.id.to_string(),
            title: self.record.title.to_string(),
            now_ms: self.now_ms(),
            elapsed_ms: self.elapsed_ms(),
            route: self.state.route(),
            palette: [fg.to_string(), bg.to_string()],
            pending_timers: self.pending_timers(),
            pending_suspensions: self.pending_suspensions(),
            state: self.state.clone(),
        }
    }

    pub(crate) fn note(&mut self, name: &str, fields: serde_json::Map<String, serde_json::Value>) {
        let now = self.now_ms();
        self.timeline.push(now, name, fields);
    }

    /// Appends to the visible event log and the timeline.
    pub(crate) fn log_event(&mut self, event: impl Into<String>) {
        let event = event.into();
        self.note("event", crate::fields!("message" => event.clone()));
        self.state.log(event);
    }

    /// Pushes a route and lets route-entry hooks react.
    pub(crate) fn navigate(&mut self, route: Route, mode: PushMode) {
        self.state.route_history.push(route, mode);
        self.note("navigate", crate::fields!("route" => route.as_str()));
        self.log_event(format!("navigated to {route}"));
        dispatch::on_route_entered(self);
    }

    pub(crate) fn go_back(&mut self) -> bool {
        let moved = self.state.route_history.back();
        if moved {
            let route = self.state.route();
            self.note("back", crate::fields!("route" => route.as_str()));
            self.log_event(format!("back to {route}"));
            dispatch::on_route_entered(self);
        }
        moved
    }

    /// Uniform draw in `lo..=hi` from the instance RNG.
    pub(crate) fn jitter_ms(&mut self, lo: u64, hi: u64) -> u64 {
        if hi <= lo {
            return lo;
        }
        lo + self.rng.next_u64() % (hi - lo + 1)
    }

    fn fire(&mut self, id: TimerId, label: String, wakeup: Wakeup) {
        tracing::debug!(scenario = self.record.id, timer = id.0, %label, "timer fired");
        self.note("timer", crate::fields!("id" => id.0, "label" => label));
        dispatch::on_wakeup(self, id, wakeup);
    }
}
