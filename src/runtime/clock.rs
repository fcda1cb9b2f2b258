//! Instance clock: virtual for deterministic runs, wall for recordings.

use serde::{Deserialize, Serialize};

use std::time::{Duration, Instant, SystemTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockMode {
    Virtual,
    Wall,
}

impl clap::ValueEnum for ClockMode {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Virtual, Self::Wall]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Virtual => clap::builder::PossibleValue::new("virtual"),
            Self::Wall => clap::builder::PossibleValue::new("wall"),
        })
    }
}

/// Millisecond clock owned by one scenario instance.
///
/// In `Virtual` mode time only moves when the runtime advances it. In `Wall`
/// mode `now_ms` follows real elapsed time since the instance started and
/// `sleep_until` blocks the calling thread.
#[derive(Debug, Clone)]
pub struct InstanceClock {
    mode: ClockMode,
    now_ms: u64,
    origin: Instant,
}

impl InstanceClock {
    pub fn new(mode: ClockMode) -> Self {
        Self {
            mode,
            now_ms: 0,
            origin: Instant::now(),
        }
    }

    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    pub fn now_ms(&self) -> u64 {
        match self.mode {
            ClockMode::Virtual => self.now_ms,
            ClockMode::Wall => whole_millis(self.origin.elapsed()).max(self.now_ms),
        }
    }

    /// Moves the clock to `at_ms`, never backwards.
    pub fn sleep_until(&mut self, at_ms: u64) {
        if self.mode == ClockMode::Wall {
            let now = self.now_ms();
            if at_ms > now {
                std::thread::sleep(Duration::from_millis(at_ms - now));
            }
        }
        self.now_ms = self.now_ms.max(at_ms);
    }
}

pub(crate) fn whole_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

pub fn wall_time_iso_utc() -> String {
    // Metadata only (startedAt/finishedAt); never feeds scenario decisions.
    let now = SystemTime::now();
    let dt: time::OffsetDateTime = now.into();
    dt.format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
