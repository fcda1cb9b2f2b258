//! Deterministic timer queue owned by a scenario instance.

use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore as _, SeedableRng as _};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerMode {
    Fifo,
    Random,
}

impl clap::ValueEnum for SchedulerMode {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Fifo, Self::Random]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Fifo => clap::builder::PossibleValue::new("fifo"),
            Self::Random => clap::builder::PossibleValue::new("random"),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

#[derive(Debug, Clone)]
pub struct ScheduledItem<T> {
    pub id: TimerId,
    pub due_ms: u64,
    pub label: String,
    pub payload: T,
}

/// Timers ordered by due time, then by registration order (or by a seeded
/// pick among equals in `Random` mode). Parked entries never fall due; they
/// model suspensions that are never resumed and exist only to be cancelled.
#[derive(Debug)]
pub struct TimerQueue<T> {
    mode: SchedulerMode,
    timers: Vec<ScheduledItem<T>>,
    parked: Vec<ScheduledItem<T>>,
    next_id: u64,
    rng: ChaCha20Rng,
}

pub fn seeded_rng(seed: u64, salt: &str) -> ChaCha20Rng {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&seed.to_le_bytes());
    hasher.update(salt.as_bytes());
    let seed32: [u8; 32] = *hasher.finalize().as_bytes();
    ChaCha20Rng::from_seed(seed32)
}

impl<T> TimerQueue<T> {
    pub fn new(mode: SchedulerMode, seed: u64) -> Self {
        Self {
            mode,
            timers: Vec::new(),
            parked: Vec::new(),
            next_id: 1,
            rng: seeded_rng(seed, "timer-queue"),
        }
    }

    fn alloc_id(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    pub fn schedule(&mut self, due_ms: u64, label: impl Into<String>, payload: T) -> TimerId {
        let id = self.alloc_id();
        self.timers.push(ScheduledItem {
            id,
            due_ms,
            label: label.into(),
            payload,
        });
        id
    }

    pub fn park(&mut self, label: impl Into<String>, payload: T) -> TimerId {
        let id = self.alloc_id();
        self.parked.push(ScheduledItem {
            id,
            due_ms: u64::MAX,
            label: label.into(),
            payload,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len() + self.parked.len();
        self.timers.retain(|t| t.id != id);
        self.parked.retain(|t| t.id != id);
        before != self.timers.len() + self.parked.len()
    }

    /// Drops every timer and parked suspension; returns how many were live.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.timers.len() + self.parked.len();
        self.timers.clear();
        self.parked.clear();
        n
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.timers.iter().chain(self.parked.iter()).any(|t| t.id == id)
    }

    pub fn next_due(&self) -> Option<u64> {
        self.timers.iter().map(|t| t.due_ms).min()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn parked_len(&self) -> usize {
        self.parked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty() && self.parked.is_empty()
    }

    /// Removes the next timer due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<ScheduledItem<T>> {
        let due = self.next_due().filter(|d| *d <= now_ms)?;
        let mut tied: Vec<usize> = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms == due)
            .map(|(idx, _)| idx)
            .collect();
        tied.sort_by_key(|idx| self.timers[*idx].id);
        let pick = match self.mode {
            SchedulerMode::Fifo => 0usize,
            SchedulerMode::Random => (self.rng.next_u64() as usize) % tied.len(),
        };
        Some(self.timers.remove(tied[pick]))
    }
}
