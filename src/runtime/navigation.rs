//! Virtual route history with push/back semantics.
//!
//! The history is never empty and its last entry is always the current
//! route. Entries are only removed by [`NavigationHistory::back`], except in
//! [`PushMode::ResetOnDetails`] where pushing `details` discards everything
//! before it.

use serde::{Deserialize, Serialize};

use crate::{HarnessError, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushMode {
    Append,
    /// Broken back-button mode: `push(details)` leaves `[details]`.
    ResetOnDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Route>", into = "Vec<Route>")]
pub struct NavigationHistory {
    entries: Vec<Route>,
}

impl NavigationHistory {
    pub fn new(start: Route) -> Self {
        Self {
            entries: vec![start],
        }
    }

    pub fn current(&self) -> Route {
        // Non-empty by construction.
        self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[Route] {
        &self.entries
    }

    pub fn push(&mut self, route: Route, mode: PushMode) {
        match mode {
            PushMode::ResetOnDetails if route == Route::Details => {
                self.entries.clear();
                self.entries.push(route);
            }
            _ => self.entries.push(route),
        }
    }

    /// Pops one entry when more than one exists; returns whether it moved.
    pub fn back(&mut self) -> bool {
        if self.entries.len() > 1 {
            self.entries.pop();
            true
        } else {
            false
        }
    }
}

impl TryFrom<Vec<Route>> for NavigationHistory {
    type Error = HarnessError;

    fn try_from(entries: Vec<Route>) -> Result<Self, Self::Error> {
        if entries.is_empty() {
            return Err(HarnessError::InvalidArgument(
                "route history must contain at least one route".to_string(),
            ));
        }
        Ok(Self { entries })
    }
}

impl From<NavigationHistory> for Vec<Route> {
    fn from(history: NavigationHistory) -> Self {
        history.entries
    }
}
