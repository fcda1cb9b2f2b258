//! Behavior descriptors: one tagged variant per category, parameterized by
//! the scenario-specific details the dispatcher needs.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::{Category, HarnessError, Route, Tab, VisualFlag};

/// Named, parameterless triggers exposed to the recording surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Primary,
    EntryA,
    EntryB,
    Login,
    Logout,
    Back,
    ToggleCheckbox,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::Primary,
        Action::EntryA,
        Action::EntryB,
        Action::Login,
        Action::Logout,
        Action::Back,
        Action::ToggleCheckbox,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::EntryA => "entry_a",
            Self::EntryB => "entry_b",
            Self::Login => "login",
            Self::Logout => "logout",
            Self::Back => "back",
            Self::ToggleCheckbox => "toggle_checkbox",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| {
                HarnessError::InvalidArgument(format!(
                    "unknown action {s:?} (expected one of: {})",
                    Self::ALL.map(Action::as_str).join(", ")
                ))
            })
    }
}

/// Form edits. These are not dispatched as actions, but some scenarios react
/// to them (input lag, tab-dependent data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Input {
    Text { value: String },
    Checkbox { checked: bool },
    Tab { tab: Tab },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CrashBehavior {
    Immediate { message: &'static str },
    OnNonEmptyInput,
    OnRoute { route: Route, message: &'static str },
    AfterFetch { message: &'static str },
    OnTabWhenAuthed { tab: Tab, message: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoResponseBehavior {
    Inert,
    FakeSuccess { message: &'static str },
    RequiresCheckbox,
    BlockedByOverlay,
    WedgedLatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UiIssueBehavior {
    Toggle { flag: VisualFlag },
    Escalating { flags: &'static [VisualFlag] },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataWrongBehavior {
    CounterOnly,
    UnreflectedFetch { records: u32 },
    Mismatched { counter_step: i64, item_step: usize },
    LostUpdate { min_jitter_ms: u64, max_jitter_ms: u64 },
    StaleTab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlowNavBehavior {
    Stuck,
    NotFound,
    EndlessWait,
    HistoryReset,
    DoublePush,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthBehavior {
    Gate,
    ExpiringToken,
    ForbiddenAsUnknown,
    RedirectLoop,
    StickyLogout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorMessageBehavior {
    Swallowed { status: u16 },
    WrongClass { status: u16, message: &'static str },
    Duplicated { status: u16, gap_ms: u64 },
    Flash { status: u16, message: &'static str },
    StuckSpinner { status: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PerfBehavior {
    SlowLoad,
    InputLag,
    HugeList,
    Escalating,
    Serialized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "category", content = "behavior", rename_all = "snake_case")]
pub enum Behavior {
    Crash(CrashBehavior),
    NoResponse(NoResponseBehavior),
    UiIssue(UiIssueBehavior),
    DataWrong(DataWrongBehavior),
    FlowNav(FlowNavBehavior),
    Auth(AuthBehavior),
    ErrorMessage(ErrorMessageBehavior),
    Perf(PerfBehavior),
}

impl Behavior {
    pub fn category(&self) -> Category {
        match self {
            Self::Crash(_) => Category::Crash,
            Self::NoResponse(_) => Category::NoResponse,
            Self::UiIssue(_) => Category::UiIssue,
            Self::DataWrong(_) => Category::DataWrong,
            Self::FlowNav(_) => Category::FlowNav,
            Self::Auth(_) => Category::Auth,
            Self::ErrorMessage(_) => Category::ErrorMessage,
            Self::Perf(_) => Category::Perf,
        }
    }

    /// Actions the recording surface should offer for this scenario.
    pub fn actions(&self) -> Vec<Action> {
        let mut out = vec![Action::Primary];
        match self {
            Self::Crash(CrashBehavior::OnTabWhenAuthed { .. }) => out.push(Action::Login),
            Self::NoResponse(NoResponseBehavior::RequiresCheckbox) => out.push(Action::ToggleCheckbox),
            Self::FlowNav(FlowNavBehavior::HistoryReset) => out.push(Action::Back),
            Self::FlowNav(FlowNavBehavior::DoublePush) => {
                out.extend([Action::EntryA, Action::EntryB, Action::Back]);
            }
            Self::Auth(AuthBehavior::Gate)
            | Self::Auth(AuthBehavior::ExpiringToken)
            | Self::Auth(AuthBehavior::ForbiddenAsUnknown)
            | Self::Auth(AuthBehavior::StickyLogout) => {
                out.extend([Action::Login, Action::Logout]);
            }
            Self::Crash(CrashBehavior::OnRoute { .. }) => out.push(Action::Back),
            _ => {}
        }
        out
    }
}
