//! Mutable view-state owned by the active scenario instance.

use serde::{Deserialize, Serialize};

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use crate::{HarnessError, NavigationHistory, TimerId};

pub const EVENT_LOG_CAPACITY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Home,
    Details,
    NotFound,
    Login,
    Restricted,
}

impl Route {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Details => "details",
            Self::NotFound => "not_found",
            Self::Login => "login",
            Self::Restricted => "restricted",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Route {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(Self::Home),
            "details" => Ok(Self::Details),
            "not_found" => Ok(Self::NotFound),
            "login" => Ok(Self::Login),
            "restricted" => Ok(Self::Restricted),
            other => Err(HarnessError::InvalidArgument(format!(
                "unknown route {other:?} (expected home|details|not_found|login|restricted)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Overview,
    Settings,
    Activity,
}

impl Tab {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Settings => "settings",
            Self::Activity => "activity",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overview" => Ok(Self::Overview),
            "settings" => Ok(Self::Settings),
            "activity" => Ok(Self::Activity),
            other => Err(HarnessError::InvalidArgument(format!(
                "unknown tab {other:?} (expected overview|settings|activity)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualFlag {
    DarkMode,
    LayoutBreak,
    LongTextOverflow,
    InvisibleOverlay,
    StickyHeader,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualFlags {
    pub dark_mode: bool,
    pub layout_break: bool,
    pub long_text_overflow: bool,
    pub invisible_overlay: bool,
    pub sticky_header: bool,
}

impl VisualFlags {
    pub fn get(&self, flag: VisualFlag) -> bool {
        match flag {
            VisualFlag::DarkMode => self.dark_mode,
            VisualFlag::LayoutBreak => self.layout_break,
            VisualFlag::LongTextOverflow => self.long_text_overflow,
            VisualFlag::InvisibleOverlay => self.invisible_overlay,
            VisualFlag::StickyHeader => self.sticky_header,
        }
    }

    pub fn set(&mut self, flag: VisualFlag, on: bool) {
        let slot = match flag {
            VisualFlag::DarkMode => &mut self.dark_mode,
            VisualFlag::LayoutBreak => &mut self.layout_break,
            VisualFlag::LongTextOverflow => &mut self.long_text_overflow,
            VisualFlag::InvisibleOverlay => &mut self.invisible_overlay,
            VisualFlag::StickyHeader => &mut self.sticky_header,
        };
        *slot = on;
    }

    pub fn any(&self) -> bool {
        *self != Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub expires_at_ms: u64,
    #[serde(skip)]
    pub timer: TimerId,
}

/// Most-recent-first log of the last [`EVENT_LOG_CAPACITY`] events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    entries: VecDeque<String>,
}

impl EventLog {
    pub fn push(&mut self, event: impl Into<String>) {
        self.entries.push_front(event.into());
        self.entries.truncate(EVENT_LOG_CAPACITY);
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Busy latch used by the double-submit scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Latch {
    #[default]
    Idle,
    Busy,
    Wedged,
}

/// Per-scenario bookkeeping that is not part of the rendered surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioMemo {
    pub triggers: u32,
    pub latch: Latch,
    pub stage: usize,
    pub queue_depth: u32,
    pub logins: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub selected_scenario: Option<String>,
    pub elapsed_timer_origin: u64,
    pub text: String,
    pub checkbox: bool,
    pub counter: i64,
    pub item_list: Vec<String>,
    pub active_tab: Tab,
    pub visual_defect_flags: VisualFlags,
    pub loading: bool,
    pub toast: Option<Toast>,
    pub auth_token: Option<String>,
    pub route_history: NavigationHistory,
    pub event_log: EventLog,
    pub memo: ScenarioMemo,
}

impl SessionState {
    pub fn new(scenario_id: &str, origin_ms: u64) -> Self {
        Self {
            selected_scenario: Some(scenario_id.to_string()),
            elapsed_timer_origin: origin_ms,
            text: String::new(),
            checkbox: false,
            counter: 0,
            item_list: Vec::new(),
            active_tab: Tab::default(),
            visual_defect_flags: VisualFlags::default(),
            loading: false,
            toast: None,
            auth_token: None,
            route_history: NavigationHistory::new(Route::Home),
            event_log: EventLog::default(),
            memo: ScenarioMemo::default(),
        }
    }

    pub fn route(&self) -> Route {
        self.route_history.current()
    }

    pub fn log(&mut self, event: impl Into<String>) {
        self.event_log.push(event);
    }

    /// Foreground/background colors of the content area. Dark mode only
    /// swaps the background, so text disappears into it.
    pub fn palette(&self) -> (&'static str, &'static str) {
        if self.visual_defect_flags.dark_mode {
            ("#111827", "#111827")
        } else {
            ("#111827", "#ffffff")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_log_keeps_ten_most_recent_first() {
        let mut log = EventLog::default();
        for i in 0..15 {
            log.push(format!("e{i}"));
        }
        assert_eq!(log.len(), EVENT_LOG_CAPACITY);
        assert_eq!(log.latest(), Some("e14"));
        assert_eq!(log.iter().last(), Some("e5"));
    }

    #[test]
    fn fresh_state_starts_home() {
        let state = SessionState::new("crash_01", 0);
        assert_eq!(state.route(), Route::Home);
        assert_eq!(state.route_history.entries(), &[Route::Home]);
        assert!(!state.visual_defect_flags.any());
        let (fg, bg) = state.palette();
        assert_ne!(fg, bg);
    }

    #[test]
    fn dark_mode_palette_collides() {
        let mut state = SessionState::new("ui_issue_02", 0);
        state.visual_defect_flags.set(VisualFlag::DarkMode, true);
        let (fg, bg) = state.palette();
        assert_eq!(fg, bg);
    }

    #[test]
    fn route_and_tab_parse() {
        assert_eq!("not_found".parse::<Route>().unwrap(), Route::NotFound);
        assert_eq!("settings".parse::<Tab>().unwrap(), Tab::Settings);
        assert!("nowhere".parse::<Route>().is_err());
    }
}
