//! Static scenario catalog: forty records across eight defect categories.

use globset::Glob;
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::{
    AuthBehavior, Behavior, CrashBehavior, DataWrongBehavior, ErrorMessageBehavior,
    FlowNavBehavior, HarnessError, HarnessResult, NoResponseBehavior, PerfBehavior, Route, Tab,
    UiIssueBehavior, VisualFlag,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Crash,
    NoResponse,
    UiIssue,
    DataWrong,
    FlowNav,
    Auth,
    ErrorMessage,
    Perf,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Crash,
        Category::NoResponse,
        Category::UiIssue,
        Category::DataWrong,
        Category::FlowNav,
        Category::Auth,
        Category::ErrorMessage,
        Category::Perf,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Crash => "crash",
            Self::NoResponse => "no_response",
            Self::UiIssue => "ui_issue",
            Self::DataWrong => "data_wrong",
            Self::FlowNav => "flow_nav",
            Self::Auth => "auth",
            Self::ErrorMessage => "error_message",
            Self::Perf => "perf",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| HarnessError::InvalidArgument(format!("unknown category {s:?}")))
    }
}

impl clap::ValueEnum for Category {
    fn value_variants<'a>() -> &'a [Self] {
        &Self::ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// Interaction depth needed to trigger a defect. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    C0,
    C1,
    C2,
    C3,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioRecord {
    pub id: &'static str,
    pub category: Category,
    pub title: &'static str,
    pub complexity_tier: Tier,
    pub hint_steps: &'static [&'static str],
    pub behavior: Behavior,
}

#[derive(Debug)]
pub struct Catalog {
    records: Vec<ScenarioRecord>,
}

impl Catalog {
    pub fn builtin() -> &'static Catalog {
        static CATALOG: OnceLock<Catalog> = OnceLock::new();
        CATALOG.get_or_init(|| Catalog {
            records: builtin_records(),
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScenarioRecord> {
        self.records.iter()
    }

    pub fn get(&self, id: &str) -> HarnessResult<&ScenarioRecord> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| HarnessError::ScenarioNotFound(id.to_string()))
    }

    pub fn list_by_category(&self) -> BTreeMap<Category, Vec<&ScenarioRecord>> {
        let mut out: BTreeMap<Category, Vec<&ScenarioRecord>> = BTreeMap::new();
        for record in &self.records {
            out.entry(record.category).or_default().push(record);
        }
        out
    }

    /// Records whose id matches a glob such as `auth_*` or `*_03`.
    pub fn matching(&self, pattern: &str) -> HarnessResult<Vec<&ScenarioRecord>> {
        let matcher = Glob::new(pattern)
            .map_err(|e| HarnessError::InvalidArgument(format!("invalid glob {pattern:?}: {e}")))?
            .compile_matcher();
        Ok(self.records.iter().filter(|r| matcher.is_match(r.id)).collect())
    }
}

fn rec(
    id: &'static str,
    complexity_tier: Tier,
    title: &'static str,
    hint_steps: &'static [&'static str],
    behavior: Behavior,
) -> ScenarioRecord {
    ScenarioRecord {
        id,
        category: behavior.category(),
        title,
        complexity_tier,
        hint_steps,
        behavior,
    }
}

fn builtin_records() -> Vec<ScenarioRecord> {
    use Behavior as B;
    use Tier::*;

    vec![
        // crash
        rec(
            "crash_01",
            C0,
            "Save button crashes the page",
            &["Press Save"],
            B::Crash(CrashBehavior::Immediate {
                message: "profile is null: cannot read display name",
            }),
        ),
        rec(
            "crash_02",
            C1,
            "Submitting text crashes the page",
            &["Type any text", "Press Submit"],
            B::Crash(CrashBehavior::OnNonEmptyInput),
        ),
        rec(
            "crash_03",
            C2,
            "Details page crashes on refresh",
            &["Press Open details", "Press Refresh on the details page"],
            B::Crash(CrashBehavior::OnRoute {
                route: Route::Details,
                message: "details payload missing",
            }),
        ),
        rec(
            "crash_04",
            C2,
            "Crash after data finishes loading",
            &["Press Load", "Wait for the spinner to finish"],
            B::Crash(CrashBehavior::AfterFetch {
                message: "response has no items field",
            }),
        ),
        rec(
            "crash_05",
            C3,
            "Settings save crashes after login",
            &["Press Login", "Open the Settings tab", "Press Save"],
            B::Crash(CrashBehavior::OnTabWhenAuthed {
                tab: Tab::Settings,
                message: "settings panel accessed before init",
            }),
        ),
        // no_response
        rec(
            "no_response_01",
            C0,
            "Button does nothing",
            &["Press Submit"],
            B::NoResponse(NoResponseBehavior::Inert),
        ),
        rec(
            "no_response_02",
            C1,
            "Add reports success but adds nothing",
            &["Press Add item", "Observe the success message and the unchanged list"],
            B::NoResponse(NoResponseBehavior::FakeSuccess {
                message: "Item added",
            }),
        ),
        rec(
            "no_response_03",
            C1,
            "Add silently requires the terms checkbox",
            &["Press Add item (nothing happens)", "Tick the checkbox", "Press Add item again"],
            B::NoResponse(NoResponseBehavior::RequiresCheckbox),
        ),
        rec(
            "no_response_04",
            C2,
            "Invisible overlay swallows clicks",
            &["Press Submit", "Observe that nothing reacts"],
            B::NoResponse(NoResponseBehavior::BlockedByOverlay),
        ),
        rec(
            "no_response_05",
            C3,
            "Double submit wedges the form",
            &["Press Save twice quickly", "Wait for the save to finish", "Press Save again"],
            B::NoResponse(NoResponseBehavior::WedgedLatch),
        ),
        // ui_issue
        rec(
            "ui_issue_01",
            C0,
            "Layout collapses",
            &["Press Toggle layout"],
            B::UiIssue(UiIssueBehavior::Toggle {
                flag: VisualFlag::LayoutBreak,
            }),
        ),
        rec(
            "ui_issue_02",
            C1,
            "Dark mode hides the text",
            &["Press Dark mode"],
            B::UiIssue(UiIssueBehavior::Toggle {
                flag: VisualFlag::DarkMode,
            }),
        ),
        rec(
            "ui_issue_03",
            C1,
            "Long text overflows its card",
            &["Press Show description"],
            B::UiIssue(UiIssueBehavior::Toggle {
                flag: VisualFlag::LongTextOverflow,
            }),
        ),
        rec(
            "ui_issue_04",
            C2,
            "Sticky header covers content",
            &["Press Pin header", "Scroll the content"],
            B::UiIssue(UiIssueBehavior::Toggle {
                flag: VisualFlag::StickyHeader,
            }),
        ),
        rec(
            "ui_issue_05",
            C3,
            "Layout degrades step by step",
            &["Press Expand", "Press Expand again"],
            B::UiIssue(UiIssueBehavior::Escalating {
                flags: &[VisualFlag::LongTextOverflow, VisualFlag::LayoutBreak],
            }),
        ),
        // data_wrong
        rec(
            "data_wrong_01",
            C0,
            "Counter moves but list does not",
            &["Press Add item", "Compare the counter with the list"],
            B::DataWrong(DataWrongBehavior::CounterOnly),
        ),
        rec(
            "data_wrong_02",
            C1,
            "Refresh succeeds but shows nothing new",
            &["Press Refresh", "Wait for the spinner"],
            B::DataWrong(DataWrongBehavior::UnreflectedFetch { records: 3 }),
        ),
        rec(
            "data_wrong_03",
            C2,
            "Counter and list disagree by one",
            &["Press Add item", "Compare the counter with the list"],
            B::DataWrong(DataWrongBehavior::Mismatched {
                counter_step: 2,
                item_step: 1,
            }),
        ),
        rec(
            "data_wrong_04",
            C2,
            "Rapid adds lose counter updates",
            &["Press Add item twice quickly", "Compare the counter with the list"],
            B::DataWrong(DataWrongBehavior::LostUpdate {
                min_jitter_ms: 20,
                max_jitter_ms: 120,
            }),
        ),
        rec(
            "data_wrong_05",
            C3,
            "Tab shows another tab's data",
            &["Press Load", "Switch to another tab before loading finishes", "Read the content"],
            B::DataWrong(DataWrongBehavior::StaleTab),
        ),
        // flow_nav
        rec(
            "flow_nav_01",
            C0,
            "Next does not navigate",
            &["Press Next"],
            B::FlowNav(FlowNavBehavior::Stuck),
        ),
        rec(
            "flow_nav_02",
            C1,
            "Link leads to not found",
            &["Press View details"],
            B::FlowNav(FlowNavBehavior::NotFound),
        ),
        rec(
            "flow_nav_03",
            C2,
            "Navigation spinner never ends",
            &["Press Continue", "Wait"],
            B::FlowNav(FlowNavBehavior::EndlessWait),
        ),
        rec(
            "flow_nav_04",
            C2,
            "Back button does nothing after details",
            &["Press Open details", "Press Back"],
            B::FlowNav(FlowNavBehavior::HistoryReset),
        ),
        rec(
            "flow_nav_05",
            C3,
            "Back needs two presses from one entry",
            &["Press Entry A", "Press Back", "Press Back again", "Compare with Entry B"],
            B::FlowNav(FlowNavBehavior::DoublePush),
        ),
        // auth
        rec(
            "auth_01",
            C0,
            "Protected action bounces to login",
            &["Press Load account"],
            B::Auth(AuthBehavior::Gate),
        ),
        rec(
            "auth_02",
            C1,
            "Session expires right after login",
            &["Press Login", "Wait a moment", "Press Load account"],
            B::Auth(AuthBehavior::ExpiringToken),
        ),
        rec(
            "auth_03",
            C2,
            "Forbidden shows unknown error",
            &["Press Login", "Press Load account"],
            B::Auth(AuthBehavior::ForbiddenAsUnknown),
        ),
        rec(
            "auth_05",
            C2,
            "Logout keeps the session alive",
            &["Press Login", "Press Logout", "Press Load account"],
            B::Auth(AuthBehavior::StickyLogout),
        ),
        rec(
            "auth_04",
            C3,
            "Login and restricted page redirect forever",
            &["Press Open restricted page", "Watch the page flip between login and restricted"],
            B::Auth(AuthBehavior::RedirectLoop),
        ),
        // error_message
        rec(
            "error_message_01",
            C0,
            "Failed save shows no message",
            &["Press Save"],
            B::ErrorMessage(ErrorMessageBehavior::Swallowed { status: 500 }),
        ),
        rec(
            "error_message_02",
            C1,
            "Server error reported as network loss",
            &["Press Save"],
            B::ErrorMessage(ErrorMessageBehavior::WrongClass {
                status: 500,
                message: "Network connection lost",
            }),
        ),
        rec(
            "error_message_03",
            C1,
            "Error toast appears twice",
            &["Press Save"],
            B::ErrorMessage(ErrorMessageBehavior::Duplicated {
                status: 500,
                gap_ms: 100,
            }),
        ),
        rec(
            "error_message_04",
            C2,
            "Rate-limit message flashes too briefly",
            &["Press Save", "Try to read the message"],
            B::ErrorMessage(ErrorMessageBehavior::Flash {
                status: 429,
                message: "Too many requests, please wait",
            }),
        ),
        rec(
            "error_message_05",
            C3,
            "Second save spins forever",
            &["Press Save", "Wait for the success message", "Press Save again"],
            B::ErrorMessage(ErrorMessageBehavior::StuckSpinner { status: 503 }),
        ),
        // perf
        rec(
            "perf_01",
            C0,
            "Page takes seconds to load",
            &["Press Load"],
            B::Perf(PerfBehavior::SlowLoad),
        ),
        rec(
            "perf_02",
            C1,
            "Typing lags behind input",
            &["Type quickly into the text field", "Press Add"],
            B::Perf(PerfBehavior::InputLag),
        ),
        rec(
            "perf_03",
            C2,
            "Huge list freezes scrolling",
            &["Press Load all rows", "Scroll the list"],
            B::Perf(PerfBehavior::HugeList),
        ),
        rec(
            "perf_04",
            C2,
            "Each click waits longer than the last",
            &["Press Increment", "Press Increment again", "Press Increment a third time"],
            B::Perf(PerfBehavior::Escalating),
        ),
        rec(
            "perf_05",
            C3,
            "Clicks queue up behind each other",
            &["Press Process three times quickly", "Watch the counter catch up slowly"],
            B::Perf(PerfBehavior::Serialized),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    #[test]
    fn five_scenarios_per_category() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 40);
        let grouped = catalog.list_by_category();
        assert_eq!(grouped.len(), Category::ALL.len());
        for (category, records) in &grouped {
            assert_eq!(records.len(), 5, "category {category}");
            assert!(records.iter().all(|r| r.category == *category));
            assert!(records.iter().all(|r| r.id.starts_with(category.as_str())));
        }
    }

    #[test]
    fn ids_are_unique_and_tiers_span_c0_to_c3() {
        let catalog = Catalog::builtin();
        let ids: HashSet<_> = catalog.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), catalog.len());
        for records in catalog.list_by_category().values() {
            assert_eq!(records.first().map(|r| r.complexity_tier), Some(Tier::C0));
            assert!(records.iter().any(|r| r.complexity_tier == Tier::C3));
            assert!(records.iter().all(|r| !r.hint_steps.is_empty()));
        }
    }

    #[test]
    fn tiers_never_decrease_within_a_category() {
        for (category, records) in Catalog::builtin().list_by_category() {
            assert!(
                records.windows(2).all(|w| w[0].complexity_tier <= w[1].complexity_tier),
                "category {category}"
            );
        }
    }

    #[test]
    fn unknown_id_fails_fast() {
        let err = Catalog::builtin().get("crash_99").expect_err("must fail");
        assert!(matches!(err, HarnessError::ScenarioNotFound(id) if id == "crash_99"));
    }

    #[test]
    fn glob_filter_selects_ids() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.matching("auth_*").expect("glob").len(), 5);
        assert_eq!(catalog.matching("*_03").expect("glob").len(), 8);
        assert!(catalog.matching("[").is_err());
    }
}
