use defectlab::{
    Action, Catalog, Config, Input, Latch, Route, SessionController, SessionState, Tab, ToastKind,
    View, VisualFlag,
};

use std::collections::BTreeSet;
use std::time::Duration;

type Check = fn(&mut SessionController);

fn session(id: &str) -> SessionController {
    let mut s = SessionController::new(Config::default());
    s.select(id).expect("select");
    s
}

fn primary(s: &mut SessionController) {
    s.trigger(Action::Primary).expect("trigger");
}

fn act(s: &mut SessionController, action: Action) {
    s.trigger(action).expect("trigger");
}

fn advance(s: &mut SessionController, ms: u64) {
    s.advance(Duration::from_millis(ms)).expect("advance");
}

fn state(s: &SessionController) -> &SessionState {
    s.state().expect("running scenario")
}

fn toast(s: &SessionController) -> Option<(ToastKind, String)> {
    state(s).toast.as_ref().map(|t| (t.kind, t.message.clone()))
}

fn fault_message(s: &SessionController) -> String {
    match s.view() {
        View::Faulted { fault_message, .. } => fault_message,
        other => panic!("expected faulted view, got {}", other.pretty()),
    }
}

fn error_toast(message: &str) -> Option<(ToastKind, String)> {
    Some((ToastKind::Error, message.to_string()))
}

fn success_toast(message: &str) -> Option<(ToastKind, String)> {
    Some((ToastKind::Success, message.to_string()))
}

fn case(id: &'static str, check: Check) -> (&'static str, Check) {
    (id, check)
}

fn cases() -> Vec<(&'static str, Check)> {
    vec![
        case("crash_01", |s| {
            primary(s);
            assert_eq!(fault_message(s), "profile is null: cannot read display name");
        }),
        case("crash_02", |s| {
            primary(s);
            assert!(!s.is_faulted());
            assert_eq!(toast(s), error_toast("Please type something first"));
            s.input(Input::Text { value: "abc".into() }).expect("input");
            primary(s);
            assert_eq!(fault_message(s), "failed to parse input: abc");
        }),
        case("crash_03", |s| {
            primary(s);
            assert_eq!(state(s).route(), Route::Details);
            primary(s);
            assert_eq!(fault_message(s), "details payload missing");
        }),
        case("crash_04", |s| {
            primary(s);
            assert!(state(s).loading);
            advance(s, 599);
            assert!(!s.is_faulted());
            advance(s, 1);
            assert_eq!(fault_message(s), "response has no items field");
        }),
        case("crash_05", |s| {
            primary(s);
            assert_eq!(state(s).route(), Route::Login);
            act(s, Action::Login);
            primary(s);
            assert_eq!(toast(s), success_toast("Saved"));
            s.input(Input::Tab { tab: Tab::Settings }).expect("tab");
            primary(s);
            assert_eq!(fault_message(s), "settings panel accessed before init");
        }),
        case("no_response_01", |s| {
            let before = serde_json::to_value(state(s)).expect("json");
            primary(s);
            advance(s, 5_000);
            assert_eq!(serde_json::to_value(state(s)).expect("json"), before);
        }),
        case("no_response_02", |s| {
            primary(s);
            assert_eq!(toast(s), success_toast("Item added"));
            assert!(state(s).item_list.is_empty());
        }),
        case("no_response_03", |s| {
            primary(s);
            assert!(state(s).item_list.is_empty());
            assert_eq!(toast(s), None);
            s.input(Input::Checkbox { checked: true }).expect("check");
            primary(s);
            assert_eq!(state(s).item_list.len(), 1);
            assert_eq!(toast(s), success_toast("Item added"));
        }),
        case("no_response_04", |s| {
            assert!(state(s).visual_defect_flags.get(VisualFlag::InvisibleOverlay));
            primary(s);
            primary(s);
            assert!(state(s).item_list.is_empty());
            assert_eq!(toast(s), None);
        }),
        case("no_response_05", |s| {
            primary(s);
            assert_eq!(state(s).memo.latch, Latch::Busy);
            advance(s, 600);
            assert_eq!(state(s).counter, 1);
            assert!(!state(s).loading);
            assert_eq!(state(s).memo.latch, Latch::Idle);

            primary(s);
            primary(s);
            assert_eq!(state(s).memo.latch, Latch::Wedged);
            advance(s, 600);
            assert_eq!(state(s).counter, 2);

            primary(s);
            advance(s, 5_000);
            assert_eq!(state(s).counter, 2);
            assert_eq!(state(s).memo.latch, Latch::Wedged);
        }),
        case("ui_issue_01", |s| {
            primary(s);
            assert!(state(s).visual_defect_flags.layout_break);
            primary(s);
            assert!(!state(s).visual_defect_flags.layout_break);
        }),
        case("ui_issue_02", |s| {
            primary(s);
            assert!(state(s).visual_defect_flags.dark_mode);
            let (fg, bg) = state(s).palette();
            assert_eq!(fg, bg);
        }),
        case("ui_issue_03", |s| {
            primary(s);
            assert!(state(s).visual_defect_flags.long_text_overflow);
            assert_eq!(state(s).counter, 0);
        }),
        case("ui_issue_04", |s| {
            primary(s);
            assert!(state(s).visual_defect_flags.sticky_header);
        }),
        case("ui_issue_05", |s| {
            primary(s);
            let flags = state(s).visual_defect_flags;
            assert!(flags.long_text_overflow && !flags.layout_break);
            primary(s);
            assert!(state(s).visual_defect_flags.layout_break);
            let settled = state(s).visual_defect_flags;
            primary(s);
            assert_eq!(state(s).visual_defect_flags, settled);
        }),
        case("data_wrong_01", |s| {
            primary(s);
            assert_eq!(state(s).counter, 1);
            assert!(state(s).item_list.is_empty());
        }),
        case("data_wrong_02", |s| {
            primary(s);
            assert!(state(s).loading);
            advance(s, 600);
            assert!(!state(s).loading);
            assert_eq!(state(s).event_log.latest(), Some("fetched 3 records"));
            assert!(state(s).item_list.is_empty());
            assert_eq!(state(s).counter, 0);
            assert!(state(s).text.is_empty());
        }),
        case("data_wrong_03", |s| {
            primary(s);
            assert_eq!(state(s).counter, 2);
            assert_eq!(state(s).item_list.len(), 1);
        }),
        case("data_wrong_04", |s| {
            primary(s);
            assert_eq!(state(s).item_list.len(), 1);
            assert_eq!(state(s).counter, 0);
            advance(s, 120);
            assert_eq!(state(s).counter, 1);
        }),
        case("data_wrong_05", |s| {
            primary(s);
            s.input(Input::Tab { tab: Tab::Activity }).expect("tab");
            advance(s, 600);
            assert_eq!(state(s).active_tab, Tab::Activity);
            assert_eq!(state(s).text, "overview data");
        }),
        case("flow_nav_01", |s| {
            primary(s);
            assert_eq!(state(s).route(), Route::Home);
            assert_eq!(state(s).event_log.latest(), Some("navigating to details..."));
        }),
        case("flow_nav_02", |s| {
            primary(s);
            assert_eq!(state(s).route(), Route::NotFound);
        }),
        case("flow_nav_03", |s| {
            primary(s);
            advance(s, 60_000);
            assert!(state(s).loading);
            assert_eq!(s.instance().map(|i| i.pending_suspensions()), Some(1));
        }),
        case("flow_nav_04", |s| {
            primary(s);
            assert_eq!(state(s).route_history.entries(), &[Route::Details]);
            act(s, Action::Back);
            assert_eq!(state(s).route(), Route::Details);
        }),
        case("flow_nav_05", |s| {
            primary(s);
            assert_eq!(
                state(s).route_history.entries(),
                &[Route::Home, Route::Details, Route::Details]
            );
            act(s, Action::Back);
            assert_eq!(state(s).route(), Route::Details);
            act(s, Action::EntryB);
            assert_eq!(state(s).route_history.entries().len(), 3);
        }),
        case("auth_01", |s| {
            primary(s);
            advance(s, 600);
            assert_eq!(state(s).route(), Route::Login);
            assert_eq!(toast(s), error_toast("Please log in"));
            act(s, Action::Login);
            primary(s);
            advance(s, 600);
            assert_eq!(toast(s), success_toast("Account loaded"));
        }),
        case("auth_02", |s| {
            act(s, Action::Login);
            assert!(state(s).auth_token.is_some());
            advance(s, 500);
            assert!(state(s).auth_token.is_none());
            primary(s);
            advance(s, 600);
            assert_eq!(state(s).route(), Route::Login);
        }),
        case("auth_03", |s| {
            act(s, Action::Login);
            primary(s);
            advance(s, 600);
            assert_eq!(toast(s), error_toast("Unknown error"));
            assert_eq!(state(s).route(), Route::Home);
        }),
        case("auth_04", |s| {
            primary(s);
            assert_eq!(state(s).route(), Route::Restricted);
            advance(s, 700);
            assert_eq!(state(s).route(), Route::Login);
            advance(s, 700);
            assert_eq!(state(s).route(), Route::Restricted);
        }),
        case("auth_05", |s| {
            act(s, Action::Login);
            act(s, Action::Logout);
            assert_eq!(toast(s), success_toast("Logged out"));
            assert_eq!(state(s).route(), Route::Home);
            assert!(state(s).auth_token.is_some());
        }),
        case("error_message_01", |s| {
            primary(s);
            advance(s, 600);
            assert!(!state(s).loading);
            assert_eq!(toast(s), None);
        }),
        case("error_message_02", |s| {
            primary(s);
            advance(s, 600);
            assert_eq!(toast(s), error_toast("Network connection lost"));
        }),
        case("error_message_03", |s| {
            primary(s);
            advance(s, 600);
            assert_eq!(toast(s), error_toast("Server error (500)"));
            advance(s, 100);
            assert_eq!(toast(s), error_toast("Server error (500)"));
            assert_eq!(state(s).toast.as_ref().map(|t| t.expires_at_ms), Some(2200));
            let shown = s.instance().expect("running").timeline().iter().filter(|e| e.name == "toast").count();
            assert_eq!(shown, 2);
        }),
        case("error_message_04", |s| {
            primary(s);
            advance(s, 600);
            assert_eq!(toast(s), error_toast("Too many requests, please wait"));
            advance(s, 301);
            assert_eq!(toast(s), None);
        }),
        case("error_message_05", |s| {
            primary(s);
            advance(s, 600);
            assert_eq!(toast(s), success_toast("Saved"));
            assert!(!state(s).loading);
            primary(s);
            advance(s, 10_000);
            assert!(state(s).loading);
            assert_eq!(toast(s), None);
        }),
        case("perf_01", |s| {
            primary(s);
            advance(s, 2_999);
            assert!(state(s).loading);
            advance(s, 1);
            assert!(!state(s).loading);
            assert_eq!(toast(s), success_toast("Loaded"));
        }),
        case("perf_02", |s| {
            s.input(Input::Text { value: "slow".into() }).expect("input");
            primary(s);
            assert_eq!(state(s).item_list, vec!["slow".to_string()]);
        }),
        case("perf_03", |s| {
            primary(s);
            assert_eq!(state(s).item_list.len(), 5000);
            assert_eq!(state(s).counter, 5000);
            assert_eq!(state(s).item_list[0], "Row 1");
        }),
        case("perf_04", |s| {
            primary(s);
            primary(s);
            primary(s);
            advance(s, 400);
            assert_eq!(state(s).counter, 1);
            advance(s, 400);
            assert_eq!(state(s).counter, 2);
            advance(s, 399);
            assert_eq!(state(s).counter, 2);
            advance(s, 1);
            assert_eq!(state(s).counter, 3);
        }),
        case("perf_05", |s| {
            primary(s);
            primary(s);
            primary(s);
            assert_eq!(state(s).memo.queue_depth, 3);
            advance(s, 600);
            assert_eq!(state(s).counter, 1);
            advance(s, 600);
            assert_eq!(state(s).counter, 2);
            assert!(state(s).loading);
            advance(s, 600);
            assert_eq!(state(s).counter, 3);
            assert!(!state(s).loading);
        }),
    ]
}

#[test]
fn every_catalog_scenario_has_a_case() {
    let covered: BTreeSet<&str> = cases().iter().map(|(id, _)| *id).collect();
    let catalog: BTreeSet<&str> = Catalog::builtin().iter().map(|r| r.id).collect();
    assert_eq!(covered, catalog);
}

#[test]
fn primary_action_produces_documented_effect() {
    for (id, check) in cases() {
        let mut s = session(id);
        check(&mut s);
        let faulted = s.is_faulted();
        let expect_fault = id.starts_with("crash_");
        assert_eq!(faulted, expect_fault, "{id}: faulted={faulted}");
    }
}

#[test]
fn lost_update_mismatch_depends_on_interleaving() {
    let mut outcomes = BTreeSet::new();
    for seed in 0..64u64 {
        let mut s = SessionController::new(Config {
            seed,
            ..Config::default()
        });
        s.select("data_wrong_04").expect("select");
        primary(&mut s);
        advance(&mut s, 50);
        primary(&mut s);
        advance(&mut s, 500);
        let st = state(&s);
        assert_eq!(st.item_list.len(), 2, "seed {seed}");
        assert!(matches!(st.counter, 1 | 2), "seed {seed}: counter={}", st.counter);
        outcomes.insert(st.counter);
    }
    assert!(outcomes.contains(&1), "some interleaving must lose an update");
    assert!(outcomes.contains(&2), "some interleaving must keep both updates");
}

#[test]
fn simultaneous_triggers_always_lose_an_update() {
    let mut s = session("data_wrong_04");
    primary(&mut s);
    primary(&mut s);
    advance(&mut s, 500);
    assert_eq!(state(&s).item_list.len(), 2);
    assert_eq!(state(&s).counter, 1);
}

#[test]
fn whitespace_only_input_counts_as_non_empty() {
    let mut s = session("crash_02");
    s.input(Input::Text { value: "   ".into() }).expect("input");
    primary(&mut s);
    assert_eq!(fault_message(&s), "failed to parse input:    ");
}
