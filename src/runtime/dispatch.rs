//! Scenario behavior dispatcher.
//!
//! Keyed by the instance's [`Behavior`] descriptor and the triggering action.
//! Scripted crashes are raised as panics and are never caught here; only the
//! crash boundary stops them. Simulated request failures are always handled
//! here, whether the scenario handles them correctly or not.

use crate::{
    Action, AuthBehavior, Behavior, CrashBehavior, DataWrongBehavior, ErrorMessageBehavior,
    FlowNavBehavior, HttpError, Input, Instance, NoResponseBehavior, PerfBehavior, PushMode,
    RequestOutcome, Resume, Route, TimerId, ToastKind, UiIssueBehavior, Wakeup, burn_cpu,
};

enum Handling {
    Done,
    Default,
}

/// Entry hook run once when the instance is created.
pub(crate) fn on_enter(inst: &mut Instance) {
    if let Behavior::NoResponse(NoResponseBehavior::BlockedByOverlay) = inst.record().behavior {
        inst.state
            .visual_defect_flags
            .set(crate::VisualFlag::InvisibleOverlay, true);
    }
}

pub(crate) fn on_action(inst: &mut Instance, action: Action) {
    tracing::debug!(scenario = inst.record().id, %action, "dispatch");
    let handling = match inst.record().behavior {
        Behavior::Crash(b) => crash(inst, b, action),
        Behavior::NoResponse(b) => no_response(inst, b, action),
        Behavior::UiIssue(b) => ui_issue(inst, b, action),
        Behavior::DataWrong(b) => data_wrong(inst, b, action),
        Behavior::FlowNav(b) => flow_nav(inst, b, action),
        Behavior::Auth(b) => auth(inst, b, action),
        Behavior::ErrorMessage(b) => error_message(inst, b, action),
        Behavior::Perf(b) => perf(inst, b, action),
    };
    if let Handling::Default = handling {
        default_action(inst, action);
    }
}

pub(crate) fn on_input(inst: &mut Instance, input: Input) {
    match input {
        Input::Text { value } => {
            if let Behavior::Perf(PerfBehavior::InputLag) = inst.record().behavior {
                burn_cpu(inst.timings.burn_iterations);
            }
            inst.state.text = value;
        }
        Input::Checkbox { checked } => inst.state.checkbox = checked,
        Input::Tab { tab } => inst.state.active_tab = tab,
    }
}

pub(crate) fn on_route_entered(inst: &mut Instance) {
    inst.arm_redirect();
}

pub(crate) fn on_wakeup(inst: &mut Instance, id: TimerId, wakeup: Wakeup) {
    match wakeup {
        Wakeup::ToastExpired => {
            inst.expire_toast(id);
        }
        Wakeup::TokenExpired => inst.expire_token(),
        Wakeup::Redirect(route) => {
            if inst.redirect_timer == Some(id) {
                inst.redirect_timer = None;
            }
            inst.navigate(route, PushMode::Append);
        }
        Wakeup::Response { then, outcome } => resume(inst, then, Some(outcome)),
        Wakeup::Delay(then) => resume(inst, then, None),
    }
}

fn default_action(inst: &mut Instance, action: Action) {
    match action {
        Action::Login => {
            inst.login(None);
        }
        Action::Logout => inst.logout(),
        Action::Back => {
            inst.go_back();
        }
        Action::ToggleCheckbox => inst.state.checkbox = !inst.state.checkbox,
        Action::Primary | Action::EntryA | Action::EntryB => {
            inst.note("unhandled", crate::fields!("action" => action.as_str()));
        }
    }
}

fn next_item_label(inst: &Instance) -> String {
    format!("Item {}", inst.state.item_list.len() + 1)
}

fn crash(inst: &mut Instance, b: CrashBehavior, action: Action) -> Handling {
    if action != Action::Primary {
        return Handling::Default;
    }
    match b {
        CrashBehavior::Immediate { message } => panic!("{message}"),
        CrashBehavior::OnNonEmptyInput => {
            if inst.state.text.is_empty() {
                inst.show_default_toast(ToastKind::Error, "Please type something first");
            } else {
                panic!("failed to parse input: {}", inst.state.text);
            }
        }
        CrashBehavior::OnRoute { route, message } => {
            if inst.state.route() == route {
                panic!("{message}");
            }
            inst.navigate(route, PushMode::Append);
        }
        CrashBehavior::AfterFetch { .. } => {
            inst.state.loading = true;
            let latency = inst.timings.request_ms;
            inst.simulated_request(latency, 200, Resume::PayloadCrash);
        }
        CrashBehavior::OnTabWhenAuthed { tab, message } => {
            if !inst.has_token() {
                inst.navigate(Route::Login, PushMode::Append);
                inst.show_default_toast(ToastKind::Error, "Please log in first");
            } else if inst.state.active_tab == tab {
                panic!("{message}");
            } else {
                inst.show_default_toast(ToastKind::Success, "Saved");
            }
        }
    }
    Handling::Done
}

fn no_response(inst: &mut Instance, b: NoResponseBehavior, action: Action) -> Handling {
    if action != Action::Primary {
        return Handling::Default;
    }
    match b {
        NoResponseBehavior::Inert => {}
        NoResponseBehavior::FakeSuccess { message } => {
            inst.show_default_toast(ToastKind::Success, message);
        }
        NoResponseBehavior::RequiresCheckbox => {
            if inst.state.checkbox {
                let item = next_item_label(inst);
                inst.state.item_list.push(item);
                inst.show_default_toast(ToastKind::Success, "Item added");
            }
        }
        NoResponseBehavior::BlockedByOverlay => {
            if inst.state.visual_defect_flags.invisible_overlay {
                inst.note("absorbed_by_overlay", crate::fields!("action" => action.as_str()));
            } else {
                let item = next_item_label(inst);
                inst.state.item_list.push(item);
            }
        }
        NoResponseBehavior::WedgedLatch => match inst.state.memo.latch {
            crate::Latch::Idle => {
                inst.state.memo.latch = crate::Latch::Busy;
                inst.state.loading = true;
                let latency = inst.timings.request_ms;
                inst.simulated_request(latency, 200, Resume::ConfirmSave);
            }
            crate::Latch::Busy => {
                inst.state.memo.latch = crate::Latch::Wedged;
                inst.note("latch_wedged", crate::fields!());
            }
            crate::Latch::Wedged => {
                inst.note("ignored_while_wedged", crate::fields!());
            }
        },
    }
    Handling::Done
}

fn ui_issue(inst: &mut Instance, b: UiIssueBehavior, action: Action) -> Handling {
    if action != Action::Primary {
        return Handling::Default;
    }
    let flags = &mut inst.state.visual_defect_flags;
    match b {
        UiIssueBehavior::Toggle { flag } => {
            let on = !flags.get(flag);
            flags.set(flag, on);
        }
        UiIssueBehavior::Escalating { flags: steps } => {
            let stage = inst.state.memo.stage;
            if let Some(flag) = steps.get(stage) {
                flags.set(*flag, true);
                inst.state.memo.stage = stage + 1;
            }
        }
    }
    Handling::Done
}

fn data_wrong(inst: &mut Instance, b: DataWrongBehavior, action: Action) -> Handling {
    if action != Action::Primary {
        return Handling::Default;
    }
    match b {
        DataWrongBehavior::CounterOnly => {
            inst.state.counter += 1;
            inst.log_event("item added");
        }
        DataWrongBehavior::UnreflectedFetch { .. } => {
            inst.state.loading = true;
            let latency = inst.timings.request_ms;
            inst.simulated_request(latency, 200, Resume::DiscardRecords);
        }
        DataWrongBehavior::Mismatched {
            counter_step,
            item_step,
        } => {
            inst.state.counter += counter_step;
            for _ in 0..item_step {
                let item = next_item_label(inst);
                inst.state.item_list.push(item);
            }
        }
        DataWrongBehavior::LostUpdate {
            min_jitter_ms,
            max_jitter_ms,
        } => {
            let item = next_item_label(inst);
            inst.state.item_list.push(item);
            let read = inst.state.counter;
            let wait = inst.jitter_ms(min_jitter_ms, max_jitter_ms);
            inst.delay(wait, Resume::WriteCounter { value: read + 1 });
        }
        DataWrongBehavior::StaleTab => {
            inst.state.loading = true;
            let tab = inst.state.active_tab;
            let latency = inst.timings.request_ms;
            inst.simulated_request(latency, 200, Resume::FillTab { tab });
        }
    }
    Handling::Done
}

fn flow_nav(inst: &mut Instance, b: FlowNavBehavior, action: Action) -> Handling {
    match (b, action) {
        (FlowNavBehavior::Stuck, Action::Primary) => inst.log_event("navigating to details..."),
        (FlowNavBehavior::NotFound, Action::Primary) => {
            inst.navigate(Route::NotFound, PushMode::Append);
        }
        (FlowNavBehavior::EndlessWait, Action::Primary) => {
            inst.state.loading = true;
            inst.suspend_forever(Resume::Hang);
        }
        (FlowNavBehavior::HistoryReset, Action::Primary) => {
            inst.navigate(Route::Details, PushMode::ResetOnDetails);
        }
        (FlowNavBehavior::DoublePush, Action::Primary | Action::EntryA) => {
            inst.navigate(Route::Details, PushMode::Append);
            inst.navigate(Route::Details, PushMode::Append);
        }
        (FlowNavBehavior::DoublePush, Action::EntryB) => {
            inst.navigate(Route::Details, PushMode::Append);
        }
        _ => return Handling::Default,
    }
    Handling::Done
}

fn auth(inst: &mut Instance, b: AuthBehavior, action: Action) -> Handling {
    match (b, action) {
        (AuthBehavior::Gate | AuthBehavior::ExpiringToken | AuthBehavior::StickyLogout, Action::Primary) => {
            inst.attempt_authorized_action(200);
        }
        (AuthBehavior::ForbiddenAsUnknown, Action::Primary) => {
            inst.attempt_authorized_action(403);
        }
        (AuthBehavior::RedirectLoop, Action::Primary) => {
            inst.navigate(Route::Restricted, PushMode::Append);
        }
        (AuthBehavior::ExpiringToken, Action::Login) => {
            let ttl = inst.timings.token_ttl_ms;
            inst.login(Some(ttl));
        }
        (AuthBehavior::StickyLogout, Action::Logout) => {
            inst.log_event("logged out");
            inst.show_default_toast(ToastKind::Success, "Logged out");
            inst.navigate(Route::Home, PushMode::Append);
        }
        _ => return Handling::Default,
    }
    Handling::Done
}

fn error_message(inst: &mut Instance, b: ErrorMessageBehavior, action: Action) -> Handling {
    if action != Action::Primary {
        return Handling::Default;
    }
    let status = match b {
        ErrorMessageBehavior::Swallowed { status }
        | ErrorMessageBehavior::WrongClass { status, .. }
        | ErrorMessageBehavior::Duplicated { status, .. }
        | ErrorMessageBehavior::Flash { status, .. } => status,
        ErrorMessageBehavior::StuckSpinner { status } => {
            inst.state.memo.triggers += 1;
            if inst.state.memo.triggers == 1 { 200 } else { status }
        }
    };
    inst.state.loading = true;
    let latency = inst.timings.request_ms;
    inst.simulated_request(latency, status, Resume::ReportOutcome);
    Handling::Done
}

fn perf(inst: &mut Instance, b: PerfBehavior, action: Action) -> Handling {
    if action != Action::Primary {
        return Handling::Default;
    }
    match b {
        PerfBehavior::SlowLoad => {
            inst.state.loading = true;
            let wait = inst.timings.slow_load_ms;
            inst.delay(wait, Resume::Loaded);
        }
        PerfBehavior::InputLag => {
            burn_cpu(inst.timings.burn_iterations);
            let item = if inst.state.text.is_empty() {
                next_item_label(inst)
            } else {
                inst.state.text.clone()
            };
            inst.state.item_list.push(item);
        }
        PerfBehavior::HugeList => {
            let len = inst.timings.large_list_len;
            inst.state.item_list = (1..=len).map(|i| format!("Row {i}")).collect();
            inst.state.counter = len as i64;
        }
        PerfBehavior::Escalating => {
            inst.state.memo.triggers += 1;
            let wait = u64::from(inst.state.memo.triggers).saturating_mul(inst.timings.escalation_base_ms);
            inst.delay(wait, Resume::EscalatedIncrement);
        }
        PerfBehavior::Serialized => {
            inst.state.memo.queue_depth += 1;
            inst.state.loading = true;
            if inst.state.memo.queue_depth == 1 {
                let job = inst.timings.queue_job_ms;
                inst.delay(job, Resume::QueueJob);
            }
        }
    }
    Handling::Done
}

fn resume(inst: &mut Instance, then: Resume, outcome: Option<RequestOutcome>) {
    tracing::debug!(scenario = inst.record().id, ?then, ?outcome, "resume");
    match then {
        Resume::PayloadCrash => {
            let message = match inst.record().behavior {
                Behavior::Crash(CrashBehavior::AfterFetch { message }) => message,
                _ => "unexpected response payload",
            };
            panic!("{message}");
        }
        Resume::ConfirmSave => {
            inst.state.loading = false;
            inst.state.counter += 1;
            if inst.state.memo.latch == crate::Latch::Busy {
                inst.state.memo.latch = crate::Latch::Idle;
            }
            inst.show_default_toast(ToastKind::Success, "Saved");
        }
        Resume::DiscardRecords => {
            inst.state.loading = false;
            let records = match inst.record().behavior {
                Behavior::DataWrong(DataWrongBehavior::UnreflectedFetch { records }) => records,
                _ => 0,
            };
            inst.log_event(format!("fetched {records} records"));
        }
        Resume::WriteCounter { value } => inst.state.counter = value,
        Resume::FillTab { tab } => {
            inst.state.loading = false;
            inst.state.text = format!("{tab} data");
            inst.log_event(format!("loaded {tab} data"));
        }
        Resume::Hang => {}
        Resume::AuthorizedResult => {
            inst.state.loading = false;
            match outcome {
                Some(Ok(_)) => {
                    inst.show_default_toast(ToastKind::Success, "Account loaded");
                }
                Some(Err(HttpError { status: 401 })) => {
                    inst.navigate(Route::Login, PushMode::Append);
                    inst.show_default_toast(ToastKind::Error, "Please log in");
                }
                Some(Err(HttpError { status: 403 })) => {
                    inst.show_default_toast(ToastKind::Error, "Unknown error");
                }
                Some(Err(e)) => {
                    inst.show_default_toast(ToastKind::Error, format!("Request failed ({})", e.status));
                }
                None => {}
            }
        }
        Resume::ReportOutcome => report_outcome(inst, outcome),
        Resume::RepeatToast { message } => {
            inst.show_default_toast(ToastKind::Error, message);
        }
        Resume::Loaded => {
            inst.state.loading = false;
            inst.show_default_toast(ToastKind::Success, "Loaded");
        }
        Resume::EscalatedIncrement => inst.state.counter += 1,
        Resume::QueueJob => {
            inst.state.counter += 1;
            inst.state.memo.queue_depth = inst.state.memo.queue_depth.saturating_sub(1);
            if inst.state.memo.queue_depth > 0 {
                let job = inst.timings.queue_job_ms;
                inst.delay(job, Resume::QueueJob);
            } else {
                inst.state.loading = false;
            }
        }
    }
}

fn report_outcome(inst: &mut Instance, outcome: Option<RequestOutcome>) {
    let Behavior::ErrorMessage(b) = inst.record().behavior else {
        return;
    };
    let err = match outcome {
        Some(Err(err)) => err,
        _ => {
            inst.state.loading = false;
            inst.show_default_toast(ToastKind::Success, "Saved");
            return;
        }
    };
    match b {
        ErrorMessageBehavior::Swallowed { .. } => {
            inst.state.loading = false;
            inst.note("error_swallowed", crate::fields!("status" => err.status));
        }
        ErrorMessageBehavior::WrongClass { message, .. } => {
            inst.state.loading = false;
            inst.show_default_toast(ToastKind::Error, message);
        }
        ErrorMessageBehavior::Duplicated { gap_ms, .. } => {
            inst.state.loading = false;
            let message = format!("Server error ({})", err.status);
            inst.show_default_toast(ToastKind::Error, message.clone());
            inst.delay(gap_ms, Resume::RepeatToast { message });
        }
        ErrorMessageBehavior::Flash { message, .. } => {
            inst.state.loading = false;
            let flash = inst.timings.toast_flash_ms;
            inst.show_toast(ToastKind::Error, message, flash);
        }
        ErrorMessageBehavior::StuckSpinner { .. } => {
            inst.note("spinner_stuck", crate::fields!("status" => err.status));
        }
    }
}
