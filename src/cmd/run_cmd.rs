//! `run` and `exec`: drive a session through a script and summarize it.

use uuid::Uuid;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{
    ClockMode, Config, ExitStatus, FaultRecord, Finding, FindingKind, HarnessResult, RunSummary,
    Script, ScriptStep, SessionController, TimelineEntry, View, parse_duration_ms,
    wall_time_iso_utc, write_timeline,
};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub seed: Option<u64>,
    /// Use the wall clock instead of virtual time.
    pub wall: bool,
    /// Where to write the timeline; defaults to `<base_dir>/timelines/<run id>.json`.
    pub timeline_out: Option<PathBuf>,
}

pub fn run_script(config: &Config, path: &Path, opt: &RunOptions) -> HarnessResult<RunSummary> {
    let script = Script::load(path)?;
    let mut summary = execute_script(config, &script, opt)?;
    summary.script = Some(path.display().to_string());
    Ok(summary)
}

pub fn exec_inline(
    config: &Config,
    scenario: &str,
    steps: &[String],
    opt: &RunOptions,
) -> HarnessResult<RunSummary> {
    let script = Script::from_inline(scenario, steps)?;
    execute_script(config, &script, opt)
}

/// Runs `script` in a fresh session. Unknown scenarios fail before anything
/// runs; everything after that is reported in the summary.
pub fn execute_script(config: &Config, script: &Script, opt: &RunOptions) -> HarnessResult<RunSummary> {
    let mut config = config.clone();
    if let Some(seed) = opt.seed {
        config.seed = seed;
    }
    if opt.wall {
        config.clock = ClockMode::Wall;
    }

    let run_id = Uuid::new_v4().to_string();
    let started_at = wall_time_iso_utc();
    let mut session = SessionController::new(config.clone());
    session.select(&script.scenario)?;
    tracing::info!(run_id = %run_id, script = %script.name, scenario = %script.scenario, "running script");

    let mut ctx = RunCtx::default();
    for (index, step) in script.steps.iter().enumerate() {
        if let Err(finding) = ctx.run_step(&mut session, index, step) {
            tracing::debug!(step = index, kind = step.kind_name(), "step failed");
            ctx.findings.push(finding);
            break;
        }
        ctx.steps_run += 1;
    }
    let final_view = session.view();
    let closed = session.return_to_catalog();
    ctx.append_timeline(&closed);

    let faults = session.fault_log().to_vec();
    if !ctx.fault_expected {
        for fault in &faults {
            ctx.findings.push(Finding {
                kind: FindingKind::Fault,
                title: format!("uncaught fault in {}", fault.scenario_id),
                message: fault.fault_message.clone(),
                step: None,
            });
        }
    }
    let status = if ctx.findings.iter().any(|f| f.kind == FindingKind::Harness) {
        ExitStatus::Error
    } else if ctx.findings.iter().any(|f| f.kind == FindingKind::Assertion) {
        ExitStatus::Fail
    } else if !faults.is_empty() && !ctx.fault_expected {
        ExitStatus::Crash
    } else {
        ExitStatus::Pass
    };

    let timeline_path = opt
        .timeline_out
        .clone()
        .unwrap_or_else(|| config.timelines_dir().join(format!("{run_id}.json")));
    write_timeline(&ctx.timeline, &timeline_path)?;
    if !faults.is_empty() {
        append_fault_log(&faults, &config.faults_path())?;
    }

    Ok(RunSummary {
        status,
        scenario: script.scenario.clone(),
        script: None,
        seed: config.seed,
        started_at,
        duration_ms: ctx.elapsed_ms,
        steps_run: ctx.steps_run,
        findings: ctx.findings,
        faults,
        timeline_path: Some(timeline_path.display().to_string()),
        final_view,
    })
}

/// Appends `faults` to the JSON array at `path`, creating it if needed.
pub fn append_fault_log(faults: &[FaultRecord], path: &Path) -> HarnessResult<()> {
    let mut all: Vec<FaultRecord> = match std::fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes)?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(err) => return Err(err.into()),
    };
    all.extend_from_slice(faults);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_vec_pretty(&all)?)?;
    Ok(())
}

#[derive(Debug, Default)]
struct RunCtx {
    steps_run: usize,
    elapsed_ms: u64,
    fault_expected: bool,
    findings: Vec<Finding>,
    timeline: Vec<TimelineEntry>,
}

impl RunCtx {
    fn run_step(
        &mut self,
        session: &mut SessionController,
        index: usize,
        step: &ScriptStep,
    ) -> Result<(), Finding> {
        let harness = |err: crate::HarnessError| Finding {
            kind: FindingKind::Harness,
            title: format!("{} could not run", step.kind_name()),
            message: err.to_string(),
            step: Some(index),
        };
        let assertion = |message: String| Finding {
            kind: FindingKind::Assertion,
            title: format!("{} failed", step.kind_name()),
            message,
            step: Some(index),
        };

        if let Some(input) = step.as_input() {
            return session.input(input).map_err(harness);
        }
        match step {
            ScriptStep::Trigger { action } => session.trigger(*action).map_err(harness),
            ScriptStep::Advance { duration } => {
                let ms = parse_duration_ms(duration).map_err(harness)?;
                session.advance(Duration::from_millis(ms)).map_err(harness)?;
                self.elapsed_ms = self.elapsed_ms.saturating_add(ms);
                Ok(())
            }
            ScriptStep::AssertRoute { equals } => {
                let route = running_state(session, step)?.route();
                if route == *equals {
                    Ok(())
                } else {
                    Err(assertion(format!("route is {route}, expected {equals}")))
                }
            }
            ScriptStep::AssertCounter { equals } => {
                let counter = running_state(session, step)?.counter;
                if counter == *equals {
                    Ok(())
                } else {
                    Err(assertion(format!("counter is {counter}, expected {equals}")))
                }
            }
            ScriptStep::AssertItems { len } => {
                let actual = running_state(session, step)?.item_list.len();
                if actual == *len {
                    Ok(())
                } else {
                    Err(assertion(format!("itemList has {actual} entries, expected {len}")))
                }
            }
            ScriptStep::AssertToast { message, absent } => {
                let toast = running_state(session, step)?.toast.as_ref();
                match (toast, message, absent) {
                    (None, _, Some(true)) => Ok(()),
                    (Some(t), _, Some(true)) => Err(assertion(format!("toast {:?} still visible", t.message))),
                    (None, _, _) => Err(assertion("no toast visible".to_string())),
                    (Some(t), Some(want), _) if t.message != *want => {
                        Err(assertion(format!("toast is {:?}, expected {want:?}", t.message)))
                    }
                    (Some(_), _, _) => Ok(()),
                }
            }
            ScriptStep::AssertFaulted { contains } => match session.view() {
                View::Faulted { fault_message, .. } => match contains {
                    Some(needle) if !fault_message.contains(needle.as_str()) => Err(assertion(format!(
                        "fault {fault_message:?} does not contain {needle:?}"
                    ))),
                    _ => {
                        self.fault_expected = true;
                        Ok(())
                    }
                },
                _ => Err(assertion("scenario has not faulted".to_string())),
            },
            ScriptStep::ReturnToCatalog => {
                let closed = session.return_to_catalog();
                self.append_timeline(&closed);
                Ok(())
            }
            ScriptStep::SetText { .. } | ScriptStep::SetCheckbox { .. } | ScriptStep::SwitchTab { .. } => {
                Ok(())
            }
        }
    }

    /// Appends one instance's timeline, renumbered to follow what is already collected.
    fn append_timeline(&mut self, entries: &[TimelineEntry]) {
        let offset = self.timeline.len();
        self.timeline.extend(entries.iter().cloned().enumerate().map(|(i, mut e)| {
            e.index = offset + i;
            e
        }));
    }
}

fn running_state<'a>(
    session: &'a SessionController,
    step: &ScriptStep,
) -> Result<&'a crate::SessionState, Finding> {
    session.state().ok_or_else(|| Finding {
        kind: FindingKind::Assertion,
        title: format!("{} failed", step.kind_name()),
        message: "no scenario is running".to_string(),
        step: None,
    })
}
