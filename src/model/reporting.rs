//! Reporting types and renderers.

use serde::{Deserialize, Serialize};

use crate::{Catalog, Category, FaultRecord, ScenarioSnapshot, Tier, ToastKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reporter {
    Pretty,
    Json,
}

impl clap::ValueEnum for Reporter {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Pretty, Self::Json]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Pretty => clap::builder::PossibleValue::new("pretty"),
            Self::Json => clap::builder::PossibleValue::new("json"),
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExitStatus {
    Pass,
    Fail,
    Error,
    Crash,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            Self::Pass => 0,
            Self::Fail => 1,
            Self::Error => 2,
            Self::Crash => 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    Assertion,
    Fault,
    Harness,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub status: ExitStatus,
    pub scenario: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    pub seed: u64,
    pub started_at: String,
    pub duration_ms: u64,
    pub steps_run: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub faults: Vec<FaultRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline_path: Option<String>,
    pub final_view: View,
}

impl RunSummary {
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "status={:?} scenario={} seed={} durationMs={} steps={}\n",
            self.status, self.scenario, self.seed, self.duration_ms, self.steps_run
        ));
        if let Some(script) = &self.script {
            out.push_str(&format!("script={script}\n"));
        }
        if let Some(path) = &self.timeline_path {
            out.push_str(&format!("timeline={path}\n"));
        }
        for finding in &self.findings {
            match finding.step {
                Some(step) => out.push_str(&format!(
                    "- {:?} (step {step}): {}: {}\n",
                    finding.kind, finding.title, finding.message
                )),
                None => out.push_str(&format!(
                    "- {:?}: {}: {}\n",
                    finding.kind, finding.title, finding.message
                )),
            }
        }
        for fault in &self.faults {
            out.push_str(&format!(
                "fault: {} at {}ms: {}\n",
                fault.scenario_id, fault.time_ms, fault.fault_message
            ));
        }
        out.push_str(&self.final_view.pretty());
        out.trim_end().to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioEntry {
    pub id: &'static str,
    pub title: &'static str,
    pub complexity_tier: Tier,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup {
    pub category: Category,
    pub scenarios: Vec<ScenarioEntry>,
}

/// What the harness is currently showing.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    Catalog {
        categories: Vec<CategoryGroup>,
    },
    Running {
        scenario: String,
        snapshot: Box<ScenarioSnapshot>,
    },
    #[serde(rename_all = "camelCase")]
    Faulted {
        scenario_id: String,
        fault_message: String,
    },
}

impl View {
    pub fn catalog(catalog: &Catalog) -> Self {
        let categories = catalog
            .list_by_category()
            .into_iter()
            .map(|(category, records)| CategoryGroup {
                category,
                scenarios: records
                    .into_iter()
                    .map(|r| ScenarioEntry {
                        id: r.id,
                        title: r.title,
                        complexity_tier: r.complexity_tier,
                    })
                    .collect(),
            })
            .collect();
        Self::Catalog { categories }
    }

    pub fn running(snapshot: ScenarioSnapshot) -> Self {
        Self::Running {
            scenario: snapshot.scenario_id.clone(),
            snapshot: Box::new(snapshot),
        }
    }

    pub fn faulted(fault: &FaultRecord) -> Self {
        Self::Faulted {
            scenario_id: fault.scenario_id.clone(),
            fault_message: fault.fault_message.clone(),
        }
    }

    pub fn pretty(&self) -> String {
        let mut out = String::new();
        match self {
            Self::Catalog { categories } => {
                for group in categories {
                    out.push_str(&format!("{}\n", group.category));
                    for s in &group.scenarios {
                        out.push_str(&format!("  {:<18} {:?}  {}\n", s.id, s.complexity_tier, s.title));
                    }
                }
            }
            Self::Running { scenario, snapshot } => {
                let state = &snapshot.state;
                out.push_str(&format!("running {scenario}: {}\n", snapshot.title));
                out.push_str(&format!(
                    "  t={}ms route={} history={:?} tab={}\n",
                    snapshot.elapsed_ms,
                    snapshot.route,
                    state.route_history.entries(),
                    state.active_tab
                ));
                out.push_str(&format!(
                    "  counter={} items={} loading={} checkbox={} text={:?}\n",
                    state.counter,
                    state.item_list.len(),
                    state.loading,
                    state.checkbox,
                    state.text
                ));
                if let Some(toast) = &state.toast {
                    let kind = match toast.kind {
                        ToastKind::Success => "success",
                        ToastKind::Error => "error",
                    };
                    out.push_str(&format!(
                        "  toast[{kind}] {:?} until {}ms\n",
                        toast.message, toast.expires_at_ms
                    ));
                }
                if state.auth_token.is_some() {
                    out.push_str("  signed in\n");
                }
                if state.visual_defect_flags.any() {
                    out.push_str(&format!("  flags={:?}\n", state.visual_defect_flags));
                }
                if let Some(event) = state.event_log.latest() {
                    out.push_str(&format!("  last event: {event}\n"));
                }
                out.push_str(&format!(
                    "  pending timers={} suspensions={}\n",
                    snapshot.pending_timers, snapshot.pending_suspensions
                ));
            }
            Self::Faulted {
                scenario_id,
                fault_message,
            } => {
                out.push_str(&format!("scenario {scenario_id} crashed: {fault_message}\n"));
                out.push_str("  [return to catalog]\n");
            }
        }
        out.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_match_cli_contract() {
        assert_eq!(ExitStatus::Pass.code(), 0);
        assert_eq!(ExitStatus::Fail.code(), 1);
        assert_eq!(ExitStatus::Error.code(), 2);
        assert_eq!(ExitStatus::Crash.code(), 4);
    }

    #[test]
    fn catalog_view_groups_every_scenario() {
        let view = View::catalog(Catalog::builtin());
        let View::Catalog { categories } = &view else {
            panic!("expected catalog view");
        };
        assert_eq!(categories.len(), 8);
        assert_eq!(categories.iter().map(|g| g.scenarios.len()).sum::<usize>(), 40);
        let json = serde_json::to_value(&view).expect("json");
        assert_eq!(json["view"], "catalog");
    }

    #[test]
    fn faulted_view_names_scenario_and_message() {
        let view = View::faulted(&FaultRecord {
            scenario_id: "crash_01".into(),
            fault_message: "boom".into(),
            time_ms: 0,
        });
        assert!(view.pretty().contains("crash_01 crashed: boom"));
        let json = serde_json::to_value(&view).expect("json");
        assert_eq!(json["scenarioId"], "crash_01");
        assert_eq!(json["faultMessage"], "boom");
    }
}
