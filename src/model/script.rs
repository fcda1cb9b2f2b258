//! Recording script files: one scenario, a list of steps with inline assertions.

use serde::{Deserialize, Serialize};

use std::path::Path;

use crate::{Action, HarnessError, HarnessResult, Input, Route, Tab, parse_duration_ms};

pub const SCRIPT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptFile {
    pub version: u32,
    pub name: String,
    pub scenario: String,
    pub steps: Vec<ScriptStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptStep {
    Trigger {
        action: Action,
    },
    SetText {
        value: String,
    },
    SetCheckbox {
        checked: bool,
    },
    SwitchTab {
        tab: Tab,
    },
    Advance {
        duration: String,
    },
    AssertRoute {
        equals: Route,
    },
    AssertCounter {
        equals: i64,
    },
    AssertItems {
        len: usize,
    },
    AssertToast {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        absent: Option<bool>,
    },
    AssertFaulted {
        #[serde(default)]
        contains: Option<String>,
    },
    ReturnToCatalog,
}

impl ScriptStep {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Trigger { .. } => "trigger",
            Self::SetText { .. } => "set_text",
            Self::SetCheckbox { .. } => "set_checkbox",
            Self::SwitchTab { .. } => "switch_tab",
            Self::Advance { .. } => "advance",
            Self::AssertRoute { .. } => "assert_route",
            Self::AssertCounter { .. } => "assert_counter",
            Self::AssertItems { .. } => "assert_items",
            Self::AssertToast { .. } => "assert_toast",
            Self::AssertFaulted { .. } => "assert_faulted",
            Self::ReturnToCatalog => "return_to_catalog",
        }
    }

    /// The input edit this step performs, if any.
    pub fn as_input(&self) -> Option<Input> {
        match self {
            Self::SetText { value } => Some(Input::Text {
                value: value.clone(),
            }),
            Self::SetCheckbox { checked } => Some(Input::Checkbox { checked: *checked }),
            Self::SwitchTab { tab } => Some(Input::Tab { tab: *tab }),
            _ => None,
        }
    }

    /// Parses the compact `exec --step` syntax: an action name,
    /// `advance:<duration>`, `text:<value>`, `check`, `uncheck`, `tab:<tab>`
    /// or `return`.
    pub fn parse_inline(raw: &str) -> HarnessResult<Self> {
        let raw = raw.trim();
        if let Some((head, rest)) = raw.split_once(':') {
            return match head {
                "advance" => {
                    parse_duration_ms(rest)?;
                    Ok(Self::Advance {
                        duration: rest.trim().to_string(),
                    })
                }
                "text" => Ok(Self::SetText {
                    value: rest.to_string(),
                }),
                "tab" => Ok(Self::SwitchTab { tab: rest.trim().parse()? }),
                _ => Err(HarnessError::InvalidArgument(format!(
                    "unknown step prefix {head:?} (expected advance:, text: or tab:)"
                ))),
            };
        }
        match raw {
            "check" => Ok(Self::SetCheckbox { checked: true }),
            "uncheck" => Ok(Self::SetCheckbox { checked: false }),
            "return" => Ok(Self::ReturnToCatalog),
            other => Ok(Self::Trigger {
                action: other.parse()?,
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Script {
    pub name: String,
    pub scenario: String,
    pub steps: Vec<ScriptStep>,
}

impl Script {
    pub fn load(path: &Path) -> HarnessResult<Self> {
        let bytes = std::fs::read(path)?;
        let file: ScriptFile = serde_json::from_slice(&bytes).map_err(|err| {
            HarnessError::Script(format!(
                "failed to parse script {}: {err}. expected {{version,name,scenario,steps:[{{type:...}}]}}",
                path.display()
            ))
        })?;
        Self::from_file(file)
    }

    pub fn from_file(file: ScriptFile) -> HarnessResult<Self> {
        if file.version != SCRIPT_VERSION {
            return Err(HarnessError::Script(format!(
                "unsupported script version {} (expected {SCRIPT_VERSION})",
                file.version
            )));
        }
        let script = Self {
            name: file.name,
            scenario: file.scenario,
            steps: file.steps,
        };
        script.validate()?;
        Ok(script)
    }

    /// Builds a script from `exec` arguments.
    pub fn from_inline(scenario: &str, steps: &[String]) -> HarnessResult<Self> {
        let steps = steps
            .iter()
            .map(|s| ScriptStep::parse_inline(s))
            .collect::<HarnessResult<Vec<_>>>()?;
        let script = Self {
            name: format!("exec {scenario}"),
            scenario: scenario.to_string(),
            steps,
        };
        script.validate()?;
        Ok(script)
    }

    pub fn validate(&self) -> HarnessResult<()> {
        if self.scenario.trim().is_empty() {
            return Err(HarnessError::Script("script names no scenario".to_string()));
        }
        for (index, step) in self.steps.iter().enumerate() {
            match step {
                ScriptStep::Advance { duration } => {
                    parse_duration_ms(duration).map_err(|err| {
                        HarnessError::Script(format!("step {index} (advance): {err}"))
                    })?;
                }
                ScriptStep::AssertToast {
                    message: Some(_),
                    absent: Some(true),
                } => {
                    return Err(HarnessError::Script(format!(
                        "step {index} (assert_toast): cannot set both message and absent=true"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_script_json() {
        let raw = r#"{
            "version": 1,
            "name": "empty input toast",
            "scenario": "crash_02",
            "steps": [
                {"type": "trigger", "action": "primary"},
                {"type": "assert_toast", "message": "Please type something first"},
                {"type": "advance", "duration": "2s"},
                {"type": "assert_toast", "absent": true},
                {"type": "switch_tab", "tab": "settings"},
                {"type": "return_to_catalog"}
            ]
        }"#;
        let file: ScriptFile = serde_json::from_str(raw).expect("parse");
        let script = Script::from_file(file).expect("valid");
        assert_eq!(script.steps.len(), 6);
        assert_eq!(script.steps[0].kind_name(), "trigger");
        assert_eq!(
            script.steps[4].as_input(),
            Some(Input::Tab { tab: Tab::Settings })
        );
    }

    #[test]
    fn rejects_unsupported_version_and_bad_duration() {
        let file = ScriptFile {
            version: 2,
            name: "v2".into(),
            scenario: "crash_01".into(),
            steps: vec![],
        };
        assert!(Script::from_file(file).is_err());

        let file = ScriptFile {
            version: 1,
            name: "bad".into(),
            scenario: "crash_01".into(),
            steps: vec![ScriptStep::Advance {
                duration: "soon".into(),
            }],
        };
        let err = Script::from_file(file).expect_err("bad duration");
        assert!(err.to_string().contains("step 0 (advance)"));
    }

    #[test]
    fn rejects_contradictory_toast_assertion() {
        let file = ScriptFile {
            version: 1,
            name: "toast".into(),
            scenario: "crash_02".into(),
            steps: vec![ScriptStep::AssertToast {
                message: Some("x".into()),
                absent: Some(true),
            }],
        };
        assert!(Script::from_file(file).is_err());
    }

    #[test]
    fn inline_steps_cover_the_compact_syntax() {
        let steps: Vec<String> = [
            "primary",
            "advance:250ms",
            "text:hello world",
            "check",
            "uncheck",
            "tab:activity",
            "entry_b",
            "return",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let script = Script::from_inline("flow_nav_05", &steps).expect("inline");
        assert_eq!(
            script.steps,
            vec![
                ScriptStep::Trigger { action: Action::Primary },
                ScriptStep::Advance { duration: "250ms".into() },
                ScriptStep::SetText { value: "hello world".into() },
                ScriptStep::SetCheckbox { checked: true },
                ScriptStep::SetCheckbox { checked: false },
                ScriptStep::SwitchTab { tab: Tab::Activity },
                ScriptStep::Trigger { action: Action::EntryB },
                ScriptStep::ReturnToCatalog,
            ]
        );
        assert!(Script::from_inline("x", &["jump".to_string()]).is_err());
        assert!(Script::from_inline("x", &["advance:soon".to_string()]).is_err());
        assert!(Script::from_inline("x", &["tab:billing".to_string()]).is_err());
    }
}
