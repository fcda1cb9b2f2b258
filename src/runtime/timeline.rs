//! Per-instance timeline of dispatches, timer firings and state notes.

use serde::{Deserialize, Serialize};

use std::path::Path;

use crate::HarnessResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub index: usize,
    pub time_ms: u64,
    pub name: String,
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub fn push(
        &mut self,
        time_ms: u64,
        name: impl Into<String>,
        fields: serde_json::Map<String, serde_json::Value>,
    ) {
        let index = self.entries.len();
        self.entries.push(TimelineEntry {
            index,
            time_ms,
            name: name.into(),
            fields,
        });
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }
}

pub fn write_timeline(entries: &[TimelineEntry], out_path: &Path) -> HarnessResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(out_path, serde_json::to_vec_pretty(entries)?)?;
    Ok(())
}

/// Builds a field map from `key => value` pairs.
#[macro_export]
macro_rules! fields {
    () => { serde_json::Map::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = serde_json::Map::new();
        $(map.insert($key.to_string(), serde_json::json!($value));)+
        map
    }};
}
