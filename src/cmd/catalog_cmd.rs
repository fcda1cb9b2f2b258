//! `list` and `show`: read-only views of the built-in catalog.

use serde::Serialize;

use crate::{Action, Catalog, Category, HarnessResult, ScenarioRecord, Tier};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioListing {
    pub id: &'static str,
    pub category: Category,
    pub complexity_tier: Tier,
    pub title: &'static str,
}

/// Lists scenarios, optionally narrowed to one category and/or an id glob.
pub fn list_scenarios(
    category: Option<Category>,
    filter: Option<&str>,
) -> HarnessResult<Vec<ScenarioListing>> {
    let catalog = Catalog::builtin();
    let records: Vec<&ScenarioRecord> = match filter {
        Some(pattern) => catalog.matching(pattern)?,
        None => catalog.iter().collect(),
    };
    Ok(records
        .into_iter()
        .filter(|r| category.is_none_or(|c| r.category == c))
        .map(|r| ScenarioListing {
            id: r.id,
            category: r.category,
            complexity_tier: r.complexity_tier,
            title: r.title,
        })
        .collect())
}

pub fn pretty_listing(listing: &[ScenarioListing]) -> String {
    let mut out = String::new();
    let mut current: Option<Category> = None;
    for row in listing {
        if current != Some(row.category) {
            out.push_str(&format!("{}\n", row.category));
            current = Some(row.category);
        }
        out.push_str(&format!("  {:<18} {:?}  {}\n", row.id, row.complexity_tier, row.title));
    }
    if listing.is_empty() {
        out.push_str("no scenarios match\n");
    }
    out.trim_end().to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioDetail {
    #[serde(flatten)]
    pub record: &'static ScenarioRecord,
    pub actions: Vec<Action>,
}

impl ScenarioDetail {
    pub fn pretty(&self) -> String {
        let r = self.record;
        let mut out = format!(
            "{} [{} {:?}] {}\n",
            r.id, r.category, r.complexity_tier, r.title
        );
        out.push_str("actions: ");
        out.push_str(&self.actions.iter().map(|a| a.as_str()).collect::<Vec<_>>().join(", "));
        out.push('\n');
        for (i, hint) in r.hint_steps.iter().enumerate() {
            out.push_str(&format!("  {}. {hint}\n", i + 1));
        }
        out.trim_end().to_string()
    }
}

pub fn show_scenario(id: &str) -> HarnessResult<ScenarioDetail> {
    let record = Catalog::builtin().get(id)?;
    Ok(ScenarioDetail {
        record,
        actions: record.behavior.actions(),
    })
}
