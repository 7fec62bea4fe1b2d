//! Workspace catalog entries
//!
//! The surrounding application lists reports, dashboards and datasets side by side. Each kind
//! carries its own payload; [`CatalogItem`] gives them a common shape for listing and sorting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::store::ModelStore;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub title: String,
    pub owner: String,
    pub modified: DateTime<Utc>,
    /// Dataset the report reads from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<Uuid>,
    #[serde(default)]
    pub page_count: usize,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub id: Uuid,
    pub title: String,
    pub owner: String,
    pub modified: DateTime<Utc>,
    /// Reports pinned to the dashboard
    #[serde(default)]
    pub pinned_reports: Vec<Uuid>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: Uuid,
    pub title: String,
    pub owner: String,
    pub modified: DateTime<Utc>,
    pub table_count: usize,
    pub relationship_count: usize,
    pub measure_count: usize,
    /// Names of the fact tables, sorted
    #[serde(default)]
    pub fact_tables: Vec<String>,
}

impl Dataset {
    /// Summarize a model as a catalog entry stamped with the current time
    pub fn describe(store: &ModelStore, title: impl Into<String>, owner: impl Into<String>) -> Self {
        let mut fact_tables: Vec<String> = store
            .get_tables()
            .into_iter()
            .filter(|t| t.is_fact_table)
            .map(|t| t.name.clone())
            .collect();
        fact_tables.sort();

        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            owner: owner.into(),
            modified: Utc::now(),
            table_count: store.table_count(),
            relationship_count: store.get_relationships().len(),
            measure_count: store.get_measures().len(),
            fact_tables,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CatalogItem {
    Report(Report),
    Dashboard(Dashboard),
    Dataset(Dataset),
}

impl CatalogItem {
    pub fn id(&self) -> Uuid {
        match self {
            CatalogItem::Report(r) => r.id,
            CatalogItem::Dashboard(d) => d.id,
            CatalogItem::Dataset(d) => d.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            CatalogItem::Report(r) => &r.title,
            CatalogItem::Dashboard(d) => &d.title,
            CatalogItem::Dataset(d) => &d.title,
        }
    }

    pub fn owner(&self) -> &str {
        match self {
            CatalogItem::Report(r) => &r.owner,
            CatalogItem::Dashboard(d) => &d.owner,
            CatalogItem::Dataset(d) => &d.owner,
        }
    }

    pub fn modified(&self) -> DateTime<Utc> {
        match self {
            CatalogItem::Report(r) => r.modified,
            CatalogItem::Dashboard(d) => d.modified,
            CatalogItem::Dataset(d) => d.modified,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CatalogItem::Report(_) => "report",
            CatalogItem::Dashboard(_) => "dashboard",
            CatalogItem::Dataset(_) => "dataset",
        }
    }
}

impl From<Report> for CatalogItem {
    fn from(report: Report) -> Self {
        CatalogItem::Report(report)
    }
}

impl From<Dashboard> for CatalogItem {
    fn from(dashboard: Dashboard) -> Self {
        CatalogItem::Dashboard(dashboard)
    }
}

impl From<Dataset> for CatalogItem {
    fn from(dataset: Dataset) -> Self {
        CatalogItem::Dataset(dataset)
    }
}

/// Most recently modified first; ties are broken by title
pub fn sort_recent_first(items: &mut [CatalogItem]) {
    items.sort_by(|a, b| {
        b.modified()
            .cmp(&a.modified())
            .then_with(|| a.title().cmp(b.title()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::demo::create_demo_model;
    use crate::core::layout::LayoutConfig;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    fn report(title: &str, hour: u32) -> CatalogItem {
        Report {
            id: Uuid::new_v4(),
            title: title.to_string(),
            owner: "ana".to_string(),
            modified: at(hour),
            dataset: None,
            page_count: 1,
        }
        .into()
    }

    #[test]
    fn test_describe_dataset() {
        let store = create_demo_model(LayoutConfig::default()).unwrap();
        let before = Utc::now() - Duration::seconds(1);

        let dataset = Dataset::describe(&store, "Retail", "ana");
        assert_eq!(dataset.title, "Retail");
        assert_eq!(dataset.owner, "ana");
        assert_eq!(dataset.table_count, 3);
        assert_eq!(dataset.relationship_count, 2);
        assert_eq!(dataset.measure_count, 1);
        assert_eq!(dataset.fact_tables, vec!["Sales".to_string()]);
        assert!(dataset.modified >= before);
    }

    #[test]
    fn test_common_accessors() {
        let dashboard = Dashboard {
            id: Uuid::new_v4(),
            title: "Overview".to_string(),
            owner: "li".to_string(),
            modified: at(9),
            pinned_reports: vec![],
        };
        let item = CatalogItem::from(dashboard.clone());

        assert_eq!(item.id(), dashboard.id);
        assert_eq!(item.title(), "Overview");
        assert_eq!(item.owner(), "li");
        assert_eq!(item.modified(), at(9));
        assert_eq!(item.kind(), "dashboard");
    }

    #[test]
    fn test_serialized_with_kind_tag() {
        let item = report("Monthly", 8);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["kind"], "report");
        assert_eq!(json["title"], "Monthly");
        assert_eq!(json["pageCount"], 1);

        let decoded: CatalogItem = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, item);
    }

    #[test]
    fn test_sort_recent_first() {
        let store = create_demo_model(LayoutConfig::default()).unwrap();
        let mut dataset = Dataset::describe(&store, "Retail", "ana");
        dataset.modified = at(12);

        let mut items = vec![
            report("Old", 7),
            dataset.into(),
            report("B", 10),
            report("A", 10),
        ];
        sort_recent_first(&mut items);

        let titles: Vec<&str> = items.iter().map(|i| i.title()).collect();
        assert_eq!(titles, vec!["Retail", "A", "B", "Old"]);
    }
}
