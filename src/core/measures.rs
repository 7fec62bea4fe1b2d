//! Named aggregation formulas bound to tables

use serde::Deserialize;

use super::error::{ModelError, ModelResult, NameKind};
use super::ids::{MeasureId, TableId};
use super::naming::validate_name;
use super::schema::Measure;
use super::store::ModelStore;

/// Deserializes `Option<Option<T>>` so that:
/// - missing field -> `None` (keep current value)
/// - `null` -> `Some(None)` (clear the value)
/// - value -> `Some(Some(value))`
pub mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        // Only called when the field is present
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// Partial update for a measure. `None` leaves the attribute unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurePatch {
    pub name: Option<String>,
    /// Rebind the measure to another table
    pub table: Option<TableId>,
    pub formula: Option<String>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub format_string: Option<Option<String>>,
}

impl MeasurePatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn formula(formula: impl Into<String>) -> Self {
        Self {
            formula: Some(formula.into()),
            ..Self::default()
        }
    }
}

/// CRUD over measures. Formulas are opaque text and are never inspected.
pub trait MeasureRegistry {
    fn create_measure(
        &mut self,
        table: TableId,
        name: &str,
        formula: &str,
        format_string: Option<&str>,
    ) -> ModelResult<&Measure>;

    /// Apply a patch atomically: either every change lands or none does
    fn update_measure(&mut self, id: MeasureId, patch: MeasurePatch) -> ModelResult<&Measure>;

    fn delete_measure(&mut self, id: MeasureId) -> ModelResult<Measure>;

    fn measures_for_table(&self, table: TableId) -> Vec<&Measure>;
}

impl MeasureRegistry for ModelStore {
    fn create_measure(
        &mut self,
        table: TableId,
        name: &str,
        formula: &str,
        format_string: Option<&str>,
    ) -> ModelResult<&Measure> {
        let mut measure = Measure::new(table, name, formula);
        measure.format_string = format_string.map(str::to_string);

        let id = self.add_measure(measure)?;
        self.get_measure(id).ok_or(ModelError::unknown_measure(id))
    }

    fn update_measure(&mut self, id: MeasureId, patch: MeasurePatch) -> ModelResult<&Measure> {
        if let Some(name) = &patch.name {
            validate_name(name, NameKind::Measure)?;
        }
        if let Some(table) = patch.table
            && !self.contains_table(table)
        {
            return Err(ModelError::unknown_table(table));
        }

        let measure = self.measure_mut(id)?;
        if let Some(name) = patch.name {
            measure.name = name;
        }
        if let Some(table) = patch.table {
            measure.table = table;
        }
        if let Some(formula) = patch.formula {
            measure.formula = formula;
        }
        if let Some(description) = patch.description {
            measure.description = description;
        }
        if let Some(format_string) = patch.format_string {
            measure.format_string = format_string;
        }

        tracing::debug!("Updated measure '{}' ({})", measure.name, id);
        Ok(&*measure)
    }

    fn delete_measure(&mut self, id: MeasureId) -> ModelResult<Measure> {
        self.remove_measure(id)
    }

    fn measures_for_table(&self, table: TableId) -> Vec<&Measure> {
        self.get_measures()
            .iter()
            .filter(|m| m.table == table)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::Table;

    fn store_with_sales() -> (ModelStore, TableId) {
        let mut store = ModelStore::new();
        let sales = store.add_table(Table::new("Sales")).unwrap();
        (store, sales)
    }

    #[test]
    fn test_create_measure_keeps_formula_verbatim() {
        let (mut store, sales) = store_with_sales();
        let formula = "CALCULATE( SUM(Sales[TotalAmount]) , ALL(Dates) ) -- not parsed";

        let measure = store
            .create_measure(sales, "Total Sales", formula, Some("#,##0.00"))
            .unwrap();
        assert_eq!(measure.formula, formula);
        assert_eq!(measure.format_string.as_deref(), Some("#,##0.00"));
        assert_eq!(measure.table, sales);
        assert!(measure.description.is_none());
    }

    #[test]
    fn test_create_measure_rejects_bad_input() {
        let (mut store, sales) = store_with_sales();

        assert_eq!(
            store.create_measure(sales, "  ", "1", None).unwrap_err(),
            ModelError::EmptyName(NameKind::Measure)
        );

        let missing = TableId::new();
        assert_eq!(
            store.create_measure(missing, "Total", "1", None).unwrap_err(),
            ModelError::unknown_table(missing)
        );
        assert!(store.get_measures().is_empty());
    }

    #[test]
    fn test_update_measure() {
        let (mut store, sales) = store_with_sales();
        let returns = store.add_table(Table::new("Returns")).unwrap();
        let id = store
            .create_measure(sales, "Total", "SUM(Sales[Amount])", Some("0.00"))
            .unwrap()
            .id;

        let patch = MeasurePatch {
            name: Some("Total Returns".into()),
            table: Some(returns),
            formula: Some("SUM(Returns[Amount])".into()),
            description: Some(Some("Refunded amount".into())),
            format_string: Some(None),
        };
        let measure = store.update_measure(id, patch).unwrap();

        assert_eq!(measure.name, "Total Returns");
        assert_eq!(measure.table, returns);
        assert_eq!(measure.formula, "SUM(Returns[Amount])");
        assert_eq!(measure.description.as_deref(), Some("Refunded amount"));
        assert!(measure.format_string.is_none());
    }

    #[test]
    fn test_update_measure_is_atomic() {
        let (mut store, sales) = store_with_sales();
        let id = store.create_measure(sales, "Total", "1", None).unwrap().id;
        let before = store.get_measure(id).cloned();

        let missing = TableId::new();
        let patch = MeasurePatch {
            formula: Some("2".into()),
            table: Some(missing),
            ..MeasurePatch::default()
        };
        assert_eq!(
            store.update_measure(id, patch).unwrap_err(),
            ModelError::unknown_table(missing)
        );

        let patch = MeasurePatch {
            formula: Some("2".into()),
            ..MeasurePatch::rename("")
        };
        assert_eq!(
            store.update_measure(id, patch).unwrap_err(),
            ModelError::EmptyName(NameKind::Measure)
        );

        assert_eq!(store.get_measure(id).cloned(), before);

        let unknown = MeasureId::new();
        assert_eq!(
            store
                .update_measure(unknown, MeasurePatch::formula("3"))
                .unwrap_err(),
            ModelError::unknown_measure(unknown)
        );
    }

    #[test]
    fn test_patch_deserialization() {
        let patch: MeasurePatch = serde_json::from_str("{}").unwrap();
        assert_eq!(patch, MeasurePatch::default());

        let patch: MeasurePatch = serde_json::from_str(r#"{"name": "Avg"}"#).unwrap();
        assert_eq!(patch.name.as_deref(), Some("Avg"));
        assert_eq!(patch.description, None);

        let patch: MeasurePatch =
            serde_json::from_str(r#"{"description": null, "formatString": "0%"}"#).unwrap();
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.format_string, Some(Some("0%".into())));
    }

    #[test]
    fn test_delete_and_list_measures() {
        let (mut store, sales) = store_with_sales();
        let other = store.add_table(Table::new("Stock")).unwrap();
        let total = store.create_measure(sales, "Total", "1", None).unwrap().id;
        store.create_measure(sales, "Count", "2", None).unwrap();
        store.create_measure(other, "On Hand", "3", None).unwrap();

        assert_eq!(store.measures_for_table(sales).len(), 2);
        assert_eq!(store.measures_for_table(other).len(), 1);

        let deleted = store.delete_measure(total).unwrap();
        assert_eq!(deleted.name, "Total");
        assert_eq!(store.measures_for_table(sales).len(), 1);
        // Tables are not affected
        assert_eq!(store.table_count(), 2);
    }
}
