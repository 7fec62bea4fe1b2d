//! Schema editing operations built on [`ModelStore`]

use super::error::{ModelError, ModelResult, NameKind};
use super::ids::{FieldId, RelationshipId, TableId};
use super::naming::validate_name;
use super::schema::{DataType, Field, Table};
use super::store::ModelStore;

/// Table and field editing, with referential cascades handled by the store
pub trait SchemaMutator {
    /// Create an empty dimension table at the next free grid cell
    fn create_table(&mut self, name: &str) -> ModelResult<&Table>;

    /// Rename in place. Relationships and measures hold ids, so nothing else changes.
    fn rename_table(&mut self, table: TableId, new_name: &str) -> ModelResult<()>;

    /// Delete a table with its relationships and measures
    fn delete_table(&mut self, table: TableId) -> ModelResult<Table>;

    /// Mark a table as fact (hub) or dimension
    fn set_fact_table(&mut self, table: TableId, is_fact: bool) -> ModelResult<()>;

    fn create_field(
        &mut self,
        table: TableId,
        name: &str,
        data_type: DataType,
    ) -> ModelResult<&Field>;

    /// Delete a field and every relationship using it
    fn delete_field(&mut self, table: TableId, field: FieldId) -> ModelResult<Field>;

    /// Append a calculated column. The formula is stored verbatim.
    fn add_calculated_column(
        &mut self,
        table: TableId,
        name: &str,
        formula: &str,
    ) -> ModelResult<&Field>;

    /// Choose which of several parallel relationships propagates filters
    fn set_relationship_active(
        &mut self,
        relationship: RelationshipId,
        is_active: bool,
    ) -> ModelResult<()>;
}

impl ModelStore {
    fn push_field(&mut self, table: TableId, field: Field) -> ModelResult<&Field> {
        let id = self.add_field(table, field)?;
        self.get_table(table)
            .and_then(|t| t.field(id))
            .ok_or(ModelError::unknown_field(table, id))
    }
}

impl SchemaMutator for ModelStore {
    fn create_table(&mut self, name: &str) -> ModelResult<&Table> {
        validate_name(name, NameKind::Table)?;

        let position = self
            .layout_planner()
            .compute_default_position(self.get_tables());
        let table = Table::new(name).with_position(position.x, position.y);

        let id = self.add_table(table)?;
        self.get_table(id).ok_or(ModelError::unknown_table(id))
    }

    fn rename_table(&mut self, table: TableId, new_name: &str) -> ModelResult<()> {
        validate_name(new_name, NameKind::Table)?;
        let target = self.table_mut(table)?;

        tracing::debug!("Renaming table '{}' to '{}'", target.name, new_name);
        target.name = new_name.to_string();
        Ok(())
    }

    fn delete_table(&mut self, table: TableId) -> ModelResult<Table> {
        self.remove_table(table)
    }

    fn set_fact_table(&mut self, table: TableId, is_fact: bool) -> ModelResult<()> {
        self.table_mut(table)?.is_fact_table = is_fact;
        Ok(())
    }

    fn create_field(
        &mut self,
        table: TableId,
        name: &str,
        data_type: DataType,
    ) -> ModelResult<&Field> {
        self.push_field(table, Field::new(name, data_type))
    }

    fn delete_field(&mut self, table: TableId, field: FieldId) -> ModelResult<Field> {
        self.remove_field(table, field)
    }

    fn add_calculated_column(
        &mut self,
        table: TableId,
        name: &str,
        formula: &str,
    ) -> ModelResult<&Field> {
        self.push_field(table, Field::calculated(name, formula))
    }

    fn set_relationship_active(
        &mut self,
        relationship: RelationshipId,
        is_active: bool,
    ) -> ModelResult<()> {
        self.relationship_mut(relationship)?.is_active = is_active;
        Ok(())
    }
}
