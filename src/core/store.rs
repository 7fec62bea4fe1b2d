//! In-memory source of truth for the semantic model
//!
//! Tables are graph nodes and relationships are directed edges (`from_table -> to_table`),
//! held in a [`StableGraph`](petgraph::stable_graph::StableGraph) so indices stay valid across
//! removals. Id maps translate public ids to graph indices.
//!
//! Every mutation checks all of its preconditions before touching any state, so a call that
//! returns an error leaves the store unchanged. With `&mut self` as the only write path, no
//! reader can observe a half-applied mutation.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use super::error::{ModelError, ModelResult, NameKind};
use super::ids::{FieldId, MeasureId, RelationshipId, TableId};
use super::layout::{LayoutConfig, LayoutPlanner};
use super::naming::validate_name;
use super::schema::{DataType, Field, Measure, ModelGraph, Position, Relationship, Table};

/// Field metadata for field pickers in report builders
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldInfo {
    pub table_id: TableId,
    pub table_name: String,
    pub field_id: FieldId,
    pub field_name: String,
    pub data_type: DataType,
    pub is_calculated: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ModelStore {
    graph: ModelGraph,
    tables: HashMap<TableId, NodeIndex>,
    relationships: HashMap<RelationshipId, EdgeIndex>,
    measures: Vec<Measure>,
    layout: LayoutPlanner,
}

impl ModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(config: LayoutConfig) -> Self {
        Self {
            layout: LayoutPlanner::new(config),
            ..Self::default()
        }
    }

    pub fn layout_planner(&self) -> LayoutPlanner {
        self.layout
    }

    pub(crate) fn graph(&self) -> &ModelGraph {
        &self.graph
    }

    pub(crate) fn node_of(&self, table: TableId) -> Option<NodeIndex> {
        self.tables.get(&table).copied()
    }

    // ===== Reads =====

    /// All tables, in graph order
    pub fn get_tables(&self) -> Vec<&Table> {
        self.graph
            .node_indices()
            .filter_map(|idx| self.graph.node_weight(idx))
            .collect()
    }

    pub fn get_table(&self, id: TableId) -> Option<&Table> {
        self.node_of(id)
            .and_then(|idx| self.graph.node_weight(idx))
    }

    pub(crate) fn table_mut(&mut self, id: TableId) -> ModelResult<&mut Table> {
        let idx = self.node_of(id).ok_or(ModelError::unknown_table(id))?;
        self.graph
            .node_weight_mut(idx)
            .ok_or(ModelError::unknown_table(id))
    }

    pub fn contains_table(&self, id: TableId) -> bool {
        self.tables.contains_key(&id)
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Find a table by display name
    pub fn find_table_by_name(&self, name: &str) -> Option<&Table> {
        self.get_tables().into_iter().find(|t| t.name == name)
    }

    pub fn get_relationships(&self) -> Vec<&Relationship> {
        self.graph
            .edge_indices()
            .filter_map(|idx| self.graph.edge_weight(idx))
            .collect()
    }

    pub fn get_relationship(&self, id: RelationshipId) -> Option<&Relationship> {
        self.relationships
            .get(&id)
            .and_then(|idx| self.graph.edge_weight(*idx))
    }

    /// Mutable access for attribute changes. Endpoints must not be edited through it.
    pub(crate) fn relationship_mut(&mut self, id: RelationshipId) -> ModelResult<&mut Relationship> {
        let idx = *self
            .relationships
            .get(&id)
            .ok_or(ModelError::unknown_relationship(id))?;
        self.graph
            .edge_weight_mut(idx)
            .ok_or(ModelError::unknown_relationship(id))
    }

    /// Relationships with the table at either end
    pub fn relationships_for_table(&self, table: TableId) -> Vec<&Relationship> {
        let Some(node) = self.node_of(table) else {
            return Vec::new();
        };

        let outgoing = self.graph.edges_directed(node, Direction::Outgoing);
        // Self-relationships already appear among the outgoing edges
        let incoming = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .filter(|edge| edge.source() != node);

        outgoing.chain(incoming).map(|edge| edge.weight()).collect()
    }

    pub fn relationship_count(&self, table: TableId) -> usize {
        self.relationships_for_table(table).len()
    }

    pub fn get_measures(&self) -> &[Measure] {
        &self.measures
    }

    pub fn get_measure(&self, id: MeasureId) -> Option<&Measure> {
        self.measures.iter().find(|m| m.id == id)
    }

    pub(crate) fn measure_mut(&mut self, id: MeasureId) -> ModelResult<&mut Measure> {
        self.measures
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(ModelError::unknown_measure(id))
    }

    /// Flat list of every field, grouped by table
    pub fn field_catalog(&self) -> Vec<FieldInfo> {
        self.get_tables()
            .into_iter()
            .flat_map(|table| {
                table.fields.iter().map(move |field| FieldInfo {
                    table_id: table.id,
                    table_name: table.name.clone(),
                    field_id: field.id,
                    field_name: field.name.clone(),
                    data_type: field.data_type,
                    is_calculated: field.is_calculated,
                })
            })
            .collect()
    }

    // ===== Tables =====

    pub fn add_table(&mut self, table: Table) -> ModelResult<TableId> {
        validate_name(&table.name, NameKind::Table)?;
        if self.tables.contains_key(&table.id) {
            return Err(ModelError::DuplicateId(table.id.to_string()));
        }
        for (i, field) in table.fields.iter().enumerate() {
            validate_name(&field.name, NameKind::Field)?;
            if table.fields[..i].iter().any(|other| other.id == field.id) {
                return Err(ModelError::DuplicateId(field.id.to_string()));
            }
        }

        let id = table.id;
        tracing::debug!("Adding table '{}' ({})", table.name, id);
        let idx = self.graph.add_node(table);
        self.tables.insert(id, idx);
        Ok(id)
    }

    /// Remove a table together with every relationship touching it and every measure bound to it
    pub fn remove_table(&mut self, id: TableId) -> ModelResult<Table> {
        let node = self.node_of(id).ok_or(ModelError::unknown_table(id))?;

        let dropped_relationships: Vec<RelationshipId> = self
            .relationships_for_table(id)
            .into_iter()
            .map(|r| r.id)
            .collect();

        let table = self
            .graph
            .remove_node(node)
            .ok_or(ModelError::unknown_table(id))?;

        // Incident edges went away with the node
        for rel in &dropped_relationships {
            self.relationships.remove(rel);
        }
        let measures_before = self.measures.len();
        self.measures.retain(|m| m.table != id);
        self.tables.remove(&id);

        tracing::debug!(
            "Removed table '{}' ({}), cascaded {} relationships and {} measures",
            table.name,
            id,
            dropped_relationships.len(),
            measures_before - self.measures.len()
        );
        Ok(table)
    }

    pub fn update_table_position(&mut self, id: TableId, position: Position) -> ModelResult<()> {
        self.table_mut(id)?.position = position;
        Ok(())
    }

    // ===== Fields =====

    pub fn add_field(&mut self, table: TableId, field: Field) -> ModelResult<FieldId> {
        validate_name(&field.name, NameKind::Field)?;
        let owner = self.table_mut(table)?;
        if owner.has_field(field.id) {
            return Err(ModelError::DuplicateId(field.id.to_string()));
        }

        let id = field.id;
        tracing::debug!("Adding field '{}' ({}) to table {}", field.name, id, table);
        owner.fields.push(field);
        Ok(id)
    }

    /// Remove a field and every relationship that uses it
    pub fn remove_field(&mut self, table: TableId, field: FieldId) -> ModelResult<Field> {
        let node = self.node_of(table).ok_or(ModelError::unknown_table(table))?;
        let position = self
            .get_table(table)
            .and_then(|t| t.fields.iter().position(|f| f.id == field))
            .ok_or(ModelError::unknown_field(table, field))?;

        let dropped: Vec<(EdgeIndex, RelationshipId)> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .chain(self.graph.edges_directed(node, Direction::Incoming))
            .filter(|edge| edge.weight().touches_field(table, field))
            .map(|edge| (edge.id(), edge.weight().id))
            .collect();

        let mut cascaded = 0;
        for (edge, rel) in &dropped {
            // A self-relationship shows up in both directions
            if self.relationships.remove(rel).is_some() {
                self.graph.remove_edge(*edge);
                cascaded += 1;
            }
        }

        let removed = self.table_mut(table)?.fields.remove(position);
        tracing::debug!(
            "Removed field '{}' ({}) from table {}, cascaded {} relationships",
            removed.name,
            field,
            table,
            cascaded
        );
        Ok(removed)
    }

    // ===== Relationships =====

    fn resolve_endpoint(&self, table: TableId, field: FieldId) -> ModelResult<NodeIndex> {
        let node = self.node_of(table).ok_or(ModelError::unknown_table(table))?;
        let owner = self
            .graph
            .node_weight(node)
            .ok_or(ModelError::unknown_table(table))?;
        if !owner.has_field(field) {
            return Err(ModelError::unknown_field(table, field));
        }
        Ok(node)
    }

    pub fn add_relationship(&mut self, relationship: Relationship) -> ModelResult<RelationshipId> {
        if self.relationships.contains_key(&relationship.id) {
            return Err(ModelError::DuplicateId(relationship.id.to_string()));
        }
        let from = self.resolve_endpoint(relationship.from_table, relationship.from_field)?;
        let to = self.resolve_endpoint(relationship.to_table, relationship.to_field)?;

        let id = relationship.id;
        tracing::debug!(
            "Adding relationship {} ({} -> {}, {})",
            id,
            relationship.from_table,
            relationship.to_table,
            relationship.relationship_type
        );
        let edge = self.graph.add_edge(from, to, relationship);
        self.relationships.insert(id, edge);
        Ok(id)
    }

    pub fn remove_relationship(&mut self, id: RelationshipId) -> ModelResult<Relationship> {
        let edge = *self
            .relationships
            .get(&id)
            .ok_or(ModelError::unknown_relationship(id))?;
        let relationship = self
            .graph
            .remove_edge(edge)
            .ok_or(ModelError::unknown_relationship(id))?;
        self.relationships.remove(&id);

        tracing::debug!("Removed relationship {}", id);
        Ok(relationship)
    }

    // ===== Measures =====

    pub fn add_measure(&mut self, measure: Measure) -> ModelResult<MeasureId> {
        validate_name(&measure.name, NameKind::Measure)?;
        if self.get_measure(measure.id).is_some() {
            return Err(ModelError::DuplicateId(measure.id.to_string()));
        }
        if !self.contains_table(measure.table) {
            return Err(ModelError::unknown_table(measure.table));
        }

        let id = measure.id;
        tracing::debug!("Adding measure '{}' ({}) on table {}", measure.name, id, measure.table);
        self.measures.push(measure);
        Ok(id)
    }

    pub fn remove_measure(&mut self, id: MeasureId) -> ModelResult<Measure> {
        let position = self
            .measures
            .iter()
            .position(|m| m.id == id)
            .ok_or(ModelError::unknown_measure(id))?;

        tracing::debug!("Removed measure {}", id);
        Ok(self.measures.remove(position))
    }
}
