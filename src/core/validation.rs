//! Structural analysis of a model
//!
//! Validation is pull-based and read-only: it inspects a [`ModelStore`] and returns a
//! [`ValidationReport`]. Every issue is advisory. A model with issues stays fully editable,
//! and nothing here ever blocks a mutation.

use std::collections::{HashMap, HashSet};

use petgraph::Direction;
use petgraph::stable_graph::{Neighbors, NodeIndex};
use serde::Serialize;

use super::ids::{FieldId, MeasureId, RelationshipId, TableId};
use super::naming::{NameProblem, check_name};
use super::schema::{ModelGraph, Relationship};
use super::store::ModelStore;

/// Which rules run besides the orphan and cycle checks
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValidatorConfig {
    /// Report calculated columns and measures with blank formula text
    pub flag_empty_formulas: bool,
    /// Report relationships where neither endpoint is a primary key
    pub check_key_roles: bool,
    /// Report names containing square brackets
    pub flag_suspicious_names: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            flag_empty_formulas: true,
            check_key_roles: false,
            flag_suspicious_names: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum IssueKind {
    /// Dimension table with no relationship at all
    OrphanTable { table: TableId },
    /// Tables along a directed relationship cycle, in traversal order
    CircularRelationship { tables: Vec<TableId> },
    EmptyColumnFormula { table: TableId, field: FieldId },
    EmptyMeasureFormula { measure: MeasureId },
    KeyRoleMismatch { relationship: RelationshipId },
    SuspiciousName { name: String },
}

/// A single advisory finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub message: String,
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn orphan_tables(&self) -> Vec<TableId> {
        self.issues
            .iter()
            .filter_map(|issue| match issue.kind {
                IssueKind::OrphanTable { table } => Some(table),
                _ => None,
            })
            .collect()
    }

    pub fn cycles(&self) -> Vec<&[TableId]> {
        self.issues
            .iter()
            .filter_map(|issue| match &issue.kind {
                IssueKind::CircularRelationship { tables } => Some(tables.as_slice()),
                _ => None,
            })
            .collect()
    }

    /// All messages, prefixed for display
    pub fn messages(&self) -> Vec<String> {
        self.issues
            .iter()
            .map(|issue| format!("Warning: {}", issue))
            .collect()
    }

    fn push(&mut self, kind: IssueKind, message: String) {
        self.issues.push(Issue { kind, message });
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RelationshipValidator {
    config: ValidatorConfig,
}

impl RelationshipValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, store: &ModelStore) -> ValidationReport {
        let mut report = ValidationReport::default();

        check_orphans(store, &mut report);
        check_cycles(store, &mut report);
        if self.config.flag_empty_formulas {
            check_formulas(store, &mut report);
        }
        if self.config.check_key_roles {
            check_key_roles(store, &mut report);
        }
        if self.config.flag_suspicious_names {
            check_names(store, &mut report);
        }

        tracing::info!(
            "Validated {} tables and {} relationships: {} issues",
            store.table_count(),
            store.get_relationships().len(),
            report.len()
        );
        report
    }
}

/// Validate with the default rule set
pub fn validate(store: &ModelStore) -> ValidationReport {
    RelationshipValidator::default().validate(store)
}

fn table_name(store: &ModelStore, table: TableId) -> &str {
    store
        .get_table(table)
        .map(|t| t.name.as_str())
        .unwrap_or("?")
}

/// Fact tables may legitimately sit alone while the model is being built
fn check_orphans(store: &ModelStore, report: &mut ValidationReport) {
    for table in store.get_tables() {
        if !table.is_fact_table && store.relationship_count(table.id) == 0 {
            report.push(
                IssueKind::OrphanTable { table: table.id },
                format!("Table '{}' has no relationships to other tables", table.name),
            );
        }
    }
}

fn check_cycles(store: &ModelStore, report: &mut ValidationReport) {
    let graph = store.graph();

    for cycle in CycleFinder::find(graph) {
        let tables: Vec<TableId> = cycle
            .iter()
            .filter_map(|idx| graph.node_weight(*idx).map(|t| t.id))
            .collect();

        let mut path: Vec<&str> = tables.iter().map(|id| table_name(store, *id)).collect();
        if let Some(first) = path.first().copied() {
            path.push(first);
        }

        report.push(
            IssueKind::CircularRelationship { tables },
            format!("Circular relationship: {}", path.join(" -> ")),
        );
    }
}

fn check_formulas(store: &ModelStore, report: &mut ValidationReport) {
    for table in store.get_tables() {
        for field in table.fields.iter().filter(|f| f.has_empty_formula()) {
            report.push(
                IssueKind::EmptyColumnFormula {
                    table: table.id,
                    field: field.id,
                },
                format!(
                    "Calculated column '{}' in table '{}' has no formula",
                    field.name, table.name
                ),
            );
        }
    }

    for measure in store.get_measures() {
        if measure.formula.trim().is_empty() {
            report.push(
                IssueKind::EmptyMeasureFormula {
                    measure: measure.id,
                },
                format!("Measure '{}' has no formula", measure.name),
            );
        }
    }
}

fn check_key_roles(store: &ModelStore, report: &mut ValidationReport) {
    for rel in store.get_relationships() {
        let is_key = |table: TableId, field: FieldId| {
            store
                .get_table(table)
                .and_then(|t| t.field(field))
                .is_some_and(|f| f.is_primary_key)
        };

        if !is_key(rel.from_table, rel.from_field) && !is_key(rel.to_table, rel.to_field) {
            report.push(
                IssueKind::KeyRoleMismatch {
                    relationship: rel.id,
                },
                format!(
                    "Relationship between '{}' and '{}' does not use a primary key on either side",
                    table_name(store, rel.from_table),
                    table_name(store, rel.to_table)
                ),
            );
        }
    }
}

fn check_names(store: &ModelStore, report: &mut ValidationReport) {
    let tables = store.get_tables();
    let names = tables
        .iter()
        .map(|t| t.name.as_str())
        .chain(
            tables
                .iter()
                .flat_map(|t| t.fields.iter().map(|f| f.name.as_str())),
        )
        .chain(store.get_measures().iter().map(|m| m.name.as_str()));

    for name in names {
        if check_name(name).warnings.contains(&NameProblem::Brackets) {
            report.push(
                IssueKind::SuspiciousName {
                    name: name.to_string(),
                },
                format!("Name '{}': {}", name, NameProblem::Brackets),
            );
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    OnStack,
    Done,
}

/// Depth-first cycle search over relationship edges, O(V + E).
///
/// A back edge to a node still on the DFS stack closes a cycle made of the stack slice from
/// that node to the top. The report holds one representative cycle per back edge, not every
/// elementary cycle: with A->B, A->C, B->D, C->D, D->A only one of the two cycles through D
/// is listed, depending on traversal order. Cycles are reported once even when parallel
/// edges close them repeatedly. A self-relationship is a cycle of length one.
///
/// The traversal keeps its own frame stack, so chain length is bounded by memory rather
/// than the thread stack.
struct CycleFinder<'g> {
    graph: &'g ModelGraph,
    marks: HashMap<NodeIndex, Mark>,
    path: Vec<NodeIndex>,
    seen: HashSet<Vec<NodeIndex>>,
    cycles: Vec<Vec<NodeIndex>>,
}

impl<'g> CycleFinder<'g> {
    fn find(graph: &'g ModelGraph) -> Vec<Vec<NodeIndex>> {
        let mut finder = Self {
            graph,
            marks: HashMap::new(),
            path: Vec::new(),
            seen: HashSet::new(),
            cycles: Vec::new(),
        };

        for node in graph.node_indices() {
            if !finder.marks.contains_key(&node) {
                finder.visit(node);
            }
        }
        finder.cycles
    }

    fn visit(&mut self, root: NodeIndex) {
        let graph = self.graph;
        self.enter(root);
        let mut frames: Vec<(NodeIndex, Neighbors<'g, Relationship>)> =
            vec![(root, graph.neighbors_directed(root, Direction::Outgoing))];

        while let Some((node, neighbors)) = frames.last_mut() {
            let node = *node;
            let Some(next) = neighbors.next() else {
                frames.pop();
                self.path.pop();
                self.marks.insert(node, Mark::Done);
                continue;
            };

            match self.marks.get(&next).copied() {
                None => {
                    self.enter(next);
                    frames.push((next, graph.neighbors_directed(next, Direction::Outgoing)));
                }
                Some(Mark::OnStack) => self.close_cycle(next),
                Some(Mark::Done) => {}
            }
        }
    }

    fn enter(&mut self, node: NodeIndex) {
        self.marks.insert(node, Mark::OnStack);
        self.path.push(node);
    }

    fn close_cycle(&mut self, start: NodeIndex) {
        let Some(from) = self.path.iter().position(|n| *n == start) else {
            return;
        };
        let cycle = self.path[from..].to_vec();

        // Same cycle entered from another edge rotates to the same key
        let mut key = cycle.clone();
        if let Some(min) = (0..key.len()).min_by_key(|i| key[*i]) {
            key.rotate_left(min);
        }

        if self.seen.insert(key) {
            self.cycles.push(cycle);
        }
    }
}
