//! Table placement on the modeling canvas
//!
//! Positions are plain coordinates stored on each [`Table`]. The planner picks default cells
//! for new tables, overwrites positions when the user drags a card, and can rearrange a whole
//! model as a star: fact tables on top, their dimensions below, unconnected tables last.
//!
//! Connector geometry is left to the renderer, which derives it from table positions and the
//! fixed card size in [`LayoutConfig`].

use super::error::ModelResult;
use super::ids::TableId;
use super::schema::{Position, Table};
use super::store::ModelStore;

/// Layout configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    /// X coordinate of the first grid cell
    pub start_x: f64,
    /// Y coordinate of the first grid cell
    pub start_y: f64,
    /// Rendered width of a table card
    pub card_width: f64,
    /// Rendered height of a table card
    pub card_height: f64,
    /// Horizontal gap between neighbouring cards
    pub horizontal_spacing: f64,
    /// Vertical gap between rows
    pub vertical_spacing: f64,
    /// Cells per grid row
    pub grid_columns: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            start_x: 100.0,
            start_y: 100.0,
            card_width: 280.0,
            card_height: 250.0,
            horizontal_spacing: 80.0,
            vertical_spacing: 100.0,
            grid_columns: 4,
        }
    }
}

impl LayoutConfig {
    fn cell_width(&self) -> f64 {
        self.card_width + self.horizontal_spacing
    }

    fn cell_height(&self) -> f64 {
        self.card_height + self.vertical_spacing
    }

    fn columns(&self) -> usize {
        self.grid_columns.max(1)
    }

    /// Center of a card placed at `position`
    pub fn card_center(&self, position: Position) -> Position {
        Position::new(
            position.x + self.card_width / 2.0,
            position.y + self.card_height / 2.0,
        )
    }

    /// Whether two cards placed at `a` and `b` overlap
    pub fn cards_overlap(&self, a: Position, b: Position) -> bool {
        (a.x - b.x).abs() < self.card_width && (a.y - b.y).abs() < self.card_height
    }
}

/// Result of a full-model arrangement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutResult {
    pub positions: Vec<(TableId, Position)>,
}

impl LayoutResult {
    pub fn position_of(&self, table: TableId) -> Option<Position> {
        self.positions
            .iter()
            .find(|(id, _)| *id == table)
            .map(|(_, position)| *position)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutPlanner {
    config: LayoutConfig,
}

impl LayoutPlanner {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Top-left corner of the grid cell at `(row, column)`
    pub fn cell_position(&self, row: usize, column: usize) -> Position {
        Position::new(
            self.config.start_x + column as f64 * self.config.cell_width(),
            self.config.start_y + row as f64 * self.config.cell_height(),
        )
    }

    fn nth_cell(&self, index: usize) -> Position {
        let columns = self.config.columns();
        self.cell_position(index / columns, index % columns)
    }

    /// First grid cell, in row-major order, whose card does not overlap any existing table
    pub fn compute_default_position<'a>(
        &self,
        existing: impl IntoIterator<Item = &'a Table>,
    ) -> Position {
        let occupied: Vec<Position> = existing.into_iter().map(|t| t.position).collect();

        // Cells are at least one card apart, so a card covers at most four of them.
        let limit = occupied.len() * 4;
        (0..=limit)
            .map(|index| self.nth_cell(index))
            .find(|cell| {
                !occupied
                    .iter()
                    .any(|taken| self.config.cards_overlap(*cell, *taken))
            })
            .unwrap_or_else(|| self.nth_cell(limit + 1))
    }

    /// Overwrite a table position. No collision handling: the user placed it there.
    pub fn move_table(
        &self,
        store: &mut ModelStore,
        table: TableId,
        position: Position,
    ) -> ModelResult<()> {
        store.update_table_position(table, position)
    }

    /// Star arrangement of the whole model.
    ///
    /// Rows are filled group by group: fact tables, then tables with at least one
    /// relationship, then tables without any. Each group is sorted by name and starts
    /// on a fresh row.
    pub fn arrange(&self, store: &ModelStore) -> LayoutResult {
        let mut facts = Vec::new();
        let mut connected = Vec::new();
        let mut orphans = Vec::new();

        for table in store.get_tables() {
            if table.is_fact_table {
                facts.push(table);
            } else if store.relationship_count(table.id) > 0 {
                connected.push(table);
            } else {
                orphans.push(table);
            }
        }

        let columns = self.config.columns();
        let mut positions = Vec::new();
        let mut row = 0;

        for mut group in [facts, connected, orphans] {
            if group.is_empty() {
                continue;
            }
            group.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

            for (index, table) in group.iter().enumerate() {
                let position = self.cell_position(row + index / columns, index % columns);
                positions.push((table.id, position));
            }
            row += group.len().div_ceil(columns);
        }

        LayoutResult { positions }
    }
}

/// Applies a calculated layout. Tables deleted since the layout was computed are skipped.
pub fn apply_layout(store: &mut ModelStore, layout: &LayoutResult) {
    for (table, position) in &layout.positions {
        if let Err(e) = store.update_table_position(*table, *position) {
            tracing::debug!("Skipping layout entry: {}", e);
        }
    }
}

/// Convenience function to arrange a model with its own planner
pub fn auto_arrange(store: &mut ModelStore) {
    let layout = store.layout_planner().arrange(store);
    apply_layout(store, &layout);
}
