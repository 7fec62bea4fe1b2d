use petgraph::Directed;
use petgraph::stable_graph::StableGraph;
use serde::{Deserialize, Serialize};

use super::ids::{FieldId, MeasureId, RelationshipId, TableId};

/// Canvas coordinates of a table card
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Graph node: a table of the semantic model
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: TableId,
    pub name: String,
    pub fields: Vec<Field>,
    pub position: Position,
    #[serde(default)]
    pub is_fact_table: bool,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TableId::new(),
            name: name.into(),
            fields: Vec::new(),
            position: Position::default(),
            is_fact_table: false,
        }
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    pub fn fact(mut self) -> Self {
        self.is_fact_table = true;
        self
    }

    pub fn add_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn has_field(&self, id: FieldId) -> bool {
        self.field(id).is_some()
    }

    /// Find a field by name, returning its index and the field
    pub fn find_field(&self, name: &str) -> Option<(usize, &Field)> {
        self.fields.iter().enumerate().find(|(_, f)| f.name == name)
    }

    pub fn primary_key(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.is_primary_key)
    }
}

/// Logical data type of a field
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Text,
    Number,
    Date,
    Boolean,
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Text => write!(f, "text"),
            DataType::Number => write!(f, "number"),
            DataType::Date => write!(f, "date"),
            DataType::Boolean => write!(f, "boolean"),
        }
    }
}

/// Table field (column)
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: FieldId,
    pub name: String,
    pub data_type: DataType,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub is_foreign_key: bool,
    #[serde(default)]
    pub is_calculated: bool,
    /// Formula text, forwarded untouched to the evaluation engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id: FieldId::new(),
            name: name.into(),
            data_type,
            is_primary_key: false,
            is_foreign_key: false,
            is_calculated: false,
            formula: None,
            description: None,
        }
    }

    /// Calculated column evaluated by the external engine
    pub fn calculated(name: impl Into<String>, formula: impl Into<String>) -> Self {
        Self {
            is_calculated: true,
            formula: Some(formula.into()),
            ..Self::new(name, DataType::Number)
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn foreign_key(mut self) -> Self {
        self.is_foreign_key = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Calculated field without any formula text
    pub fn has_empty_formula(&self) -> bool {
        self.is_calculated
            && self
                .formula
                .as_deref()
                .is_none_or(|formula| formula.trim().is_empty())
    }
}

/// Graph edge: relationship between two tables
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: RelationshipId,
    pub from_table: TableId,
    pub from_field: FieldId,
    pub to_table: TableId,
    pub to_field: FieldId,
    #[serde(rename = "type")]
    pub relationship_type: RelationshipType,
    pub cross_filter_direction: CrossFilterDirection,
    pub is_active: bool,
}

impl Relationship {
    /// Active many-to-one relationship with single-direction filtering
    pub fn new(
        from_table: TableId,
        from_field: FieldId,
        to_table: TableId,
        to_field: FieldId,
    ) -> Self {
        Self {
            id: RelationshipId::new(),
            from_table,
            from_field,
            to_table,
            to_field,
            relationship_type: RelationshipType::ManyToOne,
            cross_filter_direction: CrossFilterDirection::Single,
            is_active: true,
        }
    }

    pub fn with_type(mut self, relationship_type: RelationshipType) -> Self {
        self.relationship_type = relationship_type;
        self
    }

    pub fn both_directions(mut self) -> Self {
        self.cross_filter_direction = CrossFilterDirection::Both;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn touches_table(&self, table: TableId) -> bool {
        self.from_table == table || self.to_table == table
    }

    pub fn touches_field(&self, table: TableId, field: FieldId) -> bool {
        (self.from_table == table && self.from_field == field)
            || (self.to_table == table && self.to_field == field)
    }
}

/// Cardinality of a relationship
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipType {
    OneToMany,
    ManyToOne,
    OneToOne,
    ManyToMany,
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationshipType::OneToMany => write!(f, "1:N"),
            RelationshipType::ManyToOne => write!(f, "N:1"),
            RelationshipType::OneToOne => write!(f, "1:1"),
            RelationshipType::ManyToMany => write!(f, "N:M"),
        }
    }
}

/// Whether filters propagate one way or both ways across a relationship
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CrossFilterDirection {
    #[default]
    Single,
    Both,
}

/// Named aggregation formula bound to a table
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    pub id: MeasureId,
    pub name: String,
    pub table: TableId,
    pub formula: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_string: Option<String>,
}

impl Measure {
    pub fn new(table: TableId, name: impl Into<String>, formula: impl Into<String>) -> Self {
        Self {
            id: MeasureId::new(),
            name: name.into(),
            table,
            formula: formula.into(),
            description: None,
            format_string: None,
        }
    }

    pub fn with_format_string(mut self, format_string: impl Into<String>) -> Self {
        self.format_string = Some(format_string.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Graph type: nodes are tables, edges are relationships (from -> to)
pub type ModelGraph = StableGraph<Table, Relationship, Directed>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_builder_pattern() {
        let table = Table::new("Sales")
            .with_position(100.0, 200.0)
            .fact()
            .add_field(Field::new("SaleID", DataType::Number).primary_key())
            .add_field(Field::new("ProductID", DataType::Number).foreign_key());

        assert_eq!(table.name, "Sales");
        assert_eq!(table.position, Position::new(100.0, 200.0));
        assert!(table.is_fact_table);
        assert_eq!(table.fields.len(), 2);
        assert_eq!(table.primary_key().map(|f| f.name.as_str()), Some("SaleID"));

        let (index, field) = table.find_field("ProductID").unwrap();
        assert_eq!(index, 1);
        assert!(field.is_foreign_key);
        assert!(table.has_field(field.id));
        assert!(table.find_field("Missing").is_none());
    }

    #[test]
    fn test_calculated_field() {
        let field = Field::calculated("Margin", "UnitPrice - Cost");
        assert!(field.is_calculated);
        assert_eq!(field.formula.as_deref(), Some("UnitPrice - Cost"));
        assert!(!field.has_empty_formula());

        assert!(Field::calculated("Blank", "   ").has_empty_formula());
        assert!(!Field::new("Plain", DataType::Text).has_empty_formula());
    }

    #[test]
    fn test_relationship_defaults() {
        let rel = Relationship::new(TableId::new(), FieldId::new(), TableId::new(), FieldId::new());
        assert_eq!(rel.relationship_type, RelationshipType::ManyToOne);
        assert_eq!(rel.cross_filter_direction, CrossFilterDirection::Single);
        assert!(rel.is_active);

        let rel = rel
            .with_type(RelationshipType::OneToOne)
            .both_directions()
            .inactive();
        assert_eq!(rel.relationship_type, RelationshipType::OneToOne);
        assert_eq!(rel.cross_filter_direction, CrossFilterDirection::Both);
        assert!(!rel.is_active);
    }

    #[test]
    fn test_relationship_type_display() {
        assert_eq!(RelationshipType::OneToMany.to_string(), "1:N");
        assert_eq!(RelationshipType::ManyToOne.to_string(), "N:1");
        assert_eq!(RelationshipType::OneToOne.to_string(), "1:1");
        assert_eq!(RelationshipType::ManyToMany.to_string(), "N:M");
    }

    #[test]
    fn test_serde_wire_names() {
        let sales = Table::new("Sales").fact();
        let json = serde_json::to_value(&sales).unwrap();
        assert_eq!(json["isFactTable"], true);

        let rel = Relationship::new(TableId::new(), FieldId::new(), sales.id, FieldId::new())
            .with_type(RelationshipType::OneToMany)
            .both_directions();
        let json = serde_json::to_value(&rel).unwrap();
        assert_eq!(json["type"], "one-to-many");
        assert_eq!(json["crossFilterDirection"], "both");
        assert_eq!(json["toTable"], sales.id.to_string());

        let field = Field::new("OrderDate", DataType::Date);
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["dataType"], "date");
        assert!(json.get("formula").is_none());
    }
}
