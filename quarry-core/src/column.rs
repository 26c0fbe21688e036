use crate::Value;

/// Special role of a column during `save`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    #[default]
    Plain,
    /// Stamped with the current time when the row is inserted.
    Created,
    /// Stamped with the current time on every save.
    Updated,
}

/// Static description of one mapped field, built once per entity type.
#[derive(Debug, Default)]
pub struct ColumnDef {
    /// Column name in the table.
    pub name: &'static str,
    /// Rust field name.
    pub field: &'static str,
    /// Typed NULL describing the field type.
    pub value: Value,
    pub primary_key: bool,
    pub kind: FieldKind,
}

impl ColumnDef {
    pub fn name(&self) -> &'static str {
        self.name
    }
    /// Whether `name` designates this column, by column or by field name.
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.field == name
    }
}

/// A field holding an optional related entity, reached through a foreign key of the owner.
///
/// The related table is aliased with `field` in queries and its columns come back labeled
/// `<field>___<column>`.
#[derive(Debug)]
pub struct JoinDef {
    /// Rust field name holding the related entity, also used as table alias.
    pub field: &'static str,
    /// Column of the owning table referencing the related primary key.
    pub foreign_key: &'static str,
    pub table: &'static str,
    pub primary_key: Option<&'static str>,
    pub columns: &'static [ColumnDef],
}

/// Separator between the join alias and the column in result labels.
pub const JOIN_SEPARATOR: &str = "___";
