use crate::{ColumnDef, Entity, Error, FieldKind, JoinDef, Result, Value};
use time::OffsetDateTime;

/// A column of a [`Model`] together with the value it has in the entity.
#[derive(Debug, Clone)]
pub struct ModelField {
    pub def: &'static ColumnDef,
    pub value: Value,
}

impl ModelField {
    pub fn name(&self) -> &'static str {
        self.def.name
    }
    pub fn field(&self) -> &'static str {
        self.def.field
    }
    pub fn kind(&self) -> FieldKind {
        self.def.kind
    }
}

/// Per call description of one entity value: table, selected columns with their current values,
/// primary key and joins.
///
/// A model is built from the entity it describes at the start of every operation and dropped at
/// the end of it, it must not be applied to another instance.
#[derive(Debug, Clone)]
pub struct Model {
    pub table: &'static str,
    pub fields: Vec<ModelField>,
    pub primary_key: Option<usize>,
    pub joins: Vec<&'static JoinDef>,
}

impl Model {
    /// `omit` lists field or column names left out of the model, joins included.
    pub fn new<E: Entity>(entity: &E, include_joins: bool, omit: &[String]) -> Self {
        let omitted = |name: &str| omit.iter().any(|v| v == name);
        let fields: Vec<_> = E::columns()
            .iter()
            .zip(entity.values())
            .filter(|(def, _)| !omitted(def.name) && !omitted(def.field))
            .map(|(def, value)| ModelField { def, value })
            .collect();
        let primary_key = fields.iter().position(|f| f.def.primary_key);
        let joins = if include_joins {
            E::joins().iter().filter(|j| !omitted(j.field)).collect()
        } else {
            Vec::new()
        };
        Self {
            table: E::table_name(),
            fields,
            primary_key,
            joins,
        }
    }

    pub fn pk(&self) -> Option<&ModelField> {
        self.primary_key.map(|i| &self.fields[i])
    }

    /// True when there is no primary key or its value is the zero value of its type.
    pub fn pk_zero(&self) -> bool {
        self.pk().is_none_or(|pk| pk.value.is_zero())
    }

    pub fn field(&self, kind: FieldKind) -> Option<&ModelField> {
        self.fields.iter().find(|f| f.kind() == kind)
    }

    /// Sets the field with the given role to `now`, returning the value assigned if there is one.
    pub fn stamp(&mut self, kind: FieldKind, now: OffsetDateTime) -> Result<Option<Value>> {
        let Some(field) = self.fields.iter_mut().find(|f| f.kind() == kind) else {
            return Ok(None);
        };
        let Some(value) = field.def.value.instant_like(now) else {
            return Err(Error::usage(format!(
                "Field `{}` of `{}` must have a date or timestamp type to be stamped",
                field.field(),
                self.table
            )));
        };
        field.value = value.clone();
        Ok(Some(value))
    }
}
