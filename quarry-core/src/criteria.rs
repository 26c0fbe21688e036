use crate::{Condition, Dialect, Model};

/// One `ORDER BY` term, `path` is a column name optionally qualified with its table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub path: String,
    pub descending: bool,
}

/// Everything the next statement of a session needs besides the entity itself.
///
/// Filled by the chained configuration calls, consumed by exactly one executing call and then
/// replaced with a fresh value.
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    pub model: Option<Model>,
    pub condition: Option<Condition>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub order_by: Vec<Order>,
    pub omit_fields: Vec<String>,
    pub omit_join: bool,
}

impl Criteria {
    /// Puts `<table>.<pk> = ?` in front of the current condition when the model has a non zero
    /// primary key.
    pub fn merge_pk_condition(&mut self, dialect: &dyn Dialect) {
        let Some(model) = &self.model else {
            return;
        };
        if model.pk_zero() {
            return;
        }
        let Some(pk) = model.pk() else {
            return;
        };
        let path = format!("{}.{}", dialect.quote(model.table), dialect.quote(pk.name()));
        let pk_condition = Condition::new(format!("{} = ?", path), [pk.value.clone()]);
        self.condition = Some(match self.condition.take() {
            Some(condition) => pk_condition.and(condition),
            None => pk_condition,
        });
    }
}
