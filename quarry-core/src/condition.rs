use crate::{Value, count_placeholders};

/// Boolean expression tree rendered into a `WHERE` clause.
///
/// Leaves are raw SQL fragments using `?` markers together with the values they bind. Combining
/// two conditions never merges their text, it produces a new node so each side keeps its own
/// parentheses and argument order. Column names inside a leaf are written as given, except for
/// [`Condition::equal`] whose column is quoted by the dialect at render time.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Expr { sql: String, args: Vec<Value> },
    Equal { column: String, value: Value },
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
}

impl Condition {
    /// Raw fragment with `?` markers. The marker count is checked when the condition is rendered.
    pub fn new(sql: impl Into<String>, args: impl IntoIterator<Item = Value>) -> Self {
        Condition::Expr {
            sql: sql.into(),
            args: args.into_iter().collect(),
        }
    }

    /// `<column> = ?` bound to `value`.
    pub fn equal(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::Equal {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn and(self, other: Condition) -> Self {
        Condition::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Condition) -> Self {
        Condition::Or(Box::new(self), Box::new(other))
    }

    pub fn and_equal(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.and(Condition::equal(column, value))
    }

    pub fn or_equal(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.or(Condition::equal(column, value))
    }

    pub fn placeholders(&self) -> usize {
        match self {
            Condition::Expr { sql, .. } => count_placeholders(sql),
            Condition::Equal { .. } => 1,
            Condition::And(l, r) | Condition::Or(l, r) => l.placeholders() + r.placeholders(),
        }
    }

    /// Bound values in render order.
    pub fn args(&self) -> Vec<Value> {
        let mut out = Vec::new();
        self.collect_args(&mut out);
        out
    }

    fn collect_args(&self, out: &mut Vec<Value>) {
        match self {
            Condition::Expr { args, .. } => out.extend(args.iter().cloned()),
            Condition::Equal { value, .. } => out.push(value.clone()),
            Condition::And(l, r) | Condition::Or(l, r) => {
                l.collect_args(out);
                r.collect_args(out);
            }
        }
    }

    pub fn is_balanced(&self) -> bool {
        match self {
            Condition::Expr { sql, args } => count_placeholders(sql) == args.len(),
            Condition::Equal { .. } => true,
            Condition::And(l, r) | Condition::Or(l, r) => l.is_balanced() && r.is_balanced(),
        }
    }
}
