use crate::Value;

/// Writes every item of `values` with `f`, putting `separator` between the items that produced output.
pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Number of `?` markers in `sql`, ignoring the ones inside quoted literals or identifiers.
pub fn count_placeholders(sql: &str) -> usize {
    let mut quote: Option<char> = None;
    let mut count = 0;
    for c in sql.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(..) => {}
            None if c == '\'' || c == '"' || c == '`' => quote = Some(c),
            None if c == '?' => count += 1,
            None => {}
        }
    }
    count
}

#[macro_export]
macro_rules! possibly_parenthesized {
    ($buff:ident, $cond:expr, $v:expr) => {
        if $cond {
            $buff.push('(');
            $v;
            $buff.push(')');
        } else {
            $v;
        }
    };
}

/// Longest prefix of `value` that fits `len` bytes and ends on a char boundary.
pub fn truncated(value: &str, len: usize) -> &str {
    if value.len() <= len {
        return value;
    }
    let mut end = len;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        format_args!(
            "{}{}",
            $crate::truncated(&$query, 497).trim_end(),
            if $query.len() > 497 { "..." } else { "" },
        )
    };
}

/// Logs a statement about to be sent to the database.
pub fn log_query(sql: &str, args: &[Value]) {
    if args.is_empty() {
        log::debug!("{}", truncate_long!(sql));
    } else {
        log::debug!("{} {:?}", truncate_long!(sql), args);
    }
}

/// Builds the list of bound arguments for a query.
/// ```rust
/// use quarry_core::{Value, values};
/// let args = values![1i64, "name"];
/// assert!(matches!(args[0], Value::Int64(Some(1))));
/// ```
#[macro_export]
macro_rules! values {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($value)),+]
    };
}
