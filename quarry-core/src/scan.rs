use crate::{Dialect, Entity, Error, JOIN_SEPARATOR, Result, RowLabeled};

/// Copies the values of `row` into `entity`, matching the columns by label.
///
/// A label `<join>___<column>` is routed to the related entity held by the join field, which is
/// created on first use. Any other label goes to the field mapped to that column. NULL values
/// leave their destination untouched and labels matching nothing are ignored.
pub fn scan_row<E: Entity>(dialect: &dyn Dialect, entity: &mut E, row: RowLabeled) -> Result<()> {
    let RowLabeled { labels, values } = row;
    for (label, value) in labels.iter().zip(values.into_vec()) {
        if value.is_null() {
            continue;
        }
        if let Some((join, column)) = label.split_once(JOIN_SEPARATOR) {
            let Some(def) = E::joins()
                .iter()
                .find(|j| j.field == join)
                .and_then(|j| j.columns.iter().find(|c| c.name == column))
            else {
                log::trace!("Ignoring column `{}`", label);
                continue;
            };
            let value = dialect
                .set_model_value(value, &def.value)
                .map_err(|e| conversion(E::table_name(), label, e))?;
            entity.set_joined_value(join, column, value)?;
        } else {
            let Some(def) = E::columns().iter().find(|c| c.name == label.as_str()) else {
                log::trace!("Ignoring column `{}`", label);
                continue;
            };
            let value = dialect
                .set_model_value(value, &def.value)
                .map_err(|e| conversion(E::table_name(), label, e))?;
            entity.set_value(def.name, value)?;
        }
    }
    Ok(())
}

fn conversion(table: &str, label: &str, error: Error) -> Error {
    match error {
        Error::Conversion(message) => {
            Error::Conversion(format!("column `{}` of `{}`: {}", label, table, message))
        }
        error => error,
    }
}
