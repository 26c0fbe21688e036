use crate::decode_column::{ColumnMetadata, Role, decode_column};
use convert_case::{Case, Casing};
use syn::{Fields, ItemStruct, LitStr, parse::ParseBuffer};

pub(crate) struct TableMetadata {
    pub(crate) item: ItemStruct,
    pub(crate) name: String,
    pub(crate) validate: bool,
    pub(crate) columns: Vec<ColumnMetadata>,
}

impl TableMetadata {
    pub(crate) fn mapped(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.columns.iter().filter(|c| matches!(c.role, Role::Column))
    }

    pub(crate) fn joins(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.columns.iter().filter(|c| matches!(c.role, Role::Join { .. }))
    }
}

pub(crate) fn decode_table(item: &ItemStruct) -> TableMetadata {
    let Fields::Named(..) = item.fields else {
        panic!("Entity can only be derived for structs with named fields");
    };
    if !item.generics.params.is_empty() {
        panic!("Entity cannot be derived for generic structs");
    }
    let mut result = TableMetadata {
        item: item.clone(),
        name: table_name(&item.ident.to_string()),
        validate: false,
        columns: item.fields.iter().map(decode_column).collect(),
    };
    for attr in &item.attrs {
        let meta = &attr.meta;
        if !meta.path().is_ident("quarry") {
            continue;
        }
        let Ok(list) = meta.require_list() else {
            panic!("Error while parsing `quarry`, use it like: `#[quarry(attribute = value, ...)]`");
        };
        let _ = list.parse_nested_meta(|arg| {
            if arg.path.is_ident("name") {
                let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    panic!("Error while parsing `name`, use it like: `#[quarry(name = \"my_table\")]`");
                };
                result.name = v.value();
            } else if arg.path.is_ident("validate") {
                let Err(..) = arg.value() else {
                    // value() is Err for Meta::Path
                    panic!("Error while parsing `validate`, use it like: `#[quarry(validate)]`");
                };
                result.validate = true;
            } else {
                panic!("Unknown attribute `{}` inside quarry macro", arg.path.get_ident().map(ToString::to_string).unwrap_or_default());
            }
            Ok(())
        });
    }
    assign_primary_key(&mut result);
    for (i, column) in result.mapped().enumerate() {
        if result.mapped().skip(i + 1).any(|c| c.name == column.name) {
            panic!("Column `{}` is mapped by more than one field of `{}`", column.name, item.ident);
        }
    }
    for join in result.joins() {
        let Role::Join { foreign_key, .. } = &join.role else {
            continue;
        };
        if !result.mapped().any(|c| c.ident == foreign_key.as_str()) {
            panic!(
                "Join `{}` refers to `{}` which is not a mapped field of `{}`",
                join.ident, foreign_key, item.ident
            );
        }
    }
    result
}

/// Table name for a type name: `UserProfile` -> `user_profile`.
pub(crate) fn table_name(type_name: &str) -> String {
    type_name.to_case(Case::Snake)
}

fn assign_primary_key(table: &mut TableMetadata) {
    let marked = table
        .columns
        .iter()
        .filter(|c| c.primary_key && matches!(c.role, Role::Column))
        .count();
    if marked > 1 {
        panic!("`{}` declares more than one primary key", table.item.ident);
    }
    if marked == 0 {
        if let Some(id) = table
            .columns
            .iter_mut()
            .find(|c| matches!(c.role, Role::Column) && c.name == "id")
        {
            id.primary_key = true;
        }
    }
}
