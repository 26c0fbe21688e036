use syn::{
    Field, GenericArgument, LitStr, PathArguments, Type, ext::IdentExt, parse::ParseBuffer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Plain,
    Created,
    Updated,
}

pub(crate) enum Role {
    Column,
    /// `Option<entity>` filled through the foreign key field.
    Join { foreign_key: String, entity: Type },
    Skip,
}

pub(crate) struct ColumnMetadata {
    pub(crate) ident: syn::Ident,
    pub(crate) ty: Type,
    pub(crate) name: String,
    pub(crate) primary_key: bool,
    pub(crate) kind: Kind,
    pub(crate) role: Role,
}

pub(crate) fn decode_column(field: &Field) -> ColumnMetadata {
    let ident = field
        .ident
        .clone()
        .expect("Field is expected to have a name");
    let mut name = ident.unraw().to_string();
    if name.starts_with('_') {
        name.remove(0);
    }
    let kind = match name.as_str() {
        "created" | "created_at" => Kind::Created,
        "updated" | "updated_at" => Kind::Updated,
        _ => Kind::Plain,
    };
    let mut metadata = ColumnMetadata {
        ident,
        ty: field.ty.clone(),
        name,
        primary_key: false,
        kind,
        role: Role::Column,
    };
    for attr in &field.attrs {
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
                    panic!("Error while parsing `name`, use it like: `#[quarry(name = \"my_column\")]`");
                };
                metadata.name = v.value();
            } else if arg.path.is_ident("primary_key") {
                let Err(..) = arg.value() else {
                    // value() is Err for Meta::Path
                    panic!("Error while parsing `primary_key`, use it like: `#[quarry(primary_key)]`");
                };
                metadata.primary_key = true;
            } else if arg.path.is_ident("created") {
                let Err(..) = arg.value() else {
                    panic!("Error while parsing `created`, use it like: `#[quarry(created)]`");
                };
                metadata.kind = Kind::Created;
            } else if arg.path.is_ident("updated") {
                let Err(..) = arg.value() else {
                    panic!("Error while parsing `updated`, use it like: `#[quarry(updated)]`");
                };
                metadata.kind = Kind::Updated;
            } else if arg.path.is_ident("skip") {
                let Err(..) = arg.value() else {
                    panic!("Error while parsing `skip`, use it like: `#[quarry(skip)]`");
                };
                metadata.role = Role::Skip;
            } else if arg.path.is_ident("join") {
                let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    panic!("Error while parsing `join`, use it like: `#[quarry(join = \"author_id\")]`");
                };
                let Some(entity) = option_inner(&field.ty) else {
                    panic!(
                        "Join field `{}` must have type `Option<T>` where `T` is an entity",
                        metadata.ident
                    );
                };
                metadata.role = Role::Join {
                    foreign_key: v.value(),
                    entity: entity.clone(),
                };
            } else {
                panic!(
                    "Unknown attribute `{}` inside quarry macro",
                    arg.path.get_ident().map(ToString::to_string).unwrap_or_default()
                );
            }
            Ok(())
        });
    }
    metadata
}

/// `T` when `ty` is written `Option<T>`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };
    match arguments.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
