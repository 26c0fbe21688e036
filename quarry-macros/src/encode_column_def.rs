use crate::decode_column::{ColumnMetadata, Kind};
use proc_macro2::TokenStream;
use quote::quote;

pub(crate) fn encode_column_def(metadata: &ColumnMetadata) -> TokenStream {
    let name = &metadata.name;
    let field = metadata.ident.to_string();
    let ty = &metadata.ty;
    let primary_key = metadata.primary_key;
    let kind = match metadata.kind {
        Kind::Plain => quote!(::quarry::FieldKind::Plain),
        Kind::Created => quote!(::quarry::FieldKind::Created),
        Kind::Updated => quote!(::quarry::FieldKind::Updated),
    };
    quote! {
        ::quarry::ColumnDef {
            name: #name,
            field: #field,
            value: <#ty as ::quarry::AsValue>::as_empty_value(),
            primary_key: #primary_key,
            kind: #kind,
        }
    }
}

pub(crate) fn encode_join_def(
    metadata: &ColumnMetadata,
    foreign_key: &str,
    entity: &syn::Type,
) -> TokenStream {
    let field = metadata.ident.to_string();
    quote! {
        ::quarry::JoinDef {
            field: #field,
            foreign_key: #foreign_key,
            table: <#entity as ::quarry::Entity>::table_name(),
            primary_key: <#entity as ::quarry::Entity>::primary_key_def().map(|c| c.name),
            columns: <#entity as ::quarry::Entity>::columns(),
        }
    }
}
