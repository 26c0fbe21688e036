mod decode_column;
mod decode_table;
mod encode_column_def;

use decode_column::Role;
use decode_table::decode_table;
use encode_column_def::{encode_column_def, encode_join_def};
use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemStruct, parse_macro_input};

/// Maps a struct with named fields to a table.
///
/// Struct attributes: `#[quarry(name = "table")]`, `#[quarry(validate)]` (runs the
/// `quarry::Validator` implementation of the type before writes).
///
/// Field attributes: `#[quarry(name = "column")]`, `#[quarry(primary_key)]`,
/// `#[quarry(created)]`, `#[quarry(updated)]`, `#[quarry(skip)]` and
/// `#[quarry(join = "foreign_key_field")]` on a field of type `Option<T>` where `T` is an entity.
#[proc_macro_derive(Entity, attributes(quarry))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let item: ItemStruct = parse_macro_input!(input as ItemStruct);
    let table = decode_table(&item);
    let name = &item.ident;
    let table_name = &table.name;
    let column_defs = table.mapped().map(encode_column_def);
    let join_defs = table.joins().filter_map(|c| {
        let Role::Join {
            foreign_key,
            entity,
        } = &c.role
        else {
            return None;
        };
        let foreign_key = table
            .mapped()
            .find(|m| m.ident == foreign_key.as_str())
            .map(|m| m.name.clone())
            .unwrap_or_default();
        Some(encode_join_def(c, &foreign_key, entity))
    });
    let values = table.mapped().map(|c| {
        let ident = &c.ident;
        quote!(::quarry::AsValue::as_value(::std::clone::Clone::clone(&self.#ident)))
    });
    let set_value = table.mapped().map(|c| {
        let ident = &c.ident;
        let ty = &c.ty;
        let column = &c.name;
        quote! {
            #column => {
                self.#ident = <#ty as ::quarry::AsValue>::try_from_value(value)?;
                Ok(true)
            }
        }
    });
    let set_joined_value = table.joins().map(|c| {
        let ident = &c.ident;
        let field = ident.to_string();
        quote! {
            #field => ::quarry::Entity::set_value(
                self.#ident.get_or_insert_with(::std::default::Default::default),
                column,
                value,
            ),
        }
    });
    let validate = table.validate.then(|| {
        quote! {
            fn validate<C: ::quarry::Connection>(
                &self,
                session: &mut ::quarry::Session<C>,
            ) -> ::quarry::Result<()> {
                ::quarry::run_validator(self, session)
            }
        }
    });
    quote! {
        impl ::quarry::Entity for #name {
            fn table_name() -> &'static str {
                #table_name
            }

            fn columns() -> &'static [::quarry::ColumnDef] {
                static RESULT: ::std::sync::LazyLock<Box<[::quarry::ColumnDef]>> =
                    ::std::sync::LazyLock::new(|| vec![#(#column_defs),*].into_boxed_slice());
                &RESULT
            }

            fn joins() -> &'static [::quarry::JoinDef] {
                static RESULT: ::std::sync::LazyLock<Box<[::quarry::JoinDef]>> =
                    ::std::sync::LazyLock::new(|| vec![#(#join_defs),*].into_boxed_slice());
                &RESULT
            }

            fn values(&self) -> Vec<::quarry::Value> {
                vec![#(#values),*]
            }

            fn set_value(&mut self, column: &str, value: ::quarry::Value) -> ::quarry::Result<bool> {
                match column {
                    #(#set_value)*
                    _ => {
                        let _ = value;
                        Ok(false)
                    }
                }
            }

            fn set_joined_value(
                &mut self,
                join: &str,
                column: &str,
                value: ::quarry::Value,
            ) -> ::quarry::Result<bool> {
                match join {
                    #(#set_joined_value)*
                    _ => {
                        let _ = (column, value);
                        Ok(false)
                    }
                }
            }

            #validate
        }
    }
    .into()
}
