//! Maps plain structs to SQL tables.
//!
//! Derive [`Entity`] on a struct, open a [`Session`] on a connection with the [`Dialect`] of the
//! backend, then `find`, `find_all`, `save`, `update` and `delete` values, optionally narrowed by
//! `filter`, `order_by`, `limit` and friends. Related entities declared with
//! `#[quarry(join = "foreign_key")]` are loaded by the same query.
pub use ::quarry_core::*;
pub use ::quarry_macros::Entity;
