mod as_value;
mod column;
mod condition;
mod connection;
mod criteria;
mod dialect;
mod entity;
mod error;
mod executor;
mod model;
mod pool;
mod rows;
mod scan;
mod session;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use column::*;
pub use condition::*;
pub use connection::*;
pub use criteria::*;
pub use dialect::*;
pub use entity::*;
pub use error::*;
pub use executor::*;
pub use model::*;
pub use pool::*;
pub use rows::*;
pub use scan::*;
pub use session::*;
pub use util::*;
pub use value::*;
