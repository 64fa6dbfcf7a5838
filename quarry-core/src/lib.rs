mod as_value;
mod blueprint;
mod config;
mod connection;
mod driver;
mod error;
mod executor;
mod model;
mod processor;
mod query;
mod registry;
mod relation;
mod row;
mod schema;
mod schema_writer;
mod sql_writer;
mod statement;
mod util;
mod value;

pub use as_value::*;
pub use blueprint::*;
pub use config::*;
pub use connection::*;
pub use driver::*;
pub use error::*;
pub use executor::*;
pub use model::*;
pub use processor::*;
pub use query::*;
pub use registry::*;
pub use relation::*;
pub use row::*;
pub use schema::*;
pub use schema_writer::*;
pub use sql_writer::*;
pub use statement::*;
pub use util::*;
pub use value::*;
