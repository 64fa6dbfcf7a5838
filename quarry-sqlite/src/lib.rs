mod driver;
mod processor;
mod schema_writer;
mod sql_writer;

pub use driver::*;
pub use processor::*;
pub use sql_writer::*;
