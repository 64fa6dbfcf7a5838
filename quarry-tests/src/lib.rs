mod builder;
mod executor;
mod fixtures;
mod models;
mod relations;
mod schema;
mod transactions;

pub use executor::*;
pub use fixtures::*;

use crate::{
    builder::builder, models::models, relations::relations, schema::schema,
    transactions::transactions,
};
use log::LevelFilter;
use quarry::Connection;
use std::env;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Runs the full shared suite against a connection. The handle must belong to
/// the [`FakeExecutor`] driving that connection.
pub fn execute_tests(connection: &mut Connection, executor: &FakeHandle) {
    builder(connection, executor);
    transactions(connection, executor);
    schema(connection, executor);
    models(connection, executor);
    relations(connection, executor);
}
