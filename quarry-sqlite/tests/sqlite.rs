#[cfg(test)]
mod tests {
    use quarry_core::{ConnectionConfig, Driver};
    use quarry_sqlite::SQLiteDriver;
    use quarry_tests::{FakeExecutor, execute_tests, init_logs};

    #[test]
    fn sqlite_suite() {
        init_logs();
        let executor = FakeExecutor::new();
        let handle = executor.handle();
        let mut connection = SQLiteDriver::new()
            .connect(Box::new(executor), ConnectionConfig::new("app.db"))
            .expect("Failed to assemble the SQLite connection");
        execute_tests(&mut connection, &handle);
    }
}
