#[cfg(test)]
mod tests {
    use quarry_core::{ConnectionConfig, Driver};
    use quarry_mysql::MySQLDriver;
    use quarry_tests::{Call, FakeExecutor, execute_tests, init_logs};

    #[test]
    fn mysql_suite() {
        init_logs();
        let executor = FakeExecutor::new();
        let handle = executor.handle();
        let config = ConnectionConfig {
            charset: Some("utf8mb4".into()),
            collation: Some("utf8mb4_unicode_ci".into()),
            ..ConnectionConfig::new("app")
        };
        let mut connection = MySQLDriver::new()
            .connect(Box::new(executor), config)
            .expect("Failed to assemble the MySQL connection");

        // Connecting with a charset runs the session setup right away
        let calls = handle.calls();
        assert_eq!(calls.len(), 1);
        let Call::Execute { sql, .. } = &calls[0] else {
            panic!("Expected the session statement");
        };
        assert_eq!(sql, "SET NAMES 'utf8mb4' COLLATE 'utf8mb4_unicode_ci'");

        execute_tests(&mut connection, &handle);
    }
}
