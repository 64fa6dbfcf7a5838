#[cfg(test)]
mod tests {
    use indoc::indoc;
    use quarry::{
        Action, Blueprint, ColumnInfo, ConnectionConfig, GenericSqlWriter, SchemaWriter, SqlWriter,
        Value,
    };
    use quarry_mysql::MySQLSqlWriter;
    use quarry_sqlite::SQLiteSqlWriter;

    const WRITER: GenericSqlWriter = GenericSqlWriter::new();
    const SQLITE: SQLiteSqlWriter = SQLiteSqlWriter::new();
    const MYSQL: MySQLSqlWriter = MySQLSqlWriter::new();

    fn users() -> Blueprint {
        let mut table = Blueprint::create("users");
        table.increments("id");
        table.string("email", 255);
        table
            .string("name", 120)
            .nullable()
            .default("anonymous")
            .comment("display name");
        table.timestamps();
        table.unique(["email"]);
        table
    }

    fn posts() -> Blueprint {
        let mut table = Blueprint::create("posts");
        table.increments("id");
        table.integer("user_id").unsigned();
        table
            .foreign("user_id")
            .references("id")
            .on("users")
            .on_delete(Action::Cascade);
        table
    }

    fn info(name: &str, column_type: &str, nullable: bool, primary: bool) -> ColumnInfo {
        ColumnInfo {
            name: name.into(),
            column_type: column_type.into(),
            nullable,
            default: None,
            primary,
        }
    }

    #[test]
    fn sqlite_create_collapses_types_and_appends_the_indexes() {
        let statements = SQLITE
            .compile_create(&users())
            .expect("Failed to compile the create");
        assert_eq!(
            statements,
            [
                indoc! {r#"
                    CREATE TABLE "users" (
                    "id" INTEGER PRIMARY KEY AUTOINCREMENT,
                    "email" TEXT NOT NULL,
                    "name" TEXT DEFAULT 'anonymous',
                    "created_at" TEXT,
                    "updated_at" TEXT
                    )
                "#}
                .trim(),
                r#"CREATE UNIQUE INDEX "users_email_unique" ON "users" ("email")"#,
            ]
        );
    }

    #[test]
    fn sqlite_keeps_foreign_keys_inside_the_create() {
        let statements = SQLITE
            .compile_create(&posts())
            .expect("Failed to compile the create");
        assert_eq!(
            statements,
            [indoc! {r#"
                CREATE TABLE "posts" (
                "id" INTEGER PRIMARY KEY AUTOINCREMENT,
                "user_id" INTEGER NOT NULL,
                FOREIGN KEY ("user_id") REFERENCES "users" ("id") ON DELETE CASCADE
                )
            "#}
            .trim()]
        );
    }

    #[test]
    fn mysql_create_keeps_its_own_column_clauses() {
        let statements = MYSQL
            .compile_create(&users())
            .expect("Failed to compile the create");
        assert_eq!(
            statements,
            [
                indoc! {"
                    CREATE TABLE `users` (
                    `id` INT UNSIGNED PRIMARY KEY AUTO_INCREMENT,
                    `email` VARCHAR(255) NOT NULL,
                    `name` VARCHAR(120) DEFAULT 'anonymous' COMMENT 'display name',
                    `created_at` TIMESTAMP,
                    `updated_at` TIMESTAMP
                    )
                "}
                .trim(),
                "CREATE UNIQUE INDEX `users_email_unique` ON `users` (`email`)",
            ]
        );
    }

    #[test]
    fn mysql_moves_foreign_keys_after_the_create() {
        let statements = MYSQL
            .compile_create(&posts())
            .expect("Failed to compile the create");
        assert_eq!(
            statements,
            [
                indoc! {"
                    CREATE TABLE `posts` (
                    `id` INT UNSIGNED PRIMARY KEY AUTO_INCREMENT,
                    `user_id` INT UNSIGNED NOT NULL
                    )
                "}
                .trim(),
                "ALTER TABLE `posts` ADD CONSTRAINT `posts_user_id_foreign` \
                 FOREIGN KEY (`user_id`) REFERENCES `users` (`id`) ON DELETE CASCADE",
            ]
        );
    }

    #[test]
    fn composite_primary_keys_join_the_column_list() {
        let mut table = Blueprint::create("memberships");
        table.integer("user_id");
        table.integer("team_id");
        table.primary(["user_id", "team_id"]);
        let statements = WRITER
            .compile_create(&table)
            .expect("Failed to compile the create");
        assert_eq!(
            statements,
            [indoc! {r#"
                CREATE TABLE "memberships" (
                "user_id" INTEGER NOT NULL,
                "team_id" INTEGER NOT NULL,
                PRIMARY KEY ("user_id", "team_id")
                )
            "#}
            .trim()]
        );
    }

    #[test]
    fn create_rejects_alteration_commands() {
        let mut table = Blueprint::create("users");
        table.increments("id");
        table.drop_column("legacy");
        let error = WRITER
            .compile_create(&table)
            .expect_err("A create carrying alterations must not compile");
        assert!(error.to_string().contains("while creating"));
    }

    #[test]
    fn foreign_keys_are_validated_before_compiling() {
        let mut table = Blueprint::create("posts");
        table.integer("user_id");
        table.foreign("user_id");
        let error = WRITER
            .compile_create(&table)
            .expect_err("A dangling foreign key must not compile");
        assert!(error.to_string().contains("misses its referenced"));

        let mut table = Blueprint::create("posts");
        table.integer("user_id");
        table.foreign("author_id").references("id").on("users");
        let error = WRITER
            .compile_create(&table)
            .expect_err("A foreign key on an undeclared column must not compile");
        assert!(error.to_string().contains("undeclared local column"));
    }

    #[test]
    fn generic_alter_emits_one_statement_per_command() {
        let mut table = Blueprint::alter("users");
        table.string("nickname", 64).nullable();
        table.drop_column("legacy");
        table.rename_column("name", "full_name");
        let statements = WRITER
            .compile_alter(&table, &[])
            .expect("Failed to compile the alter");
        assert_eq!(
            statements,
            [
                r#"ALTER TABLE "users" ADD COLUMN "nickname" VARCHAR(64)"#,
                r#"ALTER TABLE "users" DROP COLUMN "legacy""#,
                r#"ALTER TABLE "users" RENAME COLUMN "name" TO "full_name""#,
            ]
        );
    }

    #[test]
    fn sqlite_alter_stays_in_place_for_safe_changes() {
        let mut table = Blueprint::alter("users");
        table.string("nickname", 64).nullable();
        table.rename_column("name", "full_name");
        table.index(["nickname"]);
        let statements = SQLITE
            .compile_alter(&table, &[])
            .expect("Failed to compile the alter");
        assert_eq!(
            statements,
            [
                r#"ALTER TABLE "users" ADD COLUMN "nickname" TEXT"#,
                r#"ALTER TABLE "users" RENAME COLUMN "name" TO "full_name""#,
                r#"CREATE INDEX "users_nickname_index" ON "users" ("nickname")"#,
            ]
        );
    }

    #[test]
    fn sqlite_rebuilds_the_table_for_structural_changes() {
        let mut table = Blueprint::alter("users");
        table.string("city", 120).nullable();
        table.drop_column("legacy");
        table.rename_column("name", "full_name");
        let existing = [
            info("id", "INTEGER", false, true),
            info("name", "TEXT", false, false),
            info("legacy", "TEXT", true, false),
        ];
        let statements = SQLITE
            .compile_alter(&table, &existing)
            .expect("Failed to compile the rebuild");
        assert_eq!(
            statements,
            [
                indoc! {r#"
                    CREATE TABLE "__quarry_tmp_users" (
                    "id" INTEGER PRIMARY KEY,
                    "full_name" TEXT NOT NULL,
                    "city" TEXT
                    )
                "#}
                .trim(),
                indoc! {r#"
                    INSERT INTO "__quarry_tmp_users" ("id", "full_name")
                    SELECT "id", "name"
                    FROM "users"
                "#}
                .trim(),
                r#"DROP TABLE "users""#,
                r#"ALTER TABLE "__quarry_tmp_users" RENAME TO "users""#,
            ]
        );
    }

    #[test]
    fn sqlite_rebuild_restates_the_surviving_defaults() {
        let mut table = Blueprint::alter("events");
        table.drop_column("payload");
        let existing = [
            info("id", "INTEGER", false, true),
            ColumnInfo {
                default: Some("CURRENT_TIMESTAMP".into()),
                ..info("seen_at", "TEXT", true, false)
            },
            info("payload", "BLOB", true, false),
        ];
        let statements = SQLITE
            .compile_alter(&table, &existing)
            .expect("Failed to compile the rebuild");
        assert_eq!(
            statements[0],
            indoc! {r#"
                CREATE TABLE "__quarry_tmp_events" (
                "id" INTEGER PRIMARY KEY,
                "seen_at" TEXT DEFAULT CURRENT_TIMESTAMP
                )
            "#}
            .trim()
        );
    }

    #[test]
    fn sqlite_rebuild_requires_the_introspected_columns() {
        let mut table = Blueprint::alter("users");
        table.drop_column("legacy");
        let error = SQLITE
            .compile_alter(&table, &[])
            .expect_err("A rebuild without introspection must not compile");
        assert!(error.to_string().contains("current columns"));
    }

    #[test]
    fn sqlite_rebuild_rejects_conflicting_changes() {
        let existing = [
            info("id", "INTEGER", false, true),
            info("name", "TEXT", false, false),
        ];

        let mut table = Blueprint::alter("users");
        table.drop_column("name");
        table.rename_column("ghost", "codename");
        let error = SQLITE
            .compile_alter(&table, &existing)
            .expect_err("Renaming an unknown column must not compile");
        assert!(error.to_string().contains("unknown column"));

        let mut table = Blueprint::alter("users");
        table.string("name", 50).unique();
        let error = SQLITE
            .compile_alter(&table, &existing)
            .expect_err("Re-adding an existing column must not compile");
        assert!(error.to_string().contains("already exists"));

        let mut table = Blueprint::alter("users");
        table.drop_column("name");
        table.rename_table("clients");
        let error = SQLITE
            .compile_alter(&table, &existing)
            .expect_err("Renaming the table during a rebuild must not compile");
        assert!(error.to_string().contains("same change"));
    }

    #[test]
    fn drops_and_renames_are_single_statements() {
        assert_eq!(WRITER.compile_drop("users"), "DROP TABLE \"users\"");
        assert_eq!(
            WRITER.compile_drop_if_exists("users"),
            "DROP TABLE IF EXISTS \"users\""
        );
        assert_eq!(
            WRITER.compile_rename("users", "clients"),
            "ALTER TABLE \"users\" RENAME TO \"clients\""
        );
    }

    #[test]
    fn table_existence_probes_per_dialect() {
        let statement = WRITER.compile_table_exists("users");
        assert_eq!(
            statement.sql,
            "SELECT EXISTS(SELECT 1 FROM information_schema.tables WHERE table_name = ?) \
             AS \"exists\""
        );
        assert_eq!(statement.bindings, [Value::from("users")]);

        let statement = SQLITE.compile_table_exists("users");
        assert_eq!(
            statement.sql,
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?) \
             AS \"exists\""
        );
        assert_eq!(statement.bindings, [Value::from("users")]);

        let statement = MYSQL.compile_table_exists("users");
        assert_eq!(
            statement.sql,
            "SELECT EXISTS(SELECT 1 FROM information_schema.tables \
             WHERE table_schema = database() AND table_name = ?) AS `exists`"
        );
        assert_eq!(statement.bindings, [Value::from("users")]);

        let prefixed = SQLiteSqlWriter::with_prefix("app_");
        let statement = prefixed.compile_table_exists("users");
        assert_eq!(statement.bindings, [Value::from("app_users")]);
    }

    #[test]
    fn column_listings_per_dialect() {
        let statement = SQLITE.compile_column_listing("users");
        assert_eq!(statement.sql, "PRAGMA table_info(\"users\")");
        assert!(statement.bindings.is_empty());

        let statement = MYSQL.compile_column_listing("users");
        assert_eq!(
            statement.sql,
            "SELECT column_name AS `name`, column_type AS `type`, is_nullable AS `nullable`, \
             column_default AS `default`, column_key AS `column_key` \
             FROM information_schema.columns \
             WHERE table_schema = database() AND table_name = ? ORDER BY ordinal_position"
        );
        assert_eq!(statement.bindings, [Value::from("users")]);

        let statement = WRITER.compile_column_listing("users");
        assert_eq!(
            statement.sql,
            "SELECT column_name AS \"name\", data_type AS \"type\", is_nullable AS \"nullable\", \
             column_default AS \"default\" \
             FROM information_schema.columns WHERE table_name = ? ORDER BY ordinal_position"
        );
        assert_eq!(statement.bindings, [Value::from("users")]);
    }

    #[test]
    fn mysql_session_statements_set_the_charset() {
        let config = ConnectionConfig {
            charset: Some("utf8mb4".into()),
            collation: Some("utf8mb4_unicode_ci".into()),
            ..ConnectionConfig::new("app")
        };
        let statements = MYSQL.compile_session(&config);
        assert_eq!(statements.len(), 1);
        assert_eq!(
            statements[0].sql,
            "SET NAMES 'utf8mb4' COLLATE 'utf8mb4_unicode_ci'"
        );

        let config = ConnectionConfig {
            charset: Some("utf8".into()),
            ..ConnectionConfig::new("app")
        };
        assert_eq!(MYSQL.compile_session(&config)[0].sql, "SET NAMES 'utf8'");
        assert!(MYSQL.compile_session(&ConnectionConfig::new("app")).is_empty());
        assert!(WRITER.compile_session(&ConnectionConfig::new("app")).is_empty());
    }
}
