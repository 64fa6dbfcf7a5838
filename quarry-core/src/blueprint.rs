use crate::{Error, Result, Value};

/// Referential action for foreign key updates / deletes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Action {
    /// No special action.
    #[default]
    NoAction,
    /// Reject the operation.
    Restrict,
    /// Propagate delete/update.
    Cascade,
    /// Set referencing columns to NULL.
    SetNull,
    /// Apply column DEFAULT.
    SetDefault,
}

impl Action {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Action::NoAction => "NO ACTION",
            Action::Restrict => "RESTRICT",
            Action::Cascade => "CASCADE",
            Action::SetNull => "SET NULL",
            Action::SetDefault => "SET DEFAULT",
        }
    }
}

/// Portable column types. Dialects map them to their own spellings; `Raw`
/// carries a type name taken from introspection and is emitted verbatim.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnType {
    Boolean,
    TinyInteger,
    SmallInteger,
    Integer,
    BigInteger,
    Float,
    Double,
    Decimal { precision: u8, scale: u8 },
    Varchar(u32),
    Text,
    Blob,
    Date,
    Time,
    Timestamp,
    Uuid,
    Raw(String),
}

/// Declarative specification of a table column.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub default: Option<Value>,
    /// Default expression taken from introspection, emitted verbatim. Takes
    /// precedence over `default` when both are set.
    pub default_raw: Option<String>,
    pub primary_key: bool,
    pub unique: bool,
    pub auto_increment: bool,
    pub unsigned: bool,
    pub comment: Option<String>,
}

impl ColumnDef {
    fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            default: None,
            default_raw: None,
            primary_key: false,
            unique: false,
            auto_increment: false,
            unsigned: false,
            comment: None,
        }
    }

    pub fn nullable(&mut self) -> &mut Self {
        self.nullable = true;
        self
    }

    pub fn default(&mut self, value: impl Into<Value>) -> &mut Self {
        self.default = Some(value.into());
        self
    }

    pub fn primary(&mut self) -> &mut Self {
        self.primary_key = true;
        self
    }

    pub fn unique(&mut self) -> &mut Self {
        self.unique = true;
        self
    }

    pub fn unsigned(&mut self) -> &mut Self {
        self.unsigned = true;
        self
    }

    pub fn comment(&mut self, text: impl Into<String>) -> &mut Self {
        self.comment = Some(text.into());
        self
    }
}

/// Foreign key declaration, filled in fluently after [`Blueprint::foreign`].
#[derive(Clone, Debug, PartialEq)]
pub struct ForeignKey {
    pub column: String,
    pub references: String,
    pub on: String,
    pub on_delete: Option<Action>,
    pub on_update: Option<Action>,
}

impl ForeignKey {
    fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            references: String::new(),
            on: String::new(),
            on_delete: None,
            on_update: None,
        }
    }

    /// The referenced column, usually the target's primary key.
    pub fn references(&mut self, column: impl Into<String>) -> &mut Self {
        self.references = column.into();
        self
    }

    /// The referenced table.
    pub fn on(&mut self, table: impl Into<String>) -> &mut Self {
        self.on = table.into();
        self
    }

    pub fn on_delete(&mut self, action: Action) -> &mut Self {
        self.on_delete = Some(action);
        self
    }

    pub fn on_update(&mut self, action: Action) -> &mut Self {
        self.on_update = Some(action);
        self
    }
}

/// A structural change queued on a blueprint. Commands compile in declaration
/// order.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Primary(Vec<String>),
    Unique { name: String, columns: Vec<String> },
    Index { name: String, columns: Vec<String> },
    Foreign(ForeignKey),
    DropColumn(String),
    RenameColumn { from: String, to: String },
    RenameTable(String),
    Drop,
    DropIfExists,
}

/// Collects column definitions and commands for one table, to be compiled by
/// a [`SchemaWriter`](crate::SchemaWriter).
#[derive(Clone, Debug, PartialEq)]
pub struct Blueprint {
    pub table: String,
    /// True when the blueprint describes a brand new table rather than a
    /// change to an existing one.
    pub creating: bool,
    pub columns: Vec<ColumnDef>,
    pub commands: Vec<Command>,
}

impl Blueprint {
    pub fn create(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            creating: true,
            columns: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn alter(table: impl Into<String>) -> Self {
        Self {
            creating: false,
            ..Self::create(table)
        }
    }

    pub fn add_column(&mut self, name: impl Into<String>, column_type: ColumnType) -> &mut ColumnDef {
        self.columns.push(ColumnDef::new(name, column_type));
        self.columns.last_mut().unwrap()
    }

    pub fn find_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    // Column declarators in the usual migration vocabulary.

    /// Auto-incrementing unsigned integer primary key.
    pub fn increments(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        let column = self.add_column(name, ColumnType::Integer);
        column.unsigned().primary();
        column.auto_increment = true;
        column
    }

    /// Auto-incrementing unsigned big integer primary key.
    pub fn big_increments(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        let column = self.add_column(name, ColumnType::BigInteger);
        column.unsigned().primary();
        column.auto_increment = true;
        column
    }

    pub fn boolean(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        self.add_column(name, ColumnType::Boolean)
    }

    pub fn tiny_integer(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        self.add_column(name, ColumnType::TinyInteger)
    }

    pub fn small_integer(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        self.add_column(name, ColumnType::SmallInteger)
    }

    pub fn integer(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        self.add_column(name, ColumnType::Integer)
    }

    pub fn big_integer(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        self.add_column(name, ColumnType::BigInteger)
    }

    pub fn float(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        self.add_column(name, ColumnType::Float)
    }

    pub fn double(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        self.add_column(name, ColumnType::Double)
    }

    pub fn decimal(&mut self, name: impl Into<String>, precision: u8, scale: u8) -> &mut ColumnDef {
        self.add_column(name, ColumnType::Decimal { precision, scale })
    }

    pub fn string(&mut self, name: impl Into<String>, length: u32) -> &mut ColumnDef {
        self.add_column(name, ColumnType::Varchar(length))
    }

    pub fn text(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        self.add_column(name, ColumnType::Text)
    }

    pub fn binary(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        self.add_column(name, ColumnType::Blob)
    }

    pub fn date(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        self.add_column(name, ColumnType::Date)
    }

    pub fn time(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        self.add_column(name, ColumnType::Time)
    }

    pub fn timestamp(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        self.add_column(name, ColumnType::Timestamp)
    }

    pub fn uuid(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        self.add_column(name, ColumnType::Uuid)
    }

    /// Nullable `created_at` and `updated_at` timestamps.
    pub fn timestamps(&mut self) -> &mut Self {
        self.timestamp("created_at").nullable();
        self.timestamp("updated_at").nullable();
        self
    }

    // Commands.

    pub fn primary(&mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.commands.push(Command::Primary(
            columns.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn unique(&mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let name = self.index_name(&columns, "unique");
        self.commands.push(Command::Unique { name, columns });
        self
    }

    pub fn index(&mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let name = self.index_name(&columns, "index");
        self.commands.push(Command::Index { name, columns });
        self
    }

    pub fn foreign(&mut self, column: impl Into<String>) -> &mut ForeignKey {
        self.commands.push(Command::Foreign(ForeignKey::new(column)));
        match self.commands.last_mut() {
            Some(Command::Foreign(foreign)) => foreign,
            _ => unreachable!("a foreign key command was pushed right above"),
        }
    }

    pub fn drop_column(&mut self, name: impl Into<String>) -> &mut Self {
        self.commands.push(Command::DropColumn(name.into()));
        self
    }

    pub fn rename_column(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.commands.push(Command::RenameColumn {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    pub fn rename_table(&mut self, to: impl Into<String>) -> &mut Self {
        self.commands.push(Command::RenameTable(to.into()));
        self
    }

    fn index_name(&self, columns: &[String], suffix: &str) -> String {
        let mut name = self.table.clone();
        for column in columns {
            name.push('_');
            name.push_str(column);
        }
        name.push('_');
        name.push_str(suffix);
        name
    }

    /// Structural checks shared by the dialect writers.
    pub fn validate(&self) -> Result<()> {
        if self.table.is_empty() {
            return Err(Error::compile("blueprint needs a table name"));
        }
        for command in &self.commands {
            if let Command::Foreign(foreign) = command {
                if foreign.references.is_empty() || foreign.on.is_empty() {
                    return Err(Error::compile(format!(
                        "foreign key on `{}` misses its referenced table or column",
                        foreign.column,
                    )));
                }
                if self.creating && self.find_column(&foreign.column).is_none() {
                    return Err(Error::compile(format!(
                        "foreign key references the undeclared local column `{}`",
                        foreign.column,
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fluent_declaration_accumulates() {
        let mut table = Blueprint::create("users");
        table.increments("id");
        table.string("email", 255).unique();
        table.string("name", 120).nullable().default("anonymous");
        table.timestamps();
        table.index(["email"]);
        assert_eq!(table.columns.len(), 5);
        assert!(table.find_column("id").is_some_and(|c| c.auto_increment));
        assert!(table.find_column("created_at").is_some_and(|c| c.nullable));
        assert!(matches!(
            &table.commands[0],
            Command::Index { name, .. } if name == "users_email_index"
        ));
    }

    #[test]
    fn foreign_key_must_point_at_a_declared_column() {
        let mut table = Blueprint::create("posts");
        table.increments("id");
        table
            .foreign("user_id")
            .references("id")
            .on("users")
            .on_delete(Action::Cascade);
        let error = table.validate().expect_err("Missing local column must fail");
        assert!(error.to_string().contains("user_id"));
    }
}
