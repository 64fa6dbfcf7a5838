use crate::{
    Aggregate, Assignment, ConnectionConfig, Error, HavingClause, OrderClause, Query, Result,
    SelectItem, Statement, Value, WhereClause, separated_by,
};
use std::{collections::BTreeMap, fmt::Write};
use time::{Date, Time};

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}
macro_rules! write_float {
    ($out:ident, $value:expr) => {{
        let value = $value;
        if value.is_finite() {
            let mut buffer = ryu::Buffer::new();
            $out.push_str(buffer.format(value));
        } else if value.is_nan() {
            $out.push_str("NULL");
        } else {
            // Overflows into an infinity where the backend has one.
            $out.push_str(if value > 0. { "9e999" } else { "-9e999" });
        }
    }};
}

/// Splits `expr as alias` (case-insensitive, last occurrence) into its parts.
fn split_alias(expr: &str) -> Option<(&str, &str)> {
    let lower = expr.to_ascii_lowercase();
    lower
        .rfind(" as ")
        .map(|i| (expr[..i].trim_end(), expr[i + 4..].trim_start()))
}

/// Compiles the query AST into dialect-specific SQL.
///
/// Default methods implement the portable grammar; dialect crates override the
/// handful of spots where backends disagree (identifier quoting, union member
/// wrapping, OFFSET without LIMIT). Writers hold the configured table prefix
/// and apply it to every table name and to the qualifying segment of dotted
/// column paths.
///
/// All `compile_*` methods produce a [`Statement`]: bindings are pushed in the
/// same pass that writes the text, which makes binding order equal placeholder
/// order by construction.
pub trait SqlWriter: Send + Sync {
    fn as_dyn(&self) -> &dyn SqlWriter;

    fn table_prefix(&self) -> &str {
        ""
    }

    fn write_escaped(&self, out: &mut String, value: &str, search: char, replace: &str) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(out, value, '"', r#""""#);
        out.push('"');
    }

    /// Table expression as used in FROM and JOIN, honouring an `as` alias.
    fn write_table(&self, out: &mut String, table: &str) {
        if let Some((name, alias)) = split_alias(table) {
            self.write_table_name(out, name);
            out.push_str(" AS ");
            self.write_identifier_quoted(out, alias);
        } else {
            self.write_table_name(out, table);
        }
    }

    fn write_table_name(&self, out: &mut String, name: &str) {
        let prefixed = format!("{}{}", self.table_prefix(), name);
        self.write_identifier_quoted(out, &prefixed);
    }

    /// Column path: `*`, `name`, `table.name`, `table.*` or any of those with
    /// an `as` alias. The qualifying table segment receives the prefix, same
    /// as a table name would.
    fn write_column(&self, out: &mut String, column: &str) {
        if let Some((expr, alias)) = split_alias(column) {
            self.write_column(out, expr);
            out.push_str(" AS ");
            self.write_identifier_quoted(out, alias);
            return;
        }
        match column.split_once('.') {
            Some((table, name)) => {
                self.write_table_name(out, table);
                out.push('.');
                if name == "*" {
                    out.push('*');
                } else {
                    self.write_identifier_quoted(out, name);
                }
            }
            None => {
                if column == "*" {
                    out.push('*');
                } else {
                    self.write_identifier_quoted(out, column);
                }
            }
        }
    }

    /// Positional parameter marker. `index` is zero-based and unused by the
    /// `?` dialects.
    fn write_placeholder(&self, out: &mut String, index: usize) {
        let _ = index;
        out.push('?');
    }

    // Literal values, used by DDL defaults and session statements. Query
    // values always travel as bindings instead.

    fn write_value(&self, out: &mut String, value: &Value) {
        match value {
            v if v.is_null() => self.write_value_none(out),
            Value::Boolean(Some(v)) => self.write_value_bool(out, *v),
            Value::Int8(Some(v)) => write_integer!(out, *v),
            Value::Int16(Some(v)) => write_integer!(out, *v),
            Value::Int32(Some(v)) => write_integer!(out, *v),
            Value::Int64(Some(v)) => write_integer!(out, *v),
            Value::UInt8(Some(v)) => write_integer!(out, *v),
            Value::UInt16(Some(v)) => write_integer!(out, *v),
            Value::UInt32(Some(v)) => write_integer!(out, *v),
            Value::UInt64(Some(v)) => write_integer!(out, *v),
            Value::Float32(Some(v)) => write_float!(out, *v),
            Value::Float64(Some(v)) => write_float!(out, *v),
            Value::Decimal(Some(v), ..) => {
                let _ = write!(out, "{}", v);
            }
            Value::Varchar(Some(v)) => self.write_value_string(out, v),
            Value::Blob(Some(v)) => self.write_value_blob(out, v),
            Value::Date(Some(v)) => {
                out.push('\'');
                self.write_value_date(out, v);
                out.push('\'');
            }
            Value::Time(Some(v)) => {
                out.push('\'');
                self.write_value_time(out, v);
                out.push('\'');
            }
            Value::Timestamp(Some(v)) => {
                out.push('\'');
                self.write_value_date(out, &v.date());
                out.push(' ');
                self.write_value_time(out, &v.time());
                out.push('\'');
            }
            Value::Uuid(Some(v)) => {
                let _ = write!(out, "'{}'", v);
            }
            _ => unreachable!("null payloads are handled by the first arm"),
        }
    }

    fn write_value_none(&self, out: &mut String) {
        out.push_str("NULL")
    }

    fn write_value_bool(&self, out: &mut String, value: bool) {
        out.push_str(["FALSE", "TRUE"][value as usize])
    }

    fn write_value_string(&self, out: &mut String, value: &str) {
        out.push('\'');
        self.write_escaped(out, value, '\'', "''");
        out.push('\'');
    }

    fn write_value_blob(&self, out: &mut String, value: &[u8]) {
        out.push_str("X'");
        out.push_str(&hex::encode_upper(value));
        out.push('\'');
    }

    fn write_value_date(&self, out: &mut String, value: &Date) {
        let _ = write!(
            out,
            "{:04}-{:02}-{:02}",
            value.year(),
            value.month() as u8,
            value.day()
        );
    }

    fn write_value_time(&self, out: &mut String, value: &Time) {
        let _ = write!(
            out,
            "{:02}:{:02}:{:02}",
            value.hour(),
            value.minute(),
            value.second()
        );
        let mut subsecond = value.nanosecond();
        if subsecond > 0 {
            let mut width = 9;
            while width > 1 && subsecond % 10 == 0 {
                subsecond /= 10;
                width -= 1;
            }
            let _ = write!(out, ".{:0width$}", subsecond);
        }
    }

    // Compilation entry points.

    fn compile_select(&self, query: &Query) -> Result<Statement> {
        self.validate(query)?;
        let mut sql = String::new();
        let mut bindings = Vec::new();
        self.write_select(&mut sql, &mut bindings, query);
        Ok(Statement::new(sql, bindings))
    }

    fn compile_exists(&self, query: &Query) -> Result<Statement> {
        self.validate(query)?;
        let mut sql = String::new();
        let mut bindings = Vec::new();
        sql.push_str("SELECT EXISTS(");
        self.write_select(&mut sql, &mut bindings, query);
        sql.push_str(") AS ");
        self.write_identifier_quoted(&mut sql, "exists");
        Ok(Statement::new(sql, bindings))
    }

    fn compile_insert(&self, query: &Query, rows: &[BTreeMap<String, Value>]) -> Result<Statement> {
        if query.table.is_empty() {
            return Err(Error::compile("cannot insert without a table"));
        }
        let Some(first) = rows.first() else {
            return Err(Error::compile("cannot insert zero rows"));
        };
        if first.is_empty() {
            return Err(Error::compile("cannot insert a row with no columns"));
        }
        let columns: Vec<&String> = first.keys().collect();
        let mut sql = String::new();
        let mut bindings = Vec::new();
        sql.push_str("INSERT INTO ");
        self.write_table(&mut sql, &query.table);
        sql.push_str(" (");
        separated_by(
            &mut sql,
            &columns,
            |out, c| self.write_identifier_quoted(out, c),
            ", ",
        );
        sql.push_str(") VALUES\n");
        separated_by(
            &mut sql,
            rows,
            |out, row| {
                out.push('(');
                separated_by(
                    out,
                    &columns,
                    |out, column| {
                        self.write_placeholder(out, bindings.len());
                        // Rows missing one of the leading row's columns bind NULL.
                        bindings.push(row.get(column.as_str()).cloned().unwrap_or(Value::Null));
                    },
                    ", ",
                );
                out.push(')');
            },
            ",\n",
        );
        Ok(Statement::new(sql, bindings))
    }

    fn compile_update(&self, query: &Query, values: &[Assignment]) -> Result<Statement> {
        if query.table.is_empty() {
            return Err(Error::compile("cannot update without a table"));
        }
        if !query.joins.is_empty() {
            return Err(Error::compile("update does not support joins"));
        }
        if values.is_empty() {
            return Err(Error::compile("update needs at least one assignment"));
        }
        let mut sql = String::new();
        let mut bindings = Vec::new();
        sql.push_str("UPDATE ");
        self.write_table(&mut sql, &query.table);
        sql.push_str("\nSET ");
        separated_by(
            &mut sql,
            values,
            |out, assignment| match assignment {
                Assignment::Set { column, value } => {
                    self.write_column(out, column);
                    out.push_str(" = ");
                    self.write_placeholder(out, bindings.len());
                    bindings.push(value.clone());
                }
                Assignment::Step {
                    column,
                    amount,
                    negative,
                } => {
                    self.write_column(out, column);
                    out.push_str(" = ");
                    self.write_column(out, column);
                    out.push_str(if *negative { " - " } else { " + " });
                    self.write_placeholder(out, bindings.len());
                    bindings.push(amount.clone());
                }
            },
            ", ",
        );
        if !query.wheres.is_empty() {
            sql.push_str("\nWHERE ");
            self.write_conditions(&mut sql, &mut bindings, &query.wheres);
        }
        Ok(Statement::new(sql, bindings))
    }

    fn compile_delete(&self, query: &Query) -> Result<Statement> {
        if query.table.is_empty() {
            return Err(Error::compile("cannot delete without a table"));
        }
        if !query.joins.is_empty() {
            return Err(Error::compile("delete does not support joins"));
        }
        let mut sql = String::new();
        let mut bindings = Vec::new();
        sql.push_str("DELETE FROM ");
        self.write_table(&mut sql, &query.table);
        if !query.wheres.is_empty() {
            sql.push_str("\nWHERE ");
            self.write_conditions(&mut sql, &mut bindings, &query.wheres);
        }
        Ok(Statement::new(sql, bindings))
    }

    fn compile_savepoint(&self, name: &str) -> Statement {
        Statement::raw(format!("SAVEPOINT {name}"))
    }

    fn compile_savepoint_rollback(&self, name: &str) -> Statement {
        Statement::raw(format!("ROLLBACK TO SAVEPOINT {name}"))
    }

    fn compile_savepoint_release(&self, name: &str) -> Statement {
        Statement::raw(format!("RELEASE SAVEPOINT {name}"))
    }

    /// Statements a driver runs right after connecting, charset setup mostly.
    fn compile_session(&self, config: &ConnectionConfig) -> Vec<Statement> {
        let _ = config;
        Vec::new()
    }

    /// Structural checks shared by every compile entry point.
    fn validate(&self, query: &Query) -> Result<()> {
        if query.table.is_empty() {
            return Err(Error::compile("cannot compile a query without a table"));
        }
        if self.having_requires_group_by() && !query.havings.is_empty() && query.groups.is_empty() {
            return Err(Error::compile(
                "this dialect requires GROUP BY for a HAVING clause",
            ));
        }
        for union in &query.unions {
            if !union.query.unions.is_empty() {
                return Err(Error::compile(
                    "nest unions by chaining them on the outermost query",
                ));
            }
            self.validate(&union.query)?;
        }
        Ok(())
    }

    fn having_requires_group_by(&self) -> bool {
        false
    }

    // The emission pipeline. Clause order is fixed; bindings are pushed by
    // the same code that writes the placeholder.

    fn write_select(&self, out: &mut String, bindings: &mut Vec<Value>, query: &Query) {
        if query.unions.is_empty() {
            self.write_select_core(out, bindings, query, true);
            return;
        }
        // The base query's orders and limit apply to the union as a whole, so
        // they move past the last member.
        self.write_union_member(out, bindings, query, false);
        for union in &query.unions {
            out.push_str(if union.all { "\nUNION ALL\n" } else { "\nUNION\n" });
            self.write_union_member(out, bindings, &union.query, true);
        }
        self.write_orders(out, &query.orders);
        self.write_limit_offset(out, query.limit, query.offset);
    }

    /// One SELECT without its union chain. `trailing` controls whether the
    /// query's own orders and limit are written; the base query of a union
    /// chain holds the orders of the whole chain, which compile after it.
    fn write_select_core(
        &self,
        out: &mut String,
        bindings: &mut Vec<Value>,
        query: &Query,
        trailing: bool,
    ) {
        out.push_str("SELECT ");
        if let Some(aggregate) = &query.aggregate {
            self.write_aggregate(out, query, aggregate);
        } else {
            if query.distinct {
                out.push_str("DISTINCT ");
            }
            if query.columns.is_empty() {
                out.push('*');
            } else {
                separated_by(
                    out,
                    &query.columns,
                    |out, item| self.write_select_item(out, bindings, item),
                    ", ",
                );
            }
        }
        out.push_str("\nFROM ");
        self.write_table(out, &query.table);
        for join in &query.joins {
            out.push('\n');
            out.push_str(join.kind.as_sql());
            out.push(' ');
            self.write_table(out, &join.table);
            if !join.wheres.is_empty() {
                out.push_str(" ON ");
                self.write_conditions(out, bindings, &join.wheres);
            }
        }
        if !query.wheres.is_empty() {
            out.push_str("\nWHERE ");
            self.write_conditions(out, bindings, &query.wheres);
        }
        if !query.groups.is_empty() {
            out.push_str("\nGROUP BY ");
            separated_by(
                out,
                &query.groups,
                |out, column| self.write_column(out, column),
                ", ",
            );
        }
        if !query.havings.is_empty() {
            out.push_str("\nHAVING ");
            self.write_havings(out, bindings, &query.havings);
        }
        if trailing {
            self.write_orders(out, &query.orders);
            self.write_limit_offset(out, query.limit, query.offset);
        }
    }

    /// How one member of a UNION chain is isolated. Parentheses are the
    /// common form; restricted dialects wrap members in a subselect instead.
    fn write_union_member(
        &self,
        out: &mut String,
        bindings: &mut Vec<Value>,
        query: &Query,
        trailing: bool,
    ) {
        out.push('(');
        self.write_select_core(out, bindings, query, trailing);
        out.push(')');
    }

    fn write_aggregate(&self, out: &mut String, query: &Query, aggregate: &Aggregate) {
        out.push_str(aggregate.function.as_sql());
        out.push('(');
        if query.distinct && aggregate.column != "*" {
            out.push_str("DISTINCT ");
        }
        self.write_column(out, &aggregate.column);
        out.push_str(") AS ");
        self.write_identifier_quoted(out, "aggregate");
    }

    fn write_select_item(&self, out: &mut String, bindings: &mut Vec<Value>, item: &SelectItem) {
        match item {
            SelectItem::Column(column) => self.write_column(out, column),
            SelectItem::Raw(sql, raw_bindings) => {
                out.push_str(sql);
                bindings.extend(raw_bindings.iter().cloned());
            }
        }
    }

    fn write_conditions(&self, out: &mut String, bindings: &mut Vec<Value>, wheres: &[WhereClause]) {
        for (i, clause) in wheres.iter().enumerate() {
            if i > 0 {
                out.push_str(if clause.or() { " OR " } else { " AND " });
            }
            self.write_where_clause(out, bindings, clause);
        }
    }

    fn write_where_clause(&self, out: &mut String, bindings: &mut Vec<Value>, clause: &WhereClause) {
        match clause {
            WhereClause::Basic {
                column, op, value, ..
            } => {
                self.write_column(out, column);
                out.push(' ');
                out.push_str(op.as_sql());
                out.push(' ');
                self.write_placeholder(out, bindings.len());
                bindings.push(value.clone());
            }
            WhereClause::Column {
                first, op, second, ..
            } => {
                self.write_column(out, first);
                out.push(' ');
                out.push_str(op.as_sql());
                out.push(' ');
                self.write_column(out, second);
            }
            WhereClause::Null {
                column, negated, ..
            } => {
                self.write_column(out, column);
                out.push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            WhereClause::In {
                column,
                values,
                negated,
                ..
            } => {
                // IN () is not valid SQL; an empty list can match nothing
                // (or everything, when negated) without touching the backend.
                if values.is_empty() {
                    out.push_str(if *negated { "1 = 1" } else { "0 = 1" });
                    return;
                }
                self.write_column(out, column);
                out.push_str(if *negated { " NOT IN (" } else { " IN (" });
                separated_by(
                    out,
                    values,
                    |out, value| {
                        self.write_placeholder(out, bindings.len());
                        bindings.push(value.clone());
                    },
                    ", ",
                );
                out.push(')');
            }
            WhereClause::Between {
                column,
                low,
                high,
                negated,
                ..
            } => {
                self.write_column(out, column);
                out.push_str(if *negated {
                    " NOT BETWEEN "
                } else {
                    " BETWEEN "
                });
                self.write_placeholder(out, bindings.len());
                bindings.push(low.clone());
                out.push_str(" AND ");
                self.write_placeholder(out, bindings.len());
                bindings.push(high.clone());
            }
            WhereClause::Nested { wheres, .. } => {
                out.push('(');
                self.write_conditions(out, bindings, wheres);
                out.push(')');
            }
            WhereClause::Raw {
                sql, bindings: raw, ..
            } => {
                out.push_str(sql);
                bindings.extend(raw.iter().cloned());
            }
        }
    }

    fn write_havings(&self, out: &mut String, bindings: &mut Vec<Value>, havings: &[HavingClause]) {
        for (i, having) in havings.iter().enumerate() {
            if i > 0 {
                out.push_str(if having.or { " OR " } else { " AND " });
            }
            self.write_column(out, &having.column);
            out.push(' ');
            out.push_str(having.op.as_sql());
            out.push(' ');
            self.write_placeholder(out, bindings.len());
            bindings.push(having.value.clone());
        }
    }

    fn write_orders(&self, out: &mut String, orders: &[OrderClause]) {
        if orders.is_empty() {
            return;
        }
        out.push_str("\nORDER BY ");
        separated_by(
            out,
            orders,
            |out, order| {
                self.write_column(out, &order.column);
                out.push_str(if order.descending { " DESC" } else { " ASC" });
            },
            ", ",
        );
    }

    fn write_limit_offset(&self, out: &mut String, limit: Option<u64>, offset: Option<u64>) {
        if let Some(limit) = limit {
            out.push_str("\nLIMIT ");
            write_integer!(out, limit);
        } else if offset.is_some() {
            if let Some(filler) = self.offset_requires_limit() {
                out.push_str("\nLIMIT ");
                out.push_str(filler);
            }
        }
        if let Some(offset) = offset {
            out.push_str("\nOFFSET ");
            write_integer!(out, offset);
        }
    }

    /// The LIMIT filler a dialect needs before it accepts a bare OFFSET, if
    /// it needs one at all.
    fn offset_requires_limit(&self) -> Option<&'static str> {
        None
    }
}

/// Prefix-only writer for the portable grammar.
pub struct GenericSqlWriter {
    prefix: String,
}

impl GenericSqlWriter {
    pub const fn new() -> Self {
        Self {
            prefix: String::new(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for GenericSqlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlWriter for GenericSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn table_prefix(&self) -> &str {
        &self.prefix
    }
}
