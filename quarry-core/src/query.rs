use crate::{AsValue, Connection, Error, Result, Row, Value};
use std::collections::BTreeMap;

/// Comparison operators accepted by the typed where/having clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    NotLike,
}

impl Op {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "<>",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Like => "LIKE",
            Op::NotLike => "NOT LIKE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    /// A column path, possibly qualified (`users.id`) or aliased (`id as key`).
    Column(String),
    /// A verbatim SQL fragment with its own bindings, never quoted or checked.
    Raw(String, Vec<Value>),
}

/// One node of a WHERE tree. `or` is the connector binding the clause to the
/// one before it; the writer drops the connector of the first clause in a
/// group, so the flag of a leading clause carries no meaning.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereClause {
    Basic {
        column: String,
        op: Op,
        value: Value,
        or: bool,
    },
    /// Column compared to column, no binding involved.
    Column {
        first: String,
        op: Op,
        second: String,
        or: bool,
    },
    Null {
        column: String,
        negated: bool,
        or: bool,
    },
    In {
        column: String,
        values: Vec<Value>,
        negated: bool,
        or: bool,
    },
    Between {
        column: String,
        low: Value,
        high: Value,
        negated: bool,
        or: bool,
    },
    /// A parenthesized group. The connector of its first child is absorbed by
    /// the group itself.
    Nested {
        wheres: Vec<WhereClause>,
        or: bool,
    },
    Raw {
        sql: String,
        bindings: Vec<Value>,
        or: bool,
    },
}

impl WhereClause {
    pub fn or(&self) -> bool {
        match self {
            WhereClause::Basic { or, .. }
            | WhereClause::Column { or, .. }
            | WhereClause::Null { or, .. }
            | WhereClause::In { or, .. }
            | WhereClause::Between { or, .. }
            | WhereClause::Nested { or, .. }
            | WhereClause::Raw { or, .. } => *or,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
        }
    }
}

/// A join whose ON conditions reuse the where clause nodes, which keeps
/// column-to-column conditions and extra constant filters in one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub kind: JoinKind,
    pub table: String,
    pub wheres: Vec<WhereClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HavingClause {
    pub column: String,
    pub op: Op,
    pub value: Value,
    pub or: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderClause {
    pub column: String,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionClause {
    pub query: Query,
    pub all: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub function: AggregateFunction,
    pub column: String,
}

/// One SET item of an UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    Set {
        column: String,
        value: Value,
    },
    /// `column = column + ?` (or `- ?`), a single atomic read-modify-write on
    /// the database side.
    Step {
        column: String,
        amount: Value,
        negative: bool,
    },
}

/// Comparing against NULL with `=` or `<>` means IS NULL in every SQL
/// dialect, so those turn into null checks instead of binding a NULL.
fn basic_where(column: String, op: Op, value: Value, or: bool) -> WhereClause {
    if value.is_null() && matches!(op, Op::Eq | Op::Ne) {
        return WhereClause::Null {
            column,
            negated: op == Op::Ne,
            or,
        };
    }
    WhereClause::Basic {
        column,
        op,
        value,
        or,
    }
}

/// The query builder and its abstract syntax tree in one structure.
///
/// Clause methods take and return `self` so queries read fluently; nothing
/// touches a database until one of the terminal methods receives a
/// [`Connection`]. The writer visits the clause vectors in a fixed order
/// (select, join, where, group, having, order, limit, union) and pushes
/// bindings while it writes, so binding order always matches placeholder
/// order.
///
/// ```no_run
/// # use quarry_core::{Op, Query};
/// let query = Query::table("users")
///     .select(["id", "name"])
///     .and_where("active", Op::Eq, true)
///     .order_by("name")
///     .limit(10);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub table: String,
    pub columns: Vec<SelectItem>,
    pub distinct: bool,
    pub joins: Vec<JoinClause>,
    pub wheres: Vec<WhereClause>,
    pub groups: Vec<String>,
    pub havings: Vec<HavingClause>,
    pub orders: Vec<OrderClause>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub unions: Vec<UnionClause>,
    pub aggregate: Option<Aggregate>,
}

impl Query {
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            table: name.into(),
            ..Default::default()
        }
    }

    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns
            .into_iter()
            .map(|c| SelectItem::Column(c.into()))
            .collect();
        self
    }

    pub fn select_raw(mut self, sql: impl Into<String>, bindings: Vec<Value>) -> Self {
        self.columns.push(SelectItem::Raw(sql.into(), bindings));
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn and_where(mut self, column: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        self.wheres.push(basic_where(column.into(), op, value.into(), false));
        self
    }

    pub fn or_where(mut self, column: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        self.wheres.push(basic_where(column.into(), op, value.into(), true));
        self
    }

    pub fn where_column(
        mut self,
        first: impl Into<String>,
        op: Op,
        second: impl Into<String>,
    ) -> Self {
        self.wheres.push(WhereClause::Column {
            first: first.into(),
            op,
            second: second.into(),
            or: false,
        });
        self
    }

    pub fn where_in<I, V>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.wheres.push(WhereClause::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
            negated: false,
            or: false,
        });
        self
    }

    pub fn or_where_in<I, V>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.wheres.push(WhereClause::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
            negated: false,
            or: true,
        });
        self
    }

    pub fn where_not_in<I, V>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.wheres.push(WhereClause::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
            negated: true,
            or: false,
        });
        self
    }

    pub fn where_null(mut self, column: impl Into<String>) -> Self {
        self.wheres.push(WhereClause::Null {
            column: column.into(),
            negated: false,
            or: false,
        });
        self
    }

    pub fn or_where_null(mut self, column: impl Into<String>) -> Self {
        self.wheres.push(WhereClause::Null {
            column: column.into(),
            negated: false,
            or: true,
        });
        self
    }

    pub fn where_not_null(mut self, column: impl Into<String>) -> Self {
        self.wheres.push(WhereClause::Null {
            column: column.into(),
            negated: true,
            or: false,
        });
        self
    }

    pub fn where_between(
        mut self,
        column: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        self.wheres.push(WhereClause::Between {
            column: column.into(),
            low: low.into(),
            high: high.into(),
            negated: false,
            or: false,
        });
        self
    }

    pub fn where_not_between(
        mut self,
        column: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        self.wheres.push(WhereClause::Between {
            column: column.into(),
            low: low.into(),
            high: high.into(),
            negated: true,
            or: false,
        });
        self
    }

    pub fn where_raw(mut self, sql: impl Into<String>, bindings: Vec<Value>) -> Self {
        self.wheres.push(WhereClause::Raw {
            sql: sql.into(),
            bindings,
            or: false,
        });
        self
    }

    pub fn or_where_raw(mut self, sql: impl Into<String>, bindings: Vec<Value>) -> Self {
        self.wheres.push(WhereClause::Raw {
            sql: sql.into(),
            bindings,
            or: true,
        });
        self
    }

    /// Group conditions in parentheses. The closure receives a fresh builder
    /// for the same table; only its where clauses are kept. An empty group is
    /// dropped entirely.
    pub fn where_nested(mut self, build: impl FnOnce(Query) -> Query) -> Self {
        let inner = build(Query::table(self.table.clone()));
        if !inner.wheres.is_empty() {
            self.wheres.push(WhereClause::Nested {
                wheres: inner.wheres,
                or: false,
            });
        }
        self
    }

    pub fn or_where_nested(mut self, build: impl FnOnce(Query) -> Query) -> Self {
        let inner = build(Query::table(self.table.clone()));
        if !inner.wheres.is_empty() {
            self.wheres.push(WhereClause::Nested {
                wheres: inner.wheres,
                or: true,
            });
        }
        self
    }

    fn push_join(
        mut self,
        kind: JoinKind,
        table: impl Into<String>,
        first: impl Into<String>,
        op: Op,
        second: impl Into<String>,
    ) -> Self {
        self.joins.push(JoinClause {
            kind,
            table: table.into(),
            wheres: vec![WhereClause::Column {
                first: first.into(),
                op,
                second: second.into(),
                or: false,
            }],
        });
        self
    }

    pub fn join(
        self,
        table: impl Into<String>,
        first: impl Into<String>,
        op: Op,
        second: impl Into<String>,
    ) -> Self {
        self.push_join(JoinKind::Inner, table, first, op, second)
    }

    pub fn left_join(
        self,
        table: impl Into<String>,
        first: impl Into<String>,
        op: Op,
        second: impl Into<String>,
    ) -> Self {
        self.push_join(JoinKind::Left, table, first, op, second)
    }

    pub fn right_join(
        self,
        table: impl Into<String>,
        first: impl Into<String>,
        op: Op,
        second: impl Into<String>,
    ) -> Self {
        self.push_join(JoinKind::Right, table, first, op, second)
    }

    /// Add a constant filter to the last declared join's ON conditions.
    pub fn join_where(
        mut self,
        column: impl Into<String>,
        op: Op,
        value: impl Into<Value>,
    ) -> Self {
        if let Some(join) = self.joins.last_mut() {
            join.wheres.push(WhereClause::Basic {
                column: column.into(),
                op,
                value: value.into(),
                or: false,
            });
        }
        self
    }

    pub fn group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn having(mut self, column: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        self.havings.push(HavingClause {
            column: column.into(),
            op,
            value: value.into(),
            or: false,
        });
        self
    }

    pub fn or_having(mut self, column: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        self.havings.push(HavingClause {
            column: column.into(),
            op,
            value: value.into(),
            or: true,
        });
        self
    }

    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.orders.push(OrderClause {
            column: column.into(),
            descending: false,
        });
        self
    }

    pub fn order_by_desc(mut self, column: impl Into<String>) -> Self {
        self.orders.push(OrderClause {
            column: column.into(),
            descending: true,
        });
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Chain another query with UNION. Orders, limit and offset of `self`
    /// compile after the whole union chain and therefore apply to it.
    pub fn union(mut self, query: Query) -> Self {
        self.unions.push(UnionClause { query, all: false });
        self
    }

    pub fn union_all(mut self, query: Query) -> Self {
        self.unions.push(UnionClause { query, all: true });
        self
    }

    // Terminal methods. Each compiles through the connection's writer and runs
    // the statement on the connection's executor.

    pub fn get(self, connection: &mut Connection) -> Result<Vec<Row>> {
        let statement = connection.writer().compile_select(&self)?;
        connection.select(&statement)
    }

    pub fn first(self, connection: &mut Connection) -> Result<Option<Row>> {
        let statement = connection.writer().compile_select(&self.limit(1))?;
        connection.select_one(&statement)
    }

    /// The named column of the first row, if any row matches.
    pub fn value(self, connection: &mut Connection, column: &str) -> Result<Option<Value>> {
        Ok(self
            .select([column])
            .first(connection)?
            .and_then(|row| row.values.first().cloned()))
    }

    /// The named column of every matching row.
    pub fn pluck(self, connection: &mut Connection, column: &str) -> Result<Vec<Value>> {
        let rows = self.select([column]).get(connection)?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.values.first().cloned())
            .collect())
    }

    pub fn exists(self, connection: &mut Connection) -> Result<bool> {
        let statement = connection.writer().compile_exists(&self)?;
        match connection.select_one(&statement)? {
            Some(row) => match row.values.first() {
                Some(value) => bool::try_from_value(value.clone()),
                None => Ok(false),
            },
            None => Ok(false),
        }
    }

    fn aggregate_value(
        mut self,
        connection: &mut Connection,
        function: AggregateFunction,
        column: &str,
    ) -> Result<Value> {
        self.aggregate = Some(Aggregate {
            function,
            column: column.into(),
        });
        // The aggregate replaces the column list wholesale.
        self.columns.clear();
        let statement = connection.writer().compile_select(&self)?;
        Ok(connection
            .select_one(&statement)?
            .and_then(|row| row.values.first().cloned())
            .unwrap_or(Value::Null))
    }

    pub fn count(self, connection: &mut Connection) -> Result<u64> {
        match self.aggregate_value(connection, AggregateFunction::Count, "*")? {
            Value::Null => Ok(0),
            value => u64::try_from_value(value),
        }
    }

    pub fn sum(self, connection: &mut Connection, column: &str) -> Result<Value> {
        self.aggregate_value(connection, AggregateFunction::Sum, column)
    }

    pub fn avg(self, connection: &mut Connection, column: &str) -> Result<Value> {
        self.aggregate_value(connection, AggregateFunction::Avg, column)
    }

    pub fn min(self, connection: &mut Connection, column: &str) -> Result<Value> {
        self.aggregate_value(connection, AggregateFunction::Min, column)
    }

    pub fn max(self, connection: &mut Connection, column: &str) -> Result<Value> {
        self.aggregate_value(connection, AggregateFunction::Max, column)
    }

    /// Insert one or more rows in a single multi-row VALUES statement. The
    /// column list comes from the first row; rows missing one of those keys
    /// bind NULL for it. Returns the number of inserted rows.
    pub fn insert<I>(self, connection: &mut Connection, rows: I) -> Result<u64>
    where
        I: IntoIterator<Item = BTreeMap<String, Value>>,
    {
        let rows: Vec<_> = rows.into_iter().collect();
        if rows.is_empty() {
            return Ok(0);
        }
        let statement = connection.writer().compile_insert(&self, &rows)?;
        connection.insert(&statement)
    }

    /// Insert a single row and return the key the backend generated for it.
    pub fn insert_get_id(
        self,
        connection: &mut Connection,
        row: BTreeMap<String, Value>,
    ) -> Result<i64> {
        let statement = connection.writer().compile_insert(&self, &[row])?;
        connection.insert_get_id(&statement)
    }

    pub fn update<I, S, V>(self, connection: &mut Connection, values: I) -> Result<u64>
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<String>,
        V: Into<Value>,
    {
        let assignments: Vec<_> = values
            .into_iter()
            .map(|(column, value)| Assignment::Set {
                column: column.into(),
                value: value.into(),
            })
            .collect();
        let statement = connection.writer().compile_update(&self, &assignments)?;
        connection.update(&statement)
    }

    pub fn delete(self, connection: &mut Connection) -> Result<u64> {
        let statement = connection.writer().compile_delete(&self)?;
        connection.delete(&statement)
    }

    pub fn increment(
        self,
        connection: &mut Connection,
        column: &str,
        amount: impl Into<Value>,
    ) -> Result<u64> {
        self.step(connection, column, amount.into(), false, BTreeMap::new())
    }

    pub fn decrement(
        self,
        connection: &mut Connection,
        column: &str,
        amount: impl Into<Value>,
    ) -> Result<u64> {
        self.step(connection, column, amount.into(), true, BTreeMap::new())
    }

    /// Increment together with extra plain assignments, still one statement.
    pub fn increment_with(
        self,
        connection: &mut Connection,
        column: &str,
        amount: impl Into<Value>,
        extra: BTreeMap<String, Value>,
    ) -> Result<u64> {
        self.step(connection, column, amount.into(), false, extra)
    }

    pub fn decrement_with(
        self,
        connection: &mut Connection,
        column: &str,
        amount: impl Into<Value>,
        extra: BTreeMap<String, Value>,
    ) -> Result<u64> {
        self.step(connection, column, amount.into(), true, extra)
    }

    fn step(
        self,
        connection: &mut Connection,
        column: &str,
        amount: Value,
        negative: bool,
        extra: BTreeMap<String, Value>,
    ) -> Result<u64> {
        if amount.is_null() {
            return Err(Error::compile(format!(
                "cannot step column `{column}` by a NULL amount"
            )));
        }
        let mut assignments = vec![Assignment::Step {
            column: column.into(),
            amount,
            negative,
        }];
        assignments.extend(
            extra
                .into_iter()
                .map(|(column, value)| Assignment::Set { column, value }),
        );
        let statement = connection.writer().compile_update(&self, &assignments)?;
        connection.update(&statement)
    }
}
