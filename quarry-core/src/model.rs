use crate::{
    AsValue, BelongsTo, Connection, Error, HasMany, HasOne, HasOneThrough, Op, Query, Result, Row,
    Value,
};
use std::{collections::BTreeMap, marker::PhantomData};
use time::{OffsetDateTime, PrimitiveDateTime};

/// Persistent state of one table row: the attribute map, the snapshot taken
/// at load or save time, and whether the row is known to the database.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    pub attributes: BTreeMap<String, Value>,
    pub original: BTreeMap<String, Value>,
    pub exists: bool,
}

impl Record {
    pub fn from_row(row: Row) -> Self {
        let attributes: BTreeMap<String, Value> = row.into_pairs().collect();
        Self {
            original: attributes.clone(),
            attributes,
            exists: true,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Attributes that differ from the snapshot, new keys included.
    pub fn dirty(&self) -> BTreeMap<String, Value> {
        self.attributes
            .iter()
            .filter(|(key, value)| self.original.get(key.as_str()) != Some(value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        self.attributes
            .iter()
            .any(|(key, value)| self.original.get(key.as_str()) != Some(value))
    }

    pub fn sync_original(&mut self) {
        self.original = self.attributes.clone();
    }
}

/// An active-record view over one table.
///
/// Implementations supply the table constants and access to their [`Record`];
/// the provided methods cover querying, mass assignment, persistence and the
/// relation constructors.
pub trait Model: Sized {
    const TABLE: &'static str;
    const PRIMARY_KEY: &'static str = "id";
    /// Mass-assignable attributes. Empty means unrestricted.
    const FILLABLE: &'static [&'static str] = &[];
    const TIMESTAMPS: bool = true;
    const INCREMENTING: bool = true;

    fn record(&self) -> &Record;
    fn record_mut(&mut self) -> &mut Record;
    fn from_record(record: Record) -> Self;

    fn query() -> ModelQuery<Self> {
        ModelQuery::new()
    }

    fn find(connection: &mut Connection, id: impl Into<Value>) -> Result<Option<Self>> {
        Self::query().find(connection, id)
    }

    fn all(connection: &mut Connection) -> Result<Vec<Self>> {
        Self::query().get(connection)
    }

    fn create(
        connection: &mut Connection,
        attributes: BTreeMap<String, Value>,
    ) -> Result<Self> {
        let mut model = Self::from_record(Record::default());
        model.fill(attributes);
        model.save(connection)?;
        Ok(model)
    }

    fn exists(&self) -> bool {
        self.record().exists
    }

    fn get(&self, key: &str) -> Value {
        self.record().get(key).cloned().unwrap_or(Value::Null)
    }

    fn get_as<T: AsValue>(&self, key: &str) -> Result<T> {
        T::try_from_value(self.get(key))
    }

    fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.record_mut().set(key, value);
    }

    fn key(&self) -> Value {
        self.get(Self::PRIMARY_KEY)
    }

    fn is_fillable(key: &str) -> bool {
        Self::FILLABLE.is_empty() || Self::FILLABLE.contains(&key)
    }

    /// Mass assignment. Attributes outside `FILLABLE` are dropped.
    fn fill(&mut self, attributes: BTreeMap<String, Value>) -> &mut Self {
        for (key, value) in attributes {
            if Self::is_fillable(&key) {
                self.record_mut().set(key, value);
            } else {
                log::debug!("discarded non fillable attribute `{}.{}`", Self::TABLE, key);
            }
        }
        self
    }

    /// Mass assignment that refuses attributes outside `FILLABLE`.
    fn fill_strict(&mut self, attributes: BTreeMap<String, Value>) -> Result<&mut Self> {
        for (key, value) in attributes {
            if !Self::is_fillable(&key) {
                return Err(Error::constraint(format!(
                    "attribute `{}.{}` is not fillable",
                    Self::TABLE,
                    key,
                )));
            }
            self.record_mut().set(key, value);
        }
        Ok(self)
    }

    /// Inserts new rows, updates existing ones with their dirty attributes.
    /// A clean existing row is a no-op.
    fn save(&mut self, connection: &mut Connection) -> Result<()> {
        if !self.record().exists {
            if Self::TIMESTAMPS {
                let now = Value::Timestamp(Some(now_utc()));
                let record = self.record_mut();
                if record.get("created_at").is_none_or(Value::is_null) {
                    record.set("created_at", now.clone());
                }
                if record.get("updated_at").is_none_or(Value::is_null) {
                    record.set("updated_at", now);
                }
            }
            let attributes = self.record().attributes.clone();
            if Self::INCREMENTING && self.key().is_null() {
                let id = Query::table(Self::TABLE).insert_get_id(connection, attributes)?;
                self.record_mut()
                    .set(Self::PRIMARY_KEY, Value::Int64(Some(id)));
            } else {
                Query::table(Self::TABLE).insert(connection, [attributes])?;
            }
            let record = self.record_mut();
            record.exists = true;
            record.sync_original();
        } else {
            let mut dirty = self.record().dirty();
            if dirty.is_empty() {
                return Ok(());
            }
            let key = self.key();
            if key.is_null() {
                return Err(Error::compile(format!(
                    "cannot update `{}` without its primary key",
                    Self::TABLE,
                )));
            }
            if Self::TIMESTAMPS {
                let now = Value::Timestamp(Some(now_utc()));
                self.record_mut().set("updated_at", now.clone());
                dirty.insert("updated_at".into(), now);
            }
            Query::table(Self::TABLE)
                .and_where(Self::PRIMARY_KEY, Op::Eq, key)
                .update(connection, dirty)?;
            self.record_mut().sync_original();
        }
        Ok(())
    }

    /// Deletes the backing row and marks the instance as no longer stored.
    fn delete(&mut self, connection: &mut Connection) -> Result<()> {
        if !self.record().exists {
            return Ok(());
        }
        let key = self.key();
        if key.is_null() {
            return Err(Error::compile(format!(
                "cannot delete `{}` without its primary key",
                Self::TABLE,
            )));
        }
        Query::table(Self::TABLE)
            .and_where(Self::PRIMARY_KEY, Op::Eq, key)
            .delete(connection)?;
        self.record_mut().exists = false;
        Ok(())
    }

    // Relation constructors. The foreign key is always spelled out, the other
    // key defaults to the respective primary key.

    fn belongs_to<R: Model>(foreign_key: impl Into<String>) -> BelongsTo<Self, R> {
        BelongsTo::new(foreign_key, R::PRIMARY_KEY)
    }

    fn has_one<R: Model>(foreign_key: impl Into<String>) -> HasOne<Self, R> {
        HasOne::new(foreign_key, Self::PRIMARY_KEY)
    }

    fn has_many<R: Model>(foreign_key: impl Into<String>) -> HasMany<Self, R> {
        HasMany::new(foreign_key, Self::PRIMARY_KEY)
    }

    fn has_one_through<T: Model, R: Model>(
        first_key: impl Into<String>,
        second_key: impl Into<String>,
    ) -> HasOneThrough<Self, T, R> {
        HasOneThrough::new(first_key, second_key, Self::PRIMARY_KEY, T::PRIMARY_KEY)
    }
}

fn now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

/// Typed query builder hydrating `M` from the rows it fetches.
pub struct ModelQuery<M: Model> {
    query: Query,
    model: PhantomData<M>,
}

impl<M: Model> ModelQuery<M> {
    pub fn new() -> Self {
        Self {
            query: Query::table(M::TABLE),
            model: PhantomData,
        }
    }

    /// Escape hatch to the untyped builder.
    pub fn into_query(self) -> Query {
        self.query
    }

    fn map(mut self, f: impl FnOnce(Query) -> Query) -> Self {
        self.query = f(self.query);
        self
    }

    pub fn select<I, S>(self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.map(|q| q.select(columns))
    }

    pub fn and_where(self, column: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        self.map(|q| q.and_where(column, op, value))
    }

    pub fn or_where(self, column: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        self.map(|q| q.or_where(column, op, value))
    }

    pub fn where_in<I, V>(self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.map(|q| q.where_in(column, values))
    }

    pub fn where_not_in<I, V>(self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.map(|q| q.where_not_in(column, values))
    }

    pub fn where_null(self, column: impl Into<String>) -> Self {
        self.map(|q| q.where_null(column))
    }

    pub fn where_not_null(self, column: impl Into<String>) -> Self {
        self.map(|q| q.where_not_null(column))
    }

    pub fn order_by(self, column: impl Into<String>) -> Self {
        self.map(|q| q.order_by(column))
    }

    pub fn order_by_desc(self, column: impl Into<String>) -> Self {
        self.map(|q| q.order_by_desc(column))
    }

    /// Newest first, by `created_at`.
    pub fn latest(self) -> Self {
        self.order_by_desc("created_at")
    }

    /// Oldest first, by `created_at`.
    pub fn oldest(self) -> Self {
        self.order_by("created_at")
    }

    pub fn limit(self, limit: u64) -> Self {
        self.map(|q| q.limit(limit))
    }

    pub fn offset(self, offset: u64) -> Self {
        self.map(|q| q.offset(offset))
    }

    pub fn get(self, connection: &mut Connection) -> Result<Vec<M>> {
        let rows = self.query.get(connection)?;
        Ok(rows
            .into_iter()
            .map(|row| M::from_record(Record::from_row(row)))
            .collect())
    }

    pub fn first(self, connection: &mut Connection) -> Result<Option<M>> {
        let row = self.query.first(connection)?;
        Ok(row.map(|row| M::from_record(Record::from_row(row))))
    }

    pub fn find(self, connection: &mut Connection, id: impl Into<Value>) -> Result<Option<M>> {
        self.and_where(M::PRIMARY_KEY, Op::Eq, id).first(connection)
    }

    pub fn count(self, connection: &mut Connection) -> Result<u64> {
        self.query.count(connection)
    }

    pub fn exists(self, connection: &mut Connection) -> Result<bool> {
        self.query.exists(connection)
    }

    pub fn pluck(self, connection: &mut Connection, column: &str) -> Result<Vec<Value>> {
        self.query.pluck(connection, column)
    }

    pub fn value(self, connection: &mut Connection, column: &str) -> Result<Option<Value>> {
        self.query.value(connection, column)
    }
}

impl<M: Model> Default for ModelQuery<M> {
    fn default() -> Self {
        Self::new()
    }
}
