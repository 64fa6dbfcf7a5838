use crate::{Connection, Error, Model, ModelQuery, Op, Query, Record, Result, Value};
use std::{
    collections::{HashMap, HashSet},
    marker::PhantomData,
};
use uuid::Uuid;

/// Alias under which a through query exposes the owner key of its
/// intermediate table.
pub const THROUGH_KEY: &str = "quarry_through_key";

/// Normalized bucketing key for eager loading. Signed and unsigned integers
/// holding the same number collapse to the same key, so both sides of a
/// relation match regardless of how the backend typed them.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum HashKey {
    Int(i64),
    UInt(u64),
    Str(String),
    Uuid(Uuid),
    Bytes(Vec<u8>),
}

impl HashKey {
    /// `None` for null values. Types without a stable equality, floats and
    /// decimals mostly, cannot key a relation.
    pub fn try_from_value(value: &Value) -> Result<Option<Self>> {
        Ok(Some(match value {
            v if v.is_null() => return Ok(None),
            Value::Int8(Some(v)) => Self::Int(*v as i64),
            Value::Int16(Some(v)) => Self::Int(*v as i64),
            Value::Int32(Some(v)) => Self::Int(*v as i64),
            Value::Int64(Some(v)) => Self::Int(*v),
            Value::UInt8(Some(v)) => Self::Int(*v as i64),
            Value::UInt16(Some(v)) => Self::Int(*v as i64),
            Value::UInt32(Some(v)) => Self::Int(*v as i64),
            Value::UInt64(Some(v)) => match i64::try_from(*v) {
                Ok(v) => Self::Int(v),
                Err(_) => Self::UInt(*v),
            },
            Value::Varchar(Some(v)) => Self::Str(v.clone()),
            Value::Uuid(Some(v)) => Self::Uuid(*v),
            Value::Blob(Some(v)) => Self::Bytes(v.to_vec()),
            other => {
                return Err(Error::decode(format!(
                    "{:?} cannot act as a relation key",
                    other,
                )));
            }
        }))
    }
}

/// One association between two models.
///
/// `fetch` loads the related side for a single owner. `eager` serves a whole
/// batch with one IN query and returns results aligned with the input slice,
/// so loading N owners and their relation costs two queries total.
pub trait Relation {
    type Owner: Model;
    type Output;

    fn fetch(&self, connection: &mut Connection, owner: &Self::Owner) -> Result<Self::Output>;

    fn eager(
        &self,
        connection: &mut Connection,
        owners: &[Self::Owner],
    ) -> Result<Vec<Self::Output>>;
}

/// Per-owner bucketing keys plus the distinct binding values, in first-seen
/// order.
fn keys_of<O: Model>(owners: &[O], attribute: &str) -> Result<(Vec<Option<HashKey>>, Vec<Value>)> {
    let mut keys = Vec::with_capacity(owners.len());
    let mut seen = HashSet::new();
    let mut uniques = Vec::new();
    for owner in owners {
        let value = owner.get(attribute);
        let key = HashKey::try_from_value(&value)?;
        if let Some(key) = &key {
            if seen.insert(key.clone()) {
                uniques.push(value);
            }
        }
        keys.push(key);
    }
    Ok((keys, uniques))
}

/// The owner holds the foreign key, `user.country_id` pointing at
/// `countries.id`.
pub struct BelongsTo<O: Model, R: Model> {
    foreign_key: String,
    owner_key: String,
    marker: PhantomData<fn() -> (O, R)>,
}

impl<O: Model, R: Model> BelongsTo<O, R> {
    pub fn new(foreign_key: impl Into<String>, owner_key: impl Into<String>) -> Self {
        Self {
            foreign_key: foreign_key.into(),
            owner_key: owner_key.into(),
            marker: PhantomData,
        }
    }

    /// Points the owner's foreign key at `related`. In-memory only, the
    /// owner still has to be saved.
    pub fn associate(&self, owner: &mut O, related: &R) {
        owner.set(self.foreign_key.clone(), related.get(&self.owner_key));
    }

    /// Clears the owner's foreign key. In-memory only.
    pub fn dissociate(&self, owner: &mut O) {
        owner.set(self.foreign_key.clone(), Value::Null);
    }
}

impl<O: Model, R: Model + Clone> Relation for BelongsTo<O, R> {
    type Owner = O;
    type Output = Option<R>;

    fn fetch(&self, connection: &mut Connection, owner: &O) -> Result<Option<R>> {
        let value = owner.get(&self.foreign_key);
        if value.is_null() {
            return Ok(None);
        }
        ModelQuery::<R>::new()
            .and_where(self.owner_key.as_str(), Op::Eq, value)
            .first(connection)
    }

    fn eager(&self, connection: &mut Connection, owners: &[O]) -> Result<Vec<Option<R>>> {
        let (keys, uniques) = keys_of(owners, &self.foreign_key)?;
        if uniques.is_empty() {
            return Ok(owners.iter().map(|_| None).collect());
        }
        let related = ModelQuery::<R>::new()
            .where_in(self.owner_key.as_str(), uniques)
            .get(connection)?;
        let mut buckets = HashMap::with_capacity(related.len());
        for model in related {
            if let Some(key) = HashKey::try_from_value(&model.get(&self.owner_key))? {
                buckets.entry(key).or_insert(model);
            }
        }
        Ok(keys
            .into_iter()
            .map(|key| key.and_then(|key| buckets.get(&key).cloned()))
            .collect())
    }
}

/// The related table holds the foreign key and at most one row matches,
/// `profiles.user_id` pointing back at `users.id`.
pub struct HasOne<O: Model, R: Model> {
    foreign_key: String,
    local_key: String,
    marker: PhantomData<fn() -> (O, R)>,
}

impl<O: Model, R: Model> HasOne<O, R> {
    pub fn new(foreign_key: impl Into<String>, local_key: impl Into<String>) -> Self {
        Self {
            foreign_key: foreign_key.into(),
            local_key: local_key.into(),
            marker: PhantomData,
        }
    }
}

impl<O: Model, R: Model + Clone> Relation for HasOne<O, R> {
    type Owner = O;
    type Output = Option<R>;

    fn fetch(&self, connection: &mut Connection, owner: &O) -> Result<Option<R>> {
        let value = owner.get(&self.local_key);
        if value.is_null() {
            return Ok(None);
        }
        ModelQuery::<R>::new()
            .and_where(self.foreign_key.as_str(), Op::Eq, value)
            .first(connection)
    }

    fn eager(&self, connection: &mut Connection, owners: &[O]) -> Result<Vec<Option<R>>> {
        let (keys, uniques) = keys_of(owners, &self.local_key)?;
        if uniques.is_empty() {
            return Ok(owners.iter().map(|_| None).collect());
        }
        let related = ModelQuery::<R>::new()
            .where_in(self.foreign_key.as_str(), uniques)
            .get(connection)?;
        let mut buckets = HashMap::with_capacity(related.len());
        for model in related {
            if let Some(key) = HashKey::try_from_value(&model.get(&self.foreign_key))? {
                // The first matching row wins, like a LIMIT 1 per owner would.
                buckets.entry(key).or_insert(model);
            }
        }
        Ok(keys
            .into_iter()
            .map(|key| key.and_then(|key| buckets.get(&key).cloned()))
            .collect())
    }
}

/// The related table holds the foreign key and any number of rows match,
/// `posts.user_id` pointing back at `users.id`.
pub struct HasMany<O: Model, R: Model> {
    foreign_key: String,
    local_key: String,
    marker: PhantomData<fn() -> (O, R)>,
}

impl<O: Model, R: Model> HasMany<O, R> {
    pub fn new(foreign_key: impl Into<String>, local_key: impl Into<String>) -> Self {
        Self {
            foreign_key: foreign_key.into(),
            local_key: local_key.into(),
            marker: PhantomData,
        }
    }
}

impl<O: Model, R: Model + Clone> Relation for HasMany<O, R> {
    type Owner = O;
    type Output = Vec<R>;

    fn fetch(&self, connection: &mut Connection, owner: &O) -> Result<Vec<R>> {
        let value = owner.get(&self.local_key);
        if value.is_null() {
            return Ok(Vec::new());
        }
        ModelQuery::<R>::new()
            .and_where(self.foreign_key.as_str(), Op::Eq, value)
            .get(connection)
    }

    fn eager(&self, connection: &mut Connection, owners: &[O]) -> Result<Vec<Vec<R>>> {
        let (keys, uniques) = keys_of(owners, &self.local_key)?;
        if uniques.is_empty() {
            return Ok(owners.iter().map(|_| Vec::new()).collect());
        }
        let related = ModelQuery::<R>::new()
            .where_in(self.foreign_key.as_str(), uniques)
            .get(connection)?;
        let mut buckets: HashMap<HashKey, Vec<R>> = HashMap::new();
        for model in related {
            if let Some(key) = HashKey::try_from_value(&model.get(&self.foreign_key))? {
                buckets.entry(key).or_default().push(model);
            }
        }
        Ok(keys
            .into_iter()
            .map(|key| {
                key.and_then(|key| buckets.get(&key).cloned())
                    .unwrap_or_default()
            })
            .collect())
    }
}

/// One related row reached across an intermediate table. With owners,
/// intermediate cars and related insurances: `cars.owner_id` is `first_key`,
/// `insurances.car_id` is `second_key`.
pub struct HasOneThrough<O: Model, T: Model, R: Model> {
    first_key: String,
    second_key: String,
    local_key: String,
    second_local_key: String,
    marker: PhantomData<fn() -> (O, T, R)>,
}

impl<O: Model, T: Model, R: Model> HasOneThrough<O, T, R> {
    pub fn new(
        first_key: impl Into<String>,
        second_key: impl Into<String>,
        local_key: impl Into<String>,
        second_local_key: impl Into<String>,
    ) -> Self {
        Self {
            first_key: first_key.into(),
            second_key: second_key.into(),
            local_key: local_key.into(),
            second_local_key: second_local_key.into(),
            marker: PhantomData,
        }
    }

    /// Related rows joined onto the intermediate table, without the owner
    /// constraint yet.
    fn joined(&self) -> Query {
        Query::table(R::TABLE).join(
            T::TABLE,
            format!("{}.{}", T::TABLE, self.second_local_key),
            Op::Eq,
            format!("{}.{}", R::TABLE, self.second_key),
        )
    }

    fn owner_column(&self) -> String {
        format!("{}.{}", T::TABLE, self.first_key)
    }
}

impl<O: Model, T: Model, R: Model + Clone> Relation for HasOneThrough<O, T, R> {
    type Owner = O;
    type Output = Option<R>;

    fn fetch(&self, connection: &mut Connection, owner: &O) -> Result<Option<R>> {
        let value = owner.get(&self.local_key);
        if value.is_null() {
            return Ok(None);
        }
        let row = self
            .joined()
            .select([format!("{}.*", R::TABLE)])
            .and_where(self.owner_column(), Op::Eq, value)
            .first(connection)?;
        Ok(row.map(|row| R::from_record(Record::from_row(row))))
    }

    fn eager(&self, connection: &mut Connection, owners: &[O]) -> Result<Vec<Option<R>>> {
        let (keys, uniques) = keys_of(owners, &self.local_key)?;
        if uniques.is_empty() {
            return Ok(owners.iter().map(|_| None).collect());
        }
        let rows = self
            .joined()
            .select([
                format!("{}.*", R::TABLE),
                format!("{} as {}", self.owner_column(), THROUGH_KEY),
            ])
            .where_in(self.owner_column(), uniques)
            .get(connection)?;
        let mut buckets = HashMap::new();
        for row in rows {
            let mut record = Record::from_row(row);
            let through = record.attributes.remove(THROUGH_KEY).unwrap_or(Value::Null);
            record.original.remove(THROUGH_KEY);
            if let Some(key) = HashKey::try_from_value(&through)? {
                buckets.entry(key).or_insert_with(|| R::from_record(record));
            }
        }
        Ok(keys
            .into_iter()
            .map(|key| key.and_then(|key| buckets.get(&key).cloned()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_keys_collapse_across_signedness() {
        let signed = HashKey::try_from_value(&Value::Int64(Some(42)))
            .expect("Failed to key a signed integer")
            .expect("42 is not null");
        let unsigned = HashKey::try_from_value(&Value::UInt32(Some(42)))
            .expect("Failed to key an unsigned integer")
            .expect("42 is not null");
        assert_eq!(signed, unsigned);
    }

    #[test]
    fn null_and_float_keys() {
        assert_eq!(
            HashKey::try_from_value(&Value::Varchar(None)).expect("Null must map to None"),
            None,
        );
        HashKey::try_from_value(&Value::Float64(Some(1.5)))
            .expect_err("Float keys must be rejected");
    }
}
