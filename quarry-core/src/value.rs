use rust_decimal::Decimal;
use time::{Date, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Dynamically typed value moved between Rust code and the database.
///
/// Every variant except [`Value::Null`] wraps an `Option` so a column can carry
/// its type even when the data is missing. `Value::Varchar(None)` is a NULL that
/// still remembers it belongs to a text column, which keeps decoding and SQL
/// generation deterministic.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt8(Option<u8>),
    UInt16(Option<u16>),
    UInt32(Option<u32>),
    UInt64(Option<u64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>, /* prec: */ u8, /* scale: */ u8),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    Uuid(Option<Uuid>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int8(l), Self::Int8(r)) => l == r,
            (Self::Int16(l), Self::Int16(r)) => l == r,
            (Self::Int32(l), Self::Int32(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::UInt8(l), Self::UInt8(r)) => l == r,
            (Self::UInt16(l), Self::UInt16(r)) => l == r,
            (Self::UInt32(l), Self::UInt32(r)) => l == r,
            (Self::UInt64(l), Self::UInt64(r)) => l == r,
            (Self::Float32(l), Self::Float32(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Decimal(l, l_prec, l_scale), Self::Decimal(r, r_prec, r_scale)) => {
                l == r && l_prec == r_prec && l_scale == r_scale
            }
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Time(l), Self::Time(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::Uuid(l), Self::Uuid(r)) => l == r,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl Value {
    pub fn same_type(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Decimal(.., l_prec, l_scale), Self::Decimal(.., r_prec, r_scale)) => {
                l_prec == r_prec && l_scale == r_scale
            }
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Value::Null
            | Value::Boolean(None)
            | Value::Int8(None)
            | Value::Int16(None)
            | Value::Int32(None)
            | Value::Int64(None)
            | Value::UInt8(None)
            | Value::UInt16(None)
            | Value::UInt32(None)
            | Value::UInt64(None)
            | Value::Float32(None)
            | Value::Float64(None)
            | Value::Decimal(None, ..)
            | Value::Varchar(None)
            | Value::Blob(None)
            | Value::Date(None)
            | Value::Time(None)
            | Value::Timestamp(None)
            | Value::Uuid(None) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_typed_null_payload() {
        assert_eq!(Value::Int32(None), Value::Int32(None));
        assert_ne!(Value::Int32(None), Value::Int64(None));
        assert_ne!(Value::Int32(Some(1)), Value::Int32(Some(2)));
        assert_eq!(Value::Varchar(Some("a".into())), Value::Varchar(Some("a".into())));
    }

    #[test]
    fn null_detection_covers_typed_variants() {
        assert!(Value::Null.is_null());
        assert!(Value::Varchar(None).is_null());
        assert!(Value::Decimal(None, 10, 2).is_null());
        assert!(!Value::Boolean(Some(false)).is_null());
    }

    #[test]
    fn same_type_compares_decimal_shape() {
        assert!(Value::Decimal(None, 10, 2).same_type(&Value::Decimal(None, 10, 2)));
        assert!(!Value::Decimal(None, 10, 2).same_type(&Value::Decimal(None, 12, 2)));
        assert!(Value::Int8(None).same_type(&Value::Int8(Some(1))));
    }
}
