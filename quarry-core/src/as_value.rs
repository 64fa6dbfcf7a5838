use crate::{Error, Result, Value, truncate_long};
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use std::any;
use time::{Date, PrimitiveDateTime, Time, format_description::BorrowedFormatItem, macros::format_description};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`]
/// representation that backs query parameters and row decoding.
///
/// `try_from_value` accepts the canonical variant for the type, every other
/// numeric width after a range check, and falls back to parsing
/// `Value::Varchar` payloads. The text fallback matters in practice because
/// some backends hand back numbers and timestamps as text.
///
/// # Examples
/// ```rust
/// use quarry_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42))));
/// let n: i32 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// Return an "empty" (NULL-like) value variant for this type, used to
    /// represent absent optional data without losing the column type.
    fn as_empty_value() -> Value;
    /// Convert this value into its owned [`Value`] representation.
    fn as_value(self) -> Value;
    /// Attempt to convert a dynamic [`Value`] into `Self`. Range checks always
    /// happen before a numeric conversion is returned.
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
    /// Parse a full string into `Self`. The whole input must be consumed,
    /// which guards against accidentally accepting things like `123abc`.
    fn parse(input: &str) -> Result<Self>
    where
        Self: Sized,
    {
        Err(Error::decode(format!(
            "cannot parse `{}` as {}",
            truncate_long!(input),
            any::type_name::<Self>()
        )))
    }
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}

fn mismatch<T>(value: &Value) -> Error {
    Error::decode(format!(
        "cannot convert {value:?} to {}",
        any::type_name::<T>()
    ))
}

macro_rules! impl_as_value_int {
    ($source:ty, $variant:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $variant(None)
            }
            fn as_value(self) -> Value {
                $variant(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                macro_rules! narrowed {
                    ($v:expr, $width:literal) => {{
                        let v = $v;
                        if (v as i128).clamp(<$source>::MIN as i128, <$source>::MAX as i128)
                            != v as i128
                        {
                            return Err(Error::decode(format!(
                                "value {v}: {} is out of range for {}",
                                $width,
                                any::type_name::<Self>(),
                            )));
                        }
                        Ok(v as $source)
                    }};
                }
                match value {
                    $variant(Some(v)) => Ok(v),
                    #[allow(unreachable_patterns)]
                    Value::Int8(Some(v)) => narrowed!(v, "i8"),
                    #[allow(unreachable_patterns)]
                    Value::Int16(Some(v)) => narrowed!(v, "i16"),
                    #[allow(unreachable_patterns)]
                    Value::Int32(Some(v)) => narrowed!(v, "i32"),
                    #[allow(unreachable_patterns)]
                    Value::Int64(Some(v)) => narrowed!(v, "i64"),
                    #[allow(unreachable_patterns)]
                    Value::UInt8(Some(v)) => narrowed!(v, "u8"),
                    #[allow(unreachable_patterns)]
                    Value::UInt16(Some(v)) => narrowed!(v, "u16"),
                    #[allow(unreachable_patterns)]
                    Value::UInt32(Some(v)) => narrowed!(v, "u32"),
                    #[allow(unreachable_patterns)]
                    Value::UInt64(Some(v)) => narrowed!(v, "u64"),
                    Value::Varchar(Some(v)) => Self::parse(&v),
                    other => Err(mismatch::<Self>(&other)),
                }
            }
            fn parse(input: &str) -> Result<Self> {
                atoi::atoi::<$source>(input.trim().as_bytes()).ok_or_else(|| {
                    Error::decode(format!(
                        "cannot parse `{}` as {}",
                        truncate_long!(input),
                        any::type_name::<Self>(),
                    ))
                })
            }
        }
    };
}

impl_as_value_int!(i8, Value::Int8);
impl_as_value_int!(i16, Value::Int16);
impl_as_value_int!(i32, Value::Int32);
impl_as_value_int!(i64, Value::Int64);
impl_as_value_int!(u8, Value::UInt8);
impl_as_value_int!(u16, Value::UInt16);
impl_as_value_int!(u32, Value::UInt32);
impl_as_value_int!(u64, Value::UInt64);

macro_rules! impl_as_value_float {
    ($source:ty, $variant:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $variant(None)
            }
            fn as_value(self) -> Value {
                $variant(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $variant(Some(v)) => Ok(v),
                    #[allow(unreachable_patterns)]
                    Value::Float32(Some(v)) => Ok(v as $source),
                    #[allow(unreachable_patterns)]
                    Value::Float64(Some(v)) => Ok(v as $source),
                    Value::Int8(Some(v)) => Ok(v as $source),
                    Value::Int16(Some(v)) => Ok(v as $source),
                    Value::Int32(Some(v)) => Ok(v as $source),
                    Value::Int64(Some(v)) => Ok(v as $source),
                    Value::UInt8(Some(v)) => Ok(v as $source),
                    Value::UInt16(Some(v)) => Ok(v as $source),
                    Value::UInt32(Some(v)) => Ok(v as $source),
                    Value::UInt64(Some(v)) => Ok(v as $source),
                    Value::Decimal(Some(v), ..) => v.to_f64().map(|v| v as $source).ok_or_else(
                        || Error::decode(format!("decimal {v} does not fit a {}", stringify!($source))),
                    ),
                    Value::Varchar(Some(v)) => Self::parse(&v),
                    other => Err(mismatch::<Self>(&other)),
                }
            }
            fn parse(input: &str) -> Result<Self> {
                fast_float::parse(input.trim()).map_err(|_| {
                    Error::decode(format!(
                        "cannot parse `{}` as {}",
                        truncate_long!(input),
                        any::type_name::<Self>(),
                    ))
                })
            }
        }
    };
}

impl_as_value_float!(f32, Value::Float32);
impl_as_value_float!(f64, Value::Float64);

impl AsValue for bool {
    fn as_empty_value() -> Value {
        Value::Boolean(None)
    }
    fn as_value(self) -> Value {
        Value::Boolean(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(Some(v)) => Ok(v),
            Value::Int8(Some(v)) => Ok(v != 0),
            Value::Int16(Some(v)) => Ok(v != 0),
            Value::Int32(Some(v)) => Ok(v != 0),
            Value::Int64(Some(v)) => Ok(v != 0),
            Value::UInt8(Some(v)) => Ok(v != 0),
            Value::UInt16(Some(v)) => Ok(v != 0),
            Value::UInt32(Some(v)) => Ok(v != 0),
            Value::UInt64(Some(v)) => Ok(v != 0),
            Value::Varchar(Some(v)) => Self::parse(&v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
    fn parse(input: &str) -> Result<Self> {
        match input.trim() {
            "true" | "TRUE" | "1" => Ok(true),
            "false" | "FALSE" | "0" => Ok(false),
            _ => Err(Error::decode(format!(
                "cannot parse `{}` as bool",
                truncate_long!(input)
            ))),
        }
    }
}

impl AsValue for String {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(Some(v)) => Ok(v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
    fn parse(input: &str) -> Result<Self> {
        Ok(input.to_string())
    }
}

impl AsValue for Decimal {
    fn as_empty_value() -> Value {
        Value::Decimal(None, 0, 0)
    }
    fn as_value(self) -> Value {
        Value::Decimal(Some(self), 0, 0)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(Some(v), ..) => Ok(v),
            Value::Int8(Some(v)) => Ok(v.into()),
            Value::Int16(Some(v)) => Ok(v.into()),
            Value::Int32(Some(v)) => Ok(v.into()),
            Value::Int64(Some(v)) => Ok(v.into()),
            Value::UInt8(Some(v)) => Ok(v.into()),
            Value::UInt16(Some(v)) => Ok(v.into()),
            Value::UInt32(Some(v)) => Ok(v.into()),
            Value::UInt64(Some(v)) => Ok(v.into()),
            Value::Float32(Some(v)) => Decimal::from_f32(v)
                .ok_or_else(|| Error::decode(format!("float {v} does not fit a decimal"))),
            Value::Float64(Some(v)) => Decimal::from_f64(v)
                .ok_or_else(|| Error::decode(format!("float {v} does not fit a decimal"))),
            Value::Varchar(Some(v)) => Self::parse(&v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
    fn parse(input: &str) -> Result<Self> {
        Decimal::from_str_exact(input.trim()).map_err(|e| {
            Error::decode(format!(
                "cannot parse `{}` as decimal: {e}",
                truncate_long!(input)
            ))
        })
    }
}

impl AsValue for Box<[u8]> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v),
            Value::Varchar(Some(v)) => Ok(v.into_bytes().into()),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl AsValue for Vec<u8> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(<Box<[u8]>>::try_from_value(value)?.into_vec())
    }
}

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[hour]:[minute]:[second].[subsecond]"),
    format_description!("[hour]:[minute]:[second]"),
];
const TIMESTAMP_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
];

impl AsValue for Date {
    fn as_empty_value() -> Value {
        Value::Date(None)
    }
    fn as_value(self) -> Value {
        Value::Date(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Date(Some(v)) => Ok(v),
            Value::Timestamp(Some(v)) => Ok(v.date()),
            Value::Varchar(Some(v)) => <Self as AsValue>::parse(&v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
    fn parse(input: &str) -> Result<Self> {
        Date::parse(input.trim(), DATE_FORMAT).map_err(|e| {
            Error::decode(format!(
                "cannot parse `{}` as date: {e}",
                truncate_long!(input)
            ))
        })
    }
}

impl AsValue for Time {
    fn as_empty_value() -> Value {
        Value::Time(None)
    }
    fn as_value(self) -> Value {
        Value::Time(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Time(Some(v)) => Ok(v),
            Value::Timestamp(Some(v)) => Ok(v.time()),
            Value::Varchar(Some(v)) => <Self as AsValue>::parse(&v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
    fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        for format in TIME_FORMATS {
            if let Ok(v) = Time::parse(input, *format) {
                return Ok(v);
            }
        }
        Err(Error::decode(format!(
            "cannot parse `{}` as time",
            truncate_long!(input)
        )))
    }
}

impl AsValue for PrimitiveDateTime {
    fn as_empty_value() -> Value {
        Value::Timestamp(None)
    }
    fn as_value(self) -> Value {
        Value::Timestamp(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Timestamp(Some(v)) => Ok(v),
            Value::Date(Some(v)) => Ok(PrimitiveDateTime::new(v, Time::MIDNIGHT)),
            Value::Varchar(Some(v)) => <Self as AsValue>::parse(&v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
    fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        for format in TIMESTAMP_FORMATS {
            if let Ok(v) = PrimitiveDateTime::parse(input, *format) {
                return Ok(v);
            }
        }
        if let Ok(date) = Date::parse(input, DATE_FORMAT) {
            return Ok(PrimitiveDateTime::new(date, Time::MIDNIGHT));
        }
        Err(Error::decode(format!(
            "cannot parse `{}` as timestamp",
            truncate_long!(input)
        )))
    }
}

impl AsValue for Uuid {
    fn as_empty_value() -> Value {
        Value::Uuid(None)
    }
    fn as_value(self) -> Value {
        Value::Uuid(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Uuid(Some(v)) => Ok(v),
            Value::Varchar(Some(v)) => Self::parse(&v),
            Value::Blob(Some(v)) => Uuid::from_slice(&v).map_err(|e| {
                Error::decode(format!("cannot read a uuid out of {} bytes: {e}", v.len()))
            }),
            other => Err(mismatch::<Self>(&other)),
        }
    }
    fn parse(input: &str) -> Result<Self> {
        Uuid::parse_str(input.trim()).map_err(|e| {
            Error::decode(format!(
                "cannot parse `{}` as uuid: {e}",
                truncate_long!(input)
            ))
        })
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::try_from_value(value).map(Some)
    }
    fn parse(input: &str) -> Result<Self> {
        T::parse(input).map(Some)
    }
}

impl<T: AsValue> AsValue for Box<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        (*self).as_value()
    }
    fn try_from_value(value: Value) -> Result<Self> {
        T::try_from_value(value).map(Box::new)
    }
    fn parse(input: &str) -> Result<Self> {
        T::parse(input).map(Box::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime, time};

    #[test]
    fn integers_narrow_with_range_checks() {
        let n: i8 = AsValue::try_from_value(Value::Int64(Some(127))).expect("Failed to narrow");
        assert_eq!(n, 127);
        assert!(<i8 as AsValue>::try_from_value(Value::Int64(Some(128))).is_err());
        let n: u32 = AsValue::try_from_value(Value::Int8(Some(3))).expect("Failed to widen");
        assert_eq!(n, 3);
        assert!(<u32 as AsValue>::try_from_value(Value::Int8(Some(-3))).is_err());
    }

    #[test]
    fn text_payloads_are_parsed() {
        let n: i64 = AsValue::try_from_value(Value::Varchar(Some("1234".into())))
            .expect("Failed to parse an integer out of text");
        assert_eq!(n, 1234);
        let f: f64 = AsValue::try_from_value(Value::Varchar(Some("2.5".into())))
            .expect("Failed to parse a float out of text");
        assert_eq!(f, 2.5);
        assert!(<i64 as AsValue>::try_from_value(Value::Varchar(Some("12ab".into()))).is_err());
    }

    #[test]
    fn temporal_text_follows_common_layouts() {
        let d: Date = AsValue::try_from_value(Value::Varchar(Some("2024-02-29".into())))
            .expect("Failed to parse a date");
        assert_eq!(d, date!(2024 - 02 - 29));
        let ts: PrimitiveDateTime =
            AsValue::try_from_value(Value::Varchar(Some("2024-02-29 13:30:00".into())))
                .expect("Failed to parse a timestamp");
        assert_eq!(ts, datetime!(2024-02-29 13:30:00));
        let ts: PrimitiveDateTime =
            AsValue::try_from_value(Value::Varchar(Some("2024-02-29T13:30:00.250".into())))
                .expect("Failed to parse an iso timestamp");
        assert_eq!(ts.time(), time!(13:30:00.250));
    }

    #[test]
    fn option_maps_typed_nulls() {
        let v: Option<i32> = AsValue::try_from_value(Value::Int32(None)).expect("Failed to decode");
        assert_eq!(v, None);
        let v: Option<i32> =
            AsValue::try_from_value(Value::Int32(Some(5))).expect("Failed to decode");
        assert_eq!(v, Some(5));
        assert_eq!(None::<i32>.as_value(), Value::Int32(None));
    }
}
