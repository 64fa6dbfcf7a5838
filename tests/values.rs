#[cfg(test)]
mod tests {
    use quarry::{GenericSqlWriter, SqlWriter, Value};
    use rust_decimal::Decimal;
    use time::macros::{date, datetime, time};
    use uuid::uuid;

    const WRITER: GenericSqlWriter = GenericSqlWriter::new();

    fn literal(value: Value) -> String {
        let mut out = String::new();
        WRITER.write_value(&mut out, &value);
        out
    }

    #[test]
    fn null_and_booleans() {
        assert_eq!(literal(Value::Null), "NULL");
        assert_eq!(literal(Value::Varchar(None)), "NULL");
        assert_eq!(literal(Value::Decimal(None, 10, 2)), "NULL");
        assert_eq!(literal(Value::Boolean(Some(true))), "TRUE");
        assert_eq!(literal(Value::Boolean(Some(false))), "FALSE");
    }

    #[test]
    fn integers_of_every_width() {
        assert_eq!(literal(Value::Int8(Some(-3))), "-3");
        assert_eq!(literal(Value::Int64(Some(i64::MIN))), "-9223372036854775808");
        assert_eq!(
            literal(Value::UInt64(Some(u64::MAX))),
            "18446744073709551615"
        );
    }

    #[test]
    fn floats_round_trip_through_the_shortest_form() {
        assert_eq!(literal(Value::Float64(Some(2.5))), "2.5");
        assert_eq!(literal(Value::Float32(Some(1.0))), "1.0");
        assert_eq!(literal(Value::Float64(Some(f64::NAN))), "NULL");
        assert_eq!(literal(Value::Float64(Some(f64::INFINITY))), "9e999");
        assert_eq!(literal(Value::Float64(Some(f64::NEG_INFINITY))), "-9e999");
    }

    #[test]
    fn decimals_keep_their_scale() {
        assert_eq!(literal(Value::Decimal(Some(Decimal::new(1050, 2)), 10, 2)), "10.50");
    }

    #[test]
    fn strings_double_their_quotes() {
        assert_eq!(literal(Value::from("plain")), "'plain'");
        assert_eq!(literal(Value::from("it's")), "'it''s'");
    }

    #[test]
    fn blobs_become_uppercase_hex() {
        assert_eq!(
            literal(Value::Blob(Some([0xDE, 0xAD, 0xBE, 0xEF].into()))),
            "X'DEADBEEF'"
        );
    }

    #[test]
    fn temporal_values_quote_iso_shapes() {
        assert_eq!(literal(Value::Date(Some(date!(2020 - 01 - 01)))), "'2020-01-01'");
        assert_eq!(literal(Value::Time(Some(time!(13:45:30)))), "'13:45:30'");
        assert_eq!(
            literal(Value::Time(Some(time!(08:30:00.123)))),
            "'08:30:00.123'"
        );
        assert_eq!(
            literal(Value::Time(Some(time!(23:59:59.5)))),
            "'23:59:59.5'"
        );
        assert_eq!(
            literal(Value::Timestamp(Some(datetime!(2020 - 05 - 17 10:00:30)))),
            "'2020-05-17 10:00:30'"
        );
    }

    #[test]
    fn uuids_print_hyphenated() {
        assert_eq!(
            literal(Value::Uuid(Some(uuid!("67e55044-10b1-426f-9247-bb680e5fe0c8")))),
            "'67e55044-10b1-426f-9247-bb680e5fe0c8'"
        );
    }
}
