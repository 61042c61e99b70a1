//! Pure text→typed-value coercion.
//!
//! Rule values arrive as text (comma-separated for multi-value operators)
//! and are coerced to the target field's declared type before any operator
//! logic runs. Coercion failures are configuration errors at the caller;
//! this module only answers "does this text parse as that type".

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use dunner_core::{FieldType, FieldValue};

/// Split a comma-separated value list, trimming each token.
///
/// Tokens are kept verbatim after the trim — an empty token is passed
/// through so the caller's arity checks and coercion diagnostics see it.
pub fn split_csv(raw: &str) -> Vec<&str> {
    raw.split(',').map(str::trim).collect()
}

/// Coerce one trimmed token to the given type. `None` means the token does
/// not parse as that type.
pub fn coerce(raw: &str, ty: FieldType) -> Option<FieldValue> {
    match ty {
        FieldType::String => Some(FieldValue::Str(raw.to_string())),
        FieldType::Integer | FieldType::Long => raw.parse::<i64>().ok().map(FieldValue::Int),
        FieldType::Double | FieldType::Decimal => raw.parse::<f64>().ok().map(FieldValue::Float),
        FieldType::Boolean => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" => Some(FieldValue::Bool(true)),
            "false" | "0" => Some(FieldValue::Bool(false)),
            _ => None,
        },
        FieldType::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .map(FieldValue::Date),
        FieldType::DateTime => parse_datetime(raw).map(FieldValue::DateTime),
    }
}

/// RFC 3339 first; a bare "YYYY-MM-DD HH:MM:SS" is read as UTC.
fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_tokens_are_trimmed() {
        assert_eq!(split_csv(" MH, KA "), vec!["MH", "KA"]);
        assert_eq!(split_csv("30,60"), vec!["30", "60"]);
        assert_eq!(split_csv("a,,b"), vec!["a", "", "b"]);
    }

    #[test]
    fn integer_coercion() {
        assert_eq!(coerce("45", FieldType::Integer), Some(FieldValue::Int(45)));
        assert_eq!(coerce("-3", FieldType::Long), Some(FieldValue::Int(-3)));
        assert_eq!(coerce("4.5", FieldType::Integer), None);
        assert_eq!(coerce("abc", FieldType::Integer), None);
        assert_eq!(coerce("", FieldType::Integer), None);
    }

    #[test]
    fn decimal_coercion() {
        assert_eq!(
            coerce("125000.50", FieldType::Decimal),
            Some(FieldValue::Float(125000.50))
        );
        assert_eq!(coerce("1e3", FieldType::Double), Some(FieldValue::Float(1000.0)));
        assert_eq!(coerce("x", FieldType::Decimal), None);
    }

    #[test]
    fn boolean_coercion() {
        assert_eq!(coerce("TRUE", FieldType::Boolean), Some(FieldValue::Bool(true)));
        assert_eq!(coerce("0", FieldType::Boolean), Some(FieldValue::Bool(false)));
        assert_eq!(coerce("yes", FieldType::Boolean), None);
    }

    #[test]
    fn date_coercion() {
        assert_eq!(
            coerce("2026-07-15", FieldType::Date),
            Some(FieldValue::Date(NaiveDate::from_ymd_opt(2026, 7, 15).unwrap()))
        );
        assert_eq!(coerce("15/07/2026", FieldType::Date), None);
    }

    #[test]
    fn datetime_coercion_accepts_rfc3339_and_naive_utc() {
        let a = coerce("2026-07-15T09:30:00Z", FieldType::DateTime);
        let b = coerce("2026-07-15 09:30:00", FieldType::DateTime);
        assert_eq!(a, b);
        assert!(a.is_some());
    }
}
