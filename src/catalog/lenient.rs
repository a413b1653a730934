//! Tolerant column decoding.
//!
//! SQL dumps are executed as written, and SQLite keeps a value like `'N/A'`
//! as TEXT even in a REAL or INTEGER column. These wrappers accept whatever
//! storage class a cell actually holds and map anything that is not a usable
//! number to `None`, so one odd row never fails a whole page.

use sqlx::error::BoxDynError;
use sqlx::sqlite::{Sqlite, SqliteTypeInfo, SqliteValueRef};
use sqlx::{Decode, Type, TypeInfo, ValueRef};

/// Integers exported through float columns arrive as `1999.0`.
pub fn parse_int(raw: &str) -> Option<i64> {
    let t = raw.trim();
    if t.is_empty() {
        return None;
    }
    t.parse::<i64>().ok().or_else(|| parse_float(t).and_then(whole))
}

pub fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

fn whole(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
}

/// Storage class of the cell, not the declared column type.
fn storage_class(value: &SqliteValueRef<'_>) -> String {
    if value.is_null() {
        return "NULL".to_string();
    }
    value.type_info().name().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LenientInt(pub Option<i64>);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LenientReal(pub Option<f64>);

#[derive(Debug, Clone, PartialEq)]
pub struct LenientText(pub Option<String>);

impl Type<Sqlite> for LenientInt {
    fn type_info() -> SqliteTypeInfo {
        <i64 as Type<Sqlite>>::type_info()
    }

    fn compatible(_ty: &SqliteTypeInfo) -> bool {
        true
    }
}

impl<'r> Decode<'r, Sqlite> for LenientInt {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        let parsed = match storage_class(&value).as_str() {
            "INTEGER" => Some(<i64 as Decode<Sqlite>>::decode(value)?),
            "REAL" => whole(<f64 as Decode<Sqlite>>::decode(value)?),
            "TEXT" => parse_int(<&str as Decode<Sqlite>>::decode(value)?),
            _ => None,
        };
        Ok(Self(parsed))
    }
}

impl From<LenientInt> for Option<i64> {
    fn from(v: LenientInt) -> Self {
        v.0
    }
}

impl Type<Sqlite> for LenientReal {
    fn type_info() -> SqliteTypeInfo {
        <f64 as Type<Sqlite>>::type_info()
    }

    fn compatible(_ty: &SqliteTypeInfo) -> bool {
        true
    }
}

impl<'r> Decode<'r, Sqlite> for LenientReal {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        let parsed = match storage_class(&value).as_str() {
            "INTEGER" => Some(<i64 as Decode<Sqlite>>::decode(value)? as f64),
            "REAL" => Some(<f64 as Decode<Sqlite>>::decode(value)?).filter(|f| f.is_finite()),
            "TEXT" => parse_float(<&str as Decode<Sqlite>>::decode(value)?),
            _ => None,
        };
        Ok(Self(parsed))
    }
}

impl From<LenientReal> for Option<f64> {
    fn from(v: LenientReal) -> Self {
        v.0
    }
}

impl Type<Sqlite> for LenientText {
    fn type_info() -> SqliteTypeInfo {
        <String as Type<Sqlite>>::type_info()
    }

    fn compatible(_ty: &SqliteTypeInfo) -> bool {
        true
    }
}

impl<'r> Decode<'r, Sqlite> for LenientText {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        let text = match storage_class(&value).as_str() {
            "TEXT" => Some(<String as Decode<Sqlite>>::decode(value)?),
            "INTEGER" => Some(<i64 as Decode<Sqlite>>::decode(value)?.to_string()),
            "REAL" => Some(<f64 as Decode<Sqlite>>::decode(value)?.to_string()),
            _ => None,
        };
        Ok(Self(text))
    }
}

impl From<LenientText> for Option<String> {
    fn from(v: LenientText) -> Self {
        v.0
    }
}
