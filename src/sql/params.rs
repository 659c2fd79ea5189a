//! Convert serde_json::Value to types that sqlx can bind.

use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::Database;

/// A value that can be bound to a PostgreSQL query. Converts from
/// serde_json::Value; queries cast the placeholder to the column type.
#[derive(Clone, Debug)]
pub enum PgBindValue {
    Null,
    Bool(bool),
    I64(i64),
    String(String),
    Uuid(uuid::Uuid),
}

impl PgBindValue {
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => PgBindValue::Null,
            Value::Bool(b) => PgBindValue::Bool(*b),
            Value::Number(n) => PgBindValue::I64(n.as_i64().unwrap_or(0)),
            Value::String(s) => {
                if let Ok(u) = uuid::Uuid::parse_str(s) {
                    PgBindValue::Uuid(u)
                } else {
                    PgBindValue::String(s.clone())
                }
            }
            // Shape validation rejects nested values before binding.
            Value::Array(_) | Value::Object(_) => PgBindValue::Null,
        }
    }
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            PgBindValue::Null => <Option<i32> as Encode<Postgres>>::encode_by_ref(&None, buf)?,
            PgBindValue::Bool(b) => {
                let s = if *b { "true" } else { "false" };
                <&str as Encode<Postgres>>::encode_by_ref(&s, buf)?
            }
            PgBindValue::I64(n) => {
                let s = n.to_string();
                <&str as Encode<Postgres>>::encode_by_ref(&s.as_str(), buf)?
            }
            PgBindValue::String(s) => {
                let s_ref: &str = s.as_str();
                <&str as Encode<Postgres>>::encode_by_ref(&s_ref, buf)?
            }
            PgBindValue::Uuid(u) => {
                let u_str = u.to_string();
                <&str as Encode<Postgres>>::encode_by_ref(&u_str.as_str(), buf)?
            }
        })
    }
}

impl sqlx::Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn numbers_bind_as_i64() {
        match PgBindValue::from_json(&json!(42)) {
            PgBindValue::I64(n) => assert_eq!(n, 42),
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn uuid_strings_are_detected() {
        let id = uuid::Uuid::new_v4();
        match PgBindValue::from_json(&json!(id.to_string())) {
            PgBindValue::Uuid(u) => assert_eq!(u, id),
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn plain_strings_stay_strings() {
        match PgBindValue::from_json(&json!("a@b.com")) {
            PgBindValue::String(s) => assert_eq!(s, "a@b.com"),
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn null_maps_to_null() {
        assert!(matches!(
            PgBindValue::from_json(&Value::Null),
            PgBindValue::Null
        ));
    }
}
