//! Audit trail model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};

/// Kind of audited domain event, stored as its upper-case name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    NoCopiesAvailable,
    BorrowReturned,
    NegativeInventoryAttempt,
    /// Any other event name
    Other(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::NoCopiesAvailable => "NO_COPIES_AVAILABLE",
            EventKind::BorrowReturned => "BORROW_RETURNED",
            EventKind::NegativeInventoryAttempt => "NEGATIVE_INVENTORY_ATTEMPT",
            EventKind::Other(s) => s.as_str(),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Event kind cannot be empty".to_string());
        }
        Ok(match s.to_uppercase().as_str() {
            "NO_COPIES_AVAILABLE" => EventKind::NoCopiesAvailable,
            "BORROW_RETURNED" => EventKind::BorrowReturned,
            "NEGATIVE_INVENTORY_ATTEMPT" => EventKind::NegativeInventoryAttempt,
            _ => EventKind::Other(s.to_string()),
        })
    }
}

impl Serialize for EventKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// SQLx conversion for EventKind
impl sqlx::Type<Postgres> for EventKind {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for EventKind {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for EventKind {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// One audit trail entry. Never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EventLogEntry {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, example = "NO_COPIES_AVAILABLE")]
    pub event: EventKind,
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

/// Query parameters for the audit trail
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct EventQuery {
    /// Filter by event kind
    pub event: Option<String>,
    /// Page number (1-based)
    pub page: Option<i64>,
    /// Entries per page
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_kinds_round_trip_names() {
        for kind in [
            EventKind::NoCopiesAvailable,
            EventKind::BorrowReturned,
            EventKind::NegativeInventoryAttempt,
        ] {
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive_for_known_kinds() {
        assert_eq!(
            "borrow_returned".parse::<EventKind>().unwrap(),
            EventKind::BorrowReturned
        );
    }

    #[test]
    fn test_unknown_kind_is_kept_verbatim() {
        let kind: EventKind = "BOOK_WITHDRAWN".parse().unwrap();
        assert_eq!(kind, EventKind::Other("BOOK_WITHDRAWN".to_string()));
        assert_eq!(kind.to_string(), "BOOK_WITHDRAWN");
        assert!("  ".parse::<EventKind>().is_err());
    }

    #[test]
    fn test_serde_uses_names() {
        let json = serde_json::to_string(&EventKind::NegativeInventoryAttempt).unwrap();
        assert_eq!(json, "\"NEGATIVE_INVENTORY_ATTEMPT\"");
        let back: EventKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, EventKind::NegativeInventoryAttempt);
    }
}
