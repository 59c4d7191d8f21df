//! Profile record written for every new account

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl ProfileRecord {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            created_at,
        }
    }

    /// Firestore REST document body with typed field values.
    pub fn to_document(&self) -> Value {
        json!({
            "fields": {
                "first_name": { "stringValue": self.first_name },
                "last_name": { "stringValue": self.last_name },
                "email": { "stringValue": self.email },
                "created_at": {
                    "timestampValue": self.created_at.to_rfc3339_opts(SecondsFormat::Micros, true)
                },
            }
        })
    }
}
