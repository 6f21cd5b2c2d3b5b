//! Invoice resource
//!
//! Remote collection: `invoices`

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sonar_core::{from_json, DecodeError, FieldType, Id, RemoteResource, Selection, WireDecodable};
use sonar_queries::QuerySpec;

use crate::{Identifiable, Timestamped};

/// Account invoice. Amounts are in minor currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Id,
    pub account_id: Id,
    pub date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub total_debits: i64,
    #[serde(default)]
    pub remaining_due: i64,
    /// Past due and unpaid
    #[serde(default)]
    pub delinquent: bool,
    #[serde(default)]
    pub void: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Invoice {
    pub fn query() -> QuerySpec<Self> {
        QuerySpec::for_resource()
    }

    /// Delinquent invoices of one account
    pub fn delinquent_for(account_id: Id) -> QuerySpec<Self> {
        Self::query()
            .where_eq("account_id", account_id)
            .where_eq("delinquent", true)
    }

    pub fn is_outstanding(&self) -> bool {
        !self.void && self.remaining_due > 0
    }
}

impl WireDecodable for Invoice {
    fn selection() -> Selection {
        Selection::fields([
            "id",
            "account_id",
            "date",
            "due_date",
            "total_debits",
            "remaining_due",
            "delinquent",
            "void",
            "created_at",
            "updated_at",
        ])
    }

    fn field_types() -> &'static [(&'static str, FieldType)] {
        &[("id", FieldType::Integer), ("account_id", FieldType::Integer)]
    }

    fn from_wire(raw: &Value) -> Result<Self, DecodeError> {
        from_json(raw)
    }
}

impl RemoteResource for Invoice {
    const OBJECT_NAME: &'static str = "invoices";
}

impl Identifiable for Invoice {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for Invoice {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}
