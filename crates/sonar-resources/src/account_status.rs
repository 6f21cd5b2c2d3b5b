//! Account status resource
//!
//! Remote collection: `account_statuses`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sonar_core::{from_json, DecodeError, FieldType, Id, RemoteResource, Selection, WireDecodable};
use sonar_queries::QuerySpec;

use crate::{Identifiable, Timestamped};

/// Named state an account can be in, e.g. `Active` or `On Hold`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountStatus {
    pub id: Id,
    pub name: String,
    /// Whether accounts in this status receive service
    #[serde(default)]
    pub activates_account: bool,
    pub color: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AccountStatus {
    pub fn query() -> QuerySpec<Self> {
        QuerySpec::for_resource().sort_asc("name")
    }

    /// Look up a status by its exact name
    pub fn named(name: &str) -> QuerySpec<Self> {
        Self::query().where_eq("name", name)
    }

    /// The status currently held by an account
    pub fn of_account(account_id: Id) -> QuerySpec<Self> {
        Self::query().where_has("accounts", |accounts| accounts.where_eq("id", account_id))
    }
}

impl WireDecodable for AccountStatus {
    fn selection() -> Selection {
        Selection::fields([
            "id",
            "name",
            "activates_account",
            "color",
            "created_at",
            "updated_at",
        ])
    }

    fn field_types() -> &'static [(&'static str, FieldType)] {
        &[("id", FieldType::Integer), ("name", FieldType::String)]
    }

    fn from_wire(raw: &Value) -> Result<Self, DecodeError> {
        from_json(raw)
    }
}

impl RemoteResource for AccountStatus {
    const OBJECT_NAME: &'static str = "account_statuses";
}

impl Identifiable for AccountStatus {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for AccountStatus {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sonar_core::MemoryTransport;

    #[tokio::test]
    async fn test_first_by_name() {
        let transport = MemoryTransport::new().respond(json!({"account_statuses": {"entities": [
            {"id": 4, "name": "On Hold", "activates_account": false, "color": "#ff9900"}
        ]}}));

        let status = AccountStatus::named("On Hold")
            .first(&transport)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(status.id(), 4);
        assert!(!status.activates_account);

        let request = transport.last_request().unwrap();
        assert_eq!(
            request.query,
            "query($search: Search, $sorter: Sorter) { \
             account_statuses(search: [$search], sorter: [$sorter]) { \
             entities { id name activates_account color created_at updated_at } } }"
        );
        assert_eq!(
            request.variables["search"]["string_fields"][0],
            json!({"attribute": "name", "search_value": "On Hold", "match": true})
        );
    }

    #[tokio::test]
    async fn test_status_of_account() {
        let transport = MemoryTransport::new().respond(json!({"account_statuses": {"entities": [
            {"id": 2, "name": "Delinquent", "activates_account": false}
        ]}}));

        let status = AccountStatus::of_account(1001)
            .first(&transport)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(status.name, "Delinquent");

        let request = transport.last_request().unwrap();
        assert_eq!(
            request.query,
            "query($reverse_relation_filters: [ReverseRelationFilter], $sorter: Sorter) { \
             account_statuses(reverse_relation_filters: $reverse_relation_filters, sorter: [$sorter]) { \
             entities { id name activates_account color created_at updated_at } } }"
        );
        assert_eq!(
            request.variables["reverse_relation_filters"],
            json!([{
                "relation": "accounts",
                "search": [{
                    "integer_fields": [{"attribute": "id", "search_value": 1001, "operator": "EQ"}],
                    "string_fields": []
                }]
            }])
        );
        assert!(request.variables.get("search").is_none());
    }

    #[tokio::test]
    async fn test_unknown_name_is_none() {
        let transport = MemoryTransport::new().respond(json!({"account_statuses": {"entities": []}}));
        let status = AccountStatus::named("Nope").first(&transport).await.unwrap();
        assert!(status.is_none());
    }
}
