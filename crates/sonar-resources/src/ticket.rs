//! Ticket resource
//!
//! Remote collection: `tickets`

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sonar_core::{
    from_json, DecodeError, FieldType, Id, RemoteResource, Selection, SonarResult, WireDecodable,
};
use sonar_queries::{MutationInput, MutationSpec, QuerySpec};

use crate::connection;
use crate::{Identifiable, Timestamped};

/// Ticket lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Open,
    PendingInternal,
    PendingExternal,
    Closed,
    /// A status this client does not know about yet
    #[serde(other)]
    Unknown,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::PendingInternal => "PENDING_INTERNAL",
            Self::PendingExternal => "PENDING_EXTERNAL",
            Self::Closed => "CLOSED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parse a wire name, case-insensitively
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "OPEN" => Some(Self::Open),
            "PENDING_INTERNAL" => Some(Self::PendingInternal),
            "PENDING_EXTERNAL" => Some(Self::PendingExternal),
            "CLOSED" => Some(Self::Closed),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Support ticket
///
/// Tickets belong to a "ticketable" record (usually an account) and carry
/// their reply thread as a nested connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Id,

    pub subject: String,

    pub status: TicketStatus,

    pub priority: Option<String>,

    /// Owning record, e.g. an account ID
    pub ticketable_id: Option<Id>,

    /// Owning record kind, e.g. `Account`
    pub ticketable_type: Option<String>,

    /// Set for tickets created from an inbound email or the portal
    pub inbound_mailbox_id: Option<Id>,

    pub ticket_group_id: Option<Id>,

    #[serde(default, deserialize_with = "connection::entities")]
    pub ticket_replies: Vec<TicketReply>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Start a query over all tickets
    pub fn query() -> QuerySpec<Self> {
        QuerySpec::for_resource()
    }

    /// Tickets with their reply threads newest first
    pub fn with_newest_replies() -> QuerySpec<Self> {
        Self::query().with("ticket_replies", |replies| replies.sort_desc("created_at"))
    }

    /// Update a ticket's status, subject or priority
    pub fn update(id: Id, input: &UpdateTicketInput) -> SonarResult<MutationSpec<Self>> {
        MutationSpec::new("update_ticket")
            .argument("id", "Int64Bit!", id)
            .input(input)
    }

    pub fn is_closed(&self) -> bool {
        self.status.is_closed()
    }

    /// Most recent reply, by creation time
    pub fn latest_reply(&self) -> Option<&TicketReply> {
        self.ticket_replies.iter().max_by_key(|r| r.created_at)
    }
}

impl WireDecodable for Ticket {
    fn selection() -> Selection {
        Selection::fields([
            "id",
            "subject",
            "status",
            "priority",
            "ticketable_id",
            "ticketable_type",
            "inbound_mailbox_id",
            "ticket_group_id",
            "created_at",
            "updated_at",
        ])
        .nested("ticket_replies", TicketReply::selection())
    }

    fn field_types() -> &'static [(&'static str, FieldType)] {
        &[
            ("id", FieldType::Integer),
            ("ticketable_id", FieldType::Integer),
            ("inbound_mailbox_id", FieldType::Integer),
            ("ticket_group_id", FieldType::Integer),
            ("subject", FieldType::String),
            ("status", FieldType::String),
            ("priority", FieldType::String),
            ("ticketable_type", FieldType::String),
        ]
    }

    fn from_wire(raw: &Value) -> Result<Self, DecodeError> {
        from_json(raw)
    }
}

impl RemoteResource for Ticket {
    const OBJECT_NAME: &'static str = "tickets";
}

impl Identifiable for Ticket {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for Ticket {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

/// One message in a ticket thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketReply {
    pub id: Id,
    pub body: String,
    pub author: Option<String>,
    pub author_email: Option<String>,
    /// Whether the reply came from the customer side
    #[serde(default)]
    pub incoming: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl TicketReply {
    pub fn create(input: &CreateTicketReplyInput) -> SonarResult<MutationSpec<Self>> {
        MutationSpec::new("create_ticket_reply").input(input)
    }
}

impl WireDecodable for TicketReply {
    fn selection() -> Selection {
        Selection::fields(["id", "body", "author", "author_email", "incoming", "created_at"])
    }

    fn from_wire(raw: &Value) -> Result<Self, DecodeError> {
        from_json(raw)
    }
}

/// Fields changed by `update_ticket`; unset fields are left alone
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateTicketInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl MutationInput for UpdateTicketInput {
    fn type_name() -> &'static str {
        "UpdateTicketMutationInput"
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTicketReplyInput {
    pub ticket_id: Id,
    pub body: String,
    pub incoming: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
}

impl MutationInput for CreateTicketReplyInput {
    fn type_name() -> &'static str {
        "CreateTicketReplyMutationInput"
    }
}
