//! # sonar-resources
//!
//! Typed resource kinds of the Sonar API.
//!
//! Each kind knows its remote collection, the fields it selects, the wire
//! type of the attributes it is usually filtered by, and how to decode
//! itself from one raw entity.

use chrono::{DateTime, Utc};
use sonar_core::Id;

pub mod account_status;
pub mod connection;
pub mod invoice;
pub mod ticket;

pub use account_status::AccountStatus;
pub use invoice::Invoice;
pub use ticket::{
    CreateTicketReplyInput, Ticket, TicketReply, TicketStatus, UpdateTicketInput,
};

/// Records with a remote primary key
pub trait Identifiable {
    fn id(&self) -> Id;
}

/// Records with remote timestamps
pub trait Timestamped {
    fn created_at(&self) -> Option<DateTime<Utc>>;
    fn updated_at(&self) -> Option<DateTime<Utc>>;
}
