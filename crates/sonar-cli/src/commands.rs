//! Subcommand arguments and the queries they build

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use sonar_core::{Id, PageRequest, DEFAULT_PER_PAGE};
use sonar_queries::{QueryPlan, QuerySpec};
use sonar_resources::{Invoice, Ticket, TicketStatus};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List tickets, most recently updated first
    Tickets(TicketsArgs),
    /// List invoices of an account
    Invoices(InvoicesArgs),
    /// Print the GraphQL document and variables without sending them
    Render {
        #[command(subcommand)]
        target: RenderTarget,
    },
}

#[derive(Debug, Subcommand)]
pub enum RenderTarget {
    Tickets(TicketsArgs),
    Invoices(InvoicesArgs),
}

#[derive(Debug, Clone, Args)]
pub struct TicketsArgs {
    /// Ticket status; `open` matches every status except closed
    #[arg(short, long)]
    pub status: Option<String>,

    /// Only tickets of these accounts (repeatable)
    #[arg(short, long = "account")]
    pub accounts: Vec<Id>,

    #[arg(short, long, default_value_t = 1)]
    pub page: u32,

    /// Page size, defaults to SONAR_DEFAULT_PER_PAGE
    #[arg(long)]
    pub per_page: Option<u32>,

    /// Path used for page links
    #[arg(long, default_value = "/tickets")]
    pub base_path: String,
}

#[derive(Debug, Clone, Args)]
pub struct InvoicesArgs {
    #[arg(short, long)]
    pub account: Id,

    /// Only past-due invoices
    #[arg(long)]
    pub delinquent: bool,
}

impl TicketsArgs {
    /// Portal tickets: created from a mailbox, replies newest first
    pub fn query(&self) -> Result<QuerySpec<Ticket>> {
        let mut query = Ticket::with_newest_replies().where_ne("inbound_mailbox_id", None::<Id>);

        if !self.accounts.is_empty() {
            query = query
                .where_eq("ticketable_id", self.accounts.clone())
                .where_eq("ticketable_type", "Account");
        }

        if let Some(status) = &self.status {
            let status = TicketStatus::from_str(status)
                .ok_or_else(|| anyhow!("unknown ticket status `{}`", status))?;
            query = match status {
                TicketStatus::Open => query.where_ne("status", TicketStatus::Closed.as_str()),
                other => query.where_eq("status", other.as_str()),
            };
        }

        Ok(query.sort_desc("updated_at"))
    }

    pub fn page_request(&self, default_per_page: u32) -> Result<PageRequest> {
        let per_page = self.per_page.unwrap_or(default_per_page);
        Ok(PageRequest::new(per_page, self.page, self.base_path.clone())?)
    }
}

impl InvoicesArgs {
    pub fn query(&self) -> QuerySpec<Invoice> {
        let query = if self.delinquent {
            Invoice::delinquent_for(self.account)
        } else {
            Invoice::query().where_eq("account_id", self.account)
        };
        query.sort_desc("date")
    }
}

impl RenderTarget {
    pub fn plan(&self) -> Result<QueryPlan> {
        let plan = match self {
            Self::Tickets(args) => args
                .query()?
                .page_plan(args.page_request(DEFAULT_PER_PAGE)?)?,
            Self::Invoices(args) => args.query().plan()?,
        };
        Ok(plan)
    }
}

/// Human readable document and pretty variables
pub fn render_plan(plan: &QueryPlan) -> Result<String> {
    Ok(format!(
        "{}\n\n{}",
        plan.query.query,
        serde_json::to_string_pretty(&plan.query.variables)?
    ))
}
