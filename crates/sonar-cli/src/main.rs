//! Sonar command line client
//!
//! Reads connection settings from the environment (or a `.env` file) and
//! runs ticket and invoice queries against a Sonar instance.

use anyhow::{Context, Result};
use clap::Parser;
use sonar_client::SonarClient;
use sonar_core::{PaginatedResult, SonarConfig};
use sonar_resources::{Invoice, Ticket};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{render_plan, Command, InvoicesArgs, TicketsArgs};

#[derive(Debug, Parser)]
#[command(name = "sonar")]
#[command(about = "Query tickets and invoices on a Sonar instance")]
#[command(version)]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match &cli.command {
        Command::Render { target } => {
            println!("{}", render_plan(&target.plan()?)?);
            Ok(())
        }
        Command::Tickets(args) => {
            let (client, config) = connect()?;
            list_tickets(&client, &config, args, cli.json).await
        }
        Command::Invoices(args) => {
            let (client, _) = connect()?;
            list_invoices(&client, args, cli.json).await
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn,sonar_cli=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn connect() -> Result<(SonarClient, SonarConfig)> {
    let config = SonarConfig::from_env().context("failed to load Sonar configuration")?;
    let client = SonarClient::new(&config)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        endpoint = %client.endpoint(),
        "Connected"
    );
    Ok((client, config))
}

async fn list_tickets(
    client: &SonarClient,
    config: &SonarConfig,
    args: &TicketsArgs,
    json: bool,
) -> Result<()> {
    let request = args.page_request(config.default_per_page)?;
    let page = args.query()?.fetch_page(client, request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    for ticket in &page {
        println!("{}", ticket_line(ticket));
    }
    println!("{}", page_footer(&page));
    Ok(())
}

async fn list_invoices(client: &SonarClient, args: &InvoicesArgs, json: bool) -> Result<()> {
    let invoices = args.query().get(client).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&invoices)?);
        return Ok(());
    }

    for invoice in &invoices {
        println!("{}", invoice_line(invoice));
    }
    println!("{} invoice(s)", invoices.len());
    Ok(())
}

fn ticket_line(ticket: &Ticket) -> String {
    let updated = ticket
        .updated_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".into());
    format!(
        "#{:<8} {:<17} {:<16} {}",
        ticket.id, ticket.status, updated, ticket.subject
    )
}

fn invoice_line(invoice: &Invoice) -> String {
    let due = invoice
        .due_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".into());
    let flag = if invoice.delinquent { " (delinquent)" } else { "" };
    format!(
        "#{:<8} due {:<10} {:>10.2} remaining{}",
        invoice.id,
        due,
        invoice.remaining_due as f64 / 100.0,
        flag
    )
}

fn page_footer<T>(page: &PaginatedResult<T>) -> String {
    let mut footer = format!(
        "Page {} of {} ({} total)",
        page.page,
        page.last_page(),
        page.total_count
    );
    if let Some(next) = page.next_page_url() {
        footer.push_str(&format!(", next: {}", next));
    }
    footer
}
