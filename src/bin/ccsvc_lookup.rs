//! ccsvc-lookup: one-shot case lookup
//!
//! Resolves a case through the configured registry, cache and address index
//! and prints it as JSON on stdout.
//!
//! ## Usage
//! ```text
//! ccsvc-lookup id <uuid> [--events]
//! ccsvc-lookup uprn <uprn> [--events]
//! ccsvc-lookup ref <case-ref> [--events]
//! ```
//!
//! ## Configuration
//! - CCSVC_CONFIG: Path to a YAML config file (optional)
//! - CCSVC__<SECTION>__<KEY>: Overrides for individual settings
//! - CCSVC_LOG: Log filter (default: info)

use clap::{Parser, Subcommand};
use tracing::{error, info};
use uuid::Uuid;

use ccsvc::config::Config;
use ccsvc::model::UniquePropertyReferenceNumber;
use ccsvc::utils::bootstrap::init_tracing;
use ccsvc::CaseService;

#[derive(Parser)]
#[command(name = "ccsvc-lookup")]
#[command(about = "Look up census cases by id, UPRN or case reference")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    lookup: Lookup,

    /// Include whitelisted case events
    #[arg(long, global = true)]
    events: bool,
}

#[derive(Subcommand)]
enum Lookup {
    /// Case by id, falling back to locally created cases
    Id { id: Uuid },

    /// Agent-visible cases at an address
    Uprn {
        #[arg(value_parser = UniquePropertyReferenceNumber::parse)]
        uprn: UniquePropertyReferenceNumber,
    },

    /// Case by its Luhn-checked reference
    Ref { case_ref: u64 },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::load(None)?;
    let service = CaseService::from_config(&config).await?;
    info!("ccsvc-lookup started");

    let result = match cli.lookup {
        Lookup::Id { id } => service
            .get_case_by_id(id, cli.events)
            .await
            .map(|case| serde_json::to_string_pretty(&case)),
        Lookup::Uprn { uprn } => service
            .get_case_by_uprn(uprn, cli.events)
            .await
            .map(|cases| serde_json::to_string_pretty(&cases)),
        Lookup::Ref { case_ref } => service
            .get_case_by_case_ref(case_ref, cli.events)
            .await
            .map(|case| serde_json::to_string_pretty(&case)),
    };

    let json = result.inspect_err(|err| {
        error!(status = err.status_code(), error = %err, "Lookup failed");
    })??;
    println!("{}", json);
    Ok(())
}
