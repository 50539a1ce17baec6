//! Experiment commands - run, collect, report and list

use std::path::PathBuf;

use clap::Args;
use serde::Deserialize;
use tracing::info;

use crate::domain::experiment::ExperimentAttribute;
use crate::domain::listing::{Asin, ListingContent};
use crate::domain::DomainError;
use crate::infrastructure::services::{ExperimentLifecycle, RunExperimentRequest};

/// Arguments for the run command
#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Product identifier
    #[arg(long, required_unless_present = "batch")]
    pub asin: Option<String>,

    /// Current text of the attribute
    #[arg(long, required_unless_present = "batch")]
    pub control: Option<String>,

    /// Proposed text of the attribute
    #[arg(long, required_unless_present = "batch")]
    pub treatment: Option<String>,

    /// JSON file with one entry per ASIN to run in sequence
    #[arg(long, conflicts_with_all = ["asin", "control", "treatment", "listing_from_store"])]
    pub batch: Option<PathBuf>,

    /// Experiment length in days (defaults to config)
    #[arg(long)]
    pub duration: Option<u32>,

    /// Percentage of traffic kept on the control (defaults to config)
    #[arg(long)]
    pub split: Option<u8>,

    /// Attribute under test: title or bullet-1 .. bullet-5
    #[arg(long, default_value = "title", value_parser = parse_attribute)]
    pub attribute: ExperimentAttribute,

    /// Bullet of the treatment listing, repeatable; used for scoring
    #[arg(long = "bullet")]
    pub bullets: Vec<String>,

    /// Description of the treatment listing; used for scoring
    #[arg(long)]
    pub description: Option<String>,

    /// Start from the listing in the content store
    #[arg(long)]
    pub listing_from_store: bool,
}

/// Arguments naming one experiment
#[derive(Args, Clone, Debug)]
pub struct ExperimentArgs {
    /// Experiment identifier
    pub experiment_id: String,
}

/// Arguments for the list command
#[derive(Args, Clone, Debug)]
pub struct ListArgs {
    /// Show locally recorded experiments instead of asking the platform
    #[arg(long)]
    pub local: bool,
}

fn parse_attribute(value: &str) -> Result<ExperimentAttribute, String> {
    value.parse()
}

/// One entry of a batch file
///
/// ```json
/// [{"asin": "B01EXAMPLE1", "control": "Old title", "treatment": "New title"}]
/// ```
#[derive(Debug, Deserialize)]
struct BatchCase {
    asin: String,
    control: String,
    treatment: String,
    #[serde(default)]
    attribute: ExperimentAttribute,
    duration_days: Option<u32>,
    traffic_split: Option<u8>,
    #[serde(default)]
    bullets: Vec<String>,
    description: Option<String>,
}

impl BatchCase {
    fn into_request(self) -> Result<RunExperimentRequest, DomainError> {
        let asin = Asin::new(self.asin)?;

        let mut listing = ListingContent::default().with_bullets(self.bullets);
        if let Some(description) = self.description {
            listing = listing.with_description(description);
        }

        let mut request = RunExperimentRequest::new(asin, self.control, self.treatment)
            .with_attribute(self.attribute)
            .with_listing(listing);
        if let Some(days) = self.duration_days {
            request = request.with_duration(days);
        }
        if let Some(split) = self.traffic_split {
            request = request.with_traffic_split(split);
        }
        Ok(request)
    }
}

/// Parse a batch file; every entry must be well-formed before anything runs
fn parse_batch(raw: &str) -> anyhow::Result<Vec<RunExperimentRequest>> {
    let cases: Vec<BatchCase> = serde_json::from_str(raw)?;
    let requests = cases
        .into_iter()
        .map(BatchCase::into_request)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(requests)
}

async fn run_batch(lifecycle: &ExperimentLifecycle, path: &PathBuf) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(path).await?;
    let requests = parse_batch(&raw)?;
    info!(entries = requests.len(), path = %path.display(), "Running batch");

    super::print_json(&lifecycle.run_batch(requests).await)
}

/// Gate the treatment and create the experiment when eligible
pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let lifecycle = crate::create_lifecycle(&config)?;

    if let Some(path) = &args.batch {
        return run_batch(&lifecycle, path).await;
    }

    let (Some(asin), Some(control), Some(treatment)) = (&args.asin, &args.control, &args.treatment)
    else {
        anyhow::bail!("--asin, --control and --treatment are required without --batch");
    };
    let asin = Asin::new(asin)?;

    let mut listing = if args.listing_from_store {
        let service = crate::create_quality_service(&config).await?;
        service.load(&asin).await?
    } else {
        ListingContent::default()
    };

    if !args.bullets.is_empty() {
        listing = listing.with_bullets(args.bullets.clone());
    }
    if let Some(description) = &args.description {
        listing = listing.with_description(description);
    }

    let mut request = RunExperimentRequest::new(asin, control, treatment)
        .with_attribute(args.attribute)
        .with_listing(listing);
    if let Some(days) = args.duration {
        request = request.with_duration(days);
    }
    if let Some(split) = args.split {
        request = request.with_traffic_split(split);
    }

    let outcome = lifecycle.run(request).await?;
    if let Some(id) = outcome.experiment_id() {
        info!(experiment_id = %id, "Experiment running");
    }

    super::print_json(&outcome)
}

/// Pull and analyze metrics
pub async fn collect(args: ExperimentArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let lifecycle = crate::create_lifecycle(&config)?;

    let collection = lifecycle.collect_metrics(&args.experiment_id).await?;
    super::print_json(&collection)
}

/// Generate and store the report
pub async fn report(args: ExperimentArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let lifecycle = crate::create_lifecycle(&config)?;

    let report = lifecycle.generate_report(&args.experiment_id).await?;
    super::print_json(&report)
}

/// List experiments from the platform or local storage
pub async fn list(args: ListArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let lifecycle = crate::create_lifecycle(&config)?;

    if args.local {
        super::print_json(&lifecycle.list_records().await?)
    } else {
        super::print_json(&lifecycle.list_experiments().await?)
    }
}
