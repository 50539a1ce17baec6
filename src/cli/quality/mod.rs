//! Quality commands - score and validate a listing

use std::path::PathBuf;

use clap::Args;

use crate::domain::listing::{Asin, ListingContent};

/// Arguments shared by `score` and `validate`
#[derive(Args, Clone, Debug)]
pub struct QualityArgs {
    /// Product identifier
    pub asin: String,

    /// Read the listing from a JSON file instead of the content store
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Print the quality score
pub async fn score(args: QualityArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let service = crate::create_quality_service(&config).await?;
    let asin = Asin::new(&args.asin)?;

    let result = match read_listing(&args).await? {
        Some(content) => service.score_content(&asin, &content),
        None => service.score_asin(&asin).await?,
    };

    super::print_json(&result)
}

/// Print the eligibility verdict
pub async fn validate(args: QualityArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let service = crate::create_quality_service(&config).await?;
    let asin = Asin::new(&args.asin)?;

    let verdict = match read_listing(&args).await? {
        Some(content) => service.validate_content(&asin, &content),
        None => service.validate_asin(&asin).await?,
    };

    super::print_json(&verdict)
}

/// Listing from `--file`, if given
async fn read_listing(args: &QualityArgs) -> anyhow::Result<Option<ListingContent>> {
    let Some(path) = &args.file else {
        return Ok(None);
    };

    let raw = tokio::fs::read_to_string(path).await?;
    Ok(Some(serde_json::from_str(&raw)?))
}

