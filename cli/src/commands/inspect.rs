//! `islet inspect` command implementation.

use std::path::PathBuf;

use clap::Args as ClapArgs;
use color_eyre::eyre::{Result, bail, eyre};
use islet::Budget;
use islet_core::Region;
use islet_core::wire::{SHARED_ELEMENTS_KEY, SHARED_STYLES_KEY, VERSION_KEY};
use serde::Serialize;
use serde_json::Value;

use super::read_envelope;

/// Arguments for the inspect command.
#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Envelope file, or `-` for stdin.
    file: PathBuf,

    /// Hard size ceiling in bytes (defaults to `ISLET_BUDGET_BYTES` or 4096).
    #[arg(long)]
    budget: Option<usize>,

    /// Output in JSON format (machine-readable).
    #[arg(long)]
    json: bool,
}

/// What `inspect` reports about one envelope.
#[derive(Debug, Serialize)]
struct Summary {
    version: u64,
    size: usize,
    budget: usize,
    fits: bool,
    regions: Vec<&'static str>,
    shared_elements: usize,
    shared_styles: usize,
}

/// Run the inspect command.
pub fn run(args: &Args) -> Result<()> {
    let bytes = read_envelope(&args.file)?;
    let envelope: Value = serde_json::from_slice(&bytes)?;
    let Value::Object(map) = &envelope else {
        bail!("{} is not an envelope object", args.file.display());
    };
    let version = map
        .get(VERSION_KEY)
        .and_then(Value::as_u64)
        .ok_or_else(|| eyre!("envelope has no version"))?;

    let budget = args.budget.map_or_else(Budget::from_env, Budget::with_hard_limit);
    let pool_len = |key: &str| map.get(key).and_then(Value::as_array).map_or(0, Vec::len);
    let summary = Summary {
        version,
        size: bytes.len(),
        budget: budget.effective(),
        fits: budget.fits(bytes.len()),
        regions: map
            .keys()
            .filter_map(|key| Region::from_key(key))
            .map(Region::legacy_key)
            .collect(),
        shared_elements: pool_len(SHARED_ELEMENTS_KEY),
        shared_styles: pool_len(SHARED_STYLES_KEY),
    };
    tracing::debug!(?summary, "inspected envelope");

    if args.json {
        println!("{}", serde_json::to_string(&summary)?);
        return Ok(());
    }

    println!("version          {}", summary.version);
    println!(
        "size             {} / {} bytes ({})",
        summary.size,
        summary.budget,
        if summary.fits { "fits" } else { "over budget" }
    );
    let regions = if summary.regions.is_empty() {
        "none".to_owned()
    } else {
        summary.regions.join(", ")
    };
    println!("regions          {regions}");
    println!("shared elements  {}", summary.shared_elements);
    println!("shared styles    {}", summary.shared_styles);
    Ok(())
}
