//! `islet decode` command implementation.

use std::path::PathBuf;

use clap::Args as ClapArgs;
use color_eyre::eyre::{Result, eyre};
use islet::{Decoded, Decoder};
use islet_core::Region;

use super::read_envelope;

/// Arguments for the decode command.
#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Envelope file, or `-` for stdin.
    file: PathBuf,

    /// Only print this region (short or long key, e.g. `p` or `primary`).
    #[arg(long, value_parser = parse_region)]
    region: Option<Region>,
}

fn parse_region(key: &str) -> Result<Region, String> {
    Region::from_key(key).ok_or_else(|| {
        let known: Vec<_> = Region::ALL.iter().map(|region| region.legacy_key()).collect();
        format!("unknown region `{key}`; expected one of {}", known.join(", "))
    })
}

/// Run the decode command.
pub fn run(args: &Args) -> Result<()> {
    let bytes = read_envelope(&args.file)?;
    let regions = match Decoder::default().decode(&bytes)? {
        Decoded::Ready(regions) => regions,
        Decoded::UnsupportedVersion { version, supported } => {
            return Err(eyre!(
                "envelope version {version} is newer than the supported version {supported}"
            ));
        }
    };

    let output = match args.region {
        Some(region) => {
            let node = regions
                .get(region)
                .ok_or_else(|| eyre!("region `{region}` has no content"))?;
            serde_json::to_string_pretty(node)?
        }
        None => serde_json::to_string_pretty(&regions)?,
    };
    println!("{output}");
    Ok(())
}
