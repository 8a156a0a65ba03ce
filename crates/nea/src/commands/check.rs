//! Check command

use anyhow::{anyhow, bail, Result};
use camino::Utf8Path;
use nea_update::{BuildNumber, LatestVersion, ReleaseIndex};
use std::cmp::Ordering;

use crate::cli::CheckArgs;
use crate::output;

pub async fn run(args: CheckArgs, config_dir: Option<&Utf8Path>) -> Result<()> {
    let Some(current) = BuildNumber::parse_strict(&args.current_version) else {
        bail!("'{}' is not a build number", args.current_version);
    };

    let config = super::load_config(config_dir)?;
    let index = ReleaseIndex::new(&config)?;

    output::info(&format!("Current build: #{}", current));

    match index.fetch_latest_version().await {
        LatestVersion::Found(latest) if latest.is_newer_than(current) => {
            output::success(&comparison(current, latest));
            output::info("Run 'nea start' to download it");
        }
        LatestVersion::Found(latest) => {
            output::success(&comparison(current, latest));
        }
        LatestVersion::Unavailable(failure) => {
            return Err(anyhow!("could not resolve the latest build: {}", failure));
        }
    }

    Ok(())
}

/// How the running build relates to the latest published one
fn comparison(current: BuildNumber, latest: BuildNumber) -> String {
    match latest.cmp(&current) {
        Ordering::Greater => format!("Update available: #{}", latest),
        Ordering::Equal => format!("Already on the latest build (#{})", current),
        Ordering::Less => format!(
            "Build #{} is newer than the latest release (#{})",
            current, latest
        ),
    }
}
