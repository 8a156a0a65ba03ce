//! Start command

use anyhow::Result;
use camino::Utf8Path;
use nea_update::{HostContext, ProcessUpdateState, SkipReason, UpdateOrchestrator, UpdateOutcome};
use std::sync::Arc;

use crate::cli::StartArgs;
use crate::output;

pub async fn run(args: StartArgs, config_dir: Option<&Utf8Path>) -> Result<()> {
    let mut config = super::load_config(config_dir)?;
    if args.no_auto_update {
        config.options.auto_update = false;
    }

    let host = HostContext::new(args.plugin_dir.as_std_path(), args.current_version);
    let updater = UpdateOrchestrator::new(&config, host, Arc::new(ProcessUpdateState::new()))?;

    output::kv("Plugin", &updater.target().primary_path().display().to_string());
    output::kv(
        "Auto-update",
        if updater.has_auto_updates() { "on" } else { "off" },
    );

    finish(updater.start().await)
}

/// Print the outcome; a failed cycle becomes the command error instead
fn finish(outcome: UpdateOutcome) -> Result<()> {
    match outcome {
        UpdateOutcome::Failed(e) => Err(anyhow::Error::new(e).context("update cycle failed")),
        other => {
            report(&other);
            Ok(())
        }
    }
}

fn report(outcome: &UpdateOutcome) {
    match outcome {
        UpdateOutcome::Installed(build) => {
            output::success(&format!("Installed build #{}", build));
        }
        UpdateOutcome::Updated {
            from,
            to,
            staged_at,
        } => {
            output::success(&format!("Staged build #{} (running #{})", to, from));
            output::kv("Staged at", &staged_at.display().to_string());
            output::info("Restart the server to apply it");
        }
        UpdateOutcome::UpToDate(build) => {
            output::success(&format!("Already on the latest build (#{})", build));
        }
        UpdateOutcome::Skipped(SkipReason::UnknownLocalVersion) => {
            output::warning("Running version is not a build number, update check skipped");
        }
        UpdateOutcome::Skipped(SkipReason::AutoUpdateDisabled) => {
            output::info("Auto-update is disabled");
        }
        UpdateOutcome::Skipped(SkipReason::AlreadyUpdated) => {
            output::info("A build was already downloaded this run");
        }
        // Returned as the command error by `finish`
        UpdateOutcome::Failed(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nea_update::{BuildNumber, LookupFailure, UpdateError};

    #[test]
    fn test_failed_cycle_is_returned_once_as_error() {
        let err = finish(UpdateOutcome::Failed(UpdateError::VersionUnresolvable(
            LookupFailure::Status(502),
        )))
        .unwrap_err();

        assert_eq!(err.to_string(), "update cycle failed");
        assert!(format!("{:#}", err).contains("HTTP 502"));
    }

    #[test]
    fn test_other_outcomes_succeed() {
        assert!(finish(UpdateOutcome::UpToDate(BuildNumber::new(40))).is_ok());
        assert!(finish(UpdateOutcome::Skipped(SkipReason::AlreadyUpdated)).is_ok());
    }
}
