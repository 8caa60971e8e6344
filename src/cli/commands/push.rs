//! Publication step: commit and push the BSP tree and index.
//!
//! Everything network- and credential-shaped is the external git client's
//! concern; this command only sequences it.

use std::path::Path;

use tokio::process::Command;

use crate::cli::{PushArgs, RuntimeConfig};
use crate::config::PackagerConfig;
use crate::error::{CliError, Result};

pub async fn run(args: &PushArgs, config: &PackagerConfig, runtime: &RuntimeConfig) -> Result<()> {
    let git = which::which("git").map_err(|e| CliError::ExecutionFailed {
        command: "git".to_string(),
        reason: format!("git client not found: {e}"),
    })?;
    let repo = args.repo.as_path();

    runtime.section("Publishing BSP tree and index")?;

    // The BSP archive is large enough to trip git's default HTTP post
    // buffer; failing to raise it is not fatal.
    if let Err(e) = run_git(&git, repo, &["config", "http.postBuffer", "524288000"]).await {
        log::debug!("could not raise http.postBuffer: {e}");
    }

    runtime.progress("Staging changes")?;
    run_git(&git, repo, &["add", "-A"]).await?;

    let status = run_git(&git, repo, &["status", "--porcelain"]).await?;
    if status.trim().is_empty() {
        runtime.success("No changes to push, index and BSP tree are up to date")?;
        return Ok(());
    }

    let message = match &args.version {
        Some(version) => format!("Update nuttyfi32 BSP v{version}"),
        None => "Update nuttyfi32 BSP".to_string(),
    };
    runtime.progress(&format!("Committing: {message}"))?;
    run_git(&git, repo, &["commit", "-m", &message]).await?;

    let branch = args.branch.as_deref().unwrap_or(&config.publish.branch);
    runtime.progress(&format!("Pushing to {}/{branch}", config.publish.remote))?;
    run_git(&git, repo, &["push", config.publish.remote.as_str(), branch]).await?;

    runtime.success(&format!("Pushed to {}/{branch}", config.publish.remote))?;

    Ok(())
}

async fn run_git(git: &Path, repo: &Path, argv: &[&str]) -> Result<String> {
    log::debug!("git {}", argv.join(" "));

    let output = Command::new(git)
        .args(argv)
        .current_dir(repo)
        .output()
        .await?;

    if !output.status.success() {
        return Err(CliError::ExecutionFailed {
            command: format!("git {}", argv.join(" ")),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
