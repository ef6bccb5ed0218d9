//! Run-listing command, for building filters against a project.

use crate::api::Client;
use anyhow::Result;

/// Fetch and print a project's runs
pub fn execute_runs(
    base_url: &str,
    api_key: Option<String>,
    entity: &str,
    project: &str,
) -> Result<()> {
    let client = Client::new(base_url, api_key)?;
    let runs = client.fetch_runs(entity, project)?;

    println!("Runs in {}/{}: {}", entity, project, runs.len());
    println!("{:<32} {:<20} {:<10}", "NAME", "GROUP", "STATE");
    for run in &runs {
        println!(
            "{:<32} {:<20} {:<10}",
            run.name,
            run.group.as_deref().unwrap_or("-"),
            run.state
        );
    }
    Ok(())
}
