mod cli;
mod settings;
mod workflow;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use cli::{OutputFormat, parse_cli, print_json, print_plain};
use patrifind::types::Level;
use workflow::SearchWorkflow;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_cli();
    let resolved = settings::load(&cli)?;

    if cli.print_config {
        resolved.print_summary();
    }

    let workflow = SearchWorkflow::from_config(resolved)?;
    let outcome = if let Some(level) = cli.list {
        workflow.run_listing(Level::from(level), cli.parent.clone(), cli.filter.clone())?
    } else {
        let query = cli.query.as_deref().unwrap_or_default();
        workflow.run_search(query)?
    };

    match cli.output {
        OutputFormat::Plain => print_plain(&outcome),
        OutputFormat::Json => print_json(&outcome)?,
    }

    Ok(())
}
