use anyhow::Result;

use crate::workflow::WorkflowOutcome;

/// Print the outcome as human-readable text grouped by facet or level.
pub fn print_plain(outcome: &WorkflowOutcome) {
    match outcome {
        WorkflowOutcome::Search { buckets } => {
            if buckets.values().all(Vec::is_empty) {
                println!("nothing found");
                return;
            }
            for (facet, bucket) in buckets {
                if bucket.is_empty() {
                    continue;
                }
                println!("{}:", facet.label());
                for suggestion in bucket {
                    println!("  {}", suggestion.term);
                }
            }
        }
        WorkflowOutcome::Listing { level, nodes } => {
            if nodes.is_empty() {
                println!("nothing found");
                return;
            }
            println!("{level:?}:");
            for node in nodes {
                println!("  {}  {}", node.id(), node.name());
            }
        }
    }
}

/// Print the outcome as JSON for machine consumption.
pub fn print_json(outcome: &WorkflowOutcome) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    Ok(())
}
