//! resolve command - Show how one logical path resolves

use std::path::Path;

use anyhow::{anyhow, Context as _, Result};
use serde::Serialize;

use crate::cli::{Context, Status};
use crate::engine::consistency::{resolve as resolve_path, ResolutionOutcome};
use crate::ocfl::Repository;
use crate::ui::output;

#[derive(Serialize)]
struct Resolution<'a> {
    object: &'a str,
    logical: &'a str,
    head: String,
    #[serde(flatten)]
    outcome: &'a ResolutionOutcome,
}

/// Describe an outcome in one line.
fn describe(outcome: &ResolutionOutcome, head: &str) -> String {
    match outcome {
        ResolutionOutcome::ResolvedAtHead { physical } => {
            format!("resolved at head ({}): {}", head, physical)
        }
        ResolutionOutcome::ResolvedInEarlierVersion { versions } => {
            let found = versions
                .iter()
                .map(|(v, p)| format!("  {}: {}", v, p))
                .collect::<Vec<_>>()
                .join("\n");
            format!("not in head ({}), found in earlier versions:\n{}", head, found)
        }
        ResolutionOutcome::Unresolved => format!("not present in any version (head {})", head),
    }
}

/// Resolve one logical path in one object.
pub fn resolve(ctx: &Context, repo: &Path, object: &str, logical: &str) -> Result<Status> {
    let repository = Repository::open(repo)
        .with_context(|| format!("cannot open repository '{}'", repo.display()))?;

    let ocfl_object = repository
        .object(object)
        .ok_or_else(|| anyhow!("no OCFL object at '{}'", object))?;
    let inventory = ocfl_object
        .inventory()
        .with_context(|| format!("cannot read object '{}'", object))?;

    let outcome = resolve_path(&inventory, logical);
    let head = inventory.head.to_string();

    if ctx.json {
        output::print_json(&Resolution {
            object,
            logical,
            head,
            outcome: &outcome,
        })?;
    } else {
        output::print(format!("{}: {}", logical, describe(&outcome, &head)), ctx.verbosity);
    }

    Ok(if outcome.is_consistent() {
        Status::Clean
    } else {
        Status::IntegrityFindings
    })
}
