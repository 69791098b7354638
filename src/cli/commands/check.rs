//! check command - Audit a repository

use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::args::CheckArgs;
use crate::cli::{Context, Status};
use crate::core::config::{Config, FetchSettings};
use crate::engine::{AuditOptions, Auditor};
use crate::ocfl::Repository;
use crate::remote::{HttpFetcher, ScratchArea};
use crate::ui::output;
use crate::ui::progress::LogProgress;

/// Apply command-line flags on top of file configuration.
///
/// # Errors
///
/// Fails if the merged values do not validate.
pub fn merge_flags(config: &mut Config, args: &CheckArgs) -> Result<()> {
    let file = &mut config.file;

    if let Some(namespace) = &args.namespace {
        file.namespace = Some(namespace.clone());
    }
    if let Some(endpoint) = &args.endpoint {
        file.endpoint = Some(endpoint.clone());
    }
    if args.fixity {
        file.fixity = Some(true);
    }
    if let Some(filter) = &args.fetch_filter {
        file.fetch_filter = Some(filter.clone());
    }
    if !args.catalogs.is_empty() {
        file.catalog_files = Some(args.catalogs.clone());
    }

    if args.scratch_dir.is_some() || args.concurrency.is_some() || args.keep_downloads {
        let fetch = file.fetch.get_or_insert_with(FetchSettings::default);
        if let Some(dir) = &args.scratch_dir {
            fetch.scratch_dir = Some(dir.to_string_lossy().into_owned());
        }
        if let Some(n) = args.concurrency {
            fetch.max_concurrent = Some(usize::try_from(n).context("--concurrency is too large")?);
        }
        if args.keep_downloads {
            fetch.keep_downloads = Some(true);
        }
    }

    file.validate().context("invalid option")?;
    Ok(())
}

/// Audit a repository.
pub fn check(ctx: &Context, args: &CheckArgs) -> Result<Status> {
    let mut config = Config::load(ctx.config.as_deref()).context("failed to load configuration")?;
    if let Some(path) = config.loaded_from() {
        tracing::debug!(path = %path.display(), "configuration loaded");
    }
    merge_flags(&mut config, args)?;

    let repo = Repository::open(&args.repo)
        .with_context(|| format!("cannot open repository '{}'", args.repo.display()))?;

    let mut auditor = Auditor::new(repo, AuditOptions::from_config(&config))?
        .with_progress(Arc::new(LogProgress::new()));

    match config.endpoint() {
        Some(endpoint) => {
            let fetcher = HttpFetcher::with_timeout(endpoint, Some(config.fetch_timeout()))?;
            let scratch_dir = config.scratch_dir();
            let scratch = ScratchArea::create(&scratch_dir).with_context(|| {
                format!("cannot create scratch directory '{}'", scratch_dir.display())
            })?;
            auditor = auditor.with_fetcher(Arc::new(fetcher), scratch);
        }
        None if config.fixity() => {
            tracing::warn!("fixity requested without an endpoint; no files will be fetched");
        }
        None => {}
    }

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let report = runtime.block_on(auditor.run())?;

    if ctx.json {
        output::print_json(&report)?;
    } else {
        output::print(output::render_report(&report), ctx.verbosity);
    }

    Ok(if report.summary.is_clean() {
        Status::Clean
    } else {
        Status::IntegrityFindings
    })
}
