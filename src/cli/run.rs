use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::ConfigError;
use crate::model::{InputBundle, Mode};
use crate::output::{write_questions, write_summary, DebugSink, DirSink, TracingSink};
use crate::pipeline::run_pipeline;
use crate::proposer::{registry, ProposerTask};
use anyhow::{bail, Context};
use chrono::Local;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    // Load and validate config
    info!("Loading config from {:?}", args.config);
    let mut config = Config::load(&args.config)?;

    // Apply CLI overrides
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(report_dir) = args.report_dir {
        config.report_dir = report_dir;
    }
    if let Some(debug_dir) = args.debug_dir {
        config.debug_dir = Some(debug_dir);
    }

    config.validate()?;

    let mode: Mode = args
        .mode
        .parse()
        .map_err(|_| ConfigError::UnknownMode(args.mode.clone()))?;

    let corpus = std::fs::read_to_string(&args.corpus)
        .with_context(|| format!("Failed to read corpus {:?}", args.corpus))?;

    let mut bundle = InputBundle::new(corpus, mode);
    bundle.domain = args.domain;
    bundle.context = parse_context(&args.context)?;

    let tasks = registry(&config, args.proposers.as_deref());
    if tasks.is_empty() {
        bail!("No enabled proposers match {:?}", args.proposers);
    }

    if args.dry_run {
        info!("DRY RUN - no proposers will be called");
        print_execution_plan(&config, &bundle, &tasks);
        return Ok(());
    }

    // Create dated report directory (reports/YYYY-MM-DD/)
    let date_str = Local::now().format("%Y-%m-%d").to_string();
    let report_dir = config.report_dir.join(&date_str);
    info!("Reports will be written to {:?}", report_dir);

    let sink: Box<dyn DebugSink> = match &config.debug_dir {
        Some(dir) => Box::new(DirSink::new(dir)),
        None => Box::new(TracingSink),
    };

    let output = run_pipeline(&config, bundle.clone(), &tasks, sink.as_ref()).await?;

    write_questions(&report_dir, &output.records, &bundle)?;
    write_summary(
        &report_dir,
        &output.snapshot,
        &output.counts,
        output.records.len(),
        &mode.to_string(),
    )?;

    let failed = output.snapshot.failed_tasks();
    if !failed.is_empty() {
        warn!("{} proposers failed: {:?}", failed.len(), failed);
    }

    println!(
        "{} questions written to {}",
        output.records.len(),
        report_dir.display()
    );

    if args.fail_on_empty && output.records.is_empty() {
        error!("Exiting with error: no questions survived");
        std::process::exit(1);
    }

    Ok(())
}

fn parse_context(entries: &[String]) -> anyhow::Result<BTreeMap<String, String>> {
    let mut context = BTreeMap::new();
    for entry in entries {
        let Some((key, value)) = entry.split_once('=') else {
            bail!("Invalid --context '{}', expected KEY=VALUE", entry);
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("Invalid --context '{}', key is empty", entry);
        }
        context.insert(key.to_string(), value.trim().to_string());
    }
    Ok(context)
}

fn print_execution_plan(config: &Config, bundle: &InputBundle, tasks: &[Arc<dyn ProposerTask>]) {
    let constraints = config.constraints(bundle.mode);

    println!("\n=== Execution Plan ===\n");
    println!("Mode: {}", bundle.mode);
    println!("Corpus: {} chars", bundle.corpus.chars().count());
    if let Some(ref domain) = bundle.domain {
        println!("Domain: {}", domain);
    }
    if !bundle.context.is_empty() {
        println!(
            "Context keys: {}",
            bundle.context.keys().cloned().collect::<Vec<_>>().join(", ")
        );
    }
    println!("Concurrency: {}", config.concurrency);
    println!("Report dir: {:?}", config.report_dir);
    println!(
        "Selection: target {} within {}..={}",
        constraints.target_count, constraints.min_count, constraints.max_count
    );

    println!("\nProposers to run:");
    for task in tasks {
        let kind = config
            .proposers
            .iter()
            .find(|p| p.id == task.id())
            .map(|p| p.kind.to_string())
            .unwrap_or_default();
        let timeout = task
            .timeout()
            .map(|t| t.as_secs())
            .unwrap_or(config.timeout_sec);
        println!(
            "  - {} ({}) -> {} [timeout {}s]",
            task.id(),
            task.display_name(),
            kind,
            timeout
        );
    }
    println!();
}
