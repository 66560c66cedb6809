use anyhow::{Context, Result, bail};
use clap::Parser;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use proxy_ranker::args::{Args, RunMode};
use proxy_ranker::channel::ChannelUpdater;
use proxy_ranker::config::{AppConfig, load_config_with_fallback};
use proxy_ranker::logging::{init_dual_logging, init_quiet_logging};
use proxy_ranker::source::load_candidates;
use proxy_ranker::{HttpProbeTransport, SelectionConfig, Selector};

fn main() -> Result<()> {
    let args = Args::parse();

    if args.json {
        init_quiet_logging();
    } else {
        init_dual_logging();
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(run(args))
}

async fn run(args: Args) -> Result<()> {
    let (mut config, source) = load_config_with_fallback(&args.config)
        .with_context(|| format!("failed to load configuration '{}'", args.config.display()))?;
    info!("Loaded configuration from {}", source.description());

    args.apply_overrides(&mut config);
    let selection = config.validate().context("invalid configuration")?;

    if !args.dry_run {
        let missing = config.channel.missing_fields();
        if !missing.is_empty() {
            bail!(
                "missing channel settings: {} (use --dry-run to rank without updating)",
                missing.join(", ")
            );
        }
    }

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, cancelling measurement");
                cancel.cancel();
            }
        }
    });

    match args.run_mode(&config) {
        RunMode::Once => run_cycle(&args, &config, &selection, &cancel).await,
        RunMode::Every(period) => {
            info!("Running a selection cycle every {}s", period.as_secs());
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                if let Err(e) = run_cycle(&args, &config, &selection, &cancel).await {
                    error!("Selection cycle failed: {:#}", e);
                }
                if cancel.is_cancelled() {
                    break;
                }
            }
            info!("Scheduler stopped");
            Ok(())
        }
    }
}

async fn run_cycle(
    args: &Args,
    config: &AppConfig,
    selection: &SelectionConfig,
    cancel: &CancellationToken,
) -> Result<()> {
    let candidates = load_candidates(&config.source)
        .await
        .context("failed to load proxy list")?;
    if candidates.is_empty() {
        warn!(
            "No candidates for region {}, channels left unchanged",
            config.source.region
        );
        return Ok(());
    }

    let transport = Arc::new(HttpProbeTransport::from_config(&config.probe));
    let selector = Selector::new(transport, selection.clone(), cancel.child_token());
    let result = selector
        .select(
            &candidates,
            &config.probe.target_urls,
            config.probe.reliable_url.as_deref(),
        )
        .await?;

    for line in result.summary() {
        info!("{}", line);
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    let Some(best) = result.winner_report() else {
        warn!("No candidate qualified, channels left unchanged");
        return Ok(());
    };
    let winner = &best.candidate;
    info!(
        "Best candidate {} (score {:.4}, {}/{} probes ok)",
        winner, best.composite_score, best.stats.success_count, best.stats.attempt_count
    );
    if result.cancelled {
        warn!("Run was cancelled, not updating channels with {}", winner);
        return Ok(());
    }
    if args.dry_run {
        info!("Dry run: would set {} on {} channels", winner, config.channel.channel_ids.len());
        return Ok(());
    }

    let proxy_url = winner.proxy_url()?;
    let updater = ChannelUpdater::from_config(&config.channel)?;
    let updated = updater.apply(&proxy_url).await?;
    info!("Updated {} channels to use {}", updated, winner);
    Ok(())
}
