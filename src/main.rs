use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;

use showreel::catalog::showcase_catalog;
use showreel::showcase::{
    MediaState, MemoryPlayer, MemoryPresenter, PlaybackController, Player, Showcase, ShowcaseConfig,
};

#[derive(Parser)]
#[command(name = "showreel", version, about = "Showcase playback controller and generation proxy")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the generation proxy (needs GEMINI_API_KEY)
    #[cfg(feature = "proxy")]
    Serve {
        /// Address to listen on
        #[arg(long)]
        bind: Option<String>,
        /// Upstream model name
        #[arg(long)]
        model: Option<String>,
        /// Upstream timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Number of worker threads
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Print the showcase catalog as JSON
    Catalog,
    /// Drive the showcase with simulated players and log what happens
    Demo {
        /// Stop after this many reels have finished
        #[arg(long, default_value_t = 4)]
        cycles: usize,
        /// Simulated length of every reel in seconds
        #[arg(long, default_value_t = 3.0)]
        reel_secs: f64,
        /// Settle delay in milliseconds
        #[arg(long, default_value_t = 500)]
        settle_ms: u64,
        /// Playback tick in milliseconds
        #[arg(long, default_value_t = 100)]
        tick_ms: u64,
    },
    /// Rewrite rough notes into a production brief through a running proxy
    #[cfg(feature = "proxy")]
    Enhance {
        /// Proxy endpoint to call
        #[arg(long, default_value = "http://127.0.0.1:3000/generate")]
        endpoint: String,
        /// Request timeout in milliseconds
        #[arg(long, default_value_t = 30000)]
        timeout_ms: u64,
        /// The notes to rewrite
        #[arg(required = true)]
        notes: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        #[cfg(feature = "proxy")]
        Command::Serve {
            bind,
            model,
            timeout_ms,
            workers,
        } => serve(bind, model, timeout_ms, workers),
        Command::Catalog => {
            println!("{}", serde_json::to_string_pretty(&showcase_catalog())?);
            Ok(())
        }
        Command::Demo {
            cycles,
            reel_secs,
            settle_ms,
            tick_ms,
        } => {
            let rt = tokio::runtime::Runtime::new().context("failed to start runtime")?;
            rt.block_on(demo(cycles, reel_secs, settle_ms, tick_ms))
        }
        #[cfg(feature = "proxy")]
        Command::Enhance {
            endpoint,
            timeout_ms,
            notes,
        } => {
            let client = showreel::proxy::ProxyClient::new(&endpoint, timeout_ms)?;
            match showreel::brief::enhance(&client, &notes.join(" ")) {
                Some(brief) => println!("{}", brief),
                None => eprintln!(
                    "notes must be at least {} characters",
                    showreel::brief::MIN_NOTES_LEN
                ),
            }
            Ok(())
        }
    }
}

#[cfg(feature = "proxy")]
fn serve(
    bind: Option<String>,
    model: Option<String>,
    timeout_ms: Option<u64>,
    workers: Option<usize>,
) -> anyhow::Result<()> {
    use showreel::proxy::{GeminiClient, ProxyConfig, ProxyServer};

    let mut cfg = ProxyConfig::from_env()?;
    if let Some(bind) = bind {
        cfg.bind = bind;
    }
    if let Some(model) = model {
        cfg.model = model;
    }
    if let Some(timeout_ms) = timeout_ms {
        cfg.timeout_ms = timeout_ms;
    }
    if let Some(workers) = workers {
        cfg.workers = workers;
    }
    cfg.validate()?;

    let upstream = GeminiClient::new(&cfg)?;
    ProxyServer::bind(&cfg, upstream)?.run()?;
    Ok(())
}

async fn demo(cycles: usize, reel_secs: f64, settle_ms: u64, tick_ms: u64) -> anyhow::Result<()> {
    let items = showcase_catalog();
    let players: Vec<MemoryPlayer> = items.iter().map(|_| MemoryPlayer::new(reel_secs)).collect();
    let config = ShowcaseConfig {
        settle_delay: Duration::from_millis(settle_ms),
        ..Default::default()
    };
    let controller = PlaybackController::mount(
        items.clone(),
        players.clone(),
        MemoryPresenter::new(),
        config,
        tokio::time::Instant::now(),
    )?;
    let show = Showcase::spawn(controller);

    let step = Duration::from_millis(tick_ms.max(1));
    let mut ticker = tokio::time::interval(step);
    let mut finished = 0;
    let mut last_active = None;
    while finished < cycles {
        ticker.tick().await;
        for (i, player) in players.iter().enumerate() {
            if player.state() != MediaState::Playing {
                continue;
            }
            if last_active != Some(i) {
                info!("demo: now playing #{} {} ({})", i, items[i].title, items[i].category);
                last_active = Some(i);
            }
            let ended = player.advance(step.as_secs_f64());
            show.progress(i).await?;
            if ended {
                show.ended(i).await?;
                finished += 1;
            }
        }
    }

    let snap = show.close().await?;
    info!(
        "demo: stopped after {} reels, active #{}, playing {:?}",
        finished,
        snap.active_index,
        snap.playing()
    );
    Ok(())
}
