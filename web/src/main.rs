//! Heatmap Web – serves rendered contribution heatmaps over HTTP.
//!
//! Usage:
//!   heatmap-web [config.toml]                   serve on $HEATMAP_LISTEN_ADDR
//!   heatmap-web render <out.svg> [config.toml]  write one SVG and exit
//!
//! Activity data is read from the JSON file named by `$HEATMAP_DATA`;
//! without it, ten years of demo data are generated.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use heatmap_common::{config, ActivityRecord, Settings};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use heatmap_web::render::{self, RenderRequest};
use heatmap_web::{data, server};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";
const DEMO_YEARS: i32 = 10;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "heatmap_web=info,tower_http=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("render") => {
            let out = args
                .get(1)
                .context("Usage: heatmap-web render <out.svg> [config.toml]")?;
            let settings = load_settings(args.get(2))?;
            let records = load_records()?;
            let svg = render::render_svg(&settings, &records, &RenderRequest::default())?;
            std::fs::write(out, svg).with_context(|| format!("Cannot write {out}"))?;
            info!("Wrote {out}");
            Ok(())
        }
        _ => serve(load_settings(args.first())?).await,
    }
}

async fn serve(settings: Settings) -> Result<()> {
    let records = load_records()?;
    let listen_addr =
        std::env::var("HEATMAP_LISTEN_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.into());

    info!(
        "Heatmap Web starting (listen={listen_addr}, records={})",
        records.len()
    );

    // ── ctrl-c ───────────────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::Relaxed);
        info!("Shutdown signal received");
    })
    .context("Cannot set Ctrl-C handler")?;

    // ── HTTP server ──────────────────────────────────────────────────
    let state = server::AppState::new(settings, records);
    server::run(state, &listen_addr, shutdown).await?;

    info!("Heatmap Web stopped");
    Ok(())
}

/// Settings from the given path, else the default path when it exists,
/// else built-in defaults.
fn load_settings(arg: Option<&String>) -> Result<Settings> {
    let path = arg.map(PathBuf::from).or_else(|| {
        let default = PathBuf::from(Settings::default_path());
        default.exists().then_some(default)
    });
    config::load_or_default(path.as_deref()).context("Config load failed")
}

fn load_records() -> Result<Vec<ActivityRecord>> {
    let path = std::env::var_os("HEATMAP_DATA").map(PathBuf::from);
    let mut rng = StdRng::from_entropy();
    data::load_or_demo(path.as_deref(), &mut rng, Local::now().date_naive(), DEMO_YEARS)
}
