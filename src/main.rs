mod app;
mod layout;
mod style;
mod topology;
mod util;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::layout::LayoutStrategy;
use crate::topology::{Dataset, Session, demo_dataset, load_dataset};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Dataset JSON with `assets` and `connections`; a generated demo is used when omitted
    #[arg(long)]
    data: Option<PathBuf>,

    /// Asset to focus on startup
    #[arg(long)]
    focus: Option<String>,

    /// Initial layout strategy
    #[arg(long, value_enum, default_value_t = LayoutStrategy::Tree)]
    layout: LayoutStrategy,

    /// Print the resolved and laid out scene as JSON instead of opening a window
    #[arg(long)]
    print_scene: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .init();
}

fn open_dataset(path: Option<&PathBuf>) -> Result<Dataset> {
    match path {
        Some(path) => load_dataset(path),
        None => {
            info!("no dataset given, using the generated demo inventory");
            Ok(demo_dataset())
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut session = Session::new(open_dataset(args.data.as_ref())?);
    session.set_strategy(args.layout);
    if let Some(focus) = &args.focus {
        if session.dataset().asset(focus).is_none() {
            warn!(focus = %focus, "focus asset is not in the dataset");
        }
        session.select_focal(focus.as_str());
    }

    if args.print_scene {
        let scene = serde_json::to_string_pretty(&session.scene())
            .context("failed to serialize scene")?;
        println!("{scene}");
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Asset Topology",
        options,
        Box::new(move |cc| Ok(Box::new(app::TopologyApp::new(cc, session)))),
    )
    .map_err(|error| anyhow!("viewer failed: {error}"))
}
