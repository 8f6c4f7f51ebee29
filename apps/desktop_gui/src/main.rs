use std::{path::PathBuf, sync::Arc};

mod backend_bridge;
mod controller;
mod ui;

use anyhow::anyhow;
use clap::Parser;
use client_core::{
    config::{load_settings, normalize_server_url},
    logging::{apply_log_filter, init_logging},
};
use crossbeam_channel::bounded;
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::EcoSortApp;

#[derive(Parser, Debug)]
#[command(name = "ecosort-gui", about = "Classify waste photos and get recycling guidance")]
struct Args {
    /// Settings file (defaults to ./ecosort.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Classification backend base URL, overriding settings.
    #[arg(long)]
    server_url: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let log_filter = init_logging();
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(server_url) = args.server_url {
        settings.server_url = normalize_server_url(&server_url)?;
    }
    if let Err(err) = apply_log_filter(&log_filter, &settings.log_filter) {
        tracing::warn!("keeping startup log filter: {err:#}");
    }
    tracing::info!(server_url = %settings.server_url, "starting EcoSort desktop");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("EcoSort")
            .with_inner_size([960.0, 760.0])
            .with_min_inner_size([640.0, 520.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        "EcoSort",
        options,
        Box::new(move |cc| {
            let repaint_ctx = cc.egui_ctx.clone();
            backend_bridge::runtime::launch(
                cmd_rx,
                ui_tx,
                &settings,
                Arc::new(move || repaint_ctx.request_repaint()),
            );
            Ok(Box::new(EcoSortApp::new(cmd_tx, ui_rx, &settings)))
        }),
    )
    .map_err(|err| anyhow!("EcoSort window failed: {err}"))
}
