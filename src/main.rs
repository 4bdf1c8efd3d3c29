//! Chart Gallery - interactive gallery of common chart types
//!
//! Generates seeded sample datasets and shows each chart type with the data
//! behind it.

mod charts;
mod config;
mod data;
mod gui;
mod logging;

use anyhow::Context;
use clap::Parser;
use config::{AppConfig, CliArgs};
use data::SampleData;
use eframe::egui;
use gui::GalleryApp;

fn main() -> anyhow::Result<()> {
    logging::init()?;

    let config = AppConfig::from_args(CliArgs::parse()).context("invalid configuration")?;
    tracing::info!(
        seed = config.seed,
        chart = %config.initial_chart,
        "starting chart gallery"
    );

    let data = SampleData::cached(config.seed).context("failed to generate sample data")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([900.0, 600.0])
            .with_title("Plotly图表示例大全"),
        ..Default::default()
    };

    eframe::run_native(
        "Chart Gallery",
        options,
        Box::new(move |cc| Ok(Box::new(GalleryApp::new(cc, &config, data)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to start the window: {}", e))
}
