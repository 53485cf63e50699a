mod controller;
mod ui;

use anyhow::{anyhow, Context, Result};
use client_core::{load_settings, FormController};
use eframe::egui;

use crate::ui::{CalculatorApp, FormState};

const APP_TITLE: &str = "Calculator";

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build backend runtime")?;
    let controller = FormController::from_settings(&settings, runtime.handle().clone())
        .context("failed to set up calculator client")?;
    let form = controller.attach(FormState::default());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([420.0, 280.0])
            .with_min_inner_size([360.0, 240.0]),
        ..Default::default()
    };
    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |_cc| Ok(Box::new(CalculatorApp::new(runtime, form)))),
    )
    .map_err(|err| anyhow!("calculator window failed: {err}"))
}
