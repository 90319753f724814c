//! Application entry point for the procedural tree viewer.
//!
//! This binary sets up logging and eframe/egui, and delegates all
//! interactive logic and rendering to [`Viewer`] from the `viewer` module.

mod config;
mod layout;
mod palette;
mod viewer;

use config::ViewConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};
use viewer::Viewer;

/// Installs a stderr fmt layer filtered by `RUST_LOG`, `info` by default.
fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// Starts the native eframe application titled `"Procedural Tree"`.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop.
fn main() -> eframe::Result<()> {
    setup_logging();

    let viewer = match Viewer::new(ViewConfig::default()) {
        Ok(viewer) => viewer,
        Err(e) => {
            tracing::error!(%e, "invalid viewer configuration");
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Procedural Tree",
        options,
        Box::new(|_cc| Ok(Box::new(viewer))),
    )
}
