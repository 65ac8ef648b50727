//! Fazantix control panel.
//!
//! Operator UI for a live video switcher: one section of scene selectors and
//! transition controls per stage, kept in sync with the switcher over a
//! WebSocket. Runs in the browser (WASM) or as a native window.

#![warn(clippy::all, rust_2018_idioms)]

pub mod api;
pub mod app;
#[cfg(not(target_arch = "wasm32"))]
pub mod config;
pub mod controls;
pub mod keyboard;
pub mod selection;
pub mod state;
pub mod sync;
pub mod telemetry;
pub mod topology;
pub mod view;
pub mod ws;

pub use app::{Endpoints, PanelApp};

/// Open the panel in a native window.
///
/// Must be called with a tokio runtime entered; async work is spawned onto it.
#[cfg(not(target_arch = "wasm32"))]
pub fn run_native(endpoints: Endpoints) -> eframe::Result<()> {
    tracing::info!("Opening control panel for {}", endpoints.api_base_url);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title("Fazantix control panel"),
        ..Default::default()
    };

    eframe::run_native(
        "Fazantix",
        native_options,
        Box::new(move |cc| Ok(Box::new(PanelApp::new(cc, endpoints)))),
    )
}
