//! Fazantix control panel.
//!
//! Supports both WASM (served next to the switcher) and native (standalone window) modes.

#![warn(clippy::all, rust_2018_idioms)]

// ============================================================================
// WASM Entry Point
// ============================================================================

#[cfg(target_arch = "wasm32")]
fn main() {
    use fazantix_panel::{Endpoints, PanelApp};
    use wasm_bindgen::JsCast;

    // Initialize panic handler for better error messages in browser console
    console_error_panic_hook::set_once();

    // Initialize tracing for WASM
    tracing_wasm::set_as_global_default();

    let web_options = eframe::WebOptions::default();
    let endpoints = Endpoints::from_location();

    wasm_bindgen_futures::spawn_local(async move {
        let document = web_sys::window()
            .expect("No window")
            .document()
            .expect("No document");
        let canvas = document
            .get_element_by_id("fazantix_canvas")
            .expect("Failed to find fazantix_canvas")
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .expect("fazantix_canvas is not a canvas");

        eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(move |cc| Ok(Box::new(PanelApp::new(cc, endpoints)))),
            )
            .await
            .expect("Failed to start eframe");
    });
}

// ============================================================================
// Native Entry Point
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use clap::Parser;
    use tracing_subscriber::{fmt, EnvFilter};

    use fazantix_panel::config::PanelConfig;

    /// Fazantix - live video switcher control panel
    #[derive(Parser, Debug)]
    #[command(author, version, about, long_about = None)]
    pub struct Args {
        /// Switcher server root URL, e.g. http://localhost:8000
        #[arg(long, env = "FAZANTIX_SERVER_URL")]
        pub server_url: Option<String>,

        /// Milliseconds to wait before reconnecting the live channel
        #[arg(long, env = "FAZANTIX_RECONNECT_DELAY_MS")]
        pub reconnect_delay_ms: Option<u64>,

        /// Log level (trace, debug, info, warn, error)
        #[arg(long, env = "FAZANTIX_LOG_LEVEL")]
        pub log_level: Option<String>,
    }

    pub fn run() -> anyhow::Result<()> {
        let args = Args::parse();
        let config =
            PanelConfig::from_figment(args.server_url, args.reconnect_delay_ms, args.log_level)?;

        // Configured level wins, then RUST_LOG, then info
        let filter = match &config.log_level {
            Some(level) => EnvFilter::try_new(level)?,
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        };
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();

        tracing::info!("Starting Fazantix control panel for {}", config.server_url);

        // Async work is spawned onto this runtime from the UI thread
        let runtime = tokio::runtime::Runtime::new()?;
        let _guard = runtime.enter();

        fazantix_panel::run_native(config.endpoints())
            .map_err(|e| anyhow::anyhow!("control panel window failed: {}", e))
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}
