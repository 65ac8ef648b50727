//! Main application structure.

use std::time::Duration;

use egui::{CentralPanel, Color32, Context, TopBottomPanel};
use fazantix_types::{ConfigResponse, ServerMessage};

use crate::api::{ApiClient, SwitchGateway};
use crate::controls::{render_stage, ControlAction, StageControls};
use crate::keyboard;
use crate::selection::SelectionMap;
use crate::state::{AppMessage, AppStateChannels, ConnectionState, Connectivity};
use crate::sync::apply_server_message;
use crate::telemetry::TelemetryReadouts;
use crate::topology::Topology;
use crate::view;
use crate::ws::LiveSyncClient;

// Cross-platform task spawning
#[cfg(target_arch = "wasm32")]
pub(crate) fn spawn_task<F>(future: F)
where
    F: std::future::Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn spawn_task<F>(future: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::spawn(future);
}

/// Where the panel reaches the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// REST root, e.g. `http://localhost:8000/api`
    pub api_base_url: String,
    /// Push channel, e.g. `ws://localhost:8000/api/ws`
    pub ws_url: String,
    pub reconnect_delay: Duration,
}

impl Endpoints {
    /// Endpoints for a server root URL such as `http://localhost:8000`.
    pub fn for_server(server_url: &str, reconnect_delay: Duration) -> Self {
        Self {
            api_base_url: ApiClient::for_server(server_url).base_url().to_string(),
            ws_url: crate::ws::websocket_url(server_url),
            reconnect_delay,
        }
    }

    /// Endpoints relative to the page the panel is served from.
    #[cfg(target_arch = "wasm32")]
    pub fn from_location() -> Self {
        let server_url = web_sys::window()
            .and_then(|window| {
                let location = window.location();
                let protocol = location.protocol().ok()?;
                let host = location.host().ok()?;
                Some(format!("{}//{}", protocol, host))
            })
            .unwrap_or_else(|| format!("http://localhost:{}", fazantix_types::DEFAULT_PORT));
        tracing::info!("Server URL from page location: {}", server_url);
        Self::for_server(&server_url, crate::sync::DEFAULT_RECONNECT_DELAY)
    }
}

/// Initial config load progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPhase {
    Loading,
    Failed(String),
    Ready,
}

/// Everything the operator sees, independent of egui.
#[derive(Debug, Default)]
pub struct PanelState {
    pub stages: Vec<StageControls>,
    pub orphans: Vec<String>,
    pub selection: SelectionMap,
    pub telemetry: TelemetryReadouts,
    pub connection: Option<ConnectionState>,
    pub connectivity: Connectivity,
    pub focused: Option<usize>,
}

impl PanelState {
    /// Resolve the topology and render one control section per stage.
    pub fn install_config(&mut self, config: &ConfigResponse) {
        let topology = Topology::build(&config.stages);
        self.orphans = topology
            .orphans()
            .iter()
            .map(|stage| stage.name.clone())
            .collect();

        self.selection = SelectionMap::new();
        self.stages = topology
            .stages()
            .iter()
            .map(|stage| render_stage(stage, &config.scenes))
            .collect();
        for controls in &self.stages {
            controls.register(&mut self.selection);
        }
        self.focused = None;
    }

    /// Apply a pushed message. Inconsistencies are logged.
    pub fn handle_server(&mut self, message: &ServerMessage) {
        if let Err(e) = apply_server_message(message, &mut self.selection, &mut self.telemetry) {
            tracing::error!("Could not apply {}: {}", message.description(), e);
        }
    }

    pub fn handle_connection(&mut self, state: ConnectionState) {
        self.connectivity = self.connectivity.after(state);
        self.connection = Some(state);
    }

    /// Plan and send an operator action on stage section `index`.
    pub fn act(&mut self, index: usize, action: &ControlAction, gateway: &dyn SwitchGateway) {
        let Some(controls) = self.stages.get_mut(index) else {
            tracing::warn!("Action {:?} for unknown stage section {}", action, index);
            return;
        };
        controls.apply(action, &self.selection, gateway);
    }
}

/// The switcher control panel.
pub struct PanelApp {
    /// API client for backend communication
    api: ApiClient,
    endpoints: Endpoints,
    /// Channel-based state management
    channels: AppStateChannels,
    phase: LoadPhase,
    needs_load: bool,
    state: PanelState,
    /// Live sync client, started once the controls exist
    sync: Option<LiveSyncClient>,
}

impl PanelApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, endpoints: Endpoints) -> Self {
        tracing::info!(
            "Panel using API {} and push channel {}",
            endpoints.api_base_url,
            endpoints.ws_url
        );
        Self {
            api: ApiClient::new(endpoints.api_base_url.clone()),
            endpoints,
            channels: AppStateChannels::new(),
            phase: LoadPhase::Loading,
            needs_load: true,
            state: PanelState::default(),
            sync: None,
        }
    }

    /// Fetch the stage and scene lists. Failures are not retried automatically.
    fn load_config(&mut self, ctx: &Context) {
        tracing::info!("Loading switcher config...");
        self.phase = LoadPhase::Loading;

        let api = self.api.clone();
        let tx = self.channels.sender();
        let ctx = ctx.clone();

        spawn_task(async move {
            match api.get_config().await {
                Ok(config) => {
                    let _ = tx.send(AppMessage::ConfigLoaded(config));
                }
                Err(e) => {
                    tracing::error!("Failed to load config: {}", e);
                    let _ = tx.send(AppMessage::ConfigError(e.to_string()));
                }
            }
            ctx.request_repaint();
        });
    }

    /// Start the push channel. Only called after every stage is rendered.
    fn start_live_sync(&mut self, ctx: &Context) {
        if self.sync.is_some() {
            return;
        }
        let mut client =
            LiveSyncClient::new(self.endpoints.ws_url.clone(), self.endpoints.reconnect_delay);
        let ctx = ctx.clone();
        client.start(
            self.channels.sender(),
            std::sync::Arc::new(move || ctx.request_repaint()),
        );
        self.sync = Some(client);
    }

    fn process_messages(&mut self, ctx: &Context) {
        while let Ok(message) = self.channels.rx.try_recv() {
            match message {
                AppMessage::ConfigLoaded(config) => {
                    self.state.install_config(&config);
                    self.phase = LoadPhase::Ready;
                    self.start_live_sync(ctx);
                }
                AppMessage::ConfigError(error) => {
                    self.phase = LoadPhase::Failed(error);
                }
                AppMessage::Server(message) => {
                    self.state.handle_server(&message);
                }
                AppMessage::ConnectionStateChanged(state) => {
                    tracing::info!("Connection state changed: {:?}", state);
                    self.state.handle_connection(state);
                }
            }
        }
    }

    fn render_header(&self, ctx: &Context) {
        TopBottomPanel::top("header")
            .frame(
                egui::Frame::side_top_panel(&ctx.style())
                    .inner_margin(egui::Margin::symmetric(8, 4)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let logo_color = view::connectivity_color(self.state.connectivity, ui);
                    ui.label(egui::RichText::new("◆ fazantix").heading().color(logo_color))
                        .on_hover_text(
                            self.state
                                .connection
                                .map(|s| s.description())
                                .unwrap_or("Not connected"),
                        );
                    ui.separator();
                    view::draw_readouts(ui, &self.state.telemetry);
                });
            });
    }

    fn render_body(&mut self, ctx: &Context) {
        let mut retry = false;
        let mut pending: Vec<(usize, ControlAction)> = Vec::new();

        CentralPanel::default().show(ctx, |ui| match &self.phase {
            LoadPhase::Loading => {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.add(egui::Spinner::new().size(32.0));
                    ui.label("Loading stages...");
                });
            }
            LoadPhase::Failed(error) => {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.label(
                        egui::RichText::new("Could not load the switcher config")
                            .heading()
                            .color(Color32::from_rgb(220, 60, 60)),
                    );
                    ui.label(error);
                    ui.add_space(8.0);
                    retry = ui.button("Retry").clicked();
                });
            }
            LoadPhase::Ready => {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for (index, controls) in self.state.stages.iter().enumerate() {
                        let focused = self.state.focused == Some(index);
                        let response =
                            view::draw_stage(ui, controls, &self.state.selection, focused);
                        if response.focus_requested {
                            self.state.focused = Some(index);
                        }
                        if let Some(action) = response.action {
                            pending.push((index, action));
                        }
                    }
                    if !self.state.orphans.is_empty() {
                        ui.weak(format!(
                            "Preview stages without a program stage: {}",
                            self.state.orphans.join(", ")
                        ));
                    }
                });
            }
        });

        if let Some(index) = self.state.focused {
            if let Some(controls) = self.state.stages.get(index) {
                if let Some(action) = keyboard::read_shortcut(ctx)
                    .and_then(|shortcut| keyboard::action_for(shortcut, controls))
                {
                    pending.push((index, action));
                }
            }
        }

        for (index, action) in pending {
            self.state.act(index, &action, &self.api);
        }
        if retry {
            self.needs_load = true;
        }
    }
}

impl eframe::App for PanelApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.process_messages(ctx);

        if self.needs_load {
            self.needs_load = false;
            self.load_config(ctx);
        }

        self.render_header(ctx);
        self.render_body(ctx);
    }
}

impl Drop for PanelApp {
    fn drop(&mut self) {
        if let Some(mut client) = self.sync.take() {
            client.stop();
        }
    }
}
