//! Renderer statistics shown in the header.

use fazantix_types::Telemetry;

/// Round fps to one decimal for display. Whole numbers print without a
/// fractional part.
pub fn format_fps(fps: f64) -> String {
    let rounded = (fps * 10.0).round() / 10.0;
    format!("{}", rounded)
}

/// Format seconds of uptime as `1h02m03s`.
pub fn format_uptime(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}h{:02}m{:02}s", h, m, s)
    } else if m > 0 {
        format!("{}m{:02}s", m, s)
    } else {
        format!("{}s", s)
    }
}

/// Last displayed value of each read-out. `None` until first received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TelemetryReadouts {
    pub fps: Option<String>,
    pub ws_clients: Option<String>,
    pub fps_avg: Option<String>,
    pub uptime: Option<String>,
}

impl TelemetryReadouts {
    /// Update the read-outs present in `stats`; absent fields keep their
    /// previous value.
    pub(crate) fn apply(&mut self, stats: &Telemetry) {
        if let Some(fps) = stats.fps {
            self.fps = Some(format_fps(fps));
        }
        if let Some(clients) = stats.ws_clients {
            self.ws_clients = Some(clients.to_string());
        }
        if let Some(avg) = stats.fps_avg {
            self.fps_avg = Some(format_fps(avg));
        }
        if let Some(uptime) = stats.uptime {
            self.uptime = Some(format_uptime(uptime));
        }
    }
}
