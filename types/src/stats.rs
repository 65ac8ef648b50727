//! Telemetry packets periodically pushed by the backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field names that mark a pushed JSON object as a telemetry packet.
pub const TELEMETRY_FIELDS: &[&str] = &[
    "fps",
    "ws_clients",
    "fps_avg",
    "uptime",
    "texture_upload",
    "texture_upload_avg_gb",
];

/// Renderer statistics. Every field is optional; a packet may carry any subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// Frames rendered during the last second
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    /// Number of connected websocket clients
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ws_clients: Option<u64>,
    /// Moving average of fps over the last few seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps_avg: Option<f64>,
    /// Seconds since the renderer started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<f64>,
    /// Total bytes uploaded to textures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture_upload: Option<u64>,
    /// Average texture upload rate in GiB/s
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture_upload_avg_gb: Option<f64>,
}

impl Telemetry {
    /// Read each known field on its own. A field with an unexpected type is
    /// dropped without affecting the others.
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let float = |key: &str| object.get(key).and_then(Value::as_f64);
        let count = |key: &str| object.get(key).and_then(Value::as_u64);
        Self {
            fps: float("fps"),
            ws_clients: count("ws_clients"),
            fps_avg: float("fps_avg"),
            uptime: float("uptime"),
            texture_upload: count("texture_upload"),
            texture_upload_avg_gb: float("texture_upload_avg_gb"),
        }
    }
}
