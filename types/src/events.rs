//! Messages pushed by the backend over the `/api/ws` channel.
//!
//! Two disjoint shapes share the channel: telemetry packets (see
//! [`Telemetry`]) and domain events carrying an `Event` discriminator.
//! [`ServerMessage::decode`] classifies a frame once so the rest of the
//! client can match on a closed set of variants.

use crate::stats::{Telemetry, TELEMETRY_FIELDS};
use serde::{Deserialize, Serialize};

/// Key holding the event discriminator.
pub const EVENT_KEY: &str = "Event";

/// Domain events the backend broadcasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "Event")]
pub enum SwitcherEvent {
    /// A stage switched to a scene (authoritative)
    #[serde(rename = "set-scene")]
    SetScene {
        #[serde(rename = "Stage")]
        stage: String,
        #[serde(rename = "Scene")]
        scene: String,
    },
}

impl SwitcherEvent {
    /// Event discriminators this client understands.
    pub const NAMES: &'static [&'static str] = &["set-scene"];

    pub fn set_scene(stage: impl Into<String>, scene: impl Into<String>) -> Self {
        SwitcherEvent::SetScene {
            stage: stage.into(),
            scene: scene.into(),
        }
    }

    /// Get a human-readable description of the event.
    pub fn description(&self) -> String {
        match self {
            SwitcherEvent::SetScene { stage, scene } => {
                format!("Stage {} switched to scene {}", stage, scene)
            }
        }
    }
}

/// A decoded push frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// Renderer statistics
    Telemetry(Telemetry),
    /// A recognized domain event
    Event(SwitcherEvent),
    /// An object with an `Event` discriminator this client does not know
    UnknownEvent(String),
    /// Valid JSON that matches neither shape
    Unrecognized,
}

impl ServerMessage {
    /// Decode a text frame.
    ///
    /// Invalid JSON and recognized events with missing fields are errors;
    /// unknown event names and foreign objects decode to
    /// [`ServerMessage::UnknownEvent`] and [`ServerMessage::Unrecognized`].
    /// Telemetry fields are read one by one, so an ill-typed field only
    /// loses that field.
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let Some(object) = value.as_object() else {
            return Ok(ServerMessage::Unrecognized);
        };

        // The backend never mixes the two shapes; an event frame wins
        if let Some(kind) = object.get(EVENT_KEY) {
            let name = kind.as_str().unwrap_or_default();
            if !SwitcherEvent::NAMES.contains(&name) {
                return Ok(ServerMessage::UnknownEvent(name.to_string()));
            }
            return serde_json::from_value(value).map(ServerMessage::Event);
        }

        if TELEMETRY_FIELDS.iter().any(|field| object.contains_key(*field)) {
            return Ok(ServerMessage::Telemetry(Telemetry::from_object(object)));
        }

        Ok(ServerMessage::Unrecognized)
    }

    /// Get a human-readable description of the message.
    pub fn description(&self) -> String {
        match self {
            ServerMessage::Telemetry(stats) => format!(
                "Telemetry (fps: {:?}, clients: {:?})",
                stats.fps, stats.ws_clients
            ),
            ServerMessage::Event(event) => event.description(),
            ServerMessage::UnknownEvent(name) => format!("Unknown event '{}'", name),
            ServerMessage::Unrecognized => "Unrecognized message".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_set_scene() {
        let msg =
            ServerMessage::decode(r#"{"Event":"set-scene","Stage":"projector","Scene":"cam1"}"#)
                .unwrap();
        assert_eq!(
            msg,
            ServerMessage::Event(SwitcherEvent::set_scene("projector", "cam1"))
        );
    }

    #[test]
    fn test_set_scene_serializes_like_backend() {
        let json = serde_json::to_value(SwitcherEvent::set_scene("stream", "slides")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"Event": "set-scene", "Stage": "stream", "Scene": "slides"})
        );
    }

    #[test]
    fn test_decode_stats_packet() {
        let msg = ServerMessage::decode(
            r#"{"texture_upload":211507200,"texture_upload_avg_gb":0.034,"uptime":22.3,"fps":60,"ws_clients":1,"fps_avg":59.8}"#,
        )
        .unwrap();
        let stats = match msg {
            ServerMessage::Telemetry(stats) => stats,
            other => panic!("expected telemetry, got {:?}", other),
        };
        assert_eq!(stats.fps, Some(60.0));
        assert_eq!(stats.ws_clients, Some(1));
        assert_eq!(stats.fps_avg, Some(59.8));
    }

    #[test]
    fn test_decode_partial_telemetry() {
        let msg = ServerMessage::decode(r#"{"ws_clients":3}"#).unwrap();
        assert_eq!(
            msg,
            ServerMessage::Telemetry(Telemetry {
                ws_clients: Some(3),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_decode_telemetry_with_ill_typed_field() {
        let msg = ServerMessage::decode(r#"{"fps":"n/a","ws_clients":2}"#).unwrap();
        assert_eq!(
            msg,
            ServerMessage::Telemetry(Telemetry {
                ws_clients: Some(2),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_decode_unknown_event_is_not_an_error() {
        let msg = ServerMessage::decode(r#"{"Event":"fade-to-black","Stage":"x"}"#).unwrap();
        assert_eq!(msg, ServerMessage::UnknownEvent("fade-to-black".to_string()));
    }

    #[test]
    fn test_decode_set_scene_missing_fields_is_an_error() {
        assert!(ServerMessage::decode(r#"{"Event":"set-scene","Stage":"x"}"#).is_err());
    }

    #[test]
    fn test_decode_foreign_shapes() {
        assert_eq!(
            ServerMessage::decode(r#"{"hello":"world"}"#).unwrap(),
            ServerMessage::Unrecognized
        );
        assert_eq!(
            ServerMessage::decode("[1,2,3]").unwrap(),
            ServerMessage::Unrecognized
        );
        assert!(ServerMessage::decode("not json").is_err());
    }
}
