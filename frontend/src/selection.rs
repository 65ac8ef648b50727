//! Last server-confirmed scene per stage.
//!
//! The map is created empty when the controls are rendered. Only the live
//! sync handler writes active markers; the view and the Auto planner read
//! them.

use std::collections::HashMap;

/// Which selector group a stage's buttons are drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bus {
    Program,
    Preview,
    Aux,
}

/// Errors applying a confirmed selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("no buttons rendered for stage '{0}'")]
    UnknownStage(String),
    #[error("no button for scene '{scene}' on stage '{stage}'")]
    UnknownScene { stage: String, scene: String },
}

#[derive(Debug, Clone)]
struct StageSelection {
    bus: Bus,
    scenes: Vec<String>,
    active: Option<String>,
}

/// Per-stage selection state keyed by stage name.
#[derive(Debug, Clone, Default)]
pub struct SelectionMap {
    stages: HashMap<String, StageSelection>,
}

impl SelectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the buttons rendered for a stage. Nothing is active yet.
    pub fn register(
        &mut self,
        stage: impl Into<String>,
        bus: Bus,
        scenes: impl IntoIterator<Item = impl Into<String>>,
    ) {
        self.stages.insert(
            stage.into(),
            StageSelection {
                bus,
                scenes: scenes.into_iter().map(Into::into).collect(),
                active: None,
            },
        );
    }

    /// Active scene of a stage, if the server confirmed one.
    pub fn active(&self, stage: &str) -> Option<&str> {
        self.stages.get(stage)?.active.as_deref()
    }

    pub fn is_active(&self, stage: &str, scene: &str) -> bool {
        self.active(stage) == Some(scene)
    }

    pub fn bus(&self, stage: &str) -> Option<Bus> {
        self.stages.get(stage).map(|s| s.bus)
    }

    /// Clear the marker of `stage`, then mark `scene` active.
    ///
    /// The clear step always happens. When no button matches, the stage is
    /// left without an active marker and an error is returned.
    pub(crate) fn apply_set_scene(&mut self, stage: &str, scene: &str) -> Result<(), SelectionError> {
        let Some(selection) = self.stages.get_mut(stage) else {
            return Err(SelectionError::UnknownStage(stage.to_string()));
        };
        selection.active = None;

        if !selection.scenes.iter().any(|code| code == scene) {
            return Err(SelectionError::UnknownScene {
                stage: stage.to_string(),
                scene: scene.to_string(),
            });
        }
        selection.active = Some(scene.to_string());
        Ok(())
    }
}
