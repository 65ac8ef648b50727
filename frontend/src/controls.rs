//! Control model for one stage section.
//!
//! [`render_stage`] builds the selector groups and transition controls for a
//! resolved stage. Operator intent comes back as a [`ControlAction`], which
//! is planned into switch requests against the confirmed selection and sent
//! through a [`SwitchGateway`].

use fazantix_types::SceneInfo;

use crate::api::SwitchGateway;
use crate::selection::{Bus, SelectionMap};
use crate::topology::{ResolvedStage, Role};

/// One scene selector button, keyed by `(stage, scene)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneButton {
    pub stage: String,
    pub scene: String,
    pub tag: String,
    pub label: String,
}

/// A row of scene buttons driving a single stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorGroup {
    pub stage: String,
    pub bus: Bus,
    pub buttons: Vec<SceneButton>,
}

impl SelectorGroup {
    fn new(stage: &str, bus: Bus, scenes: &[SceneInfo]) -> Self {
        Self {
            stage: stage.to_string(),
            bus,
            buttons: scenes
                .iter()
                .map(|scene| SceneButton {
                    stage: stage.to_string(),
                    scene: scene.code.clone(),
                    tag: scene.tag.clone(),
                    label: scene.label.clone(),
                })
                .collect(),
        }
    }

    pub fn scene_codes(&self) -> impl Iterator<Item = &str> {
        self.buttons.iter().map(|b| b.scene.as_str())
    }
}

/// Cut/Auto controls of a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Program stage with its preview (mix/effects bank)
    MixEffect { program: String, preview: String },
    /// Standalone stage. Auto only toggles its visual state.
    Aux { auto_armed: bool },
}

/// Operator intent for a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlAction {
    Select { stage: String, scene: String },
    Cut,
    Auto,
}

/// A single outbound switch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchRequest {
    pub stage: String,
    pub scene: String,
}

impl SwitchRequest {
    pub fn new(stage: impl Into<String>, scene: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            scene: scene.into(),
        }
    }
}

/// Errors planning switch requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("stage '{0}' has no confirmed active scene")]
    NoActiveScene(String),
    #[error("stage '{stage}' has no button for scene '{scene}'")]
    UnknownButton { stage: String, scene: String },
}

/// Rendered controls of one stage section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageControls {
    pub name: String,
    pub role: Role,
    /// Program (or aux) group first, preview group second
    pub groups: Vec<SelectorGroup>,
    pub transition: Transition,
}

/// Build the controls for a resolved stage.
pub fn render_stage(stage: &ResolvedStage, scenes: &[SceneInfo]) -> StageControls {
    let name = stage.name();
    let (groups, transition) = match (stage.role, stage.preview_name()) {
        (Role::Program, Some(preview)) => {
            tracing::debug!("Rendering program stage {} with preview {}", name, preview);
            (
                vec![
                    SelectorGroup::new(name, Bus::Program, scenes),
                    SelectorGroup::new(preview, Bus::Preview, scenes),
                ],
                Transition::MixEffect {
                    program: name.to_string(),
                    preview: preview.to_string(),
                },
            )
        }
        _ => {
            tracing::debug!("Rendering aux stage {}", name);
            (
                vec![SelectorGroup::new(name, Bus::Aux, scenes)],
                Transition::Aux { auto_armed: true },
            )
        }
    };

    StageControls {
        name: name.to_string(),
        role: stage.role,
        groups,
        transition,
    }
}

impl StageControls {
    /// Register every selector group of this stage in the selection map.
    pub fn register(&self, selection: &mut SelectionMap) {
        for group in &self.groups {
            selection.register(group.stage.clone(), group.bus, group.scene_codes());
        }
    }

    /// Group the keyboard drives: the preview bus of a program stage,
    /// otherwise the only group.
    pub fn cue_group(&self) -> Option<&SelectorGroup> {
        self.groups.last()
    }

    /// Turn an action into switch requests.
    ///
    /// Auto on a program stage is a cross-swap: the preview's scene goes to
    /// the program stage and the program's scene goes to the preview stage.
    pub fn plan(
        &mut self,
        action: &ControlAction,
        selection: &SelectionMap,
    ) -> Result<Vec<SwitchRequest>, PlanError> {
        match action {
            ControlAction::Select { stage, scene } => {
                let known = self
                    .groups
                    .iter()
                    .filter(|g| &g.stage == stage)
                    .any(|g| g.scene_codes().any(|code| code == scene));
                if !known {
                    return Err(PlanError::UnknownButton {
                        stage: stage.clone(),
                        scene: scene.clone(),
                    });
                }
                Ok(vec![SwitchRequest::new(stage, scene)])
            }
            ControlAction::Cut => {
                tracing::debug!("Cut on stage {} has no client-side action", self.name);
                Ok(Vec::new())
            }
            ControlAction::Auto => match &mut self.transition {
                Transition::MixEffect { program, preview } => {
                    let on_program = selection
                        .active(program)
                        .ok_or_else(|| PlanError::NoActiveScene(program.clone()))?;
                    let on_preview = selection
                        .active(preview)
                        .ok_or_else(|| PlanError::NoActiveScene(preview.clone()))?;
                    Ok(vec![
                        SwitchRequest::new(program.as_str(), on_preview),
                        SwitchRequest::new(preview.as_str(), on_program),
                    ])
                }
                Transition::Aux { auto_armed } => {
                    *auto_armed = !*auto_armed;
                    Ok(Vec::new())
                }
            },
        }
    }

    /// Send planned requests. Fire-and-forget.
    pub fn dispatch(requests: &[SwitchRequest], gateway: &dyn SwitchGateway) {
        for request in requests {
            gateway.switch_scene(&request.stage, &request.scene);
        }
    }

    /// Plan and dispatch an action. Planning errors are logged, never returned.
    pub fn apply(
        &mut self,
        action: &ControlAction,
        selection: &SelectionMap,
        gateway: &dyn SwitchGateway,
    ) {
        match self.plan(action, selection) {
            Ok(requests) => Self::dispatch(&requests, gateway),
            Err(e) => tracing::error!("Ignoring {:?} on stage {}: {}", action, self.name, e),
        }
    }
}
