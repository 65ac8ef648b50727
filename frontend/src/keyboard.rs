//! Keyboard shortcuts for the focused stage section.

use crate::controls::{ControlAction, StageControls};

/// A recognized shortcut key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Digit key, zero-based scene index (`1` is 0, `0` is 9)
    Scene(usize),
    Cut,
    Auto,
}

const SCENE_KEYS: [(egui::Key, usize); 10] = [
    (egui::Key::Num1, 0),
    (egui::Key::Num2, 1),
    (egui::Key::Num3, 2),
    (egui::Key::Num4, 3),
    (egui::Key::Num5, 4),
    (egui::Key::Num6, 5),
    (egui::Key::Num7, 6),
    (egui::Key::Num8, 7),
    (egui::Key::Num9, 8),
    (egui::Key::Num0, 9),
];

/// First shortcut pressed this frame, ignoring keys typed into a widget.
pub fn read_shortcut(ctx: &egui::Context) -> Option<Shortcut> {
    if ctx.wants_keyboard_input() {
        return None;
    }
    ctx.input(|i| {
        if let Some((_, index)) = SCENE_KEYS.iter().find(|(key, _)| i.key_pressed(*key)) {
            return Some(Shortcut::Scene(*index));
        }
        if i.key_pressed(egui::Key::Enter) {
            return Some(Shortcut::Cut);
        }
        if i.key_pressed(egui::Key::Space) {
            return Some(Shortcut::Auto);
        }
        None
    })
}

/// Map a shortcut to the action it triggers on `controls`.
///
/// Scene keys drive the cue group: the preview bus of a program stage, or
/// the only bus of an aux stage.
pub fn action_for(shortcut: Shortcut, controls: &StageControls) -> Option<ControlAction> {
    match shortcut {
        Shortcut::Cut => Some(ControlAction::Cut),
        Shortcut::Auto => Some(ControlAction::Auto),
        Shortcut::Scene(index) => {
            let group = controls.cue_group()?;
            match group.buttons.get(index) {
                Some(button) => Some(ControlAction::Select {
                    stage: button.stage.clone(),
                    scene: button.scene.clone(),
                }),
                None => {
                    tracing::debug!(
                        "No scene {} on stage {} ({} scenes)",
                        index + 1,
                        group.stage,
                        group.buttons.len()
                    );
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::render_stage;
    use crate::topology::{ResolvedStage, Role};
    use fazantix_types::{SceneInfo, StageInfo};

    fn scenes() -> Vec<SceneInfo> {
        vec![
            SceneInfo::new("cam1", "C1", "Camera 1"),
            SceneInfo::new("cam2", "C2", "Camera 2"),
        ]
    }

    fn program() -> StageControls {
        render_stage(
            &ResolvedStage {
                info: StageInfo::new("main", ""),
                role: Role::Program,
                preview: Some(StageInfo::new("main-pv", "main")),
            },
            &scenes(),
        )
    }

    #[test]
    fn test_digit_selects_on_preview_bus() {
        assert_eq!(
            action_for(Shortcut::Scene(1), &program()),
            Some(ControlAction::Select {
                stage: "main-pv".to_string(),
                scene: "cam2".to_string()
            })
        );
    }

    #[test]
    fn test_digit_selects_on_aux_bus() {
        let aux = render_stage(
            &ResolvedStage {
                info: StageInfo::new("stream", ""),
                role: Role::Aux,
                preview: None,
            },
            &scenes(),
        );
        assert_eq!(
            action_for(Shortcut::Scene(0), &aux),
            Some(ControlAction::Select {
                stage: "stream".to_string(),
                scene: "cam1".to_string()
            })
        );
    }

    #[test]
    fn test_out_of_range_digit_is_ignored() {
        assert_eq!(action_for(Shortcut::Scene(9), &program()), None);
    }

    #[test]
    fn test_transition_keys() {
        assert_eq!(action_for(Shortcut::Cut, &program()), Some(ControlAction::Cut));
        assert_eq!(action_for(Shortcut::Auto, &program()), Some(ControlAction::Auto));
    }
}
