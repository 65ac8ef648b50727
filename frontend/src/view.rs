//! egui projection of the control model.

use egui::{Color32, RichText, Ui};

use crate::controls::{ControlAction, SelectorGroup, StageControls, Transition};
use crate::selection::{Bus, SelectionMap};
use crate::state::Connectivity;
use crate::telemetry::TelemetryReadouts;

const PROGRAM_RED: Color32 = Color32::from_rgb(200, 40, 40);
const PREVIEW_GREEN: Color32 = Color32::from_rgb(40, 160, 70);
const ARMED_AMBER: Color32 = Color32::from_rgb(210, 150, 30);
const BUTTON_SIZE: egui::Vec2 = egui::vec2(88.0, 48.0);

/// What the operator did in a stage section this frame.
#[derive(Debug, Default)]
pub struct StageResponse {
    pub action: Option<ControlAction>,
    /// The section was clicked and should receive keyboard shortcuts
    pub focus_requested: bool,
}

/// Fill color of an active button on `bus`.
pub fn active_color(bus: Bus) -> Color32 {
    match bus {
        Bus::Program | Bus::Aux => PROGRAM_RED,
        Bus::Preview => PREVIEW_GREEN,
    }
}

/// Logo color: white while connected, red after the connection dropped.
pub fn connectivity_color(connectivity: Connectivity, ui: &Ui) -> Color32 {
    match connectivity {
        Connectivity::Healthy => Color32::WHITE,
        Connectivity::Unhealthy => PROGRAM_RED,
        Connectivity::Unknown => ui.visuals().weak_text_color(),
    }
}

pub fn draw_readouts(ui: &mut Ui, telemetry: &TelemetryReadouts) {
    let placeholder = "-";
    ui.label(format!(
        "fps: {}",
        telemetry.fps.as_deref().unwrap_or(placeholder)
    ));
    ui.separator();
    ui.label(format!(
        "clients: {}",
        telemetry.ws_clients.as_deref().unwrap_or(placeholder)
    ));
    if let Some(avg) = &telemetry.fps_avg {
        ui.separator();
        ui.label(format!("avg fps: {}", avg));
    }
    if let Some(uptime) = &telemetry.uptime {
        ui.separator();
        ui.label(format!("up {}", uptime));
    }
}

/// Draw one stage section: its selector groups and the Cut/Auto column.
pub fn draw_stage(
    ui: &mut Ui,
    controls: &StageControls,
    selection: &SelectionMap,
    focused: bool,
) -> StageResponse {
    let mut response = StageResponse::default();

    let stroke = if focused {
        egui::Stroke::new(2.0, ui.visuals().selection.stroke.color)
    } else {
        ui.visuals().widgets.noninteractive.bg_stroke
    };

    egui::Frame::group(ui.style())
        .stroke(stroke)
        .inner_margin(egui::Margin::same(8))
        .show(ui, |ui| {
            let heading = ui.add(
                egui::Label::new(
                    RichText::new(format!("{} ({})", controls.name, controls.role.label()))
                        .strong(),
                )
                .sense(egui::Sense::click()),
            );
            if heading.clicked() {
                response.focus_requested = true;
            }

            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    for group in &controls.groups {
                        if let Some(action) = draw_group(ui, group, selection) {
                            response.action = Some(action);
                        }
                    }
                });
                ui.separator();
                if let Some(action) = draw_transition(ui, &controls.transition) {
                    response.action = Some(action);
                }
            });
        });

    if response.action.is_some() {
        response.focus_requested = true;
    }
    response
}

fn draw_group(ui: &mut Ui, group: &SelectorGroup, selection: &SelectionMap) -> Option<ControlAction> {
    let mut action = None;
    ui.horizontal_wrapped(|ui| {
        for button in &group.buttons {
            let active = selection.is_active(&button.stage, &button.scene);
            let text = RichText::new(format!("{}\n{}", button.tag, button.label));
            let mut widget = egui::Button::new(if active {
                text.color(Color32::WHITE)
            } else {
                text
            })
            .min_size(BUTTON_SIZE);
            if active {
                widget = widget.fill(active_color(group.bus));
            }
            if ui
                .add(widget)
                .on_hover_text(format!("{} → {}", button.stage, button.scene))
                .clicked()
            {
                action = Some(ControlAction::Select {
                    stage: button.stage.clone(),
                    scene: button.scene.clone(),
                });
            }
        }
    });
    action
}

fn draw_transition(ui: &mut Ui, transition: &Transition) -> Option<ControlAction> {
    let mut action = None;
    ui.vertical(|ui| {
        if ui
            .add(egui::Button::new("CUT").min_size(BUTTON_SIZE))
            .clicked()
        {
            action = Some(ControlAction::Cut);
        }

        let mut auto = egui::Button::new("AUTO").min_size(BUTTON_SIZE);
        if let Transition::Aux { auto_armed: true } = transition {
            auto = auto.fill(ARMED_AMBER);
        }
        if ui.add(auto).clicked() {
            action = Some(ControlAction::Auto);
        }
    });
    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_colors_by_bus() {
        assert_eq!(active_color(Bus::Program), active_color(Bus::Aux));
        assert_ne!(active_color(Bus::Program), active_color(Bus::Preview));
    }
}
