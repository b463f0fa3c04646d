use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::systems::dungeon::PhaseChangeEvent;
use crate::systems::dungeon::pipeline::Phase;

// fading toast shown whenever the pipeline changes phase
#[derive(Resource)]
pub struct PhaseIndicator {
    pub phase: Phase,
    pub timer: f32,
    pub duration: f32,
}

impl Default for PhaseIndicator {
    fn default() -> Self {
        Self {
            phase: Phase::Scattering,
            timer: 0.0,
            duration: 2.0,
        }
    }
}

pub fn phase_color(phase: Phase) -> egui::Color32 {
    match phase {
        Phase::Scattering => egui::Color32::from_rgb(45, 72, 116),
        Phase::AwaitConfirm1 | Phase::AwaitConfirm2 | Phase::AwaitConfirm3 => egui::Color32::from_rgb(120, 120, 40),
        Phase::Settling => egui::Color32::from_rgb(90, 90, 90),
        Phase::Selecting => egui::Color32::from_rgb(180, 60, 60),
        Phase::Triangulating | Phase::BuildingGraph => egui::Color32::from_rgb(136, 46, 217),
        Phase::Done => egui::Color32::from_rgb(60, 140, 80),
        Phase::Stalled => egui::Color32::from_rgb(200, 90, 20),
    }
}

pub fn update_phase_indicator(
    mut indicator: ResMut<PhaseIndicator>,
    mut events: EventReader<PhaseChangeEvent>,
    time: Res<Time>,
) {
    for event in events.read() {
        indicator.phase = event.0;
        indicator.timer = indicator.duration;
    }

    if indicator.timer > 0.0 {
        indicator.timer = (indicator.timer - time.delta_secs()).max(0.0);
    }
}

pub fn render_phase_indicator(
    indicator: Res<PhaseIndicator>,
    mut contexts: EguiContexts,
) {
    if indicator.timer <= 0.0 {
        return;
    }

    if let Ok(ctx) = contexts.ctx_mut() {
        let alpha = (indicator.timer / indicator.duration).clamp(0.0, 1.0);
        let bg_color = phase_color(indicator.phase);

        egui::Area::new(egui::Id::new("phase_indicator"))
            .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 60.0))
            .show(ctx, |ui| {
                let frame = egui::Frame::new()
                    .fill(egui::Color32::from_rgba_unmultiplied(
                        bg_color.r(), bg_color.g(), bg_color.b(),
                        (200.0 * alpha) as u8
                    ))
                    .stroke(egui::Stroke::new(
                        2.0,
                        egui::Color32::from_rgba_unmultiplied(255, 255, 255, (200.0 * alpha) as u8)
                    ))
                    .inner_margin(egui::Margin::symmetric(20, 10))
                    .corner_radius(egui::CornerRadius::same(8));

                frame.show(ui, |ui| {
                    ui.label(egui::RichText::new(indicator.phase.label())
                        .size(18.0)
                        .color(egui::Color32::from_rgba_unmultiplied(255, 255, 255, (255.0 * alpha) as u8))
                        .strong());
                });
            });
    }
}
