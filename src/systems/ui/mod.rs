use bevy::prelude::*;
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin}; // fps
use bevy_egui::{egui, EguiContexts, EguiPlugin, EguiPrimaryContextPass};

use crate::systems::dungeon::{
    ConfirmRequested, DungeonGenerator, GenerationParams, LayerVisibility, RegenerateEvent, Seed,
};
use crate::systems::dungeon::graph::total_weight;
use crate::systems::dungeon::pipeline::Phase;
use crate::systems::grid::GridConfig;

pub mod indicator;
pub mod border;

// re-export the main items that other modules need
pub use indicator::{PhaseIndicator, update_phase_indicator, render_phase_indicator, phase_color};
pub use border::screen_border;

pub struct UIPlugin;

impl Plugin for UIPlugin {
    fn build(&self, app: &mut App) {
        assert!(app.is_plugin_added::<EguiPlugin>());
        app
            .insert_resource(PhaseIndicator::default())
            .add_systems(Update, (key_input, update_phase_indicator))
            .add_systems(EguiPrimaryContextPass, (ui_main, fps, screen_border, render_phase_indicator)); // UI rendering here
    }
}

fn key_input(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    mut confirm: ResMut<ConfirmRequested>,
    mut regen_events: EventWriter<RegenerateEvent>,
) {
    // stands in for "press enter to continue"
    if keyboard_input.any_just_pressed([KeyCode::Space, KeyCode::Enter]) {
        confirm.0 = true;
    }

    if keyboard_input.just_pressed(KeyCode::KeyR) {
        regen_events.write(RegenerateEvent { seed: rand::random() });
    }
}

fn ui_main(
    mut contexts: EguiContexts,
    current_seed: Res<Seed>,
    mut params: ResMut<GenerationParams>,
    mut regen_events: EventWriter<RegenerateEvent>,
    mut confirm: ResMut<ConfirmRequested>,
    mut visibility: ResMut<LayerVisibility>,
    mut grid: ResMut<GridConfig>,
    generator: Res<DungeonGenerator>,
) {
    if let Ok(ctx) = contexts.ctx_mut() {
        egui::SidePanel::left("config_panel")
            .default_width(200.0)
            .min_width(250.0)
            .max_width(400.0)
            .resizable(true)
            .show(ctx, |ui| {
                let state = generator.0.state();
                let phase = generator.0.phase();

                // camera
                ui.label("Camera: ");
                ui.label("WASD - Move");
                ui.label("Scroll - Zoom");
                ui.label("MMB - Rotate");

                ui.separator();

                // pipeline status
                ui.label("Phase:");
                ui.horizontal(|ui| {
                    let frame = egui::Frame::new()
                        .fill(phase_color(phase))
                        .inner_margin(egui::Margin::symmetric(4, 1))
                        .corner_radius(egui::CornerRadius::same(3));

                    frame.show(ui, |ui| {
                        ui.label(egui::RichText::new(phase.label())
                            .size(12.0)
                            .color(egui::Color32::WHITE)
                            .strong());
                    });

                    if phase.awaits_confirmation() {
                        ui.label("(SPACE to continue)");
                    }
                });

                ui.label(format!("Rooms: {}", state.rooms.len()));
                ui.label(format!("Main rooms: {}", state.selected.len()));
                if let Some(triangulation) = &state.triangulation {
                    ui.label(format!("Triangles: {}", triangulation.triangle_count()));
                }
                if let Some(corridors) = &state.spanning_tree {
                    ui.label(format!("Corridors: {} (weight {:.0})", corridors.len(), total_weight(corridors)));
                }
                if phase == Phase::Settling {
                    let moving = state.rooms.iter().filter(|room| !room.sleeping).count();
                    ui.label(format!("Still moving: {} (tick {})", moving, state.settle_ticks));
                }

                if ui.add_enabled(phase.awaits_confirmation(), egui::Button::new("Continue")).clicked() {
                    confirm.0 = true;
                }

                ui.separator();

                // visibility controls
                ui.label("Layer Visibility:");
                ui.checkbox(&mut visibility.rooms, "Rooms");
                ui.checkbox(&mut visibility.unselected, "Unselected rooms");
                ui.checkbox(&mut visibility.edges, "Triangulation / corridors");
                ui.checkbox(&mut grid.enabled, "Grid");

                ui.separator();

                ui.label("Generation Parameters:");
                ui.label("(applied on regenerate)");

                // seed
                egui::CollapsingHeader::new("Seed")
                    .default_open(true)
                    .show(ui, |ui| {
                    ui.label(format!("Current: {}", current_seed.0));
                    ui.horizontal(|ui| {
                        if ui.button("Regenerate").clicked() {
                            regen_events.write(RegenerateEvent { seed: rand::random() });
                        }
                        if ui.button("Restart").on_hover_text("Same seed, current parameters").clicked() {
                            regen_events.write(RegenerateEvent { seed: current_seed.0 });
                        }
                    });
                });

                // scatter parameters
                egui::CollapsingHeader::new("Scatter")
                    .default_open(true)
                    .show(ui, |ui| {
                    ui.add(egui::Slider::new(&mut params.room_count_threshold, 3..=200)
                        .text("Room Count"))
                        .on_hover_text("Scattering stops once the room count exceeds this.");
                    ui.add(egui::Slider::new(&mut params.scatter_radius, 20.0..=300.0)
                        .text("Scatter Radius"))
                        .on_hover_text("Rooms are dropped inside a disc of this radius.");

                    let max_limit = params.room_size_max.saturating_sub(1).max(2);
                    ui.add(egui::Slider::new(&mut params.room_size_min, 1..=max_limit)
                        .text("Min Size"))
                        .on_hover_text("Lower bound of the raw size draw, before snapping and doubling.");
                    let min_limit = params.room_size_min + 1;
                    ui.add(egui::Slider::new(&mut params.room_size_max, min_limit..=64)
                        .text("Max Size"))
                        .on_hover_text("Upper bound (exclusive) of the raw size draw.");
                });

                // selection
                egui::CollapsingHeader::new("Selection")
                    .default_open(true)
                    .show(ui, |ui| {
                    ui.add(egui::Slider::new(&mut params.min_room_area, 256.0..=10000.0)
                        .text("Min Room Area"))
                        .on_hover_text("Rooms larger than this become main rooms.");
                    ui.checkbox(&mut params.incremental_selection, "One room per tick");
                });

                // pipeline
                egui::CollapsingHeader::new("Pipeline")
                    .default_open(false)
                    .show(ui, |ui| {
                    ui.checkbox(&mut params.interactive, "Pause between phases");
                    ui.add(egui::Slider::new(&mut params.sleep_time_threshold, 0.1..=5.0)
                        .text("Sleep Time (s)"))
                        .on_hover_text("How long a room must stay still before it counts as settled.");

                    let mut bounded = params.max_settle_ticks.is_some();
                    if ui.checkbox(&mut bounded, "Settle tick limit").changed() {
                        params.max_settle_ticks = bounded.then_some(crate::config::MAX_SETTLE_TICKS);
                    }
                    if let Some(limit) = params.max_settle_ticks.as_mut() {
                        ui.add(egui::Slider::new(limit, 60..=36000).text("Max Ticks"));
                    }
                });
            });
    }
}

fn fps(
    mut contexts: EguiContexts,
    diagnostics: Res<DiagnosticsStore>,
) {
    if let Ok(ctx) = contexts.ctx_mut() {
        egui::Area::new(egui::Id::new("fps_counter"))
            .anchor(egui::Align2::RIGHT_TOP, egui::Vec2::new(-10.0, 10.0))
            .show(ctx, |ui| {
                ui.with_layout(egui::Layout::top_down(egui::Align::RIGHT), |ui| {
                    if let Some(fps_diagnostic) = diagnostics.get(&FrameTimeDiagnosticsPlugin::FPS) {
                        if let Some(fps) = fps_diagnostic.smoothed() {
                            ui.label(egui::RichText::new(format!("{:.0}", fps))
                                .size(26.0)
                                .color(egui::Color32::WHITE));
                        }
                    }
                });
            });
    }
}
