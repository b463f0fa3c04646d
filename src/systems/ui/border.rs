use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::systems::dungeon::DungeonGenerator;

// screen border thing
// tells the user the pipeline is paused until they confirm
pub fn screen_border(
    mut contexts: EguiContexts,
    generator: Res<DungeonGenerator>,
    time: Res<Time>,
) {
    if !generator.0.phase().awaits_confirmation() {
        return;
    }

    if let Ok(ctx) = contexts.ctx_mut() {
        let screen_rect = ctx.screen_rect();
        let border_width = 2.0;

        // slow pulse
        let alpha = 0.5 + 0.5 * (time.elapsed_secs() * 3.0).sin();
        let color = egui::Color32::from_rgba_unmultiplied(230, 230, 60, (220.0 * alpha) as u8);

        egui::Area::new(egui::Id::new("screen_border"))
            .fixed_pos(egui::pos2(0.0, 0.0))
            .show(ctx, |ui| {
                let painter = ui.painter();
                painter.rect_filled(
                    egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(screen_rect.width(), border_width)),
                    0.0, color);
                painter.rect_filled(
                    egui::Rect::from_min_size(egui::pos2(0.0, screen_rect.height() - border_width), egui::vec2(screen_rect.width(), border_width)),
                    0.0, color);
                painter.rect_filled(
                    egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(border_width, screen_rect.height())),
                    0.0, color);
                painter.rect_filled(
                    egui::Rect::from_min_size(egui::pos2(screen_rect.width() - border_width, 0.0), egui::vec2(border_width, screen_rect.height())),
                    0.0, color);
            });
    }
}
