use bevy::prelude::*;
use bevy::gizmos::config::{GizmoConfigGroup, GizmoConfigStore};

use crate::config::GRID_SNAP;

// reference grid under the layout, minor lines match the room snapping grid
// so it is easy to see that rooms land on grid cells
pub struct GridPlugin;

#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct GridGizmoGroup;

impl Plugin for GridPlugin {
    fn build(&self, app: &mut App) {
        app
            .insert_resource(GridConfig::default())
            .init_gizmo_group::<GridGizmoGroup>()
            .add_systems(Startup, setup_gizmos)
            .add_systems(Update, draw_grid);
    }
}

// setting these parameters as a resource allows for runtime modifications
#[derive(Resource)]
pub struct GridConfig {
    pub cell: f32,
    pub major_every: i32,
    pub major_color: Color,
    pub minor_color: Color,
    pub half_extent: f32,
    pub enabled: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell: GRID_SNAP,
            major_every: 10,
            major_color: Color::srgba(0.5, 0.5, 0.5, 0.15),
            minor_color: Color::srgba(0.3, 0.3, 0.3, 0.05),
            half_extent: 400.0,
            enabled: true,
        }
    }
}

fn setup_gizmos(
    mut config_store: ResMut<GizmoConfigStore>
) {
    let (config, _) = config_store.config_mut::<GridGizmoGroup>();
    config.depth_bias = 0.1; // render depth
}

fn draw_grid(
    mut gizmos: Gizmos<GridGizmoGroup>,
    params: Res<GridConfig>,
) {
    if !params.enabled || params.cell <= 0.0 {
        return;
    }

    let lines = (params.half_extent / params.cell).floor() as i32;
    let extent = lines as f32 * params.cell;

    // integer line index keeps major lines exact, no float modulo
    for i in -lines..=lines {
        let offset = i as f32 * params.cell;
        let (color, y) = if i % params.major_every.max(1) == 0 {
            (params.major_color, -0.02)
        } else {
            (params.minor_color, -0.01)
        };

        gizmos.line(Vec3::new(offset, y, -extent), Vec3::new(offset, y, extent), color);
        gizmos.line(Vec3::new(-extent, y, offset), Vec3::new(extent, y, offset), color);
    }
}
