// this is the entry point for the room generation plugin
use bevy::prelude::*;

use crate::config::*;

pub mod error;
pub mod graph;
pub mod physics;
pub mod pipeline;
pub mod room;
pub mod scatter;
pub mod selection;
pub mod separation;
pub mod triangulation;

#[cfg(test)]
mod test_support;

use physics::WorldSettings;
use pipeline::{DefaultGenerator, Phase};
use room::Room;
use scatter::roundm;

// resources
#[derive(Resource)]
pub struct Seed(pub u64);

#[derive(Resource)]
pub struct DungeonGenerator(pub DefaultGenerator);

// set by input, consumed by the next tick
#[derive(Resource, Default)]
pub struct ConfirmRequested(pub bool);

#[derive(Resource)]
pub struct LayerVisibility {
    pub rooms: bool,
    pub unselected: bool,
    pub edges: bool,
}

impl Default for LayerVisibility {
    fn default() -> Self {
        Self {
            rooms: true,
            unselected: true,
            edges: true,
        }
    }
}

// Event for regeneration
#[derive(Event)]
pub struct RegenerateEvent {
    pub seed: u64,
}

// Event fired whenever the pipeline moves on
#[derive(Event)]
pub struct PhaseChangeEvent(pub Phase);

// room generation parameters
// copied into each run, edits only apply on regeneration
#[derive(Resource, Clone, Debug)]
pub struct GenerationParams {
    pub room_count_threshold: usize,
    pub scatter_radius: f32,
    pub world_offset: f32,
    pub grid_snap: f32,
    pub room_size_min: u32,
    pub room_size_max: u32,
    pub min_room_area: f32,
    // physics
    pub physics_timestep: f32,
    pub sleep_time_threshold: f32,
    pub idle_speed_threshold: f32,
    pub body_padding: f32,
    pub max_settle_ticks: Option<u32>,
    // pipeline behaviour
    pub interactive: bool,
    pub incremental_selection: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            room_count_threshold: ROOM_COUNT_THRESHOLD,
            scatter_radius: SCATTER_RADIUS,
            world_offset: WORLD_OFFSET,
            grid_snap: GRID_SNAP,
            room_size_min: ROOM_SIZE_MIN,
            room_size_max: ROOM_SIZE_MAX,
            min_room_area: MIN_ROOM_AREA,
            physics_timestep: PHYSICS_TIMESTEP,
            sleep_time_threshold: SLEEP_TIME_THRESHOLD,
            idle_speed_threshold: IDLE_SPEED_THRESHOLD,
            body_padding: BODY_PADDING,
            max_settle_ticks: Some(MAX_SETTLE_TICKS),
            interactive: true,
            incremental_selection: true,
        }
    }
}

impl GenerationParams {
    pub fn world_settings(&self) -> WorldSettings {
        WorldSettings {
            sleep_time_threshold: self.sleep_time_threshold,
            idle_speed_threshold: self.idle_speed_threshold,
            ..default()
        }
    }
}

// main plugin for generation
pub struct DungeonPlugin;

impl Plugin for DungeonPlugin {
    fn build(&self, app: &mut App) {
        let params = GenerationParams::default();
        app
            .insert_resource(Seed(INITIAL_SEED))
            .insert_resource(DungeonGenerator(DefaultGenerator::new(params.clone(), INITIAL_SEED)))
            .insert_resource(params)
            .insert_resource(ConfirmRequested::default())
            .insert_resource(LayerVisibility::default())
            .insert_resource(Time::<Fixed>::from_hz(TICK_RATE_HZ))

            .add_event::<RegenerateEvent>()
            .add_event::<PhaseChangeEvent>()

            // one pipeline step per fixed tick, drawing runs every frame
            .add_systems(FixedUpdate, tick_generation)
            .add_systems(Update, (handle_regeneration, draw_layout));
    }
}

fn tick_generation(
    mut generator: ResMut<DungeonGenerator>,
    mut confirm: ResMut<ConfirmRequested>,
    mut phase_events: EventWriter<PhaseChangeEvent>,
) {
    let before = generator.0.phase();
    if before.is_terminal() {
        return;
    }

    // a confirmation only counts while a gate is waiting for it
    let confirmed = std::mem::take(&mut confirm.0) && before.awaits_confirmation();

    match generator.0.tick(confirmed) {
        Ok(after) if after != before => {
            phase_events.write(PhaseChangeEvent(after));
        }
        Ok(_) => {}
        Err(err) => {
            warn!("Generation stopped: {}", err);
            phase_events.write(PhaseChangeEvent(generator.0.phase()));
        }
    }
}

pub fn handle_regeneration(
    mut events: EventReader<RegenerateEvent>,
    mut seed: ResMut<Seed>,
    params: Res<GenerationParams>,
    mut generator: ResMut<DungeonGenerator>,
    mut confirm: ResMut<ConfirmRequested>,
    mut phase_events: EventWriter<PhaseChangeEvent>,
) {
    // only the latest request matters
    let Some(event) = events.read().last() else {
        return;
    };

    info!("Regenerating with seed {}", event.seed);
    seed.0 = event.seed;
    generator.0 = DefaultGenerator::new(params.clone(), event.seed);
    confirm.0 = false;
    phase_events.write(PhaseChangeEvent(generator.0.phase()));
}

// layout lies on the XZ plane, centered on the scatter disc
fn to_world(point: Vec2, offset: f32, lift: f32) -> Vec3 {
    Vec3::new(point.x - offset, lift, point.y - offset)
}

fn room_color(room: &Room) -> Color {
    if room.selected {
        Color::srgba(0.8, 0.0, 0.0, 0.9) // red for main rooms
    } else if room.sleeping {
        Color::srgba(0.6, 0.6, 0.6, 0.5) // grey once at rest
    } else {
        Color::srgba(0.3, 0.3, 1.0, 0.8) // blue while moving
    }
}

fn draw_layout(
    mut gizmos: Gizmos,
    generator: Res<DungeonGenerator>,
    visibility: Res<LayerVisibility>,
) {
    // the run's own params, the resource may have been edited since it started
    let params = generator.0.params();
    let state = generator.0.state();
    let offset = params.world_offset;

    if visibility.rooms {
        for room in &state.rooms {
            if !room.selected && !visibility.unselected {
                continue;
            }

            // snap the displayed box to the grid, the body itself stays where it is
            let center = Vec2::new(
                roundm(room.position.x, params.grid_snap),
                roundm(room.position.y, params.grid_snap),
            );
            let half = room.half_extents();
            let corners = [
                center + Vec2::new(-half.x, -half.y),
                center + Vec2::new(half.x, -half.y),
                center + Vec2::new(half.x, half.y),
                center + Vec2::new(-half.x, half.y),
            ];

            let color = room_color(room);
            for i in 0..corners.len() {
                gizmos.line(
                    to_world(corners[i], offset, 0.0),
                    to_world(corners[(i + 1) % corners.len()], offset, 0.0),
                    color,
                );
            }
        }
    }

    if !visibility.edges {
        return;
    }

    let edge_color = Color::srgba(0.9, 0.9, 0.0, 0.9);
    if let Some(corridors) = &state.spanning_tree {
        // corridors replace the triangulation once they exist
        for corridor in corridors {
            let (Some(a), Some(b)) = (state.room(corridor.from), state.room(corridor.to)) else {
                continue;
            };
            gizmos.line(
                to_world(a.center(), offset, CORRIDOR_LIFT),
                to_world(b.center(), offset, CORRIDOR_LIFT),
                edge_color,
            );
        }
    } else if let Some(triangulation) = &state.triangulation {
        let selected = state.selected_rooms();
        for (p, q) in triangulation.edges() {
            gizmos.line(
                to_world(selected[p].center(), offset, CORRIDOR_LIFT),
                to_world(selected[q].center(), offset, CORRIDOR_LIFT),
                edge_color,
            );
        }
    }
}
