// handles room placement logic

use bevy::prelude::*;
use rand::prelude::*;
use rand::rngs::StdRng;

use super::GenerationParams;

/// Rounds `n` up to the next multiple of `m`, lookup "round to multiple"
/// e.g. with m = 4: 1 -> 4, 4 -> 4, 5 -> 8, -3 -> 0
pub fn roundm(n: f32, m: f32) -> f32 {
    ((n + m - 1.0) / m).floor() * m
}

/// Draws a point inside a disc of `radius` centered on the origin, snapped to the grid.
///
/// The radial fraction is the sum of two uniform draws folded back into [0, 1],
/// a triangular distribution on r that makes the points uniform over the disc area.
pub fn sample_point_in_disc(rng: &mut impl Rng, radius: f32, grid: f32) -> Vec2 {
    let theta = std::f32::consts::TAU * rng.random::<f32>();
    let u = rng.random::<f32>() + rng.random::<f32>();
    let r = if u > 1.0 { 2.0 - u } else { u };

    Vec2::new(
        roundm(radius * r * theta.cos(), grid),
        roundm(radius * r * theta.sin(), grid),
    )
}

/// Draws one room dimension: raw draw from the configured range, snapped, then doubled
pub fn sample_room_size(rng: &mut impl Rng, params: &GenerationParams) -> f32 {
    let raw = rng.random_range(params.room_size_min..params.room_size_max) as f32;
    roundm(raw, params.grid_snap) * 2.0
}

/// Seeded room scatterer, one placement per call
pub struct Scatterer {
    rng: StdRng,
}

/// One scattered room, in world space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub position: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Scatterer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_placement(&mut self, params: &GenerationParams) -> Placement {
        let point = sample_point_in_disc(&mut self.rng, params.scatter_radius, params.grid_snap);
        let width = sample_room_size(&mut self.rng, params);
        let height = sample_room_size(&mut self.rng, params);

        Placement {
            position: point + Vec2::splat(params.world_offset),
            width,
            height,
        }
    }
}
