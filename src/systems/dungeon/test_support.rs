// deterministic stand-ins for the collaborators

use bevy::prelude::*;

use super::error::{GenerationError, GenerationResult};
use super::physics::{BodyHandle, Material, PhysicsWorld};
use super::triangulation::{Triangulation, Triangulator};

/// Physics fake: bodies never move on their own, each falls asleep after a
/// scripted number of steps (`None` keeps it awake forever).
pub struct ScriptedWorld {
    wake_rule: fn(usize) -> Option<usize>,
    positions: Vec<Vec2>,
    steps: usize,
    pub drift: Vec2,
}

impl ScriptedWorld {
    pub fn new(wake_rule: fn(usize) -> Option<usize>) -> Self {
        Self {
            wake_rule,
            positions: Vec::new(),
            steps: 0,
            drift: Vec2::ZERO,
        }
    }

    /// Body `i` sleeps after `i + 1` steps
    pub fn staggered() -> Self {
        Self::new(|i| Some(i + 1))
    }

    pub fn already_asleep() -> Self {
        Self::new(|_| Some(0))
    }

    pub fn restless() -> Self {
        Self::new(|_| None)
    }
}

impl PhysicsWorld for ScriptedWorld {
    fn add_box(&mut self, position: Vec2, _half_extents: Vec2, _material: Material) -> BodyHandle {
        self.positions.push(position);
        BodyHandle(self.positions.len() - 1)
    }

    fn step(&mut self, _dt: f32) {
        self.steps += 1;
        for p in self.positions.iter_mut() {
            *p += self.drift;
        }
    }

    fn position(&self, body: BodyHandle) -> Vec2 {
        self.positions[body.0]
    }

    fn is_sleeping(&self, body: BodyHandle) -> bool {
        (self.wake_rule)(body.0).is_some_and(|after| self.steps >= after)
    }
}

/// Triangulator that always rejects its input
pub struct FailingTriangulator;

impl Triangulator for FailingTriangulator {
    fn triangulate(&self, _points: &[Vec2]) -> GenerationResult<Triangulation> {
        Err(GenerationError::TriangulationFailed {
            reason: "rejected by test".to_string(),
        })
    }
}
