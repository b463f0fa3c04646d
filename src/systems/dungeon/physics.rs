// box separation world
// the generator only needs: add a box, step, read position, read sleep state

use bevy::prelude::*;
// the `vector!` macro expands to `nalgebra::...` paths
use rapier2d::na as nalgebra;
use rapier2d::prelude::{
    vector, CCDSolver, ColliderBuilder, ColliderSet, DefaultBroadPhase, ImpulseJointSet,
    IntegrationParameters, IslandManager, MultibodyJointSet, NarrowPhase, PhysicsPipeline,
    RigidBodyBuilder, RigidBodyHandle, RigidBodySet,
};

use crate::config::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub usize);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub elasticity: f32,
    pub friction: f32,
}

// rooms bounce apart but never drag on each other
pub const ROOM_MATERIAL: Material = Material {
    elasticity: 1.0,
    friction: 0.0,
};

/// Narrow interface over a rigid-body resolver.
pub trait PhysicsWorld {
    fn add_box(&mut self, position: Vec2, half_extents: Vec2, material: Material) -> BodyHandle;
    fn step(&mut self, dt: f32);
    fn position(&self, body: BodyHandle) -> Vec2;
    fn is_sleeping(&self, body: BodyHandle) -> bool;
}

#[derive(Clone, Debug)]
pub struct WorldSettings {
    pub sleep_time_threshold: f32,
    pub idle_speed_threshold: f32,
    pub linear_damping: f32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            sleep_time_threshold: SLEEP_TIME_THRESHOLD,
            idle_speed_threshold: IDLE_SPEED_THRESHOLD,
            linear_damping: LINEAR_DAMPING,
        }
    }
}

/// Zero-gravity rapier world of non-rotating boxes with unit mass.
pub struct RapierWorld {
    settings: WorldSettings,
    integration: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    handles: Vec<RigidBodyHandle>,
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new(WorldSettings::default())
    }
}

impl RapierWorld {
    pub fn new(settings: WorldSettings) -> Self {
        Self {
            settings,
            integration: IntegrationParameters {
                dt: PHYSICS_TIMESTEP,
                ..Default::default()
            },
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            handles: Vec::new(),
        }
    }

    #[cfg(test)]
    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec2) {
        self.bodies[self.handles[body.0]].set_linvel(vector![velocity.x, velocity.y], true);
    }

    #[cfg(test)]
    fn velocity(&self, body: BodyHandle) -> Vec2 {
        let v = self.bodies[self.handles[body.0]].linvel();
        Vec2::new(v.x, v.y)
    }
}

impl PhysicsWorld for RapierWorld {
    fn add_box(&mut self, position: Vec2, half_extents: Vec2, material: Material) -> BodyHandle {
        let mut body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y])
            .lock_rotations()
            .linear_damping(self.settings.linear_damping)
            .build();
        let activation = body.activation_mut();
        activation.normalized_linear_threshold = self.settings.idle_speed_threshold;
        activation.time_until_sleep = self.settings.sleep_time_threshold;

        let handle = self.bodies.insert(body);
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y)
            .mass(1.0)
            .restitution(material.elasticity)
            .friction(material.friction)
            .build();
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);

        self.handles.push(handle);
        BodyHandle(self.handles.len() - 1)
    }

    fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.integration.dt = dt;

        self.pipeline.step(
            &vector![0.0, 0.0],
            &self.integration,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &(),
        );
    }

    fn position(&self, body: BodyHandle) -> Vec2 {
        let t = self.bodies[self.handles[body.0]].translation();
        Vec2::new(t.x, t.y)
    }

    fn is_sleeping(&self, body: BodyHandle) -> bool {
        self.bodies[self.handles[body.0]].is_sleeping()
    }
}
