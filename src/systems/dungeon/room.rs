// room entity and its geometry

use bevy::prelude::*;

use super::physics::BodyHandle;

/// Stable room identity, unique for the lifetime of one generation run.
/// Doubles as the node key of the corridor graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(pub u32);

#[derive(Clone, Debug)]
pub struct Room {
    pub id: RoomId,
    pub body: BodyHandle,
    // only ever written by the separation driver
    pub position: Vec2,
    half_extents: Vec2,
    pub selected: bool,
    pub sleeping: bool,
}

impl Room {
    pub fn new(id: RoomId, body: BodyHandle, position: Vec2, width: f32, height: f32) -> Self {
        Self {
            id,
            body,
            position,
            half_extents: Vec2::new(width, height) * 0.5,
            selected: false,
            sleeping: false,
        }
    }

    pub fn half_extents(&self) -> Vec2 {
        self.half_extents
    }

    pub fn size(&self) -> Vec2 {
        self.half_extents * 2.0
    }

    pub fn area(&self) -> f32 {
        let size = self.size();
        size.x * size.y
    }

    /// Axis-aligned bounding box as `(min, max)`, derived from the current position.
    pub fn bounding_box(&self) -> (Vec2, Vec2) {
        (self.position - self.half_extents, self.position + self.half_extents)
    }

    pub fn center(&self) -> Vec2 {
        let (min, max) = self.bounding_box();
        (min + max) * 0.5
    }
}
