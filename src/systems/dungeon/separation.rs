// separation driver
// steps the physics world and mirrors positions and sleep flags back onto the rooms

use super::physics::PhysicsWorld;
use super::room::Room;

/// Advances the world by one fixed step and syncs every room from its body.
pub fn advance<W: PhysicsWorld>(world: &mut W, rooms: &mut [Room], dt: f32) {
    world.step(dt);
    for room in rooms.iter_mut() {
        room.position = world.position(room.body);
        room.sleeping = world.is_sleeping(room.body);
    }
}

/// True only when every room is sleeping at the same time.
pub fn all_settled(rooms: &[Room]) -> bool {
    rooms.iter().all(|room| room.sleeping)
}
