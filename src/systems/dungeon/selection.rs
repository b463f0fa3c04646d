// main room selection by footprint area

use super::room::{Room, RoomId};

/// Marks the first unselected room whose area exceeds `min_area`.
/// Returns its id, or `None` once a full pass finds no candidate.
pub fn select_next(rooms: &mut [Room], min_area: f32) -> Option<RoomId> {
    let room = rooms
        .iter_mut()
        .find(|room| !room.selected && room.area() > min_area)?;
    room.selected = true;
    Some(room.id)
}

/// Batch variant of `select_next`, same membership and order.
pub fn select_all(rooms: &mut [Room], min_area: f32) -> Vec<RoomId> {
    let mut picked = Vec::new();
    while let Some(id) = select_next(rooms, min_area) {
        picked.push(id);
    }
    picked
}
