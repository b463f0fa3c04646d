pub mod dungeon;
pub mod grid;
pub mod ui;
