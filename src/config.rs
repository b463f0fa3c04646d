// Configuration file, all measurements in world units
// This controls the initial generation parameter settings

pub const INITIAL_SEED: u64 = 1512086461918454205;

// Scatter parameters
pub const ROOM_COUNT_THRESHOLD: usize = 50;  // scatter stops once the room count exceeds this
pub const SCATTER_RADIUS: f32 = 100.0;       // rooms are dropped inside this disc
pub const WORLD_OFFSET: f32 = 300.0;         // disc center in world space (both axes)
pub const GRID_SNAP: f32 = 4.0;              // positions and sizes snap to this grid
pub const ROOM_SIZE_MIN: u32 = 8;            // raw size draw, inclusive
pub const ROOM_SIZE_MAX: u32 = 36;           // raw size draw, exclusive (doubled after snapping)

// Selection parameters
pub const MIN_ROOM_AREA: f32 = 3500.0;       // rooms strictly larger than this become main rooms

// Physics parameters
pub const PHYSICS_TIMESTEP: f32 = 1.0 / 60.0;   // fixed step, never tied to wall clock
pub const SLEEP_TIME_THRESHOLD: f32 = 3.0;      // seconds of idling before a body sleeps
pub const IDLE_SPEED_THRESHOLD: f32 = 1.0;      // units per second
pub const BODY_PADDING: f32 = 0.5;              // added to each body dimension, leaves a gap between rooms
pub const LINEAR_DAMPING: f32 = 0.5;            // bleeds off the separation velocity so the pile comes to rest

// Safety ceiling on the settling phase (60 simulated seconds)
pub const MAX_SETTLE_TICKS: u32 = 3600;

// Presentation
pub const TICK_RATE_HZ: f64 = 30.0;   // orchestrator ticks per second
pub const CORRIDOR_LIFT: f32 = 0.05;  // draw corridors slightly above the rooms
