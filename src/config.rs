//! Configuration constants for the scrap boss-fight game.

// Window and play area
pub const WINDOW_WIDTH: i32 = 1280;
pub const WINDOW_HEIGHT: i32 = 720;
pub const PLAY_AREA_WIDTH: f32 = 1280.0;
pub const PLAY_AREA_HEIGHT: f32 = 720.0;
pub const FRAME_RATE: u32 = 60;

// Fixed simulation step. Frame-counted timers (scrap lifetime, boss spawn
// intervals) assume this rate.
pub const SIM_DT: f32 = 1.0 / FRAME_RATE as f32;

// Scraps drifting further than this outside the play area are removed
pub const OUT_OF_BOUNDS_MARGIN: f32 = 200.0;

// Player placement
pub const PLAYER_START_X: f32 = 240.0;
pub const PLAYER_START_Y: f32 = 360.0;
pub const PLAYER_RADIUS: f32 = 32.0;
pub const PLAYER_MAX_HIT_POINT: i32 = 100;

// Boss placement
pub const BOSS_START_X: f32 = 960.0;
pub const BOSS_START_Y: f32 = 360.0;
pub const BOSS_RADIUS: f32 = 160.0;

// HUD gauges
pub const HIT_POINT_GAUGE_X: f32 = 25.0;
pub const HIT_POINT_GAUGE_Y: f32 = 25.0;
pub const HIT_POINT_GAUGE_WIDTH: f32 = 300.0;
pub const HIT_POINT_GAUGE_HEIGHT: f32 = 30.0;

pub const WEIGHT_GAUGE_X: f32 = 25.0;
pub const WEIGHT_GAUGE_Y: f32 = 645.0;
pub const WEIGHT_GAUGE_WIDTH: f32 = 300.0;
pub const WEIGHT_GAUGE_HEIGHT: f32 = 50.0;

pub const BOSS_HP_GAUGE_WIDTH: f32 = 500.0;
pub const BOSS_HP_GAUGE_HEIGHT: f32 = 20.0;
