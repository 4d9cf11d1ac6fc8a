// src/config.rs
//
// Build-time constants. The world is LIMIT times the window in each axis,
// which leaves room for panning while staying bounded.

/// Window logical size. 16:9.
pub const WINDOW_WIDTH: u32 = 1280;
pub const WINDOW_HEIGHT: u32 = 720;

/// Side of one cell in world units.
pub const CELL_SIZE: i32 = 20;

/// World size multiplier relative to the window.
pub const LIMIT: i32 = 3;

/// Grid dimensions in cells.
pub const GRID_WIDTH: i32 = WINDOW_WIDTH as i32 * LIMIT / CELL_SIZE;
pub const GRID_HEIGHT: i32 = WINDOW_HEIGHT as i32 * LIMIT / CELL_SIZE;

/// Target frame rate. The surface is configured with Fifo (vsync) presents,
/// so the frame loop runs at the display rate, nominally this.
pub const TARGET_FPS: u32 = 60;

/// Frames between generations while running: four generations per second.
pub const STEP_INTERVAL_FRAMES: u32 = TARGET_FPS / 4;

/// Wheel step applied per scroll notch, and the legal zoom range.
pub const ZOOM_STEP: f32 = 0.125;
pub const ZOOM_MIN: f32 = 0.3;
pub const ZOOM_MAX: f32 = 1.5;

/// Hint overlay text scale (5x7 glyphs at scale 2 are close to a 20px font).
pub const HINT_TEXT_SCALE: i32 = 2;

pub const HINT_TEXT: &str = "L-click to add, R-click to remove\n\
                             M-click to scroll grid, wheel to zoom\n\
                             Space to pause/unpause\n\
                             R to init random grid\n\
                             C to clear grid\n\
                             H to hide this";

// Palette, RGBA.
pub const BACKGROUND: [u8; 4] = [0, 0, 0, 255];
pub const LIVE_CELL: [u8; 4] = [245, 245, 245, 255];
pub const GRIDLINE: [u8; 4] = [80, 80, 80, 255];
pub const CURSOR_CELL: [u8; 4] = [230, 41, 55, 255];
pub const HINT_COLOUR: [u8; 4] = [255, 203, 0, 255];
