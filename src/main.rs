// src/main.rs
//
// Interactive Conway's Game of Life on a bounded grid. Left-click paints,
// right-click erases, middle-drag pans, the wheel zooms. Space pauses,
// R reseeds, C clears, H toggles the key hint.

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use pollster::block_on;
use rand::rngs::StdRng;
use rand::SeedableRng;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

mod camera;
mod config;
mod font;
mod grid;
mod render;

use camera::Camera;
use config as cfg;
use grid::Grid;
use render::Gfx;

#[derive(Default)]
struct InputState {
    cursor: Option<(f32, f32)>,
    last_cursor: Option<(f32, f32)>,
    left_down: bool,
    right_down: bool,
    middle_down: bool,
    wheel_delta: f32,
}

impl InputState {
    /// Pointer movement since the previous frame's sample.
    fn take_pointer_delta(&mut self) -> (f32, f32) {
        let delta = match (self.cursor, self.last_cursor) {
            (Some(cur), Some(prev)) => (cur.0 - prev.0, cur.1 - prev.1),
            _ => (0.0, 0.0),
        };
        self.last_cursor = self.cursor;
        delta
    }

    fn take_wheel(&mut self) -> f32 {
        std::mem::take(&mut self.wheel_delta)
    }
}

/// Frame-counted simulation cadence: one generation every `interval`
/// frames while running. Pausing freezes the count rather than letting
/// ticks accumulate.
struct StepClock {
    interval: u32,
    pending: u32,
}

impl StepClock {
    fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            pending: 0,
        }
    }

    /// Advances one frame. Returns true when a generation is due; never
    /// more than once per frame.
    fn tick(&mut self, running: bool) -> bool {
        if !running {
            return false;
        }
        self.pending += 1;
        if self.pending >= self.interval {
            self.pending = 0;
            true
        } else {
            false
        }
    }
}

fn wall_clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

struct App {
    window: Option<Arc<Window>>,
    gfx: Option<Gfx>,
    grid: Option<Grid>,
    view: Option<Camera>,

    rng: StdRng,
    input: InputState,
    clock: StepClock,
    running: bool,
    show_hint: bool,

    frames: u64,
    last_title: Instant,
}

impl App {
    fn new() -> Self {
        Self {
            window: None,
            gfx: None,
            grid: None,
            view: None,
            rng: StdRng::seed_from_u64(wall_clock_seed()),
            input: InputState::default(),
            clock: StepClock::new(cfg::STEP_INTERVAL_FRAMES),
            running: true,
            show_hint: true,
            frames: 0,
            last_title: Instant::now(),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, el: &ActiveEventLoop) {
        let attrs = Window::default_attributes()
            .with_title("LIFE")
            .with_inner_size(PhysicalSize::new(cfg::WINDOW_WIDTH, cfg::WINDOW_HEIGHT))
            .with_resizable(false);

        let window = Arc::new(el.create_window(attrs).expect("create_window"));
        let size = window.inner_size();
        let gfx = block_on(Gfx::new(window.clone(), size.width, size.height));

        let mut grid = Grid::new(cfg::GRID_WIDTH, cfg::GRID_HEIGHT);
        grid.init_random(&mut self.rng);

        let offset = (size.width as f32 / 2.0, size.height as f32 / 2.0);
        let world = (
            (cfg::GRID_WIDTH * cfg::CELL_SIZE) as f32,
            (cfg::GRID_HEIGHT * cfg::CELL_SIZE) as f32,
        );
        let view = Camera::new(
            (offset.0 * cfg::LIMIT as f32, offset.1 * cfg::LIMIT as f32),
            offset,
            world,
            cfg::CELL_SIZE as f32,
        );

        self.window = Some(window);
        self.gfx = Some(gfx);
        self.grid = Some(grid);
        self.view = Some(view);
        self.frames = 0;
        self.last_title = Instant::now();
    }

    fn window_event(&mut self, el: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => el.exit(),

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                match event.logical_key {
                    Key::Named(NamedKey::Space) => self.running = !self.running,
                    Key::Character(ref s) if s.as_str().eq_ignore_ascii_case("h") => {
                        self.show_hint = !self.show_hint;
                    }
                    Key::Character(ref s) if s.as_str().eq_ignore_ascii_case("r") => {
                        if let Some(grid) = self.grid.as_mut() {
                            grid.init_random(&mut self.rng);
                        }
                    }
                    Key::Character(ref s) if s.as_str().eq_ignore_ascii_case("c") => {
                        if let Some(grid) = self.grid.as_mut() {
                            grid.init_empty();
                        }
                    }
                    _ => {}
                }
            }

            WindowEvent::Resized(sz) => {
                if let Some(gfx) = self.gfx.as_mut() {
                    gfx.resize(sz.width, sz.height);
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.input.cursor = Some((position.x as f32, position.y as f32));
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let down = state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.input.left_down = down,
                    MouseButton::Right => self.input.right_down = down,
                    MouseButton::Middle => self.input.middle_down = down,
                    _ => {}
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                self.input.wheel_delta += match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 50.0,
                };
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, el: &ActiveEventLoop) {
        el.set_control_flow(ControlFlow::Poll);

        let (gfx, grid, view) = match (self.gfx.as_mut(), self.grid.as_mut(), self.view.as_mut()) {
            (Some(g), Some(gr), Some(v)) => (g, gr, v),
            _ => return,
        };

        // Viewport input: middle-drag pans, wheel zooms.
        let (dx, dy) = self.input.take_pointer_delta();
        if self.input.middle_down {
            view.pan(dx, dy);
        }
        view.zoom_by(self.input.take_wheel());

        // Editing. The hovered cell is also the red cursor preview, so the
        // preview and the edit always agree. Primary wins when both
        // buttons are held. Out-of-range cells are silently dropped by set.
        let hovered = self
            .input
            .cursor
            .map(|(px, py)| view.screen_to_cell(px, py));
        if let Some((cx, cy)) = hovered {
            if self.input.left_down {
                grid.set(cx, cy, true);
            } else if self.input.right_down {
                grid.set(cx, cy, false);
            }
        }

        // At most one generation per frame, every STEP_INTERVAL_FRAMES
        // frames while running.
        if self.clock.tick(self.running) {
            grid.step();
        }

        draw_frame(gfx, grid, view, hovered, self.show_hint);
        gfx.present();

        self.frames += 1;
        if self.last_title.elapsed() >= Duration::from_secs(1) {
            if let Some(window) = self.window.as_ref() {
                window.set_title(&format!("LIFE - FPS: {}", self.frames));
            }
            self.frames = 0;
            self.last_title = Instant::now();
        }
    }
}

fn draw_frame(
    gfx: &mut Gfx,
    grid: &Grid,
    view: &Camera,
    hovered: Option<(i32, i32)>,
    show_hint: bool,
) {
    let cell = cfg::CELL_SIZE as f32;

    let mut frame = gfx.frame();
    frame.clear(cfg::BACKGROUND);

    // Visible cell range, so off-screen cells and gridlines are skipped.
    let (fw, fh) = (frame.width() as f32, frame.height() as f32);
    let (wx0, wy0) = view.screen_to_world(0.0, 0.0);
    let (wx1, wy1) = view.screen_to_world(fw, fh);
    let x0 = ((wx0 / cell).floor() as i32).max(0);
    let y0 = ((wy0 / cell).floor() as i32).max(0);
    let x1 = ((wx1 / cell).ceil() as i32).min(grid.width());
    let y1 = ((wy1 / cell).ceil() as i32).min(grid.height());

    frame.push_camera(*view);

    for y in y0..y1 {
        for x in x0..x1 {
            if grid.get(x, y) {
                frame.fill_rect(x as f32 * cell, y as f32 * cell, cell, cell, cfg::LIVE_CELL);
            }
        }
    }

    if x0 < x1 && y0 < y1 {
        let (gx0, gy0) = (x0 as f32 * cell, y0 as f32 * cell);
        let (gx1, gy1) = (x1 as f32 * cell, y1 as f32 * cell);
        for x in x0..=x1 {
            let wx = x as f32 * cell;
            frame.draw_line(wx, gy0, wx, gy1, cfg::GRIDLINE);
        }
        for y in y0..=y1 {
            let wy = y as f32 * cell;
            frame.draw_line(gx0, wy, gx1, wy, cfg::GRIDLINE);
        }
    }

    // Cursor preview, drawn even when the pointer maps outside the grid
    // (the edit there was already dropped).
    if let Some((cx, cy)) = hovered {
        frame.fill_rect(cx as f32 * cell, cy as f32 * cell, cell, cell, cfg::CURSOR_CELL);
    }

    frame.pop_camera();

    if show_hint {
        frame.draw_text(cfg::HINT_TEXT, 10, 10, cfg::HINT_TEXT_SCALE, cfg::HINT_COLOUR);
    }
}

fn main() -> Result<(), winit::error::EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new();
    event_loop.run_app(&mut app)
}
