// src/camera.rs
//
// Pan/zoom transform between screen space (window pixels) and world space
// (cell-sized units over the grid rectangle). Same model as a raylib
// Camera2D without rotation:
//
//   screen = (world - target) * zoom + offset
//
// `target` is the world point under `offset` (the window centre). The
// camera knows nothing about the grid's contents and cannot mutate it.

use crate::config::{ZOOM_MAX, ZOOM_MIN, ZOOM_STEP};

#[derive(Clone, Copy, Debug)]
pub struct Camera {
    target: (f32, f32),
    offset: (f32, f32),
    zoom: f32,
    /// World rectangle is [0, bounds.0] x [0, bounds.1]; `target` is
    /// clamped into it.
    bounds: (f32, f32),
    /// Cell side in world units, for cell mapping.
    cell: f32,
}

impl Camera {
    pub fn new(target: (f32, f32), offset: (f32, f32), bounds: (f32, f32), cell: f32) -> Self {
        let mut cam = Self {
            target,
            offset,
            zoom: 1.0,
            bounds,
            cell,
        };
        cam.clamp_target();
        cam
    }

    pub fn target(&self) -> (f32, f32) {
        self.target
    }

    pub fn offset(&self) -> (f32, f32) {
        self.offset
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    fn clamp_target(&mut self) {
        self.target.0 = self.target.0.clamp(0.0, self.bounds.0);
        self.target.1 = self.target.1.clamp(0.0, self.bounds.1);
    }

    /// Translates the view by a screen-space drag delta. Dividing by zoom
    /// keeps the drag world-locked: the world point under the pointer
    /// follows the pointer at any zoom.
    pub fn pan(&mut self, dx_screen: f32, dy_screen: f32) {
        self.target.0 -= dx_screen / self.zoom;
        self.target.1 -= dy_screen / self.zoom;
        self.clamp_target();
    }

    /// Applies a raw wheel step. Zero is a no-op, negative shrinks.
    pub fn zoom_by(&mut self, wheel: f32) {
        if wheel != 0.0 {
            self.zoom = (self.zoom + wheel * ZOOM_STEP).clamp(ZOOM_MIN, ZOOM_MAX);
        }
    }

    pub fn world_to_screen(&self, wx: f32, wy: f32) -> (f32, f32) {
        (
            (wx - self.target.0) * self.zoom + self.offset.0,
            (wy - self.target.1) * self.zoom + self.offset.1,
        )
    }

    pub fn screen_to_world(&self, px: f32, py: f32) -> (f32, f32) {
        (
            (px - self.offset.0) / self.zoom + self.target.0,
            (py - self.offset.1) / self.zoom + self.target.1,
        )
    }

    /// Maps a pointer position to integer cell coordinates with a
    /// mathematical floor, so positions left/above the world map to
    /// negative cells rather than folding onto column/row 0. Callers
    /// treat out-of-range results as "no cell".
    pub fn screen_to_cell(&self, px: f32, py: f32) -> (i32, i32) {
        let (wx, wy) = self.screen_to_world(px, py);
        ((wx / self.cell).floor() as i32, (wy / self.cell).floor() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centred() -> Camera {
        // 1280x720 window over a 3840x2160 world of 20-unit cells.
        Camera::new((640.0, 360.0), (640.0, 360.0), (3840.0, 2160.0), 20.0)
    }

    #[test]
    fn pointer_maps_to_cell_at_unit_zoom() {
        let cam = centred();
        assert_eq!(cam.screen_to_cell(650.0, 370.0), (32, 18));
    }

    #[test]
    fn pointer_mapping_follows_zoom() {
        let mut cam = centred();
        // Four wheel notches down: zoom 1.0 - 4 * 0.125 = 0.5.
        cam.zoom_by(-4.0);
        assert_eq!(cam.zoom(), 0.5);
        // world = (650-640)/0.5 + 640 = 660 -> cell 33; same for y.
        assert_eq!(cam.screen_to_cell(650.0, 370.0), (33, 19));
    }

    #[test]
    fn negative_world_positions_floor_to_negative_cells() {
        let cam = Camera::new((0.0, 0.0), (640.0, 360.0), (3840.0, 2160.0), 20.0);
        // Screen (630, 350) is world (-10, -10): cell (-1, -1), not (0, 0).
        assert_eq!(cam.screen_to_cell(630.0, 350.0), (-1, -1));
        assert_eq!(cam.screen_to_cell(640.0, 360.0), (0, 0));
    }

    #[test]
    fn cell_centre_round_trips_at_every_legal_zoom() {
        for &zoom_notches in &[-28i32, -8, -4, 0, 2, 4] {
            for &target in &[(0.0, 0.0), (640.0, 360.0), (1920.0, 1080.0), (3840.0, 2160.0)] {
                let mut cam = Camera::new(target, (640.0, 360.0), (3840.0, 2160.0), 20.0);
                cam.zoom_by(zoom_notches as f32);
                for &(cx, cy) in &[(0, 0), (1, 0), (95, 53), (191, 107)] {
                    let wx = (cx as f32 + 0.5) * 20.0;
                    let wy = (cy as f32 + 0.5) * 20.0;
                    let (px, py) = cam.world_to_screen(wx, wy);
                    assert_eq!(
                        cam.screen_to_cell(px, py),
                        (cx, cy),
                        "zoom {} target {:?}",
                        cam.zoom(),
                        target
                    );
                }
            }
        }
    }

    #[test]
    fn pan_then_inverse_pan_restores_target() {
        let mut cam = centred();
        let before = cam.target();
        cam.pan(37.0, -12.0);
        cam.pan(-37.0, 12.0);
        let after = cam.target();
        assert!((before.0 - after.0).abs() < 1e-3);
        assert!((before.1 - after.1).abs() < 1e-3);
    }

    #[test]
    fn pan_saturates_at_world_bounds() {
        let mut cam = centred();
        cam.pan(1e6, 1e6);
        assert_eq!(cam.target(), (0.0, 0.0));
        cam.pan(-1e7, -1e7);
        assert_eq!(cam.target(), (3840.0, 2160.0));
    }

    #[test]
    fn zoom_saturates_and_zero_wheel_is_a_noop() {
        let mut cam = centred();
        cam.zoom_by(0.0);
        assert_eq!(cam.zoom(), 1.0);
        cam.zoom_by(100.0);
        assert_eq!(cam.zoom(), ZOOM_MAX);
        cam.zoom_by(-100.0);
        assert_eq!(cam.zoom(), ZOOM_MIN);
    }
}
