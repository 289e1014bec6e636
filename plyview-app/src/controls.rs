//! Damped orbit controls.
//!
//! Mouse input accumulates into pending motion; every frame the render loop
//! applies a fraction of it to the camera and decays the remainder, so
//! rotation, pan, and zoom ease out over successive frames instead of
//! stopping dead.

use crate::camera::Camera;
use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Fraction of the pending motion applied per frame.
const DAMPING_FACTOR: f32 = 0.25;

const ROTATE_SENSITIVITY: f32 = 0.005;
const PAN_SENSITIVITY: f32 = 0.0025;
const ZOOM_SENSITIVITY: f32 = 0.2;

/// Pending motion below this magnitude is considered settled.
const REST_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragMode {
    Rotate,
    Pan,
}

/// Orbit interaction state: left-drag rotates, right-drag pans, the wheel
/// zooms.
pub struct OrbitControls {
    drag: Option<DragMode>,
    cursor: Option<Vec2>,
    pending_rotation: Vec2,
    pending_pan: Vec2,
    pending_zoom: f32,
}

impl OrbitControls {
    pub fn new() -> Self {
        Self {
            drag: None,
            cursor: None,
            pending_rotation: Vec2::ZERO,
            pending_pan: Vec2::ZERO,
            pending_zoom: 0.0,
        }
    }

    /// Feed a window event. Returns true if the event was consumed.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                let mode = match button {
                    MouseButton::Left => Some(DragMode::Rotate),
                    MouseButton::Right => Some(DragMode::Pan),
                    _ => None,
                };
                let Some(mode) = mode else {
                    return false;
                };
                match state {
                    ElementState::Pressed => self.drag = Some(mode),
                    ElementState::Released => {
                        if self.drag == Some(mode) {
                            self.drag = None;
                        }
                    }
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let current = Vec2::new(position.x as f32, position.y as f32);
                if let (Some(previous), Some(mode)) = (self.cursor, self.drag) {
                    let delta = current - previous;
                    match mode {
                        DragMode::Rotate => self.add_rotation(delta * ROTATE_SENSITIVITY),
                        DragMode::Pan => self.add_pan(delta * PAN_SENSITIVITY),
                    }
                }
                self.cursor = Some(current);
                self.drag.is_some()
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                self.add_zoom(amount * ZOOM_SENSITIVITY);
                true
            }
            _ => false,
        }
    }

    pub fn add_rotation(&mut self, delta: Vec2) {
        self.pending_rotation += delta;
    }

    pub fn add_pan(&mut self, delta: Vec2) {
        self.pending_pan += delta;
    }

    pub fn add_zoom(&mut self, amount: f32) {
        self.pending_zoom += amount;
    }

    /// Advance the damping by one frame: apply a fraction of the pending
    /// motion to the camera, decay the rest.
    pub fn update(&mut self, camera: &mut Camera) {
        if self.pending_rotation.length_squared() > 0.0 {
            camera.orbit(self.pending_rotation * DAMPING_FACTOR);
            self.pending_rotation *= 1.0 - DAMPING_FACTOR;
            if self.pending_rotation.length() < REST_EPSILON {
                self.pending_rotation = Vec2::ZERO;
            }
        }
        if self.pending_pan.length_squared() > 0.0 {
            camera.pan(self.pending_pan * DAMPING_FACTOR);
            self.pending_pan *= 1.0 - DAMPING_FACTOR;
            if self.pending_pan.length() < REST_EPSILON {
                self.pending_pan = Vec2::ZERO;
            }
        }
        if self.pending_zoom != 0.0 {
            camera.zoom(self.pending_zoom * DAMPING_FACTOR);
            self.pending_zoom *= 1.0 - DAMPING_FACTOR;
            if self.pending_zoom.abs() < REST_EPSILON {
                self.pending_zoom = 0.0;
            }
        }
    }

    /// Drop any drag in progress and pending motion, e.g. after the camera
    /// is reset to the default framing.
    pub fn reset(&mut self) {
        self.drag = None;
        self.pending_rotation = Vec2::ZERO;
        self.pending_pan = Vec2::ZERO;
        self.pending_zoom = 0.0;
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_is_spread_over_frames() {
        let mut controls = OrbitControls::new();
        let mut camera = Camera::default_framing();

        controls.add_rotation(Vec2::new(1.0, 0.0));
        controls.update(&mut camera);

        // One frame applies only the damping fraction of the input.
        assert!((camera.yaw + DAMPING_FACTOR).abs() < 1e-5);

        // The remainder plays out over subsequent frames.
        for _ in 0..200 {
            controls.update(&mut camera);
        }
        assert!((camera.yaw + 1.0).abs() < 1e-2);
    }

    #[test]
    fn test_motion_settles_to_rest() {
        let mut controls = OrbitControls::new();
        let mut camera = Camera::default_framing();

        controls.add_zoom(1.0);
        for _ in 0..200 {
            controls.update(&mut camera);
        }
        let settled = camera.distance;
        controls.update(&mut camera);
        assert_eq!(camera.distance, settled);
    }

    #[test]
    fn test_reset_discards_pending_motion() {
        let mut controls = OrbitControls::new();
        let mut camera = Camera::default_framing();

        controls.add_rotation(Vec2::new(5.0, 0.0));
        controls.add_zoom(3.0);
        controls.reset();
        controls.update(&mut camera);

        assert_eq!(camera, Camera::default_framing());
    }
}
