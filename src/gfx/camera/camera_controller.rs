use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, MouseScrollDelta},
    window::Window,
};

use super::orbit_camera::OrbitCamera;

/// Exponential decay applied to orbit velocity each frame.
const DAMPING: f32 = 0.88;

/// Velocity below which the orbit is considered at rest.
const REST_THRESHOLD: f32 = 1e-5;

/// Drag-to-orbit and scroll-to-zoom controller with damped motion.
///
/// Dragging accumulates yaw/pitch velocity instead of moving the camera
/// directly; [`CameraController::update`] applies and decays that velocity
/// once per frame, so releasing the mouse lets the orbit glide to a stop.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    is_mouse_pressed: bool,
    yaw_velocity: f32,
    pitch_velocity: f32,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            is_mouse_pressed: false,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
        }
    }

    pub fn process_events(
        &mut self,
        event: &DeviceEvent,
        window: &Window,
        camera: &mut OrbitCamera,
    ) {
        match event {
            DeviceEvent::Button {
                button: 0, // left mouse button
                state,
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
            }
            DeviceEvent::MouseWheel { delta, .. } => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32
                    }
                };
                camera.add_distance(scroll_amount * self.zoom_speed);
                window.request_redraw();
            }
            DeviceEvent::MouseMotion { delta } => {
                if self.is_mouse_pressed {
                    self.yaw_velocity += -delta.0 as f32 * self.rotate_speed;
                    self.pitch_velocity += delta.1 as f32 * self.rotate_speed;
                    window.request_redraw();
                }
            }
            _ => (),
        }
    }

    /// Advances the damping state; called once per frame by the frame driver.
    pub fn update(&mut self, camera: &mut OrbitCamera) {
        if self.yaw_velocity.abs() > REST_THRESHOLD || self.pitch_velocity.abs() > REST_THRESHOLD {
            camera.add_yaw(self.yaw_velocity);
            camera.add_pitch(self.pitch_velocity);
        }
        self.yaw_velocity *= DAMPING;
        self.pitch_velocity *= DAMPING;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn test_damping_decays_to_rest() {
        let mut controller = CameraController::new(0.005, 0.1);
        let mut camera = OrbitCamera::new(3.5, 0.3, 0.0, Vector3::new(0.0, 0.0, 0.0), 1.5);

        controller.yaw_velocity = 0.1;
        let start_yaw = camera.yaw;
        for _ in 0..400 {
            controller.update(&mut camera);
        }

        assert!(controller.yaw_velocity.abs() < REST_THRESHOLD);
        assert!(camera.yaw > start_yaw);

        // once at rest further updates leave the camera alone
        let settled = camera.yaw;
        for _ in 0..10 {
            controller.update(&mut camera);
        }
        assert_eq!(camera.yaw, settled);
    }
}
