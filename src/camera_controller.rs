use crate::camera::{Camera, Projection};
use crate::collision::HitBox;
use crate::player::{MoveDirection, Player};
use crate::terrain::GroundHeight;
use glam::Vec3;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Frames a toggle key stays inert after firing.
pub const DEFAULT_DEBOUNCE_FRAMES: u32 = 15;

/// Edge-triggered toggle with a cooldown, fed once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyDebounce {
    cooldown: u32,
    was_down: bool,
}

impl KeyDebounce {
    /// True on the frame the key goes down, unless it fired within the last
    /// `cooldown_frames` frames.
    pub fn trigger(&mut self, is_down: bool, cooldown_frames: u32) -> bool {
        let pressed = is_down && !self.was_down;
        self.was_down = is_down;

        if self.cooldown > 0 {
            self.cooldown -= 1;
            return false;
        }
        if pressed {
            self.cooldown = cooldown_frames;
        }
        pressed
    }
}

/// Debounce counters for the toggle keys, owned by the frame loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputDebounceState {
    pub cooldown_frames: u32,
    pub no_clip: KeyDebounce,
    pub gate: KeyDebounce,
}

impl Default for InputDebounceState {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_FRAMES)
    }
}

impl InputDebounceState {
    pub fn new(cooldown_frames: u32) -> Self {
        Self {
            cooldown_frames,
            no_clip: KeyDebounce::default(),
            gate: KeyDebounce::default(),
        }
    }
}

/// Toggles fired during a controller update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControllerEvents {
    pub no_clip_toggled: bool,
    pub gate_toggled: bool,
}

#[derive(Default)]
pub struct CameraController {
    is_forward_pressed: bool,
    is_backward_pressed: bool,
    is_left_pressed: bool,
    is_right_pressed: bool,
    is_jump_pressed: bool,
    is_no_clip_pressed: bool,
    is_gate_pressed: bool,

    mouse_delta_x: f32,
    mouse_delta_y: f32,
    zoom_delta: f32,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event: key_event, .. } => {
                let pressed = key_event.state == ElementState::Pressed;
                let PhysicalKey::Code(code) = key_event.physical_key else {
                    return false;
                };
                let slot = match code {
                    KeyCode::KeyW | KeyCode::ArrowUp => &mut self.is_forward_pressed,
                    KeyCode::KeyS | KeyCode::ArrowDown => &mut self.is_backward_pressed,
                    KeyCode::KeyA | KeyCode::ArrowLeft => &mut self.is_left_pressed,
                    KeyCode::KeyD | KeyCode::ArrowRight => &mut self.is_right_pressed,
                    KeyCode::Space => &mut self.is_jump_pressed,
                    KeyCode::KeyN => &mut self.is_no_clip_pressed,
                    KeyCode::KeyG => &mut self.is_gate_pressed,
                    _ => return false,
                };
                *slot = pressed;
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.zoom_delta += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                true
            }
            _ => false,
        }
    }

    pub fn process_mouse_motion(&mut self, delta_x: f64, delta_y: f64) {
        self.mouse_delta_x += delta_x as f32;
        self.mouse_delta_y += delta_y as f32;
    }

    pub fn set_key(&mut self, code: KeyCode, pressed: bool) {
        match code {
            KeyCode::KeyW => self.is_forward_pressed = pressed,
            KeyCode::KeyS => self.is_backward_pressed = pressed,
            KeyCode::KeyA => self.is_left_pressed = pressed,
            KeyCode::KeyD => self.is_right_pressed = pressed,
            KeyCode::Space => self.is_jump_pressed = pressed,
            KeyCode::KeyN => self.is_no_clip_pressed = pressed,
            KeyCode::KeyG => self.is_gate_pressed = pressed,
            _ => {}
        }
    }

    /// Applies one frame of accumulated input: look, walk, jump, fall, then
    /// moves the camera to the player's eye.
    #[allow(clippy::too_many_arguments)]
    pub fn update<G: GroundHeight + ?Sized>(
        &mut self,
        delta_time: f32,
        debounce: &mut InputDebounceState,
        camera: &mut Camera,
        projection: &mut Projection,
        player: &mut Player,
        ground: &G,
        boxes: &[HitBox],
        eye_height: f32,
    ) -> ControllerEvents {
        if self.mouse_delta_x != 0.0 || self.mouse_delta_y != 0.0 {
            camera.apply_mouse_delta(self.mouse_delta_x, self.mouse_delta_y);
        }
        if self.zoom_delta != 0.0 {
            projection.zoom(self.zoom_delta);
        }
        self.zoom_delta = 0.0;
        self.mouse_delta_x = 0.0;
        self.mouse_delta_y = 0.0;

        let cooldown = debounce.cooldown_frames;
        let events = ControllerEvents {
            no_clip_toggled: debounce.no_clip.trigger(self.is_no_clip_pressed, cooldown),
            gate_toggled: debounce.gate.trigger(self.is_gate_pressed, cooldown),
        };
        if events.no_clip_toggled {
            player.toggle_no_clip();
        }

        player.set_frame_time(delta_time);
        let moves = [
            (self.is_forward_pressed, MoveDirection::Forward),
            (self.is_backward_pressed, MoveDirection::Backward),
            (self.is_left_pressed, MoveDirection::Left),
            (self.is_right_pressed, MoveDirection::Right),
        ];
        for (held, direction) in moves {
            if held {
                player.try_move(direction, camera, boxes);
            }
        }

        if self.is_jump_pressed {
            let terrain_height = ground.ground_height(player.position.x, player.position.z);
            player.jump(terrain_height);
        }
        player.update(delta_time, ground);

        camera.position = player.position + Vec3::Y * eye_height;
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::LocomotionSettings;

    struct Flat;

    impl GroundHeight for Flat {
        fn ground_height(&self, _x: f32, _z: f32) -> f32 {
            0.0
        }
    }

    #[test]
    fn debounce_fires_once_per_press() {
        let mut key = KeyDebounce::default();
        assert!(key.trigger(true, 0));
        assert!(!key.trigger(true, 0));
        assert!(!key.trigger(false, 0));
        assert!(key.trigger(true, 0));
    }

    #[test]
    fn debounce_swallows_presses_during_cooldown() {
        let mut key = KeyDebounce::default();
        assert!(key.trigger(true, 3));
        assert!(!key.trigger(false, 3));
        assert!(!key.trigger(true, 3));
        assert!(!key.trigger(false, 3));
        assert!(key.trigger(true, 3));
    }

    #[test]
    fn update_walks_and_places_eye() {
        let mut controller = CameraController::new();
        let mut debounce = InputDebounceState::default();
        let mut camera = Camera::new(Vec3::ZERO, 0.0, 0.0, 0.1);
        let mut projection = Projection::new(800, 600, 45.0, 0.1, 100.0);
        let mut player = Player::new(Vec3::ZERO, LocomotionSettings::default());

        controller.set_key(KeyCode::KeyW, true);
        controller.set_key(KeyCode::KeyN, true);
        let events = controller.update(
            0.1,
            &mut debounce,
            &mut camera,
            &mut projection,
            &mut player,
            &Flat,
            &[],
            1.5,
        );

        assert!(events.no_clip_toggled);
        assert!(player.no_clip());
        assert!((player.position.x - 1.0).abs() < 1e-5);
        assert!((camera.position - (player.position + Vec3::Y * 1.5)).length() < 1e-6);
    }
}
