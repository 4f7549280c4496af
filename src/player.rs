use crate::camera::Camera;
use crate::collision::{HitBox, collision_detected};
use crate::terrain::GroundHeight;
use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocomotionSettings {
    /// Walking speed in world units per second.
    pub movement_speed: f32,
    pub gravity: f32,
    /// Upper bound on the magnitude of vertical velocity.
    pub terminal_velocity: f32,
    /// Upward velocity applied by a jump.
    pub jump_velocity: f32,
    /// Half-extents of the player's hitbox.
    pub hitbox_size: Vec3,
}

impl Default for LocomotionSettings {
    fn default() -> Self {
        Self {
            movement_speed: 10.0,
            gravity: 9.8,
            terminal_velocity: 50.0,
            jump_velocity: 5.0,
            hitbox_size: Vec3::new(0.3, 0.9, 0.3),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub position: Vec3,
    vertical_velocity: f32,
    grounded: bool,
    no_clip: bool,
    /// Distance covered by one movement call; speed scaled by frame time.
    movement_sensitivity: f32,
    settings: LocomotionSettings,
}

impl Player {
    pub fn new(position: Vec3, settings: LocomotionSettings) -> Self {
        Self {
            position,
            vertical_velocity: 0.0,
            grounded: false,
            no_clip: false,
            movement_sensitivity: 0.0,
            settings,
        }
    }

    pub fn settings(&self) -> &LocomotionSettings {
        &self.settings
    }

    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn no_clip(&self) -> bool {
        self.no_clip
    }

    /// Body box standing on `position` (the feet).
    pub fn hitbox(&self) -> HitBox {
        let size = self.settings.hitbox_size;
        HitBox::new(self.position + Vec3::Y * size.y, size)
    }

    pub fn set_movement_sensitivity(&mut self, sensitivity: f32) {
        self.movement_sensitivity = sensitivity;
    }

    /// Scales the movement step by the frame time.
    pub fn set_frame_time(&mut self, delta_time: f32) {
        self.movement_sensitivity = self.settings.movement_speed * delta_time;
    }

    pub fn toggle_no_clip(&mut self) -> bool {
        self.no_clip = !self.no_clip;
        log::debug!("no-clip {}", if self.no_clip { "on" } else { "off" });
        self.no_clip
    }

    /// Moves one step along a camera axis. Returns whether the move was committed.
    ///
    /// A step that would overlap any of `boxes` is rejected as a whole; there
    /// is no sliding along the obstacle. Walking ignores the camera's pitch,
    /// flying in no-clip follows it.
    pub fn try_move(
        &mut self,
        direction: MoveDirection,
        camera: &Camera,
        boxes: &[HitBox],
    ) -> bool {
        let forward = if self.no_clip {
            camera.forward()
        } else {
            camera.forward_horizontal()
        };
        let axis = match direction {
            MoveDirection::Forward => forward,
            MoveDirection::Backward => -forward,
            MoveDirection::Right => camera.right(),
            MoveDirection::Left => -camera.right(),
        };

        let step = axis * self.movement_sensitivity;
        let candidate = self.hitbox().translated(step);
        if !self.no_clip && collision_detected(candidate.origin, candidate.size, boxes) {
            return false;
        }
        self.position += step;
        true
    }

    /// Starts a jump if the player stands on (or below) the terrain.
    pub fn jump(&mut self, terrain_height: f32) -> bool {
        if self.no_clip || self.position.y > terrain_height {
            return false;
        }
        self.vertical_velocity = self.settings.jump_velocity;
        self.grounded = false;
        log::debug!("jump from {:.2}", terrain_height);
        true
    }

    /// Advances gravity by one frame against the ground below the player.
    pub fn update<G: GroundHeight + ?Sized>(&mut self, delta_time: f32, ground: &G) {
        let terrain_height = ground.ground_height(self.position.x, self.position.z);
        self.apply_gravity(delta_time, terrain_height);
    }

    pub fn apply_gravity(&mut self, delta_time: f32, terrain_height: f32) {
        if self.no_clip {
            return;
        }

        let airborne = self.position.y > terrain_height || self.vertical_velocity > 0.0;
        if airborne {
            let terminal = self.settings.terminal_velocity;
            self.vertical_velocity = (self.vertical_velocity
                - self.settings.gravity * delta_time)
                .clamp(-terminal, terminal);
            self.position.y += self.vertical_velocity * delta_time;
        }

        if self.position.y <= terrain_height {
            if !self.grounded {
                log::debug!("landed at {:.2}", terrain_height);
            }
            self.position.y = terrain_height;
            self.vertical_velocity = 0.0;
            self.grounded = true;
        } else {
            self.grounded = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flat(f32);

    impl GroundHeight for Flat {
        fn ground_height(&self, _x: f32, _z: f32) -> f32 {
            self.0
        }
    }

    fn player_at(position: Vec3) -> Player {
        Player::new(position, LocomotionSettings::default())
    }

    #[test]
    fn grounded_player_is_pinned_to_terrain() {
        let mut player = player_at(Vec3::new(0.0, 2.0, 0.0));
        player.apply_gravity(0.016, 3.5);
        assert_eq!(player.position.y, 3.5);
        assert!(player.is_grounded());
        assert_eq!(player.vertical_velocity(), 0.0);
    }

    #[test]
    fn falling_is_bounded_by_terminal_velocity() {
        let mut player = player_at(Vec3::new(0.0, 10_000.0, 0.0));
        for _ in 0..1000 {
            player.update(0.1, &Flat(0.0));
        }
        assert!(player.vertical_velocity() >= -player.settings().terminal_velocity);
        assert!(!player.is_grounded());
    }

    #[test]
    fn jump_rises_then_lands() {
        let mut player = player_at(Vec3::ZERO);
        player.apply_gravity(0.016, 0.0);
        assert!(player.jump(0.0));

        player.apply_gravity(0.016, 0.0);
        assert!(player.position.y > 0.0);
        assert!(!player.is_grounded());

        for _ in 0..500 {
            player.apply_gravity(0.016, 0.0);
        }
        assert_eq!(player.position.y, 0.0);
        assert!(player.is_grounded());
    }

    #[test]
    fn no_clip_ignores_gravity_and_boxes() {
        let mut player = player_at(Vec3::new(0.0, 5.0, 0.0));
        player.toggle_no_clip();
        player.apply_gravity(1.0, 0.0);
        assert_eq!(player.position.y, 5.0);
        assert!(!player.jump(10.0));

        let camera = Camera::new(Vec3::ZERO, 0.0, 0.0, 1.0);
        let wall = [HitBox::new(Vec3::new(1.0, 5.0, 0.0), Vec3::ONE)];
        player.set_movement_sensitivity(0.5);
        assert!(player.try_move(MoveDirection::Forward, &camera, &wall));
        assert_eq!(player.position, Vec3::new(0.5, 5.0, 0.0));
    }

    #[test]
    fn walking_never_climbs_with_pitch() {
        let mut player = player_at(Vec3::ZERO);
        let camera = Camera::new(Vec3::ZERO, 0.0, 60.0, 1.0);
        player.set_movement_sensitivity(1.0);
        assert!(player.try_move(MoveDirection::Forward, &camera, &[]));
        assert_eq!(player.position.y, 0.0);
        assert!((player.position.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn strafing_uses_camera_right() {
        let mut player = player_at(Vec3::ZERO);
        let camera = Camera::new(Vec3::ZERO, 0.0, 0.0, 1.0);
        player.set_movement_sensitivity(2.0);
        player.try_move(MoveDirection::Left, &camera, &[]);
        assert!((player.position - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-6);
        player.try_move(MoveDirection::Backward, &camera, &[]);
        assert!((player.position - Vec3::new(-2.0, 0.0, -2.0)).length() < 1e-6);
    }
}
