use glam::{Mat4, Vec3};

/// Pitch is held inside this range (degrees); the basis degenerates at ±90.
pub const PITCH_LIMIT: f32 = 89.0;

/// First-person camera driven by yaw/pitch in degrees.
///
/// Yaw 0 looks down +X and yaw -90 looks down -Z. The basis vectors are
/// recomputed whenever the orientation changes.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    yaw: f32,
    pitch: f32,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    pub rotation_sensitivity: f32,
}

impl Camera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32, rotation_sensitivity: f32) -> Self {
        let mut camera = Self {
            position,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            forward: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
            rotation_sensitivity,
        };
        camera.update_basis();
        camera
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Forward direction flattened onto the ground plane.
    pub fn forward_horizontal(&self) -> Vec3 {
        Vec3::new(self.forward.x, 0.0, self.forward.z).normalize_or_zero()
    }

    /// Pointer deltas in pixels; positive `dy` (pointer moving down) looks down.
    pub fn apply_mouse_delta(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.rotation_sensitivity;
        self.pitch = (self.pitch - dy * self.rotation_sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_basis();
    }

    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_basis();
    }

    pub fn move_y_position(&mut self, distance: f32) {
        self.position.y += distance;
    }

    pub fn invert_pitch(&mut self) {
        self.pitch = -self.pitch;
        self.update_basis();
    }

    pub fn build_view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward, self.up)
    }

    fn update_basis(&mut self) {
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.to_radians().sin_cos();

        self.forward = Vec3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw).normalize();
        self.right = self.forward.cross(Vec3::Y).normalize();
        self.up = self.right.cross(self.forward).normalize();
    }
}

pub struct Projection {
    aspect: f32,
    fovy: f32,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub const MIN_FOV: f32 = 1.0;
    pub const MAX_FOV: f32 = 45.0;

    pub fn new(width: u32, height: u32, fovy_degrees: f32, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy_degrees.clamp(Self::MIN_FOV, Self::MAX_FOV),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Scroll zoom; narrows the field of view for positive offsets.
    pub fn zoom(&mut self, offset: f32) {
        self.fovy = (self.fovy - offset).clamp(Self::MIN_FOV, Self::MAX_FOV);
    }

    pub fn fovy_degrees(&self) -> f32 {
        self.fovy
    }

    pub fn znear(&self) -> f32 {
        self.znear
    }

    pub fn zfar(&self) -> f32 {
        self.zfar
    }

    pub fn build_projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy.to_radians(), self.aspect, self.znear, self.zfar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaw_zero_looks_down_x() {
        let camera = Camera::new(Vec3::ZERO, 0.0, 0.0, 0.1);
        assert!((camera.forward() - Vec3::X).length() < 1e-6);
        assert!((camera.right() - Vec3::Z).length() < 1e-6);
        assert!((camera.up() - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::new(Vec3::ZERO, -90.0, 0.0, 1.0);
        camera.apply_mouse_delta(0.0, -500.0);
        assert_eq!(camera.pitch(), PITCH_LIMIT);
        camera.apply_mouse_delta(0.0, 1000.0);
        assert_eq!(camera.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn horizontal_forward_ignores_pitch() {
        let camera = Camera::new(Vec3::ZERO, 30.0, 60.0, 1.0);
        let flat = camera.forward_horizontal();
        assert_eq!(flat.y, 0.0);
        assert!((flat.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zoom_is_bounded() {
        let mut projection = Projection::new(1920, 1080, 45.0, 0.1, 1000.0);
        projection.zoom(100.0);
        assert_eq!(projection.fovy_degrees(), Projection::MIN_FOV);
        projection.zoom(-100.0);
        assert_eq!(projection.fovy_degrees(), Projection::MAX_FOV);
    }
}
