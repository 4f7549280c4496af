use glam::Vec3;
use serde::Deserialize;

/// Axis-aligned box described by its centre and half-extents.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct HitBox {
    pub origin: Vec3,
    pub size: Vec3,
}

impl HitBox {
    pub fn new(origin: Vec3, size: Vec3) -> Self {
        Self { origin, size }
    }

    /// Box spanning the corners `min` and `max`.
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            origin: (min + max) * 0.5,
            size: (max - min).abs() * 0.5,
        }
    }

    pub fn min(&self) -> Vec3 {
        self.origin - self.size
    }

    pub fn max(&self) -> Vec3 {
        self.origin + self.size
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.origin += offset;
    }

    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            origin: self.origin + offset,
            size: self.size,
        }
    }

    /// Strict overlap on all three axes; touching faces do not collide.
    pub fn overlaps(&self, other: &HitBox) -> bool {
        let distance = (self.origin - other.origin).abs();
        let reach = self.size + other.size;
        distance.cmplt(reach).all()
    }
}

/// True when a box at `candidate_origin` with half-extents `candidate_size`
/// overlaps any of `boxes`. Linear scan.
pub fn collision_detected(candidate_origin: Vec3, candidate_size: Vec3, boxes: &[HitBox]) -> bool {
    let candidate = HitBox::new(candidate_origin, candidate_size);
    boxes.iter().any(|b| candidate.overlaps(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_requires_all_three_axes() {
        let a = HitBox::new(Vec3::ZERO, Vec3::splat(0.5));
        assert!(a.overlaps(&HitBox::new(Vec3::new(0.9, 0.9, 0.9), Vec3::splat(0.5))));
        assert!(!a.overlaps(&HitBox::new(Vec3::new(0.9, 0.9, 1.1), Vec3::splat(0.5))));
    }

    #[test]
    fn touching_faces_do_not_collide() {
        let a = HitBox::new(Vec3::ZERO, Vec3::splat(0.5));
        let b = HitBox::new(Vec3::new(1.0, 0.0, 0.0), Vec3::splat(0.5));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn any_box_blocks() {
        let boxes = [
            HitBox::new(Vec3::new(10.0, 0.0, 0.0), Vec3::ONE),
            HitBox::new(Vec3::new(0.0, 0.0, 1.2), Vec3::ONE),
        ];
        assert!(collision_detected(Vec3::ZERO, Vec3::splat(0.5), &boxes));
        assert!(!collision_detected(Vec3::new(0.0, 5.0, 0.0), Vec3::splat(0.5), &boxes));
        assert!(!collision_detected(Vec3::ZERO, Vec3::splat(0.5), &[]));
    }

    #[test]
    fn min_max_round_trip() {
        let b = HitBox::from_min_max(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, 2.0, 4.0));
        assert_eq!(b.origin, Vec3::new(1.0, 1.0, 3.0));
        assert_eq!(b.size, Vec3::new(2.0, 1.0, 1.0));
        assert_eq!(b.min(), Vec3::new(-1.0, 0.0, 2.0));
        assert_eq!(b.max(), Vec3::new(3.0, 2.0, 4.0));
    }
}
