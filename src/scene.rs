//! Static scene props kept in an arena and addressed by stable handles.

use crate::collision::HitBox;
use crate::terrain::GroundHeight;
use glam::{Mat4, Vec2, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModelHandle(usize);

impl ModelHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub hitbox: HitBox,
    /// Whether the player collides with this object.
    pub solid: bool,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, hitbox: HitBox) -> Self {
        Self {
            name: name.into(),
            hitbox,
            solid: true,
        }
    }

    /// Drawn but never collided with.
    pub fn passable(name: impl Into<String>, hitbox: HitBox) -> Self {
        Self {
            solid: false,
            ..Self::new(name, hitbox)
        }
    }

    /// Transform taking the unit cube onto this object's box.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.hitbox.size * 2.0,
            glam::Quat::IDENTITY,
            self.hitbox.origin,
        )
    }
}

#[derive(Clone, Debug, Default)]
pub struct ModelArena {
    slots: Vec<SceneObject>,
}

impl ModelArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, object: SceneObject) -> ModelHandle {
        self.slots.push(object);
        ModelHandle(self.slots.len() - 1)
    }

    pub fn get(&self, handle: ModelHandle) -> Option<&SceneObject> {
        self.slots.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: ModelHandle) -> Option<&mut SceneObject> {
        self.slots.get_mut(handle.0)
    }

    /// Overwrites the slot behind `handle`, returning the previous occupant.
    pub fn replace(&mut self, handle: ModelHandle, object: SceneObject) -> Option<SceneObject> {
        self.slots
            .get_mut(handle.0)
            .map(|slot| std::mem::replace(slot, object))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModelHandle, &SceneObject)> {
        self.slots.iter().enumerate().map(|(i, o)| (ModelHandle(i), o))
    }

    /// Hitboxes of every solid object, for movement checks.
    pub fn hitboxes(&self) -> Vec<HitBox> {
        self.slots
            .iter()
            .filter(|o| o.solid)
            .map(|o| o.hitbox)
            .collect()
    }
}

/// Rectangular fenced enclosure. `length` panels along X, `width` along Z.
///
/// The first panel on the near X side doubles as the gate.
#[derive(Clone, Debug)]
pub struct Paddock {
    length: usize,
    width: usize,
    origin: Vec2,
    /// Half-extents of a panel running along X.
    panel: Vec3,
    nodes: Vec<ModelHandle>,
    gate_open: bool,
}

impl Paddock {
    pub fn spawn(
        arena: &mut ModelArena,
        length: usize,
        width: usize,
        origin: Vec2,
        panel_half_extents: Vec3,
    ) -> Self {
        let panel = panel_half_extents;
        let across = Vec3::new(panel.z, panel.y, panel.x);
        let step = panel.x * 2.0;
        let mut nodes = Vec::with_capacity(2 * (length + width));

        for i in 0..length {
            let x = origin.x + panel.x + i as f32 * step;
            for (side, z) in [("near", origin.y), ("far", origin.y + width as f32 * step)] {
                let hitbox = HitBox::new(Vec3::new(x, 0.0, z), panel);
                nodes.push(arena.insert(SceneObject::new(format!("fence-x-{side}-{i}"), hitbox)));
            }
        }
        for j in 0..width {
            let z = origin.y + panel.x + j as f32 * step;
            for (side, x) in [("near", origin.x), ("far", origin.x + length as f32 * step)] {
                let hitbox = HitBox::new(Vec3::new(x, 0.0, z), across);
                nodes.push(arena.insert(SceneObject::new(format!("fence-z-{side}-{j}"), hitbox)));
            }
        }

        if let Some(gate) = nodes.first().and_then(|&h| arena.get_mut(h)) {
            gate.solid = false;
        }

        log::info!("paddock {}x{} with {} fence panels", length, width, nodes.len());
        Self {
            length,
            width,
            origin,
            panel,
            nodes,
            gate_open: false,
        }
    }

    pub fn nodes(&self) -> &[ModelHandle] {
        &self.nodes
    }

    pub fn gate(&self) -> Option<ModelHandle> {
        self.nodes.first().copied()
    }

    pub fn gate_open(&self) -> bool {
        self.gate_open
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.length, self.width)
    }

    /// Rests every panel on the ground beneath its centre.
    pub fn snap_to_terrain<G: GroundHeight + ?Sized>(&self, arena: &mut ModelArena, ground: &G) {
        for &handle in &self.nodes {
            if let Some(object) = arena.get_mut(handle) {
                let hitbox = &mut object.hitbox;
                hitbox.origin.y =
                    ground.ground_height(hitbox.origin.x, hitbox.origin.z) + hitbox.size.y;
            }
        }
    }

    /// Hitboxes of the fence. The gate is passable and left out.
    pub fn push_hitboxes(&self, arena: &ModelArena, hitboxes: &mut Vec<HitBox>) {
        hitboxes.extend(
            self.nodes
                .iter()
                .filter_map(|&h| arena.get(h))
                .filter(|o| o.solid)
                .map(|o| o.hitbox),
        );
    }

    /// Swings the gate between its closed slot in the near fence and an open
    /// pose perpendicular to it, hinged at the paddock corner.
    pub fn toggle_gate<G: GroundHeight + ?Sized>(
        &mut self,
        arena: &mut ModelArena,
        ground: &G,
    ) -> bool {
        let Some(gate) = self.gate() else {
            return self.gate_open;
        };

        let (name, size, x, z) = if self.gate_open {
            ("gate-closed", self.panel, self.origin.x + self.panel.x, self.origin.y)
        } else {
            let across = Vec3::new(self.panel.z, self.panel.y, self.panel.x);
            ("gate-open", across, self.origin.x, self.origin.y - self.panel.x)
        };
        let y = ground.ground_height(x, z) + size.y;
        arena.replace(gate, SceneObject::passable(name, HitBox::new(Vec3::new(x, y, z), size)));

        self.gate_open = !self.gate_open;
        log::debug!("paddock gate {}", if self.gate_open { "opened" } else { "closed" });
        self.gate_open
    }
}
