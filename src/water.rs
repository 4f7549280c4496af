//! Planar water shaded from per-frame reflection and refraction captures.

use crate::camera::{Camera, Projection};
use crate::capture::{PassTarget, Viewport};
use crate::error::{Result, WorldError};
use crate::model::Vertex;
use crate::terrain::grid_indices;
use glam::{Mat4, Vec3, Vec4};

/// Speed at which the du/dv distortion scrolls, in texture repeats per second.
const WAVE_SPEED: f32 = 0.03;

/// Half-space `a*x + b*y + c*z + d >= 0` kept by a draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipPlane(pub Vec4);

impl ClipPlane {
    /// Keeps everything.
    pub const NONE: ClipPlane = ClipPlane(Vec4::new(0.0, 0.0, 0.0, 1.0));

    /// Keeps geometry at or above `height`.
    pub fn above(height: f32) -> Self {
        Self(Vec4::new(0.0, 1.0, 0.0, -height))
    }

    /// Keeps geometry at or below `height`.
    pub fn below(height: f32) -> Self {
        Self(Vec4::new(0.0, -1.0, 0.0, height))
    }

    pub fn distance(&self, point: Vec3) -> f32 {
        self.0.dot(point.extend(1.0))
    }

    pub fn keeps(&self, point: Vec3) -> bool {
        self.distance(point) >= 0.0
    }
}

/// Camera matrices for one scene draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneView {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
}

impl SceneView {
    pub fn new(camera: &Camera, projection: Mat4) -> Self {
        Self {
            view: camera.build_view_matrix(),
            projection,
            camera_position: camera.position,
        }
    }
}

/// The render pipeline as seen by the water: bind a target, draw the scene into it.
pub trait ScenePass {
    fn bind_target(&mut self, target: PassTarget);
    fn draw_scene(&mut self, view: &SceneView, clip: Option<ClipPlane>);
}

pub trait FrameRenderer: ScenePass {
    fn draw_water(&mut self, water: &WaterSurface, view: &SceneView, time: f32);
}

/// Camera state saved by [`Mirror::apply`] and put back by [`Mirror::revert`].
#[must_use = "a mirrored camera must be reverted"]
#[derive(Debug)]
pub struct Mirror {
    position_y: f32,
    pitch: f32,
}

impl Mirror {
    /// Moves the camera to its reflection below the water plane and flips its pitch.
    pub fn apply(camera: &mut Camera, water_height: f32) -> Self {
        let saved = Self {
            position_y: camera.position.y,
            pitch: camera.pitch(),
        };
        let distance = 2.0 * (camera.position.y - water_height);
        camera.move_y_position(-distance);
        camera.invert_pitch();
        saved
    }

    pub fn revert(self, camera: &mut Camera) {
        camera.position.y = self.position_y;
        camera.set_orientation(camera.yaw(), self.pitch);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaterParams {
    pub resolution_x: usize,
    pub resolution_z: usize,
    pub scale: f32,
    /// Height of the plane in terrain space.
    pub height: f32,
    /// Terrain-to-world vertical offset.
    pub y_offset: f32,
    pub wave_strength: f32,
    pub colour: Vec3,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct WaterUniform {
    pub model: [[f32; 4]; 4],
    /// rgb colour, w wave strength
    pub colour: [f32; 4],
    /// xyz camera position, w distortion offset
    pub camera_position: [f32; 4],
    /// near plane, far plane, texture tiling, unused
    pub depth: [f32; 4],
    pub light_position: [f32; 4],
    pub light_colour: [f32; 4],
}

pub struct WaterSurface {
    params: WaterParams,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl WaterSurface {
    pub fn new(params: WaterParams) -> Result<Self> {
        let WaterParams {
            resolution_x,
            resolution_z,
            scale,
            height,
            ..
        } = params;
        if resolution_x < 2 || resolution_z < 2 {
            return Err(WorldError::ResolutionTooSmall {
                resolution_x,
                resolution_z,
            });
        }

        let mut vertices = Vec::with_capacity(resolution_x * resolution_z);
        for x in 0..resolution_x {
            for z in 0..resolution_z {
                vertices.push(Vertex {
                    position: [x as f32 * scale, height, z as f32 * scale],
                    normal: [0.0, 1.0, 0.0],
                    tex_coords: [
                        x as f32 / (resolution_x - 1) as f32,
                        z as f32 / (resolution_z - 1) as f32,
                    ],
                });
            }
        }
        let indices = grid_indices(resolution_x, resolution_z);

        log::info!("water plane at world height {:.2}", height + params.y_offset);
        Ok(Self {
            params,
            vertices,
            indices,
        })
    }

    pub fn params(&self) -> &WaterParams {
        &self.params
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// World-space height of the water plane.
    pub fn height(&self) -> f32 {
        self.params.height + self.params.y_offset
    }

    pub fn model_matrix(&self) -> Mat4 {
        let p = &self.params;
        Mat4::from_translation(Vec3::new(
            -(p.resolution_x as f32 * p.scale) / 2.0,
            p.y_offset,
            -(p.resolution_z as f32 * p.scale) / 2.0,
        ))
    }

    /// Keeps what lies above the water. The plane is always horizontal.
    pub fn reflection_clip_plane(&self) -> ClipPlane {
        ClipPlane::above(self.height())
    }

    pub fn refraction_clip_plane(&self) -> ClipPlane {
        ClipPlane::below(self.height())
    }

    pub fn is_underwater(&self, point: Vec3) -> bool {
        point.y < self.height()
    }

    /// Renders the reflection and refraction captures, leaving the camera
    /// exactly as it was and the window surface bound at `viewport`.
    pub fn capture<S: ScenePass + ?Sized>(
        &self,
        camera: &mut Camera,
        projection: Mat4,
        scene: &mut S,
        viewport: Viewport,
    ) {
        let mirror = Mirror::apply(camera, self.height());
        scene.bind_target(PassTarget::Reflection);
        scene.draw_scene(&SceneView::new(camera, projection), Some(self.reflection_clip_plane()));
        mirror.revert(camera);

        scene.bind_target(PassTarget::Refraction);
        scene.draw_scene(&SceneView::new(camera, projection), Some(self.refraction_clip_plane()));

        scene.bind_target(PassTarget::Default(viewport));
    }

    pub fn uniform(
        &self,
        time: f32,
        near: f32,
        far: f32,
        camera_position: Vec3,
        light: (Vec3, Vec3),
    ) -> WaterUniform {
        let move_factor = (time * WAVE_SPEED).fract();
        WaterUniform {
            model: self.model_matrix().to_cols_array_2d(),
            colour: self.params.colour.extend(self.params.wave_strength).to_array(),
            camera_position: camera_position.extend(move_factor).to_array(),
            depth: [near, far, (self.params.resolution_x as f32 / 16.0).max(1.0), 0.0],
            light_position: light.0.extend(1.0).to_array(),
            light_colour: light.1.extend(1.0).to_array(),
        }
    }
}

/// One full frame: both water captures, the main scene, then the water.
pub fn render_frame<R: FrameRenderer + ?Sized>(
    water: &WaterSurface,
    camera: &mut Camera,
    projection: &Projection,
    renderer: &mut R,
    viewport: Viewport,
    time: f32,
) {
    let projection = projection.build_projection_matrix();
    water.capture(camera, projection, renderer, viewport);

    let view = SceneView::new(camera, projection);
    renderer.draw_scene(&view, None);
    renderer.draw_water(water, &view, time);
}
