//! Heightfield terrain: static mesh synthesis and per-column height lookup.
//!
//! Vertex `(x, z)` of the grid lives at index `x * resolution_z + z` in both the
//! mesh and the height lookup table. Mesh positions are in terrain space
//! (`x * scale`, height, `z * scale`); [`HeightfieldTerrain::model_matrix`]
//! centres the terrain on the world origin and applies the vertical offset.

use crate::error::{Result, WorldError};
use crate::heightmap::HeightSamples;
use crate::model::Vertex;
use glam::{Mat4, Vec3};

/// Anything the player can stand on.
pub trait GroundHeight {
    /// World-space ground height below the world-space point `(x, z)`.
    fn ground_height(&self, x: f32, z: f32) -> f32;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainParams {
    /// Vertex count along X.
    pub resolution_x: usize,
    /// Vertex count along Z.
    pub resolution_z: usize,
    /// World units per grid step.
    pub scale: f32,
    pub max_height: f32,
    pub y_offset: f32,
}

#[derive(Clone, Debug)]
pub struct TerrainMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

pub struct HeightfieldTerrain {
    params: TerrainParams,
    mesh: TerrainMesh,
    heights: Vec<f32>,
}

impl HeightfieldTerrain {
    pub fn new(params: TerrainParams, samples: &HeightSamples) -> Result<Self> {
        let TerrainParams {
            resolution_x,
            resolution_z,
            scale,
            max_height,
            ..
        } = params;

        if resolution_x < 2 || resolution_z < 2 {
            return Err(WorldError::ResolutionTooSmall {
                resolution_x,
                resolution_z,
            });
        }
        let expected = resolution_x * resolution_z;
        if samples.len() != expected
            || samples.resolution_x() != resolution_x
            || samples.resolution_z() != resolution_z
        {
            return Err(WorldError::SampleCountMismatch {
                expected,
                actual: samples.len(),
            });
        }

        let mut heights = vec![0.0; expected];
        let mut vertices = Vec::with_capacity(expected);

        for x in 0..resolution_x {
            for z in 0..resolution_z {
                let height = samples.get(x, z).unwrap_or(0.0) * max_height;
                heights[x * resolution_z + z] = height;

                vertices.push(Vertex {
                    position: [x as f32 * scale, height, z as f32 * scale],
                    normal: [0.0, 1.0, 0.0],
                    // Checkerboard tiling; blending happens in the fragment stage.
                    tex_coords: [
                        if x % 2 == 0 { 1.0 } else { 0.0 },
                        if z % 2 == 0 { 1.0 } else { 0.0 },
                    ],
                });
            }
        }

        let indices = grid_indices(resolution_x, resolution_z);
        estimate_normals(&mut vertices, &indices);

        log::info!(
            "terrain {}x{}: {} vertices, {} indices",
            resolution_x,
            resolution_z,
            vertices.len(),
            indices.len()
        );

        Ok(Self {
            params,
            mesh: TerrainMesh { vertices, indices },
            heights,
        })
    }

    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    pub fn mesh(&self) -> &TerrainMesh {
        &self.mesh
    }

    /// Terrain-space height at grid column `(x, z)`. No interpolation.
    pub fn height_at(&self, x: usize, z: usize) -> Result<f32> {
        let TerrainParams {
            resolution_x,
            resolution_z,
            ..
        } = self.params;
        if x >= resolution_x || z >= resolution_z {
            return Err(WorldError::HeightQueryOutOfRange {
                x,
                z,
                resolution_x,
                resolution_z,
            });
        }
        Ok(self.heights[x * resolution_z + z])
    }

    /// Like [`height_at`](Self::height_at) but snaps out-of-range columns to the edge.
    pub fn height_at_clamped(&self, x: i64, z: i64) -> f32 {
        let x = x.clamp(0, self.params.resolution_x as i64 - 1) as usize;
        let z = z.clamp(0, self.params.resolution_z as i64 - 1) as usize;
        self.heights[x * self.params.resolution_z + z]
    }

    /// World-space translation applied to the terrain mesh.
    pub fn origin(&self) -> Vec3 {
        let p = &self.params;
        Vec3::new(
            -(p.resolution_x as f32 * p.scale) / 2.0,
            p.y_offset,
            -(p.resolution_z as f32 * p.scale) / 2.0,
        )
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.origin())
    }

    /// Nearest grid column under a world-space point, unclamped.
    pub fn grid_coords(&self, world_x: f32, world_z: f32) -> (i64, i64) {
        let origin = self.origin();
        let x = ((world_x - origin.x) / self.params.scale).round() as i64;
        let z = ((world_z - origin.z) / self.params.scale).round() as i64;
        (x, z)
    }

    /// World position of grid column `(x, z)` at its terrain height.
    pub fn grid_to_world(&self, x: usize, z: usize) -> Option<Vec3> {
        let height = self.height_at(x, z).ok()?;
        Some(
            self.origin()
                + Vec3::new(
                    x as f32 * self.params.scale,
                    height,
                    z as f32 * self.params.scale,
                ),
        )
    }

    pub fn world_height_at(&self, world_x: f32, world_z: f32) -> f32 {
        let (x, z) = self.grid_coords(world_x, world_z);
        self.height_at_clamped(x, z) + self.params.y_offset
    }
}

impl GroundHeight for HeightfieldTerrain {
    fn ground_height(&self, x: f32, z: f32) -> f32 {
        self.world_height_at(x, z)
    }
}

/// Two triangles per grid quad, with the vertex of column `(x, z)` at
/// `x * resolution_z + z`.
///
/// For quad `(i, j)` the winding is `(i, j+1), (i, j), (i+1, j)` then
/// `(i+1, j), (i+1, j+1), (i, j+1)`: clockwise when seen from above.
pub fn grid_indices(resolution_x: usize, resolution_z: usize) -> Vec<u32> {
    let quads = resolution_x.saturating_sub(1) * resolution_z.saturating_sub(1);
    let mut indices = Vec::with_capacity(quads * 6);
    let at = |x: usize, z: usize| (x * resolution_z + z) as u32;

    for i in 0..resolution_x.saturating_sub(1) {
        for j in 0..resolution_z.saturating_sub(1) {
            indices.extend_from_slice(&[at(i, j + 1), at(i, j), at(i + 1, j)]);
            indices.extend_from_slice(&[at(i + 1, j), at(i + 1, j + 1), at(i, j + 1)]);
        }
    }
    indices
}

/// Per-vertex normals as the plain mean of the unit normals of every triangle
/// touching the vertex (up to six for interior vertices).
fn estimate_normals(vertices: &mut [Vertex], indices: &[u32]) {
    let mut sums = vec![Vec3::ZERO; vertices.len()];
    let mut counts = vec![0u32; vertices.len()];

    for tri in indices.chunks_exact(3) {
        let corners = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        for k in 0..3 {
            let v = corners[k];
            let next = corners[(k + 1) % 3];
            let prev = corners[(k + 2) % 3];

            let p = Vec3::from(vertices[v].position);
            let to_next = Vec3::from(vertices[next].position) - p;
            let to_prev = Vec3::from(vertices[prev].position) - p;

            sums[v] += to_prev.cross(to_next).normalize_or_zero();
            counts[v] += 1;
        }
    }

    for (i, vertex) in vertices.iter_mut().enumerate() {
        if counts[i] == 0 {
            continue;
        }
        let mean = sums[i] / counts[i] as f32;
        let normal = if mean.length_squared() > f32::EPSILON {
            mean.normalize()
        } else {
            Vec3::Y
        };
        vertex.normal = normal.to_array();
    }
}
