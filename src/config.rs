//! Runtime configuration.
//!
//! Read from the JSON file named by `MEADOW_CONFIG`, else `meadow.json` in the
//! working directory when present, else built-in defaults. Every field is
//! optional in the file.

use crate::capture::Viewport;
use crate::collision::HitBox;
use crate::player::LocomotionSettings;
use crate::terrain::TerrainParams;
use crate::water::WaterParams;
use anyhow::{Context, Result, bail};
use glam::{Vec2, Vec3};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "MEADOW_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "meadow.json";

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub terrain: TerrainConfig,
    pub water: WaterConfig,
    pub locomotion: LocomotionConfig,
    pub paddock: PaddockConfig,
    pub light: LightConfig,
    /// Extra static obstacles in world space.
    pub obstacles: Vec<HitBox>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Meadow".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub yaw: f32,
    pub pitch: f32,
    /// Degrees per pixel of pointer motion.
    pub rotation_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 45.0,
            near: 0.1,
            far: 1000.0,
            yaw: -90.0,
            pitch: 0.0,
            rotation_sensitivity: 0.05,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub resolution_x: usize,
    pub resolution_z: usize,
    pub scale: f32,
    pub max_height: f32,
    pub y_offset: f32,
    /// Greyscale height image; procedural hills when unset.
    pub heightmap: Option<PathBuf>,
    pub texture: Option<PathBuf>,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            resolution_x: 256,
            resolution_z: 256,
            scale: 0.5,
            max_height: 15.0,
            y_offset: -20.0,
            heightmap: None,
            texture: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct WaterConfig {
    /// Plane height in terrain space.
    pub height: f32,
    pub reflection_width: u32,
    pub reflection_height: u32,
    pub refraction_width: u32,
    pub refraction_height: u32,
    pub wave_strength: f32,
    pub colour: Vec3,
    pub dudv_map: Option<PathBuf>,
    pub normal_map: Option<PathBuf>,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            height: 5.0,
            reflection_width: 320,
            reflection_height: 180,
            refraction_width: 1280,
            refraction_height: 720,
            wave_strength: 0.02,
            colour: Vec3::new(0.0, 0.467, 0.745),
            dudv_map: None,
            normal_map: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    pub movement_speed: f32,
    pub gravity: f32,
    pub terminal_velocity: f32,
    pub jump_velocity: f32,
    pub eye_height: f32,
    pub hitbox_size: Vec3,
    /// World-space (x, z) spawn point.
    pub spawn: Vec2,
    pub debounce_frames: u32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        let settings = LocomotionSettings::default();
        Self {
            movement_speed: settings.movement_speed,
            gravity: settings.gravity,
            terminal_velocity: settings.terminal_velocity,
            jump_velocity: settings.jump_velocity,
            eye_height: 1.7,
            hitbox_size: settings.hitbox_size,
            spawn: Vec2::ZERO,
            debounce_frames: crate::camera_controller::DEFAULT_DEBOUNCE_FRAMES,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PaddockConfig {
    pub enabled: bool,
    pub length: usize,
    pub width: usize,
    /// World-space (x, z) corner.
    pub origin: Vec2,
    pub panel_half_extents: Vec3,
}

impl Default for PaddockConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            length: 4,
            width: 3,
            origin: Vec2::new(5.0, 5.0),
            panel_half_extents: Vec3::new(1.0, 0.6, 0.08),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub position: Vec3,
    pub colour: Vec3,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(200.0, 300.0, 100.0),
            colour: Vec3::ONE,
        }
    }
}

impl Config {
    /// Resolves the config source as described in the module docs.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_path(path);
        }
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            return Self::from_path(default_path);
        }
        log::info!("no config file, using defaults");
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config =
            Self::from_json(&text).with_context(|| format!("loading config {}", path.display()))?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).context("parsing config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let t = &self.terrain;
        if t.resolution_x < 2 || t.resolution_z < 2 {
            bail!(
                "terrain resolution must be at least 2x2, got {}x{}",
                t.resolution_x,
                t.resolution_z
            );
        }
        if t.scale <= 0.0 {
            bail!("terrain scale must be positive, got {}", t.scale);
        }
        if self.camera.near <= 0.0 || self.camera.far <= self.camera.near {
            bail!(
                "camera planes must satisfy 0 < near < far, got {} / {}",
                self.camera.near,
                self.camera.far
            );
        }
        let w = &self.water;
        if w.reflection_width == 0
            || w.reflection_height == 0
            || w.refraction_width == 0
            || w.refraction_height == 0
        {
            bail!("water capture targets must be non-empty");
        }
        Ok(())
    }

    pub fn terrain_params(&self) -> TerrainParams {
        TerrainParams {
            resolution_x: self.terrain.resolution_x,
            resolution_z: self.terrain.resolution_z,
            scale: self.terrain.scale,
            max_height: self.terrain.max_height,
            y_offset: self.terrain.y_offset,
        }
    }

    /// The water spans the terrain footprint.
    pub fn water_params(&self) -> WaterParams {
        WaterParams {
            resolution_x: self.terrain.resolution_x,
            resolution_z: self.terrain.resolution_z,
            scale: self.terrain.scale,
            height: self.water.height,
            y_offset: self.terrain.y_offset,
            wave_strength: self.water.wave_strength,
            colour: self.water.colour,
        }
    }

    pub fn locomotion_settings(&self) -> LocomotionSettings {
        let l = &self.locomotion;
        LocomotionSettings {
            movement_speed: l.movement_speed,
            gravity: l.gravity,
            terminal_velocity: l.terminal_velocity,
            jump_velocity: l.jump_velocity,
            hitbox_size: l.hitbox_size,
        }
    }

    pub fn reflection_viewport(&self) -> Viewport {
        Viewport::new(self.water.reflection_width, self.water.reflection_height)
    }

    pub fn refraction_viewport(&self) -> Viewport {
        Viewport::new(self.water.refraction_width, self.water.refraction_height)
    }
}
