//! Walkable heightfield world with planar water.

pub mod camera;
pub mod camera_controller;
pub mod capture;
pub mod collision;
pub mod config;
pub mod error;
pub mod heightmap;
pub mod model;
pub mod player;
pub mod renderer;
pub mod scene;
pub mod terrain;
pub mod texture;
pub mod water;

pub use error::{Result, WorldError};
