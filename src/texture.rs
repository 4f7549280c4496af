use anyhow::{Context, Result};
use image::GenericImageView;
use std::path::Path;
use wgpu::util::DeviceExt;

pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

fn repeating_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    rgba: &[u8],
    dimensions: (u32, u32),
    format: wgpu::TextureFormat,
    label: &str,
) -> Texture {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: dimensions.0,
                height: dimensions.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        rgba,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = repeating_sampler(device);

    Texture {
        texture,
        view,
        sampler,
    }
}

pub fn from_bytes(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    bytes: &[u8],
    format: wgpu::TextureFormat,
    label: &str,
) -> Result<Texture> {
    let img = image::load_from_memory(bytes).with_context(|| format!("decoding {label}"))?;
    let rgba = img.to_rgba8();
    Ok(upload(device, queue, &rgba, img.dimensions(), format, label))
}

/// 1x1 texture of a single colour.
pub fn solid(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    rgba: [u8; 4],
    format: wgpu::TextureFormat,
    label: &str,
) -> Texture {
    upload(device, queue, &rgba, (1, 1), format, label)
}

/// Loads an optional decorative texture, substituting `fallback` when the
/// path is unset or unreadable.
pub fn load_or_fallback(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    path: Option<&Path>,
    fallback: [u8; 4],
    format: wgpu::TextureFormat,
    label: &str,
) -> Texture {
    let Some(path) = path else {
        return solid(device, queue, fallback, format, label);
    };

    match std::fs::read(path)
        .with_context(|| format!("reading {}", path.display()))
        .and_then(|bytes| from_bytes(device, queue, &bytes, format, label))
    {
        Ok(texture) => texture,
        Err(e) => {
            log::warn!("{label}: {e:#}; using fallback");
            solid(device, queue, fallback, format, label)
        }
    }
}
