//! Off-screen colour/depth targets for the water's reflection and refraction
//! captures.
//!
//! Both targets live as long as [`CaptureTargets`]; dropping it releases the
//! GPU textures, so a target can neither be freed twice nor bound after release.

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }
}

/// Where the next scene draw lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassTarget {
    Reflection,
    Refraction,
    /// The window surface at its current size.
    Default(Viewport),
}

pub fn color_descriptor(
    label: &'static str,
    viewport: Viewport,
    format: wgpu::TextureFormat,
) -> wgpu::TextureDescriptor<'static> {
    wgpu::TextureDescriptor {
        label: Some(label),
        size: viewport.extent(),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    }
}

/// Depth attachment; `sampled` additionally exposes it to shaders.
pub fn depth_descriptor(
    label: &'static str,
    viewport: Viewport,
    sampled: bool,
) -> wgpu::TextureDescriptor<'static> {
    let mut usage = wgpu::TextureUsages::RENDER_ATTACHMENT;
    if sampled {
        usage |= wgpu::TextureUsages::TEXTURE_BINDING;
    }
    wgpu::TextureDescriptor {
        label: Some(label),
        size: viewport.extent(),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage,
        view_formats: &[],
    }
}

/// Colour and depth views plus the viewport a render pass should use.
pub struct TargetBinding<'a> {
    pub color: &'a wgpu::TextureView,
    pub depth: &'a wgpu::TextureView,
    pub viewport: Viewport,
}

pub struct CaptureTarget {
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth: wgpu::Texture,
    depth_view: wgpu::TextureView,
    viewport: Viewport,
}

impl CaptureTarget {
    fn new(
        device: &wgpu::Device,
        labels: (&'static str, &'static str),
        viewport: Viewport,
        format: wgpu::TextureFormat,
        sampled_depth: bool,
    ) -> Self {
        let color = device.create_texture(&color_descriptor(labels.0, viewport, format));
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let depth = device.create_texture(&depth_descriptor(labels.1, viewport, sampled_depth));
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            color,
            color_view,
            depth,
            depth_view,
            viewport,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn color_view(&self) -> &wgpu::TextureView {
        &self.color_view
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    fn binding(&self) -> TargetBinding<'_> {
        TargetBinding {
            color: &self.color_view,
            depth: &self.depth_view,
            viewport: self.viewport,
        }
    }
}

impl Drop for CaptureTarget {
    fn drop(&mut self) {
        self.color.destroy();
        self.depth.destroy();
    }
}

pub struct CaptureTargets {
    reflection: CaptureTarget,
    refraction: CaptureTarget,
}

impl CaptureTargets {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        reflection: Viewport,
        refraction: Viewport,
    ) -> Self {
        log::info!(
            "capture targets: reflection {}x{}, refraction {}x{}",
            reflection.width,
            reflection.height,
            refraction.width,
            refraction.height
        );
        Self {
            reflection: CaptureTarget::new(
                device,
                ("Reflection Color", "Reflection Depth"),
                reflection,
                format,
                false,
            ),
            refraction: CaptureTarget::new(
                device,
                ("Refraction Color", "Refraction Depth"),
                refraction,
                format,
                true,
            ),
        }
    }

    pub fn reflection(&self) -> &CaptureTarget {
        &self.reflection
    }

    pub fn refraction(&self) -> &CaptureTarget {
        &self.refraction
    }

    pub fn bind_reflection_target(&self) -> TargetBinding<'_> {
        self.reflection.binding()
    }

    pub fn bind_refraction_target(&self) -> TargetBinding<'_> {
        self.refraction.binding()
    }

    /// The window surface, sized to the dimensions passed in on every call.
    pub fn unbind_to_default<'a>(
        &self,
        color: &'a wgpu::TextureView,
        depth: &'a wgpu::TextureView,
        width: u32,
        height: u32,
    ) -> TargetBinding<'a> {
        TargetBinding {
            color,
            depth,
            viewport: Viewport::new(width, height),
        }
    }
}
