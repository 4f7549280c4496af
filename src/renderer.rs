use crate::camera::{Camera, Projection};
use crate::camera_controller::{CameraController, InputDebounceState};
use crate::capture::{self, CaptureTargets, PassTarget, TargetBinding, Viewport};
use crate::collision::HitBox;
use crate::config::Config;
use crate::heightmap::HeightSamples;
use crate::model::{self, Drawable, InstanceRaw, Mesh, Vertex};
use crate::player::Player;
use crate::scene::{ModelArena, Paddock, SceneObject};
use crate::terrain::{GroundHeight, HeightfieldTerrain};
use crate::texture::{self, Texture};
use crate::water::{self, ClipPlane, FrameRenderer, SceneView, ScenePass, WaterSurface};
use anyhow::{Context, Result};
use glam::Vec3;
use std::sync::Arc;
use std::time::Instant;
use wgpu::util::DeviceExt;
use winit::event::WindowEvent;
use winit::window::Window;

const SKY: wgpu::Color = wgpu::Color {
    r: 0.53,
    g: 0.75,
    b: 0.92,
    a: 1.0,
};

const GRASS: [u8; 4] = [86, 125, 70, 255];
const TIMBER: [u8; 4] = [120, 85, 50, 255];
/// Encodes a zero offset for the du/dv map and a +Y normal for the normal map.
const FLAT_NORMAL: [u8; 4] = [128, 128, 255, 255];

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct SceneUniform {
    view_proj: [[f32; 4]; 4],
    camera_position: [f32; 4],
    clip_plane: [f32; 4],
    light_position: [f32; 4],
    light_colour: [f32; 4],
}

impl SceneUniform {
    fn new(view: &SceneView, clip: ClipPlane, light: (Vec3, Vec3)) -> Self {
        Self {
            view_proj: (view.projection * view.view).to_cols_array_2d(),
            camera_position: view.camera_position.extend(1.0).to_array(),
            clip_plane: clip.0.to_array(),
            light_position: light.0.extend(1.0).to_array(),
            light_colour: light.1.extend(1.0).to_array(),
        }
    }
}

/// One uniform buffer per pass target: all passes share an encoder, so a
/// single buffer rewritten between passes would only hold the last write.
struct PassUniform {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl PassUniform {
    fn slot(target: PassTarget) -> usize {
        match target {
            PassTarget::Reflection => 0,
            PassTarget::Refraction => 1,
            PassTarget::Default(_) => 2,
        }
    }
}

/// Everything the scene and water draws read from the GPU.
struct SceneResources {
    terrain_pipeline: wgpu::RenderPipeline,
    object_pipeline: wgpu::RenderPipeline,
    water_pipeline: wgpu::RenderPipeline,
    pass_uniforms: [PassUniform; 3],
    terrain_material: wgpu::BindGroup,
    object_material: wgpu::BindGroup,
    water_buffer: wgpu::Buffer,
    water_bind_group: wgpu::BindGroup,
    terrain_mesh: Mesh,
    terrain_instance: wgpu::Buffer,
    water_mesh: Mesh,
    cube_mesh: Mesh,
    object_instances: wgpu::Buffer,
    object_count: u32,
}

/// Records the frame's passes into a single command encoder.
struct FramePass<'a> {
    encoder: wgpu::CommandEncoder,
    queue: &'a wgpu::Queue,
    gpu: &'a SceneResources,
    captures: &'a CaptureTargets,
    surface_view: &'a wgpu::TextureView,
    depth_view: &'a wgpu::TextureView,
    target: PassTarget,
    light: (Vec3, Vec3),
    depth_range: (f32, f32),
}

impl<'a> FramePass<'a> {
    fn binding(&self) -> TargetBinding<'a> {
        match self.target {
            PassTarget::Reflection => self.captures.bind_reflection_target(),
            PassTarget::Refraction => self.captures.bind_refraction_target(),
            PassTarget::Default(viewport) => self.captures.unbind_to_default(
                self.surface_view,
                self.depth_view,
                viewport.width,
                viewport.height,
            ),
        }
    }

    fn label(&self) -> &'static str {
        match self.target {
            PassTarget::Reflection => "Reflection Pass",
            PassTarget::Refraction => "Refraction Pass",
            PassTarget::Default(_) => "Scene Pass",
        }
    }
}

fn begin_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    label: &str,
    binding: &TargetBinding<'_>,
    clear: bool,
) -> wgpu::RenderPass<'e> {
    let (color_load, depth_load) = if clear {
        (wgpu::LoadOp::Clear(SKY), wgpu::LoadOp::Clear(1.0))
    } else {
        (wgpu::LoadOp::Load, wgpu::LoadOp::Load)
    };
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: binding.color,
            resolve_target: None,
            ops: wgpu::Operations {
                load: color_load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: binding.depth,
            depth_ops: Some(wgpu::Operations {
                load: depth_load,
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    let viewport = binding.viewport;
    pass.set_viewport(0.0, 0.0, viewport.width as f32, viewport.height as f32, 0.0, 1.0);
    pass
}

impl ScenePass for FramePass<'_> {
    fn bind_target(&mut self, target: PassTarget) {
        self.target = target;
    }

    fn draw_scene(&mut self, view: &SceneView, clip: Option<ClipPlane>) {
        let gpu = self.gpu;
        let uniform = &gpu.pass_uniforms[PassUniform::slot(self.target)];
        let data = SceneUniform::new(view, clip.unwrap_or(ClipPlane::NONE), self.light);
        self.queue
            .write_buffer(&uniform.buffer, 0, bytemuck::cast_slice(&[data]));

        let binding = self.binding();
        let label = self.label();
        let mut pass = begin_pass(&mut self.encoder, label, &binding, true);
        pass.set_bind_group(0, &uniform.bind_group, &[]);

        pass.set_pipeline(&gpu.terrain_pipeline);
        pass.set_bind_group(1, &gpu.terrain_material, &[]);
        pass.draw_mesh_instanced(&gpu.terrain_mesh, &gpu.terrain_instance, 1);

        pass.set_pipeline(&gpu.object_pipeline);
        pass.set_bind_group(1, &gpu.object_material, &[]);
        pass.draw_mesh_instanced(&gpu.cube_mesh, &gpu.object_instances, gpu.object_count);
    }
}

impl FrameRenderer for FramePass<'_> {
    fn draw_water(&mut self, water: &WaterSurface, view: &SceneView, time: f32) {
        let gpu = self.gpu;
        let (near, far) = self.depth_range;
        let data = water.uniform(time, near, far, view.camera_position, self.light);
        self.queue
            .write_buffer(&gpu.water_buffer, 0, bytemuck::cast_slice(&[data]));

        let binding = self.binding();
        let mut pass = begin_pass(&mut self.encoder, "Water Pass", &binding, false);
        pass.set_pipeline(&gpu.water_pipeline);
        pass.set_bind_group(0, &gpu.pass_uniforms[PassUniform::slot(self.target)].bind_group, &[]);
        pass.set_bind_group(1, &gpu.water_bind_group, &[]);
        pass.draw_mesh(&gpu.water_mesh);
    }
}

struct PipelineOptions<'a> {
    label: &'a str,
    shader: &'a wgpu::ShaderModule,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    front_face: wgpu::FrontFace,
    cull_mode: Option<wgpu::Face>,
    blend: wgpu::BlendState,
    depth_write: bool,
}

fn create_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    options: PipelineOptions<'_>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(options.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: options.shader,
            entry_point: Some("vs_main"),
            buffers: options.buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: options.shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(options.blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            front_face: options.front_face,
            cull_mode: options.cull_mode,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: capture::DEPTH_FORMAT,
            depth_write_enabled: options.depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32, sample_type: wgpu::TextureSampleType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn material_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ],
        label: Some(label),
    })
}

/// Instance transforms for every prop in the arena, in slot order.
fn object_instances(arena: &ModelArena) -> Vec<InstanceRaw> {
    arena
        .iter()
        .map(|(_, object)| InstanceRaw::from_matrix(object.model_matrix()))
        .collect()
}

pub struct State {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    captures: CaptureTargets,
    gpu: SceneResources,

    terrain: HeightfieldTerrain,
    water: WaterSurface,
    arena: ModelArena,
    paddock: Option<Paddock>,
    hitboxes: Vec<HitBox>,

    camera: Camera,
    projection: Projection,
    controller: CameraController,
    debounce: InputDebounceState,
    player: Player,
    eye_height: f32,
    light: (Vec3, Vec3),
    started: Instant,
    last_frame: Instant,
}

impl State {
    pub async fn new(window: Arc<Window>, settings: &Config) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await
            .context("no suitable graphics adapter")?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                ..Default::default()
            })
            .await?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = device.create_texture(&capture::depth_descriptor(
            "Depth Texture",
            Viewport::new(config.width, config.height),
            false,
        ));
        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let captures = CaptureTargets::new(
            &device,
            config.format,
            settings.reflection_viewport(),
            settings.refraction_viewport(),
        );

        // World
        let terrain_params = settings.terrain_params();
        let samples = match &settings.terrain.heightmap {
            Some(path) => HeightSamples::from_image_path(
                path,
                terrain_params.resolution_x,
                terrain_params.resolution_z,
            )
            .with_context(|| format!("loading height map {}", path.display()))?,
            None => {
                HeightSamples::procedural(terrain_params.resolution_x, terrain_params.resolution_z)
            }
        };
        let terrain = HeightfieldTerrain::new(terrain_params, &samples)?;
        let water = WaterSurface::new(settings.water_params())?;

        let mut arena = ModelArena::new();
        let paddock = settings.paddock.enabled.then(|| {
            let p = &settings.paddock;
            let paddock =
                Paddock::spawn(&mut arena, p.length, p.width, p.origin, p.panel_half_extents);
            paddock.snap_to_terrain(&mut arena, &terrain);
            paddock
        });
        for (i, obstacle) in settings.obstacles.iter().enumerate() {
            arena.insert(SceneObject::new(format!("obstacle-{i}"), *obstacle));
        }
        let hitboxes = arena.hitboxes();

        let spawn = settings.locomotion.spawn;
        let ground = terrain.ground_height(spawn.x, spawn.y);
        let player = Player::new(
            Vec3::new(spawn.x, ground, spawn.y),
            settings.locomotion_settings(),
        );
        let eye_height = settings.locomotion.eye_height;
        let cam = &settings.camera;
        let camera = Camera::new(
            player.position + Vec3::Y * eye_height,
            cam.yaw,
            cam.pitch,
            cam.rotation_sensitivity,
        );
        let projection = Projection::new(config.width, config.height, cam.fov, cam.near, cam.far);
        let light = (settings.light.position, settings.light.colour);

        // Bind group layouts
        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
            label: Some("scene_bind_group_layout"),
        });
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                texture_entry(0, wgpu::TextureSampleType::Float { filterable: true }),
                sampler_entry(1),
            ],
            label: Some("material_bind_group_layout"),
        });
        let water_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                texture_entry(1, wgpu::TextureSampleType::Float { filterable: true }),
                texture_entry(2, wgpu::TextureSampleType::Float { filterable: true }),
                texture_entry(3, wgpu::TextureSampleType::Depth),
                texture_entry(4, wgpu::TextureSampleType::Float { filterable: true }),
                texture_entry(5, wgpu::TextureSampleType::Float { filterable: true }),
                sampler_entry(6),
                sampler_entry(7),
            ],
            label: Some("water_bind_group_layout"),
        });

        let pass_uniforms = ["reflection", "refraction", "main"].map(|name| {
            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("{name} scene uniform")),
                size: std::mem::size_of::<SceneUniform>() as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &scene_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
                label: Some(&format!("{name}_scene_bind_group")),
            });
            PassUniform { buffer, bind_group }
        });

        // Textures
        let terrain_texture = texture::load_or_fallback(
            &device,
            &queue,
            settings.terrain.texture.as_deref(),
            GRASS,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            "terrain texture",
        );
        let timber = texture::solid(
            &device,
            &queue,
            TIMBER,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            "fence texture",
        );
        let dudv = texture::load_or_fallback(
            &device,
            &queue,
            settings.water.dudv_map.as_deref(),
            FLAT_NORMAL,
            wgpu::TextureFormat::Rgba8Unorm,
            "water dudv map",
        );
        let normal_map = texture::load_or_fallback(
            &device,
            &queue,
            settings.water.normal_map.as_deref(),
            FLAT_NORMAL,
            wgpu::TextureFormat::Rgba8Unorm,
            "water normal map",
        );
        let capture_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("capture sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let terrain_material = material_bind_group(
            &device,
            &material_layout,
            &terrain_texture,
            "terrain_bind_group",
        );
        let object_material =
            material_bind_group(&device, &material_layout, &timber, "fence_bind_group");

        let water_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("water uniform"),
            size: std::mem::size_of::<water::WaterUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let water_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &water_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: water_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(
                        captures.reflection().color_view(),
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(
                        captures.refraction().color_view(),
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(
                        captures.refraction().depth_view(),
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&dudv.view),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::TextureView(&normal_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: wgpu::BindingResource::Sampler(&capture_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 7,
                    resource: wgpu::BindingResource::Sampler(&dudv.sampler),
                },
            ],
            label: Some("water_bind_group"),
        });

        // Pipelines
        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
        });
        let water_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Water Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("water.wgsl").into()),
        });
        let scene_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&scene_layout, &material_layout],
            push_constant_ranges: &[],
        });
        let water_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Water Pipeline Layout"),
            bind_group_layouts: &[&scene_layout, &water_layout],
            push_constant_ranges: &[],
        });

        let instanced = [Vertex::desc(), InstanceRaw::desc()];
        // Terrain triangles wind clockwise seen from above.
        let terrain_pipeline = create_render_pipeline(
            &device,
            &scene_pipeline_layout,
            config.format,
            PipelineOptions {
                label: "Terrain Pipeline",
                shader: &scene_shader,
                buffers: &instanced,
                front_face: wgpu::FrontFace::Cw,
                cull_mode: Some(wgpu::Face::Back),
                blend: wgpu::BlendState::REPLACE,
                depth_write: true,
            },
        );
        let object_pipeline = create_render_pipeline(
            &device,
            &scene_pipeline_layout,
            config.format,
            PipelineOptions {
                label: "Object Pipeline",
                shader: &scene_shader,
                buffers: &instanced,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                blend: wgpu::BlendState::REPLACE,
                depth_write: true,
            },
        );
        let water_pipeline = create_render_pipeline(
            &device,
            &water_pipeline_layout,
            config.format,
            PipelineOptions {
                label: "Water Pipeline",
                shader: &water_shader,
                buffers: &[Vertex::desc()],
                front_face: wgpu::FrontFace::Cw,
                cull_mode: None,
                blend: wgpu::BlendState::ALPHA_BLENDING,
                depth_write: false,
            },
        );

        // Geometry
        let terrain_mesh = Mesh::new(
            &device,
            "terrain",
            &terrain.mesh().vertices,
            &terrain.mesh().indices,
        );
        let terrain_instance = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("terrain instance"),
            contents: bytemuck::cast_slice(&[InstanceRaw::from_matrix(terrain.model_matrix())]),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let water_mesh = Mesh::new(&device, "water", water.vertices(), water.indices());
        let (cube_vertices, cube_indices) = model::unit_cube();
        let cube_mesh = Mesh::new(&device, "cube", &cube_vertices, &cube_indices);
        let instances = object_instances(&arena);
        let object_instances = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("object instances"),
            contents: bytemuck::cast_slice(&instances),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let gpu = SceneResources {
            terrain_pipeline,
            object_pipeline,
            water_pipeline,
            pass_uniforms,
            terrain_material,
            object_material,
            water_buffer,
            water_bind_group,
            terrain_mesh,
            terrain_instance,
            water_mesh,
            cube_mesh,
            object_instances,
            object_count: instances.len() as u32,
        };

        let now = Instant::now();
        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            depth_texture,
            depth_view,
            captures,
            gpu,
            terrain,
            water,
            arena,
            paddock,
            hitboxes,
            camera,
            projection,
            controller: CameraController::new(),
            debounce: InputDebounceState::new(settings.locomotion.debounce_frames),
            player,
            eye_height,
            light,
            started: now,
            last_frame: now,
        })
    }

    pub fn size(&self) -> winit::dpi::PhysicalSize<u32> {
        self.size
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.projection.resize(new_size.width, new_size.height);

            self.depth_texture.destroy();
            self.depth_texture = self.device.create_texture(&capture::depth_descriptor(
                "Depth Texture",
                Viewport::new(self.config.width, self.config.height),
                false,
            ));
            self.depth_view = self
                .depth_texture
                .create_view(&wgpu::TextureViewDescriptor::default());
        }
    }

    pub fn input(&mut self, event: &WindowEvent) -> bool {
        self.controller.process_events(event)
    }

    pub fn mouse_motion(&mut self, delta: (f64, f64)) {
        self.controller.process_mouse_motion(delta.0, delta.1);
    }

    pub fn update(&mut self) {
        let now = Instant::now();
        let delta_time = now.duration_since(self.last_frame).as_secs_f32().min(0.1);
        self.last_frame = now;

        let events = self.controller.update(
            delta_time,
            &mut self.debounce,
            &mut self.camera,
            &mut self.projection,
            &mut self.player,
            &self.terrain,
            &self.hitboxes,
            self.eye_height,
        );

        if events.no_clip_toggled {
            log::info!("no-clip {}", if self.player.no_clip() { "on" } else { "off" });
        }
        if events.gate_toggled {
            if let Some(paddock) = self.paddock.as_mut() {
                paddock.toggle_gate(&mut self.arena, &self.terrain);
                self.refresh_objects();
            }
        }
    }

    /// Re-uploads prop transforms and rebuilds collision after the arena changed.
    fn refresh_objects(&mut self) {
        self.hitboxes = self.arena.hitboxes();
        let instances = object_instances(&self.arena);
        if !instances.is_empty() {
            self.queue
                .write_buffer(&self.gpu.object_instances, 0, bytemuck::cast_slice(&instances));
        }
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let viewport = Viewport::new(self.config.width, self.config.height);
        let mut frame = FramePass {
            encoder,
            queue: &self.queue,
            gpu: &self.gpu,
            captures: &self.captures,
            surface_view: &view,
            depth_view: &self.depth_view,
            target: PassTarget::Default(viewport),
            light: self.light,
            depth_range: (self.projection.znear(), self.projection.zfar()),
        };
        let time = self.started.elapsed().as_secs_f32();
        water::render_frame(
            &self.water,
            &mut self.camera,
            &self.projection,
            &mut frame,
            viewport,
            time,
        );

        self.queue.submit(std::iter::once(frame.encoder.finish()));
        output.present();
        Ok(())
    }
}
