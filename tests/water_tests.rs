use glam::{Vec3, Vec4};
use meadow::camera::{Camera, Projection};
use meadow::capture::{PassTarget, Viewport};
use meadow::water::{
    self, ClipPlane, FrameRenderer, Mirror, ScenePass, SceneView, WaterParams, WaterSurface,
};

#[derive(Debug, PartialEq)]
enum Call {
    Bind(PassTarget),
    Scene {
        eye: Vec3,
        pitch_up: bool,
        clip: Option<ClipPlane>,
    },
    Water {
        eye: Vec3,
    },
}

#[derive(Default)]
struct Recorder {
    calls: Vec<Call>,
}

impl ScenePass for Recorder {
    fn bind_target(&mut self, target: PassTarget) {
        self.calls.push(Call::Bind(target));
    }

    fn draw_scene(&mut self, view: &SceneView, clip: Option<ClipPlane>) {
        // Third row of the view matrix is the negated forward vector.
        let forward_y = -view.view.row(2).y;
        self.calls.push(Call::Scene {
            eye: view.camera_position,
            pitch_up: forward_y > 0.0,
            clip,
        });
    }
}

impl FrameRenderer for Recorder {
    fn draw_water(&mut self, _water: &WaterSurface, view: &SceneView, _time: f32) {
        self.calls.push(Call::Water {
            eye: view.camera_position,
        });
    }
}

fn lake(height: f32) -> WaterSurface {
    WaterSurface::new(WaterParams {
        resolution_x: 8,
        resolution_z: 8,
        scale: 1.0,
        height,
        y_offset: 0.0,
        wave_strength: 0.02,
        colour: Vec3::new(0.0, 0.3, 0.5),
    })
    .unwrap()
}

#[test]
fn capture_runs_reflection_then_refraction_then_default() {
    let water = lake(2.0);
    let mut camera = Camera::new(Vec3::new(1.0, 10.0, -3.0), -90.0, -25.0, 0.1);
    let before = camera.clone();
    let projection = Projection::new(800, 600, 45.0, 0.1, 100.0);
    let viewport = Viewport::new(800, 600);
    let mut recorder = Recorder::default();

    water.capture(&mut camera, projection.build_projection_matrix(), &mut recorder, viewport);

    assert_eq!(
        recorder.calls,
        vec![
            Call::Bind(PassTarget::Reflection),
            Call::Scene {
                eye: Vec3::new(1.0, -6.0, -3.0),
                pitch_up: true,
                clip: Some(ClipPlane(Vec4::new(0.0, 1.0, 0.0, -2.0))),
            },
            Call::Bind(PassTarget::Refraction),
            Call::Scene {
                eye: Vec3::new(1.0, 10.0, -3.0),
                pitch_up: false,
                clip: Some(ClipPlane(Vec4::new(0.0, -1.0, 0.0, 2.0))),
            },
            Call::Bind(PassTarget::Default(viewport)),
        ]
    );
    assert_eq!(camera, before);
}

#[test]
fn frame_draws_scene_unclipped_then_water() {
    let water = lake(0.0);
    let mut camera = Camera::new(Vec3::new(0.0, 4.0, 0.0), 0.0, -10.0, 0.1);
    let projection = Projection::new(1024, 768, 45.0, 0.1, 100.0);
    let viewport = Viewport::new(1024, 768);
    let mut recorder = Recorder::default();

    water::render_frame(&water, &mut camera, &projection, &mut recorder, viewport, 1.5);

    assert_eq!(recorder.calls.len(), 7);
    assert_eq!(recorder.calls[4], Call::Bind(PassTarget::Default(viewport)));
    assert!(matches!(
        &recorder.calls[5],
        Call::Scene { clip: None, eye, .. } if *eye == camera.position
    ));
    assert_eq!(recorder.calls[6], Call::Water { eye: camera.position });
}

#[test]
fn default_target_tracks_the_current_window_size() {
    let water = lake(0.0);
    let mut camera = Camera::new(Vec3::new(0.0, 4.0, 0.0), 0.0, 0.0, 0.1);
    let mut projection = Projection::new(640, 480, 45.0, 0.1, 100.0);
    let mut recorder = Recorder::default();

    projection.resize(1920, 1080);
    let viewport = Viewport::new(1920, 1080);
    water::render_frame(&water, &mut camera, &projection, &mut recorder, viewport, 0.0);
    assert!(recorder.calls.contains(&Call::Bind(PassTarget::Default(Viewport::new(1920, 1080)))));
}

#[test]
fn mirror_round_trip_restores_camera_exactly() {
    for (y, pitch, water_height) in [(7.0, -20.0, 3.0), (0.5, 45.0, -15.0), (-2.0, 0.0, 1.0)] {
        let mut camera = Camera::new(Vec3::new(3.0, y, -1.0), 12.0, pitch, 0.1);
        let original = camera.clone();

        let mirror = Mirror::apply(&mut camera, water_height);
        assert!((camera.position.y - (2.0 * water_height - y)).abs() < 1e-5);
        assert_eq!(camera.pitch(), -pitch);

        mirror.revert(&mut camera);
        assert_eq!(camera, original);
    }
}

#[test]
fn clip_planes_partition_space_at_the_water_height() {
    let water = lake(5.0);
    let reflection = water.reflection_clip_plane();
    let refraction = water.refraction_clip_plane();
    for y in [-100.0, 4.9, 5.1, 100.0] {
        let point = Vec3::new(2.0, y, 7.0);
        assert_ne!(reflection.keeps(point), refraction.keeps(point));
        assert_eq!(water.is_underwater(point), refraction.keeps(point));
    }
}
