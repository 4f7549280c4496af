use glam::{Vec2, Vec3};
use meadow::collision::collision_detected;
use meadow::config::Config;
use meadow::heightmap::HeightSamples;
use meadow::scene::{ModelArena, Paddock};
use meadow::terrain::{GroundHeight, HeightfieldTerrain};
use meadow::water::WaterSurface;

fn small_world() -> Config {
    Config::from_json(
        r#"{
            "terrain": {
                "resolution_x": 32, "resolution_z": 32,
                "scale": 1.0, "max_height": 4.0, "y_offset": -2.0
            },
            "water": { "height": 1.0 },
            "paddock": {
                "length": 2, "width": 2,
                "origin": [2.0, 2.0], "panel_half_extents": [1.0, 0.5, 0.1]
            }
        }"#,
    )
    .unwrap()
}

#[test]
fn config_builds_terrain_and_water_on_the_same_footprint() {
    let config = small_world();
    let params = config.terrain_params();
    let samples = HeightSamples::procedural(params.resolution_x, params.resolution_z);
    let terrain = HeightfieldTerrain::new(params, &samples).unwrap();
    let water = WaterSurface::new(config.water_params()).unwrap();

    assert_eq!(terrain.model_matrix(), water.model_matrix());
    assert_eq!(water.height(), -1.0);
    assert_eq!(water.vertices().len(), terrain.mesh().vertices.len());
}

#[test]
fn gate_opening_clears_the_way_through_the_fence() {
    let config = small_world();
    let params = config.terrain_params();
    let samples = HeightSamples::procedural(params.resolution_x, params.resolution_z);
    let terrain = HeightfieldTerrain::new(params, &samples).unwrap();

    let mut arena = ModelArena::new();
    let p = &config.paddock;
    let mut paddock = Paddock::spawn(&mut arena, p.length, p.width, p.origin, p.panel_half_extents);
    paddock.snap_to_terrain(&mut arena, &terrain);

    for &handle in paddock.nodes() {
        let hitbox = arena.get(handle).unwrap().hitbox;
        let ground = terrain.ground_height(hitbox.origin.x, hitbox.origin.z);
        assert!((hitbox.min().y - ground).abs() < 1e-5);
    }

    let mut solid = Vec::new();
    paddock.push_hitboxes(&arena, &mut solid);
    assert_eq!(solid.len(), paddock.nodes().len() - 1);

    // Stepping into the gateway is never blocked by the gate panel itself.
    let gateway = Vec2::new(p.origin.x + p.panel_half_extents.x, p.origin.y);
    let walker = Vec3::new(gateway.x, terrain.ground_height(gateway.x, gateway.y) + 0.5, gateway.y);
    assert!(!collision_detected(walker, Vec3::splat(0.2), &solid));

    let gate = paddock.gate().unwrap();
    let closed = arena.get(gate).unwrap().hitbox;
    assert!(paddock.toggle_gate(&mut arena, &terrain));
    let open = arena.get(gate).unwrap().hitbox;
    assert_ne!(closed.origin, open.origin);
    assert_eq!(open.size, Vec3::new(0.1, 0.5, 1.0));
}
