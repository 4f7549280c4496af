use glam::Vec3;
use meadow::camera::Camera;
use meadow::collision::{HitBox, collision_detected};
use meadow::player::{LocomotionSettings, MoveDirection, Player};
use meadow::terrain::GroundHeight;

struct Level(f32);

impl GroundHeight for Level {
    fn ground_height(&self, _x: f32, _z: f32) -> f32 {
        self.0
    }
}

fn settings(half_extent: f32) -> LocomotionSettings {
    LocomotionSettings {
        hitbox_size: Vec3::splat(half_extent),
        ..LocomotionSettings::default()
    }
}

#[test]
fn overlap_is_symmetric() {
    let boxes = [
        HitBox::new(Vec3::ZERO, Vec3::splat(0.5)),
        HitBox::new(Vec3::new(0.9, 0.2, -0.3), Vec3::new(0.5, 0.1, 0.4)),
        HitBox::new(Vec3::new(1.0, 0.0, 0.0), Vec3::splat(0.5)),
        HitBox::new(Vec3::new(5.0, 5.0, 5.0), Vec3::ONE),
    ];
    for a in &boxes {
        for b in &boxes {
            assert_eq!(
                collision_detected(a.origin, a.size, std::slice::from_ref(b)),
                collision_detected(b.origin, b.size, std::slice::from_ref(a)),
            );
        }
    }
}

#[test]
fn touching_faces_do_not_collide() {
    let wall = [HitBox::new(Vec3::new(1.0, 0.0, 0.0), Vec3::splat(0.5))];
    assert!(!collision_detected(Vec3::ZERO, Vec3::splat(0.5), &wall));
    assert!(collision_detected(Vec3::new(0.01, 0.0, 0.0), Vec3::splat(0.5), &wall));
}

#[test]
fn blocked_step_leaves_position_unchanged() {
    let camera = Camera::new(Vec3::ZERO, 0.0, 0.0, 0.1);
    let wall = [HitBox::new(Vec3::new(0.6, 0.0, 0.0), Vec3::splat(0.5))];
    let mut player = Player::new(Vec3::ZERO, settings(0.5));
    player.set_movement_sensitivity(0.1);

    assert!(!player.try_move(MoveDirection::Forward, &camera, &wall));
    assert_eq!(player.position, Vec3::ZERO);
}

#[test]
fn hitbox_stands_on_the_feet() {
    let player = Player::new(Vec3::new(2.0, 3.0, -1.0), LocomotionSettings::default());
    let body = player.hitbox();
    assert!((body.min().y - 3.0).abs() < 1e-5);
    assert!((body.max().y - 4.8).abs() < 1e-5);
}

#[test]
fn beam_at_chest_height_blocks_a_grounded_player() {
    let camera = Camera::new(Vec3::ZERO, 0.0, 0.0, 0.1);
    let beam = [HitBox::new(Vec3::new(0.5, 1.3, 0.0), Vec3::new(0.1, 0.3, 1.0))];
    let mut player = Player::new(Vec3::ZERO, LocomotionSettings::default());
    player.update(1.0 / 60.0, &Level(0.0));
    assert!(player.is_grounded());
    player.set_movement_sensitivity(0.5);

    assert!(!player.try_move(MoveDirection::Forward, &camera, &beam));
    assert_eq!(player.position, Vec3::ZERO);
}

#[test]
fn overhead_beam_does_not_block() {
    let camera = Camera::new(Vec3::ZERO, 0.0, 0.0, 0.1);
    let beam = [HitBox::new(Vec3::new(0.5, 2.5, 0.0), Vec3::new(0.1, 0.3, 1.0))];
    let mut player = Player::new(Vec3::ZERO, LocomotionSettings::default());
    player.set_movement_sensitivity(0.5);

    assert!(player.try_move(MoveDirection::Forward, &camera, &beam));
    assert!((player.position - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-5);
}

#[test]
fn free_step_follows_camera_heading() {
    let camera = Camera::new(Vec3::ZERO, 0.0, 30.0, 0.1);
    let mut player = Player::new(Vec3::ZERO, settings(0.5));
    player.set_movement_sensitivity(0.5);

    assert!(player.try_move(MoveDirection::Forward, &camera, &[]));
    // Walking ignores pitch.
    assert!((player.position - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-5);

    assert!(player.try_move(MoveDirection::Right, &camera, &[]));
    assert!((player.position.z - 0.5).abs() < 1e-5);
}

#[test]
fn no_clip_passes_through_walls() {
    let camera = Camera::new(Vec3::ZERO, 0.0, 0.0, 0.1);
    let wall = [HitBox::new(Vec3::new(0.6, 0.0, 0.0), Vec3::splat(0.5))];
    let mut player = Player::new(Vec3::ZERO, settings(0.5));
    player.set_movement_sensitivity(0.1);
    player.toggle_no_clip();

    assert!(player.try_move(MoveDirection::Forward, &camera, &wall));
    assert!(player.position.x > 0.0);
}

#[test]
fn landing_pins_player_to_ground() {
    let ground = Level(2.0);
    let mut player = Player::new(Vec3::new(0.0, 10.0, 0.0), LocomotionSettings::default());

    for _ in 0..600 {
        player.update(1.0 / 60.0, &ground);
        assert!(player.position.y >= 2.0);
    }
    assert_eq!(player.position.y, 2.0);
    assert_eq!(player.vertical_velocity(), 0.0);
    assert!(player.is_grounded());
}

#[test]
fn fall_speed_never_exceeds_terminal_velocity() {
    let ground = Level(-10_000.0);
    let mut player = Player::new(Vec3::ZERO, settings(0.3));
    for _ in 0..1000 {
        player.update(0.05, &ground);
        assert!(player.vertical_velocity().abs() <= player.settings().terminal_velocity);
    }
}

#[test]
fn jump_only_from_the_ground() {
    let ground = Level(0.0);
    let mut player = Player::new(Vec3::ZERO, LocomotionSettings::default());

    assert!(player.jump(0.0));
    assert_eq!(player.vertical_velocity(), player.settings().jump_velocity);
    player.update(1.0 / 60.0, &ground);
    assert!(player.position.y > 0.0);
    let velocity = player.vertical_velocity();
    assert!(!player.jump(0.0), "no second jump while airborne");
    assert_eq!(player.vertical_velocity(), velocity);

    for _ in 0..600 {
        player.update(1.0 / 60.0, &ground);
    }
    assert!(player.is_grounded());
    assert!(player.jump(0.0));
}

#[test]
fn no_clip_suspends_gravity_and_jumping() {
    let ground = Level(0.0);
    let mut player = Player::new(Vec3::new(0.0, 5.0, 0.0), LocomotionSettings::default());
    player.toggle_no_clip();

    player.update(1.0, &ground);
    assert_eq!(player.position.y, 5.0);
    assert!(!player.jump(0.0));
}
