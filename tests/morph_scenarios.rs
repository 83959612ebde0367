use morphing_tree::animation::{Mode, ModeController};
use morphing_tree::config::{OrnamentConfig, SceneConfig, TreeShape};
use morphing_tree::math::Vec3;
use morphing_tree::particles::{InstanceGroup, Particle, ParticleField};
use morphing_tree::scene::SceneComposer;
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn known_particles() -> Vec<Particle> {
    let anchors = [
        (Vec3::new(20.0, -3.0, 7.0), Vec3::new(1.0, -4.0, 2.0)),
        (Vec3::new(-12.0, 15.0, -9.0), Vec3::new(-0.5, 3.0, 0.25)),
        (Vec3::new(0.0, 0.0, -24.0), Vec3::new(0.0, 6.5, 0.0)),
    ];
    anchors
        .iter()
        .enumerate()
        .map(|(i, &(chaos, target))| Particle {
            chaos,
            target,
            color: Vec3::new(0.1, 0.4, 0.2),
            random: i as f32 / 3.0,
        })
        .collect()
}

#[test]
fn test_field_forms_within_five_long_frames() {
    let mut field = ParticleField::from_particles(known_particles(), 2.5).unwrap();

    let mut time = 0.0;
    for _ in 0..5 {
        time += 1.0;
        field.update(Mode::Formed, 1.0, time);
    }

    let progress = field.progress();
    assert!(progress >= 0.9);
    // Wind pushes x by w and z by w/2 with |w| <= 0.1 * progress
    let sway_bound = 0.1 * progress * 1.25f32.sqrt();
    for p in field.particles() {
        let pos = p.blended(progress);
        let tolerance = 0.01 * p.target.length().max(1.0);
        assert!(pos.distance(&p.target) <= tolerance, "{:?} vs {:?}", pos, p.target);

        let rendered = p.position_at(progress, field.time());
        assert!(
            rendered.distance(&p.target) <= tolerance + sway_bound,
            "rendered {:?} vs {:?}",
            rendered,
            p.target
        );
        assert!(rendered.distance(&pos) <= sway_bound + 1e-5);
    }
}

#[test]
fn test_group_closes_gap_after_ln100_over_speed_seconds() {
    let config = OrnamentConfig {
        count: 2,
        speed_factor: 2.0,
        ..OrnamentConfig::balls()
    };
    let mut rng = SmallRng::seed_from_u64(99);
    let mut group = InstanceGroup::new(&config, &TreeShape::default(), &mut rng).unwrap();

    let dt = 1.0 / 60.0;
    let duration = 100f32.ln() / config.speed_factor;
    let frames = (duration / dt).ceil() as usize;
    for _ in 0..frames {
        group.update(Mode::Formed, dt);
    }

    for instance in group.instances() {
        assert!(instance.formation() >= 0.99, "formation {}", instance.formation());
    }
}

#[test]
fn test_double_toggle_same_frame_is_noop() {
    let mut scene = SceneComposer::new(small_config(), 5).unwrap();
    let mut controller = ModeController::default();

    for _ in 0..30 {
        scene.advance(controller.mode(), 1.0 / 60.0);
    }
    let progress = scene.foliage().progress();
    let balls = scene.ornament("balls").unwrap().formation();

    controller.toggle();
    controller.toggle();
    assert_eq!(controller.mode(), Mode::Chaos);

    // Same mode as before: the next frame keeps heading the same way
    let mut reference = SceneComposer::new(small_config(), 5).unwrap();
    for _ in 0..31 {
        reference.advance(Mode::Chaos, 1.0 / 60.0);
    }
    scene.advance(controller.mode(), 1.0 / 60.0);

    assert_eq!(scene.foliage().progress(), reference.foliage().progress());
    assert_eq!(progress, 0.0);
    assert!(scene.ornament("balls").unwrap().formation() <= balls + 1e-6);
}

#[test]
fn test_progress_converges_monotonically() {
    let mut field = ParticleField::from_particles(known_particles(), 2.5).unwrap();

    let mut last = field.progress();
    for frame in 0..240 {
        field.update(Mode::Formed, 1.0 / 60.0, frame as f32 / 60.0);
        assert!(field.progress() >= last);
        assert!(field.progress() <= 1.0);
        last = field.progress();
    }

    for frame in 0..240 {
        field.update(Mode::Chaos, 1.0 / 60.0, 4.0 + frame as f32 / 60.0);
        assert!(field.progress() <= last);
        assert!(field.progress() >= 0.0);
        last = field.progress();
    }
}

#[test]
fn test_randomized_scene_stays_finite() {
    for seed in 0..8 {
        let mut scene = SceneComposer::new(small_config(), seed).unwrap();
        let mut controller = ModeController::default();

        for frame in 0..180 {
            if frame % 45 == 0 {
                controller.toggle();
            }
            // Irregular deltas, including an oversized stall
            let dt = if frame == 90 { 2.5 } else { 0.004 + (frame % 7) as f32 * 0.005 };
            scene.advance(controller.mode(), dt);
        }

        let foliage = scene.foliage();
        assert!(foliage.positions().iter().all(|p| p.is_finite()));
        for group in scene.ornaments() {
            assert!(group.transform_data().iter().all(|v| v.is_finite()));
            assert!(group.instances().iter().all(|i| i.orientation.is_finite()));
        }
    }
}

#[test]
fn test_ornaments_settle_on_tree_surface() {
    let mut scene = SceneComposer::new(small_config(), 11).unwrap();
    for _ in 0..600 {
        scene.advance(Mode::Formed, 1.0 / 60.0);
    }

    let tree = scene.config().tree;
    for group in scene.ornaments() {
        for instance in group.instances() {
            let p = instance.current;
            assert!(p.y >= -tree.height / 2.0 - 1e-3 && p.y <= tree.height / 2.0 + 1e-3);
            let ratio = (p.y + tree.height / 2.0) / tree.height;
            let expected = tree.radius * (1.0 - ratio) + tree.surface_offset;
            assert!((p.horizontal_length() - expected).abs() < 0.05);
        }
    }
}

fn small_config() -> SceneConfig {
    let mut config = SceneConfig::default();
    config.foliage.count = 200;
    config.balls.count = 12;
    config.gifts.count = 6;
    config.lights.count = 24;
    config
}
