use glam::{Mat4, Vec3, Vec4};
use hair_core::config::{HairConfig, LayoutMode, PhysicsParams};
use hair_core::constraints::follow::solve_follow_the_leader;
use hair_core::device::ComputeDevice;
use hair_core::dispatcher::PhysicsDispatcher;
use hair_core::proxy::CollisionProxySet;
use hair_core::strands::StrandGeometryBuilder;

fn still_physics() -> PhysicsParams {
    PhysicsParams {
        gravity: 0.0,
        wind: Vec4::ZERO,
        ..PhysicsParams::default()
    }
}

#[test]
fn test_segment_lengths_restored() {
    let mut strand: Vec<Vec3> = (0..8)
        .map(|j| Vec3::new(j as f32 * 0.37, (j as f32).sin(), 0.1 * j as f32))
        .collect();
    solve_follow_the_leader(&mut strand, 0.25, 0.0);
    for (j, pair) in strand.windows(2).enumerate() {
        let d = pair[0].distance(pair[1]);
        assert!((d - 0.25).abs() < 1e-5, "segment {} has length {}", j, d);
    }
}

#[test]
fn test_curl_keeps_segment_lengths() {
    let mut strand: Vec<Vec3> = (0..10).map(|j| Vec3::new(0.0, -0.3 * j as f32, 0.0)).collect();
    solve_follow_the_leader(&mut strand, 0.3, 0.1);
    for pair in strand.windows(2) {
        let d = pair[0].distance(pair[1]);
        assert!((d - 0.3).abs() < 1e-4, "curled segment length {}", d);
    }
}

#[test]
fn test_no_forces_keeps_strands_at_rest() {
    let config = HairConfig {
        maximum_strand_count: 64,
        strand_count: 64,
        particles_per_strand: 12,
        hair_length: 2.2,
        layout: LayoutMode::Procedural,
        physics: still_physics(),
        ..HairConfig::default()
    };
    // No proxies, so nothing but the constraint touches positions.
    let proxies = CollisionProxySet::new(&[], config.physics.ellipsoid_radius);
    let layout = StrandGeometryBuilder::new(&config).procedural(&proxies);
    let mut dispatcher = PhysicsDispatcher::new(ComputeDevice::default(), &config, &layout).unwrap();
    let segment = config.segment_length();

    dispatcher.apply_physics(0.016, 0.0, Mat4::IDENTITY, &proxies).unwrap();

    for s in 0..64 {
        let strand = dispatcher.particles().strand(s).unwrap();
        assert_eq!(strand[0], layout.strand(s).unwrap()[0], "root {} moved", s);
        for (j, pair) in strand.windows(2).enumerate() {
            let d = pair[0].distance(pair[1]);
            assert!(
                (d - segment).abs() < 1e-3,
                "strand {} segment {} length {} (expected {})",
                s,
                j,
                d,
                segment
            );
        }
    }
}

#[test]
fn test_gravity_swings_strand_downward() {
    let proxies = CollisionProxySet::new(&[], 0.5);
    let config = HairConfig {
        maximum_strand_count: 1,
        strand_count: 1,
        particles_per_strand: 6,
        hair_length: 1.0,
        layout: LayoutMode::Procedural,
        physics: PhysicsParams {
            wind: Vec4::ZERO,
            ..PhysicsParams::default()
        },
        ..HairConfig::default()
    };
    let layout = StrandGeometryBuilder::new(&config).procedural(&proxies);
    let mut dispatcher = PhysicsDispatcher::new(ComputeDevice::default(), &config, &layout).unwrap();
    {
        // Horizontal strand anchored at the origin.
        let bindings = dispatcher.particles_mut().bind_for_compute();
        for j in 0..6 {
            bindings.positions[j] = Vec3::new(j as f32 * 0.2, 0.0, 0.0);
        }
    }

    for frame in 0..30 {
        dispatcher
            .apply_physics(0.016, frame as f32 * 0.016, Mat4::IDENTITY, &proxies)
            .unwrap();
    }

    let tip = dispatcher.particles().positions()[5];
    assert!(tip.y < -0.1, "tip should fall under gravity, at {:?}", tip);
    assert_eq!(dispatcher.particles().positions()[0], Vec3::ZERO);
}
