use glam::{Mat4, Vec3};
use hair_core::config::{HairConfig, LayoutMode};
use hair_core::device::ComputeDevice;
use hair_core::dispatcher::PhysicsDispatcher;
use hair_core::proxy::CollisionProxySet;
use hair_core::strands::StrandGeometryBuilder;
use hair_core::volume::{VolumeGrid, VOLUME_NODES, VOLUME_ORIGIN};

#[test]
fn test_reset_clears_every_node() {
    let mut grid = VolumeGrid::new();
    for i in 0..50 {
        grid.accumulate(Vec3::new(i as f32 * 0.1 - 2.0, -3.0, 0.5), Vec3::new(1.0, -2.0, 0.5));
    }
    assert!(!grid.is_clear());

    grid.reset();
    assert!(grid.is_clear(), "reset must zero density and velocity sums");
    assert_eq!(grid.total_density(), 0);
}

#[test]
fn test_accumulation_counts_particles_per_node() {
    let grid = VolumeGrid::new();
    let node = [5, 5, 5];
    let center = grid.node_position(node);
    for _ in 0..10 {
        assert!(grid.accumulate(center, Vec3::new(1.0, 0.0, -0.5)));
    }
    let idx = VolumeGrid::node_index(node);
    assert_eq!(grid.density_at(idx), 10);

    let mean = grid.average_velocity(idx);
    assert!(
        (mean - Vec3::new(1.0, 0.0, -0.5)).length() < 0.01,
        "mean velocity: {:?}",
        mean
    );
}

#[test]
fn test_outside_particles_are_ignored() {
    let grid = VolumeGrid::new();
    assert!(!grid.accumulate(VOLUME_ORIGIN - Vec3::splat(5.0), Vec3::ONE));
    assert!(!grid.accumulate(Vec3::splat(f32::NAN), Vec3::ONE));
    assert!(grid.is_clear());
}

#[test]
fn test_parallel_accumulation_is_order_independent() {
    let grid = VolumeGrid::new();
    let device_grid = &grid;
    let mut device = ComputeDevice::default();
    device.dispatch(8, 128, 1000, |gid| {
        let x = (gid % 10) as f32 * 0.5 - 2.0;
        device_grid.accumulate(Vec3::new(x, -2.0, 0.0), Vec3::X);
    });
    assert_eq!(grid.total_density(), 1000);
    assert!(VOLUME_NODES > 0);
}

#[test]
fn test_step_accumulates_active_particles_only() {
    let config = HairConfig {
        maximum_strand_count: 400,
        strand_count: 120,
        particles_per_strand: 10,
        layout: LayoutMode::Procedural,
        ..HairConfig::default()
    };
    let proxies = CollisionProxySet::head(config.physics.ellipsoid_radius);
    let layout = StrandGeometryBuilder::new(&config).procedural(&proxies);
    let mut dispatcher = PhysicsDispatcher::new(ComputeDevice::default(), &config, &layout).unwrap();

    dispatcher.apply_physics(0.016, 0.0, Mat4::IDENTITY, &proxies).unwrap();
    let total = dispatcher.volume().total_density();
    assert!(total > 0, "active particles should land in the lattice");
    assert!(total <= 1200, "only active particles accumulate, got {}", total);

    // Every step starts from an empty grid.
    dispatcher.apply_physics(0.016, 0.016, Mat4::IDENTITY, &proxies).unwrap();
    assert!(dispatcher.volume().total_density() <= 1200);
}

#[test]
fn test_heavy_node_keeps_velocity_sign() {
    let grid = VolumeGrid::new();
    let node = [5, 5, 5];
    let center = grid.node_position(node);
    // Every particle of a full default store, each at the contribution cap.
    let particles = 30_000 * 15;
    for _ in 0..particles {
        grid.accumulate(center, Vec3::new(1.0e4, -1.0e4, 0.0));
    }

    let idx = VolumeGrid::node_index(node);
    assert_eq!(grid.density_at(idx), particles);
    let mean = grid.average_velocity(idx);
    assert!(
        (mean.x - 7_071.07).abs() < 1.0 && (mean.y + 7_071.07).abs() < 1.0,
        "mean velocity of a saturated node: {:?}",
        mean
    );
    assert_eq!(mean.z, 0.0);
}
