use glam::Vec4;
use hair_core::config::{HairConfig, LayoutFallback, LayoutMode, PhysicsParams};
use hair_core::error::HairError;

#[test]
fn test_defaults() {
    let config = HairConfig::default();
    assert_eq!(config.maximum_strand_count, 30_000);
    assert_eq!(config.strand_count, 5_000);
    assert_eq!(config.particles_per_strand, 15);
    assert_eq!(config.local_group_width, 256);
    assert_eq!(config.layout, LayoutMode::Scalp);
    assert_eq!(config.layout_fallback, LayoutFallback::Procedural);
    assert!((config.segment_length() - 3.0 / 14.0).abs() < 1e-6);
    assert_eq!(config.particle_capacity(), Ok(450_000));

    let physics = PhysicsParams::default();
    assert_eq!(physics.gravity, -9.81);
    assert_eq!(physics.wind, Vec4::new(1.0, 0.0, 0.0, 0.2));
    assert_eq!(physics.ellipsoid_radius, 0.5);
    assert!(config.validate().is_ok());
}

#[test]
fn test_json_round_trip() {
    let config = HairConfig {
        strand_count: 7_000,
        curl_radius: 0.04,
        layout: LayoutMode::Procedural,
        ..HairConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: HairConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_partial_json_uses_defaults() {
    let config: HairConfig =
        serde_json::from_str(r#"{ "strand_count": 1200, "physics": { "gravity": -3.0 } }"#).unwrap();
    assert_eq!(config.strand_count, 1_200);
    assert_eq!(config.maximum_strand_count, 30_000);
    assert_eq!(config.physics.gravity, -3.0);
    assert_eq!(config.physics.friction, PhysicsParams::default().friction);
}

#[test]
fn test_validation_errors() {
    let cases: Vec<(HairConfig, &str)> = vec![
        (
            HairConfig {
                particles_per_strand: 1,
                ..HairConfig::default()
            },
            "one particle per strand",
        ),
        (
            HairConfig {
                strand_count: 30_001,
                ..HairConfig::default()
            },
            "active above maximum",
        ),
        (
            HairConfig {
                hair_length: 0.0,
                ..HairConfig::default()
            },
            "zero length",
        ),
        (
            HairConfig {
                maximum_strand_count: u32::MAX,
                particles_per_strand: 15,
                strand_count: 0,
                ..HairConfig::default()
            },
            "capacity overflow",
        ),
    ];
    for (config, label) in cases {
        assert!(config.validate().is_err(), "{} should be rejected", label);
    }

    let err = HairConfig {
        strand_count: 30_001,
        ..HairConfig::default()
    }
    .validate()
    .unwrap_err();
    assert_eq!(
        err,
        HairError::CapacityExceeded {
            requested: 30_001,
            maximum: 30_000
        }
    );
}

#[test]
fn test_physics_validation() {
    assert!(PhysicsParams::default().validate().is_ok());
    let cases = [
        PhysicsParams {
            friction: 1.8,
            ..PhysicsParams::default()
        },
        PhysicsParams {
            velocity_damping: 1.5,
            ..PhysicsParams::default()
        },
        PhysicsParams {
            ellipsoid_radius: -0.5,
            ..PhysicsParams::default()
        },
        PhysicsParams {
            max_speed: 0.0,
            ..PhysicsParams::default()
        },
        PhysicsParams {
            wind: Vec4::new(f32::NAN, 0.0, 0.0, 1.0),
            ..PhysicsParams::default()
        },
    ];
    for physics in cases {
        assert!(physics.validate().is_err(), "{:?} should be rejected", physics);
        let config = HairConfig {
            physics,
            ..HairConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
