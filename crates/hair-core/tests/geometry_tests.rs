use glam::Vec3;
use hair_core::config::{HairConfig, LayoutFallback, LayoutMode};
use hair_core::error::HairError;
use hair_core::hair::Hair;
use hair_core::head::HeadMesh;
use hair_core::proxy::CollisionProxySet;
use hair_core::strands::{is_scalp_vertex, StrandGeometryBuilder, StrandLayout, SCALP_VERTEX_STRIDE};

/// Vertices on the upper back of a unit sphere, all inside the scalp region.
fn scalp_mesh(vertices: usize) -> HeadMesh {
    let positions: Vec<Vec3> = (0..vertices)
        .map(|i| {
            let t = i as f32 / vertices as f32;
            let theta = t * std::f32::consts::PI;
            Vec3::new(theta.cos(), 0.2 + 0.5 * theta.sin(), -0.8)
        })
        .collect();
    let normals = positions.iter().map(|p| p.normalize()).collect();
    HeadMesh::new(positions, normals, Vec::new()).unwrap()
}

fn assert_contiguous(layout: &StrandLayout, maximum: u32, pps: u32) {
    assert_eq!(layout.positions().len(), (maximum * pps) as usize);
    assert_eq!(layout.strand_count(), maximum);
    let mut next = 0;
    for (s, range) in layout.draw_ranges().iter().enumerate() {
        assert_eq!(range.first, next, "strand {} leaves a gap or overlaps", s);
        assert_eq!(range.count, pps);
        next += range.count;
    }
    assert_eq!(next, maximum * pps);
}

fn assert_segment_spacing(layout: &StrandLayout, segment: f32) {
    for s in 0..layout.strand_count() {
        let strand = layout.strand(s).unwrap();
        for pair in strand.windows(2) {
            let d = pair[0].distance(pair[1]);
            assert!((d - segment).abs() < 1e-4, "strand {} spacing {} != {}", s, d, segment);
        }
    }
}

#[test]
fn test_procedural_layout_fills_capacity() {
    let proxies = CollisionProxySet::head(0.5);
    let mut builder = StrandGeometryBuilder::with_dimensions(300, 15, 0.2, 11);
    let layout = builder.procedural(&proxies);
    assert_contiguous(&layout, 300, 15);
    assert_segment_spacing(&layout, 0.2);
    assert_eq!(layout.scalp_strands(), 0);
}

#[test]
fn test_procedural_is_deterministic_per_seed() {
    let proxies = CollisionProxySet::head(0.5);
    let a = StrandGeometryBuilder::with_dimensions(50, 4, 0.1, 3).procedural(&proxies);
    let b = StrandGeometryBuilder::with_dimensions(50, 4, 0.1, 3).procedural(&proxies);
    assert_eq!(a.positions(), b.positions());
}

#[test]
fn test_scalp_layout_synthesizes_remaining_strands() {
    let mesh = scalp_mesh(100);
    let samples = mesh
        .positions()
        .iter()
        .step_by(SCALP_VERTEX_STRIDE)
        .filter(|p| is_scalp_vertex(**p))
        .count() as u32;
    assert_eq!(samples, 10);

    let mut builder = StrandGeometryBuilder::with_dimensions(25, 6, 0.25, 1);
    let layout = builder.scalp(&mesh).unwrap();
    assert_contiguous(&layout, 25, 6);
    assert_segment_spacing(&layout, 0.25);
    assert_eq!(layout.scalp_strands(), samples);

    // Scalp strands start at the sampled vertices and grow along the normal.
    let first = layout.strand(0).unwrap();
    assert_eq!(first[0], mesh.positions()[0]);
    let dir = (first[1] - first[0]).normalize();
    assert!(dir.dot(mesh.normals()[0].normalize()) > 0.999);
}

#[test]
fn test_scalp_samples_capped_at_maximum() {
    let mesh = scalp_mesh(400);
    let mut builder = StrandGeometryBuilder::with_dimensions(12, 3, 0.1, 1);
    let layout = builder.scalp(&mesh).unwrap();
    assert_contiguous(&layout, 12, 3);
    assert_eq!(layout.scalp_strands(), 12);
}

#[test]
fn test_scalp_without_samples_is_an_error() {
    let positions = vec![Vec3::new(0.0, -3.0, 2.0); 40];
    let normals = vec![Vec3::Y; 40];
    let mesh = HeadMesh::new(positions, normals, Vec::new()).unwrap();
    let mut builder = StrandGeometryBuilder::with_dimensions(10, 3, 0.1, 1);
    assert!(matches!(builder.scalp(&mesh), Err(HairError::EmptyScalp)));
}

#[test]
fn test_empty_scalp_falls_back_or_fails() {
    // Placement moves this mesh far below the scalp region.
    let positions = vec![Vec3::new(0.0, 0.0, 0.0); 40];
    let normals = vec![Vec3::Y; 40];
    let mesh = || HeadMesh::new(positions.clone(), normals.clone(), Vec::new());

    let base = HairConfig {
        maximum_strand_count: 100,
        strand_count: 50,
        particles_per_strand: 5,
        layout: LayoutMode::Scalp,
        ..HairConfig::default()
    };

    let hair = Hair::builder(base.clone()).head_asset(mesh()).build().unwrap();
    assert_eq!(hair.positions().len(), 500);
    assert!(hair.head().is_some(), "the head is still drawn after a fallback");

    let strict = HairConfig {
        layout_fallback: LayoutFallback::Fail,
        ..base
    };
    let result = Hair::builder(strict).head_asset(mesh()).build();
    assert!(matches!(result, Err(HairError::EmptyScalp)));
}

#[test]
fn test_malformed_asset_rejected() {
    assert!(matches!(
        HeadMesh::from_interleaved(&[0.0; 7], Vec::new()),
        Err(HairError::AssetLoad(_))
    ));
    assert!(matches!(
        HeadMesh::from_interleaved(&[0.0; 12], vec![0, 1, 5]),
        Err(HairError::AssetLoad(_))
    ));
}
