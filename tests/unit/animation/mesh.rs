use super::*;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

#[test]
fn landscape_fits_width() {
    let (w, h) = plane_size(16.0 / 9.0);
    assert_eq!(w, 4.0);
    assert!(close(h, 2.25));
}

#[test]
fn portrait_fits_height() {
    let (w, h) = plane_size(0.5625);
    assert_eq!(h, 4.0);
    assert!(close(w, 2.25));
}

#[test]
fn square_and_invalid_ratios_fill_the_box() {
    assert_eq!(plane_size(1.0), (4.0, 4.0));
    assert_eq!(plane_size(0.0), (4.0, 4.0));
    assert_eq!(plane_size(f32::NAN), (4.0, 4.0));
    assert_eq!(plane_size(-2.0), (4.0, 4.0));
}

#[test]
fn longer_side_is_always_the_box() {
    for aspect in [0.1f32, 0.5, 0.99, 1.01, 2.0, 7.5] {
        let (w, h) = plane_size(aspect);
        assert!(close(w.max(h), BOUNDING_BOX));
        assert!(close(w / h, aspect));
    }
}

#[test]
fn grid_layout_and_uvs() {
    let g = PlaneGeometry::new(4.0, 2.0, 2, 1);
    assert_eq!(g.positions.len(), 6);
    assert_eq!(g.indices.len(), 4);
    assert_eq!(g.positions[0], Vec3::new(-2.0, 1.0, 0.0));
    assert_eq!(g.positions[5], Vec3::new(2.0, -1.0, 0.0));
    assert_eq!(g.uvs[0], Vec2::new(0.0, 1.0));
    assert_eq!(g.uvs[5], Vec2::new(1.0, 0.0));
}

#[test]
fn standard_grid_is_thirty_two_squared() {
    let g = PlaneGeometry::for_aspect(1.5);
    assert_eq!(g.positions.len(), 33 * 33);
    assert_eq!(g.indices.len(), 32 * 32 * 2);
}

#[test]
fn flat_plane_normals_face_plus_z() {
    let mut g = PlaneGeometry::new(4.0, 4.0, 4, 4);
    g.compute_vertex_normals();
    for n in &g.normals {
        assert!(close(n.z, 1.0));
    }
}

#[test]
fn displaced_normals_tilt_away_from_slope() {
    let mut g = PlaneGeometry::new(4.0, 4.0, 8, 8);
    // z rises with x, so normals lean toward -x.
    g.displace_z(|x, _| 0.5 * x);
    g.compute_vertex_normals();
    for n in &g.normals {
        assert!(close(n.length(), 1.0));
        assert!(n.x < 0.0);
        assert!(n.z > 0.0);
    }
}

#[test]
fn identity_transform_is_identity_matrix() {
    assert!(
        MeshTransform::default()
            .model_matrix()
            .abs_diff_eq(Mat4::IDENTITY, 1e-6)
    );
}

#[test]
fn model_matrix_scales_then_translates() {
    let t = MeshTransform {
        position: Vec3::new(1.0, 0.0, 0.0),
        rotation: Vec3::ZERO,
        scale: Vec3::new(2.0, 2.0, 1.0),
    };
    let p = t.model_matrix().transform_point3(Vec3::new(1.0, 1.0, 1.0));
    assert!(p.abs_diff_eq(Vec3::new(3.0, 2.0, 1.0), 1e-6));
}
