use super::*;

#[test]
fn no_drag_no_update() {
    let mut orbit = OrbitControls::default();
    let mut cam = Camera::default();
    assert!(!orbit.update(&mut cam));
    assert_eq!(cam, Camera::default());
}

#[test]
fn quarter_height_drag_right_swings_camera_to_minus_x() {
    let mut orbit = OrbitControls::default();
    let mut cam = Camera::default();
    orbit.drag(150.0, 0.0, 600);
    assert!(orbit.update(&mut cam));
    assert!(cam.position.abs_diff_eq(Vec3::new(-5.0, 0.0, 0.0), 1e-4));
    assert_eq!(cam.target, Vec3::ZERO);
    assert!(!orbit.has_pending());
}

#[test]
fn orbit_preserves_distance_and_clamps_polar() {
    let mut orbit = OrbitControls::default();
    let mut cam = Camera::default();
    orbit.drag(37.0, 10_000.0, 600);
    orbit.update(&mut cam);
    assert!((cam.position.length() - 5.0).abs() < 1e-4);
    // Dragged far past the pole: stays just short of straight up.
    assert!(cam.position.y > 4.99);
}
