use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u16(255, 128), 128);
    assert_eq!(mul_div255_u16(0, 200), 0);
}

#[test]
fn premultiply_zero_alpha_clears_color() {
    let mut px = vec![200u8, 100, 50, 0, 255, 0, 0, 128];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![0, 0, 0, 0, 128, 0, 0, 128]);
}

#[test]
fn smoothstep_clamps_and_handles_degenerate_edges() {
    assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
    assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
    assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    assert_eq!(smoothstep(0.3, 0.3, 0.2), 0.0);
    assert_eq!(smoothstep(0.3, 0.3, 0.4), 1.0);
}

#[test]
fn unit_to_u8_saturates() {
    assert_eq!(unit_to_u8(-0.5), 0);
    assert_eq!(unit_to_u8(1.5), 255);
    assert_eq!(unit_to_u8(0.5), 128);
}
