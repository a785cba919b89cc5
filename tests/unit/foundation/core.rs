use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.as_f64(), 30.0);
    assert!((fps.frame_duration_secs() - 1.0 / 30.0).abs() < 1e-12);
}

#[test]
fn secs_to_frames_at_thirty_fps() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.secs_to_frames(5), 150);
    assert_eq!(fps.secs_to_frames(0), 0);
    let ntsc = Fps::new(30000, 1001).unwrap();
    assert_eq!(ntsc.secs_to_frames(10), 300);
}

#[test]
fn canvas_validation_requires_even_non_zero() {
    assert!(
        Canvas {
            width: 0,
            height: 10
        }
        .validate()
        .is_err()
    );
    assert!(
        Canvas {
            width: 11,
            height: 10
        }
        .validate()
        .is_err()
    );
    assert!(
        Canvas {
            width: 1280,
            height: 720
        }
        .validate()
        .is_ok()
    );
}

#[test]
fn canvas_validation_bounds_each_side() {
    let side = Canvas::MAX_DIMENSION;
    assert!(Canvas { width: side, height: side }.validate().is_ok());
    assert!(Canvas { width: 32768, height: 32768 }.validate().is_err());
    assert!(Canvas { width: side + 2, height: 720 }.validate().is_err());
    assert_eq!(Canvas { width: 4, height: 2 }.rgba_len(), Some(32));
}

#[test]
fn hex_colors_parse_with_and_without_hash() {
    assert_eq!(Rgb8::from_hex("#667eea").unwrap(), Rgb8::new(0x66, 0x7e, 0xea));
    assert_eq!(Rgb8::from_hex("764ba2").unwrap(), Rgb8::new(0x76, 0x4b, 0xa2));
    assert!(Rgb8::from_hex("#fff").is_err());
    assert!(Rgb8::from_hex("#gggggg").is_err());
}

#[test]
fn colors_serialize_as_hex_strings() {
    let c = Rgb8::new(0x1a, 0x1a, 0x2e);
    assert_eq!(serde_json::to_string(&c).unwrap(), "\"#1a1a2e\"");
    let back: Rgb8 = serde_json::from_str("\"#0F0F1E\"").unwrap();
    assert_eq!(back, Rgb8::new(0x0f, 0x0f, 0x1e));
    assert!(serde_json::from_str::<Rgb8>("\"blue\"").is_err());
}
