use super::*;
use crate::animation::preset::Preset;
use crate::intake::file::SelectedImage;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn canvas() -> Canvas {
    Canvas {
        width: 64,
        height: 64,
    }
}

fn image_from_quadrants(left: [u8; 4], right: [u8; 4]) -> SelectedImage {
    // 2x2: left column `left`, right column `right`.
    let mut px = Vec::new();
    for _ in 0..2 {
        px.extend_from_slice(&left);
        px.extend_from_slice(&right);
    }
    let tex = Texture::from_straight_rgba8(2, 2, px).unwrap();
    SelectedImage::from_texture("q.png".into(), "image/png".into(), tex)
}

fn white_image() -> SelectedImage {
    image_from_quadrants([255; 4], [255; 4])
}

fn backend(parallel: bool) -> CpuBackend {
    CpuBackend::new(
        RenderSettings::default(),
        CpuBackendOpts {
            parallel,
            band_rows: 8,
        },
    )
}

#[test]
fn plane_covers_centre_and_background_fills_corners() {
    let scene = Scene::compose(&white_image(), Preset::Zoom);
    let frame = backend(true).render_scene(&scene, canvas()).unwrap();
    assert_eq!(frame.data.len(), 64 * 64 * 4);
    assert!(frame.premultiplied);

    let centre = frame.pixel(32, 32);
    assert!(centre[0] > 120 && centre[1] > 120 && centre[2] > 120);
    assert_eq!(centre[3], 255);

    let bg = Background::default();
    let corner = frame.pixel(0, 0);
    assert!(corner[0] <= bg.inner.r && corner[0] >= bg.outer.r);
    assert!(corner[2] <= bg.inner.b && corner[2] >= bg.outer.b);
    assert_eq!(corner[3], 255);
}

#[test]
fn texture_is_mapped_upright_and_unmirrored() {
    let scene = Scene::compose(&image_from_quadrants(RED, BLUE), Preset::Zoom);
    let frame = backend(true).render_scene(&scene, canvas()).unwrap();
    let left = frame.pixel(14, 32);
    let right = frame.pixel(50, 32);
    assert!(left[0] > left[2], "left should be red, got {left:?}");
    assert!(right[2] > right[0], "right should be blue, got {right:?}");
}

#[test]
fn back_face_is_drawn_mirrored() {
    let mut scene = Scene::compose(&image_from_quadrants(RED, BLUE), Preset::Zoom);
    scene.mesh.transform.rotation.y = std::f32::consts::PI;
    let frame = backend(true).render_scene(&scene, canvas()).unwrap();
    let left = frame.pixel(14, 32);
    let right = frame.pixel(50, 32);
    assert!(left[2] > left[0], "left should be blue, got {left:?}");
    assert!(right[0] > right[2], "right should be red, got {right:?}");
}

#[test]
fn parallel_and_sequential_bands_match() {
    for preset in Preset::ALL {
        let mut scene = Scene::compose(&image_from_quadrants(RED, BLUE), preset);
        scene.advance(1.25);
        let par = backend(true).render_scene(&scene, canvas()).unwrap();
        let seq = backend(false).render_scene(&scene, canvas()).unwrap();
        assert_eq!(par.data, seq.data, "preset {preset}");
    }
}

#[test]
fn wave_changes_the_picture_over_time() {
    let mut scene = Scene::compose(&white_image(), Preset::Wave);
    let a = backend(true).render_scene(&scene, canvas()).unwrap();
    scene.advance(0.7);
    let b = backend(true).render_scene(&scene, canvas()).unwrap();
    assert_ne!(a.data, b.data);
}

#[test]
fn empty_canvas_is_rejected() {
    let scene = Scene::compose(&white_image(), Preset::Rotate);
    let err = backend(true)
        .render_scene(
            &scene,
            Canvas {
                width: 0,
                height: 4,
            },
        )
        .unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));
}

#[test]
fn odd_canvas_sizes_render() {
    let scene = Scene::compose(&white_image(), Preset::Rotate);
    let frame = backend(true)
        .render_scene(
            &scene,
            Canvas {
                width: 33,
                height: 17,
            },
        )
        .unwrap();
    assert_eq!(frame.data.len(), 33 * 17 * 4);
}

#[test]
fn empty_and_oversized_canvases_are_rejected() {
    let scene = Scene::compose(&white_image(), Preset::Zoom);
    let mut b = backend(false);
    for (width, height) in [(0, 64), (64, 0), (32768, 32768)] {
        let err = b.render_scene(&scene, Canvas { width, height }).unwrap_err();
        assert!(matches!(err, ReelError::Validation(_)), "{width}x{height}");
    }
}

#[test]
fn pixel_addresses_rows_in_order() {
    let frame = FrameRGBA {
        width: 3,
        height: 2,
        data: (0..24).collect(),
        premultiplied: true,
    };
    assert_eq!(frame.pixel(0, 0), [0, 1, 2, 3]);
    assert_eq!(frame.pixel(2, 1), [20, 21, 22, 23]);
}
