use super::*;

#[test]
fn declared_type_comes_from_extension() {
    assert_eq!(IntakeFile::from_path("a/photo.png").mime, "image/png");
    assert_eq!(IntakeFile::from_path("photo.JPG").mime, "image/jpeg");
    assert_eq!(IntakeFile::from_path("notes.txt").mime, UNKNOWN_MIME);
    assert_eq!(IntakeFile::from_path("no_extension").mime, UNKNOWN_MIME);
}

#[test]
fn only_the_first_file_of_a_drop_is_considered() {
    let files = vec![
        IntakeFile::from_path("readme.txt"),
        IntakeFile::from_path("photo.png"),
    ];
    assert!(first_image(&files).is_none());

    let files = vec![
        IntakeFile::from_path("photo.png"),
        IntakeFile::from_path("other.jpg"),
    ];
    assert_eq!(
        first_image(&files).map(|f| f.path.clone()),
        Some(PathBuf::from("photo.png"))
    );
    assert!(first_image(&[]).is_none());
}

#[test]
fn explicit_mime_overrides_extension() {
    let f = IntakeFile::with_mime("blob.bin", "image/webp");
    assert!(f.is_image());
    let f = IntakeFile::with_mime("photo.png", "text/plain");
    assert!(!f.is_image());
}

#[test]
fn loading_a_non_image_is_rejected_before_io() {
    let err = SelectedImage::load(&IntakeFile::from_path("missing/notes.txt")).unwrap_err();
    assert!(matches!(err, ReelError::Intake(_)));
}

#[test]
fn image_refs_are_unique_per_intake() {
    let tex = Texture::from_straight_rgba8(1, 1, vec![0, 0, 0, 255]).unwrap();
    let a = SelectedImage::from_texture("a.png".into(), "image/png".into(), tex.clone());
    let b = SelectedImage::from_texture("a.png".into(), "image/png".into(), tex);
    assert_ne!(a.id, b.id);
    assert!(a.id.to_string().starts_with("blob:depthreel/"));
}
