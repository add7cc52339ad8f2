use versecraft::{AssetCatalog, Compositor, RenderRequest, Theme, VerseError};

fn request(text: &str) -> RenderRequest {
    RenderRequest {
        text: text.to_owned(),
        theme: Theme::Default,
        font: "DancingScript".to_owned(),
        background: None,
        color: "#ffffff".to_owned(),
    }
}

/// Rasterization needs a real font somewhere in the fallback chain; skip on
/// machines with no resolvable font at all.
fn compositor_or_skip(root: &std::path::Path) -> Option<Compositor> {
    let catalog = AssetCatalog::scan(root);
    if catalog.resolve_font("DancingScript").is_err() {
        eprintln!("skipping: no font resolvable in this environment");
        return None;
    }
    Some(Compositor::new(catalog))
}

fn assert_canvas_png(png: &[u8]) {
    let decoded = image::load_from_memory(png).expect("output must be valid PNG");
    assert_eq!(decoded.width(), 1080);
    assert_eq!(decoded.height(), 1920);
}

#[test]
fn renders_on_black_canvas_when_no_backgrounds_exist() {
    let root = tempfile::tempdir().unwrap();
    let Some(mut comp) = compositor_or_skip(root.path()) else {
        return;
    };

    let out = comp.render(&request("Hello World")).unwrap();
    assert_canvas_png(&out.png);
    assert!(out.filename.starts_with("verse-craft-"));
    assert!(out.filename.ends_with(".png"));

    // Fallback canvas is solid black outside the text block.
    let img = image::load_from_memory(&out.png).unwrap().to_rgb8();
    assert_eq!(img.get_pixel(0, 0), &image::Rgb([0, 0, 0]));
}

#[test]
fn corrupt_background_file_still_renders() {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(root.path().join("backgrounds")).unwrap();
    std::fs::write(root.path().join("backgrounds").join("default.jpg"), b"not an image").unwrap();

    let Some(mut comp) = compositor_or_skip(root.path()) else {
        return;
    };
    let out = comp.render(&request("still works")).unwrap();
    assert_canvas_png(&out.png);
}

#[test]
fn real_background_is_resized_to_canvas() {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(root.path().join("backgrounds")).unwrap();

    // A small solid-red PNG; the compositor must stretch it to 1080x1920.
    let mut bg = Vec::new();
    let red = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 0, 0]));
    image::DynamicImage::ImageRgb8(red)
        .write_to(&mut std::io::Cursor::new(&mut bg), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(root.path().join("backgrounds").join("default.png"), &bg).unwrap();

    let Some(mut comp) = compositor_or_skip(root.path()) else {
        return;
    };
    let out = comp.render(&request("on red")).unwrap();
    let img = image::load_from_memory(&out.png).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (1080, 1920));
    let corner = img.get_pixel(0, 0);
    assert!(corner.0[0] > 150 && corner.0[1] < 50 && corner.0[2] < 50);
}

#[test]
fn bad_color_and_unlisted_background_degrade_silently() {
    let root = tempfile::tempdir().unwrap();
    let Some(mut comp) = compositor_or_skip(root.path()) else {
        return;
    };

    let out = comp
        .render(&RenderRequest {
            text: "fallbacks all the way down".to_owned(),
            theme: Theme::Romantic,
            font: "NoSuchFont".to_owned(),
            background: Some("missing.jpg".to_owned()),
            color: "not-a-color".to_owned(),
        })
        .unwrap();
    assert_canvas_png(&out.png);
}

#[test]
fn empty_text_is_rejected() {
    let root = tempfile::tempdir().unwrap();
    let mut comp = Compositor::new(AssetCatalog::scan(root.path()));
    let err = comp.render(&request("")).unwrap_err();
    assert!(matches!(err, VerseError::Validation(_)));
}

#[test]
fn long_verse_renders_multiple_lines() {
    let root = tempfile::tempdir().unwrap();
    let Some(mut comp) = compositor_or_skip(root.path()) else {
        return;
    };

    let text = "word ".repeat(70);
    let out = comp.render(&request(text.trim())).unwrap();
    assert_canvas_png(&out.png);
}

#[test]
fn same_second_renders_get_distinct_filenames() {
    let root = tempfile::tempdir().unwrap();
    let Some(mut comp) = compositor_or_skip(root.path()) else {
        return;
    };

    let a = comp.render(&request("one")).unwrap();
    let b = comp.render(&request("two")).unwrap();
    assert_ne!(a.filename, b.filename);
}
