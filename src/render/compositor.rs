//! Composites laid-out verse text onto a themed background image.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;
use tracing::{debug, warn};

use crate::assets::catalog::{AssetCatalog, Theme};
use crate::assets::color;
use crate::foundation::error::{VerseError, VerseResult};
use crate::layout::engine::{self, LINE_GAP_PX};
use crate::render::text::{self, TextEngine};

/// Output canvas width in pixels.
pub const CANVAS_WIDTH: u32 = 1080;

/// Output canvas height in pixels.
pub const CANVAS_HEIGHT: u32 = 1920;

/// Shadow offset applied on both axes, in pixels.
pub const SHADOW_OFFSET_PX: f64 = 2.0;

const FILENAME_PREFIX: &str = "verse-craft";

/// One render request: the verse and its styling.
#[derive(Clone, Debug)]
pub struct RenderRequest {
    /// Verse text; must be non-empty.
    pub text: String,
    /// Theme whose backgrounds are drawn from.
    pub theme: Theme,
    /// Requested font display name.
    pub font: String,
    /// Specific background file name, if the caller picked one.
    pub background: Option<String>,
    /// Foreground color as a hex string (`#RRGGBB`).
    pub color: String,
}

/// Finished render: PNG bytes plus a collision-resistant suggested filename.
#[derive(Clone, Debug)]
pub struct RenderedImage {
    /// PNG-encoded 1080x1920 RGB image.
    pub png: Vec<u8>,
    /// Suggested download filename (`verse-craft-<secs>-<seq>.png`).
    pub filename: String,
}

/// Composes verses onto themed backgrounds.
///
/// Owns the asset catalog snapshot and the text shaping contexts; each call
/// to [`Compositor::render`] is otherwise self-contained and holds no state
/// across requests beyond the filename sequence counter.
pub struct Compositor {
    catalog: AssetCatalog,
    text_engine: TextEngine,
    seq: AtomicU64,
}

impl Compositor {
    /// Build a compositor over an explicit catalog.
    pub fn new(catalog: AssetCatalog) -> Self {
        Self {
            catalog,
            text_engine: TextEngine::new(),
            seq: AtomicU64::new(0),
        }
    }

    /// The catalog snapshot in use.
    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    /// Mutable catalog access, e.g. for an explicit re-scan.
    pub fn catalog_mut(&mut self) -> &mut AssetCatalog {
        &mut self.catalog
    }

    /// Render one verse to a finished PNG.
    ///
    /// Fails only on empty text, font-chain exhaustion, or PNG encoding;
    /// every other asset problem degrades through its fallback chain with a
    /// warning.
    #[tracing::instrument(
        skip(self, req),
        fields(theme = req.theme.name(), chars = req.text.chars().count())
    )]
    pub fn render(&mut self, req: &RenderRequest) -> VerseResult<RenderedImage> {
        if req.text.is_empty() {
            return Err(VerseError::validation("verse text must be non-empty"));
        }

        let fg = {
            let resolved = color::resolve_color(&req.color);
            if let Some(reason) = resolved.reason() {
                warn!(reason, "color fallback");
            }
            *resolved.value()
        };

        let font = {
            let resolved = self.catalog.resolve_font(&req.font)?;
            if let Some(reason) = resolved.reason() {
                warn!(reason, "font fallback");
            }
            resolved.into_value()
        };
        let glyph_font = text::font_data(font.bytes.clone());
        let family = self.text_engine.register(&font.bytes)?;

        // Plan the block, keeping each shaped line for the draw pass.
        let shaper = &mut self.text_engine;
        let mut layouts = Vec::new();
        let block = engine::plan_block(&req.text, |line, size_px| {
            let layout = shaper.layout_line(line, &family, size_px)?;
            let dims = (f64::from(layout.width()), f64::from(layout.height()));
            layouts.push(layout);
            Ok(dims)
        })?;
        debug!(
            font_size = block.font_size,
            lines = block.lines.len(),
            total_height = block.total_height,
            "planned verse block"
        );

        let w = CANVAS_WIDTH as u16;
        let h = CANVAS_HEIGHT as u16;
        let mut ctx = vello_cpu::RenderContext::new(w, h);

        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        match self.background_paint(req.theme, req.background.as_deref()) {
            Some(paint) => ctx.set_paint(paint),
            None => ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 0, 255)),
        }
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(CANVAS_WIDTH),
            f64::from(CANVAS_HEIGHT),
        ));

        let shadow = color::shadow_for(fg).rgba();
        let mut y = (f64::from(CANVAS_HEIGHT) - block.total_height) / 2.0;
        if y < 0.0 {
            // Oversized blocks render partially off-canvas; accepted, not corrected.
            debug!(total_height = block.total_height, "verse block overflows canvas");
        }
        for (line, layout) in block.lines.iter().zip(&layouts) {
            let x = (f64::from(CANVAS_WIDTH) - line.width_px) / 2.0;
            text::draw_line(
                &mut ctx,
                &glyph_font,
                layout,
                x + SHADOW_OFFSET_PX,
                y + SHADOW_OFFSET_PX,
                shadow,
            );
            text::draw_line(&mut ctx, &glyph_font, layout, x, y, [fg.r, fg.g, fg.b, 255]);
            y += line.height_px + LINE_GAP_PX;
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);

        let png = encode_png(&pixmap)?;
        Ok(RenderedImage {
            png,
            filename: self.next_filename(),
        })
    }

    /// Resolve and load the background paint, or `None` for the solid black
    /// fallback canvas. Never fails.
    fn background_paint(&self, theme: Theme, requested: Option<&str>) -> Option<vello_cpu::Image> {
        let resolved = self.catalog.resolve_background(theme, requested);
        if let Some(reason) = resolved.reason() {
            warn!(reason, "background fallback");
        }
        let path = resolved.into_value();
        match load_background(&path) {
            Ok(paint) => Some(paint),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "background unusable, using black canvas");
                None
            }
        }
    }

    fn next_filename(&self) -> String {
        // Seconds-resolution sortable timestamp; the sequence suffix keeps
        // same-second renders from colliding within a process.
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("{FILENAME_PREFIX}-{secs}-{seq:04}.png")
    }
}

fn load_background(path: &Path) -> VerseResult<vello_cpu::Image> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read background '{}'", path.display()))?;
    let decoded = image::load_from_memory(&bytes).context("decode background image")?;
    let resized = decoded.resize_exact(
        CANVAS_WIDTH,
        CANVAS_HEIGHT,
        image::imageops::FilterType::Lanczos3,
    );
    let mut rgba = resized.to_rgba8().into_raw();
    premultiply_rgba8_in_place(&mut rgba);
    let pixmap = pixmap_from_premul_bytes(&rgba, CANVAS_WIDTH, CANVAS_HEIGHT)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn encode_png(pixmap: &vello_cpu::Pixmap) -> VerseResult<Vec<u8>> {
    let mut rgba = pixmap.data_as_u8_slice().to_vec();
    unpremultiply_rgba8_in_place(&mut rgba);

    let mut rgb = Vec::with_capacity(CANVAS_WIDTH as usize * CANVAS_HEIGHT as usize * 3);
    for px in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
    }
    let img = image::RgbImage::from_raw(CANVAS_WIDTH, CANVAS_HEIGHT, rgb)
        .ok_or_else(|| VerseError::encode("canvas buffer size mismatch"))?;

    let mut png = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| VerseError::encode(format!("png encode failed: {e}")))?;
    Ok(png)
}

fn pixmap_from_premul_bytes(bytes: &[u8], width: u32, height: u32) -> VerseResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| VerseError::encode("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| VerseError::encode("pixmap height exceeds u16"))?;
    if bytes.len() != (width as usize) * (height as usize) * 4 {
        return Err(VerseError::encode("pixmap byte len mismatch"));
    }
    // Pixmap stores PremulRgba8; our bytes are already premultiplied.
    let mut pixels =
        Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity((width as usize) * (height as usize));
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}
