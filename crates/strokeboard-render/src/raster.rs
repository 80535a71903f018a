//! Software raster surface.

use crate::renderer::{RenderResult, RendererError};
use std::path::Path;
use strokeboard_core::{CompositingMode, Segment};
use tiny_skia::{
    BlendMode, Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform,
};

/// Largest page edge a surface will be allocated for.
pub const MAX_SURFACE_EDGE: u32 = 16384;

/// Blend rule used for a segment's compositing mode.
pub fn compose_for(mode: CompositingMode) -> BlendMode {
    match mode {
        CompositingMode::NormalOver => BlendMode::SourceOver,
        CompositingMode::EraseOut => BlendMode::DestinationOut,
        CompositingMode::PaintUnder => BlendMode::DestinationOver,
    }
}

/// Premultiplied RGBA8 page surface, row-major, origin top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pixmap: Pixmap,
}

impl Raster {
    /// Create a fully transparent raster.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        if width > MAX_SURFACE_EDGE || height > MAX_SURFACE_EDGE {
            return Err(surface_error(width, height));
        }
        let pixmap = Pixmap::new(width, height).ok_or_else(|| surface_error(width, height))?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Premultiplied pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixmap
            .pixel(x, y)
            .map(|c| [c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Premultiplied RGBA bytes.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Whether every pixel is fully transparent.
    pub fn is_blank(&self) -> bool {
        self.pixmap.data().iter().all(|b| *b == 0)
    }

    /// Make every pixel transparent.
    pub fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    /// Paint one round-capped segment with its compositing rule.
    pub fn paint_segment(&mut self, segment: &Segment) {
        let mut paint = Paint::default();
        paint.anti_alias = true;
        paint.blend_mode = compose_for(segment.mode);

        // The eraser removes ink by coverage alone, whatever its color.
        let color = segment.color;
        match segment.mode {
            CompositingMode::EraseOut => paint.set_color_rgba8(0, 0, 0, 255),
            _ => paint.set_color_rgba8(color.r, color.g, color.b, color.a),
        }

        let width = segment.width.max(0.0) as f32;
        let (start, end) = (segment.start(), segment.end());
        let (x0, y0, x1, y1) = (start.x as f32, start.y as f32, end.x as f32, end.y as f32);

        if start == end {
            if let Some(dot) = PathBuilder::from_circle(x0, y0, width / 2.0) {
                self.pixmap
                    .fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
            }
            return;
        }

        let mut builder = PathBuilder::new();
        builder.move_to(x0, y0);
        builder.line_to(x1, y1);
        let Some(path) = builder.finish() else {
            log::trace!("Skipping unbuildable segment from {}", segment.contributor);
            return;
        };
        let stroke = Stroke {
            width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Straight-alpha RGBA8 bytes, for export.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect()
    }

    /// Encode as an RGBA PNG.
    pub fn encode_png(&self) -> RenderResult<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| RendererError::Encode(e.to_string()))
    }

    /// Write a PNG file.
    pub fn save_png(&self, path: &Path) -> RenderResult<()> {
        std::fs::write(path, self.encode_png()?)?;
        Ok(())
    }
}

fn surface_error(width: u32, height: u32) -> RendererError {
    RendererError::Surface(format!("cannot allocate a {}x{} surface", width, height))
}
