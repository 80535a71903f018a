//! Renderer trait abstraction.

use crate::raster::Raster;
use strokeboard_core::{Ledger, Segment};
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Surface error: {0}")]
    Surface(String),
    #[error("Encoding failed: {0}")]
    Encode(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Trait for paint backends.
///
/// Painting is order-sensitive: paint-under and erase act on whatever is already
/// on the surface, so a ledger can only be shown by replaying it from blank.
pub trait Renderer {
    /// Blank the surface at the given page size.
    fn clear(&mut self, width: u32, height: u32) -> RenderResult<()>;

    /// Paint a single segment on top of the current surface.
    fn paint_segment(&mut self, segment: &Segment) -> RenderResult<()>;

    /// Repaint a ledger from a blank surface, in creation order, skipping
    /// inactive strokes.
    fn replay(&mut self, ledger: &Ledger) -> RenderResult<()> {
        self.clear(ledger.width(), ledger.height())?;
        for stroke in ledger.strokes().filter(|s| s.is_active()) {
            for segment in stroke.segments() {
                self.paint_segment(segment)?;
            }
        }
        Ok(())
    }
}

/// Renderer painting into an in-memory [`Raster`].
#[derive(Debug, Clone)]
pub struct RasterRenderer {
    raster: Raster,
}

impl RasterRenderer {
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        Ok(Self {
            raster: Raster::new(width, height)?,
        })
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn into_raster(self) -> Raster {
        self.raster
    }
}

impl Renderer for RasterRenderer {
    fn clear(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if self.raster.width() == width && self.raster.height() == height {
            self.raster.clear();
        } else {
            self.raster = Raster::new(width, height)?;
        }
        Ok(())
    }

    fn paint_segment(&mut self, segment: &Segment) -> RenderResult<()> {
        self.raster.paint_segment(segment);
        Ok(())
    }
}

/// Replay a ledger onto a fresh raster of its page size.
pub fn render_ledger(ledger: &Ledger) -> RenderResult<Raster> {
    let mut renderer = RasterRenderer::new(ledger.width(), ledger.height())?;
    renderer.replay(ledger)?;
    Ok(renderer.into_raster())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use strokeboard_core::{PageKey, SerializableColor};

    fn seg(who: &str, y: f64, color: SerializableColor) -> Segment {
        Segment::new(who.into(), Point::new(0.0, y), Point::new(16.0, y), color, 2.0)
    }

    fn ledger() -> Ledger {
        let mut ledger = Ledger::new(PageKey(0), 16, 16);
        ledger.append_segment(PageKey(0), seg("u1", 4.5, SerializableColor::black()), true);
        ledger.append_segment(PageKey(0), seg("u2", 8.5, SerializableColor::black()), true);
        ledger
    }

    #[test]
    fn test_zero_surface_rejected() {
        assert!(matches!(
            RasterRenderer::new(0, 10),
            Err(RendererError::Surface(_))
        ));
        let mut renderer = RasterRenderer::new(4, 4).unwrap();
        assert!(renderer.clear(4, 0).is_err());
        assert!(matches!(
            renderer.clear(u32::MAX, u32::MAX),
            Err(RendererError::Surface(_))
        ));
        assert_eq!(renderer.raster().width(), 4);
    }

    #[test]
    fn test_replay_skips_inactive() {
        let mut ledger = ledger();
        ledger.undo(&"u1".into());
        let raster = render_ledger(&ledger).unwrap();
        assert_eq!(raster.pixel(8, 4), Some([0, 0, 0, 0]));
        assert_eq!(raster.pixel(8, 8), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_replay_is_idempotent() {
        let ledger = ledger();
        let mut renderer = RasterRenderer::new(16, 16).unwrap();
        renderer.replay(&ledger).unwrap();
        let first = renderer.raster().clone();
        renderer.replay(&ledger).unwrap();
        assert_eq!(renderer.raster(), &first);
    }

    #[test]
    fn test_replay_resizes_to_page() {
        let ledger = Ledger::new(PageKey(1), 5, 7);
        let mut renderer = RasterRenderer::new(16, 16).unwrap();
        renderer.replay(&ledger).unwrap();
        assert_eq!(renderer.raster().width(), 5);
        assert_eq!(renderer.raster().height(), 7);
    }

    #[test]
    fn test_incremental_matches_replay() {
        let ledger = ledger();
        let mut incremental = RasterRenderer::new(16, 16).unwrap();
        for stroke in ledger.strokes() {
            for segment in stroke.segments() {
                incremental.paint_segment(segment).unwrap();
            }
        }
        assert_eq!(incremental.raster(), &render_ledger(&ledger).unwrap());
    }
}
