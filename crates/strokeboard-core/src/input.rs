//! Pointer gestures to drawing operations.
//!
//! This is the boundary where sampled pointer input turns into the operations
//! that get ordered and replicated. Nothing here touches a ledger.

use crate::operation::Operation;
use crate::segment::{CompositingMode, ContributorId, PageKey, Segment, SerializableColor};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Offset applied to a click-release so a tap leaves a dot.
const CLICK_NUDGE: f64 = 0.01;

/// Pointer event in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
}

/// Brush selected in the picker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    pub color: SerializableColor,
    pub nib: f64,
    /// Paint behind existing ink.
    pub under: bool,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            color: SerializableColor::black(),
            nib: crate::segment::DEFAULT_NIB,
            under: false,
        }
    }
}

/// Turns one contributor's pointer stream into operations.
#[derive(Debug, Clone)]
pub struct GestureRecorder {
    contributor: ContributorId,
    pub brush: Brush,
    /// View scale; nib widths are divided by it so lines look the same at any zoom.
    scale: f64,
    enabled: bool,
    last_point: Option<Point>,
    /// Page the open gesture started on.
    page: PageKey,
    is_new: bool,
}

impl GestureRecorder {
    pub fn new(contributor: ContributorId) -> Self {
        Self {
            contributor,
            brush: Brush::default(),
            scale: 1.0,
            enabled: true,
            last_point: None,
            page: PageKey::INITIAL,
            is_new: false,
        }
    }

    pub fn contributor(&self) -> &ContributorId {
        &self.contributor
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    pub fn enable(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.last_point = None;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a gesture is in progress.
    pub fn is_drawing(&self) -> bool {
        self.last_point.is_some()
    }

    /// Feed one pointer event; `page` is the page currently shown.
    pub fn handle(&mut self, event: PointerEvent, page: PageKey) -> Vec<Operation> {
        match event {
            PointerEvent::Down { position } => self.pointer_down(position, page).into_iter().collect(),
            PointerEvent::Move { position } => self.pointer_move(position).into_iter().collect(),
            PointerEvent::Up { position } => self.pointer_up(position),
        }
    }

    /// Start a gesture. The page key is pinned until release.
    pub fn pointer_down(&mut self, position: Point, page: PageKey) -> Option<Operation> {
        if !self.enabled {
            return None;
        }
        self.last_point = Some(position);
        self.is_new = true;
        self.page = page;
        Some(Operation::StartGesture {
            page,
            contributor: self.contributor.clone(),
        })
    }

    pub fn pointer_move(&mut self, position: Point) -> Option<Operation> {
        if !self.enabled {
            return None;
        }
        let last = self.last_point?;
        self.last_point = Some(position);
        let is_new = std::mem::replace(&mut self.is_new, false);

        let scale = if self.scale == 0.0 { 1.0 } else { self.scale };
        let segment = Segment::new(
            self.contributor.clone(),
            last,
            position,
            self.brush.color,
            self.brush.nib / scale,
        )
        .with_mode(CompositingMode::for_brush(self.brush.color, self.brush.under));

        Some(Operation::AppendSegment {
            page: self.page,
            segment,
            is_new,
        })
    }

    /// End the gesture. A release where the pointer last was leaves a dot.
    pub fn pointer_up(&mut self, position: Point) -> Vec<Operation> {
        if !self.enabled {
            return Vec::new();
        }
        let Some(last) = self.last_point else {
            return Vec::new();
        };

        let mut ops = Vec::new();
        if last == position {
            ops.extend(self.pointer_move(position + Vec2::new(CLICK_NUDGE, 0.0)));
        }
        self.last_point = None;
        ops
    }
}
