//! Strokes: the segments produced by one gesture.

use crate::segment::{ContributorId, Segment};
use serde::{Deserialize, Serialize};

/// Stable handle of a stroke inside its ledger's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StrokeId(pub(crate) usize);

impl StrokeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// An ordered run of segments plus its undo state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    segments: Vec<Segment>,
    active: bool,
}

impl Stroke {
    /// Create an active stroke holding its first segment.
    pub(crate) fn new(first: Segment) -> Self {
        Self {
            segments: vec![first],
            active: true,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_parts(segments: Vec<Segment>, active: bool) -> Self {
        Self { segments, active }
    }

    pub(crate) fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Whether the stroke is painted on replay.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Contributor tag of the first segment.
    pub fn contributor(&self) -> Option<&ContributorId> {
        self.segments.first().map(|s| &s.contributor)
    }
}
