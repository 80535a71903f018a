//! Operations delivered to every replica, in one agreed order.

use crate::segment::{ContributorId, PageKey, Segment};
use serde::{Deserialize, Serialize};

/// A drawing operation as it travels between replicas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    /// Pointer pressed on a page; the first segment follows.
    StartGesture {
        page: PageKey,
        contributor: ContributorId,
    },
    /// One more segment; `is_new` opens a new stroke.
    AppendSegment {
        page: PageKey,
        segment: Segment,
        is_new: bool,
    },
    Undo { contributor: ContributorId },
    Redo { contributor: ContributorId },
    /// Wipe a page; `None` means the bound page.
    Clear {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        page: Option<PageKey>,
    },
    /// Page navigation.
    PageChanged { page: PageKey, width: u32, height: u32 },
    /// The page (and its image) was deleted.
    PageRemoved { page: PageKey },
    /// Session membership: a contributor disconnected.
    ContributorLeft { contributor: ContributorId },
}

impl Operation {
    /// Contributor that issued the operation, where there is one.
    pub fn contributor(&self) -> Option<&ContributorId> {
        match self {
            Operation::StartGesture { contributor, .. }
            | Operation::Undo { contributor }
            | Operation::Redo { contributor }
            | Operation::ContributorLeft { contributor } => Some(contributor),
            Operation::AppendSegment { segment, .. } => Some(&segment.contributor),
            Operation::Clear { .. }
            | Operation::PageChanged { .. }
            | Operation::PageRemoved { .. } => None,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
