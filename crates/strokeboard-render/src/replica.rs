//! A replica: one participant's session and surface, fed from the operation log.

use crate::renderer::{RenderResult, Renderer, RendererError};
use kurbo::Point;
use strokeboard_core::{
    ContributorId, DrawEvent, DrawingSession, LogError, LogReader, Operation, PageRecord,
    SnapshotError,
};
use thiserror::Error;

/// Errors while syncing a replica from the log.
#[derive(Debug, Error)]
pub enum ReplicaError {
    #[error(transparent)]
    Log(#[from] LogError),
    #[error(transparent)]
    Render(#[from] RendererError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Where another contributor's pen last touched the page.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCursor {
    pub contributor: ContributorId,
    pub position: Point,
}

/// Couples a drawing session with the renderer that shows its bound page.
pub struct Replica<R: Renderer> {
    session: DrawingSession,
    renderer: R,
    /// Contributor drawing on this replica, if any; its segments are not cursor updates.
    local: Option<ContributorId>,
    cursors: Vec<RemoteCursor>,
}

impl<R: Renderer> Replica<R> {
    /// Create a replica and paint the session's bound page.
    pub fn new(session: DrawingSession, renderer: R) -> RenderResult<Self> {
        let mut replica = Self {
            session,
            renderer,
            local: None,
            cursors: Vec::new(),
        };
        replica.renderer.replay(replica.session.current())?;
        Ok(replica)
    }

    pub fn with_local_contributor(mut self, contributor: ContributorId) -> Self {
        self.local = Some(contributor);
        self
    }

    pub fn session(&self) -> &DrawingSession {
        &self.session
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_session(self) -> DrawingSession {
        self.session
    }

    /// Apply one operation and bring the surface up to date.
    pub fn apply(&mut self, op: &Operation) -> RenderResult<()> {
        self.session.apply(op);
        self.flush()
    }

    /// Install a page from a snapshot and repaint if it is the bound one.
    pub fn restore_page(&mut self, record: PageRecord) -> Result<(), ReplicaError> {
        self.session.restore_page(record)?;
        Ok(self.flush()?)
    }

    /// Apply every operation waiting in the log. Returns how many were applied.
    ///
    /// Operations are taken from the reader one at a time and always reach the
    /// session, so a failed repaint never costs the replica its place in the
    /// log. The first repaint failure is returned once the log is drained.
    pub fn sync(&mut self, reader: &mut LogReader) -> Result<usize, ReplicaError> {
        let mut applied = 0;
        let mut render_error = None;
        loop {
            let entry = match reader.try_next() {
                Ok(Some(entry)) => entry,
                Ok(None) | Err(LogError::Closed) => break,
                Err(e) => return Err(e.into()),
            };
            applied += 1;
            if let Err(e) = self.apply(&entry.op) {
                log::warn!("Repaint failed after operation {}: {}", entry.seq, e);
                render_error.get_or_insert(e);
            }
        }
        match render_error {
            Some(e) => Err(e.into()),
            None => Ok(applied),
        }
    }

    /// Service queued session events.
    ///
    /// Any full-replay request supersedes incremental paints from the same batch.
    pub fn flush(&mut self) -> RenderResult<()> {
        let events = self.session.take_events();
        let replay = events
            .iter()
            .any(|e| matches!(e, DrawEvent::FullReplayRequested));

        for event in events {
            match event {
                DrawEvent::SegmentPainted(segment) => {
                    if !replay {
                        self.renderer.paint_segment(&segment)?;
                    }
                    if self.local.as_ref() != Some(&segment.contributor) {
                        self.cursors.push(RemoteCursor {
                            position: segment.end(),
                            contributor: segment.contributor,
                        });
                    }
                }
                DrawEvent::GestureStarted(page) => {
                    log::trace!("Gesture started on page {}", page);
                }
                DrawEvent::FullReplayRequested => {}
            }
        }

        if replay {
            self.renderer.replay(self.session.current())?;
        }
        Ok(())
    }

    /// Drain remote cursor positions seen since the last call.
    pub fn take_cursor_updates(&mut self) -> Vec<RemoteCursor> {
        std::mem::take(&mut self.cursors)
    }
}
