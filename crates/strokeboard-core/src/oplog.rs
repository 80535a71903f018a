//! Append-only operation log fanned out to replicas over channels.
//!
//! The log is the single point where operations receive their position in the
//! total order. Each subscriber gets its own channel and sees every operation
//! exactly once, in sequence, starting from the beginning of the log.

use crate::operation::Operation;
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use thiserror::Error;

/// Log consumption errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LogError {
    #[error("Sequence gap: expected {expected}, got {got}")]
    Gap { expected: u64, got: u64 },
    #[error("Operation log closed")]
    Closed,
}

/// Result type for log operations.
pub type LogResult<T> = Result<T, LogError>;

/// An operation stamped with its position in the log.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencedOperation {
    pub seq: u64,
    pub op: Operation,
}

/// Writer side of the log.
#[derive(Debug, Default)]
pub struct OperationLog {
    entries: Vec<SequencedOperation>,
    subscribers: Vec<Sender<SequencedOperation>>,
}

impl OperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of operations appended so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SequencedOperation] {
        &self.entries
    }

    /// Append an operation and deliver it to every live subscriber.
    pub fn append(&mut self, op: Operation) -> u64 {
        let entry = SequencedOperation {
            seq: self.entries.len() as u64,
            op,
        };
        let seq = entry.seq;
        self.subscribers.retain(|tx| {
            let delivered = tx.send(entry.clone()).is_ok();
            if !delivered {
                log::debug!("Dropping closed log subscriber");
            }
            delivered
        });
        self.entries.push(entry);
        seq
    }

    /// Open a reader that first receives the whole history.
    pub fn subscribe(&mut self) -> LogReader {
        let (tx, rx) = channel();
        for entry in &self.entries {
            // The receiver is alive in this scope.
            let _ = tx.send(entry.clone());
        }
        self.subscribers.push(tx);
        LogReader { rx, next: 0 }
    }
}

/// Reader side of the log, owned by one replica.
#[derive(Debug)]
pub struct LogReader {
    rx: Receiver<SequencedOperation>,
    next: u64,
}

impl LogReader {
    /// Sequence number the reader expects next.
    pub fn position(&self) -> u64 {
        self.next
    }

    /// Next operation if one is waiting.
    pub fn try_next(&mut self) -> LogResult<Option<SequencedOperation>> {
        match self.rx.try_recv() {
            Ok(entry) => self.check(entry).map(Some),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(LogError::Closed),
        }
    }

    /// Block until the next operation arrives.
    pub fn next_blocking(&mut self) -> LogResult<SequencedOperation> {
        let entry = self.rx.recv().map_err(|_| LogError::Closed)?;
        self.check(entry)
    }

    /// Take everything currently waiting, in order.
    ///
    /// A closed log is not an error here; whatever was delivered is returned.
    pub fn drain(&mut self) -> LogResult<Vec<SequencedOperation>> {
        let mut out = Vec::new();
        loop {
            match self.try_next() {
                Ok(Some(entry)) => out.push(entry),
                Ok(None) | Err(LogError::Closed) => return Ok(out),
                Err(e) => return Err(e),
            }
        }
    }

    fn check(&mut self, entry: SequencedOperation) -> LogResult<SequencedOperation> {
        if entry.seq != self.next {
            log::warn!("Operation log gap: expected {}, got {}", self.next, entry.seq);
            return Err(LogError::Gap {
                expected: self.next,
                got: entry.seq,
            });
        }
        self.next += 1;
        Ok(entry)
    }
}
