//! Ordered collection of completions
//!
//! The collector knows how many completions to expect. It buffers them
//! in arrival order, and only once the last one arrives does it close
//! the stream and sort by role. Nothing is emitted before that point.

use std::io::{self, Write};

use crossbeam_channel::Receiver;
use tracing::{debug, trace};

use crate::tree::Tree;
use crate::work::{Completion, ResultMessage};
use crate::{ChurnError, Result};

/// Collector lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    /// Waiting for more completions
    Accumulating,
    /// All expected completions received; stream closed
    Done,
}

/// Single consumer of the completion channel
#[derive(Debug)]
pub struct Collector {
    expected: usize,
    receiver: Option<Receiver<Completion>>,
    buffer: Vec<ResultMessage>,
    retained: Vec<Tree>,
}

impl Collector {
    /// Expect exactly `expected` completions on `receiver`
    pub fn new(expected: usize, receiver: Receiver<Completion>) -> Self {
        let receiver = if expected == 0 { None } else { Some(receiver) };
        Self {
            expected,
            receiver,
            buffer: Vec::with_capacity(expected),
            retained: Vec::new(),
        }
    }

    /// Current state
    pub fn state(&self) -> CollectorState {
        if self.receiver.is_some() {
            CollectorState::Accumulating
        } else {
            CollectorState::Done
        }
    }

    /// Completions still outstanding
    pub fn remaining(&self) -> usize {
        self.expected
    }

    /// Block for one completion
    ///
    /// In `Done` this returns immediately. Fails if every sender is gone
    /// while completions are still expected.
    pub fn receive(&mut self) -> Result<CollectorState> {
        let Some(receiver) = self.receiver.as_ref() else {
            return Ok(CollectorState::Done);
        };

        let completion = receiver.recv().map_err(|_| ChurnError::ResultStreamClosed {
            missing: self.expected,
        })?;

        trace!(role = %completion.message.role(), "completion received");
        self.buffer.push(completion.message);
        self.retained.extend(completion.retained);
        self.expected -= 1;

        if self.expected == 0 {
            // Dropping the receiver closes the stream.
            self.receiver = None;
            debug!(messages = self.buffer.len(), "all completions received");
        }
        Ok(self.state())
    }

    /// Receive until `Done`, then sort by role
    pub fn finish(mut self) -> Result<Report> {
        while self.receive()? == CollectorState::Accumulating {}

        let mut messages = std::mem::take(&mut self.buffer);
        // Stable: equal roles would keep arrival order.
        messages.sort_by_key(ResultMessage::role);

        // The long-lived tree is released only after the run has produced its output.
        drop(self.retained);
        Ok(Report { messages })
    }
}

/// Sorted output of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    messages: Vec<ResultMessage>,
}

impl Report {
    /// Messages in output order
    pub fn messages(&self) -> &[ResultMessage] {
        &self.messages
    }

    /// Text lines in output order
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.messages.iter().map(ResultMessage::line)
    }

    /// Number of lines
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if there are no lines
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Write every line followed by `\n`
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for line in self.lines() {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }

    /// blake3 hash (hex) of exactly what `write_to` writes
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for line in self.lines() {
            hasher.update(line.as_bytes());
            hasher.update(b"\n");
        }
        hasher.finalize().to_hex().to_string()
    }
}
