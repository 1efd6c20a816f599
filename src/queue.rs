use crate::flight::{FlightCode, FlightPlan};
use crate::runway::RunwayId;
use crate::time::Time;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::path::Path;
use tabled::Tabled;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Takeoff,
    Landing,
}

impl OpKind {
    pub const ALL: [OpKind; 2] = [OpKind::Takeoff, OpKind::Landing];

    pub fn parse(token: &str) -> Option<OpKind> {
        match token {
            "takeoff" | "t" => Some(OpKind::Takeoff),
            "landing" | "l" => Some(OpKind::Landing),
            _ => None,
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpKind::Takeoff => write!(f, "takeoff"),
            OpKind::Landing => write!(f, "landing"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tabled)]
pub struct QueueEntry {
    pub flight: FlightCode,
    pub scheduled: Time,
    pub priority: u8,
    pub preferred_runway: RunwayId,
}

impl QueueEntry {
    // Both queues key on the plan's ETD; the landing feed reports its
    // estimate in the same field.
    pub fn from_plan(plan: &FlightPlan) -> QueueEntry {
        QueueEntry {
            flight: plan.code.clone(),
            scheduled: plan.etd,
            priority: plan.priority,
            preferred_runway: plan.preferred_runway.clone(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("flight {0} is already queued")]
pub struct AlreadyQueued(pub FlightCode);

/// Append-order FIFO. Authorization only ever touches the front; sorted views
/// are produced at listing time from a copy.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Queue {
    entries: VecDeque<QueueEntry>,
}

impl Queue {
    /// Appends at the tail; a flight code may appear at most once per queue,
    /// checked against the whole queue.
    pub fn enqueue(&mut self, entry: QueueEntry) -> Result<(), AlreadyQueued> {
        if self.entries.iter().any(|e| e.flight == entry.flight) {
            return Err(AlreadyQueued(entry.flight));
        }
        self.entries.push_back(entry);
        Ok(())
    }

    pub fn peek_front(&self) -> Option<&QueueEntry> {
        self.entries.front()
    }

    pub fn pop_front(&mut self) -> Option<QueueEntry> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueueEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Missing or empty file means an empty queue, so a fresh data dir works
    /// without an import.
    pub fn load_from_file(path: &Path) -> io::Result<Queue> {
        if !path.exists() {
            return Ok(Queue::default());
        }
        let data = std::fs::read_to_string(path)?;
        if data.trim().is_empty() {
            return Ok(Queue::default());
        }
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save_to_file(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)
    }
}
