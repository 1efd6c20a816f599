use crate::constraints::ConstraintStore;
use crate::flight::{Catalog, FlightCode};
use crate::queue::{AlreadyQueued, OpKind, Queue, QueueEntry};
use crate::runway::{RunwayId, RunwayStatus};
use crate::time::Time;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Below this visibility only one movement may be in progress tower-wide, so
/// any new clearance is denied rather than tracking in-flight traffic.
pub const MIN_VISIBILITY_KM: u32 = 6;

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Authorize { flight: FlightCode, runway: RunwayId },
    Deny(DenyReason),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DenyReason {
    #[error("no flight waiting in the queue")]
    EmptyQueue,
    #[error("runway {runway} is not OPEN ({})", status_label(.status))]
    RunwayNotOpen {
        runway: RunwayId,
        /// `None` when the runway is not in the table at all.
        status: Option<RunwayStatus>,
    },
    #[error("NOTAM active on runway {runway} at {at}: {text}")]
    NotamActive {
        runway: RunwayId,
        at: Time,
        text: String,
    },
    #[error("low visibility ({visibility_km}KM), one movement at a time")]
    LowVisibility { visibility_km: u32 },
}

fn status_label(status: &Option<RunwayStatus>) -> String {
    match status {
        Some(status) => format!("status {status}"),
        None => "unknown runway".to_string(),
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnqueueError {
    #[error("flight {0} not found in the flight plan catalog")]
    FlightNotFound(FlightCode),
    #[error(transparent)]
    AlreadyQueued(#[from] AlreadyQueued),
}

/// Decides whether the front of `queue` may use `runway` under the current
/// snapshot. Pure: never mutates the queue, never retries; the caller applies
/// the pop on an authorized clearance.
pub fn evaluate(queue: &Queue, runway: &str, store: &ConstraintStore) -> Decision {
    let Some(entry) = queue.peek_front() else {
        return Decision::Deny(DenyReason::EmptyQueue);
    };

    let status = store.runway_status(runway);
    if status != Some(&RunwayStatus::Open) {
        return Decision::Deny(DenyReason::RunwayNotOpen {
            runway: Arc::from(runway),
            status: status.cloned(),
        });
    }

    let at = entry.scheduled;
    if let Some(closure) = store.active_closure(runway, at) {
        return Decision::Deny(DenyReason::NotamActive {
            runway: Arc::from(runway),
            at,
            text: closure.text.clone(),
        });
    }

    let visibility_km = store.visibility_at(at);
    if visibility_km < MIN_VISIBILITY_KM {
        return Decision::Deny(DenyReason::LowVisibility { visibility_km });
    }

    Decision::Authorize {
        flight: entry.flight.clone(),
        runway: Arc::from(runway),
    }
}

/// The single decision-maker. Owns the two queues; the catalog and constraint
/// snapshot are read-only between imports.
pub struct Tower {
    catalog: Catalog,
    constraints: ConstraintStore,
    takeoff: Queue,
    landing: Queue,
}

impl Tower {
    pub fn new(
        catalog: Catalog,
        constraints: ConstraintStore,
        takeoff: Queue,
        landing: Queue,
    ) -> Tower {
        let tower = Tower {
            catalog,
            constraints,
            takeoff,
            landing,
        };
        tower.assert_invariants();
        tower
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn constraints(&self) -> &ConstraintStore {
        &self.constraints
    }

    pub fn queue(&self, op: OpKind) -> &Queue {
        match op {
            OpKind::Takeoff => &self.takeoff,
            OpKind::Landing => &self.landing,
        }
    }

    fn queue_mut(&mut self, op: OpKind) -> &mut Queue {
        match op {
            OpKind::Takeoff => &mut self.takeoff,
            OpKind::Landing => &mut self.landing,
        }
    }

    /// Builds the entry from the catalog record and appends it at the tail.
    pub fn enqueue_flight(&mut self, op: OpKind, code: &str) -> Result<(), EnqueueError> {
        let plan = self
            .catalog
            .get(code)
            .ok_or_else(|| EnqueueError::FlightNotFound(Arc::from(code)))?;
        let entry = QueueEntry::from_plan(plan);
        self.queue_mut(op).enqueue(entry)?;
        self.assert_invariants();
        Ok(())
    }

    /// Runs the engine over the head of the `op` queue; pops it on an
    /// authorized clearance, leaves the queue untouched on any denial.
    pub fn authorize(&mut self, op: OpKind, runway: &str) -> Decision {
        debug_assert!(!runway.trim().is_empty(), "runway id must be non-empty");
        let decision = evaluate(self.queue(op), runway, &self.constraints);
        if let Decision::Authorize { .. } = decision {
            self.queue_mut(op).pop_front();
        }
        self.assert_invariants();
        decision
    }

    /// Swaps in a freshly imported snapshot wholesale; both queues restart
    /// empty. Snapshots are never mutated in place.
    pub fn reimport(&mut self, catalog: Catalog, constraints: ConstraintStore) {
        self.catalog = catalog;
        self.constraints = constraints;
        self.takeoff.clear();
        self.landing.clear();
    }

    fn assert_invariants(&self) {
        for op in OpKind::ALL {
            let mut seen = HashSet::new();
            debug_assert!(
                self.queue(op).iter().all(|e| seen.insert(e.flight.clone())),
                "duplicate flight in the {op} queue"
            );
        }
    }
}
