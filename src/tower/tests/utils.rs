use crate::constraints::ConstraintStore;
use crate::flight::FlightPlan;
use crate::metar::WeatherObservation;
use crate::notam::{ClosureWindow, Notam};
use crate::queue::{Queue, QueueEntry};
use crate::runway::{RunwayId, RunwayStatus};
use crate::time::Time;
use crate::tower::tower::Tower;
use std::collections::HashMap;
use std::sync::Arc;

pub fn id(s: &str) -> Arc<str> {
    Arc::from(s)
}

pub fn t(s: &str) -> Time {
    s.parse().unwrap()
}

pub fn plan(code: &str, etd: &str, priority: u8, preferred_runway: &str) -> FlightPlan {
    let etd = t(etd);
    FlightPlan {
        code: id(code),
        origin: id("GIG"),
        destination: id("CGH"),
        etd,
        eta: Time(etd.0 + 50),
        aircraft: id("B737"),
        category: id("domestic"),
        priority,
        preferred_runway: id(preferred_runway),
    }
}

pub fn entry(code: &str, scheduled: &str, priority: u8, preferred_runway: &str) -> QueueEntry {
    QueueEntry {
        flight: id(code),
        scheduled: t(scheduled),
        priority,
        preferred_runway: id(preferred_runway),
    }
}

pub fn queue_of(entries: Vec<QueueEntry>) -> Queue {
    let mut queue = Queue::default();
    for e in entries {
        queue.enqueue(e).unwrap();
    }
    queue
}

pub fn runways(pairs: &[(&str, RunwayStatus)]) -> HashMap<RunwayId, RunwayStatus> {
    pairs
        .iter()
        .map(|(rwy, status)| (id(rwy), status.clone()))
        .collect()
}

pub fn closure(runway: &str, start: &str, end: &str, text: &str) -> Notam {
    Notam::Closure(ClosureWindow {
        runway: id(runway),
        status: RunwayStatus::Closed,
        start: t(start),
        end: t(end),
        text: text.to_string(),
    })
}

pub fn metar(time: &str, visibility_km: u32) -> WeatherObservation {
    WeatherObservation {
        time: t(time),
        visibility_km,
        raw: format!("{time} VIS {visibility_km}KM"),
    }
}

pub fn store(
    runways: HashMap<RunwayId, RunwayStatus>,
    notams: Vec<Notam>,
    weather: Vec<WeatherObservation>,
) -> ConstraintStore {
    ConstraintStore::new(runways, notams, weather)
}

pub fn open_runway_store(rwy: &str) -> ConstraintStore {
    store(runways(&[(rwy, RunwayStatus::Open)]), vec![], vec![])
}

pub fn tower_with(plans: Vec<FlightPlan>, constraints: ConstraintStore) -> Tower {
    let catalog = plans.into_iter().map(|p| (p.code.clone(), p)).collect();
    Tower::new(catalog, constraints, Queue::default(), Queue::default())
}
