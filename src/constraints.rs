use crate::metar::{UNRESTRICTED_VISIBILITY_KM, WeatherObservation};
use crate::notam::{ClosureWindow, Notam};
use crate::runway::{RunwayId, RunwayStatus};
use crate::time::Time;
use std::collections::{BTreeMap, HashMap};

/// Point-in-time snapshot of everything that can deny a clearance. Built once
/// per import and never mutated; a reimport swaps in a whole new store.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConstraintStore {
    runways: HashMap<RunwayId, RunwayStatus>,
    notams: Vec<Notam>,
    weather: BTreeMap<Time, WeatherObservation>,
}

impl ConstraintStore {
    pub fn new(
        runways: HashMap<RunwayId, RunwayStatus>,
        notams: Vec<Notam>,
        observations: impl IntoIterator<Item = WeatherObservation>,
    ) -> ConstraintStore {
        let weather = observations.into_iter().map(|obs| (obs.time, obs)).collect();
        ConstraintStore {
            runways,
            notams,
            weather,
        }
    }

    /// Exact lookup; an unknown runway is `None`, distinct from known-but-closed.
    pub fn runway_status(&self, runway: &str) -> Option<&RunwayStatus> {
        self.runways.get(runway)
    }

    /// First closure on `runway` whose window contains `instant`. One match is
    /// enough to deny; no "most restrictive" selection.
    pub fn active_closure(&self, runway: &str, instant: Time) -> Option<&ClosureWindow> {
        self.notams
            .iter()
            .filter_map(|n| match n {
                Notam::Closure(c) => Some(c),
                Notam::Notice(_) => None,
            })
            .find(|c| c.runway.as_ref() == runway && c.is_active_at(instant))
    }

    /// Visibility from the most recent observation at or before `instant`.
    /// Strictly latest-at-or-before; an instant preceding every observation
    /// is unrestricted.
    pub fn visibility_at(&self, instant: Time) -> u32 {
        self.weather
            .range(..=instant)
            .next_back()
            .map(|(_, obs)| obs.visibility_km)
            .unwrap_or(UNRESTRICTED_VISIBILITY_KM)
    }

    pub fn runways(&self) -> impl Iterator<Item = (&RunwayId, &RunwayStatus)> {
        self.runways.iter()
    }

    pub fn notams(&self) -> &[Notam] {
        &self.notams
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn t(s: &str) -> Time {
        s.parse().unwrap()
    }

    fn obs(time: &str, visibility_km: u32) -> WeatherObservation {
        WeatherObservation {
            time: t(time),
            visibility_km,
            raw: format!("{time} VIS {visibility_km}KM"),
        }
    }

    #[test]
    fn unknown_runway_is_distinct_from_closed() {
        let mut runways = HashMap::new();
        runways.insert(RunwayId::from("27R"), RunwayStatus::Closed);
        let store = ConstraintStore::new(runways, vec![], vec![]);

        assert_eq!(Some(&RunwayStatus::Closed), store.runway_status("27R"));
        assert_eq!(None, store.runway_status("09L"));
    }

    #[test]
    fn closure_lookup_matches_runway_and_window() {
        let closure: Notam = "RWY 09L CLOSED 09:00-09:30 works".parse().unwrap();
        let store = ConstraintStore::new(HashMap::new(), vec![closure], vec![]);

        assert!(store.active_closure("09L", t("09:15")).is_some());
        assert!(store.active_closure("27R", t("09:15")).is_none());
        assert!(store.active_closure("09L", t("09:31")).is_none());
    }

    #[test]
    fn overlapping_closures_report_the_first_match() {
        let first: Notam = "RWY 09L CLOSED 09:00-10:00 resurfacing".parse().unwrap();
        let second: Notam = "RWY 09L CLOSED 09:30-09:45 inspection".parse().unwrap();
        let store = ConstraintStore::new(HashMap::new(), vec![first, second], vec![]);

        let hit = store.active_closure("09L", t("09:40")).unwrap();
        assert_eq!("resurfacing", hit.text);
        assert_eq!(Arc::from("09L"), hit.runway);
    }

    #[test]
    fn visibility_selects_latest_at_or_before() {
        let store = ConstraintStore::new(
            HashMap::new(),
            vec![],
            vec![obs("08:00", 8), obs("09:00", 5)],
        );

        assert_eq!(8, store.visibility_at(t("08:30")));
        assert_eq!(5, store.visibility_at(t("09:00")));
        assert_eq!(5, store.visibility_at(t("09:15")));
    }

    #[test]
    fn instants_before_any_observation_are_unrestricted() {
        let store = ConstraintStore::new(HashMap::new(), vec![], vec![obs("08:00", 5)]);

        assert_eq!(UNRESTRICTED_VISIBILITY_KM, store.visibility_at(t("07:00")));
    }
}
