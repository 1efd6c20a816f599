use crate::runway::RunwayId;
use crate::time::{ParseTimeError, Time};
use std::collections::HashMap;
use std::sync::Arc;
use tabled::Tabled;
use thiserror::Error;

pub type FlightCode = Arc<str>;

/// Flight plan catalog, keyed by flight code. Loaded once per import and
/// read-only afterwards.
pub type Catalog = HashMap<FlightCode, FlightPlan>;

#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct FlightPlan {
    pub code: FlightCode,
    pub origin: Arc<str>,
    pub destination: Arc<str>,
    pub etd: Time,
    pub eta: Time,
    pub aircraft: Arc<str>,
    pub category: Arc<str>,
    pub priority: u8,
    pub preferred_runway: RunwayId,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseFlightError {
    #[error("expected 9 comma-separated fields, got {0}")]
    WrongFieldCount(usize),
    #[error("bad priority {0:?}")]
    BadPriority(String),
    #[error(transparent)]
    Time(#[from] ParseTimeError),
}

impl FlightPlan {
    pub const HEADER: &'static str =
        "code,origin,destination,etd,eta,aircraft,category,priority,preferred_runway";

    pub fn parse_record(line: &str) -> Result<FlightPlan, ParseFlightError> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 9 {
            return Err(ParseFlightError::WrongFieldCount(fields.len()));
        }
        Ok(FlightPlan {
            code: Arc::from(fields[0]),
            origin: Arc::from(fields[1]),
            destination: Arc::from(fields[2]),
            etd: fields[3].parse()?,
            eta: fields[4].parse()?,
            aircraft: Arc::from(fields[5]),
            category: Arc::from(fields[6]),
            priority: fields[7]
                .parse()
                .map_err(|_| ParseFlightError::BadPriority(fields[7].to_string()))?,
            preferred_runway: Arc::from(fields[8]),
        })
    }
}
