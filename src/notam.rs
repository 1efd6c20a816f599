use crate::runway::{RunwayId, RunwayStatus};
use crate::time::{ParseTimeError, Time};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// A notice to airmen. Runway-scoped notices carry a status tag and a
/// same-day validity window; everything else is free text kept for display.
#[derive(Debug, Clone, PartialEq)]
pub enum Notam {
    Closure(ClosureWindow),
    Notice(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosureWindow {
    pub runway: RunwayId,
    pub status: RunwayStatus,
    pub start: Time,
    pub end: Time,
    pub text: String,
}

impl ClosureWindow {
    /// Both window boundaries are inclusive. Only CLOSED notices restrict.
    pub fn is_active_at(&self, instant: Time) -> bool {
        self.status == RunwayStatus::Closed && self.start <= instant && instant <= self.end
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseNotamError {
    #[error("runway notice is missing its {0} field")]
    MissingField(&'static str),
    #[error("bad validity window {0:?}, expected HH:MM-HH:MM")]
    BadWindow(String),
    #[error(transparent)]
    Time(#[from] ParseTimeError),
}

impl FromStr for Notam {
    type Err = ParseNotamError;

    // "RWY 09L CLOSED 09:00-09:30 surface repainting"
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        if !line.starts_with("RWY") {
            return Ok(Notam::Notice(line.to_string()));
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let runway = tokens.get(1).ok_or(ParseNotamError::MissingField("runway"))?;
        let status = tokens.get(2).ok_or(ParseNotamError::MissingField("status"))?;
        let window = tokens.get(3).ok_or(ParseNotamError::MissingField("window"))?;
        let (start, end) = window
            .split_once('-')
            .ok_or_else(|| ParseNotamError::BadWindow(window.to_string()))?;
        let start: Time = start.parse()?;
        let end: Time = end.parse()?;
        if end < start {
            // Malformed windows are rejected here, never corrected.
            return Err(ParseNotamError::BadWindow(window.to_string()));
        }
        let text = tokens.get(4..).map(|t| t.join(" ")).unwrap_or_default();
        Ok(Notam::Closure(ClosureWindow {
            runway: Arc::from(*runway),
            status: RunwayStatus::parse(status),
            start,
            end,
            text,
        }))
    }
}

impl fmt::Display for Notam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notam::Closure(c) => write!(
                f,
                "RWY {} {} {}-{} {}",
                c.runway, c.status, c.start, c.end, c.text
            ),
            Notam::Notice(text) => write!(f, "{}", text),
        }
    }
}
