use crate::time::{ParseTimeError, Time};
use std::str::FromStr;
use thiserror::Error;

/// Reported when no observation exists at or before the query instant.
pub const UNRESTRICTED_VISIBILITY_KM: u32 = 999;

/// A routine weather report, reduced to its observation time and horizontal
/// visibility. The raw line is kept for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherObservation {
    pub time: Time,
    pub visibility_km: u32,
    pub raw: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseMetarError {
    #[error("empty observation line")]
    Empty,
    #[error("no VIS group in observation")]
    MissingVisibility,
    #[error("bad visibility value {0:?}")]
    BadVisibility(String),
    #[error(transparent)]
    Time(#[from] ParseTimeError),
}

impl FromStr for WeatherObservation {
    type Err = ParseMetarError;

    // "08:00 METAR SBGL 24008KT VIS 8KM FEW020"
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let time: Time = tokens.first().ok_or(ParseMetarError::Empty)?.parse()?;
        let vis_idx = tokens
            .iter()
            .position(|t| *t == "VIS")
            .ok_or(ParseMetarError::MissingVisibility)?;
        let value = tokens
            .get(vis_idx + 1)
            .ok_or(ParseMetarError::MissingVisibility)?;
        let visibility_km = value
            .strip_suffix("KM")
            .unwrap_or(value)
            .parse()
            .map_err(|_| ParseMetarError::BadVisibility(value.to_string()))?;
        Ok(WeatherObservation {
            time,
            visibility_km,
            raw: line.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_time_and_visibility() {
        let obs: WeatherObservation = "08:00 METAR SBGL 24008KT VIS 8KM FEW020".parse().unwrap();
        assert_eq!("08:00".parse::<Time>(), Ok(obs.time));
        assert_eq!(8, obs.visibility_km);
        assert_eq!("08:00 METAR SBGL 24008KT VIS 8KM FEW020", obs.raw);
    }

    #[test]
    fn rejects_lines_without_a_vis_group() {
        assert_eq!(
            Err(ParseMetarError::MissingVisibility),
            "08:00 METAR SBGL 24008KT".parse::<WeatherObservation>()
        );
        assert_eq!(
            Err(ParseMetarError::MissingVisibility),
            "08:00 METAR VIS".parse::<WeatherObservation>()
        );
    }

    #[test]
    fn rejects_unparseable_visibility() {
        assert_eq!(
            Err(ParseMetarError::BadVisibility("fogKM".to_string())),
            "08:00 VIS fogKM".parse::<WeatherObservation>()
        );
    }
}
