use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Wall-clock minutes since midnight. All feed data is same-day.
#[derive(Debug, Clone, Copy, Ord, Eq, PartialEq, PartialOrd, Hash)]
pub struct Time(pub u16);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed time {0:?}, expected HH:MM")]
pub struct ParseTimeError(pub String);

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for Time {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseTimeError(s.to_string());
        let (hours, minutes) = s.split_once(':').ok_or_else(err)?;
        let hours: u16 = hours.parse().map_err(|_| err())?;
        let minutes: u16 = minutes.parse().map_err(|_| err())?;
        if hours > 23 || minutes > 59 {
            return Err(err());
        }
        Ok(Time(hours * 60 + minutes))
    }
}

impl Serialize for Time {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Time {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
