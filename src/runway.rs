use std::fmt;
use std::sync::Arc;

pub type RunwayId = Arc<str>;

/// Operational state of a runway as reported by the runway table feed.
/// Tokens other than OPEN/CLOSED are kept verbatim rather than guessed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunwayStatus {
    Open,
    Closed,
    Unrecognized(String),
}

impl RunwayStatus {
    pub fn parse(token: &str) -> RunwayStatus {
        match token {
            "OPEN" => RunwayStatus::Open,
            "CLOSED" => RunwayStatus::Closed,
            other => RunwayStatus::Unrecognized(other.to_string()),
        }
    }
}

impl fmt::Display for RunwayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunwayStatus::Open => write!(f, "OPEN"),
            RunwayStatus::Closed => write!(f, "CLOSED"),
            RunwayStatus::Unrecognized(raw) => write!(f, "{}", raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exact_tokens_map_to_known_states() {
        assert_eq!(RunwayStatus::Open, RunwayStatus::parse("OPEN"));
        assert_eq!(RunwayStatus::Closed, RunwayStatus::parse("CLOSED"));
        assert_eq!(
            RunwayStatus::Unrecognized("FECHADA".to_string()),
            RunwayStatus::parse("FECHADA")
        );
        assert_eq!(
            RunwayStatus::Unrecognized("open".to_string()),
            RunwayStatus::parse("open")
        );
    }
}
