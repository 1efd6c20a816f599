use crate::constraints::ConstraintStore;
use crate::flight::{Catalog, FlightPlan};
use crate::metar::WeatherObservation;
use crate::notam::Notam;
use crate::queue::OpKind;
use crate::runway::{RunwayId, RunwayStatus};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Layout of the on-disk session: constraint feeds, the flight plan catalog
/// and the two persisted queues.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> DataDir {
        DataDir { root: root.into() }
    }

    pub fn flights(&self) -> PathBuf {
        self.root.join("flights.csv")
    }

    pub fn runways(&self) -> PathBuf {
        self.root.join("runways.txt")
    }

    pub fn notam(&self) -> PathBuf {
        self.root.join("notam.txt")
    }

    pub fn metar(&self) -> PathBuf {
        self.root.join("metar.txt")
    }

    pub fn queue(&self, op: OpKind) -> PathBuf {
        match op {
            OpKind::Takeoff => self.root.join("queue_takeoff.json"),
            OpKind::Landing => self.root.join("queue_landing.json"),
        }
    }

    pub fn verify(&self) -> Result<(), DataError> {
        let required = [self.flights(), self.runways(), self.notam(), self.metar()];
        let missing: Vec<PathBuf> = required.into_iter().filter(|p| !p.exists()).collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(DataError::Missing(MissingFiles(missing)))
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct MissingFiles(pub Vec<PathBuf>);

impl fmt::Display for MissingFiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.0.iter().map(|p| p.display().to_string()).collect();
        write!(f, "{}", names.join(", "))
    }
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}:{line}: {message}", path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("missing required data files: {0}")]
    Missing(MissingFiles),
}

fn read_lines(path: &Path) -> Result<Vec<String>, DataError> {
    let data = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(data
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

fn malformed(path: &Path, line: usize, err: impl fmt::Display) -> DataError {
    DataError::Malformed {
        path: path.to_path_buf(),
        line,
        message: err.to_string(),
    }
}

pub fn load_catalog(path: &Path) -> Result<Catalog, DataError> {
    let mut catalog = Catalog::new();
    for (idx, line) in read_lines(path)?.into_iter().enumerate() {
        if idx == 0 && line == FlightPlan::HEADER {
            continue;
        }
        let plan = FlightPlan::parse_record(&line).map_err(|e| malformed(path, idx + 1, e))?;
        catalog.insert(plan.code.clone(), plan);
    }
    Ok(catalog)
}

pub fn load_constraints(dir: &DataDir) -> Result<ConstraintStore, DataError> {
    let path = dir.runways();
    let mut runways = HashMap::new();
    for (idx, line) in read_lines(&path)?.into_iter().enumerate() {
        let (id, status) = line
            .split_once(',')
            .ok_or_else(|| malformed(&path, idx + 1, "expected RUNWAY,STATUS"))?;
        runways.insert(RunwayId::from(id.trim()), RunwayStatus::parse(status.trim()));
    }

    let path = dir.notam();
    let notams = read_lines(&path)?
        .iter()
        .enumerate()
        .map(|(idx, line)| line.parse::<Notam>().map_err(|e| malformed(&path, idx + 1, e)))
        .collect::<Result<Vec<_>, _>>()?;

    let path = dir.metar();
    let weather = read_lines(&path)?
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            line.parse::<WeatherObservation>()
                .map_err(|e| malformed(&path, idx + 1, e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ConstraintStore::new(runways, notams, weather))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Time;

    fn write(path: &Path, content: &str) {
        std::fs::write(path, content).unwrap();
    }

    fn seeded_dir() -> (tempfile::TempDir, DataDir) {
        let tmp = tempfile::tempdir().unwrap();
        let dir = DataDir::new(tmp.path());
        write(
            &dir.flights(),
            "code,origin,destination,etd,eta,aircraft,category,priority,preferred_runway\n\
             TAM123,GIG,CGH,10:00,11:05,B737,domestic,3,09L\n\
             GLO456,CGH,SSA,10:15,12:00,B738,domestic,1,09L\n",
        );
        write(&dir.runways(), "09L,OPEN\n27R,CLOSED\n");
        write(
            &dir.notam(),
            "RWY 09L CLOSED 09:00-09:30 surface repainting\nBIRD ACTIVITY NEAR THRESHOLD\n",
        );
        write(&dir.metar(), "08:00 VIS 8KM\n09:00 VIS 5KM\n");
        (tmp, dir)
    }

    #[test]
    fn loads_catalog_skipping_the_header() {
        let (_tmp, dir) = seeded_dir();
        let catalog = load_catalog(&dir.flights()).unwrap();
        assert_eq!(2, catalog.len());
        assert_eq!(3, catalog["TAM123"].priority);
    }

    #[test]
    fn loads_a_full_constraint_snapshot() {
        let (_tmp, dir) = seeded_dir();
        let store = load_constraints(&dir).unwrap();
        assert_eq!(Some(&RunwayStatus::Open), store.runway_status("09L"));
        assert_eq!(2, store.notams().len());
        assert_eq!(5, store.visibility_at("09:30".parse::<Time>().unwrap()));
        assert!(
            store
                .active_closure("09L", "09:15".parse().unwrap())
                .is_some()
        );
    }

    #[test]
    fn verify_names_every_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = DataDir::new(tmp.path());
        write(&dir.runways(), "09L,OPEN\n");
        match dir.verify() {
            Err(DataError::Missing(MissingFiles(missing))) => {
                assert_eq!(vec![dir.flights(), dir.notam(), dir.metar()], missing);
            }
            other => panic!("expected missing-files error, got {other:?}"),
        }
    }

    #[test]
    fn parse_errors_carry_path_and_line() {
        let (_tmp, dir) = seeded_dir();
        write(&dir.metar(), "08:00 VIS 8KM\n25:61 VIS 2KM\n");
        match load_constraints(&dir) {
            Err(DataError::Malformed { path, line, .. }) => {
                assert_eq!(dir.metar(), path);
                assert_eq!(2, line);
            }
            other => panic!("expected malformed-line error, got {other:?}"),
        }
    }
}
