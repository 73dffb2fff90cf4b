//! In-memory collector of named scalar series.
use super::{Record, RecordValue, Recorder};
use anyhow::{Context, Result};
use log::{info, warn};
use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{BufReader, BufWriter},
    path::Path,
};

/// Maximum number of values stored in a single data file.
const MAX_VALUES_PER_FILE: usize = 1_000_000;

const INFO_FILE: &str = "info";
const DATA_FILE_PREFIX: &str = "d_";

/// A titled series of scalar values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statistic {
    /// Human-readable title, e.g., used as a plot title.
    pub title: String,

    /// Values in the order they were recorded.
    pub data: Vec<f32>,
}

/// A [`Recorder`] keeping registered statistics in memory.
///
/// Only scalar values whose key was registered with [`add_statistic`] are kept,
/// other values are dropped with a warning.
///
/// [`add_statistic`]: StatisticsCollector::add_statistic
#[derive(Debug, Clone)]
pub struct StatisticsCollector {
    owner: String,
    statistics: BTreeMap<String, Statistic>,
}

impl StatisticsCollector {
    /// Constructs an empty collector.
    ///
    /// `owner` names the subdirectory used by [`save`](Self::save).
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            statistics: BTreeMap::new(),
        }
    }

    /// Registers a statistic. Registering an existing name keeps its data.
    pub fn add_statistic(&mut self, name: impl Into<String>, title: impl Into<String>) {
        let title = title.into();
        self.statistics
            .entry(name.into())
            .or_insert_with(|| Statistic {
                title,
                data: vec![],
            });
    }

    /// Returns all statistics.
    pub fn statistics(&self) -> &BTreeMap<String, Statistic> {
        &self.statistics
    }

    /// Returns the values of a statistic.
    pub fn data(&self, name: &str) -> Option<&[f32]> {
        self.statistics.get(name).map(|s| s.data.as_slice())
    }

    /// Averages a statistic over consecutive chunks of `over` values.
    ///
    /// If there are fewer values than `over`, every value is its own chunk. A
    /// trailing partial chunk is dropped.
    pub fn averaged(&self, name: &str, over: usize) -> Option<Vec<f32>> {
        let data = &self.statistics.get(name)?.data;
        let mut over = over.max(1);

        if data.len() < over {
            warn!(
                "Averaging window {} of {} is larger than its {} values, using 1",
                over,
                name,
                data.len()
            );
            over = 1;
        } else if data.len() % over != 0 {
            warn!(
                "Averaging window {} does not divide the {} values of {}",
                over,
                data.len(),
                name
            );
        }

        Some(
            data.chunks_exact(over)
                .map(|c| c.iter().sum::<f32>() / over as f32)
                .collect(),
        )
    }

    /// Saves the statistics under `dir/<owner>/<name>/`.
    ///
    /// Each statistic is split into files of at most 1,000,000 values.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let base = dir.as_ref().join(&self.owner);

        for (name, statistic) in self.statistics.iter() {
            let local = base.join(name);
            fs::create_dir_all(&local)
                .with_context(|| format!("Failed to create {:?}", local))?;

            for (i, chunk) in statistic.data.chunks(MAX_VALUES_PER_FILE).enumerate() {
                let file = File::create(local.join(format!("{}{}", DATA_FILE_PREFIX, i)))?;
                bincode::serialize_into(BufWriter::new(file), chunk)?;
            }

            let file = File::create(local.join(INFO_FILE))?;
            bincode::serialize_into(BufWriter::new(file), &statistic.title)?;
        }

        info!("Saved statistics of {} to {:?}", self.owner, base);
        Ok(())
    }

    /// Loads statistics saved by [`save`](Self::save) from `dir/<owner>/`.
    ///
    /// Loaded statistics replace registered ones of the same name.
    pub fn load(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let base = dir.as_ref().join(&self.owner);

        for entry in fs::read_dir(&base).with_context(|| format!("Failed to read {:?}", base))? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let statistic = Self::load_statistic(&entry.path())?;
            self.statistics.insert(name, statistic);
        }

        info!("Loaded statistics of {} from {:?}", self.owner, base);
        Ok(())
    }

    fn load_statistic(path: &Path) -> Result<Statistic> {
        let title: String =
            bincode::deserialize_from(BufReader::new(File::open(path.join(INFO_FILE))?))?;

        let mut chunks = vec![];
        for entry in fs::read_dir(path)? {
            let file_name = entry?.file_name().to_string_lossy().into_owned();
            if let Some(ix) = file_name.strip_prefix(DATA_FILE_PREFIX) {
                let ix: usize = ix
                    .parse()
                    .with_context(|| format!("Unexpected data file {}", file_name))?;
                chunks.push((ix, file_name));
            }
        }
        chunks.sort();

        let mut data = vec![];
        for (_, file_name) in chunks {
            let file = File::open(path.join(file_name))?;
            let chunk: Vec<f32> = bincode::deserialize_from(BufReader::new(file))?;
            data.extend(chunk);
        }

        Ok(Statistic { title, data })
    }
}

impl Recorder for StatisticsCollector {
    fn write(&mut self, record: Record) {
        for (k, v) in record.into_iter_in_record() {
            match (self.statistics.get_mut(&k), v) {
                (Some(statistic), RecordValue::Scalar(v)) => statistic.data.push(v),
                (Some(_), v) => warn!("Statistic {} only takes scalars, got {:?}", k, v),
                (None, _) => warn!("Attempted update of unknown statistic {} of {}", k, self.owner),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_unknown_statistic_is_dropped() {
        let mut collector = StatisticsCollector::new("agent");
        collector.add_statistic("loss", "Loss");
        collector.record("loss", 1.0);
        collector.record("reward", 2.0);

        assert_eq!(collector.data("loss"), Some(&[1.0][..]));
        assert_eq!(collector.data("reward"), None);
    }

    #[test]
    fn test_averaged() {
        let mut collector = StatisticsCollector::new("agent");
        collector.add_statistic("reward", "Reward");
        for v in [1.0, 3.0, 5.0, 7.0, 9.0] {
            collector.record("reward", v);
        }

        assert_eq!(collector.averaged("reward", 2), Some(vec![2.0, 6.0]));
        assert_eq!(
            collector.averaged("reward", 10),
            Some(vec![1.0, 3.0, 5.0, 7.0, 9.0])
        );
        assert_eq!(collector.averaged("loss", 2), None);
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let dir = TempDir::new("statistics")?;
        let mut collector = StatisticsCollector::new("neural");
        collector.add_statistic("epsilon", "Epsilon per episode");
        collector.record("epsilon", 1.0);
        collector.record("epsilon", 0.9);
        collector.save(dir.path())?;

        let mut loaded = StatisticsCollector::new("neural");
        loaded.load(dir.path())?;
        assert_eq!(loaded.statistics(), collector.statistics());

        Ok(())
    }
}
