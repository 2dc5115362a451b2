//! Monitor sinks
//!
//! Monitors turn the statistics collected each generation into
//! line-oriented output for downstream analysis. The standard row is
//! whitespace-delimited with a one-time header of statistic names, so
//! tooling can parse by fixed column position.

use std::io::Write;
use std::time::{Duration, Instant};

use crate::checkpoint::stats::Statistic;
use crate::genome::traits::Genome;

/// Handle to a statistic registered with a checkpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatId(pub(crate) usize);

/// A sink receiving the registered statistics once per generation
pub trait Monitor<G: Genome>: Send {
    /// Write one row from the statistics it watches
    fn record(&mut self, stats: &[Box<dyn Statistic<G>>]) -> std::io::Result<()>;

    /// Final flush when the run stops
    fn last_call(&mut self, _stats: &[Box<dyn Statistic<G>>]) -> std::io::Result<()> {
        Ok(())
    }
}

/// Writes watched statistics as delimited text lines
///
/// The first row is a header of statistic names. An optional minimum step
/// suppresses rows that would be written too soon after the previous one.
pub struct FileMonitor<W: Write + Send> {
    out: W,
    delimiter: char,
    min_step: Option<Duration>,
    last_write: Instant,
    wrote_header: bool,
    watched: Vec<StatId>,
}

impl<W: Write + Send> FileMonitor<W> {
    /// Create a monitor writing tab-delimited rows to `out`
    pub fn new(out: W) -> Self {
        Self {
            out,
            delimiter: '\t',
            min_step: None,
            last_write: Instant::now(),
            wrote_header: false,
            watched: Vec::new(),
        }
    }

    /// Use a different field delimiter
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Drop rows arriving sooner than `step` after the previous one
    pub fn min_step(mut self, step: Duration) -> Self {
        self.min_step = Some(step);
        self
    }

    /// Watch a registered statistic; columns appear in watch order
    pub fn watch(&mut self, id: StatId) {
        self.watched.push(id);
    }

    fn write_row<G: Genome>(
        &mut self,
        stats: &[Box<dyn Statistic<G>>],
        header: bool,
    ) -> std::io::Result<()> {
        let mut first = true;
        for id in &self.watched {
            if let Some(stat) = stats.get(id.0) {
                if !first {
                    write!(self.out, "{}", self.delimiter)?;
                }
                if header {
                    write!(self.out, "{}", stat.name())?;
                } else {
                    write!(self.out, "{}", stat.render())?;
                }
                first = false;
            }
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<G: Genome, W: Write + Send> Monitor<G> for FileMonitor<W> {
    fn record(&mut self, stats: &[Box<dyn Statistic<G>>]) -> std::io::Result<()> {
        if self.watched.is_empty() {
            return Ok(());
        }

        if let Some(step) = self.min_step {
            if !self.wrote_header {
                // let the header and the first row through
            } else if self.last_write.elapsed() < step {
                return Ok(());
            }
        }
        self.last_write = Instant::now();

        if !self.wrote_header {
            self.write_row(stats, true)?;
            self.wrote_header = true;
        }
        self.write_row(stats, false)
    }

    fn last_call(&mut self, _stats: &[Box<dyn Statistic<G>>]) -> std::io::Result<()> {
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::stats::{Generation, IslandRank, PopSize};
    use crate::genome::bit_string::BitString;
    use crate::island::state::{Archipelago, IslandState};
    use crate::population::population::Population;

    fn collected_stats() -> Vec<Box<dyn Statistic<BitString>>> {
        let shared = Archipelago::new(3);
        let state = IslandState::new(2, shared);
        let pop: Population<BitString> = Population::init(4, || BitString::zeros(2));

        let mut stats: Vec<Box<dyn Statistic<BitString>>> = vec![
            Box::new(IslandRank::new()),
            Box::new(Generation::new()),
            Box::new(PopSize::new()),
        ];
        for stat in &mut stats {
            stat.collect(&pop, &state);
        }
        stats
    }

    #[test]
    fn test_header_then_values() {
        let stats = collected_stats();
        let mut monitor = FileMonitor::new(Vec::new());
        monitor.watch(StatId(0));
        monitor.watch(StatId(1));
        monitor.watch(StatId(2));

        monitor.record(&stats).unwrap();
        monitor.record(&stats).unwrap();

        let text = String::from_utf8(monitor.out.clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "IslandRank\tGeneration\tPopSize");
        assert_eq!(lines[1], "2\t1\t4");
        assert_eq!(lines[2], "2\t1\t4");
    }

    #[test]
    fn test_custom_delimiter() {
        let stats = collected_stats();
        let mut monitor = FileMonitor::new(Vec::new()).delimiter(' ');
        monitor.watch(StatId(0));
        monitor.watch(StatId(2));

        monitor.record(&stats).unwrap();
        let text = String::from_utf8(monitor.out.clone()).unwrap();
        assert_eq!(text.lines().next(), Some("IslandRank PopSize"));
    }

    #[test]
    fn test_watch_order_defines_column_order() {
        let stats = collected_stats();
        let mut monitor = FileMonitor::new(Vec::new());
        monitor.watch(StatId(2));
        monitor.watch(StatId(0));

        monitor.record(&stats).unwrap();
        let text = String::from_utf8(monitor.out.clone()).unwrap();
        assert_eq!(text.lines().next(), Some("PopSize\tIslandRank"));
    }

    #[test]
    fn test_min_step_suppresses_rapid_rows() {
        let stats = collected_stats();
        let mut monitor = FileMonitor::new(Vec::new()).min_step(Duration::from_secs(3600));
        monitor.watch(StatId(0));

        monitor.record(&stats).unwrap();
        monitor.record(&stats).unwrap();
        monitor.record(&stats).unwrap();

        let text = String::from_utf8(monitor.out.clone()).unwrap();
        // header plus exactly one value row
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_no_watched_stats_writes_nothing() {
        let stats = collected_stats();
        let mut monitor = FileMonitor::new(Vec::new());
        monitor.record(&stats).unwrap();
        assert!(monitor.out.is_empty());
    }
}
