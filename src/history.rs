//! Rolling history of timestamped samples.

use std::{
    collections::VecDeque,
    sync::{Arc, RwLock},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use thiserror::Error;

use crate::constants::DEFAULT_HISTORY_SECONDS;

/// A history buffer shared between the sensor that fills it and the views that read it.
pub type SharedHistory = Arc<RwLock<HistoryBuffer>>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    /// A pushed row did not have as many values as the buffer has data columns.
    #[error("expected {expected} values per sample, got {actual}")]
    Arity { expected: usize, actual: usize },
}

/// One row of history.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    pub values: Vec<f64>,
}

/// Returns the current wall-clock time in seconds since the Unix epoch.
pub fn timestamp_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

/// A fixed-duration rolling buffer of samples with a fixed number of data columns.
///
/// Viewed as a table, column 0 is the timestamp and columns `1..=data_columns` are
/// the values. After every push, rows older than `duration` relative to the newest
/// row are dropped from the front.
#[derive(Clone, Debug)]
pub struct HistoryBuffer {
    rows: VecDeque<Sample>,
    duration: Duration,
    data_columns: usize,
}

impl HistoryBuffer {
    /// Creates a buffer with `data_columns` value columns.
    ///
    /// # Panics
    ///
    /// Panics if `data_columns` is zero.
    pub fn new(duration: Duration, data_columns: usize) -> Self {
        assert!(data_columns > 0, "a history buffer needs at least one column");

        Self {
            rows: VecDeque::new(),
            duration,
            data_columns,
        }
    }

    /// Creates a buffer that keeps the default 60 seconds.
    pub fn with_columns(data_columns: usize) -> Self {
        Self::new(Duration::from_secs(DEFAULT_HISTORY_SECONDS), data_columns)
    }

    /// Wraps this buffer for sharing across threads.
    pub fn shared(self) -> SharedHistory {
        Arc::new(RwLock::new(self))
    }

    /// Pushes a row stamped with the current time.
    pub fn push(&mut self, values: &[f64]) -> Result<(), HistoryError> {
        self.push_at(timestamp_now(), values)
    }

    /// Pushes a row with an explicit timestamp, then evicts rows that fell out of
    /// the window. On an arity mismatch nothing is changed.
    pub fn push_at(&mut self, timestamp: f64, values: &[f64]) -> Result<(), HistoryError> {
        if values.len() != self.data_columns {
            return Err(HistoryError::Arity {
                expected: self.data_columns,
                actual: values.len(),
            });
        }

        self.rows.push_back(Sample {
            timestamp,
            values: values.to_vec(),
        });
        self.evict();

        Ok(())
    }

    fn evict(&mut self) {
        let window = self.duration.as_secs_f64();
        let Some(newest) = self.rows.back().map(|row| row.timestamp) else {
            return;
        };

        while let Some(oldest) = self.rows.front() {
            if oldest.timestamp + window < newest {
                self.rows.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The number of table columns, including the timestamp column.
    pub fn column_count(&self) -> usize {
        self.data_columns + 1
    }

    /// The number of value columns, excluding the timestamp column.
    pub fn data_columns(&self) -> usize {
        self.data_columns
    }

    /// Returns the cell at `row`, `col`, where column 0 is the timestamp.
    pub fn value_at(&self, row: usize, col: usize) -> Option<f64> {
        let sample = self.rows.get(row)?;

        match col {
            0 => Some(sample.timestamp),
            col => sample.values.get(col - 1).copied(),
        }
    }

    /// Iterates over one table column, oldest first.
    pub fn column(&self, col: usize) -> impl Iterator<Item = f64> + '_ {
        (0..self.rows.len()).filter_map(move |row| self.value_at(row, col))
    }

    pub fn rows(&self) -> impl Iterator<Item = &Sample> {
        self.rows.iter()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.rows.back()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Changes the window. Existing rows are only trimmed on the next push.
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn push_and_read_back() {
        let mut history = HistoryBuffer::with_columns(2);
        history.push_at(10.0, &[1.0, 2.0]).unwrap();

        assert_eq!(history.row_count(), 1);
        assert_eq!(history.column_count(), 3);
        assert_eq!(history.value_at(0, 0), Some(10.0));
        assert_eq!(history.value_at(0, 1), Some(1.0));
        assert_eq!(history.value_at(0, 2), Some(2.0));
    }

    #[test]
    fn out_of_range_reads() {
        let mut history = HistoryBuffer::with_columns(1);
        assert_eq!(history.value_at(0, 0), None);

        history.push_at(1.0, &[5.0]).unwrap();
        assert_eq!(history.value_at(1, 0), None);
        assert_eq!(history.value_at(0, 2), None);
    }

    #[test]
    fn arity_mismatch_leaves_buffer_untouched() {
        let mut history = HistoryBuffer::with_columns(2);
        history.push_at(1.0, &[1.0, 1.0]).unwrap();

        assert_eq!(
            history.push_at(2.0, &[1.0]),
            Err(HistoryError::Arity {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            history.push_at(2.0, &[1.0, 2.0, 3.0]),
            Err(HistoryError::Arity {
                expected: 2,
                actual: 3
            })
        );
        assert_eq!(history.row_count(), 1);
        assert_eq!(history.value_at(0, 0), Some(1.0));
    }

    #[test]
    fn evicts_rows_outside_the_window() {
        let mut history = HistoryBuffer::new(Duration::from_secs(10), 1);

        for i in 0..100 {
            history.push_at(i as f64, &[i as f64]).unwrap();
        }

        // 89..=99 are within 10 seconds of 99.
        assert_eq!(history.row_count(), 11);
        let newest = history.last().unwrap().timestamp;
        assert!(history.rows().all(|row| row.timestamp + 10.0 >= newest));
        assert_eq!(history.value_at(0, 1), Some(89.0));
    }

    #[test]
    fn stays_bounded_with_fractional_spacing() {
        let mut history = HistoryBuffer::new(Duration::from_secs(60), 2);

        for i in 0..1000 {
            let t = i as f64 * 1.6;
            history.push_at(t, &[1.0, 2.0]).unwrap();
            assert!(history.row_count() <= 39);
        }

        let newest = history.last().unwrap().timestamp;
        assert!(history.rows().all(|row| row.timestamp + 60.0 >= newest));
    }

    #[test]
    fn shrinking_duration_trims_on_next_push() {
        let mut history = HistoryBuffer::new(Duration::from_secs(60), 1);
        for i in 0..10 {
            history.push_at(i as f64, &[0.0]).unwrap();
        }

        history.set_duration(Duration::from_secs(2));
        assert_eq!(history.row_count(), 10);

        history.push_at(10.0, &[0.0]).unwrap();
        assert_eq!(history.column(0).collect::<Vec<_>>(), vec![8.0, 9.0, 10.0]);
    }

    #[test]
    fn column_iterates_oldest_first() {
        let mut history = HistoryBuffer::with_columns(2);
        history.push_at(1.0, &[1.0, 10.0]).unwrap();
        history.push_at(2.0, &[2.0, 20.0]).unwrap();

        assert_eq!(history.column(2).collect::<Vec<_>>(), vec![10.0, 20.0]);
    }

    #[test]
    #[should_panic]
    fn zero_columns_is_rejected() {
        let _ = HistoryBuffer::with_columns(0);
    }
}
