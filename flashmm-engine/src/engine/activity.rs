use chrono::Local;
use std::collections::VecDeque;

/// Lines kept in the activity log
pub const OPERATOR_LOG_CAPACITY: usize = 80;

/// Operator activity log, newest line first
#[derive(Debug, Clone)]
pub struct OperatorLog {
    lines: VecDeque<String>,
    capacity: usize,
}

impl OperatorLog {
    pub fn new() -> Self {
        Self::with_capacity(OPERATOR_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record `message` stamped with the local wall-clock time
    pub fn record(&mut self, message: &str) {
        let line = format!("{} • {}", Local::now().format("%H:%M:%S"), message);
        tracing::info!("{}", message);
        self.lines.push_front(line);
        self.lines.truncate(self.capacity);
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn latest(&self) -> Option<&str> {
        self.lines.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for OperatorLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first_and_capped() {
        let mut log = OperatorLog::new();
        for i in 0..100 {
            log.record(&format!("event {}", i));
        }

        assert_eq!(log.len(), OPERATOR_LOG_CAPACITY);
        assert!(log.latest().unwrap().ends_with("• event 99"));
        assert!(log.lines().last().unwrap().ends_with("• event 20"));
    }

    #[test]
    fn test_line_has_clock_prefix() {
        let mut log = OperatorLog::new();
        log.record("Engine paused by operator");

        let line = log.latest().unwrap();
        let (clock, rest) = line.split_once(" • ").unwrap();
        assert_eq!(clock.len(), 8);
        assert_eq!(clock.matches(':').count(), 2);
        assert_eq!(rest, "Engine paused by operator");
    }
}
