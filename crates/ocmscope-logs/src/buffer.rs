use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

/// Thread-safe line store for the log currently on screen
///
/// Holds at most `capacity` lines; when a longer log is loaded only its
/// tail is kept. Every load bumps the generation so renderers can tell a
/// fresh log from the one they last laid out.
#[derive(Clone)]
pub struct LogBuffer {
    lines: Arc<RwLock<Vec<String>>>,
    capacity: usize,
    generation: Arc<AtomicU64>,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: Arc::new(RwLock::new(Vec::new())),
            capacity: capacity.max(1),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Replace the contents with the lines of `text`
    pub fn replace(&self, text: &str) {
        let mut all: Vec<String> = text.lines().map(str::to_string).collect();
        if all.len() > self.capacity {
            all.drain(..all.len() - self.capacity);
        }

        *self.lines.write() = all;
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Lines in a range (for virtual scrolling)
    pub fn range(&self, start: usize, count: usize) -> Vec<String> {
        let lines = self.lines.read();
        lines.iter().skip(start).take(count).cloned().collect()
    }

    /// Run `f` over the lines without cloning them
    pub fn with_lines<R>(&self, f: impl FnOnce(&[String]) -> R) -> R {
        f(&self.lines.read())
    }

    pub fn len(&self) -> usize {
        self.lines.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.read().is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Export all lines as raw text
    pub fn export_raw(&self) -> String {
        self.lines.read().join("\n")
    }

    pub fn clear(&self) {
        self.lines.write().clear();
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(100_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_splits_lines() {
        let buffer = LogBuffer::new(100);
        buffer.replace("one\ntwo\r\nthree\n");
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.range(1, 5), vec!["two", "three"]);
    }

    #[test]
    fn test_capacity_keeps_tail() {
        let buffer = LogBuffer::new(2);
        buffer.replace("a\nb\nc");
        assert_eq!(buffer.export_raw(), "b\nc");
    }

    #[test]
    fn test_generation_advances() {
        let buffer = LogBuffer::new(10);
        let start = buffer.generation();
        buffer.replace("x");
        buffer.clear();
        assert_eq!(buffer.generation(), start + 2);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_clones_share_storage() {
        let buffer = LogBuffer::new(10);
        let view = buffer.clone();
        buffer.replace("shared");
        assert_eq!(view.with_lines(|l| l.len()), 1);
    }
}
