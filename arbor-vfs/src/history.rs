use std::collections::VecDeque;

/// Ring of the most recent command lines, oldest first.
#[derive(Debug)]
pub struct CommandHistory {
	entries: VecDeque<String>,
	capacity: usize,
}

impl CommandHistory {
	pub fn new(capacity: usize) -> Self {
		Self {
			entries: VecDeque::with_capacity(capacity.min(1024)),
			capacity,
		}
	}

	/// Remember a line. Empty lines are ignored; the oldest entry is evicted
	/// once the ring is full.
	pub fn add(&mut self, line: &str) {
		if line.is_empty() || self.capacity == 0 {
			return;
		}
		if self.entries.len() == self.capacity {
			self.entries.pop_front();
		}
		self.entries.push_back(line.to_string());
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
