use std::collections::VecDeque;

use chrono::{DateTime, SecondsFormat, Utc};

#[derive(Debug, Clone)]
pub struct JournalEntry {
	pub seq: u64,
	pub timestamp: DateTime<Utc>,
	pub message: String,
}

impl JournalEntry {
	/// `<seq> <rfc3339 timestamp> <message>`
	pub fn render(&self) -> String {
		format!(
			"{} {} {}",
			self.seq,
			self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
			self.message
		)
	}
}

/// Rolling diagnostic log of command outcomes. Sequence numbers keep
/// counting after old entries are evicted.
#[derive(Debug)]
pub struct Journal {
	entries: VecDeque<JournalEntry>,
	capacity: usize,
	next_seq: u64,
}

impl Journal {
	pub fn new(capacity: usize) -> Self {
		Self {
			entries: VecDeque::with_capacity(capacity.min(1024)),
			capacity,
			next_seq: 0,
		}
	}

	pub fn record(&mut self, message: impl Into<String>) {
		let entry = JournalEntry {
			seq: self.next_seq,
			timestamp: Utc::now(),
			message: message.into(),
		};
		self.next_seq += 1;
		if self.capacity == 0 {
			return;
		}
		if self.entries.len() == self.capacity {
			self.entries.pop_front();
		}
		self.entries.push_back(entry);
	}

	pub fn entries(&self) -> impl Iterator<Item = &JournalEntry> {
		self.entries.iter()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sequence_survives_eviction() {
		let mut j = Journal::new(2);
		j.record("a");
		j.record("b");
		j.record("c");
		let seqs: Vec<u64> = j.entries().map(|e| e.seq).collect();
		assert_eq!(seqs, vec![1, 2]);
		assert_eq!(j.entries().last().unwrap().message, "c");
	}

	#[test]
	fn render_has_three_fields() {
		let mut j = Journal::new(4);
		j.record("ok: mkdir /a");
		let line = j.entries().next().unwrap().render();
		let mut parts = line.splitn(3, ' ');
		assert_eq!(parts.next(), Some("0"));
		let ts = parts.next().unwrap();
		assert!(DateTime::parse_from_rfc3339(ts).is_ok());
		assert_eq!(parts.next(), Some("ok: mkdir /a"));
	}

	#[test]
	fn zero_capacity_keeps_nothing() {
		let mut j = Journal::new(0);
		j.record("x");
		assert!(j.is_empty());
	}
}
