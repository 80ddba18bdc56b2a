use std::io;
use std::io::Write;

/// Ring buffer of past command lines, numbered like bash history.
/// Event numbers visible at any moment form the contiguous range
/// [base, base + count - 1]; inserting into a full buffer evicts the
/// oldest entry and advances base.
pub struct History {
	slots: Vec<Option<String>>,
	head: usize,
	count: usize,
	base: usize,
}

impl History {
	pub fn new(capacity: usize) -> History {
		assert!(capacity > 0);
		History {
			slots: vec![None; capacity],
			head: 0,
			count: 0,
			base: 1,
		}
	}

	pub fn len(&self) -> usize {
		self.count
	}

	pub fn base(&self) -> usize {
		self.base
	}

	/// Record a line. Blank and whitespace-only lines are never stored;
	/// trailing newline bytes are stripped.
	pub fn record(&mut self, line: &str) {
		let line = line.trim_end_matches(['\n', '\r']);
		if line.trim().is_empty() {
			return;
		}
		let capacity = self.slots.len();
		self.slots[self.head] = Some(line.to_string());
		self.head = (self.head + 1) % capacity;
		if self.count < capacity {
			self.count += 1;
		} else {
			self.base += 1;
		}
	}

	/// Entry by position, 0 = oldest retained.
	pub fn entry(&self, i: usize) -> Option<&str> {
		if i >= self.count {
			return None;
		}
		let capacity = self.slots.len();
		let idx = (self.head + capacity - self.count + i) % capacity;
		self.slots[idx].as_deref()
	}

	/// Entry by its 1-based event number.
	pub fn lookup(&self, event: usize) -> Option<&str> {
		if event < self.base || event >= self.base + self.count {
			return None;
		}
		self.entry(event - self.base)
	}

	fn last(&self) -> Option<&str> {
		if self.count == 0 { None } else { self.entry(self.count - 1) }
	}

	fn search_prefix(&self, prefix: &str) -> Option<&str> {
		for i in (0..self.count).rev() {
			if let Some(line) = self.entry(i) {
				if line.starts_with(prefix) {
					return Some(line);
				}
			}
		}
		None
	}

	/// Resolve a bang expression: `!!`, `!N`, or `!prefix`.
	/// Never mutates the buffer; None means event not found.
	pub fn expand(&self, input: &str) -> Option<String> {
		let rest = input.strip_prefix('!')?;
		if rest.is_empty() {
			return None;
		}
		if rest == "!" {
			return self.last().map(str::to_string);
		}
		if rest.chars().next().is_some_and(|c| c.is_ascii_digit()) {
			// the whole suffix must be a positive integer
			let event: usize = rest.parse().ok().filter(|&n| n > 0)?;
			return self.lookup(event).map(str::to_string);
		}
		self.search_prefix(rest).map(str::to_string)
	}

	/// Print every retained entry, oldest first, with its event number.
	pub fn print<W: Write>(&self, out: &mut W) -> io::Result<()> {
		for i in 0..self.count {
			if let Some(line) = self.entry(i) {
				writeln!(out, "{:5}  {}", self.base + i, line)?;
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn filled(capacity: usize, lines: &[&str]) -> History {
		let mut h = History::new(capacity);
		for line in lines {
			h.record(line);
		}
		h
	}

	#[test]
	fn fills_up_then_evicts_oldest() {
		let h = filled(3, &["one", "two", "three", "four", "five"]);
		assert_eq!(h.len(), 3);
		assert_eq!(h.base(), 3);
		assert_eq!(h.entry(0), Some("three"));
		assert_eq!(h.entry(1), Some("four"));
		assert_eq!(h.entry(2), Some("five"));
	}

	#[test]
	fn lookup_tracks_event_numbers_after_wrap() {
		let h = filled(3, &["one", "two", "three", "four", "five"]);
		assert_eq!(h.lookup(2), None);
		assert_eq!(h.lookup(3), Some("three"));
		assert_eq!(h.lookup(5), Some("five"));
		assert_eq!(h.lookup(6), None);
	}

	#[test]
	fn blank_lines_are_never_recorded() {
		let h = filled(4, &["ls", "", "   ", "\t\n"]);
		assert_eq!(h.len(), 1);
		assert_eq!(h.entry(0), Some("ls"));
	}

	#[test]
	fn trailing_newline_is_stripped() {
		let h = filled(4, &["ls -l\n"]);
		assert_eq!(h.entry(0), Some("ls -l"));
	}

	#[test]
	fn bang_bang_is_the_most_recent() {
		let h = filled(4, &["ls", "pwd"]);
		assert_eq!(h.expand("!!"), Some("pwd".to_string()));
	}

	#[test]
	fn bang_number_hits_exact_event() {
		let h = filled(4, &["ls", "pwd", "du"]);
		assert_eq!(h.expand("!2"), Some("pwd".to_string()));
		assert_eq!(h.expand("!99"), None);
	}

	#[test]
	fn bang_number_must_be_all_digits() {
		let h = filled(4, &["ls", "pwd"]);
		assert_eq!(h.expand("!1x"), None);
	}

	#[test]
	fn bang_prefix_finds_newest_match() {
		let h = filled(4, &["pwd", "ls -l", "ls -a", "du"]);
		assert_eq!(h.expand("!ls"), Some("ls -a".to_string()));
		assert_eq!(h.expand("!p"), Some("pwd".to_string()));
		assert_eq!(h.expand("!zz"), None);
	}

	#[test]
	fn bare_bang_fails() {
		let h = filled(4, &["ls"]);
		assert_eq!(h.expand("!"), None);
	}

	#[test]
	fn empty_history_never_expands() {
		let h = History::new(4);
		assert_eq!(h.expand("!!"), None);
		assert_eq!(h.expand("!1"), None);
		assert_eq!(h.expand("!x"), None);
	}

	#[test]
	fn print_labels_oldest_first() {
		let h = filled(2, &["one", "two", "three"]);
		let mut out = Vec::new();
		h.print(&mut out).unwrap();
		assert_eq!(String::from_utf8(out).unwrap(), "    2  two\n    3  three\n");
	}
}
