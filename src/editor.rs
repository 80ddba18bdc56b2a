use std::io::{self, BufRead, Read, Write};

use nix::sys::termios::{self, LocalFlags, SetArg, Termios};

use crate::history::History;

/// Scoped raw-mode acquisition. Drop restores the saved settings on
/// every exit path, including read errors.
struct RawMode {
	saved: Termios,
}

impl RawMode {
	fn enter() -> nix::Result<RawMode> {
		let saved = termios::tcgetattr(io::stdin())?;
		let mut raw = saved.clone();
		// ISIG stays set so Ctrl-C still reaches the foreground job
		raw.local_flags.remove(LocalFlags::ICANON | LocalFlags::ECHO);
		termios::tcsetattr(io::stdin(), SetArg::TCSANOW, &raw)?;
		Ok(RawMode { saved })
	}
}

impl Drop for RawMode {
	fn drop(&mut self) {
		let _ = termios::tcsetattr(io::stdin(), SetArg::TCSANOW, &self.saved);
	}
}

/// History recall cursor; starts one past the newest entry.
struct Recall {
	cursor: usize,
}

impl Recall {
	fn new(history: &History) -> Recall {
		Recall { cursor: history.len() }
	}

	fn older<'a>(&mut self, history: &'a History) -> Option<&'a str> {
		if self.cursor == 0 {
			return None;
		}
		self.cursor -= 1;
		history.entry(self.cursor)
	}

	fn newer<'a>(&mut self, history: &'a History) -> Option<&'a str> {
		if self.cursor >= history.len() {
			return None;
		}
		self.cursor += 1;
		if self.cursor == history.len() {
			// stepped past the newest entry: clear the line
			Some("")
		} else {
			history.entry(self.cursor)
		}
	}
}

fn read_byte<R: Read>(input: &mut R) -> Option<u8> {
	let mut byte = [0u8; 1];
	loop {
		match input.read(&mut byte) {
			Ok(0) => return None,
			Ok(_) => return Some(byte[0]),
			Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
			Err(_) => return None,
		}
	}
}

// erase only the typed bytes, leaving the prompt in place
fn replace_line<W: Write>(out: &mut W, buf: &mut Vec<u8>, text: &str) {
	for _ in 0..buf.len() {
		let _ = out.write_all(b"\x08 \x08");
	}
	buf.clear();
	buf.extend_from_slice(text.as_bytes());
	let _ = out.write_all(buf);
	let _ = out.flush();
}

fn read_fallback() -> Option<String> {
	let mut line = String::new();
	match io::stdin().lock().read_line(&mut line) {
		Ok(0) | Err(_) => None,
		Ok(_) => Some(line),
	}
}

/// Read one line in raw mode, echoing keystrokes, with destructive
/// backspace and arrow-key history recall. None means end of input.
pub fn read_line(history: &History) -> Option<String> {
	let _guard = match RawMode::enter() {
		Ok(guard) => guard,
		Err(e) => {
			eprintln!("tcsetattr: {}", e);
			return read_fallback();
		}
	};
	let stdin = io::stdin();
	let mut input = stdin.lock();
	let stdout = io::stdout();
	let mut out = stdout.lock();
	let mut buf: Vec<u8> = vec![];
	let mut recall = Recall::new(history);
	loop {
		let Some(b) = read_byte(&mut input) else {
			if buf.is_empty() {
				return None;
			}
			let _ = out.write_all(b"\n");
			let _ = out.flush();
			return Some(String::from_utf8_lossy(&buf).into_owned());
		};
		match b {
			b'\r' | b'\n' => {
				let _ = out.write_all(b"\n");
				let _ = out.flush();
				return Some(String::from_utf8_lossy(&buf).into_owned());
			}
			0x7f | 0x08 => {
				if !buf.is_empty() {
					buf.pop();
					let _ = out.write_all(b"\x08 \x08");
					let _ = out.flush();
				}
			}
			// Ctrl-D on an empty line is end of input
			0x04 => {
				if buf.is_empty() {
					return None;
				}
			}
			0x1b => {
				if read_byte(&mut input) == Some(b'[') {
					let replacement = match read_byte(&mut input) {
						Some(b'A') => recall.older(history),
						Some(b'B') => recall.newer(history),
						_ => None,
					};
					if let Some(text) = replacement {
						replace_line(&mut out, &mut buf, text);
					}
				}
			}
			0x20..=0x7e => {
				buf.push(b);
				let _ = out.write_all(&[b]);
				let _ = out.flush();
			}
			_ => {}
		}
	}
}
