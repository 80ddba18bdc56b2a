mod builtin;
mod editor;
mod error;
mod eval;
mod expand;
mod history;
mod lexer;
mod parser;
mod proc;
mod state;
mod types;

use std::io::{self, BufRead, Write};

use nix::sys::signal::{self, SigHandler, Signal};

use proc::Engine;
use state::Session;

fn reap<E: Engine>(engine: &mut E) {
	while let Some((pid, _)) = engine.try_reap() {
		eprintln!("[background done pid {}]", pid);
	}
}

fn run_line<E: Engine>(session: &mut Session, engine: &mut E, line: &str) {
	let trimmed = line.trim_start();
	let effective = if trimmed.starts_with('!') {
		let expr = trimmed.trim_end();
		match session.history.expand(expr) {
			Some(resolved) => {
				// echo the resolved line before running it
				println!("{}", resolved);
				resolved
			}
			None => {
				eprintln!("history: event not found: {}", expr);
				return;
			}
		}
	} else {
		line.to_string()
	};
	session.history.record(&effective);
	let jobs = parser::parse(&lexer::tokenize(&effective));
	for job in &jobs {
		eval::execute(session, engine, job);
	}
}

fn read_buffered() -> Option<String> {
	let mut line = String::new();
	match io::stdin().lock().read_line(&mut line) {
		Ok(0) | Err(_) => None,
		Ok(_) => Some(line),
	}
}

fn main() {
	// the shell survives the terminal's job-control signals; children
	// restore the default dispositions before exec
	for sig in [Signal::SIGINT, Signal::SIGQUIT, Signal::SIGTSTP] {
		let _ = unsafe { signal::signal(sig, SigHandler::SigIgn) };
	}
	let interactive = unsafe { libc::isatty(libc::STDIN_FILENO) } == 1;
	let mut session = Session::new();
	let mut engine = proc::NixEngine;
	loop {
		reap(&mut engine);
		print!("{}", session.prompt);
		let _ = io::stdout().flush();
		let line = if interactive {
			editor::read_line(&session.history)
		} else {
			read_buffered()
		};
		let Some(line) = line else {
			println!();
			break;
		};
		run_line(&mut session, &mut engine, &line);
		reap(&mut engine);
	}
}
