use std::os::unix::io::{AsRawFd, OwnedFd, RawFd};

use nix::sys::wait::WaitStatus;
use nix::unistd::{self, Pid};

use crate::builtin;
use crate::expand;
use crate::proc::{Engine, Stage};
use crate::state::Session;
use crate::types::Job;

/// Execute one job and report its status. Foreground jobs block until
/// every stage exits; background jobs report the last pid and return.
pub fn execute<E: Engine>(session: &mut Session, engine: &mut E, job: &Job) -> i32 {
	let commands = &job.commands;
	if commands.len() == 1 {
		if let Some(handler) = builtin::lookup(&commands[0].argv[0]) {
			handler(session, &commands[0].argv);
			return 0;
		}
	}

	let n = commands.len();
	let mut reads: Vec<Option<OwnedFd>> = Vec::with_capacity(n - 1);
	let mut writes: Vec<Option<OwnedFd>> = Vec::with_capacity(n - 1);
	for _ in 1..n {
		match unistd::pipe() {
			Ok((r, w)) => {
				reads.push(Some(r));
				writes.push(Some(w));
			}
			Err(e) => {
				eprintln!("pipe: {}", e);
				return 126;
			}
		}
	}
	let mut scratch: Vec<RawFd> = Vec::with_capacity(2 * (n - 1));
	for fd in reads.iter().flatten() {
		scratch.push(fd.as_raw_fd());
	}
	for fd in writes.iter().flatten() {
		scratch.push(fd.as_raw_fd());
	}

	let mut pids: Vec<Pid> = Vec::with_capacity(n);
	for (i, command) in commands.iter().enumerate() {
		let stage = Stage {
			argv: expand::expand_argv(&command.argv),
			input: command.input.clone(),
			output: command.output.clone(),
			error: command.error.clone(),
			stdin: if i > 0 { reads[i - 1].as_ref().map(|fd| fd.as_raw_fd()) } else { None },
			stdout: if i + 1 < n { writes[i].as_ref().map(|fd| fd.as_raw_fd()) } else { None },
			scratch: scratch.clone(),
		};
		match engine.spawn(&stage) {
			Ok(pid) => pids.push(pid),
			Err(e) => {
				eprintln!("{}", e);
				// abort the remaining stages
				break;
			}
		}
		// drop the ends no later stage needs
		if i > 0 {
			reads[i - 1] = None;
		}
		if i + 1 < n {
			writes[i] = None;
		}
	}
	// every pipe end must close before waiting, or downstream stages
	// never see end-of-stream
	drop(reads);
	drop(writes);

	if pids.is_empty() {
		return 126;
	}
	if job.background {
		println!("[background pid {}]", pids[pids.len() - 1]);
		return 0;
	}

	let last = pids.len() - 1;
	let mut status = 0;
	for (i, &pid) in pids.iter().enumerate() {
		match engine.wait(pid) {
			Ok(ws) => {
				if let WaitStatus::Signaled(..) = ws {
					// a killed child leaves the cursor mid-line
					println!();
				}
				if i == last {
					status = match ws {
						WaitStatus::Exited(_, code) => code,
						WaitStatus::Signaled(_, sig, _) => 128 + sig as i32,
						_ => 0,
					};
				}
			}
			Err(e) => {
				eprintln!("{}", e);
				if i == last {
					status = 126;
				}
			}
		}
	}
	status
}
