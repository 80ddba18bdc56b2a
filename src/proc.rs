use std::ffi::CString;
use std::fs;
use std::io;
use std::io::Write;
use std::os::unix::io::{IntoRawFd, RawFd};

use nix::errno::Errno;
use nix::sys::signal::{self, SigHandler, Signal};
use nix::sys::wait::{self, WaitPidFlag, WaitStatus};
use nix::unistd::{self, ForkResult, Pid};

use crate::error::ExecError;

/// One pipeline stage, fully wired: the expanded argument vector, the
/// command's redirection targets, and the pipe ends this stage installs.
/// `scratch` lists every pipe fd of the job; the child closes them all
/// after its dup2 installs so downstream readers can see end-of-stream.
#[derive(Debug, Clone)]
pub struct Stage {
	pub argv: Vec<String>,
	pub input: Option<String>,
	pub output: Option<String>,
	pub error: Option<String>,
	pub stdin: Option<RawFd>,
	pub stdout: Option<RawFd>,
	pub scratch: Vec<RawFd>,
}

/// The orchestrator's view of process management. The real engine forks;
/// tests substitute a recording fake.
pub trait Engine {
	fn spawn(&mut self, stage: &Stage) -> Result<Pid, ExecError>;
	fn wait(&mut self, pid: Pid) -> Result<WaitStatus, ExecError>;
	fn try_reap(&mut self) -> Option<(Pid, WaitStatus)>;
}

pub struct NixEngine;

impl Engine for NixEngine {
	fn spawn(&mut self, stage: &Stage) -> Result<Pid, ExecError> {
		let argv: Vec<CString> = stage.argv.iter()
			.map(|a| CString::new(a.as_bytes()))
			.collect::<Result<_, _>>()?;
		match unsafe { unistd::fork() }.map_err(|e| ExecError::Sys("fork", e))? {
			ForkResult::Parent { child } => Ok(child),
			ForkResult::Child => {
				let err = child_exec(stage, &argv);
				let _ = writeln!(io::stderr(), "{}", err);
				let code = match err {
					ExecError::Sys("exec", _) => 127,
					_ => 126,
				};
				unsafe { libc::_exit(code) }
			}
		}
	}

	fn wait(&mut self, pid: Pid) -> Result<WaitStatus, ExecError> {
		loop {
			match wait::waitpid(pid, None) {
				Ok(status) => return Ok(status),
				Err(Errno::EINTR) => continue,
				Err(e) => return Err(ExecError::Sys("waitpid", e)),
			}
		}
	}

	fn try_reap(&mut self) -> Option<(Pid, WaitStatus)> {
		loop {
			match wait::waitpid(None::<Pid>, Some(WaitPidFlag::WNOHANG)) {
				Ok(WaitStatus::StillAlive) => return None,
				Ok(status) => match status.pid() {
					Some(pid) => return Some((pid, status)),
					None => return None,
				},
				Err(Errno::EINTR) => continue,
				// ECHILD: no children left to reap
				Err(_) => return None,
			}
		}
	}
}

// Runs in the forked child; only returns on failure.
fn child_exec(stage: &Stage, argv: &[CString]) -> ExecError {
	for sig in [Signal::SIGINT, Signal::SIGQUIT, Signal::SIGTSTP] {
		let _ = unsafe { signal::signal(sig, SigHandler::SigDfl) };
	}
	if let Some(fd) = stage.stdin {
		if let Err(e) = unistd::dup2(fd, libc::STDIN_FILENO) {
			return ExecError::Sys("dup2", e);
		}
	}
	if let Some(fd) = stage.stdout {
		if let Err(e) = unistd::dup2(fd, libc::STDOUT_FILENO) {
			return ExecError::Sys("dup2", e);
		}
	}
	for &fd in &stage.scratch {
		let _ = unistd::close(fd);
	}
	// explicit redirections land after the pipe installs, overriding them
	if let Some(path) = &stage.input {
		if let Err(e) = install(fs::OpenOptions::new().read(true), path, libc::STDIN_FILENO) {
			return e;
		}
	}
	if let Some(path) = &stage.output {
		let mut opts = fs::OpenOptions::new();
		opts.write(true).create(true).truncate(true);
		if let Err(e) = install(&mut opts, path, libc::STDOUT_FILENO) {
			return e;
		}
	}
	if let Some(path) = &stage.error {
		let mut opts = fs::OpenOptions::new();
		opts.write(true).create(true).truncate(true);
		if let Err(e) = install(&mut opts, path, libc::STDERR_FILENO) {
			return e;
		}
	}
	match unistd::execvp(&argv[0], argv) {
		Err(e) => ExecError::Sys("exec", e),
		Ok(infallible) => match infallible {},
	}
}

fn install(opts: &mut fs::OpenOptions, path: &str, target: RawFd) -> Result<(), ExecError> {
	let file = opts.open(path).map_err(|e| ExecError::Io("open", e))?;
	let fd = file.into_raw_fd();
	unistd::dup2(fd, target).map_err(|e| ExecError::Sys("dup2", e))?;
	let _ = unistd::close(fd);
	Ok(())
}

#[cfg(test)]
pub struct FakeEngine {
	pub spawned: Vec<Stage>,
	pub waited: Vec<Pid>,
	next: i32,
}

#[cfg(test)]
impl FakeEngine {
	pub fn new() -> FakeEngine {
		FakeEngine { spawned: vec![], waited: vec![], next: 1000 }
	}
}

#[cfg(test)]
impl Engine for FakeEngine {
	fn spawn(&mut self, stage: &Stage) -> Result<Pid, ExecError> {
		self.spawned.push(stage.clone());
		self.next += 1;
		Ok(Pid::from_raw(self.next))
	}

	fn wait(&mut self, pid: Pid) -> Result<WaitStatus, ExecError> {
		self.waited.push(pid);
		Ok(WaitStatus::Exited(pid, 0))
	}

	fn try_reap(&mut self) -> Option<(Pid, WaitStatus)> {
		None
	}
}
