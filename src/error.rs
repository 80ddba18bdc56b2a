use std::ffi;
use std::io;

use thiserror::Error;

/// Failures while executing a job. Diagnostics render as
/// `<operation>: <reason>` on the error stream; none of them
/// terminate the shell.
#[derive(Debug, Error)]
pub enum ExecError {
	#[error("{0}: {1}")]
	Sys(&'static str, nix::errno::Errno),
	#[error("{0}: {1}")]
	Io(&'static str, io::Error),
	#[error("bad argument: {0}")]
	Nul(#[from] ffi::NulError),
}
