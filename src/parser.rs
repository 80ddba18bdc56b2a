use crate::lexer::{Op, Token};
use crate::types::{Command, Job, JobList};

struct Builder {
	jobs: JobList,
	commands: Vec<Command>,
	args: Vec<String>,
	input: Option<String>,
	output: Option<String>,
	error: Option<String>,
}

impl Builder {
	fn new() -> Builder {
		Builder {
			jobs: vec![],
			commands: vec![],
			args: vec![],
			input: None,
			output: None,
			error: None,
		}
	}

	// a command with no arguments is never constructed; its pending
	// redirections are discarded with it
	fn flush_command(&mut self) {
		if self.args.is_empty() {
			self.input = None;
			self.output = None;
			self.error = None;
			return;
		}
		self.commands.push(Command {
			argv: std::mem::take(&mut self.args),
			input: self.input.take(),
			output: self.output.take(),
			error: self.error.take(),
		});
	}

	fn flush_job(&mut self, background: bool, sequential: bool) {
		self.flush_command();
		if self.commands.is_empty() {
			return;
		}
		self.jobs.push(Job {
			commands: std::mem::take(&mut self.commands),
			background,
			sequential,
		});
	}
}

fn token_text(token: &Token) -> String {
	match token {
		Token::Word(w) => w.clone(),
		Token::Op(op) => op.text().to_string(),
	}
}

pub fn parse(tokens: &[Token]) -> JobList {
	let mut b = Builder::new();
	let mut i = 0;
	while i < tokens.len() {
		match &tokens[i] {
			Token::Word(w) => {
				b.args.push(w.clone());
				i += 1;
			}
			Token::Op(Op::Pipe) => {
				b.flush_command();
				i += 1;
			}
			Token::Op(Op::Seq) => {
				b.flush_job(false, true);
				i += 1;
			}
			Token::Op(Op::Amp) => {
				b.flush_job(true, false);
				i += 1;
			}
			Token::Op(op @ (Op::In | Op::Out | Op::Err)) => {
				// one token of lookahead, consumed unconditionally;
				// a dangling operator is silently dropped
				match tokens.get(i + 1) {
					Some(next) => {
						let target = token_text(next);
						match op {
							Op::In => b.input = Some(target),
							Op::Out => b.output = Some(target),
							Op::Err => b.error = Some(target),
							_ => unreachable!(),
						}
						i += 2;
					}
					None => { i += 1; }
				}
			}
		}
	}
	b.flush_job(false, false);
	b.jobs
}
