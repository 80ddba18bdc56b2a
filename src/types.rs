#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Command {
	pub argv: Vec<String>,
	pub input: Option<String>,
	pub output: Option<String>,
	pub error: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Job {
	pub commands: Vec<Command>,
	pub background: bool,
	pub sequential: bool,
}

pub type JobList = Vec<Job>;
