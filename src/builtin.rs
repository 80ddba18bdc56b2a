use std::env;
use std::io;
use std::process;

use crate::state::Session;

pub type Builtin = fn(&mut Session, &[String]) -> bool;

pub fn lookup(name: &str) -> Option<Builtin> {
	match name {
		"cd" => Some(builtin_cd),
		"pwd" => Some(builtin_pwd),
		"prompt" => Some(builtin_prompt),
		"exit" => Some(builtin_exit),
		"history" => Some(builtin_history),
		_ => None,
	}
}

fn builtin_cd(_: &mut Session, args: &[String]) -> bool {
	let target = match args.get(1) {
		Some(dir) => dir.clone(),
		None => match env::var("HOME") {
			Ok(home) => home,
			Err(_) => {
				eprintln!("cd: HOME not set");
				return true;
			}
		},
	};
	if let Err(e) = env::set_current_dir(&target) {
		eprintln!("cd: {}", e);
	}
	true
}

fn builtin_pwd(_: &mut Session, _: &[String]) -> bool {
	match env::current_dir() {
		Ok(dir) => println!("{}", dir.display()),
		Err(e) => eprintln!("pwd: {}", e),
	}
	true
}

fn builtin_prompt(session: &mut Session, args: &[String]) -> bool {
	let Some(text) = args.get(1) else {
		eprintln!("usage: prompt NEWPROMPT");
		return true;
	};
	let mut prompt = text.clone();
	if !prompt.ends_with(' ') {
		prompt.push(' ');
	}
	session.prompt = prompt;
	true
}

fn builtin_exit(_: &mut Session, _: &[String]) -> bool {
	process::exit(0);
}

fn builtin_history(session: &mut Session, _: &[String]) -> bool {
	let stdout = io::stdout();
	let _ = session.history.print(&mut stdout.lock());
	true
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn knows_the_five_builtins() {
		for name in ["cd", "pwd", "prompt", "exit", "history"] {
			assert!(lookup(name).is_some(), "{} missing", name);
		}
		assert!(lookup("ls").is_none());
		assert!(lookup("").is_none());
	}

	#[test]
	fn prompt_gets_exactly_one_trailing_space() {
		let mut session = Session::new();
		let handler = lookup("prompt").unwrap();
		assert!(handler(&mut session, &["prompt".into(), "msh>".into()]));
		assert_eq!(session.prompt, "msh> ");
		assert!(handler(&mut session, &["prompt".into(), "$ ".into()]));
		assert_eq!(session.prompt, "$ ");
	}

	#[test]
	fn prompt_without_argument_keeps_the_old_one() {
		let mut session = Session::new();
		let handler = lookup("prompt").unwrap();
		assert!(handler(&mut session, &["prompt".into()]));
		assert_eq!(session.prompt, "% ");
	}
}
