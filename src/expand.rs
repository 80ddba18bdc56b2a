use glob::{glob_with, MatchOptions};

fn has_glob(arg: &str) -> bool {
	arg.contains('*') || arg.contains('?')
}

// libc glob(3) behavior: wildcards never match a leading dot
fn options() -> MatchOptions {
	MatchOptions {
		require_literal_leading_dot: true,
		..MatchOptions::new()
	}
}

fn expand_one(pattern: &str) -> Vec<String> {
	let mut matches: Vec<String> = match glob_with(pattern, options()) {
		Ok(paths) => paths
			.filter_map(|p| p.ok())
			.map(|p| p.to_string_lossy().into_owned())
			.collect(),
		// an unparseable pattern stays literal, like a pattern with no matches
		Err(_) => vec![],
	};
	if matches.is_empty() {
		return vec![pattern.to_string()];
	}
	matches.sort();
	matches
}

/// Replace every glob-pattern argument with its matches, in sorted order.
/// Applies to all positions, including argv[0]. An argument matching
/// nothing keeps its literal text.
pub fn expand_argv(argv: &[String]) -> Vec<String> {
	let mut out = Vec::with_capacity(argv.len());
	for arg in argv {
		if has_glob(arg) {
			out.extend(expand_one(arg));
		} else {
			out.push(arg.clone());
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs::File;

	fn strings(args: &[&str]) -> Vec<String> {
		args.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn plain_arguments_pass_through() {
		let argv = strings(&["echo", "hello"]);
		assert_eq!(expand_argv(&argv), argv);
	}

	#[test]
	fn matches_replace_the_pattern_sorted() {
		let dir = tempfile::tempdir().unwrap();
		for name in ["b.txt", "a.txt", "c.log"] {
			File::create(dir.path().join(name)).unwrap();
		}
		let pattern = format!("{}/*.txt", dir.path().display());
		let argv = strings(&["ls", &pattern]);
		let expanded = expand_argv(&argv);
		assert_eq!(expanded.len(), 3);
		assert_eq!(expanded[0], "ls");
		assert!(expanded[1].ends_with("a.txt"));
		assert!(expanded[2].ends_with("b.txt"));
	}

	#[test]
	fn question_mark_matches_single_characters() {
		let dir = tempfile::tempdir().unwrap();
		for name in ["f1", "f2", "f10"] {
			File::create(dir.path().join(name)).unwrap();
		}
		let pattern = format!("{}/f?", dir.path().display());
		let expanded = expand_argv(&strings(&[&pattern]));
		assert_eq!(expanded.len(), 2);
		assert!(expanded[0].ends_with("f1"));
		assert!(expanded[1].ends_with("f2"));
	}

	#[test]
	fn no_match_keeps_the_literal_pattern() {
		let dir = tempfile::tempdir().unwrap();
		let pattern = format!("{}/*.nonexistent123", dir.path().display());
		let argv = strings(&["ls", &pattern]);
		assert_eq!(expand_argv(&argv), argv);
	}

	#[test]
	fn wildcards_skip_dotfiles() {
		let dir = tempfile::tempdir().unwrap();
		File::create(dir.path().join(".hidden")).unwrap();
		let pattern = format!("{}/*", dir.path().display());
		let argv = strings(&[&pattern]);
		assert_eq!(expand_argv(&argv), argv);
	}

	#[test]
	fn argv_position_zero_is_expanded_too() {
		let dir = tempfile::tempdir().unwrap();
		File::create(dir.path().join("prog")).unwrap();
		let pattern = format!("{}/pro?", dir.path().display());
		let expanded = expand_argv(&strings(&[&pattern, "arg"]));
		assert_eq!(expanded.len(), 2);
		assert!(expanded[0].ends_with("prog"));
		assert_eq!(expanded[1], "arg");
	}
}
