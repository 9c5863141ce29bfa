/// Split a command line into tokens.
///
/// Spaces and tabs separate tokens outside quotes. `"` toggles quoting and is
/// not kept. `\` makes the next character literal, including quotes, spaces
/// and another backslash. Empty tokens (such as `""`) are dropped.
pub fn tokenize(line: &str) -> Vec<String> {
	let mut tokens = Vec::new();
	let mut current = String::new();
	let mut in_quotes = false;
	let mut escaped = false;

	for c in line.chars() {
		if escaped {
			current.push(c);
			escaped = false;
		} else if c == '\\' {
			escaped = true;
		} else if c == '"' {
			in_quotes = !in_quotes;
		} else if !in_quotes && (c == ' ' || c == '\t') {
			if !current.is_empty() {
				tokens.push(std::mem::take(&mut current));
			}
		} else {
			current.push(c);
		}
	}
	if !current.is_empty() {
		tokens.push(current);
	}
	tokens
}
