use indextree::NodeId;

use crate::tree::NodeTree;

/// A single search hit within a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
	/// Absolute path of the file.
	pub path: String,
	/// 1-indexed line number.
	pub line: usize,
	/// The whole line, without its newline.
	pub text: Vec<u8>,
}

/// Search one file's content line by line. Reports each matching line once.
///
/// - Lines are split at `\n`; the end of the content closes the last line,
///   so `"a\n"` has a second, empty line.
/// - Matching is an exact, case-sensitive byte substring test.
/// - An empty keyword matches nothing.
///
/// Returns the number of lines reported.
pub fn search_content<F>(path: &str, content: &[u8], keyword: &[u8], sink: &mut F) -> usize
where
	F: FnMut(&str, usize, &[u8]),
{
	if keyword.is_empty() {
		return 0;
	}

	let mut count = 0;
	for (idx, line) in content.split(|b| *b == b'\n').enumerate() {
		if contains(line, keyword) {
			sink(path, idx + 1, line);
			count += 1;
		}
	}
	count
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
	needle.len() <= haystack.len() && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Search every file under `start` (root when `None`, empty or unresolvable).
///
/// A file start is scanned on its own. Directories are walked depth-first,
/// children in insertion order, with an explicit work list. File content is
/// scanned regardless of the readable flag.
///
/// Returns the total number of matches reported to `sink`.
pub fn search<F>(tree: &NodeTree, start: Option<&str>, keyword: &[u8], mut sink: F) -> usize
where
	F: FnMut(&str, usize, &[u8]),
{
	if keyword.is_empty() {
		return 0;
	}

	let start_id = start
		.filter(|p| !p.is_empty())
		.and_then(|p| tree.resolve(p).ok())
		.unwrap_or_else(|| tree.root());

	let mut count = 0;
	let mut stack: Vec<NodeId> = vec![start_id];
	while let Some(id) = stack.pop() {
		let Some(node) = tree.node(id) else {
			continue;
		};
		match node.content() {
			Some(content) => {
				count += search_content(&tree.path_of(id), content, keyword, &mut sink);
			}
			None => {
				let children: Vec<NodeId> = tree.children(id).collect();
				stack.extend(children.into_iter().rev());
			}
		}
	}

	tracing::debug!(count, "search finished");
	count
}

/// Collect matches into a vector.
pub fn search_all(tree: &NodeTree, start: Option<&str>, keyword: &[u8]) -> Vec<SearchMatch> {
	let mut results = Vec::new();
	search(tree, start, keyword, |path, line, text| {
		results.push(SearchMatch {
			path: path.to_string(),
			line,
			text: text.to_vec(),
		});
	});
	results
}
