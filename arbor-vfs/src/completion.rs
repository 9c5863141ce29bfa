use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct TrieNode {
	terminal: bool,
	children: BTreeMap<u8, TrieNode>,
}

/// Byte-keyed prefix trie for completing words.
#[derive(Debug, Default)]
pub struct Completer {
	root: TrieNode,
}

impl Completer {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_words<'a>(words: impl IntoIterator<Item = &'a str>) -> Self {
		let mut completer = Self::new();
		for word in words {
			completer.insert(word);
		}
		completer
	}

	pub fn insert(&mut self, word: &str) {
		let mut node = &mut self.root;
		for b in word.bytes() {
			node = node.children.entry(b).or_default();
		}
		node.terminal = true;
	}

	/// Every inserted word starting with `prefix`, in byte order. The prefix
	/// itself is included when it is a word.
	pub fn complete(&self, prefix: &str) -> Vec<String> {
		let mut node = &self.root;
		for b in prefix.bytes() {
			match node.children.get(&b) {
				Some(child) => node = child,
				None => return Vec::new(),
			}
		}

		let mut words = Vec::new();
		let mut stack: Vec<(&TrieNode, Vec<u8>)> = vec![(node, prefix.as_bytes().to_vec())];
		while let Some((node, word)) = stack.pop() {
			if node.terminal {
				words.push(String::from_utf8_lossy(&word).into_owned());
			}
			for (b, child) in node.children.iter().rev() {
				let mut next = word.clone();
				next.push(*b);
				stack.push((child, next));
			}
		}
		words
	}
}
