use std::collections::BTreeMap;

/// Session variables, iterated in key order.
#[derive(Debug, Default)]
pub struct VarStore {
	vars: BTreeMap<String, String>,
}

impl VarStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set(&mut self, key: &str, value: &str) {
		self.vars.insert(key.to_string(), value.to_string());
	}

	pub fn get(&self, key: &str) -> Option<&str> {
		self.vars.get(key).map(String::as_str)
	}

	/// Returns `true` if the key existed.
	pub fn unset(&mut self, key: &str) -> bool {
		self.vars.remove(key).is_some()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}
