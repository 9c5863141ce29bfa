// ---------------------------------------------------------------------------
// OperationLog — linear undo/redo history over NodeTree mutations
// ---------------------------------------------------------------------------
//
// Each record owns absolute paths and independent content copies taken when
// the mutation succeeded. Undo and redo go through primitives that ignore
// permission flags, so a later chmod never blocks replaying history.
// ---------------------------------------------------------------------------

use crate::error::VfsError;
use crate::tree::{FileSnapshot, NodeTree};

/// One logged, invertible mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
	CreateFile {
		path: String,
	},
	CreateDir {
		path: String,
	},
	DeleteFile {
		path: String,
		content: Vec<u8>,
		readable: bool,
		writable: bool,
	},
	/// `before` is `None` when the write created the file.
	WriteFile {
		path: String,
		before: Option<Vec<u8>>,
		after: Vec<u8>,
	},
	/// `replaced` holds the file that was overwritten at `to`, if any.
	Move {
		from: String,
		to: String,
		replaced: Option<FileSnapshot>,
	},
	Chmod {
		path: String,
		before: (bool, bool),
		after: (bool, bool),
	},
}

impl Operation {
	pub fn describe(&self) -> String {
		match self {
			Self::CreateFile { path } => format!("touch {}", path),
			Self::CreateDir { path } => format!("mkdir {}", path),
			Self::DeleteFile { path, .. } => format!("rm {}", path),
			Self::WriteFile { path, .. } => format!("write {}", path),
			Self::Move { from, to, .. } => format!("mv {} {}", from, to),
			Self::Chmod { path, after, .. } => {
				format!("chmod {} {} {}", path, after.0 as u8, after.1 as u8)
			}
		}
	}

	/// Put the tree back into the state before this operation.
	fn revert(&self, tree: &mut NodeTree) -> Result<(), VfsError> {
		match self {
			Self::CreateFile { path } => tree.remove_file(path),
			Self::CreateDir { path } => tree.remove_directory(path),
			Self::DeleteFile {
				path,
				content,
				readable,
				writable,
			} => {
				if tree.resolve(path).is_ok() {
					return Err(VfsError::AlreadyExists(path.clone()));
				}
				tree.restore_file(path, content, *readable, *writable)
			}
			Self::WriteFile { path, before, .. } => match before {
				None => tree.remove_file(path),
				Some(content) => restore_content(tree, path, content),
			},
			Self::Move { from, to, replaced } => {
				tree.move_path(to, from)?;
				match replaced {
					Some(snap) => tree.restore_file(to, &snap.content, snap.readable, snap.writable),
					None => Ok(()),
				}
			}
			Self::Chmod { path, before, .. } => tree.chmod(path, before.0, before.1),
		}
	}

	/// Re-apply the forward effect of this operation.
	fn apply(&self, tree: &mut NodeTree) -> Result<(), VfsError> {
		match self {
			Self::CreateFile { path } => tree.create_file(path).map(|_| ()),
			Self::CreateDir { path } => tree.create_directory(path).map(|_| ()),
			Self::DeleteFile { path, .. } => tree.remove_file(path),
			Self::WriteFile { path, after, .. } => restore_content(tree, path, after),
			Self::Move { from, to, .. } => tree.move_path(from, to),
			Self::Chmod { path, after, .. } => tree.chmod(path, after.0, after.1),
		}
	}
}

/// Replace a file's content, keeping its flags, or create it when missing.
fn restore_content(tree: &mut NodeTree, path: &str, content: &[u8]) -> Result<(), VfsError> {
	let (readable, writable) = match tree.file_snapshot(path) {
		Ok(snap) => (snap.readable, snap.writable),
		Err(VfsError::NotFound(_)) => (true, true),
		Err(e) => return Err(e),
	};
	tree.restore_file(path, content, readable, writable)
}

#[derive(Debug, Default)]
pub struct OperationLog {
	undo: Vec<Operation>,
	redo: Vec<Operation>,
}

impl OperationLog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Log a successful mutation. Any pending redo entries are discarded.
	pub fn record(&mut self, op: Operation) {
		tracing::debug!(op = %op.describe(), "recorded");
		self.redo.clear();
		self.undo.push(op);
	}

	/// Invert the most recent operation. Returns its description.
	pub fn undo(&mut self, tree: &mut NodeTree) -> Result<String, VfsError> {
		let op = self.undo.pop().ok_or(VfsError::NothingToUndo)?;
		if let Err(e) = op.revert(tree) {
			tracing::warn!(op = %op.describe(), error = %e, "undo failed");
			self.undo.push(op);
			return Err(e);
		}
		let description = op.describe();
		tracing::debug!(op = %description, "undone");
		self.redo.push(op);
		Ok(description)
	}

	/// Re-apply the most recently undone operation. Returns its description.
	pub fn redo(&mut self, tree: &mut NodeTree) -> Result<String, VfsError> {
		let op = self.redo.pop().ok_or(VfsError::NothingToRedo)?;
		if let Err(e) = op.apply(tree) {
			tracing::warn!(op = %op.describe(), error = %e, "redo failed");
			self.redo.push(op);
			return Err(e);
		}
		let description = op.describe();
		tracing::debug!(op = %description, "redone");
		self.undo.push(op);
		Ok(description)
	}

	pub fn clear(&mut self) {
		self.undo.clear();
		self.redo.clear();
	}

	pub fn undo_len(&self) -> usize {
		self.undo.len()
	}

	pub fn redo_len(&self) -> usize {
		self.redo.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Structure, flags and content of every node, in walk order.
	fn state(tree: &NodeTree) -> Vec<(String, bool, bool, Option<Vec<u8>>)> {
		tree.descendants(tree.root())
			.map(|id| {
				let node = tree.node(id).unwrap();
				(
					tree.path_of(id),
					node.readable(),
					node.writable(),
					node.content().map(|c| c.to_vec()),
				)
			})
			.collect()
	}

	fn logged_write(tree: &mut NodeTree, log: &mut OperationLog, path: &str, data: &[u8]) {
		let before = tree.file_snapshot(path).ok().map(|s| s.content);
		tree.write(path, data, false).unwrap();
		log.record(Operation::WriteFile {
			path: path.to_string(),
			before,
			after: data.to_vec(),
		});
	}

	#[test]
	fn empty_log_reports_nothing() {
		let mut tree = NodeTree::default();
		let mut log = OperationLog::new();
		assert!(matches!(log.undo(&mut tree), Err(VfsError::NothingToUndo)));
		assert!(matches!(log.redo(&mut tree), Err(VfsError::NothingToRedo)));
	}

	#[test]
	fn undo_write_then_create() {
		let mut tree = NodeTree::default();
		let mut log = OperationLog::new();

		tree.create_directory("/a").unwrap();
		log.record(Operation::CreateDir { path: "/a".into() });
		tree.create_file("/a/f").unwrap();
		log.record(Operation::CreateFile { path: "/a/f".into() });
		logged_write(&mut tree, &mut log, "/a/f", b"hello");
		assert_eq!(tree.read("/a/f").unwrap(), b"hello");

		log.undo(&mut tree).unwrap();
		assert_eq!(tree.read("/a/f").unwrap(), b"");
		log.undo(&mut tree).unwrap();
		assert!(tree.resolve("/a/f").is_err());
		assert!(tree.resolve("/a").is_ok());
	}

	#[test]
	fn undo_implicit_create_removes_file() {
		let mut tree = NodeTree::default();
		let mut log = OperationLog::new();
		logged_write(&mut tree, &mut log, "/missing.txt", b"data");
		assert_eq!(log.undo_len(), 1);
		log.undo(&mut tree).unwrap();
		assert!(matches!(tree.resolve("/missing.txt"), Err(VfsError::NotFound(_))));
	}

	#[test]
	fn undo_redo_round_trip() {
		let mut tree = NodeTree::default();
		let mut log = OperationLog::new();
		logged_write(&mut tree, &mut log, "/f", b"v1");
		logged_write(&mut tree, &mut log, "/f", b"v2");
		let after = state(&tree);

		log.undo(&mut tree).unwrap();
		assert_eq!(tree.read("/f").unwrap(), b"v1");
		log.redo(&mut tree).unwrap();
		assert_eq!(state(&tree), after);
	}

	#[test]
	fn new_operation_discards_redo() {
		let mut tree = NodeTree::default();
		let mut log = OperationLog::new();
		logged_write(&mut tree, &mut log, "/f", b"v1");
		log.undo(&mut tree).unwrap();
		assert_eq!(log.redo_len(), 1);

		tree.create_directory("/d").unwrap();
		log.record(Operation::CreateDir { path: "/d".into() });
		assert_eq!(log.redo_len(), 0);
		assert!(matches!(log.redo(&mut tree), Err(VfsError::NothingToRedo)));
	}

	#[test]
	fn full_undo_restores_initial_state() {
		let mut tree = NodeTree::default();
		let mut log = OperationLog::new();
		tree.create_directory("/keep").unwrap();
		tree.write("/keep/old", b"original", false).unwrap();
		let initial = state(&tree);

		tree.create_directory("/a").unwrap();
		log.record(Operation::CreateDir { path: "/a".into() });
		logged_write(&mut tree, &mut log, "/keep/old", b"changed");
		tree.move_path("/keep/old", "/a/moved").unwrap();
		log.record(Operation::Move {
			from: "/keep/old".into(),
			to: "/a/moved".into(),
			replaced: None,
		});
		tree.chmod("/a/moved", false, false).unwrap();
		log.record(Operation::Chmod {
			path: "/a/moved".into(),
			before: (true, true),
			after: (false, false),
		});
		let snap = tree.file_snapshot("/a/moved").unwrap();
		tree.remove_file("/a/moved").unwrap();
		log.record(Operation::DeleteFile {
			path: "/a/moved".into(),
			content: snap.content,
			readable: snap.readable,
			writable: snap.writable,
		});

		for _ in 0..5 {
			log.undo(&mut tree).unwrap();
		}
		assert_eq!(state(&tree), initial);
		assert_eq!(log.redo_len(), 5);
	}

	#[test]
	fn redo_delete_of_unreadable_file() {
		let mut tree = NodeTree::default();
		let mut log = OperationLog::new();
		tree.write("/secret", b"x", false).unwrap();
		tree.chmod("/secret", false, false).unwrap();
		let snap = tree.file_snapshot("/secret").unwrap();
		tree.remove_file("/secret").unwrap();
		log.record(Operation::DeleteFile {
			path: "/secret".into(),
			content: snap.content,
			readable: false,
			writable: false,
		});

		log.undo(&mut tree).unwrap();
		let restored = tree.file_snapshot("/secret").unwrap();
		assert_eq!(restored.content, b"x");
		assert!(!restored.readable);
		log.redo(&mut tree).unwrap();
		assert!(tree.resolve("/secret").is_err());
	}

	#[test]
	fn failed_undo_keeps_record() {
		let mut tree = NodeTree::default();
		let mut log = OperationLog::new();
		tree.create_directory("/d").unwrap();
		log.record(Operation::CreateDir { path: "/d".into() });
		// Unlogged change that blocks the inverse.
		tree.create_file("/d/f").unwrap();

		assert!(matches!(log.undo(&mut tree), Err(VfsError::NotEmpty(_))));
		assert_eq!(log.undo_len(), 1);
		assert_eq!(log.redo_len(), 0);

		tree.remove_file("/d/f").unwrap();
		log.undo(&mut tree).unwrap();
		assert!(tree.resolve("/d").is_err());
	}

	#[test]
	fn undo_write_keeps_flags() {
		let mut tree = NodeTree::default();
		let mut log = OperationLog::new();
		tree.write("/f", b"one", false).unwrap();
		logged_write(&mut tree, &mut log, "/f", b"two");
		tree.chmod("/f", true, false).unwrap();

		log.undo(&mut tree).unwrap();
		let snap = tree.file_snapshot("/f").unwrap();
		assert_eq!(snap.content, b"one");
		assert!(!snap.writable);
	}

	#[test]
	fn clear_empties_both_stacks() {
		let mut tree = NodeTree::default();
		let mut log = OperationLog::new();
		logged_write(&mut tree, &mut log, "/a", b"1");
		logged_write(&mut tree, &mut log, "/b", b"2");
		log.undo(&mut tree).unwrap();
		log.clear();
		assert_eq!(log.undo_len(), 0);
		assert_eq!(log.redo_len(), 0);
	}

	fn logged_move(tree: &mut NodeTree, log: &mut OperationLog, from: &str, to: &str) {
		let replaced = tree.file_snapshot(to).ok();
		tree.move_path(from, to).unwrap();
		log.record(Operation::Move {
			from: from.to_string(),
			to: to.to_string(),
			replaced,
		});
	}

	#[test]
	fn undo_move_over_existing_file_restores_it() {
		let mut tree = NodeTree::default();
		let mut log = OperationLog::new();
		tree.write("/a", b"alpha", false).unwrap();
		tree.write("/b", b"beta", false).unwrap();
		tree.chmod("/b", false, true).unwrap();
		let initial = state(&tree);

		logged_move(&mut tree, &mut log, "/a", "/b");
		assert_eq!(tree.read("/b").unwrap(), b"alpha");
		let moved = state(&tree);

		log.undo(&mut tree).unwrap();
		assert_eq!(state(&tree), initial);
		let restored = tree.file_snapshot("/b").unwrap();
		assert_eq!(restored.content, b"beta");
		assert!(!restored.readable);

		log.redo(&mut tree).unwrap();
		assert_eq!(state(&tree), moved);
	}

	#[test]
	fn undo_move_keeps_source_flags() {
		let mut tree = NodeTree::default();
		let mut log = OperationLog::new();
		tree.create_directory("/d").unwrap();
		tree.chmod("/d", false, false).unwrap();
		tree.write("/a", b"alpha", false).unwrap();
		tree.chmod("/a", true, false).unwrap();
		let initial = state(&tree);

		logged_move(&mut tree, &mut log, "/a", "/b");
		logged_move(&mut tree, &mut log, "/d", "/e");
		assert!(!tree.file_snapshot("/b").unwrap().writable);

		log.undo(&mut tree).unwrap();
		log.undo(&mut tree).unwrap();
		assert_eq!(state(&tree), initial);
		assert!(!tree.file_snapshot("/a").unwrap().writable);
	}

	#[test]
	fn describe_names_the_command() {
		let op = Operation::Chmod {
			path: "/f".into(),
			before: (true, true),
			after: (true, false),
		};
		assert_eq!(op.describe(), "chmod /f 1 0");
	}
}
