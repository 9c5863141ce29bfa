// ---------------------------------------------------------------------------
// NodeTree — arena-backed directory tree with path resolution
// ---------------------------------------------------------------------------
//
// Every node lives in an `indextree::Arena`. A directory's children are kept
// in insertion order by the arena's sibling links; the parent handle is a
// plain `NodeId` and never keeps a node alive. Removing a node removes its
// whole subtree from the arena.
// ---------------------------------------------------------------------------

use indextree::{Arena, NodeId};

use crate::error::VfsError;
use crate::path::{components, is_absolute, split_last, validate_name, TreeLimits, ROOT};

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
	Directory,
	File(Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct Node {
	name: String,
	readable: bool,
	writable: bool,
	kind: NodeKind,
}

impl Node {
	fn directory(name: &str) -> Self {
		Self {
			name: name.to_string(),
			readable: true,
			writable: true,
			kind: NodeKind::Directory,
		}
	}

	fn file(name: &str) -> Self {
		Self {
			name: name.to_string(),
			readable: true,
			writable: true,
			kind: NodeKind::File(Vec::new()),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn readable(&self) -> bool {
		self.readable
	}

	pub fn writable(&self) -> bool {
		self.writable
	}

	pub fn is_dir(&self) -> bool {
		self.kind == NodeKind::Directory
	}

	pub fn is_file(&self) -> bool {
		!self.is_dir()
	}

	/// File content, ignoring the readable flag. `None` for directories.
	pub fn content(&self) -> Option<&[u8]> {
		match &self.kind {
			NodeKind::File(content) => Some(content),
			NodeKind::Directory => None,
		}
	}
}

// ---------------------------------------------------------------------------
// Public result types
// ---------------------------------------------------------------------------

/// Independent copy of a file's content and permission flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSnapshot {
	pub content: Vec<u8>,
	pub readable: bool,
	pub writable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeStats {
	pub node_count: usize,
	pub file_count: usize,
	pub directory_count: usize,
	pub total_size: usize,
}

// ---------------------------------------------------------------------------
// NodeTree
// ---------------------------------------------------------------------------

pub struct NodeTree {
	arena: Arena<Node>,
	root: NodeId,
	cwd: NodeId,
	limits: TreeLimits,
	node_count: usize,
}

impl Default for NodeTree {
	fn default() -> Self {
		Self::new(TreeLimits::default())
	}
}

impl NodeTree {
	// -- Constructor ------------------------------------------------------

	pub fn new(limits: TreeLimits) -> Self {
		let mut arena = Arena::new();
		let root = arena.new_node(Node::directory(ROOT));
		Self {
			arena,
			root,
			cwd: root,
			limits,
			node_count: 1,
		}
	}

	pub fn root(&self) -> NodeId {
		self.root
	}

	pub fn cwd(&self) -> NodeId {
		self.cwd
	}

	/// Look up a live node by handle. Removed handles yield `None`.
	pub fn node(&self, id: NodeId) -> Option<&Node> {
		self.arena
			.get(id)
			.filter(|n| !n.is_removed())
			.map(|n| n.get())
	}

	pub fn parent(&self, id: NodeId) -> Option<NodeId> {
		self.arena.get(id).and_then(|n| n.parent())
	}

	/// Children of a directory in insertion order.
	pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
		id.children(&self.arena)
	}

	/// Pre-order walk of `id` and everything beneath it. Iterative, so deep
	/// trees do not grow the call stack.
	pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
		id.descendants(&self.arena)
	}

	// -- Helpers (private) ------------------------------------------------

	fn entry(&self, id: NodeId) -> &Node {
		self.arena[id].get()
	}

	fn entry_mut(&mut self, id: NodeId) -> &mut Node {
		self.arena[id].get_mut()
	}

	fn find_child(&self, dir: NodeId, name: &str) -> Option<NodeId> {
		dir.children(&self.arena)
			.find(|child| self.entry(*child).name == name)
	}

	fn assert_node_limit(&self) -> Result<(), VfsError> {
		if self.node_count >= self.limits.max_node_count {
			return Err(VfsError::ResourceExhausted(format!(
				"Maximum node count exceeded ({})",
				self.limits.max_node_count
			)));
		}
		Ok(())
	}

	fn assert_file_size(&self, size: usize, path: &str) -> Result<(), VfsError> {
		if size > self.limits.max_file_size {
			return Err(VfsError::ResourceExhausted(format!(
				"File size {} exceeds limit ({}): {}",
				size, self.limits.max_file_size, path
			)));
		}
		Ok(())
	}

	/// Resolve the parent, validate the final name and make sure nothing with
	/// that name exists yet.
	fn prepare_create(&self, path: &str) -> Result<(NodeId, String), VfsError> {
		let (parent, name) = self.resolve_for_create(path)?;
		if name.is_empty() && is_absolute(path) {
			return Err(VfsError::AlreadyExists(ROOT.to_string()));
		}
		if name == "." || name == ".." {
			return Err(VfsError::AlreadyExists(path.to_string()));
		}
		if let Some(err) = validate_name(&name, self.limits.max_name_length) {
			return Err(VfsError::InvalidPath(format!("{}: {}", path, err)));
		}
		if self.find_child(parent, &name).is_some() {
			return Err(VfsError::AlreadyExists(path.to_string()));
		}
		self.assert_node_limit()?;
		Ok((parent, name))
	}

	fn insert_child(&mut self, parent: NodeId, node: Node) -> NodeId {
		let id = self.arena.new_node(node);
		parent.append(id, &mut self.arena);
		self.node_count += 1;
		id
	}

	fn detach(&mut self, id: NodeId) {
		let removed = id.descendants(&self.arena).count();
		id.remove_subtree(&mut self.arena);
		self.node_count -= removed;
	}

	fn set_content(&mut self, id: NodeId, data: &[u8], append: bool) -> Result<(), VfsError> {
		let node = self.entry_mut(id);
		if let NodeKind::File(content) = &mut node.kind {
			if append {
				content.try_reserve(data.len())?;
				content.extend_from_slice(data);
			} else {
				let mut fresh = Vec::new();
				fresh.try_reserve_exact(data.len())?;
				fresh.extend_from_slice(data);
				*content = fresh;
			}
		}
		Ok(())
	}

	// -- Resolution -------------------------------------------------------

	/// Resolve a path to a node. Absolute paths start at root, everything
	/// else at the current directory. `.` stays put and `..` climbs, with
	/// root being its own parent. An empty path names the current directory.
	pub fn resolve(&self, path: &str) -> Result<NodeId, VfsError> {
		let mut current = if is_absolute(path) { self.root } else { self.cwd };
		for component in components(path) {
			match component {
				"." => {}
				".." => {
					if let Some(parent) = self.parent(current) {
						current = parent;
					}
				}
				name => {
					current = self
						.find_child(current, name)
						.ok_or_else(|| VfsError::NotFound(path.to_string()))?;
				}
			}
		}
		Ok(current)
	}

	/// Resolve everything but the final component, which need not exist.
	pub fn resolve_for_create(&self, path: &str) -> Result<(NodeId, String), VfsError> {
		let (parent_path, name) = split_last(path);
		let parent = if parent_path.is_empty() {
			self.cwd
		} else {
			self.resolve(parent_path)?
		};
		if !self.entry(parent).is_dir() {
			return Err(VfsError::NotADirectory(parent_path.to_string()));
		}
		Ok((parent, name.to_string()))
	}

	/// Absolute path of a node.
	pub fn path_of(&self, id: NodeId) -> String {
		let mut names: Vec<&str> = id
			.ancestors(&self.arena)
			.filter(|a| *a != self.root)
			.map(|a| self.entry(a).name.as_str())
			.collect();
		if names.is_empty() {
			return ROOT.to_string();
		}
		names.reverse();
		format!("{}{}", ROOT, names.join("/"))
	}

	// -- Creation ---------------------------------------------------------

	pub fn create_directory(&mut self, path: &str) -> Result<NodeId, VfsError> {
		let (parent, name) = self.prepare_create(path)?;
		tracing::debug!(path, "mkdir");
		Ok(self.insert_child(parent, Node::directory(&name)))
	}

	pub fn create_file(&mut self, path: &str) -> Result<NodeId, VfsError> {
		let (parent, name) = self.prepare_create(path)?;
		tracing::debug!(path, "touch");
		Ok(self.insert_child(parent, Node::file(&name)))
	}

	// -- File operations --------------------------------------------------

	/// Overwrite or append to a file, creating it first when the path does
	/// not resolve.
	pub fn write(&mut self, path: &str, data: &[u8], append: bool) -> Result<(), VfsError> {
		let id = match self.resolve(path) {
			Ok(id) => id,
			Err(VfsError::NotFound(_)) => {
				self.assert_file_size(data.len(), path)?;
				self.create_file(path)?
			}
			Err(e) => return Err(e),
		};

		let node = self.entry(id);
		let current_len = match node.content() {
			Some(content) => content.len(),
			None => return Err(VfsError::NotAFile(path.to_string())),
		};
		if !node.writable {
			return Err(VfsError::PermissionDenied(path.to_string()));
		}
		let new_len = if append { current_len + data.len() } else { data.len() };
		self.assert_file_size(new_len, path)?;

		tracing::debug!(path, bytes = data.len(), append, "write");
		self.set_content(id, data, append)
	}

	/// Independent copy of a file's content.
	pub fn read(&self, path: &str) -> Result<Vec<u8>, VfsError> {
		let node = self.entry(self.resolve(path)?);
		let content = node
			.content()
			.ok_or_else(|| VfsError::NotAFile(path.to_string()))?;
		if !node.readable {
			return Err(VfsError::PermissionDenied(path.to_string()));
		}
		Ok(content.to_vec())
	}

	pub fn remove_file(&mut self, path: &str) -> Result<(), VfsError> {
		let id = self.resolve(path)?;
		if !self.entry(id).is_file() {
			return Err(VfsError::NotAFile(path.to_string()));
		}
		tracing::debug!(path, "rm");
		self.detach(id);
		Ok(())
	}

	/// Content and flags of a file regardless of its readable flag.
	pub fn file_snapshot(&self, path: &str) -> Result<FileSnapshot, VfsError> {
		let node = self.entry(self.resolve(path)?);
		let content = node
			.content()
			.ok_or_else(|| VfsError::NotAFile(path.to_string()))?;
		Ok(FileSnapshot {
			content: content.to_vec(),
			readable: node.readable,
			writable: node.writable,
		})
	}

	/// Put a file back into a known state, creating it if needed. Ignores the
	/// writable flag; used when replaying history and importing.
	pub fn restore_file(
		&mut self,
		path: &str,
		content: &[u8],
		readable: bool,
		writable: bool,
	) -> Result<(), VfsError> {
		self.assert_file_size(content.len(), path)?;
		let id = match self.resolve(path) {
			Ok(id) => id,
			Err(VfsError::NotFound(_)) => self.create_file(path)?,
			Err(e) => return Err(e),
		};
		if !self.entry(id).is_file() {
			return Err(VfsError::NotAFile(path.to_string()));
		}
		self.set_content(id, content, false)?;
		let node = self.entry_mut(id);
		node.readable = readable;
		node.writable = writable;
		Ok(())
	}

	// -- Directory operations ---------------------------------------------

	pub fn remove_directory(&mut self, path: &str) -> Result<(), VfsError> {
		let id = self.resolve(path)?;
		self.remove_directory_node(id, path)
	}

	fn remove_directory_node(&mut self, id: NodeId, path: &str) -> Result<(), VfsError> {
		if !self.entry(id).is_dir() {
			return Err(VfsError::NotADirectory(path.to_string()));
		}
		if id == self.root {
			return Err(VfsError::RootProtected);
		}
		if id.children(&self.arena).next().is_some() {
			return Err(VfsError::NotEmpty(path.to_string()));
		}
		if self.cwd == id {
			self.cwd = self.parent(id).unwrap_or(self.root);
		}
		tracing::debug!(path, "rmdir");
		self.detach(id);
		Ok(())
	}

	/// Child names of a directory in insertion order. `None` or an empty
	/// path lists the current directory.
	pub fn list(&self, path: Option<&str>) -> Result<Vec<String>, VfsError> {
		let (id, shown) = match path.filter(|p| !p.is_empty()) {
			Some(p) => (self.resolve(p)?, p),
			None => (self.cwd, "."),
		};
		if !self.entry(id).is_dir() {
			return Err(VfsError::NotADirectory(shown.to_string()));
		}
		Ok(id
			.children(&self.arena)
			.map(|child| self.entry(child).name.clone())
			.collect())
	}

	// -- Navigation -------------------------------------------------------

	pub fn change_directory(&mut self, path: &str) -> Result<(), VfsError> {
		if path.is_empty() {
			self.cwd = self.root;
			return Ok(());
		}
		let id = self.resolve(path)?;
		if !self.entry(id).is_dir() {
			return Err(VfsError::NotADirectory(path.to_string()));
		}
		self.cwd = id;
		Ok(())
	}

	pub fn pwd(&self) -> String {
		self.path_of(self.cwd)
	}

	// -- Permissions ------------------------------------------------------

	pub fn chmod(&mut self, path: &str, readable: bool, writable: bool) -> Result<(), VfsError> {
		let id = self.resolve(path)?;
		let node = self.entry_mut(id);
		node.readable = readable;
		node.writable = writable;
		tracing::debug!(path, readable, writable, "chmod");
		Ok(())
	}

	// -- Copy & Move ------------------------------------------------------

	/// Copy a file's content to `dst`, or create an empty directory at `dst`
	/// when `src` is a directory. Directory children are not copied.
	pub fn copy(&mut self, src: &str, dst: &str) -> Result<(), VfsError> {
		let src_id = self.resolve(src)?;
		if self.entry(src_id).is_dir() {
			self.create_directory(dst)?;
			return Ok(());
		}
		let content = self.read(src)?;
		self.write(dst, &content, false)
	}

	/// Copy then delete the source. The target takes the source's flags. A
	/// non-empty directory fails at the delete step, after the empty target
	/// has already been created.
	pub fn move_path(&mut self, src: &str, dst: &str) -> Result<(), VfsError> {
		let src_id = self.resolve(src)?;
		if let Ok(dst_id) = self.resolve(dst) {
			if dst_id == src_id {
				return Ok(());
			}
		}
		let source = self.entry(src_id);
		let (is_dir, readable, writable) = (source.is_dir(), source.readable, source.writable);
		self.copy(src, dst)?;
		self.chmod(dst, readable, writable)?;
		if is_dir {
			self.remove_directory_node(src_id, src)
		} else {
			tracing::debug!(path = src, "rm");
			self.detach(src_id);
			Ok(())
		}
	}

	// -- Whole-tree operations --------------------------------------------

	/// Drop every node and start over with an empty root.
	pub fn clear(&mut self) {
		self.arena = Arena::new();
		self.root = self.arena.new_node(Node::directory(ROOT));
		self.cwd = self.root;
		self.node_count = 1;
	}

	pub fn stats(&self) -> TreeStats {
		let mut stats = TreeStats::default();
		for id in self.root.descendants(&self.arena) {
			let node = self.entry(id);
			stats.node_count += 1;
			match node.content() {
				Some(content) => {
					stats.file_count += 1;
					stats.total_size += content.len();
				}
				None => stats.directory_count += 1,
			}
		}
		stats
	}

	/// Indented outline of a subtree, two spaces per level, one `- name`
	/// entry per node. The root's own line is omitted.
	pub fn render_tree(&self, path: Option<&str>) -> Result<String, VfsError> {
		let start = match path.filter(|p| !p.is_empty()) {
			Some(p) => self.resolve(p)?,
			None => self.cwd,
		};

		let mut out = String::new();
		let mut stack: Vec<(NodeId, usize)> = vec![(start, 0)];
		while let Some((id, depth)) = stack.pop() {
			if id != self.root {
				out.push_str(&"  ".repeat(depth));
				out.push_str("- ");
				out.push_str(&self.entry(id).name);
				out.push('\n');
			}
			let children: Vec<NodeId> = id.children(&self.arena).collect();
			for child in children.into_iter().rev() {
				stack.push((child, depth + 1));
			}
		}
		Ok(out)
	}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
