use std::path::Path;

use crate::codec::{self, ImportReport};
use crate::completion::Completer;
use crate::error::VfsError;
use crate::history::CommandHistory;
use crate::journal::Journal;
use crate::oplog::{Operation, OperationLog};
use crate::parser::tokenize;
use crate::path::{join, TreeLimits};
use crate::search;
use crate::tree::NodeTree;
use crate::vars::VarStore;

// ---------------------------------------------------------------------------
// Command table
// ---------------------------------------------------------------------------

/// Every command name the shell understands.
pub const COMMANDS: &[&str] = &[
	"mkdir", "ls", "cd", "touch", "write", "append", "read", "rm", "rmdir", "cat", "pwd", "cp",
	"mv", "chmod", "tree", "search", "undo", "redo", "export", "import", "set", "get", "unset",
	"listenv", "history", "log", "help", "complete",
];

const HELP_TEXT: &[&str] = &[
	"mkdir <dir> - create directory",
	"ls [path] - list directory",
	"cd <path> - change directory",
	"touch <file> - create empty file",
	"write <file> <text> - write text to file",
	"append <file> <text> - append text to file",
	"read <file> - read file content",
	"rm <file> - delete file",
	"rmdir <dir> - delete empty directory",
	"cat <file> - show file with line numbers",
	"pwd - print working directory",
	"cp <src> <dst> - copy file or create empty directory",
	"mv <src> <dst> - move file or empty directory",
	"chmod <path> <r> <w> - set perms",
	"tree [path] - show directory tree",
	"search <path> <keyword> - search in files",
	"undo - undo last operation",
	"redo - redo last undone operation",
	"export <file> - export state",
	"import <file> - import state",
	"set <k> <v> - set variable",
	"get <k> - get variable",
	"unset <k> - remove variable",
	"listenv - list variables",
	"history - show command history",
	"log - show logs",
	"help [cmd] - show help",
	"complete <prefix> - autocomplete",
];

// ---------------------------------------------------------------------------
// Config & result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SessionConfig {
	pub limits: TreeLimits,
	pub history_size: usize,
	pub log_capacity: usize,
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			limits: TreeLimits::default(),
			history_size: 100,
			log_capacity: 50,
		}
	}
}

/// Outcome of one command line. `status` is 0 on success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
	pub status: i32,
	pub stdout: String,
	pub stderr: String,
	pub suggestions: Vec<String>,
	pub code: Option<&'static str>,
}

impl CommandResult {
	pub fn ok(stdout: impl Into<String>) -> Self {
		Self {
			stdout: stdout.into(),
			..Self::default()
		}
	}

	fn failure(command: &str, err: &VfsError) -> Self {
		let stderr = match err {
			VfsError::Usage(_) | VfsError::UnknownCommand(_) => err.to_string(),
			_ => format!("{}: {}", command, err),
		};
		Self {
			status: 1,
			stderr,
			code: Some(err.code()),
			..Self::default()
		}
	}

	pub fn is_ok(&self) -> bool {
		self.status == 0
	}
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

fn usage(message: &str) -> VfsError {
	VfsError::Usage(message.to_string())
}

fn one_arg<'a>(args: &'a [String], message: &str) -> Result<&'a str, VfsError> {
	args.first().map(String::as_str).ok_or_else(|| usage(message))
}

fn two_args<'a>(args: &'a [String], message: &str) -> Result<(&'a str, &'a str), VfsError> {
	match args {
		[a, b, ..] => Ok((a.as_str(), b.as_str())),
		_ => Err(usage(message)),
	}
}

fn parse_bit(s: &str) -> Option<bool> {
	match s {
		"0" => Some(false),
		"1" => Some(true),
		_ => None,
	}
}

fn lines<I, S>(items: I) -> String
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut out = String::new();
	for item in items {
		out.push_str(item.as_ref());
		out.push('\n');
	}
	out
}

/// Prefix every line with its 1-based number, `N: `.
fn number_lines(content: &str) -> String {
	let mut out = String::from("1: ");
	let mut line = 1;
	for c in content.chars() {
		out.push(c);
		if c == '\n' {
			line += 1;
			out.push_str(&line.to_string());
			out.push_str(": ");
		}
	}
	out
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One shell session: the tree plus everything the commands around it keep.
pub struct Session {
	tree: NodeTree,
	log: OperationLog,
	vars: VarStore,
	history: CommandHistory,
	journal: Journal,
	completer: Completer,
}

impl Default for Session {
	fn default() -> Self {
		Self::new(SessionConfig::default())
	}
}

impl Session {
	pub fn new(config: SessionConfig) -> Self {
		Self {
			tree: NodeTree::new(config.limits),
			log: OperationLog::new(),
			vars: VarStore::new(),
			history: CommandHistory::new(config.history_size),
			journal: Journal::new(config.log_capacity),
			completer: Completer::with_words(COMMANDS.iter().copied()),
		}
	}

	pub fn tree(&self) -> &NodeTree {
		&self.tree
	}

	pub fn cwd(&self) -> String {
		self.tree.pwd()
	}

	/// Replace the tree with a previously exported state.
	pub fn load(&mut self, file: &Path) -> Result<ImportReport, VfsError> {
		let report = codec::import_from_file(&mut self.tree, file)?;
		self.log.clear();
		Ok(report)
	}

	/// Run one command line. Non-blank lines go to history before running.
	pub fn execute(&mut self, line: &str) -> CommandResult {
		if !line.trim().is_empty() {
			self.history.add(line);
		}
		let tokens = tokenize(line);
		let Some((name, args)) = tokens.split_first() else {
			return CommandResult::ok("");
		};

		match self.dispatch(name, args) {
			Ok(result) => {
				self.journal.record(format!("ok {}", line.trim()));
				result
			}
			Err(e) => {
				tracing::debug!(command = %name, error = %e, "command failed");
				self.journal.record(format!("error {}: {}", line.trim(), e));
				CommandResult::failure(name, &e)
			}
		}
	}

	fn dispatch(&mut self, name: &str, args: &[String]) -> Result<CommandResult, VfsError> {
		match name {
			// -- Filesystem ----------------------------------------------
			"mkdir" => self.cmd_mkdir(args),
			"ls" => self.cmd_ls(args),
			"cd" => self.cmd_cd(args),
			"touch" => self.cmd_touch(args),
			"write" => self.cmd_write(args, false),
			"append" => self.cmd_write(args, true),
			"read" => self.cmd_read(args),
			"cat" => self.cmd_cat(args),
			"rm" => self.cmd_rm(args),
			"rmdir" => self.cmd_rmdir(args),
			"pwd" => Ok(CommandResult::ok(self.tree.pwd())),
			"cp" => self.cmd_cp(args),
			"mv" => self.cmd_mv(args),
			"chmod" => self.cmd_chmod(args),
			"tree" => {
				let path = args.first().map(String::as_str);
				Ok(CommandResult::ok(self.tree.render_tree(path)?))
			}
			"search" => self.cmd_search(args),

			// -- History -------------------------------------------------
			"undo" => {
				self.log.undo(&mut self.tree)?;
				Ok(CommandResult::ok(""))
			}
			"redo" => {
				self.log.redo(&mut self.tree)?;
				Ok(CommandResult::ok(""))
			}

			// -- Persistence ---------------------------------------------
			"export" => {
				let file = one_arg(args, "export: need filename")?;
				codec::export_to_file(&self.tree, Path::new(file))?;
				Ok(CommandResult::ok(""))
			}
			"import" => {
				let file = one_arg(args, "import: need filename")?;
				self.load(Path::new(file))?;
				Ok(CommandResult::ok(""))
			}

			// -- Variables -----------------------------------------------
			"set" => {
				let (key, _) = two_args(args, "set: need key and value")?;
				let value = args[1..].join(" ");
				self.vars.set(key, &value);
				Ok(CommandResult::ok(""))
			}
			"get" => {
				let key = one_arg(args, "get: need key")?;
				let value = self
					.vars
					.get(key)
					.ok_or_else(|| VfsError::VarNotSet(key.to_string()))?;
				Ok(CommandResult::ok(value))
			}
			"unset" => {
				let key = one_arg(args, "unset: need key")?;
				self.vars.unset(key);
				Ok(CommandResult::ok(""))
			}
			"listenv" => Ok(CommandResult::ok(lines(
				self.vars.iter().map(|(k, v)| format!("{}={}", k, v)),
			))),

			// -- Introspection -------------------------------------------
			"history" => Ok(CommandResult::ok(lines(self.history.iter()))),
			"log" => Ok(CommandResult::ok(lines(
				self.journal.entries().map(|e| e.render()),
			))),
			"help" => {
				let prefix = args.first().map(String::as_str).unwrap_or("");
				Ok(CommandResult::ok(lines(
					HELP_TEXT.iter().filter(|l| l.starts_with(prefix)),
				)))
			}
			"complete" => {
				let prefix = one_arg(args, "complete: need prefix")?;
				Ok(CommandResult {
					suggestions: self.completer.complete(prefix),
					..CommandResult::ok("")
				})
			}

			_ => Err(VfsError::UnknownCommand(name.to_string())),
		}
	}

	// -- Helpers ------------------------------------------------------------

	/// Current content of a file, `None` when nothing exists at `path`.
	fn existing_content(&self, path: &str) -> Result<Option<Vec<u8>>, VfsError> {
		match self.tree.file_snapshot(path) {
			Ok(snap) => Ok(Some(snap.content)),
			Err(VfsError::NotFound(_)) => Ok(None),
			Err(e) => Err(e),
		}
	}

	fn absolute(&self, path: &str) -> Result<String, VfsError> {
		Ok(self.tree.path_of(self.tree.resolve(path)?))
	}

	// -- Handlers -----------------------------------------------------------

	fn cmd_mkdir(&mut self, args: &[String]) -> Result<CommandResult, VfsError> {
		let path = one_arg(args, "mkdir: missing operand")?;
		let id = self.tree.create_directory(path)?;
		self.log.record(Operation::CreateDir {
			path: self.tree.path_of(id),
		});
		Ok(CommandResult::ok(""))
	}

	fn cmd_touch(&mut self, args: &[String]) -> Result<CommandResult, VfsError> {
		let path = one_arg(args, "touch: missing file")?;
		let id = self.tree.create_file(path)?;
		self.log.record(Operation::CreateFile {
			path: self.tree.path_of(id),
		});
		Ok(CommandResult::ok(""))
	}

	fn cmd_ls(&mut self, args: &[String]) -> Result<CommandResult, VfsError> {
		let names = self.tree.list(args.first().map(String::as_str))?;
		Ok(CommandResult::ok(lines(names)))
	}

	fn cmd_cd(&mut self, args: &[String]) -> Result<CommandResult, VfsError> {
		let path = args.first().map(String::as_str).unwrap_or("");
		self.tree.change_directory(path)?;
		Ok(CommandResult::ok(""))
	}

	fn cmd_write(&mut self, args: &[String], append: bool) -> Result<CommandResult, VfsError> {
		let message = if append {
			"append: need file and text"
		} else {
			"write: need file and text"
		};
		let (path, _) = two_args(args, message)?;
		let text = args[1..].join(" ");

		let before = self.existing_content(path)?;
		self.tree.write(path, text.as_bytes(), append)?;
		let after = self.tree.file_snapshot(path)?.content;
		let path = self.absolute(path)?;
		self.log.record(Operation::WriteFile {
			path,
			before,
			after,
		});
		Ok(CommandResult::ok(""))
	}

	fn cmd_read(&mut self, args: &[String]) -> Result<CommandResult, VfsError> {
		let path = one_arg(args, "read: missing file")?;
		let content = self.tree.read(path)?;
		Ok(CommandResult::ok(String::from_utf8_lossy(&content)))
	}

	fn cmd_cat(&mut self, args: &[String]) -> Result<CommandResult, VfsError> {
		let path = one_arg(args, "cat: missing file")?;
		let content = self.tree.read(path)?;
		Ok(CommandResult::ok(number_lines(&String::from_utf8_lossy(&content))))
	}

	fn cmd_rm(&mut self, args: &[String]) -> Result<CommandResult, VfsError> {
		let path = one_arg(args, "rm: missing file")?;
		let absolute = self.absolute(path)?;
		let snap = self.tree.file_snapshot(path)?;
		self.tree.remove_file(path)?;
		self.log.record(Operation::DeleteFile {
			path: absolute,
			content: snap.content,
			readable: snap.readable,
			writable: snap.writable,
		});
		Ok(CommandResult::ok(""))
	}

	/// Directory removal keeps no subtree snapshot and is not undoable.
	fn cmd_rmdir(&mut self, args: &[String]) -> Result<CommandResult, VfsError> {
		let path = one_arg(args, "rmdir: missing dir")?;
		self.tree.remove_directory(path)?;
		Ok(CommandResult::ok(""))
	}

	fn cmd_cp(&mut self, args: &[String]) -> Result<CommandResult, VfsError> {
		let (src, dst) = two_args(args, "cp: need src and dst")?;
		let src_id = self.tree.resolve(src)?;
		let src_is_dir = self.tree.node(src_id).is_some_and(|n| n.is_dir());

		if src_is_dir {
			self.tree.copy(src, dst)?;
			let path = self.absolute(dst)?;
			self.log.record(Operation::CreateDir { path });
		} else {
			let before = self.existing_content(dst)?;
			self.tree.copy(src, dst)?;
			let after = self.tree.file_snapshot(dst)?.content;
			let path = self.absolute(dst)?;
			self.log.record(Operation::WriteFile {
				path,
				before,
				after,
			});
		}
		Ok(CommandResult::ok(""))
	}

	fn cmd_mv(&mut self, args: &[String]) -> Result<CommandResult, VfsError> {
		let (src, dst) = two_args(args, "mv: need src and dst")?;
		let from = self.absolute(src)?;
		// Taken before the move: removing the source may move the cwd.
		let (parent, name) = self.tree.resolve_for_create(dst)?;
		let to = join(&self.tree.path_of(parent), &name);
		let replaced = self.tree.file_snapshot(&to).ok();

		self.tree.move_path(src, dst)?;
		if from != to {
			self.log.record(Operation::Move { from, to, replaced });
		}
		Ok(CommandResult::ok(""))
	}

	fn cmd_chmod(&mut self, args: &[String]) -> Result<CommandResult, VfsError> {
		let [path, r, w, ..] = args else {
			return Err(usage("chmod: need path r w"));
		};
		let (Some(readable), Some(writable)) = (parse_bit(r), parse_bit(w)) else {
			return Err(usage("chmod: r and w must be 0 or 1"));
		};

		let id = self.tree.resolve(path)?;
		let before = self
			.tree
			.node(id)
			.map(|n| (n.readable(), n.writable()))
			.ok_or_else(|| VfsError::NotFound(path.clone()))?;
		self.tree.chmod(path, readable, writable)?;
		self.log.record(Operation::Chmod {
			path: self.tree.path_of(id),
			before,
			after: (readable, writable),
		});
		Ok(CommandResult::ok(""))
	}

	fn cmd_search(&mut self, args: &[String]) -> Result<CommandResult, VfsError> {
		let (start, keyword) = two_args(args, "search: need path and keyword")?;
		let mut out = String::new();
		for hit in search::search_all(&self.tree, Some(start), keyword.as_bytes()) {
			out.push_str(&format!(
				"{}:{}:{}\n",
				hit.path,
				hit.line,
				String::from_utf8_lossy(&hit.text)
			));
		}
		Ok(CommandResult::ok(out))
	}
}
