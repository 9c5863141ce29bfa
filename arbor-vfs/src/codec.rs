// ---------------------------------------------------------------------------
// Codec — line-oriented text snapshot of a NodeTree
// ---------------------------------------------------------------------------
//
//   DIR:<absolute-path>:<r 0|1>:<w 0|1>
//   FILE:<absolute-path>:<r 0|1>:<w 0|1>:<escaped-content>
//   END
//
// Content escapes: newline -> `\n`, backslash -> `\\`. Every other byte is
// written as is, so one record is always exactly one line.
// ---------------------------------------------------------------------------

use std::path::Path;

use crate::error::VfsError;
use crate::path::is_absolute;
use crate::tree::NodeTree;

const DIR_TAG: &[u8] = b"DIR";
const FILE_TAG: &[u8] = b"FILE";
const END_TAG: &[u8] = b"END";

/// Counts of records applied and skipped by an import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
	pub directories: usize,
	pub files: usize,
	pub skipped: usize,
}

// -- Escaping ---------------------------------------------------------------

pub fn escape(content: &[u8], out: &mut Vec<u8>) {
	for &b in content {
		match b {
			b'\n' => out.extend_from_slice(b"\\n"),
			b'\\' => out.extend_from_slice(b"\\\\"),
			_ => out.push(b),
		}
	}
}

/// Reverse of [`escape`]. Unknown escape sequences and a trailing lone
/// backslash are dropped.
pub fn unescape(escaped: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(escaped.len());
	let mut bytes = escaped.iter();
	while let Some(&b) = bytes.next() {
		if b != b'\\' {
			out.push(b);
			continue;
		}
		match bytes.next() {
			Some(b'n') => out.push(b'\n'),
			Some(b'\\') => out.push(b'\\'),
			_ => {}
		}
	}
	out
}

// -- Export -----------------------------------------------------------------

fn flag(value: bool) -> &'static [u8] {
	if value { b"1" } else { b"0" }
}

/// Serialize the whole tree, root first, in pre-order with children in
/// insertion order. Parents always precede their descendants.
pub fn export(tree: &NodeTree) -> Vec<u8> {
	let mut out = Vec::new();
	for id in tree.descendants(tree.root()) {
		let Some(node) = tree.node(id) else {
			continue;
		};
		let tag = if node.is_dir() { DIR_TAG } else { FILE_TAG };
		out.extend_from_slice(tag);
		out.push(b':');
		out.extend_from_slice(tree.path_of(id).as_bytes());
		out.push(b':');
		out.extend_from_slice(flag(node.readable()));
		out.push(b':');
		out.extend_from_slice(flag(node.writable()));
		if let Some(content) = node.content() {
			out.push(b':');
			escape(content, &mut out);
		}
		out.push(b'\n');
	}
	out.extend_from_slice(END_TAG);
	out.push(b'\n');
	out
}

// -- Import -----------------------------------------------------------------

enum Record<'a> {
	Dir {
		path: &'a str,
		readable: bool,
		writable: bool,
	},
	File {
		path: &'a str,
		readable: bool,
		writable: bool,
		content: Vec<u8>,
	},
	End,
}

fn parse_flag(field: &[u8]) -> Option<bool> {
	match field {
		b"0" => Some(false),
		b"1" => Some(true),
		_ => None,
	}
}

fn parse_path(field: &[u8]) -> Option<&str> {
	std::str::from_utf8(field).ok().filter(|p| is_absolute(p))
}

/// Parse one line. `None` means malformed.
///
/// A trailing `\r` is tolerated on `DIR` and `END` lines. On `FILE` lines
/// it belongs to the content.
fn parse_record(line: &[u8]) -> Option<Record<'_>> {
	let trimmed = line.strip_suffix(b"\r").unwrap_or(line);
	if trimmed == END_TAG {
		return Some(Record::End);
	}
	let mut fields = line.splitn(2, |b| *b == b':');
	let tag = fields.next()?;
	let rest = fields.next()?;

	if tag == DIR_TAG {
		let rest = rest.strip_suffix(b"\r").unwrap_or(rest);
		let mut parts = rest.splitn(3, |b| *b == b':');
		let path = parse_path(parts.next()?)?;
		let readable = parse_flag(parts.next()?)?;
		let writable = parse_flag(parts.next()?)?;
		Some(Record::Dir {
			path,
			readable,
			writable,
		})
	} else if tag == FILE_TAG {
		let mut parts = rest.splitn(4, |b| *b == b':');
		let path = parse_path(parts.next()?)?;
		let readable = parse_flag(parts.next()?)?;
		let writable = parse_flag(parts.next()?)?;
		let content = unescape(parts.next()?);
		Some(Record::File {
			path,
			readable,
			writable,
			content,
		})
	} else {
		None
	}
}

fn apply_record(tree: &mut NodeTree, record: &Record<'_>) -> Result<(), VfsError> {
	match record {
		Record::Dir {
			path,
			readable,
			writable,
		} => {
			if tree.resolve(path).ok() != Some(tree.root()) {
				tree.create_directory(path)?;
			}
			tree.chmod(path, *readable, *writable)
		}
		Record::File {
			path,
			readable,
			writable,
			content,
		} => tree.restore_file(path, content, *readable, *writable),
		Record::End => Ok(()),
	}
}

/// Replace the tree with the records in `data`.
///
/// The tree is cleared first. Malformed lines and records that cannot be
/// applied (missing parent, bad flag digit, name clash) are skipped. An
/// `END` line stops processing.
pub fn import(tree: &mut NodeTree, data: &[u8]) -> ImportReport {
	tree.clear();
	let mut report = ImportReport::default();

	for (idx, line) in data.split(|b| *b == b'\n').enumerate() {
		if line.is_empty() || line == b"\r" {
			continue;
		}
		let Some(record) = parse_record(line) else {
			tracing::warn!(line = idx + 1, "skipping malformed record");
			report.skipped += 1;
			continue;
		};
		if matches!(record, Record::End) {
			break;
		}
		match apply_record(tree, &record) {
			Ok(()) => match record {
				Record::Dir { .. } => report.directories += 1,
				Record::File { .. } => report.files += 1,
				Record::End => {}
			},
			Err(e) => {
				tracing::warn!(line = idx + 1, error = %e, "skipping record");
				report.skipped += 1;
			}
		}
	}

	tracing::debug!(?report, "import finished");
	report
}

// -- Host filesystem --------------------------------------------------------

pub fn export_to_file(tree: &NodeTree, file: &Path) -> Result<(), VfsError> {
	std::fs::write(file, export(tree))?;
	let stats = tree.stats();
	tracing::info!(
		file = %file.display(),
		directories = stats.directory_count,
		files = stats.file_count,
		bytes = stats.total_size,
		"exported"
	);
	Ok(())
}

/// Read the whole file before touching the tree, so an unreadable file
/// leaves the current state intact.
pub fn import_from_file(tree: &mut NodeTree, file: &Path) -> Result<ImportReport, VfsError> {
	let data = std::fs::read(file)?;
	let report = import(tree, &data);
	tracing::info!(
		file = %file.display(),
		directories = report.directories,
		files = report.files,
		skipped = report.skipped,
		"imported"
	);
	Ok(report)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_tree() -> NodeTree {
		let mut tree = NodeTree::default();
		tree.create_directory("/docs").unwrap();
		tree.write("/docs/notes.txt", b"line one\nC:\\path\\x", false)
			.unwrap();
		tree.create_directory("/docs/empty").unwrap();
		tree.write("/top", b"", false).unwrap();
		tree.chmod("/top", false, true).unwrap();
		tree.chmod("/docs/empty", true, false).unwrap();
		tree
	}

	#[test]
	fn escape_newline_and_backslash() {
		let mut out = Vec::new();
		escape(b"a\nb\\c", &mut out);
		assert_eq!(out, b"a\\nb\\\\c");
		assert_eq!(unescape(&out), b"a\nb\\c");
	}

	#[test]
	fn unescape_drops_unknown_sequences() {
		assert_eq!(unescape(b"a\\tb\\"), b"ab");
	}

	#[test]
	fn export_format() {
		let text = String::from_utf8(export(&sample_tree())).unwrap();
		assert_eq!(
			text,
			"DIR:/:1:1\n\
			 DIR:/docs:1:1\n\
			 FILE:/docs/notes.txt:1:1:line one\\nC:\\\\path\\\\x\n\
			 DIR:/docs/empty:1:0\n\
			 FILE:/top:0:1:\n\
			 END\n"
		);
	}

	#[test]
	fn export_import_is_isomorphic() {
		let original = sample_tree();
		let data = export(&original);

		let mut restored = NodeTree::default();
		restored.write("/stale", b"gone after import", false).unwrap();
		let report = import(&mut restored, &data);

		assert_eq!(
			report,
			ImportReport {
				directories: 3,
				files: 2,
				skipped: 0,
			}
		);
		assert_eq!(export(&restored), data);
		assert!(restored.resolve("/stale").is_err());
		assert_eq!(
			restored.file_snapshot("/docs/notes.txt").unwrap().content,
			b"line one\nC:\\path\\x"
		);
	}

	#[test]
	fn root_record_applies_flags() {
		let mut tree = NodeTree::default();
		import(&mut tree, b"DIR:/:1:0\nEND\n");
		assert!(!tree.node(tree.root()).unwrap().writable());
	}

	#[test]
	fn import_stops_at_end() {
		let mut tree = NodeTree::default();
		let report = import(&mut tree, b"DIR:/:1:1\nDIR:/a:1:1\nEND\nDIR:/b:1:1\n");
		assert_eq!(report.directories, 2);
		assert!(tree.resolve("/a").is_ok());
		assert!(tree.resolve("/b").is_err());
	}

	#[test]
	fn malformed_records_are_skipped() {
		let mut tree = NodeTree::default();
		let data = b"DIR:/:1:1\n\
			GARBAGE\n\
			DIR:/ok:1:1\n\
			DIR:/bad-flag:2:1\n\
			FILE:/truncated:1\n\
			FILE:/orphan/child:1:1:x\n\
			FILE:relative:1:1:x\n\
			FILE:/ok/f:1:1:kept\n\
			END\n";
		let report = import(&mut tree, data);
		assert_eq!(report.directories, 2);
		assert_eq!(report.files, 1);
		assert_eq!(report.skipped, 5);
		assert_eq!(tree.read("/ok/f").unwrap(), b"kept");
		assert!(tree.resolve("/bad-flag").is_err());
	}

	#[test]
	fn carriage_returns_in_content_survive() {
		let mut original = NodeTree::default();
		original.write("/f", b"line\r", false).unwrap();
		original.write("/g", b"a\r\nb\rc", false).unwrap();
		let data = export(&original);

		let mut restored = NodeTree::default();
		let report = import(&mut restored, &data);
		assert_eq!(report.skipped, 0);
		assert_eq!(restored.read("/f").unwrap(), b"line\r");
		assert_eq!(restored.read("/g").unwrap(), b"a\r\nb\rc");
		assert_eq!(export(&restored), data);
	}

	#[test]
	fn crlf_line_endings_on_directory_records() {
		let mut tree = NodeTree::default();
		let report = import(&mut tree, b"DIR:/:1:1\r\nDIR:/d:1:0\r\nEND\r\nDIR:/late:1:1\r\n");
		assert_eq!(report.directories, 2);
		assert_eq!(report.skipped, 0);
		assert!(!tree.node(tree.resolve("/d").unwrap()).unwrap().writable());
		assert!(tree.resolve("/late").is_err());
	}

	#[test]
	fn content_may_contain_colons() {
		let mut tree = NodeTree::default();
		import(&mut tree, b"FILE:/f:1:1:a:b:c\n");
		assert_eq!(tree.read("/f").unwrap(), b"a:b:c");
	}

	#[test]
	fn file_round_trip_through_host_fs() {
		let dir = tempfile::tempdir().unwrap();
		let file = dir.path().join("state.txt");
		export_to_file(&sample_tree(), &file).unwrap();

		let mut tree = NodeTree::default();
		let report = import_from_file(&mut tree, &file).unwrap();
		assert_eq!(report.files, 2);
		assert!(tree.resolve("/docs/empty").is_ok());
	}

	#[test]
	fn missing_import_file_keeps_tree() {
		let dir = tempfile::tempdir().unwrap();
		let mut tree = NodeTree::default();
		tree.create_directory("/keep").unwrap();
		let err = import_from_file(&mut tree, &dir.path().join("nope")).unwrap_err();
		assert!(matches!(err, VfsError::Io(_)));
		assert!(tree.resolve("/keep").is_ok());
	}
}
