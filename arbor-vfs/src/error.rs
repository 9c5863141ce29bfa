use thiserror::Error;

#[derive(Debug, Error)]
pub enum VfsError {
	#[error("Invalid path: {0}")]
	InvalidPath(String),
	#[error("No such file or directory: {0}")]
	NotFound(String),
	#[error("Already exists: {0}")]
	AlreadyExists(String),
	#[error("Not a directory: {0}")]
	NotADirectory(String),
	#[error("Not a file: {0}")]
	NotAFile(String),
	#[error("Directory not empty: {0}")]
	NotEmpty(String),
	#[error("Permission denied: {0}")]
	PermissionDenied(String),
	#[error("Cannot remove the root directory")]
	RootProtected,
	#[error("Nothing to undo")]
	NothingToUndo,
	#[error("Nothing to redo")]
	NothingToRedo,
	#[error("Resource exhausted: {0}")]
	ResourceExhausted(String),
	#[error("Variable not set: {0}")]
	VarNotSet(String),
	#[error("{0}")]
	Usage(String),
	#[error("unknown command: {0}")]
	UnknownCommand(String),
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl VfsError {
	pub fn code(&self) -> &'static str {
		match self {
			Self::InvalidPath(_) => "VFS_INVALID_PATH",
			Self::NotFound(_) => "VFS_NOT_FOUND",
			Self::AlreadyExists(_) => "VFS_ALREADY_EXISTS",
			Self::NotADirectory(_) => "VFS_NOT_DIRECTORY",
			Self::NotAFile(_) => "VFS_NOT_FILE",
			Self::NotEmpty(_) => "VFS_NOT_EMPTY",
			Self::PermissionDenied(_) => "VFS_PERMISSION_DENIED",
			Self::RootProtected => "VFS_ROOT_PROTECTED",
			Self::NothingToUndo => "VFS_NOTHING_TO_UNDO",
			Self::NothingToRedo => "VFS_NOTHING_TO_REDO",
			Self::ResourceExhausted(_) => "VFS_RESOURCE_EXHAUSTED",
			Self::VarNotSet(_) => "VFS_VAR_NOT_SET",
			Self::Usage(_) => "VFS_USAGE",
			Self::UnknownCommand(_) => "VFS_UNKNOWN_COMMAND",
			Self::Io(_) => "VFS_IO_ERROR",
			Self::Json(_) => "VFS_JSON_ERROR",
		}
	}
}

impl From<std::collections::TryReserveError> for VfsError {
	fn from(e: std::collections::TryReserveError) -> Self {
		Self::ResourceExhausted(format!("allocation failed: {}", e))
	}
}
