use std::path::PathBuf;

use clap::Parser;

use crate::commands::SessionConfig;
use crate::path::TreeLimits;

#[derive(Parser, Debug)]
#[command(name = "arbor-vfs-engine", about = "In-memory virtual filesystem shell over NDJSON stdio")]
pub struct CliArgs {
    /// Number of command lines kept by `history`
    #[arg(long, default_value = "100", env = "ARBOR_HISTORY_SIZE")]
    pub history_size: usize,

    /// Number of entries kept by `log`
    #[arg(long, default_value = "50", env = "ARBOR_LOG_CAPACITY")]
    pub log_capacity: usize,

    /// Maximum number of nodes, root included
    #[arg(long, default_value = "10000", env = "ARBOR_MAX_NODES")]
    pub max_nodes: usize,

    /// Maximum size of one file in bytes
    #[arg(long, default_value = "10485760", env = "ARBOR_MAX_FILE_SIZE")]
    pub max_file_size: usize,

    /// Import a previously exported state before reading commands
    #[arg(long, env = "ARBOR_LOAD")]
    pub load: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "ARBOR_LOG_LEVEL")]
    pub log_level: String,
}

impl CliArgs {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            limits: TreeLimits {
                max_file_size: self.max_file_size,
                max_node_count: self.max_nodes,
                ..TreeLimits::default()
            },
            history_size: self.history_size,
            log_capacity: self.log_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_to_session_config() {
        let args = CliArgs::try_parse_from([
            "arbor-vfs-engine",
            "--history-size",
            "7",
            "--max-nodes",
            "12",
            "--max-file-size",
            "64",
            "--log-capacity",
            "3",
            "--load",
            "/tmp/state.txt",
        ])
        .unwrap();
        let config = args.session_config();
        assert_eq!(config.history_size, 7);
        assert_eq!(config.log_capacity, 3);
        assert_eq!(config.limits.max_node_count, 12);
        assert_eq!(config.limits.max_file_size, 64);
        assert_eq!(config.limits.max_name_length, 255);
        assert_eq!(args.load, Some(PathBuf::from("/tmp/state.txt")));
    }

    #[test]
    fn rejects_non_numeric_limits() {
        assert!(CliArgs::try_parse_from(["arbor-vfs-engine", "--max-nodes", "lots"]).is_err());
    }
}
