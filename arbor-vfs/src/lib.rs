pub mod codec;
pub mod commands;
pub mod completion;
pub mod config;
pub mod error;
pub mod history;
pub mod journal;
pub mod oplog;
pub mod parser;
pub mod path;
pub mod protocol;
pub mod search;
pub mod server;
pub mod transport;
pub mod tree;
pub mod vars;
