use clap::Parser;

use arbor_vfs_engine::commands::Session;
use arbor_vfs_engine::config::CliArgs;
use arbor_vfs_engine::server::ShellServer;
use arbor_vfs_engine::transport::NdjsonTransport;

fn main() {
    let args = CliArgs::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    let mut session = Session::new(args.session_config());
    if let Some(file) = &args.load {
        if let Err(e) = session.load(file) {
            tracing::error!("Failed to load {}: {}", file.display(), e);
            std::process::exit(1);
        }
    }

    let mut server = ShellServer::new(session, NdjsonTransport::stdout());

    tracing::info!("arbor-vfs-engine ready");

    let stdin = std::io::stdin();
    if let Err(e) = server.run(stdin.lock()) {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("arbor-vfs-engine stopped");
}
