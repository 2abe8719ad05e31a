use clap::Parser;

use tierbadge_cli::{run, Cli, Config};
use tierbadge_observability::LogFormat;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.pretty_logs {
        tierbadge_observability::tracing::init(LogFormat::Pretty);
    } else {
        tierbadge_observability::init();
    }

    let config = Config::from_env();
    tracing::debug!(store = %config.store_path.display(), "configuration loaded");

    let stdout = std::io::stdout();
    run(cli.command, &config, &mut stdout.lock())
}
