use clap::Parser;
use hedgebets::cli::{self, Cli};
use hedgebets::config::AppConfig;
use tracing::{debug, warn};

mod main_runtime;

use main_runtime::init_logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match AppConfig::load_from(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: failed to load config from {} ({}), using defaults", cli.config, e);
            AppConfig::default_config()
        }
    };

    let _guard = init_logging(&config.logging);

    if let Err(problems) = config.validate() {
        for problem in &problems {
            warn!(%problem, "invalid configuration");
        }
        anyhow::bail!("invalid configuration: {}", problems.join("; "));
    }
    debug!(
        api = %config.api.base_url,
        bet_store = %config.bet_store.base_url,
        "configuration loaded"
    );

    // One logical thread per session
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(cli::run(cli, config))
}
