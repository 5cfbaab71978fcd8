use anyhow::Context;
use compono::cli::run_cli;
use compono::config::AppConfig;
use compono::logging::init_logging_with_config;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Invalid environment configuration")?;
    let _guard = init_logging_with_config(&config.log)?;
    run_cli(&config)
}
