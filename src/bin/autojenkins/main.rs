use tracing_subscriber::EnvFilter;

mod args;
mod output;

const DEFAULT_LOG_FILTER: &str = "warn";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    if !args::handle()? {
        std::process::exit(1);
    }
    Ok(())
}
