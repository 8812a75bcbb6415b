use senko::cli::{error::report, run};
use senko::config::Config;

fn main() {
    let _ = enable_ansi_support::enable_ansi_support();

    // RUST_LOG wins over log.level from the rc file
    let level = Config::load()
        .map(|c| c.log_filter().to_string())
        .unwrap_or_else(|_| "warn".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run() {
        std::process::exit(report(&e));
    }
}
