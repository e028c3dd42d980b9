use env_logger::{Builder, Env};

/// Installs the global logger. `RUST_LOG` wins over `level` when set.
pub fn init(level: &str) {
    let env = Env::default().default_filter_or(level.to_ascii_lowercase());
    let _ = Builder::from_env(env)
        .format_timestamp_secs()
        .format_target(false)
        .try_init();
}
