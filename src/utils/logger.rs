use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` 未設定時使用：本 crate 為 info (verbose 為 debug)，其他 crate 只顯示警告
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "warn,keyword_etl=debug,toml_etl=debug"
    } else {
        "warn,keyword_etl=info,toml_etl=info"
    }
}

pub fn init_cli_logger(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    // verbose 時顯示 target
    let result = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(verbose).without_time().compact())
        .try_init();

    if let Err(e) = result {
        eprintln!("⚠️ Logger already initialized: {}", e);
    }
}
