use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default directives when `RUST_LOG` is unset.
const DEFAULT_DIRECTIVES: &str = "info,server=debug,sqlx=warn,tower_http=info";

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` controls filtering. `LOG_FORMAT=json` switches the console
/// output to one JSON object per line for log shippers. The `log` facade is
/// left untouched so the OTLP log bridge can claim it afterwards.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        tracing::subscriber::set_global_default(
            registry.with(fmt::layer().json().with_current_span(true)),
        )
    } else {
        tracing::subscriber::set_global_default(registry.with(fmt::layer().with_target(true)))
    };

    if let Err(e) = result {
        eprintln!("tracing subscriber init: {e}");
    }
}
