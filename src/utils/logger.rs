use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directives used when `RUST_LOG` is unset. A config-file `level` wins over `verbose`.
fn default_directives(level: Option<&str>, verbose: bool) -> String {
    match level {
        Some(level) => format!("budget_sankey={},info", level),
        None if verbose => "budget_sankey=debug,info".to_string(),
        None => "budget_sankey=info".to_string(),
    }
}

fn build_filter(level: Option<&str>, verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level, verbose)))
}

fn init_compact(filter: EnvFilter) {
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

fn init_json(filter: EnvFilter) {
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}

pub fn init_cli_logger(verbose: bool) {
    init_compact(build_filter(None, verbose));
}

/// JSON lines for log collectors; same filter rules as the CLI logger.
pub fn init_json_logger(verbose: bool) {
    init_json(build_filter(None, verbose));
}

/// `log_level` from a config file wins over `--verbose`, `RUST_LOG` wins over both.
pub fn init_with_level(level: Option<&str>, verbose: bool, json: bool) {
    let filter = build_filter(level, verbose);
    if json {
        init_json(filter);
    } else {
        init_compact(filter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_level_wins_over_verbose() {
        assert_eq!(default_directives(Some("warn"), true), "budget_sankey=warn,info");
        assert_eq!(default_directives(None, true), "budget_sankey=debug,info");
        assert_eq!(default_directives(None, false), "budget_sankey=info");
    }

    #[test]
    fn test_config_level_leaves_environment_untouched() {
        let before = std::env::var("RUST_LOG").ok();
        let _filter = build_filter(Some("trace"), false);
        assert_eq!(std::env::var("RUST_LOG").ok(), before);
    }
}
