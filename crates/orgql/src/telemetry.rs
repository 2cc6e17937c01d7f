use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber. Stdout is reserved for response output.
///
/// With no `-v` flags `RUST_LOG` decides, falling back to `warn`; any `-v`
/// sets the level explicitly.
pub fn init_tracing(verbosity: u8) {
    let env_filter = match level_for(verbosity) {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    // A subscriber may already be installed (tests); that one wins.
    let _ = subscriber.try_init();
}

fn level_for(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}
