//! Logging for the pkgbuild CLI.
//!
//! Logs go to stderr so that command output on stdout stays valid JSON.
//!
//! ```rust,no_run
//! use pkgbuild_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("Building release bundle...");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter for `--verbose`.
pub const VERBOSE_FILTER: &str = "pkgbuild_core=debug,pkgbuild_config=debug,pkgbuild_bundler=debug,pkgbuild_targets=debug,pkgbuild_cli=debug";

/// Filter for `--quiet`.
pub const QUIET_FILTER: &str = "error";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "pkgbuild_core=info,pkgbuild_config=info,pkgbuild_bundler=info,pkgbuild_targets=info,pkgbuild_cli=info";

/// Initialize the global subscriber. Call once, before any logging.
///
/// Level selection, first match wins:
/// 1. `--verbose`: debug for the pkgbuild crates
/// 2. `--quiet`: errors only
/// 3. `RUST_LOG`
/// 4. info for the pkgbuild crates
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = select_filter(verbose, quiet);
    let ansi = !no_color && should_use_colors();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(ansi)
        .without_time()
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn select_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Whether stderr should get ANSI colors.
///
/// `NO_COLOR` disables and `FORCE_COLOR` forces colors; otherwise the
/// terminal decides.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::Term::stderr().features().colors_supported()
}
