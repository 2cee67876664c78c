//! ログ初期化
//!
//! `RUST_LOG` があればそれを優先し、なければ `--verbose` で debug まで出す。

use tracing_subscriber::EnvFilter;

pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("warn,photo_deck=debug,photo_deck_common=debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    // テストなどで二重に初期化された場合は無視
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
