/// Re-export `Config` from `panopticon-core` for use within this crate.
///
/// All environment-variable parsing lives in `panopticon-core` so it can be
/// shared with integration tests without depending on the full server.
pub use panopticon_core::config::Config;
