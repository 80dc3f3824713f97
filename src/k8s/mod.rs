pub mod client;
pub mod cluster;
pub mod endpoints;
pub mod proxy;
pub mod utils;
pub mod versions;

/// Default user agent for `dashproxy` - automatically uses the package version
///
/// Can be overridden with `--user-agent` / `DASHPROXY_USER_AGENT`.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
