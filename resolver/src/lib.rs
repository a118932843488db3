//! A stub/iterative DNS-over-TCP resolver client: wire codec, framed
//! transport, server-pool failover, hop-bounded NS-referral recursion, and
//! a reverse-DNS (PTR + forward-confirmation) orchestrator built on top.

pub mod callback;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod name;
pub mod pool;
mod reverse;
pub mod transport;

pub use config::ResolverConfig;
pub use engine::Resolver;
pub use error::ResolveError;
pub use name::Name;

/// Installs the ambient stderr logger backing every `log::{trace,debug,
/// info,warn,error}!` call in `engine`/`transport`/`pool`, at `Debug` if
/// `config.is_debug()` else `Info`. A caller embedding this resolver is
/// expected to call this once (or install its own `log::Log` backend)
/// before constructing a [`Resolver`]; the library itself never installs a
/// global logger implicitly.
pub fn init_logging(config: &ResolverConfig) {
	let level = if config.is_debug() { log::LevelFilter::Debug } else { log::LevelFilter::Info };
	runtime::init(level);
}
