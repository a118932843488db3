use core::time::Duration;

use crate::pool::{self, Nameserver};

/// Seam for platform-specific nameserver autodiscovery (e.g. parsing
/// `/etc/resolv.conf` or reading the Windows registry). Out of scope for
/// this crate to implement, but kept pluggable rather than left unwired.
/// `Send + Sync` so a [`ResolverConfig`] can be shared across the tasks
/// [`crate::callback::resolve_with_callback`] spawns lookups onto.
pub trait NameserverSource: Send + Sync {
	fn nameservers(&self) -> Vec<Nameserver>;
}

/// The default source: contributes nothing, so `get_nameservers_from_os`
/// is a no-op until a caller supplies a real platform implementation.
pub struct NoOsNameservers;

impl NameserverSource for NoOsNameservers {
	fn nameservers(&self) -> Vec<Nameserver> {
		Vec::new()
	}
}

/// Configuration for a [`crate::engine::Resolver`].
pub struct ResolverConfig {
	get_nameservers_from_os: bool,
	nameserver: String,
	debug: bool,
	timeout_connect: Duration,
	os_source: Box<dyn NameserverSource>,
}

impl Default for ResolverConfig {
	fn default() -> Self {
		Self {
			get_nameservers_from_os: false,
			nameserver: String::new(),
			debug: false,
			timeout_connect: Duration::from_secs(65535),
			os_source: Box::new(NoOsNameservers),
		}
	}
}

impl ResolverConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get_nameservers_from_os(mut self, enabled: bool) -> Self {
		self.get_nameservers_from_os = enabled;
		self
	}

	/// Sets the `;`-delimited nameserver list (each entry `host` or
	/// `host:port`).
	pub fn nameserver(mut self, nameserver: impl Into<String>) -> Self {
		self.nameserver = nameserver.into();
		self
	}

	pub fn debug(mut self, enabled: bool) -> Self {
		self.debug = enabled;
		self
	}

	pub fn timeout_connect(mut self, timeout: Duration) -> Self {
		self.timeout_connect = timeout;
		self
	}

	pub fn os_source(mut self, source: impl NameserverSource + 'static) -> Self {
		self.os_source = Box::new(source);
		self
	}

	pub fn is_debug(&self) -> bool {
		self.debug
	}

	pub fn connect_timeout(&self) -> Duration {
		self.timeout_connect
	}

	/// Resolves the effective, deduplicated server pool: configured
	/// servers first, then OS-discovered ones if enabled.
	pub fn effective_servers(&self) -> Vec<Nameserver> {
		let configured = pool::parse_nameserver_string(&self.nameserver);

		if self.get_nameservers_from_os {
			pool::merge(configured, self.os_source.nameservers())
		} else {
			configured
		}
	}
}
