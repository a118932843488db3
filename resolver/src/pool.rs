use std::cell::Cell;

const DEFAULT_PORT: u16 = 53;

/// One configured or discovered nameserver.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Nameserver {
	pub host: String,
	pub port: u16,
}

impl Nameserver {
	fn parse(entry: &str) -> Option<Self> {
		let entry = entry.trim();

		if entry.is_empty() {
			return None;
		}

		match entry.rsplit_once(':') {
			Some((host, port)) if !host.is_empty() => port.parse().ok().map(|port| Self { host: host.to_string(), port }),
			_ => Some(Self { host: entry.to_string(), port: DEFAULT_PORT }),
		}
	}
}

/// Parses the `;`-delimited `nameserver` configuration string into an
/// ordered list of servers deduplicated by host (spec.md §4.3), keeping the
/// first occurrence. Entries may be `host` (implying port 53) or
/// `host:port`; blank entries are skipped.
pub fn parse_nameserver_string(s: &str) -> Vec<Nameserver> {
	let mut seen = Vec::new();

	for entry in s.split(';') {
		if let Some(ns) = Nameserver::parse(entry) {
			if !seen.iter().any(|s: &Nameserver| s.host.eq_ignore_ascii_case(&ns.host)) {
				seen.push(ns);
			}
		}
	}

	seen
}

/// Merges user-configured servers with OS-discovered ones, preserving
/// declaration order and keeping only the first occurrence of each host
/// (spec.md §4.3: "deduplicated by host (preserving first occurrence)").
pub fn merge(configured: Vec<Nameserver>, discovered: Vec<Nameserver>) -> Vec<Nameserver> {
	let mut merged = configured;

	for ns in discovered {
		if !merged.iter().any(|s| s.host.eq_ignore_ascii_case(&ns.host)) {
			merged.push(ns);
		}
	}

	merged
}

/// A snapshot of the server pool for a single lookup. Liveness is tracked
/// per-lookup (not shared across concurrent lookups) so one lookup marking
/// a server dead can't wrongly poison another.
pub struct ServerPool {
	servers: Vec<(Nameserver, Cell<bool>)>,
}

impl ServerPool {
	pub fn new(servers: &[Nameserver]) -> Self {
		Self { servers: servers.iter().cloned().map(|ns| (ns, Cell::new(true))).collect() }
	}

	/// Returns the next server still marked alive, in declaration order.
	pub fn pick(&self) -> Option<&Nameserver> {
		self.servers.iter().find(|(_, alive)| alive.get()).map(|(ns, _)| ns)
	}

	/// Number of servers in the effective pool, regardless of liveness.
	pub fn len(&self) -> usize {
		self.servers.len()
	}

	pub fn mark_dead(&self, ns: &Nameserver) {
		if let Some((_, alive)) = self.servers.iter().find(|(s, _)| s == ns) {
			alive.set(false);
		}
	}

	pub fn is_empty(&self) -> bool {
		self.servers.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_semicolon_delimited_hosts_and_ports() {
		let servers = parse_nameserver_string("1.1.1.1;8.8.8.8:5353; ;9.9.9.9 ");

		assert_eq!(
			servers,
			vec![
				Nameserver { host: "1.1.1.1".into(), port: 53 },
				Nameserver { host: "8.8.8.8".into(), port: 5353 },
				Nameserver { host: "9.9.9.9".into(), port: 53 },
			]
		);
	}

	#[test]
	fn dedups_by_host_keeping_first_port() {
		let servers = parse_nameserver_string("1.1.1.1:5353;1.1.1.1;1.1.1.1:53");
		assert_eq!(servers, vec![Nameserver { host: "1.1.1.1".into(), port: 5353 }]);
	}

	#[test]
	fn merge_dedups_discovered_servers_by_host() {
		let configured = parse_nameserver_string("1.1.1.1:5353");
		let discovered = vec![Nameserver { host: "1.1.1.1".into(), port: 53 }, Nameserver { host: "8.8.8.8".into(), port: 53 }];

		let merged = merge(configured, discovered);

		assert_eq!(merged, vec![Nameserver { host: "1.1.1.1".into(), port: 5353 }, Nameserver { host: "8.8.8.8".into(), port: 53 }]);
	}

	#[test]
	fn pool_picks_next_alive_in_order() {
		let servers = parse_nameserver_string("1.1.1.1;8.8.8.8;9.9.9.9");
		let pool = ServerPool::new(&servers);

		assert_eq!(pool.pick().unwrap().host, "1.1.1.1");

		pool.mark_dead(&servers[0]);
		assert_eq!(pool.pick().unwrap().host, "8.8.8.8");

		pool.mark_dead(&servers[1]);
		pool.mark_dead(&servers[2]);
		assert!(pool.pick().is_none());
	}
}
