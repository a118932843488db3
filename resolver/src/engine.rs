use log::{debug, info, warn};

use crate::codec::{decode_message, encode_query, Message, Rcode, RData, RecordType, Rr};
use crate::config::ResolverConfig;
use crate::error::ResolveError;
use crate::name::Name;
use crate::pool::{Nameserver, ServerPool};
use crate::transport;

/// Bound on NS-referral hops per top-level lookup attempt, independent of
/// how many servers in the pool get tried.
const MAX_REFERRAL_HOPS: u32 = 10;

/// A stub/iterative DNS resolver: server failover wraps hop-bounded
/// NS-referral recursion.
pub struct Resolver {
	config: ResolverConfig,
}

impl Resolver {
	pub fn new(config: ResolverConfig) -> Self {
		Self { config }
	}

	/// Resolves `qname` for `qtype` against the configured server pool.
	///
	/// Returns `Ok(None)` for an authoritative "this name does not exist"
	/// answer (NXDOMAIN) and for a referral chain that terminates without
	/// either an answer or a further referral. Any other failure to reach
	/// a definitive answer is `Err`.
	pub async fn resolve(&self, qname: &Name, qtype: RecordType) -> Result<Option<Vec<RData>>, ResolveError> {
		let servers = self.config.effective_servers();

		if servers.is_empty() {
			return Err(ResolveError::NoServerAlive);
		}

		let pool = ServerPool::new(&servers);
		self.resolve_via_pool(&pool, qname, qtype).await
	}

	async fn resolve_via_pool(&self, pool: &ServerPool, qname: &Name, qtype: RecordType) -> Result<Option<Vec<RData>>, ResolveError> {
		// With only one server in the pool there is no failover to consume a
		// transport failure into: spec.md §7 surfaces ConnectionRefused/
		// Timeout/ServerError to the caller directly in that case, rather
		// than collapsing it to NoServerAlive once the pool is exhausted.
		let single_server = pool.len() == 1;

		loop {
			let server = pool.pick().ok_or(ResolveError::NoServerAlive)?.clone();

			match self.query_with_referrals(&server, qname, qtype).await {
				Ok(result) => return Ok(result),
				Err(e) if e.is_transport_failure() => {
					if single_server {
						return Err(e);
					}

					warn!("{server:?} failed ({e}), failing over to the next server");
					pool.mark_dead(&server);
				}
				Err(e) => return Err(e),
			}
		}
	}

	/// Follows NS referrals starting from `server`, up to
	/// [`MAX_REFERRAL_HOPS`]. A transport failure partway through a
	/// referral chain is surfaced to the caller as-is (it still carries
	/// the specific server that failed) so [`resolve_via_pool`] can decide
	/// whether to fail over.
	async fn query_with_referrals(&self, server: &Nameserver, qname: &Name, qtype: RecordType) -> Result<Option<Vec<RData>>, ResolveError> {
		let mut current = server.clone();
		let mut hops = 0u32;

		loop {
			let msg = self.query_one(&current, qname, qtype).await?;

			match msg.rcode {
				Rcode::Ok => {}
				Rcode::NameErr => return Ok(None),
				other => return Err(ResolveError::InvalidResponse(format!("server returned rcode {other:?}"))),
			}

			let mut results = Vec::new();

			for rr in msg.answers {
				match &rr.data {
					// Only a genuinely unrecognized wire type is "not in the
					// supported set" per spec.md §7; a recognized type that
					// simply isn't what was asked for is ignored, not fatal.
					RData::Other(ty) => return Err(ResolveError::InvalidResponse(format!("unsupported record type {ty} in answer for {qname}"))),
					RData::Cname(_) if qtype != RecordType::Cname => {
						debug!("skipping CNAME for {qname}, chains are not followed");
					}
					data if data.record_type() == qtype => results.push(rr.data),
					data => debug!("ignoring unrelated {:?} record in answer for {qname}", data.record_type()),
				}
			}

			if !results.is_empty() {
				let results = if qtype == RecordType::Mx { join_mx_glue(results, &msg.additionals) } else { results };

				return Ok(Some(results));
			}

			// A referring NS whose rdata names the server we just asked would
			// recurse forever; spec.md §4.4 requires the rdata to differ from
			// the server just queried, so self-referrals are treated as "no
			// referral" rather than followed.
			let referral = msg
				.authorities
				.into_iter()
				.find_map(|rr| match rr.data { RData::Ns(name) => Some(name), _ => None }.filter(|name| !name.to_string().eq_ignore_ascii_case(&current.host)));

			let Some(ns_name) = referral else {
				return Ok(None);
			};

			hops += 1;
			if hops > MAX_REFERRAL_HOPS {
				return Err(ResolveError::TooManyHops);
			}

			// spec.md doesn't specify a port for the referred server; absent
			// any other information, assume it answers on the same port the
			// server that issued the referral did (the same assumption
			// `pool::DEFAULT_PORT` makes for any configured server whose port
			// isn't stated explicitly).
			info!("following NS referral to {ns_name} for {qname} (hop {hops})");
			current = Nameserver { host: ns_name.to_string(), port: current.port };
		}
	}

	async fn query_one(&self, server: &Nameserver, qname: &Name, qtype: RecordType) -> Result<Message, ResolveError> {
		let query = encode_query(0, qname, qtype);
		let label = format!("{}:{}", server.host, server.port);

		let raw = transport::send_and_read(&server.host, server.port, &query, self.config.connect_timeout(), &label).await?;

		decode_message(&raw[2..])
	}
}

/// Fills in each MX result's `address` from the response's Additional
/// section: any A record whose owner name matches the MX's `host`,
/// case-insensitively, per spec.md §4.4's glue-join rule. Left `None` when
/// no matching glue A record is present.
fn join_mx_glue(results: Vec<RData>, additionals: &[Rr]) -> Vec<RData> {
	results
		.into_iter()
		.map(|rdata| match rdata {
			RData::Mx { preference, host, address: _ } => {
				let matching: Vec<_> = additionals
					.iter()
					.filter_map(|rr| match &rr.data {
						RData::A(addr) if rr.name == host => Some(*addr),
						_ => None,
					})
					.collect();

				let address = if matching.is_empty() { None } else { Some(matching) };

				RData::Mx { preference, host, address }
			}
			other => other,
		})
		.collect()
}
