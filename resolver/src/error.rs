use thiserror::Error;

/// Everything that can go wrong while resolving a name or address.
///
/// Variants map directly onto what a caller needs to act on: `NoServerAlive`
/// and `TooManyHops` are terminal regardless of which server produced them,
/// the rest carry the offending server so a caller can log or blocklist it.
#[derive(Debug, Error)]
pub enum ResolveError {
	/// Every server in the effective pool was already marked dead before this
	/// lookup could try any of them.
	#[error("no nameserver in the pool is alive")]
	NoServerAlive,

	/// The TCP connection to `server` was refused outright.
	#[error("connection to {server} was refused")]
	ConnectionRefused { server: String },

	/// Connecting to `server` did not complete within the configured timeout.
	#[error("connecting to {server} timed out")]
	Timeout { server: String },

	/// An I/O error occurred against `server` that wasn't a refusal or a
	/// connect timeout (e.g. network unreachable, reset after connect).
	#[error("I/O error talking to {server}: {source}")]
	ServerError {
		server: String,
		#[source]
		source: std::io::Error,
	},

	/// `server` closed the connection before a fully-framed message arrived.
	/// This is fatal to the whole lookup: a half-received stream is evidence
	/// of data already in flight, not evidence the server is unreachable.
	#[error("incomplete response from {server}")]
	IncompleteResponse { server: String },

	/// NS-referral recursion exceeded the hop bound without reaching an
	/// answer.
	#[error("too many NS referral hops")]
	TooManyHops,

	/// A response was well-framed but violated a wire invariant (bad
	/// qdcount, an RR count over the section bound, a name that failed to
	/// decode, an unexpected answer record type).
	#[error("invalid response: {0}")]
	InvalidResponse(String),
}

impl ResolveError {
	/// Whether this is a failure to reach a particular server (refused,
	/// timed out, or some other I/O error) that should mark it dead and
	/// fail over to the next server in the pool, as opposed to a failure
	/// that's fatal to the whole lookup.
	pub fn is_transport_failure(&self) -> bool {
		matches!(self, Self::ConnectionRefused { .. } | Self::Timeout { .. } | Self::ServerError { .. })
	}
}
