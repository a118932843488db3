//! Adapter reproducing spec.md §6's `callback(result, userdata, errorOpt)`
//! contract over the `async fn`-based [`crate::engine::Resolver`], for
//! callers migrating from a callback-oriented driver instead of `.await`.

use std::sync::Arc;

use tokio::runtime::Handle;

use crate::codec::{RData, RecordType};
use crate::engine::Resolver;
use crate::error::ResolveError;
use crate::name::Name;

/// Spawns `resolver.resolve(qname, qtype)` onto `rt` and invokes `callback`
/// with the same three-part `(result, userdata, errorOpt)` shape spec.md §6
/// specifies once it completes. `errorOpt` is `None` on success (with or
/// without data); `result` is `None` whenever `errorOpt` is `Some`, matching
/// the source contract where the two are mutually informative rather than
/// independent.
pub fn resolve_with_callback<U, F>(rt: &Handle, resolver: Arc<Resolver>, qname: Name, qtype: RecordType, userdata: U, callback: F)
where
	U: Send + 'static,
	F: FnOnce(Option<Vec<RData>>, U, Option<ResolveError>) + Send + 'static,
{
	rt.spawn(async move {
		match resolver.resolve(&qname, qtype).await {
			Ok(result) => callback(result, userdata, None),
			Err(e) => callback(None, userdata, Some(e)),
		}
	});
}

/// Reverse-DNS counterpart of [`resolve_with_callback`], wrapping
/// [`Resolver::reverse_lookup`] in the same callback contract.
pub fn reverse_lookup_with_callback<U, F>(rt: &Handle, resolver: Arc<Resolver>, addr: std::net::Ipv4Addr, userdata: U, callback: F)
where
	U: Send + 'static,
	F: FnOnce(Option<Vec<String>>, U, Option<ResolveError>) + Send + 'static,
{
	rt.spawn(async move {
		match resolver.reverse_lookup(addr).await {
			Ok(result) => callback(result, userdata, None),
			Err(e) => callback(None, userdata, Some(e)),
		}
	});
}
