use std::net::Ipv4Addr;

use futures_util::future::join_all;
use log::debug;

use crate::codec::{RData, RecordType};
use crate::engine::Resolver;
use crate::error::ResolveError;
use crate::name::Name;

impl Resolver {
	/// Reverse-DNS: looks up PTR records for `addr`, then forward-confirms
	/// each candidate hostname with a parallel A lookup, keeping only the
	/// hostnames whose A answer set actually contains `addr`.
	pub async fn reverse_lookup(&self, addr: Ipv4Addr) -> Result<Option<Vec<String>>, ResolveError> {
		let ptr_name = Name::reverse_ipv4(addr);

		let candidates = match self.resolve(&ptr_name, RecordType::Ptr).await? {
			Some(records) => records,
			None => return Ok(None),
		};

		let hostnames: Vec<Name> = candidates
			.into_iter()
			.filter_map(|rdata| match rdata {
				RData::Ptr(name) => Some(name),
				_ => None,
			})
			.collect();

		let confirmations = join_all(hostnames.iter().map(|name| async move {
			match self.resolve(name, RecordType::A).await {
				Ok(Some(records)) => records.iter().any(|r| matches!(r, RData::A(got) if *got == addr)),
				Ok(None) => false,
				Err(e) => {
					debug!("forward confirmation of {name} failed, treating as unconfirmed: {e}");
					false
				}
			}
		}))
		.await;

		let confirmed: Vec<String> = hostnames
			.into_iter()
			.zip(confirmations)
			.filter_map(|(name, confirmed)| confirmed.then(|| name.to_string()))
			.collect();

		if confirmed.is_empty() {
			Ok(None)
		} else {
			Ok(Some(confirmed))
		}
	}
}
