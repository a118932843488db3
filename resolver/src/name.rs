use std::fmt;

use crate::error::ResolveError;

/// Maximum encoded length of a name on the wire, including every length
/// octet and the terminating root label.
pub const MAX_NAME_LEN: usize = 255;
/// Maximum length of a single label.
pub const MAX_LABEL_LEN: usize = 63;

/// A DNS domain name: an ordered sequence of labels, compared
/// case-insensitively per RFC 1035 §3.1.
#[derive(Clone, Debug, Eq)]
pub struct Name {
	labels: Vec<Box<[u8]>>,
}

impl Name {
	/// Builds a name from `.`-separated ASCII labels (e.g. `"example.com"`).
	/// Trailing dots are tolerated and ignored.
	pub fn parse(s: &str) -> Result<Self, ResolveError> {
		let s = s.strip_suffix('.').unwrap_or(s);

		let mut labels = Vec::new();
		let mut encoded_len = 1; // root label

		if !s.is_empty() {
			for part in s.split('.') {
				let bytes = part.as_bytes();

				if bytes.is_empty() || bytes.len() > MAX_LABEL_LEN {
					return Err(ResolveError::InvalidResponse(format!("label {part:?} has invalid length")));
				}

				encoded_len += bytes.len() + 1;
				labels.push(Box::from(bytes));
			}
		}

		if encoded_len > MAX_NAME_LEN {
			return Err(ResolveError::InvalidResponse(format!("name {s:?} exceeds {MAX_NAME_LEN} encoded bytes")));
		}

		Ok(Self { labels })
	}

	/// Builds a name directly from already-split label bytes, as produced
	/// by decoding a wire name. Re-validates the same length invariants
	/// [`Name::parse`] enforces, since the labels came off the network.
	pub(crate) fn from_labels(labels: Vec<Box<[u8]>>) -> Result<Self, ResolveError> {
		let mut encoded_len = 1;

		for label in &labels {
			if label.is_empty() || label.len() > MAX_LABEL_LEN {
				return Err(ResolveError::InvalidResponse(format!("label of length {} is invalid", label.len())));
			}

			encoded_len += label.len() + 1;
		}

		if encoded_len > MAX_NAME_LEN {
			return Err(ResolveError::InvalidResponse(format!("decoded name exceeds {MAX_NAME_LEN} encoded bytes")));
		}

		Ok(Self { labels })
	}

	/// Builds the reverse-lookup name `d.c.b.a.in-addr.arpa` for an IPv4
	/// address, per RFC 1035 §3.5.
	pub fn reverse_ipv4(addr: std::net::Ipv4Addr) -> Self {
		let [a, b, c, d] = addr.octets();

		Self::parse(&format!("{d}.{c}.{b}.{a}.in-addr.arpa")).expect("reverse name is always well-formed")
	}

	pub fn labels(&self) -> &[Box<[u8]>] {
		&self.labels
	}

	pub fn is_root(&self) -> bool {
		self.labels.is_empty()
	}
}

impl PartialEq for Name {
	fn eq(&self, other: &Self) -> bool {
		self.labels.len() == other.labels.len()
			&& self.labels.iter().zip(&other.labels).all(|(a, b)| a.eq_ignore_ascii_case(b))
	}
}

impl fmt::Display for Name {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_root() {
			return f.write_str(".");
		}

		for (i, label) in self.labels.iter().enumerate() {
			if i > 0 {
				f.write_str(".")?;
			}

			f.write_str(&String::from_utf8_lossy(label))?;
		}

		Ok(())
	}
}
