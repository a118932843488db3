use core::mem::size_of;
use std::net::Ipv4Addr;

use utils::bytes::cast;

use super::header::{Header, Rcode, RecordType, RrPrefix};
use crate::error::ResolveError;
use crate::name::Name;

/// Bound on name-compression pointer hops per name, guarding against
/// pointer loops in a hostile or corrupt response.
const MAX_POINTER_HOPS: u32 = 20;
/// Bound on RR counts per section, guarding against a header claiming an
/// absurd number of records relative to the message actually received.
const MAX_SECTION_RRS: u16 = 128;
/// Bound on the number of `<len><bytes>` fragments read out of a single
/// TXT RR's RDATA, independent of RDLENGTH.
const MAX_TXT_FRAGMENTS: u32 = 10;

#[derive(Clone, Debug)]
pub struct Rr {
	pub name: Name,
	pub class: u16,
	pub ttl: u32,
	pub data: RData,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RData {
	A(Ipv4Addr),
	Ns(Name),
	Cname(Name),
	Ptr(Name),
	/// `address` is filled in by [`crate::engine`] from the response's
	/// Additional section (glue A records matching `host`), not by the
	/// codec itself: the codec only ever sees one RR at a time and has no
	/// access to the rest of the message's sections while decoding this one.
	Mx { preference: u16, host: Name, address: Option<Vec<Ipv4Addr>> },
	Txt(Vec<u8>),
	/// An RR type this resolver doesn't interpret. Only ever produced for
	/// authority/additional records; an unrecognized answer record is a
	/// hard [`ResolveError::InvalidResponse`] instead (see
	/// [`decode_message`]).
	Other(u16),
}

impl RData {
	pub fn record_type(&self) -> RecordType {
		match self {
			Self::A(_) => RecordType::A,
			Self::Ns(_) => RecordType::Ns,
			Self::Cname(_) => RecordType::Cname,
			Self::Ptr(_) => RecordType::Ptr,
			Self::Mx { .. } => RecordType::Mx,
			Self::Txt(_) => RecordType::Txt,
			Self::Other(ty) => RecordType::Other(*ty),
		}
	}
}

#[derive(Debug)]
pub struct Message {
	pub id: u16,
	pub rcode: Rcode,
	pub answers: Vec<Rr>,
	pub authorities: Vec<Rr>,
	pub additionals: Vec<Rr>,
}

/// A cursor over a full response message, able to jump backwards to follow
/// name-compression pointers while still tracking where parsing should
/// resume in the original sequential stream.
struct Reader<'a> {
	buf: &'a [u8],
	pos: usize,
}

impl<'a> Reader<'a> {
	fn invalid(msg: impl Into<String>) -> ResolveError {
		ResolveError::InvalidResponse(msg.into())
	}

	fn read_u8(&mut self) -> Result<u8, ResolveError> {
		let b = *self.buf.get(self.pos).ok_or_else(|| Self::invalid("unexpected end of message"))?;
		self.pos += 1;
		Ok(b)
	}

	fn read_u16(&mut self) -> Result<u16, ResolveError> {
		let bytes = self.read_bytes(2)?;
		Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
	}

	fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], ResolveError> {
		let end = self.pos.checked_add(n).ok_or_else(|| Self::invalid("length overflow"))?;
		let bytes = self.buf.get(self.pos..end).ok_or_else(|| Self::invalid("unexpected end of message"))?;
		self.pos = end;
		Ok(bytes)
	}

	fn read_rr_prefix(&mut self) -> Result<&'a RrPrefix, ResolveError> {
		let bytes = self.read_bytes(size_of::<RrPrefix>())?;
		Ok(cast::<RrPrefix, [u8]>(bytes))
	}

	/// Decodes a name starting at the current position, following
	/// compression pointers (RFC 1035 §4.1.4) against the full message
	/// buffer. Leaves `pos` just past the first pointer (or the root
	/// label, if no pointer was followed) in the *original* stream,
	/// regardless of how many jumps were taken to resolve the name.
	fn read_name(&mut self) -> Result<Name, ResolveError> {
		let mut labels = Vec::new();
		let mut cur = self.pos;
		let mut resume_at = None;
		let mut hops = 0u32;

		loop {
			let len = *self.buf.get(cur).ok_or_else(|| Self::invalid("name runs past end of message"))?;

			match len >> 6 {
				0b00 if len == 0 => {
					if resume_at.is_none() {
						resume_at = Some(cur + 1);
					}
					break;
				}
				0b00 => {
					let start = cur + 1;
					let end = start.checked_add(len as usize).ok_or_else(|| Self::invalid("label length overflow"))?;
					let label = self.buf.get(start..end).ok_or_else(|| Self::invalid("label runs past end of message"))?;

					labels.push(Box::from(label));
					cur = end;
				}
				0b11 => {
					let lo = *self.buf.get(cur + 1).ok_or_else(|| Self::invalid("truncated compression pointer"))?;

					if resume_at.is_none() {
						resume_at = Some(cur + 2);
					}

					hops += 1;
					if hops > MAX_POINTER_HOPS {
						return Err(Self::invalid("too many name compression pointer hops"));
					}

					cur = (((len as usize) & 0x3f) << 8) | lo as usize;
				}
				_ => return Err(Self::invalid("reserved label length bits set")),
			}
		}

		self.pos = resume_at.expect("loop only breaks after setting resume_at");

		Name::from_labels(labels)
	}

	fn read_rr(&mut self) -> Result<Rr, ResolveError> {
		let name = self.read_name()?;
		let prefix = self.read_rr_prefix()?;

		let ty = RecordType::from_wire(prefix.ty.get());
		let class = prefix.class.get();
		let ttl = prefix.ttl.get();
		let rdlength = prefix.rdlength.get() as usize;

		let rdata_start = self.pos;
		let rdata_end = rdata_start.checked_add(rdlength).ok_or_else(|| Self::invalid("rdlength overflow"))?;

		if rdata_end > self.buf.len() {
			return Err(Self::invalid("rdlength runs past end of message"));
		}

		let data = match ty {
			RecordType::A => {
				if rdlength != 4 {
					return Err(Self::invalid("A record rdata is not 4 bytes"));
				}

				let b = self.read_bytes(4)?;
				RData::A(Ipv4Addr::new(b[0], b[1], b[2], b[3]))
			}
			RecordType::Ns => RData::Ns(self.read_name()?),
			RecordType::Cname => RData::Cname(self.read_name()?),
			RecordType::Ptr => RData::Ptr(self.read_name()?),
			RecordType::Mx => {
				let preference = self.read_u16()?;
				let host = self.read_name()?;

				RData::Mx { preference, host, address: None }
			}
			RecordType::Txt => {
				let mut out = Vec::new();
				let mut fragments = 0u32;

				while self.pos < rdata_end {
					fragments += 1;
					if fragments > MAX_TXT_FRAGMENTS {
						return Err(Self::invalid("TXT record has too many fragments"));
					}

					let len = self.read_u8()? as usize;
					let frag_end = self.pos.checked_add(len).ok_or_else(|| Self::invalid("TXT fragment length overflow"))?;

					if frag_end > rdata_end {
						return Err(Self::invalid("TXT fragment runs past RDLENGTH"));
					}

					out.extend_from_slice(self.read_bytes(len)?);
				}

				RData::Txt(out)
			}
			RecordType::Other(code) => RData::Other(code),
		};

		// Names embedded in rdata (NS/CNAME/PTR/MX) may themselves follow
		// compression pointers that land anywhere in the message; pin the
		// cursor back to the declared rdata boundary rather than trust
		// wherever the name decode left it.
		self.pos = rdata_end;

		Ok(Rr { name, class, ttl, data })
	}
}

/// Decodes a full DNS message (minus the 2-byte TCP length prefix, which
/// the transport layer already consumed).
pub fn decode_message(buf: &[u8]) -> Result<Message, ResolveError> {
	if buf.len() < size_of::<Header>() {
		return Err(ResolveError::InvalidResponse("message shorter than header".into()));
	}

	let header = cast::<Header, [u8]>(&buf[..size_of::<Header>()]);

	let id = header.id.get();
	let flags = header.flags.get();

	if !flags.qr() {
		return Err(ResolveError::InvalidResponse("message is not marked as a response".into()));
	}

	let qdcount = header.qdcount.get();
	if qdcount != 1 {
		return Err(ResolveError::InvalidResponse(format!("qdcount {qdcount} != 1")));
	}

	let ancount = header.ancount.get();
	let nscount = header.nscount.get();
	let arcount = header.arcount.get();

	for (label, count) in [("answer", ancount), ("authority", nscount), ("additional", arcount)] {
		if count > MAX_SECTION_RRS {
			return Err(ResolveError::InvalidResponse(format!("{label} section has {count} RRs, exceeding the bound")));
		}
	}

	let mut r = Reader { buf, pos: size_of::<Header>() };

	// Skip the question section: name, then QTYPE and QCLASS.
	r.read_name()?;
	r.read_bytes(4)?;

	let answers = (0..ancount).map(|_| r.read_rr()).collect::<Result<Vec<_>, _>>()?;
	let authorities = (0..nscount).map(|_| r.read_rr()).collect::<Result<Vec<_>, _>>()?;
	let additionals = (0..arcount).map(|_| r.read_rr()).collect::<Result<Vec<_>, _>>()?;

	Ok(Message { id, rcode: flags.rcode(), answers, authorities, additionals })
}
