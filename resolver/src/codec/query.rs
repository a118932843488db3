use core::mem::size_of;

use collections::bytes::Cursor;
use utils::endian::u16be;

use super::header::{Flags, Header, RecordType, CLASS_IN};
use crate::name::Name;

/// Encodes a single question into a length-prefixed TCP DNS message.
///
/// `id` is carried opaquely; since each TCP connection this resolver opens
/// carries exactly one query, its value only needs to be echoed back by the
/// server, not disambiguate concurrent in-flight queries.
pub fn encode_query(id: u16, qname: &Name, qtype: RecordType) -> Vec<u8> {
	let name_len: usize = qname.labels().iter().map(|l| l.len() + 1).sum::<usize>() + 1;
	let mut body = vec![0u8; size_of::<Header>() + name_len + 4];

	Cursor::vec(&mut body, |buf| {
		let (header, mut buf): (&mut Header, _) = buf.split();

		header.id = id.into();
		header.flags = Flags::query().into();
		header.qdcount = 1u16.into();
		header.ancount = 0u16.into();
		header.nscount = 0u16.into();
		header.arcount = 0u16.into();

		for label in qname.labels() {
			let len = label.len() as u8;
			buf = buf.push(&len);
			buf = buf.push(label.as_ref());
		}

		// Terminating root label.
		buf = buf.push(&0u8);

		buf = buf.push(&u16be::from(qtype.to_wire()));
		buf.push(&u16be::from(CLASS_IN));
	});

	let mut framed = Vec::with_capacity(2 + body.len());
	framed.extend_from_slice(&(body.len() as u16).to_be_bytes());
	framed.extend_from_slice(&body);
	framed
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn framed_query_starts_with_tcp_length_prefix() {
		let name = Name::parse("example.com").unwrap();
		let framed = encode_query(0, &name, RecordType::A);

		let declared_len = u16::from_be_bytes([framed[0], framed[1]]) as usize;
		assert_eq!(declared_len, framed.len() - 2);
	}

	#[test]
	fn question_name_round_trips_as_labels() {
		let name = Name::parse("example.com").unwrap();
		let framed = encode_query(0, &name, RecordType::A);

		// Header is 12 bytes; the 2-byte length prefix precedes it.
		let body = &framed[2..];
		let qd = &body[12..];

		assert_eq!(qd[0], 7);
		assert_eq!(&qd[1..8], b"example");
		assert_eq!(qd[8], 3);
		assert_eq!(&qd[9..12], b"com");
		assert_eq!(qd[12], 0);
	}
}
