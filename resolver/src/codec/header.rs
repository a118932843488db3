use bilge::prelude::*;
use utils::bytes::Cast;
use utils::endian::{u16be, u32be, BigEndian};

pub const CLASS_IN: u16 = 1;

/// The six record types this resolver understands on the wire. Anything
/// else decodes to [`RecordType::Other`] rather than failing the whole
/// message (see [`crate::codec::response`]).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecordType {
	A,
	Ns,
	Cname,
	Ptr,
	Mx,
	Txt,
	Other(u16),
}

impl RecordType {
	pub fn to_wire(self) -> u16 {
		match self {
			Self::A => 1,
			Self::Ns => 2,
			Self::Cname => 5,
			Self::Ptr => 12,
			Self::Mx => 15,
			Self::Txt => 16,
			Self::Other(ty) => ty,
		}
	}

	pub fn from_wire(ty: u16) -> Self {
		match ty {
			1 => Self::A,
			2 => Self::Ns,
			5 => Self::Cname,
			12 => Self::Ptr,
			15 => Self::Mx,
			16 => Self::Txt,
			other => Self::Other(other),
		}
	}
}

#[bitsize(4)]
#[derive(Clone, Copy, Debug, FromBits)]
pub enum Opcode {
	Query = 0,
	IQuery = 1,
	Status = 2,
	#[fallback]
	Reserved,
}

#[bitsize(4)]
#[derive(Clone, Copy, Debug, FromBits)]
pub enum Rcode {
	Ok = 0,
	FormatErr = 1,
	ServerFailure = 2,
	NameErr = 3,
	NotImplemented = 4,
	Refused = 5,
	#[fallback]
	Reserved,
}

/// The 16 flag/opcode/rcode bits of a DNS header, laid out exactly as RFC
/// 1035 §4.1.1 (least-significant bit first as written by `bilge`).
#[bitsize(16)]
#[derive(FromBits)]
pub struct Flags {
	pub rcode: Rcode,
	pub z: u3,
	pub ra: bool,
	pub rd: bool,
	pub tc: bool,
	pub aa: bool,
	pub opcode: Opcode,
	pub qr: bool,
}

impl Flags {
	pub fn query() -> Self {
		Self::new(Rcode::Ok, u3::new(0), false, true, false, false, Opcode::Query, false)
	}
}

/// The fixed 12-byte header prefix of every DNS message.
///
/// All multi-byte fields use the packed big-endian wrapper types so this
/// struct has alignment 1 and can be cast directly out of a message buffer
/// regardless of where that buffer happens to start.
#[derive(Cast)]
#[repr(C)]
pub struct Header {
	pub id: u16be,
	pub flags: BigEndian<Flags>,
	pub qdcount: u16be,
	pub ancount: u16be,
	pub nscount: u16be,
	pub arcount: u16be,
}

/// The fixed type/class/ttl/rdlength prefix that follows an RR's owner
/// name. Same alignment-1 reasoning as [`Header`]: it is cast at whatever
/// offset follows a variable-length name.
#[derive(Cast)]
#[repr(C)]
pub struct RrPrefix {
	pub ty: u16be,
	pub class: u16be,
	pub ttl: u32be,
	pub rdlength: u16be,
}
