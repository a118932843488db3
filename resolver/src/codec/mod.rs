//! DNS wire format: message header, query construction, response parsing.

mod header;
mod query;
mod response;

pub use header::{Rcode, RecordType, CLASS_IN};
pub use query::encode_query;
pub use response::{decode_message, Message, RData, Rr};
