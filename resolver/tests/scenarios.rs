//! End-to-end scenarios from spec.md §8, each driving a real resolver
//! lookup against one or more loopback TCP stub servers that speak the
//! framed wire protocol directly (no mocking of [`resolver`] internals).

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use resolver::codec::RData;
use resolver::{Name, Resolver, ResolverConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const CLASS_IN: u16 = 1;
const TYPE_A: u16 = 1;
const TYPE_NS: u16 = 2;
const TYPE_PTR: u16 = 12;
const TYPE_MX: u16 = 15;

fn label(name: &str) -> Vec<u8> {
	let mut out = Vec::new();

	for part in name.split('.') {
		out.push(part.len() as u8);
		out.extend_from_slice(part.as_bytes());
	}

	out.push(0);
	out
}

fn rr(name: &str, ty: u16, ttl: u32, rdata: &[u8]) -> Vec<u8> {
	let mut out = label(name);
	out.extend_from_slice(&ty.to_be_bytes());
	out.extend_from_slice(&CLASS_IN.to_be_bytes());
	out.extend_from_slice(&ttl.to_be_bytes());
	out.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
	out.extend_from_slice(rdata);
	out
}

/// Builds a complete framed (2-byte length prefix included) DNS response
/// answering a single question for `qname`/`qtype`.
fn response(qname: &str, qtype: u16, rcode: u8, answers: &[Vec<u8>], authorities: &[Vec<u8>], additionals: &[Vec<u8>]) -> Vec<u8> {
	let mut body = Vec::new();
	body.extend_from_slice(&0u16.to_be_bytes()); // id, always echoed as 0
	body.push(0x81); // QR=1, opcode=QUERY, AA=0, TC=0, RD=1
	body.push(rcode); // RA=0, Z=0, RCODE
	body.extend_from_slice(&1u16.to_be_bytes()); // qdcount
	body.extend_from_slice(&(answers.len() as u16).to_be_bytes());
	body.extend_from_slice(&(authorities.len() as u16).to_be_bytes());
	body.extend_from_slice(&(additionals.len() as u16).to_be_bytes());

	body.extend_from_slice(&label(qname));
	body.extend_from_slice(&qtype.to_be_bytes());
	body.extend_from_slice(&CLASS_IN.to_be_bytes());

	for section in [answers, authorities, additionals] {
		for record in section {
			body.extend_from_slice(record);
		}
	}

	let mut framed = Vec::with_capacity(2 + body.len());
	framed.extend_from_slice(&(body.len() as u16).to_be_bytes());
	framed.extend_from_slice(&body);
	framed
}

/// Reads one length-prefixed query off `stream` and returns just its QNAME,
/// decoded the same label-sequence way the production codec does, but
/// without pulling in `resolver::codec` internals (queries never carry
/// compression, so this doesn't need the pointer-following machinery).
async fn read_question_name(stream: &mut TcpStream) -> String {
	let mut len_buf = [0u8; 2];
	stream.read_exact(&mut len_buf).await.unwrap();
	let len = u16::from_be_bytes(len_buf) as usize;

	let mut body = vec![0u8; len];
	stream.read_exact(&mut body).await.unwrap();

	let mut pos = 12; // past the fixed header
	let mut labels = Vec::new();

	loop {
		let l = body[pos] as usize;
		pos += 1;

		if l == 0 {
			break;
		}

		labels.push(String::from_utf8_lossy(&body[pos..pos + l]).into_owned());
		pos += l;
	}

	labels.join(".")
}

async fn write_framed(stream: &mut TcpStream, framed: &[u8]) {
	stream.write_all(framed).await.unwrap();
}

/// Accepts exactly one connection on `listener`, reads its question (discarded),
/// writes back `canned`, and returns.
async fn serve_once(listener: TcpListener, canned: Vec<u8>) {
	let (mut stream, _) = listener.accept().await.unwrap();
	let _ = read_question_name(&mut stream).await;
	write_framed(&mut stream, &canned).await;
}

/// Accepts connections on `listener` forever (until dropped), answering each
/// based on its question name via `route`. Used where concurrent or
/// order-independent connections arrive (reverse-DNS forward confirmation).
async fn serve_routed(listener: TcpListener, route: Arc<dyn Fn(&str) -> Vec<u8> + Send + Sync>) {
	loop {
		let (mut stream, _) = match listener.accept().await {
			Ok(v) => v,
			Err(_) => return,
		};

		let route = route.clone();

		tokio::spawn(async move {
			let qname = read_question_name(&mut stream).await;
			write_framed(&mut stream, &route(&qname)).await;
		});
	}
}

fn test_config(nameserver: &str) -> ResolverConfig {
	ResolverConfig::new().nameserver(nameserver).timeout_connect(Duration::from_secs(2))
}

#[tokio::test]
async fn a_record_success() {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();

	let canned = response("www.example.com", TYPE_A, 0, &[rr("www.example.com", TYPE_A, 300, &[93, 184, 216, 34])], &[], &[]);
	let server = tokio::spawn(serve_once(listener, canned));

	let resolver = Resolver::new(test_config(&format!("127.0.0.1:{}", addr.port())));
	let qname = Name::parse("www.example.com").unwrap();

	let result = resolver.resolve(&qname, resolver::codec::RecordType::A).await.unwrap();
	server.await.unwrap();

	assert_eq!(result, Some(vec![RData::A("93.184.216.34".parse().unwrap())]));
}

#[tokio::test]
async fn unrelated_recognized_answer_record_is_ignored_not_fatal() {
	// An NS record alongside the requested A record is a recognized type
	// that simply isn't what was asked for; it must be skipped, not turn
	// the whole answer into InvalidResponse.
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();

	let canned = response(
		"www.example.com",
		TYPE_A,
		0,
		&[rr("www.example.com", TYPE_NS, 300, &label("ns1.example.com")), rr("www.example.com", TYPE_A, 300, &[93, 184, 216, 34])],
		&[],
		&[],
	);
	let server = tokio::spawn(serve_once(listener, canned));

	let resolver = Resolver::new(test_config(&format!("127.0.0.1:{}", addr.port())));
	let qname = Name::parse("www.example.com").unwrap();

	let result = resolver.resolve(&qname, resolver::codec::RecordType::A).await.unwrap();
	server.await.unwrap();

	assert_eq!(result, Some(vec![RData::A("93.184.216.34".parse().unwrap())]));
}

#[tokio::test]
async fn mx_with_glue() {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();

	let mut mx_rdata = 10u16.to_be_bytes().to_vec();
	mx_rdata.extend_from_slice(&label("mx.example.org"));

	let answer = rr("example.org", TYPE_MX, 300, &mx_rdata);
	let glue = rr("mx.example.org", TYPE_A, 300, &[1, 2, 3, 4]);

	let canned = response("example.org", TYPE_MX, 0, &[answer], &[], &[glue]);
	let server = tokio::spawn(serve_once(listener, canned));

	let resolver = Resolver::new(test_config(&format!("127.0.0.1:{}", addr.port())));
	let qname = Name::parse("example.org").unwrap();

	let result = resolver.resolve(&qname, resolver::codec::RecordType::Mx).await.unwrap();
	server.await.unwrap();

	match result {
		Some(records) => {
			assert_eq!(records.len(), 1);

			match &records[0] {
				RData::Mx { preference, host, address } => {
					assert_eq!(*preference, 10);
					assert_eq!(host.to_string(), "mx.example.org");
					assert_eq!(address.as_deref(), Some(["1.2.3.4".parse::<Ipv4Addr>().unwrap()].as_slice()));
				}
				other => panic!("expected an MX record, got {other:?}"),
			}
		}
		None => panic!("expected a result"),
	}
}

#[tokio::test]
async fn failover_to_next_server_on_connection_refused() {
	// Bind then immediately drop a listener: nothing answers at this port,
	// so connecting to it yields a real `ConnectionRefused`.
	let dead_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let dead_addr = dead_listener.local_addr().unwrap();
	drop(dead_listener);

	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();

	let canned = response("www.example.com", TYPE_A, 0, &[], &[], &[]);
	let server = tokio::spawn(serve_once(listener, canned));

	let nameserver = format!("127.0.0.1:{};127.0.0.1:{}", dead_addr.port(), addr.port());
	let resolver = Resolver::new(test_config(&nameserver));
	let qname = Name::parse("www.example.com").unwrap();

	let result = resolver.resolve(&qname, resolver::codec::RecordType::A).await.unwrap();
	server.await.unwrap();

	assert_eq!(result, None);
}

#[tokio::test]
async fn single_server_connection_refused_is_surfaced_directly() {
	// With exactly one server in the pool there's nothing left to fail over
	// to, so the refusal itself must reach the caller instead of collapsing
	// to NoServerAlive.
	let dead_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let dead_addr = dead_listener.local_addr().unwrap();
	drop(dead_listener);

	let resolver = Resolver::new(test_config(&format!("127.0.0.1:{}", dead_addr.port())));
	let qname = Name::parse("www.example.com").unwrap();

	let err = resolver.resolve(&qname, resolver::codec::RecordType::A).await.unwrap_err();

	assert!(matches!(err, resolver::ResolveError::ConnectionRefused { .. }), "expected ConnectionRefused, got {err:?}");
}

#[tokio::test]
async fn ns_referral_is_followed_to_the_designated_server() {
	// Bind on every interface so a client dialing any 127.0.0.x loopback
	// address lands on this one listener; lets the referral target a
	// distinct "host" without needing real DNS resolution.
	let listener = TcpListener::bind("0.0.0.0:0").await.unwrap();
	let port = listener.local_addr().unwrap().port();

	let referral = response("sub.example.com", TYPE_A, 0, &[], &[rr("sub.example.com", TYPE_NS, 300, &label("127.0.0.2"))], &[]);
	let answer = response("sub.example.com", TYPE_A, 0, &[rr("sub.example.com", TYPE_A, 300, &[5, 6, 7, 8])], &[], &[]);

	let server = tokio::spawn(async move {
		let (mut s1, _) = listener.accept().await.unwrap();
		let _ = read_question_name(&mut s1).await;
		write_framed(&mut s1, &referral).await;

		let (mut s2, _) = listener.accept().await.unwrap();
		let _ = read_question_name(&mut s2).await;
		write_framed(&mut s2, &answer).await;
	});

	let resolver = Resolver::new(test_config(&format!("127.0.0.1:{port}")));
	let qname = Name::parse("sub.example.com").unwrap();

	let result = resolver.resolve(&qname, resolver::codec::RecordType::A).await.unwrap();
	server.await.unwrap();

	assert_eq!(result, Some(vec![RData::A("5.6.7.8".parse().unwrap())]));
}

#[tokio::test]
async fn hop_exhaustion_fails_after_ten_referrals() {
	let listener = TcpListener::bind("0.0.0.0:0").await.unwrap();
	let port = listener.local_addr().unwrap().port();

	// 11 sequential connections, each referring to the next distinct
	// loopback address so the "differs from the server just queried"
	// check never treats a hop as a self-referral.
	let server = tokio::spawn(async move {
		for hop in 1..=11u8 {
			let next = format!("127.0.0.{}", hop + 1);
			let referral = response("deep.example.com", TYPE_A, 0, &[], &[rr("deep.example.com", TYPE_NS, 300, &label(&next))], &[]);

			let (mut stream, _) = listener.accept().await.unwrap();
			let _ = read_question_name(&mut stream).await;
			write_framed(&mut stream, &referral).await;
		}
	});

	let resolver = Resolver::new(test_config(&format!("127.0.0.1:{port}")));
	let qname = Name::parse("deep.example.com").unwrap();

	let err = resolver.resolve(&qname, resolver::codec::RecordType::A).await.unwrap_err();
	server.await.unwrap();

	assert!(matches!(err, resolver::ResolveError::TooManyHops));
}

#[tokio::test]
async fn reverse_dns_keeps_only_forward_confirmed_hosts() {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let port = listener.local_addr().unwrap().port();

	let addr: Ipv4Addr = "1.2.3.4".parse().unwrap();
	let ptr_name = Name::reverse_ipv4(addr).to_string();

	let ptr_response = response(&ptr_name, TYPE_PTR, 0, &[rr(&ptr_name, TYPE_PTR, 300, &label("host1.example")), rr(&ptr_name, TYPE_PTR, 300, &label("host2.example"))], &[], &[]);

	let route: Arc<dyn Fn(&str) -> Vec<u8> + Send + Sync> = Arc::new(move |qname: &str| {
		if qname == ptr_name {
			ptr_response.clone()
		} else if qname == "host1.example" {
			response("host1.example", TYPE_A, 0, &[rr("host1.example", TYPE_A, 300, &[1, 2, 3, 4])], &[], &[])
		} else if qname == "host2.example" {
			response("host2.example", TYPE_A, 0, &[rr("host2.example", TYPE_A, 300, &[9, 9, 9, 9])], &[], &[])
		} else {
			panic!("unexpected query for {qname}")
		}
	});

	let server = tokio::spawn(serve_routed(listener, route));

	let resolver = Resolver::new(test_config(&format!("127.0.0.1:{port}")));
	let result = resolver.reverse_lookup(addr).await.unwrap();

	server.abort();

	assert_eq!(result, Some(vec!["host1.example".to_string()]));
}
