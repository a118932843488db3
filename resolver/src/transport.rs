use core::time::Duration;

use log::{debug, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::error::ResolveError;

/// Connects to `(host, port)`, writes the already-framed `query` (length
/// prefix included), and reads back one full length-prefixed message.
///
/// Only the connect step is bounded by `connect_timeout`, matching the
/// configuration surface this resolver exposes; once connected, reads run
/// until a complete message arrives or the peer closes the connection.
pub async fn send_and_read(host: &str, port: u16, query: &[u8], connect_timeout: Duration, server_label: &str) -> Result<Vec<u8>, ResolveError> {
	let stream = match timeout(connect_timeout, TcpStream::connect((host, port))).await {
		Ok(Ok(stream)) => stream,
		Ok(Err(source)) => {
			return Err(match source.kind() {
				std::io::ErrorKind::ConnectionRefused => ResolveError::ConnectionRefused { server: server_label.into() },
				_ => ResolveError::ServerError { server: server_label.into(), source },
			});
		}
		Err(_elapsed) => return Err(ResolveError::Timeout { server: server_label.into() }),
	};

	let mut stream = stream;

	debug!("connected to {server_label}, sending {} byte query", query.len());

	stream
		.write_all(query)
		.await
		.map_err(|source| ResolveError::ServerError { server: server_label.into(), source })?;

	read_framed_message(&mut stream, server_label).await
}

async fn read_framed_message(stream: &mut TcpStream, server_label: &str) -> Result<Vec<u8>, ResolveError> {
	let mut buf = Vec::new();
	let mut chunk = [0u8; 4096];

	loop {
		let declared_len = if buf.len() >= 2 { Some(u16::from_be_bytes([buf[0], buf[1]]) as usize) } else { None };

		if let Some(len) = declared_len {
			if buf.len() >= 2 + len {
				buf.truncate(2 + len);
				return Ok(buf);
			}
		}

		let n = stream
			.read(&mut chunk)
			.await
			.map_err(|source| ResolveError::ServerError { server: server_label.into(), source })?;

		if n == 0 {
			warn!("{server_label} closed the connection with {} bytes of a framed message buffered", buf.len());
			return Err(ResolveError::IncompleteResponse { server: server_label.into() });
		}

		buf.extend_from_slice(&chunk[..n]);
	}
}
