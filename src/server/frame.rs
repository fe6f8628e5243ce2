//! Invocation framing: cut one HTTP/1.1 request off the connection buffer,
//! and encode the reply.

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;
use thiserror::Error;

/// Largest invocation (head plus payload) the server accepts: 8 MiB.
pub const MAX_INVOCATION_BYTES: usize = 8 * 1024 * 1024;

const MAX_HEADERS: usize = 32;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed request: {0}")]
    Malformed(#[from] httparse::Error),

    #[error("invalid Content-Length header")]
    BadLength,

    #[error("invocation exceeds {MAX_INVOCATION_BYTES} bytes")]
    TooLarge,
}

/// A complete request, reduced to what the invoke routes look at.
#[derive(Debug)]
pub struct Invocation {
    pub method: String,
    /// Path without the query string.
    pub path: String,
    /// The peer asked for (or its HTTP version implies) `Connection: close`.
    pub close: bool,
    pub payload: Bytes,
}

/// Takes the first complete request off the front of `buf`.
///
/// Returns `Ok(None)` while the head or payload is still arriving. The size
/// limit is checked against the declared length before any payload is
/// buffered, so an oversized or overflowing `Content-Length` is rejected
/// immediately.
pub fn take_invocation(buf: &mut BytesMut) -> Result<Option<Invocation>, FrameError> {
    let mut slots = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut head = httparse::Request::new(&mut slots);

    let head_len = match head.parse(&buf[..])? {
        httparse::Status::Complete(len) => len,
        httparse::Status::Partial if buf.len() > MAX_INVOCATION_BYTES => {
            return Err(FrameError::TooLarge);
        }
        httparse::Status::Partial => return Ok(None),
    };

    let mut declared: u64 = 0;
    // HTTP/1.0 closes unless told otherwise.
    let mut close = head.version == Some(0);
    for header in head.headers.iter() {
        if header.name.eq_ignore_ascii_case("content-length") {
            declared = std::str::from_utf8(header.value)
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .ok_or(FrameError::BadLength)?;
        } else if header.name.eq_ignore_ascii_case("connection") {
            close = !header.value.eq_ignore_ascii_case(b"keep-alive");
        }
    }

    let total = usize::try_from(declared)
        .ok()
        .and_then(|len| head_len.checked_add(len))
        .filter(|&total| total <= MAX_INVOCATION_BYTES)
        .ok_or(FrameError::TooLarge)?;

    let method = head.method.unwrap_or_default().to_owned();
    let target = head.path.unwrap_or("/");
    let path = target.split_once('?').map_or(target, |(path, _)| path).to_owned();

    if buf.len() < total {
        return Ok(None);
    }

    let mut request = buf.split_to(total);
    let payload = request.split_off(head_len).freeze();
    Ok(Some(Invocation {
        method,
        path,
        close,
        payload,
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
    MethodNotAllowed,
    PayloadTooLarge,
    InternalServerError,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::PayloadTooLarge => 413,
            Self::InternalServerError => 500,
        }
    }

    fn status_line(self) -> &'static str {
        match self {
            Self::Ok => "HTTP/1.1 200 OK\r\n",
            Self::BadRequest => "HTTP/1.1 400 Bad Request\r\n",
            Self::NotFound => "HTTP/1.1 404 Not Found\r\n",
            Self::MethodNotAllowed => "HTTP/1.1 405 Method Not Allowed\r\n",
            Self::PayloadTooLarge => "HTTP/1.1 413 Payload Too Large\r\n",
            Self::InternalServerError => "HTTP/1.1 500 Internal Server Error\r\n",
        }
    }
}

/// A reply to one invocation.
#[derive(Debug)]
pub struct Reply {
    pub status: Status,
    content_type: &'static str,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn text(status: Status, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.into().into_bytes(),
        }
    }

    pub fn json<T: Serialize + ?Sized>(status: Status, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self {
                status,
                content_type: "application/json",
                body,
            },
            Err(e) => Self::text(
                Status::InternalServerError,
                format!("failed to encode reply: {e}"),
            ),
        }
    }

    /// Wire form of the reply. `close` selects the `Connection` header.
    pub fn encode(&self, close: bool) -> Bytes {
        let connection = if close { "close" } else { "keep-alive" };
        let mut out = BytesMut::with_capacity(self.body.len() + 128);
        out.put_slice(self.status.status_line().as_bytes());
        out.put_slice(
            format!(
                "Content-Type: {}\r\nContent-Length: {}\r\nConnection: {connection}\r\n\r\n",
                self.content_type,
                self.body.len()
            )
            .as_bytes(),
        );
        out.put_slice(&self.body);
        out.freeze()
    }
}

impl From<&FrameError> for Reply {
    fn from(err: &FrameError) -> Self {
        let status = match err {
            FrameError::TooLarge => Status::PayloadTooLarge,
            FrameError::Malformed(_) | FrameError::BadLength => Status::BadRequest,
        };
        Self::text(status, err.to_string())
    }
}
