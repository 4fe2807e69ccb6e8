use crate::domain::errors::{CompressionError, RouteError};
use crate::infrastructure::server_impl::parser::{CRLF, HEADER_DELIMITER};
use crate::infrastructure::server_impl::request::SUPPORTED_VERSION;
use crate::infrastructure::server_impl::server::Header;
use bytes::{BufMut, Bytes, BytesMut};
use compact_str::{CompactString, ToCompactString};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use strum::{EnumMessage, IntoStaticStr};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, IntoStaticStr, EnumMessage)]
pub enum StatusCode {
    #[strum(serialize = "200", message = "OK")]
    Ok,
    #[strum(serialize = "201", message = "Created")]
    Created,
    #[strum(serialize = "400", message = "Bad Request")]
    BadRequest,
    #[strum(serialize = "404", message = "Not Found")]
    NotFound,
    #[strum(serialize = "500", message = "Internal Server Error")]
    InternalServerError,
}

impl From<&RouteError> for StatusCode {
    fn from(value: &RouteError) -> Self {
        match value {
            RouteError::Parse(_) | RouteError::MissingHeader(_) => Self::BadRequest,
            RouteError::Read(_) => Self::NotFound,
            RouteError::Write(_) | RouteError::Compression(_) => Self::InternalServerError,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, IntoStaticStr)]
pub enum ContentEncoding {
    #[strum(serialize = "gzip")]
    Gzip,
}

/// A response waiting to be encoded.
///
/// Only the headers pushed by the caller are written, in order. `Content-Length` and
/// `Content-Encoding` are derived from the body when one is set.
#[derive(Debug, Clone)]
pub struct Response {
    pub status_code: StatusCode,
    pub headers: Vec<(Header, CompactString)>,
    pub body: Option<Bytes>,
    pub encoding: Option<ContentEncoding>,
}

impl Response {
    pub fn from_status_code(value: StatusCode) -> Self {
        Self {
            status_code: value,
            headers: Vec::new(),
            body: None,
            encoding: None,
        }
    }

    pub fn with_header(mut self, header: Header, value: impl Into<CompactString>) -> Self {
        self.headers.push((header, value.into()));
        self
    }

    pub fn with_body(self, content_type: &str, body: impl Into<Bytes>) -> Self {
        let mut response = self.with_header(Header::CONTENT_TYPE, content_type);
        response.body = Some(body.into());
        response
    }

    /// Replaces the body with its gzip stream.
    pub fn gzip(mut self) -> Result<Self, CompressionError> {
        if let Some(body) = self.body.take() {
            self.body = Some(gzip_compress(&body)?.into());
        }
        self.encoding = Some(ContentEncoding::Gzip);
        Ok(self)
    }

    pub fn into_http(self) -> Bytes {
        let status_code: &str = self.status_code.into();
        let status_message = self.status_code.get_message().unwrap_or_default();
        let body_len = self.body.as_ref().map_or(0, Bytes::len);

        let mut buf = BytesMut::with_capacity(64 + body_len);
        buf.put_slice(SUPPORTED_VERSION.as_bytes());
        buf.put_u8(b' ');
        buf.put_slice(status_code.as_bytes());
        buf.put_u8(b' ');
        buf.put_slice(status_message.as_bytes());
        buf.put_slice(CRLF);

        for (header, value) in &self.headers {
            put_header(&mut buf, *header, value);
        }

        if let Some(body) = &self.body {
            put_header(&mut buf, Header::CONTENT_LENGTH, &body.len().to_compact_string());
            if let Some(encoding) = self.encoding {
                put_header(&mut buf, Header::CONTENT_ENCODING, encoding.into());
            }
        }

        buf.put_slice(CRLF);
        if let Some(body) = self.body {
            buf.put(body);
        }

        buf.freeze()
    }
}

fn put_header(buf: &mut BytesMut, header: Header, value: &str) {
    let name: &str = header.into();
    buf.put_slice(name.as_bytes());
    buf.put_slice(HEADER_DELIMITER.as_bytes());
    buf.put_slice(value.as_bytes());
    buf.put_slice(CRLF);
}

pub fn gzip_compress(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn gunzip(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        GzDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn success_status_only() {
        for (status_code, expected) in [
            (StatusCode::Ok, "HTTP/1.1 200 OK\r\n\r\n"),
            (StatusCode::Created, "HTTP/1.1 201 Created\r\n\r\n"),
            (StatusCode::BadRequest, "HTTP/1.1 400 Bad Request\r\n\r\n"),
            (StatusCode::NotFound, "HTTP/1.1 404 Not Found\r\n\r\n"),
            (
                StatusCode::InternalServerError,
                "HTTP/1.1 500 Internal Server Error\r\n\r\n",
            ),
        ] {
            assert_eq!(
                Response::from_status_code(status_code).into_http(),
                expected.as_bytes()
            );
        }
    }

    #[test]
    fn success_with_body() {
        let response = Response::from_status_code(StatusCode::Ok).with_body("text/plain", "abc");
        assert_eq!(
            response.into_http(),
            &b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 3\r\n\r\nabc"[..]
        );
    }

    #[test]
    fn success_headers_keep_order() {
        let response = Response::from_status_code(StatusCode::Ok)
            .with_header(Header::USER_AGENT, "b")
            .with_header(Header::ACCEPT_ENCODING, "a")
            .with_body("application/octet-stream", Bytes::new());
        assert_eq!(
            response.into_http(),
            &b"HTTP/1.1 200 OK\r\nUser-Agent: b\r\nAccept-Encoding: a\r\nContent-Type: application/octet-stream\r\nContent-Length: 0\r\n\r\n"[..]
        );
    }

    #[test]
    fn success_gzip_body() {
        let message = "a message that compresses, a message that compresses";
        let compressed = gzip_compress(message.as_bytes()).unwrap();
        let response = Response::from_status_code(StatusCode::Ok)
            .with_body("text/plain", message)
            .gzip()
            .unwrap();
        let http = response.into_http();

        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nContent-Encoding: gzip\r\n\r\n",
            compressed.len()
        );
        assert!(http.starts_with(head.as_bytes()));
        assert_eq!(gunzip(&http[head.len()..]), message.as_bytes());
    }

    #[test]
    fn success_gzip_length_is_compressed_length() {
        let response = Response::from_status_code(StatusCode::Ok)
            .with_body("text/plain", "abc")
            .gzip()
            .unwrap();
        let body = response.body.clone().unwrap();

        assert_ne!(body.len(), 3);
        assert_eq!(gunzip(&body), b"abc");
        let length = body.len().to_string();
        assert!(response.headers.iter().all(|(h, _)| *h != Header::CONTENT_LENGTH));
        let http = response.into_http();
        let needle = format!("Content-Length: {length}\r\n");
        assert!(memchr::memmem::find(&http, needle.as_bytes()).is_some());
    }

    #[test]
    fn success_status_from_errors() {
        use crate::domain::errors::{ParseError, StorageError};
        let io = || std::io::Error::from(std::io::ErrorKind::Other);

        assert_eq!(
            StatusCode::from(&RouteError::Parse(ParseError::NoBodyFound)),
            StatusCode::BadRequest
        );
        assert_eq!(
            StatusCode::from(&RouteError::MissingHeader("User-Agent")),
            StatusCode::BadRequest
        );
        assert_eq!(
            StatusCode::from(&RouteError::Read(StorageError::from_io("a", io()))),
            StatusCode::NotFound
        );
        assert_eq!(
            StatusCode::from(&RouteError::Write(StorageError::from_io("a", io()))),
            StatusCode::InternalServerError
        );
        assert_eq!(
            StatusCode::from(&RouteError::Compression(CompressionError(io()))),
            StatusCode::InternalServerError
        );
    }
}
