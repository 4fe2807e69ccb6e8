//! Parsing of raw request buffers.
//!
//! Every operation takes the whole buffer and re-reads what it needs, so they can be
//! called independently and in any order.

use crate::domain::errors::ParseError;
use crate::infrastructure::server_impl::request::{
    Headers, QueryParameters, Request, RequestLine, SUPPORTED_VERSION,
};
use crate::infrastructure::server_impl::server::Verb;
use ahash::AHashMap;
use memchr::memmem;
use std::str::FromStr;

pub const CRLF: &[u8] = b"\r\n";
pub const HEADER_DELIMITER: &str = ": ";

/// Splits `raw` on CRLF, yielding every line with the offset it starts at.
/// A trailing terminator yields a final empty line.
fn lines(raw: &[u8]) -> impl Iterator<Item = (usize, &[u8])> {
    let mut start = 0;
    memmem::find_iter(raw, CRLF)
        .chain(std::iter::once(raw.len()))
        .map(move |end| {
            let line = (start, &raw[start..end]);
            start = end + CRLF.len();
            line
        })
}

fn first_line(raw: &[u8]) -> &[u8] {
    memmem::find(raw, CRLF).map_or(raw, |end| &raw[..end])
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Parses the request line and headers. The body is left in the raw buffer.
pub fn parse_http(raw: &[u8]) -> Result<Request, ParseError> {
    let line = parse_request_line(raw)?;
    let headers = parse_headers(raw)?;

    Ok(Request { line, headers, raw })
}

pub fn parse_request_line(raw: &[u8]) -> Result<RequestLine, ParseError> {
    let line = first_line(raw);
    let malformed = || ParseError::MalformedRequestLine { line: lossy(line) };
    let line = std::str::from_utf8(line).map_err(|_| malformed())?;

    let tokens = line.split(' ').collect::<Vec<_>>();
    let [verb, path, version] = tokens[..] else {
        return Err(malformed());
    };

    let verb = Verb::from_str(verb).map_err(|_| ParseError::UnsupportedVerb {
        verb: verb.to_owned(),
    })?;

    if version != SUPPORTED_VERSION {
        return Err(ParseError::UnsupportedVersion {
            version: version.to_owned(),
        });
    }

    Ok(RequestLine {
        verb,
        path,
        version,
    })
}

/// Reads `Name: Value` lines after the request line up to the first empty line.
pub fn parse_headers(raw: &[u8]) -> Result<Headers, ParseError> {
    let mut headers = AHashMap::new();

    for (_, line) in lines(raw).skip(1) {
        if line.is_empty() {
            break;
        }

        let malformed = || ParseError::MalformedHeader { line: lossy(line) };
        let line = std::str::from_utf8(line).map_err(|_| malformed())?;
        match line.split_once(HEADER_DELIMITER) {
            Some((name, value)) if !value.contains(HEADER_DELIMITER) => {
                headers.insert(name, value);
            }
            _ => return Err(malformed()),
        }
    }

    Ok(Headers(headers))
}

/// Everything after the first empty line.
///
/// Without an empty line everything after the request line is the body. A buffer
/// holding a single line has no body at all.
pub fn parse_body(raw: &[u8]) -> Result<&[u8], ParseError> {
    if let Some((start, _)) = lines(raw).find(|(_, line)| line.is_empty()) {
        return Ok(raw.get(start + CRLF.len()..).unwrap_or_default());
    }

    memmem::find(raw, CRLF)
        .map(|end| &raw[end + CRLF.len()..])
        .ok_or(ParseError::NoBodyFound)
}

pub fn parse_query_parameters(raw: &[u8]) -> Result<QueryParameters, ParseError> {
    let line = parse_request_line(raw)?;
    parse_query_string(line.path)
}

/// Splits `path` on `?`, then `&`, then `=`. One bad pair rejects the whole query.
pub fn parse_query_string(path: &str) -> Result<QueryParameters, ParseError> {
    let mut parts = path.split('?');
    let _resource = parts.next();
    let Some(query) = parts.next() else {
        return Ok(QueryParameters::default());
    };

    let malformed = || ParseError::MalformedQueryString {
        query: query.to_owned(),
    };
    if parts.next().is_some() {
        return Err(malformed());
    }

    let mut parameters = AHashMap::new();
    for pair in query.split('&') {
        match pair.split_once('=') {
            Some((key, value)) if !value.contains('=') => {
                parameters.insert(key, value);
            }
            _ => return Err(malformed()),
        }
    }

    Ok(QueryParameters(parameters))
}
