use crate::domain::errors::ParseError;
use crate::infrastructure::server_impl::parser::{parse_body, parse_query_parameters};
use crate::infrastructure::server_impl::server::{Header, Verb};
use ahash::AHashMap;
use derive_more::Deref;

pub const SUPPORTED_VERSION: &str = "HTTP/1.1";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequestLine<'a> {
    pub verb: Verb,
    /// Taken verbatim, no decoding or normalization.
    pub path: &'a str,
    pub version: &'a str,
}

/// Header names are case-sensitive as received; the last duplicate wins.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deref)]
pub struct Headers<'a>(pub AHashMap<&'a str, &'a str>);

impl<'a> Headers<'a> {
    pub fn header(&self, header: Header) -> Option<&'a str> {
        let name: &str = header.into();
        self.0.get(name).copied()
    }

    /// Plain substring match for `gzip`, q-values are not interpreted.
    pub fn accepts_gzip(&self) -> bool {
        self.header(Header::ACCEPT_ENCODING)
            .is_some_and(|encodings| encodings.contains("gzip"))
    }
}

/// Query string pairs; the last duplicate key wins.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deref)]
pub struct QueryParameters<'a>(pub AHashMap<&'a str, &'a str>);

#[derive(Debug)]
pub struct Request<'a> {
    pub line: RequestLine<'a>,
    pub headers: Headers<'a>,
    pub raw: &'a [u8],
}

impl<'a> Request<'a> {
    pub fn verb(&self) -> Verb {
        self.line.verb
    }

    pub fn resource(&self) -> &'a str {
        self.line.path
    }

    pub fn body(&self) -> Result<&'a [u8], ParseError> {
        parse_body(self.raw)
    }

    pub fn query(&self) -> Result<QueryParameters<'a>, ParseError> {
        parse_query_parameters(self.raw)
    }
}
