use std::sync::OnceLock;

use regex_lite::Regex;
use strum::{EnumString, IntoStaticStr};
use tracing::{debug, warn};

use crate::api::{echo_route, get_file_route, post_file_route, root_route, user_agent_route};
use crate::application::ServerData;
use crate::domain::errors::{ParseError, RouteError};
use crate::infrastructure::server_impl::parser::parse_http;
use crate::infrastructure::server_impl::request::Request;
use crate::infrastructure::server_impl::response::{Response, StatusCode};

static SEGMENT: OnceLock<Regex> = OnceLock::new();

/// Captures the second `/`-delimited segment: `/prefix/segment[/...]`.
fn get_segment_matcher() -> &'static Regex {
    SEGMENT.get_or_init(|| Regex::new(r"^/[^/]*/([^/]*)").expect("static pattern"))
}

#[allow(clippy::upper_case_acronyms, non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, IntoStaticStr, EnumString)]
pub enum Verb {
    GET,
    POST,
    PUT,
    DELETE,
}

/// Header names as they are matched on requests and written on responses.
#[allow(clippy::upper_case_acronyms, non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, IntoStaticStr)]
#[non_exhaustive]
pub enum Header {
    #[strum(serialize = "Accept-Encoding")]
    ACCEPT_ENCODING,
    #[strum(serialize = "Content-Encoding")]
    CONTENT_ENCODING,
    #[strum(serialize = "Content-Length")]
    CONTENT_LENGTH,
    #[strum(serialize = "Content-Type")]
    CONTENT_TYPE,
    #[strum(serialize = "User-Agent")]
    USER_AGENT,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PathTemplate {
    Exact(&'static str),
    /// Matches on a plain prefix test, so `/echo` also matches `/echoes/a`.
    Prefix(&'static str),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PathMatch<'a> {
    NoMatch,
    /// `segment` is the second path segment, if the path has one.
    Matched { segment: Option<&'a str> },
}

impl PathTemplate {
    pub fn match_path<'a>(&self, path: &'a str) -> PathMatch<'a> {
        let matched = match self {
            Self::Exact(template) => path == *template,
            Self::Prefix(prefix) => path.starts_with(prefix),
        };
        if !matched {
            return PathMatch::NoMatch;
        }

        let segment = get_segment_matcher()
            .captures(path)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str());
        PathMatch::Matched { segment }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Root,
    Echo,
    UserAgent,
    GetFile,
    PostFile,
}

#[derive(Copy, Clone, Debug)]
struct RouteDefinition {
    verb: Option<Verb>,
    template: PathTemplate,
    route: Route,
}

/// Evaluated top to bottom, first match wins.
const ROUTES: [RouteDefinition; 5] = [
    RouteDefinition {
        verb: None,
        template: PathTemplate::Exact("/"),
        route: Route::Root,
    },
    RouteDefinition {
        verb: None,
        template: PathTemplate::Prefix("/echo"),
        route: Route::Echo,
    },
    RouteDefinition {
        verb: None,
        template: PathTemplate::Prefix("/user-agent"),
        route: Route::UserAgent,
    },
    RouteDefinition {
        verb: Some(Verb::GET),
        template: PathTemplate::Prefix("/files"),
        route: Route::GetFile,
    },
    RouteDefinition {
        verb: Some(Verb::POST),
        template: PathTemplate::Prefix("/files"),
        route: Route::PostFile,
    },
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub route: Route,
    pub path: &'a str,
    segment: Option<&'a str>,
}

impl<'a> RouteMatch<'a> {
    /// The captured segment, for routes addressed as `/prefix/segment`.
    pub fn segment(&self) -> Result<&'a str, ParseError> {
        self.segment.ok_or_else(|| ParseError::MalformedPath {
            path: self.path.to_owned(),
        })
    }
}

pub fn resolve_route(verb: Verb, path: &str) -> Option<RouteMatch> {
    ROUTES
        .iter()
        .filter(|definition| definition.verb.map_or(true, |v| v == verb))
        .find_map(|definition| match definition.template.match_path(path) {
            PathMatch::NoMatch => None,
            PathMatch::Matched { segment } => Some(RouteMatch {
                route: definition.route,
                path,
                segment,
            }),
        })
}

pub fn match_routes(server_data: &ServerData, request: &Request<'_>) -> Response {
    let Some(route) = resolve_route(request.verb(), request.resource()) else {
        return Response::from_status_code(StatusCode::NotFound);
    };

    let response = match route.route {
        Route::Root => Ok(root_route()),
        Route::Echo => echo_route(request, &route),
        Route::UserAgent => user_agent_route(request),
        Route::GetFile => get_file_route(server_data, &route),
        Route::PostFile => post_file_route(server_data, request, &route),
    };

    response.unwrap_or_else(|e: RouteError| {
        let status_code = StatusCode::from(&e);
        warn!(error = %e, status = ?status_code, path = request.resource(), "request failed");
        Response::from_status_code(status_code)
    })
}

/// Parses `raw` and routes it. Parse failures never reach the routes.
pub fn process_server_request(server_data: &ServerData, raw: &[u8]) -> Response {
    let request = match parse_http(raw) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "invalid request");
            return Response::from_status_code(StatusCode::BadRequest);
        }
    };

    debug!(
        verb = ?request.verb(),
        path = request.resource(),
        headers = request.headers.len(),
        "request parsed"
    );

    match_routes(server_data, &request)
}
