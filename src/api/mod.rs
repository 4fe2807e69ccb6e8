use crate::application::ServerData;
use crate::domain::errors::RouteError;
use crate::infrastructure::server_impl::request::Request;
use crate::infrastructure::server_impl::response::{Response, StatusCode};
use crate::infrastructure::server_impl::server::{Header, RouteMatch};
use bytes::Bytes;
use tracing::debug;

pub const TEXT_PLAIN: &str = "text/plain";
pub const OCTET_STREAM: &str = "application/octet-stream";

pub fn root_route() -> Response {
    Response::from_status_code(StatusCode::Ok)
}

/// Echoes the segment after `/echo`, gzipped when the client advertises it.
pub fn echo_route(req: &Request<'_>, route: &RouteMatch<'_>) -> Result<Response, RouteError> {
    let message = route.segment()?;
    let response = Response::from_status_code(StatusCode::Ok)
        .with_body(TEXT_PLAIN, Bytes::copy_from_slice(message.as_bytes()));

    if req.headers.accepts_gzip() {
        return Ok(response.gzip()?);
    }
    Ok(response)
}

pub fn user_agent_route(req: &Request<'_>) -> Result<Response, RouteError> {
    let header = Header::USER_AGENT;
    let user_agent = req
        .headers
        .header(header)
        .ok_or(RouteError::MissingHeader(header.into()))?;

    Ok(Response::from_status_code(StatusCode::Ok)
        .with_body(TEXT_PLAIN, Bytes::copy_from_slice(user_agent.as_bytes())))
}

pub fn get_file_route(
    server_data: &ServerData,
    route: &RouteMatch<'_>,
) -> Result<Response, RouteError> {
    let filename = route.segment()?;
    let contents = server_data
        .storage
        .read(filename)
        .map_err(RouteError::Read)?;

    Ok(Response::from_status_code(StatusCode::Ok).with_body(OCTET_STREAM, contents))
}

/// Stores the request body verbatim. A request without any body is rejected.
pub fn post_file_route(
    server_data: &ServerData,
    req: &Request<'_>,
    route: &RouteMatch<'_>,
) -> Result<Response, RouteError> {
    let body = req.body()?;
    let filename = route.segment()?;
    debug!(filename, size = body.len(), "storing file");

    server_data
        .storage
        .write(filename, body)
        .map_err(RouteError::Write)?;

    Ok(Response::from_status_code(StatusCode::Created))
}
