pub mod connection;
pub mod parser;
pub mod request;
pub mod response;
pub mod server;
