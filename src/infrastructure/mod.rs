pub mod adapters;
pub mod server_impl;
