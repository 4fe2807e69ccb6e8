use crate::infrastructure::server_impl::connection::ReadPolicy;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReadStrategy {
    /// One read of `--buffer-size` bytes.
    Fixed,
    /// Keep reading until the headers and declared body arrived.
    UntilDelimiter,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "rawhttp", version, about = "A small HTTP/1.1 server over raw sockets")]
pub struct Config {
    /// Directory served and written by the `/files` routes.
    #[arg(
        long,
        env = "RAWHTTP_DIRECTORY",
        default_value = "/tmp/data/codecrafters.io/http-server-tester"
    )]
    pub directory: PathBuf,

    #[arg(long, env = "RAWHTTP_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(short, long, env = "RAWHTTP_PORT", default_value_t = 4221)]
    pub port: u16,

    #[arg(long, value_enum, default_value_t = ReadStrategy::Fixed)]
    pub read_strategy: ReadStrategy,

    /// Read size per connection, or per read for `until-delimiter`.
    #[arg(long, default_value_t = 4096)]
    pub buffer_size: usize,

    /// Upper bound for `until-delimiter`.
    #[arg(long, default_value_t = 1 << 20)]
    pub max_request_size: usize,
}

impl Config {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn read_policy(&self) -> ReadPolicy {
        match self.read_strategy {
            ReadStrategy::Fixed => ReadPolicy::Fixed {
                capacity: self.buffer_size,
            },
            ReadStrategy::UntilDelimiter => ReadPolicy::UntilDelimiter {
                chunk: self.buffer_size,
                limit: self.max_request_size,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_defaults() {
        let config = Config::try_parse_from(["rawhttp"]).unwrap();
        assert_eq!(config.port, 4221);
        assert_eq!(config.read_policy(), ReadPolicy::default());
        assert_eq!(
            config.directory,
            PathBuf::from("/tmp/data/codecrafters.io/http-server-tester")
        );
    }

    #[test]
    fn success_flags() {
        let config = Config::try_parse_from([
            "rawhttp",
            "--directory",
            "/srv/files",
            "--port",
            "8080",
            "--read-strategy",
            "until-delimiter",
            "--buffer-size",
            "512",
            "--max-request-size",
            "65536",
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.directory, PathBuf::from("/srv/files"));
        assert_eq!(
            config.read_policy(),
            ReadPolicy::UntilDelimiter {
                chunk: 512,
                limit: 65536
            }
        );
    }
}
