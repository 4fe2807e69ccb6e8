use clap::Parser;
use eyre::WrapErr;
use listenfd::ListenFd;
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rawhttp::application::ServerData;
use rawhttp::config::Config;
use rawhttp::infrastructure::adapters::FsStorage;
use rawhttp::infrastructure::server_impl::connection::serve;
use rawhttp::AnyResult;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rawhttp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    run(Config::parse()).await
}

async fn run(config: Config) -> AnyResult<()> {
    let listener = match ListenFd::from_env().take_tcp_listener(0)? {
        Some(listener) => {
            listener.set_nonblocking(true)?;
            TcpListener::from_std(listener)?
        }
        None => TcpListener::bind(config.bind_address())
            .await
            .wrap_err_with(|| format!("failed to bind to {}", config.bind_address()))?,
    };

    let storage = FsStorage::new(&config.directory);
    let server_data = ServerData::new(storage, config.read_policy());

    serve(listener, server_data)
        .await
        .wrap_err("failed to accept connection")
}
