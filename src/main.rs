use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vrest::cities::{self, CityStore};
use vrest::runtime_config::RuntimeConfig;
use vrest::{Dispatcher, RestServer, Router};

/// Sample REST server exposing the city resource.
#[derive(Debug, Parser)]
#[command(name = "vrest", version, about)]
struct Args {
    /// TCP port to listen on.
    #[arg(long, default_value_t = 4001, env = "VREST_PORT")]
    port: u16,

    /// Connection worker pool size (overrides VREST_WORKERS).
    #[arg(long)]
    workers: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = RuntimeConfig::from_env();
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    may::config().set_stack_size(config.stack_size);

    let mut router = Router::new();
    let store = CityStore::with_samples();
    cities::register_routes(&mut router, &store);
    for (method, pattern) in router.patterns() {
        info!(method = %method, pattern = %pattern, "Registered");
    }

    let server = RestServer::with_config(Dispatcher::new(router), config);
    let handle = server.start(("0.0.0.0", args.port))?;
    info!(port = args.port, "listening on http://localhost:{}", args.port);

    handle
        .join()
        .map_err(|_| anyhow::anyhow!("server coroutine panicked"))
}
