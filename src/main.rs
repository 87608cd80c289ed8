use clap::Parser;
use std::sync::Arc;

use restez::logger;

mod config;
mod people;
mod routes;
mod server;

/// People registry served through the restez JSON envelope
#[derive(Debug, Parser)]
#[command(name = "restez", version, about)]
struct Args {
    /// Run the HTTP server
    #[arg(long)]
    server: bool,

    /// Execute the store migration (ie set up the people store)
    #[arg(long)]
    migrate: bool,

    /// Config file name, without extension
    #[arg(long, default_value = "config")]
    config: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let cfg = config::Config::load(&args.config)?;
    logger::init(&cfg.logging.level)?;

    if !args.migrate && !args.server {
        logger::log_warning("Nothing to do: pass --migrate and/or --server");
        return Ok(());
    }

    // Size the runtime from `server.workers`, default is one thread per core
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(args, cfg))
}

async fn async_main(args: Args, cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = people::FileStore::new(&cfg.storage.path);

    if args.migrate {
        let created = store.migrate().await?;
        logger::log_migration(store.path(), created);
    }

    if args.server {
        let addr = cfg.get_socket_addr()?;
        let listener = server::bind_listener(addr)?;

        let ctx = Arc::new(server::ServerContext {
            routes: routes::people_routes(&store),
            performance: cfg.performance.clone(),
            access_log: cfg.logging.access_log,
        });

        logger::log_server_start(&addr, cfg.server.workers);
        server::start_server_loop(listener, ctx).await?;
    }

    Ok(())
}
