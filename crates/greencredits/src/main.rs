use std::{net::SocketAddr, sync::Arc};

use clap::Parser;
use socketioxide::SocketIo;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing_subscriber::EnvFilter;

mod app;
mod args;
mod data;
mod error;
mod handlers;
mod negotiator;
mod onboarding;
mod routes;
mod state;
mod storage;
mod telemetry;
mod utils;
mod wallet;

use app::App;
use args::Args;
use data::NetworkDescriptor;
use negotiator::ConnectionNegotiator;
use storage::{FileStore, KeyValueStore};
use telemetry::TracingTelemetry;
use wallet::{HttpWallet, InjectedWallet};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Args::parse();

    let env_filter = EnvFilter::builder()
        .with_default_directive(args.log_level.into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let network = match &args.network_file {
        Some(path) => NetworkDescriptor::load(path).await?,
        None => NetworkDescriptor::moonbase_alpha(),
    };
    tracing::info!(chain = %network.chain_name, chain_id = %network.chain_id, "Target network");

    let store = FileStore::open(&args.data_path)?;
    tracing::info!(path = %store.path().display(), "Using storage");
    let store: Arc<dyn KeyValueStore> = Arc::new(store);

    let wallets = args
        .wallets
        .iter()
        .map(|url| {
            let primary = args.primary_wallet.as_ref() == Some(url);
            Arc::new(HttpWallet::new(url.clone(), primary)) as Arc<dyn InjectedWallet>
        })
        .collect();

    // Create the root context shared by routes and sockets
    let negotiator = ConnectionNegotiator::new(wallets, network, Arc::clone(&store));
    let app_state = App::new(negotiator, store, Arc::new(TracingTelemetry));
    app_state.start();

    // Create a new Socket.IO layer
    let (socket_layer, socket_io) = SocketIo::builder()
        .with_state(Arc::clone(&app_state))
        .build_layer();
    socket_io.ns("/ws", handlers::ws);

    // Add Cross-Origin Resource Sharing (CORS) middleware to the application
    let cors_layer = CorsLayer::permissive();

    // Trace requests to the application
    let trace_layer = TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default());

    let app = routes::router()
        .layer(socket_layer)
        .layer(cors_layer)
        .layer(trace_layer)
        .with_state(Arc::clone(&app_state));

    let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], args.port))).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutting down");

            app_state.shutdown();
        })
        .await?;

    Ok(())
}
