//! Servidor web Axum com WebSocket para visualização do Viterbi em tempo real

use std::sync::Arc;

use clap::Parser;
use pos_web::app::{router, AppState};
use pos_web::config::{init_tracing, ServerArgs};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = ServerArgs::parse();

    let model = args.model.load_model()?;
    info!(tags = %model.tags(), "modelo pronto");
    let state = Arc::new(AppState { model: Arc::new(model) });

    let listener = tokio::net::TcpListener::bind(args.addr).await?;
    info!("🚀 Servidor POS iniciado em http://{}", args.addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
