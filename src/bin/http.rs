#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use semester_grid::{PlanEditor, PlannerConfig, http_api};
    use tracing::info;

    let config = PlannerConfig::load()?;
    config.init_tracing();

    let addr: SocketAddr = config.http.addr.parse()?;
    let fallback = config.new_plan()?;
    let store = config.open_store()?;
    let editor = PlanEditor::open_or_create(store, || fallback)?;

    info!(%addr, backend = ?config.storage.backend, "semester-grid HTTP API listening");
    http_api::serve(addr, editor).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
