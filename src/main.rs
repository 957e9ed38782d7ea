use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use webshop::{config, routes, services::db_init, templates, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = config::load();

    let db = db_init::connect(&settings).await?;
    db_init::ensure_schema(&db).await?;

    let state = AppState {
        hbs: templates::build_handlebars()?,
        db,
        settings: settings.clone(),
    };

    db_init::ensure_admin(&state).await?;
    if settings.seed_demo_data {
        db_init::seed_demo_products(&state).await?;
    }

    let app = routes::app(state);

    let host: std::net::IpAddr = settings.host.parse()?;
    let addr = SocketAddr::from((host, settings.port));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
