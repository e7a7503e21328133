// Blog comments server

use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use blog_comments::{
    app_state::AppState, comment_interface::create_api_router, config::Config,
    data_seeder::seed_demo_data,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();

    // Initialize application state
    let app_state = AppState::new(config.clone()).await?;

    if config.seed_demo_data {
        let summary = seed_demo_data(app_state.store().as_ref()).await?;
        info!(?summary, "seeded demo data");
    }

    let app = create_api_router(app_state.comments.clone())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.server_address();
    info!("Blog comments server starting on http://{}", addr);
    info!("  GET    /api/comments?page=N&post=ID");
    info!("  POST   /api/comments");
    info!("  GET    /api/comments/{{id}}");
    info!("  PUT    /api/comments/{{id}}");
    info!("  DELETE /api/comments/{{id}}");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
