use axum::routing::{delete, get, post, put};
use axum::Router;
use clap::{Parser, Subcommand};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

mod api;
mod auth;
mod config;
mod database;
mod error;
mod handlers;
mod middleware;
mod services;

use database::DatabaseManager;

#[derive(Parser)]
#[command(name = "emarket-api", version, about = "E-Market e-commerce backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SMTP settings, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::Migrate => {
            DatabaseManager::migrate().await?;
            Ok(())
        }
    }
}

async fn serve() -> anyhow::Result<()> {
    let config = config::config();
    tracing::info!("Starting E-Market API in {:?} mode", config.environment);

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("EMARKET_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(8000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    println!("🚀 E-Market API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn app() -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_auth_routes())
        .merge(catalog_routes())
        // Bearer JWT required
        .merge(protected_routes())
        // Bearer JWT with admin access required
        .merge(admin_routes())
        // Generated invoice PDFs
        .nest_service("/media", ServeDir::new(&config::config().media.root));

    if config::config().security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.layer(TraceLayer::new_for_http())
}

fn public_auth_routes() -> Router {
    use handlers::public::auth;

    Router::new()
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
        .route("/auth/verify-otp", post(auth::verify_otp_post))
        .route("/auth/resend-otp", post(auth::resend_otp_post))
}

fn catalog_routes() -> Router {
    use handlers::public::products;

    Router::new()
        .route("/products", get(products::product_list_get))
        .route("/products/:id", get(products::product_detail_get))
}

fn protected_routes() -> Router {
    use handlers::protected::{auth, cart, orders};

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami_get))
        .route("/api/auth/logout", post(auth::logout_post))
        .route(
            "/api/cart",
            post(cart::cart_post).get(cart::cart_get).delete(cart::cart_delete),
        )
        .route("/api/cart/:id", delete(cart::cart_item_delete))
        .route("/api/orders", post(orders::order_post).get(orders::order_list_get))
        .route("/api/orders/direct", post(orders::direct_order_post))
        .route("/api/orders/:id", get(orders::order_detail_get))
        .route("/api/orders/:id/invoice", get(orders::invoice_get))
        .layer(axum::middleware::from_fn(middleware::jwt_auth_middleware))
}

fn admin_routes() -> Router {
    use handlers::elevated::{dashboard, products, shipments};

    Router::new()
        .route("/api/admin/products", post(products::product_post))
        .route(
            "/api/admin/products/:id",
            put(products::product_put).delete(products::product_delete),
        )
        .route("/api/admin/products/:id/restock", post(products::product_restock_post))
        .route("/api/admin/shipments", post(shipments::shipment_post))
        .route("/api/admin/dashboard", get(dashboard::dashboard_get))
        .layer(axum::middleware::from_fn(middleware::admin_auth_middleware))
}

async fn root() -> api::ApiResponse<serde_json::Value> {
    let version = env!("CARGO_PKG_VERSION");

    api::ApiResponse::success(
        "E-Market API",
        serde_json::json!({
            "name": "E-Market API",
            "version": version,
            "description": "E-commerce backend: OTP login, catalog, cart, orders and PDF invoicing",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/auth/register, /auth/login, /auth/verify-otp, /auth/resend-otp (public)",
                "catalog": "/products[/:id] (public)",
                "cart": "/api/cart[/:id] (protected)",
                "orders": "/api/orders[/direct|/:id[/invoice]] (protected)",
                "session": "/api/auth/whoami, /api/auth/logout (protected)",
                "admin": "/api/admin/* (admin access required)",
                "media": "/media/* (generated invoice PDFs)",
            }
        }),
    )
}

async fn health() -> api::ApiResult<serde_json::Value> {
    DatabaseManager::health_check()
        .await
        .map_err(error::ApiError::from)?;

    Ok(api::ApiResponse::success(
        "ok",
        serde_json::json!({
            "status": "ok",
            "database": "ok",
            "timestamp": chrono::Utc::now(),
        }),
    ))
}
