//! Preplens admin - question bank management service

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use preplens_admin::{
    config::Args,
    db::MongoClient,
    media::{DisabledImageStore, ImageStore, S3ImageStore},
    server::{self, AppState},
    store::{MemoryStore, MongoStore},
};

fn init_tracing(args: &Args) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("preplens_admin={},info", args.log_level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if args.log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn image_store(args: &Args) -> Arc<dyn ImageStore> {
    if !args.s3.is_configured() {
        warn!("S3 not configured, image uploads will return placeholder URLs");
        return Arc::new(DisabledImageStore);
    }

    match S3ImageStore::new(&args.s3) {
        Ok(store) => {
            info!("Image uploads go to bucket '{}'", store.bucket());
            Arc::new(store)
        }
        Err(e) => {
            warn!("S3 setup failed, image uploads will return placeholder URLs: {}", e);
            Arc::new(DisabledImageStore)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    init_tracing(&args);

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Preplens Admin - Question Bank");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("Admin email: {}", args.admin_email);
    info!("Registration: {}", if args.allow_registration { "open" } else { "closed" });
    info!("Max upload rows: {}", args.max_upload_rows);
    info!("======================================");

    let images = image_store(&args);

    let state = if args.memory_store {
        info!("Using in-memory question store");
        let store = Arc::new(MemoryStore::new());
        AppState::new(args, store.clone(), store, images, "memory")?
    } else {
        match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
            Ok(client) => {
                info!("MongoDB connected, database '{}'", client.db_name());
                let store = Arc::new(MongoStore::new(client).await?);
                AppState::new(args, store.clone(), store, images, "mongodb")?
            }
            Err(e) if args.dev_mode => {
                warn!("MongoDB connection failed (dev mode, continuing in memory): {}", e);
                let store = Arc::new(MemoryStore::new());
                AppState::new(args, store.clone(), store, images, "memory")?
            }
            Err(e) => {
                error!("MongoDB connection failed: {}", e);
                std::process::exit(1);
            }
        }
    };

    server::run(Arc::new(state)).await?;

    Ok(())
}
