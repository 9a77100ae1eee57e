use chat_memory::{
    api::build_router,
    llm::{CompletionClient, OllamaClient},
    logging, Config, ConversationService, ConversationStore,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config_path =
        std::env::var("CHAT_MEMORY_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = Config::load(Some(config_path.as_str()))?;

    logging::init(&config.logging)?;

    let client: Arc<dyn CompletionClient> = Arc::new(
        OllamaClient::new(config.ollama.clone())
            .map_err(|e| anyhow::anyhow!("Failed to create Ollama client: {}", e))?,
    );
    let store = Arc::new(ConversationStore::new());
    let service = Arc::new(ConversationService::new(store, client, &config.memory)?);

    let router = build_router(service);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        "Chat memory server listening on {} (model {} at {})",
        addr, config.ollama.model, config.ollama.base_url
    );

    axum::serve(listener, router).await?;

    Ok(())
}
