use roastbot::api::{self, app_state::AppState};
use roastbot::config::ConfigLoader;
use roastbot::corpus::load_and_chunk;
use roastbot::error::AppError;
use roastbot::index::{KnowledgeBase, create_embedding_model};
use roastbot::llm::{CompletionOptions, create_chat_model};
use roastbot::observability::{
    AppMetrics, ObservabilityState, create_observability_router, init_tracing,
};
use roastbot::services::{ConversationMemory, ResponseGenerator, create_retrieval_service};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ConfigLoader::load().map_err(AppError::from)?;
    ConfigLoader::validate(&config)?;

    let _log_guard = init_tracing(&config.app_name, &config.logging)?;
    info!("Starting RoastBot...");
    info!("Configuration loaded successfully");

    let fragments = load_and_chunk(&config.corpus.path, config.corpus.chunk_size)?;

    let embedding_model = create_embedding_model(&config.embedding)?;
    info!(
        "Embedding model initialized: {} (backend: {})",
        config.embedding.model_name, config.embedding.backend
    );

    let knowledge_base = Arc::new(KnowledgeBase::build(fragments, embedding_model).await?);
    let fragment_count = knowledge_base.len();

    let retrieval_service = create_retrieval_service(knowledge_base);
    info!("Retrieval service initialized");

    let chat_model = create_chat_model(&config.llm)?;
    info!("Chat model initialized: {}", config.llm.model_name);

    let memory = Arc::new(ConversationMemory::new(config.memory.capacity));
    let generator = ResponseGenerator::new(
        retrieval_service,
        memory,
        chat_model,
        CompletionOptions {
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
        },
        config.retrieval.top_k,
    );
    info!("Response generator initialized");

    let metrics = Arc::new(AppMetrics::default());
    let app_state = AppState::new(Arc::new(generator), metrics.clone());

    let observability_state = Arc::new(ObservabilityState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        metrics,
        fragment_count,
    ));
    let router =
        create_observability_router(observability_state).merge(api::create_router(app_state));
    info!("API router created with observability endpoints");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
