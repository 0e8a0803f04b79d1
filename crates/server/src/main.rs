//! Support agent server entry point

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use support_agent_config::{load_settings, Settings};
use support_agent_core::{ContactRequestSink, LanguageModel, VectorSearch};
use support_agent_llm::{LlmConfig, OpenAiChatBackend};
use support_agent_rag::{
    HttpVectorSearch, OverlapReranker, Retriever, RetrieverConfig, VectorSearchConfig,
};
use support_agent_server::{create_router, AppState};
use support_agent_session::{InMemorySessionBackend, SessionBackend, SessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = match load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            // Tracing not yet initialized, use eprintln for early logging
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Settings::default()
        }
    };

    init_tracing();

    tracing::info!("Starting support agent server v{}", env!("CARGO_PKG_VERSION"));

    let llm: Arc<dyn LanguageModel> = Arc::new(OpenAiChatBackend::new(LlmConfig {
        model: settings.llm.model.clone(),
        endpoint: settings.llm.endpoint.clone(),
        api_key: settings.llm.api_key.clone(),
        max_tokens: settings.llm.max_tokens,
        temperature: settings.llm.temperature,
        timeout: Duration::from_secs(settings.llm.timeout_secs),
        max_retries: settings.llm.max_retries,
        initial_backoff: Duration::from_millis(100),
    })?);
    tracing::info!(model = %settings.llm.model, endpoint = %settings.llm.endpoint, "LLM backend ready");

    let search: Arc<dyn VectorSearch> = Arc::new(HttpVectorSearch::new(VectorSearchConfig {
        endpoint: settings.vector_search.endpoint.clone(),
        collection: settings.vector_search.collection.clone(),
        timeout: Duration::from_secs(settings.vector_search.timeout_secs),
    })?);
    tracing::info!(
        endpoint = %settings.vector_search.endpoint,
        collection = %settings.vector_search.collection,
        "Vector search client ready"
    );

    let mut retriever = Retriever::new(
        Arc::clone(&search),
        RetrieverConfig {
            distance_threshold: settings.retrieval.distance_threshold,
            max_per_source: settings.retrieval.max_per_source,
            rerank_enabled: settings.retrieval.rerank_enabled,
            rerank_candidates: settings.retrieval.rerank_candidates,
            rerank_top_k: settings.retrieval.rerank_top_k,
        },
    );
    if settings.retrieval.rerank_enabled {
        retriever = retriever.with_reranker(Arc::new(OverlapReranker::new()));
    }
    let retriever = Arc::new(retriever);

    // Session storage: durable when ScyllaDB is enabled and reachable,
    // otherwise in-memory with a periodic reaper.
    let mut contact_sink: Option<Arc<dyn ContactRequestSink>> = None;
    let mut archive = None;
    let mut cleanup_stop = None;

    let backend: Arc<dyn SessionBackend> = if settings.scylla.enabled {
        let scylla_config = support_agent_persistence::ScyllaConfig {
            hosts: settings.scylla.nodes.clone(),
            keyspace: settings.scylla.keyspace.clone(),
            replication_factor: 1,
            session_ttl_secs: settings.session.timeout_secs,
        };
        match support_agent_persistence::init(scylla_config).await {
            Ok(client) => {
                tracing::info!(
                    nodes = ?settings.scylla.nodes,
                    keyspace = %settings.scylla.keyspace,
                    "ScyllaDB persistence initialized"
                );
                contact_sink = Some(Arc::new(
                    support_agent_persistence::ScyllaContactRequestStore::new(client.clone()),
                ));
                archive = Some(Arc::new(
                    support_agent_persistence::ConversationArchive::new(client.clone()),
                ));
                Arc::new(support_agent_persistence::ScyllaSessionBackend::new(client))
            }
            Err(e) => {
                tracing::error!(
                    "Failed to initialize ScyllaDB: {}. Falling back to in-memory.",
                    e
                );
                in_memory_backend(&settings, &mut cleanup_stop)
            }
        }
    } else {
        tracing::info!("Persistence disabled, using in-memory session store");
        in_memory_backend(&settings, &mut cleanup_stop)
    };

    let store = SessionStore::new(backend)
        .with_initial_details_collection(settings.session.initial_details_collection);

    let mut agent = support_agent_agent::SupportAgent::new(
        store.clone(),
        Arc::clone(&llm),
        Arc::clone(&retriever),
        settings.agent.clone(),
        settings.retrieval.clone(),
    );
    if let Some(sink) = contact_sink {
        agent = agent.with_contact_sink(sink);
    }

    let settings = Arc::new(settings);
    let mut state = AppState::new(
        Arc::clone(&settings),
        Arc::new(agent),
        store,
        llm,
        search,
    );
    if let Some(archive) = archive {
        state = state.with_archive(archive);
    }

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(stop) = cleanup_stop {
        let _ = stop.send(true);
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn in_memory_backend(
    settings: &Settings,
    cleanup_stop: &mut Option<tokio::sync::watch::Sender<bool>>,
) -> Arc<dyn SessionBackend> {
    let backend = Arc::new(InMemorySessionBackend::new(Duration::from_secs(
        settings.session.timeout_secs,
    )));
    *cleanup_stop = Some(backend.start_cleanup(Duration::from_secs(
        settings.session.cleanup_interval_secs,
    )));
    backend
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "support_agent=info,tower_http=info".into());

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
