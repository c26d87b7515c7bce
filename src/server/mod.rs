// MindAura - HTTP service
// Chat and analysis endpoints shared by many concurrent clients

mod handlers;
mod metrics;
mod middleware;
mod session;

pub use handlers::{create_router, AppError, ConversationRequest, HealthStatus, SessionInfo, SESSION_HEADER};
pub use metrics::ServiceMetrics;
pub use middleware::{auth_middleware, track_errors};
pub use session::{SessionError, SessionManager, SessionState};

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::{ChatProvider, Config};
use crate::crisis::CrisisDetector;
use crate::errors::bind_failed_error;
use crate::responder::{
    jittered_ms, FallbackResponder, GeminiResponder, PhrasePicker, RandomPicker, Responder,
    ScriptedResponder, SeededPicker, StreamPacing,
};

/// Main server structure, shared by every request handler
pub struct WellnessServer {
    /// Reply generation, tried in priority order
    responder: FallbackResponder,
    /// Variant phrasing and timing jitter
    picker: Arc<dyn PhrasePicker>,
    session_manager: Arc<SessionManager>,
    metrics: ServiceMetrics,
    config: Config,
    started_at: Instant,
    /// Cancelled on shutdown; in-flight reply streams hang off it
    shutdown: CancellationToken,
}

impl WellnessServer {
    /// Create a server with an explicit responder chain
    pub fn new(config: Config, responder: FallbackResponder, picker: Arc<dyn PhrasePicker>) -> Result<Self> {
        let session_manager = SessionManager::new(
            config.server.max_sessions,
            config.server.session_timeout_minutes,
        );

        Ok(Self {
            responder,
            picker,
            session_manager: Arc::new(session_manager),
            metrics: ServiceMetrics::new()?,
            config,
            started_at: Instant::now(),
            shutdown: CancellationToken::new(),
        })
    }

    /// Wire responders from configuration.
    ///
    /// The scripted responder is always last in the chain, so a Gemini
    /// outage degrades to offline replies instead of failing the request.
    pub fn from_config(config: Config) -> Result<Self> {
        let picker: Arc<dyn PhrasePicker> = match config.chat.phrase_seed {
            Some(seed) => Arc::new(SeededPicker::new(seed)),
            None => Arc::new(RandomPicker),
        };

        let detector = match &config.chat.crisis_keywords_path {
            Some(path) => CrisisDetector::load_from_file(path)?,
            None => CrisisDetector::default(),
        };

        let mut responders: Vec<Box<dyn Responder>> = Vec::new();
        if config.chat.provider == ChatProvider::Gemini {
            match GeminiResponder::from_config(&config.gemini)? {
                Some(gemini) => responders.push(Box::new(gemini)),
                None => tracing::warn!(
                    "Gemini provider selected but no API key configured, using scripted replies"
                ),
            }
        }
        responders.push(Box::new(ScriptedResponder::new(detector, Arc::clone(&picker))));

        Self::new(config, FallbackResponder::new(responders), picker)
    }

    /// Start the HTTP server and run until Ctrl-C
    pub async fn serve(self) -> Result<()> {
        let bind_address = self.config.server.bind_address.clone();
        let addr: SocketAddr = bind_address
            .parse()
            .with_context(|| format!("Invalid bind address: {}", bind_address))?;

        let shutdown = self.shutdown.clone();
        let app = create_router(Arc::new(self))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http());

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| bind_failed_error(&bind_address))?;

        tracing::info!("Starting MindAura server on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "Failed to listen for shutdown signal");
                }
                tracing::info!("Shutdown requested, closing open streams");
                shutdown.cancel();
            })
            .await?;

        Ok(())
    }

    pub fn responder(&self) -> &FallbackResponder {
        &self.responder
    }

    pub fn picker(&self) -> &Arc<dyn PhrasePicker> {
        &self.picker
    }

    pub fn session_manager(&self) -> &Arc<SessionManager> {
        &self.session_manager
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Word pacing for reply streams
    pub fn stream_pacing(&self) -> StreamPacing {
        StreamPacing {
            word_delay_ms: self.config.chat.word_delay_ms,
            word_jitter_ms: self.config.chat.word_jitter_ms,
        }
    }

    /// Pause before a reply starts streaming
    pub fn thinking_delay(&self) -> Duration {
        let chat = &self.config.chat;
        Duration::from_millis(jittered_ms(
            self.picker.as_ref(),
            chat.thinking_delay_ms,
            chat.thinking_jitter_ms,
        ))
    }
}
