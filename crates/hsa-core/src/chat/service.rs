//! Chat service: backend handle, session lookup and transcript updates

use std::sync::{Arc, OnceLock};

use tracing::{debug, info, warn};

use crate::config::{Config, GeminiConfig};
use crate::error::{Error, Result};
use crate::llm::{ChatBackend, Content, GeminiClient, GenerateContentRequest, GenerationConfig};
use crate::session::SessionRegistry;

use super::prompt::SYSTEM_INSTRUCTION;

/// Creates the backend client handle from an API key
pub trait BackendFactory: Send + Sync {
    fn connect(&self, api_key: &str) -> Result<Arc<dyn ChatBackend>>;
}

impl<F> BackendFactory for F
where
    F: Fn(&str) -> Result<Arc<dyn ChatBackend>> + Send + Sync,
{
    fn connect(&self, api_key: &str) -> Result<Arc<dyn ChatBackend>> {
        self(api_key)
    }
}

/// Factory producing [`GeminiClient`]s
pub struct GeminiFactory {
    config: GeminiConfig,
}

impl GeminiFactory {
    pub fn new(config: GeminiConfig) -> Self {
        Self { config }
    }
}

impl BackendFactory for GeminiFactory {
    fn connect(&self, api_key: &str) -> Result<Arc<dyn ChatBackend>> {
        let client = GeminiClient::new(&self.config, api_key)?;
        info!("Created Gemini client for model {}", client.model());
        Ok(Arc::new(client))
    }
}

/// Chat dispatch context shared by all request handlers
///
/// Owns the session registry and the lazily created backend handle. The
/// handle is built at most once; a failed build is kept and reported to every
/// later caller.
pub struct ChatService {
    api_key: Option<String>,
    factory: Box<dyn BackendFactory>,
    backend: OnceLock<std::result::Result<Arc<dyn ChatBackend>, String>>,
    sessions: SessionRegistry,
}

impl ChatService {
    /// Create a service talking to Gemini with the given configuration
    pub fn new(config: &Config, sessions: SessionRegistry) -> Self {
        Self::with_factory(
            config.gemini.api_key().map(str::to_string),
            GeminiFactory::new(config.gemini.clone()),
            sessions,
        )
    }

    /// Create a service with a custom backend factory
    pub fn with_factory(
        api_key: Option<String>,
        factory: impl BackendFactory + 'static,
        sessions: SessionRegistry,
    ) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.is_empty()),
            factory: Box::new(factory),
            backend: OnceLock::new(),
            sessions,
        }
    }

    /// Session registry backing this service
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Send `message` on behalf of `identity` and return the reply text.
    ///
    /// On success the user turn and the reply are appended to the client's
    /// transcript. Any failure leaves the transcript untouched.
    ///
    /// The transcript lock is not held during the remote call. Two concurrent
    /// requests from one identity each see the history as it was when they
    /// started, and their exchanges are appended in completion order. Each
    /// user/model pair stays adjacent.
    pub async fn dispatch(&self, identity: &str, message: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("GEMINI_API_KEY environment variable not set".to_string()))?;

        let backend = self.backend(api_key)?;

        let session = self.sessions.get_or_create(identity);

        let mut contents = session.read().await.history().to_vec();
        let prior_turns = contents.len();
        contents.push(Content::user(message));

        let request = GenerateContentRequest {
            contents,
            system_instruction: Some(Content::instruction(SYSTEM_INSTRUCTION)),
            generation_config: Some(GenerationConfig::chat_defaults()),
        };

        debug!("Dispatching message for {} with {} prior turns", identity, prior_turns);

        let response = backend.generate_content(&request).await.map_err(|e| match e {
            Error::Backend(_) => e,
            other => Error::Backend(other.to_string()),
        })?;

        let Some(reply) = response.first_text() else {
            warn!(
                "Gemini returned no usable text for {} ({} candidates)",
                identity,
                response.candidates.len()
            );
            return Err(Error::NoCandidates);
        };
        let reply = reply.to_string();

        session.write().await.append_exchange(message, reply.as_str());

        Ok(reply)
    }

    fn backend(&self, api_key: &str) -> Result<Arc<dyn ChatBackend>> {
        let handle = self.backend.get_or_init(|| {
            self.factory.connect(api_key).map_err(|e| {
                warn!("Failed to create AI client: {}", e);
                e.to_string()
            })
        });

        match handle {
            Ok(backend) => Ok(Arc::clone(backend)),
            Err(msg) => Err(Error::ClientInit(msg.clone())),
        }
    }
}
