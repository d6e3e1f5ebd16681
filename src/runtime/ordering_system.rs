use crate::api::AppState;
use crate::assistance::BroadcastNotifier;
use crate::assistant::{GeminiClient, LanguageModel, ModelError, Unconfigured};
use crate::catalog::MenuCatalog;
use crate::checkout::CheckoutService;
use crate::clients::{MenuClient, OrderClient, SessionClient};
use crate::config::Config;
use crate::conversation::{ChatService, VoiceDefaults, VoiceError, VoiceSigner, VoiceWebhook};
use crate::engine::OrderEngine;
use crate::tools::ToolDispatcher;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Pending staff requests kept for slow subscribers.
const ASSISTANCE_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Model client: {0}")]
    Model(#[from] ModelError),

    #[error("Voice client: {0}")]
    Voice(#[from] VoiceError),
}

/// Owns the three actors and every service built on their clients.
///
/// ```ignore
/// let system = OrderingSystem::new(&config)?;
/// let app = tableside::api::router(system.state());
/// // ... serve ...
/// system.shutdown().await?;
/// ```
pub struct OrderingSystem {
    pub session_client: SessionClient,
    pub menu_client: MenuClient,
    pub order_client: OrderClient,
    pub notifier: BroadcastNotifier,
    state: AppState,
    handles: Vec<JoinHandle<()>>,
}

impl OrderingSystem {
    /// Starts the system with the model named by `config`: Gemini when a key
    /// is present, otherwise a model that reports itself unconfigured.
    pub fn new(config: &Config) -> Result<Self, StartupError> {
        let model: Arc<dyn LanguageModel> = match &config.gemini {
            Some(gemini) => Arc::new(GeminiClient::new(
                gemini.api_key.clone(),
                &gemini.model,
                &gemini.base_url,
                config.http_timeout,
            )?),
            None => {
                warn!("No model key configured; chat will answer 503");
                Arc::new(Unconfigured)
            }
        };
        Self::with_model(config, model)
    }

    /// Starts the system around an explicit model.
    pub fn with_model(config: &Config, model: Arc<dyn LanguageModel>) -> Result<Self, StartupError> {
        let (session_actor, session_client) = crate::session_actor::new(config.actor_buffer);
        let (menu_actor, menu_client) = crate::menu_actor::new(config.actor_buffer);
        let (order_actor, order_client) = crate::order_actor::new(config.actor_buffer);

        // None of the actors needs another actor's client.
        let handles = vec![
            tokio::spawn(session_actor.run(())),
            tokio::spawn(menu_actor.run(())),
            tokio::spawn(order_actor.run(())),
        ];

        let catalog = Arc::new(MenuCatalog::new(
            Arc::new(menu_client.clone()),
            config.menu_cache_ttl,
        ));
        let engine = OrderEngine::new(
            session_client.clone(),
            catalog.clone(),
            config.tax_rate,
            config.mutation_retries,
        );
        let notifier = BroadcastNotifier::new(ASSISTANCE_CAPACITY);
        let tools = ToolDispatcher::new(engine, Arc::new(notifier.clone()), &config.checkout_url);

        let signer = match &config.voice_vendor {
            Some(vendor) => Some(VoiceSigner::new(
                vendor.api_key.clone(),
                vendor.agent_id.clone(),
                &vendor.base_url,
                config.http_timeout,
            )?),
            None => None,
        };
        let voice = VoiceWebhook::new(
            tools.clone(),
            VoiceDefaults {
                restaurant_id: config.voice_restaurant_id.clone(),
                table_id: config.voice_table_id.clone(),
                language: config.voice_language,
            },
            signer,
        );

        let state = AppState {
            chat: ChatService::new(tools, model, config.restaurant_name.clone()),
            voice,
            checkout: CheckoutService::new(
                order_client.clone(),
                session_client.clone(),
                config.tax_rate,
            ),
            menu: menu_client.clone(),
            catalog,
            default_restaurant_id: config.voice_restaurant_id.clone(),
        };

        info!(actors = handles.len(), "Ordering system started");
        Ok(Self {
            session_client,
            menu_client,
            order_client,
            notifier,
            state,
            handles,
        })
    }

    /// Shared state for the HTTP router.
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Drops every client so the actors see their channels close, then
    /// waits for them. Routers built from [`state`](Self::state) must be
    /// dropped first or the actors keep running.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        drop(self.state);
        drop(self.session_client);
        drop(self.menu_client);
        drop(self.order_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
