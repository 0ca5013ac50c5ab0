//! Application wiring and background tasks.

use crate::config::BotConfig;
use crate::error::StartupError;
use crate::telegram::TelegramTransport;
use program_advisor_ai::{GeminiBackend, LlmBackend, PromptBuilder};
use program_advisor_conversation::{
    AnswerService, DispatchRouter, Dispatcher, QuickQuestionCatalog, ReplySink, SessionStore,
};
use program_advisor_knowledge::{FileKnowledgeStore, KnowledgeStore, TopicCatalog};
use rootcause::prelude::Report;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The assembled bot.
pub struct App {
    config: BotConfig,
    sessions: Arc<SessionStore>,
    knowledge: Arc<FileKnowledgeStore>,
    dispatcher: Arc<Dispatcher>,
    transport: Arc<TelegramTransport>,
}

impl App {
    /// Loads configuration and builds the bot.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is missing or invalid, or if
    /// [`App::build`] fails.
    pub fn load() -> Result<Self, Report<StartupError>> {
        let config = BotConfig::load().map_err(|e| StartupError::Config {
            reason: e.to_string(),
        })?;
        info!(
            topics = config.topics.len(),
            quick_questions = config.quick_questions.len(),
            "configuration loaded"
        );
        Self::build(config)
    }

    /// Builds every component from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the topic catalog is invalid or a client cannot
    /// be created.
    pub fn build(config: BotConfig) -> Result<Self, Report<StartupError>> {
        let topics = Arc::new(TopicCatalog::new(config.topics.clone()).map_err(|report| {
            StartupError::Catalog {
                reason: report.to_string(),
            }
        })?);
        let quick_questions = Arc::new(QuickQuestionCatalog::new(config.quick_questions.clone()));

        let knowledge = Arc::new(
            FileKnowledgeStore::new(Arc::clone(&topics), config.knowledge.base_dir.clone())
                .with_cache(config.knowledge.cache),
        );
        let llm = GeminiBackend::new(config.gemini.clone()).map_err(|report| {
            StartupError::Backend {
                reason: report.to_string(),
            }
        })?;
        info!(provider = llm.provider(), model = llm.model(), "LLM backend ready");

        let sessions = Arc::new(SessionStore::new(Arc::clone(&topics)));
        let answers = Arc::new(
            AnswerService::new(
                Arc::clone(&sessions),
                Arc::clone(&knowledge) as Arc<dyn KnowledgeStore>,
                Arc::new(llm) as Arc<dyn LlmBackend>,
            )
            .with_prompt_builder(PromptBuilder::new(config.prompt.preamble.clone()))
            .with_options(config.gemini.options()),
        );
        let router = Arc::new(DispatchRouter::new(
            Arc::clone(&sessions),
            answers,
            Arc::clone(&topics),
            Arc::clone(&quick_questions),
        ));

        let transport = Arc::new(
            TelegramTransport::new(&config.telegram, topics, quick_questions).map_err(
                |report| StartupError::Transport {
                    reason: report.to_string(),
                },
            )?,
        );
        let dispatcher = Arc::new(Dispatcher::new(
            router,
            Arc::clone(&transport) as Arc<dyn ReplySink>,
        ));

        Ok(Self {
            config,
            sessions,
            knowledge,
            dispatcher,
            transport,
        })
    }

    /// Runs until interrupted.
    pub async fn run(self) {
        if self.config.knowledge.warm_up {
            let report = self.knowledge.warm_up().await;
            if report.is_complete() {
                info!(topics = report.loaded.len(), "knowledge loaded");
            } else {
                warn!(
                    loaded = report.loaded.len(),
                    failed = report.failed.len(),
                    "some topics failed to load; they will be retried on demand"
                );
            }
        }

        self.spawn_housekeeping();
        #[cfg(unix)]
        self.spawn_reload_listener();

        info!("polling for updates");
        tokio::select! {
            () = self.transport.run(&self.dispatcher) => {}
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!(error = %e, "failed to listen for shutdown signal");
                }
                info!("shutting down");
            }
        }
    }

    /// Periodically drops idle sessions and retires idle workers.
    fn spawn_housekeeping(&self) {
        let sessions = Arc::clone(&self.sessions);
        let dispatcher = Arc::clone(&self.dispatcher);
        let idle_timeout = self.config.idle_timeout();
        let period = Duration::from_secs(self.config.session.sweep_interval_seconds.max(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                if let Some(max_idle) = idle_timeout {
                    let removed = sessions.sweep_idle(max_idle);
                    if removed > 0 {
                        debug!(removed_sessions = removed, "idle sessions swept");
                    }
                }
                let retired = dispatcher.retire_idle();
                if retired > 0 {
                    debug!(retired_workers = retired, "idle workers retired");
                }
            }
        });
    }

    /// Drops the knowledge cache on SIGHUP.
    #[cfg(unix)]
    fn spawn_reload_listener(&self) {
        use tokio::signal::unix::{SignalKind, signal};

        let mut hangups = match signal(SignalKind::hangup()) {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "knowledge reload on SIGHUP unavailable");
                return;
            }
        };
        let knowledge = Arc::clone(&self.knowledge);
        tokio::spawn(async move {
            while hangups.recv().await.is_some() {
                knowledge.reload();
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Environment;

    fn config() -> BotConfig {
        let vars: config::Map<String, String> = [
            ("TELEGRAM__TOKEN", "123:abc"),
            ("GEMINI__API_KEY", "key"),
            ("KNOWLEDGE__WARM_UP", "false"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        BotConfig::from_sources(None, Environment::default().source(Some(vars))).unwrap()
    }

    #[test]
    fn builds_from_default_config() {
        let app = App::build(config()).unwrap();
        assert!(app.sessions.is_empty());
        assert_eq!(app.dispatcher.active_users(), 0);
        assert_eq!(app.knowledge.cached_topics(), 0);
    }

    #[test]
    fn empty_catalog_fails_fast() {
        let mut config = config();
        config.topics.clear();

        let err = App::build(config).err().unwrap();
        assert!(err.to_string().contains("invalid topic catalog"));
    }

    #[test]
    fn blank_api_key_fails_fast() {
        let mut config = config();
        config.gemini.api_key = String::new();

        let err = App::build(config).err().unwrap();
        assert!(err.to_string().contains("failed to create LLM backend"));
    }
}
