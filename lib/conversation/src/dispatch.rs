//! Per-user event dispatch.
//!
//! Events from one user are handled strictly in arrival order by a
//! dedicated worker task; different users never wait on each other.

use crate::error::DeliveryError;
use crate::event::{InboundEvent, Reply};
use crate::router::DispatchRouter;
use async_trait::async_trait;
use program_advisor_core::UserId;
use rootcause::Report;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::{Instrument, debug, info_span, warn};

/// Delivers replies back through the transport.
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Signals that a question is being worked on. Best effort.
    async fn started(&self, _event: &InboundEvent) {}

    /// Delivers the reply produced for `event`.
    async fn deliver(&self, event: &InboundEvent, reply: Reply) -> Result<(), Report<DeliveryError>>;
}

struct Worker {
    sender: mpsc::UnboundedSender<InboundEvent>,
    /// Events submitted but not yet delivered.
    pending: Arc<AtomicUsize>,
}

/// Fans inbound events out to per-user workers.
pub struct Dispatcher {
    router: Arc<DispatchRouter>,
    sink: Arc<dyn ReplySink>,
    workers: Mutex<HashMap<UserId, Worker>>,
}

impl Dispatcher {
    /// Creates a dispatcher. Must be used from within a tokio runtime.
    #[must_use]
    pub fn new(router: Arc<DispatchRouter>, sink: Arc<dyn ReplySink>) -> Self {
        Self {
            router,
            sink,
            workers: Mutex::new(HashMap::new()),
        }
    }

    /// Queues an event behind any earlier events from the same user.
    pub fn submit(&self, event: InboundEvent) {
        let user_id = event.user_id;
        let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
        let worker = workers
            .entry(user_id)
            .or_insert_with(|| self.spawn_worker(user_id));

        worker.pending.fetch_add(1, Ordering::SeqCst);
        if let Err(mpsc::error::SendError(event)) = worker.sender.send(event) {
            warn!(user = %user_id, "worker stopped unexpectedly, restarting");
            let fresh = self.spawn_worker(user_id);
            fresh.pending.fetch_add(1, Ordering::SeqCst);
            if fresh.sender.send(event).is_err() {
                warn!(user = %user_id, "event dropped, worker did not start");
            }
            workers.insert(user_id, fresh);
        }
    }

    /// Stops workers with nothing queued. Returns how many were stopped.
    ///
    /// A later event for the same user starts a new worker.
    pub fn retire_idle(&self) -> usize {
        let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
        let before = workers.len();
        workers.retain(|_, worker| worker.pending.load(Ordering::SeqCst) > 0);
        before - workers.len()
    }

    /// Returns the number of users with a running worker.
    #[must_use]
    pub fn active_users(&self) -> usize {
        self.workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn spawn_worker(&self, user_id: UserId) -> Worker {
        let (sender, receiver) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        tokio::spawn(
            run_worker(
                receiver,
                Arc::clone(&self.router),
                Arc::clone(&self.sink),
                Arc::clone(&pending),
            )
            .instrument(info_span!("worker", user = %user_id)),
        );
        Worker { sender, pending }
    }
}

async fn run_worker(
    mut receiver: mpsc::UnboundedReceiver<InboundEvent>,
    router: Arc<DispatchRouter>,
    sink: Arc<dyn ReplySink>,
    pending: Arc<AtomicUsize>,
) {
    debug!("worker started");
    while let Some(event) = receiver.recv().await {
        if event.kind.asks_question() {
            sink.started(&event).await;
        }
        let reply = router.handle(&event).await;
        if let Err(report) = sink.deliver(&event, reply).await {
            warn!(event = %event.id, error = %report, "reply delivery failed");
        }
        pending.fetch_sub(1, Ordering::SeqCst);
    }
    debug!("worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::AnswerService;
    use crate::event::EventKind;
    use crate::quick::QuickQuestionCatalog;
    use crate::session::SessionStore;
    use crate::test_support::{FakeKnowledge, Script, ScriptedBackend, catalog};
    use program_advisor_ai::LlmBackend;
    use program_advisor_core::TopicId;
    use program_advisor_knowledge::KnowledgeStore;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    struct ChannelSink {
        replies: mpsc::UnboundedSender<Reply>,
        fail_first: AtomicBool,
        started: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl ReplySink for ChannelSink {
        async fn started(&self, event: &InboundEvent) {
            self.started.lock().unwrap().push(event.kind.name());
        }

        async fn deliver(
            &self,
            _event: &InboundEvent,
            reply: Reply,
        ) -> Result<(), Report<DeliveryError>> {
            if self.fail_first.swap(false, Ordering::SeqCst) {
                return Err(DeliveryError::SendFailed {
                    reason: "connection reset".to_string(),
                }
                .into());
            }
            self.replies.send(reply).map_err(|_| DeliveryError::SendFailed {
                reason: "test receiver gone".to_string(),
            })?;
            Ok(())
        }
    }

    fn dispatcher(
        script: Script,
        fail_first: bool,
    ) -> (Dispatcher, Arc<ChannelSink>, mpsc::UnboundedReceiver<Reply>) {
        let topics = catalog();
        let sessions = Arc::new(SessionStore::new(Arc::clone(&topics)));
        let answers = Arc::new(AnswerService::new(
            Arc::clone(&sessions),
            Arc::new(FakeKnowledge::programs()) as Arc<dyn KnowledgeStore>,
            Arc::new(ScriptedBackend::new(script)) as Arc<dyn LlmBackend>,
        ));
        let router = Arc::new(DispatchRouter::new(
            sessions,
            answers,
            topics,
            Arc::new(QuickQuestionCatalog::default()),
        ));
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Arc::new(ChannelSink {
            replies: tx,
            fail_first: AtomicBool::new(fail_first),
            started: Mutex::new(Vec::new()),
        });
        let dispatcher = Dispatcher::new(router, Arc::clone(&sink) as Arc<dyn ReplySink>);
        (dispatcher, sink, rx)
    }

    fn select(user: UserId, topic: &str) -> InboundEvent {
        InboundEvent::new(
            user,
            EventKind::SelectTopic {
                topic_id: TopicId::new(topic),
            },
        )
    }

    fn ask(user: UserId, text: &str) -> InboundEvent {
        InboundEvent::new(
            user,
            EventKind::FreeText {
                text: text.to_string(),
            },
        )
    }

    #[tokio::test]
    async fn events_from_one_user_are_handled_in_order() {
        let (dispatcher, _sink, mut replies) = dispatcher(Script::Reply("ответ".to_string()), false);
        let user = UserId::new(1);

        dispatcher.submit(InboundEvent::new(user, EventKind::Start));
        dispatcher.submit(select(user, "ai"));
        dispatcher.submit(ask(user, "Сколько стоит обучение?"));

        let start = replies.recv().await.unwrap();
        let selected = replies.recv().await.unwrap();
        let answered = replies.recv().await.unwrap();

        assert!(start.messages[0].text.starts_with("👋"));
        assert!(selected.messages[0].text.starts_with("✅"));
        assert_eq!(answered.texts().collect::<Vec<_>>(), vec!["ответ"]);
        assert_eq!(dispatcher.active_users(), 1);
    }

    #[tokio::test]
    async fn only_questions_signal_work_started() {
        let (dispatcher, sink, mut replies) = dispatcher(Script::Reply("ok".to_string()), false);
        let user = UserId::new(5);

        dispatcher.submit(InboundEvent::new(user, EventKind::Start));
        dispatcher.submit(select(user, "ai"));
        dispatcher.submit(ask(user, "Какие есть стипендии?"));
        for _ in 0..3 {
            replies.recv().await.unwrap();
        }

        assert_eq!(*sink.started.lock().unwrap(), vec!["free_text"]);
    }

    #[tokio::test]
    async fn concurrent_users_do_not_share_topics() {
        let (dispatcher, _sink, mut replies) = dispatcher(Script::EchoContext, false);
        let alice = UserId::new(1);
        let bob = UserId::new(2);

        dispatcher.submit(select(alice, "ai"));
        dispatcher.submit(select(bob, "product"));
        dispatcher.submit(ask(alice, "Сколько стоит обучение?"));
        dispatcher.submit(ask(bob, "Сколько стоит обучение?"));

        let mut answers = HashMap::new();
        for _ in 0..4 {
            let reply = replies.recv().await.unwrap();
            let text = reply.messages[0].text.clone();
            if !text.starts_with("✅") {
                answers.insert(reply.user_id, text);
            }
        }

        assert!(answers[&alice].contains("599 000 ₽"));
        assert!(!answers[&alice].contains("650 000 ₽"));
        assert!(answers[&bob].contains("650 000 ₽"));
        assert!(!answers[&bob].contains("599 000 ₽"));
        assert_eq!(dispatcher.active_users(), 2);
    }

    #[tokio::test]
    async fn delivery_failure_does_not_stop_worker() {
        let (dispatcher, _sink, mut replies) = dispatcher(Script::Reply("ok".to_string()), true);
        let user = UserId::new(3);

        dispatcher.submit(InboundEvent::new(user, EventKind::Start));
        dispatcher.submit(select(user, "ai"));

        let reply = replies.recv().await.unwrap();
        assert!(reply.messages[0].text.starts_with("✅"));
    }

    #[tokio::test]
    async fn idle_workers_are_retired_and_restarted() {
        let (dispatcher, _sink, mut replies) = dispatcher(Script::Reply("ok".to_string()), false);
        let user = UserId::new(4);

        dispatcher.submit(select(user, "ai"));
        replies.recv().await.unwrap();

        let mut retired = 0;
        for _ in 0..100 {
            retired = dispatcher.retire_idle();
            if retired > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(retired, 1);
        assert_eq!(dispatcher.active_users(), 0);

        dispatcher.submit(ask(user, "q"));
        let reply = replies.recv().await.unwrap();
        assert_eq!(reply.texts().collect::<Vec<_>>(), vec!["ok"]);
    }
}
