use crate::{
    config::Config,
    repository::MessagingRepository,
    services::{ConversationService, MessageLimits, MessageService, NotificationHook},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub conversations: ConversationService,
    pub messages: MessageService,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        repo: Arc<dyn MessagingRepository>,
        notifier: Arc<dyn NotificationHook>,
    ) -> Self {
        let limits = MessageLimits {
            max_length: config.message_max_length,
            page_size_max: config.message_page_size_max,
        };
        Self {
            conversations: ConversationService::new(repo.clone()),
            messages: MessageService::new(repo, notifier, limits),
            config,
        }
    }
}
