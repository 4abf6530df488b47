pub mod conversation_service;
pub mod message_service;
pub mod notification;
pub mod read_state;

pub use conversation_service::ConversationService;
pub use message_service::{MessageLimits, MessageService};
pub use notification::{LoggingNotificationHook, Notification, NotificationHook, PgNotificationHook};
