pub mod conversation;
pub mod message;

pub use conversation::{
    Conversation, ConversationParticipant, ConversationSummary, ParticipantPair, UserSummary,
};
pub use message::{Message, MessagePage, NewMessage, PageRequest};
