pub mod api;
pub mod assistant;
pub mod chat;
pub mod knowledge;
pub mod search;

pub use api::{ApiServer, ApiServerConfig};
pub use assistant::{Assistant, ChatResponse};
pub use chat::{Message, MessageKind, MessageRole, MessageStore, NewMessage, ResponseMeta};
pub use knowledge::{FaqRecord, FaqStep, InvalidRecord, KnowledgeBase, NewFaqRecord};
pub use search::{
    Embedder, HybridSearchEngine, MatchType, SearchConfig, SearchResult, SearchStats,
};
