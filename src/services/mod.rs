pub mod codec;
pub mod page_service;
pub mod store;

pub use page_service::PageService;
pub use store::{MemoryStore, PageStore, RedisStore};
