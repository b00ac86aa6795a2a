// 缓存模块
// 包含缓存键生成、缓存数据结构和存储访问

pub mod keys;
pub mod models;
pub mod store;

// 重新导出常用类型，方便其他模块使用
pub use models::profile::UserProfile;
pub use models::session::SessionRecord;
pub use store::{CacheStore, RedisCacheStore};
