// 缓存数据模型

pub mod profile;
pub mod session;
