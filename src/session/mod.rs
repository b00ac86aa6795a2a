// 会话域模块
// 核心的会话解析与资料批量查询逻辑

pub mod profiles;
pub mod resolver;

#[cfg(test)]
pub(crate) mod testing;

pub use profiles::ProfileFetcher;
pub use resolver::SessionResolver;
