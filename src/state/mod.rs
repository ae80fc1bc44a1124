// 状态管理模块

mod session;

pub use session::SessionState;
