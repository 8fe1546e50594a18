//! 探测模块
//!
//! 提供TCP端口探测、结果处理和轮询调度功能

pub mod prober;
pub mod result;
pub mod scheduler;

// 重新导出主要类型
pub use prober::{Prober, TcpProber};
pub use result::{CycleSummary, ProbeResult, ProbeStatus};
pub use scheduler::{PollScheduler, SchedulerStatus};
