// crates/pt_foundation/src/lib.rs

//! PROTEUS 基础层
//!
//! 不含任何业务领域概念的最底层 crate：
//! - [`error`]: 项目级错误分类与结果别名
//! - [`time`]: 模拟日偏移与日历日期换算
//! - [`geo`]: 局地平面坐标与球面距离
//!
//! 上层 crate（场服务、粒子引擎、烘焙）都依赖本层，本层不依赖它们。

pub mod error;
pub mod geo;
pub mod time;

pub use error::{PlumeError, PlumeResult};
pub use geo::{ReferencePoint, KM_PER_MS_DAY, LAT_SCALE_KM_PER_DEG, LON_SCALE_KM_PER_DEG};
pub use time::SimClock;
