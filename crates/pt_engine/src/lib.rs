// crates/pt_engine/src/lib.rs

//! PROTEUS 粒子引擎层
//!
//! 拉格朗日粒子系综与它的时间推进：
//! - [`tracer`]: 放射性核素目录
//! - [`release`]: 多相排放日程与活度标定
//! - [`particle`]: 粒子记录与环形历史
//! - [`config`]: 封闭的引擎配置记录
//! - [`integrator`]: 欧拉 / RK4 平流策略
//! - [`mixing`]: 水平随机游走与垂向混合
//! - [`land`]: 路径安全检查
//! - [`stats`]: 聚合统计
//! - [`engine`]: 流水线主体与状态机

pub mod config;
pub mod engine;
pub mod integrator;
pub mod land;
pub mod mixing;
pub mod particle;
pub mod release;
pub mod stats;
pub mod tracer;

pub use config::{EngineConfig, KzProfile, LandConfig, Rk4Config};
pub use engine::{EngineState, ParticleEngine};
pub use particle::{HistoryRing, HistorySample, Particle, HISTORY_CAPACITY};
pub use release::{ReleaseManager, ReleasePhase, ReleaseUnit};
pub use stats::EngineStats;
pub use tracer::{Tracer, TracerLibrary, DEFAULT_TRACER_ID};
