// crates/pt_fields/src/lib.rs

//! PROTEUS 场服务层
//!
//! 流式提供驱动粒子引擎的两类网格场：
//! - [`currents`]: 4 维流速场（日 × 深度 × 纬 × 经），KD 树最近邻
//! - [`diffusivity`]: 3 维涡动扩散系数场（日 × 纬 × 经），粗分桶索引
//!
//! 支撑模块：
//! - [`format`]: 日文件二进制编解码
//! - [`metadata`]: 数据集 JSON 元数据
//! - [`cache`]: 有界日缓存（LRU + 活跃日钉住 + 按键单飞）
//! - [`kdtree`] / [`bucket`]: 空间索引
//! - [`provider`]: 引擎借用的能力接口
//!
//! 服务由组合根构造并 `init()`，其它组件一律通过 [`provider`]
//! 中的 trait 访问，不自行创建服务实例。

pub mod bucket;
pub mod cache;
pub mod currents;
pub mod diffusivity;
pub mod format;
pub mod kdtree;
pub mod metadata;
pub mod provider;

pub use currents::{CurrentFieldService, CurrentsConfig, DEFAULT_DEPTHS};
pub use diffusivity::{DiffusivityConfig, DiffusivityFieldService, K_MAX, K_MIN};
pub use provider::{
    CurrentProvider, DiffusivityProvider, DiffusivitySample, OceanCell, VelocitySample,
};
