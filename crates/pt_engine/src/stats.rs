//! 引擎聚合统计
//!
//! 计数器在一步内部更新，只有在步边界上才保证一致。

use serde::{Deserialize, Serialize};

/// 聚合统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineStats {
    /// 累计激活粒子数，单调不减
    pub total_released: u64,
    /// 累计衰变出局粒子数
    pub total_decayed: u64,
    /// 当前激活粒子数
    pub active_particles: usize,
    /// 上一步被陆地规则拦下的粒子数
    pub particles_on_land: u64,
    /// 达到过的最大深度 [m]
    pub max_depth_reached: f64,
    /// 观测到的最大浓度 [Bq/m³]
    pub max_concentration: f64,
    /// 模拟经过的天数
    pub simulation_days: f64,
}

impl EngineStats {
    /// 归零
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
