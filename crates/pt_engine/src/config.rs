// crates/pt_engine/src/config.rs

//! 引擎配置
//!
//! 封闭的配置记录：每个可识别选项都是具名字段，未知键在编译期
//! 就不存在。全部字段可 JSON 序列化，逐字段给默认值。

use pt_foundation::{PlumeError, PlumeResult, SimClock};
use serde::{Deserialize, Serialize};

fn default_pool_size() -> usize {
    10_000
}
fn default_ref_lon() -> f64 {
    141.0333 // 福岛第一核电站排水口
}
fn default_ref_lat() -> f64 {
    37.4217
}
fn default_diffusivity_scale() -> f64 {
    1.0
}
fn default_simulation_speed() -> f64 {
    1.0
}
fn default_true() -> bool {
    true
}
fn default_ekman_pumping() -> f64 {
    5e-6
}
fn default_convective_mixing() -> f64 {
    2e-6
}
fn default_random_seed() -> u64 {
    0x50524f54 // "PROT"
}

/// 引擎配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 粒子池大小
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// 局地平面参考经度 [°]（释放点）
    #[serde(default = "default_ref_lon")]
    pub reference_lon: f64,

    /// 局地平面参考纬度 [°]
    #[serde(default = "default_ref_lat")]
    pub reference_lat: f64,

    /// 场值 K 的全局乘子
    #[serde(default = "default_diffusivity_scale")]
    pub diffusivity_scale: f64,

    /// 墙钟 Δt → 模拟 Δt 的乘子 [模拟日/秒]
    ///
    /// 仅在 Δt 由真实时间推导时使用；烘焙固定步长不经过它。
    #[serde(default = "default_simulation_speed")]
    pub simulation_speed: f64,

    /// 是否启用垂向混合
    #[serde(default = "default_true")]
    pub vertical_mixing: bool,

    /// Ekman 抽吸：常年向下速度 [m/s]
    #[serde(default = "default_ekman_pumping")]
    pub ekman_pumping: f64,

    /// 冬季对流混合附加向下速度 [m/s]，只作用于 100 m 以浅
    #[serde(default = "default_convective_mixing")]
    pub convective_mixing: f64,

    /// 平流积分器选择：true 用 RK4，false 用欧拉
    #[serde(default)]
    pub rk4_enabled: bool,

    /// RK4 步长策略
    #[serde(default)]
    pub rk4: Rk4Config,

    /// 陆地反射规则
    #[serde(default)]
    pub land: LandConfig,

    /// 垂向扩散系数分层剖面
    #[serde(default)]
    pub kz_profile: KzProfile,

    /// 随机数种子：同种子烘焙可复现
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,

    /// 模拟时钟（基准日期）
    #[serde(default)]
    pub clock: SimClock,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            reference_lon: default_ref_lon(),
            reference_lat: default_ref_lat(),
            diffusivity_scale: default_diffusivity_scale(),
            simulation_speed: default_simulation_speed(),
            vertical_mixing: true,
            ekman_pumping: default_ekman_pumping(),
            convective_mixing: default_convective_mixing(),
            rk4_enabled: false,
            rk4: Rk4Config::default(),
            land: LandConfig::default(),
            kz_profile: KzProfile::default(),
            random_seed: default_random_seed(),
            clock: SimClock::default(),
        }
    }
}

impl EngineConfig {
    /// 配置边界校验；失败时拒绝整体应用
    pub fn validate(&self) -> PlumeResult<()> {
        if self.pool_size == 0 {
            return Err(PlumeError::invalid_configuration("pool_size must be positive"));
        }
        if self.diffusivity_scale < 0.0 {
            return Err(PlumeError::invalid_configuration(
                "diffusivity_scale must be >= 0",
            ));
        }
        if self.simulation_speed <= 0.0 {
            return Err(PlumeError::invalid_configuration(
                "simulation_speed must be positive",
            ));
        }
        self.rk4.validate()?;
        Ok(())
    }
}

fn default_safety() -> f64 {
    0.2
}
fn default_min_step() -> f64 {
    0.05
}
fn default_max_step() -> f64 {
    0.5
}

/// RK4 步长策略
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rk4Config {
    /// 自适应步长的安全系数
    #[serde(default = "default_safety")]
    pub time_step_safety: f64,
    /// 子步下限 [天]
    #[serde(default = "default_min_step")]
    pub min_step: f64,
    /// 子步上限 [天]
    #[serde(default = "default_max_step")]
    pub max_step: f64,
    /// 是否按流速自适应；false 时用 min(Δt, max_step)
    #[serde(default = "default_true")]
    pub adaptive: bool,
}

impl Default for Rk4Config {
    fn default() -> Self {
        Self {
            time_step_safety: default_safety(),
            min_step: default_min_step(),
            max_step: default_max_step(),
            adaptive: true,
        }
    }
}

impl Rk4Config {
    fn validate(&self) -> PlumeResult<()> {
        if self.min_step <= 0.0 || self.max_step < self.min_step {
            return Err(PlumeError::invalid_configuration(
                "rk4 steps must satisfy 0 < min_step <= max_step",
            ));
        }
        if self.time_step_safety <= 0.0 {
            return Err(PlumeError::invalid_configuration(
                "rk4 time_step_safety must be positive",
            ));
        }
        Ok(())
    }
}

fn default_max_search_radius() -> usize {
    5
}

/// 陆地交互规则配置
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LandConfig {
    /// 是否启用路径安全与上岸回退
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 最近海洋单元螺旋搜索半径 [格]
    #[serde(default = "default_max_search_radius")]
    pub max_search_radius: usize,
}

impl Default for LandConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_search_radius: default_max_search_radius(),
        }
    }
}

fn default_kz_mixed() -> f64 {
    1e-2
}
fn default_kz_upper() -> f64 {
    1e-4
}
fn default_kz_deep() -> f64 {
    5e-5
}
fn default_mixed_layer_depth() -> f64 {
    50.0
}
fn default_upper_ocean_depth() -> f64 {
    200.0
}

/// 分段垂向扩散系数剖面 [m²/s]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KzProfile {
    /// 混合层（浅于 `mixed_layer_depth_m`）
    #[serde(default = "default_kz_mixed")]
    pub mixed_layer: f64,
    /// 上层海洋
    #[serde(default = "default_kz_upper")]
    pub upper_ocean: f64,
    /// 深层海洋
    #[serde(default = "default_kz_deep")]
    pub deep_ocean: f64,
    /// 混合层底深度 [m]
    #[serde(default = "default_mixed_layer_depth")]
    pub mixed_layer_depth_m: f64,
    /// 上层海洋底深度 [m]
    #[serde(default = "default_upper_ocean_depth")]
    pub upper_ocean_depth_m: f64,
}

impl Default for KzProfile {
    fn default() -> Self {
        Self {
            mixed_layer: default_kz_mixed(),
            upper_ocean: default_kz_upper(),
            deep_ocean: default_kz_deep(),
            mixed_layer_depth_m: default_mixed_layer_depth(),
            upper_ocean_depth_m: default_upper_ocean_depth(),
        }
    }
}

impl KzProfile {
    /// 指定深度 [m] 处的 Kz
    #[inline]
    pub fn kz_at(&self, depth_m: f64) -> f64 {
        if depth_m < self.mixed_layer_depth_m {
            self.mixed_layer
        } else if depth_m < self.upper_ocean_depth_m {
            self.upper_ocean
        } else {
            self.deep_ocean
        }
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.pool_size, 10_000);
        assert!((config.ekman_pumping - 5e-6).abs() < 1e-18);
        assert!((config.convective_mixing - 2e-6).abs() < 1e-18);
        assert!(!config.rk4_enabled);
        assert!(config.land.enabled);
        assert_eq!(config.land.max_search_radius, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EngineConfig::default();
        config.pool_size = 0;
        assert!(config.validate().unwrap_err().is_configuration());

        let mut config = EngineConfig::default();
        config.rk4.min_step = 0.5;
        config.rk4.max_step = 0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_kz_profile_bands() {
        let profile = KzProfile::default();
        assert!((profile.kz_at(10.0) - 1e-2).abs() < 1e-15);
        assert!((profile.kz_at(100.0) - 1e-4).abs() < 1e-15);
        assert!((profile.kz_at(500.0) - 5e-5).abs() < 1e-15);
        // 边界属于下一段
        assert!((profile.kz_at(50.0) - 1e-4).abs() < 1e-15);
        assert!((profile.kz_at(200.0) - 5e-5).abs() < 1e-15);
    }

    #[test]
    fn test_json_roundtrip_with_partial_document() {
        // 只给出部分键，其余取默认
        let json = r#"{"pool_size": 500, "rk4_enabled": true, "rk4": {"max_step": 0.1}}"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.pool_size, 500);
        assert!(config.rk4_enabled);
        assert!((config.rk4.max_step - 0.1).abs() < 1e-12);
        assert!((config.rk4.min_step - 0.05).abs() < 1e-12);
        assert!((config.ekman_pumping - 5e-6).abs() < 1e-18);
    }
}
