// crates/pt_engine/src/mixing.rs

//! 随机混合过程
//!
//! 水平方向：随机游走，步长方差 2·K·Δt；
//! 垂向：分层 Kz 随机游走 + 沉降 + Ekman 抽吸 + 冬季对流。
//! 两者共用引擎的种子化随机数发生器，烘焙可复现。

use crate::config::{EngineConfig, KzProfile};
use crate::tracer::Tracer;
use glam::DVec2;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// 秒/天
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// 冬季对流混合的作用深度上限 [m]
pub const CONVECTIVE_DEPTH_LIMIT_M: f64 = 100.0;

/// 水平随机游走位移 [km]
///
/// `k_eff` 为生效的水平扩散系数 [m²/s]；x、y 两个方向独立取高斯增量。
pub fn horizontal_step<R: Rng>(rng: &mut R, k_eff: f64, delta_days: f64) -> DVec2 {
    if k_eff <= 0.0 || delta_days <= 0.0 {
        return DVec2::ZERO;
    }
    let sigma_km = (2.0 * k_eff * delta_days * SECONDS_PER_DAY).sqrt() / 1000.0;
    let normal = Normal::new(0.0, sigma_km).expect("sigma is finite and positive");
    DVec2::new(normal.sample(rng), normal.sample(rng))
}

/// 生效水平扩散系数 [m²/s]
///
/// 场命中：K_field · 全局乘子 · 示踪剂乘子；未命中退回下限 20。
pub fn effective_diffusivity(
    field_k: f64,
    field_found: bool,
    config: &EngineConfig,
    tracer: &Tracer,
) -> f64 {
    if field_found {
        field_k * config.diffusivity_scale * tracer.diffusivity_scale
    } else {
        pt_fields::K_MIN * config.diffusivity_scale
    }
}

/// 垂向位移 [m]，向下为正
///
/// Δz = N(0,1)·√(2·Kz·Δt) + w_settle·Δt + w_ekman·Δt + 冬季对流项。
/// 对流项只作用于 100 m 以浅、且处于冬季时。
pub fn vertical_step<R: Rng>(
    rng: &mut R,
    kz_profile: &KzProfile,
    config: &EngineConfig,
    tracer: &Tracer,
    depth_m: f64,
    delta_days: f64,
    winter: bool,
) -> f64 {
    let dt = delta_days * SECONDS_PER_DAY;
    let kz = kz_profile.kz_at(depth_m);

    let normal = Normal::new(0.0, 1.0).expect("unit normal");
    let random_walk = normal.sample(rng) * (2.0 * kz * dt).sqrt();
    let settling = tracer.settling_velocity * dt;
    let ekman = config.ekman_pumping * dt;
    let convective = if winter && depth_m < CONVECTIVE_DEPTH_LIMIT_M {
        config.convective_mixing * dt
    } else {
        0.0
    };

    random_walk + settling + ekman + convective
}

// ============================================================
// 测试
// ============================================================
