// crates/pt_engine/src/integrator.rs

//! 平流积分器
//!
//! 欧拉与 RK4 两种策略，按步从配置选取。流速样本的 k1 由引擎的
//! 分层批查询提供，积分器内部只为 RK4 的中间位置补采样。
//!
//! 约定：位置在局地平面 [km]，流速 [m/s]，`KM_PER_MS_DAY = 86.4`
//! 把 (m/s)·day 换算成 km。平流不改变深度。

use crate::config::Rk4Config;
use glam::DVec2;
use pt_fields::{CurrentProvider, VelocitySample};
use pt_foundation::{ReferencePoint, KM_PER_MS_DAY};

/// 积分上下文：借用流速场与查询参数
pub struct AdvectionContext<'a> {
    /// 流速场
    pub currents: &'a dyn CurrentProvider,
    /// 局地平面参考点
    pub reference: ReferencePoint,
    /// 步起始模拟日
    pub sim_day: f64,
    /// 吸附后的查询深度 [m]
    pub depth_m: f64,
}

impl AdvectionContext<'_> {
    /// 在局地平面位置处采样流速
    fn sample(&self, position: DVec2, day_offset: f64) -> VelocitySample {
        let (lon, lat) = self.reference.to_lonlat(position.x, position.y);
        self.currents
            .velocity(lon, lat, self.depth_m, self.sim_day + day_offset)
    }
}

/// 一步平流的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvectionStep {
    /// 位移 [km]
    pub displacement_km: DVec2,
    /// 步内平均流速 [m/s]，写回粒子
    pub mean_velocity: DVec2,
    /// 是否发生了移动；k1 缺失时为 false（保持原位）
    pub moved: bool,
}

impl AdvectionStep {
    /// 原地不动
    pub const fn hold() -> Self {
        Self {
            displacement_km: DVec2::ZERO,
            mean_velocity: DVec2::ZERO,
            moved: false,
        }
    }
}

/// 平流积分策略
pub trait Integrator {
    /// 策略名称
    fn name(&self) -> &'static str;

    /// 对单个粒子积分 Δ 天
    ///
    /// `k1` 是引擎在步首批量查询到的流速样本。
    fn advect(
        &self,
        position: DVec2,
        k1: VelocitySample,
        ctx: &AdvectionContext<'_>,
        delta_days: f64,
    ) -> AdvectionStep;
}

// ============================================================
// 欧拉积分器
// ============================================================

/// 一阶欧拉
#[derive(Debug, Clone, Copy, Default)]
pub struct EulerIntegrator;

impl Integrator for EulerIntegrator {
    fn name(&self) -> &'static str {
        "Euler"
    }

    fn advect(
        &self,
        _position: DVec2,
        k1: VelocitySample,
        _ctx: &AdvectionContext<'_>,
        delta_days: f64,
    ) -> AdvectionStep {
        if !k1.found {
            return AdvectionStep::hold();
        }
        let velocity = DVec2::new(k1.u, k1.v);
        AdvectionStep {
            displacement_km: velocity * KM_PER_MS_DAY * delta_days,
            mean_velocity: velocity,
            moved: true,
        }
    }
}

// ============================================================
// RK4 积分器
// ============================================================

/// 自适应子步 RK4
///
/// 外步 Δ 被均分成 `⌈Δ/h⌉` 个子步。子步内按标准偏移量取 k1..k4
/// 四个流速样本；k2..k4 落在陆地时用该子步的 k1 顶替。任一子步的
/// k1 缺失即宣告整步失败，回退为用初始样本的欧拉步。
#[derive(Debug, Clone, Copy)]
pub struct Rk4Integrator {
    config: Rk4Config,
}

impl Rk4Integrator {
    /// 以步长策略创建
    pub fn new(config: Rk4Config) -> Self {
        Self { config }
    }

    /// 根据 k1 流速决定子步长 [天]
    fn sub_step(&self, k1: VelocitySample, delta_days: f64) -> f64 {
        if self.config.adaptive {
            let speed = DVec2::new(k1.u, k1.v).length();
            let raw = self.config.time_step_safety / (speed + 1e-3);
            raw.clamp(self.config.min_step, self.config.max_step)
        } else {
            delta_days.min(self.config.max_step)
        }
    }
}

impl Integrator for Rk4Integrator {
    fn name(&self) -> &'static str {
        "RK4"
    }

    fn advect(
        &self,
        position: DVec2,
        k1: VelocitySample,
        ctx: &AdvectionContext<'_>,
        delta_days: f64,
    ) -> AdvectionStep {
        if !k1.found {
            return AdvectionStep::hold();
        }

        let h = self.sub_step(k1, delta_days);
        let steps = (delta_days / h).ceil().max(1.0) as usize;
        let h_actual = delta_days / steps as f64;

        let euler_fallback = EulerIntegrator.advect(position, k1, ctx, delta_days);

        let mut pos = position;
        let mut elapsed = 0.0;
        let mut velocity_sum = DVec2::ZERO;

        for step in 0..steps {
            // 子步基样本：第一个子步直接用引擎给的 k1
            let s1 = if step == 0 {
                k1
            } else {
                ctx.sample(pos, elapsed)
            };
            if !s1.found {
                return euler_fallback;
            }
            let v1 = DVec2::new(s1.u, s1.v);

            let half = h_actual / 2.0;
            let sample_or = |probe: VelocitySample, fallback: DVec2| -> DVec2 {
                if probe.found {
                    DVec2::new(probe.u, probe.v)
                } else {
                    fallback
                }
            };

            let p2 = pos + v1 * half * KM_PER_MS_DAY;
            let v2 = sample_or(ctx.sample(p2, elapsed + half), v1);

            let p3 = pos + v2 * half * KM_PER_MS_DAY;
            let v3 = sample_or(ctx.sample(p3, elapsed + half), v1);

            let p4 = pos + v3 * h_actual * KM_PER_MS_DAY;
            let v4 = sample_or(ctx.sample(p4, elapsed + h_actual), v1);

            let combined = (v1 + v2 * 2.0 + v3 * 2.0 + v4) / 6.0;
            pos += combined * h_actual * KM_PER_MS_DAY;
            velocity_sum += combined;
            elapsed += h_actual;
        }

        AdvectionStep {
            displacement_km: pos - position,
            mean_velocity: velocity_sum / steps as f64,
            moved: true,
        }
    }
}

// ============================================================
// 测试
// ============================================================
