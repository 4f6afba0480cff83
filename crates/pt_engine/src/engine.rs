// crates/pt_engine/src/engine.rs

//! 粒子引擎
//!
//! 持有粒子池，按步推进流水线：
//!
//! ```text
//! 释放 → 平流 → 扩散 → 陆地检查 → 垂向混合 → 年龄/衰变 → 浓度 → 历史
//! ```
//!
//! 引擎独占释放管理器与粒子池，通过能力接口借用两个场服务
//! （构造注入，不持有任何全局量）。一步之内按深度桶、再按粒子
//! 顺序处理，粒子之间没有共享可变状态。
//!
//! 状态机 {Idle, Running, Paused}：`advance` 仅在 Running 下生效，
//! `reset` 清空粒子池、统计归零、模拟日归零。

use crate::config::EngineConfig;
use crate::integrator::{AdvectionContext, EulerIntegrator, Integrator, Rk4Integrator};
use crate::land::check_path;
use crate::mixing::{effective_diffusivity, horizontal_step, vertical_step, SECONDS_PER_DAY};
use crate::particle::{HistorySample, Particle};
use crate::release::{ReleaseManager, ReleasePhase};
use crate::stats::EngineStats;
use crate::tracer::{Tracer, TracerLibrary};
use glam::DVec2;
use pt_fields::{CurrentProvider, DiffusivityProvider, VelocitySample};
use pt_foundation::{PlumeError, PlumeResult, ReferencePoint, LON_SCALE_KM_PER_DEG};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// 释放点散布标准差 [km]
const RELEASE_SIGMA_KM: f64 = 20.0;

/// 引擎状态机
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// 空闲：尚未启动或已重置
    Idle,
    /// 推进中
    Running,
    /// 暂停
    Paused,
}

/// 粒子引擎
pub struct ParticleEngine<C: CurrentProvider, K: DiffusivityProvider> {
    config: EngineConfig,
    reference: ReferencePoint,
    library: TracerLibrary,
    release: ReleaseManager,
    particles: Vec<Particle>,
    stats: EngineStats,
    state: EngineState,
    sim_day: f64,
    rng: StdRng,
    euler: EulerIntegrator,
    rk4: Rk4Integrator,
    currents: C,
    diffusivity: K,
}

impl<C: CurrentProvider, K: DiffusivityProvider> ParticleEngine<C, K> {
    /// 创建引擎；校验失败时配置整体拒绝
    pub fn new(config: EngineConfig, currents: C, diffusivity: K) -> PlumeResult<Self> {
        config.validate()?;

        let library = TracerLibrary::standard();
        let mut release = ReleaseManager::default();
        release.add_default_phase(&library);

        let particles = (0..config.pool_size)
            .map(|i| Particle::inactive(i as u32))
            .collect();
        let reference = ReferencePoint::new(config.reference_lon, config.reference_lat);
        let rng = StdRng::seed_from_u64(config.random_seed);
        let rk4 = Rk4Integrator::new(config.rk4);

        Ok(Self {
            config,
            reference,
            library,
            release,
            particles,
            stats: EngineStats::default(),
            state: EngineState::Idle,
            sim_day: 0.0,
            rng,
            euler: EulerIntegrator,
            rk4,
            currents,
            diffusivity,
        })
    }

    // ------------------------------------------------------------
    // 访问器
    // ------------------------------------------------------------

    /// 配置
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 聚合统计；只有步边界上保证一致
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// 当前状态
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// 当前模拟日
    pub fn sim_day(&self) -> f64 {
        self.sim_day
    }

    /// 粒子池只读视图
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// 粒子池可变视图（测试与标定工具用）
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// 示踪剂目录
    pub fn library(&self) -> &TracerLibrary {
        &self.library
    }

    /// 释放管理器只读视图
    pub fn release_manager(&self) -> &ReleaseManager {
        &self.release
    }

    /// 当前激活粒子数
    pub fn active_count(&self) -> usize {
        self.particles.iter().filter(|p| p.active).count()
    }

    // ------------------------------------------------------------
    // 配置操作
    // ------------------------------------------------------------

    /// 重绑示踪剂；未知 id 在配置边界拒绝
    pub fn set_tracer(&mut self, id: &str) -> PlumeResult<()> {
        if !self.library.contains(id) {
            return Err(PlumeError::invalid_configuration(format!(
                "unknown tracer id '{}'",
                id
            )));
        }
        self.release.set_tracer(id);
        Ok(())
    }

    /// 用当前示踪剂的默认库存生成单相日程
    pub fn add_default_phase(&mut self) {
        self.release.add_default_phase(&self.library);
    }

    /// 原子替换排放日程
    pub fn set_phases(&mut self, phases: Vec<ReleasePhase>) -> PlumeResult<()> {
        self.release.set_phases(phases)
    }

    /// 调整 K 全局乘子
    pub fn set_diffusivity_scale(&mut self, scale: f64) -> PlumeResult<()> {
        if scale < 0.0 {
            return Err(PlumeError::invalid_configuration(
                "diffusivity_scale must be >= 0",
            ));
        }
        self.config.diffusivity_scale = scale;
        Ok(())
    }

    /// 调整墙钟换算速率
    pub fn set_simulation_speed(&mut self, speed: f64) -> PlumeResult<()> {
        if speed <= 0.0 {
            return Err(PlumeError::invalid_configuration(
                "simulation_speed must be positive",
            ));
        }
        self.config.simulation_speed = speed;
        Ok(())
    }

    /// 切换积分器
    pub fn set_rk4_enabled(&mut self, enabled: bool) {
        self.config.rk4_enabled = enabled;
    }

    /// 开关垂向混合
    pub fn set_vertical_mixing(&mut self, enabled: bool) {
        self.config.vertical_mixing = enabled;
    }

    // ------------------------------------------------------------
    // 状态机
    // ------------------------------------------------------------

    /// Idle → Running
    pub fn start(&mut self) {
        if self.state == EngineState::Idle {
            self.state = EngineState::Running;
            tracing::info!("engine started");
        }
    }

    /// Running → Paused
    pub fn pause(&mut self) {
        if self.state == EngineState::Running {
            self.state = EngineState::Paused;
        }
    }

    /// Paused → Running
    pub fn resume(&mut self) {
        if self.state == EngineState::Paused {
            self.state = EngineState::Running;
        }
    }

    /// 任意状态 → Idle：清空粒子池、统计归零、模拟日归零
    pub fn reset(&mut self) {
        for (i, particle) in self.particles.iter_mut().enumerate() {
            *particle = Particle::inactive(i as u32);
        }
        self.stats.reset();
        self.sim_day = 0.0;
        self.rng = StdRng::seed_from_u64(self.config.random_seed);
        self.release.reset_accumulator();
        self.state = EngineState::Idle;
        tracing::info!("engine reset");
    }

    // ------------------------------------------------------------
    // 释放
    // ------------------------------------------------------------

    /// 激活至多 n 个未激活粒子，返回实际激活数
    ///
    /// 初始位置从以参考点为中心的二维正态分布采样，
    /// σ = 20 km 换算到经度度数，硬截断在 ±3σ。
    pub fn release(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        let mass_gbq = self.release.particle_activity(self.config.pool_size);
        let tracer_id = self.library.lookup(self.release.tracer_id()).id;

        let sigma_deg = RELEASE_SIGMA_KM / LON_SCALE_KM_PER_DEG;
        let normal = Normal::new(0.0, sigma_deg).expect("sigma is positive");
        let clamp = 3.0 * sigma_deg;

        let mut count = 0usize;
        let sim_day = self.sim_day;
        for particle in self.particles.iter_mut().filter(|p| !p.active) {
            if count >= n {
                break;
            }
            let d_lon: f64 = normal.sample(&mut self.rng).clamp(-clamp, clamp);
            let d_lat: f64 = normal.sample(&mut self.rng).clamp(-clamp, clamp);
            let position = DVec2::new(
                d_lon * LON_SCALE_KM_PER_DEG,
                d_lat * pt_foundation::LAT_SCALE_KM_PER_DEG,
            );
            particle.activate(tracer_id, position, mass_gbq, sim_day);
            count += 1;
        }

        self.stats.total_released += count as u64;
        self.stats.active_particles = self.particles.iter().filter(|p| p.active).count();
        count
    }

    /// 连续释放：按当前相位速率折算成粒子数，亚整数进位
    pub fn continuous_release(&mut self, delta_days: f64) -> usize {
        let rate_gbq = self.release.rate_gbq_at(self.sim_day);
        if rate_gbq <= 0.0 || delta_days <= 0.0 {
            return 0;
        }
        let mass_per_particle = self.release.particle_activity(self.config.pool_size);
        if mass_per_particle <= 0.0 {
            return 0;
        }
        let fractional = rate_gbq * delta_days / mass_per_particle;
        let n = self.release.accumulate(fractional);
        if n > 0 {
            self.release(n)
        } else {
            0
        }
    }

    // ------------------------------------------------------------
    // 推进
    // ------------------------------------------------------------

    /// 推进 Δ 天；Running 之外是空操作
    ///
    /// 顺序：连续释放（用增量前的模拟日）→ 粒子更新 → 模拟日自增。
    pub fn advance(&mut self, delta_days: f64) {
        if self.state != EngineState::Running || delta_days <= 0.0 {
            return;
        }
        self.stats.particles_on_land = 0;

        self.continuous_release(delta_days);
        self.step_particles(delta_days);

        self.sim_day += delta_days;
        self.stats.simulation_days = self.sim_day;
        self.stats.active_particles = self.particles.iter().filter(|p| p.active).count();
    }

    /// 以墙钟秒推进：Δ模拟日 = 秒 × simulation_speed / 86400
    pub fn advance_wall_clock(&mut self, wall_seconds: f64) {
        let delta = wall_seconds * self.config.simulation_speed / SECONDS_PER_DAY;
        self.advance(delta);
    }

    /// 按深度桶处理所有激活粒子
    fn step_particles(&mut self, delta_days: f64) {
        let depths: Vec<f64> = self.currents.available_depths().to_vec();
        if depths.is_empty() {
            return;
        }

        // 深度分桶：每桶一次批量流速查询
        let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); depths.len()];
        for (idx, particle) in self.particles.iter().enumerate() {
            if !particle.active {
                continue;
            }
            let depth_m = particle.depth * 1000.0;
            let mut best = 0usize;
            let mut best_gap = f64::INFINITY;
            for (level, &d) in depths.iter().enumerate() {
                let gap = (depth_m - d).abs();
                if gap < best_gap {
                    best_gap = gap;
                    best = level;
                }
            }
            buckets[best].push(idx);
        }

        let winter = self.config.clock.is_winter(self.sim_day);
        let tracer = self.library.lookup(self.release.tracer_id());
        let integrator: &dyn Integrator = if self.config.rk4_enabled {
            &self.rk4
        } else {
            &self.euler
        };

        for (level, bucket) in buckets.iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            let depth_m = depths[level];
            let positions: Vec<(f64, f64)> = bucket
                .iter()
                .map(|&idx| {
                    let p = &self.particles[idx].position;
                    self.reference.to_lonlat(p.x, p.y)
                })
                .collect();
            let samples = self
                .currents
                .velocities_batch(&positions, depth_m, self.sim_day);

            let ctx = StepContext {
                config: &self.config,
                reference: self.reference,
                tracer,
                currents: &self.currents,
                diffusivity: &self.diffusivity,
                integrator,
                sim_day: self.sim_day,
                delta_days,
                depth_m,
                winter,
            };
            for (&idx, &k1) in bucket.iter().zip(samples.iter()) {
                update_particle(
                    &mut self.particles[idx],
                    k1,
                    &ctx,
                    &mut self.rng,
                    &mut self.stats,
                );
            }
        }
    }
}

/// 一步内不变的上下文
struct StepContext<'a> {
    config: &'a EngineConfig,
    reference: ReferencePoint,
    tracer: &'a Tracer,
    currents: &'a dyn CurrentProvider,
    diffusivity: &'a dyn DiffusivityProvider,
    integrator: &'a dyn Integrator,
    sim_day: f64,
    delta_days: f64,
    depth_m: f64,
    winter: bool,
}

/// 单粒子流水线
fn update_particle(
    particle: &mut Particle,
    k1: VelocitySample,
    ctx: &StepContext<'_>,
    rng: &mut StdRng,
    stats: &mut EngineStats,
) {
    let pre_position = particle.position;
    let mut path_failed = false;

    // 平流子步
    let advection_ctx = AdvectionContext {
        currents: ctx.currents,
        reference: ctx.reference,
        sim_day: ctx.sim_day,
        depth_m: ctx.depth_m,
    };
    let advected = ctx
        .integrator
        .advect(particle.position, k1, &advection_ctx, ctx.delta_days);
    if advected.moved {
        let proposed = pre_position + advected.displacement_km;
        if ctx.config.land.enabled {
            let check = check_path(
                ctx.currents,
                ctx.reference,
                pre_position,
                proposed,
                ctx.depth_m,
                ctx.sim_day,
            );
            if check.clear {
                particle.position = proposed;
                particle.velocity = advected.mean_velocity;
            } else {
                particle.position = check.safe_position;
                particle.velocity = DVec2::ZERO;
                path_failed = true;
            }
        } else {
            particle.position = proposed;
            particle.velocity = advected.mean_velocity;
        }
    } else {
        particle.velocity = DVec2::ZERO;
    }

    // 扩散子步；平流路径失败时跳过写入
    if !path_failed {
        let (lon, lat) = ctx
            .reference
            .to_lonlat(particle.position.x, particle.position.y);
        let sample = ctx.diffusivity.diffusivity(lon, lat, ctx.sim_day);
        let k_eff = effective_diffusivity(sample.k, sample.found, ctx.config, ctx.tracer);
        let offset = horizontal_step(rng, k_eff, ctx.delta_days);
        if offset != DVec2::ZERO {
            let proposed = particle.position + offset;
            if ctx.config.land.enabled {
                let check = check_path(
                    ctx.currents,
                    ctx.reference,
                    particle.position,
                    proposed,
                    ctx.depth_m,
                    ctx.sim_day,
                );
                if check.clear {
                    particle.position = proposed;
                } else {
                    particle.position = check.safe_position;
                    particle.velocity = DVec2::ZERO;
                    path_failed = true;
                }
            } else {
                particle.position = proposed;
            }
        }
    }

    // 落点检查：不在海里就回退，再向最近海洋单元移动一半
    let mut reverted = false;
    if ctx.config.land.enabled {
        let (lon, lat) = ctx
            .reference
            .to_lonlat(particle.position.x, particle.position.y);
        if !ctx.currents.is_ocean(lon, lat, ctx.depth_m, ctx.sim_day) {
            particle.position = pre_position;
            let (pre_lon, pre_lat) = ctx.reference.to_lonlat(pre_position.x, pre_position.y);
            if let Some(cell) = ctx.currents.find_nearest_ocean_cell(
                pre_lon,
                pre_lat,
                ctx.depth_m,
                ctx.sim_day,
                ctx.config.land.max_search_radius,
            ) {
                let (cx, cy) = ctx.reference.to_plane(cell.lon, cell.lat);
                particle.position = (pre_position + DVec2::new(cx, cy)) * 0.5;
            }
            particle.velocity = DVec2::ZERO;
            reverted = true;
        }
    }
    if reverted || path_failed {
        stats.particles_on_land += 1;
    }
    let end_day = ctx.sim_day + ctx.delta_days;
    if reverted {
        // 被拦回的粒子跳过剩余阶段，只记轨迹
        particle.history.push(HistorySample {
            x: particle.position.x,
            y: particle.position.y,
            day: end_day,
        });
        return;
    }

    // 垂向混合
    if ctx.config.vertical_mixing {
        let dz_m = vertical_step(
            rng,
            &ctx.config.kz_profile,
            ctx.config,
            ctx.tracer,
            particle.depth * 1000.0,
            ctx.delta_days,
            ctx.winter,
        );
        particle.depth = (particle.depth + dz_m / 1000.0).clamp(0.0, 1.0);
        let depth_m = particle.depth * 1000.0;
        if depth_m > stats.max_depth_reached {
            stats.max_depth_reached = depth_m;
        }
    }

    // 年龄与衰变
    particle.age_days += ctx.delta_days;
    particle.mass_gbq *= ctx.tracer.decay_factor(ctx.delta_days);
    if particle.below_mass_threshold() {
        particle.deactivate();
        stats.total_decayed += 1;
        return;
    }

    // 浓度：以激活质量按年龄重算，独立于阈值灭活
    let mass_bq = particle.initial_mass_gbq * 1e9 * ctx.tracer.decay_factor(particle.age_days);
    particle.concentration = mass_bq / ctx.tracer.kernel_volume_m3().max(1e9);
    if particle.concentration > stats.max_concentration {
        stats.max_concentration = particle.concentration;
    }

    // 轨迹历史
    particle.history.push(HistorySample {
        x: particle.position.x,
        y: particle.position.y,
        day: end_day,
    });
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pt_fields::{DiffusivitySample, OceanCell};

    /// 处处海洋的静水流场
    struct StillWater {
        depths: Vec<f64>,
    }

    impl StillWater {
        fn new() -> Self {
            Self {
                depths: vec![0.0, 50.0, 100.0, 200.0, 500.0, 1000.0],
            }
        }
    }

    impl CurrentProvider for StillWater {
        fn velocity(&self, _lon: f64, _lat: f64, _depth_m: f64, _sim_day: f64) -> VelocitySample {
            VelocitySample {
                u: 0.0,
                v: 0.0,
                found: true,
                actual_depth: 0.0,
            }
        }

        fn find_nearest_ocean_cell(
            &self,
            _lon: f64,
            _lat: f64,
            _depth_m: f64,
            _sim_day: f64,
            _max_radius_cells: usize,
        ) -> Option<OceanCell> {
            None
        }

        fn available_depths(&self) -> &[f64] {
            &self.depths
        }
    }

    /// 恒定 K 的扩散场
    struct ConstantK(f64);

    impl DiffusivityProvider for ConstantK {
        fn diffusivity(&self, _lon: f64, _lat: f64, _sim_day: f64) -> DiffusivitySample {
            DiffusivitySample {
                k: self.0,
                found: true,
            }
        }
    }

    fn quiet_engine(pool: usize) -> ParticleEngine<StillWater, ConstantK> {
        let mut config = EngineConfig::default();
        config.pool_size = pool;
        config.vertical_mixing = false;
        config.diffusivity_scale = 0.0;
        config.land.enabled = false;
        ParticleEngine::new(config, StillWater::new(), ConstantK(100.0)).unwrap()
    }

    #[test]
    fn test_state_machine() {
        let mut engine = quiet_engine(10);
        assert_eq!(engine.state(), EngineState::Idle);

        // Idle 下 advance 是空操作
        engine.advance(1.0);
        assert_eq!(engine.sim_day(), 0.0);

        engine.start();
        assert_eq!(engine.state(), EngineState::Running);
        engine.advance(1.0);
        assert!((engine.sim_day() - 1.0).abs() < 1e-12);

        engine.pause();
        engine.advance(1.0);
        assert!((engine.sim_day() - 1.0).abs() < 1e-12);

        engine.resume();
        engine.advance(0.5);
        assert!((engine.sim_day() - 1.5).abs() < 1e-12);

        engine.reset();
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.sim_day(), 0.0);
        assert_eq!(engine.stats().total_released, 0);
        assert_eq!(engine.active_count(), 0);
    }

    #[test]
    fn test_release_caps_at_pool() {
        let mut engine = quiet_engine(100);
        assert_eq!(engine.release(60), 60);
        assert_eq!(engine.release(60), 40);
        // 池空：返回 0，状态不变
        assert_eq!(engine.release(10), 0);
        assert_eq!(engine.stats().total_released, 100);
        assert_eq!(engine.active_count(), 100);
    }

    #[test]
    fn test_release_positions_spread() {
        let mut engine = quiet_engine(1000);
        engine.release(1000);

        let mean_x: f64 = engine
            .particles()
            .iter()
            .map(|p| p.position.x)
            .sum::<f64>()
            / 1000.0;
        // 以参考点为中心
        assert!(mean_x.abs() < 3.0, "mean x = {}", mean_x);

        // 硬截断 ±3σ：σ = 20/88.8 度 → 平面上 20 km
        for p in engine.particles() {
            assert!(p.position.x.abs() <= 60.0 + 1e-9);
            assert_eq!(p.depth, 0.0);
            assert_eq!(p.history.len(), 1);
        }
    }

    #[test]
    fn test_emission_calibration_invariant() {
        let mut engine = quiet_engine(10_000);
        engine.release(10_000);
        let total: f64 = engine.particles().iter().map(|p| p.mass_gbq).sum();
        let declared = engine.release_manager().total_release_gbq();
        assert!(
            ((total - declared) / declared).abs() < 1e-12,
            "sum {} vs declared {}",
            total,
            declared
        );
    }

    #[test]
    fn test_continuous_release_carries_fraction() {
        let mut engine = quiet_engine(10_000);
        engine.start();

        // 默认相位 16.2 PBq / 30 天；单粒子活度 = 16.2e6/10000 = 1620 GBq
        // 每 0.1 天应释放 540000·0.1/1620 = 33.33… 个粒子
        engine.advance(0.1);
        assert_eq!(engine.stats().total_released, 33);
        let carried = engine.release_manager().fractional_accumulator();
        assert!(carried > 0.0 && carried < 1.0);

        engine.advance(0.1);
        engine.advance(0.1);
        // 三步累计 100 个以内一个粒子的进位误差
        let total = engine.stats().total_released;
        assert!((99..=100).contains(&total), "total {}", total);
    }

    #[test]
    fn test_decay_law_and_threshold() {
        let mut engine = quiet_engine(10);
        engine.release(10);
        let initial = engine.particles()[0].mass_gbq;
        engine.start();

        engine.advance(8.0); // 无衰变阶段不存在：cs137 半衰期 11000 天
        let after = engine.particles()[0].mass_gbq;
        let expected = initial * 0.5_f64.powf(8.0 / 11_000.0);
        assert!(((after - expected) / expected).abs() < 1e-9);
    }

    #[test]
    fn test_depth_stays_in_bounds_with_vertical_mixing() {
        let mut config = EngineConfig::default();
        config.pool_size = 200;
        config.vertical_mixing = true;
        config.diffusivity_scale = 0.0;
        config.land.enabled = false;
        let mut engine =
            ParticleEngine::new(config, StillWater::new(), ConstantK(100.0)).unwrap();
        engine.release(200);
        engine.start();

        for _ in 0..50 {
            engine.advance(0.5);
            for p in engine.particles().iter().filter(|p| p.active) {
                assert!(p.depth >= 0.0 && p.depth <= 1.0, "depth {}", p.depth);
            }
        }
        assert!(engine.stats().max_depth_reached > 0.0);
    }

    #[test]
    fn test_history_bounded_and_ordered() {
        let mut engine = quiet_engine(5);
        engine.release(5);
        engine.start();
        for _ in 0..20 {
            engine.advance(1.0);
        }
        for p in engine.particles() {
            assert!(p.history.len() <= crate::particle::HISTORY_CAPACITY);
            let days: Vec<f64> = p.history.iter().map(|s| s.day).collect();
            for pair in days.windows(2) {
                assert!(pair[0] < pair[1]);
            }
        }
    }

    #[test]
    fn test_unknown_tracer_rejected() {
        let mut engine = quiet_engine(10);
        let err = engine.set_tracer("unobtainium").unwrap_err();
        assert!(err.is_configuration());
        // 合法 id 正常
        engine.set_tracer("i131").unwrap();
        assert_eq!(engine.release_manager().tracer_id(), "i131");
    }

    #[test]
    fn test_wall_clock_scaling() {
        let mut engine = quiet_engine(10);
        engine.start();
        // 半天墙钟、默认速率 1：推进 0.5 模拟日
        engine.advance_wall_clock(0.5 * SECONDS_PER_DAY);
        assert!((engine.sim_day() - 0.5).abs() < 1e-12);

        // 加速 10 倍后同样的墙钟推进 5 模拟日
        engine.set_simulation_speed(10.0).unwrap();
        engine.advance_wall_clock(0.5 * SECONDS_PER_DAY);
        assert!((engine.sim_day() - 5.5).abs() < 1e-12);

        assert!(engine.set_simulation_speed(0.0).is_err());
    }
}
