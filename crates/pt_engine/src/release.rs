// crates/pt_engine/src/release.rs

//! 释放管理器
//!
//! 多相排放日程与单粒子活度标定。
//!
//! 相位是半开区间语义的时间段，速率恒定；查询时两端闭合，
//! 保证 `rate_at(start)` 与 `rate_at(end)` 都大于零。
//! 相位不得重叠，校验失败时整个日程原样保留。
//!
//! 标定不变量：`particle_activity(n) · n = total_release_gbq()`。

use crate::tracer::{TracerLibrary, DEFAULT_TRACER_ID};
use pt_foundation::{PlumeError, PlumeResult};
use serde::{Deserialize, Serialize};

/// 排放量单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseUnit {
    /// 吉贝可
    GBq,
    /// 太贝可
    TBq,
    /// 拍贝可
    PBq,
}

impl ReleaseUnit {
    /// 换算到 GBq 的因子
    #[inline]
    pub fn to_gbq(&self) -> f64 {
        match self {
            Self::GBq => 1.0,
            Self::TBq => 1e3,
            Self::PBq => 1e6,
        }
    }
}

/// 排放相位
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReleasePhase {
    /// 起始模拟日
    pub start_day: f64,
    /// 结束模拟日
    pub end_day: f64,
    /// 相位内释放总量（以 `unit` 计）
    pub amount: f64,
    /// 总量单位
    pub unit: ReleaseUnit,
}

impl ReleasePhase {
    /// 创建相位
    pub fn new(start_day: f64, end_day: f64, amount: f64, unit: ReleaseUnit) -> Self {
        Self {
            start_day,
            end_day,
            amount,
            unit,
        }
    }

    /// 校验：end > start ≥ 0，总量非负
    pub fn validate(&self) -> PlumeResult<()> {
        if !(self.start_day >= 0.0) {
            return Err(PlumeError::invalid_configuration(format!(
                "phase start {} must be >= 0",
                self.start_day
            )));
        }
        if !(self.end_day > self.start_day) {
            return Err(PlumeError::invalid_configuration(format!(
                "phase end {} must be > start {}",
                self.end_day, self.start_day
            )));
        }
        if !(self.amount >= 0.0) {
            return Err(PlumeError::invalid_configuration("phase amount must be >= 0"));
        }
        Ok(())
    }

    /// 某日是否落在相位内（两端闭合）
    #[inline]
    pub fn contains(&self, day: f64) -> bool {
        day >= self.start_day && day <= self.end_day
    }

    /// 恒定速率（源单位/天）
    #[inline]
    pub fn rate(&self) -> f64 {
        self.amount / (self.end_day - self.start_day)
    }

    /// 换算到 GBq 的总量
    #[inline]
    pub fn amount_gbq(&self) -> f64 {
        self.amount * self.unit.to_gbq()
    }
}

/// 释放管理器
#[derive(Debug, Clone)]
pub struct ReleaseManager {
    tracer_id: String,
    phases: Vec<ReleasePhase>,
    /// 亚整数排放进位，∈ [0, 1)
    fractional_accumulator: f64,
}

impl Default for ReleaseManager {
    fn default() -> Self {
        Self::new(DEFAULT_TRACER_ID)
    }
}

impl ReleaseManager {
    /// 创建空日程的管理器
    pub fn new(tracer_id: impl Into<String>) -> Self {
        Self {
            tracer_id: tracer_id.into(),
            phases: Vec::new(),
            fractional_accumulator: 0.0,
        }
    }

    /// 当前绑定的示踪剂 id
    pub fn tracer_id(&self) -> &str {
        &self.tracer_id
    }

    /// 重绑示踪剂
    pub fn set_tracer(&mut self, id: impl Into<String>) {
        self.tracer_id = id.into();
    }

    /// 用示踪剂默认库存生成单相日程：[0, 30] 天，单位 PBq
    pub fn add_default_phase(&mut self, library: &TracerLibrary) {
        let tracer = library.lookup(&self.tracer_id);
        let amount_pbq = tracer.default_inventory_gbq / ReleaseUnit::PBq.to_gbq();
        self.phases = vec![ReleasePhase::new(0.0, 30.0, amount_pbq, ReleaseUnit::PBq)];
    }

    /// 原子替换日程
    ///
    /// 任一相位非法或相位间重叠时返回 [`PlumeError::InvalidConfiguration`]，
    /// 原日程保持不变。
    pub fn set_phases(&mut self, phases: Vec<ReleasePhase>) -> PlumeResult<()> {
        for phase in &phases {
            phase.validate()?;
        }
        // 按起始日排序后检查相邻重叠；端点相接允许
        let mut ordered: Vec<&ReleasePhase> = phases.iter().collect();
        ordered.sort_by(|a, b| a.start_day.total_cmp(&b.start_day));
        for pair in ordered.windows(2) {
            if pair[1].start_day < pair[0].end_day {
                return Err(PlumeError::invalid_configuration(format!(
                    "phases [{}, {}] and [{}, {}] overlap",
                    pair[0].start_day, pair[0].end_day, pair[1].start_day, pair[1].end_day
                )));
            }
        }
        self.phases = phases;
        Ok(())
    }

    /// 日程只读视图
    pub fn phases(&self) -> &[ReleasePhase] {
        &self.phases
    }

    /// 某日的排放速率（源单位/天）；无活跃相位时为 0
    pub fn rate_at(&self, day: f64) -> f64 {
        self.phases
            .iter()
            .find(|p| p.contains(day))
            .map(|p| p.rate())
            .unwrap_or(0.0)
    }

    /// 某日的排放速率 [GBq/天]
    pub fn rate_gbq_at(&self, day: f64) -> f64 {
        self.phases
            .iter()
            .find(|p| p.contains(day))
            .map(|p| p.rate() * p.unit.to_gbq())
            .unwrap_or(0.0)
    }

    /// 全部相位的总释放量 [GBq]
    pub fn total_release_gbq(&self) -> f64 {
        self.phases.iter().map(|p| p.amount_gbq()).sum()
    }

    /// 单粒子活度 [GBq]：总量按粒子池均分
    pub fn particle_activity(&self, n_particles: usize) -> f64 {
        if n_particles == 0 {
            return 0.0;
        }
        self.total_release_gbq() / n_particles as f64
    }

    /// 累加亚整数排放量，返回应释放的整数粒子数
    pub fn accumulate(&mut self, fractional: f64) -> usize {
        self.fractional_accumulator += fractional.max(0.0);
        let whole = self.fractional_accumulator.floor();
        self.fractional_accumulator -= whole;
        whole as usize
    }

    /// 当前进位值
    pub fn fractional_accumulator(&self) -> f64 {
        self.fractional_accumulator
    }

    /// 清零进位
    pub fn reset_accumulator(&mut self) {
        self.fractional_accumulator = 0.0;
    }
}

// ============================================================
// 测试
// ============================================================
