// crates/pt_engine/src/particle.rs

//! 粒子记录
//!
//! 拉格朗日粒子：携带释放活度的一份份额，在局地平面上平流与
//! 随机游走。粒子池在引擎创建时一次分配，释放时激活、
//! 衰变出局或重置时灭活，不做动态增删。

use glam::DVec2;

/// 位置历史容量
pub const HISTORY_CAPACITY: usize = 8;

/// 质量灭活阈值（初始质量的千分之一）
pub const MASS_DEACTIVATION_FRACTION: f64 = 1e-3;

/// 历史轨迹点
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HistorySample {
    /// 局地平面 x [km]
    pub x: f64,
    /// 局地平面 y [km]
    pub y: f64,
    /// 采样时刻 [模拟日]
    pub day: f64,
}

/// 定容环形历史缓冲
///
/// 写满后覆盖最老样本，时间序单调。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryRing {
    samples: [HistorySample; HISTORY_CAPACITY],
    head: usize,
    len: usize,
}

impl Default for HistoryRing {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryRing {
    /// 创建空缓冲
    pub const fn new() -> Self {
        Self {
            samples: [HistorySample {
                x: 0.0,
                y: 0.0,
                day: 0.0,
            }; HISTORY_CAPACITY],
            head: 0,
            len: 0,
        }
    }

    /// 追加样本，满时覆盖最老一条
    pub fn push(&mut self, sample: HistorySample) {
        self.samples[self.head] = sample;
        self.head = (self.head + 1) % HISTORY_CAPACITY;
        if self.len < HISTORY_CAPACITY {
            self.len += 1;
        }
    }

    /// 样本数
    pub fn len(&self) -> usize {
        self.len
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 清空
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// 按时间序（老到新）迭代
    pub fn iter(&self) -> impl Iterator<Item = &HistorySample> {
        let start = (self.head + HISTORY_CAPACITY - self.len) % HISTORY_CAPACITY;
        (0..self.len).map(move |k| &self.samples[(start + k) % HISTORY_CAPACITY])
    }

    /// 最新样本
    pub fn latest(&self) -> Option<&HistorySample> {
        if self.len == 0 {
            None
        } else {
            let idx = (self.head + HISTORY_CAPACITY - 1) % HISTORY_CAPACITY;
            Some(&self.samples[idx])
        }
    }

    /// 最近 n 条样本（时间序）
    pub fn last_n(&self, n: usize) -> Vec<HistorySample> {
        let take = n.min(self.len);
        self.iter().skip(self.len - take).copied().collect()
    }
}

/// 粒子记录
#[derive(Debug, Clone)]
pub struct Particle {
    /// 池内编号
    pub id: u32,
    /// 激活标志
    pub active: bool,
    /// 示踪剂 id
    pub tracer_id: &'static str,
    /// 局地平面位置 [km]
    pub position: DVec2,
    /// 深度，千米的分数：0 = 表层，1.0 = 钳制底
    pub depth: f64,
    /// 当前质量 [GBq]
    pub mass_gbq: f64,
    /// 激活时质量 [GBq]，灭活阈值与浓度读数的基准
    pub initial_mass_gbq: f64,
    /// 年龄 [天]
    pub age_days: f64,
    /// 上一步流速 (u, v) [m/s]
    pub velocity: DVec2,
    /// 有界位置历史
    pub history: HistoryRing,
    /// 释放时刻 [模拟日]
    pub release_day: f64,
    /// 浓度 [Bq/m³]
    pub concentration: f64,
}

impl Particle {
    /// 创建未激活粒子
    pub fn inactive(id: u32) -> Self {
        Self {
            id,
            active: false,
            tracer_id: crate::tracer::DEFAULT_TRACER_ID,
            position: DVec2::ZERO,
            depth: 0.0,
            mass_gbq: 0.0,
            initial_mass_gbq: 0.0,
            age_days: 0.0,
            velocity: DVec2::ZERO,
            history: HistoryRing::new(),
            release_day: 0.0,
            concentration: 0.0,
        }
    }

    /// 激活：置于表层，记录首条历史
    pub fn activate(
        &mut self,
        tracer_id: &'static str,
        position: DVec2,
        mass_gbq: f64,
        sim_day: f64,
    ) {
        self.active = true;
        self.tracer_id = tracer_id;
        self.position = position;
        self.depth = 0.0;
        self.mass_gbq = mass_gbq;
        self.initial_mass_gbq = mass_gbq;
        self.age_days = 0.0;
        self.velocity = DVec2::ZERO;
        self.release_day = sim_day;
        self.concentration = 0.0;
        self.history.clear();
        self.history.push(HistorySample {
            x: position.x,
            y: position.y,
            day: sim_day,
        });
    }

    /// 灭活并清空状态
    pub fn deactivate(&mut self) {
        self.active = false;
        self.mass_gbq = 0.0;
        self.concentration = 0.0;
        self.velocity = DVec2::ZERO;
    }

    /// 质量是否已跌破灭活阈值
    #[inline]
    pub fn below_mass_threshold(&self) -> bool {
        self.mass_gbq < MASS_DEACTIVATION_FRACTION * self.initial_mass_gbq
    }
}

// ============================================================
// 测试
// ============================================================
