// crates/pt_bake/src/snapshot.rs

//! 系综快照
//!
//! 某个模拟日上激活粒子的深拷贝，供回放端按日插值。
//! 这是引擎与渲染端之间唯一的消息类型：引擎发快照，渲染端消费，
//! 没有反向边。

use pt_engine::{EngineStats, ParticleEngine};
use pt_fields::{CurrentProvider, DiffusivityProvider};
use serde::{Deserialize, Serialize};

/// 快照保留的历史条数（粒子环形历史的最近 5 条）
pub const SNAPSHOT_HISTORY_LEN: usize = 5;

/// 快照中的轨迹点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// 局地平面 x [km]
    pub x: f64,
    /// 局地平面 y [km]
    pub y: f64,
    /// 采样时刻 [模拟日]
    pub day: f64,
}

/// 快照中的粒子记录
///
/// 活跃/烘焙两种粒子形态在这里归一：只保留回放需要的字段，
/// 没有激活标志（快照只含激活粒子）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotParticle {
    /// 局地平面 x [km]
    pub x: f64,
    /// 局地平面 y [km]
    pub y: f64,
    /// 深度（千米的分数）
    pub depth: f64,
    /// 浓度 [Bq/m³]
    pub concentration: f64,
    /// 质量 [GBq]
    pub mass: f64,
    /// 年龄 [天]
    pub age: f64,
    /// 最近的轨迹点（时间序）
    pub history: Vec<HistoryPoint>,
}

/// 一个模拟日的系综快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// 快照时刻 [模拟日]
    pub day: f64,
    /// 粒子数
    pub particle_count: usize,
    /// 捕获时的引擎统计
    pub stats: EngineStats,
    /// 粒子记录
    pub particles: Vec<SnapshotParticle>,
}

impl Snapshot {
    /// 从引擎深拷贝当前激活系综
    pub fn capture<C, K>(engine: &ParticleEngine<C, K>, day: f64) -> Self
    where
        C: CurrentProvider,
        K: DiffusivityProvider,
    {
        let particles: Vec<SnapshotParticle> = engine
            .particles()
            .iter()
            .filter(|p| p.active)
            .map(|p| SnapshotParticle {
                x: p.position.x,
                y: p.position.y,
                depth: p.depth,
                concentration: p.concentration,
                mass: p.mass_gbq,
                age: p.age_days,
                history: p
                    .history
                    .last_n(SNAPSHOT_HISTORY_LEN)
                    .into_iter()
                    .map(|s| HistoryPoint {
                        x: s.x,
                        y: s.y,
                        day: s.day,
                    })
                    .collect(),
            })
            .collect();

        Self {
            day,
            particle_count: particles.len(),
            stats: *engine.stats(),
            particles,
        }
    }

    /// 结构一致性校验：合并外部批文件时使用
    pub fn validate(&self) -> Result<(), String> {
        if self.particle_count != self.particles.len() {
            return Err(format!(
                "particle_count {} does not match particles length {}",
                self.particle_count,
                self.particles.len()
            ));
        }
        if !self.day.is_finite() || self.day < 0.0 {
            return Err(format!("bad snapshot day {}", self.day));
        }
        Ok(())
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(x: f64) -> SnapshotParticle {
        SnapshotParticle {
            x,
            y: 0.0,
            depth: 0.0,
            concentration: 1.0,
            mass: 10.0,
            age: 1.0,
            history: vec![],
        }
    }

    #[test]
    fn test_validate_count_mismatch() {
        let snapshot = Snapshot {
            day: 5.0,
            particle_count: 2,
            stats: EngineStats::default(),
            particles: vec![particle(0.0)],
        };
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_validate_bad_day() {
        let snapshot = Snapshot {
            day: -1.0,
            particle_count: 0,
            stats: EngineStats::default(),
            particles: vec![],
        };
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let snapshot = Snapshot {
            day: 5.0,
            particle_count: 1,
            stats: EngineStats::default(),
            particles: vec![SnapshotParticle {
                history: vec![HistoryPoint {
                    x: 1.0,
                    y: 2.0,
                    day: 4.0,
                }],
                ..particle(3.0)
            }],
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
