// crates/pt_bake/src/recorder.rs

//! 烘焙录制器
//!
//! 以固定 0.1 天子步无头运行引擎，按配置节奏捕获快照，
//! 可选每 30 天自动保存一次检查点档案。
//!
//! 取消只在步边界生效；取消或中止时已累积的快照原样保留在
//! 结果里，仍可导出。

use crate::archive::{ArchiveMetadata, SnapshotArchive};
use crate::snapshot::Snapshot;
use pt_engine::ParticleEngine;
use pt_fields::{CurrentProvider, DiffusivityProvider};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 烘焙固定子步长 [天]
pub const BAKE_STEP_DAYS: f64 = 0.1;

/// 默认自动保存间隔 [天]
pub const DEFAULT_AUTOSAVE_INTERVAL_DAYS: f64 = 30.0;

/// 烘焙配置
#[derive(Debug, Clone)]
pub struct BakeConfig {
    /// 烘焙时长 [天]
    pub duration_days: f64,
    /// 快照间隔 [天]
    pub snapshot_frequency: f64,
    /// 自动保存间隔 [天]；None 关闭
    pub autosave_interval_days: Option<f64>,
    /// 自动保存路径；None 关闭
    pub autosave_path: Option<PathBuf>,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            duration_days: 30.0,
            snapshot_frequency: 5.0,
            autosave_interval_days: Some(DEFAULT_AUTOSAVE_INTERVAL_DAYS),
            autosave_path: None,
        }
    }
}

/// 烘焙结果
///
/// 无论完成、取消还是中止，`archive` 都包含已捕获的快照。
#[derive(Debug)]
pub struct BakeOutcome {
    /// 快照档案（可能是部分的）
    pub archive: SnapshotArchive,
    /// 是否跑满时长
    pub completed: bool,
    /// 中止原因；取消与正常完成时为 None
    pub aborted: Option<String>,
}

/// 烘焙取消句柄，可跨线程持有
#[derive(Debug, Clone)]
pub struct BakeHandle {
    cancel: Arc<AtomicBool>,
}

impl BakeHandle {
    /// 请求在下一个步边界取消
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// 是否已请求取消
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }
}

/// 烘焙录制器
pub struct BakeRecorder {
    config: BakeConfig,
    cancel: Arc<AtomicBool>,
}

impl BakeRecorder {
    /// 创建录制器
    pub fn new(config: BakeConfig) -> Self {
        Self {
            config,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 取出取消句柄
    pub fn handle(&self) -> BakeHandle {
        BakeHandle {
            cancel: self.cancel.clone(),
        }
    }

    /// 无头运行引擎并录制
    ///
    /// 引擎先重置再启动；排放日程与示踪剂绑定保持调用者所配。
    pub fn run<C, K>(&self, engine: &mut ParticleEngine<C, K>) -> BakeOutcome
    where
        C: CurrentProvider,
        K: DiffusivityProvider,
    {
        engine.reset();
        engine.start();

        let metadata = ArchiveMetadata {
            sim_start: 0.0,
            sim_end: self.config.duration_days,
            total_days: self.config.duration_days,
            tracer: engine.release_manager().tracer_id().to_string(),
        };
        let mut archive = SnapshotArchive::new(metadata);

        let total_steps = (self.config.duration_days / BAKE_STEP_DAYS).round() as usize;
        let steps_per_snapshot =
            ((self.config.snapshot_frequency / BAKE_STEP_DAYS).round() as usize).max(1);
        let steps_per_autosave = self
            .config
            .autosave_interval_days
            .map(|days| ((days / BAKE_STEP_DAYS).round() as usize).max(1));

        tracing::info!(
            duration_days = self.config.duration_days,
            total_steps,
            snapshot_frequency = self.config.snapshot_frequency,
            "bake started"
        );

        // 第 0 天快照
        archive.snapshots.push(Snapshot::capture(engine, 0.0));

        for step in 1..=total_steps {
            if self.cancel.load(Ordering::SeqCst) {
                tracing::warn!(step, "bake cancelled at step boundary");
                return BakeOutcome {
                    archive,
                    completed: false,
                    aborted: None,
                };
            }

            engine.advance(BAKE_STEP_DAYS);

            if step % steps_per_snapshot == 0 {
                let day = step as f64 * BAKE_STEP_DAYS;
                archive.snapshots.push(Snapshot::capture(engine, day));
            }

            if let (Some(interval), Some(path)) =
                (steps_per_autosave, self.config.autosave_path.as_ref())
            {
                if step % interval == 0 {
                    if let Err(e) = archive.save(path) {
                        // 致命：中止烘焙，已有快照保留
                        tracing::error!(error = %e, "autosave failed, aborting bake");
                        return BakeOutcome {
                            archive,
                            completed: false,
                            aborted: Some(e.to_string()),
                        };
                    }
                }
            }
        }

        tracing::info!(snapshots = archive.snapshots.len(), "bake finished");
        BakeOutcome {
            archive,
            completed: true,
            aborted: None,
        }
    }
}

// ============================================================
// 测试
// ============================================================
