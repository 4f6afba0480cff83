// crates/pt_bake/src/archive.rs

//! 快照档案
//!
//! 烘焙结果的唯一持久化形态：一个 JSON 文档，按日排序的快照序列
//! 加上运行元数据。长烘焙会分块导出，`merge` 把多个分块档案
//! 校验后并回一份：坏的快照跳过并告警，绝不让单个坏块毁掉整次合并。

use crate::snapshot::Snapshot;
use pt_foundation::{PlumeError, PlumeResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// 档案格式版本
pub const ARCHIVE_VERSION: &str = "1.0";

/// 运行元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveMetadata {
    /// 模拟起始日
    pub sim_start: f64,
    /// 模拟结束日
    pub sim_end: f64,
    /// 覆盖天数
    pub total_days: f64,
    /// 示踪剂 id
    pub tracer: String,
}

/// 快照档案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotArchive {
    /// 格式版本
    pub version: String,
    /// 导出时刻（RFC 3339）
    pub timestamp: String,
    /// 运行元数据
    pub metadata: ArchiveMetadata,
    /// 快照序列，按日升序
    pub snapshots: Vec<Snapshot>,
}

/// 合并结果统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    /// 并入的快照数
    pub accepted: usize,
    /// 校验失败被跳过的快照数
    pub rejected: usize,
    /// 因同日重复被丢弃的快照数
    pub duplicates: usize,
}

impl SnapshotArchive {
    /// 创建空档案
    pub fn new(metadata: ArchiveMetadata) -> Self {
        Self {
            version: ARCHIVE_VERSION.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            metadata,
            snapshots: Vec::new(),
        }
    }

    /// 写出 JSON 档案
    pub fn save(&self, path: &Path) -> PlumeResult<()> {
        let file = File::create(path).map_err(|e| {
            PlumeError::io_with_source(format!("cannot create {}", path.display()), e)
        })?;
        serde_json::to_writer(BufWriter::new(file), self)
            .map_err(|e| PlumeError::io(format!("cannot serialize archive: {}", e)))?;
        tracing::info!(path = %path.display(), snapshots = self.snapshots.len(), "archive saved");
        Ok(())
    }

    /// 读入 JSON 档案
    pub fn load(path: &Path) -> PlumeResult<Self> {
        let file = File::open(path).map_err(|e| {
            PlumeError::io_with_source(format!("cannot open {}", path.display()), e)
        })?;
        let archive: Self = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| PlumeError::format(format!("bad archive: {}", e)))?;
        if archive.version != ARCHIVE_VERSION {
            return Err(PlumeError::format(format!(
                "unsupported archive version {}",
                archive.version
            )));
        }
        Ok(archive)
    }

    /// 覆盖的日范围
    pub fn day_range(&self) -> Option<(f64, f64)> {
        match (self.snapshots.first(), self.snapshots.last()) {
            (Some(first), Some(last)) => Some((first.day, last.day)),
            _ => None,
        }
    }

    /// 合并多个分块档案
    ///
    /// 每个快照先过结构校验，失败的跳过并告警；全部并入后按日
    /// 排序，同日重复保留先到者。元数据取第一个分块的。
    pub fn merge(chunks: Vec<SnapshotArchive>) -> PlumeResult<(Self, MergeReport)> {
        let metadata = chunks
            .first()
            .map(|c| c.metadata.clone())
            .ok_or_else(|| PlumeError::invalid_configuration("no chunks to merge"))?;

        let mut report = MergeReport::default();
        let mut merged: Vec<Snapshot> = Vec::new();
        for chunk in chunks {
            for snapshot in chunk.snapshots {
                match snapshot.validate() {
                    Ok(()) => {
                        merged.push(snapshot);
                        report.accepted += 1;
                    }
                    Err(reason) => {
                        tracing::warn!(day = snapshot.day, %reason, "skipping invalid snapshot");
                        report.rejected += 1;
                    }
                }
            }
        }

        merged.sort_by(|a, b| a.day.total_cmp(&b.day));
        merged.dedup_by(|b, a| {
            let duplicate = a.day == b.day;
            if duplicate {
                report.duplicates += 1;
                report.accepted -= 1;
            }
            duplicate
        });

        let mut archive = Self::new(metadata);
        archive.snapshots = merged;
        Ok((archive, report))
    }
}

// ============================================================
// 测试
// ============================================================
