// crates/pt_fields/src/currents.rs

//! 流速场服务
//!
//! 流式提供 4 维（日 × 深度 × 纬 × 经）流速网格：
//! - 元数据列出可用日与离散深度层，`init()` 阶段读入，不预载任何日；
//! - 日文件按需经有界缓存加载，活跃日钉住，最老的非活跃日被淘汰；
//! - 空间查询走一次性构建的 KD 树（坐标跨日不变）；
//! - 陆地哨兵命中时返回 `found = false`，零流速。

use crate::cache::{DayCache, DEFAULT_MAX_DAYS};
use crate::format::VelocityDay;
use crate::kdtree::GridKdTree;
use crate::metadata::CurrentsMetadata;
use crate::provider::{CurrentProvider, OceanCell, VelocitySample};
use parking_lot::RwLock;
use pt_foundation::time::date_key;
use pt_foundation::{PlumeError, PlumeResult, SimClock};
use rayon::prelude::*;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

/// 默认离散深度层 [m]
pub const DEFAULT_DEPTHS: [f64; 6] = [0.0, 50.0, 100.0, 200.0, 500.0, 1000.0];

/// 默认元数据文件名
pub const DEFAULT_METADATA_FILE: &str = "currents_3d_metadata.json";

/// 流速场服务配置
#[derive(Debug, Clone)]
pub struct CurrentsConfig {
    /// 日文件目录
    pub data_dir: PathBuf,
    /// 元数据文件名（位于 `data_dir` 下）
    pub metadata_file: String,
    /// 驻留天数上限
    pub max_days_in_memory: usize,
    /// 模拟时钟
    pub clock: SimClock,
}

impl CurrentsConfig {
    /// 以数据目录创建默认配置
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            metadata_file: DEFAULT_METADATA_FILE.to_string(),
            max_days_in_memory: DEFAULT_MAX_DAYS,
            clock: SimClock::default(),
        }
    }
}

/// 流速场服务
///
/// 由组合根在启动时构造一次并 `init()`，其余组件只通过
/// [`CurrentProvider`] 借用。
pub struct CurrentFieldService {
    config: CurrentsConfig,
    metadata: Option<CurrentsMetadata>,
    depths: Vec<f64>,
    cache: DayCache<VelocityDay>,
    kdtree: RwLock<Option<Arc<GridKdTree>>>,
}

impl CurrentFieldService {
    /// 创建未初始化的服务
    pub fn new(config: CurrentsConfig) -> Self {
        let cache = DayCache::new(config.max_days_in_memory);
        Self {
            config,
            metadata: None,
            depths: DEFAULT_DEPTHS.to_vec(),
            cache,
            kdtree: RwLock::new(None),
        }
    }

    /// 加载元数据；不预载任何日
    pub fn init(&mut self) -> PlumeResult<()> {
        let path = self.config.data_dir.join(&self.config.metadata_file);
        let metadata = CurrentsMetadata::load(&path)?;

        if !metadata.depths.is_empty() {
            self.depths = metadata.depths.clone();
        }
        tracing::info!(
            days = metadata.days.len(),
            depths = self.depths.len(),
            "current field service initialized"
        );
        self.metadata = Some(metadata);
        Ok(())
    }

    /// 服务时钟
    pub fn clock(&self) -> SimClock {
        self.config.clock
    }

    /// 加载指定日历日；幂等，同日并发加载共享一次读取
    pub fn load_day(&self, year: i32, month: u32, day: u32) -> PlumeResult<Arc<VelocityDay>> {
        let metadata = self
            .metadata
            .as_ref()
            .ok_or_else(|| PlumeError::io("service not initialized"))?;
        let entry = metadata.entry_for_date(year, month, day).ok_or_else(|| {
            PlumeError::io(format!("no day file registered for {:04}-{:02}-{:02}", year, month, day))
        })?;

        let path = self.config.data_dir.join(&entry.file);
        let key = entry.date_str.clone();
        let loaded = self.cache.load_or_get(&key, || {
            tracing::debug!(file = %path.display(), "loading velocity day");
            let file = File::open(&path).map_err(|e| {
                PlumeError::io_with_source(format!("cannot open {}", path.display()), e)
            })?;
            VelocityDay::read(&mut BufReader::new(file))
        })?;

        self.ensure_kdtree(&loaded);
        Ok(loaded)
    }

    /// 首次加载后构建 KD 树；坐标跨日不变，之后复用
    fn ensure_kdtree(&self, day: &VelocityDay) {
        if self.kdtree.read().is_some() {
            return;
        }
        let mut slot = self.kdtree.write();
        if slot.is_none() {
            let tree = GridKdTree::from_grid(&day.lon, &day.lat, day.n_lat, day.n_lon);
            tracing::info!(indexed_cells = tree.len(), "velocity kd-tree built");
            *slot = Some(Arc::new(tree));
        }
    }

    /// 模拟日 → 驻留日网格；任何失败都降级为 None
    fn resolve_day(&self, sim_day: f64) -> Option<Arc<VelocityDay>> {
        let metadata = self.metadata.as_ref()?;
        let date = self.config.clock.date_for_day(sim_day);
        let offset = self.config.clock.day_offset(date);
        let entry = metadata.entry_for_offset(offset)?;

        match self.load_day(entry.year, entry.month, entry.day) {
            Ok(day) => Some(day),
            Err(e) => {
                tracing::warn!(day = %date_key(date), error = %e, "velocity day unavailable");
                None
            }
        }
    }

    /// 深度 [m] 吸附到最近的离散层，返回 (层号, 层深度)
    fn snap_depth(&self, depth_m: f64, n_depth: usize) -> (usize, f64) {
        let mut best = 0usize;
        let mut best_gap = f64::INFINITY;
        for (idx, &level) in self.depths.iter().enumerate() {
            let gap = (depth_m - level).abs();
            if gap < best_gap {
                best_gap = gap;
                best = idx;
            }
        }
        let idx = best.min(n_depth.saturating_sub(1));
        (idx, self.depths.get(idx).copied().unwrap_or(0.0))
    }

    fn sample_at(&self, day: &VelocityDay, tree: &GridKdTree, lon: f64, lat: f64, depth_m: f64) -> VelocitySample {
        if let Some(metadata) = &self.metadata {
            if !metadata.bounding_box.contains(lon, lat) {
                return VelocitySample::miss();
            }
        }
        let Some(node) = tree.nearest(lon, lat) else {
            return VelocitySample::miss();
        };
        let (depth_idx, actual_depth) = self.snap_depth(depth_m, day.n_depth);
        let (u, v) = day.velocity_at(depth_idx, node.flat as usize);
        if crate::format::is_land_value(u) || crate::format::is_land_value(v) {
            return VelocitySample::miss();
        }
        VelocitySample {
            u: u as f64,
            v: v as f64,
            found: true,
            actual_depth,
        }
    }
}

impl CurrentProvider for CurrentFieldService {
    fn velocity(&self, lon: f64, lat: f64, depth_m: f64, sim_day: f64) -> VelocitySample {
        let Some(day) = self.resolve_day(sim_day) else {
            return VelocitySample::miss();
        };
        let tree = self.kdtree.read().clone();
        let Some(tree) = tree else {
            return VelocitySample::miss();
        };
        self.sample_at(&day, &tree, lon, lat, depth_m)
    }

    fn velocities_batch(
        &self,
        positions: &[(f64, f64)],
        depth_m: f64,
        sim_day: f64,
    ) -> Vec<VelocitySample> {
        let Some(day) = self.resolve_day(sim_day) else {
            return vec![VelocitySample::miss(); positions.len()];
        };
        let tree = self.kdtree.read().clone();
        let Some(tree) = tree else {
            return vec![VelocitySample::miss(); positions.len()];
        };
        // 只读扇出，输出与输入同序
        positions
            .par_iter()
            .map(|&(lon, lat)| self.sample_at(&day, &tree, lon, lat, depth_m))
            .collect()
    }

    fn find_nearest_ocean_cell(
        &self,
        lon: f64,
        lat: f64,
        depth_m: f64,
        sim_day: f64,
        max_radius_cells: usize,
    ) -> Option<OceanCell> {
        let day = self.resolve_day(sim_day)?;
        let tree = self.kdtree.read().clone()?;
        let node = tree.nearest(lon, lat)?;
        let (depth_idx, actual_depth) = self.snap_depth(depth_m, day.n_depth);

        let (i0, j0) = (node.i as isize, node.j as isize);
        let probe = |i: isize, j: isize| -> Option<OceanCell> {
            if i < 0 || j < 0 || i >= day.n_lat as isize || j >= day.n_lon as isize {
                return None;
            }
            let flat = day.flat_index(i as usize, j as usize);
            if day.is_land(depth_idx, flat) {
                return None;
            }
            Some(OceanCell {
                lon: day.lon[flat] as f64,
                lat: day.lat[flat] as f64,
                i: i as usize,
                j: j as usize,
                actual_depth,
            })
        };

        // 从中心环向外扫
        if let Some(cell) = probe(i0, j0) {
            return Some(cell);
        }
        for r in 1..=max_radius_cells as isize {
            for j in (j0 - r)..=(j0 + r) {
                if let Some(cell) = probe(i0 - r, j).or_else(|| probe(i0 + r, j)) {
                    return Some(cell);
                }
            }
            for i in (i0 - r + 1)..(i0 + r) {
                if let Some(cell) = probe(i, j0 - r).or_else(|| probe(i, j0 + r)) {
                    return Some(cell);
                }
            }
        }
        None
    }

    fn available_depths(&self) -> &[f64] {
        &self.depths
    }
}

// ============================================================
// 测试
// ============================================================
