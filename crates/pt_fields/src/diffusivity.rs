// crates/pt_fields/src/diffusivity.rs

//! 涡动扩散系数场服务
//!
//! 流式提供 3 维（日 × 纬 × 经）标量 K 网格。与流速服务同样的
//! 缓存与单飞约定，不同之处：
//! - 坐标保存在单独的坐标文件里，整个生命周期只加载一次；
//! - 空间索引用粗分桶网格而不是 KD 树；
//! - 命中值钳制到 [20, 3000] m²/s，未命中返回下限 20。

use crate::bucket::BucketGrid;
use crate::cache::{DayCache, DEFAULT_MAX_DAYS};
use crate::format::{DiffusivityCoords, DiffusivityDay};
use crate::metadata::DiffusivityMetadata;
use crate::provider::{DiffusivityProvider, DiffusivitySample};
use pt_foundation::time::compact_date;
use pt_foundation::{PlumeError, PlumeResult, SimClock};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

/// K 值下限 [m²/s]，未命中时也按此返回
pub const K_MIN: f64 = 20.0;

/// K 值上限 [m²/s]，容纳黑潮涡旋量级
pub const K_MAX: f64 = 3000.0;

/// 默认坐标文件名
pub const DEFAULT_COORDS_FILE: &str = "eke_coords.bin";

/// 默认元数据文件名
pub const DEFAULT_EKE_METADATA_FILE: &str = "eke_metadata.json";

/// 日文件子目录
pub const DAILY_SUBDIR: &str = "daily";

/// 扩散系数场服务配置
#[derive(Debug, Clone)]
pub struct DiffusivityConfig {
    /// 数据目录（坐标文件与元数据所在；日文件在 `daily/` 子目录）
    pub data_dir: PathBuf,
    /// 坐标文件名
    pub coords_file: String,
    /// 元数据文件名
    pub metadata_file: String,
    /// 驻留天数上限
    pub max_days_in_memory: usize,
    /// 模拟时钟
    pub clock: SimClock,
}

impl DiffusivityConfig {
    /// 以数据目录创建默认配置
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            coords_file: DEFAULT_COORDS_FILE.to_string(),
            metadata_file: DEFAULT_EKE_METADATA_FILE.to_string(),
            max_days_in_memory: DEFAULT_MAX_DAYS,
            clock: SimClock::default(),
        }
    }
}

/// 涡动扩散系数场服务
pub struct DiffusivityFieldService {
    config: DiffusivityConfig,
    metadata: Option<DiffusivityMetadata>,
    coords: Option<DiffusivityCoords>,
    index: Option<BucketGrid>,
    cache: DayCache<DiffusivityDay>,
}

impl DiffusivityFieldService {
    /// 创建未初始化的服务
    pub fn new(config: DiffusivityConfig) -> Self {
        let cache = DayCache::new(config.max_days_in_memory);
        Self {
            config,
            metadata: None,
            coords: None,
            index: None,
            cache,
        }
    }

    /// 加载元数据与坐标文件并构建空间索引；不预载任何日
    pub fn init(&mut self) -> PlumeResult<()> {
        let metadata_path = self.config.data_dir.join(&self.config.metadata_file);
        let metadata = DiffusivityMetadata::load(&metadata_path)?;

        let coords_path = self.config.data_dir.join(&self.config.coords_file);
        let file = File::open(&coords_path).map_err(|e| {
            PlumeError::io_with_source(format!("cannot open {}", coords_path.display()), e)
        })?;
        let coords = DiffusivityCoords::read(&mut BufReader::new(file))?;

        let index = BucketGrid::build(&coords.lon, &coords.lat);
        tracing::info!(
            days = metadata.total_days,
            cells = coords.cells(),
            "diffusivity field service initialized"
        );

        self.metadata = Some(metadata);
        self.coords = Some(coords);
        self.index = Some(index);
        Ok(())
    }

    /// 加载指定紧凑日期 `YYYYMMDD` 的日文件
    pub fn load_day(&self, compact: &str) -> PlumeResult<Arc<DiffusivityDay>> {
        let metadata = self
            .metadata
            .as_ref()
            .ok_or_else(|| PlumeError::io("service not initialized"))?;
        if !metadata.has_date(compact) {
            return Err(PlumeError::io(format!("no diffusivity data for {}", compact)));
        }
        let cells = self
            .coords
            .as_ref()
            .map(|c| c.cells())
            .ok_or_else(|| PlumeError::io("coordinates not loaded"))?;

        let path = self
            .config
            .data_dir
            .join(DAILY_SUBDIR)
            .join(format!("eke_{}.bin", compact));
        self.cache.load_or_get(compact, || {
            tracing::debug!(file = %path.display(), "loading diffusivity day");
            let file = File::open(&path).map_err(|e| {
                PlumeError::io_with_source(format!("cannot open {}", path.display()), e)
            })?;
            DiffusivityDay::read(&mut BufReader::new(file), cells)
        })
    }

    fn resolve_day(&self, sim_day: f64) -> Option<Arc<DiffusivityDay>> {
        let date = self.config.clock.date_for_day(sim_day);
        let compact = compact_date(date);
        match self.load_day(&compact) {
            Ok(day) => Some(day),
            Err(e) => {
                tracing::warn!(day = %compact, error = %e, "diffusivity day unavailable");
                None
            }
        }
    }
}

impl DiffusivityProvider for DiffusivityFieldService {
    fn diffusivity(&self, lon: f64, lat: f64, sim_day: f64) -> DiffusivitySample {
        let miss = DiffusivitySample {
            k: K_MIN,
            found: false,
        };

        let Some(index) = self.index.as_ref() else {
            return miss;
        };
        let Some(day) = self.resolve_day(sim_day) else {
            return miss;
        };
        let Some(cell) = index.nearest(lon, lat) else {
            return miss;
        };

        let raw = day.k[cell] as f64;
        // 转码工具对缺测写 0；非正值与 NaN 一律按未命中处理
        if !raw.is_finite() || raw <= 0.0 {
            return miss;
        }
        DiffusivitySample {
            k: raw.clamp(K_MIN, K_MAX),
            found: true,
        }
    }
}

// ============================================================
// 测试
// ============================================================
