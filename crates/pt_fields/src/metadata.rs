// crates/pt_fields/src/metadata.rs

//! 数据集元数据文档
//!
//! 两个服务各有一份 JSON 元数据，随二进制日文件一同由转码工具生成。
//! 服务在 `init()` 阶段读取，之后只读。

use pt_foundation::{PlumeError, PlumeResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// 数据集经纬度包络
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// 北界 [°]
    pub north: f64,
    /// 南界 [°]
    pub south: f64,
    /// 东界 [°]
    pub east: f64,
    /// 西界 [°]
    pub west: f64,
}

impl BoundingBox {
    /// 点是否落在包络内
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.west && lon <= self.east && lat >= self.south && lat <= self.north
    }
}

/// 流速数据集中单日的登记项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayEntry {
    /// 日历年
    pub year: i32,
    /// 日历月
    pub month: u32,
    /// 日历日
    pub day: u32,
    /// `YYYY-MM-DD` 格式日期
    pub date_str: String,
    /// 距基准日期的整数天数
    pub day_offset: i64,
    /// 日文件名
    pub file: String,
}

/// 流速数据集元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentsMetadata {
    /// 基准日期（ISO 格式），缺省由时钟配置决定
    #[serde(default)]
    pub base_date: Option<String>,
    /// 离散深度层 [m]
    #[serde(default)]
    pub depths: Vec<f64>,
    /// 网格包络
    pub bounding_box: BoundingBox,
    /// 可用日列表，按 day_offset 升序
    pub days: Vec<DayEntry>,
}

impl CurrentsMetadata {
    /// 从 JSON 文件加载
    pub fn load(path: &Path) -> PlumeResult<Self> {
        let file = File::open(path).map_err(|e| {
            PlumeError::io_with_source(format!("cannot open metadata {}", path.display()), e)
        })?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| PlumeError::format(format!("bad currents metadata: {}", e)))
    }

    /// 按日偏移查找登记项
    pub fn entry_for_offset(&self, day_offset: i64) -> Option<&DayEntry> {
        self.days.iter().find(|d| d.day_offset == day_offset)
    }

    /// 按日历日期查找登记项
    pub fn entry_for_date(&self, year: i32, month: u32, day: u32) -> Option<&DayEntry> {
        self.days
            .iter()
            .find(|d| d.year == year && d.month == month && d.day == day)
    }
}

/// 扩散系数数据集元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffusivityMetadata {
    /// 可用天数
    pub total_days: usize,
    /// `YYYYMMDD` 格式日期列表
    pub dates: Vec<String>,
}

impl DiffusivityMetadata {
    /// 从 JSON 文件加载
    pub fn load(path: &Path) -> PlumeResult<Self> {
        let file = File::open(path).map_err(|e| {
            PlumeError::io_with_source(format!("cannot open metadata {}", path.display()), e)
        })?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| PlumeError::format(format!("bad diffusivity metadata: {}", e)))
    }

    /// 指定紧凑日期是否有数据
    pub fn has_date(&self, compact: &str) -> bool {
        self.dates.iter().any(|d| d == compact)
    }
}

// ============================================================
// 测试
// ============================================================
