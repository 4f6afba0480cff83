// crates/pt_foundation/src/time.rs

//! 模拟时钟
//!
//! 负责模拟日偏移与日历日期之间的换算。第 0 天对应配置的基准日期
//! （默认 2011-03-01），所有日文件按该偏移索引。
//!
//! # 使用示例
//!
//! ```
//! use pt_foundation::time::SimClock;
//!
//! let clock = SimClock::default();
//! let date = clock.date_for_day(10.0);
//! assert_eq!(clock.day_offset(date), 10);
//! ```

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// 默认基准日期：2011-03-01
fn default_base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2011, 3, 1).unwrap()
}

/// 模拟时钟：基准日期与日偏移换算
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    /// 基准日期（第 0 天）
    #[serde(default = "default_base_date")]
    pub base_date: NaiveDate,
}

impl Default for SimClock {
    fn default() -> Self {
        Self {
            base_date: default_base_date(),
        }
    }
}

impl SimClock {
    /// 以指定基准日期创建时钟
    pub fn new(base_date: NaiveDate) -> Self {
        Self { base_date }
    }

    /// 模拟日（可带小数）对应的日历日期
    ///
    /// 小数部分截断：第 3.7 天仍落在基准日期 + 3 天。
    pub fn date_for_day(&self, sim_day: f64) -> NaiveDate {
        let whole = sim_day.floor() as i64;
        self.base_date + Duration::days(whole)
    }

    /// 日历日期对应的整数日偏移
    pub fn day_offset(&self, date: NaiveDate) -> i64 {
        (date - self.base_date).num_days()
    }

    /// 北半球冬季判定：年积日 < 90 或 > 335
    ///
    /// 用于冬季对流混合项的门控。
    pub fn is_winter(&self, sim_day: f64) -> bool {
        let doy = self.date_for_day(sim_day).ordinal();
        doy < 90 || doy > 335
    }
}

/// 日期键格式 `YYYY-MM-DD`，用于缓存与单飞映射
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// 紧凑日期格式 `YYYYMMDD`，用于扩散日文件名
pub fn compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

// ============================================================
// 测试
// ============================================================
