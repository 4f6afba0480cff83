// crates/pt_engine/src/land.rs

//! 陆地交互
//!
//! 两条规则协同把粒子留在海里：
//!
//! 1. 路径检查：对拟议的直线移动取 5 个等距内部采样点逐一验证，
//!    任一点落在陆地就把粒子放到最后一个验证为安全的采样点，
//!    并把存储流速清零；
//! 2. 落点检查：两个子步都写完后若当前位置不是海洋，回退到步前
//!    位置，再向最近海洋单元方向移动一半。
//!
//! 本模块实现规则 1；规则 2 在引擎主循环里，因为它要改动统计。

use glam::DVec2;
use pt_fields::CurrentProvider;
use pt_foundation::ReferencePoint;

/// 路径内部采样点数
pub const PATH_SAMPLES: usize = 5;

/// 路径检查结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathCheck {
    /// 允许到达的位置：全程安全时即拟议终点，否则最后的安全采样点
    pub safe_position: DVec2,
    /// 全程是否安全
    pub clear: bool,
}

/// 沿拟议直线移动做路径安全检查
///
/// 内部采样点取分数 k/(PATH_SAMPLES+1)，k = 1..=PATH_SAMPLES。
/// 起点视为已验证安全；终点由落点检查负责。
pub fn check_path(
    currents: &dyn CurrentProvider,
    reference: ReferencePoint,
    from: DVec2,
    to: DVec2,
    depth_m: f64,
    sim_day: f64,
) -> PathCheck {
    let delta = to - from;
    if delta.length_squared() == 0.0 {
        return PathCheck {
            safe_position: to,
            clear: true,
        };
    }

    let mut last_safe = from;
    for k in 1..=PATH_SAMPLES {
        let fraction = k as f64 / (PATH_SAMPLES + 1) as f64;
        let probe = from + delta * fraction;
        let (lon, lat) = reference.to_lonlat(probe.x, probe.y);
        if !currents.is_ocean(lon, lat, depth_m, sim_day) {
            return PathCheck {
                safe_position: last_safe,
                clear: false,
            };
        }
        last_safe = probe;
    }

    PathCheck {
        safe_position: to,
        clear: true,
    }
}

// ============================================================
// 测试
// ============================================================
