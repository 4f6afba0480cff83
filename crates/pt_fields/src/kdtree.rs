// crates/pt_fields/src/kdtree.rs

//! 网格单元 KD 树
//!
//! 对曲线网格的单元坐标做最近邻查询。构建时每个轴向隔一取一
//! （四分之一的单元进入索引），分裂轴在经度/纬度间交替，按中位数切分。
//!
//! 坐标数组跨日不变，因此树在服务生命周期内只构建一次，
//! 日缓存换入换出不影响它。
//!
//! 最近邻使用 Haversine 距离，配合标准的分裂面剪枝：
//! 查询点到分裂面的沿轴距离换算成米之后仍小于当前最优距离时，
//! 才需要搜索另一侧子树。

use pt_foundation::geo::{haversine_m, EARTH_RADIUS_M};

/// 纬度方向每度的弧长 [m/°]
const METERS_PER_DEG: f64 = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;

/// 索引中的网格单元
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellNode {
    /// 纬向行号
    pub i: u32,
    /// 经向列号
    pub j: u32,
    /// 全分辨率平铺索引
    pub flat: u32,
    /// 单元经度 [°]
    pub lon: f64,
    /// 单元纬度 [°]
    pub lat: f64,
}

/// 网格单元 KD 树
#[derive(Debug, Clone)]
pub struct GridKdTree {
    /// 节点按「中位数居中」顺序排列，子树连续
    nodes: Vec<CellNode>,
}

impl GridKdTree {
    /// 从网格坐标构建，隔一取一采样
    ///
    /// `lon`、`lat` 为长度 `n_lat · n_lon` 的平铺数组。
    pub fn from_grid(lon: &[f32], lat: &[f32], n_lat: usize, n_lon: usize) -> Self {
        let mut nodes = Vec::with_capacity((n_lat / 2 + 1) * (n_lon / 2 + 1));
        for i in (0..n_lat).step_by(2) {
            for j in (0..n_lon).step_by(2) {
                let flat = i * n_lon + j;
                let (lo, la) = (lon[flat] as f64, lat[flat] as f64);
                if !lo.is_finite() || !la.is_finite() {
                    continue;
                }
                nodes.push(CellNode {
                    i: i as u32,
                    j: j as u32,
                    flat: flat as u32,
                    lon: lo,
                    lat: la,
                });
            }
        }
        build_recursive(&mut nodes, 0);
        Self { nodes }
    }

    /// 索引中的单元数
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// 索引是否为空
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 最近单元查询
    pub fn nearest(&self, lon: f64, lat: f64) -> Option<&CellNode> {
        if self.nodes.is_empty() {
            return None;
        }
        let mut best: Option<usize> = None;
        let mut best_dist = f64::INFINITY;
        self.search(0, self.nodes.len(), 0, lon, lat, &mut best, &mut best_dist);
        best.map(|idx| &self.nodes[idx])
    }

    fn search(
        &self,
        lo: usize,
        hi: usize,
        depth: usize,
        lon: f64,
        lat: f64,
        best: &mut Option<usize>,
        best_dist: &mut f64,
    ) {
        if lo >= hi {
            return;
        }
        let mid = lo + (hi - lo) / 2;
        let node = &self.nodes[mid];

        let dist = haversine_m(lon, lat, node.lon, node.lat);
        if dist < *best_dist {
            *best_dist = dist;
            *best = Some(mid);
        }

        let axis_is_lon = depth % 2 == 0;
        let (query_axis, node_axis) = if axis_is_lon {
            (lon, node.lon)
        } else {
            (lat, node.lat)
        };

        let (near_lo, near_hi, far_lo, far_hi) = if query_axis < node_axis {
            (lo, mid, mid + 1, hi)
        } else {
            (mid + 1, hi, lo, mid)
        };

        self.search(near_lo, near_hi, depth + 1, lon, lat, best, best_dist);

        // 分裂面剪枝：沿轴间隔换算成米，经度按查询纬度收缩
        let axis_gap_deg = (query_axis - node_axis).abs();
        let axis_gap_m = if axis_is_lon {
            axis_gap_deg * METERS_PER_DEG * lat.to_radians().cos().abs()
        } else {
            axis_gap_deg * METERS_PER_DEG
        };
        if axis_gap_m < *best_dist {
            self.search(far_lo, far_hi, depth + 1, lon, lat, best, best_dist);
        }
    }
}

/// 递归排列节点：中位数放在区间中点，左右子区间继续
fn build_recursive(nodes: &mut [CellNode], depth: usize) {
    let n = nodes.len();
    if n <= 1 {
        return;
    }
    let mid = n / 2;
    if depth % 2 == 0 {
        nodes.select_nth_unstable_by(mid, |a, b| a.lon.total_cmp(&b.lon));
    } else {
        nodes.select_nth_unstable_by(mid, |a, b| a.lat.total_cmp(&b.lat));
    }
    let (left, right) = nodes.split_at_mut(mid);
    build_recursive(left, depth + 1);
    build_recursive(&mut right[1..], depth + 1);
}

// ============================================================
// 测试
// ============================================================
