// crates/pt_fields/src/bucket.rs

//! 粗分桶空间索引
//!
//! 扩散系数网格的查询精度要求低于流速网格，用一个固定 50×50 的
//! 桶网格覆盖坐标包络即可。查询命中目标桶及其 8 个邻桶，
//! 在候选单元中按 Haversine 距离取最近。

use pt_foundation::geo::haversine_m;

/// 每个轴向的桶数
pub const BUCKETS_PER_AXIS: usize = 50;

/// 粗分桶索引
#[derive(Debug, Clone)]
pub struct BucketGrid {
    /// 桶内的平铺单元索引
    buckets: Vec<Vec<u32>>,
    lon_min: f64,
    lat_min: f64,
    lon_span: f64,
    lat_span: f64,
    /// 单元坐标（构建时拷贝，查询用）
    lon: Vec<f32>,
    lat: Vec<f32>,
}

impl BucketGrid {
    /// 从平铺坐标数组构建
    pub fn build(lon: &[f32], lat: &[f32]) -> Self {
        let mut lon_min = f64::INFINITY;
        let mut lon_max = f64::NEG_INFINITY;
        let mut lat_min = f64::INFINITY;
        let mut lat_max = f64::NEG_INFINITY;

        for (&lo, &la) in lon.iter().zip(lat.iter()) {
            let (lo, la) = (lo as f64, la as f64);
            if !lo.is_finite() || !la.is_finite() {
                continue;
            }
            lon_min = lon_min.min(lo);
            lon_max = lon_max.max(lo);
            lat_min = lat_min.min(la);
            lat_max = lat_max.max(la);
        }

        // 退化包络（空数组或单点）给一个最小跨度，避免除零
        let lon_span = (lon_max - lon_min).max(1e-9);
        let lat_span = (lat_max - lat_min).max(1e-9);

        let mut buckets = vec![Vec::new(); BUCKETS_PER_AXIS * BUCKETS_PER_AXIS];
        if lon_min.is_finite() {
            for (idx, (&lo, &la)) in lon.iter().zip(lat.iter()).enumerate() {
                let (lo, la) = (lo as f64, la as f64);
                if !lo.is_finite() || !la.is_finite() {
                    continue;
                }
                let bx = bucket_coord(lo, lon_min, lon_span);
                let by = bucket_coord(la, lat_min, lat_span);
                buckets[by * BUCKETS_PER_AXIS + bx].push(idx as u32);
            }
        }

        Self {
            buckets,
            lon_min,
            lat_min,
            lon_span,
            lat_span,
            lon: lon.to_vec(),
            lat: lat.to_vec(),
        }
    }

    /// 最近单元查询：目标桶 + 8 邻桶中的最近候选
    ///
    /// 包络外或候选为空时返回 `None`。
    pub fn nearest(&self, lon: f64, lat: f64) -> Option<usize> {
        if !lon.is_finite() || !lat.is_finite() || self.lon.is_empty() {
            return None;
        }
        // 允许出界半个桶以内的查询落到边缘桶
        let margin_lon = self.lon_span / BUCKETS_PER_AXIS as f64;
        let margin_lat = self.lat_span / BUCKETS_PER_AXIS as f64;
        if lon < self.lon_min - margin_lon
            || lon > self.lon_min + self.lon_span + margin_lon
            || lat < self.lat_min - margin_lat
            || lat > self.lat_min + self.lat_span + margin_lat
        {
            return None;
        }

        let bx = bucket_coord(lon, self.lon_min, self.lon_span) as isize;
        let by = bucket_coord(lat, self.lat_min, self.lat_span) as isize;

        let mut best: Option<usize> = None;
        let mut best_dist = f64::INFINITY;
        for dy in -1..=1isize {
            for dx in -1..=1isize {
                let (x, y) = (bx + dx, by + dy);
                if x < 0 || y < 0 || x >= BUCKETS_PER_AXIS as isize || y >= BUCKETS_PER_AXIS as isize
                {
                    continue;
                }
                for &idx in &self.buckets[y as usize * BUCKETS_PER_AXIS + x as usize] {
                    let idx = idx as usize;
                    let d = haversine_m(lon, lat, self.lon[idx] as f64, self.lat[idx] as f64);
                    if d < best_dist {
                        best_dist = d;
                        best = Some(idx);
                    }
                }
            }
        }
        best
    }
}

#[inline]
fn bucket_coord(value: f64, min: f64, span: f64) -> usize {
    let norm = ((value - min) / span).clamp(0.0, 1.0);
    ((norm * BUCKETS_PER_AXIS as f64) as usize).min(BUCKETS_PER_AXIS - 1)
}

// ============================================================
// 测试
// ============================================================
