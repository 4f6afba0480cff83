// crates/pt_foundation/src/geo.rs

//! 地理换算
//!
//! 局地平面坐标系与经纬度之间的换算，以及 Haversine 球面距离。
//!
//! 粒子坐标保存在以释放点 (lon0, lat0) 为原点的局地平面上，单位千米。
//! 经度方向按中纬度近似 88.8 km/°，纬度方向 111.0 km/°。

/// 经度方向换算系数 [km/°]
pub const LON_SCALE_KM_PER_DEG: f64 = 88.8;

/// 纬度方向换算系数 [km/°]
pub const LAT_SCALE_KM_PER_DEG: f64 = 111.0;

/// (m/s)·day → km 的换算系数：86400 s/day ÷ 1000 m/km
pub const KM_PER_MS_DAY: f64 = 86.4;

/// 地球平均半径 [m]
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// 局地平面参考点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferencePoint {
    /// 参考经度 [°]
    pub lon: f64,
    /// 参考纬度 [°]
    pub lat: f64,
}

impl ReferencePoint {
    /// 创建参考点
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// 经纬度 → 局地平面 [km]
    pub fn to_plane(&self, lon: f64, lat: f64) -> (f64, f64) {
        (
            (lon - self.lon) * LON_SCALE_KM_PER_DEG,
            (lat - self.lat) * LAT_SCALE_KM_PER_DEG,
        )
    }

    /// 局地平面 [km] → 经纬度
    pub fn to_lonlat(&self, x_km: f64, y_km: f64) -> (f64, f64) {
        (
            self.lon + x_km / LON_SCALE_KM_PER_DEG,
            self.lat + y_km / LAT_SCALE_KM_PER_DEG,
        )
    }
}

/// Haversine 球面距离 [m]
pub fn haversine_m(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

// ============================================================
// 测试
// ============================================================
