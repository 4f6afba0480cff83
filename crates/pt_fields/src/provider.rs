// crates/pt_fields/src/provider.rs

//! 场服务能力接口
//!
//! 粒子引擎通过这两个 trait 借用场服务（构造注入，无全局量）。
//! 查询缺失一律以 `found = false` 表达，不走错误通道，
//! 引擎据此确定回退行为。

/// 流速查询结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocitySample {
    /// 东向流速 [m/s]
    pub u: f64,
    /// 北向流速 [m/s]
    pub v: f64,
    /// 是否命中海洋单元
    pub found: bool,
    /// 实际吸附到的离散深度 [m]
    pub actual_depth: f64,
}

impl VelocitySample {
    /// 未命中样本：零流速
    pub const fn miss() -> Self {
        Self {
            u: 0.0,
            v: 0.0,
            found: false,
            actual_depth: 0.0,
        }
    }
}

/// 扩散系数查询结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffusivitySample {
    /// 水平扩散系数 [m²/s]
    pub k: f64,
    /// 是否命中
    pub found: bool,
}

/// 最近海洋单元查询结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OceanCell {
    /// 单元经度 [°]
    pub lon: f64,
    /// 单元纬度 [°]
    pub lat: f64,
    /// 纬向行号
    pub i: usize,
    /// 经向列号
    pub j: usize,
    /// 查询吸附到的离散深度 [m]
    pub actual_depth: f64,
}

/// 流速场能力接口
pub trait CurrentProvider {
    /// 单点流速查询
    ///
    /// `sim_day` 经基准日期解析成日历日；`depth_m` 吸附到最近的离散深度层。
    fn velocity(&self, lon: f64, lat: f64, depth_m: f64, sim_day: f64) -> VelocitySample;

    /// 批量查询，与输入同序
    ///
    /// 语义与逐点调用一致，批只是为了共享日加载与深度索引。
    fn velocities_batch(
        &self,
        positions: &[(f64, f64)],
        depth_m: f64,
        sim_day: f64,
    ) -> Vec<VelocitySample> {
        positions
            .iter()
            .map(|&(lon, lat)| self.velocity(lon, lat, depth_m, sim_day))
            .collect()
    }

    /// 该位置是否为海洋
    fn is_ocean(&self, lon: f64, lat: f64, depth_m: f64, sim_day: f64) -> bool {
        self.velocity(lon, lat, depth_m, sim_day).found
    }

    /// 从最近网格单元向外螺旋搜索第一个海洋单元
    fn find_nearest_ocean_cell(
        &self,
        lon: f64,
        lat: f64,
        depth_m: f64,
        sim_day: f64,
        max_radius_cells: usize,
    ) -> Option<OceanCell>;

    /// 可用的离散深度层 [m]，升序
    fn available_depths(&self) -> &[f64];
}

/// 扩散系数场能力接口
pub trait DiffusivityProvider {
    /// 单点扩散系数查询
    fn diffusivity(&self, lon: f64, lat: f64, sim_day: f64) -> DiffusivitySample;
}

// ============================================================
// 借用与共享指针的透传实现
// ============================================================

// 组合根持有服务本体，引擎可以拿 &Service 或 Arc<Service> 作泛型参数。

impl<'a, T: CurrentProvider + ?Sized> CurrentProvider for &'a T {
    fn velocity(&self, lon: f64, lat: f64, depth_m: f64, sim_day: f64) -> VelocitySample {
        (**self).velocity(lon, lat, depth_m, sim_day)
    }

    fn velocities_batch(
        &self,
        positions: &[(f64, f64)],
        depth_m: f64,
        sim_day: f64,
    ) -> Vec<VelocitySample> {
        (**self).velocities_batch(positions, depth_m, sim_day)
    }

    fn is_ocean(&self, lon: f64, lat: f64, depth_m: f64, sim_day: f64) -> bool {
        (**self).is_ocean(lon, lat, depth_m, sim_day)
    }

    fn find_nearest_ocean_cell(
        &self,
        lon: f64,
        lat: f64,
        depth_m: f64,
        sim_day: f64,
        max_radius_cells: usize,
    ) -> Option<OceanCell> {
        (**self).find_nearest_ocean_cell(lon, lat, depth_m, sim_day, max_radius_cells)
    }

    fn available_depths(&self) -> &[f64] {
        (**self).available_depths()
    }
}

impl<T: CurrentProvider + ?Sized> CurrentProvider for std::sync::Arc<T> {
    fn velocity(&self, lon: f64, lat: f64, depth_m: f64, sim_day: f64) -> VelocitySample {
        (**self).velocity(lon, lat, depth_m, sim_day)
    }

    fn velocities_batch(
        &self,
        positions: &[(f64, f64)],
        depth_m: f64,
        sim_day: f64,
    ) -> Vec<VelocitySample> {
        (**self).velocities_batch(positions, depth_m, sim_day)
    }

    fn is_ocean(&self, lon: f64, lat: f64, depth_m: f64, sim_day: f64) -> bool {
        (**self).is_ocean(lon, lat, depth_m, sim_day)
    }

    fn find_nearest_ocean_cell(
        &self,
        lon: f64,
        lat: f64,
        depth_m: f64,
        sim_day: f64,
        max_radius_cells: usize,
    ) -> Option<OceanCell> {
        (**self).find_nearest_ocean_cell(lon, lat, depth_m, sim_day, max_radius_cells)
    }

    fn available_depths(&self) -> &[f64] {
        (**self).available_depths()
    }
}

impl<'a, T: DiffusivityProvider + ?Sized> DiffusivityProvider for &'a T {
    fn diffusivity(&self, lon: f64, lat: f64, sim_day: f64) -> DiffusivitySample {
        (**self).diffusivity(lon, lat, sim_day)
    }
}

impl<T: DiffusivityProvider + ?Sized> DiffusivityProvider for std::sync::Arc<T> {
    fn diffusivity(&self, lon: f64, lat: f64, sim_day: f64) -> DiffusivitySample {
        (**self).diffusivity(lon, lat, sim_day)
    }
}
