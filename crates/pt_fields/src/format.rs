// crates/pt_fields/src/format.rs

//! 日文件二进制格式
//!
//! 小端二进制布局，由外部转码工具从 netCDF 生成，本模块只负责读写：
//!
//! ```text
//! 流速日文件 (version = 4)
//! +--------------------------------------+
//! | header: 7 × i32                      |  version, nLat, nLon, nDepth, year, month, day
//! | lon:    nLat·nLon × f32              |
//! | lat:    nLat·nLon × f32              |
//! | u:      nDepth·nLat·nLon × f32       |  [m/s]
//! | v:      nDepth·nLat·nLon × f32       |  [m/s]
//! +--------------------------------------+
//!
//! version = 3 为单层遗留格式：头部 6 × i32（无 nDepth），负载无深度维。
//!
//! 扩散系数坐标文件：header 3 × i32 (version, nLat, nLon)，负载 lon、lat。
//! 扩散系数日文件 (version = 1)：header 4 × i32 (version, year, month, day)，
//! 负载 K[nLat·nLon] × f32 [m²/s]。
//! ```
//!
//! 陆地哨兵：NaN 或 |值| ≥ 1000（转码工具写入 −9999.0）。
//! 读取时浮点数组整体拷贝出读缓冲，缓冲随后即可释放。

use pt_foundation::{PlumeError, PlumeResult};
use std::io::{Read, Write};

/// 陆地哨兵阈值
pub const LAND_SENTINEL_THRESHOLD: f32 = 1000.0;

/// 流速日文件当前版本
pub const VELOCITY_VERSION: i32 = 4;

/// 流速日文件单层遗留版本
pub const VELOCITY_VERSION_LEGACY: i32 = 3;

/// 扩散系数日文件版本
pub const DIFFUSIVITY_VERSION: i32 = 1;

/// 网格维度上限，用于头部健全性检查
const MAX_GRID_DIM: i32 = 100_000;

/// 判定数值是否为陆地哨兵
#[inline]
pub fn is_land_value(value: f32) -> bool {
    value.is_nan() || value.abs() >= LAND_SENTINEL_THRESHOLD
}

// ============================================================
// 低层读写原语
// ============================================================

fn read_i32<R: Read>(reader: &mut R) -> PlumeResult<i32> {
    let mut buf = [0u8; 4];
    reader
        .read_exact(&mut buf)
        .map_err(|e| PlumeError::io_with_source("short read in header", e))?;
    Ok(i32::from_le_bytes(buf))
}

/// 读取 f32 数组并拷贝出缓冲
fn read_f32_vec<R: Read>(reader: &mut R, count: usize, what: &str) -> PlumeResult<Vec<f32>> {
    let mut raw = vec![0u8; count * 4];
    reader.read_exact(&mut raw).map_err(|_| {
        PlumeError::format(format!(
            "payload truncated: expected {} f32 values for {}",
            count, what
        ))
    })?;
    Ok(raw
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

fn check_dim(value: i32, what: &str) -> PlumeResult<usize> {
    if value <= 0 || value > MAX_GRID_DIM {
        return Err(PlumeError::format(format!(
            "implausible dimension {} = {}",
            what, value
        )));
    }
    Ok(value as usize)
}

// ============================================================
// 流速日文件
// ============================================================

/// 单日流速网格
///
/// 负载按 `(depth, i, j)` 行主序平铺；坐标数组在深度间共享。
/// 创建后不再修改。
#[derive(Debug, Clone)]
pub struct VelocityDay {
    /// 纬向网格数
    pub n_lat: usize,
    /// 经向网格数
    pub n_lon: usize,
    /// 深度层数
    pub n_depth: usize,
    /// 日历年
    pub year: i32,
    /// 日历月
    pub month: i32,
    /// 日历日
    pub day: i32,
    /// 单元经度 [°]，长度 n_lat·n_lon
    pub lon: Vec<f32>,
    /// 单元纬度 [°]，长度 n_lat·n_lon
    pub lat: Vec<f32>,
    /// 东向流速 [m/s]，长度 n_depth·n_lat·n_lon
    pub u: Vec<f32>,
    /// 北向流速 [m/s]，长度 n_depth·n_lat·n_lon
    pub v: Vec<f32>,
}

impl VelocityDay {
    /// 平面单元总数
    #[inline]
    pub fn cells(&self) -> usize {
        self.n_lat * self.n_lon
    }

    /// (i, j) → 平铺索引
    #[inline]
    pub fn flat_index(&self, i: usize, j: usize) -> usize {
        i * self.n_lon + j
    }

    /// 指定深度层、平铺索引处的 (u, v)
    #[inline]
    pub fn velocity_at(&self, depth_idx: usize, flat: usize) -> (f32, f32) {
        let offset = depth_idx * self.cells() + flat;
        (self.u[offset], self.v[offset])
    }

    /// 指定深度层、平铺索引处是否为陆地
    #[inline]
    pub fn is_land(&self, depth_idx: usize, flat: usize) -> bool {
        let (u, v) = self.velocity_at(depth_idx, flat);
        is_land_value(u) || is_land_value(v)
    }

    /// 从读取器解析日文件（自动识别 version 3 / 4）
    pub fn read<R: Read>(reader: &mut R) -> PlumeResult<Self> {
        let version = read_i32(reader)?;
        match version {
            VELOCITY_VERSION => Self::read_v4(reader),
            VELOCITY_VERSION_LEGACY => Self::read_v3(reader),
            other => Err(PlumeError::format(format!(
                "unsupported velocity file version {}",
                other
            ))),
        }
    }

    fn read_v4<R: Read>(reader: &mut R) -> PlumeResult<Self> {
        let n_lat = check_dim(read_i32(reader)?, "nLat")?;
        let n_lon = check_dim(read_i32(reader)?, "nLon")?;
        let n_depth = check_dim(read_i32(reader)?, "nDepth")?;
        let year = read_i32(reader)?;
        let month = read_i32(reader)?;
        let day = read_i32(reader)?;

        let cells = n_lat * n_lon;
        let lon = read_f32_vec(reader, cells, "lon")?;
        let lat = read_f32_vec(reader, cells, "lat")?;
        let u = read_f32_vec(reader, cells * n_depth, "u")?;
        let v = read_f32_vec(reader, cells * n_depth, "v")?;

        Ok(Self {
            n_lat,
            n_lon,
            n_depth,
            year,
            month,
            day,
            lon,
            lat,
            u,
            v,
        })
    }

    fn read_v3<R: Read>(reader: &mut R) -> PlumeResult<Self> {
        let n_lat = check_dim(read_i32(reader)?, "nLat")?;
        let n_lon = check_dim(read_i32(reader)?, "nLon")?;
        let year = read_i32(reader)?;
        let month = read_i32(reader)?;
        let day = read_i32(reader)?;

        let cells = n_lat * n_lon;
        let lon = read_f32_vec(reader, cells, "lon")?;
        let lat = read_f32_vec(reader, cells, "lat")?;
        let u = read_f32_vec(reader, cells, "u")?;
        let v = read_f32_vec(reader, cells, "v")?;

        Ok(Self {
            n_lat,
            n_lon,
            n_depth: 1,
            year,
            month,
            day,
            lon,
            lat,
            u,
            v,
        })
    }

    /// 写出 version 4 日文件
    pub fn write<W: Write>(&self, writer: &mut W) -> PlumeResult<()> {
        let cells = self.cells();
        if self.lon.len() != cells || self.lat.len() != cells {
            return Err(PlumeError::format("coordinate arrays do not match nLat·nLon"));
        }
        if self.u.len() != cells * self.n_depth || self.v.len() != cells * self.n_depth {
            return Err(PlumeError::format("velocity arrays do not match declared dimensions"));
        }

        for header in [
            VELOCITY_VERSION,
            self.n_lat as i32,
            self.n_lon as i32,
            self.n_depth as i32,
            self.year,
            self.month,
            self.day,
        ] {
            writer.write_all(&header.to_le_bytes())?;
        }
        for array in [&self.lon, &self.lat, &self.u, &self.v] {
            for &value in array.iter() {
                writer.write_all(&value.to_le_bytes())?;
            }
        }
        Ok(())
    }
}

// ============================================================
// 扩散系数坐标文件
// ============================================================

/// 扩散系数网格坐标，整个服务生命周期只加载一次
#[derive(Debug, Clone)]
pub struct DiffusivityCoords {
    /// 纬向网格数
    pub n_lat: usize,
    /// 经向网格数
    pub n_lon: usize,
    /// 单元经度 [°]
    pub lon: Vec<f32>,
    /// 单元纬度 [°]
    pub lat: Vec<f32>,
}

impl DiffusivityCoords {
    /// 平面单元总数
    #[inline]
    pub fn cells(&self) -> usize {
        self.n_lat * self.n_lon
    }

    /// 从读取器解析坐标文件
    pub fn read<R: Read>(reader: &mut R) -> PlumeResult<Self> {
        let _version = read_i32(reader)?;
        let n_lat = check_dim(read_i32(reader)?, "nLat")?;
        let n_lon = check_dim(read_i32(reader)?, "nLon")?;

        let cells = n_lat * n_lon;
        let lon = read_f32_vec(reader, cells, "lon")?;
        let lat = read_f32_vec(reader, cells, "lat")?;

        Ok(Self {
            n_lat,
            n_lon,
            lon,
            lat,
        })
    }

    /// 写出坐标文件
    pub fn write<W: Write>(&self, writer: &mut W) -> PlumeResult<()> {
        for header in [DIFFUSIVITY_VERSION, self.n_lat as i32, self.n_lon as i32] {
            writer.write_all(&header.to_le_bytes())?;
        }
        for array in [&self.lon, &self.lat] {
            for &value in array.iter() {
                writer.write_all(&value.to_le_bytes())?;
            }
        }
        Ok(())
    }
}

// ============================================================
// 扩散系数日文件
// ============================================================

/// 单日扩散系数网格
#[derive(Debug, Clone)]
pub struct DiffusivityDay {
    /// 日历年
    pub year: i32,
    /// 日历月
    pub month: i32,
    /// 日历日
    pub day: i32,
    /// 扩散系数 [m²/s]，长度 n_lat·n_lon
    pub k: Vec<f32>,
}

impl DiffusivityDay {
    /// 解析日文件；单元数由坐标文件给定
    pub fn read<R: Read>(reader: &mut R, cells: usize) -> PlumeResult<Self> {
        let version = read_i32(reader)?;
        if version != DIFFUSIVITY_VERSION {
            return Err(PlumeError::format(format!(
                "unsupported diffusivity file version {}",
                version
            )));
        }
        let year = read_i32(reader)?;
        let month = read_i32(reader)?;
        let day = read_i32(reader)?;
        let k = read_f32_vec(reader, cells, "K")?;

        Ok(Self { year, month, day, k })
    }

    /// 写出日文件
    pub fn write<W: Write>(&self, writer: &mut W) -> PlumeResult<()> {
        for header in [DIFFUSIVITY_VERSION, self.year, self.month, self.day] {
            writer.write_all(&header.to_le_bytes())?;
        }
        for &value in self.k.iter() {
            writer.write_all(&value.to_le_bytes())?;
        }
        Ok(())
    }
}

// ============================================================
// 测试
// ============================================================
