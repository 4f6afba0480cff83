// crates/pt_bake/tests/roundtrip_tests.rs

//! 烘焙 → 存档 → 加载 → 回放 的全链路往返测试

use pt_bake::{BakeConfig, BakeRecorder, SnapshotArchive, SnapshotPlayer};
use pt_engine::{EngineConfig, ParticleEngine};
use pt_fields::{
    CurrentProvider, DiffusivityProvider, DiffusivitySample, OceanCell, VelocitySample,
};

const DEPTHS: [f64; 6] = [0.0, 50.0, 100.0, 200.0, 500.0, 1000.0];

/// 缓慢东向漂流的测试流场
struct DriftField;

impl CurrentProvider for DriftField {
    fn velocity(&self, _lon: f64, _lat: f64, _depth_m: f64, _sim_day: f64) -> VelocitySample {
        VelocitySample {
            u: 0.05,
            v: 0.01,
            found: true,
            actual_depth: 0.0,
        }
    }

    fn find_nearest_ocean_cell(
        &self,
        _lon: f64,
        _lat: f64,
        _depth_m: f64,
        _sim_day: f64,
        _max_radius_cells: usize,
    ) -> Option<OceanCell> {
        None
    }

    fn available_depths(&self) -> &[f64] {
        &DEPTHS
    }
}

struct ConstantK;

impl DiffusivityProvider for ConstantK {
    fn diffusivity(&self, _lon: f64, _lat: f64, _sim_day: f64) -> DiffusivitySample {
        DiffusivitySample {
            k: 80.0,
            found: true,
        }
    }
}

fn baked_archive() -> SnapshotArchive {
    let mut config = EngineConfig::default();
    config.pool_size = 300;
    config.land.enabled = false;
    let mut engine = ParticleEngine::new(config, DriftField, ConstantK).unwrap();

    let recorder = BakeRecorder::new(BakeConfig {
        duration_days: 20.0,
        snapshot_frequency: 5.0,
        autosave_interval_days: None,
        autosave_path: None,
    });
    let outcome = recorder.run(&mut engine);
    assert!(outcome.completed);
    outcome.archive
}

#[test]
fn test_bake_save_load_seek_roundtrip() {
    let archive = baked_archive();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plume_bake.json");
    archive.save(&path).unwrap();

    let loaded = SnapshotArchive::load(&path).unwrap();
    assert_eq!(loaded.snapshots.len(), archive.snapshots.len());
    assert_eq!(loaded.metadata.tracer, "cs137");

    let player = SnapshotPlayer::new(loaded).unwrap();
    // 对每个存档日 seek 应精确复现存档的粒子数组
    for stored in &archive.snapshots {
        let frame = player.seek(stored.day);
        assert_eq!(frame.len(), stored.particles.len(), "day {}", stored.day);
        for (a, b) in frame.iter().zip(stored.particles.iter()) {
            assert!((a.x - b.x).abs() < 1e-9);
            assert!((a.y - b.y).abs() < 1e-9);
            assert!((a.depth - b.depth).abs() < 1e-9);
            assert!((a.mass - b.mass).abs() < 1e-9);
            assert!((a.age - b.age).abs() < 1e-9);
            assert!(
                (a.concentration - b.concentration).abs()
                    <= 1e-9 * b.concentration.abs().max(1.0)
            );
            assert_eq!(a.history.len(), b.history.len());
        }
    }
}

#[test]
fn test_snapshot_history_capped_at_five() {
    let archive = baked_archive();
    for snapshot in &archive.snapshots {
        for particle in &snapshot.particles {
            assert!(particle.history.len() <= pt_bake::SNAPSHOT_HISTORY_LEN);
            for pair in particle.history.windows(2) {
                assert!(pair[0].day < pair[1].day);
            }
        }
    }
}

#[test]
fn test_interpolated_frame_between_snapshots() {
    let archive = baked_archive();
    let player = SnapshotPlayer::new(archive.clone()).unwrap();

    // 两份快照正中间：x 应落在两端之间
    let s0 = &archive.snapshots[1];
    let s1 = &archive.snapshots[2];
    let mid_day = (s0.day + s1.day) / 2.0;
    let frame = player.seek(mid_day);

    let n = s0.particles.len().min(s1.particles.len());
    assert_eq!(frame.len(), n);
    for k in 0..n {
        let (lo, hi) = if s0.particles[k].x <= s1.particles[k].x {
            (s0.particles[k].x, s1.particles[k].x)
        } else {
            (s1.particles[k].x, s0.particles[k].x)
        };
        assert!(frame[k].x >= lo - 1e-12 && frame[k].x <= hi + 1e-12);
        // 年龄严格线性
        let expected_age = (s0.particles[k].age + s1.particles[k].age) / 2.0;
        assert!((frame[k].age - expected_age).abs() < 1e-9);
    }
}

#[test]
fn test_merged_chunks_play_like_single_archive() {
    let archive = baked_archive();

    // 切成两块再并回
    let mut chunk_a = archive.clone();
    let mut chunk_b = archive.clone();
    let split = archive.snapshots.len() / 2;
    chunk_a.snapshots.truncate(split);
    chunk_b.snapshots.drain(..split);

    let (merged, report) = SnapshotArchive::merge(vec![chunk_a, chunk_b]).unwrap();
    assert_eq!(report.rejected, 0);
    assert_eq!(merged.snapshots.len(), archive.snapshots.len());

    let player = SnapshotPlayer::new(merged).unwrap();
    let direct = SnapshotPlayer::new(archive).unwrap();
    let day = 7.5;
    let a = player.seek(day);
    let b = direct.seek(day);
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b.iter()) {
        assert!((x.x - y.x).abs() < 1e-12);
    }
}
