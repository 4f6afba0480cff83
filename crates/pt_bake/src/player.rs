// crates/pt_bake/src/player.rs

//! 快照回放器
//!
//! 加载按日排序的快照序列，`seek(day)` 在相邻快照之间逐粒子插值：
//! 位置、深度、质量、年龄线性；浓度在两端都为正时取对数线性；
//! 历史取较近端点的。`tick` 按回放速率推进当前日，到最后一份
//! 快照处钳住并暂停，每次推进都向监听者发一帧。

use crate::archive::SnapshotArchive;
use crate::snapshot::{Snapshot, SnapshotParticle};
use parking_lot::RwLock;
use pt_foundation::{PlumeError, PlumeResult};

/// 回放事件
pub enum PlaybackEvent {
    /// 一帧插值后的系综
    Frame {
        /// 当前模拟日
        day: f64,
        /// 插值后的粒子
        particles: Vec<SnapshotParticle>,
    },
}

/// 帧监听回调
pub type FrameListener = Box<dyn Fn(&PlaybackEvent) + Send + Sync>;

fn default_playback_speed() -> f64 {
    2.0
}

/// 快照回放器
pub struct SnapshotPlayer {
    snapshots: Vec<Snapshot>,
    current_day: f64,
    /// 回放速率 [模拟日/墙钟秒]
    playback_speed: f64,
    playing: bool,
    listeners: RwLock<Vec<FrameListener>>,
}

impl std::fmt::Debug for SnapshotPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotPlayer")
            .field("snapshots", &self.snapshots)
            .field("current_day", &self.current_day)
            .field("playback_speed", &self.playback_speed)
            .field("playing", &self.playing)
            .field("listeners", &"<listeners>")
            .finish()
    }
}

impl SnapshotPlayer {
    /// 从档案创建；快照按日重排
    pub fn new(archive: SnapshotArchive) -> PlumeResult<Self> {
        let mut snapshots = archive.snapshots;
        if snapshots.is_empty() {
            return Err(PlumeError::invalid_configuration(
                "archive contains no snapshots",
            ));
        }
        snapshots.sort_by(|a, b| a.day.total_cmp(&b.day));
        let first_day = snapshots[0].day;

        Ok(Self {
            snapshots,
            current_day: first_day,
            playback_speed: default_playback_speed(),
            playing: false,
            listeners: RwLock::new(Vec::new()),
        })
    }

    /// 注册帧监听
    pub fn on_frame(&self, listener: FrameListener) {
        self.listeners.write().push(listener);
    }

    /// 当前回放日
    pub fn current_day(&self) -> f64 {
        self.current_day
    }

    /// 是否在播放
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// 调整回放速率
    pub fn set_playback_speed(&mut self, speed: f64) {
        self.playback_speed = speed.max(0.0);
    }

    /// 快照序列
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// 最后一份快照的日
    pub fn last_day(&self) -> f64 {
        self.snapshots.last().map(|s| s.day).unwrap_or(0.0)
    }

    /// 开始播放
    pub fn play(&mut self) {
        self.playing = true;
    }

    /// 暂停播放
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// 跳到指定日并插值
    pub fn seek(&self, day: f64) -> Vec<SnapshotParticle> {
        let first = &self.snapshots[0];
        if day <= first.day {
            return first.particles.clone();
        }
        let last = self
            .snapshots
            .last()
            .expect("player holds at least one snapshot");
        if day >= last.day {
            return last.particles.clone();
        }

        // 定位区间 [S_i, S_{i+1}]
        let mut lower = 0usize;
        for (idx, pair) in self.snapshots.windows(2).enumerate() {
            if pair[0].day <= day && day <= pair[1].day {
                lower = idx;
                break;
            }
        }
        let s0 = &self.snapshots[lower];
        let s1 = &self.snapshots[lower + 1];
        let span = s1.day - s0.day;
        let t = if span > 0.0 { (day - s0.day) / span } else { 0.0 };

        if t <= 0.0 {
            return s0.particles.clone();
        }
        if t >= 1.0 {
            return s1.particles.clone();
        }
        interpolate_ensemble(s0, s1, t)
    }

    /// 按墙钟推进回放；到末尾钳住并暂停
    ///
    /// 每次调用都发一帧，包括钳住的那帧。
    pub fn tick(&mut self, wall_dt_seconds: f64) {
        if !self.playing {
            return;
        }
        let last_day = self.last_day();
        self.current_day += wall_dt_seconds * self.playback_speed;
        if self.current_day >= last_day {
            self.current_day = last_day;
            self.playing = false;
            tracing::debug!(day = last_day, "playback clamped at final snapshot");
        }

        let frame = PlaybackEvent::Frame {
            day: self.current_day,
            particles: self.seek(self.current_day),
        };
        for listener in self.listeners.read().iter() {
            listener(&frame);
        }
    }
}

/// 逐粒子插值，按下标配对到两端长度的较小者
fn interpolate_ensemble(s0: &Snapshot, s1: &Snapshot, t: f64) -> Vec<SnapshotParticle> {
    let n = s0.particles.len().min(s1.particles.len());
    let mut out = Vec::with_capacity(n);
    for k in 0..n {
        out.push(interpolate_particle(&s0.particles[k], &s1.particles[k], t));
    }
    out
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn interpolate_particle(a: &SnapshotParticle, b: &SnapshotParticle, t: f64) -> SnapshotParticle {
    // 浓度：两端为正时对数线性，跨量级衰减下比线性合理
    let concentration = if a.concentration > 0.0 && b.concentration > 0.0 {
        (lerp(a.concentration.ln(), b.concentration.ln(), t)).exp()
    } else {
        lerp(a.concentration, b.concentration, t)
    };

    SnapshotParticle {
        x: lerp(a.x, b.x, t),
        y: lerp(a.y, b.y, t),
        depth: lerp(a.depth, b.depth, t),
        concentration,
        mass: lerp(a.mass, b.mass, t),
        age: lerp(a.age, b.age, t),
        history: if t < 0.5 {
            a.history.clone()
        } else {
            b.history.clone()
        },
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiveMetadata;
    use pt_engine::EngineStats;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn particle(x: f64, concentration: f64) -> SnapshotParticle {
        SnapshotParticle {
            x,
            y: -x,
            depth: x / 100.0,
            concentration,
            mass: 10.0 * x.max(0.1),
            age: x,
            history: vec![],
        }
    }

    fn archive_with(snapshots: Vec<Snapshot>) -> SnapshotArchive {
        let mut archive = SnapshotArchive::new(ArchiveMetadata {
            sim_start: 0.0,
            sim_end: 10.0,
            total_days: 10.0,
            tracer: "cs137".to_string(),
        });
        archive.snapshots = snapshots;
        archive
    }

    fn snapshot(day: f64, particles: Vec<SnapshotParticle>) -> Snapshot {
        Snapshot {
            day,
            particle_count: particles.len(),
            stats: EngineStats::default(),
            particles,
        }
    }

    #[test]
    fn test_empty_archive_rejected() {
        let err = SnapshotPlayer::new(archive_with(vec![])).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_seek_midpoint_linear_fields() {
        let player = SnapshotPlayer::new(archive_with(vec![
            snapshot(0.0, vec![particle(0.0, 100.0)]),
            snapshot(10.0, vec![particle(10.0, 100.0)]),
        ]))
        .unwrap();

        let frame = player.seek(5.0);
        assert_eq!(frame.len(), 1);
        assert!((frame[0].x - 5.0).abs() < 1e-12);
        assert!((frame[0].y + 5.0).abs() < 1e-12);
        assert!((frame[0].age - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_seek_log_linear_concentration() {
        let player = SnapshotPlayer::new(archive_with(vec![
            snapshot(0.0, vec![particle(1.0, 100.0)]),
            snapshot(10.0, vec![particle(1.0, 1.0)]),
        ]))
        .unwrap();

        let frame = player.seek(5.0);
        // 对数线性中点：√(100·1) = 10
        assert!((frame[0].concentration - 10.0).abs() < 1e-9);

        // 一端为零退化为线性
        let player = SnapshotPlayer::new(archive_with(vec![
            snapshot(0.0, vec![particle(1.0, 0.0)]),
            snapshot(10.0, vec![particle(1.0, 8.0)]),
        ]))
        .unwrap();
        let frame = player.seek(5.0);
        assert!((frame[0].concentration - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_seek_history_takes_nearer_endpoint() {
        let mut early = particle(0.0, 1.0);
        early.history = vec![crate::snapshot::HistoryPoint {
            x: -1.0,
            y: 0.0,
            day: 0.0,
        }];
        let mut late = particle(10.0, 1.0);
        late.history = vec![crate::snapshot::HistoryPoint {
            x: 9.0,
            y: 0.0,
            day: 10.0,
        }];

        let player = SnapshotPlayer::new(archive_with(vec![
            snapshot(0.0, vec![early]),
            snapshot(10.0, vec![late]),
        ]))
        .unwrap();

        assert_eq!(player.seek(2.0)[0].history[0].x, -1.0);
        assert_eq!(player.seek(8.0)[0].history[0].x, 9.0);
    }

    #[test]
    fn test_seek_exact_days_reproduce_snapshots() {
        let s0 = snapshot(0.0, vec![particle(0.0, 3.0), particle(1.0, 4.0)]);
        let s1 = snapshot(5.0, vec![particle(5.0, 2.0)]);
        let player = SnapshotPlayer::new(archive_with(vec![s0.clone(), s1.clone()])).unwrap();

        assert_eq!(player.seek(0.0), s0.particles);
        assert_eq!(player.seek(5.0), s1.particles);
        // 范围外钳到端点
        assert_eq!(player.seek(-3.0), s0.particles);
        assert_eq!(player.seek(99.0), s1.particles);
    }

    #[test]
    fn test_index_pairing_uses_min_length() {
        let player = SnapshotPlayer::new(archive_with(vec![
            snapshot(0.0, vec![particle(0.0, 1.0), particle(2.0, 1.0)]),
            snapshot(10.0, vec![particle(10.0, 1.0)]),
        ]))
        .unwrap();
        assert_eq!(player.seek(5.0).len(), 1);
    }

    #[test]
    fn test_tick_clamps_and_pauses() {
        let mut player = SnapshotPlayer::new(archive_with(vec![
            snapshot(0.0, vec![particle(0.0, 1.0)]),
            snapshot(10.0, vec![particle(10.0, 1.0)]),
        ]))
        .unwrap();
        player.set_playback_speed(2.0); // 2 日/秒

        let frames = Arc::new(AtomicUsize::new(0));
        let seen = frames.clone();
        player.on_frame(Box::new(move |event| {
            let PlaybackEvent::Frame { day, particles } = event;
            assert!(*day <= 10.0);
            assert!(!particles.is_empty());
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        player.play();
        player.tick(1.0); // → 第 2 日
        assert!((player.current_day() - 2.0).abs() < 1e-12);
        assert!(player.is_playing());

        player.tick(10.0); // 越过末尾 → 钳到 10，暂停
        assert!((player.current_day() - 10.0).abs() < 1e-12);
        assert!(!player.is_playing());

        // 暂停后 tick 不再发帧
        player.tick(1.0);
        assert_eq!(frames.load(Ordering::SeqCst), 2);
    }
}
