// crates/pt_bake/src/lib.rs

//! PROTEUS 烘焙与回放层
//!
//! - [`snapshot`]: 系综快照记录（引擎与渲染端之间的消息类型）
//! - [`archive`]: JSON 快照档案与分块合并
//! - [`recorder`]: 固定 0.1 天子步的无头烘焙
//! - [`player`]: 按日插值的回放

pub mod archive;
pub mod player;
pub mod recorder;
pub mod snapshot;

pub use archive::{ArchiveMetadata, MergeReport, SnapshotArchive, ARCHIVE_VERSION};
pub use player::{FrameListener, PlaybackEvent, SnapshotPlayer};
pub use recorder::{BakeConfig, BakeHandle, BakeOutcome, BakeRecorder, BAKE_STEP_DAYS};
pub use snapshot::{HistoryPoint, Snapshot, SnapshotParticle, SNAPSHOT_HISTORY_LEN};
