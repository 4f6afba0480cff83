// crates/pt_fields/src/cache.rs

//! 有界日缓存
//!
//! 两个场服务共用的流式缓存：按日期键驻留已解析的日网格，
//! 超出 `max_days` 时按日期序淘汰最老的非活跃日并释放其大数组。
//! 活跃日（最近一次成功加载/命中的那天）被钉住，不参与淘汰。
//!
//! 同一未驻留日的并发加载通过按键单飞合并：后到者在键锁上等待，
//! 醒来后直接命中驻留表，不重复读文件。

use parking_lot::Mutex;
use pt_foundation::PlumeResult;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// 默认驻留天数上限
pub const DEFAULT_MAX_DAYS: usize = 2;

/// 按日期键驻留的有界缓存
pub struct DayCache<T> {
    max_days: usize,
    state: Mutex<CacheState<T>>,
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

struct CacheState<T> {
    /// 日期键 `YYYY-MM-DD` 的字典序即时间序
    resident: BTreeMap<String, Arc<T>>,
    active: Option<String>,
}

impl<T> DayCache<T> {
    /// 创建缓存；`max_days` 最小为 1
    pub fn new(max_days: usize) -> Self {
        Self {
            max_days: max_days.max(1),
            state: Mutex::new(CacheState {
                resident: BTreeMap::new(),
                active: None,
            }),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// 取回或加载一天的数据
    ///
    /// 成功后该日成为活跃日。加载失败不污染缓存，错误原样返回。
    pub fn load_or_get<F>(&self, key: &str, loader: F) -> PlumeResult<Arc<T>>
    where
        F: FnOnce() -> PlumeResult<T>,
    {
        // 快路径：已驻留
        {
            let mut state = self.state.lock();
            if let Some(found) = state.resident.get(key).cloned() {
                state.active = Some(key.to_string());
                return Ok(found);
            }
        }

        // 单飞：同键并发加载合并为一次
        let key_lock = {
            let mut map = self.in_flight.lock();
            map.entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let _guard = key_lock.lock();

        // 等待期间可能已被别人装好
        {
            let mut state = self.state.lock();
            if let Some(found) = state.resident.get(key).cloned() {
                state.active = Some(key.to_string());
                return Ok(found);
            }
        }

        let value = match loader() {
            Ok(v) => Arc::new(v),
            Err(e) => {
                self.in_flight.lock().remove(key);
                return Err(e);
            }
        };

        {
            let mut state = self.state.lock();
            state.resident.insert(key.to_string(), value.clone());
            state.active = Some(key.to_string());

            while state.resident.len() > self.max_days {
                let oldest_nonactive = state
                    .resident
                    .keys()
                    .find(|k| Some(k.as_str()) != state.active.as_deref())
                    .cloned();
                match oldest_nonactive {
                    Some(evict) => {
                        tracing::debug!(day = %evict, "evicting day from cache");
                        state.resident.remove(&evict);
                    }
                    None => break, // 只剩活跃日，钉住
                }
            }
        }

        // 驻留可见之后再撤单飞项，后到者必然命中快路径
        self.in_flight.lock().remove(key);
        Ok(value)
    }

    /// 指定日是否驻留
    pub fn is_resident(&self, key: &str) -> bool {
        self.state.lock().resident.contains_key(key)
    }

    /// 当前活跃日
    pub fn active_key(&self) -> Option<String> {
        self.state.lock().active.clone()
    }

    /// 驻留日列表（时间序）
    pub fn resident_keys(&self) -> Vec<String> {
        self.state.lock().resident.keys().cloned().collect()
    }

    /// 清空缓存
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.resident.clear();
        state.active = None;
    }
}

// ============================================================
// 测试
// ============================================================
