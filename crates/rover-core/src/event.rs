//! Event Bus - 显式发布/订阅抽象
//!
//! 取代隐式的监听器接口注册表：订阅者以闭包形式注册，返回一个
//! [`SubscriberId`] 句柄用于退订。投递顺序是**插入顺序**，且是确定性的，
//! 下游（宏序列推进、遥测记录）依赖这一点。
//!
//! # 使用示例
//!
//! ```rust
//! use rover_core::event::Bus;
//!
//! let bus: Bus<u32> = Bus::new();
//! let id = bus.subscribe(|v| println!("got {v}"));
//! bus.publish(&7);
//! bus.unsubscribe(id);
//! ```

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// 订阅句柄
///
/// 由 [`Bus::subscribe`] 返回，传给 [`Bus::unsubscribe`] 退订。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// 插入有序的发布/订阅总线
///
/// 投递在调用 `publish` 的线程上同步执行；回调列表在投递前快照，
/// 因此回调内部可以安全地订阅/退订同一条总线。
pub struct Bus<E> {
    subscribers: Mutex<Vec<(SubscriberId, Callback<E>)>>,
    next_id: AtomicU64,
}

impl<E> Bus<E> {
    pub fn new() -> Self {
        Bus {
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// 注册一个订阅者，返回退订句柄
    pub fn subscribe(&self, callback: impl Fn(&E) + Send + Sync + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.lock().push((id, Arc::new(callback)));
        id
    }

    /// 退订；句柄未注册（或已退订）时返回 `false`
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut subs = self.subscribers.lock();
        let before = subs.len();
        subs.retain(|(sid, _)| *sid != id);
        subs.len() != before
    }

    /// 按插入顺序同步投递一个事件
    pub fn publish(&self, event: &E) {
        // 快照后再调用，避免回调重入总线时死锁
        let snapshot: Vec<Callback<E>> =
            self.subscribers.lock().iter().map(|(_, cb)| Arc::clone(cb)).collect();
        for callback in snapshot {
            callback(event);
        }
    }

    /// 当前订阅者数量
    pub fn len(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 移除所有订阅者
    pub fn clear(&self) {
        self.subscribers.lock().clear();
    }
}

impl<E> Default for Bus<E> {
    fn default() -> Self {
        Self::new()
    }
}
