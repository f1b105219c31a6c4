//! Subscriber tables for typed events and per-cmd overrides.

use futures::FutureExt;
use futures::future::BoxFuture;
use rustc_hash::FxHashMap;
use std::future::Future;
use std::sync::Arc;

use crate::message::{Danmaku, Gift, GuardBuy, LiveStart, LiveStop, SuperChat, UserToast};

/// Boxed async subscriber for a typed event.
pub type EventHandler<T> = Arc<dyn Fn(Arc<T>) -> BoxFuture<'static, ()> + Send + Sync>;

/// Raw-body handler used by per-cmd overrides; receives the notification body text.
pub type RawHandler = Arc<dyn Fn(String) -> BoxFuture<'static, ()> + Send + Sync>;

/// Per-kind subscriber lists plus the override table.
///
/// Lists are append-only with no de-duplication and no invocation-order guarantee.
/// The override table holds at most one handler per exact cmd; re-registration
/// replaces the previous one.
#[derive(Default)]
pub(crate) struct HandlerTable {
    pub(crate) danmaku: Vec<EventHandler<Danmaku>>,
    pub(crate) super_chat: Vec<EventHandler<SuperChat>>,
    pub(crate) gift: Vec<EventHandler<Gift>>,
    pub(crate) guard_buy: Vec<EventHandler<GuardBuy>>,
    pub(crate) live_start: Vec<EventHandler<LiveStart>>,
    pub(crate) live_stop: Vec<EventHandler<LiveStop>>,
    pub(crate) user_toast: Vec<EventHandler<UserToast>>,
    pub(crate) custom: FxHashMap<String, RawHandler>,
}

/// Box an async closure into an [`EventHandler`].
pub(crate) fn boxed<T, F, Fut>(f: F) -> EventHandler<T>
where
    T: Send + Sync + 'static,
    F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |event| f(event).boxed())
}

/// Box an async closure into a [`RawHandler`].
pub(crate) fn boxed_raw<F, Fut>(f: F) -> RawHandler
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |body| f(body).boxed())
}
