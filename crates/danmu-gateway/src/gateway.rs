//! Packet router and registration surface.

use parking_lot::RwLock;
use std::future::Future;
use std::sync::Arc;
use tracing::error;

use crate::dispatch::{DispatchConfig, FanOut};
use crate::handler::{HandlerTable, boxed, boxed_raw};
use crate::known::is_known_cmd;
use crate::message::{Danmaku, Gift, GuardBuy, LiveStart, LiveStop, SuperChat, UserToast};
use crate::packet::{Operation, Packet};
use crate::tag::parse_cmd;

/// Per-connection event gateway: owns the subscriber tables and routes decoded
/// packets to them.
///
/// One instance per connection. Nothing here is process-global, so independent
/// connections (and tests) never share handler state. Registration takes `&self` and
/// may happen while packets are being routed; the tables sit behind an `RwLock` and
/// handler references are cloned out before dispatch.
///
/// [`handle`](Self::handle) never fails: every failure mode, from unknown commands to
/// panicking subscribers, terminates in a log line so the ingestion loop is never
/// interrupted.
pub struct DanmuGateway {
    handlers: RwLock<HandlerTable>,
    fan_out: FanOut,
}

impl Default for DanmuGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl DanmuGateway {
    /// Create a gateway with unbounded fire-and-forget dispatch.
    pub fn new() -> Self {
        Self::with_config(DispatchConfig::default())
    }

    /// Create a gateway with explicit dispatch tuning.
    pub fn with_config(config: DispatchConfig) -> Self {
        Self {
            handlers: RwLock::new(HandlerTable::default()),
            fan_out: FanOut::new(&config),
        }
    }

    /// Subscribe to chat messages (`DANMU_MSG`).
    pub fn on_danmaku<F, Fut>(&self, f: F)
    where
        F: Fn(Arc<Danmaku>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.handlers.write().danmaku.push(boxed(f));
    }

    /// Subscribe to super chats (`SUPER_CHAT_MESSAGE`).
    pub fn on_super_chat<F, Fut>(&self, f: F)
    where
        F: Fn(Arc<SuperChat>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.handlers.write().super_chat.push(boxed(f));
    }

    /// Subscribe to gifts (`SEND_GIFT`).
    pub fn on_gift<F, Fut>(&self, f: F)
    where
        F: Fn(Arc<Gift>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.handlers.write().gift.push(boxed(f));
    }

    /// Subscribe to membership purchases (`GUARD_BUY`).
    pub fn on_guard_buy<F, Fut>(&self, f: F)
    where
        F: Fn(Arc<GuardBuy>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.handlers.write().guard_buy.push(boxed(f));
    }

    /// Subscribe to stream starts (`LIVE`).
    pub fn on_live_start<F, Fut>(&self, f: F)
    where
        F: Fn(Arc<LiveStart>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.handlers.write().live_start.push(boxed(f));
    }

    /// Subscribe to stream stops (`PREPARING`).
    pub fn on_live_stop<F, Fut>(&self, f: F)
    where
        F: Fn(Arc<LiveStop>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.handlers.write().live_stop.push(boxed(f));
    }

    /// Subscribe to membership toasts (`USER_TOAST_MSG`).
    pub fn on_user_toast<F, Fut>(&self, f: F)
    where
        F: Fn(Arc<UserToast>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.handlers.write().user_toast.push(boxed(f));
    }

    /// Install the override for an exact cmd. The handler receives the raw body text
    /// and fully replaces built-in handling for that cmd, including the typed
    /// subscriber lists. Re-registration replaces the previous override.
    pub fn register_custom_handler<F, Fut>(&self, cmd: impl Into<String>, f: F)
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.handlers.write().custom.insert(cmd.into(), boxed_raw(f));
    }

    /// Route one decoded packet.
    ///
    /// Synchronous classification and lookup; subscriber callbacks are spawned and
    /// never awaited, so this returns once dispatch has been initiated. Must be called
    /// from within a tokio runtime.
    pub fn handle(&self, packet: &Packet) {
        match packet.operation {
            Operation::Notification => self.handle_notification(packet),
            // Keepalive / handshake acknowledgements, not domain events.
            Operation::HeartbeatResponse | Operation::RoomEnterResponse => {}
            Operation::Unknown(_) => {
                error!(
                    "protover: {} data: {} unknown protover",
                    packet.protocol_version,
                    packet.body_text()
                );
            }
        }
    }

    fn handle_notification(&self, packet: &Packet) {
        let body = packet.body_text().into_owned();
        let cmd = parse_cmd(&body).to_owned();

        // An override wins over built-in typed handling for its cmd.
        let custom = self.handlers.read().custom.get(&cmd).cloned();
        if let Some(handler) = custom {
            self.fan_out.spawn(handler(body));
            return;
        }

        match cmd.as_str() {
            "DANMU_MSG" => {
                let handlers = self.handlers.read().danmaku.clone();
                self.fan_out
                    .dispatch_all(&handlers, Arc::new(Danmaku::decode(&body)));
            }
            "SUPER_CHAT_MESSAGE" => {
                let handlers = self.handlers.read().super_chat.clone();
                self.fan_out
                    .dispatch_all(&handlers, Arc::new(SuperChat::decode(&body)));
            }
            "SEND_GIFT" => {
                let handlers = self.handlers.read().gift.clone();
                self.fan_out
                    .dispatch_all(&handlers, Arc::new(Gift::decode(&body)));
            }
            "GUARD_BUY" => {
                let handlers = self.handlers.read().guard_buy.clone();
                self.fan_out
                    .dispatch_all(&handlers, Arc::new(GuardBuy::decode(&body)));
            }
            "LIVE" => {
                let handlers = self.handlers.read().live_start.clone();
                self.fan_out
                    .dispatch_all(&handlers, Arc::new(LiveStart::decode(&body)));
            }
            "PREPARING" => {
                let handlers = self.handlers.read().live_stop.clone();
                self.fan_out
                    .dispatch_all(&handlers, Arc::new(LiveStop::decode(&body)));
            }
            "USER_TOAST_MSG" => {
                let handlers = self.handlers.read().user_toast.clone();
                self.fan_out
                    .dispatch_all(&handlers, Arc::new(UserToast::decode(&body)));
            }
            _ => {
                if is_known_cmd(&cmd) {
                    return;
                }
                error!("unknown cmd({cmd}), body: {body}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;
    use tracing_subscriber::fmt::MakeWriter;

    /// Captures tracing output emitted on the test thread. Tests run on the
    /// current-thread runtime, so spawned subscriber tasks log here too.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture_logs() -> (tracing::subscriber::DefaultGuard, LogBuffer) {
        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .with_ansi(false)
            .finish();
        (tracing::subscriber::set_default(subscriber), buffer)
    }

    async fn wait_for(counter: &AtomicUsize, expected: usize) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while counter.load(Ordering::SeqCst) < expected {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("subscribers did not complete in time");
    }

    /// Give already-spawned tasks a chance to run on the current-thread runtime.
    async fn drain_tasks() {
        for _ in 0..32 {
            tokio::task::yield_now().await;
        }
    }

    fn danmu_packet(content: &str) -> Packet {
        let body = serde_json::json!({
            "cmd": "DANMU_MSG",
            "info": [
                [0, 1, 25, 16777215, 1700000000123_i64],
                content,
                [12345, "TestUser"]
            ]
        })
        .to_string();
        Packet::notification(body)
    }

    fn counting_subscriber(
        counter: &Arc<AtomicUsize>,
    ) -> impl Fn(Arc<Danmaku>) -> futures::future::BoxFuture<'static, ()> + Send + Sync + 'static
    {
        use futures::FutureExt;
        let counter = Arc::clone(counter);
        move |_msg| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_all_subscribers_invoked_with_decoded_event() {
        let gateway = DanmuGateway::new();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let counter = Arc::clone(&counter);
            gateway.on_danmaku(move |msg| {
                let counter = Arc::clone(&counter);
                async move {
                    assert_eq!(msg.content, "Hello");
                    assert_eq!(msg.uid, 12345);
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            });
        }

        gateway.handle(&danmu_packet("Hello"));
        wait_for(&counter, 3).await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_handle_returns_before_subscribers_complete() {
        let gateway = DanmuGateway::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        {
            let counter = Arc::clone(&counter);
            let gate = Arc::clone(&gate);
            gateway.on_danmaku(move |_msg| {
                let counter = Arc::clone(&counter);
                let gate = Arc::clone(&gate);
                async move {
                    gate.notified().await;
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            });
        }

        // handle() is synchronous; the subscriber is still parked on the gate when it
        // returns.
        gateway.handle(&danmu_packet("slow"));
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        gate.notify_one();
        wait_for(&counter, 1).await;
    }

    #[tokio::test]
    async fn test_override_replaces_builtin_handling() {
        let gateway = DanmuGateway::new();
        let typed = Arc::new(AtomicUsize::new(0));
        let raw = Arc::new(AtomicUsize::new(0));
        let seen_body = Arc::new(Mutex::new(String::new()));

        gateway.on_danmaku(counting_subscriber(&typed));
        {
            let raw = Arc::clone(&raw);
            let seen_body = Arc::clone(&seen_body);
            gateway.register_custom_handler("DANMU_MSG", move |body| {
                let raw = Arc::clone(&raw);
                let seen_body = Arc::clone(&seen_body);
                async move {
                    *seen_body.lock().unwrap() = body;
                    raw.fetch_add(1, Ordering::SeqCst);
                }
            });
        }

        let packet = danmu_packet("intercepted");
        gateway.handle(&packet);
        wait_for(&raw, 1).await;
        drain_tasks().await;

        assert_eq!(raw.load(Ordering::SeqCst), 1);
        assert_eq!(typed.load(Ordering::SeqCst), 0);
        assert_eq!(*seen_body.lock().unwrap(), packet.body_text());
    }

    #[tokio::test]
    async fn test_override_applies_to_normalized_cmd() {
        let gateway = DanmuGateway::new();
        let raw = Arc::new(AtomicUsize::new(0));

        {
            let raw = Arc::clone(&raw);
            gateway.register_custom_handler("DANMU_MSG", move |_body| {
                let raw = Arc::clone(&raw);
                async move {
                    raw.fetch_add(1, Ordering::SeqCst);
                }
            });
        }

        gateway.handle(&Packet::notification(
            r#"{"cmd":"DANMU_MSG:4:0:2:2:2:0","info":[]}"#,
        ));
        wait_for(&raw, 1).await;
    }

    #[tokio::test]
    async fn test_override_reregistration_replaces() {
        let gateway = DanmuGateway::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        for counter in [&first, &second] {
            let counter = Arc::clone(counter);
            gateway.register_custom_handler("WATCHED_CHANGE", move |_body| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            });
        }

        gateway.handle(&Packet::notification(
            r#"{"cmd":"WATCHED_CHANGE","data":{"num":7}}"#,
        ));
        wait_for(&second, 1).await;
        drain_tasks().await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_known_cmd_is_silently_ignored() {
        let (_guard, logs) = capture_logs();
        let gateway = DanmuGateway::new();
        let counter = Arc::new(AtomicUsize::new(0));
        gateway.on_danmaku(counting_subscriber(&counter));

        gateway.handle(&Packet::notification(
            r#"{"cmd":"ENTRY_EFFECT","data":{}}"#,
        ));
        drain_tasks().await;

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(logs.contents().is_empty(), "logs: {}", logs.contents());
    }

    #[tokio::test]
    async fn test_unknown_cmd_logged_once_with_body() {
        let (_guard, logs) = capture_logs();
        let gateway = DanmuGateway::new();

        let body = r#"{"cmd":"TOTALLY_NEW_EVENT","data":{}}"#;
        gateway.handle(&Packet::notification(body));
        drain_tasks().await;

        let contents = logs.contents();
        assert_eq!(contents.matches("unknown cmd(TOTALLY_NEW_EVENT)").count(), 1);
        assert!(contents.contains(body));
    }

    #[tokio::test]
    async fn test_missing_cmd_routes_to_unknown_branch() {
        let (_guard, logs) = capture_logs();
        let gateway = DanmuGateway::new();

        gateway.handle(&Packet::notification(r#"{"info":[]}"#));
        drain_tasks().await;

        assert_eq!(logs.contents().matches("unknown cmd()").count(), 1);
    }

    #[tokio::test]
    async fn test_panicking_subscriber_does_not_stop_siblings() {
        let (_guard, logs) = capture_logs();
        let gateway = DanmuGateway::new();
        let counter = Arc::new(AtomicUsize::new(0));

        gateway.on_danmaku(|_msg| async move {
            panic!("subscriber fault");
        });
        gateway.on_danmaku(counting_subscriber(&counter));
        gateway.on_danmaku(counting_subscriber(&counter));

        // Must not propagate out of handle().
        gateway.handle(&danmu_packet("boom"));
        wait_for(&counter, 2).await;
        drain_tasks().await;

        assert!(logs.contents().contains("event error: subscriber fault"));
    }

    #[tokio::test]
    async fn test_keepalive_operations_are_noops() {
        let (_guard, logs) = capture_logs();
        let gateway = DanmuGateway::new();
        let counter = Arc::new(AtomicUsize::new(0));
        gateway.on_danmaku(counting_subscriber(&counter));

        gateway.handle(&Packet::new(2, Operation::HeartbeatResponse, &b"\x00\x00\x00\x01"[..]));
        gateway.handle(&Packet::new(2, Operation::RoomEnterResponse, r#"{"code":0}"#));
        drain_tasks().await;

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(logs.contents().is_empty());
    }

    #[tokio::test]
    async fn test_unexpected_operation_logged() {
        let (_guard, logs) = capture_logs();
        let gateway = DanmuGateway::new();

        gateway.handle(&Packet::new(9, Operation::Unknown(42), "garbage"));
        drain_tasks().await;

        let contents = logs.contents();
        assert_eq!(contents.matches("unknown protover").count(), 1);
        assert!(contents.contains("protover: 9"));
        assert!(contents.contains("garbage"));
    }

    #[tokio::test]
    async fn test_typed_dispatch_for_each_event_kind() {
        let gateway = DanmuGateway::new();
        let counter = Arc::new(AtomicUsize::new(0));

        macro_rules! count_on {
            ($method:ident) => {{
                let counter = Arc::clone(&counter);
                gateway.$method(move |_ev| {
                    let counter = Arc::clone(&counter);
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }};
        }

        count_on!(on_super_chat);
        count_on!(on_gift);
        count_on!(on_guard_buy);
        count_on!(on_live_start);
        count_on!(on_live_stop);
        count_on!(on_user_toast);

        for body in [
            r#"{"cmd":"SUPER_CHAT_MESSAGE","data":{"uid":1,"message":"hi","user_info":{"uname":"u"}}}"#,
            r#"{"cmd":"SEND_GIFT","data":{"uid":1,"uname":"u","giftName":"Cap","num":1}}"#,
            r#"{"cmd":"GUARD_BUY","data":{"uid":1,"username":"u","guard_level":3}}"#,
            r#"{"cmd":"LIVE","roomid":1}"#,
            r#"{"cmd":"PREPARING","roomid":"1"}"#,
            r#"{"cmd":"USER_TOAST_MSG","data":{"uid":1,"username":"u","toast_msg":"t"}}"#,
        ] {
            gateway.handle(&Packet::notification(body));
        }

        wait_for(&counter, 6).await;
    }

    #[tokio::test]
    async fn test_bounded_gateway_delivers_everything() {
        let gateway = DanmuGateway::with_config(DispatchConfig {
            max_concurrent: Some(2),
        });
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..4 {
            gateway.on_danmaku(counting_subscriber(&counter));
        }

        gateway.handle(&danmu_packet("burst"));
        wait_for(&counter, 4).await;
    }
}
