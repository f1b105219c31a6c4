//! danmu-gateway: packet classification and event dispatch for a live-streaming chat
//! connection.
//!
//! The transport layer (framing, decompression, heartbeats, reconnection) hands this
//! crate fully decoded [`Packet`]s. Notification packets are classified by their `cmd`
//! tag, decoded into typed events, and fanned out concurrently to host-registered
//! subscribers. Misbehaving subscribers are isolated: a panic or a callback that never
//! returns cannot stall ingestion or affect siblings.
//!
//! ## Core Types
//!
//! - [`DanmuGateway`] - Per-connection router and registration surface
//! - [`Packet`] / [`Operation`] - Decoded wire packets
//! - [`Danmaku`], [`SuperChat`], [`Gift`], [`GuardBuy`], [`LiveStart`], [`LiveStop`],
//!   [`UserToast`] - Typed events with total payload decoders
//! - [`DispatchConfig`] - Fan-out tuning (unbounded by default, optional concurrency
//!   cap)
//!
//! ## Example
//!
//! ```rust,ignore
//! let gateway = DanmuGateway::new();
//! gateway.on_danmaku(|msg| async move {
//!     println!("{}: {}", msg.username, msg.content);
//! });
//! // Replace built-in handling for one cmd entirely:
//! gateway.register_custom_handler("DANMU_MSG", |raw| async move {
//!     println!("raw body: {raw}");
//! });
//!
//! // Ingestion loop (transport collaborator):
//! while let Some(packet) = transport.next_packet().await {
//!     gateway.handle(&packet);
//! }
//! ```

pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod handler;
pub mod known;
pub mod message;
pub mod packet;
pub mod tag;

pub use dispatch::DispatchConfig;
pub use error::{DecodeError, Result};
pub use gateway::DanmuGateway;
pub use handler::{EventHandler, RawHandler};
pub use known::is_known_cmd;
pub use message::{Danmaku, Gift, GuardBuy, LiveStart, LiveStop, SuperChat, UserToast};
pub use packet::{Operation, Packet};
pub use tag::parse_cmd;
