//! Typed domain events and their payload decoders.
//!
//! Each event type decodes itself from a raw notification body. Decoding is total:
//! `decode` never fails, logging malformed input at warn level and yielding a
//! default-valued event instead, so that routing is never interrupted by payload
//! drift. The fallible mapping is kept separate in `try_decode` where the exact field
//! layout is asserted.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{DecodeError, Result};

/// A regular chat message (`DANMU_MSG`).
///
/// The payload packs everything into the positional `info` array: `info[1]` is the
/// text, `info[2]` is `[uid, uname, ...]`, `info[0][3]` is the color and `info[0][4]`
/// the send timestamp in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Danmaku {
    pub uid: u64,
    pub username: String,
    pub content: String,
    /// Hex color (`#RRGGBB`) when the sender set one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Default for Danmaku {
    fn default() -> Self {
        Self {
            uid: 0,
            username: String::new(),
            content: String::new(),
            color: None,
            timestamp: Utc::now(),
        }
    }
}

impl Danmaku {
    /// Decode a `DANMU_MSG` body; total, see module docs.
    pub fn decode(body: &str) -> Self {
        total("DANMU_MSG", Self::try_decode(body))
    }

    fn try_decode(body: &str) -> Result<Self> {
        let json: Value = serde_json::from_str(body)?;
        let info = json
            .get("info")
            .and_then(Value::as_array)
            .ok_or(DecodeError::MissingField("info"))?;

        let content = info
            .get(1)
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingField("info[1]"))?
            .to_string();

        let user = info
            .get(2)
            .and_then(Value::as_array)
            .ok_or(DecodeError::MissingField("info[2]"))?;
        let uid = user.first().and_then(Value::as_u64).unwrap_or(0);
        let username = user
            .get(1)
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        let meta = info.first().and_then(Value::as_array);
        let color = meta
            .and_then(|m| m.get(3))
            .and_then(Value::as_u64)
            .map(|c| format!("#{:06X}", c as u32));
        let timestamp = meta
            .and_then(|m| m.get(4))
            .and_then(Value::as_i64)
            .and_then(to_timestamp)
            .unwrap_or_else(Utc::now);

        Ok(Self {
            uid,
            username,
            content,
            color,
            timestamp,
        })
    }
}

/// A paid highlighted message (`SUPER_CHAT_MESSAGE`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuperChat {
    pub uid: u64,
    pub username: String,
    pub content: String,
    /// Price in CNY.
    pub price: u64,
    /// Seconds the message stays pinned.
    pub keep_time: u64,
    pub timestamp: DateTime<Utc>,
}

impl Default for SuperChat {
    fn default() -> Self {
        Self {
            uid: 0,
            username: String::new(),
            content: String::new(),
            price: 0,
            keep_time: 0,
            timestamp: Utc::now(),
        }
    }
}

impl SuperChat {
    /// Decode a `SUPER_CHAT_MESSAGE` body; total, see module docs.
    pub fn decode(body: &str) -> Self {
        total("SUPER_CHAT_MESSAGE", Self::try_decode(body))
    }

    fn try_decode(body: &str) -> Result<Self> {
        let json: Value = serde_json::from_str(body)?;
        let data = json
            .get("data")
            .ok_or(DecodeError::MissingField("data"))?;

        let uid = data.get("uid").and_then(Value::as_u64).unwrap_or(0);
        let username = data
            .get("user_info")
            .and_then(|u| u.get("uname"))
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let content = data
            .get("message")
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingField("data.message"))?
            .to_string();
        let price = as_u64_lenient(data.get("price")).unwrap_or(0);
        let keep_time = as_u64_lenient(data.get("time")).unwrap_or(0);
        let timestamp = data
            .get("ts")
            .or_else(|| data.get("timestamp"))
            .and_then(Value::as_i64)
            .and_then(to_timestamp)
            .unwrap_or_else(Utc::now);

        Ok(Self {
            uid,
            username,
            content,
            price,
            keep_time,
            timestamp,
        })
    }
}

/// A gift (`SEND_GIFT`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gift {
    pub uid: u64,
    pub username: String,
    pub gift_name: String,
    pub num: u32,
    /// Unit price in coins; falls back to `total_coin` when absent.
    pub price: u64,
    pub timestamp: DateTime<Utc>,
}

impl Default for Gift {
    fn default() -> Self {
        Self {
            uid: 0,
            username: String::new(),
            gift_name: String::new(),
            num: 0,
            price: 0,
            timestamp: Utc::now(),
        }
    }
}

impl Gift {
    /// Decode a `SEND_GIFT` body; total, see module docs.
    pub fn decode(body: &str) -> Self {
        total("SEND_GIFT", Self::try_decode(body))
    }

    fn try_decode(body: &str) -> Result<Self> {
        let json: Value = serde_json::from_str(body)?;
        let data = json
            .get("data")
            .ok_or(DecodeError::MissingField("data"))?;

        let uid = data.get("uid").and_then(Value::as_u64).unwrap_or(0);
        let username = data
            .get("uname")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let gift_name = data
            .get("giftName")
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingField("data.giftName"))?
            .to_string();
        let num = data.get("num").and_then(Value::as_u64).unwrap_or(1) as u32;
        let price = as_u64_lenient(data.get("price"))
            .or_else(|| as_u64_lenient(data.get("total_coin")))
            .unwrap_or(0);
        let timestamp = data
            .get("timestamp")
            .and_then(Value::as_i64)
            .and_then(to_timestamp)
            .unwrap_or_else(Utc::now);

        Ok(Self {
            uid,
            username,
            gift_name,
            num,
            price,
            timestamp,
        })
    }
}

/// A membership ("guard") purchase (`GUARD_BUY`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardBuy {
    pub uid: u64,
    pub username: String,
    /// 1 = governor, 2 = admiral, 3 = captain.
    pub guard_level: u32,
    pub num: u32,
    pub price: u64,
    pub gift_name: String,
    pub timestamp: DateTime<Utc>,
}

impl Default for GuardBuy {
    fn default() -> Self {
        Self {
            uid: 0,
            username: String::new(),
            guard_level: 0,
            num: 0,
            price: 0,
            gift_name: String::new(),
            timestamp: Utc::now(),
        }
    }
}

impl GuardBuy {
    /// Decode a `GUARD_BUY` body; total, see module docs.
    pub fn decode(body: &str) -> Self {
        total("GUARD_BUY", Self::try_decode(body))
    }

    fn try_decode(body: &str) -> Result<Self> {
        let json: Value = serde_json::from_str(body)?;
        let data = json
            .get("data")
            .ok_or(DecodeError::MissingField("data"))?;

        let uid = data.get("uid").and_then(Value::as_u64).unwrap_or(0);
        let username = data
            .get("username")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let guard_level = data
            .get("guard_level")
            .and_then(Value::as_u64)
            .ok_or(DecodeError::MissingField("data.guard_level"))? as u32;
        let num = data.get("num").and_then(Value::as_u64).unwrap_or(1) as u32;
        let price = as_u64_lenient(data.get("price")).unwrap_or(0);
        let gift_name = data
            .get("gift_name")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let timestamp = data
            .get("start_time")
            .and_then(Value::as_i64)
            .and_then(to_timestamp)
            .unwrap_or_else(Utc::now);

        Ok(Self {
            uid,
            username,
            guard_level,
            num,
            price,
            gift_name,
            timestamp,
        })
    }
}

/// Stream start (`LIVE`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiveStart {
    pub room_id: u64,
}

impl LiveStart {
    /// Decode a `LIVE` body; total, see module docs.
    pub fn decode(body: &str) -> Self {
        total("LIVE", Self::try_decode(body))
    }

    fn try_decode(body: &str) -> Result<Self> {
        let json: Value = serde_json::from_str(body)?;
        let room_id = room_id_lenient(json.get("roomid"))
            .ok_or(DecodeError::MissingField("roomid"))?;
        Ok(Self { room_id })
    }
}

/// Stream stop (`PREPARING`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiveStop {
    pub room_id: u64,
}

impl LiveStop {
    /// Decode a `PREPARING` body; total, see module docs.
    pub fn decode(body: &str) -> Self {
        total("PREPARING", Self::try_decode(body))
    }

    fn try_decode(body: &str) -> Result<Self> {
        let json: Value = serde_json::from_str(body)?;
        // PREPARING sends roomid as a string, LIVE as a number; accept both.
        let room_id = room_id_lenient(json.get("roomid"))
            .ok_or(DecodeError::MissingField("roomid"))?;
        Ok(Self { room_id })
    }
}

/// Membership renewal toast (`USER_TOAST_MSG`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserToast {
    pub uid: u64,
    pub username: String,
    /// Rendered toast text, e.g. "xxx 开通了舰长".
    pub content: String,
    pub guard_level: u32,
    pub num: u32,
    pub price: u64,
    pub timestamp: DateTime<Utc>,
}

impl Default for UserToast {
    fn default() -> Self {
        Self {
            uid: 0,
            username: String::new(),
            content: String::new(),
            guard_level: 0,
            num: 0,
            price: 0,
            timestamp: Utc::now(),
        }
    }
}

impl UserToast {
    /// Decode a `USER_TOAST_MSG` body; total, see module docs.
    pub fn decode(body: &str) -> Self {
        total("USER_TOAST_MSG", Self::try_decode(body))
    }

    fn try_decode(body: &str) -> Result<Self> {
        let json: Value = serde_json::from_str(body)?;
        let data = json
            .get("data")
            .ok_or(DecodeError::MissingField("data"))?;

        let uid = data.get("uid").and_then(Value::as_u64).unwrap_or(0);
        let username = data
            .get("username")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let content = data
            .get("toast_msg")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let guard_level = data.get("guard_level").and_then(Value::as_u64).unwrap_or(0) as u32;
        let num = data.get("num").and_then(Value::as_u64).unwrap_or(1) as u32;
        let price = as_u64_lenient(data.get("price")).unwrap_or(0);
        let timestamp = data
            .get("start_time")
            .and_then(Value::as_i64)
            .and_then(to_timestamp)
            .unwrap_or_else(Utc::now);

        Ok(Self {
            uid,
            username,
            content,
            guard_level,
            num,
            price,
            timestamp,
        })
    }
}

/// Resolve the total-decoding contract: malformed payloads become default-valued
/// events, with the problem logged here rather than surfaced to the router.
fn total<T: Default>(cmd: &str, result: Result<T>) -> T {
    match result {
        Ok(event) => event,
        Err(err) => {
            warn!("failed to decode {cmd} payload: {err}");
            T::default()
        }
    }
}

/// Integer extraction tolerant of floats (some payloads send prices as floats).
fn as_u64_lenient(value: Option<&Value>) -> Option<u64> {
    let value = value?;
    value
        .as_u64()
        .or_else(|| value.as_f64().map(|f| f as u64))
}

/// Room IDs appear both as numbers and as decimal strings.
fn room_id_lenient(value: Option<&Value>) -> Option<u64> {
    let value = value?;
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

/// The wire sends timestamps both in seconds and in milliseconds.
fn to_timestamp(ts: i64) -> Option<DateTime<Utc>> {
    let millis = if ts > 1_000_000_000_000 { ts } else { ts * 1000 };
    Utc.timestamp_millis_opt(millis).single()
}
