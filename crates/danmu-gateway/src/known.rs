//! Commands the protocol emits that have no typed event.
//!
//! Membership in this set suppresses the unknown-cmd diagnostic; nothing is decoded or
//! dispatched for these. The list is pure data collected from observed room traffic
//! and grows as the upstream protocol drifts.

use rustc_hash::FxHashSet;
use std::sync::LazyLock;

static KNOWN_CMDS: LazyLock<FxHashSet<&'static str>> =
    LazyLock::new(|| KNOWN_CMD_LIST.iter().copied().collect());

/// O(1) membership test against the known-command set.
pub fn is_known_cmd(cmd: &str) -> bool {
    KNOWN_CMDS.contains(cmd)
}

const KNOWN_CMD_LIST: &[&str] = &[
    "INTERACT_WORD",
    "HOT_RANK_SETTLEMENT",
    "DANMU_GIFT_LOTTERY_START",
    "WELCOME_GUARD",
    "PK_PROCESS",
    "PK_BATTLE_PRO_TYPE",
    "MATCH_TEAM_GIFT_RANK",
    "PK_BATTLE_CRIT",
    "LUCK_GIFT_AWARD_USER",
    "SCORE_CARD",
    "ONLINE_RANK_V2",
    "PK_BATTLE_SPECIAL_GIFT",
    "SEND_TOP",
    "SUPER_CHAT_MESSAGE_JPN",
    "ANIMATION",
    "GUARD_LOTTERY_START",
    "WEEK_STAR_CLOCK",
    "WELCOME",
    "WIN_ACTIVITY",
    "ROOM_KICKOUT",
    "CHANGE_ROOM_INFO",
    "ROOM_SKIN_MSG",
    "ROOM_BLOCK_MSG",
    "SUPER_CHAT_ENTRANCE",
    "PK_BATTLE_RANK_CHANGE",
    "ROOM_LOCK",
    "TV_END",
    "PK_PRE",
    "ROOM_SILENT_OFF",
    "SEND_GIFT",
    "DANMU_MSG",
    "ANCHOR_LOT_START",
    "ROOM_BOX_USER",
    "ONLINE_RANK_TOP3",
    "WIDGET_BANNER",
    "PK_BATTLE_START",
    "ACTIVITY_MATCH_GIFT",
    "PK_AGAIN",
    "PK_MATCH",
    "RAFFLE_START",
    "LIVE",
    "WISH_BOTTLE",
    "GUARD_ACHIEVEMENT_ROOM",
    "ONLINE_RANK_COUNT",
    "COMMON_NOTICE_DANMAKU",
    "LOL_ACTIVITY",
    "HOT_RANK_CHANGED",
    "ROOM_BLOCK_INTO",
    "ROOM_LIMIT",
    "PANEL",
    "RAFFLE_END",
    "ENTRY_EFFECT",
    "STOP_LIVE_ROOM_LIST",
    "TV_START",
    "WATCH_LPL_EXPIRED",
    "PK_BATTLE_PRE",
    "USER_TOAST_MSG",
    "BOX_ACTIVITY_START",
    "PK_MIC_END",
    "LIVE_INTERACTIVE_GAME",
    "ROOM_BANNER",
    "PK_BATTLE_GIFT",
    "MESSAGEBOX_USER_GAIN_MEDAL",
    "LITTLE_TIPS",
    "HOUR_RANK_AWARDS",
    "NOTICE_MSG",
    "ROOM_REAL_TIME_MESSAGE_UPDATE",
    "ANCHOR_LOT_END",
    "PREPARING",
    "GUARD_BUY",
    "ROOM_CHANGE",
    "room_admin_entrance",
    "CHASE_FRAME_SWITCH",
    "DANMU_GIFT_LOTTERY_AWARD",
    "PK_BATTLE_VOTES_ADD",
    "PK_BATTLE_END",
    "CUT_OFF",
    "PK_BATTLE_PROCESS",
    "PK_BATTLE_SETTLE_USER",
    "ANCHOR_LOT_AWARD",
    "WIN_ACTIVITY_USER",
    "VOICE_JOIN_STATUS",
    "DANMU_GIFT_LOTTERY_END",
    "ROOM_RANK",
    "SUPER_CHAT_MESSAGE",
    "ACTIVITY_BANNER_UPDATE_V2",
    "SPECIAL_GIFT",
    "ROOM_SILENT_ON",
    "WARNING",
    "ROOM_ADMINS",
    "COMBO_SEND",
    "HOT_RANK_SETTLEMENT_V2",
    "ANCHOR_LOT_CHECKSTATUS",
    "HOT_RANK_CHANGED_V2",
    "SUPER_CHAT_MESSAGE_DELETE",
    "PK_END",
    "PK_SETTLE",
    "ROOM_REFRESH",
    "PK_START",
    "COMBO_END",
    "PK_LOTTERY_START",
    "GUARD_WINDOWS_OPEN",
    "REENTER_LIVE_ROOM",
    "MESSAGEBOX_USER_MEDAL_CHANGE",
    "MESSAGEBOX_USER_MEDAL_COMPENSATION",
    "LITTLE_MESSAGE_BOX",
    "PK_BATTLE_PRE_NEW",
    "PK_BATTLE_START_NEW",
    "PK_BATTLE_PROCESS_NEW",
    "PK_BATTLE_FINAL_PROCESS",
    "PK_BATTLE_SETTLE_V2",
    "PK_BATTLE_SETTLE_NEW",
    "PK_BATTLE_PUNISH_END",
    "PK_BATTLE_VIDEO_PUNISH_BEGIN",
    "PK_BATTLE_VIDEO_PUNISH_END",
    "ENTRY_EFFECT_MUST_RECEIVE",
    "SUPER_CHAT_AUDIT",
    "VIDEO_CONNECTION_JOIN_START",
    "VIDEO_CONNECTION_JOIN_END",
    "VIDEO_CONNECTION_MSG",
    "VTR_GIFT_LOTTERY",
    "RED_POCKET_START",
    "FULL_SCREEN_SPECIAL_EFFECT",
    "POPULARITY_RED_POCKET_START",
    "POPULARITY_RED_POCKET_WINNER_LIST",
    "USER_PANEL_RED_ALARM",
    "SHOPPING_CART_SHOW",
    "THERMAL_STORM_DANMU_BEGIN",
    "THERMAL_STORM_DANMU_UPDATE",
    "THERMAL_STORM_DANMU_CANCEL",
    "THERMAL_STORM_DANMU_OVER",
    "MILESTONE_UPDATE_EVENT",
    "WEB_REPORT_CONTROL",
    "DANMU_TAG_CHANGE",
    "RANK_REM",
    "LIVE_PLAYER_LOG_RECYCLE",
    "LIVE_INTERNAL_ROOM_LOGIN",
    "LIVE_OPEN_PLATFORM_GAME",
    "WATCHED_CHANGE",
    "DANMU_AGGREGATION",
    "POPULARITY_RED_POCKET_NEW",
    "LIKE_INFO_V3_CLICK",
    "POPULAR_RANK_CHANGED",
    "DM_INTERACTION",
    "LIKE_INFO_V3_UPDATE",
    "HOT_ROOM_NOTIFY",
    "PLAY_TAG",
];
