//! Video objects on display documents.

use crate::protocol::constants::{
    CMD_VIDEO_GET_DURATION, CMD_VIDEO_GET_TIME, CMD_VIDEO_PAUSE, CMD_VIDEO_PLAY,
    CMD_VIDEO_SEEK_ABSOLUTE, CMD_VIDEO_SEEK_RELATIVE, CMD_VIDEO_SET_VOLUME, CMD_VIDEO_STOP,
    CMD_VIDEO_TIMESTAMPS,
};
use crate::protocol::{CommandLine, Reply, on_val};

use super::core::{Manager, ReplyMode, rejected};

/// Loudest volume the server accepts.
const MAX_VOLUME: u32 = 100;

// ============================================================================
// Manager - Video
// ============================================================================

impl Manager {
    pub fn video_play(&self, doc: &str, video: &str, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_VIDEO_PLAY).arg(doc).arg(video), mode)
    }

    pub fn video_pause(&self, doc: &str, video: &str, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_VIDEO_PAUSE).arg(doc).arg(video), mode)
    }

    pub fn video_stop(&self, doc: &str, video: &str, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_VIDEO_STOP).arg(doc).arg(video), mode)
    }

    /// Whether video events carry the playback position.
    pub fn video_timestamps(&self, on: bool, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_VIDEO_TIMESTAMPS).arg(on_val(on)), mode)
    }

    /// Current playback position in ms.
    pub fn video_time_ms(&self, doc: &str, video: &str) -> Option<u32> {
        let reply = self.imm_reply(CommandLine::new(CMD_VIDEO_GET_TIME).arg(doc).arg(video));
        match reply.reply() {
            Some(Reply::VideoTime(ms)) => Some(*ms),
            _ => None,
        }
    }

    /// Total length in ms.
    pub fn video_duration_ms(&self, doc: &str, video: &str) -> Option<u32> {
        let reply = self.imm_reply(
            CommandLine::new(CMD_VIDEO_GET_DURATION)
                .arg(doc)
                .arg(video),
        );
        match reply.reply() {
            Some(Reply::Duration(ms)) => Some(*ms),
            _ => None,
        }
    }

    /// Moves playback by `offset_ms`, which may be negative.
    pub fn video_seek_relative(&self, doc: &str, video: &str, offset_ms: i32, mode: ReplyMode) -> bool {
        self.imm_bool(
            CommandLine::new(CMD_VIDEO_SEEK_RELATIVE)
                .arg(doc)
                .arg(video)
                .num(offset_ms),
            mode,
        )
    }

    pub fn video_seek_absolute(&self, doc: &str, video: &str, time_ms: u32, mode: ReplyMode) -> bool {
        self.imm_bool(
            CommandLine::new(CMD_VIDEO_SEEK_ABSOLUTE)
                .arg(doc)
                .arg(video)
                .num(time_ms),
            mode,
        )
    }

    /// Sets playback volume, 0 to 100.
    pub fn video_set_volume(&self, doc: &str, video: &str, volume: u32, mode: ReplyMode) -> bool {
        if volume > MAX_VOLUME {
            return rejected("video_set_volume", "volume above 100");
        }
        self.imm_bool(
            CommandLine::new(CMD_VIDEO_SET_VOLUME)
                .arg(doc)
                .arg(video)
                .num(volume),
            mode,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::super::core::tests::{connected, last_immediate};
    use super::*;

    #[test]
    fn test_video_time_requires_structured_reply() {
        let (manager, server) = connected(1000);
        server.reply_to("VIDEO_GET_TIME", "MSG_VIDEO_TIME 4200");
        assert_eq!(manager.video_time_ms("doc", "clip"), Some(4200));

        server.reply_to("VIDEO_GET_TIME", "4200");
        assert_eq!(manager.video_time_ms("doc", "clip"), None);
    }

    #[test]
    fn test_video_duration() {
        let (manager, server) = connected(1000);
        server.reply_to("VIDEO_GET_DURATION", "MSG_DURATION 60000");
        assert_eq!(manager.video_duration_ms("doc", "clip"), Some(60_000));
    }

    #[test]
    fn test_seek_relative_allows_negative_offsets() {
        let (manager, server) = connected(1000);
        assert!(manager.video_seek_relative("doc", "clip", -1500, ReplyMode::Wait));
        assert_eq!(last_immediate(&server), "VIDEO_SEEK_RELATIVE doc clip -1500");
    }
}
