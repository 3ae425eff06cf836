//! Sound loading and playback.

use crate::protocol::constants::{
    CMD_AUDIO_GET_SOUND_LENGTH, CMD_AUDIO_LOAD_SOUND, CMD_AUDIO_LOAD_TONE, CMD_AUDIO_PLAY_FILE,
    CMD_AUDIO_PLAY_SOUND, CMD_AUDIO_SET_SOUND_VOLUME, CMD_AUDIO_SILENCE_ALL_DEVICES,
    CMD_AUDIO_SILENCE_DEVICE, CMD_AUDIO_STOP_SOUND, CMD_AUDIO_UNLOAD_ALL, CMD_AUDIO_UNLOAD_SOUND,
    FLAG_LOOP,
};
use crate::protocol::{CommandLine, Reply, ToneType};

use super::core::{Manager, ReplyMode, rejected};

/// Loudest volume the server accepts.
const MAX_VOLUME: u32 = 100;

// ============================================================================
// Manager - Audio
// ============================================================================

impl Manager {
    /// Plays a WAV file straight from disk.
    pub fn audio_play_wav(&self, device: &str, filename: &str, mode: ReplyMode) -> bool {
        if filename.is_empty() {
            return rejected("audio_play_wav", "empty filename");
        }
        self.imm_bool(
            CommandLine::new(CMD_AUDIO_PLAY_FILE).arg(device).quoted(filename),
            mode,
        )
    }

    /// Generates a tone and stores it as `sound`.
    pub fn audio_load_tone(
        &self,
        device: &str,
        sound: &str,
        frequency_hz: u32,
        tone: ToneType,
        duration_ms: u32,
        mode: ReplyMode,
    ) -> bool {
        if sound.is_empty() {
            return rejected("audio_load_tone", "empty sound name");
        }
        if frequency_hz == 0 {
            return rejected("audio_load_tone", "zero frequency");
        }
        self.imm_bool(
            CommandLine::new(CMD_AUDIO_LOAD_TONE)
                .arg(device)
                .arg(sound)
                .num(frequency_hz)
                .arg(tone.as_str())
                .num(duration_ms),
            mode,
        )
    }

    /// Loads a WAV file and stores it as `sound`.
    pub fn audio_load_wav(&self, device: &str, sound: &str, filename: &str, mode: ReplyMode) -> bool {
        if sound.is_empty() || filename.is_empty() {
            return rejected("audio_load_wav", "empty sound name or filename");
        }
        self.imm_bool(
            CommandLine::new(CMD_AUDIO_LOAD_SOUND)
                .arg(device)
                .arg(sound)
                .quoted(filename),
            mode,
        )
    }

    /// Plays a loaded sound, repeating it while `looped`.
    pub fn audio_play_sound(&self, device: &str, sound: &str, looped: bool, mode: ReplyMode) -> bool {
        let mut command = CommandLine::new(CMD_AUDIO_PLAY_SOUND).arg(device).arg(sound);
        if looped {
            command = command.raw(FLAG_LOOP);
        }
        self.imm_bool(command, mode)
    }

    /// Frees a loaded sound.
    pub fn audio_unload_sound(&self, device: &str, sound: &str, mode: ReplyMode) -> bool {
        self.imm_bool(
            CommandLine::new(CMD_AUDIO_UNLOAD_SOUND).arg(device).arg(sound),
            mode,
        )
    }

    /// Stops a playing sound; it stays loaded.
    pub fn audio_stop_sound(&self, device: &str, sound: &str, mode: ReplyMode) -> bool {
        self.imm_bool(
            CommandLine::new(CMD_AUDIO_STOP_SOUND).arg(device).arg(sound),
            mode,
        )
    }

    /// Stops everything playing on `device`.
    pub fn audio_silence_device(&self, device: &str, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_AUDIO_SILENCE_DEVICE).arg(device), mode)
    }

    /// Frees every sound loaded on `device`.
    pub fn audio_unload_all(&self, device: &str, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_AUDIO_UNLOAD_ALL).arg(device), mode)
    }

    /// Sets a loaded sound's volume, 0 to 100.
    pub fn audio_set_sound_volume(
        &self,
        device: &str,
        sound: &str,
        volume: u32,
        mode: ReplyMode,
    ) -> bool {
        if volume > MAX_VOLUME {
            return rejected("audio_set_sound_volume", "volume above 100");
        }
        self.imm_bool(
            CommandLine::new(CMD_AUDIO_SET_SOUND_VOLUME)
                .arg(device)
                .arg(sound)
                .num(volume),
            mode,
        )
    }

    /// Stops playback on every claimed audio device.
    pub fn audio_silence_all_devices(&self, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_AUDIO_SILENCE_ALL_DEVICES), mode)
    }

    /// Length of a loaded sound in ms.
    ///
    /// Accepts both a `MSG_DURATION` reply and a bare number.
    pub fn audio_sound_duration_ms(&self, device: &str, sound: &str) -> Option<u32> {
        let reply = self.imm_reply(
            CommandLine::new(CMD_AUDIO_GET_SOUND_LENGTH)
                .arg(device)
                .arg(sound),
        );
        match reply.reply()? {
            Reply::Duration(ms) => Some(*ms),
            Reply::Value(value) => value.trim().parse().ok(),
            _ => None,
        }
    }
}
