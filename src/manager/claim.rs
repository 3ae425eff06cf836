//! Claiming and relinquishing lines, audio devices and displays.
//!
//! Every device can be addressed by its number or by `group device`
//! name; the two forms claim the same resource.

use crate::protocol::constants::{
    CMD_AUDIO_CLAIM, CMD_AUDIO_RELINQUISH_ALL, CMD_AUDIO_SET_ALIAS, CMD_CLAIM_GROUP,
    CMD_DISPLAY_CLAIM, CMD_DISPLAY_CREATE_DEVICE, CMD_DISPLAY_DELETE_DEVICE,
    CMD_DISPLAY_RELINQUISH_ALL, CMD_DISPLAY_SET_ALIAS, CMD_LINE_CLAIM, CMD_LINE_RELINQUISH_ALL,
    CMD_LINE_SET_ALIAS, FLAG_ALIAS, FLAG_DEBUG_TOUCHES, FLAG_DIRECTDRAW, FLAG_PREFIX,
    FLAG_RESIZE, FLAG_SUFFIX,
};
use crate::protocol::{CommandLine, DisplayCreationOptions, LineDirection, ResetState, on_val};

use super::core::{Manager, ReplyMode, rejected};

// ============================================================================
// Addressing
// ============================================================================

/// How a claim names its device.
#[derive(Debug, Clone, Copy)]
enum Address<'a> {
    Number(u32),
    Named { group: &'a str, device: &'a str },
}

impl Address<'_> {
    fn append(self, command: CommandLine) -> CommandLine {
        match self {
            Self::Number(n) => command.num(n),
            Self::Named { group, device } => command.arg(group).arg(device),
        }
    }

    fn is_valid(self) -> bool {
        match self {
            Self::Number(_) => true,
            Self::Named { group, device } => !group.is_empty() && !device.is_empty(),
        }
    }
}

fn non_empty(alias: Option<&str>) -> Option<&str> {
    alias.filter(|a| !a.is_empty())
}

// ============================================================================
// Manager - Groups and Lines
// ============================================================================

impl Manager {
    /// Claims a whole device group, optionally renaming its members.
    pub fn claim_group(&self, group: &str, prefix: Option<&str>, suffix: Option<&str>) -> bool {
        if group.is_empty() {
            return rejected("claim_group", "empty group");
        }
        self.imm_bool(
            CommandLine::new(CMD_CLAIM_GROUP)
                .arg(group)
                .flag_opt(FLAG_PREFIX, non_empty(prefix))
                .flag_opt(FLAG_SUFFIX, non_empty(suffix)),
            ReplyMode::Wait,
        )
    }

    /// Claims line `line_number`.
    ///
    /// `reset` applies to output lines only.
    pub fn claim_line(
        &self,
        line_number: u32,
        direction: LineDirection,
        alias: Option<&str>,
        reset: ResetState,
    ) -> bool {
        self.claim_line_at(Address::Number(line_number), direction, alias, reset)
    }

    /// Claims a line by group and device name.
    pub fn claim_line_by_name(
        &self,
        group: &str,
        device: &str,
        direction: LineDirection,
        alias: Option<&str>,
        reset: ResetState,
    ) -> bool {
        self.claim_line_at(Address::Named { group, device }, direction, alias, reset)
    }

    fn claim_line_at(
        &self,
        address: Address<'_>,
        direction: LineDirection,
        alias: Option<&str>,
        reset: ResetState,
    ) -> bool {
        if !address.is_valid() {
            return rejected("claim_line", "empty group or device");
        }
        let mut command = address.append(CommandLine::new(CMD_LINE_CLAIM)).raw(direction.flag());
        if direction == LineDirection::Output {
            command = command.raw(reset.flag());
        }
        self.imm_bool(command.flag_opt(FLAG_ALIAS, non_empty(alias)), ReplyMode::Wait)
    }

    pub fn relinquish_all_lines(&self, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_LINE_RELINQUISH_ALL), mode)
    }

    /// Adds `alias` to line `line_number`.
    pub fn line_set_alias(&self, line_number: u32, alias: &str, mode: ReplyMode) -> bool {
        self.set_alias(CMD_LINE_SET_ALIAS, Address::Number(line_number), alias, mode)
    }

    /// Adds `new_alias` to the line known as `existing_alias`.
    pub fn line_rename_alias(&self, existing_alias: &str, new_alias: &str, mode: ReplyMode) -> bool {
        self.rename_alias(CMD_LINE_SET_ALIAS, existing_alias, new_alias, mode)
    }

    fn set_alias(&self, command: &str, address: Address<'_>, alias: &str, mode: ReplyMode) -> bool {
        if alias.is_empty() {
            return rejected(command, "empty alias");
        }
        self.imm_bool(address.append(CommandLine::new(command)).arg(alias), mode)
    }

    fn rename_alias(&self, command: &str, existing: &str, new: &str, mode: ReplyMode) -> bool {
        if existing.is_empty() || new.is_empty() {
            return rejected(command, "empty alias");
        }
        self.imm_bool(CommandLine::new(command).arg(existing).arg(new), mode)
    }
}

// ============================================================================
// Manager - Audio Devices
// ============================================================================

impl Manager {
    pub fn claim_audio(&self, device_number: u32, alias: Option<&str>) -> bool {
        self.claim_simple(CMD_AUDIO_CLAIM, Address::Number(device_number), alias)
    }

    pub fn claim_audio_by_name(&self, group: &str, device: &str, alias: Option<&str>) -> bool {
        self.claim_simple(CMD_AUDIO_CLAIM, Address::Named { group, device }, alias)
    }

    pub fn audio_set_alias(&self, device_number: u32, alias: &str, mode: ReplyMode) -> bool {
        self.set_alias(CMD_AUDIO_SET_ALIAS, Address::Number(device_number), alias, mode)
    }

    pub fn audio_rename_alias(&self, existing_alias: &str, new_alias: &str, mode: ReplyMode) -> bool {
        self.rename_alias(CMD_AUDIO_SET_ALIAS, existing_alias, new_alias, mode)
    }

    pub fn relinquish_all_audio(&self, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_AUDIO_RELINQUISH_ALL), mode)
    }

    fn claim_simple(&self, command: &str, address: Address<'_>, alias: Option<&str>) -> bool {
        if !address.is_valid() {
            return rejected(command, "empty group or device");
        }
        self.imm_bool(
            address
                .append(CommandLine::new(command))
                .flag_opt(FLAG_ALIAS, non_empty(alias)),
            ReplyMode::Wait,
        )
    }
}

// ============================================================================
// Manager - Displays
// ============================================================================

impl Manager {
    pub fn claim_display(&self, display_number: u32, alias: Option<&str>) -> bool {
        self.claim_simple(CMD_DISPLAY_CLAIM, Address::Number(display_number), alias)
    }

    pub fn claim_display_by_name(&self, group: &str, device: &str, alias: Option<&str>) -> bool {
        self.claim_simple(CMD_DISPLAY_CLAIM, Address::Named { group, device }, alias)
    }

    pub fn display_set_alias(&self, display_number: u32, alias: &str, mode: ReplyMode) -> bool {
        self.set_alias(CMD_DISPLAY_SET_ALIAS, Address::Number(display_number), alias, mode)
    }

    pub fn display_rename_alias(
        &self,
        existing_alias: &str,
        new_alias: &str,
        mode: ReplyMode,
    ) -> bool {
        self.rename_alias(CMD_DISPLAY_SET_ALIAS, existing_alias, new_alias, mode)
    }

    pub fn relinquish_all_displays(&self, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_DISPLAY_RELINQUISH_ALL), mode)
    }

    /// Creates a new display window on the server and claims it as `name`.
    pub fn display_create_device(&self, name: &str, options: &DisplayCreationOptions) -> bool {
        if name.is_empty() {
            return rejected("display_create_device", "empty name");
        }
        let mut command = CommandLine::new(CMD_DISPLAY_CREATE_DEVICE)
            .arg(name)
            .raw(FLAG_RESIZE)
            .raw(on_val(options.resize))
            .raw(FLAG_DIRECTDRAW)
            .raw(on_val(options.directdraw));
        let rect = options.rectangle;
        if !rect.is_empty() {
            command = command
                .num(rect.left)
                .num(rect.top)
                .num(rect.width)
                .num(rect.height);
        }
        if options.debug_touches {
            command = command.raw(FLAG_DEBUG_TOUCHES);
        }
        self.imm_bool(command, ReplyMode::Wait)
    }

    pub fn display_delete_device(&self, device: &str, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_DISPLAY_DELETE_DEVICE).arg(device), mode)
    }
}
