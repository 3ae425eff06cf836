//! Displays, documents and display objects.

use crate::protocol::constants::{
    CMD_DISPLAY_ADD_OBJECT, CMD_DISPLAY_BLANK, CMD_DISPLAY_BRING_TO_FRONT,
    CMD_DISPLAY_CACHE_CHANGES, CMD_DISPLAY_CLEAR_BACKGROUND_EVENT, CMD_DISPLAY_CLEAR_EVENT,
    CMD_DISPLAY_CREATE_DOCUMENT, CMD_DISPLAY_DELETE_DOCUMENT, CMD_DISPLAY_DELETE_OBJECT,
    CMD_DISPLAY_EVENT_COORDS, CMD_DISPLAY_GET_DOCUMENT_SIZE, CMD_DISPLAY_GET_OBJECT_EXTENT,
    CMD_DISPLAY_GET_SIZE, CMD_DISPLAY_KEYBOARD_EVENTS, CMD_DISPLAY_SCALE_DOCUMENTS,
    CMD_DISPLAY_SEND_TO_BACK, CMD_DISPLAY_SET_AUDIO_DEVICE, CMD_DISPLAY_SET_BACKGROUND_COLOUR,
    CMD_DISPLAY_SET_BACKGROUND_EVENT, CMD_DISPLAY_SET_DOCUMENT_SIZE, CMD_DISPLAY_SET_EVENT,
    CMD_DISPLAY_SET_OBJ_EVENT_TRANSPARENCY, CMD_DISPLAY_SHOW_CHANGES, CMD_DISPLAY_SHOW_DOCUMENT,
};
use crate::protocol::{
    Colour, CommandLine, DisplayObject, DocEventType, KeyEventType, Rect, Reply, Size, on_val,
};

use super::core::{Manager, ReplyMode, rejected};

// ============================================================================
// Manager - Display Devices
// ============================================================================

impl Manager {
    /// Size of a display device in pixels.
    pub fn display_get_size(&self, device: &str) -> Option<Size> {
        self.query_size(CommandLine::new(CMD_DISPLAY_GET_SIZE).arg(device))
    }

    /// Whether documents are scaled to fit the display.
    pub fn display_scale_documents(&self, device: &str, scale: bool, mode: ReplyMode) -> bool {
        self.imm_bool(
            CommandLine::new(CMD_DISPLAY_SCALE_DOCUMENTS)
                .arg(device)
                .arg(on_val(scale)),
            mode,
        )
    }

    pub fn display_show_document(&self, device: &str, doc: &str, mode: ReplyMode) -> bool {
        self.imm_bool(
            CommandLine::new(CMD_DISPLAY_SHOW_DOCUMENT).arg(device).arg(doc),
            mode,
        )
    }

    pub fn display_blank(&self, device: &str, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_DISPLAY_BLANK).arg(device), mode)
    }

    /// Routes a display's video soundtracks to an audio device.
    pub fn display_set_audio_device(
        &self,
        display_device: &str,
        audio_device: &str,
        mode: ReplyMode,
    ) -> bool {
        self.imm_bool(
            CommandLine::new(CMD_DISPLAY_SET_AUDIO_DEVICE)
                .arg(display_device)
                .arg(audio_device),
            mode,
        )
    }

    /// Whether display events include the touch coordinates.
    pub fn display_event_coords(&self, on: bool, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_DISPLAY_EVENT_COORDS).arg(on_val(on)), mode)
    }
}

// ============================================================================
// Manager - Documents
// ============================================================================

impl Manager {
    pub fn display_create_document(&self, doc: &str, mode: ReplyMode) -> bool {
        if doc.is_empty() {
            return rejected("display_create_document", "empty document name");
        }
        self.imm_bool(CommandLine::new(CMD_DISPLAY_CREATE_DOCUMENT).arg(doc), mode)
    }

    pub fn display_delete_document(&self, doc: &str, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_DISPLAY_DELETE_DOCUMENT).arg(doc), mode)
    }

    pub fn display_set_document_size(&self, doc: &str, size: Size, mode: ReplyMode) -> bool {
        if size.width <= 0 || size.height <= 0 {
            return rejected("display_set_document_size", "non-positive size");
        }
        self.imm_bool(
            CommandLine::new(CMD_DISPLAY_SET_DOCUMENT_SIZE)
                .arg(doc)
                .num(size.width)
                .num(size.height),
            mode,
        )
    }

    pub fn display_get_document_size(&self, doc: &str) -> Option<Size> {
        self.query_size(CommandLine::new(CMD_DISPLAY_GET_DOCUMENT_SIZE).arg(doc))
    }

    pub fn display_set_background_colour(&self, doc: &str, colour: Colour, mode: ReplyMode) -> bool {
        self.imm_bool(
            CommandLine::new(CMD_DISPLAY_SET_BACKGROUND_COLOUR)
                .arg(doc)
                .raw(colour.to_string()),
            mode,
        )
    }

    /// Queue further changes to `doc` until [`Manager::display_show_changes`].
    pub fn display_cache_changes(&self, doc: &str, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_DISPLAY_CACHE_CHANGES).arg(doc), mode)
    }

    pub fn display_show_changes(&self, doc: &str, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_DISPLAY_SHOW_CHANGES).arg(doc), mode)
    }

    /// Which key transitions `doc` reports as key events.
    pub fn display_keyboard_events(&self, doc: &str, key_events: KeyEventType, mode: ReplyMode) -> bool {
        self.imm_bool(
            CommandLine::new(CMD_DISPLAY_KEYBOARD_EVENTS)
                .arg(doc)
                .arg(key_events.as_str()),
            mode,
        )
    }

    pub fn display_set_background_event(
        &self,
        doc: &str,
        event: &str,
        event_type: DocEventType,
        mode: ReplyMode,
    ) -> bool {
        if event.is_empty() {
            return rejected("display_set_background_event", "empty event name");
        }
        self.imm_bool(
            CommandLine::new(CMD_DISPLAY_SET_BACKGROUND_EVENT)
                .arg(doc)
                .arg(event_type.as_str())
                .quoted(event),
            mode,
        )
    }

    pub fn display_clear_background_event(
        &self,
        doc: &str,
        event_type: DocEventType,
        mode: ReplyMode,
    ) -> bool {
        self.imm_bool(
            CommandLine::new(CMD_DISPLAY_CLEAR_BACKGROUND_EVENT)
                .arg(doc)
                .arg(event_type.as_str()),
            mode,
        )
    }
}

// ============================================================================
// Manager - Objects
// ============================================================================

impl Manager {
    /// Adds `object` to `doc` under the name `obj`.
    pub fn display_add_object(
        &self,
        doc: &str,
        obj: &str,
        object: &DisplayObject,
        mode: ReplyMode,
    ) -> bool {
        if doc.is_empty() || obj.is_empty() {
            return rejected("display_add_object", "empty document or object name");
        }
        self.imm_bool(
            CommandLine::new(CMD_DISPLAY_ADD_OBJECT)
                .arg(doc)
                .arg(obj)
                .raw(object.option_string()),
            mode,
        )
    }

    pub fn display_delete_object(&self, doc: &str, obj: &str, mode: ReplyMode) -> bool {
        self.imm_bool(
            CommandLine::new(CMD_DISPLAY_DELETE_OBJECT).arg(doc).arg(obj),
            mode,
        )
    }

    /// Asks the server to raise `event` on a pointer/touch action on `obj`.
    pub fn display_set_event(
        &self,
        doc: &str,
        obj: &str,
        event: &str,
        event_type: DocEventType,
        mode: ReplyMode,
    ) -> bool {
        if event.is_empty() {
            return rejected("display_set_event", "empty event name");
        }
        self.imm_bool(
            CommandLine::new(CMD_DISPLAY_SET_EVENT)
                .arg(doc)
                .arg(obj)
                .arg(event_type.as_str())
                .quoted(event),
            mode,
        )
    }

    pub fn display_clear_event(
        &self,
        doc: &str,
        obj: &str,
        event_type: DocEventType,
        mode: ReplyMode,
    ) -> bool {
        self.imm_bool(
            CommandLine::new(CMD_DISPLAY_CLEAR_EVENT)
                .arg(doc)
                .arg(obj)
                .arg(event_type.as_str()),
            mode,
        )
    }

    /// Lets events on `obj` pass through to objects beneath it.
    pub fn display_set_object_event_transparency(
        &self,
        doc: &str,
        obj: &str,
        transparent: bool,
        mode: ReplyMode,
    ) -> bool {
        self.imm_bool(
            CommandLine::new(CMD_DISPLAY_SET_OBJ_EVENT_TRANSPARENCY)
                .arg(doc)
                .arg(obj)
                .arg(on_val(transparent)),
            mode,
        )
    }

    pub fn display_bring_to_front(&self, doc: &str, obj: &str, mode: ReplyMode) -> bool {
        self.imm_bool(
            CommandLine::new(CMD_DISPLAY_BRING_TO_FRONT).arg(doc).arg(obj),
            mode,
        )
    }

    pub fn display_send_to_back(&self, doc: &str, obj: &str, mode: ReplyMode) -> bool {
        self.imm_bool(
            CommandLine::new(CMD_DISPLAY_SEND_TO_BACK).arg(doc).arg(obj),
            mode,
        )
    }

    /// Bounding box of `obj` in document coordinates.
    pub fn display_get_object_extent(&self, doc: &str, obj: &str) -> Option<Rect> {
        let reply = self.imm_reply(
            CommandLine::new(CMD_DISPLAY_GET_OBJECT_EXTENT)
                .arg(doc)
                .arg(obj),
        );
        match reply.reply() {
            Some(Reply::Extent(rect)) => Some(*rect),
            _ => None,
        }
    }

    fn query_size(&self, command: CommandLine) -> Option<Size> {
        match self.imm_reply(command).reply() {
            Some(Reply::Size(size)) => Some(*size),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::core::tests::{connected, last_immediate};
    use super::*;

    use crate::protocol::{Brush, Pen, Point};

    #[test]
    fn test_display_get_size_round_trip() {
        let (manager, server) = connected(1000);
        server.reply_to("DISPLAY_GET_SIZE", "MSG_SIZE 1024 768");
        assert_eq!(manager.display_get_size("screen"), Some(Size::new(1024, 768)));
        assert_eq!(last_immediate(&server), "DISPLAY_GET_SIZE screen");
    }

    #[test]
    fn test_truncated_size_is_none() {
        let (manager, server) = connected(1000);
        server.reply_to("DISPLAY_GET_DOCUMENT_SIZE", "MSG_SIZE 40");
        assert_eq!(manager.display_get_document_size("doc"), None);
    }

    #[test]
    fn test_object_extent_from_edges() {
        let (manager, server) = connected(1000);
        server.reply_to("DISPLAY_GET_OBJECT_EXTENT", "MSG_EXTENT 10 110 20 70");
        assert_eq!(
            manager.display_get_object_extent("doc", "box"),
            Some(Rect::new(10, 20, 100, 50))
        );
    }

    #[test]
    fn test_send_to_back_uses_its_own_command() {
        let (manager, server) = connected(1000);
        assert!(manager.display_send_to_back("doc", "box", ReplyMode::Wait));
        assert_eq!(last_immediate(&server), "DISPLAY_SEND_TO_BACK doc box");
    }

    #[test]
    fn test_add_object_and_event() {
        let (manager, server) = connected(1000);
        let object = DisplayObject::Rectangle {
            rect: Rect::new(10, 10, 100, 100),
            pen: Pen::default(),
            brush: Brush::Solid(Colour::rgb(255, 0, 0)),
        };
        assert!(manager.display_add_object("doc", "target", &object, ReplyMode::Wait));
        assert_eq!(
            last_immediate(&server),
            format!("DISPLAY_ADD_OBJECT doc target {}", object.option_string())
        );

        assert!(manager.display_set_event(
            "doc",
            "target",
            "touched",
            DocEventType::TouchDown,
            ReplyMode::Wait
        ));
        assert_eq!(
            last_immediate(&server),
            r#"DISPLAY_SET_EVENT doc target TouchDown "touched""#
        );
    }

    #[test]
    fn test_background_colour() {
        let (manager, server) = connected(1000);
        assert!(manager.display_set_background_colour("doc", Colour::rgb(0, 0, 64), ReplyMode::Wait));
        assert_eq!(last_immediate(&server), "DISPLAY_SET_BACKGROUND_COLOUR doc 0 0 64");
    }

    #[test]
    fn test_text_object_is_quoted() {
        let object = DisplayObject::Text {
            pos: Point::new(5, 5),
            text: "Touch here".to_string(),
            height: 24,
            font: None,
            colour: Colour::WHITE,
        };
        assert!(object.option_string().contains(r#""Touch here""#));
    }
}
