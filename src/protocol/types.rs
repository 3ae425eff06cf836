//! Typed command options and geometry.
//!
//! These types render to the exact tokens the server expects, so the
//! command methods never build option text by hand.
//!
//! # Example
//!
//! ```
//! use whisker_client::protocol::{Brush, Colour, DisplayObject, Pen, Rect};
//!
//! let square = DisplayObject::Rectangle {
//!     rect: Rect::new(10, 10, 100, 100),
//!     pen: Pen::new(Colour::WHITE, 2),
//!     brush: Brush::Solid(Colour::rgb(255, 0, 0)),
//! };
//! assert_eq!(
//!     square.option_string(),
//!     "rectangle 10 10 110 110 -pencolour 255 255 255 -penwidth 2 -penstyle solid -brushsolid 255 0 0"
//! );
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use super::command::quote;
use super::constants::{
    FLAG_CLIENTCLIENT, FLAG_COMMS, FLAG_EVENTS, FLAG_INPUT, FLAG_KEYEVENTS, FLAG_OUTPUT,
    FLAG_RESET_LEAVE, FLAG_RESET_OFF, FLAG_RESET_ON, FLAG_SIGNATURE, VAL_BOTH, VAL_DOWN,
    VAL_NONE, VAL_OFF, VAL_ON, VAL_UP,
};

// ============================================================================
// Helpers
// ============================================================================

/// Renders a boolean as the protocol's `on`/`off` token.
#[inline]
#[must_use]
pub const fn on_val(on: bool) -> &'static str {
    if on { VAL_ON } else { VAL_OFF }
}

// ============================================================================
// Line Options
// ============================================================================

/// Direction of a claimed digital line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDirection {
    /// Input line (e.g. a lever).
    Input,
    /// Output line (e.g. a pellet dispenser).
    Output,
}

impl LineDirection {
    /// Wire flag.
    #[inline]
    #[must_use]
    pub const fn flag(self) -> &'static str {
        match self {
            Self::Input => FLAG_INPUT,
            Self::Output => FLAG_OUTPUT,
        }
    }
}

/// What an output line does when the client disconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetState {
    /// Switch off.
    #[default]
    Off,
    /// Switch on.
    On,
    /// Leave as it is.
    Leave,
}

impl ResetState {
    /// Wire flag.
    #[inline]
    #[must_use]
    pub const fn flag(self) -> &'static str {
        match self {
            Self::Off => FLAG_RESET_OFF,
            Self::On => FLAG_RESET_ON,
            Self::Leave => FLAG_RESET_LEAVE,
        }
    }
}

/// Which line transitions raise an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEventType {
    /// Off → on.
    On,
    /// On → off.
    Off,
    /// Either transition.
    Both,
}

impl LineEventType {
    /// Wire token.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::On => VAL_ON,
            Self::Off => VAL_OFF,
            Self::Both => VAL_BOTH,
        }
    }
}

/// State a line is forced to when its safety timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyState {
    /// Force off.
    Off,
    /// Force on.
    On,
}

impl SafetyState {
    /// Wire token.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => VAL_OFF,
            Self::On => VAL_ON,
        }
    }
}

// ============================================================================
// Audio Options
// ============================================================================

/// Waveform of a generated tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToneType {
    /// Sine wave.
    #[default]
    Sine,
    /// Square wave.
    Square,
    /// Sawtooth wave.
    Sawtooth,
    /// Triangle wave.
    Triangle,
}

impl ToneType {
    /// Wire token.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sine => "SINE",
            Self::Square => "SQUARE",
            Self::Sawtooth => "SAWTOOTH",
            Self::Triangle => "TRIANGLE",
        }
    }
}

// ============================================================================
// Display Event Options
// ============================================================================

/// Pointer/touch interaction that raises a display object event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocEventType {
    MouseDown,
    MouseUp,
    MouseDoubleClick,
    MouseMove,
    TouchDown,
    TouchUp,
    TouchMove,
}

impl DocEventType {
    /// Wire token.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MouseDown => "MouseDown",
            Self::MouseUp => "MouseUp",
            Self::MouseDoubleClick => "MouseDblClick",
            Self::MouseMove => "MouseMove",
            Self::TouchDown => "TouchDown",
            Self::TouchUp => "TouchUp",
            Self::TouchMove => "TouchMove",
        }
    }
}

/// Which key transitions a document reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventType {
    None,
    Down,
    Up,
    Both,
}

impl KeyEventType {
    /// Wire token.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => VAL_NONE,
            Self::Down => VAL_DOWN,
            Self::Up => VAL_UP,
            Self::Both => VAL_BOTH,
        }
    }
}

// ============================================================================
// LogOptions
// ============================================================================

/// What the server writes to its log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOptions {
    /// Log events.
    pub events: bool,
    /// Log key events.
    pub key_events: bool,
    /// Log client-to-client messages.
    pub client_client: bool,
    /// Log all communications.
    pub comms: bool,
    /// Sign the log.
    pub signature: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            events: true,
            key_events: true,
            client_client: true,
            comms: false,
            signature: true,
        }
    }
}

impl LogOptions {
    /// Renders the options as `-flag on|off` pairs.
    #[must_use]
    pub fn to_args(&self) -> Vec<&'static str> {
        vec![
            FLAG_EVENTS,
            on_val(self.events),
            FLAG_KEYEVENTS,
            on_val(self.key_events),
            FLAG_CLIENTCLIENT,
            on_val(self.client_client),
            FLAG_COMMS,
            on_val(self.comms),
            FLAG_SIGNATURE,
            on_val(self.signature),
        ]
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    #[inline]
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle.
///
/// The server's origin is the top left, with y increasing downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    #[inline]
    #[must_use]
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Creates a rectangle from its four edges (the `MSG_EXTENT` order).
    #[inline]
    #[must_use]
    pub const fn from_edges(left: i32, right: i32, top: i32, bottom: i32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    #[inline]
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.left + self.width
    }

    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.top + self.height
    }

    /// Returns `true` if the rectangle has no area.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// A point in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

// ============================================================================
// DisplayCreationOptions
// ============================================================================

/// Options for creating a display device window on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayCreationOptions {
    /// Allow the window to be resized.
    pub resize: bool,
    /// Use DirectDraw.
    pub directdraw: bool,
    /// Initial window placement; omitted when empty.
    pub rectangle: Rect,
    /// Draw touch points for debugging.
    pub debug_touches: bool,
}

impl Default for DisplayCreationOptions {
    fn default() -> Self {
        Self {
            resize: true,
            directdraw: true,
            rectangle: Rect::default(),
            debug_touches: false,
        }
    }
}

// ============================================================================
// Colour, Pen, Brush
// ============================================================================

/// 24-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    #[inline]
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.r, self.g, self.b)
    }
}

/// Line style of a pen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PenStyle {
    #[default]
    Solid,
    Dash,
    Dot,
    DashDot,
    DashDotDot,
    Null,
    InsideFrame,
}

impl PenStyle {
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Dash => "dash",
            Self::Dot => "dot",
            Self::DashDot => "dashdot",
            Self::DashDotDot => "dashdotdot",
            Self::Null => "null",
            Self::InsideFrame => "insideframe",
        }
    }
}

/// Outline pen for shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pen {
    pub colour: Colour,
    pub width: u32,
    pub style: PenStyle,
}

impl Default for Pen {
    fn default() -> Self {
        Self::new(Colour::WHITE, 1)
    }
}

impl Pen {
    #[inline]
    #[must_use]
    pub const fn new(colour: Colour, width: u32) -> Self {
        Self {
            colour,
            width,
            style: PenStyle::Solid,
        }
    }

    fn options(&self) -> String {
        format!(
            "-pencolour {} -penwidth {} -penstyle {}",
            self.colour,
            self.width,
            self.style.as_str()
        )
    }
}

/// Fill brush for shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Brush {
    /// No fill.
    #[default]
    Hollow,
    /// Solid fill.
    Solid(Colour),
}

impl Brush {
    fn options(&self) -> String {
        match self {
            Self::Hollow => "-brushhollow".to_string(),
            Self::Solid(colour) => format!("-brushsolid {colour}"),
        }
    }
}

// ============================================================================
// DisplayObject
// ============================================================================

/// An object that can be added to a display document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayObject {
    /// Text at a position.
    Text {
        pos: Point,
        text: String,
        height: u32,
        font: Option<String>,
        colour: Colour,
    },
    /// Bitmap loaded from a file; stretched to `size` if given.
    Bitmap {
        pos: Point,
        filename: String,
        size: Option<Size>,
    },
    /// Straight line.
    Line { start: Point, end: Point, pen: Pen },
    /// Rectangle.
    Rectangle { rect: Rect, pen: Pen, brush: Brush },
    /// Ellipse inscribed in `rect`.
    Ellipse { rect: Rect, pen: Pen, brush: Brush },
    /// Closed polygon.
    Polygon {
        points: Vec<Point>,
        pen: Pen,
        brush: Brush,
    },
    /// Video loaded from a file.
    Video {
        pos: Point,
        filename: String,
        looped: bool,
        play_audio: bool,
    },
}

impl DisplayObject {
    /// Renders the object definition as the server's option text.
    #[must_use]
    pub fn option_string(&self) -> String {
        match self {
            Self::Text {
                pos,
                text,
                height,
                font,
                colour,
            } => {
                let mut s = format!(
                    "text {} {} {} -height {} -textcolour {}",
                    pos.x,
                    pos.y,
                    quote(text),
                    height,
                    colour
                );
                if let Some(font) = font {
                    s.push_str(&format!(" -font {}", quote(font)));
                }
                s
            }
            Self::Bitmap {
                pos,
                filename,
                size,
            } => {
                let mut s = format!("bitmap {} {} {}", pos.x, pos.y, quote(filename));
                if let Some(size) = size {
                    s.push_str(&format!(
                        " -stretch -width {} -height {}",
                        size.width, size.height
                    ));
                }
                s
            }
            Self::Line { start, end, pen } => format!(
                "line {} {} {} {} {}",
                start.x,
                start.y,
                end.x,
                end.y,
                pen.options()
            ),
            Self::Rectangle { rect, pen, brush } => {
                format!("rectangle {} {}", edges(rect), shape_options(pen, brush))
            }
            Self::Ellipse { rect, pen, brush } => {
                format!("ellipse {} {}", edges(rect), shape_options(pen, brush))
            }
            Self::Polygon { points, pen, brush } => {
                let coords: Vec<String> = points
                    .iter()
                    .map(|p| format!("{} {}", p.x, p.y))
                    .collect();
                format!(
                    "polygon {} {} {}",
                    points.len(),
                    coords.join(" "),
                    shape_options(pen, brush)
                )
            }
            Self::Video {
                pos,
                filename,
                looped,
                play_audio,
            } => {
                let mut s = format!("video {} {} {}", pos.x, pos.y, quote(filename));
                if *looped {
                    s.push_str(" -loop");
                }
                s.push_str(if *play_audio { " -playaudio" } else { " -noaudio" });
                s
            }
        }
    }
}

fn edges(rect: &Rect) -> String {
    format!(
        "{} {} {} {}",
        rect.left,
        rect.top,
        rect.right(),
        rect.bottom()
    )
}

fn shape_options(pen: &Pen, brush: &Brush) -> String {
    format!("{} {}", pen.options(), brush.options())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_val() {
        assert_eq!(on_val(true), "on");
        assert_eq!(on_val(false), "off");
    }

    #[test]
    fn test_rect_from_edges() {
        let rect = Rect::from_edges(10, 110, 20, 70);
        assert_eq!(rect, Rect::new(10, 20, 100, 50));
        assert_eq!(rect.right(), 110);
        assert_eq!(rect.bottom(), 70);
        assert!(!rect.is_empty());
        assert!(Rect::default().is_empty());
    }

    #[test]
    fn test_log_options_args() {
        let args = LogOptions::default().to_args();
        assert_eq!(
            args.join(" "),
            "-events on -keyevents on -clientclient on -comms off -signature on"
        );
    }

    #[test]
    fn test_text_object() {
        let obj = DisplayObject::Text {
            pos: Point::new(5, 6),
            text: "Press here".to_string(),
            height: 24,
            font: Some("Arial".to_string()),
            colour: Colour::BLACK,
        };
        assert_eq!(
            obj.option_string(),
            "text 5 6 \"Press here\" -height 24 -textcolour 0 0 0 -font \"Arial\""
        );
    }

    #[test]
    fn test_polygon_object() {
        let obj = DisplayObject::Polygon {
            points: vec![Point::new(0, 0), Point::new(10, 0), Point::new(5, 8)],
            pen: Pen::default(),
            brush: Brush::Hollow,
        };
        assert_eq!(
            obj.option_string(),
            "polygon 3 0 0 10 0 5 8 -pencolour 255 255 255 -penwidth 1 -penstyle solid -brushhollow"
        );
    }

    #[test]
    fn test_video_object() {
        let obj = DisplayObject::Video {
            pos: Point::new(0, 0),
            filename: "clip.mp4".to_string(),
            looped: true,
            play_audio: false,
        };
        assert_eq!(obj.option_string(), "video 0 0 \"clip.mp4\" -loop -noaudio");
    }
}
