//! Wire tokens of the Whisker text protocol.
//!
//! Commands are sent as `<COMMAND> <arg> ...`; flags are `-name` switches
//! that follow their command. Reply and message markers are what the
//! server sends back.

// ============================================================================
// Connection / Meta Commands
// ============================================================================

pub const CMD_LINK: &str = "Link";
pub const CMD_TIMESTAMPS: &str = "TIMESTAMPS";
pub const CMD_RESET_CLOCK: &str = "RESET_CLOCK";
pub const CMD_VERSION: &str = "VERSION";
pub const CMD_REQUEST_TIME: &str = "REQUEST_TIME";
pub const CMD_CLIENT_NUMBER: &str = "CLIENT_NUMBER";
pub const CMD_PERMIT_CLIENT_MESSAGES: &str = "PERMIT_CLIENT_MESSAGES";
pub const CMD_SEND_TO_CLIENT: &str = "SEND_TO_CLIENT";
pub const CMD_SET_MEDIA_DIRECTORY: &str = "SET_MEDIA_DIRECTORY";
pub const CMD_REPORT_NAME: &str = "REPORT_NAME";
pub const CMD_REPORT_STATUS: &str = "REPORT_STATUS";
pub const CMD_REPORT_COMMENT: &str = "REPORT_COMMENT";
pub const CMD_TEST_NETWORK_LATENCY: &str = "TEST_NETWORK_LATENCY";
pub const CMD_SHUTDOWN: &str = "SHUTDOWN";
pub const CMD_AUTHENTICATE: &str = "AUTHENTICATE";
pub const CMD_AUTHENTICATE_RESPONSE: &str = "AUTHENTICATE_RESPONSE";

// ============================================================================
// Log Commands
// ============================================================================

pub const CMD_LOG_OPEN: &str = "LOG_OPEN";
pub const CMD_LOG_SET_OPTIONS: &str = "LOG_SET_OPTIONS";
pub const CMD_LOG_PAUSE: &str = "LOG_PAUSE";
pub const CMD_LOG_RESUME: &str = "LOG_RESUME";
pub const CMD_LOG_WRITE: &str = "LOG_WRITE";
pub const CMD_LOG_CLOSE: &str = "LOG_CLOSE";

// ============================================================================
// Timer Commands
// ============================================================================

pub const CMD_TIMER_SET_EVENT: &str = "TIMER_SET_EVENT";
pub const CMD_TIMER_CLEAR_EVENT: &str = "TIMER_CLEAR_EVENT";
pub const CMD_TIMER_CLEAR_ALL_EVENTS: &str = "TIMER_CLEAR_ALL_EVENTS";

// ============================================================================
// Claim Commands
// ============================================================================

pub const CMD_CLAIM_GROUP: &str = "CLAIM_GROUP";
pub const CMD_LINE_CLAIM: &str = "LINE_CLAIM";
pub const CMD_LINE_RELINQUISH_ALL: &str = "LINE_RELINQUISH_ALL";
pub const CMD_LINE_SET_ALIAS: &str = "LINE_SET_ALIAS";
pub const CMD_AUDIO_CLAIM: &str = "AUDIO_CLAIM";
pub const CMD_AUDIO_SET_ALIAS: &str = "AUDIO_SET_ALIAS";
pub const CMD_AUDIO_RELINQUISH_ALL: &str = "AUDIO_RELINQUISH_ALL";
pub const CMD_DISPLAY_CLAIM: &str = "DISPLAY_CLAIM";
pub const CMD_DISPLAY_SET_ALIAS: &str = "DISPLAY_SET_ALIAS";
pub const CMD_DISPLAY_RELINQUISH_ALL: &str = "DISPLAY_RELINQUISH_ALL";
pub const CMD_DISPLAY_CREATE_DEVICE: &str = "DISPLAY_CREATE_DEVICE";
pub const CMD_DISPLAY_DELETE_DEVICE: &str = "DISPLAY_DELETE_DEVICE";

// ============================================================================
// Line Commands
// ============================================================================

pub const CMD_LINE_SET_STATE: &str = "LINE_SET_STATE";
pub const CMD_LINE_READ_STATE: &str = "LINE_READ_STATE";
pub const CMD_LINE_SET_EVENT: &str = "LINE_SET_EVENT";
pub const CMD_LINE_CLEAR_EVENT: &str = "LINE_CLEAR_EVENT";
pub const CMD_LINE_CLEAR_EVENTS_BY_LINE: &str = "LINE_CLEAR_EVENTS_BY_LINE";
pub const CMD_LINE_CLEAR_ALL_EVENTS: &str = "LINE_CLEAR_ALL_EVENTS";
pub const CMD_LINE_SET_SAFETY_TIMER: &str = "LINE_SET_SAFETY_TIMER";
pub const CMD_LINE_CLEAR_SAFETY_TIMER: &str = "LINE_CLEAR_SAFETY_TIMER";

// ============================================================================
// Audio Commands
// ============================================================================

pub const CMD_AUDIO_PLAY_FILE: &str = "AUDIO_PLAY_FILE";
pub const CMD_AUDIO_LOAD_TONE: &str = "AUDIO_LOAD_TONE";
pub const CMD_AUDIO_LOAD_SOUND: &str = "AUDIO_LOAD_SOUND";
pub const CMD_AUDIO_PLAY_SOUND: &str = "AUDIO_PLAY_SOUND";
pub const CMD_AUDIO_UNLOAD_SOUND: &str = "AUDIO_UNLOAD_SOUND";
pub const CMD_AUDIO_STOP_SOUND: &str = "AUDIO_STOP_SOUND";
pub const CMD_AUDIO_SILENCE_DEVICE: &str = "AUDIO_SILENCE_DEVICE";
pub const CMD_AUDIO_UNLOAD_ALL: &str = "AUDIO_UNLOAD_ALL";
pub const CMD_AUDIO_SET_SOUND_VOLUME: &str = "AUDIO_SET_SOUND_VOLUME";
pub const CMD_AUDIO_SILENCE_ALL_DEVICES: &str = "AUDIO_SILENCE_ALL_DEVICES";
pub const CMD_AUDIO_GET_SOUND_LENGTH: &str = "AUDIO_GET_SOUND_LENGTH";

// ============================================================================
// Display Commands
// ============================================================================

pub const CMD_DISPLAY_GET_SIZE: &str = "DISPLAY_GET_SIZE";
pub const CMD_DISPLAY_SCALE_DOCUMENTS: &str = "DISPLAY_SCALE_DOCUMENTS";
pub const CMD_DISPLAY_SHOW_DOCUMENT: &str = "DISPLAY_SHOW_DOCUMENT";
pub const CMD_DISPLAY_BLANK: &str = "DISPLAY_BLANK";
pub const CMD_DISPLAY_CREATE_DOCUMENT: &str = "DISPLAY_CREATE_DOCUMENT";
pub const CMD_DISPLAY_DELETE_DOCUMENT: &str = "DISPLAY_DELETE_DOCUMENT";
pub const CMD_DISPLAY_SET_DOCUMENT_SIZE: &str = "DISPLAY_SET_DOCUMENT_SIZE";
pub const CMD_DISPLAY_SET_BACKGROUND_COLOUR: &str = "DISPLAY_SET_BACKGROUND_COLOUR";
pub const CMD_DISPLAY_DELETE_OBJECT: &str = "DISPLAY_DELETE_OBJECT";
pub const CMD_DISPLAY_ADD_OBJECT: &str = "DISPLAY_ADD_OBJECT";
pub const CMD_DISPLAY_SET_EVENT: &str = "DISPLAY_SET_EVENT";
pub const CMD_DISPLAY_CLEAR_EVENT: &str = "DISPLAY_CLEAR_EVENT";
pub const CMD_DISPLAY_SET_OBJ_EVENT_TRANSPARENCY: &str = "DISPLAY_SET_OBJ_EVENT_TRANSPARENCY";
pub const CMD_DISPLAY_EVENT_COORDS: &str = "DISPLAY_EVENT_COORDS";
pub const CMD_DISPLAY_BRING_TO_FRONT: &str = "DISPLAY_BRING_TO_FRONT";
pub const CMD_DISPLAY_SEND_TO_BACK: &str = "DISPLAY_SEND_TO_BACK";
pub const CMD_DISPLAY_KEYBOARD_EVENTS: &str = "DISPLAY_KEYBOARD_EVENTS";
pub const CMD_DISPLAY_CACHE_CHANGES: &str = "DISPLAY_CACHE_CHANGES";
pub const CMD_DISPLAY_SHOW_CHANGES: &str = "DISPLAY_SHOW_CHANGES";
pub const CMD_DISPLAY_GET_DOCUMENT_SIZE: &str = "DISPLAY_GET_DOCUMENT_SIZE";
pub const CMD_DISPLAY_GET_OBJECT_EXTENT: &str = "DISPLAY_GET_OBJECT_EXTENT";
pub const CMD_DISPLAY_SET_BACKGROUND_EVENT: &str = "DISPLAY_SET_BACKGROUND_EVENT";
pub const CMD_DISPLAY_CLEAR_BACKGROUND_EVENT: &str = "DISPLAY_CLEAR_BACKGROUND_EVENT";
pub const CMD_DISPLAY_SET_AUDIO_DEVICE: &str = "DISPLAY_SET_AUDIO_DEVICE";

// ============================================================================
// Video Commands
// ============================================================================

pub const CMD_VIDEO_PLAY: &str = "VIDEO_PLAY";
pub const CMD_VIDEO_PAUSE: &str = "VIDEO_PAUSE";
pub const CMD_VIDEO_STOP: &str = "VIDEO_STOP";
pub const CMD_VIDEO_TIMESTAMPS: &str = "VIDEO_TIMESTAMPS";
pub const CMD_VIDEO_GET_TIME: &str = "VIDEO_GET_TIME";
pub const CMD_VIDEO_GET_DURATION: &str = "VIDEO_GET_DURATION";
pub const CMD_VIDEO_SEEK_RELATIVE: &str = "VIDEO_SEEK_RELATIVE";
pub const CMD_VIDEO_SEEK_ABSOLUTE: &str = "VIDEO_SEEK_ABSOLUTE";
pub const CMD_VIDEO_SET_VOLUME: &str = "VIDEO_SET_VOLUME";

// ============================================================================
// Flags
// ============================================================================

pub const FLAG_ALIAS: &str = "-alias";
pub const FLAG_PREFIX: &str = "-prefix";
pub const FLAG_SUFFIX: &str = "-suffix";
pub const FLAG_INPUT: &str = "-input";
pub const FLAG_OUTPUT: &str = "-output";
pub const FLAG_RESET_OFF: &str = "-resetoff";
pub const FLAG_RESET_ON: &str = "-reseton";
pub const FLAG_RESET_LEAVE: &str = "-resetleave";
pub const FLAG_LOOP: &str = "-loop";
pub const FLAG_RESIZE: &str = "-resize";
pub const FLAG_DIRECTDRAW: &str = "-directdraw";
pub const FLAG_DEBUG_TOUCHES: &str = "-debugtouches";
pub const FLAG_EVENTS: &str = "-events";
pub const FLAG_KEYEVENTS: &str = "-keyevents";
pub const FLAG_CLIENTCLIENT: &str = "-clientclient";
pub const FLAG_COMMS: &str = "-comms";
pub const FLAG_SIGNATURE: &str = "-signature";

// ============================================================================
// Values
// ============================================================================

pub const VAL_ON: &str = "on";
pub const VAL_OFF: &str = "off";
pub const VAL_BOTH: &str = "both";
pub const VAL_NONE: &str = "none";
pub const VAL_DOWN: &str = "down";
pub const VAL_UP: &str = "up";

/// Client number meaning "every connected client".
pub const VAL_BROADCAST_TO_ALL_CLIENTS: i32 = -1;

// ============================================================================
// Immediate Replies
// ============================================================================

pub const REPLY_SUCCESS: &str = "Success";
pub const REPLY_FAILURE: &str = "Failure";
pub const MSG_SIZE: &str = "MSG_SIZE";
pub const MSG_EXTENT: &str = "MSG_EXTENT";
pub const MSG_VIDEO_TIME: &str = "MSG_VIDEO_TIME";
pub const MSG_DURATION: &str = "MSG_DURATION";
pub const MSG_AUTHENTICATE_CHALLENGE: &str = "MSG_AUTHENTICATE_CHALLENGE";

// ============================================================================
// Main-Socket Markers
// ============================================================================

pub const EVENT_PREFIX: &str = "Event:";
pub const KEY_EVENT_PREFIX: &str = "KeyEvent:";
pub const CLIENT_MESSAGE_PREFIX: &str = "ClientMessage:";
pub const WARNING_PREFIX: &str = "Warning:";
pub const SYNTAX_ERROR_PREFIX: &str = "SyntaxError:";
pub const ERROR_PREFIX: &str = "Error:";
pub const IMMPORT_PREFIX: &str = "ImmPort:";
pub const CODE_PREFIX: &str = "Code:";
pub const PING: &str = "Ping";
pub const PING_ACK: &str = "PingAcknowledged";
