use bitflags::bitflags;

bitflags! {
    /// Boolean terminal modes owned by the state machine.
    ///
    /// Initialized to the documented defaults when the state machine is
    /// created and mutated only through mode set/reset dispatch (SM/RM,
    /// DECSET/DECRST) or the keypad escapes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ModeFlags: u32 {
        /// DECCKM: cursor keys send application sequences.
        const CURSOR_KEYS       = 1 << 0;
        /// DECPAM/DECPNM: keypad sends application sequences.
        const KEYPAD_APPLICATION = 1 << 1;
        /// DECAWM: wrap to the next line when writing past the margin.
        const AUTOWRAP          = 1 << 2;
        /// DECOM: cursor addressing is relative to the scroll region.
        const ORIGIN            = 1 << 3;
        /// DECTCEM: the cursor is visible.
        const CURSOR_VISIBLE    = 1 << 4;
        /// The cursor blinks.
        const CURSOR_BLINK      = 1 << 5;
        /// The alternate screen buffer is active.
        const ALT_SCREEN        = 1 << 6;
        /// DECLRMM: left/right margins may be set and are honored.
        const LEFT_RIGHT_MARGINS = 1 << 7;
        /// Paste is bracketed with `CSI 200~`/`CSI 201~`.
        const BRACKETED_PASTE   = 1 << 8;
        /// Focus gain/loss is reported with `CSI I`/`CSI O`.
        const FOCUS_REPORT      = 1 << 9;
        /// LNM: line feed implies carriage return.
        const NEWLINE           = 1 << 10;
    }
}

impl Default for ModeFlags {
    fn default() -> Self {
        Self::AUTOWRAP | Self::CURSOR_VISIBLE | Self::CURSOR_BLINK
    }
}

/// Which mouse events the application asked to receive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MouseProtocol {
    /// No reporting.
    #[default]
    None,
    /// Button presses and releases only (mode 1000).
    Click,
    /// Clicks plus motion while a button is held (mode 1002).
    Drag,
    /// All motion (mode 1003).
    Move,
}

/// Wire format used for mouse reports.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MouseEncoding {
    /// Legacy X10 byte triplets.
    #[default]
    X10,
    /// UTF-8 extended coordinates (mode 1005).
    Utf8,
    /// SGR `CSI < b;x;y M/m` (mode 1006).
    Sgr,
    /// Rxvt `CSI b;x;y M` (mode 1015).
    Rxvt,
}

/// A DEC private mode number with a recognized meaning.
///
/// The fixed lookup table from wire numbers onto the mode set; numbers
/// outside the table are reported through the diagnostic channel and
/// otherwise ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PrivateMode {
    CursorKeys,
    ReverseVideo,
    Origin,
    Autowrap,
    CursorBlink,
    CursorVisible,
    LeftRightMargins,
    AltScreenPlain,
    MouseClicks,
    MouseDrag,
    MouseMove,
    FocusReport,
    MouseUtf8,
    MouseSgr,
    MouseRxvt,
    AltScreen,
    SaveCursor,
    AltScreenAndSaveCursor,
    BracketedPaste,
}

impl PrivateMode {
    pub(crate) fn from_raw(number: u32) -> Option<Self> {
        Some(match number {
            1 => Self::CursorKeys,
            5 => Self::ReverseVideo,
            6 => Self::Origin,
            7 => Self::Autowrap,
            12 => Self::CursorBlink,
            25 => Self::CursorVisible,
            69 => Self::LeftRightMargins,
            47 => Self::AltScreenPlain,
            1000 => Self::MouseClicks,
            1002 => Self::MouseDrag,
            1003 => Self::MouseMove,
            1004 => Self::FocusReport,
            1005 => Self::MouseUtf8,
            1006 => Self::MouseSgr,
            1015 => Self::MouseRxvt,
            1047 => Self::AltScreen,
            1048 => Self::SaveCursor,
            1049 => Self::AltScreenAndSaveCursor,
            2004 => Self::BracketedPaste,
            _ => return None,
        })
    }
}
