//! Keyboard scan codes and controller buttons understood by the input
//! sub-table.
//!
//! Key codes are DirectInput scan codes. Controller buttons are single bits of
//! a 32-bit mask; [`ControllerButtons`] is the mask itself.

use bitflags::bitflags;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:expr,)+
        }
    ) => {
        $(#[$meta])*
        #[repr(u32)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value,)+
        }

        impl $name {
            /// Every defined value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Decode a wire value; unknown values are `None`.
            #[must_use]
            pub const fn from_raw(raw: u32) -> Option<Self> {
                $(
                    if raw == $value {
                        return Some($name::$variant);
                    }
                )+
                None
            }

            /// Wire value.
            #[must_use]
            pub const fn as_raw(self) -> u32 {
                self as u32
            }

            /// Variant name.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant),)+
                }
            }
        }
    };
}

wire_enum! {
    /// Controller button, one bit each.
    pub enum ControllerButton {
        Share = 1 << 0,
        L3 = 1 << 1,
        R3 = 1 << 2,
        Options = 1 << 3,
        Up = 1 << 4,
        Right = 1 << 5,
        Down = 1 << 6,
        Left = 1 << 7,
        L1 = 1 << 8,
        R1 = 1 << 9,
        L2 = 1 << 10,
        R2 = 1 << 11,
        Triangle = 1 << 12,
        Circle = 1 << 13,
        Cross = 1 << 14,
        Square = 1 << 15,
        LsUp = 1 << 16,
        LsRight = 1 << 17,
        LsDown = 1 << 18,
        LsLeft = 1 << 19,
        RsUp = 1 << 20,
        RsRight = 1 << 21,
        RsDown = 1 << 22,
        RsLeft = 1 << 23,
    }
}

bitflags! {
    /// Set of controller buttons, same bit layout as [`ControllerButton`].
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ControllerButtons: u32 {
        /// Share
        const SHARE = 1 << 0;
        /// Left stick click
        const L3 = 1 << 1;
        /// Right stick click
        const R3 = 1 << 2;
        /// Options
        const OPTIONS = 1 << 3;
        /// D-pad up
        const UP = 1 << 4;
        /// D-pad right
        const RIGHT = 1 << 5;
        /// D-pad down
        const DOWN = 1 << 6;
        /// D-pad left
        const LEFT = 1 << 7;
        /// Left bumper
        const L1 = 1 << 8;
        /// Right bumper
        const R1 = 1 << 9;
        /// Left trigger
        const L2 = 1 << 10;
        /// Right trigger
        const R2 = 1 << 11;
        /// Triangle
        const TRIANGLE = 1 << 12;
        /// Circle
        const CIRCLE = 1 << 13;
        /// Cross
        const CROSS = 1 << 14;
        /// Square
        const SQUARE = 1 << 15;
        /// Left stick up
        const LS_UP = 1 << 16;
        /// Left stick right
        const LS_RIGHT = 1 << 17;
        /// Left stick down
        const LS_DOWN = 1 << 18;
        /// Left stick left
        const LS_LEFT = 1 << 19;
        /// Right stick up
        const RS_UP = 1 << 20;
        /// Right stick right
        const RS_RIGHT = 1 << 21;
        /// Right stick down
        const RS_DOWN = 1 << 22;
        /// Right stick left
        const RS_LEFT = 1 << 23;
    }
}

impl From<ControllerButton> for ControllerButtons {
    fn from(button: ControllerButton) -> Self {
        ControllerButtons::from_bits_retain(button.as_raw())
    }
}

static_assertions::const_assert_eq!(core::mem::size_of::<ControllerButtons>(), 4);

wire_enum! {
    /// Keyboard key, as a DirectInput scan code.
    pub enum KeyCode {
        Escape = 1,
        D1 = 2,
        D2 = 3,
        D3 = 4,
        D4 = 5,
        D5 = 6,
        D6 = 7,
        D7 = 8,
        D8 = 9,
        D9 = 10,
        D0 = 11,
        Minus = 12,
        Equals = 13,
        BackSpace = 14,
        Tab = 15,
        Q = 16,
        W = 17,
        E = 18,
        R = 19,
        T = 20,
        Y = 21,
        U = 22,
        I = 23,
        O = 24,
        P = 25,
        LeftBracket = 26,
        RightBracket = 27,
        Enter = 28,
        LeftControl = 29,
        A = 30,
        S = 31,
        D = 32,
        F = 33,
        G = 34,
        H = 35,
        J = 36,
        K = 37,
        L = 38,
        SemiColon = 39,
        Apostrophe = 40,
        Grave = 41,
        LeftShift = 42,
        BackSlash = 43,
        Z = 44,
        X = 45,
        C = 46,
        V = 47,
        B = 48,
        N = 49,
        M = 50,
        Comma = 51,
        Period = 52,
        Slash = 53,
        RightShift = 54,
        /// Numpad `*`
        Multiply = 55,
        LeftAlt = 56,
        Space = 57,
        CapsLock = 58,
        F1 = 59,
        F2 = 60,
        F3 = 61,
        F4 = 62,
        F5 = 63,
        F6 = 64,
        F7 = 65,
        F8 = 66,
        F9 = 67,
        F10 = 68,
        Numlock = 69,
        Scroll = 70,
        NumPad7 = 71,
        NumPad8 = 72,
        NumPad9 = 73,
        NumPadMinus = 74,
        NumPad4 = 75,
        NumPad5 = 76,
        NumPad6 = 77,
        NumPadPlus = 78,
        NumPad1 = 79,
        NumPad2 = 80,
        NumPad3 = 81,
        NumPad0 = 82,
        NumPadPeriod = 83,
        Oem102 = 86,
        F11 = 87,
        F12 = 88,
        F13 = 100,
        F14 = 101,
        F15 = 102,
        Kana = 112,
        AbntC1 = 115,
        Convert = 121,
        NoConvert = 123,
        Yen = 125,
        AbntC2 = 126,
        NumPadEquals = 141,
        /// Also reported as previous track
        Circumflex = 144,
        At = 145,
        Colon = 146,
        Underline = 147,
        Kanji = 148,
        Stop = 149,
        Ax = 150,
        Unlabeled = 151,
        NextTrack = 153,
        NumPadEnter = 156,
        RightControl = 157,
        Mute = 160,
        Calculator = 161,
        PlayPause = 162,
        MediaStop = 164,
        VolumeDown = 174,
        VolumeUp = 176,
        WebHome = 178,
        NumPadComma = 179,
        NumPadSlash = 181,
        SysRq = 183,
        RightAlt = 184,
        Pause = 197,
        Home = 199,
        Up = 200,
        PageUp = 201,
        Left = 203,
        Right = 205,
        End = 207,
        Down = 208,
        PageDown = 209,
        Insert = 210,
        Delete = 211,
        LeftWindows = 219,
        RightWindows = 220,
        Apps = 221,
        Power = 222,
        Sleep = 223,
        Wake = 227,
        WebSearch = 229,
        WebFavorites = 230,
        WebRefresh = 231,
        WebStop = 232,
        WebForward = 233,
        WebBack = 234,
        MyComputer = 235,
        Mail = 236,
        MediaSelect = 237,
    }
}
