//! Canonical controller state: Buttons, Hat, DirectionFlags, StickPosition, ControllerState.

use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

/// Button state of a Switch Pro Controller as a 16-bit field.
///
/// Bit positions follow the host-side wire convention: Y is bit 0 and
/// the grip buttons occupy the two top bits.
///
/// # Example
///
/// ```
/// use switch_proto::Buttons;
///
/// let buttons = Buttons::A | Buttons::ZR;
/// assert!(buttons.contains(Buttons::A));
/// assert!(!buttons.contains(Buttons::B));
/// assert_eq!(buttons.raw(), 0x0084);
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Buttons(pub u16);

impl Buttons {
    pub const Y: Self = Self(1 << 0);
    pub const B: Self = Self(1 << 1);
    pub const A: Self = Self(1 << 2);
    pub const X: Self = Self(1 << 3);
    pub const L: Self = Self(1 << 4);
    pub const R: Self = Self(1 << 5);
    pub const ZL: Self = Self(1 << 6);
    pub const ZR: Self = Self(1 << 7);
    pub const MINUS: Self = Self(1 << 8);
    pub const PLUS: Self = Self(1 << 9);
    pub const LSTICK: Self = Self(1 << 10); // Left stick press
    pub const RSTICK: Self = Self(1 << 11); // Right stick press
    pub const HOME: Self = Self(1 << 12);
    pub const CAPTURE: Self = Self(1 << 13);
    pub const GL: Self = Self(1 << 14); // Grip left
    pub const GR: Self = Self(1 << 15); // Grip right

    /// No buttons pressed.
    pub const NONE: Self = Self(0);

    /// Every named button with its canonical name, in bit order.
    pub const NAMED: [(&'static str, Buttons); 16] = [
        ("Y", Self::Y),
        ("B", Self::B),
        ("A", Self::A),
        ("X", Self::X),
        ("L", Self::L),
        ("R", Self::R),
        ("ZL", Self::ZL),
        ("ZR", Self::ZR),
        ("MINUS", Self::MINUS),
        ("PLUS", Self::PLUS),
        ("LSTICK", Self::LSTICK),
        ("RSTICK", Self::RSTICK),
        ("HOME", Self::HOME),
        ("CAPTURE", Self::CAPTURE),
        ("GL", Self::GL),
        ("GR", Self::GR),
    ];

    /// `true` when every bit of `other` is held.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Buttons) -> bool {
        self.0 & other.0 == other.0
    }

    /// Hold or release `mask`.
    #[inline]
    pub fn set(&mut self, mask: Buttons, held: bool) {
        self.0 = if held { self.0 | mask.0 } else { self.0 & !mask.0 };
    }

    /// Wire value, little-endian on the link.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Look up a single button by its canonical name (`"A"`, `"ZL"`, `"CAPTURE"`, ...).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMED
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, b)| b)
    }

    /// Canonical name of a single-button value, `None` for combinations.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        Self::NAMED
            .iter()
            .find(|&&(_, b)| b == self)
            .map(|&(n, _)| n)
    }
}

macro_rules! buttons_bit_op {
    ($op:ident::$method:ident, $assign:ident::$assign_method:ident, $tok:tt) => {
        impl $op for Buttons {
            type Output = Self;

            #[inline]
            fn $method(self, rhs: Self) -> Self {
                Self(self.0 $tok rhs.0)
            }
        }

        impl $assign for Buttons {
            #[inline]
            fn $assign_method(&mut self, rhs: Self) {
                *self = $op::$method(*self, rhs);
            }
        }
    };
}

buttons_bit_op!(BitOr::bitor, BitOrAssign::bitor_assign, |);
buttons_bit_op!(BitAnd::bitand, BitAndAssign::bitand_assign, &);
buttons_bit_op!(BitXor::bitxor, BitXorAssign::bitxor_assign, ^);

/// Complement within the 16 button bits.
impl Not for Buttons {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        Self(!self.0)
    }
}

/// D-pad HAT code as carried on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Hat {
    Up = 0,
    UpRight = 1,
    Right = 2,
    DownRight = 3,
    Down = 4,
    DownLeft = 5,
    Left = 6,
    UpLeft = 7,
    Neutral = 8,
}

impl Hat {
    /// Wire code (0-8).
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Parse a wire code; anything above 8 is not a HAT value.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Up),
            1 => Some(Self::UpRight),
            2 => Some(Self::Right),
            3 => Some(Self::DownRight),
            4 => Some(Self::Down),
            5 => Some(Self::DownLeft),
            6 => Some(Self::Left),
            7 => Some(Self::UpLeft),
            8 => Some(Self::Neutral),
            _ => None,
        }
    }
}

/// One of the four compass directions used by the D-pad and stick bindings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Lower-case name used in binding strings.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Four independent direction flags, used for the D-pad and for
/// digital (keyboard) stick input.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DirectionFlags {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl DirectionFlags {
    pub const NONE: Self = Self {
        up: false,
        down: false,
        left: false,
        right: false,
    };

    /// Set or clear one direction.
    #[inline]
    pub fn set(&mut self, direction: Direction, active: bool) {
        match direction {
            Direction::Up => self.up = active,
            Direction::Down => self.down = active,
            Direction::Left => self.left = active,
            Direction::Right => self.right = active,
        }
    }

    #[inline]
    #[must_use]
    pub const fn any(self) -> bool {
        self.up || self.down || self.left || self.right
    }

    /// Encode the flags as a HAT code.
    ///
    /// Diagonals are checked before straight directions, in the order
    /// up-right, up-left, down-right, down-left, then up, down, left,
    /// right. Up+down+right therefore resolves to up-right.
    #[must_use]
    pub const fn hat(self) -> Hat {
        match (self.up, self.down, self.left, self.right) {
            (true, _, _, true) => Hat::UpRight,
            (true, _, true, _) => Hat::UpLeft,
            (_, true, _, true) => Hat::DownRight,
            (_, true, true, _) => Hat::DownLeft,
            (true, _, _, _) => Hat::Up,
            (_, true, _, _) => Hat::Down,
            (_, _, true, _) => Hat::Left,
            (_, _, _, true) => Hat::Right,
            _ => Hat::Neutral,
        }
    }

    /// Map the flags to stick coordinates.
    ///
    /// Per axis the negative direction (left, up) yields 0 and wins over
    /// the positive one, the positive direction yields 255, neither
    /// yields center.
    #[must_use]
    pub const fn axis_values(self) -> StickPosition {
        StickPosition {
            x: axis_from_flags(self.left, self.right),
            y: axis_from_flags(self.up, self.down),
        }
    }
}

#[inline]
const fn axis_from_flags(negative: bool, positive: bool) -> u8 {
    if negative {
        STICK_MIN
    } else if positive {
        STICK_MAX
    } else {
        STICK_CENTER
    }
}

pub const STICK_MIN: u8 = 0;
pub const STICK_CENTER: u8 = 128;
pub const STICK_MAX: u8 = 255;

/// Stick coordinates, 0-255 with 128 as center. Y grows downward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StickPosition {
    pub x: u8,
    pub y: u8,
}

impl StickPosition {
    pub const CENTER: Self = Self {
        x: STICK_CENTER,
        y: STICK_CENTER,
    };

    #[must_use]
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    #[inline]
    #[must_use]
    pub const fn is_centered(self) -> bool {
        self.x == STICK_CENTER && self.y == STICK_CENTER
    }
}

impl Default for StickPosition {
    fn default() -> Self {
        Self::CENTER
    }
}

/// Selects one of the two analog sticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stick {
    Left,
    Right,
}

/// Complete controller snapshot for one host cycle.
///
/// Built fresh (neutral) every cycle, filled additively by the capture
/// backends, then encoded once.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerState {
    pub buttons: Buttons,
    pub dpad: DirectionFlags,
    /// Digital direction flags for the left stick (keyboard bindings).
    pub left_directions: DirectionFlags,
    /// Digital direction flags for the right stick (keyboard bindings).
    pub right_directions: DirectionFlags,
    pub left: StickPosition,
    pub right: StickPosition,
}

impl ControllerState {
    /// No buttons, D-pad released, sticks centered.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            buttons: Buttons::NONE,
            dpad: DirectionFlags::NONE,
            left_directions: DirectionFlags::NONE,
            right_directions: DirectionFlags::NONE,
            left: StickPosition::CENTER,
            right: StickPosition::CENTER,
        }
    }

    /// HAT code derived from the D-pad flags.
    #[inline]
    #[must_use]
    pub const fn hat(&self) -> Hat {
        self.dpad.hat()
    }

    #[must_use]
    pub const fn stick(&self, stick: Stick) -> StickPosition {
        match stick {
            Stick::Left => self.left,
            Stick::Right => self.right,
        }
    }

    pub fn stick_mut(&mut self, stick: Stick) -> &mut StickPosition {
        match stick {
            Stick::Left => &mut self.left,
            Stick::Right => &mut self.right,
        }
    }

    pub fn directions_mut(&mut self, stick: Stick) -> &mut DirectionFlags {
        match stick {
            Stick::Left => &mut self.left_directions,
            Stick::Right => &mut self.right_directions,
        }
    }

    /// Fold the digital stick flags into the stick coordinates.
    ///
    /// A stick only takes its digital value when its position is still
    /// exactly centered, so an analog reading from a controller always
    /// wins over a held key.
    pub fn apply_stick_directions(&mut self) {
        if self.left.is_centered() && self.left_directions.any() {
            self.left = self.left_directions.axis_values();
        }
        if self.right.is_centered() && self.right_directions.any() {
            self.right = self.right_directions.axis_values();
        }
    }
}
