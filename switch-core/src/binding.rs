//! Key and controller-button bindings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use switch_proto::{Buttons, ControllerState, Direction, Stick};

/// Key names every capture backend knows how to translate.
pub const KEY_NAMES: &[&str] = &[
    "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r", "s",
    "t", "u", "v", "w", "x", "y", "z", "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "space",
    "enter", "escape", "tab", "backspace", "delete", "up", "down", "left", "right", "f1", "f2",
    "f3", "f4", "f5", "f6", "f7", "f8", "f9", "f10", "f11", "f12", "shift", "ctrl", "alt", "num0",
    "num1", "num2", "num3", "num4", "num5", "num6", "num7", "num8", "num9",
];

/// Highest physical button index a controller remap may refer to.
pub const MAX_PHYSICAL_BUTTON: u8 = 63;

/// Error type for binding parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("binding `{0}` is not of the form `<type>:<value>`")]
    Malformed(String),
    #[error("unknown binding type `{0}` (expected button, dpad, lstick or rstick)")]
    UnknownType(String),
    #[error("unknown button `{0}`")]
    UnknownButton(String),
    #[error("unknown direction `{0}` (expected up, down, left or right)")]
    UnknownDirection(String),
    #[error("controller button index {0} is out of range (0-63)")]
    IndexOutOfRange(u32),
}

/// What a bound key does when held.
///
/// Textual form is `<type>:<value>`:
///
/// ```
/// use switch_core::Binding;
/// use switch_proto::{Buttons, Direction};
///
/// assert_eq!("button:ZL".parse(), Ok(Binding::Button(Buttons::ZL)));
/// assert_eq!("lstick:down".parse(), Ok(Binding::LeftStick(Direction::Down)));
/// assert_eq!(Binding::Dpad(Direction::Up).to_string(), "dpad:up");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Binding {
    Button(Buttons),
    Dpad(Direction),
    LeftStick(Direction),
    RightStick(Direction),
}

impl Binding {
    /// Mark this binding as held in `state`. Never clears anything.
    pub fn apply(self, state: &mut ControllerState) {
        match self {
            Self::Button(mask) => state.buttons |= mask,
            Self::Dpad(direction) => state.dpad.set(direction, true),
            Self::LeftStick(direction) => state.directions_mut(Stick::Left).set(direction, true),
            Self::RightStick(direction) => state.directions_mut(Stick::Right).set(direction, true),
        }
    }
}

impl FromStr for Binding {
    type Err = BindingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, value) = s
            .split_once(':')
            .ok_or_else(|| BindingError::Malformed(s.to_owned()))?;
        let (kind, value) = (kind.trim(), value.trim());

        let direction = || {
            Direction::from_name(value).ok_or_else(|| BindingError::UnknownDirection(value.to_owned()))
        };

        match kind {
            "button" => Buttons::from_name(value)
                .map(Self::Button)
                .ok_or_else(|| BindingError::UnknownButton(value.to_owned())),
            "dpad" => direction().map(Self::Dpad),
            "lstick" => direction().map(Self::LeftStick),
            "rstick" => direction().map(Self::RightStick),
            other => Err(BindingError::UnknownType(other.to_owned())),
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Button(mask) => write!(f, "button:{}", mask.name().unwrap_or("UNKNOWN")),
            Self::Dpad(direction) => write!(f, "dpad:{}", direction.name()),
            Self::LeftStick(direction) => write!(f, "lstick:{}", direction.name()),
            Self::RightStick(direction) => write!(f, "rstick:{}", direction.name()),
        }
    }
}

impl TryFrom<String> for Binding {
    type Error = BindingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Binding> for String {
    fn from(binding: Binding) -> Self {
        binding.to_string()
    }
}

/// Remap of one physical controller button to a Switch button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerBinding {
    pub index: u8,
    pub mask: Buttons,
}

/// Key bindings plus optional physical-button remaps.
///
/// Keys are unique: inserting a key that is already bound replaces the
/// earlier binding in place, so the last definition wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingConfig {
    keys: Vec<(String, Binding)>,
    controller: Vec<ControllerBinding>,
}

impl BindingConfig {
    /// No bindings at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            keys: Vec::new(),
            controller: Vec::new(),
        }
    }

    /// Bind `key`, replacing any earlier binding for the same key.
    pub fn insert(&mut self, key: impl Into<String>, binding: Binding) {
        let key = key.into();
        match self.keys.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = binding,
            None => self.keys.push((key, binding)),
        }
    }

    /// Binding for a key name.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<Binding> {
        self.keys
            .iter()
            .find(|(k, _)| k == key)
            .map(|&(_, binding)| binding)
    }

    /// Key bindings in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Binding)> {
        self.keys.iter().map(|(k, b)| (k.as_str(), *b))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Remap physical button `index` to `mask`.
    pub fn add_controller_binding(&mut self, index: u8, mask: Buttons) -> Result<(), BindingError> {
        if index > MAX_PHYSICAL_BUTTON {
            return Err(BindingError::IndexOutOfRange(u32::from(index)));
        }
        self.controller.push(ControllerBinding { index, mask });
        Ok(())
    }

    #[must_use]
    pub fn controller_bindings(&self) -> &[ControllerBinding] {
        &self.controller
    }

    #[must_use]
    pub fn has_custom_controller_bindings(&self) -> bool {
        !self.controller.is_empty()
    }

    /// Switch buttons for a set of pressed physical buttons.
    ///
    /// With custom remaps configured only the remaps apply; otherwise
    /// `default` (the backend's built-in mapping) is used as is.
    #[must_use]
    pub fn resolve_buttons(&self, physical_pressed: u64, default: Buttons) -> Buttons {
        if !self.has_custom_controller_bindings() {
            return default;
        }
        self.controller
            .iter()
            .filter(|b| physical_pressed & (1u64 << b.index) != 0)
            .fold(Buttons::NONE, |acc, b| acc | b.mask)
    }
}

impl Default for BindingConfig {
    /// The stock keyboard layout.
    fn default() -> Self {
        use Direction::{Down, Left, Right, Up};

        let mut config = Self::empty();
        let defaults = [
            ("u", Binding::Button(Buttons::X)),
            ("j", Binding::Button(Buttons::Y)),
            ("k", Binding::Button(Buttons::A)),
            ("i", Binding::Button(Buttons::B)),
            ("l", Binding::Button(Buttons::L)),
            ("f", Binding::Button(Buttons::R)),
            ("t", Binding::Button(Buttons::ZL)),
            ("s", Binding::Button(Buttons::ZR)),
            ("1", Binding::Button(Buttons::MINUS)),
            ("2", Binding::Button(Buttons::PLUS)),
            ("h", Binding::Button(Buttons::HOME)),
            ("c", Binding::Button(Buttons::CAPTURE)),
            ("up", Binding::Dpad(Up)),
            ("down", Binding::Dpad(Down)),
            ("left", Binding::Dpad(Left)),
            ("right", Binding::Dpad(Right)),
            ("w", Binding::LeftStick(Up)),
            ("a", Binding::LeftStick(Left)),
            // Rebinds `s` from ZR; the later definition wins.
            ("s", Binding::LeftStick(Down)),
            ("d", Binding::LeftStick(Right)),
        ];
        for (key, binding) in defaults {
            config.insert(key, binding);
        }
        config
    }
}

/// Whether `name` is one of [`KEY_NAMES`].
#[must_use]
pub fn is_known_key(name: &str) -> bool {
    KEY_NAMES.contains(&name)
}

/// Apply every key binding whose key `is_pressed` reports as held.
///
/// Backends pass a closure translating key names into their native
/// key state; names the backend cannot translate should report `false`.
pub fn apply_key_bindings(
    state: &mut ControllerState,
    bindings: &BindingConfig,
    mut is_pressed: impl FnMut(&str) -> bool,
) {
    for (key, binding) in bindings.iter() {
        if is_pressed(key) {
            binding.apply(state);
        }
    }
}
