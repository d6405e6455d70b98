//! Text commands describing a controller state.
//!
//! Tokens are joined with `+`:
//!
//! ```text
//! A+B          two buttons
//! UL           D-pad up-left
//! A+LX:255     A held, left stick fully right
//! +            the PLUS button on its own
//! ```
//!
//! Button tokens: `Y B A X L R ZL ZR - LS RS H C GL GR` and the long
//! names `MINUS PLUS LSTICK RSTICK HOME CAPTURE`. D-pad tokens:
//! `U D UL UR DL DR`; `L` and `R` always mean the shoulder buttons.
//! Analog tokens: `LX:n LY:n RX:n RY:n` with `n` in 0-255.

use crate::types::{Buttons, ControllerState, Direction, DirectionFlags};

/// Command parsing error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Nothing but whitespace.
    Empty,
    /// No token was recognized.
    NoValidToken,
}

impl core::fmt::Display for CommandError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Empty => f.write_str("empty command"),
            Self::NoValidToken => f.write_str("no recognized button, d-pad or analog token"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CommandError {}

/// Parse a command into a fresh controller state.
///
/// Unrecognized tokens are skipped; the command fails only when none is
/// recognized. When several D-pad tokens are given the last one wins.
///
/// # Example
///
/// ```
/// use switch_proto::{parse_command, Buttons, Hat};
///
/// let state = parse_command("A + ZR + UR").unwrap();
/// assert_eq!(state.buttons, Buttons::A | Buttons::ZR);
/// assert_eq!(state.hat(), Hat::UpRight);
/// ```
pub fn parse_command(command: &str) -> Result<ControllerState, CommandError> {
    let command = command.trim();
    if command.is_empty() {
        return Err(CommandError::Empty);
    }

    let mut state = ControllerState::neutral();
    if command == "+" {
        state.buttons = Buttons::PLUS;
        return Ok(state);
    }

    let mut valid = false;
    for token in command.split('+').map(str::trim).filter(|t| !t.is_empty()) {
        if let Some(button) = button_token(token) {
            state.buttons |= button;
        } else if let Some(dpad) = dpad_token(token) {
            state.dpad = dpad;
        } else if !apply_analog_token(token, &mut state) {
            continue;
        }
        valid = true;
    }

    if valid {
        Ok(state)
    } else {
        Err(CommandError::NoValidToken)
    }
}

fn button_token(token: &str) -> Option<Buttons> {
    let button = match token {
        "-" => Buttons::MINUS,
        "LS" => Buttons::LSTICK,
        "RS" => Buttons::RSTICK,
        "H" => Buttons::HOME,
        "C" => Buttons::CAPTURE,
        other => return Buttons::from_name(other),
    };
    Some(button)
}

fn dpad_token(token: &str) -> Option<DirectionFlags> {
    let directions: &[Direction] = match token {
        "U" => &[Direction::Up],
        "D" => &[Direction::Down],
        "UL" => &[Direction::Up, Direction::Left],
        "UR" => &[Direction::Up, Direction::Right],
        "DL" => &[Direction::Down, Direction::Left],
        "DR" => &[Direction::Down, Direction::Right],
        _ => return None,
    };
    let mut flags = DirectionFlags::NONE;
    for &direction in directions {
        flags.set(direction, true);
    }
    Some(flags)
}

fn apply_analog_token(token: &str, state: &mut ControllerState) -> bool {
    let Some((axis, value)) = token.split_once(':') else {
        return false;
    };
    let Ok(value) = value.trim().parse::<u8>() else {
        return false;
    };
    let target = match axis {
        "LX" => &mut state.left.x,
        "LY" => &mut state.left.y,
        "RX" => &mut state.right.x,
        "RY" => &mut state.right.y,
        _ => return false,
    };
    *target = value;
    true
}
