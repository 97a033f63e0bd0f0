//! Host-agnostic pointer and keyboard events.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }

    /// Modifiers that add to or toggle the selection on click.
    pub fn multi_select(self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}

/// Keys the board reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Space,
    Enter,
    Escape,
    Delete,
    Backspace,
}

impl Key {
    /// Case-insensitive comparison for character keys.
    pub fn matches(self, other: Key) -> bool {
        match (self, other) {
            (Key::Char(a), Key::Char(b)) => a.eq_ignore_ascii_case(&b),
            (a, b) => a == b,
        }
    }
}

/// Pointer events in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Move {
        position: Point,
        modifiers: Modifiers,
    },
    Up {
        position: Point,
        modifiers: Modifiers,
    },
    /// A press and release without movement, delivered after `Up`.
    Click {
        position: Point,
        modifiers: Modifiers,
    },
    DoubleClick {
        position: Point,
    },
    Wheel {
        position: Point,
        delta: Vec2,
        modifiers: Modifiers,
    },
}

impl PointerEvent {
    /// Left-button press with no modifiers.
    pub fn down(x: f64, y: f64) -> Self {
        PointerEvent::Down {
            position: Point::new(x, y),
            button: MouseButton::Left,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        PointerEvent::Move {
            position: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn up(x: f64, y: f64) -> Self {
        PointerEvent::Up {
            position: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn click(x: f64, y: f64) -> Self {
        PointerEvent::Click {
            position: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    /// Replace the modifiers carried by the event.
    pub fn with_modifiers(self, modifiers: Modifiers) -> Self {
        match self {
            PointerEvent::Down {
                position, button, ..
            } => PointerEvent::Down {
                position,
                button,
                modifiers,
            },
            PointerEvent::Move { position, .. } => PointerEvent::Move {
                position,
                modifiers,
            },
            PointerEvent::Up { position, .. } => PointerEvent::Up {
                position,
                modifiers,
            },
            PointerEvent::Click { position, .. } => PointerEvent::Click {
                position,
                modifiers,
            },
            PointerEvent::Wheel {
                position, delta, ..
            } => PointerEvent::Wheel {
                position,
                delta,
                modifiers,
            },
            other @ PointerEvent::DoubleClick { .. } => other,
        }
    }

    /// Screen position of the event.
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position, .. }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Click { position, .. }
            | PointerEvent::DoubleClick { position }
            | PointerEvent::Wheel { position, .. } => position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_modifier() {
        assert!(Modifiers::ctrl().command());
        assert!(Modifiers { meta: true, ..Modifiers::NONE }.command());
        assert!(!Modifiers::shift().command());
    }

    #[test]
    fn test_multi_select_modifiers() {
        assert!(Modifiers::shift().multi_select());
        assert!(Modifiers::ctrl().multi_select());
        assert!(!Modifiers { alt: true, ..Modifiers::NONE }.multi_select());
    }

    #[test]
    fn test_key_matches_case_insensitive() {
        assert!(Key::Char('Z').matches(Key::Char('z')));
        assert!(!Key::Char('z').matches(Key::Char('y')));
        assert!(Key::Escape.matches(Key::Escape));
    }

    #[test]
    fn test_with_modifiers() {
        let event = PointerEvent::down(1.0, 2.0).with_modifiers(Modifiers::shift());
        match event {
            PointerEvent::Down { modifiers, .. } => assert!(modifiers.shift),
            _ => panic!("expected Down"),
        }
        assert_eq!(event.position(), Point::new(1.0, 2.0));
    }
}
