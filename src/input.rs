//! Keyboard and pointer state.
//!
//! The host feeds `InputEvent`s in as they arrive; the frame loop reads a
//! `KeyState` snapshot once per frame.  Only the five tracked keys are
//! recorded; anything else is dropped.

/// The tracked keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Backward,
    Left,
    Right,
    Fire,
}

impl Key {
    /// Map a key name (as reported by a browser-style `key` field) to a
    /// tracked key.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "w" | "W" | "ArrowUp" => Some(Key::Forward),
            "s" | "S" | "ArrowDown" => Some(Key::Backward),
            "a" | "A" | "ArrowLeft" => Some(Key::Left),
            "d" | "D" | "ArrowRight" => Some(Key::Right),
            " " | "Space" => Some(Key::Fire),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    PointerDown,
}

#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct KeyState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    /// One-shot fire request from a pointer press.  The session clears it
    /// after every frame.
    pub fire_pulse: bool,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the state.  Returns false for untracked keys.
    pub fn process_event(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::KeyDown(name) => match Key::from_name(name) {
                Some(key) => {
                    self.set(key, true);
                    true
                }
                None => false,
            },
            InputEvent::KeyUp(name) => match Key::from_name(name) {
                Some(key) => {
                    self.set(key, false);
                    true
                }
                None => false,
            },
            InputEvent::PointerDown => {
                self.fire_pulse = true;
                true
            }
        }
    }

    pub fn set(&mut self, key: Key, pressed: bool) {
        match key {
            Key::Forward => self.forward = pressed,
            Key::Backward => self.backward = pressed,
            Key::Left => self.left = pressed,
            Key::Right => self.right = pressed,
            Key::Fire => self.fire = pressed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracked_keys_toggle() {
        let mut keys = KeyState::new();
        assert!(keys.process_event(&InputEvent::KeyDown("w".into())));
        assert!(keys.forward);
        assert!(keys.process_event(&InputEvent::KeyUp("w".into())));
        assert!(!keys.forward);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut keys = KeyState::new();
        assert!(!keys.process_event(&InputEvent::KeyDown("q".into())));
        assert_eq!(keys, KeyState::default());
    }

    #[test]
    fn pointer_press_sets_pulse_not_fire() {
        let mut keys = KeyState::new();
        assert!(keys.process_event(&InputEvent::PointerDown));
        assert!(keys.fire_pulse);
        assert!(!keys.fire);
    }

    #[test]
    fn space_maps_to_fire() {
        let mut keys = KeyState::new();
        keys.process_event(&InputEvent::KeyDown(" ".into()));
        assert!(keys.fire);
        keys.set(Key::Fire, false);
        assert!(!keys.fire);
    }
}
