//! Window backend
//!
//! The window is both the platform event source and the presentation surface
//! of the frame loop. minifb pumps OS messages while presenting, so events are
//! reconstructed on the next drain by comparing window state against the
//! previous frame.

use framekit_core::input::Key;
use framekit_core::platform::PlatformEvent;

mod minifb_backend;

pub use minifb_backend::MinifbWindow;

/// Map a minifb key to the keys the platform layer reports
pub fn map_key(key: minifb::Key) -> Option<Key> {
    use minifb::Key as K;
    Some(match key {
        K::F1 => Key::F1,
        K::F2 => Key::F2,
        K::F3 => Key::F3,
        K::F4 => Key::F4,
        K::F5 => Key::F5,
        K::F6 => Key::F6,
        K::F7 => Key::F7,
        K::F8 => Key::F8,
        K::F9 => Key::F9,
        K::F10 => Key::F10,
        K::F11 => Key::F11,
        K::F12 => Key::F12,
        K::Key0 => Key::Key0,
        K::Key1 => Key::Key1,
        K::Key2 => Key::Key2,
        K::Key3 => Key::Key3,
        K::Key4 => Key::Key4,
        K::Key5 => Key::Key5,
        K::Key6 => Key::Key6,
        K::Key7 => Key::Key7,
        K::Key8 => Key::Key8,
        K::Key9 => Key::Key9,
        K::A => Key::A,
        K::B => Key::B,
        K::C => Key::C,
        K::D => Key::D,
        K::E => Key::E,
        K::F => Key::F,
        K::G => Key::G,
        K::H => Key::H,
        K::I => Key::I,
        K::J => Key::J,
        K::K => Key::K,
        K::L => Key::L,
        K::M => Key::M,
        K::N => Key::N,
        K::O => Key::O,
        K::P => Key::P,
        K::Q => Key::Q,
        K::R => Key::R,
        K::S => Key::S,
        K::T => Key::T,
        K::U => Key::U,
        K::V => Key::V,
        K::W => Key::W,
        K::X => Key::X,
        K::Y => Key::Y,
        K::Z => Key::Z,
        K::Up => Key::Up,
        K::Down => Key::Down,
        K::Left => Key::Left,
        K::Right => Key::Right,
        K::Escape => Key::Escape,
        K::Enter => Key::Enter,
        K::Space => Key::Space,
        K::Tab => Key::Tab,
        K::Backspace => Key::Backspace,
        K::LeftShift => Key::LeftShift,
        K::RightShift => Key::RightShift,
        K::LeftCtrl => Key::LeftCtrl,
        K::RightCtrl => Key::RightCtrl,
        K::LeftAlt => Key::LeftAlt,
        K::RightAlt => Key::RightAlt,
        _ => return None,
    })
}

/// Key events between two frames of held keys
///
/// `repeated` lists keys the OS auto-repeated this frame; those still held
/// produce a down-to-down event that carries no edge. Alt state is taken from
/// the current frame.
pub fn key_events(previous: &[Key], current: &[Key], repeated: &[Key]) -> Vec<PlatformEvent> {
    let alt_down = current.iter().any(|k| k.is_alt());
    let event = |key: Key, was_down: bool, is_down: bool| PlatformEvent::Key {
        key,
        was_down,
        is_down,
        alt_down,
    };

    let mut events = Vec::new();
    for &key in current {
        if !previous.contains(&key) {
            events.push(event(key, false, true));
        } else if repeated.contains(&key) {
            events.push(event(key, true, true));
        }
    }
    for &key in previous {
        if !current.contains(&key) {
            events.push(event(key, true, false));
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_key() {
        assert_eq!(map_key(minifb::Key::F4), Some(Key::F4));
        assert_eq!(map_key(minifb::Key::LeftAlt), Some(Key::LeftAlt));
        assert_eq!(map_key(minifb::Key::Key7), Some(Key::Key7));
        assert_eq!(map_key(minifb::Key::NumPad5), None);
    }

    #[test]
    fn test_key_events_press_and_release() {
        let events = key_events(&[Key::W], &[Key::D], &[]);
        assert_eq!(
            events,
            vec![
                PlatformEvent::Key {
                    key: Key::D,
                    was_down: false,
                    is_down: true,
                    alt_down: false
                },
                PlatformEvent::Key {
                    key: Key::W,
                    was_down: true,
                    is_down: false,
                    alt_down: false
                },
            ]
        );
    }

    #[test]
    fn test_alt_f4_is_reported_with_alt_down() {
        let events = key_events(&[Key::LeftAlt], &[Key::LeftAlt, Key::F4], &[]);
        assert_eq!(events.len(), 1);
        assert!(events[0].requests_stop());
    }

    #[test]
    fn test_held_keys_only_report_repeats() {
        assert!(key_events(&[Key::Space], &[Key::Space], &[]).is_empty());
        let events = key_events(&[Key::Space], &[Key::Space], &[Key::Space]);
        assert_eq!(
            events,
            vec![PlatformEvent::Key {
                key: Key::Space,
                was_down: true,
                is_down: true,
                alt_down: false
            }]
        );
    }
}
