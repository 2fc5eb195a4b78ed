//! Gamepads through gilrs
//!
//! Pads are assigned to the lowest free slot when they connect and release it
//! when they disconnect, so a slot polls as `None` until something is plugged
//! in. Rumble uses gilrs force-feedback effects; pads without force feedback
//! silently ignore it.

use framekit_core::error::{Error, Result, Subsystem};
use framekit_core::input::{
    GamepadButton, GamepadState, Haptics, InputPoller, Vibration, MAX_CONTROLLERS,
};
use gilrs::ff::{BaseEffect, BaseEffectType, Effect, EffectBuilder, Replay, Ticks};
use gilrs::{Axis, Button, EventType, GamepadId, Gilrs};

/// Length of one rumble period; the effect repeats until replaced or dropped
const RUMBLE_PERIOD_MS: u32 = 100;

/// Slot assignment in connection order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTable<T> {
    slots: [Option<T>; MAX_CONTROLLERS],
}

impl<T: Copy + PartialEq> Default for SlotTable<T> {
    fn default() -> Self {
        Self {
            slots: [None; MAX_CONTROLLERS],
        }
    }
}

impl<T: Copy + PartialEq> SlotTable<T> {
    /// Give `id` the lowest free slot; an already assigned id keeps its slot
    pub fn assign(&mut self, id: T) -> Option<usize> {
        if let Some(slot) = self.slot_of(id) {
            return Some(slot);
        }
        let slot = self.slots.iter().position(Option::is_none)?;
        self.slots[slot] = Some(id);
        Some(slot)
    }

    pub fn release(&mut self, id: T) -> Option<usize> {
        let slot = self.slot_of(id)?;
        self.slots[slot] = None;
        Some(slot)
    }

    pub fn slot_of(&self, id: T) -> Option<usize> {
        self.slots.iter().position(|s| *s == Some(id))
    }

    pub fn id_at(&self, slot: usize) -> Option<T> {
        self.slots.get(slot).copied().flatten()
    }
}

/// Scale a gilrs axis value in `-1.0..=1.0` to the full signed 16-bit range
pub fn scale_axis(value: f32) -> i16 {
    (value.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

fn rumble_period() -> Replay {
    Replay {
        play_for: Ticks::from_ms(RUMBLE_PERIOD_MS),
        ..Default::default()
    }
}

const BUTTON_MAP: [(Button, GamepadButton); 12] = [
    (Button::DPadUp, GamepadButton::Up),
    (Button::DPadDown, GamepadButton::Down),
    (Button::DPadLeft, GamepadButton::Left),
    (Button::DPadRight, GamepadButton::Right),
    (Button::Start, GamepadButton::Start),
    (Button::Select, GamepadButton::Back),
    (Button::LeftTrigger, GamepadButton::LeftShoulder),
    (Button::RightTrigger, GamepadButton::RightShoulder),
    // Face buttons (South=A, East=B, West=X, North=Y in Xbox layout)
    (Button::South, GamepadButton::A),
    (Button::East, GamepadButton::B),
    (Button::West, GamepadButton::X),
    (Button::North, GamepadButton::Y),
];

pub struct GilrsInput {
    gilrs: Gilrs,
    slots: SlotTable<GamepadId>,
    /// Effect currently playing per slot, with the speeds it was built for
    rumble: [Option<(Vibration, Effect)>; MAX_CONTROLLERS],
}

impl GilrsInput {
    /// Initialise gilrs, or `None` when the platform has no gamepad support
    pub fn probe() -> Option<Self> {
        let gilrs = match Gilrs::new() {
            Ok(g) => g,
            Err(e) => {
                log::warn!(
                    "Failed to initialize gamepad support: {}. Gamepads will not be available.",
                    e
                );
                return None;
            }
        };

        let mut input = Self {
            gilrs,
            slots: SlotTable::default(),
            rumble: Default::default(),
        };

        let present: Vec<GamepadId> = input
            .gilrs
            .gamepads()
            .filter(|(_, pad)| pad.is_connected())
            .map(|(id, _)| id)
            .collect();
        for id in present {
            input.connect(id);
        }
        Some(input)
    }

    fn connect(&mut self, id: GamepadId) {
        match self.slots.assign(id) {
            Some(slot) => log::info!(
                "Gamepad {} ({}) connected as slot {}",
                id,
                self.gilrs.gamepad(id).name(),
                slot
            ),
            None => log::warn!("Gamepad {} connected but no free slots", id),
        }
    }

    fn disconnect(&mut self, id: GamepadId) {
        if let Some(slot) = self.slots.release(id) {
            self.rumble[slot] = None;
            log::info!("Gamepad {} (slot {}) disconnected", id, slot);
        }
    }
}

impl InputPoller for GilrsInput {
    fn refresh(&mut self) {
        while let Some(event) = self.gilrs.next_event() {
            match event.event {
                EventType::Connected => self.connect(event.id),
                EventType::Disconnected => self.disconnect(event.id),
                _ => {}
            }
        }
    }

    fn poll(&mut self, slot: usize) -> Option<GamepadState> {
        let id = self.slots.id_at(slot)?;
        let pad = self.gilrs.connected_gamepad(id)?;

        let mut state = GamepadState::new(
            scale_axis(pad.value(Axis::LeftStickX)),
            scale_axis(pad.value(Axis::LeftStickY)),
        );
        for (button, mapped) in BUTTON_MAP {
            state.set(mapped, pad.is_pressed(button));
        }
        Some(state)
    }

    fn name(&self) -> &str {
        "gilrs"
    }
}

impl Haptics for GilrsInput {
    fn set_vibration(&mut self, slot: usize, vibration: Vibration) -> Result<()> {
        let Some(id) = self.slots.id_at(slot) else {
            return Ok(());
        };
        if self.rumble[slot].as_ref().is_some_and(|(v, _)| *v == vibration) {
            return Ok(());
        }
        // Dropping the old effect stops it
        self.rumble[slot] = None;
        if vibration.is_off() || !self.gilrs.gamepad(id).is_ff_supported() {
            return Ok(());
        }

        let effect = EffectBuilder::new()
            .add_effect(BaseEffect {
                kind: BaseEffectType::Strong {
                    magnitude: vibration.left_motor,
                },
                scheduling: rumble_period(),
                ..Default::default()
            })
            .add_effect(BaseEffect {
                kind: BaseEffectType::Weak {
                    magnitude: vibration.right_motor,
                },
                scheduling: rumble_period(),
                ..Default::default()
            })
            .gamepads(&[id])
            .finish(&mut self.gilrs)
            .map_err(|e| Error::transient(Subsystem::Haptics, e.to_string()))?;
        effect
            .play()
            .map_err(|e| Error::transient(Subsystem::Haptics, e.to_string()))?;

        self.rumble[slot] = Some((vibration, effect));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_fill_lowest_first() {
        let mut table = SlotTable::default();
        assert_eq!(table.assign(10u32), Some(0));
        assert_eq!(table.assign(11), Some(1));
        assert_eq!(table.assign(10), Some(0), "reconnect keeps the slot");
        assert_eq!(table.id_at(1), Some(11));
        assert_eq!(table.id_at(2), None);
        assert_eq!(table.id_at(99), None);
    }

    #[test]
    fn test_released_slot_is_reused() {
        let mut table = SlotTable::default();
        table.assign(1u32);
        table.assign(2);
        table.assign(3);
        assert_eq!(table.release(2), Some(1));
        assert_eq!(table.id_at(1), None, "freed slot polls as disconnected");
        assert_eq!(table.release(2), None);
        assert_eq!(table.assign(4), Some(1));
    }

    #[test]
    fn test_table_full() {
        let mut table = SlotTable::default();
        for id in 0..MAX_CONTROLLERS as u32 {
            assert!(table.assign(id).is_some());
        }
        assert_eq!(table.assign(100), None);
    }

    #[test]
    fn test_scale_axis() {
        assert_eq!(scale_axis(0.0), 0);
        assert_eq!(scale_axis(1.0), i16::MAX);
        assert_eq!(scale_axis(-1.0), -i16::MAX);
        assert_eq!(scale_axis(3.0), i16::MAX, "out of range values are clamped");
        assert_eq!(scale_axis(0.5), 16384);
    }

    #[test]
    fn test_button_map_covers_every_button() {
        for button in GamepadButton::ALL {
            assert!(BUTTON_MAP.iter().any(|(_, mapped)| *mapped == button));
        }
    }
}
