//! Pluggable per-frame behaviour
//!
//! The frame loop owns the buffers and devices; everything an actual game or
//! simulation decides goes through [`FrameHandler`]. Only `render` is
//! required. The default sample generator is the configured sine tone.

use crate::audio::ToneParams;
use crate::graphics::FrameBuffer;
use crate::input::{ActionEvent, GamepadButton, GamepadState, Vibration};

/// Returned from action handling to keep going or to request termination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopControl {
    #[default]
    Continue,
    Exit,
}

pub trait FrameHandler {
    /// A key or controller button changed state
    ///
    /// No bindings exist by default.
    fn on_action(&mut self, event: ActionEvent) -> LoopControl {
        let _ = event;
        LoopControl::Continue
    }

    /// State of a connected controller, once per slot per frame
    fn on_controller(&mut self, slot: usize, pad: &GamepadState) {
        let _ = (slot, pad);
    }

    /// Rumble request for this frame: which slot and how hard
    fn vibration(&self) -> Option<(usize, Vibration)> {
        None
    }

    /// Regenerate the whole framebuffer
    fn render(&mut self, buffer: &mut FrameBuffer);

    /// Amplitude for an absolute sample index
    ///
    /// Must depend on `sample_index` only: the loop may ask for any index in any
    /// frame and expects the same answer each time.
    fn sample(&self, tone: &ToneParams, sample_index: u64) -> i16 {
        tone.amplitude(sample_index)
    }

    /// Called after presentation, last thing in the frame
    fn end_frame(&mut self) {}
}

/// The template's demo: a scrolling gradient and a steady tone
///
/// The gradient scrolls one pixel right per frame; holding A on any
/// controller also scrolls it two pixels down per frame.
#[derive(Debug, Default)]
pub struct TestPattern {
    x_offset: u32,
    y_offset: u32,
    rumble: bool,
}

/// Motor speed used by the rumble demo
pub const DEMO_MOTOR_SPEED: u16 = 60000;

impl TestPattern {
    pub fn new(rumble: bool) -> Self {
        Self {
            rumble,
            ..Default::default()
        }
    }

    pub fn offsets(&self) -> (u32, u32) {
        (self.x_offset, self.y_offset)
    }
}

impl FrameHandler for TestPattern {
    fn on_controller(&mut self, _slot: usize, pad: &GamepadState) {
        if pad.is_down(GamepadButton::A) {
            self.y_offset = self.y_offset.wrapping_add(2);
        }
    }

    fn vibration(&self) -> Option<(usize, Vibration)> {
        self.rumble.then_some((
            0,
            Vibration {
                left_motor: DEMO_MOTOR_SPEED,
                right_motor: DEMO_MOTOR_SPEED,
            },
        ))
    }

    fn render(&mut self, buffer: &mut FrameBuffer) {
        buffer.fill_test_pattern(self.x_offset, self.y_offset);
    }

    fn end_frame(&mut self) {
        self.x_offset = self.x_offset.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_scrolls_horizontally_each_frame() {
        let mut app = TestPattern::new(false);
        app.end_frame();
        app.end_frame();
        assert_eq!(app.offsets(), (2, 0));
    }

    #[test]
    fn test_a_button_scrolls_vertically() {
        let mut app = TestPattern::new(false);
        app.on_controller(0, &GamepadState::default().with_button(GamepadButton::A));
        app.on_controller(1, &GamepadState::default().with_button(GamepadButton::B));
        assert_eq!(app.offsets(), (0, 2));
    }

    #[test]
    fn test_rumble_is_opt_in() {
        assert_eq!(TestPattern::new(false).vibration(), None);
        let (slot, vibration) = TestPattern::new(true).vibration().unwrap();
        assert_eq!(slot, 0);
        assert_eq!(vibration.left_motor, DEMO_MOTOR_SPEED);
        assert_eq!(vibration.right_motor, DEMO_MOTOR_SPEED);
    }

    #[test]
    fn test_render_uses_offsets() {
        let mut app = TestPattern::new(false);
        app.end_frame();
        let mut buffer = FrameBuffer::new(4, 1).unwrap();
        app.render(&mut buffer);
        assert_eq!(buffer.pixels()[0], 0x0001_0000);
    }

    #[test]
    fn test_default_sample_is_the_tone() {
        let app = TestPattern::default();
        let tone = ToneParams::default();
        assert_eq!(app.sample(&tone, 45), tone.amplitude(45));
    }
}
