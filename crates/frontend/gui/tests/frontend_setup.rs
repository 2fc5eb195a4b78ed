//! Settings feed the frame loop the same way the binary wires it, with
//! in-memory devices standing in for the window and the sound card.

use framekit_core::audio::MemoryDevice;
use framekit_core::graphics::FrameBuffer;
use framekit_core::input::{Controllers, NullInput};
use framekit_core::logging::{log, LogCategory, LogConfig};
use framekit_core::platform::{Platform, PlatformEvent, PresentationSurface};
use framekit_core::{LoopState, MainLoop, Result, TestPattern};
use framekit_gui::settings::Settings;
use log::{Level, LevelFilter};

struct HeadlessWindow {
    size: (usize, usize),
    close_after: usize,
    drained: usize,
    presented: Vec<(usize, usize)>,
}

impl Platform for HeadlessWindow {
    fn drain_events(&mut self, events: &mut Vec<PlatformEvent>) {
        self.drained += 1;
        if self.drained > self.close_after {
            events.push(PlatformEvent::CloseRequested);
        }
    }

    fn client_size(&self) -> (usize, usize) {
        self.size
    }

    fn name(&self) -> &str {
        "headless"
    }
}

impl PresentationSurface for HeadlessWindow {
    fn present(&mut self, buffer: &FrameBuffer, _w: usize, _h: usize) -> Result<()> {
        self.presented.push((buffer.width(), buffer.height()));
        Ok(())
    }
}

fn build(
    settings: &Settings,
    close_after: usize,
) -> MainLoop<HeadlessWindow, MemoryDevice, Box<dyn Controllers>, TestPattern> {
    let ring = framekit_gui::create_ring(settings).unwrap();
    let device = MemoryDevice::new(ring.capacity()).unwrap();
    let window = HeadlessWindow {
        size: (settings.window.width, settings.window.height),
        close_after,
        drained: 0,
        presented: Vec::new(),
    };
    let controllers: Box<dyn Controllers> = Box::new(NullInput);
    MainLoop::new(
        window,
        device,
        controllers,
        TestPattern::new(settings.input.rumble),
        framekit_gui::create_framebuffer(settings).unwrap(),
        ring,
        framekit_gui::loop_options(settings),
    )
    .unwrap()
}

#[test]
fn default_settings_run_until_closed() {
    let settings = Settings::default();
    let mut ml = build(&settings, 3);
    ml.start_audio().unwrap();

    let stats = ml.run(None).unwrap();
    assert_eq!(stats.frames, 3);
    assert_eq!(ml.state(), LoopState::Stopped);
    assert_eq!(ml.window().presented, vec![(1280, 720); 3]);
    assert_eq!(ml.ring().capacity(), 48_000 * 4);
    assert!(ml.audio().is_playing());
}

#[test]
fn saved_settings_shape_the_loop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let mut settings = Settings::default();
    settings.window.width = 640;
    settings.window.height = 360;
    settings.buffer.follow_window = true;
    settings.audio.samples_per_second = 22_050;
    settings.input.controller_slots = 2;
    settings.save_to(&path).unwrap();

    let loaded = Settings::load_from(&path);
    loaded.validate().unwrap();
    let options = framekit_gui::loop_options(&loaded);
    assert_eq!(options.controller_slots, 2);
    assert!(options.follow_window);

    let mut ml = build(&loaded, 1);
    assert_eq!(ml.framebuffer().width(), 640);
    assert_eq!(ml.ring().capacity(), 22_050 * 4);

    ml.window_mut().size = (800, 450);
    ml.run(None).unwrap();
    assert_eq!(ml.window().presented, vec![(800, 450)]);
}

#[test]
fn frame_limit_stops_the_loop() {
    let mut ml = build(&Settings::default(), usize::MAX);
    let stats = ml.run(Some(10)).unwrap();
    assert_eq!(stats.frames, 10);
    assert_eq!(ml.handler().offsets(), (10, 0));
}

#[test]
fn category_levels_gate_messages() {
    let config = LogConfig::global();
    config.set_level(LogCategory::Audio, LevelFilter::Error);
    assert!(!config.should_log(LogCategory::Audio, Level::Warn));
    assert!(config.should_log(LogCategory::Audio, Level::Error));

    // Disabled messages are never formatted
    let mut formatted = false;
    log(LogCategory::Audio, Level::Debug, || {
        formatted = true;
        String::new()
    });
    assert!(!formatted);

    config.set_level(LogCategory::Audio, LevelFilter::Off);
}
