//! The frame loop
//!
//! [`MainLoop`] owns every per-process resource explicitly: the window, the
//! audio device and its ring, the controller backend, the framebuffer and the
//! frame handler. Nothing is global. Each iteration of a running loop does, in
//! this order:
//!
//! 1. drain platform events, stopping on close/quit/Alt+F4 and dispatching
//!    key edges to the handler
//! 2. poll every controller slot, dispatching button edges and state
//! 3. forward the handler's rumble request (errors ignored)
//! 4. render into the framebuffer
//! 5. read the audio cursors and fill the writable part of the ring
//! 6. present the framebuffer at the current client size
//!
//! Device failures inside the loop cost at most one frame of that subsystem.
//! Only a failed framebuffer reallocation ends the loop with an error.

use crate::app::{FrameHandler, LoopControl};
use crate::audio::{AudioDevice, AudioRing};
use crate::error::{Error, Result, Subsystem};
use crate::graphics::FrameBuffer;
use crate::input::{
    detect_edge, gamepad_edges, ActionEvent, ActionInput, Controllers, GamepadState,
    MAX_CONTROLLERS,
};
use crate::logging::{log, LogCategory};
use crate::platform::{Platform, PlatformEvent, PresentationSurface};
use log::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    /// Terminal
    Stopped,
}

/// Loop behaviour that is not owned by a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopOptions {
    /// Controller slots polled per frame, clamped to `1..=MAX_CONTROLLERS`
    pub controller_slots: usize,
    /// Re-create the framebuffer at the client size whenever it changes
    /// instead of stretching a fixed-size buffer
    pub follow_window: bool,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            controller_slots: MAX_CONTROLLERS,
            follow_window: false,
        }
    }
}

/// Counters reported when the loop shuts down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Completed iterations
    pub frames: u64,
    /// Sample frames written into the ring by the loop (priming excluded)
    pub audio_frames_written: u64,
    /// Frames whose audio fill was skipped after a device failure
    pub audio_fills_skipped: u64,
    pub presents_failed: u64,
    pub buffer_reallocations: u64,
}

pub struct MainLoop<W, A, C, H>
where
    W: Platform + PresentationSurface,
    A: AudioDevice,
    C: Controllers,
    H: FrameHandler,
{
    window: W,
    audio: A,
    controllers: C,
    handler: H,
    framebuffer: FrameBuffer,
    ring: AudioRing,
    options: LoopOptions,
    state: LoopState,
    stats: FrameStats,
    /// Last snapshot per slot, for button edge detection
    pads: [Option<GamepadState>; MAX_CONTROLLERS],
    /// Reused event queue
    events: Vec<PlatformEvent>,
}

impl<W, A, C, H> MainLoop<W, A, C, H>
where
    W: Platform + PresentationSurface,
    A: AudioDevice,
    C: Controllers,
    H: FrameHandler,
{
    /// Tie the devices together; the loop starts out `Running`
    ///
    /// The ring and the device must agree on capacity.
    pub fn new(
        window: W,
        audio: A,
        controllers: C,
        handler: H,
        framebuffer: FrameBuffer,
        ring: AudioRing,
        options: LoopOptions,
    ) -> Result<Self> {
        if ring.capacity() != audio.capacity() {
            return Err(Error::setup(
                Subsystem::Audio,
                format!(
                    "ring expects {} bytes but the device holds {}",
                    ring.capacity(),
                    audio.capacity()
                ),
            ));
        }

        let options = LoopOptions {
            controller_slots: options.controller_slots.clamp(1, MAX_CONTROLLERS),
            ..options
        };

        log(LogCategory::Loop, Level::Debug, || {
            format!(
                "main loop: window={} controllers={} slots={} buffer={}x{}",
                window.name(),
                controllers.name(),
                options.controller_slots,
                framebuffer.width(),
                framebuffer.height()
            )
        });

        Ok(Self {
            window,
            audio,
            controllers,
            handler,
            framebuffer,
            ring,
            options,
            state: LoopState::Running,
            stats: FrameStats::default(),
            pads: [None; MAX_CONTROLLERS],
            events: Vec::new(),
        })
    }

    /// Fill the whole ring from offset 0 and start looping playback
    ///
    /// Called once before the first frame. Afterwards the write position equals
    /// the play cursor, so the first frame writes nothing.
    pub fn start_audio(&mut self) -> Result<()> {
        let tone = *self.ring.tone();
        let handler = &self.handler;
        let frames = self
            .ring
            .prime(&mut self.audio, |i| handler.sample(&tone, i))
            .map_err(|e| Error::setup(Subsystem::Audio, format!("priming the ring: {}", e)))?;
        self.audio.play()?;

        log(LogCategory::Audio, Level::Info, || {
            format!(
                "audio ring primed with {} frames ({} bytes, {} Hz tone at {} Hz), playing",
                frames,
                self.ring.capacity(),
                tone.tone_hz,
                tone.samples_per_second
            )
        });
        Ok(())
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn options(&self) -> LoopOptions {
        self.options
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    pub fn ring(&self) -> &AudioRing {
        &self.ring
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut W {
        &mut self.window
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn controllers_mut(&mut self) -> &mut C {
        &mut self.controllers
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Move to `Stopped`; returns false if the loop had already stopped
    pub fn stop(&mut self, reason: &str) -> bool {
        if self.state == LoopState::Stopped {
            return false;
        }
        self.state = LoopState::Stopped;
        log(LogCategory::Loop, Level::Info, || {
            format!("stopping after {} frames: {}", self.stats.frames, reason)
        });
        true
    }

    /// Run iterations until stopped, or until `max_frames` have run
    pub fn run(&mut self, max_frames: Option<u64>) -> Result<FrameStats> {
        while self.is_running() {
            if max_frames.is_some_and(|max| self.stats.frames >= max) {
                self.stop("frame limit reached");
                break;
            }
            self.run_frame()?;
        }

        let stats = self.stats;
        log(LogCategory::Loop, Level::Info, || {
            format!(
                "frames={} audio_frames={} audio_skipped={} present_failed={} reallocations={}",
                stats.frames,
                stats.audio_frames_written,
                stats.audio_fills_skipped,
                stats.presents_failed,
                stats.buffer_reallocations
            )
        });
        Ok(stats)
    }

    /// One iteration; a stopped loop does nothing
    ///
    /// A stop requested while draining events ends the iteration there. An
    /// error is only returned for fatal failures.
    pub fn run_frame(&mut self) -> Result<LoopState> {
        if !self.is_running() {
            return Ok(self.state);
        }

        self.drain_events();
        if !self.is_running() {
            return Ok(self.state);
        }

        self.poll_controllers();
        if !self.is_running() {
            return Ok(self.state);
        }

        self.drive_haptics();

        self.follow_client_size()?;
        self.handler.render(&mut self.framebuffer);

        self.fill_audio();
        self.present();

        self.handler.end_frame();
        self.stats.frames += 1;
        Ok(self.state)
    }

    fn drain_events(&mut self) {
        let mut events = std::mem::take(&mut self.events);
        events.clear();
        self.window.drain_events(&mut events);

        for event in &events {
            if event.requests_stop() {
                self.stop(stop_reason(event));
                break;
            }
            match *event {
                PlatformEvent::Key {
                    key,
                    was_down,
                    is_down,
                    ..
                } => {
                    if let Some(action) = detect_edge(ActionInput::Key(key), was_down, is_down) {
                        if self.dispatch(action) {
                            break;
                        }
                    }
                }
                PlatformEvent::Resized { width, height } => {
                    log(LogCategory::Platform, Level::Debug, || {
                        format!("client area resized to {}x{}", width, height)
                    });
                }
                PlatformEvent::Activated(active) => {
                    log(LogCategory::Platform, Level::Debug, || {
                        format!("window {}", if active { "activated" } else { "deactivated" })
                    });
                }
                _ => {}
            }
        }

        self.events = events;
    }

    /// Hand an edge to the handler; true if it asked to exit
    fn dispatch(&mut self, action: ActionEvent) -> bool {
        if self.handler.on_action(action) == LoopControl::Exit {
            self.stop("exit requested by frame handler");
            return true;
        }
        false
    }

    fn poll_controllers(&mut self) {
        self.controllers.refresh();

        for slot in 0..self.options.controller_slots {
            let current = self.controllers.poll(slot);
            let previous = self.pads[slot];
            self.pads[slot] = current;

            for action in gamepad_edges(slot, previous.as_ref(), current.as_ref()) {
                if self.dispatch(action) {
                    return;
                }
            }
            if let Some(pad) = current {
                self.handler.on_controller(slot, &pad);
            }
        }
    }

    fn drive_haptics(&mut self) {
        if let Some((slot, vibration)) = self.handler.vibration() {
            if let Err(e) = self.controllers.set_vibration(slot, vibration) {
                log(LogCategory::Input, Level::Debug, || {
                    format!("vibration on slot {} ignored: {}", slot, e)
                });
            }
        }
    }

    /// Re-create the framebuffer at the client size when following the window
    fn follow_client_size(&mut self) -> Result<()> {
        if !self.options.follow_window {
            return Ok(());
        }
        let (width, height) = self.window.client_size();
        if width == 0 || height == 0 {
            return Ok(());
        }
        if (width, height) == (self.framebuffer.width(), self.framebuffer.height()) {
            return Ok(());
        }

        if let Err(e) = self.framebuffer.resize(width, height) {
            log(LogCategory::Video, Level::Error, || e.to_string());
            self.stop("framebuffer reallocation failed");
            return Err(e);
        }
        self.stats.buffer_reallocations += 1;
        log(LogCategory::Video, Level::Debug, || {
            format!("framebuffer reallocated at {}x{}", width, height)
        });
        Ok(())
    }

    fn fill_audio(&mut self) {
        let cursors = match self.audio.cursors() {
            Ok(c) => c,
            Err(e) => return self.skip_audio(e),
        };
        let region = match self.ring.compute_writable_region(cursors.play, cursors.write) {
            Ok(r) => r,
            Err(e) => return self.skip_audio(e),
        };

        let tone = *self.ring.tone();
        let handler = &self.handler;
        match self
            .ring
            .fill_region(&mut self.audio, region, |i| handler.sample(&tone, i))
        {
            Ok(frames) => self.stats.audio_frames_written += frames as u64,
            Err(e) => self.skip_audio(e),
        }
    }

    fn skip_audio(&mut self, e: Error) {
        self.stats.audio_fills_skipped += 1;
        log(LogCategory::Audio, Level::Warn, || {
            format!("audio fill skipped this frame: {}", e)
        });
    }

    fn present(&mut self) {
        let (width, height) = self.window.client_size();
        if width == 0 || height == 0 {
            self.window.idle();
            return;
        }
        if let Err(e) = self.window.present(&self.framebuffer, width, height) {
            self.stats.presents_failed += 1;
            log(LogCategory::Video, Level::Warn, || {
                format!("present skipped this frame: {}", e)
            });
        }
    }
}

fn stop_reason(event: &PlatformEvent) -> &'static str {
    match event {
        PlatformEvent::Quit => "quit requested",
        PlatformEvent::CloseRequested => "window closed",
        PlatformEvent::Destroyed => "window destroyed",
        _ => "Alt+F4",
    }
}
