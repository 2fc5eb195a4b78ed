//! Error taxonomy shared by every subsystem.
//!
//! Three kinds of failure exist:
//!
//! - **Setup**: window, audio device or library acquisition failed before the
//!   loop started. Fatal; the loop is never entered.
//! - **TransientIo**: a per-frame device call failed (cursor query, region
//!   lock, present). The subsystem is skipped for the current frame only.
//! - **OutOfMemory**: a buffer reallocation could not be satisfied. Fatal.

/// Which part of the platform layer produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsystem {
    Window,
    Audio,
    Input,
    Haptics,
    Video,
    Config,
}

impl std::fmt::Display for Subsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Subsystem::Window => "window",
            Subsystem::Audio => "audio",
            Subsystem::Input => "input",
            Subsystem::Haptics => "haptics",
            Subsystem::Video => "video",
            Subsystem::Config => "config",
        };
        f.write_str(name)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{subsystem} setup failed: {reason}")]
    Setup { subsystem: Subsystem, reason: String },

    #[error("{subsystem} I/O failed this frame: {reason}")]
    TransientIo { subsystem: Subsystem, reason: String },

    #[error("out of memory allocating {bytes} bytes for {what}")]
    OutOfMemory { what: &'static str, bytes: usize },
}

impl Error {
    pub fn setup(subsystem: Subsystem, reason: impl Into<String>) -> Self {
        Error::Setup {
            subsystem,
            reason: reason.into(),
        }
    }

    pub fn transient(subsystem: Subsystem, reason: impl Into<String>) -> Self {
        Error::TransientIo {
            subsystem,
            reason: reason.into(),
        }
    }

    /// Fatal errors end the process; transient ones only cost a frame.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::TransientIo { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatality() {
        assert!(Error::setup(Subsystem::Window, "no display").is_fatal());
        assert!(Error::OutOfMemory {
            what: "framebuffer",
            bytes: 16
        }
        .is_fatal());
        assert!(!Error::transient(Subsystem::Audio, "cursor query").is_fatal());
    }

    #[test]
    fn test_display_names_subsystem() {
        let err = Error::transient(Subsystem::Audio, "lock refused");
        assert_eq!(err.to_string(), "audio I/O failed this frame: lock refused");

        let err = Error::setup(Subsystem::Window, "no display");
        assert_eq!(err.to_string(), "window setup failed: no display");
    }
}
