//! Hardware endpoints of one-shot sensors
//!
//! - [`LatchedInput`]: readiness descriptor carrying a latched boolean
//!   (`'0'` = idle, anything else = fired)
//! - [`ArmAttribute`]: textual enable attribute toggled between an armed
//!   and a quiescent value

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use std::path::{Path, PathBuf};

use contracts::ArmConfig;
use mio::Interest;
use tracing::debug;

/// Readable boolean byte source
#[derive(Debug)]
pub struct LatchedInput {
    file: File,
    interest: Interest,
    rewind: bool,
}

impl LatchedInput {
    /// Open an attribute file (sysfs style)
    ///
    /// Attribute changes are signalled as priority data, and every read
    /// starts from offset 0.
    pub fn open_attribute(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).open(path.as_ref())?;
        Ok(Self {
            file,
            interest: attribute_interest(),
            rewind: true,
        })
    }

    /// Wrap an already open descriptor
    ///
    /// Use `rewind = false` for stream-like sources (pipes, sockets) that
    /// cannot seek.
    pub fn from_fd(fd: OwnedFd, interest: Interest, rewind: bool) -> Self {
        Self {
            file: File::from(fd),
            interest,
            rewind,
        }
    }

    /// Stream-like source (pipe, socket) signalled by readability
    pub fn readable(fd: OwnedFd) -> Self {
        Self::from_fd(fd, Interest::READABLE, false)
    }

    /// Readiness interest to register the descriptor with
    pub fn interest(&self) -> Interest {
        self.interest
    }

    /// Read the latched value
    ///
    /// An empty read counts as not fired.
    pub fn read_latched(&mut self) -> io::Result<bool> {
        if self.rewind {
            self.file.seek(SeekFrom::Start(0))?;
        }

        let mut byte = [0u8; 1];
        let n = self.file.read(&mut byte)?;
        Ok(n == 1 && byte[0] != b'0')
    }
}

impl AsRawFd for LatchedInput {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn attribute_interest() -> Interest {
    Interest::PRIORITY
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn attribute_interest() -> Interest {
    Interest::READABLE
}

/// Hardware enable attribute
///
/// Several sensors may point at the same attribute; writes are not
/// coordinated between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmAttribute {
    path: PathBuf,
    armed: String,
    quiescent: String,
}

impl ArmAttribute {
    pub fn new(
        path: impl Into<PathBuf>,
        armed: impl Into<String>,
        quiescent: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            armed: armed.into(),
            quiescent: quiescent.into(),
        }
    }

    pub fn from_config(config: &ArmConfig) -> Self {
        Self::new(
            config.path.clone(),
            config.armed_value.clone(),
            config.quiescent_value.clone(),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the armed value if the attribute is currently quiescent
    ///
    /// Returns whether a write happened.
    pub fn arm(&self) -> io::Result<bool> {
        if self.current().as_deref() == Some(self.quiescent.as_str()) {
            self.write(&self.armed)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Write the quiescent value if the attribute is armed (or unreadable)
    ///
    /// Returns whether a write happened.
    pub fn quiesce(&self) -> io::Result<bool> {
        match self.current() {
            Some(value) if value != self.armed => Ok(false),
            _ => {
                self.write(&self.quiescent)?;
                Ok(true)
            }
        }
    }

    fn current(&self) -> Option<String> {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|s| s.split_whitespace().next().map(str::to_string))
    }

    fn write(&self, value: &str) -> io::Result<()> {
        debug!(path = %self.path.display(), value, "writing arm attribute");
        fs::write(&self.path, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn attr_with(value: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("enabled");
        fs::write(&path, value).unwrap();
        (dir, path)
    }

    #[test]
    fn test_read_latched_rewinds() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "1\n").unwrap();

        let mut input = LatchedInput::open_attribute(file.path()).unwrap();
        assert!(input.read_latched().unwrap());
        // second read sees the same byte again
        assert!(input.read_latched().unwrap());
    }

    #[test]
    fn test_read_latched_zero_is_idle() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "0\n").unwrap();

        let mut input = LatchedInput::open_attribute(file.path()).unwrap();
        assert!(!input.read_latched().unwrap());
    }

    #[test]
    fn test_read_latched_empty_is_idle() {
        let file = NamedTempFile::new().unwrap();
        let mut input = LatchedInput::open_attribute(file.path()).unwrap();
        assert!(!input.read_latched().unwrap());
    }

    #[test]
    fn test_open_missing_attribute_fails() {
        let dir = TempDir::new().unwrap();
        assert!(LatchedInput::open_attribute(dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_arm_from_quiescent() {
        let (_dir, path) = attr_with("1\n");
        let attr = ArmAttribute::new(&path, "0", "1");

        assert!(attr.arm().unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "0");
        // already armed
        assert!(!attr.arm().unwrap());
    }

    #[test]
    fn test_quiesce_from_armed() {
        let (_dir, path) = attr_with("0");
        let attr = ArmAttribute::new(&path, "0", "1");

        assert!(attr.quiesce().unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "1");
        assert!(!attr.quiesce().unwrap());
    }

    #[test]
    fn test_missing_attribute_counts_as_armed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("enabled");
        let attr = ArmAttribute::new(&path, "0", "1");

        assert!(!attr.arm().unwrap());
        assert!(attr.quiesce().unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "1");
    }

    #[test]
    fn test_from_config() {
        let config = ArmConfig {
            path: PathBuf::from("/sys/touch/enabled"),
            armed_value: "on".into(),
            quiescent_value: "off".into(),
        };
        let attr = ArmAttribute::from_config(&config);
        assert_eq!(attr.path(), Path::new("/sys/touch/enabled"));
        assert_eq!(attr, ArmAttribute::new("/sys/touch/enabled", "on", "off"));
    }
}
