//! Piper release platforms.

use std::fmt;

use crate::error::InstallError;

/// Release tag the installer downloads from.
pub const PIPER_RELEASE: &str = "2023.11.14-2";

/// Base URL of Piper release assets.
pub const PIPER_RELEASE_BASE: &str = "https://github.com/rhasspy/piper/releases/download";

/// A platform Piper publishes prebuilt binaries for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PiperPlatform {
    LinuxX86_64,
    LinuxAarch64,
    LinuxArmv7l,
    MacosX86_64,
    MacosAarch64,
    WindowsX86_64,
}

impl PiperPlatform {
    pub const ALL: [Self; 6] = [
        Self::LinuxX86_64,
        Self::LinuxAarch64,
        Self::LinuxArmv7l,
        Self::MacosX86_64,
        Self::MacosAarch64,
        Self::WindowsX86_64,
    ];

    /// Parse an identifier such as `linux-x86_64`.
    pub fn parse(id: &str) -> Result<Self, InstallError> {
        Self::ALL
            .into_iter()
            .find(|p| p.id() == id)
            .ok_or_else(|| InstallError::UnsupportedPlatform(id.to_string()))
    }

    /// Platform of the running binary, if Piper supports it.
    pub fn current() -> Result<Self, InstallError> {
        Self::parse(&current_platform_id())
    }

    pub const fn id(self) -> &'static str {
        match self {
            Self::LinuxX86_64 => "linux-x86_64",
            Self::LinuxAarch64 => "linux-aarch64",
            Self::LinuxArmv7l => "linux-armv7l",
            Self::MacosX86_64 => "macos-x86_64",
            Self::MacosAarch64 => "macos-aarch64",
            Self::WindowsX86_64 => "windows-x86_64",
        }
    }

    /// Asset name in the release.
    pub const fn archive_name(self) -> &'static str {
        match self {
            Self::LinuxX86_64 => "piper_linux_x86_64.tar.gz",
            Self::LinuxAarch64 => "piper_linux_aarch64.tar.gz",
            Self::LinuxArmv7l => "piper_linux_armv7l.tar.gz",
            Self::MacosX86_64 => "piper_macos_x64.tar.gz",
            Self::MacosAarch64 => "piper_macos_aarch64.tar.gz",
            Self::WindowsX86_64 => "piper_windows_amd64.zip",
        }
    }

    /// Download URL under `base`.
    pub fn archive_url(self, base: &str) -> String {
        format!(
            "{}/{PIPER_RELEASE}/{}",
            base.trim_end_matches('/'),
            self.archive_name()
        )
    }
}

impl fmt::Display for PiperPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// `<os>-<arch>` of the running binary, in Piper's naming.
pub fn current_platform_id() -> String {
    let os = match std::env::consts::OS {
        "macos" => "macos",
        "windows" => "windows",
        other => other,
    };
    let arch = match std::env::consts::ARCH {
        "arm" => "armv7l",
        other => other,
    };
    format!("{os}-{arch}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_supported_identifier() {
        for platform in PiperPlatform::ALL {
            assert_eq!(PiperPlatform::parse(platform.id()).unwrap(), platform);
        }
    }

    #[test]
    fn unsupported_identifier_names_the_platform() {
        let err = PiperPlatform::parse("freebsd-riscv64").unwrap_err();
        assert!(err.to_string().contains("freebsd-riscv64"));
    }

    #[test]
    fn archive_urls() {
        assert_eq!(
            PiperPlatform::WindowsX86_64.archive_url(PIPER_RELEASE_BASE),
            "https://github.com/rhasspy/piper/releases/download/2023.11.14-2/piper_windows_amd64.zip"
        );
        assert_eq!(
            PiperPlatform::MacosAarch64.archive_url("http://localhost:1234/"),
            "http://localhost:1234/2023.11.14-2/piper_macos_aarch64.tar.gz"
        );
    }
}
