//! Deterministic on-disk layout for every managed asset class.
//!
//! `AssetPaths` is a pure value: every method derives a location from the
//! fixed roots plus an asset key and performs no I/O. Callers create
//! directories explicitly with [`super::ensure_directory`].

use std::fmt;
use std::path::{Path, PathBuf};

use super::error::PathError;
use super::platform::{data_root, resource_root};

/// File extension of Piper voice models.
pub const VOICE_MODEL_EXT: &str = "onnx";

/// Sidecar file holding display metadata for imported voices.
pub const CUSTOM_METADATA_FILE: &str = "custom-voices.json";

/// Per-clone metadata file inside each XTTS voice directory.
pub const XTTS_METADATA_FILE: &str = "voice.json";

/// Reference recording inside each XTTS voice directory.
pub const XTTS_REFERENCE_FILE: &str = "reference.wav";

#[cfg(target_os = "windows")]
const PIPER_BINARY: &str = "piper.exe";
#[cfg(not(target_os = "windows"))]
const PIPER_BINARY: &str = "piper";

/// Resolved roots for all voxkit assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    root: PathBuf,
    bundled: PathBuf,
}

impl AssetPaths {
    /// Build paths from explicit roots.
    pub fn new(root: impl Into<PathBuf>, bundled: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            bundled: bundled.into(),
        }
    }

    /// Build paths with the bundled resources nested under `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let bundled = root.join("bundled");
        Self { root, bundled }
    }

    /// Resolve roots from the environment (see [`data_root`] and [`resource_root`]).
    pub fn from_env() -> Result<Self, PathError> {
        Ok(Self::new(data_root()?, resource_root()?))
    }

    /// The data root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The bundled resource root.
    pub fn bundled_root(&self) -> &Path {
        &self.bundled
    }

    // ── Piper engine ───────────────────────────────────────────────

    /// `<root>/piper`
    pub fn piper_dir(&self) -> PathBuf {
        self.root.join("piper")
    }

    /// Directory release archives are downloaded to and extracted into.
    pub fn piper_bin_dir(&self) -> PathBuf {
        self.piper_dir().join("bin")
    }

    /// Executable location inside an extracted release archive.
    pub fn piper_primary_binary(&self) -> PathBuf {
        self.piper_bin_dir().join("piper").join(PIPER_BINARY)
    }

    /// Executable placed directly in the extraction directory.
    pub fn piper_secondary_binary(&self) -> PathBuf {
        self.piper_bin_dir().join(PIPER_BINARY)
    }

    // ── Piper voices ───────────────────────────────────────────────

    /// Voices shipped with the application.
    pub fn bundled_voices_dir(&self) -> PathBuf {
        self.bundled.join("voices")
    }

    /// Voices downloaded from the remote catalog.
    pub fn downloaded_voices_dir(&self) -> PathBuf {
        self.piper_dir().join("voices")
    }

    /// Voices imported by the user.
    pub fn custom_voices_dir(&self) -> PathBuf {
        self.piper_dir().join("custom-voices")
    }

    /// Metadata sidecar for imported voices.
    pub fn custom_metadata_path(&self) -> PathBuf {
        self.custom_voices_dir().join(CUSTOM_METADATA_FILE)
    }

    // ── Whisper ────────────────────────────────────────────────────

    /// Directory holding whisper.cpp GGML models.
    pub fn whisper_models_dir(&self) -> PathBuf {
        self.root.join("whisper").join("models")
    }

    /// Path of a whisper model file (`ggml-<key>.bin`).
    pub fn whisper_model_path(&self, key: &str) -> PathBuf {
        self.whisper_models_dir().join(format!("ggml-{key}.bin"))
    }

    // ── XTTS clones ────────────────────────────────────────────────

    /// `<root>/xtts`
    pub fn xtts_dir(&self) -> PathBuf {
        self.root.join("xtts")
    }

    /// Directory containing one sub-directory per cloned voice.
    pub fn xtts_voices_dir(&self) -> PathBuf {
        self.xtts_dir().join("voices")
    }

    /// Directory of one cloned voice.
    pub fn xtts_voice_dir(&self, id: &str) -> PathBuf {
        self.xtts_voices_dir().join(id)
    }

    // ── Settings & logs ────────────────────────────────────────────

    /// Persisted settings file.
    pub fn settings_path(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    /// Directory for log files.
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Main log file. The CLI rotates it daily as `voxkit.log.<date>`.
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join("voxkit.log")
    }
}

/// Model and config file names for a Piper voice inside `dir`.
///
/// Returns `(<key>.onnx, <key>.onnx.json)`.
pub fn voice_files(dir: &Path, key: &str) -> (PathBuf, PathBuf) {
    let model = dir.join(format!("{key}.{VOICE_MODEL_EXT}"));
    let config = dir.join(format!("{key}.{VOICE_MODEL_EXT}.json"));
    (model, config)
}

/// Whether `key` can be used as a single path component.
///
/// Keys are joined onto asset directories, so separators and parent
/// references would let one asset class escape into another.
pub fn is_valid_asset_key(key: &str) -> bool {
    !key.is_empty()
        && key != "."
        && key != ".."
        && !key.contains(['/', '\\', '\0'])
        && !key.starts_with('.')
}

impl fmt::Display for AssetPaths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "data_root = {}", self.root.display())?;
        writeln!(f, "bundled_root = {}", self.bundled.display())?;
        writeln!(f, "piper_binary = {}", self.piper_primary_binary().display())?;
        writeln!(f, "downloaded_voices = {}", self.downloaded_voices_dir().display())?;
        writeln!(f, "custom_voices = {}", self.custom_voices_dir().display())?;
        writeln!(f, "whisper_models = {}", self.whisper_models_dir().display())?;
        writeln!(f, "xtts_voices = {}", self.xtts_voices_dir().display())?;
        writeln!(f, "settings = {}", self.settings_path().display())?;
        write!(f, "log_file = {}", self.log_file().display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_deterministic() {
        let a = AssetPaths::with_root("/data/voxkit");
        let b = AssetPaths::with_root("/data/voxkit");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn asset_classes_do_not_collide() {
        let paths = AssetPaths::with_root("/data/voxkit");
        let dirs = [
            paths.piper_bin_dir(),
            paths.bundled_voices_dir(),
            paths.downloaded_voices_dir(),
            paths.custom_voices_dir(),
            paths.whisper_models_dir(),
            paths.xtts_voices_dir(),
            paths.logs_dir(),
        ];
        for (i, a) in dirs.iter().enumerate() {
            for b in dirs.iter().skip(i + 1) {
                assert!(!a.starts_with(b) && !b.starts_with(a), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn voice_files_follow_naming_convention() {
        let (model, config) = voice_files(Path::new("/v"), "en_US-amy-medium");
        assert_eq!(model, Path::new("/v/en_US-amy-medium.onnx"));
        assert_eq!(config, Path::new("/v/en_US-amy-medium.onnx.json"));
    }

    #[test]
    fn piper_binary_locations() {
        let paths = AssetPaths::with_root("/r");
        #[cfg(not(target_os = "windows"))]
        {
            assert_eq!(paths.piper_primary_binary(), Path::new("/r/piper/bin/piper/piper"));
            assert_eq!(paths.piper_secondary_binary(), Path::new("/r/piper/bin/piper"));
        }
    }

    #[test]
    fn whisper_model_path_uses_ggml_prefix() {
        let paths = AssetPaths::with_root("/r");
        assert_eq!(
            paths.whisper_model_path("base.en"),
            Path::new("/r/whisper/models/ggml-base.en.bin")
        );
    }

    #[test]
    fn rejects_keys_that_escape_their_directory() {
        assert!(is_valid_asset_key("en_US-amy-medium"));
        assert!(!is_valid_asset_key(""));
        assert!(!is_valid_asset_key(".."));
        assert!(!is_valid_asset_key("../settings"));
        assert!(!is_valid_asset_key("a/b"));
        assert!(!is_valid_asset_key("a\\b"));
        assert!(!is_valid_asset_key(".hidden"));
    }
}
