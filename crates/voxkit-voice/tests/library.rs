//! Discovery, resolution and custom import against temporary asset roots.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use voxkit_core::paths::voice_files;
use voxkit_core::{AssetPaths, FilePicker, VoiceSource};
use voxkit_voice::{CUSTOM_PREFIX, LibraryError, VoiceLibrary};

fn setup() -> (TempDir, VoiceLibrary) {
    let dir = TempDir::new().unwrap();
    let library = VoiceLibrary::new(AssetPaths::with_root(dir.path()));
    (dir, library)
}

fn install(dir: &Path, key: &str) -> (PathBuf, PathBuf) {
    std::fs::create_dir_all(dir).unwrap();
    let (model, config) = voice_files(dir, key);
    std::fs::write(&model, b"onnx").unwrap();
    std::fs::write(&config, b"{}").unwrap();
    (model, config)
}

struct FixedPicker(Option<PathBuf>);

impl FilePicker for FixedPicker {
    fn pick_file(&self, _title: &str, _extensions: &[&str]) -> Option<PathBuf> {
        self.0.clone()
    }
}

#[tokio::test]
async fn resolves_only_while_both_files_exist() {
    let (_dir, library) = setup();
    let downloaded = library.paths().downloaded_voices_dir();

    let (model, config) = install(&downloaded, "en_US-amy-medium");
    let paths = library.resolve("en_US-amy-medium").await.unwrap();
    assert_eq!(paths.model, model);
    assert_eq!(paths.config, config);

    std::fs::remove_file(&config).unwrap();
    assert!(library.resolve("en_US-amy-medium").await.is_none());

    std::fs::write(&config, b"{}").unwrap();
    std::fs::remove_file(&model).unwrap();
    assert!(library.resolve("en_US-amy-medium").await.is_none());
}

#[tokio::test]
async fn bundled_wins_over_downloaded() {
    let (_dir, library) = setup();
    let (bundled_model, _) = install(&library.paths().bundled_voices_dir(), "en_US-amy-medium");
    install(&library.paths().downloaded_voices_dir(), "en_US-amy-medium");

    let paths = library.resolve("en_US-amy-medium").await.unwrap();
    assert_eq!(paths.model, bundled_model);
}

#[tokio::test]
async fn custom_prefix_only_searches_custom_dir() {
    let (_dir, library) = setup();
    install(&library.paths().downloaded_voices_dir(), "narrator");
    assert!(library.resolve("custom:narrator").await.is_none());

    install(&library.paths().custom_voices_dir(), "narrator");
    assert!(library.resolve("custom:narrator").await.is_some());
    assert!(library.resolve("custom:../voices/narrator").await.is_none());
}

#[tokio::test]
async fn lists_namespaces_in_scan_order() {
    let (_dir, library) = setup();
    let paths = library.paths().clone();
    install(&paths.downloaded_voices_dir(), "zz_ZZ-other-low");
    install(&paths.downloaded_voices_dir(), "en_US-lessac-medium");
    install(&paths.bundled_voices_dir(), "en_US-amy-medium");
    install(&paths.custom_voices_dir(), "grandpa");
    std::fs::write(
        paths.custom_metadata_path(),
        r#"{"voices":{"grandpa":{"displayName":"Grandpa Joe","addedAt":"2024-01-01T00:00:00Z"}}}"#,
    )
    .unwrap();
    // Half-installed voices are invisible
    std::fs::write(paths.downloaded_voices_dir().join("broken.onnx"), b"x").unwrap();

    let voices = library.list_installed().await.unwrap();
    let summary: Vec<_> = voices
        .iter()
        .map(|v| (v.key.as_str(), v.source, v.name.as_str()))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("en_US-amy-medium", VoiceSource::Builtin, "Amy (US English)"),
            ("en_US-lessac-medium", VoiceSource::Downloaded, "Lessac (US English)"),
            ("zz_ZZ-other-low", VoiceSource::Downloaded, "zz_ZZ-other-low"),
            ("custom:grandpa", VoiceSource::Custom, "Grandpa Joe"),
        ]
    );
    assert_eq!(voices[2].quality.as_deref(), Some("low"));
    assert_eq!(voices[2].language.as_deref(), Some("zz_ZZ"));
}

#[tokio::test]
async fn fallback_uses_first_installed_voice() {
    let (_dir, library) = setup();
    install(&library.paths().downloaded_voices_dir(), "en_GB-alan-medium");

    let exact = library.resolve_or_fallback("en_GB-alan-medium").await.unwrap();
    assert_eq!(exact.key, "en_GB-alan-medium");

    let fallback = library.resolve_or_fallback("missing-voice").await.unwrap();
    assert_eq!(fallback.key, "en_GB-alan-medium");
}

#[tokio::test]
async fn fallback_with_nothing_installed_is_terminal() {
    let (_dir, library) = setup();
    let err = library.resolve_or_fallback("missing-voice").await.unwrap_err();
    assert!(matches!(err, LibraryError::NoVoicesInstalled));
    assert_eq!(err.to_string(), "No voices installed");
}

#[tokio::test]
async fn import_copies_files_and_records_name() {
    let (dir, library) = setup();
    let source = dir.path().join("incoming");
    let (model, _) = install(&source, "my-voice");

    let voice = library
        .import_custom(&model, Some("  My Voice  "))
        .await
        .unwrap();
    assert_eq!(voice.key, format!("{CUSTOM_PREFIX}my-voice"));
    assert_eq!(voice.name, "My Voice");
    assert_eq!(voice.source, VoiceSource::Custom);

    assert!(library.resolve("custom:my-voice").await.is_some());
    let metadata = library.read_metadata().await.unwrap();
    assert_eq!(metadata.voices["my-voice"].display_name, "My Voice");
    // Original stays where it was
    assert!(model.exists());
}

#[tokio::test]
async fn import_requires_companion_config() {
    let (dir, library) = setup();
    let model = dir.path().join("lonely.onnx");
    std::fs::write(&model, b"onnx").unwrap();

    let err = library.import_custom(&model, None).await.unwrap_err();
    assert!(matches!(err, LibraryError::MissingConfig(_)));

    let not_model = dir.path().join("notes.txt");
    std::fs::write(&not_model, b"hi").unwrap();
    let err = library.import_custom(&not_model, None).await.unwrap_err();
    assert!(matches!(err, LibraryError::NotAModel(_)));
}

#[tokio::test]
async fn picker_cancel_imports_nothing() {
    let (dir, library) = setup();
    assert!(
        library
            .import_with_picker(&FixedPicker(None), None)
            .await
            .unwrap()
            .is_none()
    );

    let (model, _) = install(&dir.path().join("incoming"), "picked");
    let voice = library
        .import_with_picker(&FixedPicker(Some(model)), None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(voice.name, "picked");
}

#[tokio::test]
async fn remove_custom_deletes_files_and_metadata() {
    let (dir, library) = setup();
    let (model, _) = install(&dir.path().join("incoming"), "temp");
    library.import_custom(&model, Some("Temp")).await.unwrap();

    library.remove_custom("custom:temp").await.unwrap();
    assert!(library.resolve("custom:temp").await.is_none());
    assert!(library.read_metadata().await.unwrap().voices.is_empty());

    assert!(matches!(
        library.remove_custom("custom:temp").await,
        Err(LibraryError::NotFound(_))
    ));
}

#[tokio::test]
async fn remove_downloaded_only_touches_download_dir() {
    let (_dir, library) = setup();
    install(&library.paths().bundled_voices_dir(), "en_US-amy-medium");

    assert!(matches!(
        library.remove_downloaded("en_US-amy-medium").await,
        Err(LibraryError::NotFound(_))
    ));
    assert!(library.resolve("en_US-amy-medium").await.is_some());

    install(&library.paths().downloaded_voices_dir(), "en_US-ryan-high");
    library.remove_downloaded("en_US-ryan-high").await.unwrap();
    assert!(library.resolve("en_US-ryan-high").await.is_none());
    assert!(matches!(
        library.remove_downloaded("../escape").await,
        Err(LibraryError::InvalidKey(_))
    ));
}

#[tokio::test]
async fn failed_config_copy_removes_imported_model() {
    let (dir, library) = setup();
    let (model, _config) = install(&dir.path().join("incoming"), "narrator");

    // A directory squatting on the config name makes the second copy fail
    let custom = library.paths().custom_voices_dir();
    let (dest_model, dest_config) = voice_files(&custom, "narrator");
    std::fs::create_dir_all(&dest_config).unwrap();

    let err = library.import_custom(&model, None).await.unwrap_err();
    assert!(matches!(err, LibraryError::Io { .. }), "{err:?}");
    assert!(!dest_model.exists());
}
