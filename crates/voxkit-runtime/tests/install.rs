//! Installers against a local HTTP mirror.

#![cfg(unix)]

mod common;

use std::sync::Mutex;

use common::Sandbox;
use voxkit_core::NoopProgress;
use voxkit_download::Downloader;
use voxkit_runtime::InstallError;
use voxkit_runtime::install::{InstallSources, Installer, PIPER_RELEASE, PiperLocator};
use voxkit_voice::VoiceCatalogEntry;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn installer(sandbox: &Sandbox, server: &MockServer) -> Installer {
    Installer::new(sandbox.paths.clone(), Downloader::new().unwrap())
        .with_sources(InstallSources {
            piper_release_base: server.uri(),
            voice_files_base: format!("{}/voices", server.uri()),
            whisper_models_base: format!("{}/whisper", server.uri()),
        })
        .with_locator(PiperLocator::managed_only(sandbox.paths.clone()))
}

/// A gzipped tarball shaped like a Piper release: `piper/piper` plus a library.
fn piper_release_tarball() -> Vec<u8> {
    let mut builder = tar::Builder::new(flate2::write::GzEncoder::new(
        Vec::new(),
        flate2::Compression::default(),
    ));
    for (name, body, mode) in [
        ("piper/piper", &b"#!/bin/sh\nexit 0\n"[..], 0o644),
        ("piper/libpiper_phonemize.so.1", &b"lib"[..], 0o644),
    ] {
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(mode);
        header.set_cksum();
        builder.append_data(&mut header, name, body).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

fn catalog_entry(key: &str, model_size: u64, config_size: u64) -> VoiceCatalogEntry {
    serde_json::from_value(serde_json::json!({
        "key": key,
        "name": "amy",
        "quality": "medium",
        "files": {
            format!("en/en_US/amy/medium/{key}.onnx"): { "size_bytes": model_size, "md5_digest": "" },
            format!("en/en_US/amy/medium/{key}.onnx.json"): { "size_bytes": config_size, "md5_digest": "" },
            "en/en_US/amy/medium/MODEL_CARD": { "size_bytes": 10, "md5_digest": "" }
        }
    }))
    .unwrap()
}

#[tokio::test]
async fn unsupported_platform_fails_before_downloading() {
    let sandbox = Sandbox::new();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = installer(&sandbox, &server)
        .install_piper("plan9-mips", &NoopProgress)
        .await
        .unwrap_err();

    assert!(matches!(err, InstallError::UnsupportedPlatform(ref id) if id == "plan9-mips"));
    assert!(!sandbox.paths.piper_dir().exists());
}

#[tokio::test]
async fn installs_piper_from_release_archive() {
    let sandbox = Sandbox::new();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/{PIPER_RELEASE}/piper_linux_x86_64.tar.gz")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(piper_release_tarball()))
        .expect(1)
        .mount(&server)
        .await;

    let reports = Mutex::new(Vec::new());
    let progress = |message: &str, percent: Option<u8>| {
        reports.lock().unwrap().push((message.to_string(), percent));
    };
    let installer = installer(&sandbox, &server);
    assert!(!installer.piper_status().installed);

    let installed = installer
        .install_piper("linux-x86_64", &progress)
        .await
        .unwrap();

    assert_eq!(installed, sandbox.paths.piper_primary_binary());
    assert!(voxkit_runtime::install::is_executable(&installed));
    assert!(
        !sandbox
            .paths
            .piper_bin_dir()
            .join("piper_linux_x86_64.tar.gz")
            .exists()
    );

    let status = installer.piper_status();
    assert!(status.installed);
    assert_eq!(status.path, Some(installed));

    let reports = reports.into_inner().unwrap();
    assert_eq!(reports.last().unwrap().1, Some(100));
}

#[tokio::test]
async fn corrupt_archive_is_removed_and_reported() {
    let sandbox = Sandbox::new();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"not a tarball".to_vec()))
        .mount(&server)
        .await;

    let err = installer(&sandbox, &server)
        .install_piper("linux-aarch64", &NoopProgress)
        .await
        .unwrap_err();

    assert!(matches!(err, InstallError::Archive(_)));
    assert!(
        !sandbox
            .paths
            .piper_bin_dir()
            .join("piper_linux_aarch64.tar.gz")
            .exists()
    );
}

#[tokio::test]
async fn installs_voice_files_from_catalog_entry() {
    let sandbox = Sandbox::new();
    let server = MockServer::start().await;
    let key = "en_US-amy-medium";
    Mock::given(method("GET"))
        .and(path(format!("/voices/en/en_US/amy/medium/{key}.onnx")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 64]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/voices/en/en_US/amy/medium/{key}.onnx.json")))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let paths = installer(&sandbox, &server)
        .install_voice(&catalog_entry(key, 64, 2), &NoopProgress)
        .await
        .unwrap();

    let dir = sandbox.paths.downloaded_voices_dir();
    assert_eq!(paths.model, dir.join(format!("{key}.onnx")));
    assert_eq!(paths.config, dir.join(format!("{key}.onnx.json")));
    assert_eq!(std::fs::read(&paths.model).unwrap().len(), 64);
    assert_eq!(std::fs::read_to_string(&paths.config).unwrap(), "{}");
}

#[tokio::test]
async fn size_mismatch_removes_both_voice_files() {
    let sandbox = Sandbox::new();
    let server = MockServer::start().await;
    let key = "en_US-amy-medium";
    Mock::given(method("GET"))
        .and(path(format!("/voices/en/en_US/amy/medium/{key}.onnx")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 10]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/voices/en/en_US/amy/medium/{key}.onnx.json")))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let err = installer(&sandbox, &server)
        .install_voice(&catalog_entry(key, 64, 2), &NoopProgress)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        InstallError::SizeMismatch {
            expected: 64,
            actual: 10,
            ..
        }
    ));
    let dir = sandbox.paths.downloaded_voices_dir();
    assert!(!dir.join(format!("{key}.onnx")).exists());
    assert!(!dir.join(format!("{key}.onnx.json")).exists());
}

#[tokio::test]
async fn failed_config_download_removes_model() {
    let sandbox = Sandbox::new();
    let server = MockServer::start().await;
    let key = "en_US-amy-medium";
    Mock::given(method("GET"))
        .and(path(format!("/voices/en/en_US/amy/medium/{key}.onnx")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 64]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/voices/en/en_US/amy/medium/{key}.onnx.json")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = installer(&sandbox, &server)
        .install_voice(&catalog_entry(key, 64, 2), &NoopProgress)
        .await
        .unwrap_err();

    assert!(matches!(err, InstallError::Download(_)));
    let dir = sandbox.paths.downloaded_voices_dir();
    assert!(!dir.join(format!("{key}.onnx")).exists());
}

#[tokio::test]
async fn catalog_entry_without_model_is_rejected() {
    let sandbox = Sandbox::new();
    let server = MockServer::start().await;
    let entry: VoiceCatalogEntry = serde_json::from_value(serde_json::json!({
        "key": "en_US-amy-medium",
        "name": "amy",
        "files": {}
    }))
    .unwrap();

    let err = installer(&sandbox, &server)
        .install_voice(&entry, &NoopProgress)
        .await
        .unwrap_err();
    assert!(matches!(err, InstallError::IncompleteEntry(_)));
}

#[tokio::test]
async fn installs_lists_and_removes_whisper_models() {
    let sandbox = Sandbox::new();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/whisper/ggml-tiny.en.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; 128]))
        .mount(&server)
        .await;
    let installer = installer(&sandbox, &server);

    assert!(installer.installed_whisper_models().await.unwrap().is_empty());

    let path = installer
        .install_whisper_model("tiny.en", &NoopProgress)
        .await
        .unwrap();
    assert_eq!(path, sandbox.paths.whisper_model_path("tiny.en"));

    // Empty files and unrelated files are not models
    std::fs::write(sandbox.paths.whisper_model_path("base"), b"").unwrap();
    std::fs::write(sandbox.paths.whisper_models_dir().join("notes.txt"), b"x").unwrap();
    assert_eq!(
        installer.installed_whisper_models().await.unwrap(),
        vec!["tiny.en".to_string()]
    );

    installer.remove_whisper_model("tiny.en").await.unwrap();
    assert!(!path.exists());
    assert!(matches!(
        installer.remove_whisper_model("tiny.en").await,
        Err(InstallError::Io { .. })
    ));
}

#[tokio::test]
async fn unknown_whisper_model_is_rejected() {
    let sandbox = Sandbox::new();
    let server = MockServer::start().await;
    let err = installer(&sandbox, &server)
        .install_whisper_model("gigantic", &NoopProgress)
        .await
        .unwrap_err();
    assert!(matches!(err, InstallError::UnknownModel(_)));
}
