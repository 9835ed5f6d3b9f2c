//! Archive expansion for release bundles.
//!
//! Extraction is blocking work (decompression plus many small file writes),
//! so it runs on the blocking pool under a wall-clock limit.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::ArchiveError;

/// Upper bound on how long a single extraction may run.
pub const EXTRACT_TIMEOUT: Duration = Duration::from_secs(120);

/// Supported archive containers, detected from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
    TarBz2,
}

impl ArchiveFormat {
    /// Detect the format from the archive's file name.
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();

        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") {
            Some(Self::TarBz2)
        } else {
            None
        }
    }
}

/// Extract `archive` into `dest` with the default time limit.
pub async fn extract(archive: &Path, dest: &Path) -> Result<(), ArchiveError> {
    extract_with_timeout(archive, dest, EXTRACT_TIMEOUT).await
}

/// Extract `archive` into `dest`, failing if it takes longer than `limit`.
///
/// `dest` is created if missing. Entries keep their relative paths.
pub async fn extract_with_timeout(
    archive: &Path,
    dest: &Path,
    limit: Duration,
) -> Result<(), ArchiveError> {
    let format = ArchiveFormat::detect(archive)
        .ok_or_else(|| ArchiveError::UnsupportedFormat(archive.to_path_buf()))?;

    info!(archive = %archive.display(), dest = %dest.display(), ?format, "Extracting archive");

    let archive_owned = archive.to_path_buf();
    let dest_owned = dest.to_path_buf();
    let task = tokio::task::spawn_blocking(move || {
        extract_blocking(format, &archive_owned, &dest_owned)
    });

    match tokio::time::timeout(limit, task).await {
        Ok(joined) => joined.map_err(|e| ArchiveError::Join(e.to_string()))?,
        Err(_) => Err(ArchiveError::TimedOut {
            path: archive.to_path_buf(),
            secs: limit.as_secs(),
        }),
    }
}

fn extract_blocking(format: ArchiveFormat, archive: &Path, dest: &Path) -> Result<(), ArchiveError> {
    let io_err = |source: io::Error| ArchiveError::Io {
        path: archive.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(dest).map_err(|source| ArchiveError::Io {
        path: dest.to_path_buf(),
        source,
    })?;

    let file = File::open(archive).map_err(io_err)?;

    match format {
        ArchiveFormat::Zip => {
            let mut zip = zip::ZipArchive::new(file).map_err(|e| zip_error(archive, e))?;
            debug!(entries = zip.len(), "Unpacking zip");
            zip.extract(dest).map_err(|e| zip_error(archive, e))?;
        }
        ArchiveFormat::TarGz => {
            let decoder = flate2::read::GzDecoder::new(file);
            unpack_tar(decoder, archive, dest)?;
        }
        ArchiveFormat::TarBz2 => {
            let decoder = bzip2::read::BzDecoder::new(file);
            unpack_tar(decoder, archive, dest)?;
        }
    }

    Ok(())
}

fn unpack_tar<R: io::Read>(reader: R, archive: &Path, dest: &Path) -> Result<(), ArchiveError> {
    tar::Archive::new(reader)
        .unpack(dest)
        .map_err(|source| match source.kind() {
            io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput | io::ErrorKind::UnexpectedEof => {
                ArchiveError::Corrupt {
                    path: archive.to_path_buf(),
                    reason: source.to_string(),
                }
            }
            _ => ArchiveError::Io {
                path: archive.to_path_buf(),
                source,
            },
        })
}

fn zip_error(archive: &Path, err: zip::result::ZipError) -> ArchiveError {
    let path: PathBuf = archive.to_path_buf();
    match err {
        zip::result::ZipError::Io(source) => ArchiveError::Io { path, source },
        other => ArchiveError::Corrupt {
            path,
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    fn write_tar_gz(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn detects_formats_by_extension() {
        assert_eq!(
            ArchiveFormat::detect(Path::new("piper_windows_amd64.zip")),
            Some(ArchiveFormat::Zip)
        );
        assert_eq!(
            ArchiveFormat::detect(Path::new("piper_linux_x86_64.tar.gz")),
            Some(ArchiveFormat::TarGz)
        );
        assert_eq!(
            ArchiveFormat::detect(Path::new("X.TGZ")),
            Some(ArchiveFormat::TarGz)
        );
        assert_eq!(
            ArchiveFormat::detect(Path::new("model.tar.bz2")),
            Some(ArchiveFormat::TarBz2)
        );
        assert_eq!(ArchiveFormat::detect(Path::new("voice.onnx")), None);
    }

    #[tokio::test]
    async fn extracts_zip_preserving_directories() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        write_zip(&archive, &[("piper/piper", b"bin"), ("piper/lib.so", b"lib")]);

        let dest = dir.path().join("out");
        extract(&archive, &dest).await.unwrap();

        assert_eq!(std::fs::read(dest.join("piper/piper")).unwrap(), b"bin");
        assert_eq!(std::fs::read(dest.join("piper/lib.so")).unwrap(), b"lib");
    }

    #[tokio::test]
    async fn extracts_tar_gz() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("bundle.tar.gz");
        write_tar_gz(&archive, &[("piper/piper", b"#!/bin/sh\n")]);

        let dest = dir.path().join("out");
        extract(&archive, &dest).await.unwrap();

        assert_eq!(
            std::fs::read(dest.join("piper/piper")).unwrap(),
            b"#!/bin/sh\n"
        );
    }

    #[tokio::test]
    async fn rejects_unknown_extension() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("bundle.rar");
        std::fs::write(&archive, b"whatever").unwrap();

        let err = extract(&archive, dir.path()).await.unwrap_err();
        assert!(matches!(err, ArchiveError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn garbage_zip_is_reported_as_corrupt() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("broken.zip");
        std::fs::write(&archive, b"this is not a zip file at all").unwrap();

        let err = extract(&archive, &dir.path().join("out")).await.unwrap_err();
        assert!(matches!(err, ArchiveError::Corrupt { .. }));
    }
}
