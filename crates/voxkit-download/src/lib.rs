//! Download engine for voxkit.
//!
//! Everything that touches the network or an archive lives here:
//!
//! - [`Downloader`]: streaming GET with bounded redirects, progress
//!   callbacks and partial-file cleanup
//! - [`archive`]: zip / tar.gz / tar.bz2 extraction on the blocking pool

#![deny(unused_crate_dependencies)]

pub mod archive;
mod error;
mod http;

pub use archive::{ArchiveFormat, EXTRACT_TIMEOUT, extract, extract_with_timeout};
pub use error::{ArchiveError, DownloadError};
pub use http::{Downloader, MAX_REDIRECTS};

// wiremock is only used by the integration tests in tests/
#[cfg(test)]
use wiremock as _;
