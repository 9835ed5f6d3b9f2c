//! Paths command handler.
//!
//! Prints every resolved location in `key = value` form for diagnostics.

use voxkit_core::AssetPaths;

pub fn execute(paths: &AssetPaths) {
    println!("{paths}");
}
