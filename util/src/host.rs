//! Host platform utility functions

use std::path::PathBuf;

/// Name of the environment variable pointing at the software root.
pub const SW_ROOT_ENV_VAR: &str = "TIGER_SW_ROOT";

/// Get the path to the software root directory.
///
/// The root contains the `params`, `scripts` and `sessions` directories.
pub fn get_tiger_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
