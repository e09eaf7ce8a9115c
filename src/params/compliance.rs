//! Allow-listed base makefile check

use super::ExtractError;
use std::fs;
use std::path::Path;

/// Inclusion directives of shared base makefiles an app may rely on
pub const ALLOWED_MAKEFILES: [&str; 5] = [
    // Zondax-style apps
    "ledger-zxlib/makefiles",
    // Standard app Makefile from the SDK
    "Makefile.standard_app",
    // Bitcoin clones
    "include lib-app-bitcoin/Makefile",
    "include bitcoin_app_base/Makefile",
    // Ethereum plugins
    "include ethereum-plugin-sdk/standard_plugin.mk",
];

/// Whether the app's `Makefile` includes one of [`ALLOWED_MAKEFILES`]
pub fn is_allowed_makefile(build_dir: &Path) -> Result<bool, ExtractError> {
    let path = build_dir.join("Makefile");
    let content = fs::read_to_string(&path).map_err(|source| ExtractError::Read {
        path: path.clone(),
        source,
    })?;
    Ok(includes_allowed_makefile(&content))
}

/// Substring scan of each non-comment line; no make grammar is parsed.
pub fn includes_allowed_makefile(content: &str) -> bool {
    content.lines().map(str::trim).any(|line| {
        !line.starts_with('#') && ALLOWED_MAKEFILES.iter().any(|allowed| line.contains(allowed))
    })
}
