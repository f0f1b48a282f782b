//! Default values for codescout configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// File Locations
// ============================================================================

/// Project-local config file name.
pub const DEFAULT_CONFIG_FILE: &str = "codescout.toml";

/// Directory under the user config dir holding `config.toml`.
pub const DEFAULT_CONFIG_DIR: &str = "codescout";

/// User config file name.
pub const DEFAULT_USER_CONFIG_FILE: &str = "config.toml";

// ============================================================================
// Extraction Defaults
// ============================================================================

/// Walk into subdirectories.
pub const DEFAULT_RECURSIVE: bool = false;

/// Include dot-files and dot-directories in directory walks.
pub const DEFAULT_INCLUDE_HIDDEN: bool = false;

/// Honor `.gitignore`, `.ignore` and global git excludes.
pub const DEFAULT_RESPECT_GITIGNORE: bool = true;

/// Files larger than this are skipped during directory walks (1 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Directory names never walked into, whatever the ignore settings.
pub const ALWAYS_SKIPPED_DIRS: &[&str] = &[".git"];

// ============================================================================
// Logging Defaults
// ============================================================================

/// Default `tracing` filter directive.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

// ============================================================================
// Environment Variables
// ============================================================================

pub const ENV_RECURSIVE: &str = "CODESCOUT_RECURSIVE";
pub const ENV_INCLUDE_HIDDEN: &str = "CODESCOUT_INCLUDE_HIDDEN";
pub const ENV_RESPECT_GITIGNORE: &str = "CODESCOUT_RESPECT_GITIGNORE";
pub const ENV_MAX_FILE_SIZE: &str = "CODESCOUT_MAX_FILE_SIZE";
pub const ENV_EXTENSIONS: &str = "CODESCOUT_EXTENSIONS";
pub const ENV_LOG: &str = "CODESCOUT_LOG";
