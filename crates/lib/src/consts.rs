/// Config file looked up in the project root when none is given explicitly.
pub const CONFIG_FILENAME: &str = "bitpub.toml";

/// Overrides the Godot binary used for exports.
pub const GODOT_BIN_ENV: &str = "BITPUB_GODOT";

/// Overrides the cargo binary used for the native build.
pub const CARGO_BIN_ENV: &str = "BITPUB_CARGO";
