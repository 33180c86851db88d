//! Default values for script path formatting.

pub const PATH_PREFIX: &str = "./";
pub const ASSET_ROOT: &str = "_content";
pub const SCRIPT_SUFFIX: &str = ".ext.js";

pub fn path_prefix() -> String { PATH_PREFIX.to_string() }
pub fn asset_root() -> String { ASSET_ROOT.to_string() }
pub fn script_suffix() -> String { SCRIPT_SUFFIX.to_string() }
