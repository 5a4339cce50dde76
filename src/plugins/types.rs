use std::fmt;
use std::path::PathBuf;
use bitflags::bitflags;

pub const MODULE_EXTENSION: &str = "dll";

/// Exported by every script extender plugin.
pub const LOAD_SYMBOL: &str = "F4SEPlugin_Load";
/// Query entry point used by the legacy runtime's loader.
pub const LEGACY_SYMBOL: &str = "F4SEPlugin_Query";
/// Version data block read by the next-gen runtime's loader.
pub const CURRENT_SYMBOL: &str = "F4SEPlugin_Version";

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u8 {
        const LEGACY_RUNTIME = 0b01;
        const CURRENT_RUNTIME = 0b10;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compatibility {
    NotAPlugin,
    Universal,
    LegacyOnly,
    CurrentOnly,
    Unknown,
}

impl Compatibility {
    pub fn classify(is_plugin: bool, capabilities: Capabilities) -> Self {
        if !is_plugin {
            return Compatibility::NotAPlugin;
        }
        let legacy = capabilities.contains(Capabilities::LEGACY_RUNTIME);
        let current = capabilities.contains(Capabilities::CURRENT_RUNTIME);
        match (legacy, current) {
            (true, true) => Compatibility::Universal,
            (true, false) => Compatibility::LegacyOnly,
            (false, true) => Compatibility::CurrentOnly,
            (false, false) => Compatibility::Unknown,
        }
    }
}

impl fmt::Display for Compatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Compatibility::NotAPlugin => "not a plugin",
            Compatibility::Universal => "universal",
            Compatibility::LegacyOnly => "legacy runtime only",
            Compatibility::CurrentOnly => "current runtime only",
            Compatibility::Unknown => "unknown",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInfo {
    pub file_name: String,
    pub path: PathBuf,
    pub is_plugin: bool,
    pub capabilities: Capabilities,
    pub compatibility: Compatibility,
    pub version: Option<String>,
}

impl PluginInfo {
    /// Build from the module's export names. The classification depends only
    /// on which marker symbols are present.
    pub fn from_exports<'a, I>(path: PathBuf, exports: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut is_plugin = false;
        let mut capabilities = Capabilities::empty();
        for name in exports {
            match name {
                LOAD_SYMBOL => is_plugin = true,
                LEGACY_SYMBOL => capabilities |= Capabilities::LEGACY_RUNTIME,
                CURRENT_SYMBOL => capabilities |= Capabilities::CURRENT_RUNTIME,
                _ => {}
            }
        }
        if !is_plugin {
            capabilities = Capabilities::empty();
        }

        Self {
            file_name: path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            path,
            is_plugin,
            capabilities,
            compatibility: Compatibility::classify(is_plugin, capabilities),
            version: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(&[], Compatibility::NotAPlugin; "no markers")]
    #[test_case(&[LEGACY_SYMBOL, CURRENT_SYMBOL], Compatibility::NotAPlugin; "no load symbol")]
    #[test_case(&[LOAD_SYMBOL, LEGACY_SYMBOL, CURRENT_SYMBOL], Compatibility::Universal; "universal")]
    #[test_case(&[LOAD_SYMBOL, LEGACY_SYMBOL], Compatibility::LegacyOnly; "legacy only")]
    #[test_case(&[LOAD_SYMBOL, CURRENT_SYMBOL], Compatibility::CurrentOnly; "current only")]
    #[test_case(&[LOAD_SYMBOL, "DllMain"], Compatibility::Unknown; "load only")]
    fn test_classification_table(exports: &[&str], expected: Compatibility) {
        let info = PluginInfo::from_exports(PathBuf::from("x.dll"), exports.iter().copied());
        assert_eq!(info.compatibility, expected);
    }

    #[test]
    fn test_not_a_plugin_has_no_flags() {
        let info = PluginInfo::from_exports(PathBuf::from("x.dll"), [LEGACY_SYMBOL]);
        assert!(!info.is_plugin);
        assert!(info.capabilities.is_empty());
        assert_eq!(info.file_name, "x.dll");
    }
}
