//! Built-in rule tables for a Fallout 4 `Data` directory.

use once_cell::sync::Lazy;

use super::types::ConfigRegressionRule;

pub static TOP_LEVEL_FOLDERS: &[&str] = &[
    "f4se",
    "interface",
    "lodsettings",
    "materials",
    "meshes",
    "misc",
    "music",
    "programs",
    "scripts",
    "shadersfx",
    "sound",
    "strings",
    "terrain",
    "textures",
    "tools",
    "video",
    "vis",
    "mcm",
    "complex sorter",
];

/// Installer leftovers; the scan reports them and does not descend.
pub static PACKAGING_FOLDERS: &[&str] = &["fomod"];

pub static JUNK_FILE_NAMES: &[&str] = &["desktop.ini", "thumbs.db", ".ds_store"];

pub static JUNK_FILE_SUFFIXES: &[&str] = &[".tmp", ".bak", ".orig"];

pub static FORMAT_WHITELIST: &[(&str, &[&str])] = &[
    ("meshes", &["nif", "bto", "btr", "hkx", "tri", "ssf", "lod", "txt"]),
    ("textures", &["dds"]),
    ("sound", &["xwm", "fuz", "wav", "lip"]),
    ("music", &["xwm", "wav"]),
    ("scripts", &["pex", "psc"]),
    ("materials", &["bgsm", "bgem"]),
    ("strings", &["strings", "dlstrings", "ilstrings"]),
    ("f4se", &["ini", "toml", "json", "txt", "log", "csv", "bin", "pex", "psc"]),
];

/// Plugin modules live under `F4SE/Plugins` even though the folder's
/// whitelist covers data files only.
pub static FORMAT_EXCEPTIONS: &[(&str, &[&str])] = &[("f4se", &["dll"])];

pub static PREVIS_FOLDERS: &[&str] = &["vis", "meshes/precombined"];

pub static ANIM_TEXT_FOLDERS: &[&str] = &["meshes/animtextdata"];

pub static COMPLEX_SORTER_RULE: Lazy<ConfigRegressionRule> = Lazy::new(|| ConfigRegressionRule {
    folder_marker: "complex sorter".to_string(),
    file_suffix: ".ini".to_string(),
    deprecated_field: "EditorID".to_string(),
    replacement: "FormKey".to_string(),
    comment_prefixes: vec![";".to_string(), "#".to_string()],
});

pub static PROBLEM_OVERRIDES: &[(&str, &str)] = &[
    (
        "meshes/actors/character/characterassets/skeleton.nif",
        "Loose skeleton overrides break animations from other mods; remove it unless a mod requires it",
    ),
    (
        "interface/hudmenu.swf",
        "Outdated HUD menu override; remove it or update the mod that provides it",
    ),
    (
        "scripts/instancenamingrules.pex",
        "Old naming rules script conflicts with current game updates; delete it",
    ),
];

pub static REQUIRED_FILES: &[&str] = &["Fallout4.esm"];
