use std::fs;
use std::path::Path;
use goblin::pe::PE;
use goblin::pe::section_table::SectionTable;
use log::{debug, trace, warn};

use super::types::{PluginInfo, CURRENT_SYMBOL, MODULE_EXTENSION};
use crate::utils;

/// Inspect a module's export table.
///
/// Returns `None` when the path is empty, missing, lacks the module
/// extension, or is not a parseable PE image. A module without exports is
/// reported as "not a plugin" rather than `None`.
pub fn analyze_module(path: &Path) -> Option<PluginInfo> {
    if path.as_os_str().is_empty() {
        debug!("Empty module path");
        return None;
    }
    if !utils::matches_extension(path, MODULE_EXTENSION) {
        trace!("Not a module file: {}", path.display());
        return None;
    }
    if !path.is_file() {
        debug!("Module not found: {}", path.display());
        return None;
    }

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to read module {}: {}", path.display(), e);
            return None;
        }
    };

    let pe = match PE::parse(&bytes) {
        Ok(pe) => pe,
        Err(e) => {
            warn!("Failed to parse module {}: {}", path.display(), e);
            return None;
        }
    };

    let names: Vec<&str> = pe.exports.iter().filter_map(|e| e.name).collect();
    debug!("{} exports {} symbols", path.display(), names.len());
    trace!("  exports: {:?}", names);

    let mut info = PluginInfo::from_exports(path.to_owned(), names.iter().copied());
    if info.is_plugin {
        info.version = read_plugin_version(&pe, &bytes);
    }
    Some(info)
}

/// Decode `pluginVersion` from the exported version data block.
fn read_plugin_version(pe: &PE, bytes: &[u8]) -> Option<String> {
    let export = pe.exports.iter().find(|e| e.name == Some(CURRENT_SYMBOL))?;
    let offset = rva_to_offset(&pe.sections, export.rva)?;
    let start = offset.checked_add(4)?;
    let raw = bytes.get(start..start.checked_add(4)?)?;
    let packed = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
    Some(format_packed_version(packed))
}

fn rva_to_offset(sections: &[SectionTable], rva: usize) -> Option<usize> {
    sections.iter().find_map(|section| {
        let start = section.virtual_address as usize;
        let span = section.virtual_size.max(section.size_of_raw_data) as usize;
        if rva >= start && rva < start + span {
            let delta = rva - start;
            if delta >= section.size_of_raw_data as usize {
                return None;
            }
            Some(section.pointer_to_raw_data as usize + delta)
        } else {
            None
        }
    })
}

/// `major << 24 | minor << 16 | build << 4 | sub` rendered as `major.minor.build`.
pub fn format_packed_version(packed: u32) -> String {
    let major = (packed >> 24) & 0xFF;
    let minor = (packed >> 16) & 0xFF;
    let build = (packed >> 4) & 0xFFF;
    format!("{}.{}.{}", major, minor, build)
}
