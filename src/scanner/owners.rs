use std::collections::HashMap;
use std::path::Path;

use super::normalize_relative;

/// Maps a path relative to the scan root to the content-unit that owns it.
pub trait OwnerResolver {
    fn owner_of(&self, relative_path: &Path) -> Option<String>;
}

/// Claims nothing; every diagnostic falls back to the unmanaged label.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unmanaged;

impl OwnerResolver for Unmanaged {
    fn owner_of(&self, _relative_path: &Path) -> Option<String> {
        None
    }
}

/// Owner lookup by relative path. A lookup falls back to the nearest
/// registered ancestor folder.
#[derive(Debug, Default, Clone)]
pub struct OwnerMap {
    owners: HashMap<String, String>,
}

impl OwnerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, relative_path: &Path, owner: impl Into<String>) {
        self.owners.insert(normalize_relative(relative_path), owner.into());
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

impl OwnerResolver for OwnerMap {
    fn owner_of(&self, relative_path: &Path) -> Option<String> {
        let mut key = normalize_relative(relative_path);
        loop {
            if let Some(owner) = self.owners.get(&key) {
                return Some(owner.clone());
            }
            match key.rfind('/') {
                Some(idx) => key.truncate(idx),
                None => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_map_falls_back_to_ancestor() {
        let mut owners = OwnerMap::new();
        owners.insert(Path::new("Textures/MyMod"), "My Mod");
        owners.insert(Path::new("Textures/MyMod/special.dds"), "Patch");

        assert_eq!(owners.owner_of(Path::new("textures/mymod/a/b.dds")).as_deref(), Some("My Mod"));
        assert_eq!(owners.owner_of(Path::new("TEXTURES/MyMod/special.dds")).as_deref(), Some("Patch"));
        assert_eq!(owners.owner_of(Path::new("Meshes/x.nif")), None);
        assert_eq!(owners.len(), 2);
    }

    #[test]
    fn test_unmanaged_claims_nothing() {
        assert_eq!(Unmanaged.owner_of(Path::new("anything")), None);
    }
}
