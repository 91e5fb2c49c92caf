//! Dice skins
//!
//! A skin is purely cosmetic. It controls:
//! - The body colour handed to the dice source
//! - The pip/text colour shown on faces
//!
//! Scoring never looks at skins.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Default skin ID
pub const DEFAULT_SKIN_ID: &str = "default";

/// A built-in dice skin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceSkin {
    /// Unique identifier
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Body colour as "#rrggbb"
    pub hex_color: &'static str,
    /// Face text colour as "#rrggbb"
    pub text_color: &'static str,
}

impl DiceSkin {
    const fn new(
        id: &'static str,
        name: &'static str,
        hex_color: &'static str,
        text_color: &'static str,
    ) -> Self {
        Self { id, name, hex_color, text_color }
    }

    /// Cosmetic value object carried by a pending roll
    pub fn descriptor(&self) -> SkinDescriptor {
        SkinDescriptor {
            skin_id: self.id.to_string(),
            skin_color: self.hex_color.to_string(),
            text_color: self.text_color.to_string(),
            theme: "default".to_string(),
        }
    }
}

/// Opaque cosmetic parameters threaded through a roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkinDescriptor {
    pub skin_id: String,
    pub skin_color: String,
    pub text_color: String,
    pub theme: String,
}

/// All built-in skins
pub const DICE_SKINS: &[DiceSkin] = &[
    // Textured
    DiceSkin::new("blood_ruby", "Blood Ruby", "#8B0000", "#FFFFFF"),
    DiceSkin::new("royal_sapphire", "Royal Sapphire", "#00008B", "#FFD700"),
    DiceSkin::new("ancient_emerald", "Ancient Emerald", "#006400", "#FFFFFF"),
    DiceSkin::new("mystic_amethyst", "Mystic Amethyst", "#4B0082", "#00FFFF"),
    DiceSkin::new("celestial_gold", "Celestial Gold", "#DAA520", "#000000"),
    DiceSkin::new("eternal_ice", "Eternal Ice", "#0ea5e9", "#000033"),
    DiceSkin::new("cosmic_nebula", "Cosmic Nebula", "#7c3aed", "#34d399"),
    DiceSkin::new("pure_void", "Deep Void", "#050505", "#FF0000"),
    DiceSkin::new("obsidian_night", "Obsidian Night", "#111827", "#22d3ee"),
    DiceSkin::new("holy_pearl", "Holy Pearl", "#F0EAD6", "#8B0000"),
    // Solid
    DiceSkin::new(DEFAULT_SKIN_ID, "Original Indigo", "#4f46e5", "#ffffff"),
    DiceSkin::new("crimson", "Crimson", "#dc2626", "#ffffff"),
    DiceSkin::new("forest", "Forest", "#16a34a", "#ffffff"),
    DiceSkin::new("ocean", "Ocean", "#0284c7", "#ffffff"),
    DiceSkin::new("midnight", "Midnight", "#1e1b4b", "#a5b4fc"),
    // Neon
    DiceSkin::new("neon_pink", "Neon Pink", "#db2777", "#ffffff"),
    DiceSkin::new("neon_cyan", "Neon Cyan", "#06b6d4", "#000000"),
    DiceSkin::new("sunset", "Sunset", "#f97316", "#000000"),
    DiceSkin::new("aurora", "Aurora", "#10b981", "#ffffff"),
    DiceSkin::new("shadow", "Shadow", "#374151", "#f9fafb"),
];

/// Registry of available skins
#[derive(Debug, Clone)]
pub struct SkinRegistry {
    skins: HashMap<&'static str, DiceSkin>,
}

impl SkinRegistry {
    /// Create a new registry with the built-in skins
    pub fn new() -> Self {
        let skins = DICE_SKINS.iter().map(|s| (s.id, s.clone())).collect();
        Self { skins }
    }

    /// Get a skin by ID, falling back to the default skin
    pub fn get(&self, id: &str) -> DiceSkin {
        self.skins
            .get(id)
            .or_else(|| self.skins.get(DEFAULT_SKIN_ID))
            .cloned()
            .unwrap_or_else(|| DICE_SKINS[10].clone())
    }

    /// Check if a skin exists
    pub fn contains(&self, id: &str) -> bool {
        self.skins.contains_key(id)
    }

    /// List all skins in table order
    pub fn list(&self) -> Vec<&DiceSkin> {
        DICE_SKINS
            .iter()
            .filter_map(|s| self.skins.get(s.id))
            .collect()
    }
}

impl Default for SkinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skin_registry() {
        let registry = SkinRegistry::new();

        let ocean = registry.get("ocean");
        assert_eq!(ocean.id, "ocean");
        assert_eq!(ocean.hex_color, "#0284c7");

        // Unknown skin falls back to default
        let unknown = registry.get("unknown");
        assert_eq!(unknown.id, DEFAULT_SKIN_ID);
        assert_eq!(unknown.hex_color, "#4f46e5");
    }

    #[test]
    fn test_list_keeps_table_order() {
        let registry = SkinRegistry::new();
        let ids: Vec<&str> = registry.list().iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), 20);
        assert_eq!(ids[0], "blood_ruby");
        assert_eq!(ids[19], "shadow");
        assert!(registry.contains("midnight"));
        assert!(!registry.contains("plaid"));
    }

    #[test]
    fn test_descriptor() {
        let skin = SkinRegistry::new().get("midnight");
        let descriptor = skin.descriptor();
        assert_eq!(descriptor.skin_id, "midnight");
        assert_eq!(descriptor.skin_color, "#1e1b4b");
        assert_eq!(descriptor.text_color, "#a5b4fc");
        assert_eq!(descriptor.theme, "default");
    }
}
