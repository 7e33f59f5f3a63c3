use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Static game-metadata table bundled into the binary at compile time.
const GAME_INFO_JSON: &str = include_str!("../data/gameInfo.json");

/// Resolved ship metadata: species ("Destroyer", "Cruiser", …), roman-numeral
/// tier, and display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ship {
    pub species: String,
    pub tier: String,
    pub name: String,
}

/// Read-only lookup tables mapping raw game identifiers to display strings.
///
/// Loaded once at startup; a corrupt table is fatal since no presence text
/// can ever be produced without it. A *missing key*, by contrast, is never
/// fatal — callers fall back to the raw token.
#[derive(Debug, Deserialize)]
pub struct GameInfo {
    /// `IDS_GAMEMODE_<LOGIC>_TITLE` → mode display title.
    modes: HashMap<String, String>,
    /// Ship id token → [species, tier, name].
    ships: HashMap<String, (String, String, String)>,
    /// `IDS_<MAPNAME>` → map display name.
    spaces: HashMap<String, String>,
}

impl GameInfo {
    /// Loads the bundled table.
    pub fn load() -> Result<Self> {
        Self::from_json(GAME_INFO_JSON)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Corrupted gameInfo.json")
    }

    /// Resolves a `playerVehicle` token such as "PASD509-Somers": the ship id
    /// is everything before the first '-'. Returns `None` for an unknown id.
    pub fn resolve_ship(&self, player_vehicle: &str) -> Option<Ship> {
        let token = player_vehicle.split('-').next().unwrap_or(player_vehicle);
        self.ships
            .get(token)
            .map(|(species, tier, name)| Ship {
                species: species.clone(),
                tier: tier.clone(),
                name: name.clone(),
            })
    }

    /// Resolves a raw `mapName` token to its display name, falling back to
    /// the token itself.
    pub fn resolve_map(&self, map_name: &str) -> String {
        let key = format!("IDS_{}", map_name.to_uppercase());
        self.spaces
            .get(&key)
            .cloned()
            .unwrap_or_else(|| map_name.to_string())
    }

    /// Resolves a raw `gameLogic` token to its mode title, falling back to
    /// the token itself.
    pub fn resolve_mode_title(&self, game_logic: &str) -> String {
        let key = format!("IDS_GAMEMODE_{}_TITLE", game_logic.to_uppercase());
        self.modes
            .get(&key)
            .cloned()
            .unwrap_or_else(|| game_logic.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic() -> GameInfo {
        GameInfo::from_json(
            r#"{
                "modes": {"IDS_GAMEMODE_DOMINATION_TITLE": "Domination"},
                "ships": {"DE001": ["Destroyer", "X", "Testship"]},
                "spaces": {"IDS_M1": "Map One"}
            }"#,
        )
        .unwrap()
    }

    // ── bundled table ─────────────────────────────────────────────────────────

    #[test]
    fn bundled_table_loads() {
        let info = GameInfo::load().unwrap();
        // A couple of spot checks against the shipped table.
        assert!(info.resolve_ship("PASD509-Somers").is_some());
        assert_ne!(info.resolve_map("17_NA_fault_line"), "17_NA_fault_line");
    }

    #[test]
    fn malformed_table_is_an_error() {
        assert!(GameInfo::from_json("{\"modes\": 42}").is_err());
        assert!(GameInfo::from_json("not json").is_err());
    }

    // ── resolvers ─────────────────────────────────────────────────────────────

    #[test]
    fn resolve_ship_splits_vehicle_token() {
        let info = synthetic();
        let ship = info.resolve_ship("DE001-Testship").unwrap();
        assert_eq!(ship.species, "Destroyer");
        assert_eq!(ship.tier, "X");
        assert_eq!(ship.name, "Testship");
    }

    #[test]
    fn resolve_ship_unknown_id_is_none() {
        let info = synthetic();
        assert!(info.resolve_ship("ZZ999-Unknown").is_none());
    }

    #[test]
    fn resolve_map_uppercases_and_prefixes() {
        let info = synthetic();
        assert_eq!(info.resolve_map("m1"), "Map One");
    }

    #[test]
    fn resolve_map_falls_back_to_token() {
        let info = synthetic();
        assert_eq!(info.resolve_map("99_unmapped"), "99_unmapped");
    }

    #[test]
    fn resolve_mode_title_and_fallback() {
        let info = synthetic();
        assert_eq!(info.resolve_mode_title("Domination"), "Domination");
        assert_eq!(info.resolve_mode_title("NewLogic"), "NewLogic");
    }
}
