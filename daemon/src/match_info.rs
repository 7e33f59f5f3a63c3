use serde::Deserialize;
use serde_json::Value;

/// One entry of the `vehicles` roster in the match-state file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(default)]
    pub ship_id: i64,
    #[serde(default)]
    pub relation: i32,
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

/// Decoded form of tempArenaInfo.json, the file the game client writes to
/// the replays directory while a battle is in progress.
///
/// Only `map_name`, `game_type`, `game_logic`, `player_vehicle` and
/// `duration` are required; their absence is a decode error. Everything
/// else defaults when missing, and unknown fields are ignored so client
/// updates that extend the schema do not break decoding.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    pub map_name: String,
    pub game_type: String,
    pub game_logic: String,
    pub player_vehicle: String,
    /// Battle duration in seconds.
    pub duration: i64,

    #[serde(default)]
    pub match_group: String,
    #[serde(default)]
    pub game_mode: i32,
    #[serde(default)]
    pub client_version_from_exe: String,
    #[serde(default)]
    pub client_version_from_xml: String,
    #[serde(default)]
    pub scenario_ui_category_id: i32,
    #[serde(default)]
    pub map_display_name: String,
    #[serde(default)]
    pub map_id: i64,
    #[serde(default)]
    pub players_per_team: i32,
    #[serde(default)]
    pub teams_count: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub scenario: String,
    #[serde(default)]
    pub scenario_config_id: i64,
    #[serde(default, rename = "playerID")]
    pub player_id: i64,
    #[serde(default)]
    pub player_name: String,
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub date_time: String,
    #[serde(default)]
    pub logic: String,
    #[serde(default)]
    pub battle_duration: i64,

    // Opaque payloads: carried through untouched, never inspected.
    #[serde(default)]
    pub weather_params: Value,
    #[serde(default)]
    pub disabled_ship_classes: Value,
    #[serde(default)]
    pub map_border: Value,
}

/// Decodes raw match-state bytes. Pure; a failure means the triggering
/// file event is noise (partial write, foreign file) and is dropped.
pub fn decode(bytes: &[u8]) -> serde_json::Result<MatchInfo> {
    serde_json::from_slice(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_SAMPLE: &str = r#"{
        "matchGroup": "ranked",
        "gameMode": 7,
        "clientVersionFromExe": "12.10.0.123",
        "scenarioUiCategoryId": 3,
        "mapDisplayName": "17_NA_fault_line",
        "mapId": 11,
        "clientVersionFromXml": "12.10.0.123",
        "weatherParams": {"0": ["a", "b"]},
        "disabledShipClasses": null,
        "playersPerTeam": 12,
        "duration": 1200,
        "gameLogic": "Domination",
        "name": "7x7",
        "scenario": "Ranked_Domination",
        "playerID": 4,
        "vehicles": [
            {"shipId": 3751786480, "relation": 0, "id": 537149681, "name": "player_one"},
            {"shipId": 4074748880, "relation": 2, "id": 537149682, "name": "player_two"}
        ],
        "gameType": "RankedBattle",
        "dateTime": "23.11.2023 21:14:26",
        "mapName": "17_NA_fault_line",
        "playerName": "player_one",
        "scenarioConfigId": 2625,
        "teamsCount": 2,
        "logic": "Domination",
        "playerVehicle": "PASD509-Somers",
        "battleDuration": 1200,
        "mapBorder": null
    }"#;

    #[test]
    fn decode_full_sample() {
        let info = decode(FULL_SAMPLE.as_bytes()).unwrap();
        assert_eq!(info.map_name, "17_NA_fault_line");
        assert_eq!(info.game_type, "RankedBattle");
        assert_eq!(info.game_logic, "Domination");
        assert_eq!(info.player_vehicle, "PASD509-Somers");
        assert_eq!(info.duration, 1200);
        assert_eq!(info.player_name, "player_one");
        assert_eq!(info.vehicles.len(), 2);
        assert_eq!(info.vehicles[1].relation, 2);
    }

    #[test]
    fn decode_minimal_required_fields() {
        let json = r#"{
            "mapName": "18_NE_ice_islands",
            "gameType": "PVP",
            "gameLogic": "Domination",
            "playerVehicle": "PJSD025-Shimakaze",
            "duration": 900
        }"#;
        let info = decode(json.as_bytes()).unwrap();
        assert_eq!(info.duration, 900);
        assert_eq!(info.match_group, "");
        assert!(info.vehicles.is_empty());
        assert!(info.weather_params.is_null());
    }

    #[test]
    fn decode_missing_required_field_fails() {
        // No playerVehicle.
        let json = r#"{
            "mapName": "18_NE_ice_islands",
            "gameType": "PVP",
            "gameLogic": "Domination",
            "duration": 900
        }"#;
        assert!(decode(json.as_bytes()).is_err());
    }

    #[test]
    fn decode_malformed_json_fails() {
        assert!(decode(b"{\"mapName\": \"trunc").is_err());
        assert!(decode(b"").is_err());
    }

    #[test]
    fn decode_ignores_unknown_fields() {
        let json = r#"{
            "mapName": "m",
            "gameType": "PVP",
            "gameLogic": "Domination",
            "playerVehicle": "PASD509-Somers",
            "duration": 60,
            "someFutureField": {"nested": [1, 2, 3]}
        }"#;
        assert!(decode(json.as_bytes()).is_ok());
    }

    #[test]
    fn decode_preserves_opaque_payloads() {
        let info = decode(FULL_SAMPLE.as_bytes()).unwrap();
        assert_eq!(info.weather_params["0"][1], "b");
        assert!(info.map_border.is_null());
    }
}
