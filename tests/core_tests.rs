//! Integration tests for client settings persistence
//!
//! Round-trips settings through real files in a temporary directory and
//! checks the fallback behaviour for missing and corrupt files.

use strategik::core::settings::{ClientSettings, PlayerSide, ENV_AI_DELAY_MS, ENV_SERVER_URL};
use strategik::core::CoreError;
use strategik::rendering::{BoardTheme, LayerSpec, NetworkTopology};
use tempfile::tempdir;

#[test]
fn test_settings_round_trip() {
    //! Every field written by `save_to` comes back from `load_from`

    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let settings = ClientSettings {
        server_url: "http://dqn.internal:9000".to_string(),
        ai_move_delay_ms: 0,
        board_size: 640,
        flipped: true,
        player_color: PlayerSide::Black,
        board_theme: BoardTheme::Marble,
        network_layers: NetworkTopology {
            layers: vec![LayerSpec::new("input", 64), LayerSpec::new("output", 1)],
        },
        network_width: 800,
        network_height: 300,
        save_games: false,
        player_name: "Ada".to_string(),
        ai_name: "Deep Q".to_string(),
    };
    settings.save_to(&path).unwrap();

    assert_eq!(ClientSettings::load_from(&path), settings);
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config").join("settings.json");

    ClientSettings::default().save_to(&path).unwrap();

    assert!(path.exists());
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = tempdir().unwrap();
    let loaded = ClientSettings::load_from(&dir.path().join("absent.json"));
    assert_eq!(loaded, ClientSettings::default());
}

#[test]
fn test_corrupt_file_gives_defaults() {
    //! A damaged settings file must never prevent the client from starting

    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ this is not json").unwrap();

    assert_eq!(ClientSettings::load_from(&path), ClientSettings::default());
}

#[test]
fn test_topology_persists_as_plain_list() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    ClientSettings::default().save_to(&path).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["network_layers"][0]["name"], "input");
    assert_eq!(raw["network_layers"][3]["neurons"], 1);
    assert_eq!(raw["player_color"], "white");
    assert_eq!(raw["board_theme"], "classic");
}

#[test]
fn test_empty_server_url_override_is_rejected() {
    let mut settings = ClientSettings::default();
    let err = settings
        .apply_overrides(|key| (key == ENV_SERVER_URL).then(|| "   ".to_string()))
        .unwrap_err();

    match err {
        CoreError::InvalidSetting { key, .. } => assert_eq!(key, ENV_SERVER_URL),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(settings.server_url, "http://localhost:5000");
}

#[test]
fn test_overrides_win_over_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let saved = ClientSettings {
        ai_move_delay_ms: 1500,
        ..ClientSettings::default()
    };
    saved.save_to(&path).unwrap();

    let mut settings = ClientSettings::load_from(&path);
    settings
        .apply_overrides(|key| (key == ENV_AI_DELAY_MS).then(|| "250".to_string()))
        .unwrap();

    assert_eq!(settings.ai_move_delay_ms, 250);
    assert_eq!(settings.board_size, saved.board_size);
}
