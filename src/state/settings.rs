//! Persisted viewer settings
//!
//! The persisted subset of [`ProgramState`] is written as a named-field JSON
//! document with a schema version. Older installs wrote ten bare numbers, one
//! per line, in a fixed order; those files are still read and reported as
//! [`LoadOutcome::MigratedLegacy`] so the next save upgrades them.
//!
//! Every failure path leaves the state untouched and is reported distinctly,
//! so a first run (`NotFound`) can be told apart from a damaged file. Legacy
//! files carry no yaw or pitch; those are recovered from the stored front.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

use super::ProgramState;
use crate::gfx::camera::fly_camera::{spans_basis, PITCH_LIMIT, WORLD_UP};

/// Current settings schema version
pub const SETTINGS_VERSION: u32 = 1;
/// Number of fields in the positional legacy format
pub const LEGACY_FIELD_COUNT: usize = 10;

const LEGACY_FIELDS: [&str; LEGACY_FIELD_COUNT] = [
    "clear_color.r",
    "clear_color.g",
    "clear_color.b",
    "gui_enabled",
    "camera.position.x",
    "camera.position.y",
    "camera.position.z",
    "camera.front.x",
    "camera.front.y",
    "camera.front.z",
];

/// Errors from reading or writing the settings file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("settings truncated: expected {expected} fields, found {found}")]
    Truncated { expected: usize, found: usize },
    #[error("settings have trailing data: expected {expected} fields, found {found}")]
    TrailingData { expected: usize, found: usize },
    #[error("malformed value for {field} (field {index}): {value:?}")]
    Malformed {
        index: usize,
        field: &'static str,
        value: String,
    },
    #[error("schema version mismatch: file has v{file_version}, expected v{expected_version}")]
    SchemaMismatch {
        /// 0 when the version is missing or not an unsigned integer
        file_version: u64,
        expected_version: u32,
    },
    #[error("unusable camera orientation in {field}: {value}")]
    InvalidCamera { field: &'static str, value: String },
}

/// Successful results of [`load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Current JSON format applied
    Loaded,
    /// Legacy positional format applied
    MigratedLegacy,
    /// No settings file yet, defaults kept
    NotFound,
}

/// On-disk settings document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsRecord {
    pub version: u32,
    pub clear_color: [f32; 3],
    pub gui_enabled: bool,
    pub camera_position: [f32; 3],
    pub camera_front: [f32; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_yaw: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_pitch: Option<f32>,
}

impl SettingsRecord {
    pub fn from_state(state: &ProgramState) -> Self {
        let camera = &state.camera;
        Self {
            version: SETTINGS_VERSION,
            clear_color: state.clear_color,
            gui_enabled: state.gui_enabled,
            camera_position: camera.position.into(),
            camera_front: camera.front.into(),
            camera_yaw: Some(camera.yaw),
            camera_pitch: Some(camera.pitch),
        }
    }

    pub fn apply_to(&self, state: &mut ProgramState) {
        state.clear_color = self.clear_color;
        state.gui_enabled = self.gui_enabled;
        state.camera.position = Vector3::from(self.camera_position);

        let angles = self.camera_yaw.zip(self.camera_pitch);
        state
            .camera
            .restore_orientation(Vector3::from(self.camera_front), angles);
    }

    fn from_json(contents: &str) -> Result<Self, SettingsError> {
        let value: serde_json::Value = serde_json::from_str(contents)?;
        let file_version = value
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0);
        if file_version != u64::from(SETTINGS_VERSION) {
            return Err(SettingsError::SchemaMismatch {
                file_version,
                expected_version: SETTINGS_VERSION,
            });
        }

        let record: Self = serde_json::from_value(value)?;
        record.check_camera()?;
        Ok(record)
    }

    /// Rejects orientations the camera cannot build a basis from
    fn check_camera(&self) -> Result<(), SettingsError> {
        if !spans_basis(Vector3::from(self.camera_front), WORLD_UP) {
            return Err(SettingsError::InvalidCamera {
                field: "camera_front",
                value: format!("{:?}", self.camera_front),
            });
        }
        if let Some(pitch) = self.camera_pitch.filter(|p| p.abs() > PITCH_LIMIT) {
            return Err(SettingsError::InvalidCamera {
                field: "camera_pitch",
                value: pitch.to_string(),
            });
        }
        Ok(())
    }

    fn from_legacy(contents: &str) -> Result<Self, SettingsError> {
        let tokens: Vec<&str> = contents.split_whitespace().collect();
        if tokens.len() < LEGACY_FIELD_COUNT {
            return Err(SettingsError::Truncated {
                expected: LEGACY_FIELD_COUNT,
                found: tokens.len(),
            });
        }
        if tokens.len() > LEGACY_FIELD_COUNT {
            return Err(SettingsError::TrailingData {
                expected: LEGACY_FIELD_COUNT,
                found: tokens.len(),
            });
        }

        let mut values = [0.0_f32; LEGACY_FIELD_COUNT];
        for (index, (token, field)) in tokens.iter().zip(LEGACY_FIELDS).enumerate() {
            let malformed = || SettingsError::Malformed {
                index,
                field,
                value: token.to_string(),
            };
            values[index] = if field == "gui_enabled" {
                match *token {
                    "0" => 0.0,
                    "1" => 1.0,
                    _ => return Err(malformed()),
                }
            } else {
                token
                    .parse::<f32>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(malformed)?
            };
        }

        Ok(Self {
            version: SETTINGS_VERSION,
            clear_color: [values[0], values[1], values[2]],
            gui_enabled: values[3] != 0.0,
            camera_position: [values[4], values[5], values[6]],
            camera_front: [values[7], values[8], values[9]],
            camera_yaw: None,
            camera_pitch: None,
        })
    }
}

/// Writes the persisted subset of `state` to `path`, replacing any old file
pub fn save(state: &ProgramState, path: &Path) -> Result<(), SettingsError> {
    let io_error = |source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let mut json = serde_json::to_string_pretty(&SettingsRecord::from_state(state))?;
    json.push('\n');
    fs::write(path, json).map_err(io_error)
}

/// Reads `path` into `state`
///
/// On any error `state` is left exactly as it was.
pub fn load(state: &mut ProgramState, path: &Path) -> Result<LoadOutcome, SettingsError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(LoadOutcome::NotFound),
        Err(source) => {
            return Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if contents.trim_start().starts_with('{') {
        SettingsRecord::from_json(&contents)?.apply_to(state);
        Ok(LoadOutcome::Loaded)
    } else {
        SettingsRecord::from_legacy(&contents)?.apply_to(state);
        Ok(LoadOutcome::MigratedLegacy)
    }
}

/// Loads `path`, falling back to `legacy_path` when `path` does not exist
pub fn load_or_migrate(
    state: &mut ProgramState,
    path: &Path,
    legacy_path: &Path,
) -> Result<LoadOutcome, SettingsError> {
    match load(state, path)? {
        LoadOutcome::NotFound => load(state, legacy_path),
        outcome => Ok(outcome),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("moonlit-settings-{}", std::process::id()))
            .join(name)
    }

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn assert_defaults(state: &ProgramState) {
        let defaults = ProgramState::default();
        assert_eq!(state.clear_color, defaults.clear_color);
        assert_eq!(state.gui_enabled, defaults.gui_enabled);
        assert_eq!(state.camera.position, defaults.camera.position);
        assert_eq!(state.camera.front, defaults.camera.front);
    }

    #[test]
    fn test_round_trip() {
        let path = temp_path("round_trip.json");
        let mut state = ProgramState::default();
        state.clear_color = [0.1, 0.25, 0.7];
        state.gui_enabled = true;
        state.camera.position = Vector3::new(1.5, -2.25, 13.125);
        state.camera.process_mouse_movement(123.4, -56.7, true);

        save(&state, &path).unwrap();

        let mut fresh = ProgramState::default();
        assert_eq!(load(&mut fresh, &path).unwrap(), LoadOutcome::Loaded);
        assert_eq!(fresh.clear_color, state.clear_color);
        assert_eq!(fresh.gui_enabled, state.gui_enabled);
        assert_eq!(fresh.camera.position, state.camera.position);
        assert_eq!(fresh.camera.front, state.camera.front);
        assert_eq!(fresh.camera.yaw, state.camera.yaw);
        assert_eq!(fresh.camera.pitch, state.camera.pitch);
        assert!(fresh.camera.front.dot(fresh.camera.right).abs() < 1e-5);
    }

    #[test]
    fn test_missing_file_keeps_defaults() {
        let mut state = ProgramState::default();
        let outcome = load(&mut state, &temp_path("does_not_exist.json")).unwrap();
        assert_eq!(outcome, LoadOutcome::NotFound);
        assert_eq!(state.clear_color, [0.0, 0.0, 0.0]);
        assert!(!state.gui_enabled);
        assert_defaults(&state);
    }

    #[test]
    fn test_legacy_file_migrates() {
        let path = temp_path("legacy_full.txt");
        write(&path, "0.2\n0.3\n0.4\n1\n1\n2\n3\n0\n0\n-1\n");

        let mut state = ProgramState::default();
        assert_eq!(load(&mut state, &path).unwrap(), LoadOutcome::MigratedLegacy);
        assert_eq!(state.clear_color, [0.2, 0.3, 0.4]);
        assert!(state.gui_enabled);
        assert_eq!(state.camera.position, Vector3::new(1.0, 2.0, 3.0));
        assert!((state.camera.front - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-5);
        assert!((state.camera.yaw + 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_legacy_vertical_front_gets_a_finite_basis() {
        let path = temp_path("legacy_vertical.txt");
        write(&path, "0 0 0 0 0 0 3 0 -1 0\n");

        let mut state = ProgramState::default();
        assert_eq!(load(&mut state, &path).unwrap(), LoadOutcome::MigratedLegacy);

        let camera = &state.camera;
        assert_eq!(camera.pitch, -PITCH_LIMIT);
        assert!((camera.right.magnitude() - 1.0).abs() < 1e-5);
        assert!((camera.up.magnitude() - 1.0).abs() < 1e-5);
        assert!(camera.front.dot(camera.right).abs() < 1e-5);
        let view = camera.view_matrix();
        for column in [view.x, view.y, view.z, view.w] {
            assert!(column.x.is_finite() && column.y.is_finite() && column.z.is_finite());
        }
    }

    #[test]
    fn test_json_vertical_front_is_rejected() {
        let path = temp_path("vertical.json");
        write(
            &path,
            r#"{ "version": 1, "clear_color": [0.5, 0, 0], "gui_enabled": false,
                 "camera_position": [0, 0, 3], "camera_front": [0, 1, 0] }"#,
        );

        let mut state = ProgramState::default();
        match load(&mut state, &path) {
            Err(SettingsError::InvalidCamera { field, .. }) => assert_eq!(field, "camera_front"),
            other => panic!("expected invalid camera, got {:?}", other),
        }
        assert_defaults(&state);
    }

    #[test]
    fn test_json_pitch_out_of_range_is_rejected() {
        let path = temp_path("steep.json");
        write(
            &path,
            r#"{ "version": 1, "clear_color": [0, 0, 0], "gui_enabled": false,
                 "camera_position": [0, 0, 3], "camera_front": [0, 0, -1],
                 "camera_yaw": -90.0, "camera_pitch": 120.0 }"#,
        );

        let mut state = ProgramState::default();
        assert!(matches!(
            load(&mut state, &path),
            Err(SettingsError::InvalidCamera { field: "camera_pitch", .. })
        ));
        assert_defaults(&state);
    }

    #[test]
    fn test_legacy_trailing_tokens_are_flagged() {
        let path = temp_path("legacy_long.txt");
        write(&path, "0.2\n0.3\n0.4\n1\n1\n2\n3\n0\n0\n-1\n7\n");

        let mut state = ProgramState::default();
        assert!(matches!(
            load(&mut state, &path),
            Err(SettingsError::TrailingData {
                expected: 10,
                found: 11
            })
        ));
        assert_defaults(&state);
    }

    #[test]
    fn test_oversized_version_is_a_mismatch() {
        let path = temp_path("wrapping_version.json");
        // 2^32 + 1 would read as 1 if narrowed to u32
        write(
            &path,
            r#"{ "version": 4294967297, "clear_color": [0, 0, 0], "gui_enabled": false,
                 "camera_position": [0, 0, 3], "camera_front": [0, 0, -1] }"#,
        );

        let mut state = ProgramState::default();
        assert!(matches!(
            load(&mut state, &path),
            Err(SettingsError::SchemaMismatch {
                file_version: 4294967297,
                ..
            })
        ));
        assert_defaults(&state);
    }

    #[test]
    fn test_truncated_legacy_file_is_flagged() {
        let path = temp_path("legacy_short.txt");
        write(&path, "0.2\n0.3\n0.4\n1\n1\n2\n3\n0\n0\n");

        let mut state = ProgramState::default();
        match load(&mut state, &path) {
            Err(SettingsError::Truncated { expected, found }) => {
                assert_eq!(expected, 10);
                assert_eq!(found, 9);
            }
            other => panic!("expected truncation, got {:?}", other),
        }
        assert_defaults(&state);
    }

    #[test]
    fn test_empty_file_is_truncated() {
        let path = temp_path("empty.txt");
        write(&path, "");
        let mut state = ProgramState::default();
        assert!(matches!(
            load(&mut state, &path),
            Err(SettingsError::Truncated { found: 0, .. })
        ));
    }

    #[test]
    fn test_malformed_legacy_value() {
        let path = temp_path("legacy_bad.txt");
        write(&path, "0.2\n0.3\nblue\n1\n1\n2\n3\n0\n0\n-1\n");

        let mut state = ProgramState::default();
        match load(&mut state, &path) {
            Err(SettingsError::Malformed { index, field, .. }) => {
                assert_eq!(index, 2);
                assert_eq!(field, "clear_color.b");
            }
            other => panic!("expected malformed, got {:?}", other),
        }
        assert_defaults(&state);
    }

    #[test]
    fn test_schema_mismatch() {
        let path = temp_path("future.json");
        write(&path, r#"{ "version": 7, "clear_color": [1, 1, 1] }"#);

        let mut state = ProgramState::default();
        assert!(matches!(
            load(&mut state, &path),
            Err(SettingsError::SchemaMismatch {
                file_version: 7,
                expected_version: SETTINGS_VERSION
            })
        ));
        assert_defaults(&state);
    }

    #[test]
    fn test_unknown_and_missing_fields_are_rejected() {
        let unknown = temp_path("unknown_field.json");
        write(
            &unknown,
            r#"{ "version": 1, "clear_color": [0, 0, 0], "gui_enabled": false,
                 "camera_position": [0, 0, 3], "camera_front": [0, 0, -1],
                 "camera_roll": 4.0 }"#,
        );
        let missing = temp_path("missing_field.json");
        write(
            &missing,
            r#"{ "version": 1, "clear_color": [0, 0, 0], "gui_enabled": false,
                 "camera_position": [0, 0, 3] }"#,
        );

        let mut state = ProgramState::default();
        assert!(matches!(load(&mut state, &unknown), Err(SettingsError::Json(_))));
        assert!(matches!(load(&mut state, &missing), Err(SettingsError::Json(_))));
        assert_defaults(&state);
    }

    #[test]
    fn test_load_or_migrate_prefers_current_file() {
        let json = temp_path("prefer/program_state.json");
        let legacy = temp_path("prefer/program_state.txt");
        write(&legacy, "0.5\n0.5\n0.5\n0\n9\n9\n9\n1\n0\n0\n");
        let _ = fs::remove_file(&json);

        let mut state = ProgramState::default();
        assert_eq!(
            load_or_migrate(&mut state, &json, &legacy).unwrap(),
            LoadOutcome::MigratedLegacy
        );
        assert_eq!(state.camera.position, Vector3::new(9.0, 9.0, 9.0));

        state.clear_color = [0.9, 0.8, 0.7];
        save(&state, &json).unwrap();

        let mut fresh = ProgramState::default();
        assert_eq!(
            load_or_migrate(&mut fresh, &json, &legacy).unwrap(),
            LoadOutcome::Loaded
        );
        assert_eq!(fresh.clear_color, [0.9, 0.8, 0.7]);
    }

    #[test]
    fn test_save_reports_write_failure() {
        // A directory cannot be opened as a file
        let dir = temp_path("unwritable_dir");
        fs::create_dir_all(&dir).unwrap();

        let state = ProgramState::default();
        assert!(matches!(save(&state, &dir), Err(SettingsError::Io { .. })));
    }
}
