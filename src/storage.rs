use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Local;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    constants::GRID_DEFAULTS,
    domain::{Block, BlockId, GroupId, TimeInterval, WeekState},
    timecode,
};

pub const WEEK_FILE: &str = "week.json";

/// On-disk shape of the week snapshot. Every field besides the block and
/// category lists carries a default, so partial files from older versions
/// merge onto the built-in defaults instead of failing to load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekFile {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default = "default_start_hour")]
    pub start_hour: u8,
    #[serde(default = "default_end_hour")]
    pub end_hour: u8,
    #[serde(default = "default_work_target")]
    pub work_target_hours: f64,
    #[serde(default = "default_minute_px")]
    pub minute_px: f64,
    #[serde(default)]
    pub categories: Vec<CategoryRecord>,
    #[serde(default)]
    pub blocks: Vec<BlockRecord>,
}

impl WeekFile {
    pub const SCHEMA_VERSION: u32 = 1;
}

fn default_schema_version() -> u32 {
    WeekFile::SCHEMA_VERSION
}

fn default_start_hour() -> u8 {
    GRID_DEFAULTS.start_hour
}

fn default_end_hour() -> u8 {
    GRID_DEFAULTS.end_hour
}

fn default_work_target() -> f64 {
    GRID_DEFAULTS.work_target_hours
}

fn default_minute_px() -> f64 {
    GRID_DEFAULTS.minute_px
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockRecord {
    pub id: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    pub day: u8,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub core_work: bool,
    #[serde(default)]
    pub alt_focus: bool,
}

pub fn week_to_file(state: &WeekState) -> WeekFile {
    WeekFile {
        schema_version: WeekFile::SCHEMA_VERSION,
        start_hour: state.start_hour,
        end_hour: state.end_hour,
        work_target_hours: state.work_target_hours,
        minute_px: state.minute_px,
        categories: state
            .categories
            .iter()
            .map(|c| CategoryRecord {
                name: c.name.clone(),
                color: c.color.clone(),
            })
            .collect(),
        blocks: state
            .blocks
            .iter()
            .map(|b| BlockRecord {
                id: b.id.0.clone(),
                group: Some(b.group.0.clone()),
                title: b.title.clone(),
                category: b.category.clone(),
                day: b.day,
                start: timecode::format_hhmm(b.interval.start as i32),
                end: timecode::format_hhmm(b.interval.end as i32),
                core_work: b.core_work,
                alt_focus: b.alt_focus,
            })
            .collect(),
    }
}

/// Builds week state from a parsed file, merging missing pieces onto the
/// defaults. Records that fail validation are warned about and dropped,
/// so nothing invalid ever reaches layout or aggregation.
pub fn week_from_file(file: WeekFile) -> WeekState {
    let mut state = WeekState::with_defaults();

    if state.set_hours(file.start_hour, file.end_hour).is_err() {
        eprintln!(
            "Warning: Ignoring invalid grid hours {}..{}",
            file.start_hour, file.end_hour
        );
    }
    if state.set_minute_px(file.minute_px).is_err() {
        eprintln!("Warning: Ignoring non-positive zoom {}", file.minute_px);
    }
    state.work_target_hours = file.work_target_hours;

    if !file.categories.is_empty() {
        state.categories.clear();
        for record in &file.categories {
            if !state.add_category(&record.name, &record.color) {
                eprintln!("Warning: Skipping duplicate category '{}'", record.name);
            }
        }
    }

    for record in &file.blocks {
        match block_from_record(record) {
            Ok(block) => state.blocks.push(block),
            Err(reason) => eprintln!("Warning: Skipping block '{}': {}", record.id, reason),
        }
    }

    state
}

fn block_from_record(record: &BlockRecord) -> Result<Block, String> {
    let start = timecode::parse_hhmm(&record.start).map_err(|e| e.to_string())?;
    let end = timecode::parse_hhmm(&record.end).map_err(|e| e.to_string())?;
    let interval = TimeInterval::new(start, end).map_err(|e| e.to_string())?;
    if record.day > 6 {
        return Err(format!("day index {} out of range 0-6", record.day));
    }

    let id = if record.id.is_empty() {
        BlockId::generate()
    } else {
        BlockId(record.id.clone())
    };
    // Old snapshots may lack a group id; such a block forms its own group.
    let group = match record.group.as_deref() {
        Some(g) if !g.is_empty() => GroupId(g.to_string()),
        _ => GroupId(id.0.clone()),
    };

    Ok(Block {
        id,
        group,
        title: record.title.clone(),
        category: record.category.clone(),
        day: record.day,
        interval,
        core_work: record.core_work,
        alt_focus: record.alt_focus,
    })
}

pub fn get_data_dir() -> PathBuf {
    // A week file in the working directory wins over the platform dir.
    if Path::new(WEEK_FILE).exists() {
        return PathBuf::from(".");
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "trellis", "trellis") {
        let data_dir = proj_dirs.data_dir().to_path_buf();
        fs::create_dir_all(&data_dir).ok();
        data_dir
    } else {
        PathBuf::from(".")
    }
}

pub fn week_path() -> PathBuf {
    get_data_dir().join(WEEK_FILE)
}

pub fn load_week(path: &Path) -> WeekState {
    if !path.exists() {
        return WeekState::with_defaults();
    }

    match read_json::<WeekFile>(path) {
        Ok(file) if file.schema_version == WeekFile::SCHEMA_VERSION => week_from_file(file),
        Ok(file) => {
            eprintln!(
                "Warning: Unsupported week file version {}, starting from defaults",
                file.schema_version
            );
            WeekState::with_defaults()
        }
        Err(e) => {
            eprintln!("Warning: Could not load week file: {}", e);
            WeekState::with_defaults()
        }
    }
}

pub fn save_week(path: &Path, state: &WeekState) -> Result<(), String> {
    write_json_atomic(path, &week_to_file(state))
}

/// Import is an explicit action, so a bad file is an error rather than a
/// silent fall back to defaults.
pub fn import_week(path: &Path) -> Result<WeekState, String> {
    let file: WeekFile = read_json(path)?;
    if file.schema_version != WeekFile::SCHEMA_VERSION {
        return Err(format!(
            "unsupported week file version {}",
            file.schema_version
        ));
    }
    Ok(week_from_file(file))
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&content).map_err(|e| e.to_string())
}

pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    atomic_write(path, &json)
}

pub fn write_text_file(path: &Path, content: &str) -> Result<(), String> {
    atomic_write(path, content)
}

pub fn atomic_write(path: &Path, content: &str) -> Result<(), String> {
    if path.exists() {
        create_backup(path)?;
    }

    let tmp_path = path.with_extension("tmp");
    let mut tmp_file = File::create(&tmp_path).map_err(|e| e.to_string())?;
    tmp_file
        .write_all(content.as_bytes())
        .map_err(|e| e.to_string())?;
    tmp_file.sync_all().map_err(|e| e.to_string())?;
    fs::rename(&tmp_path, path).map_err(|e| e.to_string())?;
    Ok(())
}

fn create_backup(path: &Path) -> Result<(), String> {
    let backup_dir = path.parent().unwrap_or(Path::new(".")).join("backups");
    fs::create_dir_all(&backup_dir).map_err(|e| e.to_string())?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let filename = format!(
        "{}.{}",
        path.file_name().unwrap_or_default().to_string_lossy(),
        timestamp
    );
    fs::copy(path, backup_dir.join(&filename)).map_err(|e| e.to_string())?;

    // Keep the ten newest backups of this file.
    let stem = path.file_name().unwrap_or_default().to_string_lossy();
    if let Ok(entries) = fs::read_dir(&backup_dir) {
        let mut backups: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(&*stem))
            .collect();
        backups.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

        while backups.len() > 10 {
            let oldest = backups.remove(0);
            let _ = fs::remove_file(oldest.path());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::domain::BlockDraft;

    fn unique_path(prefix: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        PathBuf::from(format!("/tmp/{}_{}.json", prefix, now))
    }

    fn sample_state() -> WeekState {
        let mut state = WeekState::with_defaults();
        state.set_hours(6, 22).unwrap();
        state.work_target_hours = 40.0;
        state
            .apply_draft(
                &BlockDraft {
                    title: "Standup".to_string(),
                    category: "Work".to_string(),
                    days: vec![0, 2],
                    start: "09:00".to_string(),
                    end: "09:30".to_string(),
                    core_work: true,
                    alt_focus: false,
                },
                None,
            )
            .unwrap();
        state
    }

    #[test]
    fn test_week_round_trip() {
        let path = unique_path("trellis_week_roundtrip");
        let state = sample_state();

        save_week(&path, &state).unwrap();
        let loaded = load_week(&path);

        assert_eq!(loaded.start_hour, 6);
        assert_eq!(loaded.end_hour, 22);
        assert_eq!(loaded.work_target_hours, 40.0);
        assert_eq!(loaded.categories.len(), state.categories.len());
        assert_eq!(loaded.blocks.len(), 2);
        assert_eq!(loaded.blocks[0].id, state.blocks[0].id);
        assert_eq!(loaded.blocks[0].group, state.blocks[1].group);
        assert_eq!(loaded.blocks[0].interval, state.blocks[0].interval);
        assert!(loaded.blocks[0].core_work);

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let state = load_week(Path::new("/tmp/trellis_does_not_exist.json"));
        assert_eq!(state.start_hour, GRID_DEFAULTS.start_hour);
        assert_eq!(state.categories.len(), 7);
        assert!(state.blocks.is_empty());
    }

    #[test]
    fn test_partial_file_merges_defaults() {
        let path = unique_path("trellis_week_partial");
        fs::write(&path, r#"{"start_hour": 8, "end_hour": 20}"#).unwrap();

        let loaded = load_week(&path);
        assert_eq!(loaded.start_hour, 8);
        assert_eq!(loaded.end_hour, 20);
        assert_eq!(loaded.work_target_hours, GRID_DEFAULTS.work_target_hours);
        assert_eq!(loaded.minute_px, GRID_DEFAULTS.minute_px);
        // absent category list falls back to the seeded defaults
        assert_eq!(loaded.categories.len(), 7);

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_invalid_blocks_are_skipped() {
        let path = unique_path("trellis_week_invalid_blocks");
        fs::write(
            &path,
            r#"{
                "blocks": [
                    {"id": "ok", "day": 1, "start": "09:00", "end": "10:00"},
                    {"id": "backwards", "day": 1, "start": "11:00", "end": "10:00"},
                    {"id": "bad-time", "day": 1, "start": "9:00", "end": "10:00"},
                    {"id": "bad-day", "day": 9, "start": "09:00", "end": "10:00"}
                ]
            }"#,
        )
        .unwrap();

        let loaded = load_week(&path);
        assert_eq!(loaded.blocks.len(), 1);
        assert_eq!(loaded.blocks[0].id, BlockId("ok".to_string()));
        // a block without a group forms its own
        assert_eq!(loaded.blocks[0].group, GroupId("ok".to_string()));

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_invalid_settings_fall_back() {
        let path = unique_path("trellis_week_bad_settings");
        fs::write(
            &path,
            r#"{"start_hour": 20, "end_hour": 8, "minute_px": 0.0, "work_target_hours": -1.0}"#,
        )
        .unwrap();

        let loaded = load_week(&path);
        assert_eq!(loaded.start_hour, GRID_DEFAULTS.start_hour);
        assert_eq!(loaded.end_hour, GRID_DEFAULTS.end_hour);
        assert_eq!(loaded.minute_px, GRID_DEFAULTS.minute_px);
        // stored as-is; WeekState::work_target applies the fallback
        assert_eq!(loaded.work_target_hours, -1.0);
        assert_eq!(loaded.work_target(), GRID_DEFAULTS.work_target_hours);

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_import_rejects_garbage() {
        let path = unique_path("trellis_week_garbage");
        fs::write(&path, "not json at all").unwrap();
        assert!(import_week(&path).is_err());
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_import_rejects_unknown_version() {
        let path = unique_path("trellis_week_future");
        fs::write(&path, r#"{"schema_version": 99}"#).unwrap();
        assert!(import_week(&path).is_err());
        fs::remove_file(path).ok();
    }
}
