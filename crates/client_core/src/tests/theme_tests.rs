use super::*;
use std::{
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

use shared::domain::ThemeMode;

fn temp_preference_path() -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    env::temp_dir()
        .join(format!("conversion_client_test_{suffix}"))
        .join("theme.json")
}

#[test]
fn missing_file_loads_as_none() {
    let store = FilePreferenceStore::new(temp_preference_path());
    assert_eq!(store.load_theme().expect("load"), None);
}

#[test]
fn save_creates_parent_dir_and_round_trips() {
    let path = temp_preference_path();
    let store = FilePreferenceStore::new(path.clone());

    store.save_theme(ThemeMode::Dark).expect("save");
    assert_eq!(store.load_theme().expect("load"), Some(ThemeMode::Dark));

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn toggle_persists_across_controllers() {
    let path = temp_preference_path();

    let mut controller =
        ThemeController::load_or_default(Arc::new(FilePreferenceStore::new(path.clone())));
    assert_eq!(controller.mode(), ThemeMode::Light);
    assert_eq!(controller.toggle().expect("toggle"), ThemeMode::Dark);

    let reloaded =
        ThemeController::load_or_default(Arc::new(FilePreferenceStore::new(path.clone())));
    assert_eq!(reloaded.mode(), ThemeMode::Dark);

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn malformed_file_falls_back_to_light() {
    let path = temp_preference_path();
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(&path, "not json").expect("write");

    let controller =
        ThemeController::load_or_default(Arc::new(FilePreferenceStore::new(path.clone())));
    assert_eq!(controller.mode(), ThemeMode::Light);

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}
