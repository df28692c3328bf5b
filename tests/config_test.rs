//! Layered settings loading

use std::path::PathBuf;

use tempfile::TempDir;

use tasktree::application::ApplicationError;
use tasktree::config::Settings;
use tasktree::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

#[test]
fn given_explicit_config_when_loading_then_its_values_win() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("tasktree.toml");
    let tasks = temp.path().join("mine.yaml");
    std::fs::write(
        &config,
        format!(
            "tasklist_file = {:?}\nhide_done = true\n",
            tasks.to_string_lossy()
        ),
    )
    .unwrap();

    let settings = Settings::load(Some(&config)).unwrap();

    assert_eq!(settings.tasklist_file, tasks);
    assert!(settings.hide_done);
}

#[test]
fn given_missing_explicit_config_when_loading_then_config_error() {
    let temp = TempDir::new().unwrap();

    let result = Settings::load(Some(&temp.path().join("absent.toml")));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_invalid_toml_when_loading_then_config_error() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("bad.toml");
    std::fs::write(&config, "hide_done = [not toml").unwrap();

    let result = Settings::load(Some(&config));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_tilde_path_in_config_when_loading_then_expanded() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("tasktree.toml");
    std::fs::write(&config, "preferences_file = \"~/prefs.yaml\"\n").unwrap();

    let settings = Settings::load(Some(&config)).unwrap();

    let home = PathBuf::from(std::env::var("HOME").unwrap());
    assert_eq!(settings.preferences_file, home.join("prefs.yaml"));
}
