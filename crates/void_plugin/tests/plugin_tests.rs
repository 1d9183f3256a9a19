//! Plugin tests for void_plugin
//!
//! Drive configuration, discovery and the controller manager together.

use std::sync::Arc;

use parking_lot::Mutex;
use void_core::{Namespace, TypeKey};
use void_plugin::managers::RUNTIME_SETTINGS;
use void_plugin::*;

static JOURNAL: Mutex<Vec<String>> = Mutex::new(Vec::new());

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

macro_rules! journaled_manager {
    ($name:ident) => {
        #[derive(Default)]
        struct $name;

        impl Manager for $name {
            manager_any!();

            fn on_init(&mut self) {
                JOURNAL.lock().push(format!("{}.init", stringify!($name)));
            }

            fn on_pre_update(&mut self) {
                JOURNAL.lock().push(format!("{}.pre_update", stringify!($name)));
            }

            fn on_update(&mut self) {
                JOURNAL.lock().push(format!("{}.update", stringify!($name)));
            }

            fn on_release(&mut self) {
                JOURNAL.lock().push(format!("{}.release", stringify!($name)));
            }
        }
    };
}

journaled_manager!(WindowManager);
journaled_manager!(InputManager);
journaled_manager!(AudioManager);

/// Reads a value from the runtime settings once it is attached
#[derive(Default)]
struct SettingsReader {
    volume: Option<f64>,
}

impl Manager for SettingsReader {
    manager_any!();

    fn set_managers(&mut self, managers: Arc<Managers>) {
        self.volume = managers.config().get_float(RUNTIME_SETTINGS, "audio.volume");
    }
}

fn write_fake_library(dir: &std::path::Path, name: &str) -> std::path::PathBuf {
    let file = if cfg!(windows) {
        format!("{}.dll", name)
    } else {
        format!("lib{}.so", name)
    };
    let path = dir.join(file);
    std::fs::write(&path, b"\x7fELF but not really").unwrap();
    path
}

#[test]
fn test_static_plugins_run_in_registration_order() {
    init_logging();
    let managers = Arc::new(Managers::with_paths(".", "plugins"));
    let mut controllers = ControllerManager::new(managers);
    let mut plugins = PluginManager::new("plugins");

    plugins.add::<WindowManager>(&mut controllers).unwrap();
    plugins.add::<InputManager>(&mut controllers).unwrap();
    plugins.add::<AudioManager>(&mut controllers).unwrap();

    controllers.on_init();
    controllers.on_pre_update();
    controllers.on_update();
    controllers.release_all();

    let journal = std::mem::take(&mut *JOURNAL.lock());
    let expected: Vec<String> = ["init", "pre_update", "update", "release"]
        .iter()
        .flat_map(|phase| {
            ["WindowManager", "InputManager", "AudioManager"]
                .iter()
                .map(move |name| format!("{}.{}", name, phase))
        })
        .collect();
    assert_eq!(journal, expected);

    assert_eq!(
        plugins.plugin_names(),
        vec!["AudioManager", "InputManager", "WindowManager"]
    );
    for name in plugins.plugin_names() {
        assert_eq!(plugins.namespace_of(&name), Some(Namespace::plugin(STATIC_PLUGIN_ID)));
    }
}

#[test]
fn test_blacklisted_plugins_never_register() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let blocked = write_fake_library(dir.path(), "editor");
    write_fake_library(dir.path(), "profiler");

    let mut config = RuntimeConfig::from_toml_str(
        r#"
        [plugins]
        blacklist = ["editor"]
        "#,
    )
    .unwrap();
    config.apply_overrides(|key| match key {
        "VOID_PLUGIN_DIR" => Some(dir.path().display().to_string()),
        "VOID_PLUGIN_BLACKLIST" => Some("profiler, ".to_string()),
        _ => None,
    });
    assert_eq!(config.plugins.dir, dir.path());

    let managers = Arc::new(Managers::new(&config));
    let mut controllers = ControllerManager::new(managers.clone());
    let mut plugins = PluginManager::from_config(&config.plugins, managers.plugin_dir());
    assert!(plugins.is_blacklisted("editor"));
    assert!(plugins.is_blacklisted("profiler"));

    assert_eq!(plugins.on_pre_init(&mut controllers), 0);
    assert!(controllers.is_empty());
    assert!(matches!(
        plugins.load_plugin(&blocked, &mut controllers),
        Err(PluginError::Blacklisted(_))
    ));
}

#[test]
fn test_broken_library_reports_load_error() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = write_fake_library(dir.path(), "broken");

    let mut controllers = ControllerManager::new(Arc::new(Managers::with_paths(".", dir.path())));
    let mut plugins = PluginManager::new(dir.path());
    assert!(matches!(
        plugins.load_plugin(&path, &mut controllers),
        Err(PluginError::LoadError { .. })
    ));
    assert!(!plugins.is_loaded("broken"));
}

#[test]
fn test_managers_receive_settings() {
    init_logging();
    let config = RuntimeConfig::from_toml_str(
        r#"
        [settings.audio]
        volume = 1
        "#,
    )
    .unwrap();

    let mut controllers = ControllerManager::new(Arc::new(Managers::new(&config)));
    controllers.add(SettingsReader::default(), Namespace::new(4, 2)).ok().unwrap();

    assert_eq!(controllers.get::<SettingsReader>().unwrap().volume, Some(1.0));
    assert_eq!(
        controllers.namespace_of(&TypeKey::of::<SettingsReader>()),
        Some(Namespace::new(4, 2))
    );

    controllers.on_release_namespace(Namespace::plugin(4));
    assert!(!controllers.has::<SettingsReader>());
}
