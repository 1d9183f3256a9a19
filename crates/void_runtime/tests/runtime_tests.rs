//! Runtime tests for void_runtime

use void_plugin::{PluginError, RuntimeConfig, STATIC_PLUGIN_ID};
use void_runtime::{Runtime, RuntimeState};
use void_sample_plugin::HeartbeatManager;

fn config(plugin_dir: &std::path::Path) -> RuntimeConfig {
    let mut config = RuntimeConfig::from_toml_str(
        r#"
        [settings.sample]
        heartbeat = 3
        "#,
    )
    .unwrap();
    config.plugins.dir = plugin_dir.to_path_buf();
    config
}

#[test]
fn test_runtime_drives_static_plugin() {
    let dir = tempfile::tempdir().unwrap();
    let mut runtime = Runtime::new(&config(dir.path()));
    runtime.add_static::<HeartbeatManager>().unwrap();

    // Empty plugin directory
    assert_eq!(runtime.pre_init(), 0);
    assert_eq!(runtime.state(), RuntimeState::Loaded);

    runtime.init();
    for _ in 0..7 {
        runtime.update();
    }
    assert_eq!(runtime.frame(), 7);

    {
        let heartbeat = runtime.controllers().get::<HeartbeatManager>().unwrap();
        assert!(heartbeat.is_attached());
        assert_eq!(heartbeat.frames(), 7);
        // Static construction uses the default period
        assert_eq!(heartbeat.beats(), 7 / void_sample_plugin::DEFAULT_HEARTBEAT);
    }

    let name = runtime.plugins().plugin_names().remove(0);
    assert_eq!(
        runtime.plugins().namespace_of(&name).map(|ns| ns.plugin_id()),
        Some(STATIC_PLUGIN_ID)
    );
    assert!(matches!(runtime.unload_plugin(&name), Err(PluginError::StaticPlugin(_))));

    runtime.shutdown();
    assert_eq!(runtime.state(), RuntimeState::Stopped);
    assert!(runtime.controllers().is_empty());
}

#[test]
fn test_runtime_skips_broken_plugins() {
    let dir = tempfile::tempdir().unwrap();
    let file = if cfg!(windows) { "broken.dll" } else { "libbroken.so" };
    std::fs::write(dir.path().join(file), b"not a library").unwrap();

    let mut runtime = Runtime::new(&config(dir.path()));
    runtime.init();
    assert_eq!(runtime.state(), RuntimeState::Running);
    assert!(runtime.plugins().is_empty());
    assert!(runtime.controllers().is_empty());

    runtime.update();
    assert_eq!(runtime.frame(), 1);
}

#[test]
fn test_runtime_settings_reach_managers() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = Runtime::new(&config(dir.path()));

    let heartbeat = HeartbeatManager::from_managers(runtime.managers());
    assert_eq!(heartbeat.period(), 3);
    assert_eq!(runtime.managers().plugin_dir(), dir.path());
}
