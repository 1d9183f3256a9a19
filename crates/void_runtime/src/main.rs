//! Void module runtime host
//!
//! Loads the runtime configuration, discovers plugins in the plugin
//! directory and drives their managers until interrupted or until the
//! configured number of frames has run.
//!
//! Run with: cargo run --bin void-host
//!
//! Host settings live in the `[settings.host]` table of `void.toml`:
//!
//! ```toml
//! [plugins]
//! dir = "plugins"
//! blacklist = ["editor"]
//!
//! [settings.host]
//! frame_ms = 16   # frame interval
//! frames = 600    # stop after this many frames, 0 runs until Ctrl-C
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use void_plugin::managers::RUNTIME_SETTINGS;
use void_plugin::RuntimeConfig;
use void_runtime::Runtime;

const DEFAULT_FRAME_MS: i64 = 16;

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    // Install panic handler so plugin panics are logged
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("PANIC: {}", panic_info);
    }));

    let config = RuntimeConfig::load();
    if let Some(path) = &config.config_path {
        log::info!("Using config file {}", path.display());
    }

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        if let Err(e) = ctrlc::set_handler(move || running.store(false, Ordering::SeqCst)) {
            log::warn!("Cannot install Ctrl-C handler: {}", e);
        }
    }

    let mut runtime = Runtime::new(&config);
    runtime.pre_init();
    runtime.init();

    for line in runtime.status_text() {
        log::info!("{}", line);
    }

    let settings = runtime.managers().config();
    let frame_ms = settings
        .get_int(RUNTIME_SETTINGS, "host.frame_ms")
        .unwrap_or(DEFAULT_FRAME_MS)
        .max(0) as u64;
    let max_frames = settings
        .get_int(RUNTIME_SETTINGS, "host.frames")
        .unwrap_or(0)
        .max(0) as u64;
    let frame_time = Duration::from_millis(frame_ms);

    while running.load(Ordering::SeqCst) {
        let start = Instant::now();
        runtime.update();

        if max_frames > 0 && runtime.frame() >= max_frames {
            break;
        }

        if let Some(rest) = frame_time.checked_sub(start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    runtime.shutdown();
    log::info!("Goodbye");
}
