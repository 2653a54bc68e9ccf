// Copyplus CLI
// Background daemon plus one-shot commands for the clipboard cleanup gesture

use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM, SIGUSR1, SIGUSR2};
use signal_hook::iterator::Signals;

use copyplus_core::event::{EventLoop, RawKeyEvent};
use copyplus_core::{
    apply_autostart, BurstScheduler, KeyDecision, KeyEvent, ModifierSource, ModifierState,
    ProcessOutcome, RetryingProcessor, SettingsFile, SharedSettings, SystemClipboard,
    XdgAutostart,
};

/// Clean up copied text by pressing Control+C twice
#[derive(Parser, Debug)]
#[command(name = "copyplus")]
#[command(version)]
#[command(about = "Press Control+C twice to clean up the copied text", long_about = None)]
struct Args {
    /// Settings file (default: ~/.config/copyplus/settings.toml)
    #[arg(short, long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Keyboard devices to observe, by path or name (can be used multiple times)
    #[arg(short, long, value_name = "DEVICE")]
    devices: Vec<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// List available keyboard devices
    #[arg(long)]
    list_devices: bool,

    /// Print the effective settings and exit
    #[arg(long)]
    check_settings: bool,

    /// Process the clipboard once and exit
    #[arg(long)]
    process_now: bool,

    /// Clean up stdin to stdout with the current toggles and exit
    #[arg(long)]
    transform: bool,

    /// Started by the login entry; skip the startup banner
    #[arg(long)]
    autostart: bool,

    /// Persist the merge-newlines toggle and exit
    #[arg(long, value_name = "BOOL")]
    set_merge_newlines: Option<bool>,

    /// Persist the remove-spaces toggle and exit
    #[arg(long, value_name = "BOOL")]
    set_remove_spaces: Option<bool>,

    /// Persist the shortcut toggle and exit
    #[arg(long, value_name = "BOOL")]
    set_shortcut: Option<bool>,

    /// Persist the start-at-login flag, update the login entry, and exit
    #[arg(long, value_name = "BOOL")]
    set_autostart: Option<bool>,
}

impl Args {
    fn changes_settings(&self) -> bool {
        self.set_merge_newlines.is_some()
            || self.set_remove_spaces.is_some()
            || self.set_shortcut.is_some()
            || self.set_autostart.is_some()
    }
}

/// Main application state
struct Application {
    args: Args,
    settings_file: SettingsFile,
    settings: SharedSettings,
    /// Flag to signal the observer loop to stop
    running: Arc<AtomicBool>,
}

impl Application {
    fn new(args: Args) -> Self {
        let settings_file = match &args.settings {
            Some(path) => SettingsFile::load_or_default(path),
            None => SettingsFile::load_default(),
        };
        let settings = SharedSettings::new(settings_file.toggles(true));

        Self {
            args,
            settings_file,
            settings,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// List available keyboard devices
    fn list_devices() -> anyhow::Result<()> {
        let devices = EventLoop::list_devices().context("Error finding keyboard devices")?;
        println!("Found {} keyboard device(s):", devices.len());
        for device in &devices {
            match &device.path {
                Some(path) => println!("  {}: {} ({})", device.index, device.name, path),
                None => println!("  {}: {}", device.index, device.name),
            }
        }
        Ok(())
    }

    fn check_settings(&self) -> anyhow::Result<()> {
        match self.settings_file.source_path() {
            Some(path) => println!("Settings: {}", path.display()),
            None => println!("Settings: (defaults, no config directory)"),
        }

        let toggles = self.settings.snapshot();
        println!("  merge_newlines   = {}", toggles.merge_newlines);
        println!("  remove_spaces    = {}", toggles.remove_spaces);
        println!("  shortcut_enabled = {}", toggles.shortcut_enabled);
        println!("  autostart        = {}", self.settings_file.autostart());

        let timing = self.settings_file.timing();
        println!("Timing:");
        println!("  repeat_debounce  = {:?}", timing.repeat_debounce);
        println!("  burst_timeout    = {:?}", timing.burst_timeout);
        println!("  settle_delay     = {:?}", timing.settle_delay);
        println!("  clipboard_settle = {:?}", timing.clipboard_settle);
        println!("  throttle         = {:?}", timing.throttle);
        println!("  max_attempts     = {}", timing.max_attempts);
        println!("  retry_delay      = {:?}", timing.retry_delay);
        Ok(())
    }

    /// Apply every `--set-*` flag and save
    fn apply_setting_changes(&mut self) -> anyhow::Result<()> {
        let file = &mut self.settings_file;
        if let Some(value) = self.args.set_merge_newlines {
            file.write_bool(SettingsFile::MERGE_NEWLINES, value);
        }
        if let Some(value) = self.args.set_remove_spaces {
            file.write_bool(SettingsFile::REMOVE_SPACES, value);
        }
        if let Some(value) = self.args.set_shortcut {
            file.write_bool(SettingsFile::SHORTCUT_ENABLED, value);
        }
        if let Some(value) = self.args.set_autostart {
            file.set_autostart(value);
        }

        file.save().context("Could not save settings")?;
        if let Some(path) = file.source_path() {
            println!("Saved {}", path.display());
        }

        if let Some(enabled) = self.args.set_autostart {
            Self::sync_autostart(enabled);
        }
        Ok(())
    }

    fn sync_autostart(enabled: bool) {
        match XdgAutostart::new() {
            Ok(port) => apply_autostart(&port, enabled),
            Err(e) => log::warn!("Autostart unavailable: {}", e),
        }
    }

    fn transform_stdin(&self) -> anyhow::Result<()> {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Could not read stdin")?;
        print!("{}", self.settings.snapshot().transform_options().apply(&input));
        Ok(())
    }

    /// Manual trigger: runs straight away, outside the burst scheduler.
    ///
    /// The written text is handed off before returning, so it survives
    /// this process exiting.
    fn process_now(&self) -> anyhow::Result<()> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .context("Could not start the async runtime")?;

        let processor = RetryingProcessor::new(
            SystemClipboard::new(),
            self.settings.clone(),
            self.settings_file.timing(),
        );
        match runtime.block_on(processor.process_now()) {
            ProcessOutcome::Updated { changed } => {
                log::info!("Clipboard processed (changed: {})", changed);
            }
            ProcessOutcome::NoText => log::info!("Clipboard holds no text"),
            ProcessOutcome::GaveUp { attempts, last_error } => {
                log::warn!("Clipboard unavailable after {} attempts: {}", attempts, last_error);
            }
            ProcessOutcome::Cancelled => {}
        }
        Ok(())
    }

    fn spawn_signal_thread(&self) -> anyhow::Result<()> {
        let mut signals = Signals::new([SIGINT, SIGTERM, SIGUSR1, SIGUSR2, SIGHUP])
            .context("Could not install signal handlers")?;
        let running = self.running.clone();
        let settings = self.settings.clone();
        let path = self.settings_file.source_path().map(|p| p.to_path_buf());

        std::thread::Builder::new()
            .name("copyplus-signals".to_string())
            .spawn(move || {
                for signal in &mut signals {
                    match signal {
                        SIGINT | SIGTERM => {
                            log::info!("Received signal, shutting down");
                            running.store(false, Ordering::SeqCst);
                            break;
                        }
                        SIGUSR1 => {
                            log::info!("Disabled");
                            settings.set_global_enabled(false);
                        }
                        SIGUSR2 => {
                            log::info!("Enabled");
                            settings.set_global_enabled(true);
                        }
                        SIGHUP => match &path {
                            Some(path) => {
                                let file = SettingsFile::load_or_default(path);
                                settings.replace_persisted(file.toggles(true));
                                log::info!("Reloaded settings from {}", path.display());
                            }
                            None => log::warn!("No settings file to reload"),
                        },
                        _ => {}
                    }
                }
            })
            .context("Could not start the signal thread")?;
        Ok(())
    }

    /// Run the observer daemon until SIGINT/SIGTERM
    fn run(&self) -> anyhow::Result<()> {
        if !self.args.autostart {
            log::info!("Starting copyplus");
        }

        Self::sync_autostart(self.settings_file.autostart());
        self.spawn_signal_thread()?;

        let timing = self.settings_file.timing();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("copyplus-worker")
            .enable_time()
            .build()
            .context("Could not start the async runtime")?;

        let processor = Arc::new(RetryingProcessor::new(
            SystemClipboard::new(),
            self.settings.clone(),
            timing,
        ));
        let modifiers = Arc::new(ModifierState::new());
        let scheduler = BurstScheduler::with_handle(
            timing,
            self.settings.clone(),
            modifiers.clone(),
            processor,
            runtime.handle().clone(),
        );

        let mut event_loop = EventLoop::new_filtered(&self.args.devices)?;
        log::debug!("Observing {} device(s)", event_loop.device_count());
        log::info!("copyplus is running. Press Control+C twice after copying.");

        while self.running.load(Ordering::SeqCst) {
            match event_loop.poll_for_events(100) {
                Ok(events) => {
                    for event in events {
                        self.handle_event(&scheduler, &modifiers, event);
                    }
                }
                Err(e) => {
                    log::warn!("Keyboard read failed: {}", e);
                    // A stale modifier would make the next C press look like a chord
                    modifiers.clear();
                    match EventLoop::new_filtered(&self.args.devices) {
                        Ok(reopened) => event_loop = reopened,
                        Err(e) => {
                            log::debug!("Reopening keyboards failed: {}", e);
                            std::thread::sleep(Duration::from_secs(1));
                        }
                    }
                }
            }
        }

        scheduler.shutdown();
        runtime.shutdown_timeout(Duration::from_millis(500));
        Ok(())
    }

    fn handle_event(&self, scheduler: &BurstScheduler, modifiers: &ModifierState, event: RawKeyEvent) {
        modifiers.observe(event.key, event.action);
        if !event.action.is_key_down() {
            return;
        }

        let key_event = KeyEvent::new(event.key, modifiers.control_held(), event.timestamp);
        let decision = scheduler.on_key_event(&key_event);
        if let KeyDecision::Scheduled { count } = decision {
            log::trace!("Burst press {}", count);
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Listing devices doesn't need settings
    if args.list_devices {
        return Application::list_devices();
    }

    let mut app = Application::new(args);

    if app.args.check_settings {
        return app.check_settings();
    }
    if app.args.changes_settings() {
        return app.apply_setting_changes();
    }
    if app.args.transform {
        return app.transform_stdin();
    }
    if app.args.process_now {
        return app.process_now();
    }

    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["copyplus", "--settings", "/tmp/settings.toml"]);

        assert_eq!(args.settings, Some(PathBuf::from("/tmp/settings.toml")));
        assert!(args.devices.is_empty());
        assert!(!args.verbose);
        assert!(!args.process_now);
        assert!(!args.autostart);
        assert!(!args.changes_settings());
    }

    #[test]
    fn test_args_with_devices() {
        let args = Args::parse_from([
            "copyplus",
            "--verbose",
            "--devices",
            "/dev/input/event0",
            "--devices",
            "AT Translated Set 2 keyboard",
        ]);

        assert!(args.verbose);
        assert_eq!(
            args.devices,
            vec!["/dev/input/event0", "AT Translated Set 2 keyboard"]
        );
    }

    #[test]
    fn test_args_setters() {
        let args = Args::parse_from([
            "copyplus",
            "--set-remove-spaces",
            "true",
            "--set-autostart",
            "false",
        ]);

        assert_eq!(args.set_remove_spaces, Some(true));
        assert_eq!(args.set_autostart, Some(false));
        assert_eq!(args.set_merge_newlines, None);
        assert!(args.changes_settings());
    }

    #[test]
    fn test_args_rejects_non_boolean_setter() {
        assert!(Args::try_parse_from(["copyplus", "--set-shortcut", "maybe"]).is_err());
    }

    #[test]
    fn test_args_one_shot_modes() {
        assert!(Args::parse_from(["copyplus", "--process-now"]).process_now);
        assert!(Args::parse_from(["copyplus", "--transform"]).transform);
        assert!(Args::parse_from(["copyplus", "--list-devices"]).list_devices);
        assert!(Args::parse_from(["copyplus", "--check-settings"]).check_settings);
        assert!(Args::parse_from(["copyplus", "--autostart"]).autostart);
    }

    #[test]
    fn test_setting_changes_are_saved() {
        let path = std::env::temp_dir().join(format!(
            "copyplus-cli-settings-{}.toml",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let args = Args::parse_from([
            "copyplus",
            "--settings",
            path.to_str().unwrap(),
            "--set-merge-newlines",
            "false",
            "--set-remove-spaces",
            "true",
        ]);
        let mut app = Application::new(args);
        app.apply_setting_changes().unwrap();

        let saved = SettingsFile::from_file(&path).unwrap();
        assert!(!saved.merge_newlines());
        assert!(saved.remove_spaces());
        assert!(saved.shortcut_enabled());

        let _ = std::fs::remove_file(&path);
    }
}
