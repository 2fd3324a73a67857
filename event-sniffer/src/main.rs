//! Event Sniffer - Main entry point
//!
//! Runs the scan loop as a daemon: every few seconds the focused text is
//! checked for events, and confirmed notifications become calendar entries.
//!
//! # Usage
//!
//! ```bash
//! # Scan on the configured interval until Ctrl-C
//! event-sniffer
//!
//! # Scan the focused window once
//! event-sniffer --once
//!
//! # Point at a different extraction service
//! event-sniffer --endpoint http://127.0.0.1:8000/parse --interval 5
//!
//! # Ask a running daemon to scan now
//! kill -USR1 <pid>
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use event_sniffer::notifier::DIALOG_TIMEOUT_SECS;
use event_sniffer::{
    ActionEvent, ActionHandler, CalendarWriter, Config, EntityClient, FocusedTextSource, Notifier,
    ScanOutcome, ScanPipeline, ScanTrigger,
};

/// Command line options; anything set here overrides the config file.
#[derive(Debug, Clone, Default, PartialEq)]
struct Args {
    config_path: Option<PathBuf>,
    interval: Option<u64>,
    endpoint: Option<String>,
    once: bool,
    no_auto_scan: bool,
    check_permissions: bool,
    help: bool,
}

/// Parse command line arguments (without the program name).
fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => parsed.help = true,
            "--once" => parsed.once = true,
            "--no-auto-scan" => parsed.no_auto_scan = true,
            "--check-permissions" => parsed.check_permissions = true,
            "--config" | "-c" => {
                let path = iter.next().ok_or("--config requires a path")?;
                parsed.config_path = Some(PathBuf::from(path));
            }
            "--interval" | "-i" => {
                let value = iter.next().ok_or("--interval requires a number of seconds")?;
                let secs = value
                    .parse::<u64>()
                    .map_err(|_| format!("Invalid interval: {}", value))?;
                if secs == 0 {
                    return Err("Interval must be at least 1 second".to_string());
                }
                parsed.interval = Some(secs);
            }
            "--endpoint" | "-e" => {
                let url = iter.next().ok_or("--endpoint requires a URL")?;
                parsed.endpoint = Some(url.clone());
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }

    Ok(parsed)
}

/// Apply command line overrides to the loaded configuration.
fn apply_overrides(args: &Args, config: &mut Config) {
    if let Some(secs) = args.interval {
        config.scan.interval_seconds = secs;
    }
    if let Some(endpoint) = &args.endpoint {
        config.service.endpoint = endpoint.clone();
    }
    if args.no_auto_scan {
        config.scan.auto_scan = false;
    }
}

fn print_help() {
    println!("event-sniffer - Suggest calendar events from the text on screen");
    println!();
    println!("USAGE:");
    println!("    event-sniffer [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <PATH>      Config file (default: {})", Config::default_config_path().display());
    println!("    -i, --interval <SECS>    Seconds between scans");
    println!("    -e, --endpoint <URL>     Entity extraction endpoint");
    println!("        --once               Scan once and exit");
    println!("        --no-auto-scan       Do not scan on a timer");
    println!("        --check-permissions  Report accessibility and calendar access");
    println!("    -h, --help               Print this help message");
    println!();
    println!("SIGNALS:");
    println!("    SIGUSR1                  Scan the focused window now");
    println!();
    println!("ENVIRONMENT:");
    println!("    RUST_LOG                 Log filter (overrides general.log_level)");
}

#[cfg(target_os = "macos")]
fn platform_notifier(actions: mpsc::Sender<ActionEvent>) -> Arc<dyn Notifier> {
    Arc::new(event_sniffer::AppleScriptNotifier::new(actions))
}

#[cfg(not(target_os = "macos"))]
fn platform_notifier(actions: mpsc::Sender<ActionEvent>) -> Arc<dyn Notifier> {
    drop(actions);
    Arc::new(event_sniffer::LogNotifier)
}

#[cfg(target_os = "macos")]
fn platform_calendar(config: &Config) -> Arc<dyn CalendarWriter> {
    Arc::new(event_sniffer::AppleScriptCalendar::new(
        config.calendar.calendar_name.clone(),
    ))
}

#[cfg(not(target_os = "macos"))]
fn platform_calendar(_config: &Config) -> Arc<dyn CalendarWriter> {
    Arc::new(event_sniffer::UnsupportedCalendar)
}

async fn check_permissions(source: &FocusedTextSource, calendar: &dyn CalendarWriter) -> bool {
    let accessibility = source.is_enabled();
    println!(
        "Accessibility: {}",
        if accessibility { "granted" } else { "NOT granted" }
    );

    #[cfg(target_os = "macos")]
    if !accessibility {
        use accessibility_extractor::platform::macos::{
            open_accessibility_preferences, permission_instructions,
        };
        println!("{}", permission_instructions());
        if let Err(e) = open_accessibility_preferences() {
            warn!("Could not open System Settings: {}", e);
        }
    }

    let calendar_ok = match calendar.ensure_access().await {
        Ok(()) => {
            println!("Calendar: granted");
            true
        }
        Err(e) => {
            println!("Calendar: {}", e);
            false
        }
    };

    accessibility && calendar_ok
}

async fn handle_action(handler: &ActionHandler, notifier: &dyn Notifier, action: ActionEvent) {
    match handler.handle(&action).await {
        Ok(Some(event)) => {
            let when = event.start.format("%a %b %-d at %-I:%M %p");
            notifier
                .report("Event added", &format!("{} on {}", event.title, when))
                .await;
        }
        Ok(None) => {}
        Err(e) => {
            error!("Could not add event: {}", e);
            notifier.report("Could not add event", &e.to_string()).await;
        }
    }
}

/// Forward SIGUSR1 to `requests`, one pending request at most.
#[cfg(unix)]
fn forward_manual_requests(requests: mpsc::Sender<()>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut usr1 = signal(SignalKind::user_defined1())?;
    tokio::spawn(async move {
        while usr1.recv().await.is_some() {
            if requests.try_send(()).is_err() {
                debug!("Manual scan already requested");
            }
        }
    });

    info!(
        "Send SIGUSR1 to scan now (kill -USR1 {})",
        std::process::id()
    );
    Ok(())
}

#[cfg(not(unix))]
fn forward_manual_requests(requests: mpsc::Sender<()>) -> std::io::Result<()> {
    drop(requests);
    Ok(())
}

fn spawn_scan(pipeline: &Arc<ScanPipeline>, trigger: ScanTrigger) {
    let pipeline = Arc::clone(pipeline);
    tokio::spawn(async move {
        let outcome = pipeline.scan(trigger).await;
        log_outcome(trigger, &outcome);
    });
}

fn log_outcome(trigger: ScanTrigger, outcome: &ScanOutcome) {
    match outcome {
        ScanOutcome::Notified(candidate) => info!(
            "{} scan found '{}' ({} {})",
            trigger.as_str(),
            candidate.title,
            candidate.date_text,
            candidate.time_text
        ),
        ScanOutcome::NotifyFailed(e) => warn!("{} scan could not notify: {}", trigger.as_str(), e),
        other => debug!("{} scan: {:?}", trigger.as_str(), other),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information.");
            std::process::exit(1);
        }
    };

    if args.help {
        print_help();
        return Ok(());
    }

    let mut config = match &args.config_path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    apply_overrides(&args, &mut config);

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let text_source = FocusedTextSource::new();
    let calendar = platform_calendar(&config);

    if args.check_permissions {
        let granted = check_permissions(&text_source, calendar.as_ref()).await;
        std::process::exit(if granted { 0 } else { 1 });
    }

    if !config.general.enabled {
        info!("Event sniffer is disabled in configuration, exiting");
        return Ok(());
    }

    info!("Starting Event Sniffer");

    if !text_source.is_enabled() && !text_source.request_permissions() {
        warn!("Accessibility permission not granted; scans will find no text until it is");
        #[cfg(target_os = "macos")]
        warn!(
            "{}",
            accessibility_extractor::platform::macos::permission_instructions()
        );
    }

    let (action_tx, mut action_rx) = mpsc::channel::<ActionEvent>(16);
    let notifier = platform_notifier(action_tx);
    let entity_client = EntityClient::new(&config.service.endpoint, config.service.timeout())?;
    info!("Extraction service: {}", entity_client.endpoint());

    let pipeline = Arc::new(ScanPipeline::new(
        Arc::new(text_source),
        Arc::new(entity_client),
        Arc::clone(&notifier),
    ));
    let handler = ActionHandler::new(Arc::clone(&calendar));

    if args.once {
        let outcome = pipeline.scan(ScanTrigger::Manual).await;
        log_outcome(ScanTrigger::Manual, &outcome);

        if matches!(outcome, ScanOutcome::Notified(_)) {
            let wait = Duration::from_secs(DIALOG_TIMEOUT_SECS + 5);
            if let Ok(Some(action)) = tokio::time::timeout(wait, action_rx.recv()).await {
                handle_action(&handler, notifier.as_ref(), action).await;
            }
        }
        return Ok(());
    }

    // Setup shutdown signal
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let (manual_tx, mut manual_rx) = mpsc::channel::<()>(1);
    forward_manual_requests(manual_tx)?;

    let auto_scan = config.scan.auto_scan;
    let interval = config.scan.interval();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    if auto_scan {
        info!("Scanning every {}s", interval.as_secs());
    } else {
        info!("Auto scan is off; waiting for manual scan requests");
    }

    while running.load(Ordering::SeqCst) {
        tokio::select! {
            _ = ticker.tick(), if auto_scan => {
                spawn_scan(&pipeline, ScanTrigger::Timer);
            }
            Some(()) = manual_rx.recv() => {
                info!("Manual scan requested");
                spawn_scan(&pipeline, ScanTrigger::Manual);
            }
            Some(action) = action_rx.recv() => {
                handle_action(&handler, notifier.as_ref(), action).await;
            }
            _ = tokio::time::sleep(Duration::from_millis(200)) => {}
        }
    }

    info!("Shutting down");
    Ok(())
}
