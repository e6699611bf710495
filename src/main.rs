//! UniTeam Reports - Desktop companion for attendance reporting and export.

use std::path::PathBuf;

use clap::Parser;
use eframe::egui;
use uniteam_reports as app;

use app::config::{AppConfig, ConfigLoadResult};
use app::ui::App;

/// Desktop companion for attendance reporting and export.
#[derive(Parser)]
#[command(name = "uniteam-reports")]
struct Cli {
    /// Use config.toml from current directory and log to stderr (dev mode)
    #[arg(long)]
    dev: bool,
}

fn main() -> eframe::Result<()> {
    let cli = Cli::parse();

    // Initialize logging: stderr in dev mode, daily rolling file otherwise
    let _guard = init_logging(cli.dev);

    tracing::info!("UniTeam Reports starting...");

    // Determine config path based on mode
    let config_path = if cli.dev {
        tracing::info!("Dev mode: loading config from current directory");
        PathBuf::from("config.toml")
    } else {
        AppConfig::default_path()
    };
    tracing::info!("Config path: {:?}", config_path);

    let config = match AppConfig::try_load(&config_path) {
        ConfigLoadResult::Loaded(config) => {
            tracing::info!("Config loaded successfully");
            config
        }
        ConfigLoadResult::Missing => {
            // First run: the login panel asks for the sync URL
            tracing::info!("Config missing, starting unlinked");
            AppConfig::default()
        }
        ConfigLoadResult::Invalid(e) => {
            tracing::warn!("Config invalid, starting unlinked: {}", e);
            AppConfig::default()
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("UniTeam Reports")
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    // Create tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

    eframe::run_native(
        "UniTeam Reports",
        options,
        Box::new(move |cc| {
            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);
            Ok(Box::new(App::new(config, config_path, rt)))
        }),
    )
}

/// Set up the tracing subscriber. The returned guard must stay alive so the
/// background log writer keeps flushing.
fn init_logging(dev: bool) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let env_filter = || {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into())
    };

    if dev {
        tracing_subscriber::fmt().with_env_filter(env_filter()).init();
        return None;
    }

    let log_dir = AppConfig::default_path()
        .parent()
        .map(|p| p.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(log_dir, "uniteam-reports.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Some(guard)
}
