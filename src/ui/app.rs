//! Main application UI state.

use std::path::PathBuf;

use chrono::Local;
use eframe::egui;
use tokio::sync::mpsc;

use crate::cache::{CacheStorage, CacheWorker};
use crate::client::ReportClient;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::export;
use crate::models::AttendanceRecord;
use crate::report::filter::{branch_options, employee_options, job_options};
use crate::report::{RecordFilter, summary};

use super::components::colors;
use super::{login_panel, reports_panel};

/// Messages from async tasks to UI.
pub enum UiMessage {
    // Data loading
    RecordsLoaded(Vec<AttendanceRecord>),
    FetchFailed {
        error: String,
        show_url_field: bool,
        was_login: bool,
    },

    // Shell cache
    CacheInstalled(usize),
    CacheInstallFailed(String),

    // Endpoint reachability probe
    ConnectionTested(Result<(), String>),
}

/// Main application state.
pub struct App {
    // Runtime
    pub rt: tokio::runtime::Runtime,

    // Message channel for async communication
    pub tx: mpsc::UnboundedSender<UiMessage>,
    pub rx: mpsc::UnboundedReceiver<UiMessage>,

    // Configuration
    pub config: AppConfig,
    pub config_path: PathBuf,
    pub cache_root: PathBuf,

    // Session state
    pub username: String,
    pub password: String,
    pub sync_url_input: String,
    pub show_url_field: bool,
    pub is_logged_in: bool,
    pub is_admin: bool,
    pub is_loading: bool,
    pub is_refreshing: bool,
    pub is_testing: bool,
    pub connection_test: Option<Result<(), String>>,

    // Loaded data and derived views
    pub records: Vec<AttendanceRecord>,
    pub filtered: Vec<AttendanceRecord>,
    pub job_options: Vec<String>,
    pub employee_options: Vec<String>,
    pub branch_options: Vec<String>,

    // Filter state
    pub filter: RecordFilter,
    pub job_search: String,
    pub employee_search: String,
    pub branch_search: String,

    // Shell cache status
    pub cache_entries: Option<usize>,

    // Dialogs
    pub error_message: Option<String>,
    pub success_message: Option<String>,
    pub show_unlink_confirm: bool,
}

impl App {
    pub fn new(config: AppConfig, config_path: PathBuf, rt: tokio::runtime::Runtime) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let sync_url_input = config.sync.url.clone();
        let show_url_field = !config.is_linked();
        let cache_root = CacheStorage::default_root();

        let mut app = Self {
            rt,
            tx,
            rx,
            config,
            config_path,
            cache_root,
            username: String::new(),
            password: String::new(),
            sync_url_input,
            show_url_field,
            is_logged_in: false,
            is_admin: false,
            is_loading: false,
            is_refreshing: false,
            is_testing: false,
            connection_test: None,
            records: Vec::new(),
            filtered: Vec::new(),
            job_options: Vec::new(),
            employee_options: Vec::new(),
            branch_options: Vec::new(),
            filter: RecordFilter::default(),
            job_search: String::new(),
            employee_search: String::new(),
            branch_search: String::new(),
            cache_entries: None,
            error_message: None,
            success_message: None,
            show_unlink_confirm: false,
        };

        app.activate_shell_cache();
        app
    }

    /// Drop stale shell caches and read the current entry count.
    fn activate_shell_cache(&mut self) {
        if !self.config.is_linked() {
            return;
        }

        let worker = CacheWorker::new(
            CacheStorage::new(self.cache_root.clone()),
            &self.config.sync.url,
            self.config.sync.timeout_secs,
        );
        match worker.activate() {
            Ok(deleted) if !deleted.is_empty() => {
                tracing::info!("Removed stale shell caches: {deleted:?}");
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Shell cache cleanup failed: {e}"),
        }
        self.cache_entries = worker.cached_entries().ok();
    }

    /// Fetch report data with the entered credentials. `show_loading` marks
    /// the initial login fetch; refreshes keep the table on screen.
    pub fn fetch_data(&mut self, show_loading: bool) {
        let url = self.sync_url_input.trim().to_string();
        if url.is_empty() {
            self.error_message = Some("Enter the company sync URL first".to_string());
            self.show_url_field = true;
            return;
        }
        if self.username.trim().is_empty() || self.password.is_empty() {
            self.error_message = Some("Enter username and password".to_string());
            return;
        }

        if show_loading {
            self.is_loading = true;
        } else {
            self.is_refreshing = true;
        }
        self.error_message = None;

        let tx = self.tx.clone();
        let timeout = self.config.sync.timeout_secs;
        let username = self.username.trim().to_string();
        let password = self.password.clone();

        self.rt.spawn(async move {
            let client = ReportClient::new(&url, timeout);
            match client.fetch_report(&username, &password).await {
                Ok(records) => {
                    let _ = tx.send(UiMessage::RecordsLoaded(records));
                }
                Err(e) => {
                    let show_url_field = matches!(
                        e,
                        AppError::Http(_) | AppError::Parse(_) | AppError::NotConfigured
                    );
                    let _ = tx.send(UiMessage::FetchFailed {
                        error: user_message(&e),
                        show_url_field,
                        was_login: show_loading,
                    });
                }
            }
        });
    }

    /// Probe the entered sync URL without credentials.
    pub fn test_connection(&mut self) {
        let url = self.sync_url_input.trim().to_string();
        if url.is_empty() {
            self.connection_test = Some(Err("URL is empty".to_string()));
            return;
        }

        self.is_testing = true;
        self.connection_test = None;

        let tx = self.tx.clone();
        let timeout = self.config.sync.timeout_secs;

        self.rt.spawn(async move {
            let client = ReportClient::new(&url, timeout);
            let result = match client.test_connection().await {
                Ok(true) => Ok(()),
                Ok(false) => Err("Endpoint returned an error status".to_string()),
                Err(e) => Err(user_message(&e)),
            };
            let _ = tx.send(UiMessage::ConnectionTested(result));
        });
    }

    /// Recompute the filtered view. Called whenever a filter input or the
    /// record set changes.
    pub fn refresh_filtered(&mut self) {
        self.filtered = self.filter.apply(&self.records);
    }

    fn refresh_options(&mut self) {
        self.job_options = job_options(&self.records);
        self.employee_options = employee_options(&self.records);
        self.branch_options = branch_options(&self.records);
    }

    /// Persist the endpoint that just served a successful login.
    fn remember_sync_url(&mut self) {
        let url = self.sync_url_input.trim().to_string();
        if self.config.sync.url != url {
            self.config.sync.url = url;
            if let Err(e) = self.config.save(&self.config_path) {
                tracing::error!("Failed to save config: {}", e);
            }
        }
    }

    /// Pin the app shell of the linked endpoint into the offline cache.
    fn install_shell_cache(&mut self) {
        let tx = self.tx.clone();
        let url = self.config.sync.url.clone();
        let root = self.cache_root.clone();
        let timeout = self.config.sync.timeout_secs;

        self.rt.spawn(async move {
            let worker = CacheWorker::new(CacheStorage::new(root), &url, timeout);
            match worker.install().await {
                Ok(count) => {
                    let _ = tx.send(UiMessage::CacheInstalled(count));
                }
                Err(e) => {
                    let _ = tx.send(UiMessage::CacheInstallFailed(e.to_string()));
                }
            }
        });
    }

    /// Leave the reports view, dropping session data and filter state.
    pub fn logout(&mut self) {
        self.is_logged_in = false;
        self.is_admin = false;
        self.records.clear();
        self.filtered.clear();
        self.job_options.clear();
        self.employee_options.clear();
        self.branch_options.clear();
        self.filter.clear();
        self.job_search.clear();
        self.employee_search.clear();
        self.branch_search.clear();
    }

    /// Unlink from the company: clear the stored endpoint and log out.
    pub fn unlink(&mut self) {
        self.config.unlink();
        if let Err(e) = self.config.save(&self.config_path) {
            tracing::error!("Failed to save config: {}", e);
        }
        self.sync_url_input.clear();
        self.show_url_field = true;
        self.error_message = None;
        self.cache_entries = None;
        self.connection_test = None;
        self.logout();
    }

    /// Export the filtered records, one row per record.
    pub fn export_all_data(&mut self) {
        if !self.filter.has_date_range() {
            self.error_message = Some("Select a from/to date range before exporting".to_string());
            return;
        }

        let filename = export::all_data_filename(self.username.trim());
        let Some(path) = export::show_save_dialog(&filename) else {
            return;
        };

        match export::export_all_data_to_excel(&self.filtered, &path) {
            Ok(()) => {
                self.success_message = Some(format!("Exported to: {}", path.display()));
            }
            Err(e) => {
                self.error_message = Some(e.to_string());
            }
        }
    }

    /// Export the per-employee summary over the filtered records.
    pub fn export_summary(&mut self) {
        let (Some(from), Some(to)) = (self.filter.from, self.filter.to) else {
            self.error_message = Some("Select a from/to date range before exporting".to_string());
            return;
        };

        let report = summary::summarize(&self.filtered, from, to, Local::now().date_naive());
        let filename = export::summary_filename(self.username.trim(), from, to);
        let Some(path) = export::show_save_dialog(&filename) else {
            return;
        };

        match export::export_summary_to_excel(&report, &path) {
            Ok(()) => {
                self.success_message = Some(format!("Exported to: {}", path.display()));
            }
            Err(e) => {
                self.error_message = Some(e.to_string());
            }
        }
    }

    /// Poll async operation results.
    fn poll_async_results(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                UiMessage::RecordsLoaded(records) => {
                    self.is_loading = false;
                    self.is_refreshing = false;
                    self.records = records;
                    self.is_logged_in = true;
                    self.is_admin = self.config.is_admin(self.username.trim(), &self.password);
                    self.show_url_field = false;
                    self.refresh_options();
                    self.refresh_filtered();
                    self.remember_sync_url();
                    self.install_shell_cache();
                    tracing::info!("Loaded {} attendance records", self.records.len());
                }
                UiMessage::FetchFailed {
                    error,
                    show_url_field,
                    was_login,
                } => {
                    self.is_loading = false;
                    self.is_refreshing = false;
                    self.error_message = Some(error);
                    if show_url_field {
                        self.show_url_field = true;
                    }
                    if was_login {
                        self.is_logged_in = false;
                    }
                }
                UiMessage::CacheInstalled(count) => {
                    self.cache_entries = Some(count);
                }
                UiMessage::CacheInstallFailed(e) => {
                    // Offline shell pinning is best effort; don't bother the user
                    tracing::warn!("Shell cache install failed: {e}");
                }
                UiMessage::ConnectionTested(result) => {
                    self.is_testing = false;
                    self.connection_test = Some(result);
                }
            }
        }
    }

    /// Render modal dialogs (error, success, unlink confirmation).
    fn show_dialogs(&mut self, ctx: &egui::Context) {
        // Error dialog
        if let Some(ref error) = self.error_message.clone() {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.colored_label(colors::ERROR, error);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.error_message = None;
                    }
                });
        }

        // Success dialog
        if let Some(ref msg) = self.success_message.clone() {
            egui::Window::new("Success")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.colored_label(colors::SUCCESS, msg);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.success_message = None;
                    }
                });
        }

        // Unlink confirmation dialog
        if self.show_unlink_confirm {
            egui::Window::new("Unlink Company")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label("Unlink from the current company? The stored sync URL will be cleared.");
                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        if ui.button("Cancel").clicked() {
                            self.show_unlink_confirm = false;
                        }
                        if ui.button("Unlink").clicked() {
                            self.show_unlink_confirm = false;
                            self.unlink();
                        }
                    });
                });
        }
    }
}

/// Short user-facing message for a fetch failure.
fn user_message(error: &AppError) -> String {
    match error {
        AppError::NotConfigured => "Enter the company sync URL first".to_string(),
        AppError::MissingCredentials => "Enter username and password".to_string(),
        AppError::InvalidCredentials => "Invalid username or password".to_string(),
        AppError::Http(_) => "Connection failed".to_string(),
        AppError::Parse(_) => "Unexpected response from the sync endpoint".to_string(),
        other => other.to_string(),
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Poll async results
        self.poll_async_results();

        // Request repaint during async operations
        if self.is_loading || self.is_refreshing || self.is_testing {
            ctx.request_repaint();
        }

        self.show_dialogs(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.is_logged_in {
                reports_panel::show(self, ui);
            } else {
                login_panel::show(self, ui);
            }
        });
    }
}
