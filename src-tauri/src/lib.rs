mod commands;
mod picker;
mod surface;

use cleanearth_core::config::CONFIG_FILE_NAME;
use cleanearth_core::services::analysis::engine::EntropyRng;
use cleanearth_core::services::permissions::DesktopPermissions;
use cleanearth_core::{run_foreground, AppError, HostShell, ShellConfig};
use log::info;
use std::sync::Arc;
use surface::TauriSurface;
use tauri::ipc::CapabilityBuilder;
use tauri::webview::PageLoadEvent;
use tauri::{Manager, WebviewUrl, WebviewWindowBuilder};

// App-command permissions generated by build.rs, granted to the hosted site.
const BRIDGE_PERMISSIONS: [&str; 6] = [
    "allow-request-analysis",
    "allow-get-model-status",
    "allow-get-simulated-detection",
    "allow-select-file",
    "allow-retry-navigation",
    "allow-go-back",
];

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let result = tauri::Builder::default()
        .plugin(
            tauri_plugin_log::Builder::new()
                .level(log::LevelFilter::Info)
                .build(),
        )
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_window_state::Builder::default().build())
        .setup(|app| {
            let config_dir = app.path().app_config_dir().map_err(|e| AppError {
                message: format!("Failed to get app config directory: {}", e),
            })?;
            let config = ShellConfig::load(&config_dir.join(CONFIG_FILE_NAME))?.with_env_overrides();
            let origin = config.remote_origin_pattern()?;
            info!("Hosting {} (bridge granted to {})", config.base_url, origin);

            let hosted_site = BRIDGE_PERMISSIONS.iter().fold(
                CapabilityBuilder::new("hosted-site").remote(origin).window("main"),
                |capability, permission| capability.permission(*permission),
            );
            app.add_capability(hosted_site)?;

            let (shell, commands) = HostShell::new(config, Box::new(EntropyRng::new()));
            let shell = Arc::new(shell);
            app.manage(shell.clone());

            let page_hooks = shell.clone();
            let builder = WebviewWindowBuilder::new(app, "main", WebviewUrl::App("index.html".into()));
            #[cfg(desktop)]
            let builder = builder.title("CleanEarth").inner_size(420.0, 860.0);
            let window = builder
                .on_page_load(move |_window, payload| {
                    let url = payload.url().as_str();
                    match payload.event() {
                        PageLoadEvent::Started => page_hooks.page_started(url),
                        PageLoadEvent::Finished => page_hooks.page_finished(url),
                    }
                })
                .build()?;

            let surface = TauriSurface::new(window)?;
            tauri::async_runtime::spawn(run_foreground(commands, surface));

            let warming = shell.clone();
            tauri::async_runtime::spawn(async move {
                warming.warm_up().await;
            });

            if !shell.check_permissions(&DesktopPermissions) {
                shell.load_home();
            }
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::analysis::request_analysis,
            commands::analysis::get_model_status,
            commands::analysis::get_simulated_detection,
            commands::file_selection::select_file,
            commands::navigation::retry_navigation,
            commands::navigation::go_back,
        ])
        .run(tauri::generate_context!());

    if let Err(e) = result {
        log::error!("Error while running tauri application: {}", e);
        std::process::exit(1);
    }
}
