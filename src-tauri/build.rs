const COMMANDS: &[&str] = &[
    "request_analysis",
    "get_model_status",
    "get_simulated_detection",
    "select_file",
    "retry_navigation",
    "go_back",
];

fn main() {
    tauri_build::try_build(
        tauri_build::Attributes::new()
            .app_manifest(tauri_build::AppManifest::new().commands(COMMANDS)),
    )
    .expect("failed to run tauri-build");
}
