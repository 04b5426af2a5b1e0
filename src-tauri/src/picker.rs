use cleanearth_core::models::selection_types::{SelectionTicket, IMAGE_EXTENSIONS};
use cleanearth_core::services::file_selection::FilePicker;
use cleanearth_core::{AppError, HostShell};
use std::sync::Arc;
use tauri::{AppHandle, Manager};
use tauri_plugin_dialog::DialogExt;

/// Native open-file dialog. The dialog callback reports back to the shell's
/// handshake with the ticket it was opened for.
pub struct DialogPicker {
    app: AppHandle,
}

impl DialogPicker {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }

    fn open(&self, ticket: SelectionTicket, filter: Option<(&str, Vec<&str>)>) {
        let mut dialog = self.app.dialog().file();
        if let Some((name, extensions)) = filter {
            dialog = dialog.add_filter(name, &extensions);
        }

        let app = self.app.clone();
        dialog.pick_file(move |path| {
            let locator = path.map(|p| p.to_string());
            app.state::<Arc<HostShell>>()
                .complete_file_selection(ticket, locator);
        });
    }
}

impl FilePicker for DialogPicker {
    fn launch(&self, ticket: SelectionTicket, extensions: &[String]) -> Result<(), AppError> {
        if extensions.is_empty() {
            self.open(ticket, None);
        } else {
            let extensions = extensions.iter().map(String::as_str).collect();
            self.open(ticket, Some(("Accepted files", extensions)));
        }
        Ok(())
    }

    fn launch_default(&self, ticket: SelectionTicket) -> Result<(), AppError> {
        self.open(ticket, Some(("Images", IMAGE_EXTENSIONS.to_vec())));
        Ok(())
    }
}
