mod foreground;
pub mod scripts;
mod shell;

pub use foreground::{apply_command, run_foreground, CommandReceiver, CommandSender, WebSurface};
pub use shell::HostShell;
