use crate::error::AppError;
use crate::models::selection_types::{FileSelection, SelectionParams, SelectionTicket};
use log::{debug, error, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::oneshot;

/// Launching is non-blocking; pickers report back through
/// [`FileSelectionHandshake::complete`] with the ticket they were launched for.
pub trait FilePicker: Send + Sync {
    fn launch(&self, ticket: SelectionTicket, extensions: &[String]) -> Result<(), AppError>;

    fn launch_default(&self, ticket: SelectionTicket) -> Result<(), AppError>;
}

struct PendingSelection {
    ticket: SelectionTicket,
    responder: oneshot::Sender<FileSelection>,
}

impl PendingSelection {
    fn resolve(self, selection: FileSelection) {
        // The requester may have stopped waiting; nothing to do then.
        let _ = self.responder.send(selection);
    }
}

/// One-slot mailbox for the file chooser. At most one selection is pending;
/// starting a new one resolves the previous with "no selection" first.
#[derive(Default)]
pub struct FileSelectionHandshake {
    slot: Mutex<Option<PendingSelection>>,
    next_ticket: AtomicU64,
}

impl FileSelectionHandshake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.lock_slot().is_some()
    }

    pub fn begin(
        &self,
        params: &SelectionParams,
        picker: &dyn FilePicker,
    ) -> oneshot::Receiver<FileSelection> {
        let (responder, receiver) = oneshot::channel();
        let ticket = SelectionTicket(self.next_ticket.fetch_add(1, Ordering::Relaxed) + 1);

        let previous = self
            .lock_slot()
            .replace(PendingSelection { ticket, responder });
        if let Some(previous) = previous {
            debug!("File selection {:?} preempted by {:?}", previous.ticket, ticket);
            previous.resolve(None);
        }

        // The slot lock is released here; pickers may complete synchronously.
        let launched = params
            .extensions()
            .and_then(|extensions| picker.launch(ticket, &extensions));

        if let Err(e) = launched {
            warn!("Preferred file chooser unavailable ({}), using image picker", e);
            if let Err(e) = picker.launch_default(ticket) {
                error!("Default file chooser unavailable: {}", e);
                self.complete(ticket, None);
            }
        }

        receiver
    }

    /// Resolves the selection launched for `ticket` and clears the slot.
    /// Returns false when that selection was already resolved.
    pub fn complete(&self, ticket: SelectionTicket, locator: Option<String>) -> bool {
        let pending = {
            let mut slot = self.lock_slot();
            match slot.as_ref() {
                Some(pending) if pending.ticket == ticket => slot.take(),
                _ => None,
            }
        };

        let Some(pending) = pending else {
            debug!("Ignoring stale file selection result for {:?}", ticket);
            return false;
        };

        let selection = locator.filter(|l| !l.is_empty()).map(|l| vec![l]);
        debug!(
            "File selection {:?} resolved ({})",
            ticket,
            if selection.is_some() { "selected" } else { "no selection" }
        );
        pending.resolve(selection);
        true
    }

    fn lock_slot(&self) -> MutexGuard<'_, Option<PendingSelection>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tokio::sync::oneshot::error::TryRecvError;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Launch {
        Preferred(SelectionTicket, Vec<String>),
        Default(SelectionTicket),
    }

    #[derive(Default)]
    pub(crate) struct RecordingPicker {
        pub(crate) launches: Mutex<Vec<Launch>>,
        fail_preferred: bool,
        fail_default: bool,
    }

    impl RecordingPicker {
        pub(crate) fn failing(fail_preferred: bool, fail_default: bool) -> Self {
            Self {
                launches: Mutex::new(Vec::new()),
                fail_preferred,
                fail_default,
            }
        }

        pub(crate) fn last_ticket(&self) -> SelectionTicket {
            match self.launches.lock().unwrap().last() {
                Some(Launch::Preferred(ticket, _)) | Some(Launch::Default(ticket)) => *ticket,
                None => panic!("picker was never launched"),
            }
        }
    }

    impl FilePicker for RecordingPicker {
        fn launch(&self, ticket: SelectionTicket, extensions: &[String]) -> Result<(), AppError> {
            if self.fail_preferred {
                return Err("no activity handles this request".into());
            }
            self.launches
                .lock()
                .unwrap()
                .push(Launch::Preferred(ticket, extensions.to_vec()));
            Ok(())
        }

        fn launch_default(&self, ticket: SelectionTicket) -> Result<(), AppError> {
            if self.fail_default {
                return Err("no gallery installed".into());
            }
            self.launches.lock().unwrap().push(Launch::Default(ticket));
            Ok(())
        }
    }

    /// Checks, at launch time, that every earlier request was already resolved.
    struct OrderCheckingPicker {
        earlier: Mutex<Vec<oneshot::Receiver<FileSelection>>>,
        violations: Mutex<usize>,
    }

    impl FilePicker for OrderCheckingPicker {
        fn launch(&self, _ticket: SelectionTicket, _extensions: &[String]) -> Result<(), AppError> {
            for receiver in self.earlier.lock().unwrap().iter_mut() {
                if matches!(receiver.try_recv(), Err(TryRecvError::Empty)) {
                    *self.violations.lock().unwrap() += 1;
                }
            }
            Ok(())
        }

        fn launch_default(&self, _ticket: SelectionTicket) -> Result<(), AppError> {
            Ok(())
        }
    }

    #[test]
    fn test_success_resolves_single_locator_and_clears_slot() {
        let handshake = FileSelectionHandshake::new();
        let picker = RecordingPicker::default();

        let mut rx = handshake.begin(&SelectionParams::images(), &picker);
        assert!(handshake.is_pending());

        let ticket = picker.last_ticket();
        assert!(handshake.complete(ticket, Some("content://media/42".to_string())));

        assert_eq!(rx.try_recv().unwrap(), Some(vec!["content://media/42".to_string()]));
        assert!(!handshake.is_pending());
    }

    #[test]
    fn test_cancel_and_empty_result_resolve_to_no_selection() {
        let handshake = FileSelectionHandshake::new();
        let picker = RecordingPicker::default();

        let mut cancelled = handshake.begin(&SelectionParams::default(), &picker);
        handshake.complete(picker.last_ticket(), None);
        assert_eq!(cancelled.try_recv().unwrap(), None);

        let mut empty = handshake.begin(&SelectionParams::default(), &picker);
        handshake.complete(picker.last_ticket(), Some(String::new()));
        assert_eq!(empty.try_recv().unwrap(), None);
        assert!(!handshake.is_pending());
    }

    #[test]
    fn test_second_request_preempts_first_before_launch() {
        let handshake = FileSelectionHandshake::new();
        let picker = OrderCheckingPicker {
            earlier: Mutex::new(Vec::new()),
            violations: Mutex::new(0),
        };

        let first = handshake.begin(&SelectionParams::images(), &picker);
        picker.earlier.lock().unwrap().push(first);
        let _second = handshake.begin(&SelectionParams::images(), &picker);

        assert_eq!(*picker.violations.lock().unwrap(), 0);
        assert!(handshake.is_pending());
    }

    #[test]
    fn test_preempted_request_sees_no_selection() {
        let handshake = FileSelectionHandshake::new();
        let picker = RecordingPicker::default();

        let mut first = handshake.begin(&SelectionParams::images(), &picker);
        let first_ticket = picker.last_ticket();
        let mut second = handshake.begin(&SelectionParams::images(), &picker);

        assert_eq!(first.try_recv().unwrap(), None);

        // A late answer for the preempted picker must not leak into the new request.
        assert!(!handshake.complete(first_ticket, Some("file:///stale.png".to_string())));
        assert!(matches!(second.try_recv(), Err(TryRecvError::Empty)));

        assert!(handshake.complete(picker.last_ticket(), Some("file:///fresh.png".to_string())));
        assert_eq!(second.try_recv().unwrap(), Some(vec!["file:///fresh.png".to_string()]));
    }

    #[test]
    fn test_unknown_accept_types_fall_back_to_image_picker() {
        let handshake = FileSelectionHandshake::new();
        let picker = RecordingPicker::default();
        let params = SelectionParams {
            accept_types: vec!["application/x-unknown".to_string()],
        };

        let _rx = handshake.begin(&params, &picker);

        let launches = picker.launches.lock().unwrap().clone();
        assert_eq!(launches.len(), 1);
        assert!(matches!(launches[0], Launch::Default(_)));
        assert!(handshake.is_pending());
    }

    #[test]
    fn test_picker_failure_falls_back_to_default() {
        let handshake = FileSelectionHandshake::new();
        let picker = RecordingPicker::failing(true, false);

        let _rx = handshake.begin(&SelectionParams::images(), &picker);

        assert!(matches!(picker.last_ticket(), SelectionTicket(1)));
        assert!(matches!(
            picker.launches.lock().unwrap()[0],
            Launch::Default(SelectionTicket(1))
        ));
    }

    #[test]
    fn test_total_picker_failure_resolves_without_hanging() {
        let handshake = FileSelectionHandshake::new();
        let picker = RecordingPicker::failing(true, true);

        let mut rx = handshake.begin(&SelectionParams::images(), &picker);

        assert_eq!(rx.try_recv().unwrap(), None);
        assert!(!handshake.is_pending());
    }

    #[test]
    fn test_preferred_launch_receives_resolved_extensions() {
        let handshake = FileSelectionHandshake::new();
        let picker = RecordingPicker::default();
        let params = SelectionParams {
            accept_types: vec!["image/png".to_string()],
        };

        let _rx = handshake.begin(&params, &picker);

        assert_eq!(
            picker.launches.lock().unwrap()[0],
            Launch::Preferred(SelectionTicket(1), vec!["png".to_string()])
        );
    }
}
