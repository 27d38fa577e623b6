use airwatch_core::Notifier;

/// Alerts printed to stderr. In interactive sessions the user has to
/// acknowledge each one before the action continues.
#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    acknowledge: bool,
}

impl TerminalNotifier {
    pub fn new(acknowledge: bool) -> Self {
        Self { acknowledge }
    }
}

impl Notifier for TerminalNotifier {
    fn alert(&self, message: &str) {
        eprintln!("! {message}");

        if self.acknowledge {
            // Cancelling the prompt counts as acknowledging it.
            let _ = inquire::Text::new("Press Enter to continue").prompt_skippable();
        }
    }
}
