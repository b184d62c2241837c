use ner_error::{Error, ErrorPolicy, Severity, TracingPolicy};

use crate::app::AppCommand;

/// Logs like [`TracingPolicy`] and also puts the message in the status bar.
#[derive(Debug, Clone)]
pub struct StatusPolicy {
    commands: flume::Sender<AppCommand>,
}

impl StatusPolicy {
    pub fn new(commands: flume::Sender<AppCommand>) -> Self {
        Self { commands }
    }
}

impl ErrorPolicy for StatusPolicy {
    fn classify(&self, error: &Error) -> Severity {
        error.severity()
    }

    fn emit(&self, error: &Error) {
        TracingPolicy.emit(error);
        // a closed channel means the app is shutting down
        let _ = self.commands.try_send(AppCommand::Notify(error.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use ner_error::ResultExt;

    use super::*;

    #[test]
    fn errors_reach_the_status_bar() {
        let (tx, rx) = flume::unbounded();
        let policy = StatusPolicy::new(tx);
        let result: ner_error::Result<()> = Err(Error::tag_rejected("inbox", "read-only"));
        assert_eq!(result.report(&policy), None);
        assert_eq!(
            rx.try_recv().unwrap(),
            AppCommand::Notify("could not change tag `inbox`: read-only".into())
        );
    }
}
