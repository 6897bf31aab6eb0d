use tokio::sync::mpsc;
use tracing::warn;

use crate::messages::GuidanceCommand;

/// Where a runner sends the commands its state machine emits.
///
/// Emission is fire-and-forget: a sink must not block and has no way to report failure back
/// into guidance.
pub trait CommandSink: Send + 'static {
    fn emit(&mut self, command: GuidanceCommand);
}

impl CommandSink for mpsc::UnboundedSender<GuidanceCommand> {
    fn emit(&mut self, command: GuidanceCommand) {
        if let Err(e) = self.send(command) {
            warn!(command = ?e.0, "Command sink closed, dropping command");
        }
    }
}
