//! The capability a command sender must provide

use crate::command::CommandDescriptor;

/// Whoever typed the command line: a chat user, a console, an RPC peer.
pub trait CommandSender {
    /// Deliver a message back to the sender
    fn send_message(&self, message: &str);

    /// Checked only for descriptors flagged as permission-gated
    fn has_permission(&self, descriptor: &CommandDescriptor) -> bool;
}
