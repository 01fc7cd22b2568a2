use super::{LayoutChannel, OutboundMessage};
use crate::error::ChannelError;

/// In-process channel that records outbound messages instead of sending them.
#[derive(Debug, Default)]
pub struct LoopbackChannel {
    connected: bool,
    sent: Vec<OutboundMessage>,
}

impl LoopbackChannel {
    pub fn connected() -> Self {
        Self {
            connected: true,
            sent: Vec::new(),
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn sent(&self) -> &[OutboundMessage] {
        &self.sent
    }

    pub fn take_sent(&mut self) -> Vec<OutboundMessage> {
        std::mem::take(&mut self.sent)
    }
}

impl LayoutChannel for LoopbackChannel {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn send(&mut self, message: OutboundMessage) -> Result<(), ChannelError> {
        if !self.connected {
            return Err(ChannelError::Disconnected);
        }
        self.sent.push(message);
        Ok(())
    }
}
