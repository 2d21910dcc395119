//! In-process window bus.

use std::collections::HashMap;
use std::sync::Mutex;

use openvibe_core::error::{OpenVibeError, Result};
use openvibe_core::window::{WindowBus, WindowEvent};
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 64;

/// Routes events between windows hosted in the same process, one broadcast
/// channel per window label.
///
/// Emitting to a window nobody listens on succeeds and the event is dropped.
pub struct MemoryWindowBus {
    channels: Mutex<HashMap<String, broadcast::Sender<WindowEvent>>>,
    capacity: usize,
}

impl Default for MemoryWindowBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl MemoryWindowBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Drops the channel of a destroyed window. Its listeners drain what is
    /// already queued and then see the channel closed.
    pub fn close_window(&self, window_label: &str) {
        let mut channels = self
            .channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if channels.remove(window_label).is_some() {
            tracing::debug!("[WindowBus] Closed {}", window_label);
        }
    }

    fn sender(
        channels: &mut HashMap<String, broadcast::Sender<WindowEvent>>,
        label: &str,
        capacity: usize,
    ) -> broadcast::Sender<WindowEvent> {
        channels
            .entry(label.to_string())
            .or_insert_with(|| broadcast::channel(capacity).0)
            .clone()
    }
}

impl WindowBus for MemoryWindowBus {
    fn emit_to(&self, window_label: &str, event: WindowEvent) -> Result<()> {
        let sender = {
            let mut channels = self
                .channels
                .lock()
                .map_err(|_| OpenVibeError::window("window bus lock poisoned"))?;
            Self::sender(&mut channels, window_label, self.capacity)
        };

        let name = event.name.clone();
        match sender.send(event) {
            Ok(receivers) => {
                tracing::debug!(
                    "[WindowBus] {} -> {} ({} receivers)",
                    name,
                    window_label,
                    receivers
                );
            }
            Err(_) => {
                tracing::debug!("[WindowBus] {} -> {}: no listeners", name, window_label);
            }
        }
        Ok(())
    }

    fn subscribe(&self, window_label: &str) -> broadcast::Receiver<WindowEvent> {
        let mut channels = self
            .channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Self::sender(&mut channels, window_label, self.capacity).subscribe()
    }
}
