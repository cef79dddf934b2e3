// ABOUTME: Cooperative cancellation signal shared between a caller and the generation loop
// ABOUTME: Built on a tokio watch channel so any number of clones can wait on one cancel call
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;
use tokio::sync::watch;

/// Clonable cancellation signal
///
/// Cancelling is sticky: once [`CancellationToken::cancel`] has been called,
/// every clone reports cancelled and every pending
/// [`CancellationToken::cancelled`] future resolves.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    /// Create a token in the not-cancelled state
    #[must_use]
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Signal cancellation to every clone
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    /// Whether cancellation has been signalled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolve once cancellation is signalled
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives as long as `self`, so waiting cannot fail.
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}
