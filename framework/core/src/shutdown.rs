use tokio::sync::watch::{Receiver, Sender};

/// Owner side of the shutdown signal.
///
/// The signal is level triggered: once [ShutdownHandle::shutdown] has been called, every listener
/// reports shutdown on every subsequent check. The walker checks between pages and the runner
/// checks between scenarios, so a one-shot event would be missed by whichever looked second.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    sender: Sender<bool>,
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self {
            sender: tokio::sync::watch::channel(false).0,
        }
    }

    pub fn shutdown(&self) {
        self.sender.send_replace(true);
        log::debug!("Shutdown signal raised");
    }

    pub fn is_shutdown(&self) -> bool {
        *self.sender.borrow()
    }

    pub fn new_listener(&self) -> DelegatedShutdownListener {
        DelegatedShutdownListener::new(self.sender.subscribe())
    }
}

#[derive(Clone, Debug)]
pub struct DelegatedShutdownListener {
    receiver: Receiver<bool>,
}

impl DelegatedShutdownListener {
    pub(crate) fn new(receiver: Receiver<bool>) -> Self {
        Self { receiver }
    }

    /// Point in time check if the shutdown signal has been raised. If this returns true then no
    /// further requests should be issued.
    pub fn should_shutdown(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Wait for the shutdown signal. It is safe to race this with another future so that the
    /// signal can be used to cancel an in-flight request.
    pub async fn wait_for_shutdown(&mut self) {
        if self.receiver.wait_for(|raised| *raised).await.is_err() {
            // The handle was dropped without raising the signal, so shutdown can never happen.
            std::future::pending::<()>().await;
        }
    }
}

#[derive(derive_more::Error, derive_more::Display, Debug)]
pub struct ShutdownSignalError {
    msg: String,
}

impl Default for ShutdownSignalError {
    fn default() -> Self {
        Self {
            msg: "Execution cancelled by shutdown signal".to_string(),
        }
    }
}
