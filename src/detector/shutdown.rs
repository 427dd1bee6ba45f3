use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use log::{info, warn};

/// Cloneable stop request shared between the detector loop and whoever wants
/// it to end (signal handler, tests).
///
/// Waits are interruptible: triggering drops the only sender, so every
/// blocked `wait` wakes immediately with a disconnect.
#[derive(Clone)]
pub struct Shutdown {
    flag: Arc<AtomicBool>,
    sender: Arc<Mutex<Option<Sender<()>>>>,
    wake: Receiver<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, wake) = bounded(0);
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            sender: Arc::new(Mutex::new(Some(sender))),
            wake,
        }
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
        let mut sender = self.sender.lock().unwrap_or_else(|e| e.into_inner());
        sender.take();
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Block for `timeout`. Returns `true` if the full time elapsed, `false`
    /// if shutdown was requested before or during the wait.
    pub fn wait(&self, timeout: Duration) -> bool {
        if self.is_triggered() {
            return false;
        }
        match self.wake.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => !self.is_triggered(),
            _ => false,
        }
    }

    /// Trigger this shutdown on Ctrl-C / SIGINT.
    ///
    /// The signal is awaited on a dedicated thread with its own
    /// current-thread runtime so the detector loop stays fully synchronous.
    pub fn trigger_on_ctrl_c(&self) {
        let shutdown = self.clone();
        let spawned = thread::Builder::new()
            .name("signal-listener".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        warn!("Signal listener unavailable: {}", e);
                        return;
                    }
                };

                runtime.block_on(async {
                    match tokio::signal::ctrl_c().await {
                        Ok(()) => {
                            info!("Interrupt received, stopping after the current step");
                            shutdown.trigger();
                        }
                        Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
                    }
                });
            });

        if let Err(e) = spawned {
            warn!("Failed to spawn signal listener: {}", e);
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
