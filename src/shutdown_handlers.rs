use tracing::{info, warn};

use crate::shutdown::StopFlag;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Sets `stop` on Ctrl+C or SIGTERM. The task also ends once `stop` is set
/// by anyone else.
pub fn setup_signal_shutdown_handler(stop: &StopFlag) -> tokio::task::JoinHandle<()> {
    let stop = stop.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        let mut term_signal = match signal(SignalKind::terminate()) {
            Ok(signal) => Some(signal),
            Err(err) => {
                warn!("Failed to register SIGTERM handler: {}", err);
                None
            }
        };

        #[cfg(unix)]
        {
            tokio::select! {
                () = stop.stopped() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupt received, stopping workers.");
                    stop.stop();
                }
                () = async {
                    if let Some(signal) = term_signal.as_mut() {
                        signal.recv().await;
                    } else {
                        std::future::pending::<()>().await;
                    }
                } => {
                    info!("SIGTERM received, stopping workers.");
                    stop.stop();
                }
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                () = stop.stopped() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupt received, stopping workers.");
                    stop.stop();
                }
            }
        }
    })
}
