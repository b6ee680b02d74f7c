use crate::error::{Error, Result};
use tokio::signal;

/// Resolves on the first ctrl-c, SIGINT, SIGTERM or SIGQUIT.
#[cfg(unix)]
pub async fn signal_for_shutdown() -> Result<()> {
    use tokio::signal::unix::{signal as unix_signal, SignalKind};

    let signal_error = |err: std::io::Error| Error::Transport(format!("signal handler: {}", err));
    let mut interrupt_signal = unix_signal(SignalKind::interrupt()).map_err(signal_error)?;
    let mut terminate_signal = unix_signal(SignalKind::terminate()).map_err(signal_error)?;
    let mut quit_signal = unix_signal(SignalKind::quit()).map_err(signal_error)?;

    tokio::select! {
        _ = signal::ctrl_c() => (),
        _ = interrupt_signal.recv() => (),
        _ = terminate_signal.recv() => (),
        _ = quit_signal.recv() => (),
    }
    Ok(())
}

#[cfg(not(unix))]
pub async fn signal_for_shutdown() -> Result<()> {
    signal::ctrl_c()
        .await
        .map_err(|err| Error::Transport(format!("signal handler: {}", err)))
}
