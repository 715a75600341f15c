// Broken-pipe handling

/// Exit quietly once stdout loses its reader
///
/// Runs beside the login flow and does not coordinate with it: when
/// `SIGPIPE` arrives the process ends with status 0 wherever the flow is.
#[cfg(unix)]
pub fn spawn_pipe_listener() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigpipe = match signal(SignalKind::pipe()) {
        Ok(sigpipe) => sigpipe,
        Err(e) => {
            tracing::debug!("Failed to install SIGPIPE handler: {}", e);
            return;
        }
    };

    tokio::spawn(async move {
        if sigpipe.recv().await.is_some() {
            std::process::exit(0);
        }
    });
}

#[cfg(not(unix))]
pub fn spawn_pipe_listener() {}
