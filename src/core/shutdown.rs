//! # Termination signal wait.
//!
//! [`termination`] resolves with the name of the first termination signal
//! delivered to the process. On Unix that is `SIGINT` (Ctrl-C), `SIGTERM` or
//! `SIGQUIT`; elsewhere only Ctrl-C is observed.

/// Waits for a termination signal and returns its name.
///
/// Fails if a handler cannot be installed.
#[cfg(unix)]
pub(crate) async fn termination() -> std::io::Result<&'static str> {
    use futures::future::select_all;
    use tokio::signal::unix::{SignalKind, signal};

    const WATCHED: [(fn() -> SignalKind, &str); 3] = [
        (SignalKind::interrupt, "SIGINT"),
        (SignalKind::terminate, "SIGTERM"),
        (SignalKind::quit, "SIGQUIT"),
    ];

    let mut streams = Vec::with_capacity(WATCHED.len());
    for (kind, name) in WATCHED {
        streams.push((signal(kind())?, name));
    }

    let arrivals = streams.iter_mut().map(|(stream, name)| {
        let name: &'static str = *name;
        Box::pin(async move {
            let _ = stream.recv().await;
            name
        })
    });
    let (name, _, _) = select_all(arrivals).await;
    Ok(name)
}

/// Waits for Ctrl-C.
#[cfg(not(unix))]
pub(crate) async fn termination() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|()| "ctrl-c")
}
