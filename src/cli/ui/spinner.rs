//! Progress spinner for network-bound steps

use is_terminal::IsTerminal;
use std::future::Future;
use std::io::{self, Write};
use std::time::Duration;
use tokio::sync::oneshot;

const FRAMES: [char; 4] = ['|', '/', '-', '\\'];
const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Run a future while a spinner is drawn on stdout
///
/// Nothing is drawn when stdout is not a terminal, so piped output stays clean.
pub async fn with_spinner<F, T>(message: impl Into<String>, future: F) -> T
where
    F: Future<Output = T>,
{
    if !io::stdout().is_terminal() {
        return future.await;
    }

    let (done_tx, done_rx) = oneshot::channel();
    let spinner = tokio::spawn(spin(message.into(), done_rx));
    let output = future.await;
    let _ = done_tx.send(());
    let _ = spinner.await;
    output
}

async fn spin(message: String, mut done_rx: oneshot::Receiver<()>) {
    let mut ticker = tokio::time::interval(FRAME_INTERVAL);
    let mut stdout = io::stdout();

    for frame in FRAMES.iter().cycle() {
        let _ = write!(stdout, "\r{} {}", frame, message);
        let _ = stdout.flush();
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut done_rx => break,
        }
    }

    let _ = write!(stdout, "\r\x1b[K");
    let _ = stdout.flush();
}
