/// Daemons for the indicator.
///
/// The system bus connection is a singleton that lives for the entire program (IE. it lives for
/// 'static). Daemons get it from here and report back to the rest of the application through
/// channels.
use std::sync::OnceLock;

use anyhow::Context;

pub mod systemd;

static SYSTEM_CONNECTION: OnceLock<zbus::Connection> = OnceLock::new();

/// Get the connection to the system bus, if [`start`] managed to establish it.
pub fn system_connection() -> Option<&'static zbus::Connection> {
    SYSTEM_CONNECTION.get()
}

/// Connect to the system bus.
pub async fn start() -> anyhow::Result<()> {
    if SYSTEM_CONNECTION.get().is_some() {
        return Ok(());
    }

    let conn = zbus::Connection::system()
        .await
        .context("Failed to connect to the system bus")?;

    // NOTE: If we already started we handled it above.
    let _ = SYSTEM_CONNECTION.set(conn);

    Ok(())
}
