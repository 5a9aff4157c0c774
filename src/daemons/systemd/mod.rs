//! systemd units watched over D-Bus.
//!
//! Both watched units go through the same code, a [`UnitWatch`] only tells which unit to connect
//! to and which of its properties to follow. Values are reported to the [`Watcher`] as
//! [`UnitEvent`]s.
//!
//! [`Watcher`]: crate::watcher::Watcher

mod path;

use anyhow::Context;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use zbus::proxy::CacheProperties;

pub use self::path::unit_object_path;
use crate::watcher::{Unit, UnitEvent};

/// The `org.freedesktop.systemd1.Unit` interface, only with what we need.
///
/// See <https://www.freedesktop.org/software/systemd/man/latest/org.freedesktop.systemd1.html>
#[zbus::proxy(
    interface = "org.freedesktop.systemd1.Unit",
    default_service = "org.freedesktop.systemd1",
    gen_blocking = false
)]
pub trait SystemdUnit {
    /// Whether the unit file is enabled: "enabled", "disabled", "static", "masked", ...
    #[zbus(property)]
    fn unit_file_state(&self) -> zbus::Result<String>;

    /// Runtime state: "active", "activating", "deactivating", "inactive", "failed", ...
    #[zbus(property)]
    fn active_state(&self) -> zbus::Result<String>;
}

/// A systemd unit and the property we follow on it.
#[derive(Debug)]
pub struct UnitWatch {
    pub unit: Unit,
    pub unit_name: &'static str,
    pub property: &'static str,
}

impl UnitWatch {
    /// Get the D-Bus object path of this unit.
    pub fn object_path(&self) -> String {
        unit_object_path(self.unit_name)
    }
}

/// The timer scheduling updates. We only care whether it's enabled.
pub static TIMER: UnitWatch = UnitWatch {
    unit: Unit::Timer,
    unit_name: "uupd.timer",
    property: "UnitFileState",
};

/// The update service itself.
pub static SERVICE: UnitWatch = UnitWatch {
    unit: Unit::Service,
    unit_name: "uupd.service",
    property: "ActiveState",
};

/// Connect to the unit of `watch` on `conn` and report its property to `events` until the
/// receiving side goes away.
///
/// There's a single connection attempt. If it fails, or there's no bus connection at all,
/// [`UnitEvent::Failed`] is sent and the unit stays failed for the lifetime of the watcher.
pub async fn watch_unit(
    conn: Option<zbus::Connection>,
    watch: &'static UnitWatch,
    events: mpsc::UnboundedSender<UnitEvent>,
) {
    let unit = watch.unit;
    let proxy = match connect(conn, watch).await {
        Ok(proxy) => proxy,
        Err(err) => {
            error!(unit = watch.unit_name, ?err, "Failed to initialize unit proxy");
            let _ = events.send(UnitEvent::Failed { unit });
            return;
        }
    };
    info!(unit = watch.unit_name, "Unit proxy initialized");

    // Subscribe before the first read, otherwise a change landing in between gets lost.
    let mut changes = proxy
        .inner()
        .receive_property_changed::<String>(watch.property)
        .await;

    let value = read_cached(&proxy, watch);
    if events.send(UnitEvent::Ready { unit, value }).is_err() {
        return;
    }

    while let Some(changed) = changes.next().await {
        // zbus updates its cache before notifying us, so this is the new value.
        let value = read_cached(&proxy, watch);
        debug!(
            unit = watch.unit_name,
            property = changed.name(),
            ?value,
            "Property changed"
        );

        if events.send(UnitEvent::Changed { unit, value }).is_err() {
            break; // watcher is gone
        }
    }
}

async fn connect(
    conn: Option<zbus::Connection>,
    watch: &UnitWatch,
) -> anyhow::Result<SystemdUnitProxy<'static>> {
    let conn = conn.context("System bus is not available")?;

    SystemdUnitProxy::builder(&conn)
        .path(watch.object_path())?
        // Fetch every property as part of the handshake, reads only ever hit the cache.
        .cache_properties(CacheProperties::Yes)
        .build()
        .await
        .with_context(|| format!("Failed to create proxy for {}", watch.unit_name))
}

/// Read the cached value of the watched property.
///
/// Returns `None` when nothing is cached. A value that isn't a string is logged and treated the
/// same way.
pub fn read_cached(proxy: &SystemdUnitProxy<'_>, watch: &UnitWatch) -> Option<String> {
    match proxy.inner().cached_property::<String>(watch.property) {
        Ok(value) => value,
        Err(err) => {
            warn!(
                unit = watch.unit_name,
                property = watch.property,
                ?err,
                "Failed to decode cached property"
            );
            None
        }
    }
}
