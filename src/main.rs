#[macro_use]
extern crate tracing;

mod application;
mod daemons;
mod panel;
mod pulse;
mod sass;
mod watcher;
mod widgets;

use gtk::gio;
use gtk::prelude::ApplicationExtManual;

fn main() -> glib::ExitCode {
    tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .init();

    // Only blocks before the main loop runs. Without a bus, both units fail and nothing shows.
    if let Err(err) = async_io::block_on(daemons::start()) {
        error!(?err, "System bus unavailable, the indicator will stay hidden");
    }

    glib::set_application_name("uupd-indicator");
    glib::log_set_default_handler(glib::rust_log_handler);
    if let Err(err) = gio::resources_register_include!("uupd-indicator.gresource") {
        error!(?err, "Failed to register resources");
        return glib::ExitCode::FAILURE;
    }

    let app = application::Application::new();
    app.run()
}
