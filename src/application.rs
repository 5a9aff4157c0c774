use gtk::subclass::prelude::*;
use gtk::{gio, glib};

use crate::panel::PanelWindow;

mod imp {
    use std::cell::{OnceCell, RefCell};
    use std::rc::Rc;

    use adw::subclass::prelude::AdwApplicationImpl;
    use glib::object::ObjectExt;
    use glib::WeakRef;
    use gtk::gdk;
    use gtk::prelude::*;
    use gtk4_layer_shell::{Edge, LayerShell};

    use super::*;
    use crate::sass::load_user_style;
    use crate::watcher::{self, WatcherHandle};
    use crate::widgets::indicator::UpdateIndicator;

    #[derive(Default)]
    pub struct Application {
        panel: OnceCell<WeakRef<PanelWindow>>,
        watcher: RefCell<Option<WatcherHandle>>,
        hold: OnceCell<gio::ApplicationHoldGuard>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for Application {
        const NAME: &'static str = "Application";
        type Type = super::Application;
        type ParentType = adw::Application;
    }

    impl ObjectImpl for Application {}

    impl ApplicationImpl for Application {
        fn activate(&self) {
            self.parent_activate();
            let app = self.obj();

            if self.panel.get().is_some() {
                // The watcher alone decides whether the panel is shown.
                debug!("Already activated");
                return;
            }

            let indicator = UpdateIndicator::new();
            let panel_window = PanelWindow::new(&app);
            panel_window.init_layer_shell();
            panel_window.set_namespace("uupd-indicator");
            panel_window.set_layer(gtk4_layer_shell::Layer::Top);
            panel_window.set_anchor(Edge::Top, true);
            panel_window.set_anchor(Edge::Right, true);
            panel_window.set_indicator(&indicator);
            let _ = self.panel.set(ObjectExt::downgrade(&panel_window));

            // Nothing is shown most of the time, keep running without any visible window.
            let _ = self.hold.set(app.hold());

            info!("Watching uupd units");
            let handle = watcher::spawn(Rc::new(indicator));
            self.watcher.replace(Some(handle));
        }

        fn startup(&self) {
            self.parent_startup();

            // The bundled style is loaded by GTK from the resource base path, user style goes on
            // top of it.
            let Some(css) = load_user_style() else {
                return;
            };
            let Some(display) = gdk::Display::default() else {
                warn!("No display, custom style not applied");
                return;
            };

            let provider = gtk::CssProvider::new();
            provider.load_from_string(&css);
            gtk::style_context_add_provider_for_display(
                &display,
                &provider,
                gtk::STYLE_PROVIDER_PRIORITY_USER,
            );
        }

        fn shutdown(&self) {
            if let Some(handle) = self.watcher.take() {
                handle.teardown();
            }

            self.parent_shutdown();
        }
    }

    impl GtkApplicationImpl for Application {}
    impl AdwApplicationImpl for Application {}
}

glib::wrapper! {
    pub struct Application(ObjectSubclass<imp::Application>)
        @extends gtk::Application, adw::Application, gio::Application,
        @implements gio::ActionGroup, gio::ActionMap;
}

impl Application {
    pub fn new() -> Self {
        glib::Object::builder()
            .property("application-id", "io.projectbluefin.UupdIndicator")
            .property("resource-base-path", "/io/projectbluefin/UupdIndicator/")
            .build()
    }
}
