use gtk::prelude::*;
use gtk::subclass::prelude::*;
use gtk::{gio, glib};

use crate::application::Application;
use crate::widgets::indicator::UpdateIndicator;

mod imp {
    use adw::subclass::prelude::AdwApplicationWindowImpl;

    use super::*;

    #[derive(Default, Debug, gtk::CompositeTemplate)]
    #[template(resource = "/io/projectbluefin/UupdIndicator/ui/panel-window.ui")]
    pub struct PanelWindow {
        #[template_child]
        pub(super) indicator_box: TemplateChild<gtk::Box>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for PanelWindow {
        const NAME: &'static str = "PanelWindow";
        type Type = super::PanelWindow;
        type ParentType = adw::ApplicationWindow;

        fn class_init(klass: &mut Self::Class) {
            klass.bind_template();
        }

        fn instance_init(obj: &glib::subclass::InitializingObject<Self>) {
            obj.init_template();
        }
    }

    impl ObjectImpl for PanelWindow {
        fn constructed(&self) {
            self.parent_constructed();
            self.obj().add_css_class("panel-window");
        }
    }

    impl WidgetImpl for PanelWindow {}
    impl WindowImpl for PanelWindow {}
    impl ApplicationWindowImpl for PanelWindow {}
    impl AdwApplicationWindowImpl for PanelWindow {}
}

glib::wrapper! {
    pub struct PanelWindow(ObjectSubclass<imp::PanelWindow>)
        @extends adw::ApplicationWindow, gtk::Widget, gtk::Window, gtk::ApplicationWindow,
        @implements gio::ActionMap, gio::ActionGroup, gtk::Root;
}

impl PanelWindow {
    pub fn new(app: &Application) -> Self {
        glib::Object::builder().property("application", app).build()
    }

    /// Put `indicator` in the panel. The window is only mapped while the indicator is visible.
    pub fn set_indicator(&self, indicator: &UpdateIndicator) {
        self.imp().indicator_box.append(indicator);

        let follow = glib::clone!(@weak self as window => move |indicator: &UpdateIndicator| {
            if indicator.is_visible() {
                window.present();
            } else {
                window.set_visible(false);
            }
        });
        follow(indicator);
        indicator.connect_visible_notify(follow);
    }
}
