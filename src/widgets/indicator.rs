//! The update indicator shown in the panel.
//!
//! A flat menu button with a download icon, its popover telling that an update is running. The
//! widget starts hidden, the watcher decides when it shows up.

use std::time::Duration;

use glib::prelude::*;
use gtk::glib;
use gtk::prelude::*;
use gtk::subclass::prelude::*;

use crate::watcher::Indicator;

const ICON_NAME: &str = "folder-download-symbolic";
// English only, there is no translation catalog.
const TOOLTIP: &str = "Universal Blue Update Indicator";
const MESSAGE: &str = "System update in progress...";

mod imp {
    use std::cell::{OnceCell, RefCell};

    use adw::prelude::BinExt;
    use adw::subclass::bin::BinImpl;
    use glib::subclass::object::{ObjectImpl, ObjectImplExt};
    use glib::subclass::types::{ObjectSubclass, ObjectSubclassExt};
    use gtk::subclass::widget::WidgetImpl;

    use super::*;

    #[derive(Default, Debug)]
    pub struct UpdateIndicator {
        pub(super) icon: OnceCell<gtk::Image>,
        /// The running opacity transition, if any.
        pub(super) fade: RefCell<Option<adw::TimedAnimation>>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for UpdateIndicator {
        const NAME: &'static str = "UpdateIndicator";
        type Type = super::UpdateIndicator;
        type ParentType = adw::Bin;
    }

    impl ObjectImpl for UpdateIndicator {
        fn constructed(&self) {
            self.parent_constructed();
            let obj = self.obj();
            obj.add_css_class("update-indicator");

            let icon = gtk::Image::builder()
                .icon_name(ICON_NAME)
                .icon_size(gtk::IconSize::Normal)
                .css_classes(["system-status-icon"])
                .build();

            let message = gtk::Label::builder()
                .label(MESSAGE)
                .sensitive(false)
                .build();
            let popover = gtk::Popover::builder().child(&message).build();

            let button = gtk::MenuButton::builder()
                .css_classes(["flat"])
                .tooltip_text(TOOLTIP)
                .child(&icon)
                .popover(&popover)
                .build();
            obj.set_child(Some(&button));
            obj.set_visible(false);

            let _ = self.icon.set(icon);
        }
    }

    impl WidgetImpl for UpdateIndicator {}
    impl BinImpl for UpdateIndicator {}
}

glib::wrapper! {
    pub struct UpdateIndicator(ObjectSubclass<imp::UpdateIndicator>)
        @extends adw::Bin, gtk::Widget,
        @implements gtk::Accessible, gtk::Buildable, gtk::ConstraintTarget;
}

impl UpdateIndicator {
    pub fn new() -> Self {
        glib::Object::new()
    }
}

impl Indicator for UpdateIndicator {
    fn show(&self) {
        self.set_visible(true);
    }

    fn hide(&self) {
        self.set_visible(false);
    }

    fn set_opacity(&self, opacity: u8, transition: Duration) {
        let imp = self.imp();
        let Some(icon) = imp.icon.get() else {
            return; // not constructed yet?
        };

        if let Some(fade) = imp.fade.take() {
            fade.pause();
        }

        let target = f64::from(opacity) / 255.0;
        if transition.is_zero() {
            icon.set_opacity(target);
            return;
        }

        let fade = adw::TimedAnimation::builder()
            .widget(icon)
            .value_from(icon.opacity())
            .value_to(target)
            .duration(u32::try_from(transition.as_millis()).unwrap_or(u32::MAX))
            .easing(adw::Easing::Linear)
            .target(&adw::PropertyAnimationTarget::new(icon, "opacity"))
            .build();
        fade.play();
        imp.fade.replace(Some(fade));
    }
}
