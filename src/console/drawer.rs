// Form Drawer Host - create/edit forms slide in from the side on desktop and
// from the bottom on mobile. The host never validates; it only guards submit.

use super::layout::Viewport;

pub const SAVING_LABEL: &str = "Saving...";
pub const MOBILE_MAX_HEIGHT: &str = "max-h-[90vh]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawerSize {
    Sm,
    #[default]
    Md,
    Lg,
    Xl,
    Full,
}

impl DrawerSize {
    pub fn width_class(self) -> &'static str {
        match self {
            DrawerSize::Sm => "sm:max-w-sm",
            DrawerSize::Md => "sm:max-w-md",
            DrawerSize::Lg => "sm:max-w-lg",
            DrawerSize::Xl => "sm:max-w-xl",
            DrawerSize::Full => "sm:max-w-full",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawerSurface {
    BottomDrawer { max_height: &'static str },
    SidePanel { width_class: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDrawer {
    title: String,
    description: Option<String>,
    open: bool,
    is_submitting: bool,
    submit_label: String,
    cancel_label: String,
    size: DrawerSize,
}

impl FormDrawer {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            description: None,
            open: false,
            is_submitting: false,
            submit_label: "Save".to_string(),
            cancel_label: "Cancel".to_string(),
            size: DrawerSize::default(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_labels(mut self, submit: &str, cancel: &str) -> Self {
        self.submit_label = submit.to_string();
        self.cancel_label = cancel.to_string();
        self
    }

    pub fn with_size(mut self, size: DrawerSize) -> Self {
        self.size = size;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close via cancel, backdrop or the close button. Never submits.
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn surface(&self, viewport: Viewport) -> DrawerSurface {
        match viewport {
            Viewport::Mobile => DrawerSurface::BottomDrawer {
                max_height: MOBILE_MAX_HEIGHT,
            },
            Viewport::Desktop => DrawerSurface::SidePanel {
                width_class: self.size.width_class(),
            },
        }
    }

    pub fn submit_label(&self) -> &str {
        if self.is_submitting {
            SAVING_LABEL
        } else {
            &self.submit_label
        }
    }

    pub fn cancel_label(&self) -> &str {
        &self.cancel_label
    }

    pub fn submit_enabled(&self) -> bool {
        self.open && !self.is_submitting
    }

    /// Submit pressed. `false` when the press must be ignored.
    pub fn begin_submit(&mut self) -> bool {
        if !self.submit_enabled() {
            return false;
        }
        self.is_submitting = true;
        true
    }

    /// The submit handler finished; the drawer closes only on success.
    pub fn finish_submit(&mut self, success: bool) {
        self.is_submitting = false;
        if success {
            self.open = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_by_viewport() {
        let drawer = FormDrawer::new("Add Country").with_size(DrawerSize::Lg);
        assert_eq!(
            drawer.surface(Viewport::Desktop),
            DrawerSurface::SidePanel { width_class: "sm:max-w-lg" }
        );
        assert_eq!(
            drawer.surface(Viewport::Mobile),
            DrawerSurface::BottomDrawer { max_height: "max-h-[90vh]" }
        );
    }

    #[test]
    fn test_double_submit_is_ignored() {
        let mut drawer = FormDrawer::new("Add Country");
        assert!(!drawer.begin_submit());
        drawer.open();
        assert_eq!(drawer.submit_label(), "Save");
        assert!(drawer.begin_submit());
        assert_eq!(drawer.submit_label(), "Saving...");
        assert!(!drawer.begin_submit());
        drawer.finish_submit(false);
        assert!(drawer.is_open());
        assert!(drawer.begin_submit());
        drawer.finish_submit(true);
        assert!(!drawer.is_open());
    }

    #[test]
    fn test_custom_labels() {
        let drawer = FormDrawer::new("Edit").with_labels("Update", "Discard");
        assert_eq!(drawer.submit_label(), "Update");
        assert_eq!(drawer.cancel_label(), "Discard");
    }
}
