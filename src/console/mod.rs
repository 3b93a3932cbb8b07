// Admin console view-models: page chrome, drawers, dialogs, notices and the
// list page controller that composes them

pub mod confirm;
pub mod drawer;
pub mod layout;
pub mod list_page;
pub mod notice;

pub use confirm::{ConfirmState, DeleteConfirmation};
pub use drawer::{DrawerSize, DrawerSurface, FormDrawer};
pub use layout::{DataManagementLayout, FilterPlacement, PageHeader, Viewport};
pub use list_page::{ListPage, PageStatus};
pub use notice::{Notice, NoticeLevel, Notices};
