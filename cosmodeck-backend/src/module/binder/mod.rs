///! View binding: per-section loading state and derived view models

mod section;
mod state;
mod view_binder;

pub use section::{RenderError, Section, selection_from_query};
pub use state::{LoaderState, LoaderStatus, Snapshot};
pub use view_binder::{ViewBinder, ViewBinderBuilder, ViewModel};
