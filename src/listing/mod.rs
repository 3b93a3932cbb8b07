// List management - URL state, query state, filtering, table model and sync

pub mod engine;
pub mod filters;
pub mod query;
pub mod sync;
pub mod table;
pub mod url_state;

pub use engine::{apply_filters, list_page, paginate, total_pages, FieldValue, ListSpec, Listable, Lookup, PageSlice};
pub use filters::{ChoiceOption, Debouncer, FilterControl, FilterInput, FilterKind, FilterPanel, FilterUpdate};
pub use query::{ListQuery, SortDirection, SortOption};
pub use sync::{RequestTicket, SyncEvent, SyncMachine, SyncPhase};
pub use table::{Column, DataTable, PageItem, PaginationState, RenderedTable, SortState};
pub use url_state::{NavigateOptions, Navigation, QueryParams, UrlState, UrlValue};
