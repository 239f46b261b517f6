pub mod detail;
pub mod filter;
pub mod pagination;
pub mod profile;
pub mod progress;
pub mod search;
pub mod sort;
pub mod state;

pub use detail::ItemDetail;
pub use filter::{
    FilterSettings,
    FilterState,
    OwnershipFilter,
};
pub use pagination::{
    LoadMore,
    Paginator,
    PAGE_SIZE,
};
pub use profile::{
    profile_for,
    Acquisition,
    CollectionProfile,
};
pub use progress::Progress;
pub use search::{
    SearchDebouncer,
    SearchUpdate,
};
pub use sort::SortKey;
pub use state::{
    Browser,
    Page,
};
