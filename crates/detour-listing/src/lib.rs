//! The redirect list engine.
//!
//! A pure, synchronous model of the admin list: filtering, counting,
//! sorting and paging of redirects, merging the results of create, update
//! and delete actions, and the state of the redirect form. The server
//! renders its initial [`Bootstrap`] dataset; everything else is derived.

pub mod bootstrap;
pub mod filter;
pub mod form;
pub mod pagination;
pub mod sort;
pub mod state;

pub use bootstrap::{host_options, Actions, Bootstrap};
pub use filter::{Counts, Filter, FilterOption, NO_STATUS_CODE_FILTER};
pub use form::{FormError, FormState, FormSubmission, SubmissionArguments};
pub use pagination::{PageMove, PageView, ITEMS_PER_PAGE};
pub use sort::{SortColumn, SortDirection};
pub use state::{ListAction, ListState};
