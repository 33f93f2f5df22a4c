use crate::bootstrap::Bootstrap;
use crate::filter::{Counts, Filter, FilterOption, NO_STATUS_CODE_FILTER};
use crate::pagination::{self, PageMove, PageView};
use crate::sort::{sort_redirects, SortColumn, SortDirection};
use detour_core::Redirect;
use tracing::trace;

/// Everything that can happen to the redirect list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction {
    UpdateSearch(String),
    FilterStatusCode(i32),
    FilterType(String),
    SortBy(SortColumn),
    Paginate(PageMove),
    Edit(Redirect),
    CancelEdit,
    /// Redirects returned by a create action.
    RedirectCreated(Vec<Redirect>),
    /// Redirects returned by an update of `original`.
    RedirectUpdated {
        changed: Vec<Redirect>,
        original: Redirect,
    },
    RedirectDeleted(Redirect),
}

/// State of the filterable, sortable and paginated redirect list.
///
/// All changes go through [`ListState::apply`]; the filtered list, the
/// counts and the page are derived again after every action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    redirects: Vec<Redirect>,
    filtered_redirects: Vec<Redirect>,
    filter: Filter,
    sort_by: SortColumn,
    sort_direction: SortDirection,
    current_page: usize,
    counts: Counts,
    edited_redirect: Option<Redirect>,
}

impl ListState {
    pub fn new(redirects: Vec<Redirect>) -> Self {
        Self::with_filters(redirects, NO_STATUS_CODE_FILTER, String::new())
    }

    pub fn with_filters(redirects: Vec<Redirect>, status_code: i32, redirect_type: String) -> Self {
        let mut state = Self {
            redirects,
            filtered_redirects: Vec::new(),
            filter: Filter {
                status_code,
                redirect_type,
                ..Filter::default()
            },
            sort_by: SortColumn::default(),
            sort_direction: SortDirection::default(),
            current_page: 0,
            counts: Counts::default(),
            edited_redirect: None,
        };
        state.refresh(true);
        state
    }

    pub fn from_bootstrap(bootstrap: &Bootstrap) -> Self {
        Self::with_filters(
            bootstrap.redirects.clone(),
            bootstrap.initial_status_code_filter,
            bootstrap.initial_type_filter.clone(),
        )
    }

    pub fn apply(&mut self, action: ListAction) {
        trace!(?action, "list action");
        match action {
            ListAction::UpdateSearch(search) => {
                self.filter.search_value = Filter::normalize_search(&search);
                self.refresh(true);
            }
            ListAction::FilterStatusCode(status_code) => {
                self.filter.status_code = status_code;
                self.refresh(true);
            }
            ListAction::FilterType(redirect_type) => {
                self.filter.redirect_type = redirect_type;
                self.refresh(true);
            }
            ListAction::SortBy(column) => {
                self.sort_direction = if column == self.sort_by {
                    self.sort_direction.toggled()
                } else {
                    SortDirection::Asc
                };
                self.sort_by = column;
                self.refresh(false);
            }
            ListAction::Paginate(page_move) => {
                self.current_page = pagination::move_page(
                    self.current_page,
                    page_move,
                    self.filtered_redirects.len(),
                );
            }
            ListAction::Edit(redirect) => self.edited_redirect = Some(redirect),
            ListAction::CancelEdit => self.edited_redirect = None,
            ListAction::RedirectCreated(changed) => self.merge(changed),
            ListAction::RedirectUpdated { changed, original } => {
                self.remove(&original);
                self.merge(changed);
            }
            ListAction::RedirectDeleted(redirect) => {
                self.remove(&redirect);
                self.refresh(false);
            }
        }
    }

    /// Replaces redirects with the same identity and appends the rest.
    fn merge(&mut self, mut changed: Vec<Redirect>) {
        for redirect in &mut self.redirects {
            let position = changed.iter().position(|candidate| {
                candidate.has_identity(&redirect.source_uri_path, redirect.host.as_ref())
            });
            if let Some(position) = position {
                *redirect = changed.remove(position);
            }
        }
        self.redirects.extend(changed);
        self.edited_redirect = None;
        self.refresh(false);
    }

    fn remove(&mut self, redirect: &Redirect) {
        self.redirects.retain(|stored| {
            !stored.has_identity(&redirect.source_uri_path, redirect.host.as_ref())
        });
        if self
            .edited_redirect
            .as_ref()
            .is_some_and(|edited| edited.identity() == redirect.identity())
        {
            self.edited_redirect = None;
        }
    }

    fn refresh(&mut self, reset_page: bool) {
        self.counts = Counts::of(&self.redirects);
        if self.counts.status_code(self.filter.status_code) == 0 {
            self.filter.status_code = NO_STATUS_CODE_FILTER;
        }
        if self.counts.redirect_type(&self.filter.redirect_type) == 0 {
            self.filter.redirect_type.clear();
        }

        self.filtered_redirects = self.filter.apply(&self.redirects);
        sort_redirects(&mut self.filtered_redirects, self.sort_by, self.sort_direction);

        self.current_page = if reset_page {
            0
        } else {
            self.current_page.min(self.max_page())
        };
    }

    pub fn redirects(&self) -> &[Redirect] {
        &self.redirects
    }

    pub fn filtered_redirects(&self) -> &[Redirect] {
        &self.filtered_redirects
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn search_value(&self) -> &str {
        &self.filter.search_value
    }

    pub fn filter_status_code(&self) -> i32 {
        self.filter.status_code
    }

    pub fn filter_type(&self) -> &str {
        &self.filter.redirect_type
    }

    pub fn sort_by(&self) -> SortColumn {
        self.sort_by
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn max_page(&self) -> usize {
        pagination::max_page(self.filtered_redirects.len())
    }

    pub fn counts(&self) -> &Counts {
        &self.counts
    }

    pub fn edited_redirect(&self) -> Option<&Redirect> {
        self.edited_redirect.as_ref()
    }

    pub fn page(&self) -> PageView {
        PageView::of(&self.filtered_redirects, self.current_page)
    }

    pub fn status_code_options(&self) -> Vec<FilterOption<u16>> {
        self.counts
            .by_status_code
            .iter()
            .map(|(&value, &count)| FilterOption { value, count })
            .collect()
    }

    pub fn type_options(&self) -> Vec<FilterOption<String>> {
        self.counts
            .by_type
            .iter()
            .map(|(value, &count)| FilterOption {
                value: value.clone(),
                count,
            })
            .collect()
    }
}
