use crate::content::{Album, ContentStore};
use crate::i18n::Lang;

/// Literal used in query strings and file names for a disabled predicate.
pub const ALL: &str = "all";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum YearFilter {
    #[default]
    All,
    Only(i32),
}

/// Which dimension an active filter chip belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    Category,
    Year,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub category: CategoryFilter,
    pub year: YearFilter,
}

impl FilterSelection {
    /// Parse the string form used by URLs. Empty, absent and `all` disable a
    /// predicate; a year that is not a number does too.
    pub fn from_params(category: Option<&str>, year: Option<&str>) -> Self {
        let category = match category.map(str::trim) {
            None | Some("") | Some(ALL) => CategoryFilter::All,
            Some(id) => CategoryFilter::Only(id.to_string()),
        };
        let year = match year.map(str::trim).and_then(|y| y.parse::<i32>().ok()) {
            Some(y) => YearFilter::Only(y),
            None => YearFilter::All,
        };
        Self { category, year }
    }

    #[cfg(test)]
    pub fn category(id: &str) -> Self {
        Self {
            category: CategoryFilter::Only(id.to_string()),
            year: YearFilter::All,
        }
    }

    #[cfg(test)]
    pub fn year(year: i32) -> Self {
        Self {
            category: CategoryFilter::All,
            year: YearFilter::Only(year),
        }
    }

    pub fn is_all(&self) -> bool {
        self.category == CategoryFilter::All && self.year == YearFilter::All
    }

    pub fn category_param(&self) -> &str {
        match &self.category {
            CategoryFilter::All => ALL,
            CategoryFilter::Only(id) => id.as_str(),
        }
    }

    pub fn year_param(&self) -> String {
        match self.year {
            YearFilter::All => ALL.to_string(),
            YearFilter::Only(y) => y.to_string(),
        }
    }

    /// The same selection with one dimension reset to "all".
    pub fn without(&self, kind: FilterKind) -> Self {
        let mut next = self.clone();
        match kind {
            FilterKind::Category => next.category = CategoryFilter::All,
            FilterKind::Year => next.year = YearFilter::All,
        }
        next
    }

    /// Every active predicate names a category or year the store lists.
    pub fn is_known(&self, store: &ContentStore) -> bool {
        let category_known = match &self.category {
            CategoryFilter::All => true,
            CategoryFilter::Only(id) => store.category(id).is_some(),
        };
        let year_known = match self.year {
            YearFilter::All => true,
            YearFilter::Only(y) => store.years().contains(&y),
        };
        category_known && year_known
    }

    pub fn matches(&self, album: &Album) -> bool {
        let category_match = match &self.category {
            CategoryFilter::All => true,
            CategoryFilter::Only(id) => album.category == *id,
        };
        let year_match = match self.year {
            YearFilter::All => true,
            YearFilter::Only(y) => album.year == y,
        };
        category_match && year_match
    }
}

/// Albums passing both predicates, in their original order.
pub fn apply<'a>(albums: &'a [Album], selection: &FilterSelection) -> Vec<&'a Album> {
    albums.iter().filter(|a| selection.matches(a)).collect()
}

/// A removable chip describing one active predicate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterTag {
    pub kind: FilterKind,
    pub label: String,
}

/// Chips for the active predicates. A category id missing from the store gets no chip.
pub fn active_tags(store: &ContentStore, selection: &FilterSelection, lang: Lang) -> Vec<FilterTag> {
    let mut tags = Vec::new();
    if let CategoryFilter::Only(id) = &selection.category {
        if store.category(id).is_some() {
            tags.push(FilterTag {
                kind: FilterKind::Category,
                label: store.category_name(id, lang).to_string(),
            });
        }
    }
    if let YearFilter::Only(y) = selection.year {
        tags.push(FilterTag {
            kind: FilterKind::Year,
            label: y.to_string(),
        });
    }
    tags
}

/// Result-count line shown above the grid.
pub fn results_count(count: usize, lang: Lang) -> String {
    match lang {
        Lang::Bn => format!("{count}টি অ্যালবাম পাওয়া গেছে"),
        Lang::En => format!("Found {count} album{}", if count == 1 { "" } else { "s" }),
    }
}
