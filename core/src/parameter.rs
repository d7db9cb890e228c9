//! Named request parameters and their canonical wire encodings.
//!
//! The string forms produced here are part of the public contract with the
//! API and must not change.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::{require_non_empty, ArgumentError};

/// Issue and pull request state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Open,
    Closed,
}

impl State {
    pub fn as_str(self) -> &'static str {
        match self {
            State::Open => "open",
            State::Closed => "closed",
        }
    }
}

/// Field used to sort listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortBy {
    #[default]
    Created,
    Updated,
    Comments,
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Created => "created",
            SortBy::Updated => "updated",
            SortBy::Comments => "comments",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderBy {
    Ascending,
    #[default]
    Descending,
}

impl OrderBy {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderBy::Ascending => "asc",
            OrderBy::Descending => "desc",
        }
    }
}

/// Which issues to list for the authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    Assigned,
    Created,
    Mentioned,
    Subscribed,
}

impl Filter {
    pub fn as_str(self) -> &'static str {
        match self {
            Filter::Assigned => "assigned",
            Filter::Created => "created",
            Filter::Mentioned => "mentioned",
            Filter::Subscribed => "subscribed",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(State, SortBy, OrderBy, Filter);

/// A single `name=value` request parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    name: String,
    value: String,
}

impl Parameter {
    /// Creates a parameter; `name` must not be empty.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self, ArgumentError> {
        let name = name.into();
        require_non_empty("name", &name)?;
        Ok(Self {
            name,
            value: value.into(),
        })
    }

    // Factories below use fixed, non-empty names.
    fn named(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
        }
    }

    pub fn page(page: u32) -> Self {
        Self::named("page", page.to_string())
    }

    pub fn sort_by(sort: SortBy) -> Self {
        Self::named("sortby", sort.as_str())
    }

    pub fn state(state: State) -> Self {
        Self::named("state", state.as_str())
    }

    pub fn order_by(direction: OrderBy) -> Self {
        Self::named("direction", direction.as_str())
    }

    pub fn filter(filter: Filter) -> Self {
        Self::named("filter", filter.as_str())
    }

    /// Sortable timestamp without offset, e.g. `2011-04-10T20:09:31`.
    pub fn since(since: DateTime<Utc>) -> Self {
        Self::named("since", since.format("%Y-%m-%dT%H:%M:%S").to_string())
    }

    pub fn comment(comment: impl Into<String>) -> Self {
        Self::named("comment", comment)
    }

    pub fn sha(sha_or_branch: impl Into<String>) -> Self {
        Self::named("sha", sha_or_branch)
    }

    pub fn body(body: impl Into<String>) -> Self {
        Self::named("body", body)
    }

    pub fn commit_id(commit_id: impl Into<String>) -> Self {
        Self::named("commitid", commit_id)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}
