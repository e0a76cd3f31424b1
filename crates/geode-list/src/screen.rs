//! Listing screen presets.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use geode_core::error::{Error, InvalidInputError};
use geode_core::{Entity, EntityKind, ListSource, QueryState, Sort};

use crate::config::ControllerConfig;
use crate::controller::ListController;

/// The listing screens that run a list controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Minerals,
    Articles,
    Photos,
    Localities,
    /// Mineral picker used to attach associated minerals.
    AssociateMinerals,
}

impl Screen {
    /// All screens, in navigation order.
    pub const ALL: [Screen; 5] = [
        Screen::Minerals,
        Screen::Articles,
        Screen::Photos,
        Screen::Localities,
        Screen::AssociateMinerals,
    ];

    /// The collection this screen lists.
    pub fn kind(&self) -> EntityKind {
        match self {
            Screen::Minerals | Screen::AssociateMinerals => EntityKind::Mineral,
            Screen::Articles => EntityKind::Article,
            Screen::Photos => EntityKind::Photo,
            Screen::Localities => EntityKind::Locality,
        }
    }

    /// Command-line name of the screen.
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Minerals => "minerals",
            Screen::Articles => "articles",
            Screen::Photos => "photos",
            Screen::Localities => "localities",
            Screen::AssociateMinerals => "associate-minerals",
        }
    }

    /// The query a freshly opened screen starts with.
    pub fn initial_query(&self) -> QueryState {
        match self {
            Screen::Minerals | Screen::AssociateMinerals | Screen::Localities => {
                QueryState::new().with_sort(Sort::asc(self.kind().primary_field()))
            }
            Screen::Articles | Screen::Photos => QueryState::new(),
        }
    }

    /// Build an unmounted controller for this screen.
    ///
    /// # Errors
    ///
    /// Returns an error if `T` is not the record type this screen lists.
    pub fn controller<T: Entity>(
        &self,
        source: Arc<dyn ListSource>,
        config: ControllerConfig,
    ) -> Result<ListController<T>, Error> {
        if T::KIND != self.kind() {
            return Err(InvalidInputError::Kind {
                value: format!("{} on the {} screen", T::KIND.name(), self.name()),
            }
            .into());
        }
        Ok(ListController::with_query(source, config, self.initial_query()))
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Screen {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Screen::ALL
            .into_iter()
            .find(|screen| screen.name() == lower)
            .ok_or_else(|| InvalidInputError::Kind { value: s.to_string() }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picker_lists_minerals_by_name() {
        let screen: Screen = "associate-minerals".parse().unwrap();
        assert_eq!(screen.kind(), EntityKind::Mineral);
        assert_eq!(screen.initial_query().sort, Some(Sort::asc("name")));
    }

    #[test]
    fn articles_use_server_order() {
        assert!(Screen::Articles.initial_query().sort.is_none());
    }

    #[test]
    fn unknown_screen_is_rejected() {
        assert!("settings".parse::<Screen>().is_err());
    }
}
