use crate::core::catalog::CenterCatalog;
use crate::core::similarity::{self, DEFAULT_THRESHOLD};
use crate::domain::model::Resolution;

/// Maps a raw user keyword onto catalog records, correcting misspellings
/// against the known service tags.
#[derive(Debug, Clone, Copy)]
pub struct QueryResolver {
    threshold: f64,
}

impl Default for QueryResolver {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl QueryResolver {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn resolve<'c>(&self, catalog: &'c CenterCatalog, raw_keyword: &str) -> Resolution<'c> {
        let keyword = normalize_keyword(raw_keyword);
        let tags = catalog.all_service_tags();

        // Anything the containment lookup can find is never corrected.
        let known = !keyword.is_empty() && tags.iter().any(|tag| tag.contains(keyword.as_str()));
        if known {
            tracing::debug!("Keyword '{}' matches known service tags", keyword);
            return Resolution::ExactOrSubstring {
                matches: catalog.find_by_service(&keyword),
            };
        }

        match similarity::closest_match(&keyword, tags.iter().copied(), self.threshold) {
            Some(tag) => {
                tracing::debug!("Keyword '{}' corrected to '{}'", keyword, tag);
                Resolution::Corrected {
                    suggested_tag: tag.to_string(),
                    matches: catalog.find_by_service(tag),
                }
            }
            None => {
                tracing::debug!("Keyword '{}' has no close service tag", keyword);
                Resolution::NoMatch
            }
        }
    }
}

pub fn normalize_keyword(raw: &str) -> String {
    raw.trim().to_lowercase()
}
