//! Application Configuration
//!
//! Configuration for the Catalog application layer.

use chrono::{Datelike, Utc};

/// Catalog application configuration
#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    /// Latest accepted release year; `None` follows the calendar
    pub year_ceiling: Option<i32>,
}

impl CatalogConfig {
    /// Create config for development
    pub fn development() -> Self {
        Self::default()
    }

    /// Latest release year a title may carry
    pub fn max_year(&self) -> i32 {
        self.year_ceiling.unwrap_or_else(|| Utc::now().year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_year() {
        assert_eq!(CatalogConfig::development().max_year(), Utc::now().year());
        let pinned = CatalogConfig {
            year_ceiling: Some(2000),
        };
        assert_eq!(pinned.max_year(), 2000);
    }
}
