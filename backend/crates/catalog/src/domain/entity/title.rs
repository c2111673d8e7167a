//! Title Entity
//!
//! A catalogued work (film, book, album...). One optional category, one or
//! more genres, and a rating derived from its reviews.

use kernel::id::TitleId;

use crate::domain::entity::taxon::Taxon;

/// Maximum length of a title name
pub const TITLE_NAME_MAX_LENGTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TitleFieldError {
    #[error("This field may not be blank.")]
    Blank,

    #[error("Ensure this field has no more than {max} characters.")]
    NameTooLong { max: usize },

    #[error("Ensure this value is less than or equal to {max}.")]
    YearInFuture { max: i32 },

    #[error("Ensure this value is greater than or equal to 0.")]
    YearNegative,

    #[error("This list may not be empty.")]
    NoGenres,
}

/// Trimmed, non-blank, at most [`TITLE_NAME_MAX_LENGTH`] characters
pub fn validate_name(value: String) -> Result<String, TitleFieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(TitleFieldError::Blank);
    }
    if value.chars().count() > TITLE_NAME_MAX_LENGTH {
        return Err(TitleFieldError::NameTooLong {
            max: TITLE_NAME_MAX_LENGTH,
        });
    }
    Ok(value.to_string())
}

/// Release year between 0 and `ceiling` inclusive
pub fn validate_year(year: i64, ceiling: i32) -> Result<i32, TitleFieldError> {
    if year < 0 {
        return Err(TitleFieldError::YearNegative);
    }
    if year > i64::from(ceiling) {
        return Err(TitleFieldError::YearInFuture { max: ceiling });
    }
    Ok(year as i32)
}

#[derive(Debug, Clone)]
pub struct Title {
    pub title_id: TitleId,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    /// Cleared when the category is deleted
    pub category: Option<Taxon>,
    pub genres: Vec<Taxon>,
    /// Rounded mean review score; `None` without reviews
    pub rating: Option<i32>,
}

/// Validated changes; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct TitleChanges {
    pub name: Option<String>,
    pub year: Option<i32>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
    pub category: Option<Taxon>,
    pub genres: Option<Vec<Taxon>>,
}

/// List filters
///
/// Slugs and name compare case-insensitively, year exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleFilter {
    pub category: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub name: Option<String>,
}

impl Title {
    pub fn new(
        name: String,
        year: i32,
        description: Option<String>,
        category: Taxon,
        genres: Vec<Taxon>,
    ) -> Self {
        Self {
            title_id: TitleId::new(),
            name,
            year,
            description,
            category: Some(category),
            genres,
            rating: None,
        }
    }

    pub fn apply(&mut self, changes: TitleChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(year) = changes.year {
            self.year = year;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(category) = changes.category {
            self.category = Some(category);
        }
        if let Some(genres) = changes.genres {
            self.genres = genres;
        }
    }

    /// Whether two titles collide on the (name, year, category) key
    pub fn same_identity(&self, other: &Title) -> bool {
        self.title_id != other.title_id
            && self.name == other.name
            && self.year == other.year
            && self.category.as_ref().map(|c| c.taxon_id)
                == other.category.as_ref().map(|c| c.taxon_id)
    }

    pub fn matches(&self, filter: &TitleFilter) -> bool {
        if let Some(slug) = &filter.category {
            if !self
                .category
                .as_ref()
                .is_some_and(|c| c.slug.eq_ignore_case(slug))
            {
                return false;
            }
        }
        if let Some(slug) = &filter.genre {
            if !self.genres.iter().any(|g| g.slug.eq_ignore_case(slug)) {
                return false;
            }
        }
        if filter.year.is_some_and(|year| year != self.year) {
            return false;
        }
        if let Some(name) = &filter.name {
            if self.name.to_lowercase() != name.to_lowercase() {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::taxon::TaxonKind;
    use crate::domain::value_object::{slug::Slug, taxon_name::TaxonName};

    fn taxon(kind: TaxonKind, slug: &str) -> Taxon {
        Taxon::new(kind, TaxonName::new(slug).unwrap(), Slug::new(slug).unwrap())
    }

    fn solaris() -> Title {
        Title::new(
            "Solaris".into(),
            1972,
            None,
            taxon(TaxonKind::Category, "films"),
            vec![
                taxon(TaxonKind::Genre, "drama"),
                taxon(TaxonKind::Genre, "sci-fi"),
            ],
        )
    }

    #[test]
    fn test_validate_year() {
        assert_eq!(validate_year(1972, 2026), Ok(1972));
        assert_eq!(validate_year(2026, 2026), Ok(2026));
        assert_eq!(
            validate_year(2027, 2026),
            Err(TitleFieldError::YearInFuture { max: 2026 })
        );
        assert_eq!(validate_year(-1, 2026), Err(TitleFieldError::YearNegative));
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Solaris ".into()).unwrap(), "Solaris");
        assert_eq!(validate_name(" ".into()), Err(TitleFieldError::Blank));
        assert!(validate_name("a".repeat(257)).is_err());
    }

    #[test]
    fn test_filter_matching() {
        let title = solaris();
        assert!(title.matches(&TitleFilter::default()));
        assert!(title.matches(&TitleFilter {
            category: Some("FILMS".into()),
            genre: Some("Sci-Fi".into()),
            year: Some(1972),
            name: Some("solaris".into()),
        }));
        assert!(!title.matches(&TitleFilter {
            genre: Some("comedy".into()),
            ..Default::default()
        }));
        assert!(!title.matches(&TitleFilter {
            name: Some("Solar".into()),
            ..Default::default()
        }));
        assert!(!title.matches(&TitleFilter {
            year: Some(2002),
            ..Default::default()
        }));
    }

    #[test]
    fn test_uncategorised_title_fails_category_filter() {
        let mut title = solaris();
        title.category = None;
        assert!(!title.matches(&TitleFilter {
            category: Some("films".into()),
            ..Default::default()
        }));
    }

    #[test]
    fn test_same_identity() {
        let a = solaris();
        let mut b = a.clone();
        assert!(!a.same_identity(&b));
        b.title_id = TitleId::new();
        assert!(a.same_identity(&b));
        b.year = 2002;
        assert!(!a.same_identity(&b));
    }

    #[test]
    fn test_apply_clears_description() {
        let mut title = solaris();
        title.description = Some("Ocean planet".into());
        title.apply(TitleChanges {
            description: Some(None),
            year: Some(1973),
            ..Default::default()
        });
        assert_eq!(title.description, None);
        assert_eq!(title.year, 1973);
        assert_eq!(title.name, "Solaris");
    }
}
