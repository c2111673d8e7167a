//! Manage Titles Use Case
//!
//! Titles reference their category and genres by slug on input; the slugs
//! are resolved to stored taxa before anything is written.

use std::sync::Arc;

use auth::{Caller, Policy};
use http::Method;
use kernel::error::field::{FieldErrors, REQUIRED};
use kernel::id::TitleId;
use kernel::pagination::{Page, PageRequest};

use crate::application::config::CatalogConfig;
use crate::domain::entity::taxon::{Taxon, TaxonKind};
use crate::domain::entity::title::{
    Title, TitleChanges, TitleFieldError, TitleFilter, validate_name, validate_year,
};
use crate::domain::repository::{TaxonRepository, TitleRepository};
use crate::domain::value_object::slug::Slug;
use crate::error::{CatalogError, CatalogResult};

const POLICY: Policy = Policy::AdminOrReadOnly;

/// Create title input; every field but `description` is required
#[derive(Debug, Default)]
pub struct CreateTitleInput {
    pub name: Option<String>,
    pub year: Option<i64>,
    pub description: Option<String>,
    pub genre: Option<Vec<String>>,
    pub category: Option<String>,
}

/// Partial update input
#[derive(Debug, Default)]
pub struct UpdateTitleInput {
    pub name: Option<String>,
    pub year: Option<i64>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
    pub genre: Option<Vec<String>>,
    pub category: Option<String>,
}

fn missing_slug(raw: &str) -> String {
    format!("Object with slug={raw} does not exist.")
}

/// Manage titles use case
pub struct ManageTitlesUseCase<R>
where
    R: TitleRepository + TaxonRepository,
{
    repo: Arc<R>,
    config: Arc<CatalogConfig>,
}

impl<R> ManageTitlesUseCase<R>
where
    R: TitleRepository + TaxonRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<CatalogConfig>) -> Self {
        Self { repo, config }
    }

    /// Collection-level check, run before the request body or path is decoded
    pub fn authorize(&self, method: &Method, caller: &Caller) -> CatalogResult<()> {
        Ok(POLICY.check(method, caller)?)
    }

    /// GET /titles
    pub async fn list(
        &self,
        caller: &Caller,
        filter: TitleFilter,
        page: PageRequest,
    ) -> CatalogResult<Page<Title>> {
        POLICY.check(&Method::GET, caller)?;
        let (titles, count) = self.repo.list_titles(&filter, page).await?;
        Ok(Page::new(titles, count, page))
    }

    /// GET /titles/{title_id}
    pub async fn get(&self, caller: &Caller, title_id: &TitleId) -> CatalogResult<Title> {
        POLICY.check(&Method::GET, caller)?;
        self.load(title_id).await
    }

    /// POST /titles
    pub async fn create(&self, caller: &Caller, input: CreateTitleInput) -> CatalogResult<Title> {
        POLICY.check(&Method::POST, caller)?;

        let mut required = FieldErrors::new();
        if input.name.is_none() {
            required.push("name", REQUIRED);
        }
        if input.year.is_none() {
            required.push("year", REQUIRED);
        }
        if input.genre.is_none() {
            required.push("genre", REQUIRED);
        }
        if input.category.is_none() {
            required.push("category", REQUIRED);
        }
        required.into_result()?;

        let changes = self
            .resolve(UpdateTitleInput {
                name: input.name,
                year: input.year,
                description: Some(input.description),
                genre: input.genre,
                category: input.category,
            })
            .await?;

        let TitleChanges {
            name: Some(name),
            year: Some(year),
            description,
            category: Some(category),
            genres: Some(genres),
        } = changes
        else {
            return Err(CatalogError::Internal("validated title fields missing".into()));
        };

        let title = Title::new(name, year, description.flatten(), category, genres);
        self.repo.create_title(&title).await?;

        tracing::info!(title_id = %title.title_id, name = %title.name, year = title.year, "Title created");

        Ok(title)
    }

    /// PATCH /titles/{title_id}
    pub async fn update(
        &self,
        caller: &Caller,
        title_id: &TitleId,
        input: UpdateTitleInput,
    ) -> CatalogResult<Title> {
        POLICY.check(&Method::PATCH, caller)?;
        let mut title = self.load(title_id).await?;

        let changes = self.resolve(input).await?;
        title.apply(changes);
        self.repo.update_title(&title).await?;

        tracing::info!(title_id = %title.title_id, "Title updated");
        Ok(title)
    }

    /// DELETE /titles/{title_id}
    pub async fn delete(&self, caller: &Caller, title_id: &TitleId) -> CatalogResult<()> {
        POLICY.check(&Method::DELETE, caller)?;

        if !self.repo.delete_title(title_id).await? {
            return Err(CatalogError::NotFound("Title"));
        }

        tracing::info!(title_id = %title_id, "Title deleted");
        Ok(())
    }

    async fn load(&self, title_id: &TitleId) -> CatalogResult<Title> {
        self.repo
            .find_title(title_id)
            .await?
            .ok_or(CatalogError::NotFound("Title"))
    }

    /// Validate supplied fields and resolve slugs, collecting all failures
    async fn resolve(&self, input: UpdateTitleInput) -> CatalogResult<TitleChanges> {
        let mut errors = FieldErrors::new();

        let name = input
            .name
            .and_then(|v| errors.check("name", validate_name(v)));
        let year = input
            .year
            .and_then(|v| errors.check("year", validate_year(v, self.config.max_year())));

        let category = match input.category {
            Some(raw) => self.resolve_category(&raw, &mut errors).await?,
            None => None,
        };
        let genres = match input.genre {
            Some(raw) => self.resolve_genres(&raw, &mut errors).await?,
            None => None,
        };

        errors.into_result()?;

        Ok(TitleChanges {
            name,
            year,
            description: input.description,
            category,
            genres,
        })
    }

    async fn resolve_category(
        &self,
        raw: &str,
        errors: &mut FieldErrors,
    ) -> CatalogResult<Option<Taxon>> {
        let Some(slug) = errors.check("category", Slug::new(raw)) else {
            return Ok(None);
        };
        let found = self
            .repo
            .find_taxa_by_slugs(TaxonKind::Category, std::slice::from_ref(&slug))
            .await?
            .into_iter()
            .next();
        if found.is_none() {
            errors.push("category", missing_slug(raw));
        }
        Ok(found)
    }

    async fn resolve_genres(
        &self,
        raw: &[String],
        errors: &mut FieldErrors,
    ) -> CatalogResult<Option<Vec<Taxon>>> {
        if raw.is_empty() {
            errors.push("genre", TitleFieldError::NoGenres.to_string());
            return Ok(None);
        }

        let mut slugs: Vec<Slug> = Vec::with_capacity(raw.len());
        for value in raw {
            let Some(slug) = errors.check("genre", Slug::new(value)) else {
                return Ok(None);
            };
            if !slugs.contains(&slug) {
                slugs.push(slug);
            }
        }

        let found = self
            .repo
            .find_taxa_by_slugs(TaxonKind::Genre, &slugs)
            .await?;
        if let Some(missing) = slugs
            .iter()
            .find(|s| !found.iter().any(|g| &g.slug == *s))
        {
            errors.push("genre", missing_slug(missing.as_str()));
            return Ok(None);
        }

        // Keep request order
        let genres = slugs
            .iter()
            .filter_map(|s| found.iter().find(|g| &g.slug == s).cloned())
            .collect();
        Ok(Some(genres))
    }
}
