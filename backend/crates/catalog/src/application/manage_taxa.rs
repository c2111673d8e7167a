//! Manage Taxa Use Case
//!
//! List, create and delete categories or genres. Reads are public, writes
//! are admin-only.

use std::sync::Arc;

use auth::{Caller, Policy};
use http::Method;
use kernel::error::field::{FieldErrors, REQUIRED};
use kernel::pagination::{Page, PageRequest};

use crate::domain::entity::taxon::{Taxon, TaxonKind};
use crate::domain::repository::TaxonRepository;
use crate::domain::value_object::{slug::Slug, taxon_name::TaxonName};
use crate::error::{CatalogError, CatalogResult};

const POLICY: Policy = Policy::AdminOrReadOnly;

/// Create category / genre input
#[derive(Debug, Default)]
pub struct TaxonInput {
    pub name: String,
    pub slug: String,
}

/// Manage taxa use case
pub struct ManageTaxaUseCase<R>
where
    R: TaxonRepository,
{
    repo: Arc<R>,
    kind: TaxonKind,
}

impl<R> ManageTaxaUseCase<R>
where
    R: TaxonRepository,
{
    pub fn new(repo: Arc<R>, kind: TaxonKind) -> Self {
        Self { repo, kind }
    }

    /// Collection-level check, run before the request body is decoded
    pub fn authorize(&self, method: &Method, caller: &Caller) -> CatalogResult<()> {
        Ok(POLICY.check(method, caller)?)
    }

    /// GET /categories, GET /genres
    pub async fn list(
        &self,
        caller: &Caller,
        search: Option<&str>,
        page: PageRequest,
    ) -> CatalogResult<Page<Taxon>> {
        POLICY.check(&Method::GET, caller)?;

        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let (taxa, count) = self.repo.list_taxa(self.kind, search, page).await?;
        Ok(Page::new(taxa, count, page))
    }

    /// POST /categories, POST /genres
    pub async fn create(&self, caller: &Caller, input: TaxonInput) -> CatalogResult<Taxon> {
        POLICY.check(&Method::POST, caller)?;

        let mut errors = FieldErrors::new();
        let name = if input.name.trim().is_empty() {
            errors.push("name", REQUIRED);
            None
        } else {
            errors.check("name", TaxonName::new(&input.name))
        };
        let slug = if input.slug.trim().is_empty() {
            errors.push("slug", REQUIRED);
            None
        } else {
            errors.check("slug", Slug::new(&input.slug))
        };

        let (Some(name), Some(slug)) = (name, slug) else {
            return Err(CatalogError::Validation(errors));
        };

        let taxon = Taxon::new(self.kind, name, slug);
        self.repo.create_taxon(&taxon).await?;

        tracing::info!(
            kind = %self.kind,
            slug = %taxon.slug,
            name = %taxon.name,
            "Taxon created"
        );

        Ok(taxon)
    }

    /// DELETE /categories/{slug}, DELETE /genres/{slug}
    pub async fn delete(&self, caller: &Caller, slug: &str) -> CatalogResult<()> {
        POLICY.check(&Method::DELETE, caller)?;

        let not_found = || CatalogError::NotFound(self.label());
        let slug = Slug::new(slug).map_err(|_| not_found())?;
        if !self.repo.delete_taxon(self.kind, &slug).await? {
            return Err(not_found());
        }

        tracing::info!(kind = %self.kind, slug = %slug, "Taxon deleted");
        Ok(())
    }

    fn label(&self) -> &'static str {
        match self.kind {
            TaxonKind::Category => "Category",
            TaxonKind::Genre => "Genre",
        }
    }
}
