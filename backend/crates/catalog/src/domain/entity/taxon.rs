//! Category / Genre Entity
//!
//! Both are flat labels with identical shape; [`TaxonKind`] says which
//! table a value lives in.

use derive_more::Display;
use kernel::id::TaxonId;

use crate::domain::value_object::{slug::Slug, taxon_name::TaxonName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TaxonKind {
    #[display("category")]
    Category,
    #[display("genre")]
    Genre,
}

impl TaxonKind {
    /// Backing table
    pub const fn table(&self) -> &'static str {
        match self {
            TaxonKind::Category => "categories",
            TaxonKind::Genre => "genres",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxon {
    pub taxon_id: TaxonId,
    pub kind: TaxonKind,
    pub name: TaxonName,
    pub slug: Slug,
}

impl Taxon {
    pub fn new(kind: TaxonKind, name: TaxonName, slug: Slug) -> Self {
        Self {
            taxon_id: TaxonId::new(),
            kind,
            name,
            slug,
        }
    }
}
