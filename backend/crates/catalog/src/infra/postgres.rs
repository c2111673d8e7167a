//! PostgreSQL Repository Implementations

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use kernel::error::conversions::unique_violation;
use kernel::id::{CommentId, ReviewId, TaxonId, TitleId, UserId};
use kernel::pagination::PageRequest;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    comment::Comment,
    review::Review,
    taxon::{Taxon, TaxonKind},
    title::{Title, TitleFilter},
};
use crate::domain::repository::{
    CommentRepository, ReviewRepository, TaxonRepository, TitleRepository,
};
use crate::domain::value_object::{score::Score, slug::Slug, taxon_name::TaxonName};
use crate::error::{CatalogError, CatalogResult};

/// PostgreSQL-backed catalog repository
#[derive(Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Attach genres to loaded titles with one query
    async fn load_genres(&self, titles: &mut [Title]) -> CatalogResult<()> {
        if titles.is_empty() {
            return Ok(());
        }
        let ids: Vec<Uuid> = titles.iter().map(|t| t.title_id.into_uuid()).collect();

        let rows = sqlx::query_as::<_, TitleGenreRow>(
            r#"
            SELECT tg.title_id, g.taxon_id, g.name, g.slug
            FROM title_genres tg
            JOIN genres g ON g.taxon_id = tg.genre_id
            WHERE tg.title_id = ANY($1)
            ORDER BY g.name
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_title: HashMap<Uuid, Vec<Taxon>> = HashMap::new();
        for row in rows {
            by_title
                .entry(row.title_id)
                .or_default()
                .push(taxon_from_parts(TaxonKind::Genre, row.taxon_id, row.name, row.slug));
        }
        for title in titles.iter_mut() {
            title.genres = by_title
                .remove(title.title_id.as_uuid())
                .unwrap_or_default();
        }
        Ok(())
    }
}

fn taxon_from_parts(kind: TaxonKind, taxon_id: Uuid, name: String, slug: String) -> Taxon {
    Taxon {
        taxon_id: TaxonId::from_uuid(taxon_id),
        kind,
        name: TaxonName::from_db(name),
        slug: Slug::from_db(slug),
    }
}

/// `ILIKE` substring pattern with wildcards in the needle escaped
fn contains_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn genre_ids(title: &Title) -> Vec<Uuid> {
    title.genres.iter().map(|g| g.taxon_id.into_uuid()).collect()
}

fn map_title_write(err: sqlx::Error) -> CatalogError {
    match unique_violation(&err) {
        Some("titles_name_year_category_key") => CatalogError::TitleExists,
        _ => CatalogError::Database(err),
    }
}

// ============================================================================
// Taxon Repository Implementation
// ============================================================================

impl TaxonRepository for PgCatalogRepository {
    async fn create_taxon(&self, taxon: &Taxon) -> CatalogResult<()> {
        let table = taxon.kind.table();
        sqlx::query(&format!(
            "INSERT INTO {table} (taxon_id, name, slug) VALUES ($1, $2, $3)"
        ))
        .bind(taxon.taxon_id.as_uuid())
        .bind(taxon.name.as_str())
        .bind(taxon.slug.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| match unique_violation(&err) {
            Some(c) if c.ends_with("_slug_key") => CatalogError::SlugTaken(taxon.kind),
            Some(_) => CatalogError::TaxonNameTaken(taxon.kind),
            None => CatalogError::Database(err),
        })?;

        Ok(())
    }

    async fn list_taxa(
        &self,
        kind: TaxonKind,
        search: Option<&str>,
        page: PageRequest,
    ) -> CatalogResult<(Vec<Taxon>, u64)> {
        let table = kind.table();
        let pattern = search.map(contains_pattern);

        let count = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM {table} WHERE ($1::TEXT IS NULL OR name ILIKE $1)"
        ))
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, TaxonRow>(&format!(
            r#"
            SELECT taxon_id, name, slug FROM {table}
            WHERE ($1::TEXT IS NULL OR name ILIKE $1)
            ORDER BY name
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(pattern.as_deref())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let taxa = rows.into_iter().map(|r| r.into_taxon(kind)).collect();
        Ok((taxa, count.max(0) as u64))
    }

    async fn find_taxa_by_slugs(
        &self,
        kind: TaxonKind,
        slugs: &[Slug],
    ) -> CatalogResult<Vec<Taxon>> {
        let table = kind.table();
        let slugs: Vec<&str> = slugs.iter().map(Slug::as_str).collect();

        let rows = sqlx::query_as::<_, TaxonRow>(&format!(
            "SELECT taxon_id, name, slug FROM {table} WHERE slug = ANY($1)"
        ))
        .bind(&slugs)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_taxon(kind)).collect())
    }

    async fn delete_taxon(&self, kind: TaxonKind, slug: &Slug) -> CatalogResult<bool> {
        let table = kind.table();
        let deleted = sqlx::query(&format!("DELETE FROM {table} WHERE slug = $1"))
            .bind(slug.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Title Repository Implementation
// ============================================================================

const TITLE_SELECT: &str = r#"
    SELECT
        t.title_id,
        t.name,
        t.year,
        t.description,
        c.taxon_id AS category_id,
        c.name AS category_name,
        c.slug AS category_slug,
        (SELECT ROUND(AVG(r.score))::INT FROM reviews r WHERE r.title_id = t.title_id) AS rating
    FROM titles t
    LEFT JOIN categories c ON c.taxon_id = t.category_id
"#;

const TITLE_FILTER: &str = r#"
    WHERE ($1::TEXT IS NULL OR LOWER(c.slug) = LOWER($1))
      AND ($2::TEXT IS NULL OR EXISTS (
            SELECT 1 FROM title_genres tg
            JOIN genres g ON g.taxon_id = tg.genre_id
            WHERE tg.title_id = t.title_id AND LOWER(g.slug) = LOWER($2)
      ))
      AND ($3::INT IS NULL OR t.year = $3)
      AND ($4::TEXT IS NULL OR LOWER(t.name) = LOWER($4))
"#;

impl TitleRepository for PgCatalogRepository {
    async fn create_title(&self, title: &Title) -> CatalogResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO titles (title_id, name, year, description, category_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(title.title_id.as_uuid())
        .bind(&title.name)
        .bind(title.year)
        .bind(title.description.as_deref())
        .bind(title.category.as_ref().map(|c| c.taxon_id.into_uuid()))
        .execute(&mut *tx)
        .await
        .map_err(map_title_write)?;

        sqlx::query(
            "INSERT INTO title_genres (title_id, genre_id) SELECT $1, UNNEST($2::UUID[])",
        )
        .bind(title.title_id.as_uuid())
        .bind(genre_ids(title))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn find_title(&self, title_id: &TitleId) -> CatalogResult<Option<Title>> {
        let row = sqlx::query_as::<_, TitleRow>(&format!("{TITLE_SELECT} WHERE t.title_id = $1"))
            .bind(title_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut titles = [row.into_title()];
        self.load_genres(&mut titles).await?;
        let [title] = titles;
        Ok(Some(title))
    }

    async fn list_titles(
        &self,
        filter: &TitleFilter,
        page: PageRequest,
    ) -> CatalogResult<(Vec<Title>, u64)> {
        let count = sqlx::query_scalar::<_, i64>(&format!(
            r#"
            SELECT COUNT(*) FROM titles t
            LEFT JOIN categories c ON c.taxon_id = t.category_id
            {TITLE_FILTER}
            "#
        ))
        .bind(filter.category.as_deref())
        .bind(filter.genre.as_deref())
        .bind(filter.year)
        .bind(filter.name.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, TitleRow>(&format!(
            r#"
            {TITLE_SELECT}
            {TITLE_FILTER}
            ORDER BY t.name, t.year
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(filter.category.as_deref())
        .bind(filter.genre.as_deref())
        .bind(filter.year)
        .bind(filter.name.as_deref())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let mut titles: Vec<Title> = rows.into_iter().map(TitleRow::into_title).collect();
        self.load_genres(&mut titles).await?;

        Ok((titles, count.max(0) as u64))
    }

    async fn update_title(&self, title: &Title) -> CatalogResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE titles SET
                name = $2,
                year = $3,
                description = $4,
                category_id = $5
            WHERE title_id = $1
            "#,
        )
        .bind(title.title_id.as_uuid())
        .bind(&title.name)
        .bind(title.year)
        .bind(title.description.as_deref())
        .bind(title.category.as_ref().map(|c| c.taxon_id.into_uuid()))
        .execute(&mut *tx)
        .await
        .map_err(map_title_write)?;

        sqlx::query("DELETE FROM title_genres WHERE title_id = $1")
            .bind(title.title_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO title_genres (title_id, genre_id) SELECT $1, UNNEST($2::UUID[])",
        )
        .bind(title.title_id.as_uuid())
        .bind(genre_ids(title))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn delete_title(&self, title_id: &TitleId) -> CatalogResult<bool> {
        let deleted = sqlx::query("DELETE FROM titles WHERE title_id = $1")
            .bind(title_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Review Repository Implementation
// ============================================================================

const REVIEW_SELECT: &str = r#"
    SELECT r.review_id, r.title_id, r.author_id, u.username AS author, r.text, r.score, r.pub_date
    FROM reviews r
    JOIN users u ON u.user_id = r.author_id
"#;

impl ReviewRepository for PgCatalogRepository {
    async fn create_review(&self, review: &Review) -> CatalogResult<()> {
        sqlx::query(
            r#"
            INSERT INTO reviews (review_id, title_id, author_id, text, score, pub_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(review.review_id.as_uuid())
        .bind(review.title_id.as_uuid())
        .bind(review.author_id.as_uuid())
        .bind(&review.text)
        .bind(i16::from(review.score.get()))
        .bind(review.pub_date)
        .execute(&self.pool)
        .await
        .map_err(|err| match unique_violation(&err) {
            Some(_) => CatalogError::DuplicateReview,
            None => CatalogError::Database(err),
        })?;

        Ok(())
    }

    async fn find_review(
        &self,
        title_id: &TitleId,
        review_id: &ReviewId,
    ) -> CatalogResult<Option<Review>> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "{REVIEW_SELECT} WHERE r.review_id = $1 AND r.title_id = $2"
        ))
        .bind(review_id.as_uuid())
        .bind(title_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ReviewRow::into_review))
    }

    async fn list_reviews(
        &self,
        title_id: &TitleId,
        page: PageRequest,
    ) -> CatalogResult<(Vec<Review>, u64)> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reviews WHERE title_id = $1")
                .bind(title_id.as_uuid())
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            r#"
            {REVIEW_SELECT}
            WHERE r.title_id = $1
            ORDER BY r.pub_date, r.review_id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(title_id.as_uuid())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let reviews = rows.into_iter().map(ReviewRow::into_review).collect();
        Ok((reviews, count.max(0) as u64))
    }

    async fn update_review(&self, review: &Review) -> CatalogResult<()> {
        sqlx::query("UPDATE reviews SET text = $2, score = $3 WHERE review_id = $1")
            .bind(review.review_id.as_uuid())
            .bind(&review.text)
            .bind(i16::from(review.score.get()))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_review(&self, review_id: &ReviewId) -> CatalogResult<bool> {
        let deleted = sqlx::query("DELETE FROM reviews WHERE review_id = $1")
            .bind(review_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Comment Repository Implementation
// ============================================================================

const COMMENT_SELECT: &str = r#"
    SELECT c.comment_id, c.title_id, c.review_id, c.author_id, u.username AS author, c.text, c.pub_date
    FROM comments c
    JOIN users u ON u.user_id = c.author_id
"#;

impl CommentRepository for PgCatalogRepository {
    async fn create_comment(&self, comment: &Comment) -> CatalogResult<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (comment_id, title_id, review_id, author_id, text, pub_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(comment.comment_id.as_uuid())
        .bind(comment.title_id.as_uuid())
        .bind(comment.review_id.as_uuid())
        .bind(comment.author_id.as_uuid())
        .bind(&comment.text)
        .bind(comment.pub_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_comment(
        &self,
        review_id: &ReviewId,
        comment_id: &CommentId,
    ) -> CatalogResult<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "{COMMENT_SELECT} WHERE c.comment_id = $1 AND c.review_id = $2"
        ))
        .bind(comment_id.as_uuid())
        .bind(review_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CommentRow::into_comment))
    }

    async fn list_comments(
        &self,
        review_id: &ReviewId,
        page: PageRequest,
    ) -> CatalogResult<(Vec<Comment>, u64)> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE review_id = $1")
                .bind(review_id.as_uuid())
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            {COMMENT_SELECT}
            WHERE c.review_id = $1
            ORDER BY c.pub_date, c.comment_id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(review_id.as_uuid())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let comments = rows.into_iter().map(CommentRow::into_comment).collect();
        Ok((comments, count.max(0) as u64))
    }

    async fn update_comment(&self, comment: &Comment) -> CatalogResult<()> {
        sqlx::query("UPDATE comments SET text = $2 WHERE comment_id = $1")
            .bind(comment.comment_id.as_uuid())
            .bind(&comment.text)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_comment(&self, comment_id: &CommentId) -> CatalogResult<bool> {
        let deleted = sqlx::query("DELETE FROM comments WHERE comment_id = $1")
            .bind(comment_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct TaxonRow {
    taxon_id: Uuid,
    name: String,
    slug: String,
}

impl TaxonRow {
    fn into_taxon(self, kind: TaxonKind) -> Taxon {
        taxon_from_parts(kind, self.taxon_id, self.name, self.slug)
    }
}

#[derive(sqlx::FromRow)]
struct TitleGenreRow {
    title_id: Uuid,
    taxon_id: Uuid,
    name: String,
    slug: String,
}

#[derive(sqlx::FromRow)]
struct TitleRow {
    title_id: Uuid,
    name: String,
    year: i32,
    description: Option<String>,
    category_id: Option<Uuid>,
    category_name: Option<String>,
    category_slug: Option<String>,
    rating: Option<i32>,
}

impl TitleRow {
    /// Genres are attached separately
    fn into_title(self) -> Title {
        let category = match (self.category_id, self.category_name, self.category_slug) {
            (Some(id), Some(name), Some(slug)) => {
                Some(taxon_from_parts(TaxonKind::Category, id, name, slug))
            }
            _ => None,
        };

        Title {
            title_id: TitleId::from_uuid(self.title_id),
            name: self.name,
            year: self.year,
            description: self.description,
            category,
            genres: Vec::new(),
            rating: self.rating,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    review_id: Uuid,
    title_id: Uuid,
    author_id: Uuid,
    author: String,
    text: String,
    score: i16,
    pub_date: DateTime<Utc>,
}

impl ReviewRow {
    fn into_review(self) -> Review {
        Review {
            review_id: ReviewId::from_uuid(self.review_id),
            title_id: TitleId::from_uuid(self.title_id),
            author_id: UserId::from_uuid(self.author_id),
            author: self.author,
            text: self.text,
            score: Score::from_db(self.score),
            pub_date: self.pub_date,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    comment_id: Uuid,
    title_id: Uuid,
    review_id: Uuid,
    author_id: Uuid,
    author: String,
    text: String,
    pub_date: DateTime<Utc>,
}

impl CommentRow {
    fn into_comment(self) -> Comment {
        Comment {
            comment_id: CommentId::from_uuid(self.comment_id),
            title_id: TitleId::from_uuid(self.title_id),
            review_id: ReviewId::from_uuid(self.review_id),
            author_id: UserId::from_uuid(self.author_id),
            author: self.author,
            text: self.text,
            pub_date: self.pub_date,
        }
    }
}
