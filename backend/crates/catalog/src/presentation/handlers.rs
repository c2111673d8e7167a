//! HTTP Handlers

use std::str::FromStr;
use std::sync::Arc;

use auth::Caller;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use kernel::id::{CommentId, ReviewId, TitleId};
use kernel::pagination::{Page, PageQuery};

use crate::application::{
    CatalogConfig, CommentInput, CreateTitleInput, ManageCommentsUseCase, ManageReviewsUseCase,
    ManageTaxaUseCase, ManageTitlesUseCase, ReviewInput, TaxonInput, UpdateTitleInput,
};
use crate::domain::entity::taxon::TaxonKind;
use crate::domain::entity::title::TitleFilter;
use crate::domain::repository::CatalogRepository;
use crate::error::{CatalogError, CatalogResult};
use crate::presentation::dto::{
    CommentRequest, CommentResponse, CreateTitleRequest, ReviewRequest, ReviewResponse,
    TaxonListQuery, TaxonRequest, TaxonResponse, TitleListQuery, TitleResponse,
    UpdateTitleRequest,
};

/// Shared state for catalog handlers
pub struct CatalogAppState<R>
where
    R: CatalogRepository,
{
    pub repo: Arc<R>,
    pub config: Arc<CatalogConfig>,
}

impl<R> Clone for CatalogAppState<R>
where
    R: CatalogRepository,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }
}

/// Path ids that are not UUIDs cannot name anything
fn parse_id<T>(raw: &str, resource: &'static str) -> CatalogResult<T>
where
    T: FromStr,
{
    raw.parse().map_err(|_| CatalogError::NotFound(resource))
}

fn title_id(raw: &str) -> CatalogResult<TitleId> {
    parse_id(raw, "Title")
}

fn review_id(raw: &str) -> CatalogResult<ReviewId> {
    parse_id(raw, "Review")
}

fn comment_id(raw: &str) -> CatalogResult<CommentId> {
    parse_id(raw, "Comment")
}

// ============================================================================
// Categories / Genres
// ============================================================================

async fn list_taxa<R: CatalogRepository>(
    state: CatalogAppState<R>,
    kind: TaxonKind,
    caller: Caller,
    query: Result<Query<TaxonListQuery>, QueryRejection>,
) -> CatalogResult<Json<Page<TaxonResponse>>> {
    let Query(query) = query?;
    let use_case = ManageTaxaUseCase::new(state.repo.clone(), kind);
    let taxa = use_case
        .list(&caller, query.search.as_deref(), query.page().resolve())
        .await?;
    Ok(Json(taxa.map(TaxonResponse::from)))
}

async fn create_taxon<R: CatalogRepository>(
    state: CatalogAppState<R>,
    kind: TaxonKind,
    caller: Caller,
    payload: Result<Json<TaxonRequest>, JsonRejection>,
) -> CatalogResult<(StatusCode, Json<TaxonResponse>)> {
    let use_case = ManageTaxaUseCase::new(state.repo.clone(), kind);
    use_case.authorize(&Method::POST, &caller)?;
    let Json(req) = payload?;
    let taxon = use_case
        .create(
            &caller,
            TaxonInput {
                name: req.name,
                slug: req.slug,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(taxon.into())))
}

async fn delete_taxon<R: CatalogRepository>(
    state: CatalogAppState<R>,
    kind: TaxonKind,
    caller: Caller,
    slug: String,
) -> CatalogResult<StatusCode> {
    let use_case = ManageTaxaUseCase::new(state.repo.clone(), kind);
    use_case.delete(&caller, &slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /categories
pub async fn list_categories<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: Caller,
    query: Result<Query<TaxonListQuery>, QueryRejection>,
) -> CatalogResult<Json<Page<TaxonResponse>>> {
    list_taxa(state, TaxonKind::Category, caller, query).await
}

/// POST /categories
pub async fn create_category<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: Caller,
    payload: Result<Json<TaxonRequest>, JsonRejection>,
) -> CatalogResult<(StatusCode, Json<TaxonResponse>)> {
    create_taxon(state, TaxonKind::Category, caller, payload).await
}

/// DELETE /categories/{slug}
pub async fn delete_category<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: Caller,
    Path(slug): Path<String>,
) -> CatalogResult<StatusCode> {
    delete_taxon(state, TaxonKind::Category, caller, slug).await
}

/// GET /genres
pub async fn list_genres<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: Caller,
    query: Result<Query<TaxonListQuery>, QueryRejection>,
) -> CatalogResult<Json<Page<TaxonResponse>>> {
    list_taxa(state, TaxonKind::Genre, caller, query).await
}

/// POST /genres
pub async fn create_genre<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: Caller,
    payload: Result<Json<TaxonRequest>, JsonRejection>,
) -> CatalogResult<(StatusCode, Json<TaxonResponse>)> {
    create_taxon(state, TaxonKind::Genre, caller, payload).await
}

/// DELETE /genres/{slug}
pub async fn delete_genre<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: Caller,
    Path(slug): Path<String>,
) -> CatalogResult<StatusCode> {
    delete_taxon(state, TaxonKind::Genre, caller, slug).await
}

// ============================================================================
// Titles
// ============================================================================

/// GET /titles
pub async fn list_titles<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: Caller,
    query: Result<Query<TitleListQuery>, QueryRejection>,
) -> CatalogResult<Json<Page<TitleResponse>>> {
    let Query(query) = query?;
    let page = PageQuery {
        page: query.page,
        page_size: query.page_size,
    }
    .resolve();
    let filter = TitleFilter {
        category: query.category,
        genre: query.genre,
        year: query.year,
        name: query.name,
    };

    let use_case = ManageTitlesUseCase::new(state.repo.clone(), state.config.clone());
    let titles = use_case.list(&caller, filter, page).await?;
    Ok(Json(titles.map(TitleResponse::from)))
}

/// POST /titles
pub async fn create_title<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: Caller,
    payload: Result<Json<CreateTitleRequest>, JsonRejection>,
) -> CatalogResult<(StatusCode, Json<TitleResponse>)> {
    let use_case = ManageTitlesUseCase::new(state.repo.clone(), state.config.clone());
    use_case.authorize(&Method::POST, &caller)?;
    let Json(req) = payload?;

    let input = CreateTitleInput {
        name: req.name,
        year: req.year,
        description: req.description,
        genre: req.genre,
        category: req.category,
    };

    let title = use_case.create(&caller, input).await?;
    Ok((StatusCode::CREATED, Json(title.into())))
}

/// GET /titles/{title_id}
pub async fn get_title<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: Caller,
    Path(raw_title): Path<String>,
) -> CatalogResult<Json<TitleResponse>> {
    let use_case = ManageTitlesUseCase::new(state.repo.clone(), state.config.clone());
    let title = use_case.get(&caller, &title_id(&raw_title)?).await?;
    Ok(Json(title.into()))
}

/// PATCH /titles/{title_id}
pub async fn update_title<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: Caller,
    Path(raw_title): Path<String>,
    payload: Result<Json<UpdateTitleRequest>, JsonRejection>,
) -> CatalogResult<Json<TitleResponse>> {
    let use_case = ManageTitlesUseCase::new(state.repo.clone(), state.config.clone());
    use_case.authorize(&Method::PATCH, &caller)?;
    let title_id = title_id(&raw_title)?;
    let Json(req) = payload?;

    let input = UpdateTitleInput {
        name: req.name,
        year: req.year,
        description: req.description,
        genre: req.genre,
        category: req.category,
    };

    let title = use_case.update(&caller, &title_id, input).await?;
    Ok(Json(title.into()))
}

/// DELETE /titles/{title_id}
pub async fn delete_title<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: Caller,
    Path(raw_title): Path<String>,
) -> CatalogResult<StatusCode> {
    let use_case = ManageTitlesUseCase::new(state.repo.clone(), state.config.clone());
    use_case.authorize(&Method::DELETE, &caller)?;
    use_case.delete(&caller, &title_id(&raw_title)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Reviews
// ============================================================================

/// GET /titles/{title_id}/reviews
pub async fn list_reviews<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: Caller,
    Path(raw_title): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> CatalogResult<Json<Page<ReviewResponse>>> {
    let Query(page) = query?;
    let use_case = ManageReviewsUseCase::new(state.repo.clone());
    let reviews = use_case
        .list(&caller, &title_id(&raw_title)?, page.resolve())
        .await?;
    Ok(Json(reviews.map(ReviewResponse::from)))
}

/// POST /titles/{title_id}/reviews
pub async fn create_review<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: Caller,
    Path(raw_title): Path<String>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> CatalogResult<(StatusCode, Json<ReviewResponse>)> {
    let use_case = ManageReviewsUseCase::new(state.repo.clone());
    use_case.authorize(&Method::POST, &caller)?;
    let title_id = title_id(&raw_title)?;
    let Json(req) = payload?;

    let review = use_case
        .create(
            &caller,
            &title_id,
            ReviewInput {
                text: req.text,
                score: req.score,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(review.into())))
}

/// GET /titles/{title_id}/reviews/{review_id}
pub async fn get_review<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: Caller,
    Path((raw_title, raw_review)): Path<(String, String)>,
) -> CatalogResult<Json<ReviewResponse>> {
    let use_case = ManageReviewsUseCase::new(state.repo.clone());
    let review = use_case
        .get(&caller, &title_id(&raw_title)?, &review_id(&raw_review)?)
        .await?;
    Ok(Json(review.into()))
}

/// PATCH /titles/{title_id}/reviews/{review_id}
pub async fn update_review<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: Caller,
    Path((raw_title, raw_review)): Path<(String, String)>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> CatalogResult<Json<ReviewResponse>> {
    let use_case = ManageReviewsUseCase::new(state.repo.clone());
    use_case.authorize(&Method::PATCH, &caller)?;
    let (title_id, review_id) = (title_id(&raw_title)?, review_id(&raw_review)?);
    let Json(req) = payload?;

    let review = use_case
        .update(
            &caller,
            &title_id,
            &review_id,
            ReviewInput {
                text: req.text,
                score: req.score,
            },
        )
        .await?;
    Ok(Json(review.into()))
}

/// DELETE /titles/{title_id}/reviews/{review_id}
pub async fn delete_review<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: Caller,
    Path((raw_title, raw_review)): Path<(String, String)>,
) -> CatalogResult<StatusCode> {
    let use_case = ManageReviewsUseCase::new(state.repo.clone());
    use_case.authorize(&Method::DELETE, &caller)?;
    use_case
        .delete(&caller, &title_id(&raw_title)?, &review_id(&raw_review)?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Comments
// ============================================================================

/// GET /titles/{title_id}/reviews/{review_id}/comments
pub async fn list_comments<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: Caller,
    Path((raw_title, raw_review)): Path<(String, String)>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> CatalogResult<Json<Page<CommentResponse>>> {
    let Query(page) = query?;
    let use_case = ManageCommentsUseCase::new(state.repo.clone());
    let comments = use_case
        .list(
            &caller,
            &title_id(&raw_title)?,
            &review_id(&raw_review)?,
            page.resolve(),
        )
        .await?;
    Ok(Json(comments.map(CommentResponse::from)))
}

/// POST /titles/{title_id}/reviews/{review_id}/comments
pub async fn create_comment<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: Caller,
    Path((raw_title, raw_review)): Path<(String, String)>,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> CatalogResult<(StatusCode, Json<CommentResponse>)> {
    let use_case = ManageCommentsUseCase::new(state.repo.clone());
    use_case.authorize(&Method::POST, &caller)?;
    let (title_id, review_id) = (title_id(&raw_title)?, review_id(&raw_review)?);
    let Json(req) = payload?;

    let comment = use_case
        .create(&caller, &title_id, &review_id, CommentInput { text: req.text })
        .await?;
    Ok((StatusCode::CREATED, Json(comment.into())))
}

/// GET .../comments/{comment_id}
pub async fn get_comment<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: Caller,
    Path((raw_title, raw_review, raw_comment)): Path<(String, String, String)>,
) -> CatalogResult<Json<CommentResponse>> {
    let use_case = ManageCommentsUseCase::new(state.repo.clone());
    let comment = use_case
        .get(
            &caller,
            &title_id(&raw_title)?,
            &review_id(&raw_review)?,
            &comment_id(&raw_comment)?,
        )
        .await?;
    Ok(Json(comment.into()))
}

/// PATCH .../comments/{comment_id}
pub async fn update_comment<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: Caller,
    Path((raw_title, raw_review, raw_comment)): Path<(String, String, String)>,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> CatalogResult<Json<CommentResponse>> {
    let use_case = ManageCommentsUseCase::new(state.repo.clone());
    use_case.authorize(&Method::PATCH, &caller)?;
    let title_id = title_id(&raw_title)?;
    let review_id = review_id(&raw_review)?;
    let comment_id = comment_id(&raw_comment)?;
    let Json(req) = payload?;

    let comment = use_case
        .update(
            &caller,
            &title_id,
            &review_id,
            &comment_id,
            CommentInput { text: req.text },
        )
        .await?;
    Ok(Json(comment.into()))
}

/// DELETE .../comments/{comment_id}
pub async fn delete_comment<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: Caller,
    Path((raw_title, raw_review, raw_comment)): Path<(String, String, String)>,
) -> CatalogResult<StatusCode> {
    let use_case = ManageCommentsUseCase::new(state.repo.clone());
    use_case.authorize(&Method::DELETE, &caller)?;
    use_case
        .delete(
            &caller,
            &title_id(&raw_title)?,
            &review_id(&raw_review)?,
            &comment_id(&raw_comment)?,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
