//! Router tests against the in-memory repositories

use std::sync::Arc;

use auth::domain::entity::user::User;
use auth::domain::token::AccessClaims;
use auth::domain::value_object::{email::Email, user_name::UserName, user_role::UserRole};
use auth::{HmacTokenSigner, InMemoryUserRepository, TokenSigner, with_authentication};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::application::config::CatalogConfig;
use crate::infra::InMemoryCatalogRepository;
use crate::presentation::router::catalog_router_generic;

struct Harness {
    users: InMemoryUserRepository,
    signer: Arc<dyn TokenSigner>,
    app: Router,
}

impl Harness {
    fn new() -> Self {
        let users = InMemoryUserRepository::new();
        let signer: Arc<dyn TokenSigner> = Arc::new(HmacTokenSigner::new([7u8; 32]));
        let config = CatalogConfig {
            year_ceiling: Some(2030),
        };
        let app = with_authentication(
            catalog_router_generic(InMemoryCatalogRepository::new(), config),
            users.clone(),
            signer.clone(),
        );
        Self { users, signer, app }
    }

    /// Insert a user and mint a token for it
    fn seed(&self, username: &str, role: UserRole) -> String {
        let mut user = User::new(
            UserName::new(username).unwrap(),
            Email::new(format!("{username}@example.com")).unwrap(),
        );
        user.role = role;
        let now = Utc::now().timestamp();
        let token = self
            .signer
            .sign(&AccessClaims {
                sub: user.user_id.into_uuid(),
                iat: now,
                exp: now + 3600,
            })
            .unwrap();
        self.users.seed(user).unwrap();
        token
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Admin token plus the `films` category and `drama`/`comedy` genres
    async fn with_taxa(&self) -> String {
        let admin = self.seed("root", UserRole::Admin);
        for (path, name, slug) in [
            ("/categories", "Films", "films"),
            ("/categories", "Books", "books"),
            ("/genres", "Drama", "drama"),
            ("/genres", "Comedy", "comedy"),
        ] {
            let (status, _) = self
                .send("POST", path, Some(&admin), Some(json!({"name": name, "slug": slug})))
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }
        admin
    }

    async fn create_title(&self, admin: &str, body: Value) -> String {
        let (status, created) = self.send("POST", "/titles", Some(admin), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{created}");
        created["id"].as_str().unwrap().to_string()
    }
}

fn solaris() -> Value {
    json!({
        "name": "Solaris",
        "year": 1972,
        "description": "Ocean planet",
        "genre": ["drama"],
        "category": "films"
    })
}

// ============================================================================
// Categories / Genres
// ============================================================================

#[tokio::test]
async fn test_taxa_permissions() {
    let h = Harness::new();
    let user = h.seed("alice", UserRole::User);
    let body = json!({"name": "Films", "slug": "films"});

    let (status, _) = h.send("POST", "/categories", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = h.send("POST", "/categories", Some(&user), Some(body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, page) = h.send("GET", "/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 0);
}

#[tokio::test]
async fn test_taxon_name_capitalized_and_unique() {
    let h = Harness::new();
    let admin = h.seed("root", UserRole::Admin);

    let (status, body) = h
        .send("POST", "/genres", Some(&admin), Some(json!({"name": "sci-FI", "slug": "sci-fi"})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"name": "Sci-fi", "slug": "sci-fi"}));

    let (status, body) = h
        .send("POST", "/genres", Some(&admin), Some(json!({"name": "Other", "slug": "sci-fi"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["slug"].is_array());

    let (status, body) = h
        .send("POST", "/genres", Some(&admin), Some(json!({"name": "SCI-fi", "slug": "scifi"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["name"].is_array());

    let (status, body) = h
        .send("POST", "/genres", Some(&admin), Some(json!({"name": "Bad", "slug": "bad slug"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["slug"].is_array());
}

#[tokio::test]
async fn test_taxa_search_and_delete() {
    let h = Harness::new();
    let admin = h.with_taxa().await;

    let (_, page) = h.send("GET", "/genres?search=dra", None, None).await;
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["slug"], "drama");

    let (status, _) = h.send("DELETE", "/genres/drama", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = h.send("DELETE", "/genres/drama", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Titles
// ============================================================================

#[tokio::test]
async fn test_create_title_embeds_taxa() {
    let h = Harness::new();
    let admin = h.with_taxa().await;

    let (status, body) = h
        .send(
            "POST",
            "/titles",
            Some(&admin),
            Some(json!({
                "name": "Solaris",
                "year": 1972,
                "genre": ["drama", "comedy", "drama"],
                "category": "films"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["rating"], Value::Null);
    assert_eq!(body["description"], Value::Null);
    assert_eq!(body["category"], json!({"name": "Films", "slug": "films"}));
    assert_eq!(
        body["genre"],
        json!([
            {"name": "Drama", "slug": "drama"},
            {"name": "Comedy", "slug": "comedy"}
        ])
    );
}

#[tokio::test]
async fn test_create_title_validation() {
    let h = Harness::new();
    let admin = h.with_taxa().await;

    let (status, body) = h.send("POST", "/titles", Some(&admin), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    for field in ["name", "year", "genre", "category"] {
        assert!(body["errors"][field].is_array(), "missing {field}");
    }

    let (status, body) = h
        .send(
            "POST",
            "/titles",
            Some(&admin),
            Some(json!({"name": "X", "year": 2031, "genre": ["nope"], "category": "films"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["year"].is_array());
    assert_eq!(
        body["errors"]["genre"][0],
        "Object with slug=nope does not exist."
    );

    let (status, body) = h
        .send(
            "POST",
            "/titles",
            Some(&admin),
            Some(json!({"name": "X", "year": 2000, "genre": [], "category": "films"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["genre"].is_array());
}

#[tokio::test]
async fn test_title_unique_per_name_year_category() {
    let h = Harness::new();
    let admin = h.with_taxa().await;
    h.create_title(&admin, solaris()).await;

    let (status, body) = h.send("POST", "/titles", Some(&admin), Some(solaris())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["non_field_errors"].is_array());

    let mut book = solaris();
    book["category"] = json!("books");
    h.create_title(&admin, book).await;
}

#[tokio::test]
async fn test_title_filters_and_pagination() {
    let h = Harness::new();
    let admin = h.with_taxa().await;
    h.create_title(&admin, solaris()).await;
    h.create_title(
        &admin,
        json!({"name": "Amelie", "year": 2001, "genre": ["comedy"], "category": "films"}),
    )
    .await;
    h.create_title(
        &admin,
        json!({"name": "Dune", "year": 1965, "genre": ["drama"], "category": "books"}),
    )
    .await;

    let (_, page) = h.send("GET", "/titles?genre=DRAMA", None, None).await;
    assert_eq!(page["count"], 2);
    assert_eq!(page["results"][0]["name"], "Dune");

    let (_, page) = h.send("GET", "/titles?category=films&year=2001", None, None).await;
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["name"], "Amelie");

    let (_, page) = h.send("GET", "/titles?name=solaris", None, None).await;
    assert_eq!(page["count"], 1);

    let (_, page) = h.send("GET", "/titles?page=2&page_size=2", None, None).await;
    assert_eq!(page["count"], 3);
    assert_eq!(page["next"], Value::Null);
    assert_eq!(page["previous"], 1);
    assert_eq!(page["results"].as_array().unwrap().len(), 1);

    let (status, _) = h.send("GET", "/titles?year=abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_title() {
    let h = Harness::new();
    let admin = h.with_taxa().await;
    let id = h.create_title(&admin, solaris()).await;
    let uri = format!("/titles/{id}");

    let (status, body) = h
        .send(
            "PATCH",
            &uri,
            Some(&admin),
            Some(json!({"description": null, "genre": ["comedy"]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Solaris");
    assert_eq!(body["description"], Value::Null);
    assert_eq!(body["genre"][0]["slug"], "comedy");

    let moderator = h.seed("mod", UserRole::Moderator);
    let (status, _) = h
        .send("PATCH", &uri, Some(&moderator), Some(json!({"name": "X"})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_or_malformed_title_id() {
    let h = Harness::new();
    let (status, _) = h.send("GET", "/titles/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = h
        .send("GET", &format!("/titles/{}", uuid::Uuid::new_v4()), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_category_keeps_title() {
    let h = Harness::new();
    let admin = h.with_taxa().await;
    let id = h.create_title(&admin, solaris()).await;

    let (status, _) = h.send("DELETE", "/categories/films", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = h.send("GET", &format!("/titles/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], Value::Null);
}

// ============================================================================
// Reviews / Comments
// ============================================================================

#[tokio::test]
async fn test_reviews_and_rating() {
    let h = Harness::new();
    let admin = h.with_taxa().await;
    let id = h.create_title(&admin, solaris()).await;
    let reviews = format!("/titles/{id}/reviews");
    let alice = h.seed("alice", UserRole::User);
    let bob = h.seed("bob", UserRole::User);

    let review = json!({"text": "Slow", "score": 7});
    let (status, _) = h.send("POST", &reviews, None, Some(review.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = h.send("POST", &reviews, Some(&alice), Some(review.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["author"], "alice");
    assert_eq!(body["score"], 7);

    let (status, body) = h.send("POST", &reviews, Some(&alice), Some(review)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["non_field_errors"].is_array());

    let (status, body) = h
        .send("POST", &reviews, Some(&bob), Some(json!({"text": "Great", "score": 11})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["score"].is_array());

    let (status, _) = h
        .send("POST", &reviews, Some(&bob), Some(json!({"text": "Great", "score": 8})))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, title) = h.send("GET", &format!("/titles/{id}"), None, None).await;
    assert_eq!(title["rating"], 8);

    let (_, page) = h.send("GET", &reviews, None, None).await;
    assert_eq!(page["count"], 2);
}

#[tokio::test]
async fn test_review_object_permissions() {
    let h = Harness::new();
    let admin = h.with_taxa().await;
    let id = h.create_title(&admin, solaris()).await;
    let alice = h.seed("alice", UserRole::User);
    let bob = h.seed("bob", UserRole::User);
    let moderator = h.seed("mod", UserRole::Moderator);

    let (_, review) = h
        .send(
            "POST",
            &format!("/titles/{id}/reviews"),
            Some(&alice),
            Some(json!({"text": "Slow", "score": 4})),
        )
        .await;
    let uri = format!("/titles/{id}/reviews/{}", review["id"].as_str().unwrap());

    let (status, _) = h.send("PATCH", &uri, Some(&bob), Some(json!({"score": 1}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = h.send("GET", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 4);

    let (status, body) = h.send("PATCH", &uri, Some(&alice), Some(json!({"score": 6}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 6);
    assert_eq!(body["text"], "Slow");

    let (status, body) = h
        .send("PATCH", &uri, Some(&moderator), Some(json!({"text": "Edited"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["author"], "alice");

    let (status, _) = h.send("DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = h.send("DELETE", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = h.send("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comments_follow_their_review() {
    let h = Harness::new();
    let admin = h.with_taxa().await;
    let solaris_id = h.create_title(&admin, solaris()).await;
    let other_id = h
        .create_title(
            &admin,
            json!({"name": "Amelie", "year": 2001, "genre": ["comedy"], "category": "films"}),
        )
        .await;
    let alice = h.seed("alice", UserRole::User);

    let (_, review) = h
        .send(
            "POST",
            &format!("/titles/{solaris_id}/reviews"),
            Some(&alice),
            Some(json!({"text": "Slow", "score": 4})),
        )
        .await;
    let review_id = review["id"].as_str().unwrap().to_string();
    let comments = format!("/titles/{solaris_id}/reviews/{review_id}/comments");

    // Review exists but under another title
    let (status, _) = h
        .send(
            "POST",
            &format!("/titles/{other_id}/reviews/{review_id}/comments"),
            Some(&alice),
            Some(json!({"text": "Hm"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = h.send("POST", &comments, Some(&alice), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["text"].is_array());

    let (status, comment) = h
        .send("POST", &comments, Some(&alice), Some(json!({"text": "Agreed"})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["author"], "alice");

    let (_, page) = h.send("GET", &comments, None, None).await;
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["text"], "Agreed");

    // Deleting the title takes reviews and comments with it
    let (status, _) = h
        .send("DELETE", &format!("/titles/{solaris_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let comment_uri = format!("{comments}/{}", comment["id"].as_str().unwrap());
    let (status, _) = h.send("GET", &comment_uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_token_rejected_on_public_route() {
    let h = Harness::new();
    let (status, _) = h.send("GET", "/titles", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_anonymous_writes_are_unauthorized_before_input_checks() {
    let h = Harness::new();
    let admin = h.with_taxa().await;
    let id = h.create_title(&admin, solaris()).await;
    let missing = uuid::Uuid::new_v4();

    let (status, _) = h
        .send("PATCH", "/titles/not-a-uuid", None, Some(json!({"year": "soon"})))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = h.send("DELETE", "/titles/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = h.send("POST", "/titles", None, Some(json!({"year": "soon"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = h.send("POST", "/genres", None, Some(json!({"name": 5}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = h
        .send("POST", &format!("/titles/{id}/reviews"), None, Some(json!({"score": "ten"})))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = h
        .send(
            "PATCH",
            &format!("/titles/{id}/reviews/{missing}/comments/bad"),
            None,
            Some(json!({"text": 5})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Authenticated callers still get the input errors
    let alice = h.seed("alice", UserRole::User);
    let (status, _) = h
        .send("POST", &format!("/titles/{id}/reviews"), Some(&alice), Some(json!({"score": "ten"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = h.send("PATCH", "/titles/not-a-uuid", Some(&alice), Some(json!({}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = h.send("PATCH", "/titles/not-a-uuid", Some(&admin), Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
