//! Writes a [`DataSet`] through the auth and catalog repositories
//!
//! Tables load in dependency order. A row that fails to parse, validate or
//! insert is logged and skipped; rows that reference it are skipped too.

use std::collections::HashMap;

use anyhow::Context;
use auth::domain::UserRepository;
use auth::models::{
    email::Email,
    user::{Profile, User},
    user_name::UserName,
    user_role::UserRole,
};
use catalog::domain::{CommentRepository, ReviewRepository, TaxonRepository, TitleRepository};
use catalog::models::{
    comment::Comment,
    non_blank,
    review::Review,
    score::Score,
    slug::Slug,
    taxon::{Taxon, TaxonKind},
    taxon_name::TaxonName,
    title::{Title, validate_name, validate_year},
};
use chrono::Utc;
use kernel::id::{CommentId, ReviewId, TitleId, UserId};

use crate::rows::{
    CommentRow, DataSet, GenreTitleRow, ReviewRow, Rows, TaxonRow, TitleRow, UserRow,
};

/// Outcome for one table
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TableReport {
    pub loaded: usize,
    pub skipped: usize,
}

impl TableReport {
    fn record(&mut self, table: &'static str, outcome: anyhow::Result<()>) {
        match outcome {
            Ok(()) => self.loaded += 1,
            Err(error) => {
                self.skipped += 1;
                tracing::warn!(table, "Skipping row: {error:#}");
            }
        }
    }
}

pub struct Seeder<U, C> {
    users: U,
    catalog: C,
    max_year: i32,
    user_ids: HashMap<i64, (UserId, String)>,
    categories: HashMap<i64, Taxon>,
    genres: HashMap<i64, Taxon>,
    titles: HashMap<i64, TitleId>,
    reviews: HashMap<i64, (TitleId, ReviewId)>,
}

impl<U, C> Seeder<U, C>
where
    U: UserRepository,
    C: TaxonRepository + TitleRepository + ReviewRepository + CommentRepository,
{
    pub fn new(users: U, catalog: C, max_year: i32) -> Self {
        Self {
            users,
            catalog,
            max_year,
            user_ids: HashMap::new(),
            categories: HashMap::new(),
            genres: HashMap::new(),
            titles: HashMap::new(),
            reviews: HashMap::new(),
        }
    }

    /// Load every table, returning one report per file
    pub async fn load(&mut self, data: DataSet) -> Vec<(&'static str, TableReport)> {
        let mut reports = Vec::with_capacity(7);

        let mut report = TableReport::default();
        for row in data.users {
            let outcome = self.user(row).await;
            report.record("users", outcome);
        }
        reports.push(("users", report));

        for (table, kind, rows) in [
            ("category", TaxonKind::Category, data.categories),
            ("genre", TaxonKind::Genre, data.genres),
        ] {
            let mut report = TableReport::default();
            for row in rows {
                let outcome = self.taxon(kind, row).await;
                report.record(table, outcome);
            }
            reports.push((table, report));
        }

        // Genre links are attached when their title is inserted
        let mut links_report = TableReport::default();
        let mut links = self.genre_links(data.genre_titles, &mut links_report);

        let mut report = TableReport::default();
        for row in data.titles {
            let outcome = self.title(row, &mut links).await;
            if let Ok(linked) = &outcome {
                links_report.loaded += *linked;
            }
            report.record("titles", outcome.map(drop));
        }
        reports.push(("titles", report));

        for (title, genres) in links {
            links_report.skipped += genres.len();
            tracing::warn!(
                table = "genre_title",
                title,
                links = genres.len(),
                "Skipping links to a title that was not loaded"
            );
        }
        reports.push(("genre_title", links_report));

        let mut report = TableReport::default();
        for row in data.reviews {
            let outcome = self.review(row).await;
            report.record("review", outcome);
        }
        reports.push(("review", report));

        let mut report = TableReport::default();
        for row in data.comments {
            let outcome = self.comment(row).await;
            report.record("comments", outcome);
        }
        reports.push(("comments", report));

        reports
    }

    async fn user(&mut self, row: Result<UserRow, csv::Error>) -> anyhow::Result<()> {
        let row = row?;
        let id = row.id;
        self.insert_user(row)
            .await
            .with_context(|| format!("user {id}"))
    }

    async fn insert_user(&mut self, row: UserRow) -> anyhow::Result<()> {
        let mut user = User::new(UserName::new(&row.username)?, Email::new(row.email)?);
        if !row.role.is_empty() {
            user.role = UserRole::from_code(&row.role)
                .with_context(|| format!("unknown role {}", row.role))?;
        }
        user.profile = Profile {
            first_name: Profile::validate_field("first_name", row.first_name)?,
            last_name: Profile::validate_field("last_name", row.last_name)?,
            bio: Profile::validate_field("bio", row.bio)?,
        };
        self.users.create(&user).await?;
        self.user_ids
            .insert(row.id, (user.user_id, user.username.into_inner()));
        Ok(())
    }

    async fn taxon(
        &mut self,
        kind: TaxonKind,
        row: Result<TaxonRow, csv::Error>,
    ) -> anyhow::Result<()> {
        let row = row?;
        let id = row.id;
        self.insert_taxon(kind, row)
            .await
            .with_context(|| format!("{kind} {id}"))
    }

    async fn insert_taxon(&mut self, kind: TaxonKind, row: TaxonRow) -> anyhow::Result<()> {
        let taxon = Taxon::new(kind, TaxonName::new(&row.name)?, Slug::new(&row.slug)?);
        self.catalog.create_taxon(&taxon).await?;
        match kind {
            TaxonKind::Category => self.categories.insert(row.id, taxon),
            TaxonKind::Genre => self.genres.insert(row.id, taxon),
        };
        Ok(())
    }

    /// Group the links by CSV title id, dropping links to unknown genres
    fn genre_links(
        &self,
        rows: Rows<GenreTitleRow>,
        report: &mut TableReport,
    ) -> HashMap<i64, Vec<Taxon>> {
        let mut links: HashMap<i64, Vec<Taxon>> = HashMap::new();
        for row in rows {
            let outcome = row.map_err(anyhow::Error::from).and_then(|row| {
                let genre = self
                    .genres
                    .get(&row.genre_id)
                    .with_context(|| format!("unknown genre {}", row.genre_id))?;
                links.entry(row.title_id).or_default().push(genre.clone());
                Ok(())
            });
            // Counted as loaded once the title is inserted
            if outcome.is_err() {
                report.record("genre_title", outcome);
            }
        }
        links
    }

    /// Returns how many genre links went in with the title
    async fn title(
        &mut self,
        row: Result<TitleRow, csv::Error>,
        links: &mut HashMap<i64, Vec<Taxon>>,
    ) -> anyhow::Result<usize> {
        let row = row?;
        let id = row.id;
        let genres = links.get(&id).cloned().unwrap_or_default();
        self.insert_title(row, genres)
            .await
            .with_context(|| format!("title {id}"))?;
        Ok(links.remove(&id).map_or(0, |genres| genres.len()))
    }

    async fn insert_title(&mut self, row: TitleRow, genres: Vec<Taxon>) -> anyhow::Result<()> {
        let category = row
            .category
            .map(|category| {
                self.categories
                    .get(&category)
                    .cloned()
                    .with_context(|| format!("unknown category {category}"))
            })
            .transpose()?;
        let title = Title {
            title_id: TitleId::new(),
            name: validate_name(row.name)?,
            year: validate_year(row.year, self.max_year)?,
            description: row.description.filter(|d| !d.trim().is_empty()),
            category,
            genres,
            rating: None,
        };
        self.catalog.create_title(&title).await?;
        self.titles.insert(row.id, title.title_id);
        Ok(())
    }

    async fn review(&mut self, row: Result<ReviewRow, csv::Error>) -> anyhow::Result<()> {
        let row = row?;
        let id = row.id;
        self.insert_review(row)
            .await
            .with_context(|| format!("review {id}"))
    }

    async fn insert_review(&mut self, row: ReviewRow) -> anyhow::Result<()> {
        let title_id = *self
            .titles
            .get(&row.title_id)
            .with_context(|| format!("unknown title {}", row.title_id))?;
        let (author_id, author) = self.author(row.author)?;
        let review = Review {
            review_id: ReviewId::new(),
            title_id,
            author_id,
            author,
            text: non_blank(row.text)?,
            score: Score::new(row.score)?,
            pub_date: row.pub_date.unwrap_or_else(Utc::now),
        };
        self.catalog.create_review(&review).await?;
        self.reviews.insert(row.id, (title_id, review.review_id));
        Ok(())
    }

    async fn comment(&mut self, row: Result<CommentRow, csv::Error>) -> anyhow::Result<()> {
        let row = row?;
        let id = row.id;
        self.insert_comment(row)
            .await
            .with_context(|| format!("comment {id}"))
    }

    async fn insert_comment(&mut self, row: CommentRow) -> anyhow::Result<()> {
        let (title_id, review_id) = *self
            .reviews
            .get(&row.review_id)
            .with_context(|| format!("unknown review {}", row.review_id))?;
        let (author_id, author) = self.author(row.author)?;
        let comment = Comment {
            comment_id: CommentId::new(),
            title_id,
            review_id,
            author_id,
            author,
            text: non_blank(row.text)?,
            pub_date: row.pub_date.unwrap_or_else(Utc::now),
        };
        self.catalog.create_comment(&comment).await?;
        Ok(())
    }

    fn author(&self, id: i64) -> anyhow::Result<(UserId, String)> {
        self.user_ids
            .get(&id)
            .cloned()
            .with_context(|| format!("unknown author {id}"))
    }
}

#[cfg(test)]
mod tests {
    use auth::InMemoryUserRepository;
    use catalog::InMemoryCatalogRepository;
    use catalog::domain::TitleFilter;
    use kernel::pagination::PageRequest;

    use super::*;
    use crate::rows::read_rows;

    fn data_set() -> DataSet {
        DataSet {
            users: read_rows(
                "id,username,email,role,bio,first_name,last_name\n\
                 100,bingobongo,bingobongo@yamdb.fake,user,,,\n\
                 101,capt_obvious,capt_obvious@yamdb.fake,admin,,Captain,\n\
                 102,faust,faust@yamdb.fake,moderator,,,\n"
                    .as_bytes(),
            ),
            categories: read_rows("id,name,slug\n1,Фильм,movie\n2,Книга,book\n".as_bytes()),
            genres: read_rows("id,name,slug\n1,Драма,drama\n2,Комедия,comedy\n".as_bytes()),
            titles: read_rows(
                "id,name,year,category\n\
                 1,Побег из Шоушенка,1994,1\n\
                 2,Крестный отец,1972,1\n"
                    .as_bytes(),
            ),
            genre_titles: read_rows("id,title_id,genre_id\n1,1,1\n2,2,1\n3,2,2\n".as_bytes()),
            reviews: read_rows(
                "id,title_id,text,author,score,pub_date\n\
                 1,1,Ничего не скажу.,100,10,2019-09-24T21:08:21.567Z\n\
                 2,1,Смотрел дважды.,101,6,2019-09-24T21:08:21.567Z\n"
                    .as_bytes(),
            ),
            comments: read_rows(
                "id,review_id,text,author,pub_date\n\
                 1,1,Согласен,102,2019-09-24T21:08:21.567Z\n"
                    .as_bytes(),
            ),
        }
    }

    fn report(reports: &[(&'static str, TableReport)], table: &str) -> TableReport {
        reports
            .iter()
            .find(|(name, _)| *name == table)
            .map(|(_, report)| *report)
            .unwrap()
    }

    fn seeder() -> (
        Seeder<InMemoryUserRepository, InMemoryCatalogRepository>,
        InMemoryUserRepository,
        InMemoryCatalogRepository,
    ) {
        let users = InMemoryUserRepository::new();
        let catalog = InMemoryCatalogRepository::new();
        (
            Seeder::new(users.clone(), catalog.clone(), 2024),
            users,
            catalog,
        )
    }

    #[tokio::test]
    async fn test_loads_linked_data_set() {
        let (mut seeder, users, catalog) = seeder();
        let reports = seeder.load(data_set()).await;

        for (table, loaded) in [
            ("users", 3),
            ("category", 2),
            ("genre", 2),
            ("titles", 2),
            ("review", 2),
            ("comments", 1),
        ] {
            assert_eq!(report(&reports, table), TableReport { loaded, skipped: 0 }, "{table}");
        }
        assert_eq!(report(&reports, "genre_title"), TableReport { loaded: 3, skipped: 0 });
        assert_eq!(users.len(), 3);

        let admin = users
            .find_by_username(&UserName::new("capt_obvious").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, UserRole::Admin);
        assert_eq!(admin.profile.first_name, "Captain");

        let (titles, count) = catalog
            .list_titles(&TitleFilter::default(), PageRequest::new(1, 10))
            .await
            .unwrap();
        assert_eq!(count, 2);
        let godfather = titles.iter().find(|t| t.year == 1972).unwrap();
        assert_eq!(godfather.genres.len(), 2);
        let shawshank = titles.iter().find(|t| t.year == 1994).unwrap();
        assert_eq!(shawshank.rating, Some(8));
        assert_eq!(shawshank.category.as_ref().unwrap().slug.as_str(), "movie");

        let (reviews, _) = catalog
            .list_reviews(&shawshank.title_id, PageRequest::new(1, 10))
            .await
            .unwrap();
        let first = reviews.iter().find(|r| r.score.get() == 10).unwrap();
        assert_eq!(first.author, "bingobongo");
        let (comments, _) = catalog
            .list_comments(&first.review_id, PageRequest::new(1, 10))
            .await
            .unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].author, "faust");
    }

    #[tokio::test]
    async fn test_bad_rows_are_skipped_with_their_dependents() {
        let (mut seeder, users, _) = seeder();
        let mut data = data_set();
        data.users = read_rows(
            "id,username,email,role\n\
             100,bingobongo,bingobongo@yamdb.fake,user\n\
             101,me,me@yamdb.fake,user\n\
             102,faust,not-an-email,user\n\
             103,boss,boss@yamdb.fake,owner\n"
                .as_bytes(),
        );
        data.titles = read_rows(
            "id,name,year,category\n\
             1,Побег из Шоушенка,1994,1\n\
             2,Крестный отец,soon,1\n\
             3,Future,3000,1\n\
             4,Lost,1999,9\n"
                .as_bytes(),
        );
        data.reviews = read_rows(
            "id,title_id,text,author,score,pub_date\n\
             1,1,Ничего не скажу.,100,11,\n\
             2,1,Смотрел дважды.,100,7,\n\
             3,1,Again,100,5,\n\
             4,2,Orphan,100,5,\n\
             5,1,Stranger,101,5,\n"
                .as_bytes(),
        );
        data.comments = read_rows(
            "id,review_id,text,author,pub_date\n\
             1,1,Hello,100,\n\
             2,2,   ,100,\n\
             3,2,Согласен,100,\n"
                .as_bytes(),
        );

        let reports = seeder.load(data).await;

        assert_eq!(report(&reports, "users"), TableReport { loaded: 1, skipped: 3 });
        assert_eq!(users.len(), 1);
        assert_eq!(report(&reports, "titles"), TableReport { loaded: 1, skipped: 3 });
        // Both links of title 2 point at a title that never loaded
        assert_eq!(report(&reports, "genre_title"), TableReport { loaded: 1, skipped: 2 });
        // Score out of range, duplicate author, unknown title, unknown author
        assert_eq!(report(&reports, "review"), TableReport { loaded: 1, skipped: 4 });
        // Review 1 was skipped; a blank text is rejected
        assert_eq!(report(&reports, "comments"), TableReport { loaded: 1, skipped: 2 });
    }
}
