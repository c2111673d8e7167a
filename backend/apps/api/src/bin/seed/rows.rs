//! CSV row shapes of the seed data set
//!
//! Numeric `id` columns only link rows across files; stored records get
//! fresh UUIDs.

use std::fs::File;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;

pub const USERS_FILE: &str = "users.csv";
pub const CATEGORIES_FILE: &str = "category.csv";
pub const GENRES_FILE: &str = "genre.csv";
pub const TITLES_FILE: &str = "titles.csv";
pub const GENRE_TITLES_FILE: &str = "genre_title.csv";
pub const REVIEWS_FILE: &str = "review.csv";
pub const COMMENTS_FILE: &str = "comments.csv";

/// A parsed record, or why it could not be read
pub type Rows<T> = Vec<Result<T, csv::Error>>;

#[derive(Debug, Deserialize)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// `category.csv` and `genre.csv`
#[derive(Debug, Deserialize)]
pub struct TaxonRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Deserialize)]
pub struct TitleRow {
    pub id: i64,
    pub name: String,
    pub year: i64,
    #[serde(default)]
    pub category: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenreTitleRow {
    pub title_id: i64,
    pub genre_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRow {
    pub id: i64,
    pub title_id: i64,
    pub text: String,
    pub author: i64,
    pub score: i64,
    #[serde(default)]
    pub pub_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRow {
    pub id: i64,
    pub review_id: i64,
    pub text: String,
    pub author: i64,
    #[serde(default)]
    pub pub_date: Option<DateTime<Utc>>,
}

/// Every file of the data set, read up front
#[derive(Debug, Default)]
pub struct DataSet {
    pub users: Rows<UserRow>,
    pub categories: Rows<TaxonRow>,
    pub genres: Rows<TaxonRow>,
    pub titles: Rows<TitleRow>,
    pub genre_titles: Rows<GenreTitleRow>,
    pub reviews: Rows<ReviewRow>,
    pub comments: Rows<CommentRow>,
}

impl DataSet {
    /// A missing file loads as an empty table
    pub fn from_dir(dir: &Path) -> Self {
        Self {
            users: read_file(dir, USERS_FILE),
            categories: read_file(dir, CATEGORIES_FILE),
            genres: read_file(dir, GENRES_FILE),
            titles: read_file(dir, TITLES_FILE),
            genre_titles: read_file(dir, GENRE_TITLES_FILE),
            reviews: read_file(dir, REVIEWS_FILE),
            comments: read_file(dir, COMMENTS_FILE),
        }
    }
}

/// Header-keyed records with surrounding whitespace trimmed
pub fn read_rows<T, R>(reader: R) -> Rows<T>
where
    T: DeserializeOwned,
    R: io::Read,
{
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .into_deserialize()
        .collect()
}

fn read_file<T: DeserializeOwned>(dir: &Path, name: &str) -> Rows<T> {
    let path = dir.join(name);
    match File::open(&path) {
        Ok(file) => read_rows(file),
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "Data file unreadable, skipping");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_columns_default() {
        let rows: Rows<UserRow> =
            read_rows("id,username,email\n1, alice ,alice@example.com\n".as_bytes());
        let user = rows.into_iter().next().unwrap().unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.role.is_empty());
        assert!(user.bio.is_empty());
    }

    #[test]
    fn test_blank_foreign_key_is_none() {
        let rows: Rows<TitleRow> = read_rows("id,name,year,category\n1,Solaris,1972,\n".as_bytes());
        let title = rows.into_iter().next().unwrap().unwrap();
        assert_eq!(title.category, None);
        assert_eq!(title.description, None);
    }

    #[test]
    fn test_bad_record_does_not_stop_the_file() {
        let rows: Rows<ReviewRow> = read_rows(
            "id,title_id,text,author,score,pub_date\n\
             1,1,Fine,1,eight,2019-09-24T21:08:21.567Z\n\
             2,1,Great,2,9,2019-09-24T21:08:21.567Z\n"
                .as_bytes(),
        );
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_err());
        let review = rows[1].as_ref().unwrap();
        assert_eq!(review.score, 9);
        assert!(review.pub_date.is_some());
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let data = DataSet::from_dir(Path::new("/nonexistent/seed/data"));
        assert!(data.users.is_empty());
        assert!(data.comments.is_empty());
    }
}
