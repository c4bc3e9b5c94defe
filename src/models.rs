use jiff::Timestamp;
use serde::{Deserialize, Deserializer, Serialize, de::IgnoredAny};

const MIN_RELEASE_YEAR: i32 = 1870;
const MAX_RELEASE_YEAR: i32 = 2100;
const MAX_RATING: f64 = 10.0;

/// A persisted movie as it appears on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub release_year: i32,
    pub genre: Vec<String>,
    pub director: String,
    pub actors: Vec<String>,
    pub language: Option<String>,
    pub country: Option<String>,
    pub rating: f64,
    pub plot: Option<String>,
    pub awards: Option<String>,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Payload accepted by `POST /movies`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewMovie {
    pub title: String,
    pub release_year: i32,
    #[serde(default)]
    pub genre: Vec<String>,
    pub director: String,
    #[serde(default)]
    pub actors: Vec<String>,
    pub language: Option<String>,
    pub country: Option<String>,
    #[serde(default)]
    pub rating: f64,
    pub plot: Option<String>,
    pub awards: Option<String>,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
}

/// Payload accepted by `POST /movies/{id}`. Absent fields are left untouched.
///
/// Optional attributes are doubly wrapped: `Some(None)` is an explicit `null`
/// and clears the stored value.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MovieUpdate {
    pub title: Option<String>,
    pub release_year: Option<i32>,
    pub genre: Option<Vec<String>>,
    pub director: Option<String>,
    pub actors: Option<Vec<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub language: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub country: Option<Option<String>>,
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    pub plot: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub awards: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub poster_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub trailer_url: Option<Option<String>>,
    // Server-managed; tolerated so a fetched movie can be posted back.
    #[serde(default)]
    pub created_at: Option<IgnoredAny>,
    #[serde(default)]
    pub updated_at: Option<IgnoredAny>,
}

// Present-but-null becomes `Some(None)`; a missing field stays `None` via
// `#[serde(default)]`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: &'static str,
}

impl ValidationError {
    fn new(field: &'static str, reason: &'static str) -> Self {
        Self { field, reason }
    }
}

impl NewMovie {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("title", &self.title)?;
        check_release_year(self.release_year)?;
        check_entries("genre", &self.genre)?;
        check_not_blank("director", &self.director)?;
        check_entries("actors", &self.actors)?;
        check_rating(self.rating)?;
        check_url("posterUrl", self.poster_url.as_deref())?;
        check_url("trailerUrl", self.trailer_url.as_deref())?;
        Ok(())
    }
}

impl MovieUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.release_year.is_none()
            && self.genre.is_none()
            && self.director.is_none()
            && self.actors.is_none()
            && self.language.is_none()
            && self.country.is_none()
            && self.rating.is_none()
            && self.plot.is_none()
            && self.awards.is_none()
            && self.poster_url.is_none()
            && self.trailer_url.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::new("body", "at least one field is required"));
        }
        if let Some(title) = &self.title {
            check_not_blank("title", title)?;
        }
        if let Some(year) = self.release_year {
            check_release_year(year)?;
        }
        if let Some(genre) = &self.genre {
            check_entries("genre", genre)?;
        }
        if let Some(director) = &self.director {
            check_not_blank("director", director)?;
        }
        if let Some(actors) = &self.actors {
            check_entries("actors", actors)?;
        }
        if let Some(rating) = self.rating {
            check_rating(rating)?;
        }
        check_url("posterUrl", self.poster_url.as_ref().and_then(|u| u.as_deref()))?;
        check_url("trailerUrl", self.trailer_url.as_ref().and_then(|u| u.as_deref()))?;
        Ok(())
    }
}

fn check_not_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be blank"));
    }
    Ok(())
}

fn check_release_year(year: i32) -> Result<(), ValidationError> {
    if !(MIN_RELEASE_YEAR..=MAX_RELEASE_YEAR).contains(&year) {
        return Err(ValidationError::new("releaseYear", "must be between 1870 and 2100"));
    }
    Ok(())
}

fn check_entries(field: &'static str, values: &[String]) -> Result<(), ValidationError> {
    if values.iter().any(|v| v.trim().is_empty()) {
        return Err(ValidationError::new(field, "entries must not be blank"));
    }
    Ok(())
}

fn check_rating(rating: f64) -> Result<(), ValidationError> {
    if !rating.is_finite() || !(0.0..=MAX_RATING).contains(&rating) {
        return Err(ValidationError::new("rating", "must be between 0 and 10"));
    }
    Ok(())
}

fn check_url(field: &'static str, url: Option<&str>) -> Result<(), ValidationError> {
    match url {
        Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
            Err(ValidationError::new(field, "must be an http(s) URL"))
        },
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> NewMovie {
        NewMovie {
            title: "Dilwale Dulhania Le Jayenge".to_string(),
            release_year: 1995,
            genre: vec!["Romance".to_string(), "Drama".to_string()],
            director: "Aditya Chopra".to_string(),
            rating: 9.1,
            poster_url: Some("https://example.com/poster.jpg".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_well_formed_movie() {
        assert_eq!(valid().validate(), Ok(()));
    }

    #[test]
    fn rejects_blank_title() {
        let movie = NewMovie { title: "   ".to_string(), ..valid() };
        assert_eq!(movie.validate().unwrap_err().field, "title");
    }

    #[test]
    fn rejects_out_of_range_rating() {
        let movie = NewMovie { rating: 11.0, ..valid() };
        assert_eq!(movie.validate().unwrap_err().field, "rating");

        let movie = NewMovie { rating: f64::NAN, ..valid() };
        assert_eq!(movie.validate().unwrap_err().field, "rating");
    }

    #[test]
    fn rejects_non_http_poster() {
        let movie = NewMovie { poster_url: Some("ftp://x/poster.jpg".to_string()), ..valid() };
        assert_eq!(movie.validate().unwrap_err().field, "posterUrl");
    }

    #[test]
    fn create_payload_defaults_optional_fields() {
        let movie: NewMovie = serde_json::from_str(
            r#"{"title":"X","releaseYear":2023,"genre":["Drama"],"director":"D1","rating":6.1}"#,
        )
        .unwrap();
        assert!(movie.actors.is_empty());
        assert_eq!(movie.language, None);
        assert_eq!(movie.validate(), Ok(()));
    }

    #[test]
    fn create_payload_rejects_unknown_fields() {
        let parsed = serde_json::from_str::<NewMovie>(
            r#"{"title":"X","releaseYear":2023,"director":"D1","budget":3}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn update_payload_cannot_carry_an_id() {
        assert!(serde_json::from_str::<MovieUpdate>(r#"{"_id":"abc"}"#).is_err());
        assert!(serde_json::from_str::<MovieUpdate>(r#"{"id":"abc"}"#).is_err());
    }

    #[test]
    fn update_distinguishes_null_from_missing() {
        let update: MovieUpdate = serde_json::from_str(r#"{"plot":null}"#).unwrap();
        assert_eq!(update.plot, Some(None));
        assert_eq!(update.awards, None);
        assert!(!update.is_empty());
        assert_eq!(update.validate(), Ok(()));

        let update: MovieUpdate = serde_json::from_str(r#"{"plot":"new"}"#).unwrap();
        assert_eq!(update.plot, Some(Some("new".to_string())));
    }

    #[test]
    fn update_tolerates_server_timestamps() {
        let update: MovieUpdate = serde_json::from_str(
            r#"{
                "rating": 7.5,
                "createdAt": "2024-10-13T00:00:00Z",
                "updatedAt": "2024-10-14T00:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(update.rating, Some(7.5));

        let only_timestamps: MovieUpdate =
            serde_json::from_str(r#"{"updatedAt":"2024-10-14T00:00:00Z"}"#).unwrap();
        assert!(only_timestamps.is_empty());
    }

    #[test]
    fn empty_update_is_rejected() {
        let update: MovieUpdate = serde_json::from_str("{}").unwrap();
        assert_eq!(update.validate().unwrap_err().field, "body");
    }

    #[test]
    fn update_validates_only_present_fields() {
        let update = MovieUpdate { release_year: Some(2002), ..Default::default() };
        assert_eq!(update.validate(), Ok(()));

        let update = MovieUpdate { director: Some(String::new()), ..Default::default() };
        assert_eq!(update.validate().unwrap_err().field, "director");
    }
}
