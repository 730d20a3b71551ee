//! Catalog types and request/response models.
//!
//! The catalog is an in-memory stand-in for a real database: the
//! service exists to exercise the authorization pipeline, and the
//! resource layer stays deliberately thin.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An actor on the agency's roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    pub id: u64,
    pub name: String,
    pub age: u32,
    pub gender: String,
}

/// A movie in production.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub release_date: NaiveDate,
}

/// Body for `POST /api/v1/actors`.
#[derive(Debug, Deserialize)]
pub struct NewActor {
    pub name: String,
    pub age: u32,
    pub gender: String,
}

/// Body for `PATCH /api/v1/actors/{id}`. All fields optional.
#[derive(Debug, Default, Deserialize)]
pub struct ActorUpdate {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
}

/// Body for `POST /api/v1/movies`.
#[derive(Debug, Deserialize)]
pub struct NewMovie {
    pub title: String,
    pub release_date: NaiveDate,
}

/// Body for `PATCH /api/v1/movies/{id}`. All fields optional.
#[derive(Debug, Default, Deserialize)]
pub struct MovieUpdate {
    pub title: Option<String>,
    pub release_date: Option<NaiveDate>,
}

/// Response for `DELETE` endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: u64,
}

/// Response for `GET /api/v1/me`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
}

/// Response for `GET /ready`.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwks: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// In-memory actors/movies store. Ids are monotonic and never reused.
#[derive(Debug, Default)]
pub struct Catalog {
    actors: Vec<Actor>,
    movies: Vec<Movie>,
    next_actor_id: u64,
    next_movie_id: u64,
}

impl Catalog {
    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn add_actor(&mut self, new: NewActor) -> Actor {
        self.next_actor_id += 1;
        let actor = Actor {
            id: self.next_actor_id,
            name: new.name,
            age: new.age,
            gender: new.gender,
        };
        self.actors.push(actor.clone());
        actor
    }

    /// Applies a partial update; `None` if the id is unknown.
    pub fn update_actor(&mut self, id: u64, update: ActorUpdate) -> Option<Actor> {
        let actor = self.actors.iter_mut().find(|a| a.id == id)?;
        if let Some(name) = update.name {
            actor.name = name;
        }
        if let Some(age) = update.age {
            actor.age = age;
        }
        if let Some(gender) = update.gender {
            actor.gender = gender;
        }
        Some(actor.clone())
    }

    /// Removes an actor; `false` if the id is unknown.
    pub fn delete_actor(&mut self, id: u64) -> bool {
        let before = self.actors.len();
        self.actors.retain(|a| a.id != id);
        self.actors.len() != before
    }

    pub fn add_movie(&mut self, new: NewMovie) -> Movie {
        self.next_movie_id += 1;
        let movie = Movie {
            id: self.next_movie_id,
            title: new.title,
            release_date: new.release_date,
        };
        self.movies.push(movie.clone());
        movie
    }

    pub fn update_movie(&mut self, id: u64, update: MovieUpdate) -> Option<Movie> {
        let movie = self.movies.iter_mut().find(|m| m.id == id)?;
        if let Some(title) = update.title {
            movie.title = title;
        }
        if let Some(release_date) = update.release_date {
            movie.release_date = release_date;
        }
        Some(movie.clone())
    }

    pub fn delete_movie(&mut self, id: u64) -> bool {
        let before = self.movies.len();
        self.movies.retain(|m| m.id != id);
        self.movies.len() != before
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn new_actor(name: &str) -> NewActor {
        NewActor {
            name: name.to_string(),
            age: 35,
            gender: "female".to_string(),
        }
    }

    #[test]
    fn test_actor_ids_are_monotonic_and_not_reused() {
        let mut catalog = Catalog::default();
        let a = catalog.add_actor(new_actor("Ada"));
        let b = catalog.add_actor(new_actor("Grace"));
        assert_eq!((a.id, b.id), (1, 2));

        assert!(catalog.delete_actor(b.id));
        let c = catalog.add_actor(new_actor("Katherine"));
        assert_eq!(c.id, 3);
    }

    #[test]
    fn test_partial_actor_update() {
        let mut catalog = Catalog::default();
        let actor = catalog.add_actor(new_actor("Ada"));
        let updated = catalog
            .update_actor(
                actor.id,
                ActorUpdate {
                    age: Some(36),
                    ..ActorUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Ada");
        assert_eq!(updated.age, 36);
    }

    #[test]
    fn test_update_unknown_actor_returns_none() {
        let mut catalog = Catalog::default();
        assert!(catalog
            .update_actor(99, ActorUpdate::default())
            .is_none());
    }

    #[test]
    fn test_delete_unknown_movie_returns_false() {
        let mut catalog = Catalog::default();
        assert!(!catalog.delete_movie(1));
    }

    #[test]
    fn test_movie_round_trip() {
        let mut catalog = Catalog::default();
        let movie = catalog.add_movie(NewMovie {
            title: "The Launch".to_string(),
            release_date: NaiveDate::from_ymd_opt(2027, 3, 1).unwrap(),
        });
        assert_eq!(catalog.movies(), &[movie.clone()]);

        let updated = catalog
            .update_movie(
                movie.id,
                MovieUpdate {
                    title: Some("The Launch, Revisited".to_string()),
                    release_date: None,
                },
            )
            .unwrap();
        assert_eq!(updated.title, "The Launch, Revisited");
        assert_eq!(updated.release_date, movie.release_date);
    }

    #[test]
    fn test_movie_serialization_uses_iso_date() {
        let movie = Movie {
            id: 1,
            title: "The Launch".to_string(),
            release_date: NaiveDate::from_ymd_opt(2027, 3, 1).unwrap(),
        };
        let json = serde_json::to_string(&movie).unwrap();
        assert!(json.contains("\"release_date\":\"2027-03-01\""));
    }

    #[test]
    fn test_readiness_response_serialization() {
        let ready = ReadinessResponse {
            status: "ready",
            jwks: Some("configured"),
            error: None,
        };
        let json = serde_json::to_string(&ready).unwrap();
        assert!(json.contains("\"status\":\"ready\""));
        assert!(!json.contains("\"error\""));

        let not_ready = ReadinessResponse {
            status: "not_ready",
            jwks: None,
            error: Some("Service dependencies unavailable".to_string()),
        };
        let json = serde_json::to_string(&not_ready).unwrap();
        assert!(!json.contains("\"jwks\""));
        assert!(json.contains("\"error\""));
    }
}
