// src/services/film_service.rs
use std::sync::Arc;

use log::info;

use crate::domain::{dedup_genres_by_id, Film};
use crate::error::{AppError, AppResult};
use crate::repositories::{FilmRepository, GenreRepository, RatingRepository, UserRepository};

/// Number of films returned by `popular` when the caller gives no count.
pub const DEFAULT_POPULAR_COUNT: usize = 10;

pub struct FilmService {
    film_repo: Arc<dyn FilmRepository>,
    user_repo: Arc<dyn UserRepository>,
    rating_repo: Arc<dyn RatingRepository>,
    genre_repo: Arc<dyn GenreRepository>,
}

impl FilmService {
    pub fn new(
        film_repo: Arc<dyn FilmRepository>,
        user_repo: Arc<dyn UserRepository>,
        rating_repo: Arc<dyn RatingRepository>,
        genre_repo: Arc<dyn GenreRepository>,
    ) -> Self {
        Self {
            film_repo,
            user_repo,
            rating_repo,
            genre_repo,
        }
    }

    pub fn create(&self, film: Film) -> AppResult<Film> {
        self.film_repo.save(&film)
    }

    /// Rewrite the film row and replace its genre set.
    pub fn update(&self, film: Film) -> AppResult<Film> {
        if self.rating_repo.find_by_id(film.rating.id)?.is_none() {
            return Err(AppError::InvalidReference(format!(
                "Rating with id {} does not exist",
                film.rating.id
            )));
        }

        let genres = dedup_genres_by_id(&film.genres);
        for genre in &genres {
            if self.genre_repo.find_by_id(genre.id)?.is_none() {
                return Err(AppError::InvalidReference(format!(
                    "Genre with id {} does not exist",
                    genre.id
                )));
            }
        }

        if !self.film_repo.update(&film)? {
            return Err(AppError::not_found("Film", format!("id = {}", film.id)));
        }

        self.genre_repo.remove_all_for_film(film.id)?;
        if !genres.is_empty() {
            self.genre_repo.add(film.id, &genres)?;
        }

        info!("Updated film {}", film.id);
        self.get(film.id)
    }

    pub fn get(&self, id: i64) -> AppResult<Film> {
        self.film_repo
            .find_by_id(id)?
            .ok_or_else(|| AppError::not_found("Film", format!("id = {}", id)))
    }

    pub fn list(&self) -> AppResult<Vec<Film>> {
        self.film_repo.find_all()
    }

    pub fn delete(&self, id: i64) -> AppResult<()> {
        if !self.film_repo.delete_by_id(id)? {
            return Err(AppError::not_found("Film", format!("id = {}", id)));
        }
        Ok(())
    }

    /// Both the film and the user must exist. Liking twice is not an error.
    pub fn add_like(&self, film_id: i64, user_id: i64) -> AppResult<()> {
        self.ensure_film(film_id)?;
        self.ensure_user(user_id)?;

        if self.film_repo.add_like(film_id, user_id)? {
            info!("User {} liked film {}", user_id, film_id);
        }
        Ok(())
    }

    /// Returns whether a like was actually removed.
    pub fn remove_like(&self, film_id: i64, user_id: i64) -> AppResult<bool> {
        self.ensure_film(film_id)?;
        self.ensure_user(user_id)?;

        self.film_repo.remove_like(film_id, user_id)
    }

    pub fn popular(&self, count: Option<usize>) -> AppResult<Vec<Film>> {
        self.film_repo
            .get_top_by_likes(count.unwrap_or(DEFAULT_POPULAR_COUNT))
    }

    pub fn fans(&self, film_id: i64) -> AppResult<Vec<i64>> {
        self.ensure_film(film_id)?;
        self.film_repo.find_fans_ids(film_id)
    }

    fn ensure_film(&self, film_id: i64) -> AppResult<()> {
        if !self.film_repo.exists_by_id(film_id)? {
            return Err(AppError::not_found("Film", format!("id = {}", film_id)));
        }
        Ok(())
    }

    fn ensure_user(&self, user_id: i64) -> AppResult<()> {
        if self.user_repo.find_by_id(user_id)?.is_none() {
            return Err(AppError::not_found("User", format!("id = {}", user_id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Genre, Rating, User};
    use crate::repositories::{
        MockFilmRepository, MockGenreRepository, MockRatingRepository, MockUserRepository,
    };
    use chrono::NaiveDate;

    fn film(id: i64) -> Film {
        let mut film = Film::new(
            "Name",
            "Description",
            NaiveDate::from_ymd_opt(1990, 12, 12).unwrap(),
            100,
            Rating { id: 1, name: "G".to_string() },
        );
        film.id = id;
        film
    }

    fn user(id: i64) -> User {
        let mut user = User::new(
            "login",
            "login@mail.com",
            "Name",
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        );
        user.id = id;
        user
    }

    struct Mocks {
        films: MockFilmRepository,
        users: MockUserRepository,
        ratings: MockRatingRepository,
        genres: MockGenreRepository,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                films: MockFilmRepository::new(),
                users: MockUserRepository::new(),
                ratings: MockRatingRepository::new(),
                genres: MockGenreRepository::new(),
            }
        }

        fn service(self) -> FilmService {
            FilmService::new(
                Arc::new(self.films),
                Arc::new(self.users),
                Arc::new(self.ratings),
                Arc::new(self.genres),
            )
        }
    }

    #[test]
    fn test_add_like_requires_existing_user() {
        let mut mocks = Mocks::new();
        mocks.films.expect_exists_by_id().returning(|_| Ok(true));
        mocks.users.expect_find_by_id().returning(|_| Ok(None));
        mocks.films.expect_add_like().never();

        let err = mocks.service().add_like(1, 2).unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_add_like_requires_existing_film() {
        let mut mocks = Mocks::new();
        mocks.films.expect_exists_by_id().returning(|_| Ok(false));
        mocks.films.expect_add_like().never();

        let err = mocks.service().add_like(1, 2).unwrap_err();

        assert!(err.to_string().contains("Film with id = 1"));
    }

    #[test]
    fn test_like_and_unlike_delegate() {
        let mut mocks = Mocks::new();
        mocks.films.expect_exists_by_id().returning(|_| Ok(true));
        mocks.films.expect_find_by_id().never();
        mocks.users.expect_find_by_id().returning(|id| Ok(Some(user(id))));
        mocks.films.expect_add_like().times(1).returning(|_, _| Ok(true));
        mocks.films.expect_remove_like().times(1).returning(|_, _| Ok(false));
        let service = mocks.service();

        service.add_like(1, 2).unwrap();
        assert!(!service.remove_like(1, 3).unwrap());
    }

    #[test]
    fn test_fans_of_missing_film_is_not_found() {
        let mut mocks = Mocks::new();
        mocks.films.expect_exists_by_id().returning(|_| Ok(false));
        mocks.films.expect_find_fans_ids().never();

        assert!(matches!(mocks.service().fans(3), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_popular_defaults_to_ten() {
        let mut mocks = Mocks::new();
        mocks.films
            .expect_get_top_by_likes()
            .withf(|count| *count == DEFAULT_POPULAR_COUNT)
            .times(1)
            .returning(|_| Ok(Vec::new()));
        mocks.films
            .expect_get_top_by_likes()
            .withf(|count| *count == 3)
            .times(1)
            .returning(|_| Ok(Vec::new()));
        let service = mocks.service();

        service.popular(None).unwrap();
        service.popular(Some(3)).unwrap();
    }

    #[test]
    fn test_update_missing_film_is_not_found() {
        let mut mocks = Mocks::new();
        mocks.ratings
            .expect_find_by_id()
            .returning(|id| Ok(Some(Rating { id, name: "G".to_string() })));
        mocks.films.expect_update().returning(|_| Ok(false));
        mocks.genres.expect_remove_all_for_film().never();

        let err = mocks.service().update(film(42)).unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_update_with_unknown_rating_touches_nothing() {
        let mut mocks = Mocks::new();
        mocks.ratings.expect_find_by_id().returning(|_| Ok(None));
        mocks.films.expect_update().never();

        let err = mocks.service().update(film(42)).unwrap_err();

        assert!(matches!(err, AppError::InvalidReference(_)));
    }

    #[test]
    fn test_update_replaces_genres_once_each() {
        let mut mocks = Mocks::new();
        mocks.ratings
            .expect_find_by_id()
            .returning(|id| Ok(Some(Rating { id, name: "G".to_string() })));
        mocks.genres
            .expect_find_by_id()
            .returning(|id| Ok(Some(Genre { id, name: format!("Genre {}", id) })));
        mocks.films.expect_update().returning(|_| Ok(true));
        mocks.genres
            .expect_remove_all_for_film()
            .times(1)
            .returning(|_| Ok(3));
        mocks.genres
            .expect_add()
            .withf(|film_id, genres| *film_id == 42 && genres.len() == 2)
            .times(1)
            .returning(|_, genres| Ok(genres.to_vec()));
        mocks.films.expect_find_by_id().returning(|id| Ok(Some(film(id))));

        let changed = film(42).with_genres(vec![
            Genre::with_id(1),
            Genre::with_id(2),
            Genre::with_id(1),
        ]);

        let updated = mocks.service().update(changed).unwrap();
        assert_eq!(updated.id, 42);
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let mut mocks = Mocks::new();
        mocks.films.expect_delete_by_id().returning(|_| Ok(false));

        assert!(matches!(mocks.service().delete(5), Err(AppError::NotFound(_))));
    }
}
