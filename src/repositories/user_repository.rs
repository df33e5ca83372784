// src/repositories/user_repository.rs
//
// Users and the directed user_friends edge table.
// Login and email uniqueness is left entirely to the engine.

use std::sync::Arc;

use log::debug;
use rusqlite::{params, OptionalExtension, Row};

use super::{date_from_sql, date_to_sql};
use crate::db::ConnectionPool;
use crate::domain::User;
use crate::error::{AppError, AppResult};

const USER_COLUMNS: &str = "u.user_id, u.login, u.email, u.display_name, u.birthday";

#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    fn save(&self, user: &User) -> AppResult<User>;
    fn save_many(&self, users: &[User]) -> AppResult<Vec<User>>;
    fn update(&self, user: &User) -> AppResult<bool>;
    fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;
    fn find_by_login(&self, login: &str) -> AppResult<Option<User>>;
    fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    /// Lookup by display name; the first match by id wins
    fn find_by_name(&self, name: &str) -> AppResult<Option<User>>;
    fn find_id_by_name(&self, name: &str) -> AppResult<Option<i64>>;
    fn find_all(&self) -> AppResult<Vec<User>>;
    fn delete_by_id(&self, id: i64) -> AppResult<bool>;
    fn delete_all(&self) -> AppResult<bool>;

    /// Record that `user_id` befriended `friend_id`. The reverse edge is not
    /// created. Returns false when the edge already existed; a self-edge is
    /// a constraint violation.
    fn add_friend(&self, user_id: i64, friend_id: i64) -> AppResult<bool>;
    fn remove_friend(&self, user_id: i64, friend_id: i64) -> AppResult<bool>;
    fn find_friends_by_id(&self, user_id: i64) -> AppResult<Vec<User>>;
    /// Users befriended by both `user_id` and `other_id`
    fn get_common_friends(&self, user_id: i64, other_id: i64) -> AppResult<Vec<User>>;
}

pub struct SqliteUserRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteUserRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &Row) -> Result<User, rusqlite::Error> {
        let birthday_str: String = row.get("birthday")?;

        Ok(User {
            id: row.get("user_id")?,
            login: row.get("login")?,
            email: row.get("email")?,
            display_name: row.get("display_name")?,
            birthday: date_from_sql(4, &birthday_str)?,
        })
    }

    fn find_one_where(&self, condition: &str, value: &str) -> AppResult<Option<User>> {
        let conn = self.pool.get()?;

        let sql = format!(
            "SELECT {} FROM users u WHERE {} ORDER BY u.user_id LIMIT 1",
            USER_COLUMNS, condition
        );
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![value], Self::row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    fn list(&self, sql: &str, ids: &[i64]) -> AppResult<Vec<User>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(sql)?;

        let users: Vec<User> = stmt
            .query_map(rusqlite::params_from_iter(ids.iter()), Self::row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }
}

impl UserRepository for SqliteUserRepository {
    fn save(&self, user: &User) -> AppResult<User> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO users (login, email, display_name, birthday) VALUES (?1, ?2, ?3, ?4)",
            params![
                user.login,
                user.email,
                user.display_name,
                date_to_sql(user.birthday),
            ],
        )?;
        let id = conn.last_insert_rowid();

        debug!("Saved user '{}' with id {}", user.login, id);

        Ok(User {
            id,
            ..user.clone()
        })
    }

    fn save_many(&self, users: &[User]) -> AppResult<Vec<User>> {
        if users.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let mut saved = Vec::with_capacity(users.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO users (login, email, display_name, birthday) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for user in users {
                stmt.execute(params![
                    user.login,
                    user.email,
                    user.display_name,
                    date_to_sql(user.birthday),
                ])?;
                saved.push(User {
                    id: tx.last_insert_rowid(),
                    ..user.clone()
                });
            }
        }
        tx.commit()?;

        debug!("Batch-inserted {} users", saved.len());
        Ok(saved)
    }

    fn update(&self, user: &User) -> AppResult<bool> {
        let conn = self.pool.get()?;

        let rows_affected = conn.execute(
            "UPDATE users SET login = ?1, email = ?2, display_name = ?3, birthday = ?4
             WHERE user_id = ?5",
            params![
                user.login,
                user.email,
                user.display_name,
                date_to_sql(user.birthday),
                user.id,
            ],
        )?;

        Ok(rows_affected > 0)
    }

    fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let conn = self.pool.get()?;

        let sql = format!("SELECT {} FROM users u WHERE u.user_id = ?1", USER_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![id], Self::row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    fn find_by_login(&self, login: &str) -> AppResult<Option<User>> {
        self.find_one_where("u.login = ?1", login)
    }

    fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.find_one_where("u.email = ?1", email)
    }

    fn find_by_name(&self, name: &str) -> AppResult<Option<User>> {
        self.find_one_where("u.display_name = ?1", name)
    }

    fn find_id_by_name(&self, name: &str) -> AppResult<Option<i64>> {
        let conn = self.pool.get()?;

        let id = conn
            .query_row(
                "SELECT user_id FROM users WHERE display_name = ?1 ORDER BY user_id LIMIT 1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        Ok(id)
    }

    fn find_all(&self) -> AppResult<Vec<User>> {
        let sql = format!("SELECT {} FROM users u ORDER BY u.user_id", USER_COLUMNS);
        self.list(&sql, &[])
    }

    fn delete_by_id(&self, id: i64) -> AppResult<bool> {
        let conn = self.pool.get()?;
        let rows_affected = conn.execute("DELETE FROM users WHERE user_id = ?1", params![id])?;
        Ok(rows_affected > 0)
    }

    fn delete_all(&self) -> AppResult<bool> {
        let conn = self.pool.get()?;
        let rows_affected = conn.execute("DELETE FROM users", [])?;
        Ok(rows_affected > 0)
    }

    fn add_friend(&self, user_id: i64, friend_id: i64) -> AppResult<bool> {
        let conn = self.pool.get()?;

        let inserted = conn.execute(
            "INSERT INTO user_friends (user_id, friend_id) VALUES (?1, ?2)
             ON CONFLICT (user_id, friend_id) DO NOTHING",
            params![user_id, friend_id],
        )?;

        debug!("User {} befriended {} (new edge: {})", user_id, friend_id, inserted > 0);
        Ok(inserted > 0)
    }

    fn remove_friend(&self, user_id: i64, friend_id: i64) -> AppResult<bool> {
        let conn = self.pool.get()?;

        let removed = conn.execute(
            "DELETE FROM user_friends WHERE user_id = ?1 AND friend_id = ?2",
            params![user_id, friend_id],
        )?;

        Ok(removed > 0)
    }

    fn find_friends_by_id(&self, user_id: i64) -> AppResult<Vec<User>> {
        let sql = format!(
            "SELECT {}
             FROM user_friends AS f
             JOIN users AS u ON u.user_id = f.friend_id
             WHERE f.user_id = ?1
             ORDER BY u.user_id",
            USER_COLUMNS
        );
        self.list(&sql, &[user_id])
    }

    fn get_common_friends(&self, user_id: i64, other_id: i64) -> AppResult<Vec<User>> {
        let sql = format!(
            "SELECT {}
             FROM users AS u
             JOIN user_friends AS a ON a.friend_id = u.user_id AND a.user_id = ?1
             JOIN user_friends AS b ON b.friend_id = u.user_id AND b.user_id = ?2
             ORDER BY u.user_id",
            USER_COLUMNS
        );
        self.list(&sql, &[user_id, other_id])
    }
}
