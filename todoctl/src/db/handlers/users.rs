//! PostgreSQL repository for users.

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::{Repository, UserRepository},
        models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
    },
    types::UserId,
};
use sqlx::PgPool;
use tracing::instrument;

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at, updated_at, deleted_at";

#[derive(Debug, Clone)]
pub struct Users {
    db: PgPool,
}

impl Users {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl Repository for Users {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;

    #[instrument(skip(self, request), fields(username = %request.username), err)]
    async fn create(&self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        ))
        .bind(&request.username)
        .bind(&request.email)
        .bind(&request.password_hash)
        .fetch_one(&self.db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET deleted_at = now(), updated_at = now() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!(
            r#"
            UPDATE users SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.username.as_deref())
        .bind(request.email.as_deref())
        .bind(request.password_hash.as_deref())
        .fetch_optional(&self.db)
        .await?;

        user.ok_or(DbError::NotFound)
    }
}

#[async_trait::async_trait]
impl UserRepository for Users {
    #[instrument(skip(self, email), err)]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self), err)]
    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 AND deleted_at IS NULL"
        ))
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    fn new_user(username: &str, email: &str) -> UserCreateDBRequest {
        UserCreateDBRequest {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$not-a-real-hash".to_string(),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_lookup_user(pool: PgPool) {
        let repo = Users::new(pool);

        let user = repo.create(&new_user("alice", "alice@example.com")).await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
        assert!(user.deleted_at.is_none());

        let by_id = repo.get_by_id(user.id).await.unwrap().expect("user by id");
        assert_eq!(by_id.email, "alice@example.com");

        let by_email = repo.get_user_by_email("alice@example.com").await.unwrap().expect("user by email");
        assert_eq!(by_email.id, user.id);

        let by_username = repo.get_user_by_username("alice").await.unwrap().expect("user by username");
        assert_eq!(by_username.id, user.id);

        assert!(repo.get_by_id(user.id + 1000).await.unwrap().is_none());
        assert!(repo.get_user_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_email_and_username_are_rejected(pool: PgPool) {
        let repo = Users::new(pool);
        repo.create(&new_user("alice", "alice@example.com")).await.unwrap();

        let err = repo.create(&new_user("alice2", "alice@example.com")).await.unwrap_err();
        match err {
            DbError::UniqueViolation { constraint, .. } => {
                assert_eq!(constraint.as_deref(), Some("users_email_unique"));
            }
            other => panic!("expected unique violation, got {other:?}"),
        }

        let err = repo.create(&new_user("alice", "other@example.com")).await.unwrap_err();
        match err {
            DbError::UniqueViolation { constraint, .. } => {
                assert_eq!(constraint.as_deref(), Some("users_username_unique"));
            }
            other => panic!("expected unique violation, got {other:?}"),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_soft_deleted_user_is_hidden_and_frees_identity(pool: PgPool) {
        let repo = Users::new(pool);
        let user = repo.create(&new_user("alice", "alice@example.com")).await.unwrap();

        assert!(repo.delete(user.id).await.unwrap());
        // Second delete finds nothing left to delete
        assert!(!repo.delete(user.id).await.unwrap());

        assert!(repo.get_by_id(user.id).await.unwrap().is_none());
        assert!(repo.get_user_by_email("alice@example.com").await.unwrap().is_none());
        assert!(repo.get_user_by_username("alice").await.unwrap().is_none());

        let again = repo.create(&new_user("alice", "alice@example.com")).await.unwrap();
        assert_ne!(again.id, user.id);
        assert_eq!(
            repo.get_user_by_email("alice@example.com").await.unwrap().map(|u| u.id),
            Some(again.id)
        );
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_changes_only_given_columns(pool: PgPool) {
        let repo = Users::new(pool);
        let user = repo.create(&new_user("alice", "alice@example.com")).await.unwrap();

        let updated = repo
            .update(
                user.id,
                &UserUpdateDBRequest {
                    username: Some("alicia".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.username, "alicia");
        assert_eq!(updated.email, "alice@example.com");
        assert_eq!(updated.password_hash, user.password_hash);
        assert!(updated.updated_at >= user.updated_at);

        repo.delete(user.id).await.unwrap();
        let err = repo.update(user.id, &UserUpdateDBRequest::default()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }
}
