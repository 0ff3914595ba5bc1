use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};

use crate::{
    models::user::{self, ActiveModel, Entity as UserEntity, Model as User, Role},
    utils::{
        ids::generate_id,
        response::{ApiError, ApiResult},
    },
};

pub struct UsersRepo {
    db: DatabaseConnection,
}

impl UsersRepo {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, username: String, email: String, role: Role) -> ApiResult<User> {
        let user_model = ActiveModel {
            id: Set(generate_id()),
            username: Set(username),
            email: Set(email),
            role: Set(role),
        };

        let user = user_model.insert(&self.db).await?;

        Ok(user)
    }

    pub async fn get(&self, user_id: &str) -> ApiResult<User> {
        let user = UserEntity::find_by_id(user_id).one(&self.db).await?;

        match user {
            Some(u) => Ok(u),
            None => Err(ApiError::NotFound("User not found".to_string())),
        }
    }

    pub async fn get_by_email(&self, email: &str) -> ApiResult<User> {
        let user = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        match user {
            Some(u) => Ok(u),
            None => Err(ApiError::NotFound(format!(
                "User with the email {} not found",
                email
            ))),
        }
    }

    pub async fn exists(&self, user_id: &str) -> ApiResult<bool> {
        let user = UserEntity::find_by_id(user_id).one(&self.db).await?;

        Ok(user.is_some())
    }
}
