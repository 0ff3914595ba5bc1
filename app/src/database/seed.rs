use sea_orm::DatabaseConnection;
use tracing::info;

use crate::{
    config::config::Config, models::user::Role, repos::users::UsersRepo,
    utils::response::ApiError,
};

/// Identity issuance is outside this service; a default admin principal is
/// seeded so a fresh deployment is usable.
pub async fn seed_default_admin(db: &DatabaseConnection, config: &Config) -> Result<(), ApiError> {
    let users_repo = UsersRepo::new(db.clone());
    let existing = users_repo.get_by_email(&config.admin_email).await;
    if existing.is_ok() {
        info!("Default admin already exists");
        return Ok(());
    }

    let _user = users_repo
        .create(
            config.admin_username.clone(),
            config.admin_email.clone(),
            Role::Admin,
        )
        .await?;
    info!("Created default admin: {}", config.admin_username);

    Ok(())
}
