mod common;

use jmd_backoffice_api::{
    dto::auth::{LoginRequest, RegisterRequest},
    entity::{AuditLogs, audit_logs},
    error::AppError,
    middleware::auth::AuthUser,
    models::Role,
    services::auth_service,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

fn register(email: &str, role: Role) -> RegisterRequest {
    RegisterRequest {
        email: email.into(),
        password: "director123".into(),
        name: "Test User".into(),
        role,
        branch_id: None,
    }
}

#[tokio::test]
async fn first_account_bootstraps_then_registration_is_closed() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let app = common::setup_app(&database_url).await?;
    let state = &app.state;

    let created =
        auth_service::register_user(state, None, register("owner@jmd.test", Role::Director))
            .await?;
    let owner = created.data.expect("user");
    assert_eq!(owner.role, Role::Director);

    let trail = AuditLogs::find()
        .filter(audit_logs::Column::Action.eq("user_register"))
        .filter(audit_logs::Column::UserId.eq(owner.id))
        .count(&state.orm)
        .await?;
    assert_eq!(trail, 1);

    let err = auth_service::register_user(state, None, register("walkin@jmd.test", Role::Staff))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    let login = auth_service::login_user(
        state,
        LoginRequest {
            email: "owner@jmd.test".into(),
            password: "director123".into(),
        },
    )
    .await?
    .data
    .expect("login");
    assert_eq!(login.user.id, owner.id);
    assert!(!login.token.is_empty());

    let err = auth_service::login_user(
        state,
        LoginRequest {
            email: "owner@jmd.test".into(),
            password: "wrong-password".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    let caller = AuthUser {
        user_id: owner.id,
        role: owner.role,
        branch_id: None,
    };
    let me = auth_service::current_user(state, &caller)
        .await?
        .data
        .expect("profile");
    assert_eq!(me.email, "owner@jmd.test");

    let ghost = AuthUser {
        user_id: uuid::Uuid::new_v4(),
        ..caller
    };
    let err = auth_service::current_user(state, &ghost).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    app.drain().await;
    Ok(())
}
