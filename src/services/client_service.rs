use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
};
use uuid::Uuid;
use validator::Validate;

use super::{now, utc, write_error};
use crate::{
    audit,
    dto::clients::{ClientList, CreateClientRequest, UpdateClientRequest},
    entity::clients::{ActiveModel, Column, Entity as Clients, Model as ClientModel},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Client,
    response::{ApiResponse, Meta},
    routes::params::ClientQuery,
    state::AppState,
};

pub async fn list_clients(
    state: &AppState,
    user: &AuthUser,
    query: ClientQuery,
) -> AppResult<ApiResponse<ClientList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = user.branch_condition(Column::BranchId);

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Mobile).ilike(pattern)),
        );
    }

    let finder = Clients::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(client_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Clients",
        ClientList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Cached lookup; records outside the caller's branch read as missing.
pub async fn load_client(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<Client> {
    let client = match state.cache.clients().get(&id) {
        Some(client) => client,
        None => {
            let client = Clients::find_by_id(id)
                .one(&state.orm)
                .await?
                .map(client_from_entity)
                .ok_or_else(|| AppError::not_found("Client"))?;
            state.cache.clients().insert(id, client.clone());
            client
        }
    };

    if !user.can_access(client.branch_id) {
        return Err(AppError::not_found("Client"));
    }
    Ok(client)
}

pub async fn get_client(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Client>> {
    let client = load_client(state, user, id).await?;
    Ok(ApiResponse::success("Client", client, None))
}

pub async fn create_client(
    state: &AppState,
    user: &AuthUser,
    payload: CreateClientRequest,
) -> AppResult<ApiResponse<Client>> {
    payload.validate()?;

    let model = ActiveModel {
        id: Set(Uuid::new_v4()),
        branch_id: Set(user.owning_branch(payload.branch_id)),
        name: Set(payload.name),
        mobile: Set(payload.mobile),
        email: Set(payload.email),
        address: Set(payload.address),
        city: Set(payload.city),
        state: Set(payload.state),
        pincode: Set(payload.pincode),
        gstin: Set(payload.gstin),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|e| write_error(e, "client already exists"))?;

    audit::record(
        &state.orm,
        user.user_id,
        "client_create",
        "clients",
        serde_json::json!({ "client_id": model.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Client created",
        client_from_entity(model),
        Some(Meta::empty()),
    ))
}

pub async fn update_client(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateClientRequest,
) -> AppResult<ApiResponse<Client>> {
    payload.validate()?;

    let existing = Clients::find_by_id(id)
        .one(&state.orm)
        .await?
        .filter(|c| user.can_access(c.branch_id))
        .ok_or_else(|| AppError::not_found("Client"))?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(mobile) = payload.mobile {
        active.mobile = Set(mobile);
    }
    if let Some(email) = payload.email {
        active.email = Set(Some(email));
    }
    if let Some(address) = payload.address {
        active.address = Set(Some(address));
    }
    if let Some(city) = payload.city {
        active.city = Set(Some(city));
    }
    if let Some(state_name) = payload.state {
        active.state = Set(Some(state_name));
    }
    if let Some(pincode) = payload.pincode {
        active.pincode = Set(Some(pincode));
    }
    if let Some(gstin) = payload.gstin {
        active.gstin = Set(Some(gstin));
    }
    active.updated_at = Set(now());

    let model = active.update(&state.orm).await?;
    state.cache.clients().invalidate(&id);

    audit::record(
        &state.orm,
        user.user_id,
        "client_update",
        "clients",
        serde_json::json!({ "client_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        client_from_entity(model),
        Some(Meta::empty()),
    ))
}

pub async fn delete_client(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = Clients::find_by_id(id)
        .one(&state.orm)
        .await?
        .filter(|c| user.can_access(c.branch_id))
        .ok_or_else(|| AppError::not_found("Client"))?;

    Clients::delete_by_id(existing.id)
        .exec(&state.orm)
        .await
        .map_err(|e| write_error(e, "client has orders"))?;
    state.cache.clients().invalidate(&id);

    audit::record(
        &state.orm,
        user.user_id,
        "client_delete",
        "clients",
        serde_json::json!({ "client_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub(crate) fn client_from_entity(model: ClientModel) -> Client {
    Client {
        id: model.id,
        branch_id: model.branch_id,
        name: model.name,
        mobile: model.mobile,
        email: model.email,
        address: model.address,
        city: model.city,
        state: model.state,
        pincode: model.pincode,
        gstin: model.gstin,
        created_at: utc(model.created_at),
        updated_at: utc(model.updated_at),
    }
}
