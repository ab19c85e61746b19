use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
};
use uuid::Uuid;
use validator::Validate;

use super::{ensure_non_negative, from_json, now, to_json, utc, write_error};
use crate::{
    audit,
    dto::catalogue::{
        BranchList, CreateBranchRequest, CreateFabricRequest, CreateItemRequest,
        CreateStyleRequest, FabricList, ItemList, StyleList, UpdateBranchRequest,
        UpdateFabricRequest, UpdateItemRequest, UpdateStyleRequest,
    },
    entity::{branches, fabrics, item_masters, style_masters},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Branch, Fabric, FabricType, ItemMaster, StyleMaster, parse_stored},
    response::{ApiResponse, Meta},
    routes::params::CatalogueQuery,
    state::AppState,
};

fn name_search<C: sea_orm::ColumnTrait>(column: C, query: &CatalogueQuery) -> Condition {
    match query.q.as_ref().filter(|s| !s.is_empty()) {
        Some(search) => Condition::all().add(Expr::col(column).ilike(format!("%{search}%"))),
        None => Condition::all(),
    }
}

fn deleted() -> ApiResponse<serde_json::Value> {
    ApiResponse::success("Deleted", serde_json::json!({}), Some(Meta::empty()))
}

// ---- branches ----

pub async fn list_branches(
    state: &AppState,
    query: CatalogueQuery,
) -> AppResult<ApiResponse<BranchList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let finder = branches::Entity::find()
        .filter(name_search(branches::Column::Name, &query))
        .order_by_asc(branches::Column::Name);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(branch_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Branches",
        BranchList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn load_branch(state: &AppState, id: Uuid) -> AppResult<Branch> {
    if let Some(branch) = state.cache.branches().get(&id) {
        return Ok(branch);
    }
    let branch = branches::Entity::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(branch_from_entity)
        .ok_or_else(|| AppError::not_found("Branch"))?;
    state.cache.branches().insert(id, branch.clone());
    Ok(branch)
}

pub async fn get_branch(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Branch>> {
    let branch = load_branch(state, id).await?;
    Ok(ApiResponse::success("Branch", branch, None))
}

pub async fn create_branch(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBranchRequest,
) -> AppResult<ApiResponse<Branch>> {
    ensure_admin(user)?;
    payload.validate()?;

    let model = branches::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        code: Set(payload.code),
        address: Set(payload.address),
        phone: Set(payload.phone),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|e| write_error(e, "branch name or code already exists"))?;

    audit::record(
        &state.orm,
        user.user_id,
        "branch_create",
        "branches",
        serde_json::json!({ "branch_id": model.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Branch created",
        branch_from_entity(model),
        Some(Meta::empty()),
    ))
}

pub async fn update_branch(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateBranchRequest,
) -> AppResult<ApiResponse<Branch>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = branches::Entity::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Branch"))?;

    let mut active: branches::ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(code) = payload.code {
        active.code = Set(code);
    }
    if let Some(address) = payload.address {
        active.address = Set(Some(address));
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    active.updated_at = Set(now());

    let model = active
        .update(&state.orm)
        .await
        .map_err(|e| write_error(e, "branch name or code already exists"))?;
    state.cache.branches().invalidate(&id);

    audit::record(
        &state.orm,
        user.user_id,
        "branch_update",
        "branches",
        serde_json::json!({ "branch_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        branch_from_entity(model),
        Some(Meta::empty()),
    ))
}

pub async fn delete_branch(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = branches::Entity::delete_by_id(id)
        .exec(&state.orm)
        .await
        .map_err(|e| write_error(e, "branch is in use"))?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Branch"));
    }
    state.cache.branches().invalidate(&id);

    audit::record(
        &state.orm,
        user.user_id,
        "branch_delete",
        "branches",
        serde_json::json!({ "branch_id": id }),
    )
    .await;

    Ok(deleted())
}

// ---- fabrics ----

pub async fn list_fabrics(
    state: &AppState,
    query: CatalogueQuery,
) -> AppResult<ApiResponse<FabricList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let finder = fabrics::Entity::find()
        .filter(name_search(fabrics::Column::Name, &query))
        .order_by_asc(fabrics::Column::Name);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(fabric_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Fabrics",
        FabricList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Cached lookup used by pricing.
pub async fn load_fabric(state: &AppState, id: Uuid) -> AppResult<Fabric> {
    if let Some(fabric) = state.cache.fabrics().get(&id) {
        return Ok(fabric);
    }
    let model = fabrics::Entity::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Fabric {id} not found")))?;
    let fabric = fabric_from_entity(model)?;
    state.cache.fabrics().insert(id, fabric.clone());
    Ok(fabric)
}

pub async fn get_fabric(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Fabric>> {
    let fabric = load_fabric(state, id).await?;
    Ok(ApiResponse::success("Fabric", fabric, None))
}

pub async fn create_fabric(
    state: &AppState,
    user: &AuthUser,
    payload: CreateFabricRequest,
) -> AppResult<ApiResponse<Fabric>> {
    ensure_admin(user)?;
    payload.validate()?;
    ensure_non_negative("price_per_meter", payload.price_per_meter)?;
    ensure_non_negative("in_stock_meters", payload.in_stock_meters)?;

    let model = fabrics::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        fabric_type: Set(payload.fabric_type.as_str().to_string()),
        color: Set(payload.color),
        price_per_meter: Set(payload.price_per_meter),
        in_stock_meters: Set(payload.in_stock_meters),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|e| write_error(e, "fabric name already exists"))?;

    audit::record(
        &state.orm,
        user.user_id,
        "fabric_create",
        "fabrics",
        serde_json::json!({ "fabric_id": model.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Fabric created",
        fabric_from_entity(model)?,
        Some(Meta::empty()),
    ))
}

pub async fn update_fabric(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateFabricRequest,
) -> AppResult<ApiResponse<Fabric>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = fabrics::Entity::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Fabric"))?;

    let mut active: fabrics::ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(fabric_type) = payload.fabric_type {
        active.fabric_type = Set(fabric_type.as_str().to_string());
    }
    if let Some(color) = payload.color {
        active.color = Set(Some(color));
    }
    if let Some(price) = payload.price_per_meter {
        ensure_non_negative("price_per_meter", price)?;
        active.price_per_meter = Set(price);
    }
    if let Some(stock) = payload.in_stock_meters {
        ensure_non_negative("in_stock_meters", stock)?;
        active.in_stock_meters = Set(stock);
    }
    active.updated_at = Set(now());

    let model = active
        .update(&state.orm)
        .await
        .map_err(|e| write_error(e, "fabric name already exists"))?;
    state.cache.fabrics().invalidate(&id);

    audit::record(
        &state.orm,
        user.user_id,
        "fabric_update",
        "fabrics",
        serde_json::json!({ "fabric_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        fabric_from_entity(model)?,
        Some(Meta::empty()),
    ))
}

pub async fn delete_fabric(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = fabrics::Entity::delete_by_id(id)
        .exec(&state.orm)
        .await
        .map_err(|e| write_error(e, "fabric is in use"))?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Fabric"));
    }
    state.cache.fabrics().invalidate(&id);

    audit::record(
        &state.orm,
        user.user_id,
        "fabric_delete",
        "fabrics",
        serde_json::json!({ "fabric_id": id }),
    )
    .await;

    Ok(deleted())
}

// ---- item masters ----

pub async fn list_items(
    state: &AppState,
    query: CatalogueQuery,
) -> AppResult<ApiResponse<ItemList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let finder = item_masters::Entity::find()
        .filter(name_search(item_masters::Column::Name, &query))
        .order_by_asc(item_masters::Column::Name);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(item_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Items",
        ItemList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Cached lookup used by pricing.
pub async fn load_item(state: &AppState, id: Uuid) -> AppResult<ItemMaster> {
    if let Some(item) = state.cache.items().get(&id) {
        return Ok(item);
    }
    let model = item_masters::Entity::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item type {id} not found")))?;
    let item = item_from_entity(model)?;
    state.cache.items().insert(id, item.clone());
    Ok(item)
}

pub async fn get_item(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ItemMaster>> {
    let item = load_item(state, id).await?;
    Ok(ApiResponse::success("Item", item, None))
}

pub async fn create_item(
    state: &AppState,
    user: &AuthUser,
    payload: CreateItemRequest,
) -> AppResult<ApiResponse<ItemMaster>> {
    ensure_admin(user)?;
    payload.validate()?;
    ensure_non_negative("stitching_charge", payload.stitching_charge)?;

    let model = item_masters::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        stitching_charge: Set(payload.stitching_charge),
        category: Set(payload.category),
        styles: Set(to_json(&payload.styles)?),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|e| write_error(e, "item name already exists"))?;

    audit::record(
        &state.orm,
        user.user_id,
        "item_create",
        "item_masters",
        serde_json::json!({ "item_id": model.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Item created",
        item_from_entity(model)?,
        Some(Meta::empty()),
    ))
}

pub async fn update_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateItemRequest,
) -> AppResult<ApiResponse<ItemMaster>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = item_masters::Entity::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Item"))?;

    let mut active: item_masters::ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(charge) = payload.stitching_charge {
        ensure_non_negative("stitching_charge", charge)?;
        active.stitching_charge = Set(charge);
    }
    if let Some(category) = payload.category {
        active.category = Set(Some(category));
    }
    if let Some(styles) = payload.styles {
        active.styles = Set(to_json(&styles)?);
    }
    active.updated_at = Set(now());

    let model = active
        .update(&state.orm)
        .await
        .map_err(|e| write_error(e, "item name already exists"))?;
    state.cache.items().invalidate(&id);

    audit::record(
        &state.orm,
        user.user_id,
        "item_update",
        "item_masters",
        serde_json::json!({ "item_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        item_from_entity(model)?,
        Some(Meta::empty()),
    ))
}

pub async fn delete_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = item_masters::Entity::delete_by_id(id)
        .exec(&state.orm)
        .await
        .map_err(|e| write_error(e, "item is in use"))?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Item"));
    }
    state.cache.items().invalidate(&id);

    audit::record(
        &state.orm,
        user.user_id,
        "item_delete",
        "item_masters",
        serde_json::json!({ "item_id": id }),
    )
    .await;

    Ok(deleted())
}

// ---- style masters ----

pub async fn list_styles(
    state: &AppState,
    query: CatalogueQuery,
) -> AppResult<ApiResponse<StyleList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let finder = style_masters::Entity::find()
        .filter(name_search(style_masters::Column::Name, &query))
        .order_by_asc(style_masters::Column::Name);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(style_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Styles",
        StyleList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_style(state: &AppState, id: Uuid) -> AppResult<ApiResponse<StyleMaster>> {
    let style = style_masters::Entity::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(style_from_entity)
        .ok_or_else(|| AppError::not_found("Style"))?;
    Ok(ApiResponse::success("Style", style, None))
}

pub async fn create_style(
    state: &AppState,
    user: &AuthUser,
    payload: CreateStyleRequest,
) -> AppResult<ApiResponse<StyleMaster>> {
    ensure_admin(user)?;
    payload.validate()?;
    if let Some(item_id) = payload.item_master_id {
        load_item(state, item_id).await?;
    }

    let model = style_masters::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        description: Set(payload.description),
        item_master_id: Set(payload.item_master_id),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|e| write_error(e, "style name already exists"))?;

    audit::record(
        &state.orm,
        user.user_id,
        "style_create",
        "style_masters",
        serde_json::json!({ "style_id": model.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Style created",
        style_from_entity(model),
        Some(Meta::empty()),
    ))
}

pub async fn update_style(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateStyleRequest,
) -> AppResult<ApiResponse<StyleMaster>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = style_masters::Entity::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Style"))?;

    let mut active: style_masters::ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(item_id) = payload.item_master_id {
        load_item(state, item_id).await?;
        active.item_master_id = Set(Some(item_id));
    }
    active.updated_at = Set(now());

    let model = active
        .update(&state.orm)
        .await
        .map_err(|e| write_error(e, "style name already exists"))?;

    audit::record(
        &state.orm,
        user.user_id,
        "style_update",
        "style_masters",
        serde_json::json!({ "style_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        style_from_entity(model),
        Some(Meta::empty()),
    ))
}

pub async fn delete_style(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = style_masters::Entity::delete_by_id(id)
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Style"));
    }

    audit::record(
        &state.orm,
        user.user_id,
        "style_delete",
        "style_masters",
        serde_json::json!({ "style_id": id }),
    )
    .await;

    Ok(deleted())
}

fn branch_from_entity(model: branches::Model) -> Branch {
    Branch {
        id: model.id,
        name: model.name,
        code: model.code,
        address: model.address,
        phone: model.phone,
        created_at: utc(model.created_at),
    }
}

fn fabric_from_entity(model: fabrics::Model) -> AppResult<Fabric> {
    Ok(Fabric {
        id: model.id,
        name: model.name,
        fabric_type: parse_stored::<FabricType>(&model.fabric_type)?,
        color: model.color,
        price_per_meter: model.price_per_meter,
        in_stock_meters: model.in_stock_meters,
        created_at: utc(model.created_at),
        updated_at: utc(model.updated_at),
    })
}

fn item_from_entity(model: item_masters::Model) -> AppResult<ItemMaster> {
    Ok(ItemMaster {
        id: model.id,
        name: model.name,
        stitching_charge: model.stitching_charge,
        category: model.category,
        styles: from_json(model.styles)?,
        created_at: utc(model.created_at),
        updated_at: utc(model.updated_at),
    })
}

fn style_from_entity(model: style_masters::Model) -> StyleMaster {
    StyleMaster {
        id: model.id,
        name: model.name,
        description: model.description,
        item_master_id: model.item_master_id,
        created_at: utc(model.created_at),
    }
}
