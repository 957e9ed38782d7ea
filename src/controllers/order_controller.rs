use axum::{
    extract::{Extension, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use crate::{
    models::{CurrentUser, Order, OrderSummary},
    render,
    services::{order_service, product_service, ServiceError},
    AppState,
};

const DENIED: &str = "/Order/Denied";

fn fmt2(v: f64) -> String {
    format!("{:.2}", v)
}

fn format_order_date(order: &Order) -> String {
    order.order_date.format("%d-%b-%Y %I:%M").to_string()
}

fn denied(headers: &HeaderMap) -> Response {
    render::redirect(headers, DENIED)
}

fn login_redirect(headers: &HeaderMap) -> Response {
    render::redirect(headers, "/login")
}

fn db_failure(e: ServiceError) -> Response {
    error!(error = %e, "order request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("db error: {e}"))).into_response()
}

fn not_found(state: &AppState, headers: &HeaderMap, user: &CurrentUser) -> Response {
    render::render_page(
        state,
        headers,
        Some(user),
        StatusCode::NOT_FOUND,
        "404",
        "pages/not_found",
        &json!({}),
    )
}

fn parse_positive(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|n| *n > 0)
}

fn user_message(e: &ServiceError) -> String {
    match e {
        ServiceError::InsufficientStock { available, .. } => {
            format!("Not enough stock: only {available} available.")
        }
        ServiceError::ProductNotFound(_) => "That product is no longer available.".to_string(),
        ServiceError::InvalidQuantity(_) => "Enter a valid quantity.".to_string(),
        ServiceError::OrderNotFound(_) => "The order no longer exists.".to_string(),
        ServiceError::Malformed(_) | ServiceError::Database(_) => {
            "Something went wrong. Please try again.".to_string()
        }
    }
}

fn order_row(s: &OrderSummary) -> serde_json::Value {
    let o = &s.order;
    json!({
        "id": o.id,
        "order_date": format_order_date(o),
        "user_id": o.user_id,
        "user": s.username,
        "product_id": o.product_id,
        "product": s.product_name,
        "picture": s.picture,
        "quantity": o.quantity,
        "price": fmt2(o.price),
        "discount": fmt2(o.discount),
        "total_price": fmt2(o.total_price()),
    })
}

// ---------------- CREATE ----------------

#[derive(Deserialize)]
pub struct CreateQuery {
    pub id: Option<String>,
}

// GET /Order/Create?id={productId}
pub async fn get_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
    Query(q): Query<CreateQuery>,
) -> Response {
    let Some(Extension(u)) = user else {
        return login_redirect(&headers);
    };

    let Some(product_id) = q.id.as_deref().and_then(|s| s.trim().parse::<i64>().ok()) else {
        return not_found(&state, &headers, &u);
    };

    let product = match product_service::get_product_by_id(&state, product_id).await {
        Ok(Some(p)) => p,
        Ok(None) => return not_found(&state, &headers, &u),
        Err(e) => return db_failure(e),
    };

    render::render_page(
        &state,
        &headers,
        Some(&u),
        StatusCode::OK,
        "Order",
        "orders/create",
        &json!({
            "product_id": product.id,
            "product_name": product.product_name,
            "picture": product.picture,
            "quantity_in_stock": product.quantity,
            "in_stock": product.quantity > 0,
            "price": fmt2(product.price),
            "discount": fmt2(product.discount),
            "quantity": 1,
        }),
    )
}

#[derive(Deserialize)]
pub struct CreateOrderForm {
    pub product_id: String,
    pub quantity: String,
}

// POST /Order/Create
pub async fn post_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
    Form(form): Form<CreateOrderForm>,
) -> Response {
    let Some(Extension(u)) = user else {
        warn!("order attempted without identity");
        return denied(&headers);
    };

    let (Some(product_id), Some(quantity)) = (
        form.product_id.trim().parse::<i64>().ok(),
        parse_positive(&form.quantity),
    ) else {
        return denied(&headers);
    };

    let product = match product_service::get_product_by_id(&state, product_id).await {
        Ok(Some(p)) => p,
        Ok(None) => return denied(&headers),
        Err(e) => return db_failure(e),
    };

    if product.quantity == 0 || product.quantity < quantity {
        warn!(product_id, quantity, stock = product.quantity, "order denied by stock guard");
        return denied(&headers);
    }

    match order_service::create(&state, product_id, u.id, quantity).await {
        Ok(_) => render::redirect(&headers, "/Product/Index"),
        Err(e) if e.is_guard_failure() => denied(&headers),
        Err(e) => db_failure(e),
    }
}

// ---------------- LISTS ----------------

// GET /Order/Index (administrators)
pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return login_redirect(&headers);
    };

    if !u.is_admin() {
        warn!(user_id = u.id, "non-administrator requested the order index");
        return denied(&headers);
    }

    let orders = match order_service::get_orders(&state).await {
        Ok(o) => o,
        Err(e) => return db_failure(e),
    };

    let rows: Vec<serde_json::Value> = orders.iter().map(order_row).collect();

    render::render_page(
        &state,
        &headers,
        Some(&u),
        StatusCode::OK,
        "Orders",
        "orders/index",
        &json!({ "orders": rows, "show_user": true }),
    )
}

// GET /Order/MyOrders
pub async fn my_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return login_redirect(&headers);
    };

    let orders = match order_service::get_orders_by_user(&state, u.id).await {
        Ok(o) => o,
        Err(e) => return db_failure(e),
    };

    let rows: Vec<serde_json::Value> = orders.iter().map(order_row).collect();

    render::render_page(
        &state,
        &headers,
        Some(&u),
        StatusCode::OK,
        "My orders",
        "orders/my_orders",
        &json!({ "orders": rows, "show_user": false }),
    )
}

// ---------------- EDIT ----------------

async fn render_edit(
    state: &AppState,
    headers: &HeaderMap,
    user: &CurrentUser,
    order: &Order,
    selected_product: i64,
    quantity: &str,
    message: Option<String>,
) -> Response {
    let (current, products) = match (
        product_service::get_product_by_id(state, order.product_id).await,
        product_service::get_products(state).await,
    ) {
        (Ok(c), Ok(p)) => (c, p),
        (Err(e), _) | (_, Err(e)) => return db_failure(e),
    };

    let choices: Vec<serde_json::Value> = products
        .iter()
        .map(|p| {
            json!({
                "id": p.id,
                "product_name": p.product_name,
                "quantity": p.quantity,
                "selected": p.id == selected_product,
            })
        })
        .collect();

    let status = if message.is_some() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };

    render::render_page(
        state,
        headers,
        Some(user),
        status,
        "Edit order",
        "orders/edit",
        &json!({
            "id": order.id,
            "product_id": order.product_id,
            "product_name": current.as_ref().map(|p| p.product_name.clone()),
            "picture": current.as_ref().and_then(|p| p.picture.clone()),
            "quantity_in_stock": current.as_ref().map(|p| p.quantity),
            "quantity": quantity,
            "price": fmt2(order.price),
            "discount": fmt2(order.discount),
            "total_price": fmt2(order.total_price()),
            "products": choices,
            "error": message,
        }),
    )
}

/// Loads an order the current user may manage, or the response to send instead.
async fn load_managed_order(
    state: &AppState,
    headers: &HeaderMap,
    user: &CurrentUser,
    order_id: i64,
) -> Result<Order, Response> {
    match order_service::get_order_by_id(state, order_id).await {
        Ok(Some(o)) if user.can_manage(o.user_id) => Ok(o),
        Ok(Some(o)) => {
            warn!(order_id, owner = o.user_id, user_id = user.id, "order access denied");
            Err(denied(headers))
        }
        Ok(None) => Err(not_found(state, headers, user)),
        Err(e) => Err(db_failure(e)),
    }
}

// GET /Order/Edit/{id}
pub async fn get_edit(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
    Path(id): Path<i64>,
) -> Response {
    let Some(Extension(u)) = user else {
        return login_redirect(&headers);
    };

    let order = match load_managed_order(&state, &headers, &u, id).await {
        Ok(o) => o,
        Err(res) => return res,
    };

    render_edit(&state, &headers, &u, &order, order.product_id, &order.quantity.to_string(), None).await
}

#[derive(Deserialize)]
pub struct EditOrderForm {
    pub product_id: String,
    pub quantity: String,
}

// POST /Order/Edit/{id}
pub async fn post_edit(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
    Path(id): Path<i64>,
    Form(form): Form<EditOrderForm>,
) -> Response {
    let Some(Extension(u)) = user else {
        return login_redirect(&headers);
    };

    let order = match load_managed_order(&state, &headers, &u, id).await {
        Ok(o) => o,
        Err(res) => return res,
    };

    let Some(product_id) = form.product_id.trim().parse::<i64>().ok() else {
        return render_edit(
            &state,
            &headers,
            &u,
            &order,
            order.product_id,
            &form.quantity,
            Some(user_message(&ServiceError::ProductNotFound(order.product_id))),
        )
        .await;
    };

    let Some(quantity) = parse_positive(&form.quantity) else {
        return render_edit(
            &state,
            &headers,
            &u,
            &order,
            product_id,
            &form.quantity,
            Some("Enter a valid quantity.".to_string()),
        )
        .await;
    };

    // The order stays with its owner even when an administrator edits it.
    match order_service::update(&state, id, product_id, order.user_id, quantity).await {
        Ok(_) => render::redirect(&headers, "/Order/MyOrders"),
        Err(ServiceError::OrderNotFound(_)) => not_found(&state, &headers, &u),
        Err(e) if e.is_guard_failure() => {
            render_edit(&state, &headers, &u, &order, product_id, &form.quantity, Some(user_message(&e))).await
        }
        Err(e) => db_failure(e),
    }
}

// ---------------- DELETE ----------------

async fn render_delete(
    state: &AppState,
    headers: &HeaderMap,
    user: &CurrentUser,
    order: &Order,
    message: Option<String>,
) -> Response {
    let product = match product_service::get_product_by_id(state, order.product_id).await {
        Ok(p) => p,
        Err(e) => return db_failure(e),
    };

    let status = if message.is_some() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };

    render::render_page(
        state,
        headers,
        Some(user),
        status,
        "Cancel order",
        "orders/delete",
        &json!({
            "id": order.id,
            "order_date": format_order_date(order),
            "product_id": order.product_id,
            "product_name": product.as_ref().map(|p| p.product_name.clone()),
            "picture": product.as_ref().and_then(|p| p.picture.clone()),
            "quantity": order.quantity,
            "price": fmt2(order.price),
            "discount": fmt2(order.discount),
            "total_price": fmt2(order.total_price()),
            "error": message,
        }),
    )
}

// GET /Order/Delete/{id}
pub async fn get_delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
    Path(id): Path<i64>,
) -> Response {
    let Some(Extension(u)) = user else {
        return login_redirect(&headers);
    };

    match load_managed_order(&state, &headers, &u, id).await {
        Ok(order) => render_delete(&state, &headers, &u, &order, None).await,
        Err(res) => res,
    }
}

// POST /Order/Delete/{id}
pub async fn post_delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
    Path(id): Path<i64>,
) -> Response {
    let Some(Extension(u)) = user else {
        return login_redirect(&headers);
    };

    let order = match load_managed_order(&state, &headers, &u, id).await {
        Ok(o) => o,
        Err(res) => return res,
    };

    match order_service::remove_by_id(&state, id).await {
        Ok(()) => render::redirect(&headers, "/Order/Success"),
        Err(ServiceError::OrderNotFound(_)) => not_found(&state, &headers, &u),
        Err(e) => {
            error!(order_id = id, error = %e, "order removal failed");
            render_delete(&state, &headers, &u, &order, Some(user_message(&e))).await
        }
    }
}

// ---------------- STATIC PAGES ----------------

// GET /Order/Denied
pub async fn get_denied(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let user_ref = user.as_ref().map(|Extension(u)| u);
    render::render_page(&state, &headers, user_ref, StatusCode::OK, "Denied", "orders/denied", &json!({}))
}

// GET /Order/Success
pub async fn get_success(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let user_ref = user.as_ref().map(|Extension(u)| u);
    render::render_page(&state, &headers, user_ref, StatusCode::OK, "Done", "orders/success", &json!({}))
}
