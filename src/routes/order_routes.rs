use axum::{Router, routing::get};

use crate::{AppState, controllers::order_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/Order/Create",
            get(order_controller::get_create).post(order_controller::post_create),
        )
        .route("/Order/Index", get(order_controller::index))
        .route(
            "/Order/Edit/:id",
            get(order_controller::get_edit).post(order_controller::post_edit),
        )
        .route(
            "/Order/Delete/:id",
            get(order_controller::get_delete).post(order_controller::post_delete),
        )
        .route("/Order/MyOrders", get(order_controller::my_orders))
        .route("/Order/Denied", get(order_controller::get_denied))
        .route("/Order/Success", get(order_controller::get_success))
}
