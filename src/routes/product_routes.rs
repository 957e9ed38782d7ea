use axum::{Router, routing::get};
use crate::{AppState, controllers::product_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/Product/Index", get(product_controller::index))
}
