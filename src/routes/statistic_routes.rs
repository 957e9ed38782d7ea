use axum::{Router, routing::get};
use crate::{AppState, controllers::statistic_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/Statistic/Index", get(statistic_controller::index))
}
