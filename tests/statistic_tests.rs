mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{as_user, location, response_body_string, seed_product, seed_user, test_state};
use tower::ServiceExt;
use webshop::{
    models::{ROLE_ADMINISTRATOR, ROLE_CLIENT},
    routes,
    services::{order_service, statistic_service},
};

#[tokio::test]
async fn empty_shop_has_zero_statistics() {
    let state = test_state().await;

    let stats = statistic_service::collect(&state).await.unwrap();

    assert_eq!(stats, statistic_service::Statistics::default());
}

#[tokio::test]
async fn statistics_count_clients_products_and_sales() {
    let state = test_state().await;
    seed_user(&state, "root", ROLE_ADMINISTRATOR).await;
    let alice = seed_user(&state, "alice", ROLE_CLIENT).await;
    let bob = seed_user(&state, "bob", ROLE_CLIENT).await;
    let kettle = seed_product(&state, "Kettle", 50.0, 10.0, 10).await;
    let cup = seed_product(&state, "Cup", 10.0, 0.0, 10).await;

    // 2 * 50 * 0.9 = 90, 3 * 10 = 30
    order_service::create(&state, kettle.id, alice.id, 2).await.unwrap();
    order_service::create(&state, cup.id, bob.id, 3).await.unwrap();

    let stats = statistic_service::collect(&state).await.unwrap();

    assert_eq!(stats.count_clients, 2);
    assert_eq!(stats.count_products, 2);
    assert_eq!(stats.count_orders, 2);
    assert!((stats.sum_orders - 120.0).abs() < 1e-9);
}

#[tokio::test]
async fn statistic_page_renders_for_administrators() {
    let state = test_state().await;
    let admin = seed_user(&state, "root", ROLE_ADMINISTRATOR).await;
    seed_user(&state, "alice", ROLE_CLIENT).await;
    seed_product(&state, "Cup", 10.0, 0.0, 10).await;
    let app = routes::app(state);

    let req = as_user(
        Request::builder().uri("/Statistic/Index").body(Body::empty()).unwrap(),
        &admin,
    );
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains(r#"<dd id="count-clients">1</dd>"#));
    assert!(body.contains(r#"<dd id="count-products">1</dd>"#));
    assert!(body.contains(r#"<dd id="sum-orders">0.00</dd>"#));
}

#[tokio::test]
async fn statistic_page_is_denied_to_clients() {
    let state = test_state().await;
    let alice = seed_user(&state, "alice", ROLE_CLIENT).await;
    let app = routes::app(state);

    let req = as_user(
        Request::builder().uri("/Statistic/Index").body(Body::empty()).unwrap(),
        &alice,
    );
    let res = app.oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res).as_deref(), Some("/Order/Denied"));
}

fn assert_send<T: Send>(_: &T) {}

#[tokio::test]
async fn lookup_and_statistic_futures_can_cross_threads() {
    let state = test_state().await;

    let by_id = webshop::services::user_service::find_by_id(&state, 1);
    let by_email = webshop::services::user_service::find_by_email(&state, "a@example.com");
    let counts = statistic_service::collect(&state);
    assert_send(&by_id);
    assert_send(&by_email);
    assert_send(&counts);

    assert!(by_id.await.unwrap().is_none());
    assert!(by_email.await.unwrap().is_none());
    assert_eq!(counts.await.unwrap(), statistic_service::Statistics::default());
}

#[tokio::test]
async fn statistics_are_served_from_a_spawned_task() {
    let state = test_state().await;
    seed_user(&state, "alice", ROLE_CLIENT).await;

    let stats = tokio::spawn(async move { statistic_service::collect(&state).await })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(stats.count_clients, 1);
}
