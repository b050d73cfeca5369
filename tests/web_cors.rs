use actix_web::{
    App,
    http::{
        Method,
        header::{
            ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ACCESS_CONTROL_REQUEST_METHOD,
            ORIGIN,
        },
    },
    test, web,
};
use siteshelf::{
    routes::{RoutingState, cors_policy, setup_service_config},
    testing::create_example_site,
};

fn init_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

#[actix_web::test]
async fn cors_preflight_for_https_origin() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let config = create_example_site(dir.path());
    let cors_config = config.clone();
    let state = web::Data::new(RoutingState::from_config(&config).unwrap());

    let app = test::init_service(App::new().wrap(cors_policy(&cors_config)).configure(
        move |f| {
            setup_service_config(f, state);
        },
    ))
    .await;

    let req = test::TestRequest::default()
        .method(Method::OPTIONS)
        .uri("/static/style.css")
        .insert_header((ORIGIN, "https://example.com"))
        .insert_header((ACCESS_CONTROL_REQUEST_METHOD, "GET"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://example.com"
    );
    assert_eq!(resp.headers().get(ACCESS_CONTROL_MAX_AGE).unwrap(), "300");
}

#[actix_web::test]
async fn cors_only_allows_get() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let config = create_example_site(dir.path());
    let cors_config = config.clone();
    let state = web::Data::new(RoutingState::from_config(&config).unwrap());

    let app = test::init_service(App::new().wrap(cors_policy(&cors_config)).configure(
        move |f| {
            setup_service_config(f, state);
        },
    ))
    .await;

    let req = test::TestRequest::default()
        .method(Method::OPTIONS)
        .uri("/")
        .insert_header((ORIGIN, "https://example.com"))
        .insert_header((ACCESS_CONTROL_REQUEST_METHOD, "POST"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());
    assert!(resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[actix_web::test]
async fn cors_ignores_plain_http_origins() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let config = create_example_site(dir.path());
    let cors_config = config.clone();
    let state = web::Data::new(RoutingState::from_config(&config).unwrap());

    let app = test::init_service(App::new().wrap(cors_policy(&cors_config)).configure(
        move |f| {
            setup_service_config(f, state);
        },
    ))
    .await;

    let req = test::TestRequest::get()
        .uri("/static/style.css")
        .insert_header((ORIGIN, "https://example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(
        resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://example.com"
    );

    let req = test::TestRequest::get()
        .uri("/static/style.css")
        .insert_header((ORIGIN, "http://example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
