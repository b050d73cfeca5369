use actix_web::{
    App,
    http::header::{ACCEPT_LANGUAGE, CACHE_CONTROL, CONTENT_LANGUAGE},
    test, web,
};
use siteshelf::{
    content::{SECTION_INTRO, SECTION_SERVICES},
    routes::{RoutingState, setup_service_config},
    testing::{create_example_site, write_file},
};

fn init_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

/* -------------------------------------------------------------------------- */
/*                              Locale Selection                              */
/* -------------------------------------------------------------------------- */

#[actix_web::test]
async fn page_default_locale() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let config = create_example_site(dir.path());
    let state = web::Data::new(RoutingState::from_config(&config).unwrap());

    let app = test::init_service(App::new().configure(move |f| {
        setup_service_config(f, state);
    }))
    .await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(resp.headers().get(CACHE_CONTROL).unwrap(), "no-cache");
    assert_eq!(resp.headers().get(CONTENT_LANGUAGE).unwrap(), "en");
    let body = test::read_body(resp).await;
    let body = std::str::from_utf8(&body).unwrap();
    assert!(body.contains("lang=\"en\""));
}

/// `?lang=fi` without any header renders the Finnish content, fully populated.
#[actix_web::test]
async fn page_explicit_selector() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let config = create_example_site(dir.path());
    let state = web::Data::new(RoutingState::from_config(&config).unwrap());

    let app = test::init_service(App::new().configure(move |f| {
        setup_service_config(f, state);
    }))
    .await;

    let req = test::TestRequest::get().uri("/?lang=fi").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.headers().get(CONTENT_LANGUAGE).unwrap(), "fi");
    let body = test::read_body(resp).await;
    let body = std::str::from_utf8(&body).unwrap();
    assert!(body.contains("Facials (fi)"));
    assert!(body.contains("Brands (fi)"));
    assert!(body.contains("Contact (fi)"));
    assert!(body.contains("globex.png"));
}

/// An unsupported selector gives way to the header.
#[actix_web::test]
async fn page_header_fallback() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let config = create_example_site(dir.path());
    let state = web::Data::new(RoutingState::from_config(&config).unwrap());

    let app = test::init_service(App::new().configure(move |f| {
        setup_service_config(f, state);
    }))
    .await;

    let req = test::TestRequest::get()
        .uri("/?lang=xx")
        .insert_header((ACCEPT_LANGUAGE, "ru-RU,ru;q=0.9"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.headers().get(CONTENT_LANGUAGE).unwrap(), "ru");
}

#[actix_web::test]
async fn page_malformed_input_uses_default() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let config = create_example_site(dir.path());
    let state = web::Data::new(RoutingState::from_config(&config).unwrap());

    let app = test::init_service(App::new().configure(move |f| {
        setup_service_config(f, state);
    }))
    .await;

    let req = test::TestRequest::get()
        .uri("/?lang=%ZZ&&=")
        .insert_header((ACCEPT_LANGUAGE, ";;q=x,,"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.headers().get(CONTENT_LANGUAGE).unwrap(), "en");
}

/* -------------------------------------------------------------------------- */
/*                                Composition                                 */
/* -------------------------------------------------------------------------- */

/// With lazy composition a broken fragment fails only the affected page.
#[actix_web::test]
async fn page_lazy_decode_error_is_500() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let mut config = create_example_site(dir.path());
    config.content.preload = false;
    let state = web::Data::new(RoutingState::from_config(&config).unwrap());

    write_file(
        &config.content.directory.join(SECTION_SERVICES).join("ru.json"),
        "not json",
    );

    let app = test::init_service(App::new().configure(move |f| {
        setup_service_config(f, state);
    }))
    .await;

    let req = test::TestRequest::get().uri("/?lang=ru").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 500);
    let body = test::read_body(resp).await;
    assert!(!std::str::from_utf8(&body).unwrap().contains("Facials"));

    let req = test::TestRequest::get().uri("/?lang=fi").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let req = test::TestRequest::get().uri("/static/style.css").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
}

/// Lazy pages are composed from what is on disk at request time.
#[actix_web::test]
async fn page_lazy_follows_content_edits() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let mut config = create_example_site(dir.path());
    config.content.preload = false;
    let state = web::Data::new(RoutingState::from_config(&config).unwrap());

    let app = test::init_service(App::new().configure(move |f| {
        setup_service_config(f, state);
    }))
    .await;

    write_file(
        &config.content.directory.join(SECTION_INTRO).join("fi.json"),
        r#"{"top": "Uusi", "middle": "Edited (fi)", "bottom": "Iho"}"#,
    );

    let req = test::TestRequest::get().uri("/?lang=fi").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body = test::read_body(resp).await;
    let body = std::str::from_utf8(&body).unwrap();
    assert!(body.contains("Edited (fi)"));
    assert!(body.contains("Facials (fi)"));
}

#[actix_web::test]
async fn page_unknown_route_is_404() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let config = create_example_site(dir.path());
    let state = web::Data::new(RoutingState::from_config(&config).unwrap());

    let app = test::init_service(App::new().configure(move |f| {
        setup_service_config(f, state);
    }))
    .await;

    let req = test::TestRequest::get().uri("/booking").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
    let body = test::read_body(resp).await;
    assert!(std::str::from_utf8(&body).unwrap().contains("404"));
}
