use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_http::{limit::RequestBodyLimitLayer, services::ServeDir, trace::TraceLayer};
use tower_sessions::cookie::SameSite;
use tower_sessions::{MemoryStore, SessionManagerLayer};
use crate::handlers;
use crate::middleware::{alert_on_oversized_upload, require_admin, require_auth};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_name("session");

    let admin = Router::new()
        .route("/admin", get(handlers::serve_admin_dashboard))
        .route("/admin/accounts", post(handlers::create_account))
        .route_layer(from_fn_with_state(state.clone(), require_admin));

    let max_file_size = state.config.upload.max_file_size;

    Router::new()
        // Auth routes
        .route("/", get(handlers::serve_login_page))
        .route("/login", post(handlers::handle_login))
        .route("/logout", get(handlers::handle_logout))
        .route("/view/:view", get(handlers::select_view))

        // Quote workspace
        .route("/quotes", get(handlers::serve_workspace))
        .route("/quotes/preview", get(handlers::serve_preview))
        .route("/quotes/logo", post(handlers::upload_logo))
        .route("/quotes/vehicle", post(handlers::upload_vehicle))
        .route("/quotes/spreadsheet", post(handlers::upload_spreadsheet))
        .route("/quotes/details", post(handlers::update_details))
        .route("/quotes/seller", post(handlers::select_seller))
        .route("/quotes/reset", post(handlers::reset_workspace))
        .route("/quotes/export", get(handlers::export_pdf))

        .merge(admin)

        .nest_service("/static", ServeDir::new("static"))

        .layer(from_fn(require_auth))
        .layer(session_layer)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_file_size))
        .layer(from_fn(alert_on_oversized_upload))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, Response, StatusCode};
    use image::{DynamicImage, ImageOutputFormat, RgbImage};
    use std::io::Cursor;
    use std::sync::Arc;
    use tower::ServiceExt;
    use crate::config::Config;
    use crate::errors::ExportError;
    use crate::pipeline::{QuoteLayout, Rasterizer};
    use crate::errors::response::{IMAGE_ALERT, IMPORT_ALERT};
    use crate::services::MemoryAccountRepository;

    const BOUNDARY: &str = "quotegen-test-boundary";

    struct BlankRasterizer;

    impl Rasterizer for BlankRasterizer {
        fn rasterize(&self, _layout: &QuoteLayout) -> Result<RgbImage, ExportError> {
            Ok(RgbImage::from_pixel(120, 200, image::Rgb([255, 255, 255])))
        }
    }

    async fn app() -> Router {
        app_with(Config::for_tests()).await
    }

    async fn app_with(config: Config) -> Router {
        let state = AppState::assemble(
            config,
            Arc::new(MemoryAccountRepository::default()),
            Arc::new(BlankRasterizer),
        )
        .await
        .unwrap();
        router(state)
    }

    fn location(response: &Response<Body>) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn get(uri: &str, cookie: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    fn form(uri: &str, cookie: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn upload(uri: &str, cookie: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    fn png() -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, image::Rgb([200, 10, 10])))
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    async fn login(app: &Router, username: &str, password: &str) -> String {
        let response = app
            .clone()
            .oneshot(form("/login", "", &format!("username={}&password={}", username, password)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/quotes");

        response.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn anonymous_requests_go_to_login() {
        let app = app().await;

        let response = app.clone().oneshot(get("/quotes", "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");

        let response = app.oneshot(get("/", "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn wrong_password_returns_to_login_with_error() {
        let app = app().await;
        let response = app
            .oneshot(form("/login", "", "username=admin&password=nope"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).starts_with("/?error="));
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn seller_is_kept_out_of_admin() {
        let app = app().await;
        let cookie = login(&app, "federico", "password").await;

        let response = app.clone().oneshot(get("/admin", &cookie)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app.clone().oneshot(get("/view/admin", &cookie)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app.oneshot(get("/quotes", &cookie)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Federico Lugones"));
        assert!(!html.contains("/view/admin"));
    }

    #[tokio::test]
    async fn admin_creates_accounts() {
        let app = app().await;
        let cookie = login(&app, "admin", "password").await;

        let response = app.clone().oneshot(get("/view/admin", &cookie)).await.unwrap();
        assert_eq!(location(&response), "/admin");

        let response = app
            .clone()
            .oneshot(form(
                "/admin/accounts",
                &cookie,
                "name=Lucia+Paz&username=lucia&password=secreta&role=seller&title=Asesora",
            ))
            .await
            .unwrap();
        assert_eq!(location(&response), "/admin");

        let response = app
            .clone()
            .oneshot(form("/admin/accounts", &cookie, "name=Sin+Clave&username=x&password="))
            .await
            .unwrap();
        assert!(location(&response).starts_with("/admin?error="));

        let html = body_text(app.clone().oneshot(get("/admin", &cookie)).await.unwrap()).await;
        assert!(html.contains("Lucia Paz"));

        // The new account can log in straight away
        login(&app, "lucia", "secreta").await;
    }

    #[tokio::test]
    async fn export_waits_for_required_inputs() {
        let app = app().await;
        let cookie = login(&app, "federico", "password").await;

        let response = app.clone().oneshot(get("/quotes/export", &cookie)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let html = body_text(app.oneshot(get("/quotes", &cookie)).await.unwrap()).await;
        assert!(html.contains(r#"type="submit" disabled"#));
    }

    #[tokio::test]
    async fn edited_details_show_in_preview() {
        let app = app().await;
        let cookie = login(&app, "federico", "password").await;

        app.clone()
            .oneshot(form("/quotes/details", &cookie, "plan_name=Plan+70%2F30&installment_1=150000"))
            .await
            .unwrap();

        let html = body_text(app.clone().oneshot(get("/quotes/preview", &cookie)).await.unwrap()).await;
        assert!(html.contains("Plan 70/30"));
        assert!(html.contains("$\u{a0}150.000"));

        app.clone().oneshot(form("/quotes/reset", &cookie, "")).await.unwrap();
        let html = body_text(app.oneshot(get("/quotes/preview", &cookie)).await.unwrap()).await;
        assert!(!html.contains("Plan 70/30"));
    }

    #[tokio::test]
    async fn complete_quote_downloads_as_pdf() {
        let app = app().await;
        let cookie = login(&app, "federico", "password").await;

        for uri in ["/quotes/logo", "/quotes/vehicle"] {
            let response = app.clone().oneshot(upload(uri, &cookie, "foto.png", &png())).await.unwrap();
            assert_eq!(location(&response), "/quotes");
        }
        app.clone()
            .oneshot(form("/quotes/details", &cookie, "brand=Toyota&model=Corolla+SE&plan_name=Plan"))
            .await
            .unwrap();

        let response = app.oneshot(get("/quotes/export", &cookie)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert!(response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("presupuesto-Toyota-Corolla_SE.pdf"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn unreadable_upload_raises_alert() {
        let app = app().await;
        let cookie = login(&app, "federico", "password").await;

        let response = app
            .clone()
            .oneshot(upload("/quotes/spreadsheet", &cookie, "planilla.xlsx", b"not a workbook"))
            .await
            .unwrap();
        assert!(location(&response).starts_with("/quotes?alert="));

        let response = app
            .oneshot(upload("/quotes/logo", &cookie, "logo.png", b"not an image"))
            .await
            .unwrap();
        assert!(location(&response).starts_with("/quotes?alert="));
    }

    #[tokio::test]
    async fn sellers_cannot_present_as_others() {
        let app = app().await;
        let cookie = login(&app, "federico", "password").await;

        let response = app.oneshot(form("/quotes/seller", &cookie, "seller_id=1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn oversized_uploads_raise_the_upload_alert() {
        let mut config = Config::for_tests();
        config.upload.max_file_size = 1024;
        let app = app_with(config).await;
        let cookie = login(&app, "federico", "password").await;

        let big = vec![0u8; 4096];
        for (uri, alert) in [
            ("/quotes/logo", IMAGE_ALERT),
            ("/quotes/vehicle", IMAGE_ALERT),
            ("/quotes/spreadsheet", IMPORT_ALERT),
        ] {
            // Declared length: refused before the handler runs
            let mut request = upload(uri, &cookie, "grande.bin", &big);
            request.headers_mut().insert(header::CONTENT_LENGTH, big.len().to_string().parse().unwrap());
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
            assert_eq!(location(&response), format!("/quotes?alert={}", urlencoding::encode(alert)));

            // Undeclared length: the body stream is cut off while being read
            let response = app.clone().oneshot(upload(uri, &cookie, "grande.bin", &big)).await.unwrap();
            assert_eq!(location(&response), format!("/quotes?alert={}", urlencoding::encode(alert)));
        }
    }

    #[tokio::test]
    async fn abandoned_logins_do_not_pile_up_workspaces() {
        let state = AppState::assemble(
            Config::for_tests(),
            Arc::new(MemoryAccountRepository::default()),
            Arc::new(BlankRasterizer),
        )
        .await
        .unwrap();
        let workspaces = state.workspaces.clone();
        let app = router(state);

        for _ in 0..10 {
            login(&app, "federico", "password").await;
        }
        assert_eq!(workspaces.len().await, 10);

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(workspaces.evict_idle(std::time::Duration::from_millis(10)).await, 10);

        // A session whose workspace was evicted gets a fresh, empty one
        let cookie = login(&app, "federico", "password").await;
        workspaces.evict_idle(std::time::Duration::ZERO).await;
        let response = app.oneshot(get("/quotes", &cookie)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(workspaces.len().await, 1);
    }

    #[tokio::test]
    async fn failed_import_names_the_rejected_file() {
        let app = app().await;
        let cookie = login(&app, "federico", "password").await;

        app.clone()
            .oneshot(upload("/quotes/spreadsheet", &cookie, "roto.xlsx", b"not a workbook"))
            .await
            .unwrap();

        let html = body_text(app.oneshot(get("/quotes", &cookie)).await.unwrap()).await;
        assert!(html.contains("Archivo cargado: roto.xlsx"));
    }
}
