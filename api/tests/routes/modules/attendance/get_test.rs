#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::helpers::app::TestApp;
    use crate::helpers::{TestCtx, body_json, make_test_app, request, setup};

    async fn open(app: &TestApp, ctx: &TestCtx, ip: &str) -> Value {
        let req = request(
            "POST",
            &format!("/api/modules/{}/attendance/sessions", ctx.module.id),
            Some(&ctx.token(&ctx.lecturer)),
            Some(json!({ "title": "Seeded" })),
            ip,
        );
        let resp = app.router.clone().oneshot(req).await.unwrap();
        body_json(resp).await["data"].clone()
    }

    async fn check_in(app: &TestApp, ctx: &TestCtx, code: &str, ip: &str) -> StatusCode {
        let req = request(
            "POST",
            "/api/attendance/check-in",
            Some(&ctx.token(&ctx.student)),
            Some(json!({ "code": code })),
            ip,
        );
        app.router.clone().oneshot(req).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_list_sessions_reports_state_and_counts() {
        let app = make_test_app().await;
        let ctx = setup(app.state.db()).await;
        let session = open(&app, &ctx, "10.0.0.5").await;
        let code = session["code"].as_str().unwrap();
        assert_eq!(check_in(&app, &ctx, code, "10.0.0.5").await, StatusCode::OK);

        let req = request(
            "GET",
            &format!("/api/modules/{}/attendance/sessions", ctx.module.id),
            Some(&ctx.token(&ctx.assistant)),
            None,
            "10.0.0.5",
        );
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        let list = json["data"].as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["state"], "open");
        assert_eq!(list[0]["attended_count"], 1);
        assert!(!json.to_string().contains("10.0.0.5"));
    }

    #[tokio::test]
    async fn test_get_session_scoped_to_module() {
        let app = make_test_app().await;
        let ctx = setup(app.state.db()).await;
        let session = open(&app, &ctx, "10.0.0.5").await;
        let id = session["id"].as_i64().unwrap();

        let req = request(
            "GET",
            &format!("/api/modules/{}/attendance/sessions/{id}", ctx.module.id),
            Some(&ctx.token(&ctx.lecturer)),
            None,
            "10.0.0.5",
        );
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["data"]["id"], id);

        // an admin asking through a different module id gets nothing
        let req = request(
            "GET",
            &format!("/api/modules/{}/attendance/sessions/{id}", ctx.module.id + 100),
            Some(&ctx.token(&ctx.admin)),
            None,
            "10.0.0.5",
        );
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_records_for_today_hides_origins() {
        let app = make_test_app().await;
        let ctx = setup(app.state.db()).await;
        let session = open(&app, &ctx, "10.0.0.5").await;
        check_in(&app, &ctx, session["code"].as_str().unwrap(), "10.0.0.5").await;

        let req = request(
            "GET",
            &format!("/api/modules/{}/attendance/records", ctx.module.id),
            Some(&ctx.token(&ctx.lecturer)),
            None,
            "10.0.0.5",
        );
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        let roster = json["data"].as_array().unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0]["user_id"], ctx.student.id);
        assert_eq!(roster[0]["status"], "present");
        assert_eq!(roster[0]["via_session"], true);
        assert!(!json.to_string().contains("10.0.0.5"));

        let req = request(
            "GET",
            &format!(
                "/api/modules/{}/attendance/records?date=2001-01-01",
                ctx.module.id
            ),
            Some(&ctx.token(&ctx.lecturer)),
            None,
            "10.0.0.5",
        );
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert!(body_json(resp).await["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reads_forbidden_for_students() {
        let app = make_test_app().await;
        let ctx = setup(app.state.db()).await;

        let req = request(
            "GET",
            &format!("/api/modules/{}/attendance/sessions", ctx.module.id),
            Some(&ctx.token(&ctx.student)),
            None,
            "10.0.0.5",
        );
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
