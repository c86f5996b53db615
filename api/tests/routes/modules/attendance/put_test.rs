#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::helpers::{body_json, make_test_app, request, setup};

    #[tokio::test]
    async fn test_mark_manual_overwrites_and_notifies_on_absent() {
        let app = make_test_app().await;
        let ctx = setup(app.state.db()).await;
        let uri = format!(
            "/api/modules/{}/attendance/records/{}",
            ctx.module.id, ctx.student.id
        );
        let token = ctx.token(&ctx.lecturer);

        let req = request(
            "PUT",
            &uri,
            Some(&token),
            Some(json!({ "date": "2025-09-08", "status": "absent" })),
            "10.0.0.5",
        );
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let first = body_json(resp).await;
        assert_eq!(first["data"]["status"], "absent");
        assert!(first["data"].get("origin").is_none());

        let req = request(
            "PUT",
            &uri,
            Some(&token),
            Some(json!({ "date": "2025-09-08", "status": "excused", "remarks": "doctor" })),
            "10.0.0.5",
        );
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let second = body_json(resp).await;
        assert_eq!(second["data"]["id"], first["data"]["id"]);
        assert_eq!(second["data"]["status"], "excused");
        assert_eq!(second["data"]["remarks"], "doctor");

        let sent = app.sink.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, "attendance");
    }

    #[tokio::test]
    async fn test_mark_manual_unenrolled_user() {
        let app = make_test_app().await;
        let ctx = setup(app.state.db()).await;
        let uri = format!(
            "/api/modules/{}/attendance/records/{}",
            ctx.module.id, ctx.outsider.id
        );

        let req = request(
            "PUT",
            &uri,
            Some(&ctx.token(&ctx.lecturer)),
            Some(json!({ "date": "2025-09-08", "status": "present" })),
            "10.0.0.5",
        );
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let json = body_json(resp).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["data"]["kind"], "not_enrolled");
    }

    #[tokio::test]
    async fn test_mark_manual_forbidden_for_student() {
        let app = make_test_app().await;
        let ctx = setup(app.state.db()).await;
        let uri = format!(
            "/api/modules/{}/attendance/records/{}",
            ctx.module.id, ctx.student.id
        );

        let req = request(
            "PUT",
            &uri,
            Some(&ctx.token(&ctx.student)),
            Some(json!({ "date": "2025-09-08", "status": "present" })),
            "10.0.0.5",
        );
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_mark_manual_rejects_unknown_status() {
        let app = make_test_app().await;
        let ctx = setup(app.state.db()).await;
        let uri = format!(
            "/api/modules/{}/attendance/records/{}",
            ctx.module.id, ctx.student.id
        );

        let req = request(
            "PUT",
            &uri,
            Some(&ctx.token(&ctx.lecturer)),
            Some(json!({ "date": "2025-09-08", "status": "asleep" })),
            "10.0.0.5",
        );
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["data"]["kind"], "malformed_input");
    }

    #[tokio::test]
    async fn test_mark_manual_missing_date_is_malformed() {
        let app = make_test_app().await;
        let ctx = setup(app.state.db()).await;
        let uri = format!(
            "/api/modules/{}/attendance/records/{}",
            ctx.module.id, ctx.student.id
        );

        let req = request(
            "PUT",
            &uri,
            Some(&ctx.token(&ctx.lecturer)),
            Some(json!({ "status": "late" })),
            "10.0.0.5",
        );
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["data"]["kind"], "malformed_input");
    }
}
