#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use axum::http::StatusCode;
    use db::models::attendance_record::Model as RecordModel;
    use db::models::attendance_session::{Entity as SessionEntity, OriginPolicy};
    use sea_orm::EntityTrait;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::helpers::{body_json, make_test_app, request, setup};

    fn sessions_uri(module_id: i64) -> String {
        format!("/api/modules/{module_id}/attendance/sessions")
    }

    // ---------------------------
    // create_session
    // ---------------------------

    #[tokio::test]
    async fn test_create_session_as_lecturer_binds_caller_ip() {
        let app = make_test_app().await;
        let ctx = setup(app.state.db()).await;
        let token = ctx.token(&ctx.lecturer);

        let req = request(
            "POST",
            &sessions_uri(ctx.module.id),
            Some(&token),
            Some(json!({ "title": "Lecture 1" })),
            "198.51.100.9",
        );
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let json = body_json(resp).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Attendance session created");
        assert_eq!(json["data"]["title"], "Lecture 1");
        assert_eq!(json["data"]["origin_policy"], "exact");
        assert_eq!(json["data"]["code"].as_str().unwrap().len(), 6);
        assert!(json["data"]["expires_at"].is_string());
        assert!(json["data"].get("authorized_origin").is_none());

        let id = json["data"]["id"].as_i64().unwrap();
        let sess = SessionEntity::find_by_id(id)
            .one(app.state.db())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sess.module_id, ctx.module.id);
        assert_eq!(sess.created_by, ctx.lecturer.id);
        assert_eq!(sess.authorized_origin.as_deref(), Some("198.51.100.9"));
    }

    #[tokio::test]
    async fn test_create_subnet_session_as_assistant() {
        let app = make_test_app().await;
        let ctx = setup(app.state.db()).await;
        let token = ctx.token(&ctx.assistant);

        let req = request(
            "POST",
            &sessions_uri(ctx.module.id),
            Some(&token),
            Some(json!({ "origin_policy": "subnet", "window_minutes": 5 })),
            "10.0.0.5",
        );
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let id = body_json(resp).await["data"]["id"].as_i64().unwrap();
        let sess = SessionEntity::find_by_id(id)
            .one(app.state.db())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sess.origin_policy, OriginPolicy::Subnet);
        assert_eq!(sess.authorized_network.as_deref(), Some("10.0.0.0/24"));
        assert_eq!((sess.expires_at - sess.created_at).num_minutes(), 5);
    }

    #[tokio::test]
    async fn test_create_session_forbidden_for_student_and_tutor() {
        let app = make_test_app().await;
        let ctx = setup(app.state.db()).await;

        for user in [&ctx.student, &ctx.tutor, &ctx.outsider] {
            let req = request(
                "POST",
                &sessions_uri(ctx.module.id),
                Some(&ctx.token(user)),
                Some(json!({})),
                "10.0.0.5",
            );
            let resp = app.router.clone().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        }
    }

    #[tokio::test]
    async fn test_create_session_requires_token() {
        let app = make_test_app().await;
        let ctx = setup(app.state.db()).await;

        let req = request("POST", &sessions_uri(ctx.module.id), None, Some(json!({})), "10.0.0.5");
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_session_as_admin_without_module_role() {
        let app = make_test_app().await;
        let ctx = setup(app.state.db()).await;

        let req = request(
            "POST",
            &sessions_uri(ctx.module.id),
            Some(&ctx.token(&ctx.admin)),
            Some(json!({ "origin_policy": "none" })),
            "10.0.0.5",
        );
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_create_session_rejects_long_title() {
        let app = make_test_app().await;
        let ctx = setup(app.state.db()).await;

        let req = request(
            "POST",
            &sessions_uri(ctx.module.id),
            Some(&ctx.token(&ctx.lecturer)),
            Some(json!({ "title": "x".repeat(300) })),
            "10.0.0.5",
        );
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["data"]["kind"], "malformed_input");
    }

    // ---------------------------
    // close_session
    // ---------------------------

    async fn open_session(app: &crate::helpers::app::TestApp, token: &str, module_id: i64) -> i64 {
        let req = request(
            "POST",
            &sessions_uri(module_id),
            Some(token),
            Some(json!({})),
            "10.0.0.5",
        );
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        body_json(resp).await["data"]["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_close_session_owner_only_and_idempotent() {
        let app = make_test_app().await;
        let ctx = setup(app.state.db()).await;
        let owner = ctx.token(&ctx.lecturer);
        let id = open_session(&app, &owner, ctx.module.id).await;
        let uri = format!("{}/{id}/close", sessions_uri(ctx.module.id));

        // another instructor of the same module cannot see it
        let req = request("POST", &uri, Some(&ctx.token(&ctx.assistant)), None, "10.0.0.5");
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        for _ in 0..2 {
            let req = request("POST", &uri, Some(&owner), None, "10.0.0.5");
            let resp = app.router.clone().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            let json = body_json(resp).await;
            assert_eq!(json["data"]["active"], false);
        }

        let req = request("POST", &uri, Some(&ctx.token(&ctx.admin)), None, "10.0.0.5");
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_close_unknown_session_is_not_found() {
        let app = make_test_app().await;
        let ctx = setup(app.state.db()).await;

        let uri = format!("{}/9999/close", sessions_uri(ctx.module.id));
        let req = request("POST", &uri, Some(&ctx.token(&ctx.lecturer)), None, "10.0.0.5");
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["data"]["kind"], "not_found");
    }

    // ---------------------------
    // mark_bulk
    // ---------------------------

    #[tokio::test]
    async fn test_bulk_marks_enrolled_and_reports_others() {
        let app = make_test_app().await;
        let ctx = setup(app.state.db()).await;
        let uri = format!("/api/modules/{}/attendance/records/bulk", ctx.module.id);

        let req = request(
            "POST",
            &uri,
            Some(&ctx.token(&ctx.lecturer)),
            Some(json!({
                "date": "2025-09-08",
                "entries": [
                    { "user_id": ctx.student.id, "status": "present" },
                    { "user_id": ctx.student2.id, "status": "late", "remarks": "train delay" },
                    { "user_id": ctx.outsider.id, "status": "absent" }
                ]
            })),
            "10.0.0.5",
        );
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        assert_eq!(json["data"]["marked_count"], 2);
        let errors = json["data"]["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0]["user_id"], ctx.outsider.id);
        assert_eq!(errors[0]["kind"], "not_enrolled");

        let date = chrono::NaiveDate::from_ymd_opt(2025, 9, 8).unwrap();
        let late = RecordModel::find_for_day(app.state.db(), ctx.student2.id, ctx.module.id, date)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(late.remarks.as_deref(), Some("train delay"));
        assert_eq!(late.marked_by, ctx.lecturer.id);

        let sent = app.sink.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].user_id, ctx.student2.id);
    }

    #[tokio::test]
    async fn test_bulk_rejects_empty_entries() {
        let app = make_test_app().await;
        let ctx = setup(app.state.db()).await;
        let uri = format!("/api/modules/{}/attendance/records/bulk", ctx.module.id);

        let req = request(
            "POST",
            &uri,
            Some(&ctx.token(&ctx.lecturer)),
            Some(json!({ "date": "2025-09-08", "entries": [] })),
            "10.0.0.5",
        );
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_bulk_invalid_date_is_malformed() {
        let app = make_test_app().await;
        let ctx = setup(app.state.db()).await;
        let uri = format!("/api/modules/{}/attendance/records/bulk", ctx.module.id);

        let req = request(
            "POST",
            &uri,
            Some(&ctx.token(&ctx.lecturer)),
            Some(json!({
                "date": "2025-13-40",
                "entries": [{ "user_id": ctx.student.id, "status": "present" }]
            })),
            "10.0.0.5",
        );
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["data"]["kind"], "malformed_input");
        let day = chrono::NaiveDate::from_ymd_opt(2025, 9, 8).unwrap();
        let roster = RecordModel::list_for_module_day(app.state.db(), ctx.module.id, day)
            .await
            .unwrap();
        assert!(roster.is_empty());
    }
}
