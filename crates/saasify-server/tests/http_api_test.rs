mod common;

use axum::http::StatusCode;
use common::{WEBHOOK_SECRET, request, spawn_app};
use saasify_auth::webhook::sign_webhook;
use saasify_core::models::membership::TenantRole;
use saasify_core::repository::UserRepository;
use saasify_db::repository::SurrealUserRepository;
use serde_json::json;
use uuid::Uuid;

fn projects_uri(tenant_id: impl std::fmt::Display) -> String {
    format!("/api/tenant/{tenant_id}/projects")
}

#[tokio::test]
async fn health_is_public() {
    let app = spawn_app().await;
    let (status, body) = app.send(request("GET", "/api/health", None, None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn anonymous_callers_get_401_before_validation() {
    let app = spawn_app().await;

    let (status, body) = app.send(request("GET", "/api/me", None, None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({ "ok": false, "error": { "code": "UNAUTHENTICATED", "message": "Sign in required" } })
    );

    // Malformed tenant id and body still lose to the missing session.
    let (status, _) = app
        .send(request(
            "POST",
            &projects_uri("not-a-tenant"),
            None,
            Some(Uuid::new_v4()),
            Some(json!({ "title": "" })),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tenant_admin_creates_project_until_tenant_is_suspended() {
    let app = spawn_app().await;
    let _p1 = app.platform_admin("p1").await;
    let t1 = app.create_tenant("p1", "t1").await;
    let u1 = app.sign_in("u1").await;
    app.add_member(t1, u1, TenantRole::TenantAdmin).await;

    // Selecting only sets the cookie.
    let (status, body) = app
        .send(request(
            "PUT",
            "/api/me/tenant",
            Some("u1"),
            None,
            Some(json!({ "tenantId": t1.to_string() })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["tenantId"], t1.to_string());

    let (status, body) = app
        .send(request(
            "POST",
            &projects_uri(t1),
            Some("u1"),
            Some(t1),
            Some(json!({ "title": "Alpha", "description": "" })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["ok"], true);
    assert_eq!(body["data"]["status"], "active");
    assert_eq!(body["data"]["tenantId"], t1.to_string());
    assert_eq!(body["data"]["title"], "Alpha");

    // A tenant admin is not a platform admin.
    let (status, body) = app
        .send(request(
            "PATCH",
            &format!("/api/platform/tenants/{t1}"),
            Some("u1"),
            Some(t1),
            Some(json!({ "status": "suspended" })),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body,
        json!({ "ok": false, "error": { "code": "FORBIDDEN", "message": "Access denied" } })
    );

    let (status, body) = app
        .send(request(
            "PATCH",
            &format!("/api/platform/tenants/{t1}"),
            Some("p1"),
            None,
            Some(json!({ "status": "suspended" })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "suspended");

    let (status, body) = app
        .send(request("GET", &projects_uri(t1), Some("u1"), Some(t1), None))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn selection_cookie_attributes() {
    let app = spawn_app().await;
    app.sign_in("u1").await;
    let tenant = Uuid::new_v4();

    let response = tower::ServiceExt::oneshot(
        app.router.clone(),
        request(
            "PUT",
            "/api/me/tenant",
            Some("u1"),
            None,
            Some(json!({ "tenantId": tenant.to_string() })),
        ),
    )
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.starts_with(&format!("saasify_tenant={tenant};")));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=2592000"));

    let (status, body) = app
        .send(request(
            "PUT",
            "/api/me/tenant",
            Some("u1"),
            None,
            Some(json!({ "tenantId": "nope" })),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["fieldErrors"]["tenantId"].is_array());
}

#[tokio::test]
async fn path_tenant_must_match_selection() {
    let app = spawn_app().await;
    app.platform_admin("p1").await;
    let a = app.create_tenant("p1", "tenant-a").await;
    let b = app.create_tenant("p1", "tenant-b").await;
    let u1 = app.sign_in("u1").await;
    app.add_member(a, u1, TenantRole::TenantAdmin).await;
    app.add_member(b, u1, TenantRole::TenantAdmin).await;

    // Admin of both, but A is selected.
    let (status, body) = app
        .send(request(
            "POST",
            &projects_uri(b),
            Some("u1"),
            Some(a),
            Some(json!({ "title": "Sneaky" })),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "Access denied");

    let (status, body) = app
        .send(request("GET", &projects_uri("xyz"), Some("u1"), Some(a), None))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (_, body) = app
        .send(request("GET", &projects_uri(b), Some("u1"), Some(b), None))
        .await;
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn invalid_project_input_reports_fields() {
    let app = spawn_app().await;
    app.platform_admin("p1").await;
    let t1 = app.create_tenant("p1", "t1").await;

    let (status, body) = app
        .send(request(
            "POST",
            &projects_uri(t1),
            Some("p1"),
            Some(t1),
            Some(json!({ "title": "   ", "description": "x".repeat(2001) })),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["fieldErrors"]["title"].is_array());
    assert!(body["error"]["fieldErrors"]["description"].is_array());

    let (status, _) = app
        .send(request(
            "POST",
            &projects_uri(t1),
            Some("p1"),
            Some(t1),
            Some(json!("not an object")),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app
        .send(request("GET", &projects_uri(t1), Some("p1"), Some(t1), None))
        .await;
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn tenant_users_read_but_do_not_write() {
    let app = spawn_app().await;
    app.platform_admin("p1").await;
    let t1 = app.create_tenant("p1", "t1").await;
    let member = app.sign_in("member").await;
    app.add_member(t1, member, TenantRole::TenantUser).await;

    app.send(request(
        "POST",
        &projects_uri(t1),
        Some("p1"),
        Some(t1),
        Some(json!({ "title": "Alpha" })),
    ))
    .await;

    let (status, body) = app
        .send(request("GET", &projects_uri(t1), Some("member"), Some(t1), None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);

    let (status, _) = app
        .send(request(
            "POST",
            &projects_uri(t1),
            Some("member"),
            Some(t1),
            Some(json!({ "title": "Beta" })),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Not a member at all.
    app.sign_in("stranger").await;
    let (status, _) = app
        .send(request("GET", &projects_uri(t1), Some("stranger"), Some(t1), None))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn delete_hides_project_until_restored() {
    let app = spawn_app().await;
    app.platform_admin("p1").await;
    let t1 = app.create_tenant("p1", "t1").await;

    let (_, body) = app
        .send(request(
            "POST",
            &projects_uri(t1),
            Some("p1"),
            Some(t1),
            Some(json!({ "title": "Alpha", "description": "keep" })),
        ))
        .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let project_uri = format!("{}/{id}", projects_uri(t1));

    let (status, _) = app
        .send(request("DELETE", &project_uri, Some("p1"), Some(t1), None))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(request("GET", &project_uri, Some("p1"), Some(t1), None))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, body) = app
        .send(request(
            "POST",
            &format!("{project_uri}/restore"),
            Some("p1"),
            Some(t1),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["description"], "keep");

    let (status, _) = app
        .send(request("GET", &project_uri, Some("p1"), Some(t1), None))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(request(
            "PATCH",
            &project_uri,
            Some("p1"),
            Some(t1),
            Some(json!({ "status": "archived" })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "archived");
    assert_eq!(body["data"]["title"], "Alpha");

    let (_, body) = app
        .send(request(
            "GET",
            &format!("/api/tenant/{t1}/audit-logs"),
            Some("p1"),
            Some(t1),
            None,
        ))
        .await;
    let actions: Vec<&str> = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    for action in ["project.created", "project.deleted", "project.restored", "project.updated"] {
        assert!(actions.contains(&action), "missing {action} in {actions:?}");
    }
}

#[tokio::test]
async fn invite_accept_grants_membership() {
    let app = spawn_app().await;
    app.platform_admin("p1").await;
    let t1 = app.create_tenant("p1", "t1").await;

    let (status, body) = app
        .send(request(
            "POST",
            &format!("/api/tenant/{t1}/invites"),
            Some("p1"),
            Some(t1),
            Some(json!({ "email": "Bob@Example.com", "role": "tenant_admin" })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let token = body["data"]["rawToken"].as_str().unwrap().to_string();
    assert!(body["data"]["invite"].get("tokenHash").is_none());
    assert_eq!(body["data"]["invite"]["email"], "bob@example.com");

    // Someone else cannot use it.
    app.sign_in("eve").await;
    let (status, _) = app
        .send(request(
            "POST",
            "/api/invites/accept",
            Some("eve"),
            None,
            Some(json!({ "token": token })),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.sign_in("bob").await;
    let (status, body) = app
        .send(request(
            "POST",
            "/api/invites/accept",
            Some("bob"),
            None,
            Some(json!({ "token": token })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["role"], "tenant_admin");
    assert_eq!(body["data"]["status"], "active");

    // Single use.
    let (status, _) = app
        .send(request(
            "POST",
            "/api/invites/accept",
            Some("bob"),
            None,
            Some(json!({ "token": token })),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send(request("GET", "/api/me/tenants", Some("bob"), None, None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["tenantId"], t1.to_string());
    assert_eq!(body["data"][0]["tenantSlug"], "t1");

    let (status, _) = app
        .send(request(
            "POST",
            &projects_uri(t1),
            Some("bob"),
            Some(t1),
            Some(json!({ "title": "Bob's" })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn revoked_invite_cannot_be_accepted() {
    let app = spawn_app().await;
    app.platform_admin("p1").await;
    let t1 = app.create_tenant("p1", "t1").await;

    let (_, body) = app
        .send(request(
            "POST",
            &format!("/api/tenant/{t1}/invites"),
            Some("p1"),
            Some(t1),
            Some(json!({ "email": "bob@example.com" })),
        ))
        .await;
    let token = body["data"]["rawToken"].as_str().unwrap().to_string();
    let invite_id = body["data"]["invite"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["invite"]["role"], "tenant_user");

    let (status, body) = app
        .send(request(
            "DELETE",
            &format!("/api/tenant/{t1}/invites/{invite_id}"),
            Some("p1"),
            Some(t1),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "revoked");

    app.sign_in("bob").await;
    let (status, _) = app
        .send(request(
            "POST",
            "/api/invites/accept",
            Some("bob"),
            None,
            Some(json!({ "token": token })),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app
        .send(request(
            "GET",
            &format!("/api/tenant/{t1}/invites?status=revoked"),
            Some("p1"),
            Some(t1),
            None,
        ))
        .await;
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn accepting_an_invite_never_demotes_an_active_member() {
    let app = spawn_app().await;
    app.platform_admin("p1").await;
    let t1 = app.create_tenant("p1", "t1").await;

    let (status, body) = app
        .send(request(
            "POST",
            &format!("/api/tenant/{t1}/invites"),
            Some("p1"),
            Some(t1),
            Some(json!({ "email": "p1@example.com", "role": "tenant_user" })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let token = body["data"]["rawToken"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(request(
            "POST",
            "/api/invites/accept",
            Some("p1"),
            None,
            Some(json!({ "token": token })),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["error"]["code"], "CONFLICT");

    // Still an admin, and the invite is still pending.
    let (status, body) = app
        .send(request(
            "POST",
            &projects_uri(t1),
            Some("p1"),
            Some(t1),
            Some(json!({ "title": "Still admin" })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let (_, body) = app
        .send(request(
            "GET",
            &format!("/api/tenant/{t1}/invites?status=pending"),
            Some("p1"),
            Some(t1),
            None,
        ))
        .await;
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn admins_grant_project_access_to_members() {
    let app = spawn_app().await;
    app.platform_admin("p1").await;
    let t1 = app.create_tenant("p1", "t1").await;
    let u2 = app.sign_in("u2").await;
    app.add_member(t1, u2, TenantRole::TenantUser).await;
    let outsider = app.sign_in("outsider").await;

    let (_, body) = app
        .send(request(
            "POST",
            &projects_uri(t1),
            Some("p1"),
            Some(t1),
            Some(json!({ "title": "Launch" })),
        ))
        .await;
    let project = body["data"]["id"].as_str().unwrap().to_string();
    let grants_uri = format!("/api/tenant/{t1}/projects/{project}/members");

    let (status, body) = app
        .send(request(
            "POST",
            &grants_uri,
            Some("p1"),
            Some(t1),
            Some(json!({ "userId": u2, "role": "viewer" })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["role"], "viewer");

    // Re-granting overwrites the role.
    let (status, body) = app
        .send(request(
            "POST",
            &grants_uri,
            Some("p1"),
            Some(t1),
            Some(json!({ "userId": u2, "role": "editor" })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["role"], "editor");

    let (status, body) = app
        .send(request(
            "POST",
            &grants_uri,
            Some("p1"),
            Some(t1),
            Some(json!({ "userId": outsider, "role": "viewer" })),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["fieldErrors"]["userId"].is_array());

    // Tenant users cannot see or change grants.
    let (status, _) = app
        .send(request("GET", &grants_uri, Some("u2"), Some(t1), None))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = app
        .send(request("GET", &grants_uri, Some("p1"), Some(t1), None))
        .await;
    let grants = body["data"].as_array().unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0]["userId"], u2.to_string());

    let (status, _) = app
        .send(request(
            "DELETE",
            &grants_uri,
            Some("p1"),
            Some(t1),
            Some(json!({ "userId": u2 })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .send(request(
            "DELETE",
            &grants_uri,
            Some("p1"),
            Some(t1),
            Some(json!({ "userId": u2 })),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app
        .send(request("GET", &grants_uri, Some("p1"), Some(t1), None))
        .await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _) = app
        .send(request(
            "GET",
            &format!("/api/tenant/{t1}/projects/{}/members", Uuid::new_v4()),
            Some("p1"),
            Some(t1),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn saved_views_are_private_to_their_owner() {
    let app = spawn_app().await;
    app.platform_admin("p1").await;
    let t1 = app.create_tenant("p1", "t1").await;
    let u2 = app.sign_in("u2").await;
    app.add_member(t1, u2, TenantRole::TenantUser).await;
    let views_uri = format!("/api/tenant/{t1}/saved-views");

    let (status, body) = app
        .send(request(
            "POST",
            &views_uri,
            Some("u2"),
            Some(t1),
            Some(json!({ "name": "x", "filters": {} })),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["fieldErrors"]["name"].is_array());

    let (status, body) = app
        .send(request(
            "POST",
            &views_uri,
            Some("u2"),
            Some(t1),
            Some(json!({
                "name": "Archived",
                "filters": { "status": "archived", "search": "  launch " },
            })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["filters"]["search"], "launch");
    assert_eq!(body["data"]["isPinned"], false);
    let archived = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = app
        .send(request(
            "POST",
            &views_uri,
            Some("u2"),
            Some(t1),
            Some(json!({ "name": "Everything", "filters": {} })),
        ))
        .await;
    let everything = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(request(
            "PATCH",
            &views_uri,
            Some("u2"),
            Some(t1),
            Some(json!({ "viewId": archived, "isPinned": true })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["isPinned"], true);

    let (_, body) = app
        .send(request("GET", &views_uri, Some("u2"), Some(t1), None))
        .await;
    let ids: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec![archived.clone(), everything.clone()]);

    // Another member of the same tenant sees nothing and touches nothing.
    let (_, body) = app
        .send(request("GET", &views_uri, Some("p1"), Some(t1), None))
        .await;
    assert!(body["data"].as_array().unwrap().is_empty());
    let (status, _) = app
        .send(request(
            "DELETE",
            &views_uri,
            Some("p1"),
            Some(t1),
            Some(json!({ "viewId": archived })),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send(request(
            "DELETE",
            &views_uri,
            Some("u2"),
            Some(t1),
            Some(json!({ "viewId": archived })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let (_, body) = app
        .send(request("GET", &views_uri, Some("u2"), Some(t1), None))
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn admins_manage_members_but_not_themselves() {
    let app = spawn_app().await;
    let p1 = app.platform_admin("p1").await;
    let t1 = app.create_tenant("p1", "t1").await;
    let u2 = app.sign_in("u2").await;
    app.add_member(t1, u2, TenantRole::TenantUser).await;
    let members_uri = format!("/api/tenant/{t1}/members");

    let (_, body) = app
        .send(request("GET", &members_uri, Some("u2"), Some(t1), None))
        .await;
    let members = body["data"].as_array().unwrap();
    assert_eq!(members.len(), 2);
    assert!(members.iter().any(|m| m["email"] == "u2@example.com"));

    let (status, body) = app
        .send(request(
            "PATCH",
            &format!("{members_uri}/{p1}"),
            Some("p1"),
            Some(t1),
            Some(json!({ "role": "tenant_user" })),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["fieldErrors"]["userId"].is_array());

    let (status, body) = app
        .send(request(
            "PATCH",
            &format!("{members_uri}/{u2}"),
            Some("p1"),
            Some(t1),
            Some(json!({ "role": "tenant_admin" })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["role"], "tenant_admin");

    let (status, _) = app
        .send(request("DELETE", &format!("{members_uri}/{u2}"), Some("p1"), Some(t1), None))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(request("GET", &members_uri, Some("u2"), Some(t1), None))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = app
        .send(request("GET", &members_uri, Some("p1"), Some(t1), None))
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Removed members cannot be changed further.
    let (status, _) = app
        .send(request(
            "PATCH",
            &format!("{members_uri}/{u2}"),
            Some("p1"),
            Some(t1),
            Some(json!({ "role": "tenant_user" })),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn platform_listing_and_dashboards() {
    let app = spawn_app().await;
    app.platform_admin("p1").await;
    let acme = app.create_tenant("p1", "acme").await;
    let globex = app.create_tenant("p1", "globex").await;
    app.create_tenant("p1", "acme-labs").await;

    let (status, body) = app
        .send(request(
            "POST",
            "/api/platform/tenants",
            Some("p1"),
            None,
            Some(json!({ "name": "Dup", "slug": "ACME" })),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    app.send(request(
        "PATCH",
        &format!("/api/platform/tenants/{globex}"),
        Some("p1"),
        None,
        Some(json!({ "status": "suspended" })),
    ))
    .await;

    let (status, body) = app
        .send(request("GET", "/api/platform/tenants?search=ACME", Some("p1"), None, None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["active"], 2);
    assert_eq!(body["data"]["suspended"], 0);

    let (_, body) = app
        .send(request("GET", "/api/platform/tenants?limit=1", Some("p1"), None, None))
        .await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["suspended"], 1);

    app.send(request(
        "POST",
        &projects_uri(acme),
        Some("p1"),
        Some(acme),
        Some(json!({ "title": "Alpha" })),
    ))
    .await;

    let (_, body) = app
        .send(request("GET", "/api/platform/stats", Some("p1"), None, None))
        .await;
    assert_eq!(body["data"]["totalTenants"], 3);
    assert_eq!(body["data"]["activeTenants"], 2);
    assert_eq!(body["data"]["totalProjects"], 1);
    assert_eq!(body["data"]["chartData"][1]["name"], "Active Tenants");

    let (_, body) = app
        .send(request(
            "GET",
            &format!("/api/tenant/{acme}/stats"),
            Some("p1"),
            Some(acme),
            None,
        ))
        .await;
    assert_eq!(body["data"]["activeProjects"], 1);
    assert_eq!(body["data"]["archivedProjects"], 0);
    assert_eq!(body["data"]["membersCount"], 1);

    app.sign_in("u1").await;
    let (status, _) = app
        .send(request("GET", "/api/platform/stats", Some("u1"), None, None))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

fn webhook_request(body: &serde_json::Value, signature: Option<String>) -> axum::http::Request<axum::body::Body> {
    let payload = body.to_string();
    let timestamp = chrono::Utc::now().timestamp().to_string();
    let signature = signature.unwrap_or_else(|| {
        sign_webhook(WEBHOOK_SECRET, "msg_1", &timestamp, payload.as_bytes()).unwrap()
    });
    axum::http::Request::builder()
        .method("POST")
        .uri("/api/webhooks/identity")
        .header("content-type", "application/json")
        .header("svix-id", "msg_1")
        .header("svix-timestamp", timestamp)
        .header("svix-signature", signature)
        .body(axum::body::Body::from(payload))
        .unwrap()
}

#[tokio::test]
async fn identity_webhook_syncs_users() {
    let app = spawn_app().await;
    let event = json!({
        "type": "user.created",
        "data": {
            "id": "user_2x",
            "email_addresses": [{ "email_address": "ada@example.com" }],
            "first_name": "Ada",
            "last_name": "Lovelace",
            "image_url": ""
        }
    });

    let (status, body) = app.send(webhook_request(&event, None)).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let user = SurrealUserRepository::new(app.db.clone())
        .find_by_external_id("user_2x")
        .await
        .unwrap()
        .expect("user synced");
    assert_eq!(user.name, "Ada Lovelace");
    assert_eq!(user.email, "ada@example.com");

    let (status, body) = app
        .send(webhook_request(&event, Some("v1,bm9wZQ==".into())))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");

    let no_email = json!({
        "type": "user.updated",
        "data": { "id": "user_3y", "email_addresses": [] }
    });
    let (status, body) = app.send(webhook_request(&no_email, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let deleted = json!({ "type": "user.deleted", "data": { "id": "user_2x" } });
    let (status, _) = app.send(webhook_request(&deleted, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        SurrealUserRepository::new(app.db.clone())
            .find_by_external_id("user_2x")
            .await
            .unwrap()
            .is_some()
    );
}
