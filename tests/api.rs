use std::env;
use std::fs;
use std::path::PathBuf;

use actix_web::http::Method;
use actix_web::test::{self, TestRequest};
use actix_web::App;
use serde_json::{json, Value};

use huddle::config::{CommonConfig, PathSet};
use huddle::server::config::ServerConfig;
use huddle::server::factory::ServerFactory;
use huddle::server::restful;

const ADMIN_PASSWORD: &str = "test-admin-password";

/// Sends a request and returns the status with the decoded JSON body.
macro_rules! call {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        let status = resp.status().as_u16();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

/// Registers a user and returns `(user_id, token)`.
macro_rules! register {
    ($app:expr, $name:expr) => {{
        let req = TestRequest::post()
            .uri("/register")
            .set_json(json!({"name": $name, "password": "password"}));
        let (status, body) = call!($app, req);
        assert_eq!(status, 200, "register {}: {body}", $name);
        (
            body["data"]["user_id"].as_str().unwrap().to_string(),
            body["data"]["token"].as_str().unwrap().to_string(),
        )
    }};
}

/// Creates something with PUT and returns its id.
macro_rules! create {
    ($app:expr, $uri:expr, $token:expr, $body:expr) => {{
        let (status, body) = call!($app, api(Method::PUT, $uri, $token, Some($body)));
        assert_eq!(status, 200, "create {}: {body}", $uri);
        body["data"]["id"].as_str().unwrap().to_string()
    }};
}

struct TestDir {
    path: PathBuf,
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn build_config() -> (ServerConfig, TestDir) {
    let path = env::temp_dir().join(format!("huddle-api-{}", uuid::Uuid::new_v4()));
    let ps = PathSet::new(Some(path.join("config")), Some(path.join("data"))).unwrap();

    let mut cfg = ServerConfig::default();
    cfg.db.sqlite.memory = true;
    cfg.authn.admin_password = String::from(ADMIN_PASSWORD);
    cfg.complete(&ps).unwrap();
    (cfg, TestDir { path })
}

fn api(method: Method, uri: &str, token: &str, body: Option<Value>) -> TestRequest {
    let req = TestRequest::default()
        .method(method)
        .uri(&format!("/api/{uri}"))
        .insert_header(("Authorization", format!("Bearer {token}")));
    match body {
        Some(body) => req.set_json(body),
        None => req,
    }
}

fn get(uri: &str, token: &str) -> TestRequest {
    api(Method::GET, uri, token, None)
}

fn patch_name(uri: &str, token: &str, name: &str) -> TestRequest {
    api(Method::PATCH, uri, token, Some(json!({"name": name})))
}

fn delete(uri: &str, token: &str) -> TestRequest {
    api(Method::DELETE, uri, token, None)
}

fn add_member(uri: &str, token: &str, user_id: &str, role: &str) -> TestRequest {
    api(
        Method::PUT,
        &format!("{uri}/members"),
        token,
        Some(json!({"user_id": user_id, "role": role})),
    )
}

#[actix_web::test]
async fn test_department_admin_manages_own_teams() {
    let (cfg, _dir) = build_config();
    let factory = ServerFactory::new(cfg).unwrap();
    let ctx = factory.build_context().unwrap();
    let app = test::init_service(App::new().configure(restful::configure(ctx, 1))).await;

    let (_, owner) = register!(app, "owner");
    let (dave_id, dave) = register!(app, "dave");

    let org = create!(app, "organizations", &owner, json!({"name": "Acme"}));
    let d1 = create!(
        app,
        &format!("organizations/{org}/departments"),
        &owner,
        json!({"name": "Engineering"})
    );
    let d2 = create!(
        app,
        &format!("organizations/{org}/departments"),
        &owner,
        json!({"name": "Sales"})
    );
    let t1 = create!(
        app,
        &format!("organizations/{org}/departments/{d1}/teams"),
        &owner,
        json!({"name": "Platform"})
    );
    let t2 = create!(
        app,
        &format!("organizations/{org}/departments/{d2}/teams"),
        &owner,
        json!({"name": "Field"})
    );

    // Department membership needs the organization first
    let dept_uri = format!("organizations/{org}/departments/{d1}");
    let (status, _) = call!(app, add_member(&dept_uri, &owner, &dave_id, "ADMIN"));
    assert_eq!(status, 400);
    let (status, _) = call!(
        app,
        add_member(&format!("organizations/{org}"), &owner, &dave_id, "MEMBER")
    );
    assert_eq!(status, 200);
    let (status, _) = call!(app, add_member(&dept_uri, &owner, &dave_id, "ADMIN"));
    assert_eq!(status, 200);

    let t1_uri = format!("organizations/{org}/departments/{d1}/teams/{t1}");
    let (status, body) = call!(app, patch_name(&t1_uri, &dave, "Core Platform"));
    assert_eq!(status, 200);
    assert_eq!(body["data"]["name"], "Core Platform");

    let t2_uri = format!("organizations/{org}/departments/{d2}/teams/{t2}");
    let (status, _) = call!(app, patch_name(&t2_uri, &dave, "Mine now"));
    assert_eq!(status, 403);
    let (status, _) = call!(app, delete(&t2_uri, &dave));
    assert_eq!(status, 403);
    let (status, _) = call!(app, get(&format!("organizations/{org}/departments/{d2}"), &dave));
    assert_eq!(status, 403);

    let (status, _) = call!(app, delete(&t1_uri, &dave));
    assert_eq!(status, 200);
    let (status, _) = call!(app, get(&t1_uri, &owner));
    assert_eq!(status, 404);
}

#[actix_web::test]
async fn test_not_found_before_forbidden() {
    let (cfg, _dir) = build_config();
    let factory = ServerFactory::new(cfg).unwrap();
    let ctx = factory.build_context().unwrap();
    let app = test::init_service(App::new().configure(restful::configure(ctx, 1))).await;

    let (_, alice) = register!(app, "alice");
    let (_, bob) = register!(app, "bob");

    let team = create!(app, "teams", &alice, json!({"name": "Alpha"}));
    let (status, _) = call!(app, get(&format!("teams/{team}"), &alice));
    assert_eq!(status, 200);

    let (status, body) = call!(app, get(&format!("teams/{team}"), &bob));
    assert_eq!(status, 403);
    assert_eq!(body["code"], 403);
    let (status, body) = call!(app, get("teams/no-such-team", &bob));
    assert_eq!(status, 404);
    assert_eq!(body["code"], 404);

    // Unknown scopes are not found for mutations too
    let (status, _) = call!(app, patch_name("organizations/nope", &bob, "x"));
    assert_eq!(status, 404);
    let (status, _) = call!(app, delete("organizations/nope/departments/nope", &bob));
    assert_eq!(status, 404);
}

#[actix_web::test]
async fn test_delete_organization_cascades() {
    let (cfg, _dir) = build_config();
    let factory = ServerFactory::new(cfg).unwrap();
    let ctx = factory.build_context().unwrap();
    let app = test::init_service(App::new().configure(restful::configure(ctx, 1))).await;

    let (_, owner) = register!(app, "owner");
    let org = create!(app, "organizations", &owner, json!({"name": "Acme"}));
    let dept = create!(
        app,
        &format!("organizations/{org}/departments"),
        &owner,
        json!({"name": "Engineering"})
    );
    let dept_team = create!(
        app,
        &format!("organizations/{org}/departments/{dept}/teams"),
        &owner,
        json!({"name": "Platform"})
    );
    let org_team = create!(
        app,
        &format!("organizations/{org}/teams"),
        &owner,
        json!({"name": "Leadership"})
    );
    let project = create!(
        app,
        "projects",
        &owner,
        json!({"name": "Roadmap", "owner": {"team": dept_team}})
    );

    let (status, _) = call!(app, delete(&format!("organizations/{org}"), &owner));
    assert_eq!(status, 200);

    for uri in [
        format!("organizations/{org}"),
        format!("teams/{dept_team}"),
        format!("teams/{org_team}"),
        format!("projects/{project}"),
    ] {
        let (status, body) = call!(app, get(&uri, &owner));
        assert_eq!(status, 404, "{uri}: {body}");
    }
    let (status, _) = call!(app, get(&format!("organizations/{org}/departments/{dept}"), &owner));
    assert_eq!(status, 404);

    let (status, body) = call!(app, get("organizations", &owner));
    assert_eq!(status, 200);
    assert_eq!(body["meta"]["count"], 0);
}

#[actix_web::test]
async fn test_organization_team_creation() {
    let (cfg, _dir) = build_config();
    let factory = ServerFactory::new(cfg).unwrap();
    let ctx = factory.build_context().unwrap();
    let app = test::init_service(App::new().configure(restful::configure(ctx, 1))).await;

    let (_, owner) = register!(app, "owner");
    let (_, other_owner) = register!(app, "other-owner");
    let (eve_id, eve) = register!(app, "eve");

    let org = create!(app, "organizations", &owner, json!({"name": "Acme"}));
    let other = create!(app, "organizations", &other_owner, json!({"name": "Globex"}));
    let other_dept = create!(
        app,
        &format!("organizations/{other}/departments"),
        &other_owner,
        json!({"name": "Ops"})
    );
    let (status, _) = call!(
        app,
        add_member(&format!("organizations/{other}"), &other_owner, &eve_id, "MEMBER")
    );
    assert_eq!(status, 200);
    let (status, _) = call!(
        app,
        add_member(
            &format!("organizations/{other}/departments/{other_dept}"),
            &other_owner,
            &eve_id,
            "ADMIN"
        )
    );
    assert_eq!(status, 200);

    let teams_uri = format!("organizations/{org}/teams");
    let team = create!(app, &teams_uri, &owner, json!({"name": "Direct"}));
    let (status, body) = call!(app, get(&format!("{teams_uri}/{team}"), &owner));
    assert_eq!(status, 200);
    assert_eq!(body["data"]["organization_id"], org.as_str());
    assert!(body["data"].get("department_id").is_none());

    let (status, _) = call!(
        app,
        api(Method::PUT, &teams_uri, &eve, Some(json!({"name": "Sneaky"})))
    );
    assert_eq!(status, 403);

    let (status, body) = call!(app, get(&teams_uri, &owner));
    assert_eq!(status, 200);
    assert_eq!(body["meta"]["count"], 1);
}

#[actix_web::test]
async fn test_path_ancestors_must_match() {
    let (cfg, _dir) = build_config();
    let factory = ServerFactory::new(cfg).unwrap();
    let ctx = factory.build_context().unwrap();
    let app = test::init_service(App::new().configure(restful::configure(ctx, 1))).await;

    let (_, owner) = register!(app, "owner");
    let org = create!(app, "organizations", &owner, json!({"name": "Acme"}));
    let other = create!(app, "organizations", &owner, json!({"name": "Globex"}));
    let dept = create!(
        app,
        &format!("organizations/{org}/departments"),
        &owner,
        json!({"name": "Engineering"})
    );
    let team = create!(
        app,
        &format!("organizations/{org}/departments/{dept}/teams"),
        &owner,
        json!({"name": "Platform"})
    );

    let (status, _) = call!(app, get(&format!("organizations/{org}/departments/{dept}"), &owner));
    assert_eq!(status, 200);
    let (status, _) = call!(app, get(&format!("organizations/{other}/departments/{dept}"), &owner));
    assert_eq!(status, 404);
    // A department team is not an organization team
    let (status, _) = call!(app, get(&format!("organizations/{org}/teams/{team}"), &owner));
    assert_eq!(status, 404);
    let (status, _) = call!(app, get(&format!("teams/{team}"), &owner));
    assert_eq!(status, 200);
}

#[actix_web::test]
async fn test_membership_lifecycle() {
    let (cfg, _dir) = build_config();
    let factory = ServerFactory::new(cfg).unwrap();
    let ctx = factory.build_context().unwrap();
    let app = test::init_service(App::new().configure(restful::configure(ctx, 1))).await;

    let (owner_id, owner) = register!(app, "owner");
    let (carol_id, carol) = register!(app, "carol");

    let org = create!(app, "organizations", &owner, json!({"name": "Acme"}));
    let dept = create!(
        app,
        &format!("organizations/{org}/departments"),
        &owner,
        json!({"name": "Engineering"})
    );
    let team = create!(
        app,
        &format!("organizations/{org}/departments/{dept}/teams"),
        &owner,
        json!({"name": "Platform"})
    );
    let org_uri = format!("organizations/{org}");
    let dept_uri = format!("{org_uri}/departments/{dept}");
    let team_uri = format!("{dept_uri}/teams/{team}");

    let (status, _) = call!(app, add_member(&org_uri, &owner, &carol_id, "MEMBER"));
    assert_eq!(status, 200);
    let (status, _) = call!(app, add_member(&org_uri, &owner, &carol_id, "MEMBER"));
    assert_eq!(status, 400);
    let (status, _) = call!(app, add_member(&org_uri, &owner, "ghost", "MEMBER"));
    assert_eq!(status, 400);
    let (status, _) = call!(app, add_member(&team_uri, &owner, &carol_id, "MEMBER"));
    assert_eq!(status, 400);
    let (status, _) = call!(app, add_member(&dept_uri, &owner, &carol_id, "MEMBER"));
    assert_eq!(status, 200);
    let (status, _) = call!(app, add_member(&team_uri, &owner, &carol_id, "MEMBER"));
    assert_eq!(status, 200);

    // A plain member cannot manage memberships
    let (status, _) = call!(app, add_member(&org_uri, &carol, &owner_id, "ADMIN"));
    assert_eq!(status, 403);
    let (status, body) = call!(app, get(&format!("{team_uri}/members"), &carol));
    assert_eq!(status, 200);
    assert_eq!(body["meta"]["count"], 1);

    let (status, _) = call!(
        app,
        api(
            Method::PATCH,
            &format!("{team_uri}/members/{carol_id}"),
            &owner,
            Some(json!({"role": "ADMIN"}))
        )
    );
    assert_eq!(status, 200);
    let (status, _) = call!(app, patch_name(&team_uri, &carol, "Carol's team"));
    assert_eq!(status, 200);
    let (status, _) = call!(
        app,
        api(
            Method::PATCH,
            &format!("{team_uri}/members/{owner_id}"),
            &owner,
            Some(json!({"role": "MEMBER"}))
        )
    );
    assert_eq!(status, 404);

    // Leaving the organization drops every membership below it
    let (status, _) = call!(app, delete(&format!("{org_uri}/members/{carol_id}"), &owner));
    assert_eq!(status, 200);
    let (status, _) = call!(app, get(&team_uri, &carol));
    assert_eq!(status, 403);
    let (status, body) = call!(app, get("teams", &carol));
    assert_eq!(status, 200);
    assert_eq!(body["meta"]["count"], 0);
    let (status, _) = call!(app, delete(&format!("{dept_uri}/members/{carol_id}"), &owner));
    assert_eq!(status, 404);
}

#[actix_web::test]
async fn test_global_admin() {
    let (cfg, _dir) = build_config();
    let factory = ServerFactory::new(cfg).unwrap();
    let ctx = factory.build_context().unwrap();
    let app = test::init_service(App::new().configure(restful::configure(ctx, 1))).await;

    let req = TestRequest::post()
        .uri("/login/admin")
        .set_payload("wrong-password");
    let (status, _) = call!(app, req);
    assert_eq!(status, 401);

    let req = TestRequest::post()
        .uri("/login/admin")
        .set_payload(ADMIN_PASSWORD);
    let (status, body) = call!(app, req);
    assert_eq!(status, 200);
    let admin = body["data"]["token"].as_str().unwrap().to_string();

    let (alice_id, alice) = register!(app, "alice");
    let org = create!(app, "organizations", &alice, json!({"name": "Private"}));

    let (status, _) = call!(app, get(&format!("organizations/{org}"), &admin));
    assert_eq!(status, 200);
    let (status, body) = call!(app, get("organizations", &admin));
    assert_eq!(status, 200);
    assert_eq!(body["meta"]["count"], 1);

    let (status, _) = call!(app, get("users", &alice));
    assert_eq!(status, 403);
    let (status, body) = call!(app, get("users", &admin));
    assert_eq!(status, 200);
    assert_eq!(body["meta"]["count"], 2);

    let (status, _) = call!(
        app,
        api(
            Method::PATCH,
            &format!("users/{alice_id}"),
            &alice,
            Some(json!({"rank": "ADMIN"}))
        )
    );
    assert_eq!(status, 403);
    let (status, body) = call!(
        app,
        api(
            Method::PATCH,
            &format!("users/{alice_id}"),
            &admin,
            Some(json!({"rank": "ADMIN_ELEVATED"}))
        )
    );
    assert_eq!(status, 200, "{body}");

    // The rank is read on every request
    let (status, body) = call!(app, get("whoami", &alice));
    assert_eq!(status, 200);
    assert_eq!(body["data"]["rank"], "ADMIN_ELEVATED");
    let (status, _) = call!(app, get("users", &alice));
    assert_eq!(status, 200);
}

#[actix_web::test]
async fn test_resources() {
    let (cfg, _dir) = build_config();
    let factory = ServerFactory::new(cfg).unwrap();
    let ctx = factory.build_context().unwrap();
    let app = test::init_service(App::new().configure(restful::configure(ctx, 1))).await;

    let (alice_id, alice) = register!(app, "alice");
    let (bob_id, bob) = register!(app, "bob");

    let team = create!(app, "teams", &alice, json!({"name": "Alpha"}));
    let team_project = create!(
        app,
        "projects",
        &alice,
        json!({"name": "Roadmap", "owner": {"team": team}})
    );
    let own_project = create!(
        app,
        "projects",
        &alice,
        json!({"name": "Notes", "owner": {"user": alice_id}})
    );

    // Someone else's personal space
    let (status, _) = call!(
        app,
        api(
            Method::PUT,
            "projects",
            &bob,
            Some(json!({"name": "Squat", "owner": {"user": alice_id}}))
        )
    );
    assert_eq!(status, 403);
    let (status, _) = call!(
        app,
        api(
            Method::PUT,
            "projects",
            &bob,
            Some(json!({"name": "Lost", "owner": {"team": "missing"}}))
        )
    );
    assert_eq!(status, 404);
    let (status, _) = call!(
        app,
        api(
            Method::PUT,
            "projects",
            &bob,
            Some(json!({"name": "Two", "owner": {"team": team, "user": bob_id}}))
        )
    );
    assert_eq!(status, 400);

    let (status, body) = call!(app, get("projects", &alice));
    assert_eq!(status, 200);
    assert_eq!(body["meta"]["count"], 2);
    let (status, body) = call!(app, get("projects", &bob));
    assert_eq!(status, 200);
    assert_eq!(body["meta"]["count"], 0);

    let (status, _) = call!(app, get(&format!("projects/{own_project}"), &bob));
    assert_eq!(status, 403);
    let (status, _) = call!(app, get(&format!("battles/{team_project}"), &alice));
    assert_eq!(status, 404);

    let (status, _) = call!(app, add_member(&format!("teams/{team}"), &alice, &bob_id, "MEMBER"));
    assert_eq!(status, 200);
    let (status, body) = call!(app, get("projects", &bob));
    assert_eq!(status, 200);
    assert_eq!(body["meta"]["count"], 1);
    assert_eq!(body["data"][0]["id"], team_project.as_str());
    let (status, _) = call!(app, patch_name(&format!("projects/{team_project}"), &bob, "Mine"));
    assert_eq!(status, 403);
    let (status, body) = call!(
        app,
        patch_name(&format!("projects/{team_project}"), &alice, "Roadmap 2")
    );
    assert_eq!(status, 200);
    assert_eq!(body["data"]["name"], "Roadmap 2");
}

#[actix_web::test]
async fn test_cani() {
    let (cfg, _dir) = build_config();
    let factory = ServerFactory::new(cfg).unwrap();
    let ctx = factory.build_context().unwrap();
    let app = test::init_service(App::new().configure(restful::configure(ctx, 1))).await;

    let (_, owner) = register!(app, "owner");
    let (member_id, member) = register!(app, "member");
    let org = create!(app, "organizations", &owner, json!({"name": "Acme"}));
    let (status, _) = call!(
        app,
        add_member(&format!("organizations/{org}"), &owner, &member_id, "MEMBER")
    );
    assert_eq!(status, 200);

    let cases = [
        (&owner, "view", true),
        (&owner, "manage", true),
        (&member, "view", true),
        (&member, "manage", false),
    ];
    for (token, level, allow) in cases {
        let (status, body) = call!(app, get(&format!("cani/{level}/organizations/{org}"), token));
        assert_eq!(status, 200);
        assert_eq!(body["data"]["allow"], allow, "{level}");
    }

    let (status, _) = call!(app, get("cani/view/organizations/missing", &member));
    assert_eq!(status, 404);
    let (status, _) = call!(app, get(&format!("cani/own/organizations/{org}"), &member));
    assert_eq!(status, 404);
    let (status, _) = call!(
        app,
        api(Method::DELETE, &format!("cani/view/organizations/{org}"), &member, None)
    );
    assert_eq!(status, 405);
}

#[actix_web::test]
async fn test_api_keys() {
    let (cfg, _dir) = build_config();
    let factory = ServerFactory::new(cfg).unwrap();
    let ctx = factory.build_context().unwrap();
    let app = test::init_service(App::new().configure(restful::configure(ctx, 1))).await;

    let (alice_id, alice) = register!(app, "alice");
    let (_, bob) = register!(app, "bob");

    let (status, body) = call!(
        app,
        api(Method::PUT, "apikeys", &alice, Some(json!({"name": "ci"})))
    );
    assert_eq!(status, 200);
    let key_id = body["data"]["id"].as_str().unwrap().to_string();
    let key = body["data"]["key"].as_str().unwrap().to_string();

    let req = TestRequest::get()
        .uri("/api/whoami")
        .insert_header(("X-API-Key", key.as_str()));
    let (status, body) = call!(app, req);
    assert_eq!(status, 200);
    assert_eq!(body["data"]["id"], alice_id.as_str());

    let req = TestRequest::get()
        .uri("/api/whoami")
        .insert_header(("X-API-Key", format!("{key_id}.wrong")));
    let (status, _) = call!(app, req);
    assert_eq!(status, 401);

    let (status, body) = call!(app, get("apikeys", &alice));
    assert_eq!(status, 200);
    assert_eq!(body["meta"]["count"], 1);
    assert!(body["data"][0].get("hash").is_none());

    let (status, _) = call!(app, get(&format!("apikeys/{key_id}"), &bob));
    assert_eq!(status, 403);
    let (status, _) = call!(app, delete(&format!("apikeys/{key_id}"), &bob));
    assert_eq!(status, 403);
    let (status, _) = call!(app, delete(&format!("apikeys/{key_id}"), &alice));
    assert_eq!(status, 200);

    let req = TestRequest::get()
        .uri("/api/whoami")
        .insert_header(("X-API-Key", key.as_str()));
    let (status, _) = call!(app, req);
    assert_eq!(status, 401);
}

#[actix_web::test]
async fn test_request_errors() {
    let (cfg, _dir) = build_config();
    let factory = ServerFactory::new(cfg).unwrap();
    let ctx = factory.build_context().unwrap();
    let app = test::init_service(App::new().configure(restful::configure(ctx, 1))).await;

    let (status, body) = call!(app, TestRequest::get().uri("/api/organizations"));
    assert_eq!(status, 401);
    assert_eq!(body["code"], 401);
    let (status, _) = call!(app, get("organizations", "not-a-token"));
    assert_eq!(status, 401);

    let (_, alice) = register!(app, "alice");
    let req = TestRequest::post()
        .uri("/register")
        .set_json(json!({"name": "alice", "password": "again"}));
    let (status, _) = call!(app, req);
    assert_eq!(status, 400);

    let (status, _) = call!(app, get("nothing/here", &alice));
    assert_eq!(status, 404);
    let (status, _) = call!(app, api(Method::POST, "organizations", &alice, None));
    assert_eq!(status, 405);
    let (status, _) = call!(app, api(Method::PUT, "organizations", &alice, None));
    assert_eq!(status, 400);
    let (status, _) = call!(
        app,
        api(Method::PUT, "organizations", &alice, Some(json!({"name": " "})))
    );
    assert_eq!(status, 400);
    let (status, _) = call!(app, TestRequest::get().uri("/unknown"));
    assert_eq!(status, 404);

    let (status, body) = call!(app, TestRequest::get().uri("/healthz"));
    assert_eq!(status, 200);
    assert_eq!(body["code"], 200);
}

#[actix_web::test]
async fn test_guest_registration() {
    let (cfg, _dir) = build_config();
    let factory = ServerFactory::new(cfg).unwrap();
    let ctx = factory.build_context().unwrap();
    let app = test::init_service(App::new().configure(restful::configure(ctx, 1))).await;

    let req = TestRequest::post()
        .uri("/register")
        .set_json(json!({"name": "visitor"}));
    let (status, body) = call!(app, req);
    assert_eq!(status, 200);
    let guest = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = call!(app, get("whoami", &guest));
    assert_eq!(status, 200);
    assert_eq!(body["data"]["rank"], "GUEST");

    let req = TestRequest::post().uri("/login/visitor").set_payload("anything");
    let (status, _) = call!(app, req);
    assert_eq!(status, 401);
}

#[actix_web::test]
async fn test_registration_disabled() {
    let (mut cfg, _dir) = build_config();
    cfg.authn.allow_registration = false;
    let factory = ServerFactory::new(cfg).unwrap();
    let ctx = factory.build_context().unwrap();
    let app = test::init_service(App::new().configure(restful::configure(ctx, 1))).await;

    let req = TestRequest::post()
        .uri("/register")
        .set_json(json!({"name": "alice", "password": "password"}));
    let (status, _) = call!(app, req);
    assert_eq!(status, 403);
}

#[actix_web::test]
async fn test_member_writes_authorize_before_body() {
    let (cfg, _dir) = build_config();
    let factory = ServerFactory::new(cfg).unwrap();
    let ctx = factory.build_context().unwrap();
    let app = test::init_service(App::new().configure(restful::configure(ctx, 1))).await;

    let (_, owner) = register!(app, "owner");
    let (_, stranger) = register!(app, "stranger");
    let org = create!(app, "organizations", &owner, json!({"name": "Acme"}));
    let org_uri = format!("organizations/{org}");
    let junk = json!({"oops": 1});

    let (status, _) = call!(
        app,
        api(Method::PUT, &format!("{org_uri}/members"), &stranger, Some(junk.clone()))
    );
    assert_eq!(status, 403);
    let (status, _) = call!(
        app,
        api(Method::PATCH, &format!("{org_uri}/members/someone"), &stranger, Some(junk.clone()))
    );
    assert_eq!(status, 403);
    let (status, _) = call!(
        app,
        api(Method::PUT, &format!("{org_uri}/departments"), &stranger, Some(junk.clone()))
    );
    assert_eq!(status, 403);

    // The manager still gets the body error
    let (status, _) = call!(
        app,
        api(Method::PUT, &format!("{org_uri}/members"), &owner, Some(junk))
    );
    assert_eq!(status, 400);
}
