mod common;

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use common::{database_configured, ensure_server, login, trackctl};
use reqwest::StatusCode;
use serde_json::{json, Value};

fn unique_suffix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos() as u64
        % 1_000_000_000
}

struct Ctx {
    base_url: String,
    client: reqwest::Client,
    token: String,
    member_token: String,
    project_key: String,
}

impl Ctx {
    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
    }

    fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .put(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
    }
}

async fn provision() -> Result<Ctx> {
    let server = ensure_server().await?;
    let suffix = unique_suffix();
    let lead = format!("lead_{}", suffix);
    let member = format!("member_{}", suffix);
    let project_key = format!("QA{}", suffix % 1_000_000);

    trackctl(&["init"])?;
    trackctl(&["user", "create", &lead, "--password", "pw", "--display-name", "Lead User"])?;
    trackctl(&["user", "create", &member, "--password", "pw", "--display-name", "Member User"])?;
    trackctl(&["project", "create", &project_key, "Flow Test Project", "--lead", &lead])?;
    trackctl(&["project", "role", &project_key, &member, "member"])?;

    let token = login(&server.base_url, &lead, "pw").await?;
    let member_token = login(&server.base_url, &member, "pw").await?;

    Ok(Ctx {
        base_url: server.base_url.clone(),
        client: reqwest::Client::new(),
        token,
        member_token,
        project_key,
    })
}

async fn data(resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    let body: Value = resp.json().await?;
    anyhow::ensure!(
        status.is_success(),
        "request failed with {}: {}",
        status,
        body
    );
    Ok(body["data"].clone())
}

#[tokio::test]
async fn issue_lifecycle_with_field_metadata() -> Result<()> {
    if !database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let ctx = provision().await?;

    // --- createmeta advertises the project and its required pseudo-fields
    let meta = data(
        ctx.get(&format!(
            "/api/issue/createmeta?projectKeys={}&expand=projects.issuetypes.fields",
            ctx.project_key
        ))
        .send()
        .await?,
    )
    .await?;
    let projects = meta["projects"].as_array().unwrap();
    assert_eq!(projects.len(), 1);
    let bug_type = projects[0]["issuetypes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["name"] == "Bug")
        .expect("Bug issue type in createmeta");
    assert_eq!(bug_type["fields"]["project"]["required"], true);
    assert_eq!(bug_type["fields"]["issuetype"]["required"], true);
    assert_eq!(bug_type["fields"]["summary"]["required"], true);

    // --- create
    let created = data(
        ctx.post("/api/issue")
            .json(&json!({
                "fields": {
                    "project": {"key": ctx.project_key},
                    "issuetype": {"id": "1"},
                    "summary": "First bug",
                    "priority": {"id": "2"},
                    "labels": ["regression"]
                }
            }))
            .send()
            .await?,
    )
    .await?;
    let issue_key = created["key"].as_str().unwrap().to_string();
    assert!(issue_key.starts_with(&ctx.project_key));

    // --- field selection on the single-issue view
    let issue = data(
        ctx.get(&format!("/api/issue/{}?fields=summary,priority,-comment", issue_key))
            .send()
            .await?,
    )
    .await?;
    let fields = issue["fields"].as_object().unwrap();
    assert_eq!(fields["summary"], "First bug");
    assert_eq!(fields["priority"]["name"], "Critical");
    assert!(!fields.contains_key("description"));
    assert!(!fields.contains_key("comment"));

    // --- off-screen fields are rejected on edit
    let resp = ctx
        .put(&format!("/api/issue/{}", issue_key))
        .json(&json!({"fields": {"reporter": {"name": "someone"}}}))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["reporter"].is_string());

    // --- a legal edit sticks
    data(
        ctx.put(&format!("/api/issue/{}", issue_key))
            .json(&json!({"fields": {"summary": "First bug (renamed)"}}))
            .send()
            .await?,
    )
    .await?;

    // --- editmeta includes the comment pseudo-field
    let editmeta = data(
        ctx.get(&format!("/api/issue/{}/editmeta", issue_key))
            .send()
            .await?,
    )
    .await?;
    let comment_meta = &editmeta["fields"]["comment"];
    assert_eq!(comment_meta["operations"], json!(["add", "edit", "remove"]));

    // --- transition metadata forces resolution required
    let transitions = data(
        ctx.get(&format!(
            "/api/issue/{}/transitions?expand=transitions.fields",
            issue_key
        ))
        .send()
        .await?,
    )
    .await?;
    let resolve = transitions["transitions"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["name"] == "Resolve Issue")
        .expect("resolve transition available");
    assert_eq!(resolve["fields"]["resolution"]["required"], true);

    // --- performing it without a resolution fails
    let resp = ctx
        .post(&format!("/api/issue/{}/transitions", issue_key))
        .json(&json!({"transition": {"id": resolve["id"]}}))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // --- and with one succeeds
    let resp = ctx
        .post(&format!("/api/issue/{}/transitions", issue_key))
        .json(&json!({
            "transition": {"id": resolve["id"]},
            "fields": {"resolution": {"id": "1"}}
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let issue = data(ctx.get(&format!("/api/issue/{}", issue_key)).send().await?).await?;
    assert_eq!(issue["fields"]["status"]["name"], "Resolved");
    assert_eq!(issue["fields"]["resolution"]["name"], "Fixed");

    Ok(())
}

#[tokio::test]
async fn voting_rules() -> Result<()> {
    if !database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let ctx = provision().await?;

    let created = data(
        ctx.post("/api/issue")
            .json(&json!({
                "fields": {
                    "project": {"key": ctx.project_key},
                    "issuetype": {"id": "2"},
                    "summary": "Votable task"
                }
            }))
            .send()
            .await?,
    )
    .await?;
    let issue_key = created["key"].as_str().unwrap().to_string();

    // The reporter cannot vote for their own issue
    let resp = ctx
        .post(&format!("/api/issue/{}/votes", issue_key))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Another member can
    let resp = ctx
        .client
        .post(format!("{}/api/issue/{}/votes", ctx.base_url, issue_key))
        .bearer_auth(&ctx.member_token)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let votes = data(
        ctx.get(&format!("/api/issue/{}/votes", issue_key))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(votes["votes"], 1);
    // The reporter did not vote
    assert_eq!(votes["hasVoted"], false);

    Ok(())
}

#[tokio::test]
async fn group_membership_round_trip() -> Result<()> {
    if !database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let ctx = provision().await?;
    let group_name = format!("devs_{}", unique_suffix());

    let resp = ctx
        .post("/api/group")
        .json(&json!({"name": group_name}))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Add the lead to the group and read it back
    let lead_name = {
        let me = data(ctx.get("/api/user/search?query=lead_").send().await?).await?;
        me.as_array().unwrap()[0]["name"].as_str().unwrap().to_string()
    };
    let resp = ctx
        .post("/api/group/user")
        .json(&json!({"groupname": group_name, "username": lead_name}))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let group = data(
        ctx.get(&format!("/api/group?groupname={}", group_name))
            .send()
            .await?,
    )
    .await?;
    let users = group["users"].as_array().unwrap();
    assert!(users.iter().any(|u| u["name"] == json!(lead_name)));

    Ok(())
}
