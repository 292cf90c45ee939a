mod common;

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use common::{database_configured, ensure_server, login, trackctl};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn attachment_upload_download_delete() -> Result<()> {
    if !database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = ensure_server().await?;
    let suffix = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos() as u64
        % 1_000_000_000;
    let lead = format!("att_{}", suffix);
    let project_key = format!("AT{}", suffix % 1_000_000);

    trackctl(&["init"])?;
    trackctl(&["user", "create", &lead, "--password", "pw"])?;
    trackctl(&["project", "create", &project_key, "Attachment Project", "--lead", &lead])?;

    let token = login(&server.base_url, &lead, "pw").await?;
    let client = reqwest::Client::new();

    let created: Value = client
        .post(format!("{}/api/issue", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "fields": {
                "project": {"key": project_key},
                "issuetype": {"id": "2"},
                "summary": "Issue with attachment"
            }
        }))
        .send()
        .await?
        .json()
        .await?;
    let issue_key = created["data"]["key"].as_str().unwrap().to_string();

    // Upload
    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(b"log line one\nlog line two\n".to_vec())
            .file_name("server.log")
            .mime_str("text/plain")?,
    );
    let resp = client
        .post(format!("{}/api/issue/{}/attachments", server.base_url, issue_key))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await?;
    let attachment = &body["data"][0];
    assert_eq!(attachment["filename"], "server.log");
    let attachment_id = attachment["id"].as_str().unwrap().to_string();

    // Download
    let resp = client
        .get(format!("{}/api/attachment/{}/content", server.base_url, attachment_id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.bytes().await?.as_ref(), b"log line one\nlog line two\n");

    // Delete, then the metadata is gone
    let resp = client
        .delete(format!("{}/api/attachment/{}", server.base_url, attachment_id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client
        .get(format!("{}/api/attachment/{}", server.base_url, attachment_id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    Ok(())
}
