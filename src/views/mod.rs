pub mod issue;

use serde_json::{json, Value};

use crate::models::{
    Attachment, Comment, Group, IssueType, Priority, Project, Resolution, SecurityLevel, Status,
    User,
};

/// Short representations used inside other payloads (allowed values, issue
/// fields). Full representations for the catalog list endpoints sit below.

pub fn user_ref(user: &User, base: &str) -> Value {
    json!({
        "self": format!("{}/api/user?username={}", base, user.name),
        "name": user.name,
        "displayName": user.display_name,
        "active": user.active,
    })
}

pub fn priority_ref(priority: &Priority, base: &str) -> Value {
    json!({
        "self": format!("{}/api/priority/{}", base, priority.id),
        "id": priority.id.to_string(),
        "name": priority.name,
        "statusColor": priority.status_color,
    })
}

pub fn status_ref(status: &Status, base: &str) -> Value {
    json!({
        "self": format!("{}/api/status/{}", base, status.id),
        "id": status.id.to_string(),
        "name": status.name,
        "category": status.category,
    })
}

pub fn resolution_ref(resolution: &Resolution, base: &str) -> Value {
    json!({
        "self": format!("{}/api/resolution/{}", base, resolution.id),
        "id": resolution.id.to_string(),
        "name": resolution.name,
    })
}

pub fn issue_type_ref(issue_type: &IssueType, base: &str) -> Value {
    json!({
        "self": format!("{}/api/issuetype/{}", base, issue_type.id),
        "id": issue_type.id.to_string(),
        "name": issue_type.name,
        "subtask": issue_type.subtask,
    })
}

pub fn security_level_ref(level: &SecurityLevel, base: &str) -> Value {
    json!({
        "self": format!("{}/api/securitylevel/{}", base, level.id),
        "id": level.id.to_string(),
        "name": level.name,
    })
}

pub fn project_ref(project: &Project, base: &str) -> Value {
    json!({
        "self": format!("{}/api/project/{}", base, project.key),
        "id": project.id,
        "key": project.key,
        "name": project.name,
    })
}

/// Full representations for the catalog endpoints.

pub fn user_view(user: &User, base: &str) -> Value {
    json!({
        "self": format!("{}/api/user?username={}", base, user.name),
        "name": user.name,
        "displayName": user.display_name,
        "emailAddress": user.email,
        "active": user.active,
    })
}

pub fn priority_view(priority: &Priority, base: &str) -> Value {
    json!({
        "self": format!("{}/api/priority/{}", base, priority.id),
        "id": priority.id.to_string(),
        "name": priority.name,
        "statusColor": priority.status_color,
        "description": priority.description,
    })
}

pub fn status_view(status: &Status, base: &str) -> Value {
    json!({
        "self": format!("{}/api/status/{}", base, status.id),
        "id": status.id.to_string(),
        "name": status.name,
        "category": status.category,
        "description": status.description,
    })
}

pub fn resolution_view(resolution: &Resolution, base: &str) -> Value {
    json!({
        "self": format!("{}/api/resolution/{}", base, resolution.id),
        "id": resolution.id.to_string(),
        "name": resolution.name,
        "description": resolution.description,
    })
}

pub fn project_view(project: &Project, lead: &User, base: &str) -> Value {
    json!({
        "self": format!("{}/api/project/{}", base, project.key),
        "id": project.id,
        "key": project.key,
        "name": project.name,
        "description": project.description,
        "lead": user_ref(lead, base),
    })
}

pub fn group_view(group: &Group, members: &[User], base: &str) -> Value {
    json!({
        "self": format!("{}/api/group?groupname={}", base, group.name),
        "name": group.name,
        "users": members.iter().map(|u| user_ref(u, base)).collect::<Vec<_>>(),
    })
}

pub fn comment_view(comment: &Comment, author: Option<&User>, issue_key: &str, base: &str) -> Value {
    json!({
        "self": format!("{}/api/issue/{}/comment/{}", base, issue_key, comment.id),
        "id": comment.id,
        "author": author.map(|u| user_ref(u, base)),
        "body": comment.body,
        "created": comment.created_at,
        "updated": comment.updated_at,
    })
}

pub fn attachment_view(attachment: &Attachment, author: Option<&User>, base: &str) -> Value {
    json!({
        "self": format!("{}/api/attachment/{}", base, attachment.id),
        "id": attachment.id,
        "filename": attachment.filename,
        "mimeType": attachment.mime_type,
        "size": attachment.size,
        "author": author.map(|u| user_ref(u, base)),
        "content": format!("{}/api/attachment/{}/content", base, attachment.id),
        "created": attachment.created_at,
    })
}
