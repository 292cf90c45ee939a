use serde_json::{json, Map, Value};

use crate::fields::{FieldCatalog, IncludedFields};
use crate::models::{
    Attachment, Comment, Issue, IssueType, Priority, Project, Resolution, SecurityLevel, Status,
    User,
};

use super::{
    attachment_view, comment_view, issue_type_ref, priority_ref, project_ref, resolution_ref,
    security_level_ref, status_ref, user_ref,
};

/// Everything needed to render one issue: the row itself plus the related
/// entities the handler resolved. Votes and watches carry the current
/// caller's state.
pub struct IssueViewData {
    pub issue: Issue,
    pub project: Project,
    pub issue_type: IssueType,
    pub status: Status,
    pub priority: Option<Priority>,
    pub resolution: Option<Resolution>,
    pub security_level: Option<SecurityLevel>,
    pub assignee: Option<User>,
    pub reporter: Option<User>,
    pub parent: Option<Issue>,
    pub comments: Vec<(Comment, Option<User>)>,
    pub attachments: Vec<(Attachment, Option<User>)>,
    pub vote_count: i64,
    pub has_voted: bool,
    pub watch_count: i64,
    pub is_watching: bool,
}

/// Renders the issue JSON: key, self link, and a `fields` object pruned by
/// the inclusion filter. Field navigability comes from the catalog so the
/// filter sees the same flags the metadata endpoints advertise.
pub fn issue_view(
    data: &IssueViewData,
    catalog: &FieldCatalog,
    include: &IncludedFields,
    base: &str,
) -> Value {
    let mut fields = Map::new();
    let mut put = |id: &str, value: Value| {
        let navigable = catalog.get(id).map_or(false, |def| def.navigable);
        if include.included(id, navigable) {
            fields.insert(id.to_string(), value);
        }
    };

    let issue = &data.issue;
    put("summary", json!(issue.summary));
    put("description", json!(issue.description));
    put("issuetype", issue_type_ref(&data.issue_type, base));
    put("status", status_ref(&data.status, base));
    put(
        "priority",
        data.priority.as_ref().map_or(Value::Null, |p| priority_ref(p, base)),
    );
    put(
        "resolution",
        data.resolution
            .as_ref()
            .map_or(Value::Null, |r| resolution_ref(r, base)),
    );
    put(
        "security",
        data.security_level
            .as_ref()
            .map_or(Value::Null, |s| security_level_ref(s, base)),
    );
    put(
        "assignee",
        data.assignee.as_ref().map_or(Value::Null, |u| user_ref(u, base)),
    );
    put(
        "reporter",
        data.reporter.as_ref().map_or(Value::Null, |u| user_ref(u, base)),
    );
    put("labels", json!(issue.labels));
    put("duedate", json!(issue.due_date));
    put("project", project_ref(&data.project, base));
    put(
        "parent",
        data.parent.as_ref().map_or(Value::Null, |p| {
            json!({
                "id": p.id,
                "key": p.key,
                "self": format!("{}/api/issue/{}", base, p.key),
            })
        }),
    );
    put("created", json!(issue.created_at));
    put("updated", json!(issue.updated_at));
    put(
        "votes",
        json!({
            "self": format!("{}/api/issue/{}/votes", base, issue.key),
            "votes": data.vote_count,
            "hasVoted": data.has_voted,
        }),
    );
    put(
        "watches",
        json!({
            "self": format!("{}/api/issue/{}/watchers", base, issue.key),
            "watchCount": data.watch_count,
            "isWatching": data.is_watching,
        }),
    );
    put(
        "comment",
        json!({
            "total": data.comments.len(),
            "comments": data
                .comments
                .iter()
                .map(|(c, author)| comment_view(c, author.as_ref(), &issue.key, base))
                .collect::<Vec<_>>(),
        }),
    );
    put(
        "attachment",
        Value::Array(
            data.attachments
                .iter()
                .map(|(a, author)| attachment_view(a, author.as_ref(), base))
                .collect(),
        ),
    );

    // Custom field values ride along under their field ids
    for def in catalog.iter().filter(|def| def.is_custom()) {
        let value = issue.custom_value(&def.id).cloned().unwrap_or(Value::Null);
        let navigable = def.navigable;
        if include.included(&def.id, navigable) {
            fields.insert(def.id.clone(), value);
        }
    }

    json!({
        "id": issue.id,
        "key": issue.key,
        "self": format!("{}/api/issue/{}", base, issue.key),
        "fields": Value::Object(fields),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn data() -> IssueViewData {
        let project = Project {
            id: Uuid::new_v4(),
            key: "TRK".to_string(),
            name: "Tracker".to_string(),
            description: String::new(),
            lead_id: Uuid::new_v4(),
            default_assignee: "unassigned".to_string(),
            default_priority_id: None,
            default_security_level_id: None,
            create_screen_id: 1,
            edit_screen_id: 1,
            counter: 0,
            created_at: Utc::now(),
        };
        IssueViewData {
            issue: Issue {
                id: Uuid::new_v4(),
                key: "TRK-1".to_string(),
                project_id: project.id,
                issue_type_id: 1,
                status_id: 1,
                priority_id: None,
                resolution_id: None,
                security_level_id: None,
                summary: "A bug".to_string(),
                description: Some("details".to_string()),
                assignee_id: None,
                reporter_id: Uuid::new_v4(),
                parent_id: None,
                labels: vec!["ui".to_string()],
                due_date: None,
                custom: serde_json::json!({"customfield_7": 5}),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            project,
            issue_type: IssueType {
                id: 1,
                name: "Bug".to_string(),
                subtask: false,
                description: String::new(),
            },
            status: Status {
                id: 1,
                name: "Open".to_string(),
                category: "new".to_string(),
                description: String::new(),
            },
            priority: None,
            resolution: None,
            security_level: None,
            assignee: None,
            reporter: None,
            parent: None,
            comments: vec![],
            attachments: vec![],
            vote_count: 2,
            has_voted: false,
            watch_count: 0,
            is_watching: false,
        }
    }

    #[test]
    fn renders_all_fields_by_default() {
        let catalog = FieldCatalog::new(vec![]);
        let include = IncludedFields::include_all_by_default::<&str>(&[]);
        let view = issue_view(&data(), &catalog, &include, "http://x");

        assert_eq!(view["key"], "TRK-1");
        assert_eq!(view["fields"]["summary"], "A bug");
        assert_eq!(view["fields"]["votes"]["votes"], 2);
        assert_eq!(view["fields"]["status"]["name"], "Open");
    }

    #[test]
    fn explicit_field_selection_prunes_the_rest() {
        let catalog = FieldCatalog::new(vec![]);
        let include = IncludedFields::include_all_by_default(&["summary"]);
        let view = issue_view(&data(), &catalog, &include, "http://x");

        let fields = view["fields"].as_object().unwrap();
        assert!(fields.contains_key("summary"));
        assert!(!fields.contains_key("description"));
        assert!(!fields.contains_key("votes"));
    }

    #[test]
    fn navigable_default_hides_vote_and_watch_counts() {
        let catalog = FieldCatalog::new(vec![]);
        let include = IncludedFields::include_navigable_by_default::<&str>(&[]);
        let view = issue_view(&data(), &catalog, &include, "http://x");

        let fields = view["fields"].as_object().unwrap();
        assert!(fields.contains_key("summary"));
        assert!(!fields.contains_key("votes"));
        assert!(!fields.contains_key("watches"));
    }

    #[test]
    fn custom_values_appear_under_their_field_ids() {
        let catalog = FieldCatalog::new(vec![crate::fields::registry::FieldDef::custom(
            7,
            "Story Points",
            crate::fields::registry::CustomKind::Number,
            true,
            None,
            None,
        )]);
        let include = IncludedFields::include_all_by_default::<&str>(&[]);
        let view = issue_view(&data(), &catalog, &include, "http://x");
        assert_eq!(view["fields"]["customfield_7"], 5);
    }
}
