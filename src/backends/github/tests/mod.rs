use pretty_assertions::assert_eq;

use crate::git::RefType;

use super::models::{PullRequestAction, PullRequestEvent, PushEvent};

#[test]
fn test_parse_push_event() {
    let event_str = include_str!("./push_sample.json");
    let event: PushEvent = serde_json::from_str(event_str).expect("should deserialize");

    assert_eq!(event.ref_type(), RefType::Branch("feature/PROJ-123-fix".into()));
    assert!(!event.created);
    assert_eq!(event.commits.len(), 2);

    let last = event.commits.last().unwrap();
    assert_eq!(last.short_id(), "a10867b");
    assert_eq!(last.committer.username.as_deref(), Some("web-flow"));
    assert_eq!(last.author.username.as_deref(), Some("octocat"));
}

#[test]
fn test_parse_pull_request_event() {
    let event_str = include_str!("./pull_request_sample.json");
    let event: PullRequestEvent = serde_json::from_str(event_str).expect("should deserialize");

    assert_eq!(event.action, PullRequestAction::Opened);
    assert_eq!(event.pull_request.number, 42);
    assert_eq!(event.head_ref().display_name(), "PROJ-77-new-parser");
}

#[test]
fn test_unknown_pull_request_action_is_kept() {
    let action: PullRequestAction = serde_json::from_str("\"auto_merge_enabled\"").unwrap();
    assert_eq!(action, PullRequestAction::Other("auto_merge_enabled".into()));
    assert_eq!(action.to_string(), "auto_merge_enabled");
    assert_eq!(
        serde_json::to_string(&PullRequestAction::Synchronize).unwrap(),
        "\"synchronize\""
    );
}
