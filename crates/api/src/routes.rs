//! Upstream path tables.
//!
//! Only the endpoints that differ between API versions live here; every other path is shared
//! and spelled out in the gateway.

use crate::config::ApiVersion;
use crate::transport::ApiRequest;
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy)]
pub struct Routes {
    version: ApiVersion,
}

impl Routes {
    #[must_use]
    pub fn new(version: ApiVersion) -> Self {
        Self { version }
    }

    #[must_use]
    pub fn version(&self) -> ApiVersion {
        self.version
    }

    #[must_use]
    pub fn current_timer(&self) -> ApiRequest {
        match self.version {
            ApiVersion::Current => ApiRequest::get("/timers/current"),
            ApiVersion::Legacy => ApiRequest::get("/timer/running"),
        }
    }

    #[must_use]
    pub fn start_timer_for_task(&self, task_id: &str, comment: Option<&str>) -> ApiRequest {
        match self.version {
            ApiVersion::Current => ApiRequest::post("/timers")
                .with_body(with_comment(json!({ "task": task_id }), comment)),
            ApiVersion::Legacy => ApiRequest::post("/timer/start_for")
                .segment(task_id)
                .with_body(with_comment(json!({}), comment)),
        }
    }

    #[must_use]
    pub fn tasks_for_project(&self, project_id: &str) -> ApiRequest {
        match self.version {
            ApiVersion::Current => ApiRequest::get("/projects")
                .segment(project_id)
                .segment("tasks"),
            ApiVersion::Legacy => ApiRequest::get("/tasks/for_project").segment(project_id),
        }
    }
}

fn with_comment(mut body: Value, comment: Option<&str>) -> Value {
    if let Some(c) = comment {
        body["comment"] = json!(c);
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_never_share_divergent_paths() {
        let current = Routes::new(ApiVersion::Current);
        let legacy = Routes::new(ApiVersion::Legacy);

        assert_eq!(current.current_timer().path, "/timers/current");
        assert_eq!(legacy.current_timer().path, "/timer/running");

        assert_eq!(current.tasks_for_project("ev:1").path, "/projects/ev:1/tasks");
        assert_eq!(legacy.tasks_for_project("ev:1").path, "/tasks/for_project/ev:1");
    }

    #[test]
    fn start_for_task_carries_task_in_path_or_body() {
        let current = Routes::new(ApiVersion::Current).start_timer_for_task("ev:9", Some("hi"));
        assert_eq!(current.path, "/timers");
        assert_eq!(current.body, Some(json!({"task": "ev:9", "comment": "hi"})));

        let legacy = Routes::new(ApiVersion::Legacy).start_timer_for_task("ev:9", None);
        assert_eq!(legacy.path, "/timer/start_for/ev:9");
        assert_eq!(legacy.body, Some(json!({})));
    }

    #[test]
    fn ids_with_separators_stay_one_segment() {
        let legacy = Routes::new(ApiVersion::Legacy).tasks_for_project("ev:1/../users");
        assert_eq!(legacy.segments, vec!["tasks", "for_project", "ev:1/../users"]);
        assert_eq!(legacy.path, "/tasks/for_project/ev:1%2F..%2Fusers");
    }
}
