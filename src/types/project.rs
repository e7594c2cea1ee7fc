//! Projects under test.

use super::{ProjectId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A project registered in the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub repository_link: String,
    pub tech_stack: Vec<String>,
    /// Free-text owner, not a user reference.
    pub owner: String,
    pub assigned_testers: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_scanned: Option<DateTime<Utc>>,
}

/// Caller-supplied fields for a new project. Id and creation time are
/// assigned by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub repository_link: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub assigned_testers: Vec<UserId>,
}

impl NewProject {
    /// Start a new project description with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_repository(mut self, link: impl Into<String>) -> Self {
        self.repository_link = link.into();
        self
    }

    pub fn with_tech_stack<I, S>(mut self, stack: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tech_stack = stack.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    pub fn with_testers(mut self, testers: Vec<UserId>) -> Self {
        self.assigned_testers = testers;
        self
    }

    /// Materialize into a stored record.
    pub(crate) fn into_project(self) -> Project {
        Project {
            id: ProjectId::generate(),
            name: self.name,
            description: self.description,
            repository_link: self.repository_link,
            tech_stack: self.tech_stack,
            owner: self.owner,
            assigned_testers: self.assigned_testers,
            created_at: Utc::now(),
            last_scanned: None,
        }
    }
}

/// Shallow update for a project. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub repository_link: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub owner: Option<String>,
    pub assigned_testers: Option<Vec<UserId>>,
    pub last_scanned: Option<DateTime<Utc>>,
}

impl ProjectPatch {
    /// Merge the provided fields into `project`.
    pub fn apply(self, project: &mut Project) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
        if let Some(link) = self.repository_link {
            project.repository_link = link;
        }
        if let Some(stack) = self.tech_stack {
            project.tech_stack = stack;
        }
        if let Some(owner) = self.owner {
            project.owner = owner;
        }
        if let Some(testers) = self.assigned_testers {
            project.assigned_testers = testers;
        }
        if let Some(at) = self.last_scanned {
            project.last_scanned = Some(at);
        }
    }

    /// Patch that only stamps `lastScanned`.
    pub fn scanned_at(at: DateTime<Utc>) -> Self {
        Self {
            last_scanned: Some(at),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_gets_id_and_timestamp() {
        let before = Utc::now();
        let project = NewProject::named("P1")
            .with_tech_stack(["rust", "postgres"])
            .into_project();
        assert!(project.id.as_str().starts_with("project-"));
        assert!(project.created_at >= before);
        assert_eq!(project.tech_stack, vec!["rust", "postgres"]);
        assert!(project.last_scanned.is_none());
    }

    #[test]
    fn test_patch_only_touches_given_fields() {
        let mut project = NewProject::named("P1").with_owner("team-a").into_project();
        let original = project.clone();

        ProjectPatch {
            description: Some("updated".into()),
            ..Default::default()
        }
        .apply(&mut project);

        assert_eq!(project.description, "updated");
        assert_eq!(project.name, original.name);
        assert_eq!(project.owner, original.owner);
        assert_eq!(project.created_at, original.created_at);
    }

    #[test]
    fn test_last_scanned_omitted_when_absent() {
        let project = NewProject::named("P1").into_project();
        let json = serde_json::to_value(&project).unwrap();
        assert!(json.get("lastScanned").is_none());
        assert!(json.get("repositoryLink").is_some());
    }
}
