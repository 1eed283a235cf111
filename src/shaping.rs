//! Conversion of stored records into the shapes the API returns.
//!
//! Everything here is a pure mapping: identifiers are already strings,
//! timestamps are rendered as `YYYY-MM-DD HH:MM:SS`, and flat record lists
//! are grouped into ordered maps for the two project listings.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::{OwnedProject, Project, Trainer};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Group label for projects whose owner has been deleted.
pub const UNKNOWN_TRAINER: &str = "Unknown";

pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerView {
    #[serde(rename = "_id")]
    pub id: String,
    pub trainer_name: String,
    pub created_at: String,
}

impl From<Trainer> for TrainerView {
    fn from(trainer: Trainer) -> Self {
        Self {
            created_at: format_timestamp(&trainer.created_at),
            id: trainer.id,
            trainer_name: trainer.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectView {
    #[serde(rename = "_id")]
    pub id: String,
    pub date: Option<String>,
    pub project_name: Option<String>,
    pub project_details: Option<String>,
    pub remarks: Option<String>,
    pub created_at: String,
}

impl From<Project> for ProjectView {
    fn from(project: Project) -> Self {
        Self {
            created_at: format_timestamp(&project.created_at),
            id: project.id,
            date: project.date,
            project_name: project.name,
            project_details: project.details,
            remarks: project.remarks,
        }
    }
}

pub type GroupedProjects = BTreeMap<String, Vec<ProjectView>>;

/// Admin listing: keyed by the owner's current name.
pub fn group_by_trainer(projects: Vec<OwnedProject>) -> GroupedProjects {
    let mut grouped = GroupedProjects::new();

    for owned in projects {
        let key = owned
            .owner_name
            .unwrap_or_else(|| UNKNOWN_TRAINER.to_string());
        grouped
            .entry(key)
            .or_default()
            .push(ProjectView::from(owned.project));
    }

    grouped
}

/// Trainer listing: keyed by the project's own name. Unnamed projects land
/// under the empty string.
pub fn group_by_project_name(projects: Vec<Project>) -> GroupedProjects {
    let mut grouped = GroupedProjects::new();

    for project in projects {
        let key = project.name.clone().unwrap_or_default();
        grouped
            .entry(key)
            .or_default()
            .push(ProjectView::from(project));
    }

    grouped
}
