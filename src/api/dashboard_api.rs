// ==========================================
// Campus Records - dashboard API
// ==========================================
// Aggregated landing-page data: entity counts and
// the recent-activity feed, each entry styled by
// its category.
// ==========================================

use std::sync::Arc;

use serde::Serialize;

use crate::api::error::ApiResult;
use crate::config::ConfigManager;
use crate::repository::{
    ActivityRepository, CourseRepository, FacilitatorRepository, ProgramRepository,
    StudentRepository,
};

/// One feed entry with its display styling resolved.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityView {
    pub categ: String,
    pub title: Option<String>,
    pub detail: String,
    pub color: String,
    pub icon: String,
    pub created_at: String,
}

/// Everything the landing page renders.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub students: i64,
    pub courses: i64,
    pub programs: i64,
    pub facilitators: i64,
    pub recent_activities: Vec<ActivityView>,
}

pub struct DashboardApi {
    student_repo: Arc<StudentRepository>,
    course_repo: Arc<CourseRepository>,
    program_repo: Arc<ProgramRepository>,
    facilitator_repo: Arc<FacilitatorRepository>,
    activity_repo: Arc<ActivityRepository>,
    config: Arc<ConfigManager>,
}

impl DashboardApi {
    pub fn new(
        student_repo: Arc<StudentRepository>,
        course_repo: Arc<CourseRepository>,
        program_repo: Arc<ProgramRepository>,
        facilitator_repo: Arc<FacilitatorRepository>,
        activity_repo: Arc<ActivityRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            student_repo,
            course_repo,
            program_repo,
            facilitator_repo,
            activity_repo,
            config,
        }
    }

    pub fn summary(&self) -> ApiResult<DashboardSummary> {
        let limit = self.config.recent_activities_limit()?;

        let recent_activities = self
            .activity_repo
            .find_recent(limit)?
            .into_iter()
            .map(|activity| {
                // Unknown categories render with the student style.
                let style = activity.category().style();
                ActivityView {
                    categ: activity.categ,
                    title: activity.title,
                    detail: activity.detail,
                    color: style.color.to_string(),
                    icon: style.icon.to_string(),
                    created_at: activity.created_at.to_rfc3339(),
                }
            })
            .collect();

        Ok(DashboardSummary {
            students: self.student_repo.count()?,
            courses: self.course_repo.count()?,
            programs: self.program_repo.count()?,
            facilitators: self.facilitator_repo.count()?,
            recent_activities,
        })
    }
}
