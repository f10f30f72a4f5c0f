//! Database models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub muscle_group: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkoutTemplate {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

/// Template row with its link count, for list views
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TemplateSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub exercise_count: i64,
}

/// One `workout_template_exercises` link joined with the exercise name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct TemplateExercise {
    pub exercise_id: i64,
    pub name: String,
    pub sort_order: i64,
    pub target_sets: i64,
    pub target_reps: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkoutPlan {
    pub id: i64,
    pub template_id: i64,
    pub name: String,
    pub planned_for: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Plan row with template name and link count, for list views
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlanSummary {
    pub id: i64,
    pub template_id: i64,
    pub template_name: String,
    pub name: String,
    pub planned_for: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: String,
    pub exercise_count: i64,
}

/// One `workout_plan_exercises` link joined with the exercise name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct PlanExercise {
    pub exercise_id: i64,
    pub name: String,
    pub sort_order: i64,
    pub target_sets: i64,
    pub target_reps: i64,
    pub target_weight: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkoutSession {
    pub id: i64,
    pub template_id: Option<i64>,
    pub plan_id: Option<i64>,
    pub performed_on: NaiveDate,
    pub notes: Option<String>,
    pub completed: bool,
    pub created_at: String,
}

/// Session row with source names and set count, for history views
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionSummary {
    pub id: i64,
    pub template_id: Option<i64>,
    pub template_name: Option<String>,
    pub plan_id: Option<i64>,
    pub plan_name: Option<String>,
    pub performed_on: NaiveDate,
    pub notes: Option<String>,
    pub completed: bool,
    pub set_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct ExerciseSet {
    pub id: i64,
    pub session_id: i64,
    pub exercise_id: i64,
    pub set_number: i64,
    pub reps: i64,
    pub weight: Option<f64>,
    pub created_at: String,
}

/// `workout_calendar` row joined with its plan and template
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CalendarEntry {
    pub date: NaiveDate,
    pub plan_id: i64,
    pub plan_name: String,
    pub template_name: String,
    pub notes: Option<String>,
}
