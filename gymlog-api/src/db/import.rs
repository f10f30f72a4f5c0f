//! Writes parsed TSV plan groups
//!
//! Names are resolved first and every failure is collected; nothing is
//! written unless the whole file resolves. The caller owns the transaction.

use super::calendar::upsert_entry;
use super::exercises::find_exercise_by_name;
use super::plans::{insert_plan, insert_plan_link};
use super::templates::find_template_by_name;
use crate::tsv::{ImportError, PlanGroup};
use chrono::NaiveDate;
use gymlog_common::Result;
use serde::Serialize;
use sqlx::SqliteConnection;
use std::collections::HashMap;
use tracing::debug;

/// One plan created by an import
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImportedPlan {
    pub id: i64,
    pub name: String,
    pub template_id: i64,
    pub planned_for: NaiveDate,
    pub exercise_count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImportSummary {
    pub plans_created: usize,
    pub rows_imported: usize,
    pub plans: Vec<ImportedPlan>,
}

/// Result of an import attempt that reached the database
#[derive(Debug)]
pub enum ImportOutcome {
    Imported(ImportSummary),
    Rejected(Vec<ImportError>),
}

struct ResolvedGroup<'a> {
    group: &'a PlanGroup,
    template_id: i64,
    template_name: String,
    exercise_ids: Vec<i64>,
}

/// Imported plans are named after the stored template, e.g. `Push 2024-06-03`
pub fn plan_name(template_name: &str, date: NaiveDate) -> String {
    format!("{} {}", template_name, date)
}

/// Resolve names, then write plans, links and calendar rows
///
/// Lookup caches fold ASCII case only, matching `COLLATE NOCASE`.
pub async fn import_plans(
    conn: &mut SqliteConnection,
    groups: &[PlanGroup],
) -> Result<ImportOutcome> {
    let mut templates: HashMap<String, Option<(i64, String)>> = HashMap::new();
    let mut exercise_ids: HashMap<String, Option<i64>> = HashMap::new();
    let mut errors = Vec::new();
    let mut resolved = Vec::with_capacity(groups.len());

    for group in groups {
        let key = group.template.to_ascii_lowercase();
        let template = match templates.get(&key) {
            Some(found) => found.clone(),
            None => {
                let found = find_template_by_name(&mut *conn, &group.template)
                    .await?
                    .map(|t| (t.id, t.name));
                templates.insert(key, found.clone());
                found
            }
        };
        if template.is_none() {
            errors.push(ImportError::new(
                group.rows[0].line,
                format!("unknown workout '{}'", group.template),
            ));
        }

        let mut ids = Vec::with_capacity(group.rows.len());
        for row in &group.rows {
            let key = row.exercise.to_ascii_lowercase();
            let exercise_id = match exercise_ids.get(&key) {
                Some(id) => *id,
                None => {
                    let id = find_exercise_by_name(&mut *conn, &row.exercise)
                        .await?
                        .map(|e| e.id);
                    exercise_ids.insert(key, id);
                    id
                }
            };
            match exercise_id {
                Some(id) => ids.push(id),
                None => errors.push(ImportError::new(
                    row.line,
                    format!("unknown exercise '{}'", row.exercise),
                )),
            }
        }

        if let Some((template_id, template_name)) = template {
            resolved.push(ResolvedGroup {
                group,
                template_id,
                template_name,
                exercise_ids: ids,
            });
        }
    }

    if !errors.is_empty() {
        errors.sort_by_key(|e| e.line);
        return Ok(ImportOutcome::Rejected(errors));
    }

    let mut plans = Vec::with_capacity(resolved.len());
    let mut rows_imported = 0;

    for item in resolved {
        let date = item.group.date;
        let name = plan_name(&item.template_name, date);
        let plan = insert_plan(&mut *conn, item.template_id, &name, Some(date), None).await?;

        for ((sort_order, row), exercise_id) in
            (1_i64..).zip(&item.group.rows).zip(&item.exercise_ids)
        {
            insert_plan_link(
                &mut *conn,
                plan.id,
                *exercise_id,
                sort_order,
                row.sets,
                row.reps,
                row.weight,
            )
            .await?;
        }

        upsert_entry(&mut *conn, date, plan.id, None).await?;

        debug!("Imported plan {} '{}' for {}", plan.id, plan.name, date);
        rows_imported += item.group.rows.len();
        plans.push(ImportedPlan {
            id: plan.id,
            name: plan.name,
            template_id: item.template_id,
            planned_for: date,
            exercise_count: item.group.rows.len(),
        });
    }

    Ok(ImportOutcome::Imported(ImportSummary {
        plans_created: plans.len(),
        rows_imported,
        plans,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::exercises::insert_exercise;
    use crate::db::templates::insert_template;
    use crate::tsv::TsvRow;

    fn row(line: usize, exercise: &str) -> TsvRow {
        TsvRow {
            line,
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            template: "push".to_string(),
            exercise: exercise.to_string(),
            sets: 3,
            reps: 10,
            weight: None,
        }
    }

    #[tokio::test]
    async fn test_name_cache_folds_ascii_only() {
        let pool = gymlog_common::db::init_memory_database().await.unwrap();
        insert_template(&pool, "Push", None).await.unwrap();
        insert_exercise(&pool, "Élan Press", None, None).await.unwrap();

        let group = PlanGroup {
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            template: "push".to_string(),
            rows: vec![row(2, "ÉLAN PRESS"), row(3, "élan press")],
        };

        let mut conn = pool.acquire().await.unwrap();
        let outcome = import_plans(&mut conn, &[group]).await.unwrap();

        // "ÉLAN PRESS" matches under NOCASE; "élan press" differs in a non-ASCII letter
        match outcome {
            ImportOutcome::Rejected(errors) => {
                assert_eq!(errors, vec![ImportError::new(3, "unknown exercise 'élan press'")]);
            }
            ImportOutcome::Imported(summary) => panic!("expected rejection, got {:?}", summary),
        }
    }

    #[tokio::test]
    async fn test_imported_plan_uses_stored_template_name() {
        let pool = gymlog_common::db::init_memory_database().await.unwrap();
        insert_template(&pool, "Push", None).await.unwrap();
        insert_exercise(&pool, "Dips", None, None).await.unwrap();

        let group = PlanGroup {
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            template: "push".to_string(),
            rows: vec![row(1, "dips")],
        };

        let mut conn = pool.acquire().await.unwrap();
        match import_plans(&mut conn, &[group]).await.unwrap() {
            ImportOutcome::Imported(summary) => {
                assert_eq!(summary.plans_created, 1);
                assert_eq!(summary.plans[0].name, "Push 2024-06-03");
            }
            ImportOutcome::Rejected(errors) => panic!("unexpected errors: {:?}", errors),
        }
    }
}
