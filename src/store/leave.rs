use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Executor, MySql, MySqlPool};
use strum::IntoEnumIterator;

use crate::error::StoreResult;
use crate::model::leave_request::{
    LeaveDecision, LeaveRequest, LeaveStatus, LeaveType, NewLeaveRequest,
};

#[derive(Debug)]
pub enum InsertOutcome {
    Inserted(LeaveRequest),
    /// A pending or approved request of the same employee covers part of the range.
    Overlap,
}

/// Leave request persistence, overlap detection and conditional transitions.
#[async_trait]
pub trait LeaveStore: Send + Sync {
    async fn find(&self, id: u64) -> StoreResult<Option<LeaveRequest>>;

    /// Newest first.
    async fn list_for_employee(&self, employee_id: u64) -> StoreResult<Vec<LeaveRequest>>;

    /// Newest first.
    async fn list_by_status(&self, status: LeaveStatus) -> StoreResult<Vec<LeaveRequest>>;

    /// Oldest first, the order approvers work through them.
    async fn list_pending(&self) -> StoreResult<Vec<LeaveRequest>>;

    async fn list_all(&self) -> StoreResult<Vec<LeaveRequest>>;

    /// Whether a pending or approved request of `employee_id` intersects
    /// `[start, end]`, ignoring `exclude_id`.
    async fn has_overlap(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        exclude_id: Option<u64>,
    ) -> StoreResult<bool>;

    /// Runs the overlap test and the insert as one unit, serialized against
    /// other submissions for the same employee.
    async fn insert_exclusive(&self, new: &NewLeaveRequest) -> StoreResult<InsertOutcome>;

    /// Records an approval or rejection only if the request is still pending.
    /// `None` when no pending request with `id` exists.
    async fn decide(&self, id: u64, decision: &LeaveDecision) -> StoreResult<Option<LeaveRequest>>;

    /// Moves a pending or approved request to cancelled. `false` when the
    /// request is missing or in any other status.
    async fn cancel(&self, id: u64, at: DateTime<Utc>) -> StoreResult<bool>;

    /// Approved day totals per leave type for requests starting in `year`.
    /// Types without approved leave are absent.
    async fn approved_days_in_year(
        &self,
        employee_id: u64,
        year: i32,
    ) -> StoreResult<Vec<(LeaveType, i64)>>;

    /// Whether an approved request of `employee_id` ends on or after `today`.
    async fn has_active_approved(&self, employee_id: u64, today: NaiveDate) -> StoreResult<bool>;
}

const LEAVE_COLUMNS: &str = r#"
    id, employee_id, leave_type, start_date, end_date, reason, status,
    approved_by, approved_at, approval_remarks,
    CAST(DATEDIFF(end_date, start_date) + 1 AS SIGNED) AS total_days,
    created_at, updated_at
"#;

#[derive(Clone)]
pub struct MySqlLeaveStore {
    pool: MySqlPool,
}

impl MySqlLeaveStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn list_where(&self, clause: &str, status: Option<LeaveStatus>) -> StoreResult<Vec<LeaveRequest>> {
        let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests {clause}");
        let mut query = sqlx::query_as::<_, LeaveRequest>(&sql);
        if let Some(status) = status {
            query = query.bind(status.as_ref().to_owned());
        }
        Ok(query.fetch_all(&self.pool).await?)
    }
}

/// Quoted SQL list of the statuses matching `keep`, for `status IN (...)`.
fn status_list(keep: impl Fn(LeaveStatus) -> bool) -> String {
    LeaveStatus::iter()
        .filter(|status| keep(*status))
        .map(|status| format!("'{}'", status.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

async fn count_overlaps<'e, E>(
    executor: E,
    employee_id: u64,
    start: NaiveDate,
    end: NaiveDate,
    exclude_id: Option<u64>,
) -> StoreResult<i64>
where
    E: Executor<'e, Database = MySql>,
{
    let sql = format!(
        r#"
        SELECT COUNT(*)
        FROM leave_requests
        WHERE employee_id = ?
        AND status IN ({})
        AND start_date <= ?
        AND end_date >= ?
        AND (? IS NULL OR id <> ?)
        "#,
        status_list(LeaveStatus::blocks_overlap)
    );
    let count = sqlx::query_scalar::<_, i64>(&sql)
    .bind(employee_id)
    .bind(end)
    .bind(start)
    .bind(exclude_id)
    .bind(exclude_id)
    .fetch_one(executor)
    .await?;

    Ok(count)
}

async fn find_with<'e, E>(executor: E, id: u64) -> StoreResult<Option<LeaveRequest>>
where
    E: Executor<'e, Database = MySql>,
{
    let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = ?");
    let leave = sqlx::query_as::<_, LeaveRequest>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(leave)
}

#[async_trait]
impl LeaveStore for MySqlLeaveStore {
    async fn find(&self, id: u64) -> StoreResult<Option<LeaveRequest>> {
        find_with(&self.pool, id).await
    }

    async fn list_for_employee(&self, employee_id: u64) -> StoreResult<Vec<LeaveRequest>> {
        let sql = format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE employee_id = ? ORDER BY created_at DESC, id DESC"
        );
        let leaves = sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(leaves)
    }

    async fn list_by_status(&self, status: LeaveStatus) -> StoreResult<Vec<LeaveRequest>> {
        self.list_where("WHERE status = ? ORDER BY created_at DESC, id DESC", Some(status))
            .await
    }

    async fn list_pending(&self) -> StoreResult<Vec<LeaveRequest>> {
        self.list_where(
            "WHERE status = ? ORDER BY created_at ASC, id ASC",
            Some(LeaveStatus::Pending),
        )
        .await
    }

    async fn list_all(&self) -> StoreResult<Vec<LeaveRequest>> {
        self.list_where("ORDER BY created_at DESC, id DESC", None).await
    }

    async fn has_overlap(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        exclude_id: Option<u64>,
    ) -> StoreResult<bool> {
        let count = count_overlaps(&self.pool, employee_id, start, end, exclude_id).await?;
        Ok(count > 0)
    }

    async fn insert_exclusive(&self, new: &NewLeaveRequest) -> StoreResult<InsertOutcome> {
        let mut tx = self.pool.begin().await?;

        // Row lock on the employee orders concurrent submissions for them.
        sqlx::query("SELECT id FROM employees WHERE id = ? FOR UPDATE")
            .bind(new.employee_id)
            .fetch_optional(&mut *tx)
            .await?;

        let overlaps =
            count_overlaps(&mut *tx, new.employee_id, new.start_date, new.end_date, None).await?;
        if overlaps > 0 {
            tx.rollback().await?;
            return Ok(InsertOutcome::Overlap);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (employee_id, leave_type, start_date, end_date, reason, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 'pending', ?, ?)
            "#,
        )
        .bind(new.employee_id)
        .bind(new.leave_type.as_ref())
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(&new.reason)
        .bind(new.created_at)
        .bind(new.created_at)
        .execute(&mut *tx)
        .await?;

        let inserted = find_with(&mut *tx, result.last_insert_id())
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        tx.commit().await?;

        Ok(InsertOutcome::Inserted(inserted))
    }

    async fn decide(&self, id: u64, decision: &LeaveDecision) -> StoreResult<Option<LeaveRequest>> {
        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?, approved_by = ?, approved_at = ?, approval_remarks = ?, updated_at = ?
            WHERE id = ?
            AND status = 'pending'
            "#,
        )
        .bind(decision.status.as_ref())
        .bind(decision.approver_id)
        .bind(decision.decided_at)
        .bind(&decision.remarks)
        .bind(decision.decided_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find(id).await
    }

    async fn cancel(&self, id: u64, at: DateTime<Utc>) -> StoreResult<bool> {
        let sql = format!(
            r#"
            UPDATE leave_requests
            SET status = ?, updated_at = ?
            WHERE id = ?
            AND status IN ({})
            "#,
            status_list(|status| status.can_transition_to(LeaveStatus::Cancelled))
        );
        let result = sqlx::query(&sql)
        .bind(LeaveStatus::Cancelled.as_ref())
        .bind(at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn approved_days_in_year(
        &self,
        employee_id: u64,
        year: i32,
    ) -> StoreResult<Vec<(LeaveType, i64)>> {
        let rows = sqlx::query_as::<_, (LeaveType, i64)>(
            r#"
            SELECT leave_type, CAST(SUM(DATEDIFF(end_date, start_date) + 1) AS SIGNED) AS days
            FROM leave_requests
            WHERE employee_id = ?
            AND status = 'approved'
            AND YEAR(start_date) = ?
            GROUP BY leave_type
            "#,
        )
        .bind(employee_id)
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn has_active_approved(&self, employee_id: u64, today: NaiveDate) -> StoreResult<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM leave_requests
            WHERE employee_id = ?
            AND status = 'approved'
            AND end_date >= ?
            "#,
        )
        .bind(employee_id)
        .bind(today)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_db::TestDb;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn request(employee_id: u64, leave_type: LeaveType, start: &str, end: &str) -> NewLeaveRequest {
        NewLeaveRequest {
            employee_id,
            leave_type,
            start_date: d(start),
            end_date: d(end),
            reason: "Family visit out of town".into(),
            created_at: Utc::now(),
        }
    }

    fn inserted(outcome: InsertOutcome) -> LeaveRequest {
        match outcome {
            InsertOutcome::Inserted(leave) => leave,
            InsertOutcome::Overlap => panic!("expected an insert, got an overlap"),
        }
    }

    #[test]
    fn status_lists_follow_the_transition_rules() {
        assert_eq!(status_list(LeaveStatus::blocks_overlap), "'pending', 'approved'");
        assert_eq!(
            status_list(|s| s.can_transition_to(LeaveStatus::Cancelled)),
            "'pending', 'approved'"
        );
    }

    #[actix_web::test]
    #[ignore = "needs DATABASE_URL pointing at a MySQL server"]
    async fn mysql_insert_is_exclusive_and_overlap_honours_exclusion() {
        let db = TestDb::create().await;
        let taxonomy = db.seed_taxonomy().await;
        let ann = db.seed_employee(taxonomy, "EMP-0001", "Ann").await;
        let store = MySqlLeaveStore::new(db.pool.clone());

        let first = inserted(
            store
                .insert_exclusive(&request(ann, LeaveType::Annual, "2030-07-05", "2030-07-07"))
                .await
                .unwrap(),
        );
        assert_eq!(first.status, LeaveStatus::Pending);
        assert_eq!(first.total_days, 3);

        let second = store
            .insert_exclusive(&request(ann, LeaveType::Sick, "2030-07-07", "2030-07-08"))
            .await
            .unwrap();
        assert!(matches!(second, InsertOutcome::Overlap));

        assert!(store.has_overlap(ann, d("2030-07-07"), d("2030-07-08"), None).await.unwrap());
        assert!(!store
            .has_overlap(ann, d("2030-07-07"), d("2030-07-08"), Some(first.id))
            .await
            .unwrap());
        assert!(!store.has_overlap(ann, d("2030-07-08"), d("2030-07-09"), None).await.unwrap());

        assert_eq!(store.list_for_employee(ann).await.unwrap().len(), 1);
        db.drop().await;
    }

    #[actix_web::test]
    #[ignore = "needs DATABASE_URL pointing at a MySQL server"]
    async fn mysql_decide_and_cancel_are_conditional() {
        let db = TestDb::create().await;
        let taxonomy = db.seed_taxonomy().await;
        let ann = db.seed_employee(taxonomy, "EMP-0001", "Ann").await;
        let mona = db.seed_employee(taxonomy, "EMP-0002", "Mona").await;
        let store = MySqlLeaveStore::new(db.pool.clone());

        let leave = inserted(
            store
                .insert_exclusive(&request(ann, LeaveType::Annual, "2030-03-10", "2030-03-12"))
                .await
                .unwrap(),
        );
        assert_eq!(store.list_pending().await.unwrap().len(), 1);

        let approval = LeaveDecision {
            status: LeaveStatus::Approved,
            approver_id: mona,
            decided_at: Utc::now(),
            remarks: Some("Enjoy".into()),
        };
        let approved = store.decide(leave.id, &approval).await.unwrap().unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(approved.approved_by, Some(mona));

        let rejection = LeaveDecision {
            status: LeaveStatus::Rejected,
            ..approval
        };
        assert!(store.decide(leave.id, &rejection).await.unwrap().is_none());

        assert_eq!(
            store.approved_days_in_year(ann, 2030).await.unwrap(),
            vec![(LeaveType::Annual, 3)]
        );
        assert!(store.approved_days_in_year(ann, 2029).await.unwrap().is_empty());
        assert!(store.has_active_approved(ann, d("2030-03-12")).await.unwrap());

        assert!(store.cancel(leave.id, Utc::now()).await.unwrap());
        assert!(!store.cancel(leave.id, Utc::now()).await.unwrap());
        assert!(!store.cancel(leave.id + 100, Utc::now()).await.unwrap());

        let cancelled = store.list_by_status(LeaveStatus::Cancelled).await.unwrap();
        assert_eq!(cancelled.len(), 1);
        assert_eq!(store.list_all().await.unwrap().len(), 1);
        assert!(store.list_pending().await.unwrap().is_empty());
        db.drop().await;
    }

    #[actix_web::test]
    #[ignore = "needs DATABASE_URL pointing at a MySQL server"]
    async fn mysql_concurrent_overlapping_inserts_keep_one() {
        let db = TestDb::create().await;
        let taxonomy = db.seed_taxonomy().await;
        let ann = db.seed_employee(taxonomy, "EMP-0001", "Ann").await;
        let store = MySqlLeaveStore::new(db.pool.clone());

        let a = request(ann, LeaveType::Annual, "2030-09-01", "2030-09-05");
        let b = request(ann, LeaveType::Casual, "2030-09-04", "2030-09-06");
        let (first, second) = futures::join!(store.insert_exclusive(&a), store.insert_exclusive(&b));

        let inserted = [first.unwrap(), second.unwrap()]
            .into_iter()
            .filter(|outcome| matches!(outcome, InsertOutcome::Inserted(_)))
            .count();
        assert_eq!(inserted, 1);
        assert_eq!(store.list_for_employee(ann).await.unwrap().len(), 1);
        db.drop().await;
    }
}
