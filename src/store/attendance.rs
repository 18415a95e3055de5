use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::MySqlPool;

use crate::error::{StoreError, StoreResult};
use crate::model::attendance::{Attendance, AttendanceEntry, AttendanceStatus};

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Inserts or overwrites the record for `(employee_id, date)`.
    async fn upsert(&self, entry: &AttendanceEntry) -> StoreResult<Attendance>;

    /// Opens today's record. `None` when one already exists.
    async fn check_in(
        &self,
        employee_id: u64,
        date: NaiveDate,
        time: NaiveTime,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Attendance>>;

    /// Closes an open record. `None` when there is nothing to close.
    async fn check_out(
        &self,
        employee_id: u64,
        date: NaiveDate,
        time: NaiveTime,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Attendance>>;

    /// Newest first, optionally limited to an inclusive date range.
    async fn list(
        &self,
        employee_id: u64,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> StoreResult<Vec<Attendance>>;

    /// Record counts per status within `[start, end]`. Unused statuses are absent.
    async fn count_by_status(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<(AttendanceStatus, i64)>>;
}

const ATTENDANCE_COLUMNS: &str =
    "id, employee_id, date, check_in, check_out, status, remarks, created_at, updated_at";

#[derive(Clone)]
pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn find_day(&self, employee_id: u64, date: NaiveDate) -> StoreResult<Option<Attendance>> {
        let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE employee_id = ? AND date = ?");
        let record = sqlx::query_as::<_, Attendance>(&sql)
            .bind(employee_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }
}

#[async_trait]
impl AttendanceStore for MySqlAttendanceStore {
    async fn upsert(&self, entry: &AttendanceEntry) -> StoreResult<Attendance> {
        sqlx::query(
            r#"
            INSERT INTO attendance
                (employee_id, date, check_in, check_out, status, remarks, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                check_in = VALUES(check_in),
                check_out = VALUES(check_out),
                status = VALUES(status),
                remarks = VALUES(remarks),
                updated_at = VALUES(updated_at)
            "#,
        )
        .bind(entry.employee_id)
        .bind(entry.date)
        .bind(entry.check_in)
        .bind(entry.check_out)
        .bind(entry.status.as_ref())
        .bind(&entry.remarks)
        .bind(entry.recorded_at)
        .bind(entry.recorded_at)
        .execute(&self.pool)
        .await?;

        self.find_day(entry.employee_id, entry.date)
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound.into())
    }

    async fn check_in(
        &self,
        employee_id: u64,
        date: NaiveDate,
        time: NaiveTime,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Attendance>> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (employee_id, date, check_in, status, created_at, updated_at)
            VALUES (?, ?, ?, 'present', ?, ?)
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .bind(time)
        .bind(at)
        .bind(at)
        .execute(&self.pool)
        .await;

        match result.map_err(StoreError::from) {
            Ok(_) => self.find_day(employee_id, date).await,
            // Unique (employee_id, date): already checked in
            Err(StoreError::Constraint(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn check_out(
        &self,
        employee_id: u64,
        date: NaiveDate,
        time: NaiveTime,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Attendance>> {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET check_out = ?, updated_at = ?
            WHERE employee_id = ?
            AND date = ?
            AND check_in IS NOT NULL
            AND check_out IS NULL
            "#,
        )
        .bind(time)
        .bind(at)
        .bind(employee_id)
        .bind(date)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_day(employee_id, date).await
    }

    async fn list(
        &self,
        employee_id: u64,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> StoreResult<Vec<Attendance>> {
        let records = match range {
            Some((start, end)) => {
                let sql = format!(
                    "SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE employee_id = ? AND date BETWEEN ? AND ? ORDER BY date DESC"
                );
                sqlx::query_as::<_, Attendance>(&sql)
                    .bind(employee_id)
                    .bind(start)
                    .bind(end)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE employee_id = ? ORDER BY date DESC"
                );
                sqlx::query_as::<_, Attendance>(&sql)
                    .bind(employee_id)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(records)
    }

    async fn count_by_status(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<(AttendanceStatus, i64)>> {
        let rows = sqlx::query_as::<_, (AttendanceStatus, i64)>(
            r#"
            SELECT status, COUNT(*) AS total
            FROM attendance
            WHERE employee_id = ?
            AND date BETWEEN ? AND ?
            GROUP BY status
            "#,
        )
        .bind(employee_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
