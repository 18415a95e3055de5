use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySqlPool};

use crate::error::StoreResult;
use crate::model::department::{Department, DepartmentInput, DepartmentWithCount};
use crate::model::designation::{Designation, DesignationInput};

/// Department and designation taxonomy.
#[async_trait]
pub trait DepartmentStore: Send + Sync {
    async fn find(&self, id: u64) -> StoreResult<Option<Department>>;

    async fn list_with_counts(&self) -> StoreResult<Vec<DepartmentWithCount>>;

    async fn list_active(&self) -> StoreResult<Vec<Department>>;

    async fn insert(&self, input: &DepartmentInput, at: DateTime<Utc>) -> StoreResult<Department>;

    async fn update(
        &self,
        id: u64,
        input: &DepartmentInput,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Department>>;

    async fn delete(&self, id: u64) -> StoreResult<bool>;

    async fn find_designation(&self, id: u64) -> StoreResult<Option<Designation>>;

    async fn list_designations(&self) -> StoreResult<Vec<Designation>>;

    async fn insert_designation(
        &self,
        input: &DesignationInput,
        at: DateTime<Utc>,
    ) -> StoreResult<Designation>;
}

const DEPARTMENT_COLUMNS: &str =
    "d.id, d.name, d.code, d.description, d.head_employee_id, d.location, d.is_active, d.created_at, d.updated_at";

const DESIGNATION_COLUMNS: &str =
    "id, title, code, description, level, min_salary, max_salary, is_active, created_at, updated_at";

#[derive(FromRow)]
struct DepartmentCountRow {
    #[sqlx(flatten)]
    department: Department,
    employee_count: i64,
}

#[derive(Clone)]
pub struct MySqlDepartmentStore {
    pool: MySqlPool,
}

impl MySqlDepartmentStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DepartmentStore for MySqlDepartmentStore {
    async fn find(&self, id: u64) -> StoreResult<Option<Department>> {
        let sql = format!("SELECT {DEPARTMENT_COLUMNS} FROM departments d WHERE d.id = ?");
        let department = sqlx::query_as::<_, Department>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(department)
    }

    async fn list_with_counts(&self) -> StoreResult<Vec<DepartmentWithCount>> {
        let sql = format!(
            r#"
            SELECT {DEPARTMENT_COLUMNS}, COUNT(e.id) AS employee_count
            FROM departments d
            LEFT JOIN employees e ON e.department_id = d.id
            GROUP BY d.id
            ORDER BY d.name
            "#
        );
        let rows = sqlx::query_as::<_, DepartmentCountRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| DepartmentWithCount {
                department: row.department,
                employee_count: row.employee_count,
            })
            .collect())
    }

    async fn list_active(&self) -> StoreResult<Vec<Department>> {
        let sql = format!(
            "SELECT {DEPARTMENT_COLUMNS} FROM departments d WHERE d.is_active = TRUE ORDER BY d.name"
        );
        Ok(sqlx::query_as::<_, Department>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert(&self, input: &DepartmentInput, at: DateTime<Utc>) -> StoreResult<Department> {
        let result = sqlx::query(
            r#"
            INSERT INTO departments
                (name, code, description, head_employee_id, location, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.description)
        .bind(input.head_employee_id)
        .bind(&input.location)
        .bind(input.is_active)
        .bind(at)
        .bind(at)
        .execute(&self.pool)
        .await?;

        self.find(result.last_insert_id())
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound.into())
    }

    async fn update(
        &self,
        id: u64,
        input: &DepartmentInput,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Department>> {
        let result = sqlx::query(
            r#"
            UPDATE departments
            SET name = ?, code = ?, description = ?, head_employee_id = ?, location = ?,
                is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.description)
        .bind(input.head_employee_id)
        .bind(&input.location)
        .bind(input.is_active)
        .bind(at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find(id).await
    }

    async fn delete(&self, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM departments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_designation(&self, id: u64) -> StoreResult<Option<Designation>> {
        let sql = format!("SELECT {DESIGNATION_COLUMNS} FROM designations WHERE id = ?");
        Ok(sqlx::query_as::<_, Designation>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_designations(&self) -> StoreResult<Vec<Designation>> {
        let sql = format!("SELECT {DESIGNATION_COLUMNS} FROM designations ORDER BY level, title");
        Ok(sqlx::query_as::<_, Designation>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert_designation(
        &self,
        input: &DesignationInput,
        at: DateTime<Utc>,
    ) -> StoreResult<Designation> {
        let result = sqlx::query(
            r#"
            INSERT INTO designations
                (title, code, description, level, min_salary, max_salary, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.title)
        .bind(&input.code)
        .bind(&input.description)
        .bind(input.level)
        .bind(input.min_salary)
        .bind(input.max_salary)
        .bind(input.is_active)
        .bind(at)
        .bind(at)
        .execute(&self.pool)
        .await?;

        self.find_designation(result.last_insert_id())
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound.into())
    }
}
