use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;
use tracing::debug;

use super::FilterValue;
use crate::error::StoreResult;
use crate::model::employee::{
    Employee, EmployeeFilter, EmployeeProfile, EmployeeStatus, NewEmployee,
};

/// Employee identity, status and manager hierarchy.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn find(&self, id: u64) -> StoreResult<Option<Employee>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Employee>>;

    async fn find_by_code(&self, code: &str) -> StoreResult<Option<Employee>>;

    /// Most recently issued employee code, if any.
    async fn last_code(&self) -> StoreResult<Option<String>>;

    async fn list(&self, filter: &EmployeeFilter) -> StoreResult<Vec<Employee>>;

    async fn subordinates(&self, manager_id: u64) -> StoreResult<Vec<Employee>>;

    async fn insert(&self, new: &NewEmployee) -> StoreResult<Employee>;

    async fn update(
        &self,
        id: u64,
        profile: &EmployeeProfile,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Employee>>;

    async fn set_status(
        &self,
        id: u64,
        status: EmployeeStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Employee>>;

    async fn delete(&self, id: u64) -> StoreResult<bool>;
}

const EMPLOYEE_COLUMNS: &str = r#"
    id, employee_code, first_name, middle_name, last_name, email, phone,
    department_id, designation_id, hire_date, end_date, status, manager_id,
    created_at, updated_at
"#;

#[derive(Clone)]
pub struct MySqlEmployeeDirectory {
    pool: MySqlPool,
}

impl MySqlEmployeeDirectory {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeDirectory for MySqlEmployeeDirectory {
    async fn find(&self, id: u64) -> StoreResult<Option<Employee>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?");
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Employee>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE email = ?");
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }

    async fn find_by_code(&self, code: &str) -> StoreResult<Option<Employee>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE employee_code = ?");
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }

    async fn last_code(&self) -> StoreResult<Option<String>> {
        let code = sqlx::query_scalar::<_, String>(
            "SELECT employee_code FROM employees ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(code)
    }

    async fn list(&self, filter: &EmployeeFilter) -> StoreResult<Vec<Employee>> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            where_sql.push_str(
                " AND (employee_code LIKE ? OR first_name LIKE ? OR last_name LIKE ? OR email LIKE ?)",
            );
            let like = format!("%{}%", search);
            for _ in 0..4 {
                args.push(FilterValue::Str(like.clone()));
            }
        }

        if let Some(department_id) = filter.department_id {
            where_sql.push_str(" AND department_id = ?");
            args.push(FilterValue::U64(department_id));
        }

        if let Some(status) = filter.status {
            where_sql.push_str(" AND status = ?");
            args.push(FilterValue::Str(status.as_ref().to_string()));
        }

        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees{where_sql} ORDER BY employee_code");
        debug!(sql = %sql, "Listing employees");

        let mut query = sqlx::query_as::<_, Employee>(&sql);
        for arg in args {
            query = match arg {
                FilterValue::U64(v) => query.bind(v),
                FilterValue::Str(s) => query.bind(s),
            };
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn subordinates(&self, manager_id: u64) -> StoreResult<Vec<Employee>> {
        let sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE manager_id = ? ORDER BY first_name"
        );
        let employees = sqlx::query_as::<_, Employee>(&sql)
            .bind(manager_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(employees)
    }

    async fn insert(&self, new: &NewEmployee) -> StoreResult<Employee> {
        let profile = &new.profile;
        let result = sqlx::query(
            r#"
            INSERT INTO employees
                (employee_code, first_name, middle_name, last_name, email, phone,
                 department_id, designation_id, hire_date, end_date, status, manager_id,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.employee_code)
        .bind(&profile.first_name)
        .bind(&profile.middle_name)
        .bind(&profile.last_name)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(profile.department_id)
        .bind(profile.designation_id)
        .bind(profile.hire_date)
        .bind(profile.end_date)
        .bind(new.status.as_ref())
        .bind(profile.manager_id)
        .bind(new.created_at)
        .bind(new.created_at)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id();
        self.find(id)
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound.into())
    }

    async fn update(
        &self,
        id: u64,
        profile: &EmployeeProfile,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Employee>> {
        let result = sqlx::query(
            r#"
            UPDATE employees
            SET first_name = ?, middle_name = ?, last_name = ?, email = ?, phone = ?,
                department_id = ?, designation_id = ?, hire_date = ?, end_date = ?,
                manager_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&profile.first_name)
        .bind(&profile.middle_name)
        .bind(&profile.last_name)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(profile.department_id)
        .bind(profile.designation_id)
        .bind(profile.hire_date)
        .bind(profile.end_date)
        .bind(profile.manager_id)
        .bind(at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find(id).await
    }

    async fn set_status(
        &self,
        id: u64,
        status: EmployeeStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Employee>> {
        let result = sqlx::query("UPDATE employees SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_ref())
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
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
