//! Scratch MySQL databases for store tests. `DATABASE_URL` must point at a
//! server where the user may create and drop databases.

use std::str::FromStr;

use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::MySqlPool;

const SCHEMA: &str = include_str!("../../db/schema.sql");

pub struct TestDb {
    pub pool: MySqlPool,
    admin: MySqlPool,
    name: String,
}

impl TestDb {
    /// Creates a uniquely named database and loads `db/schema.sql` into it.
    pub async fn create() -> Self {
        let _ = dotenvy::dotenv();
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for MySQL tests");

        let admin = MySqlPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .expect("Failed to connect to MySQL");

        let name = format!("portal_test_{}", uuid::Uuid::new_v4().to_simple());
        sqlx::query(&format!("CREATE DATABASE `{name}`"))
            .execute(&admin)
            .await
            .expect("Failed to create test database");

        let options = MySqlConnectOptions::from_str(&url)
            .expect("Invalid DATABASE_URL")
            .database(&name);
        let pool = MySqlPoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .expect("Failed to connect to test database");

        let schema: String = SCHEMA
            .lines()
            .filter(|line| !line.trim_start().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        for statement in schema.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .unwrap_or_else(|e| panic!("Failed to apply schema statement: {e}\n{statement}"));
        }

        Self { pool, admin, name }
    }

    /// Inserts the department and designation every seeded employee uses.
    pub async fn seed_taxonomy(&self) -> (u64, u64) {
        let department = sqlx::query("INSERT INTO departments (name) VALUES ('Engineering')")
            .execute(&self.pool)
            .await
            .expect("Failed to seed department")
            .last_insert_id();
        let designation = sqlx::query("INSERT INTO designations (title, level) VALUES ('Engineer', 1)")
            .execute(&self.pool)
            .await
            .expect("Failed to seed designation")
            .last_insert_id();
        (department, designation)
    }

    pub async fn seed_employee(&self, taxonomy: (u64, u64), code: &str, first_name: &str) -> u64 {
        let (department, designation) = taxonomy;
        sqlx::query(
            r#"
            INSERT INTO employees
                (employee_code, first_name, last_name, email, department_id, designation_id, hire_date)
            VALUES (?, ?, 'Tester', ?, ?, ?, '2025-01-01')
            "#,
        )
        .bind(code)
        .bind(first_name)
        .bind(format!("{}@example.com", code.to_lowercase()))
        .bind(department)
        .bind(designation)
        .execute(&self.pool)
        .await
        .expect("Failed to seed employee")
        .last_insert_id()
    }

    pub async fn drop(self) {
        self.pool.close().await;
        sqlx::query(&format!("DROP DATABASE `{}`", self.name))
            .execute(&self.admin)
            .await
            .expect("Failed to drop test database");
    }
}
