//! Persistence seams. Each collaborator is an async trait with a MySQL
//! implementation; services receive them as `Arc<dyn …>` handles.

pub mod account;
pub mod attendance;
pub mod department;
pub mod employee;
pub mod leave;

#[cfg(test)]
pub mod memory;
#[cfg(test)]
pub(crate) mod test_db;

pub use account::{AccountStore, MySqlAccountStore};
pub use attendance::{AttendanceStore, MySqlAttendanceStore};
pub use department::{DepartmentStore, MySqlDepartmentStore};
pub use employee::{EmployeeDirectory, MySqlEmployeeDirectory};
pub use leave::{InsertOutcome, LeaveStore, MySqlLeaveStore};

/// Typed bind values for dynamically assembled WHERE clauses.
pub(crate) enum FilterValue {
    U64(u64),
    Str(String),
}
