//! Business operations over the store traits. Handlers receive these as
//! `web::Data` and never touch a store directly, except the auth flows.

pub mod attendance;
pub mod department;
pub mod employee;
pub mod leave;

use std::sync::Arc;

use actix_web::web;
use sqlx::MySqlPool;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::store::{
    AccountStore, AttendanceStore, DepartmentStore, EmployeeDirectory, LeaveStore,
    MySqlAccountStore, MySqlAttendanceStore, MySqlDepartmentStore, MySqlEmployeeDirectory,
    MySqlLeaveStore,
};

pub use attendance::AttendanceService;
pub use department::DepartmentService;
pub use employee::EmployeeService;
pub use leave::{LeavePolicy, LeaveWorkflow};

/// Application handles, built once at startup and shared by every worker.
#[derive(Clone)]
pub struct Services {
    pub leave: web::Data<LeaveWorkflow>,
    pub employees: web::Data<EmployeeService>,
    pub departments: web::Data<DepartmentService>,
    pub attendance: web::Data<AttendanceService>,
    pub accounts: web::Data<dyn AccountStore>,
}

struct Stores {
    directory: Arc<dyn EmployeeDirectory>,
    leaves: Arc<dyn LeaveStore>,
    attendance: Arc<dyn AttendanceStore>,
    departments: Arc<dyn DepartmentStore>,
    accounts: Arc<dyn AccountStore>,
}

impl Services {
    pub fn from_pool(pool: MySqlPool, config: &Config) -> Self {
        let stores = Stores {
            directory: Arc::new(MySqlEmployeeDirectory::new(pool.clone())),
            leaves: Arc::new(MySqlLeaveStore::new(pool.clone())),
            attendance: Arc::new(MySqlAttendanceStore::new(pool.clone())),
            departments: Arc::new(MySqlDepartmentStore::new(pool.clone())),
            accounts: Arc::new(MySqlAccountStore::new(pool)),
        };
        Self::assemble(stores, Arc::new(SystemClock), LeavePolicy::from_config(config))
    }

    fn assemble(stores: Stores, clock: Arc<dyn Clock>, policy: LeavePolicy) -> Self {
        Self {
            leave: web::Data::new(LeaveWorkflow::new(
                stores.directory.clone(),
                stores.leaves.clone(),
                clock.clone(),
                policy,
            )),
            employees: web::Data::new(EmployeeService::new(
                stores.directory.clone(),
                stores.departments.clone(),
                stores.leaves,
                clock.clone(),
            )),
            departments: web::Data::new(DepartmentService::new(
                stores.departments,
                clock.clone(),
            )),
            attendance: web::Data::new(AttendanceService::new(
                stores.directory,
                stores.attendance,
                clock,
            )),
            accounts: web::Data::from(stores.accounts),
        }
    }

    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.leave.clone())
            .app_data(self.employees.clone())
            .app_data(self.departments.clone())
            .app_data(self.attendance.clone())
            .app_data(self.accounts.clone());
    }
}

#[cfg(test)]
impl Services {
    pub fn in_memory(store: Arc<crate::store::memory::MemoryStore>, clock: Arc<dyn Clock>) -> Self {
        let stores = Stores {
            directory: store.clone(),
            leaves: store.clone(),
            attendance: store.clone(),
            departments: store.clone(),
            accounts: store,
        };
        Self::assemble(stores, clock, LeavePolicy::default())
    }
}
