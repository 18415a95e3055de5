use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin = 1,
    HrManager = 2,
    Manager = 3,
    Employee = 4,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::HrManager),
            3 => Some(Role::Manager),
            4 => Some(Role::Employee),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Roles allowed to approve or reject leave.
    pub fn can_approve(self) -> bool {
        matches!(self, Role::Admin | Role::HrManager | Role::Manager)
    }
}
