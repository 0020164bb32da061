use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::role::Role;

/// Directory entry for a registered employee.
#[derive(Debug, Clone, PartialEq)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub position: String,
    pub department: String,
    pub phone: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Stored in place of an optional profile field left out at registration.
pub const NOT_AVAILABLE: &str = "N/A";

/// Optional profile fields captured at registration.
#[derive(Debug, Clone, Default)]
pub struct ProfileDetails {
    pub position: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
}

impl Employee {
    /// Name used on statistics records: the directory name when set, else
    /// the local part of the email.
    pub fn display_name(&self) -> String {
        display_name_for(&self.email, Some(&self.name))
    }
}

pub fn display_name_for(email: &str, name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => email.split('@').next().unwrap_or(email).to_string(),
    }
}

/// Public view of an [`Employee`], without credentials.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": "0f7e2b8a-4c1d-4d6e-b0a2-7c3f9e5d1a20",
        "name": "Jane Doe",
        "email": "jane@company.com",
        "role": "Employee",
        "position": "Engineer",
        "department": "Platform",
        "phone": "N/A",
        "createdAt": "2026-01-01T09:00:00Z"
    })
)]
pub struct EmployeeProfile {
    pub id: String,
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "jane@company.com", format = "email")]
    pub email: String,
    pub role: Role,
    #[schema(example = "Engineer")]
    pub position: String,
    #[schema(example = "Platform")]
    pub department: String,
    #[schema(example = "N/A")]
    pub phone: String,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

impl From<Employee> for EmployeeProfile {
    fn from(e: Employee) -> Self {
        Self {
            id: e.id,
            name: e.name,
            email: e.email,
            role: e.role,
            position: e.position,
            department: e.department,
            phone: e.phone,
            created_at: e.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_local_part() {
        assert_eq!(display_name_for("jane.doe@company.com", None), "jane.doe");
        assert_eq!(display_name_for("jane.doe@company.com", Some("  ")), "jane.doe");
        assert_eq!(display_name_for("jane.doe@company.com", Some("Jane")), "Jane");
    }
}
