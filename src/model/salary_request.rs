use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SalaryRequestStatus {
    Pending,
    Approved,
    Declined,
}

impl SalaryRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalaryRequestStatus::Pending => "pending",
            SalaryRequestStatus::Approved => "approved",
            SalaryRequestStatus::Declined => "declined",
        }
    }
}

/// An employee asking HR to set up their salary.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": "9d3f6a2e-1b7c-4f0e-8a44-2c6e1d0b9f31",
    "employeeEmail": "jane@company.com",
    "status": "pending",
    "createdAt": "2026-01-01T09:00:00Z",
    "updatedAt": "2026-01-01T09:00:00Z"
}))]
pub struct SalaryRequest {
    pub id: String,
    pub employee_email: String,
    pub status: SalaryRequestStatus,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

impl SalaryRequest {
    pub fn pending(employee_email: &str, at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            employee_email: employee_email.to_string(),
            status: SalaryRequestStatus::Pending,
            created_at: at,
            updated_at: at,
        }
    }
}

/// Approval to write: the request id and, when HR supplies one, the base
/// salary recorded for the employee.
#[derive(Debug, Clone)]
pub struct SalaryApproval {
    pub id: String,
    pub base_salary: Option<f64>,
    pub at: DateTime<Utc>,
}
