//! Employee roster, limited to what an employer may see.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::DashboardView;
use super::reports::{Page, PagePayload, parse_timestamp, value_to_string};
use crate::api::endpoints::{EMPLOYEES_PATH, paged};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeePayload {
    pub employee_id: Option<Value>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub enrollment_status: Option<String>,
    pub engagement_status: Option<String>,
    pub program_assignments: Option<Vec<String>>,
    pub risk_category: Option<String>,
    pub last_active_at: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeRow {
    pub employee_id: String,
    pub full_name: String,
    pub email: String,
    pub enrollment_status: String,
    pub engagement_status: String,
    pub program_assignments: Vec<String>,
    pub risk_category: String,
    pub last_active_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl EmployeeRow {
    /// Program names joined for a single table cell, or `-`.
    pub fn programs_label(&self) -> String {
        if self.program_assignments.is_empty() {
            "-".to_string()
        } else {
            self.program_assignments.join(", ")
        }
    }
}

/// `GET /employees?page=N`.
#[derive(Debug, Clone, Copy)]
pub struct EmployeesView {
    pub page: u32,
}

impl Default for EmployeesView {
    fn default() -> Self {
        Self { page: 1 }
    }
}

impl DashboardView for EmployeesView {
    type Raw = PagePayload<EmployeePayload>;
    type Model = Page<EmployeeRow>;
    const SUBJECT: &'static str = "employees";

    fn path(&self) -> String {
        paged(EMPLOYEES_PATH, self.page)
    }

    fn normalize(&self, raw: Self::Raw) -> Self::Model {
        Page::from_payload(raw, self.page, |employee| EmployeeRow {
            employee_id: employee
                .employee_id
                .as_ref()
                .map(value_to_string)
                .unwrap_or_default(),
            full_name: employee.full_name.unwrap_or_default(),
            email: employee.email.unwrap_or_default(),
            enrollment_status: employee.enrollment_status.unwrap_or_default(),
            engagement_status: employee.engagement_status.unwrap_or_default(),
            program_assignments: employee.program_assignments.unwrap_or_default(),
            risk_category: employee.risk_category.unwrap_or_default(),
            last_active_at: employee.last_active_at.as_deref().and_then(parse_timestamp),
            is_active: employee.is_active.unwrap_or(false),
        })
    }
}
