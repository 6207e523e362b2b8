use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The three authority tiers, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "EMPLOYEE", alias = "employee")]
    Employee,
    #[serde(rename = "DO", alias = "dept_officer")]
    DepartmentOfficer,
    #[serde(rename = "EO", alias = "eo")]
    ExecutiveOfficer,
}

impl Role {
    /// Relative authority; higher outranks lower
    pub fn authority(&self) -> u8 {
        match self {
            Self::Employee => 1,
            Self::DepartmentOfficer => 2,
            Self::ExecutiveOfficer => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "EMPLOYEE",
            Self::DepartmentOfficer => "DO",
            Self::ExecutiveOfficer => "EO",
        }
    }

    pub fn outranks(&self, other: Role) -> bool {
        self.authority() > other.authority()
    }

    pub fn is_officer(&self) -> bool {
        !matches!(self, Self::Employee)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "employee" => Ok(Self::Employee),
            "do" | "dept_officer" | "department_officer" => Ok(Self::DepartmentOfficer),
            "eo" | "executive_officer" => Ok(Self::ExecutiveOfficer),
            _ => Err(format!("Invalid role: {s}")),
        }
    }
}

/// An authenticated actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: String,
}

impl User {
    pub fn new(name: impl Into<String>, role: Role, department: impl Into<String>) -> Self {
        let name = name.into();
        let username = name.to_lowercase().replace(' ', ".");
        Self {
            id: Uuid::new_v4(),
            email: format!("{username}@example.com"),
            username,
            name,
            role,
            department: department.into(),
        }
    }

    pub fn in_department(&self, department: &str) -> bool {
        self.department.eq_ignore_ascii_case(department)
    }
}
