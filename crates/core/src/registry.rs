//! Registry model - departments, staff and field workers.
//!
//! The registry is seed data. It is built once and passed by reference into
//! routing; assignment actions that touch field workers return a new
//! snapshot instead of mutating in place.

use serde::{Deserialize, Serialize};

use crate::id::ReportId;

/// Field worker availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Busy,
    Offline,
}

/// A field worker reporting to a staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldWorker {
    /// Unique identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Zone the worker covers
    pub location: String,

    /// Current availability
    pub availability: Availability,

    /// Report currently being worked on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_task: Option<ReportId>,
}

impl FieldWorker {
    /// Whether the worker can take a task.
    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }
}

/// A staff member of a department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    /// Unique identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Role title
    pub role: String,

    /// Owning department id
    pub department: String,

    /// Seeded workload counter. Not updated by routing.
    pub active_tasks: u32,

    /// Field workers, in preference order
    #[serde(default)]
    pub field_workers: Vec<FieldWorker>,
}

impl Staff {
    /// Number of currently available field workers.
    pub fn available_workers(&self) -> usize {
        self.field_workers.iter().filter(|fw| fw.is_available()).count()
    }

    /// First available field worker.
    pub fn first_available_worker(&self) -> Option<&FieldWorker> {
        self.field_workers.iter().find(|fw| fw.is_available())
    }
}

/// A municipal department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    /// Unique identifier (`roads`, `water`, ...)
    pub id: String,

    /// Display name
    pub name: String,

    /// Category labels this department serves
    pub categories: Vec<String>,

    /// Staff, in seed order
    #[serde(default)]
    pub staff: Vec<Staff>,

    /// Response-time label
    pub response_time: String,

    /// Static workload percentage
    pub workload: u8,
}

impl Department {
    /// Whether this department serves the given category label.
    pub fn serves(&self, label: &str) -> bool {
        self.categories.iter().any(|c| c == label)
    }
}

/// Errors from registry lookups used by assignment actions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown staff member: {0}")]
    UnknownStaff(String),

    #[error("field worker {worker} does not report to {staff}")]
    UnknownFieldWorker { staff: String, worker: String },

    #[error("field worker {0} is not available")]
    WorkerUnavailable(String),
}

/// The full set of departments.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Registry {
    /// Departments in lookup order
    pub departments: Vec<Department>,
}

impl Registry {
    /// Build a registry from departments.
    pub fn new(departments: Vec<Department>) -> Self {
        Self { departments }
    }

    /// Whether no department has any staff.
    pub fn is_empty(&self) -> bool {
        self.departments.iter().all(|d| d.staff.is_empty())
    }

    /// Find a department by id.
    pub fn department(&self, id: &str) -> Option<&Department> {
        self.departments.iter().find(|d| d.id == id)
    }

    /// Find a staff member anywhere in the registry.
    pub fn staff(&self, id: &str) -> Option<&Staff> {
        self.departments.iter().flat_map(|d| &d.staff).find(|s| s.id == id)
    }

    /// Find a field worker anywhere in the registry.
    pub fn field_worker(&self, id: &str) -> Option<&FieldWorker> {
        self.departments
            .iter()
            .flat_map(|d| &d.staff)
            .flat_map(|s| &s.field_workers)
            .find(|fw| fw.id == id)
    }

    /// Return a snapshot with `worker_id` (under `staff_id`) marked busy on `task`.
    pub fn with_worker_assigned(
        &self,
        staff_id: &str,
        worker_id: &str,
        task: &ReportId,
    ) -> Result<Registry, RegistryError> {
        let mut next = self.clone();
        let staff = next
            .departments
            .iter_mut()
            .flat_map(|d| d.staff.iter_mut())
            .find(|s| s.id == staff_id)
            .ok_or_else(|| RegistryError::UnknownStaff(staff_id.to_string()))?;

        let worker = staff
            .field_workers
            .iter_mut()
            .find(|fw| fw.id == worker_id)
            .ok_or_else(|| RegistryError::UnknownFieldWorker {
                staff: staff_id.to_string(),
                worker: worker_id.to_string(),
            })?;

        if worker.availability == Availability::Offline {
            return Err(RegistryError::WorkerUnavailable(worker_id.to_string()));
        }

        worker.availability = Availability::Busy;
        worker.current_task = Some(task.clone());
        Ok(next)
    }

    /// The seed registry: roads, water, utilities and safety.
    pub fn seed() -> Self {
        Self::new(vec![
            Department {
                id: "roads".into(),
                name: "Roads & Infrastructure".into(),
                categories: vec!["Road & Infrastructure".into(), "Traffic & Transportation".into()],
                staff: vec![
                    staff("staff1", "Rajesh Kumar", "Senior Engineer", "roads", 3, vec![
                        worker("fw1", "Amit Singh", "Zone A", Availability::Available, None),
                        worker("fw2", "Suresh Yadav", "Zone B", Availability::Busy, Some("RPT-001")),
                    ]),
                    staff("staff2", "Priya Sharma", "Project Manager", "roads", 5, vec![
                        worker("fw3", "Vikash Gupta", "Zone C", Availability::Available, None),
                    ]),
                ],
                response_time: "2-4 hours".into(),
                workload: 75,
            },
            Department {
                id: "water".into(),
                name: "Water & Sanitation".into(),
                categories: vec!["Water & Sanitation".into(), "Waste Management".into()],
                staff: vec![staff("staff3", "Deepak Verma", "Water Engineer", "water", 2, vec![
                    worker("fw4", "Ravi Kumar", "Zone D", Availability::Available, None),
                    worker("fw5", "Manoj Tiwari", "Zone E", Availability::Offline, None),
                ])],
                response_time: "1-3 hours".into(),
                workload: 60,
            },
            Department {
                id: "utilities".into(),
                name: "Public Utilities".into(),
                categories: vec!["Street Lighting".into(), "Parks & Recreation".into()],
                staff: vec![staff("staff4", "Sunita Devi", "Utilities Manager", "utilities", 4, vec![
                    worker("fw6", "Ashok Kumar", "Zone F", Availability::Available, None),
                ])],
                response_time: "4-8 hours".into(),
                workload: 45,
            },
            Department {
                id: "safety".into(),
                name: "Public Safety".into(),
                categories: vec!["Public Safety".into(), "Other".into()],
                staff: vec![staff("staff5", "Inspector Sharma", "Safety Officer", "safety", 1, vec![
                    worker("fw7", "Constable Rai", "Zone G", Availability::Available, None),
                ])],
                response_time: "30 minutes - 2 hours".into(),
                workload: 30,
            },
        ])
    }
}

fn staff(
    id: &str,
    name: &str,
    role: &str,
    department: &str,
    active_tasks: u32,
    field_workers: Vec<FieldWorker>,
) -> Staff {
    Staff {
        id: id.into(),
        name: name.into(),
        role: role.into(),
        department: department.into(),
        active_tasks,
        field_workers,
    }
}

fn worker(
    id: &str,
    name: &str,
    location: &str,
    availability: Availability,
    current_task: Option<&str>,
) -> FieldWorker {
    FieldWorker {
        id: id.into(),
        name: name.into(),
        location: location.into(),
        availability,
        current_task: current_task.map(ReportId::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_shape() {
        let registry = Registry::seed();
        assert_eq!(registry.departments.len(), 4);
        assert!(!registry.is_empty());
        assert!(registry.department("safety").unwrap().serves("Other"));
        assert_eq!(registry.staff("staff2").unwrap().active_tasks, 5);
        assert_eq!(registry.staff("staff1").unwrap().available_workers(), 1);
        assert_eq!(
            registry.field_worker("fw2").unwrap().current_task,
            Some(ReportId::from("RPT-001"))
        );
    }

    #[test]
    fn test_with_worker_assigned_returns_new_snapshot() {
        let registry = Registry::seed();
        let task = ReportId::from("R-123");
        let next = registry.with_worker_assigned("staff1", "fw1", &task).unwrap();

        let fw = next.field_worker("fw1").unwrap();
        assert_eq!(fw.availability, Availability::Busy);
        assert_eq!(fw.current_task.as_ref(), Some(&task));

        // Original untouched
        assert!(registry.field_worker("fw1").unwrap().is_available());
    }

    #[test]
    fn test_with_worker_assigned_errors() {
        let registry = Registry::seed();
        let task = ReportId::from("R-1");
        assert_eq!(
            registry.with_worker_assigned("nobody", "fw1", &task),
            Err(RegistryError::UnknownStaff("nobody".into()))
        );
        assert!(matches!(
            registry.with_worker_assigned("staff1", "fw3", &task),
            Err(RegistryError::UnknownFieldWorker { .. })
        ));
        assert_eq!(
            registry.with_worker_assigned("staff3", "fw5", &task),
            Err(RegistryError::WorkerUnavailable("fw5".into()))
        );
    }

    #[test]
    fn test_empty_registry() {
        assert!(Registry::default().is_empty());
        assert!(Registry::new(vec![Department {
            id: "x".into(),
            name: "X".into(),
            categories: vec![],
            staff: vec![],
            response_time: String::new(),
            workload: 0,
        }])
        .is_empty());
    }
}
