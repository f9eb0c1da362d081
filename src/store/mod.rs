//! Record Stores
//! Mission: Owner-scoped SQLite persistence for every record type

pub mod records;
pub mod reports;
pub mod scholarship;
pub mod semesters;
pub mod tickets;

pub use records::{Record, RecordKind, RecordStore};
pub use reports::{ReportStore, ResolvedReport, StudentReport};
pub use scholarship::{ScholarshipStore, ScholarshipStudent};
pub use semesters::{CourseEntry, Semester, SemesterStore, University, UniversityStore};
pub use tickets::{Ticket, TicketStatus, TicketStore};
