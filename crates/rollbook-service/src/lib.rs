//! Bulk enrollment import and grade recalculation for Rollbook.
//!
//! The pipeline is generic over any [`rollbook_core::store::EnrollmentStore`]
//! backend. Callers construct an [`EnrollmentEntityService`] for either a
//! set of subjects (import/removal) or a single enrollment (grade
//! recalculation) and invoke one of the three operations; each call is one
//! bulk store operation, synchronous and request-scoped.

pub mod bulk;
pub mod error;
pub mod grade;
pub mod service;

pub use bulk::BulkMapper;
pub use error::{Error, Result};
pub use grade::ReportCalculator;
pub use service::{EnrollmentEntityService, UserSelection};
