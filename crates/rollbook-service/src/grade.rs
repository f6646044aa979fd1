//! [`ReportCalculator`] — the store-backed grade calculator.
//!
//! Sums the scores of an enrollment's asset reports into one aggregate
//! outcome. Reads only; asset reports are never written here.

use rollbook_core::{
  enrollment::Enrollment,
  grade::{GradeCalculator, GradeOutcome},
  store::EnrollmentStore,
};

pub struct ReportCalculator<'a, S: EnrollmentStore> {
  store: &'a S,
}

impl<'a, S: EnrollmentStore> ReportCalculator<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }
}

impl<'a, S: EnrollmentStore> GradeCalculator for ReportCalculator<'a, S> {
  type Error = S::Error;

  async fn calculate_grade(
    &self,
    enrollment: &Enrollment,
  ) -> Result<Vec<GradeOutcome>, Self::Error> {
    let reports = self.store.asset_reports(enrollment.id).await?;

    let score = reports.iter().map(|r| r.score).sum();
    let max = reports.iter().map(|r| r.max_score).sum();

    Ok(vec![GradeOutcome {
      score,
      max,
      role_label: enrollment.role.as_str().to_owned(),
    }])
  }
}
