use std::collections::HashSet;

use crate::errors::ModelError;
use crate::services::{JobStore, QueryExecutor, UserStore};

/// Qualification-based job recommendations
///
/// # Pipeline Stages
/// 1. Load the user's qualified technologies
/// 2. Collect every job requiring at least one of them
/// 3. Load each candidate's full requirement set
/// 4. Keep the jobs whose requirements equal the qualifications exactly
///
/// Reads are issued one after another with no surrounding transaction; the
/// result is a recommendation view, not a consistent snapshot.
pub struct Matcher<'a, E: QueryExecutor + ?Sized> {
    users: UserStore<'a, E>,
    jobs: JobStore<'a, E>,
}

impl<'a, E: QueryExecutor + ?Sized> Matcher<'a, E> {
    pub fn new(db: &'a E) -> Self {
        Self {
            users: UserStore::new(db),
            jobs: JobStore::new(db),
        }
    }

    /// Ids of the jobs whose requirement set is exactly the user's
    /// qualification set, in the order candidates were discovered.
    ///
    /// A user without qualifications matches nothing, including jobs that
    /// require nothing.
    pub async fn find_matches(&self, username: &str) -> Result<Vec<i32>, ModelError> {
        if !self.users.exists(username).await? {
            return Err(ModelError::NotFound(format!("No user: {}", username)));
        }

        let mut qualified = self.users.qualification_ids(username).await?;
        if qualified.is_empty() {
            tracing::debug!("User {} has no qualifications", username);
            return Ok(Vec::new());
        }
        qualified.sort_unstable();

        // Stage 2: candidate jobs, first-seen order
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for &tech_id in &qualified {
            for job_id in self.jobs.jobs_requiring(tech_id).await? {
                if seen.insert(job_id) {
                    candidates.push(job_id);
                }
            }
        }

        // Stage 3: full requirement sets
        let mut requirements = Vec::with_capacity(candidates.len());
        for job_id in candidates {
            requirements.push((job_id, self.jobs.requirement_ids(job_id).await?));
        }

        let candidate_count = requirements.len();
        let matches = exact_matches(&qualified, requirements);

        tracing::info!(
            "Matched {} of {} candidate jobs for {}",
            matches.len(),
            candidate_count,
            username
        );

        Ok(matches)
    }
}

/// Stage 4: keep candidates whose requirements equal `qualified` as sets.
///
/// Both sides are sorted independently and compared element by element, so
/// a subset or superset of the qualifications never matches.
pub fn exact_matches(qualified: &[i32], candidates: Vec<(i32, Vec<i32>)>) -> Vec<i32> {
    let mut qualified = qualified.to_vec();
    qualified.sort_unstable();

    candidates
        .into_iter()
        .filter_map(|(job_id, mut required)| {
            required.sort_unstable();
            (required == qualified).then_some(job_id)
        })
        .collect()
}
