//! Enrichment workflow
//!
//! Turns a name into a fully populated [`NewPerson`] by running the age,
//! gender and nationality lookups through [`run_parallel`]. The workflow only
//! decides *what* runs; how branches are scheduled, bounded and aggregated
//! lives in the orchestrator.
//!
//! All-or-nothing: any branch failure discards every branch result.

use persona_common::{run_parallel, AggregatedError, Branch, NewPerson, RequestContext};
use std::time::Duration;
use tracing::{error, info};

use crate::lookup::Lookups;

pub const AGE_BRANCH: &str = "age";
pub const GENDER_BRANCH: &str = "gender";
pub const NATIONALITY_BRANCH: &str = "nationality";

/// Composes the three lookup clients into one enriched record
#[derive(Clone)]
pub struct Enricher {
    lookups: Lookups,
    branch_timeout: Duration,
}

impl Enricher {
    /// `branch_timeout` bounds each lookup individually
    pub fn new(lookups: Lookups, branch_timeout: Duration) -> Self {
        Self {
            lookups,
            branch_timeout,
        }
    }

    /// Predict age, gender and nationality for `name`
    ///
    /// Returns the aggregated error untouched when any lookup fails, times
    /// out, or is cancelled through `ctx`.
    pub async fn enrich(
        &self,
        ctx: &RequestContext,
        name: &str,
        surname: &str,
    ) -> Result<NewPerson, AggregatedError> {
        let mut age = 0i64;
        let mut gender = String::new();
        let mut country = String::new();

        {
            let age_slot = &mut age;
            let gender_slot = &mut gender;
            let country_slot = &mut country;
            let lookups = &self.lookups;

            let branches = vec![
                Branch::new(AGE_BRANCH, move |ctx| async move {
                    *age_slot = lookups.age.get(&ctx, name).await?;
                    anyhow::Ok(())
                }),
                Branch::new(GENDER_BRANCH, move |ctx| async move {
                    *gender_slot = lookups.gender.get(&ctx, name).await?;
                    anyhow::Ok(())
                }),
                Branch::new(NATIONALITY_BRANCH, move |ctx| async move {
                    *country_slot = lookups.nationality.get(&ctx, name).await?;
                    anyhow::Ok(())
                }),
            ];

            if let Err(e) = run_parallel(ctx, self.branch_timeout, branches).await {
                error!(name, error = %e, "Failed to enrich person");
                return Err(e);
            }
        }

        info!(name, age, gender = %gender, country = %country, "Person enriched");

        Ok(NewPerson {
            name: name.to_string(),
            surname: surname.to_string(),
            age,
            gender,
            country,
        })
    }
}
