//! Classifier listing with training status

use crate::clients::{ClassifierService, ClassifierStatus, ServiceResult};
use crate::services::accumulate_ordered;
use qam_common::Error;
use tracing::debug;

/// List every classifier and fetch its training status
///
/// Status lookups fan out through [`accumulate_ordered`], so the result
/// follows the service's list order; one failed lookup fails the listing.
pub async fn list_with_status(
    classifier: &dyn ClassifierService,
    fan_out_limit: usize,
) -> ServiceResult<Vec<ClassifierStatus>> {
    let summaries = classifier.list().await?;
    debug!(count = summaries.len(), "Fetching classifier status");

    accumulate_ordered(&summaries, fan_out_limit, |summary| {
        classifier.status(&summary.classifier_id)
    })
    .await
}

/// Sanity check of uploaded training CSV
///
/// Requires UTF-8 text with at least one line, every non-blank line holding
/// a text and a label separated by a comma. Returns the number of rows.
pub fn check_training_csv(data: &[u8]) -> qam_common::Result<usize> {
    let text = std::str::from_utf8(data)
        .map_err(|_| Error::InvalidInput("training CSV is not UTF-8".to_string()))?;

    let mut rows = 0;
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.rsplit_once(',') {
            Some((question, label)) if !question.trim().is_empty() && !label.trim().is_empty() => {
                rows += 1
            }
            _ => {
                return Err(Error::InvalidInput(format!(
                    "training CSV line {} has no label column",
                    index + 1
                )))
            }
        }
    }

    if rows == 0 {
        return Err(Error::InvalidInput("training CSV has no rows".to_string()));
    }
    Ok(rows)
}
