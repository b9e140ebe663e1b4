//! Self-pruning request execution
//!
//! Issues a selection against the API and, when the server denies
//! authorization for specific sub-fields, removes exactly those
//! sub-fields from the live selection and retries. The loop converges
//! on the largest request the caller is permitted to make, without
//! knowing the caller's access up front. Every removal is recorded in
//! a ledger so the eventual success can say what was dropped and why.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::GraphClient;
use crate::denial::locate_denials;
use crate::errors::RequestResult;
use crate::selection::{prune, SelectionNode};

/// Ceiling on issue attempts for one execution.
pub const MAX_ATTEMPTS: usize = 10;

/// Record of every field removed during one execution: dotted field
/// path to the server's required-access hint, in removal order.
pub type PrunedFields = IndexMap<String, Option<String>>;

/// Outcome of a successful (possibly pruned) execution.
#[derive(Debug)]
pub struct PrunedExecution {
    /// Response data from the attempt that succeeded
    pub data: Value,
    /// Ledger of removed fields; empty when the first attempt passed
    pub pruned: PrunedFields,
}

/// Execute `selection`, pruning denied fields and retrying until the
/// request succeeds, no progress can be made, or the attempt budget
/// runs out.
///
/// The selection is mutated in place, so fields pruned on one attempt
/// can never reappear on a later one. Failures that carry no
/// authorization denial propagate untouched, as does the latest
/// denial when pruning cannot act on it.
pub async fn execute_with_pruning<C>(
    client: &C,
    selection: &mut SelectionNode,
) -> RequestResult<PrunedExecution>
where
    C: GraphClient + ?Sized,
{
    let mut ledger = PrunedFields::new();
    let mut attempt = 0;

    loop {
        attempt += 1;
        let request = selection.to_value();
        let failure = match client.issue(&request).await {
            Ok(data) => {
                if !ledger.is_empty() {
                    warn!("{}", report_line(&ledger));
                }
                return Ok(PrunedExecution {
                    data,
                    pruned: ledger,
                });
            }
            Err(failure) => failure,
        };

        if !failure.is_authorization_failure() {
            return Err(failure);
        }
        let errors = match failure.server_errors() {
            Some(errors) => errors,
            None => return Err(failure),
        };

        let mut made_progress = false;
        for denial in locate_denials(errors) {
            if denial.path.is_empty() {
                continue;
            }
            if prune(selection, &denial.path) {
                ledger.insert(denial.path.join("."), denial.required_access);
                made_progress = true;
            }
        }

        if !made_progress || attempt >= MAX_ATTEMPTS {
            return Err(failure);
        }
        debug!(attempt, pruned = ledger.len(), "retrying after pruning denied fields");
    }
}

/// One consolidated line naming every pruned field and, where the
/// server said, the access it would have required.
pub fn report_line(ledger: &PrunedFields) -> String {
    let fields: Vec<String> = ledger
        .iter()
        .map(|(path, hint)| match hint {
            Some(hint) => format!("{path} (requires {hint})"),
            None => path.clone(),
        })
        .collect();
    format!(
        "dropped fields not covered by your access: {}",
        fields.join(", ")
    )
}
