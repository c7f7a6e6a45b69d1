use query_core::{AdvancedQuery, ParamMap, RelationSpec, ResultEnvelope, TranslatorConfig};
use tracing::{debug, instrument};

use crate::collection::Collection;
use crate::error::Result;

/// Run a list request against `coll` and build its envelope.
///
/// Count and fetch are issued together; the first failure wins. The two reads
/// are not isolated from concurrent writes.
#[instrument(
    name = "docstore.advanced_results",
    skip_all,
    fields(collection = %coll.name())
)]
pub async fn advanced_results(
    coll: &dyn Collection,
    params: &ParamMap,
    populate: Option<&RelationSpec>,
    cfg: &TranslatorConfig,
) -> Result<ResultEnvelope> {
    let plan = AdvancedQuery::from_params(params, cfg);
    let query = plan.find_query(populate.cloned());

    let (total, data) = tokio::try_join!(coll.count_documents(&plan.filter), coll.find(&query))?;

    debug!(
        total,
        page = plan.window.page,
        limit = plan.window.limit,
        returned = data.len(),
        "advanced results"
    );
    Ok(ResultEnvelope::assemble(data, &plan.window, total))
}
