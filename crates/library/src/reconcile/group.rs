use crate::reconcile::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use lnauto_metadata::models::SeriesAttrs;
use lnauto_store::{GroupId, Series, SeriesGroup, Transaction};
use tracing::debug;

/// The group a series is reconciled into.
#[derive(Debug)]
pub(crate) struct ResolvedGroup {
    pub(crate) group: SeriesGroup,
    /// Created by this reconciliation and not yet persisted.
    pub(crate) created: bool,
    /// Display attributes were mirrored from the fetch and need writing.
    pub(crate) mirrored: bool,
}

/// Decide which group a series belongs to.
///
/// 1. An explicitly requested group must exist and is used untouched.
/// 2. Otherwise an existing series keeps its group, which mirrors the fetch
///    when the series is its main series.
/// 3. Otherwise a new group is seeded from the fetch. Its main series is set
///    by the caller once the series has an id on record.
pub(crate) async fn resolve_group(
    tx: &mut Transaction,
    existing: Option<&Series>,
    requested: Option<GroupId>,
    fetched: &SeriesAttrs,
) -> Result<ResolvedGroup> {
    if let Some(group_id) = requested {
        let group = tx
            .group(group_id)
            .await
            .or_raise(|| ErrorKind::Store)?
            .ok_or_raise(|| ErrorKind::GroupNotFound(group_id))?;
        return Ok(ResolvedGroup { group, created: false, mirrored: false });
    }

    if let Some(series) = existing
        && let Some(group_id) = series.group_id
    {
        // `series.group_id` is nulled when the group row goes away, so a
        // dangling id here means the store itself is inconsistent.
        let mut group = tx
            .group(group_id)
            .await
            .or_raise(|| ErrorKind::Store)?
            .ok_or_raise(|| ErrorKind::InvalidState("series references a missing group"))?;
        let mirrored = group.is_main(series.id);
        if mirrored {
            group.mirror(fetched);
        }
        return Ok(ResolvedGroup { group, created: false, mirrored });
    }

    let group = SeriesGroup::seeded_from(fetched);
    debug!(group = %group.id, title = %group.title, "creating series group");
    Ok(ResolvedGroup { group, created: true, mirrored: false })
}
