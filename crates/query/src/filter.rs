//! The billable-event query filter (C6, §4.6) and the space-restriction
//! authorisation narrows onto (C7, §4.7).

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use model::{BillableEvent, ResourceInterval};

use crate::Error;

/// `{range_start, range_stop, org_guids?, space_guids?, resource_guids?}`
/// (§4.6). `None` on a `_guids` field means "no restriction on that axis".
#[derive(Debug, Clone)]
pub struct Filter {
    pub range_start: DateTime<Utc>,
    pub range_stop: DateTime<Utc>,
    pub org_guids: Option<HashSet<String>>,
    pub space_guids: Option<HashSet<String>>,
    pub resource_guids: Option<HashSet<String>>,
}

impl Filter {
    pub fn new(range_start: DateTime<Utc>, range_stop: DateTime<Utc>) -> Self {
        Self {
            range_start,
            range_stop,
            org_guids: None,
            space_guids: None,
            resource_guids: None,
        }
    }

    /// `BadFilter` if `range_stop <= range_start` (§4.6).
    pub fn validate(&self) -> Result<(), Error> {
        if self.range_stop <= self.range_start {
            return Err(Error::BadFilter(
                "range_stop must be strictly after range_start".into(),
            ));
        }
        Ok(())
    }

    pub fn range(&self) -> model::Interval {
        model::Interval::bounded(self.range_start, self.range_stop)
            .expect("validate() already rejected an empty range")
    }

    pub(crate) fn admits_interval(&self, interval: &ResourceInterval) -> bool {
        self.org_guids
            .as_ref()
            .map_or(true, |s| s.contains(&interval.snapshot.org_guid))
            && self
                .space_guids
                .as_ref()
                .map_or(true, |s| s.contains(&interval.snapshot.space_guid))
            && self
                .resource_guids
                .as_ref()
                .map_or(true, |s| s.contains(&interval.resource_guid))
    }

    pub(crate) fn admits_event(&self, event: &BillableEvent) -> bool {
        self.org_guids.as_ref().map_or(true, |s| s.contains(&event.org_guid))
            && self
                .space_guids
                .as_ref()
                .map_or(true, |s| s.contains(&event.space_guid))
            && self
                .resource_guids
                .as_ref()
                .map_or(true, |s| s.contains(&event.resource_guid))
    }
}

/// The four grouping granularities `get_usage_totals` supports (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Org,
    OrgSpace,
    OrgSpaceResource,
    ResourceEvent,
}

/// The key a totals row is grouped under; unused axes for a given
/// [`GroupBy`] are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub org_guid: Option<String>,
    pub space_guid: Option<String>,
    pub resource_guid: Option<String>,
    pub event_guid: Option<String>,
}

impl GroupKey {
    pub(crate) fn of(event: &BillableEvent, group_by: GroupBy) -> Self {
        match group_by {
            GroupBy::Org => Self {
                org_guid: Some(event.org_guid.clone()),
                space_guid: None,
                resource_guid: None,
                event_guid: None,
            },
            GroupBy::OrgSpace => Self {
                org_guid: Some(event.org_guid.clone()),
                space_guid: Some(event.space_guid.clone()),
                resource_guid: None,
                event_guid: None,
            },
            GroupBy::OrgSpaceResource => Self {
                org_guid: Some(event.org_guid.clone()),
                space_guid: Some(event.space_guid.clone()),
                resource_guid: Some(event.resource_guid.clone()),
                event_guid: None,
            },
            GroupBy::ResourceEvent => Self {
                org_guid: None,
                space_guid: None,
                resource_guid: Some(event.resource_guid.clone()),
                event_guid: Some(event.event_guid.clone()),
            },
        }
    }
}
