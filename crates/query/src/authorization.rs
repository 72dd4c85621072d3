//! Applies the [`Authorizer`] capability to a [`Filter`] (C7, §4.7).
//!
//! The narrowed filter reduces the set of resources a query can ever see
//! *before* pricing runs, so an unauthorised caller cannot distinguish "no
//! such resource" from "not your resource" by timing or error shape (§4.7
//! "never after, to avoid leaking existence through error differentials").

use model::Authorizer;

use crate::{Error, Filter};

/// Narrows `filter.space_guids` to the intersection with the caller's
/// permitted spaces, unless the caller is an admin. Fails with
/// [`Error::Unauthorised`] if that intersection is empty.
pub async fn authorize(filter: Filter, authorizer: &(dyn Authorizer + Send + Sync)) -> Result<Filter, Error> {
    if authorizer.admin().await {
        return Ok(filter);
    }

    let permitted = authorizer
        .spaces()
        .await
        .map_err(|err| Error::Unauthorised(err.to_string()))?;

    let effective = match filter.space_guids {
        Some(requested) => requested.intersection(&permitted).cloned().collect(),
        None => permitted,
    };

    if effective.is_empty() {
        return Err(Error::Unauthorised("no permitted spaces".into()));
    }

    Ok(Filter {
        space_guids: Some(effective),
        ..filter
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use model::StaticAuthorizer;

    fn filter() -> Filter {
        Filter::new(
            Utc.timestamp_opt(0, 0).unwrap(),
            Utc.timestamp_opt(3600, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn admin_is_unrestricted() {
        let f = authorize(filter(), &StaticAuthorizer::admin()).await.unwrap();
        assert!(f.space_guids.is_none());
    }

    #[tokio::test]
    async fn non_admin_narrows_to_permitted_spaces() {
        let authorizer = StaticAuthorizer::spaces(["space-1".to_string()]);
        let f = authorize(filter(), &authorizer).await.unwrap();
        assert_eq!(f.space_guids, Some(["space-1".to_string()].into()));
    }

    #[tokio::test]
    async fn empty_intersection_is_unauthorised() {
        let mut f = filter();
        f.space_guids = Some(["space-2".to_string()].into());
        let authorizer = StaticAuthorizer::spaces(["space-1".to_string()]);
        assert!(matches!(authorize(f, &authorizer).await, Err(Error::Unauthorised(_))));
    }
}
