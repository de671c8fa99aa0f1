//! Directory source abstraction and the page sequence built on top of it.

use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use secrecy::SecretString;
use tracing::{debug, info, instrument};

use crate::users::{RemoteUserRecord, UserPage};
use crate::{GraphError, GraphResult};

/// Read access to a remote user directory.
///
/// Implemented by [`crate::GraphClient`]; tests substitute fakes.
#[async_trait]
pub trait DirectorySource: Send + Sync {
    /// Fetches one page of users.
    ///
    /// With `cursor == None` the well-known collection endpoint is requested,
    /// otherwise the cursor URL is requested verbatim.
    async fn fetch_users_page(
        &self,
        token: &SecretString,
        cursor: Option<&str>,
    ) -> GraphResult<UserPage>;

    /// Fetches the raw avatar bytes for the user identified by `mail`.
    async fn fetch_photo(&self, token: &SecretString, mail: &str) -> GraphResult<Vec<u8>>;
}

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Lazily walks every page of the user collection.
///
/// Pages are requested strictly one after another because each cursor is
/// only known once the previous response arrived. The stream ends after the
/// first page without a next link, or right after yielding an error.
/// Calling this again starts over from the collection endpoint.
pub fn user_pages<'a, S>(
    source: &'a S,
    token: &'a SecretString,
) -> impl Stream<Item = GraphResult<Vec<RemoteUserRecord>>> + 'a
where
    S: DirectorySource + ?Sized,
{
    futures::stream::try_unfold(Cursor::Start, move |cursor| async move {
        let link = match cursor {
            Cursor::Start => None,
            Cursor::Next(link) => Some(link),
            Cursor::Done => return Ok(None),
        };

        debug!(cursor = ?link, "Fetching user page");
        let page = source.fetch_users_page(token, link.as_deref()).await?;
        let next = page.next_link.map_or(Cursor::Done, Cursor::Next);

        Ok::<_, GraphError>(Some((page.users, next)))
    })
}

/// Fetches and concatenates every page of the user collection, in order.
///
/// # Errors
///
/// Returns the first transport, authorization or decoding error; pages
/// fetched before the failure are discarded.
#[instrument(skip_all)]
pub async fn fetch_all_users<S>(
    source: &S,
    token: &SecretString,
) -> GraphResult<Vec<RemoteUserRecord>>
where
    S: DirectorySource + ?Sized,
{
    let mut pages = std::pin::pin!(user_pages(source, token));
    let mut all_users = Vec::new();
    let mut page_count = 0usize;

    while let Some(page) = pages.try_next().await? {
        page_count += 1;
        debug!(page = page_count, users = page.len(), "Processing user page");
        all_users.extend(page);
    }

    info!(
        pages = page_count,
        users = all_users.len(),
        "Fetched remote user directory"
    );

    Ok(all_users)
}
