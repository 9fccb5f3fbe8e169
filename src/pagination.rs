//! pagination helpers
//!
//! offset/limit paging over query results, driven by the total record
//! count reported in `X-Records`.

use crate::error::Result;
use crate::response::Response;
use serde_json::Value;
use std::future::Future;

/// offset/limit paginator over query results
///
/// the fetch closure receives the next offset and the page limit and
/// returns one [`Response`]. paging stops when the reported total is
/// reached, or after a short page when no total is reported.
pub struct Paginator<Fetch, Fut>
where
    Fetch: FnMut(u64, u64) -> Fut,
    Fut: Future<Output = Result<Response>>,
{
    fetch: Fetch,
    limit: u64,
    offset: u64,
    done: bool,
}

impl<Fetch, Fut> Paginator<Fetch, Fut>
where
    Fetch: FnMut(u64, u64) -> Fut,
    Fut: Future<Output = Result<Response>>,
{
    /// create a new paginator with a page size
    pub fn new(fetch: Fetch, limit: u64) -> Self {
        Self {
            fetch,
            limit,
            offset: 0,
            done: false,
        }
    }

    /// fetch the next page of results
    pub async fn next_page(&mut self) -> Result<Option<Vec<Value>>> {
        if self.done {
            return Ok(None);
        }

        let response = (self.fetch)(self.offset, self.limit).await?;
        let rows = match response.body {
            Value::Array(rows) => rows,
            // a null body is an empty final page
            Value::Null => {
                self.done = true;
                return Ok(Some(Vec::new()));
            }
            // other non-array bodies cannot page further
            other => {
                self.done = true;
                return Ok(Some(vec![other]));
            }
        };

        self.offset += rows.len() as u64;
        self.done = match response.total {
            Some(total) => self.offset >= total,
            None => true,
        } || (rows.len() as u64) < self.limit;

        Ok(Some(rows))
    }

    /// fetch all pages and return a single collection
    pub async fn collect_all(mut self) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await? {
            items.extend(page);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_pagination_collect_all() {
        let calls: Arc<Mutex<u32>> = Arc::new(Mutex::new(0));
        let calls_fetch = calls.clone();

        let fetch = move |offset: u64, limit: u64| {
            let calls = calls_fetch.clone();
            async move {
                *calls.lock().unwrap() += 1;
                assert_eq!(limit, 2);
                let body = match offset {
                    0 => json!([1, 2]),
                    2 => json!([3]),
                    _ => panic!("unexpected offset {offset}"),
                };
                Ok(Response {
                    body,
                    total: Some(3),
                })
            }
        };

        let paginator = Paginator::new(fetch, 2);
        let items = paginator.collect_all().await.unwrap();
        assert_eq!(items, vec![json!(1), json!(2), json!(3)]);
        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_pagination_stops_without_total() {
        let fetch = |_offset: u64, _limit: u64| async {
            Ok(Response {
                body: json!([42]),
                total: None,
            })
        };

        let mut paginator = Paginator::new(fetch, 10);
        let page = paginator.next_page().await.unwrap();
        assert_eq!(page.unwrap(), vec![json!(42)]);
        assert!(paginator.next_page().await.unwrap().is_none());
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_pagination_null_body_is_empty_page() {
        let fetch = |_offset: u64, _limit: u64| async {
            Ok(Response {
                body: Value::Null,
                total: None,
            })
        };

        let mut paginator = Paginator::new(fetch, 10);
        let page = paginator.next_page().await.unwrap();
        assert_eq!(page.unwrap(), Vec::<Value>::new());
        assert!(paginator.next_page().await.unwrap().is_none());
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_pagination_short_page_ends() {
        let fetch = |offset: u64, _limit: u64| async move {
            assert_eq!(offset, 0);
            Ok(Response {
                body: json!([1]),
                // total over-reports; the short page still ends paging
                total: Some(100),
            })
        };

        let paginator = Paginator::new(fetch, 5);
        let items = paginator.collect_all().await.unwrap();
        assert_eq!(items, vec![json!(1)]);
    }
}
