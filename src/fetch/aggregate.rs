use std::{collections::BTreeMap, sync::Arc, time::Duration};

use tokio::{task::JoinSet, time::Instant};

use crate::{
    config::DEFAULT_FETCH_DEADLINE_SECS,
    fetch::retry::{BackoffPolicy, TaskOutcome, TaskReport, run_with_backoff},
    spotify::ResourceFetcher,
    types::{Country, FetchTask, ResourceKind, ResultItem},
};

pub type CountryItems = BTreeMap<Country, Vec<ResultItem>>;

/// Items per kind and country for one aggregation call.
///
/// Every requested (kind, country) pair has an entry; a failed or timed out
/// fetch leaves an empty list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedResult {
    results: BTreeMap<ResourceKind, CountryItems>,
}

impl AggregatedResult {
    /// Result with an empty list for every pair.
    pub fn empty(kinds: &[ResourceKind], countries: &[Country]) -> Self {
        let results = kinds
            .iter()
            .map(|kind| {
                let per_country = countries
                    .iter()
                    .map(|c| (c.clone(), Vec::new()))
                    .collect::<CountryItems>();
                (*kind, per_country)
            })
            .collect();
        Self { results }
    }

    pub fn insert(&mut self, kind: ResourceKind, country: Country, items: Vec<ResultItem>) {
        self.results.entry(kind).or_default().insert(country, items);
    }

    pub fn get(&self, kind: ResourceKind, country: &Country) -> Option<&[ResultItem]> {
        self.results
            .get(&kind)
            .and_then(|per_country| per_country.get(country))
            .map(Vec::as_slice)
    }

    pub fn by_country(&self, kind: ResourceKind) -> Option<&CountryItems> {
        self.results.get(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.results.keys().copied()
    }

    pub fn item_count(&self) -> usize {
        self.results
            .values()
            .flat_map(|per_country| per_country.values())
            .map(Vec::len)
            .sum()
    }
}

/// Fans one retrying fetch per (kind, country) out onto the runtime and
/// collects them back into an [`AggregatedResult`].
#[derive(Clone)]
pub struct FanOutAggregator {
    fetcher: Arc<dyn ResourceFetcher>,
    kinds: Vec<ResourceKind>,
    backoff: BackoffPolicy,
    deadline: Duration,
}

impl FanOutAggregator {
    pub fn new(fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self {
            fetcher,
            kinds: ResourceKind::ALL.to_vec(),
            backoff: BackoffPolicy::default(),
            deadline: Duration::from_secs(DEFAULT_FETCH_DEADLINE_SECS),
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Overall time budget of one [`aggregate`](Self::aggregate) call.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_kinds(mut self, kinds: &[ResourceKind]) -> Self {
        let mut unique = Vec::with_capacity(kinds.len());
        for kind in kinds {
            if !unique.contains(kind) {
                unique.push(*kind);
            }
        }
        self.kinds = unique;
        self
    }

    pub fn kinds(&self) -> &[ResourceKind] {
        &self.kinds
    }

    /// Fetches every configured kind for every country concurrently.
    ///
    /// All tasks are independent: a rate-limited task only delays itself. The
    /// call returns once every task has settled or the deadline has passed;
    /// tasks still running at the deadline are abandoned and keep an empty
    /// list. Duplicate countries are fetched once.
    pub async fn aggregate(&self, countries: &[Country], token: &str) -> AggregatedResult {
        let mut unique: Vec<Country> = Vec::with_capacity(countries.len());
        for country in countries {
            if !unique.contains(country) {
                unique.push(country.clone());
            }
        }

        let mut result = AggregatedResult::empty(&self.kinds, &unique);
        let token: Arc<str> = Arc::from(token);
        let deadline = Instant::now() + self.deadline;
        let mut set = JoinSet::new();

        for kind in &self.kinds {
            for country in &unique {
                let task = FetchTask {
                    kind: *kind,
                    country: country.clone(),
                };
                let fetcher = Arc::clone(&self.fetcher);
                let token = Arc::clone(&token);
                let policy = self.backoff;

                set.spawn(async move {
                    let run = run_with_backoff(policy, &task, || {
                        fetcher.fetch(task.kind, &task.country, &token)
                    });
                    let report = match tokio::time::timeout_at(deadline, run).await {
                        Ok(report) => report,
                        Err(_) => {
                            tracing::warn!(%task, "fetch deadline reached, giving up");
                            TaskReport::timed_out()
                        }
                    };
                    (task, report)
                });
            }
        }

        let mut failed = 0usize;
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((task, report)) => {
                    if report.outcome != TaskOutcome::Success {
                        failed += 1;
                    }
                    result.insert(task.kind, task.country, report.into_items());
                }
                Err(err) => {
                    failed += 1;
                    tracing::error!(error = %err, "fetch task aborted");
                }
            }
        }

        tracing::info!(
            tasks = self.kinds.len() * unique.len(),
            failed,
            items = result.item_count(),
            "aggregation finished"
        );

        result
    }
}
