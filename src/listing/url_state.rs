// URL State Synchronizer - keeps list-view state bookmarkable
// State keys are typed by their initial value; the query string is the source
// of truth after hydration, and every update is written back to it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::debug;

/// A value that can live in the query string.
#[derive(Debug, Clone, PartialEq)]
pub enum UrlValue {
    Text(String),
    Number(f64),
    Bool(bool),
    List(Vec<String>),
    Null,
}

impl UrlValue {
    pub fn text(value: impl Into<String>) -> Self {
        UrlValue::Text(value.into())
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        UrlValue::List(values.into_iter().map(Into::into).collect())
    }

    /// Values that are dropped from the query string.
    pub fn is_empty(&self) -> bool {
        match self {
            UrlValue::Null => true,
            UrlValue::Text(s) => s.is_empty(),
            UrlValue::List(items) => items.is_empty(),
            UrlValue::Number(_) | UrlValue::Bool(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            UrlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            UrlValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            UrlValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            UrlValue::List(items) => Some(items),
            _ => None,
        }
    }

    fn to_query_values(&self) -> Vec<String> {
        match self {
            UrlValue::Null => Vec::new(),
            UrlValue::Text(s) => vec![s.clone()],
            UrlValue::Number(n) => vec![n.to_string()],
            UrlValue::Bool(b) => vec![b.to_string()],
            UrlValue::List(items) => items.clone(),
        }
    }

    /// Parse raw query values using `self` (the initial value) as the type
    /// witness. Returns `None` when the raw value cannot be represented, in
    /// which case the caller keeps the initial value.
    fn coerce(&self, raw: &[&str]) -> Option<UrlValue> {
        let first = raw.first()?;
        match self {
            UrlValue::List(_) => Some(UrlValue::List(raw.iter().map(|s| s.to_string()).collect())),
            UrlValue::Bool(_) => Some(UrlValue::Bool(*first == "true")),
            UrlValue::Number(_) => {
                let trimmed = first.trim();
                match trimmed.parse::<f64>() {
                    Ok(n) if n.is_finite() => Some(UrlValue::Number(n)),
                    _ => None,
                }
            }
            UrlValue::Text(_) | UrlValue::Null => Some(UrlValue::Text(first.to_string())),
        }
    }
}

/// Ordered multi-map view of a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `a=1&b=2&b=3`; a leading `?` is ignored.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        Self {
            pairs: form_urlencoded::parse(raw.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    /// Replace every value of `key`. An empty `values` removes the key.
    pub fn set(&mut self, key: &str, values: Vec<String>) {
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(at) => {
                self.remove(key);
                let at = at.min(self.pairs.len());
                for (offset, value) in values.into_iter().enumerate() {
                    self.pairs.insert(at + offset, (key.to_string(), value));
                }
            }
            None => {
                self.pairs
                    .extend(values.into_iter().map(|value| (key.to_string(), value)));
            }
        }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.pairs {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

/// How a navigation should be performed by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Update the URL without reloading page data.
    pub shallow: bool,
    /// Scroll to the top after navigating.
    pub scroll: bool,
}

impl Default for NavigateOptions {
    fn default() -> Self {
        Self {
            shallow: true,
            scroll: false,
        }
    }
}

/// A URL rewrite requested by a state update.
#[derive(Debug, Clone, PartialEq)]
pub struct Navigation {
    pub path: String,
    pub query: QueryParams,
    pub options: NavigateOptions,
}

impl Navigation {
    pub fn href(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query.encode())
        }
    }
}

#[derive(Debug, Clone)]
struct Route {
    path: String,
    query: QueryParams,
}

#[derive(Debug, Clone)]
pub struct UrlState {
    initial: BTreeMap<String, UrlValue>,
    state: BTreeMap<String, UrlValue>,
    from_url: BTreeSet<String>,
    route: Option<Route>,
    options: NavigateOptions,
}

impl UrlState {
    pub fn new<I, K>(initial: I) -> Self
    where
        I: IntoIterator<Item = (K, UrlValue)>,
        K: Into<String>,
    {
        let initial: BTreeMap<String, UrlValue> =
            initial.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            state: initial.clone(),
            initial,
            from_url: BTreeSet::new(),
            route: None,
            options: NavigateOptions::default(),
        }
    }

    pub fn with_options(mut self, options: NavigateOptions) -> Self {
        self.options = options;
        self
    }

    /// Routing is ready: rebuild state from the initial values overlaid with
    /// whatever the query carries. Called again on back/forward navigation.
    pub fn hydrate(&mut self, path: &str, query: &QueryParams) {
        let mut state = self.initial.clone();
        let mut from_url = BTreeSet::new();

        for (key, initial) in &self.initial {
            let raw = query.get_all(key);
            if raw.is_empty() {
                continue;
            }
            match initial.coerce(&raw) {
                Some(value) => {
                    state.insert(key.clone(), value);
                    from_url.insert(key.clone());
                }
                None => {
                    debug!("Ignoring malformed query value for {}: {:?}", key, raw);
                }
            }
        }

        self.state = state;
        self.from_url = from_url;
        self.route = Some(Route {
            path: path.to_string(),
            query: query.clone(),
        });
    }

    pub fn is_ready(&self) -> bool {
        self.route.is_some()
    }

    pub fn get(&self, key: &str) -> Option<&UrlValue> {
        self.state.get(key)
    }

    /// Whether `key` took its current value from the query string.
    pub fn came_from_url(&self, key: &str) -> bool {
        self.from_url.contains(key)
    }

    pub fn state(&self) -> &BTreeMap<String, UrlValue> {
        &self.state
    }

    /// Current query string, including keys this state does not own.
    pub fn query(&self) -> Option<&QueryParams> {
        self.route.as_ref().map(|route| &route.query)
    }

    /// Merge `partial` into the state and rewrite the query string. Returns
    /// `None` before hydration, matching a router that is not ready yet.
    pub fn update<I, K>(&mut self, partial: I) -> Option<Navigation>
    where
        I: IntoIterator<Item = (K, UrlValue)>,
        K: Into<String>,
    {
        let route = self.route.as_mut()?;

        for (key, value) in partial {
            self.state.insert(key.into(), value);
        }

        let mut query = route.query.clone();
        for (key, value) in &self.state {
            if value.is_empty() {
                query.remove(key);
            } else {
                query.set(key, value.to_query_values());
            }
        }

        route.query = query.clone();
        Some(Navigation {
            path: route.path.clone(),
            query,
            options: self.options,
        })
    }
}
