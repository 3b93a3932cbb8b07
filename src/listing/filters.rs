// Filter controls - one typed control per filter kind, synchronised with the
// query string (immediately for discrete controls, debounced for free text)

use std::time::{Duration, Instant};

use chrono::NaiveDate;

use super::url_state::QueryParams;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub label: String,
    pub value: String,
}

impl ChoiceOption {
    pub fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

/// Shape of a filter control together with its current value.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterKind {
    Select {
        options: Vec<ChoiceOption>,
        value: Option<String>,
    },
    CheckboxGroup {
        options: Vec<ChoiceOption>,
        values: Vec<String>,
    },
    Text {
        value: String,
    },
    Date {
        value: Option<NaiveDate>,
    },
    Number {
        value: Option<f64>,
    },
    /// Rendered by the caller; the panel only stores and syncs the raw value.
    Custom {
        value: Option<String>,
    },
}

/// A change coming from a control.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterInput {
    One(String),
    Many(Vec<String>),
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterControl {
    pub id: String,
    pub label: String,
    pub query_param: Option<String>,
    pub placeholder: Option<String>,
    pub kind: FilterKind,
}

impl FilterControl {
    fn with_kind(id: &str, label: &str, kind: FilterKind) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            query_param: None,
            placeholder: None,
            kind,
        }
    }

    pub fn select(id: &str, label: &str, options: Vec<ChoiceOption>) -> Self {
        Self::with_kind(id, label, FilterKind::Select { options, value: None })
    }

    pub fn checkbox_group(id: &str, label: &str, options: Vec<ChoiceOption>) -> Self {
        Self::with_kind(
            id,
            label,
            FilterKind::CheckboxGroup {
                options,
                values: Vec::new(),
            },
        )
    }

    pub fn text(id: &str, label: &str) -> Self {
        Self::with_kind(id, label, FilterKind::Text { value: String::new() })
    }

    pub fn date(id: &str, label: &str) -> Self {
        Self::with_kind(id, label, FilterKind::Date { value: None })
    }

    pub fn number(id: &str, label: &str) -> Self {
        Self::with_kind(id, label, FilterKind::Number { value: None })
    }

    pub fn custom(id: &str, label: &str) -> Self {
        Self::with_kind(id, label, FilterKind::Custom { value: None })
    }

    pub fn with_query_param(mut self, param: &str) -> Self {
        self.query_param = Some(param.to_string());
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    /// Query-string key this control owns.
    pub fn param(&self) -> &str {
        self.query_param.as_deref().unwrap_or(&self.id)
    }

    /// Free-text controls are written to the URL after the debounce delay.
    pub fn is_debounced(&self) -> bool {
        matches!(self.kind, FilterKind::Text { .. })
    }

    /// Current value as query-string values; empty when inactive.
    pub fn url_values(&self) -> Vec<String> {
        match &self.kind {
            FilterKind::Select { value, .. } | FilterKind::Custom { value } => {
                value.iter().cloned().collect()
            }
            FilterKind::CheckboxGroup { values, .. } => values.clone(),
            FilterKind::Text { value } if value.is_empty() => Vec::new(),
            FilterKind::Text { value } => vec![value.clone()],
            FilterKind::Date { value } => value
                .map(|d| vec![d.format("%Y-%m-%d").to_string()])
                .unwrap_or_default(),
            FilterKind::Number { value } => value.map(|n| vec![n.to_string()]).unwrap_or_default(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.url_values().is_empty()
    }

    pub fn apply(&mut self, input: FilterInput) -> AppResult<()> {
        let label = self.label.clone();
        match (&mut self.kind, input) {
            (kind, FilterInput::Clear) => clear_kind(kind),
            (FilterKind::Select { options, value }, FilterInput::One(raw)) => {
                if raw.is_empty() {
                    *value = None;
                } else if options.iter().any(|o| o.value == raw) {
                    *value = Some(raw);
                } else {
                    return Err(AppError::Validation(format!("Unknown option for {}: {}", label, raw)));
                }
            }
            (FilterKind::CheckboxGroup { options, values }, input) => {
                let raw = match input {
                    FilterInput::One(single) => vec![single],
                    FilterInput::Many(many) => many,
                    FilterInput::Clear => Vec::new(),
                };
                if let Some(unknown) = raw.iter().find(|v| !options.iter().any(|o| &o.value == *v)) {
                    return Err(AppError::Validation(format!("Unknown option for {}: {}", label, unknown)));
                }
                let mut deduped: Vec<String> = Vec::with_capacity(raw.len());
                for v in raw {
                    if !deduped.contains(&v) {
                        deduped.push(v);
                    }
                }
                *values = deduped;
            }
            (FilterKind::Text { value }, FilterInput::One(raw)) => *value = raw,
            (FilterKind::Date { value }, FilterInput::One(raw)) => {
                *value = if raw.is_empty() {
                    None
                } else {
                    Some(NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                        AppError::Validation(format!("Invalid date for {}: {}", label, raw))
                    })?)
                };
            }
            (FilterKind::Number { value }, FilterInput::One(raw)) => {
                *value = if raw.trim().is_empty() {
                    None
                } else {
                    match raw.trim().parse::<f64>() {
                        Ok(n) if n.is_finite() => Some(n),
                        _ => {
                            return Err(AppError::Validation(format!("Invalid number for {}: {}", label, raw)))
                        }
                    }
                };
            }
            (FilterKind::Custom { value }, FilterInput::One(raw)) => {
                *value = if raw.is_empty() { None } else { Some(raw) };
            }
            (_, FilterInput::Many(_)) => {
                return Err(AppError::Validation(format!("{} accepts a single value", label)));
            }
        }
        Ok(())
    }

    /// Initialise from query-string values. Values the control cannot hold
    /// are ignored and the control stays as it was.
    pub fn set_from_url(&mut self, raw: &[&str]) {
        if raw.is_empty() {
            return;
        }
        let input = match self.kind {
            FilterKind::CheckboxGroup { .. } => FilterInput::Many(raw.iter().map(|s| s.to_string()).collect()),
            _ => FilterInput::One(raw[0].to_string()),
        };
        if let Err(err) = self.apply(input) {
            tracing::debug!("Ignoring query value for filter {}: {}", self.id, err);
        }
    }
}

fn clear_kind(kind: &mut FilterKind) {
    match kind {
        FilterKind::Select { value, .. } | FilterKind::Custom { value } => *value = None,
        FilterKind::CheckboxGroup { values, .. } => values.clear(),
        FilterKind::Text { value } => value.clear(),
        FilterKind::Date { value } => *value = None,
        FilterKind::Number { value } => *value = None,
    }
}

/// Trailing-edge debounce driven by explicit timestamps.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Queue `value`, replacing anything pending and restarting the delay.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Take the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Take the pending value immediately.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// A filter value that should be written to the URL and the list state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterUpdate {
    pub param: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FilterPanel {
    controls: Vec<FilterControl>,
    debounced: Vec<(String, Debouncer<Vec<String>>)>,
    debounce_delay: Duration,
}

impl FilterPanel {
    pub fn new(controls: Vec<FilterControl>, debounce_delay: Duration) -> Self {
        Self {
            controls,
            debounced: Vec::new(),
            debounce_delay,
        }
    }

    pub fn debounce_delay(&self) -> Duration {
        self.debounce_delay
    }

    /// Delay for free-text controls. Pending input is dropped.
    pub fn set_debounce_delay(&mut self, delay: Duration) {
        self.debounce_delay = delay;
        self.debounced.clear();
    }

    pub fn controls(&self) -> &[FilterControl] {
        &self.controls
    }

    pub fn control(&self, id: &str) -> Option<&FilterControl> {
        self.controls.iter().find(|c| c.id == id)
    }

    pub fn params(&self) -> Vec<String> {
        self.controls.iter().map(|c| c.param().to_string()).collect()
    }

    /// Initialise every control from its query parameter.
    pub fn hydrate(&mut self, query: &QueryParams) {
        for control in &mut self.controls {
            let raw = query.get_all(control.param());
            control.set_from_url(&raw);
        }
    }

    /// Apply a control change. Discrete controls yield their URL update right
    /// away; free-text controls yield nothing until [`poll`](Self::poll).
    pub fn change(&mut self, id: &str, input: FilterInput, now: Instant) -> AppResult<Option<FilterUpdate>> {
        let control = self
            .controls
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Unknown filter: {}", id)))?;
        control.apply(input)?;

        let update = FilterUpdate {
            param: control.param().to_string(),
            values: control.url_values(),
        };

        if control.is_debounced() {
            let delay = self.debounce_delay;
            let slot = match self.debounced.iter().position(|(param, _)| *param == update.param) {
                Some(at) => &mut self.debounced[at].1,
                None => {
                    self.debounced.push((update.param.clone(), Debouncer::new(delay)));
                    let last = self.debounced.len() - 1;
                    &mut self.debounced[last].1
                }
            };
            slot.push(update.values, now);
            Ok(None)
        } else {
            Ok(Some(update))
        }
    }

    /// Debounced updates whose delay has elapsed.
    pub fn poll(&mut self, now: Instant) -> Vec<FilterUpdate> {
        self.debounced
            .iter_mut()
            .filter_map(|(param, debouncer)| {
                debouncer.poll(now).map(|values| FilterUpdate {
                    param: param.clone(),
                    values,
                })
            })
            .collect()
    }

    /// Clear every control; each owned parameter is removed from the URL.
    pub fn reset(&mut self) -> Vec<FilterUpdate> {
        for (_, debouncer) in &mut self.debounced {
            debouncer.cancel();
        }
        self.controls
            .iter_mut()
            .map(|control| {
                clear_kind(&mut control.kind);
                FilterUpdate {
                    param: control.param().to_string(),
                    values: Vec::new(),
                }
            })
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.controls.iter().filter(|c| c.is_active()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn countries() -> Vec<ChoiceOption> {
        vec![
            ChoiceOption::new("Canada", "2"),
            ChoiceOption::new("Germany", "5"),
        ]
    }

    fn panel() -> FilterPanel {
        FilterPanel::new(
            vec![
                FilterControl::select("country", "Country", countries()),
                FilterControl::checkbox_group("levels", "Levels", vec![
                    ChoiceOption::new("Primary", "primary"),
                    ChoiceOption::new("Secondary", "secondary"),
                ]),
                FilterControl::text("city", "City").with_placeholder("Any city"),
                FilterControl::number("min_order", "Min order").with_query_param("minOrder"),
                FilterControl::date("created", "Created"),
            ],
            Duration::from_millis(500),
        )
    }

    #[test]
    fn test_hydrate_from_query() {
        let mut panel = panel();
        panel.hydrate(&QueryParams::parse(
            "country=5&levels=primary&levels=secondary&city=Oslo&minOrder=3&created=2025-02-01",
        ));
        assert_eq!(panel.control("country").unwrap().url_values(), vec!["5"]);
        assert_eq!(panel.control("levels").unwrap().url_values(), vec!["primary", "secondary"]);
        assert_eq!(panel.control("city").unwrap().url_values(), vec!["Oslo"]);
        assert_eq!(panel.control("min_order").unwrap().url_values(), vec!["3"]);
        assert_eq!(panel.control("created").unwrap().url_values(), vec!["2025-02-01"]);
        assert_eq!(panel.active_count(), 5);
    }

    #[test]
    fn test_hydrate_ignores_unrepresentable_values() {
        let mut panel = panel();
        panel.hydrate(&QueryParams::parse("country=99&minOrder=lots&created=soon"));
        assert_eq!(panel.active_count(), 0);
    }

    #[test]
    fn test_discrete_change_is_immediate() {
        let mut panel = panel();
        let now = Instant::now();
        let update = panel
            .change("country", FilterInput::One("2".to_string()), now)
            .unwrap()
            .unwrap();
        assert_eq!(update, FilterUpdate { param: "country".to_string(), values: vec!["2".to_string()] });

        let update = panel.change("min_order", FilterInput::One("4".into()), now).unwrap().unwrap();
        assert_eq!(update.param, "minOrder");
    }

    #[test]
    fn test_select_rejects_unknown_option() {
        let mut panel = panel();
        assert!(panel.change("country", FilterInput::One("42".into()), Instant::now()).is_err());
        assert!(panel.change("nope", FilterInput::Clear, Instant::now()).is_err());
    }

    #[test]
    fn test_text_change_is_debounced() {
        let mut panel = panel();
        let start = Instant::now();
        assert!(panel.change("city", FilterInput::One("Os".into()), start).unwrap().is_none());
        assert!(panel
            .change("city", FilterInput::One("Oslo".into()), start + Duration::from_millis(200))
            .unwrap()
            .is_none());

        assert!(panel.poll(start + Duration::from_millis(600)).is_empty());
        let updates = panel.poll(start + Duration::from_millis(700));
        assert_eq!(updates, vec![FilterUpdate { param: "city".to_string(), values: vec!["Oslo".to_string()] }]);
        assert!(panel.poll(start + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn test_reset_clears_every_param() {
        let mut panel = panel();
        panel.hydrate(&QueryParams::parse("country=5&city=Oslo"));
        let updates = panel.reset();
        assert_eq!(updates.len(), 5);
        assert!(updates.iter().all(|u| u.values.is_empty()));
        assert_eq!(panel.active_count(), 0);
    }

    #[test]
    fn test_debouncer_flush_and_cancel() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        let now = Instant::now();
        debouncer.push("a", now);
        assert!(debouncer.is_pending());
        assert_eq!(debouncer.flush(), Some("a"));
        debouncer.push("b", now);
        debouncer.cancel();
        assert_eq!(debouncer.poll(now + Duration::from_secs(1)), None);
    }
}
