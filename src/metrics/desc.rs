use std::fmt;

/// Stability guarantee of a metric family's name and labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StabilityLevel {
    Alpha,
    Stable,
}

impl StabilityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alpha => "ALPHA",
            Self::Stable => "STABLE",
        }
    }
}

impl fmt::Display for StabilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity and schema of a metric family.
///
/// Descriptors are meant to live in `static` [`std::sync::LazyLock`]s and be
/// handed around as `&'static MetricDescriptor`.
///
/// # Examples
///
/// ```
/// use container_stats_exporter::metrics::{MetricDescriptor, StabilityLevel};
///
/// let desc = MetricDescriptor::new(
///     "container_cpu_usage_seconds_total",
///     "Cumulative cpu time consumed by the container.",
///     &["container"],
///     StabilityLevel::Alpha,
/// );
/// assert_eq!(desc.label_names(), ["container"]);
/// assert_eq!(
///     desc.annotated_help(),
///     "[ALPHA] Cumulative cpu time consumed by the container."
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MetricDescriptor {
    name: String,
    help: String,
    label_names: Vec<String>,
    stability: StabilityLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    deprecated_version: Option<String>,
}

impl MetricDescriptor {
    pub fn new(name: &str, help: &str, label_names: &[&str], stability: StabilityLevel) -> Self {
        Self {
            name: name.to_owned(),
            help: help.to_owned(),
            label_names: label_names.iter().map(|label| (*label).to_owned()).collect(),
            stability,
            deprecated_version: None,
        }
    }

    /// Marks the family as deprecated since `version`.
    pub fn deprecated_since(mut self, version: &str) -> Self {
        self.deprecated_version = Some(version.to_owned());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    pub fn stability(&self) -> StabilityLevel {
        self.stability
    }

    pub fn deprecated_version(&self) -> Option<&str> {
        self.deprecated_version.as_deref()
    }

    /// Help text prefixed with the stability level and, if set, the deprecation notice.
    pub fn annotated_help(&self) -> String {
        match &self.deprecated_version {
            Some(version) => format!(
                "[{}] (Deprecated since {}) {}",
                self.stability, version, self.help
            ),
            None => format!("[{}] {}", self.stability, self.help),
        }
    }
}

/// Checks a metric family name: lowercase ASCII letters, digits and `_`,
/// not starting with a digit.
pub fn is_valid_metric_name(name: &str) -> bool {
    is_lower_snake_identifier(name)
}

/// Checks a label name with the same rules as [`is_valid_metric_name`].
/// Names starting with `__` are reserved.
pub fn is_valid_label_name(name: &str) -> bool {
    is_lower_snake_identifier(name) && !name.starts_with("__")
}

fn is_lower_snake_identifier(src: &str) -> bool {
    let mut bytes = src.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_lowercase() || first == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}
