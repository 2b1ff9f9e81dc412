use super::MetricDescriptor;

/// How a sample's value evolves between scrapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Counter,
    Gauge,
}

impl ValueKind {
    pub fn as_prometheus_type(&self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Gauge => "gauge",
        }
    }
}

/// One observation of a metric family, produced fresh on every scrape.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    desc: &'static MetricDescriptor,
    kind: ValueKind,
    value: f64,
    label_values: Vec<String>,
}

impl MetricSample {
    /// Creates a sample for `desc`.
    ///
    /// `label_values` must line up with [`MetricDescriptor::label_names`];
    /// a length mismatch is a bug in the calling collector.
    pub fn new(
        desc: &'static MetricDescriptor,
        kind: ValueKind,
        value: f64,
        label_values: Vec<String>,
    ) -> Self {
        debug_assert_eq!(
            label_values.len(),
            desc.label_names().len(),
            "label values do not match the label names of `{}`",
            desc.name()
        );
        Self {
            desc,
            kind,
            value,
            label_values,
        }
    }

    pub fn desc(&self) -> &'static MetricDescriptor {
        self.desc
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn label_values(&self) -> &[String] {
        &self.label_values
    }

    /// Label name/value pairs in descriptor order.
    pub fn labels(&self) -> impl Iterator<Item = (&str, &str)> {
        self.desc
            .label_names()
            .iter()
            .zip(self.label_values.iter())
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// Receives the samples of a collection pass.
pub trait MetricSink {
    fn emit(&mut self, sample: MetricSample);
}

impl MetricSink for Vec<MetricSample> {
    fn emit(&mut self, sample: MetricSample) {
        self.push(sample);
    }
}
