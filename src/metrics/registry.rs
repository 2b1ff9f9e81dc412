use std::collections::{BTreeMap, HashSet};

use super::{
    MetricDescriptor, MetricSample, StableCollector, ValueKind, is_valid_label_name,
    is_valid_metric_name,
};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid metric name: {0:?}")]
    InvalidName(String),
    #[error("invalid label name {label:?} on metric {metric:?}")]
    InvalidLabelName { metric: String, label: String },
    #[error("metric already registered: {0}")]
    AlreadyRegistered(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// A descriptor together with the samples one scrape produced for it.
#[derive(Debug, Clone)]
pub struct MetricFamily {
    pub descriptor: &'static MetricDescriptor,
    pub kind: ValueKind,
    pub samples: Vec<MetricSample>,
}

struct Registered {
    collector: Box<dyn StableCollector>,
    described: Vec<&'static MetricDescriptor>,
}

impl Registered {
    fn describes(&self, desc: &'static MetricDescriptor) -> bool {
        self.described
            .iter()
            .any(|&described| std::ptr::eq(described, desc))
    }
}

/// Holds the registered collectors and gathers them on every scrape.
#[derive(Default)]
pub struct Registry {
    collectors: Vec<Registered>,
    descriptors: Vec<&'static MetricDescriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a collector after validating the families it describes.
    ///
    /// # Errors
    ///
    /// Fails if a described name or label name is malformed, or if a family
    /// with the same name is already registered. Nothing is registered then.
    pub fn register(&mut self, collector: impl StableCollector + 'static) -> Result<()> {
        let mut descriptors = Vec::new();
        collector.describe(&mut descriptors);

        let mut names = HashSet::with_capacity(descriptors.len());
        for &desc in &descriptors {
            if !is_valid_metric_name(desc.name()) {
                return Err(RegistryError::InvalidName(desc.name().to_owned()));
            }
            if let Some(label) = desc
                .label_names()
                .iter()
                .find(|label| !is_valid_label_name(label))
            {
                return Err(RegistryError::InvalidLabelName {
                    metric: desc.name().to_owned(),
                    label: label.clone(),
                });
            }
            let taken = self
                .descriptors
                .iter()
                .any(|existing| existing.name() == desc.name());
            if taken || !names.insert(desc.name()) {
                return Err(RegistryError::AlreadyRegistered(desc.name().to_owned()));
            }
        }

        log::debug!("registered collector with {} metric families", descriptors.len());
        self.descriptors.extend(descriptors.iter().copied());
        self.collectors.push(Registered {
            collector: Box::new(collector),
            described: descriptors,
        });
        Ok(())
    }

    /// Every registered descriptor, sorted by name.
    pub fn describe_all(&self) -> Vec<&'static MetricDescriptor> {
        let mut descriptors = self.descriptors.clone();
        descriptors.sort_by(|left, right| left.name().cmp(right.name()));
        descriptors
    }

    /// Runs one collection pass over all collectors.
    ///
    /// Families are sorted by name; families without samples are left out.
    /// Samples are dropped and logged when their descriptor was not described
    /// by the emitting collector, when their kind differs from the first
    /// sample of the family, or when they repeat a label set already seen.
    pub fn gather(&self) -> Vec<MetricFamily> {
        let mut families: BTreeMap<&'static str, MetricFamily> = BTreeMap::new();
        let mut series: HashSet<(&'static str, Vec<String>)> = HashSet::new();
        let mut samples = Vec::new();

        for registered in &self.collectors {
            samples.clear();
            registered.collector.collect(&mut samples);

            for sample in samples.drain(..) {
                let desc = sample.desc();
                if !registered.describes(desc) {
                    log::error!(
                        target: "metrics registry",
                        "dropping sample of undescribed metric family `{}`",
                        desc.name()
                    );
                    continue;
                }
                let family = families.entry(desc.name()).or_insert_with(|| MetricFamily {
                    descriptor: desc,
                    kind: sample.kind(),
                    samples: Vec::new(),
                });
                if family.kind != sample.kind() {
                    log::error!(
                        target: "metrics registry",
                        "dropping {} sample of {} family `{}`",
                        sample.kind().as_prometheus_type(),
                        family.kind.as_prometheus_type(),
                        desc.name()
                    );
                    continue;
                }
                if !series.insert((desc.name(), sample.label_values().to_vec())) {
                    log::error!(
                        target: "metrics registry",
                        "dropping duplicate series {:?} of `{}`",
                        sample.label_values(),
                        desc.name()
                    );
                    continue;
                }
                family.samples.push(sample);
            }
        }

        log::trace!("gathered {} metric families", families.len());
        families.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use super::*;
    use crate::metrics::{MetricSink, StabilityLevel};

    static UP: LazyLock<MetricDescriptor> =
        LazyLock::new(|| MetricDescriptor::new("up", "Up.", &["instance"], StabilityLevel::Stable));
    static AAA: LazyLock<MetricDescriptor> =
        LazyLock::new(|| MetricDescriptor::new("aaa", "First.", &[], StabilityLevel::Alpha));
    static STRAY: LazyLock<MetricDescriptor> =
        LazyLock::new(|| MetricDescriptor::new("stray", "Never described.", &[], StabilityLevel::Alpha));
    static UP_WITH_POD: LazyLock<MetricDescriptor> =
        LazyLock::new(|| MetricDescriptor::new("up", "Up.", &["pod", "instance"], StabilityLevel::Stable));
    static BAD: LazyLock<MetricDescriptor> =
        LazyLock::new(|| MetricDescriptor::new("Bad-Name", "Bad.", &[], StabilityLevel::Alpha));

    struct Fixed {
        described: Vec<&'static MetricDescriptor>,
        emitted: Vec<MetricSample>,
    }

    impl StableCollector for Fixed {
        fn describe(&self, out: &mut Vec<&'static MetricDescriptor>) {
            out.extend(self.described.iter().copied());
        }

        fn collect(&self, sink: &mut dyn MetricSink) {
            for sample in &self.emitted {
                sink.emit(sample.clone());
            }
        }
    }

    fn up_sample(instance: &str) -> MetricSample {
        MetricSample::new(&UP, ValueKind::Gauge, 1.0, vec![instance.to_owned()])
    }

    #[test]
    fn test_gather_groups_and_sorts_families() {
        let mut registry = Registry::new();
        registry
            .register(Fixed {
                described: vec![&*UP],
                emitted: vec![up_sample("a"), up_sample("b")],
            })
            .unwrap();
        registry
            .register(Fixed {
                described: vec![&*AAA],
                emitted: vec![MetricSample::new(&AAA, ValueKind::Counter, 3.0, vec![])],
            })
            .unwrap();

        let families = registry.gather();
        let names: Vec<&str> = families.iter().map(|f| f.descriptor.name()).collect();
        assert_eq!(names, vec!["aaa", "up"]);
        assert_eq!(families[0].kind, ValueKind::Counter);
        assert_eq!(families[1].samples.len(), 2);
    }

    #[test]
    fn test_gather_omits_empty_families() {
        let mut registry = Registry::new();
        registry
            .register(Fixed {
                described: vec![&*UP, &*AAA],
                emitted: vec![up_sample("a")],
            })
            .unwrap();

        let families = registry.gather();
        assert_eq!(families.len(), 1);
        assert_eq!(registry.describe_all().len(), 2);
    }

    #[test]
    fn test_gather_drops_undescribed_samples() {
        let mut registry = Registry::new();
        registry
            .register(Fixed {
                described: vec![&*UP],
                emitted: vec![
                    up_sample("a"),
                    MetricSample::new(&STRAY, ValueKind::Gauge, 1.0, vec![]),
                ],
            })
            .unwrap();

        let families = registry.gather();
        assert_eq!(families.len(), 1);
        assert_eq!(families[0].descriptor.name(), "up");
    }

    #[test]
    fn test_gather_drops_same_name_foreign_descriptor() {
        let mut registry = Registry::new();
        registry
            .register(Fixed {
                described: vec![&*UP],
                emitted: vec![
                    up_sample("a"),
                    MetricSample::new(
                        &UP_WITH_POD,
                        ValueKind::Gauge,
                        1.0,
                        vec!["p".to_owned(), "b".to_owned()],
                    ),
                ],
            })
            .unwrap();

        let families = registry.gather();
        assert_eq!(families.len(), 1);
        assert_eq!(families[0].samples, vec![up_sample("a")]);
    }

    #[test]
    fn test_gather_keeps_first_kind_of_family() {
        let mut registry = Registry::new();
        registry
            .register(Fixed {
                described: vec![&*UP],
                emitted: vec![
                    up_sample("a"),
                    MetricSample::new(&UP, ValueKind::Counter, 2.0, vec!["b".to_owned()]),
                ],
            })
            .unwrap();

        let families = registry.gather();
        assert_eq!(families[0].kind, ValueKind::Gauge);
        assert_eq!(families[0].samples, vec![up_sample("a")]);
    }

    #[test]
    fn test_gather_drops_duplicate_series() {
        let mut registry = Registry::new();
        registry
            .register(Fixed {
                described: vec![&*UP],
                emitted: vec![
                    up_sample("a"),
                    MetricSample::new(&UP, ValueKind::Gauge, 5.0, vec!["a".to_owned()]),
                    up_sample("b"),
                ],
            })
            .unwrap();

        let families = registry.gather();
        let values: Vec<(&[String], f64)> = families[0]
            .samples
            .iter()
            .map(|sample| (sample.label_values(), sample.value()))
            .collect();
        assert_eq!(
            values,
            vec![
                (&["a".to_owned()][..], 1.0),
                (&["b".to_owned()][..], 1.0),
            ]
        );
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = Registry::new();
        registry
            .register(Fixed { described: vec![&*UP], emitted: vec![] })
            .unwrap();
        let err = registry
            .register(Fixed { described: vec![&*AAA, &*UP], emitted: vec![] })
            .unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered(name) if name == "up"));
        assert_eq!(registry.describe_all().len(), 1);
    }

    #[test]
    fn test_register_rejects_invalid_names() {
        let mut registry = Registry::new();
        let err = registry
            .register(Fixed { described: vec![&*BAD], emitted: vec![] })
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidName(_)));
    }

    #[test]
    fn test_describe_all_sorted() {
        let mut registry = Registry::new();
        registry
            .register(Fixed { described: vec![&*UP, &*AAA], emitted: vec![] })
            .unwrap();
        let names: Vec<&str> = registry.describe_all().iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["aaa", "up"]);
    }
}
