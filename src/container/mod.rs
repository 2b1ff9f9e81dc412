use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

mod error;

pub use error::{Error, Result};

/// The maximum allowed length for a [`ContainerID`].
const CONTAINER_ID_MAX_LEN: usize = 255;

/// A validated container identifier.
///
/// # Examples
///
/// ```
/// # use container_stats_exporter::container::ContainerID;
/// let container_id = ContainerID::new("c1").unwrap();
/// assert_eq!(container_id.as_ref(), "c1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerID(Arc<str>);

impl ContainerID {
    /// Creates a new `ContainerID` from the given raw id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidContainerID`] if the input is empty, exceeds
    /// [`CONTAINER_ID_MAX_LEN`] or contains a path separator.
    pub fn new(src: impl AsRef<str>) -> Result<Self> {
        let src = src.as_ref();
        if src.is_empty() || src.len() > CONTAINER_ID_MAX_LEN || src.contains('/') {
            return Err(Error::InvalidContainerID(src.to_owned()));
        }

        Ok(Self(src.into()))
    }
}

impl AsRef<str> for ContainerID {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ContainerID {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies the pod a set of containers belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PodReference {
    pub uid: String,
    pub namespace: String,
    pub name: String,
}

impl PodReference {
    pub fn new(
        uid: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl FromStr for PodReference {
    type Err = Error;

    /// Parses a pod log directory name of the form `<namespace>_<name>_<uid>`.
    ///
    /// Namespaces and pod names cannot contain `_`, so the first two
    /// separators split the three parts.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '_');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(namespace), Some(name), Some(uid))
                if !namespace.is_empty() && !name.is_empty() && !uid.is_empty() =>
            {
                Ok(PodReference::new(uid, namespace, name))
            }
            _ => Err(Error::InvalidPodDirectory(s.to_owned())),
        }
    }
}

impl fmt::Display for PodReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({})", self.namespace, self.name, self.uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_id_rejects_empty_and_oversized() {
        assert!(ContainerID::new("").is_err());
        assert!(ContainerID::new("a".repeat(CONTAINER_ID_MAX_LEN + 1)).is_err());
        assert!(ContainerID::new("a".repeat(CONTAINER_ID_MAX_LEN)).is_ok());
    }

    #[test]
    fn test_container_id_rejects_path_separator() {
        let err = ContainerID::new("kubepods/burstable").unwrap_err();
        assert!(matches!(err, Error::InvalidContainerID(id) if id == "kubepods/burstable"));
    }

    #[test]
    fn test_parse_pod_reference() {
        let pod: PodReference = "kube-system_coredns-5d78c9869d-abcde_0f1e2d3c-aaaa-bbbb"
            .parse()
            .unwrap();
        assert_eq!(pod.namespace, "kube-system");
        assert_eq!(pod.name, "coredns-5d78c9869d-abcde");
        assert_eq!(pod.uid, "0f1e2d3c-aaaa-bbbb");
    }

    #[test]
    fn test_parse_pod_reference_keeps_underscores_in_uid() {
        let pod: PodReference = "default_web_uid_with_underscores".parse().unwrap();
        assert_eq!(pod.uid, "uid_with_underscores");
    }

    #[test]
    fn test_parse_pod_reference_invalid() {
        assert!("default_web".parse::<PodReference>().is_err());
        assert!("_web_uid".parse::<PodReference>().is_err());
        assert!("default__uid".parse::<PodReference>().is_err());
    }
}
