//! # Generated Resources
//!
//! The two kinds of GitOps objects the generator produces, and the closed
//! [`GeneratedResource`] enum over them:
//!
//! - [`GitRepository`]: where configuration comes from (a source URL and a
//!   branch).
//! - [`HelmRelease`]: what gets released from it (a chart path inside that
//!   repository, and a reference to the `GitRepository` by name).
//!
//! Each resource serializes independently to a YAML manifest with the usual
//! `apiVersion`/`kind`/`metadata`/`spec` layout, and [`GeneratedResource::from_yaml`]
//! reads a manifest back by dispatching on its `kind`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::profile::ObjectMeta;

pub const GIT_REPOSITORY_KIND: &str = "GitRepository";
pub const GIT_REPOSITORY_API_VERSION: &str = "source.toolkit.fluxcd.io/v1beta1";
pub const HELM_RELEASE_KIND: &str = "HelmRelease";
pub const HELM_RELEASE_API_VERSION: &str = "helm.toolkit.fluxcd.io/v2beta1";

/// Branch to track in a [`GitRepository`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRepositoryRef {
    #[serde(default)]
    pub branch: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRepositorySpec {
    pub url: String,
    #[serde(rename = "ref")]
    pub reference: GitRepositoryRef,
}

/// A source repository reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRepository {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: GitRepositorySpec,
}

impl GitRepository {
    /// A `GitRepository` called `name` tracking `branch` of `url`.
    pub fn new(name: impl Into<String>, url: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            api_version: GIT_REPOSITORY_API_VERSION.to_string(),
            kind: GIT_REPOSITORY_KIND.to_string(),
            metadata: ObjectMeta {
                name: name.into(),
                namespace: None,
            },
            spec: GitRepositorySpec {
                url: url.into(),
                reference: GitRepositoryRef {
                    branch: branch.into(),
                },
            },
        }
    }
}

/// Reference from a chart to the source that holds it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReference {
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelmChartTemplateSpec {
    /// Path of the chart inside the source repository.
    pub chart: String,
    pub source_ref: SourceReference,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelmChartTemplate {
    pub spec: HelmChartTemplateSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelmReleaseSpec {
    pub chart: HelmChartTemplate,
}

/// A release of one chart from a [`GitRepository`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelmRelease {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: HelmReleaseSpec,
}

impl HelmRelease {
    /// A `HelmRelease` called `name` releasing the chart at `chart_path` from
    /// the `GitRepository` called `source_name`.
    pub fn new(
        name: impl Into<String>,
        chart_path: impl Into<String>,
        source_name: impl Into<String>,
    ) -> Self {
        Self {
            api_version: HELM_RELEASE_API_VERSION.to_string(),
            kind: HELM_RELEASE_KIND.to_string(),
            metadata: ObjectMeta {
                name: name.into(),
                namespace: None,
            },
            spec: HelmReleaseSpec {
                chart: HelmChartTemplate {
                    spec: HelmChartTemplateSpec {
                        chart: chart_path.into(),
                        source_ref: SourceReference {
                            kind: GIT_REPOSITORY_KIND.to_string(),
                            name: source_name.into(),
                            namespace: None,
                        },
                    },
                },
            },
        }
    }

    /// Name of the `GitRepository` this release depends on.
    pub fn source_name(&self) -> &str {
        &self.spec.chart.spec.source_ref.name
    }

    /// Path of the released chart.
    pub fn chart_path(&self) -> &str {
        &self.spec.chart.spec.chart
    }
}

/// A resource produced by the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedResource {
    RepositoryReference(GitRepository),
    ReleaseReference(HelmRelease),
}

impl GeneratedResource {
    /// The resource's kind discriminator.
    pub fn kind(&self) -> &str {
        match self {
            Self::RepositoryReference(r) => &r.kind,
            Self::ReleaseReference(r) => &r.kind,
        }
    }

    /// The resource's generated name.
    pub fn name(&self) -> &str {
        &self.metadata().name
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::RepositoryReference(r) => &r.metadata,
            Self::ReleaseReference(r) => &r.metadata,
        }
    }

    /// Place the resource in `namespace`, including the namespace of the
    /// source a release refers to.
    pub fn set_namespace(&mut self, namespace: &str) {
        match self {
            Self::RepositoryReference(r) => r.metadata.namespace = Some(namespace.to_string()),
            Self::ReleaseReference(r) => {
                r.metadata.namespace = Some(namespace.to_string());
                r.spec.chart.spec.source_ref.namespace = Some(namespace.to_string());
            }
        }
    }

    /// Serialize the resource to a YAML manifest.
    pub fn to_yaml(&self) -> Result<String> {
        let yaml = match self {
            Self::RepositoryReference(r) => serde_yaml::to_string(r)?,
            Self::ReleaseReference(r) => serde_yaml::to_string(r)?,
        };
        Ok(yaml)
    }

    /// Parse a YAML manifest back into a resource.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct KindOnly {
            #[serde(default)]
            kind: String,
        }

        let KindOnly { kind } = serde_yaml::from_str(yaml)?;
        match kind.as_str() {
            GIT_REPOSITORY_KIND => Ok(Self::RepositoryReference(serde_yaml::from_str(yaml)?)),
            HELM_RELEASE_KIND => Ok(Self::ReleaseReference(serde_yaml::from_str(yaml)?)),
            other => Err(Error::UnknownKind {
                kind: other.to_string(),
            }),
        }
    }
}
