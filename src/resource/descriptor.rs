//! Resource descriptors.
//!
//! # Responsibilities
//! - Normalize the declared methods (lowercase, deduplicated)
//! - Derive the base and detail URL templates
//! - Register the schema with the document store
//!
//! # Design Decisions
//! - URL templates are computed once in `new` and never change
//! - The parent is held weakly; the registry owns every descriptor
//! - No validation beyond a present title and a successful registration

use std::sync::{Arc, Weak};

use crate::resource::error::ResourceError;
use crate::store::{DocumentStore, Model, Schema};

/// Declarative input for one resource.
#[derive(Debug, Clone, Default)]
pub struct ResourceSpec {
    pub title: Option<String>,
    pub methods: Vec<String>,
    pub schema: Schema,
    pub fields: Vec<String>,
    pub detail_url: Option<String>,
    pub excludes: Vec<String>,
}

impl ResourceSpec {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn excludes<I, S>(mut self, excludes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes = excludes.into_iter().map(Into::into).collect();
        self
    }

    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    pub fn detail_url(mut self, detail_url: impl Into<String>) -> Self {
        self.detail_url = Some(detail_url.into());
        self
    }
}

/// One exposed entity type.
#[derive(Debug)]
pub struct ResourceDescriptor {
    name: String,
    title: String,
    parent: Option<Weak<ResourceDescriptor>>,
    methods: Vec<String>,
    fields: Vec<String>,
    excludes: Vec<String>,
    base_url: String,
    detail_url: String,
    model: Model,
}

impl ResourceDescriptor {
    /// Build a descriptor and register its schema under the trimmed,
    /// lowercased title.
    pub fn new(
        spec: ResourceSpec,
        parent: Option<&Arc<ResourceDescriptor>>,
        store: &Arc<dyn DocumentStore>,
    ) -> Result<Arc<Self>, ResourceError> {
        let title = spec
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or(ResourceError::MissingTitle)?;
        let name = title.to_lowercase();

        let base_url = match parent {
            Some(parent) => format!("{}{}", parent.detail_url, name),
            None => format!("/{}", name),
        };
        let detail_url = spec
            .detail_url
            .unwrap_or_else(|| format!("{}/(?{{<{}_key>)/", base_url, name));

        let model = Model::register(store, name.clone(), spec.schema).map_err(|source| {
            ResourceError::Registration {
                name: name.clone(),
                source,
            }
        })?;

        tracing::info!(
            resource = %name,
            base_url = %base_url,
            parent = ?parent.map(|p| p.name()),
            "Resource registered"
        );

        Ok(Arc::new(Self {
            name,
            title,
            parent: parent.map(Arc::downgrade),
            methods: normalize_methods(spec.methods),
            fields: spec.fields,
            excludes: spec.excludes,
            base_url,
            detail_url,
            model,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Parent descriptor, if it is still alive.
    pub fn parent(&self) -> Option<Arc<ResourceDescriptor>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn detail_url(&self) -> &str {
        &self.detail_url
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Field name children use to reference a document of this resource.
    pub fn key_name(&self) -> String {
        format!("{}_key", self.name)
    }
}

/// Lowercase and deduplicate, keeping first-occurrence order.
pub fn normalize_methods<I, S>(methods: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for method in methods {
        let method = method.as_ref().to_lowercase();
        if !normalized.contains(&method) {
            normalized.push(method);
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError};

    fn store() -> Arc<dyn DocumentStore> {
        Arc::new(MemoryStore::new())
    }

    #[test]
    fn test_root_urls() {
        let widget = ResourceDescriptor::new(
            ResourceSpec::new("Widget").methods(["GET", "post"]),
            None,
            &store(),
        )
        .unwrap();

        assert_eq!(widget.name(), "widget");
        assert_eq!(widget.title(), "Widget");
        assert_eq!(widget.base_url(), "/widget");
        assert_eq!(widget.detail_url(), "/widget/(?{<widget_key>)/");
        assert_eq!(widget.methods(), ["get", "post"]);
        assert!(widget.parent().is_none());
    }

    #[test]
    fn test_child_urls_extend_parent_detail_url() {
        let store = store();
        let widget = ResourceDescriptor::new(ResourceSpec::new("Widget"), None, &store).unwrap();
        let gadget =
            ResourceDescriptor::new(ResourceSpec::new("Gadget"), Some(&widget), &store).unwrap();

        assert_eq!(gadget.base_url(), "/widget/(?{<widget_key>)/gadget");
        assert_eq!(
            gadget.detail_url(),
            "/widget/(?{<widget_key>)/gadget/(?{<gadget_key>)/"
        );
        assert_eq!(gadget.parent().unwrap().name(), "widget");
    }

    #[test]
    fn test_explicit_detail_url_wins() {
        let widget = ResourceDescriptor::new(
            ResourceSpec::new("Widget").detail_url("/widget/:id"),
            None,
            &store(),
        )
        .unwrap();
        assert_eq!(widget.base_url(), "/widget");
        assert_eq!(widget.detail_url(), "/widget/:id");
    }

    #[test]
    fn test_padded_title_is_trimmed() {
        let widget =
            ResourceDescriptor::new(ResourceSpec::new("  Widget "), None, &store()).unwrap();
        assert_eq!(widget.name(), "widget");
        assert_eq!(widget.title(), "Widget");
        assert_eq!(widget.base_url(), "/widget");
    }

    #[test]
    fn test_missing_title() {
        let err = ResourceDescriptor::new(ResourceSpec::default(), None, &store()).unwrap_err();
        assert!(matches!(err, ResourceError::MissingTitle));

        let err =
            ResourceDescriptor::new(ResourceSpec::new("   "), None, &store()).unwrap_err();
        assert!(matches!(err, ResourceError::MissingTitle));
    }

    #[test]
    fn test_name_collision_fails() {
        let store = store();
        ResourceDescriptor::new(ResourceSpec::new("Widget"), None, &store).unwrap();

        let err = ResourceDescriptor::new(ResourceSpec::new("WIDGET"), None, &store).unwrap_err();
        match err {
            ResourceError::Registration { name, source } => {
                assert_eq!(name, "widget");
                assert_eq!(source, StoreError::SchemaExists("widget".into()));
            }
            other => panic!("expected registration error, got {other:?}"),
        }
    }

    #[test]
    fn test_normalize_methods() {
        assert_eq!(
            normalize_methods(["GET", "get", "Post", "PATCH"]),
            vec!["get", "post", "patch"]
        );
        assert!(normalize_methods(Vec::<String>::new()).is_empty());
    }
}
