use crate::doc;

/// Descriptor for a single parameter of a wrapped callable.
///
/// The optional default is stored in display form; it is what documentation
/// shows and what [`EnvDefaults::resolve_params`](crate::EnvDefaults::resolve_params)
/// falls back to when no environment override exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamMeta {
    name: String,
    default: Option<String>,
}

impl ParamMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl ToString) -> Self {
        self.default = Some(default.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }
}

/// Metadata record attached to a wrapped callable.
///
/// Holds the target's name, documentation, and parameter descriptors. It is
/// populated once when the callable is wrapped and shared by every layer
/// stacked on top, so introspection sees the innermost target no matter how
/// deep the stack is.
///
/// # Example
/// ```ignore
/// let meta = FnMeta::new("fetch_rates")
///     .with_doc("Fetch spot rates for a region")
///     .with_param(ParamMeta::new("region"))
///     .with_param(ParamMeta::new("timeout_ms").with_default(2500));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FnMeta {
    name: String,
    doc: Option<String>,
    params: Vec<ParamMeta>,
}

impl FnMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            params: Vec::new(),
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Set the documentation from a template, substituting `{name}`
    /// placeholders with the given values. Runs once, here.
    pub fn with_doc_template(mut self, template: &str, values: &[(&str, String)]) -> Self {
        self.doc = Some(doc::fill(template, values));
        self
    }

    pub fn with_param(mut self, param: ParamMeta) -> Self {
        self.params.push(param);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn params(&self) -> &[ParamMeta] {
        &self.params
    }

    /// Fill `{name}` placeholders in the current documentation, if any.
    pub fn fill_doc(&mut self, values: &[(&str, String)]) {
        if let Some(doc) = &self.doc {
            self.doc = Some(doc::fill(doc, values));
        }
    }
}
