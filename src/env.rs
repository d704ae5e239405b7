//! Environment-variable default resolution.
//!
//! Lets a wrapped callable's default values be supplied by environment
//! variables. Resolution is a pure construction-time step: look the value up
//! through a swappable source, cast it to the declared type, and hand the
//! result back for the caller to capture as an ordinary default. The call
//! path never consults the environment.
//!
//! A parameter named `table_name` under prefix `DB` resolves from
//! `DB_TABLE_NAME`.

use crate::meta::ParamMeta;
use log::warn;
use std::fmt;
use std::str::FromStr;

type LookupFn = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// An environment value that does not parse as the requested type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvValueError {
    pub variable: String,
    pub value: String,
    pub target_type: &'static str,
}

impl fmt::Display for EnvValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "environment variable {} has value {:?} which does not parse as {}",
            self.variable, self.value, self.target_type
        )
    }
}

impl std::error::Error for EnvValueError {}

/// Resolves default values from named environment variables.
///
/// # Example
/// ```ignore
/// let env = EnvDefaults::new("worker").exclude(&["secret"]);
/// // WORKER_BATCH_SIZE=200 in the environment:
/// let batch_size: usize = env.resolve("batch_size", 50);
/// assert_eq!(batch_size, 200);
/// ```
pub struct EnvDefaults {
    prefix: String,
    include: Option<Vec<String>>,
    exclude: Vec<String>,
    source: LookupFn,
}

impl EnvDefaults {
    /// `prefix` is uppercased and joined to parameter names with `_`.
    pub fn new(prefix: &str) -> Self {
        let mut prefix = prefix.to_uppercase();
        if !prefix.is_empty() && !prefix.ends_with('_') {
            prefix.push('_');
        }
        Self {
            prefix,
            include: None,
            exclude: Vec::new(),
            source: Box::new(|name| std::env::var(name).ok()),
        }
    }

    /// Only resolve the listed parameter names.
    pub fn include(mut self, names: &[&str]) -> Self {
        self.include = Some(names.iter().map(|n| n.to_string()).collect());
        self
    }

    /// Never resolve the listed parameter names.
    pub fn exclude(mut self, names: &[&str]) -> Self {
        self.exclude = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Replace the lookup source. The process environment is the default;
    /// tests inject a map so they never mutate global state.
    pub fn with_source<F>(mut self, source: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.source = Box::new(source);
        self
    }

    /// Environment variable name a parameter resolves from.
    pub fn variable(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name.to_uppercase())
    }

    fn filtered_out(&self, name: &str) -> bool {
        if self.exclude.iter().any(|n| n == name) {
            return true;
        }
        match &self.include {
            Some(include) => !include.iter().any(|n| n == name),
            None => false,
        }
    }

    /// Raw lookup honoring prefix and include/exclude filters.
    pub fn lookup(&self, name: &str) -> Option<String> {
        if self.filtered_out(name) {
            return None;
        }
        (self.source)(&self.variable(name))
    }

    /// Resolve `name` as a `V`, falling back to `fallback` when the
    /// variable is absent or filtered out. A present-but-unparseable value
    /// also falls back, with a warning, preserving the declared default
    /// rather than failing the construction.
    pub fn resolve<V: FromStr>(&self, name: &str, fallback: V) -> V {
        match self.lookup(name) {
            Some(raw) => match raw.parse::<V>() {
                Ok(value) => value,
                Err(_) => {
                    warn!(
                        "ignoring {}={:?}: does not parse as {}",
                        self.variable(name),
                        raw,
                        std::any::type_name::<V>()
                    );
                    fallback
                }
            },
            None => fallback,
        }
    }

    /// Strict resolution: absent or filtered out is `Ok(None)`, an
    /// unparseable value is an error.
    pub fn try_resolve<V: FromStr>(&self, name: &str) -> Result<Option<V>, EnvValueError> {
        match self.lookup(name) {
            Some(raw) => raw.parse::<V>().map(Some).map_err(|_| EnvValueError {
                variable: self.variable(name),
                value: raw,
                target_type: std::any::type_name::<V>(),
            }),
            None => Ok(None),
        }
    }

    /// Resolve every parameter that declares a default: the environment
    /// override when present, the declared default otherwise. This is the
    /// whole `(declared defaults, lookup source) -> resolved defaults` step;
    /// the output is ordinary data for the caller to capture.
    pub fn resolve_params(&self, params: &[ParamMeta]) -> Vec<(String, String)> {
        params
            .iter()
            .filter_map(|p| {
                let default = p.default()?;
                let value = self
                    .lookup(p.name())
                    .unwrap_or_else(|| default.to_string());
                Some((p.name().to_string(), value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn fake_env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + Send + Sync {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn resolves_with_uppercased_prefix() {
        let env = EnvDefaults::new("db").with_source(fake_env(&[("DB_TABLE_NAME", "users")]));
        assert_eq!(env.resolve("table_name", "default".to_string()), "users");
        assert_eq!(env.variable("table_name"), "DB_TABLE_NAME");
    }

    #[test]
    fn trailing_underscore_is_not_doubled() {
        let env = EnvDefaults::new("APP_").with_source(fake_env(&[("APP_PORT", "8080")]));
        assert_eq!(env.resolve("port", 80u16), 8080);
    }

    #[test]
    fn absent_variable_falls_back() {
        let env = EnvDefaults::new("svc").with_source(fake_env(&[]));
        assert_eq!(env.resolve("timeout_ms", 2500u64), 2500);
    }

    #[test]
    fn unparseable_value_falls_back() {
        let env = EnvDefaults::new("svc").with_source(fake_env(&[("SVC_RETRIES", "lots")]));
        assert_eq!(env.resolve("retries", 3u32), 3);
    }

    #[test]
    fn excluded_names_are_never_resolved() {
        let env = EnvDefaults::new("svc")
            .exclude(&["retries"])
            .with_source(fake_env(&[("SVC_RETRIES", "9")]));
        assert_eq!(env.resolve("retries", 3u32), 3);
        assert_eq!(env.lookup("retries"), None);
    }

    #[test]
    fn include_list_limits_resolution() {
        let env = EnvDefaults::new("svc")
            .include(&["host"])
            .with_source(fake_env(&[("SVC_HOST", "db1"), ("SVC_PORT", "5432")]));
        assert_eq!(env.resolve("host", "localhost".to_string()), "db1");
        assert_eq!(env.resolve("port", 5432u16), 5432);
    }

    #[test]
    fn try_resolve_reports_bad_values() {
        let env = EnvDefaults::new("svc").with_source(fake_env(&[("SVC_PORT", "not-a-port")]));
        let err = env.try_resolve::<u16>("port").unwrap_err();
        assert_eq!(err.variable, "SVC_PORT");
        assert_eq!(err.value, "not-a-port");
        assert!(err.to_string().contains("SVC_PORT"));

        let ok: Option<u16> = env.try_resolve("missing").unwrap();
        assert_eq!(ok, None);
    }

    #[test]
    fn resolve_params_overrides_declared_defaults() {
        use crate::meta::ParamMeta;

        let params = vec![
            ParamMeta::new("host").with_default("localhost"),
            ParamMeta::new("port").with_default(5432),
            ParamMeta::new("user"), // no default: not resolved
        ];
        let env = EnvDefaults::new("db").with_source(fake_env(&[("DB_PORT", "6000")]));

        let resolved = env.resolve_params(&params);
        assert_eq!(
            resolved,
            vec![
                ("host".to_string(), "localhost".to_string()),
                ("port".to_string(), "6000".to_string()),
            ]
        );
    }
}
