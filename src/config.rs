//! Policy loading for claude-shell-guard
//!
//! A policy is loaded once per invocation and never mutated afterwards. The
//! on-disk document may be TOML or JSON:
//!
//! ```toml
//! enabled = true
//!
//! [bypass]
//! enabled = true
//! keyword = "SECURITY_OVERRIDE"
//!
//! [path_restrictions]
//! enabled = true
//! blocked_paths = ["/etc", "/bin"]
//! allowed_operations_outside_cwd = ["ls", "cat"]
//! always_require_confirmation_outside_cwd = ["rm", "mv"]
//!
//! [policies.file_destruction]
//! enabled = true
//! block_patterns = ['\brm\s+-rf\s+/\s*$']
//! require_confirmation = ['\brm\s+-rf']
//!
//! [logging]
//! enabled = true
//! ```
//!
//! A missing or unparsable document yields a disabled policy (fail open).

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::PolicyError;
use crate::rules::defaults;

/// Default log directory, relative to the home directory
pub const DEFAULT_LOG_DIR: &str = "~/.claude/logs";

/// Where `init` writes the recommended policy
pub const DEFAULT_POLICY_PATH: &str = "~/.claude/hooks/security-policy.toml";

/// Bypass configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "BypassDocument")]
pub struct BypassConfig {
    pub enabled: bool,

    /// Literal substring that skips validation
    pub keyword: String,
}

/// `bypass` as written; `keyword` wins over the older `bypass_keyword`
#[derive(Deserialize, Default)]
#[serde(default)]
struct BypassDocument {
    enabled: bool,
    keyword: Option<String>,
    bypass_keyword: Option<String>,
}

impl From<BypassDocument> for BypassConfig {
    fn from(doc: BypassDocument) -> Self {
        Self {
            enabled: doc.enabled,
            keyword: doc.keyword.or(doc.bypass_keyword).unwrap_or_default(),
        }
    }
}

/// Path-scope restrictions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PathRestrictions {
    pub enabled: bool,

    /// Absolute path prefixes considered sensitive
    pub blocked_paths: Vec<String>,

    /// Commands exempt from the outside-working-directory rule
    #[serde(rename = "allowed_operations_outside_cwd")]
    pub allowed_read_only_ops_outside_cwd: Vec<String>,

    /// Commands that need confirmation when they reach outside the working directory
    #[serde(rename = "always_require_confirmation_outside_cwd")]
    pub confirm_ops_outside_cwd: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,

    /// Log directory (defaults to ~/.claude/logs)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

/// A named risk category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Category {
    pub enabled: bool,
    pub block_patterns: Vec<String>,
    #[serde(rename = "require_confirmation")]
    pub confirm_patterns: Vec<String>,
}

/// Categories in registration order
///
/// Serialized as a map; the document order is kept because block ties are
/// broken by it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Categories(Vec<(String, Category)>);

impl Categories {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add a category, replacing any existing one with the same name in place
    pub fn insert(&mut self, name: impl Into<String>, category: Category) {
        let name = name.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = category,
            None => self.0.push((name, category)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, category)| category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Category)> {
        self.0.iter().map(|(name, category)| (name.as_str(), category))
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, Category)> for Categories {
    fn from_iter<I: IntoIterator<Item = (N, Category)>>(iter: I) -> Self {
        let mut categories = Categories::new();
        for (name, category) in iter {
            categories.insert(name, category);
        }
        categories
    }
}

impl Serialize for Categories {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, category) in &self.0 {
            map.serialize_entry(name, category)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Categories {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CategoriesVisitor;

        impl<'de> Visitor<'de> for CategoriesVisitor {
            type Value = Categories;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of category name to category rules")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                // Entries arrive in document order for both serde_json and toml
                let mut categories = Categories::new();
                while let Some((name, category)) = access.next_entry::<String, Category>()? {
                    categories.insert(name, category);
                }
                Ok(categories)
            }
        }

        deserializer.deserialize_map(CategoriesVisitor)
    }
}

/// The security policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Policy {
    /// Master switch; when false every command is allowed
    pub enabled: bool,

    pub bypass: BypassConfig,

    pub path_restrictions: PathRestrictions,

    #[serde(rename = "policies")]
    pub categories: Categories,

    pub logging: LoggingConfig,
}

impl Policy {
    /// The fail-open policy used when nothing can be loaded
    pub fn disabled() -> Self {
        Self::default()
    }

    /// The shipped rule set
    pub fn recommended() -> Self {
        let to_strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();

        let categories = defaults::RECOMMENDED_CATEGORIES
            .iter()
            .map(|rules| {
                (
                    rules.name,
                    Category {
                        enabled: true,
                        block_patterns: to_strings(rules.block),
                        confirm_patterns: to_strings(rules.confirm),
                    },
                )
            })
            .collect();

        Self {
            enabled: true,
            bypass: BypassConfig {
                enabled: true,
                keyword: defaults::BYPASS_KEYWORD.to_string(),
            },
            path_restrictions: PathRestrictions {
                enabled: true,
                blocked_paths: to_strings(defaults::BLOCKED_PATHS),
                allowed_read_only_ops_outside_cwd: to_strings(defaults::READ_ONLY_OPS_OUTSIDE_CWD),
                confirm_ops_outside_cwd: to_strings(defaults::CONFIRM_OPS_OUTSIDE_CWD),
            },
            categories,
            logging: LoggingConfig {
                enabled: true,
                directory: None,
            },
        }
    }

    /// Standard policy locations, in lookup order
    pub fn search_paths() -> Vec<PathBuf> {
        [
            dirs::home_dir().map(|p| p.join(".claude/hooks/security-policy.json")),
            dirs::home_dir().map(|p| p.join(".claude/hooks/security-policy.toml")),
            Some(PathBuf::from("/etc/claude-shell-guard/policy.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Load the policy, falling back to a disabled policy on any error
    pub fn load(explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return match Self::load_from(path) {
                Ok(policy) => policy,
                Err(e) => {
                    warn!("{}; security checks disabled", e);
                    Self::disabled()
                }
            };
        }

        for path in Self::search_paths() {
            if !path.exists() {
                continue;
            }
            match Self::load_from(&path) {
                Ok(policy) => {
                    debug!("loaded security policy from {}", path.display());
                    return policy;
                }
                Err(e) => {
                    warn!("{}; security checks disabled", e);
                    return Self::disabled();
                }
            }
        }

        warn!("no security policy found; security checks disabled");
        Self::disabled()
    }

    /// Load from a specific path (`.json` as JSON, anything else as TOML)
    pub fn load_from(path: &Path) -> Result<Self, PolicyError> {
        let content = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json(&content).map_err(|source| PolicyError::Json {
                path: path.to_path_buf(),
                source,
            })
        } else {
            Self::from_toml(&content).map_err(|source| PolicyError::Toml {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize as a TOML document
    pub fn to_toml(&self) -> Result<String, PolicyError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Expand ~ in path strings
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Log directory (expanded)
    pub fn log_dir(&self) -> PathBuf {
        Self::expand_path(
            self.logging
                .directory
                .as_deref()
                .unwrap_or(DEFAULT_LOG_DIR),
        )
    }
}
