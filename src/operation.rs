//! Operation addressing scheme.
//!
//! Both sides of the authorization check share one vocabulary: an
//! [`OperationVerb`] applied at an [`OperationPath`]. The caller declares
//! [`AllowedOperation`]s before the action is called; the action proposes
//! [`PerformableOperation`]s in its response.
//!
//! Membership and coverage are defined on VALUE equality of verb and path.
//! Two operations built independently with the same verb and path compare
//! equal; there is no notion of identity.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The mutation verb of an operation.
///
/// Verbs an action sends that are not part of this closed set deserialize as
/// [`OperationVerb::Unsupported`]. An unsupported verb is never covered by
/// any allowed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationVerb {
    /// Adds a value at the path
    Add,
    /// Removes the value at the path
    Remove,
    /// Replaces the value at the path
    Replace,
    /// Any verb outside the supported set
    #[serde(other)]
    Unsupported,
}

impl fmt::Display for OperationVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationVerb::Add => write!(f, "add"),
            OperationVerb::Remove => write!(f, "remove"),
            OperationVerb::Replace => write!(f, "replace"),
            OperationVerb::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// A location inside the issuance context, e.g. `/accessToken/claims/email`.
///
/// Comparison is byte-for-byte. No normalization is applied: case, trailing
/// separators and `..` segments are all significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationPath(String);

impl OperationPath {
    /// Creates a path from its string form.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this path sits exactly one segment below `parent`.
    ///
    /// A `parent` that already ends with `/` is used as the prefix as-is,
    /// otherwise a single `/` is appended. The remaining segment must be
    /// non-empty and must not contain a further `/`.
    ///
    /// # Examples
    ///
    /// ```
    /// use action_gate::OperationPath;
    ///
    /// let parent = OperationPath::new("/accessToken/claims");
    /// assert!(OperationPath::new("/accessToken/claims/role").is_direct_child_of(&parent));
    /// assert!(!OperationPath::new("/accessToken/claims/role/x").is_direct_child_of(&parent));
    /// assert!(!OperationPath::new("/accessToken/claims").is_direct_child_of(&parent));
    /// ```
    pub fn is_direct_child_of(&self, parent: &OperationPath) -> bool {
        let rest = if parent.0.ends_with('/') {
            self.0.strip_prefix(parent.0.as_str())
        } else {
            self.0
                .strip_prefix(parent.0.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
        };

        matches!(rest, Some(segment) if !segment.is_empty() && !segment.contains('/'))
    }
}

impl fmt::Display for OperationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OperationPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for OperationPath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

/// How far an allowed operation reaches from its path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathScope {
    /// Only the path itself
    #[default]
    Exact,
    /// Any direct child of the path, but not the path itself
    Children,
}

impl PathScope {
    fn is_exact(&self) -> bool {
        *self == PathScope::Exact
    }
}

impl fmt::Display for PathScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathScope::Exact => write!(f, "exact"),
            PathScope::Children => write!(f, "children"),
        }
    }
}

/// A permission declared by the caller before the action is invoked.
///
/// Allowed operations are trusted input: they come from the request builder,
/// never from the remote action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllowedOperation {
    /// Verb the action may use
    pub op: OperationVerb,
    /// Path the permission is anchored at
    pub path: OperationPath,
    /// Reach of the permission, `exact` when omitted
    #[serde(default, skip_serializing_if = "PathScope::is_exact")]
    pub scope: PathScope,
}

impl AllowedOperation {
    /// Declares permission for `op` at exactly `path`.
    pub fn exact(op: OperationVerb, path: impl Into<OperationPath>) -> Self {
        Self {
            op,
            path: path.into(),
            scope: PathScope::Exact,
        }
    }

    /// Declares permission for `op` on every direct child of `path`.
    pub fn children(op: OperationVerb, path: impl Into<OperationPath>) -> Self {
        Self {
            op,
            path: path.into(),
            scope: PathScope::Children,
        }
    }
}

impl fmt::Display for AllowedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.op, self.path, self.scope)
    }
}

/// A mutation proposed by the remote action. Untrusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformableOperation {
    /// Requested verb
    pub op: OperationVerb,
    /// Requested location
    pub path: OperationPath,
    /// Payload for `add`/`replace`, absent for `remove`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl PerformableOperation {
    /// Creates a proposed operation carrying a value.
    pub fn new(op: OperationVerb, path: impl Into<OperationPath>, value: Value) -> Self {
        Self {
            op,
            path: path.into(),
            value: Some(value),
        }
    }

    /// Creates a proposed `remove` operation.
    pub fn remove(path: impl Into<OperationPath>) -> Self {
        Self {
            op: OperationVerb::Remove,
            path: path.into(),
            value: None,
        }
    }
}
