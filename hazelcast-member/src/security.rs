//! Role-based access checks for client requests.

use std::collections::HashSet;
use std::fmt;

use hazelcast_wire::{HazelcastError, Result};

/// Actions a client may perform on a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Read items, size, iteration.
    Read,
    /// Add items.
    Add,
    /// Remove items.
    Remove,
    /// Register item listeners.
    Listen,
    /// Every action.
    All,
}

impl Permission {
    /// Returns true if this permission implies the other permission.
    pub fn implies(&self, other: Permission) -> bool {
        match self {
            Permission::All => true,
            _ => *self == other,
        }
    }

    /// Lower-case action name as used in permission configuration.
    pub fn action_name(&self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Add => "add",
            Permission::Remove => "remove",
            Permission::Listen => "listen",
            Permission::All => "all",
        }
    }
}

/// Resource family a permission is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// Distributed list.
    List,
    /// Distributed set.
    Set,
    /// All resource types (wildcard).
    All,
}

impl ResourceType {
    /// Returns true if this resource type matches the other.
    pub fn matches(&self, other: ResourceType) -> bool {
        *self == ResourceType::All || other == ResourceType::All || *self == other
    }
}

/// A single action on a single named resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClusterPermission {
    resource_type: ResourceType,
    name: String,
    action: Permission,
}

impl ClusterPermission {
    /// Creates a permission for `action` on `name`.
    pub fn new(resource_type: ResourceType, name: impl Into<String>, action: Permission) -> Self {
        Self {
            resource_type,
            name: name.into(),
            action,
        }
    }

    /// Resource family.
    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Resource name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Requested action.
    pub fn action(&self) -> Permission {
        self.action
    }
}

impl fmt::Display for ClusterPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}Permission[{}, {}]",
            self.resource_type,
            self.name,
            self.action.action_name()
        )
    }
}

/// A permission grant for a resource name pattern.
#[derive(Debug, Clone)]
pub struct PermissionGrant {
    resource_type: ResourceType,
    resource_pattern: String,
    permissions: HashSet<Permission>,
}

impl PermissionGrant {
    /// Creates a grant covering every resource of the given type.
    pub fn new(resource_type: ResourceType) -> Self {
        Self {
            resource_type,
            resource_pattern: "*".to_string(),
            permissions: HashSet::new(),
        }
    }

    /// Sets the resource name pattern. A leading or trailing `*` matches any
    /// suffix or prefix.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.resource_pattern = pattern.into();
        self
    }

    /// Adds a permission to this grant.
    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.insert(permission);
        self
    }

    /// Returns the resource pattern.
    pub fn resource_pattern(&self) -> &str {
        &self.resource_pattern
    }

    /// Checks whether this grant covers `permission`.
    pub fn allows(&self, permission: &ClusterPermission) -> bool {
        self.resource_type.matches(permission.resource_type)
            && self.matches_pattern(&permission.name)
            && self.permissions.iter().any(|p| p.implies(permission.action))
    }

    fn matches_pattern(&self, resource_name: &str) -> bool {
        let pattern = self.resource_pattern.as_str();
        if pattern == "*" {
            return true;
        }
        if let Some(prefix) = pattern.strip_suffix('*') {
            return resource_name.starts_with(prefix);
        }
        if let Some(suffix) = pattern.strip_prefix('*') {
            return resource_name.ends_with(suffix);
        }
        pattern == resource_name
    }
}

/// A named set of grants assigned to an authenticated client.
#[derive(Debug, Clone)]
pub struct Role {
    name: String,
    grants: Vec<PermissionGrant>,
}

impl Role {
    /// Creates an empty role.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            grants: Vec::new(),
        }
    }

    /// Adds a grant to this role.
    pub fn with_grant(mut self, grant: PermissionGrant) -> Self {
        self.grants.push(grant);
        self
    }

    /// Returns the role name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Checks if any grant of this role covers `permission`.
    pub fn allows(&self, permission: &ClusterPermission) -> bool {
        self.grants.iter().any(|g| g.allows(permission))
    }

    /// Read and listen on every collection.
    pub fn observer(name: impl Into<String>) -> Self {
        Self::new(name).with_grant(
            PermissionGrant::new(ResourceType::All)
                .with_permission(Permission::Read)
                .with_permission(Permission::Listen),
        )
    }

    /// Every action on every collection.
    pub fn admin(name: impl Into<String>) -> Self {
        Self::new(name)
            .with_grant(PermissionGrant::new(ResourceType::All).with_permission(Permission::All))
    }
}

/// Checks request permissions against the roles of the calling endpoint.
#[derive(Debug, Clone, Copy)]
pub struct SecurityContext {
    enabled: bool,
}

impl SecurityContext {
    /// Creates a context; when `enabled` is false every check passes.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Returns whether checks are enforced.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Fails with [`HazelcastError::Authorization`] unless one of `roles`
    /// grants `permission`.
    pub fn check(&self, roles: &[Role], permission: &ClusterPermission) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        if roles.iter().any(|r| r.allows(permission)) {
            return Ok(());
        }
        tracing::debug!(%permission, roles = roles.len(), "permission denied");
        Err(HazelcastError::Authorization(format!(
            "permission denied: {}",
            permission
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listen_on(resource_type: ResourceType, name: &str) -> ClusterPermission {
        ClusterPermission::new(resource_type, name, Permission::Listen)
    }

    #[test]
    fn test_permission_implies() {
        assert!(Permission::All.implies(Permission::Listen));
        assert!(Permission::Listen.implies(Permission::Listen));
        assert!(!Permission::Read.implies(Permission::Listen));
    }

    #[test]
    fn test_resource_type_matches() {
        assert!(ResourceType::All.matches(ResourceType::Set));
        assert!(ResourceType::Set.matches(ResourceType::Set));
        assert!(!ResourceType::List.matches(ResourceType::Set));
    }

    #[test]
    fn test_display() {
        let p = listen_on(ResourceType::Set, "orders");
        assert_eq!(p.to_string(), "SetPermission[orders, listen]");
    }

    #[test]
    fn test_grant_patterns() {
        let prefix = PermissionGrant::new(ResourceType::Set)
            .with_pattern("orders-*")
            .with_permission(Permission::Listen);
        assert!(prefix.allows(&listen_on(ResourceType::Set, "orders-eu")));
        assert!(!prefix.allows(&listen_on(ResourceType::Set, "invoices")));
        assert!(!prefix.allows(&listen_on(ResourceType::List, "orders-eu")));

        let suffix = PermissionGrant::new(ResourceType::List)
            .with_pattern("*-audit")
            .with_permission(Permission::Listen);
        assert_eq!(suffix.resource_pattern(), "*-audit");
        assert!(suffix.allows(&listen_on(ResourceType::List, "orders-audit")));

        let exact = PermissionGrant::new(ResourceType::List)
            .with_pattern("orders")
            .with_permission(Permission::Listen);
        assert!(exact.allows(&listen_on(ResourceType::List, "orders")));
        assert!(!exact.allows(&listen_on(ResourceType::List, "orders2")));
    }

    #[test]
    fn test_predefined_roles() {
        let observer = Role::observer("watcher");
        assert_eq!(observer.name(), "watcher");
        assert!(observer.allows(&listen_on(ResourceType::List, "x")));
        let add = ClusterPermission::new(ResourceType::List, "x", Permission::Add);
        assert!(!observer.allows(&add));
        assert!(Role::admin("root").allows(&add));
    }

    #[test]
    fn test_disabled_context_allows_everything() {
        let context = SecurityContext::new(false);
        assert!(!context.is_enabled());
        assert!(context.check(&[], &listen_on(ResourceType::Set, "orders")).is_ok());
    }

    #[test]
    fn test_enabled_context() {
        let context = SecurityContext::new(true);
        let permission = listen_on(ResourceType::Set, "orders");
        let err = context.check(&[], &permission).unwrap_err();
        assert!(matches!(err, HazelcastError::Authorization(_)));
        assert!(context.check(&[Role::observer("o")], &permission).is_ok());
    }
}
