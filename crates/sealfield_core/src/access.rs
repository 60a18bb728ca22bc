//! Disclosure decisions for sensitive fields.
//!
//! Rules, first match wins:
//!
//! 1. no identity → masked
//! 2. superuser → plaintext
//! 3. global permission → plaintext
//! 4. permission scoped to the record's collection → plaintext
//! 5. otherwise → masked
//!
//! A global grant covers every collection. A collection grant covers only
//! that collection and never implies the global grant.

use crate::config::DisclosurePolicy;
use parking_lot::RwLock;
use std::collections::BTreeSet;

/// Permission granting plaintext access to every collection.
pub const GLOBAL_PERMISSION: &str = "view decrypted sensitive fields";

/// Permission granting plaintext access to one collection.
#[must_use]
pub fn collection_permission(handle: &str) -> String {
    format!("view decrypted {handle} sensitive fields")
}

/// An authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Identity {
    /// Principal identifier, for logs.
    pub id: String,
    /// Superusers bypass permission checks.
    pub superuser: bool,
    /// Granted permission names.
    pub permissions: BTreeSet<String>,
}

impl Identity {
    /// A regular user with no permissions.
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// A superuser.
    pub fn superuser(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            superuser: true,
            permissions: BTreeSet::new(),
        }
    }

    /// Grants a permission.
    #[must_use]
    pub fn grant(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    /// Grants the global disclosure permission.
    #[must_use]
    pub fn grant_global(self) -> Self {
        self.grant(GLOBAL_PERMISSION)
    }

    /// Grants the disclosure permission for one collection.
    #[must_use]
    pub fn grant_collection(self, handle: &str) -> Self {
        self.grant(collection_permission(handle))
    }
}

/// Supplies the current caller and answers permission checks.
///
/// The role and permission storage behind it is outside sealfield.
pub trait IdentitySource: Send + Sync {
    /// The caller of the current operation; `None` means anonymous.
    fn current_identity(&self) -> Option<Identity>;

    /// Whether `identity` holds `permission`.
    fn has_permission(&self, identity: &Identity, permission: &str) -> bool {
        identity.permissions.contains(permission)
    }
}

/// An [`IdentitySource`] returning a fixed, swappable identity.
///
/// Suitable for tests, CLIs and single-user embeddings.
#[derive(Debug, Default)]
pub struct StaticIdentitySource {
    current: RwLock<Option<Identity>>,
}

impl StaticIdentitySource {
    /// An anonymous source.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A source acting as `identity`.
    #[must_use]
    pub fn acting_as(identity: Identity) -> Self {
        Self {
            current: RwLock::new(Some(identity)),
        }
    }

    /// Switches the current identity.
    pub fn set(&self, identity: Option<Identity>) {
        *self.current.write() = identity;
    }
}

impl IdentitySource for StaticIdentitySource {
    fn current_identity(&self) -> Option<Identity> {
        self.current.read().clone()
    }
}

/// What a reader receives for an enveloped sensitive value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disclosure {
    /// The decrypted value.
    Plaintext,
    /// The mask placeholder.
    Masked,
}

/// Evaluates disclosure rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy {
    disclosure: DisclosurePolicy,
}

impl AccessPolicy {
    /// Creates a policy.
    #[must_use]
    pub const fn new(disclosure: DisclosurePolicy) -> Self {
        Self { disclosure }
    }

    /// Whether `identity` may read plaintext from collection `handle`.
    pub fn can_disclose(
        &self,
        source: &dyn IdentitySource,
        identity: Option<&Identity>,
        handle: &str,
    ) -> bool {
        if self.disclosure == DisclosurePolicy::Unrestricted {
            return true;
        }

        let Some(identity) = identity else {
            return false;
        };

        if identity.superuser {
            return true;
        }

        if source.has_permission(identity, GLOBAL_PERMISSION) {
            return true;
        }

        source.has_permission(identity, &collection_permission(handle))
    }

    /// [`can_disclose`](Self::can_disclose) as a [`Disclosure`].
    pub fn decide(
        &self,
        source: &dyn IdentitySource,
        identity: Option<&Identity>,
        handle: &str,
    ) -> Disclosure {
        if self.can_disclose(source, identity, handle) {
            Disclosure::Plaintext
        } else {
            Disclosure::Masked
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> AccessPolicy {
        AccessPolicy::default()
    }

    fn check(identity: Option<&Identity>, handle: &str) -> bool {
        policy().can_disclose(&StaticIdentitySource::anonymous(), identity, handle)
    }

    #[test]
    fn anonymous_is_denied() {
        assert!(!check(None, "contact"));
    }

    #[test]
    fn superuser_is_allowed() {
        assert!(check(Some(&Identity::superuser("admin")), "contact"));
    }

    #[test]
    fn plain_user_is_denied() {
        assert!(!check(Some(&Identity::user("u1")), "contact"));
    }

    #[test]
    fn global_grant_covers_every_collection() {
        let reader = Identity::user("u1").grant_global();
        assert!(check(Some(&reader), "contact"));
        assert!(check(Some(&reader), "newsletter"));
    }

    #[test]
    fn collection_grant_is_scoped() {
        let reader = Identity::user("u1").grant_collection("contact");
        assert!(check(Some(&reader), "contact"));
        assert!(!check(Some(&reader), "newsletter"));
    }

    #[test]
    fn permission_names() {
        assert_eq!(GLOBAL_PERMISSION, "view decrypted sensitive fields");
        assert_eq!(
            collection_permission("contact"),
            "view decrypted contact sensitive fields"
        );
    }

    #[test]
    fn unrestricted_policy_discloses_to_everyone() {
        let policy = AccessPolicy::new(DisclosurePolicy::Unrestricted);
        let source = StaticIdentitySource::anonymous();
        assert_eq!(policy.decide(&source, None, "contact"), Disclosure::Plaintext);
    }

    #[test]
    fn source_oracle_is_consulted() {
        /// Grants everything to principals named "ops".
        struct OpsOracle;

        impl IdentitySource for OpsOracle {
            fn current_identity(&self) -> Option<Identity> {
                None
            }

            fn has_permission(&self, identity: &Identity, _permission: &str) -> bool {
                identity.id == "ops"
            }
        }

        let policy = policy();
        assert!(policy.can_disclose(&OpsOracle, Some(&Identity::user("ops")), "contact"));
        assert!(!policy.can_disclose(&OpsOracle, Some(&Identity::user("dev")), "contact"));
    }

    #[test]
    fn static_source_switches_identity() {
        let source = StaticIdentitySource::anonymous();
        assert_eq!(source.current_identity(), None);

        source.set(Some(Identity::user("u1")));
        assert_eq!(source.current_identity().unwrap().id, "u1");
    }
}
