//! Read-only collaborators that answer chain queries.
//!
//! The evaluator never talks to a node itself. It asks an
//! [`AuthorityOracle`] whether a caller may invoke a law, and an
//! [`ExecutionLog`] for the completed executions of a law. Implementations
//! may hit an RPC endpoint, an indexer, or a local cache.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::address::Address;
use crate::roles::Role;
use crate::types::{ExecutionRecord, Law};

/// Error types for chain reads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    /// Backing source is not reachable
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    /// Transport failure during the read
    #[error("Network error: {0}")]
    Network(String),

    /// Source answered with something unparseable
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Queried law is unknown to the source
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Answers "may this caller invoke this law" against the role-assignment table.
#[async_trait]
pub trait AuthorityOracle: Send + Sync {
    async fn can_call(&self, caller: &Address, law: &Address) -> Result<bool, ReadError>;
}

/// Supplies completed executions of a law, from "proposal completed" events.
#[async_trait]
pub trait ExecutionLog: Send + Sync {
    /// Executions of `law`, in any order.
    async fn executions(&self, law: &Address) -> Result<Vec<ExecutionRecord>, ReadError>;
}

/// In-memory chain view.
///
/// Holds role assignments, the role each law is restricted to, and recorded
/// executions. Useful as a cache in front of a live source and for tests.
pub struct InMemoryChain {
    holders: Arc<RwLock<HashMap<Address, HashSet<Role>>>>,
    law_roles: Arc<RwLock<HashMap<Address, Role>>>,
    executions: Arc<RwLock<HashMap<Address, Vec<ExecutionRecord>>>>,
    online: Arc<RwLock<bool>>,
}

impl InMemoryChain {
    pub fn new() -> Self {
        Self {
            holders: Arc::new(RwLock::new(HashMap::new())),
            law_roles: Arc::new(RwLock::new(HashMap::new())),
            executions: Arc::new(RwLock::new(HashMap::new())),
            online: Arc::new(RwLock::new(true)),
        }
    }

    /// Register laws so their allowed role is known.
    pub async fn register_laws<'a>(&self, laws: impl IntoIterator<Item = &'a Law>) {
        let mut law_roles = self.law_roles.write().await;
        for law in laws {
            law_roles.insert(law.law, law.allowed_role);
        }
    }

    pub async fn assign_role(&self, account: Address, role: Role) {
        let mut holders = self.holders.write().await;
        holders.entry(account).or_default().insert(role);
    }

    pub async fn revoke_role(&self, account: &Address, role: Role) {
        let mut holders = self.holders.write().await;
        if let Some(roles) = holders.get_mut(account) {
            roles.remove(&role);
        }
    }

    pub async fn record_execution(&self, record: ExecutionRecord) {
        let mut executions = self.executions.write().await;
        executions.entry(record.law).or_default().push(record);
    }

    /// Take the chain offline: every read fails with [`ReadError::Unavailable`].
    pub async fn set_online(&self, online: bool) {
        let mut state = self.online.write().await;
        *state = online;
    }

    async fn ensure_online(&self) -> Result<(), ReadError> {
        if *self.online.read().await {
            Ok(())
        } else {
            Err(ReadError::Unavailable("in-memory chain is offline".to_string()))
        }
    }
}

impl Default for InMemoryChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthorityOracle for InMemoryChain {
    async fn can_call(&self, caller: &Address, law: &Address) -> Result<bool, ReadError> {
        self.ensure_online().await?;

        let role = self
            .law_roles
            .read()
            .await
            .get(law)
            .copied()
            .ok_or_else(|| ReadError::NotFound(law.to_string()))?;

        if role.is_public() {
            return Ok(true);
        }

        let holders = self.holders.read().await;
        let allowed = holders
            .get(caller)
            .map(|roles| roles.contains(&role))
            .unwrap_or(false);

        tracing::debug!(caller = %caller, law = %law, role = %role, allowed, "Authorization query");
        Ok(allowed)
    }
}

#[async_trait]
impl ExecutionLog for InMemoryChain {
    async fn executions(&self, law: &Address) -> Result<Vec<ExecutionRecord>, ReadError> {
        self.ensure_online().await?;
        let executions = self.executions.read().await;
        Ok(executions.get(law).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Calldata;
    use crate::types::LawConfig;

    fn law(n: u8, role: Role) -> Law {
        Law {
            law: Address::new([n; 20]),
            name: format!("law-{}", n),
            description: String::new(),
            allowed_role: role,
            config: LawConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_role_gated_access() {
        let chain = InMemoryChain::new();
        let members = law(1, Role::Numbered(4));
        let open = law(2, Role::Public);
        chain.register_laws([&members, &open]).await;

        let alice = Address::new([0xa1; 20]);
        assert!(!chain.can_call(&alice, &members.law).await.unwrap());
        assert!(chain.can_call(&alice, &open.law).await.unwrap());

        chain.assign_role(alice, Role::Numbered(4)).await;
        assert!(chain.can_call(&alice, &members.law).await.unwrap());

        chain.revoke_role(&alice, Role::Numbered(4)).await;
        assert!(!chain.can_call(&alice, &members.law).await.unwrap());
    }

    #[tokio::test]
    async fn test_reserved_role_ids_match_named_roles() {
        let chain = InMemoryChain::new();
        let admin_only = law(1, Role::Admin);
        let open = law(2, Role::Numbered(crate::roles::PUBLIC_ROLE_ID));
        chain.register_laws([&admin_only, &open]).await;

        let bob = Address::new([0xb0; 20]);
        assert!(chain.can_call(&bob, &open.law).await.unwrap());
        assert!(!chain.can_call(&bob, &admin_only.law).await.unwrap());

        chain.assign_role(bob, Role::Numbered(0)).await;
        assert!(chain.can_call(&bob, &admin_only.law).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_law() {
        let chain = InMemoryChain::new();
        let result = chain.can_call(&Address::ZERO, &Address::new([3; 20])).await;
        assert!(matches!(result, Err(ReadError::NotFound(_))));
    }

    #[test]
    fn test_offline_reads_fail() {
        tokio_test::block_on(async {
            let chain = InMemoryChain::new();
            chain
                .record_execution(ExecutionRecord {
                    law: Address::new([1; 20]),
                    calldata: Calldata::default(),
                    description: "run".to_string(),
                    block_number: 10,
                })
                .await;
            assert_eq!(chain.executions(&Address::new([1; 20])).await.unwrap().len(), 1);

            chain.set_online(false).await;
            assert!(matches!(
                chain.executions(&Address::new([1; 20])).await,
                Err(ReadError::Unavailable(_))
            ));
        });
    }
}
