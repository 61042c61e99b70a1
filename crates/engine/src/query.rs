//! Case query adapter.
//!
//! Thin layer between compiled predicates and the case store. The store
//! already pins every query to the allocated lifecycle state; this adapter
//! adds the empty-rule-set fallback: no rules means "everyone currently
//! allocated", not "no one".

use std::sync::Arc;

use dunner_core::Case;
use dunner_rules::CompiledPredicate;

use crate::store::CaseStore;

#[derive(Clone)]
pub struct CaseQuery {
    store: Arc<dyn CaseStore>,
}

impl CaseQuery {
    pub fn new(store: Arc<dyn CaseStore>) -> Self {
        Self { store }
    }

    /// Materialize the matching allocated cases.
    pub async fn matching(&self, predicate: &CompiledPredicate) -> Vec<Case> {
        if predicate.is_empty() {
            self.store.all_allocated().await
        } else {
            self.store.query_allocated(predicate).await
        }
    }

    /// Count without materializing. Always agrees with
    /// `matching(predicate).len()`.
    pub async fn count(&self, predicate: &CompiledPredicate) -> usize {
        if predicate.is_empty() {
            self.store.all_allocated().await.len()
        } else {
            self.store.count_allocated(predicate).await
        }
    }
}
