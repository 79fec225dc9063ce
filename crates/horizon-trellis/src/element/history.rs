//! Per-attribute history overlay.
//!
//! Several gated definitions may write the same attribute. For each key the
//! history keeps the live claims in the order they were last asserted; the
//! top claim is the effective owner and its value is what the node shows.
//! Retracting a claim that is not on top leaves the node untouched, and
//! retracting the top claim hands the attribute back to the next claim down
//! (or resets it when none is left).
//!
//! Unconditional claims are never retracted, so a new one supersedes every
//! older unconditional claim on the same key instead of stacking on it.

use std::collections::HashMap;

use horizon_trellis_core::Value;

use super::definition::DefinitionId;

/// What the node must do after a claim is retracted.
#[derive(Debug, Clone, PartialEq)]
pub enum Retraction {
    /// Another definition still owns the attribute; leave the node alone.
    Untouched,
    /// The retracting definition was on top; show the next claim's value.
    Restore(Value),
    /// No claim remains; reset the attribute to its neutral value.
    Reset,
}

#[derive(Debug, Clone)]
struct Claim {
    owner: DefinitionId,
    value: Value,
    unconditional: bool,
}

/// History table for one attribute domain (properties or styles).
#[derive(Debug, Default)]
pub struct History {
    claims: HashMap<String, Vec<Claim>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `owner` now asserts `value` for `key`.
    ///
    /// The claim moves to the top, replacing any earlier claim by the same
    /// owner.
    pub fn assert(&mut self, owner: DefinitionId, key: &str, value: Value) {
        let claims = self.claims.entry(key.to_string()).or_default();
        claims.retain(|claim| claim.owner != owner);
        claims.push(Claim {
            owner,
            value,
            unconditional: false,
        });
    }

    /// Record an ungated `value` for `key`.
    ///
    /// Older unconditional claims on `key` are dropped; gated claims keep
    /// their place below the new top.
    pub fn assert_unconditional(&mut self, owner: DefinitionId, key: &str, value: Value) {
        let claims = self.claims.entry(key.to_string()).or_default();
        claims.retain(|claim| claim.owner != owner && !claim.unconditional);
        claims.push(Claim {
            owner,
            value,
            unconditional: true,
        });
    }

    /// Withdraw `owner`'s claim on `key`.
    pub fn retract(&mut self, owner: DefinitionId, key: &str) -> Retraction {
        let Some(claims) = self.claims.get_mut(key) else {
            return Retraction::Reset;
        };

        let Some(position) = claims.iter().position(|claim| claim.owner == owner) else {
            return if claims.is_empty() {
                Retraction::Reset
            } else {
                Retraction::Untouched
            };
        };

        let was_top = position + 1 == claims.len();
        claims.remove(position);

        if !was_top {
            return Retraction::Untouched;
        }

        if let Some(top) = claims.last() {
            return Retraction::Restore(top.value.clone());
        }

        self.claims.remove(key);
        Retraction::Reset
    }

    /// The effective owner of `key`.
    pub fn owner(&self, key: &str) -> Option<DefinitionId> {
        self.claims
            .get(key)
            .and_then(|claims| claims.last())
            .map(|claim| claim.owner)
    }

    /// The effective value of `key`.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.claims
            .get(key)
            .and_then(|claims| claims.last())
            .map(|claim| &claim.value)
    }

    /// Number of live claims on `key`.
    pub fn claim_count(&self, key: &str) -> usize {
        self.claims.get(key).map_or(0, Vec::len)
    }

    /// Number of keys with at least one live claim.
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn clear(&mut self) {
        self.claims.clear();
    }
}
