/// Capability consumed by the identity-augmented engines: can this
/// authenticated identity assert a claim of the given type and value?
///
/// Claim values are compared as strings. Implement this for your own
/// principal type, or use the bundled [`Principal`].
pub trait ClaimSource {
    fn has_claim(&self, claim_type: &str, value: &str) -> bool;
}

/// A (type, value) pair asserted by an authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    claim_type: String,
    value: String,
}

impl Claim {
    #[must_use]
    pub fn new(claim_type: &str, value: &str) -> Self {
        Self {
            claim_type: claim_type.to_owned(),
            value: value.to_owned(),
        }
    }

    #[must_use]
    pub fn claim_type(&self) -> &str {
        &self.claim_type
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// One authenticated identity holding a set of claims.
#[derive(Debug, Clone, Default)]
pub struct Identity {
    claims: Vec<Claim>,
}

impl Identity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn claim(mut self, claim_type: &str, value: &str) -> Self {
        self.claims.push(Claim::new(claim_type, value));
        self
    }

    #[must_use]
    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }
}

/// A principal carrying one or more identities; the claim test is an
/// existential scan over all of them.
#[derive(Debug, Clone, Default)]
pub struct Principal {
    identities: Vec<Identity>,
}

impl Principal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn identity(mut self, identity: Identity) -> Self {
        self.identities.push(identity);
        self
    }
}

impl ClaimSource for Principal {
    fn has_claim(&self, claim_type: &str, value: &str) -> bool {
        self.identities.iter().any(|id| {
            id.claims
                .iter()
                .any(|c| c.claim_type == claim_type && c.value == value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROLE: &str = "http://schemas.example.org/claims/role";

    #[test]
    fn has_claim_matches_type_and_value() {
        let p = Principal::new().identity(Identity::new().claim(ROLE, "manager"));
        assert!(p.has_claim(ROLE, "manager"));
        assert!(!p.has_claim(ROLE, "admin"));
        assert!(!p.has_claim("http://other", "manager"));
    }

    #[test]
    fn claim_found_in_any_identity() {
        let p = Principal::new()
            .identity(Identity::new().claim(ROLE, "clerk"))
            .identity(Identity::new().claim(ROLE, "manager"));
        assert!(p.has_claim(ROLE, "manager"));
        assert!(p.has_claim(ROLE, "clerk"));
    }

    #[test]
    fn empty_principal_has_no_claims() {
        let p = Principal::new();
        assert!(!p.has_claim(ROLE, "manager"));
    }
}
