//! Customer scoping of structures.

use serde::{Deserialize, Serialize};

use fieldmap_model::DataStructure;

/// Selects the structures visible to a customer.
///
/// A structure matches when it is shared (no customer tag) or tagged with
/// this customer; with a `business_component` the structure's component must
/// also agree (untagged structures still match).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeRule {
    pub customer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_component: Option<String>,
}

impl ScopeRule {
    pub fn customer(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            business_component: None,
        }
    }

    #[must_use]
    pub fn with_business_component(mut self, component: impl Into<String>) -> Self {
        self.business_component = Some(component.into());
        self
    }

    pub fn matches(&self, structure: &DataStructure) -> bool {
        let customer_ok = structure
            .customer_id
            .as_deref()
            .is_none_or(|c| c == self.customer_id);
        let component_ok = match (&self.business_component, &structure.business_component) {
            (Some(wanted), Some(actual)) => wanted == actual,
            _ => true,
        };
        customer_ok && component_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldmap_model::{FieldTree, StructureFormat};

    fn structure(customer: Option<&str>, component: Option<&str>) -> DataStructure {
        DataStructure::new("s", StructureFormat::Json, FieldTree::from_specs("root", vec![]).unwrap())
            .with_scope(customer.map(String::from), component.map(String::from))
    }

    #[test]
    fn shared_structures_match_every_customer() {
        assert!(ScopeRule::customer("acme").matches(&structure(None, None)));
    }

    #[test]
    fn other_customers_are_hidden() {
        let rule = ScopeRule::customer("acme");
        assert!(rule.matches(&structure(Some("acme"), None)));
        assert!(!rule.matches(&structure(Some("globex"), None)));
    }

    #[test]
    fn business_component_narrows() {
        let rule = ScopeRule::customer("acme").with_business_component("billing");
        assert!(rule.matches(&structure(Some("acme"), Some("billing"))));
        assert!(rule.matches(&structure(Some("acme"), None)));
        assert!(!rule.matches(&structure(Some("acme"), Some("shipping"))));
    }
}
