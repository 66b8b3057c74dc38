//! Function and event tables assembled once from the parsed ABI.
//!
//! Lookups go through these tables instead of reflecting over a generic
//! contract object, so an unknown function name is a typed error and the
//! callable surface is fixed at startup.

use std::collections::HashMap;

use ethers::abi::{Abi, Event, Function};
use ethers::types::H256;

use crate::infrastructure::contracts::types::ContractError;

pub struct AbiRegistry {
    functions: HashMap<String, Vec<Function>>,
    events: HashMap<H256, Event>,
}

impl AbiRegistry {
    pub fn new(abi: &Abi) -> Self {
        let mut functions: HashMap<String, Vec<Function>> = HashMap::new();
        for function in abi.functions() {
            functions
                .entry(function.name.clone())
                .or_default()
                .push(function.clone());
        }

        let events = abi
            .events()
            .map(|event| (event.signature(), event.clone()))
            .collect();

        Self { functions, events }
    }

    /// Resolve a function by name. Overloads are disambiguated by the number
    /// of supplied parameters.
    pub fn function(&self, name: &str, arity: usize) -> Result<&Function, ContractError> {
        let candidates = self
            .functions
            .get(name)
            .ok_or_else(|| ContractError::UnknownFunction {
                name: name.to_string(),
            })?;

        if candidates.len() == 1 {
            return Ok(&candidates[0]);
        }

        candidates
            .iter()
            .find(|function| function.inputs.len() == arity)
            .ok_or_else(|| ContractError::UnknownFunction {
                name: format!("{} with {} parameter(s)", name, arity),
            })
    }

    pub fn event_for_topic(&self, topic: &H256) -> Option<&Event> {
        self.events.get(topic)
    }

    pub fn function_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.events.values().map(|e| e.name.clone()).collect();
        names.sort();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABI: &str = r#"[
        {"type":"function","name":"balanceOf","stateMutability":"view",
         "inputs":[{"name":"account","type":"address"}],
         "outputs":[{"name":"","type":"uint256"}]},
        {"type":"function","name":"transfer","stateMutability":"nonpayable",
         "inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],
         "outputs":[{"name":"","type":"bool"}]},
        {"type":"function","name":"approve","stateMutability":"nonpayable",
         "inputs":[{"name":"spender","type":"address"},{"name":"amount","type":"uint256"}],
         "outputs":[{"name":"","type":"bool"}]},
        {"type":"function","name":"approve","stateMutability":"nonpayable",
         "inputs":[{"name":"spender","type":"address"},{"name":"amount","type":"uint256"},{"name":"deadline","type":"uint256"}],
         "outputs":[{"name":"","type":"bool"}]},
        {"type":"event","name":"Transfer","anonymous":false,
         "inputs":[{"name":"from","type":"address","indexed":true},
                   {"name":"to","type":"address","indexed":true},
                   {"name":"value","type":"uint256","indexed":false}]}
    ]"#;

    fn registry() -> AbiRegistry {
        let abi: Abi = serde_json::from_str(ABI).unwrap();
        AbiRegistry::new(&abi)
    }

    #[test]
    fn unknown_function_is_a_typed_error() {
        let err = registry()
            .function("mintUnicorns", 0)
            .expect_err("unknown name must fail");
        assert!(matches!(err, ContractError::UnknownFunction { .. }));
    }

    #[test]
    fn overloads_resolve_by_arity() {
        let registry = registry();
        assert_eq!(registry.function("approve", 2).unwrap().inputs.len(), 2);
        assert_eq!(registry.function("approve", 3).unwrap().inputs.len(), 3);
        assert!(registry.function("approve", 5).is_err());
    }

    #[test]
    fn single_candidate_ignores_arity() {
        // Binding reports the precise missing/extra parameter afterwards.
        let registry = registry();
        assert!(registry.function("balanceOf", 7).is_ok());
    }

    #[test]
    fn events_are_indexed_by_signature_topic() {
        let abi: Abi = serde_json::from_str(ABI).unwrap();
        let transfer = abi.events_by_name("Transfer").unwrap()[0].clone();
        let registry = AbiRegistry::new(&abi);

        let event = registry.event_for_topic(&transfer.signature()).unwrap();
        assert_eq!(event.name, "Transfer");
        assert!(registry.event_for_topic(&H256::zero()).is_none());
    }

    #[test]
    fn names_are_sorted_for_display() {
        let registry = registry();
        assert_eq!(
            registry.function_names(),
            vec!["approve", "balanceOf", "transfer"]
        );
        assert_eq!(registry.event_names(), vec!["Transfer"]);
    }
}
