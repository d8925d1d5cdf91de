//! Picking one endpoint out of a resolved list

use crate::core::error::{GonkaError, Result};
use crate::core::types::Endpoint;
use rand::seq::SliceRandom;
use std::fmt;
use std::sync::Arc;

type SelectFn = dyn Fn(&[Endpoint]) -> Endpoint + Send + Sync;

/// Strategy for choosing the endpoint a client talks to
#[derive(Clone, Default)]
pub enum EndpointSelector {
    /// Uniformly random choice
    #[default]
    Random,
    /// Caller-supplied choice, only ever invoked on a non-empty list
    Custom(Arc<SelectFn>),
}

impl EndpointSelector {
    pub fn custom<F>(select: F) -> Self
    where
        F: Fn(&[Endpoint]) -> Endpoint + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(select))
    }

    /// Always the first endpoint
    pub fn first() -> Self {
        Self::custom(|endpoints| endpoints[0].clone())
    }

    pub fn select(&self, endpoints: &[Endpoint]) -> Result<Endpoint> {
        if endpoints.is_empty() {
            return Err(GonkaError::no_endpoints("cannot select from an empty list"));
        }
        match self {
            Self::Random => endpoints
                .choose(&mut rand::thread_rng())
                .cloned()
                .ok_or_else(|| GonkaError::no_endpoints("cannot select from an empty list")),
            Self::Custom(select) => Ok(select(endpoints)),
        }
    }
}

impl fmt::Debug for EndpointSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random => f.write_str("Random"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> Vec<Endpoint> {
        (0..4)
            .map(|i| Endpoint::new(format!("http://node{i}/v1"), format!("gonka1node{i}")))
            .collect()
    }

    #[test]
    fn test_random_selects_member() {
        let list = endpoints();
        for _ in 0..50 {
            let chosen = EndpointSelector::Random.select(&list).unwrap();
            assert!(list.contains(&chosen));
        }
    }

    #[test]
    fn test_custom_selector() {
        let last = EndpointSelector::custom(|eps| eps[eps.len() - 1].clone());
        assert_eq!(last.select(&endpoints()).unwrap().address, "gonka1node3");
        assert_eq!(
            EndpointSelector::first().select(&endpoints()).unwrap().address,
            "gonka1node0"
        );
    }

    #[test]
    fn test_empty_list() {
        let err = EndpointSelector::first().select(&[]).unwrap_err();
        assert!(matches!(err, GonkaError::NoEndpoints { .. }));
    }
}
