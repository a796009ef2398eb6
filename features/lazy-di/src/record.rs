use std::{any::type_name, collections::HashMap, sync::Arc};

use crate::{
    errors::AcquireError,
    types::{Injectable, Instance, TypeInfo},
};

pub(crate) type Table = HashMap<String, Record>;

/// Construction progress of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    /// The constructor is running somewhere in the current chain
    Building,
    /// The value is stored, terminal
    Built,
}

/// Per-key entry of the registry table
pub(crate) struct Record {
    /// Type the key was first requested (or injected) as
    pub info: TypeInfo,
    /// None while building, unless the key is cycle tolerant
    pub value: Option<Instance>,
    pub state: BuildState,
    pub cycle_tolerant: bool,
    pub tags: Vec<String>,
}

impl Record {
    pub fn building<T: Injectable>(placeholder: Option<T>, tags: Vec<String>) -> Self {
        Record {
            info: TypeInfo::of::<T>(),
            cycle_tolerant: placeholder.is_some(),
            value: placeholder.map(Instance::new),
            state: BuildState::Building,
            tags,
        }
    }

    pub fn built(instance: Instance, tags: Vec<String>) -> Self {
        Record {
            info: instance.info,
            value: Some(instance),
            state: BuildState::Built,
            cycle_tolerant: false,
            tags,
        }
    }

    /// Stores the constructed value, Building -> Built
    pub fn complete(&mut self, instance: Instance) {
        debug_assert_eq!(self.state, BuildState::Building);
        self.value = Some(instance);
        self.state = BuildState::Built;
    }

    /// Returns the current value as `T`
    pub fn extract<T: Injectable>(&self, key: &str) -> Result<Arc<T>, AcquireError> {
        let mismatch = |stored| AcquireError::TypeMismatch {
            key: key.to_string(),
            requested: type_name::<T>(),
            stored,
        };

        match &self.value {
            Some(instance) => instance.downcast::<T>().map_err(mismatch),
            None => Err(mismatch(self.info.type_name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerant_record_holds_placeholder() {
        let record = Record::building(Some(0_u64), vec![]);

        assert!(record.cycle_tolerant);
        assert_eq!(record.state, BuildState::Building);
        assert_eq!(*record.extract::<u64>("n").unwrap(), 0);
    }

    #[test]
    fn complete_replaces_placeholder() {
        let mut record = Record::building(Some(String::new()), vec!["svc".to_string()]);
        record.complete(Instance::new("done".to_string()));

        assert_eq!(record.state, BuildState::Built);
        assert_eq!(*record.extract::<String>("s").unwrap(), "done");
        assert_eq!(record.tags, vec!["svc".to_string()]);
    }

    #[test]
    fn extract_wrong_type_is_mismatch() {
        let record = Record::built(Instance::new(1_i32), vec![]);

        match record.extract::<String>("x") {
            Err(AcquireError::TypeMismatch {
                key,
                requested,
                stored,
            }) => {
                assert_eq!(key, "x");
                assert_eq!(requested, type_name::<String>());
                assert_eq!(stored, "i32");
            }
            other => panic!("expected type mismatch, got {:?}", other.map(|_| ())),
        }
    }
}
