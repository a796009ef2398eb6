use std::{
    any::{Any, TypeId},
    sync::Arc,
};

/// Error produced by constructors and post-build callbacks
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// The registry is shared between threads
/// So anything stored in it needs to be Send + Sync + 'static
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// Type-erased value stored under a key
#[derive(Clone)]
pub struct Instance {
    pub info: TypeInfo,
    pub instance: Arc<dyn Any + Send + Sync + 'static>,
}

impl Instance {
    pub(crate) fn new<Value: Injectable>(value: Value) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub(crate) fn from_arc<Value: Injectable>(value: Arc<Value>) -> Self {
        Instance {
            info: TypeInfo::of::<Value>(),
            instance: value,
        }
    }

    /// Extracts the stored value as `T`
    ///
    /// Returns the name of the stored type if it is not a `T`
    pub fn downcast<T: Injectable>(&self) -> Result<Arc<T>, &'static str> {
        match Arc::downcast::<T>(self.instance.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(self.info.type_name),
        }
    }
}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downcast_reports_the_stored_type() {
        let instance = Instance::new(42_u32);

        assert_eq!(*instance.downcast::<u32>().unwrap(), 42);
        assert_eq!(instance.downcast::<String>().unwrap_err(), "u32");
        assert_eq!(instance.info, TypeInfo::of::<u32>());
    }

    #[test]
    fn clones_share_the_allocation() {
        let instance = Instance::new(String::from("shared"));
        let copy = instance.clone();

        let a = instance.downcast::<String>().unwrap();
        let b = copy.downcast::<String>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
