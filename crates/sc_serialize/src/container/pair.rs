use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use crate::object::builtin;
use crate::registry::{ClassDescriptor, FieldDescriptor, GenericClassInfo, GenericType, TypeRegistry};
use crate::registry::value_access;
use crate::{TypeUuid, Typed};

impl<K: Typed + Default, V: Typed + Default> Typed for (K, V) {
    fn type_uuid() -> TypeUuid {
        builtin::PAIR.combine(&[K::type_uuid(), V::type_uuid()])
    }

    fn type_name() -> &'static str {
        "Pair"
    }

    fn register_generic_info(registry: &mut TypeRegistry) -> Option<Arc<GenericClassInfo>> {
        Some(registry.register_generic::<Self>())
    }
}

fn key<K, V>(pair: &(K, V)) -> &K {
    &pair.0
}

fn key_mut<K, V>(pair: &mut (K, V)) -> &mut K {
    &mut pair.0
}

fn value<K, V>(pair: &(K, V)) -> &V {
    &pair.1
}

fn value_mut<K, V>(pair: &mut (K, V)) -> &mut V {
    &mut pair.1
}

fn with_generic(field: FieldDescriptor, generic: Option<Arc<GenericClassInfo>>) -> FieldDescriptor {
    match generic {
        Some(generic) => field.with_generic(generic),
        None => field,
    }
}

impl<K: Typed + Default, V: Typed + Default> GenericType for (K, V) {
    fn generic_uuid() -> TypeUuid {
        builtin::PAIR
    }

    fn template_arguments() -> Vec<TypeUuid> {
        vec![K::type_uuid(), V::type_uuid()]
    }

    fn reflect_generic(registry: &mut TypeRegistry) -> GenericClassInfo {
        let key_field = with_generic(
            FieldDescriptor::new("key", K::type_uuid(), value_access::<Self, K>(key, key_mut)),
            K::register_generic_info(registry),
        );
        let value_field = with_generic(
            FieldDescriptor::new("value", V::type_uuid(), value_access::<Self, V>(value, value_mut)),
            V::register_generic_info(registry),
        );
        let class = ClassDescriptor::with_default::<Self>()
            .with_field(key_field)
            .with_field(value_field);
        GenericClassInfo::new(builtin::PAIR, Self::template_arguments(), class)
    }
}
