//! Intrinsics registry for the built-in objects and well-known symbols.
//!
//! `Intrinsics` holds references to every intrinsic object this crate
//! defines. It is created once per `VmRuntime` and shared across contexts.
//!
//! Initialization follows a staged pattern:
//! 1. **Allocate** empty prototype/constructor objects to break circular deps
//! 2. **Wire** prototype chains
//! 3. **Init** properties in dependency order using `BuiltInBuilder`

use std::sync::Arc;

use crate::intrinsics_impl;
use crate::object::JsObject;
use crate::value::{NativeFn, Symbol, Value};

/// Well-known symbol IDs (fixed, pre-defined).
pub mod well_known {
    /// `Symbol.iterator`
    pub const ITERATOR: u64 = 1;
    /// `Symbol.toStringTag`
    pub const TO_STRING_TAG: u64 = 3;
    /// `Symbol.toPrimitive`
    pub const TO_PRIMITIVE: u64 = 5;
    /// `Symbol.species`
    pub const SPECIES: u64 = 12;
}

/// Registry of intrinsic objects and well-known symbols.
#[derive(Clone)]
pub struct Intrinsics {
    /// `Object.prototype`, `[[Prototype]]` is `null`
    pub object_prototype: Arc<JsObject>,
    /// `Function.prototype`, itself callable (returns `undefined`)
    pub function_prototype: Arc<JsObject>,
    /// `Array.prototype`
    pub array_prototype: Arc<JsObject>,
    /// `%IteratorPrototype%`
    pub iterator_prototype: Arc<JsObject>,
    /// `Set.prototype`
    pub set_prototype: Arc<JsObject>,
    /// `%SetIteratorPrototype%`
    pub set_iterator_prototype: Arc<JsObject>,
    /// The `Set` constructor
    pub set_constructor: Arc<JsObject>,

    /// `Symbol.iterator`
    pub symbol_iterator: Arc<Symbol>,
    /// `Symbol.toStringTag`
    pub symbol_to_string_tag: Arc<Symbol>,
    /// `Symbol.toPrimitive`
    pub symbol_to_primitive: Arc<Symbol>,
    /// `Symbol.species`
    pub symbol_species: Arc<Symbol>,
}

impl Intrinsics {
    /// Allocate, wire and initialize all intrinsics
    pub fn new() -> Self {
        let intrinsics = Self::allocate();
        intrinsics.wire_prototype_chains();
        intrinsics.init_core();
        intrinsics.init_collections();
        intrinsics
    }

    /// Allocate every intrinsic object with no properties and no prototype.
    ///
    /// Function objects must be created with their call behavior up front, so
    /// `Function.prototype` and `Set` are allocated as functions here.
    fn allocate() -> Self {
        let alloc = || Arc::new(JsObject::new(None));

        let fn_proto_impl: NativeFn = Arc::new(|_, _, _| Ok(Value::undefined()));
        let function_prototype = Arc::new(JsObject::function(None, fn_proto_impl, false));

        let set_ctor_impl: NativeFn = Arc::new(intrinsics_impl::set::set_constructor);
        let set_constructor = Arc::new(JsObject::function(
            Some(function_prototype.clone()),
            set_ctor_impl,
            true,
        ));

        Self {
            object_prototype: alloc(),
            function_prototype,
            array_prototype: Arc::new(JsObject::array(None, Vec::new())),
            iterator_prototype: alloc(),
            set_prototype: alloc(),
            set_iterator_prototype: alloc(),
            set_constructor,
            symbol_iterator: Symbol::with_id(well_known::ITERATOR, "Symbol.iterator"),
            symbol_to_string_tag: Symbol::with_id(well_known::TO_STRING_TAG, "Symbol.toStringTag"),
            symbol_to_primitive: Symbol::with_id(well_known::TO_PRIMITIVE, "Symbol.toPrimitive"),
            symbol_species: Symbol::with_id(well_known::SPECIES, "Symbol.species"),
        }
    }

    /// Set the `[[Prototype]]` of each intrinsic object.
    fn wire_prototype_chains(&self) {
        // Object.prototype.[[Prototype]] stays null
        let protos_to_obj = [
            &self.function_prototype,
            &self.array_prototype,
            &self.iterator_prototype,
            &self.set_prototype,
        ];
        for proto in protos_to_obj {
            proto.set_prototype(Some(self.object_prototype.clone()));
        }
        self.set_iterator_prototype
            .set_prototype(Some(self.iterator_prototype.clone()));
    }

    /// `Object.prototype` and `%IteratorPrototype%`
    fn init_core(&self) {
        intrinsics_impl::object::init_object_prototype(self);
        intrinsics_impl::iterator::init_iterator_prototype(self);
    }

    /// `Set`, `Set.prototype` and `%SetIteratorPrototype%`
    fn init_collections(&self) {
        intrinsics_impl::set::init_set(self);
        intrinsics_impl::set_iterator::init_set_iterator_prototype(self);
    }

    /// Look up a well-known symbol by id
    pub fn well_known_symbol(&self, id: u64) -> Option<&Arc<Symbol>> {
        match id {
            well_known::ITERATOR => Some(&self.symbol_iterator),
            well_known::TO_STRING_TAG => Some(&self.symbol_to_string_tag),
            well_known::TO_PRIMITIVE => Some(&self.symbol_to_primitive),
            well_known::SPECIES => Some(&self.symbol_species),
            _ => None,
        }
    }
}

impl Default for Intrinsics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::PropertyKey;

    #[test]
    fn test_prototype_chains() {
        let intrinsics = Intrinsics::new();
        assert!(intrinsics.object_prototype.prototype().is_none());
        assert!(Arc::ptr_eq(
            &intrinsics.set_prototype.prototype().unwrap(),
            &intrinsics.object_prototype
        ));
        assert!(Arc::ptr_eq(
            &intrinsics.set_iterator_prototype.prototype().unwrap(),
            &intrinsics.iterator_prototype
        ));
        assert!(Arc::ptr_eq(
            &intrinsics.set_constructor.prototype().unwrap(),
            &intrinsics.function_prototype
        ));
        assert!(intrinsics.function_prototype.is_callable());
        assert!(intrinsics.set_constructor.is_constructor());
    }

    #[test]
    fn test_well_known_symbols() {
        let intrinsics = Intrinsics::new();
        assert_eq!(intrinsics.symbol_iterator.id, well_known::ITERATOR);
        assert_eq!(
            intrinsics
                .well_known_symbol(well_known::SPECIES)
                .map(|s| s.id),
            Some(well_known::SPECIES)
        );
        assert!(intrinsics.well_known_symbol(99).is_none());
        assert!(
            intrinsics
                .set_prototype
                .has_own(&PropertyKey::Symbol(well_known::ITERATOR))
        );
    }

    #[test]
    fn test_intrinsics_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Intrinsics>();
    }
}
