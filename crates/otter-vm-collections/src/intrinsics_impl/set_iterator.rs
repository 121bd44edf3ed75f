//! Set Iterator objects (`%SetIteratorPrototype%`, ES2023 §24.2.5)
//!
//! A Set Iterator owns a [`SetCursor`] over the Set's storage. The cursor
//! re-reads the storage on every `next()`, so iteration is live: values added
//! before the cursor reaches the end are produced, deleted ones are skipped.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::builtin_builder::PrototypeBuilder;
use crate::context::NativeContext;
use crate::convert::to_display_string;
use crate::error::{VmError, VmResult};
use crate::intrinsics::Intrinsics;
use crate::iterator::create_iter_result_object;
use crate::object::{JsObject, ObjectKind, PropertyAttributes, PropertyKey};
use crate::set_data::{SetCursor, SetData};
use crate::string::JsString;
use crate::value::Value;

/// What each step of a Set Iterator produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetIterationKind {
    /// `value` (`values()`, `keys()`, `@@iterator`)
    Value,
    /// `[value, value]` (`entries()`)
    KeyAndValue,
}

/// Internal slots of a Set Iterator object
pub struct SetIteratorState {
    cursor: Mutex<SetCursor>,
    kind: SetIterationKind,
}

impl SetIteratorState {
    /// Attach a fresh cursor to `data`
    pub fn new(data: Arc<SetData>, kind: SetIterationKind) -> Self {
        Self {
            cursor: Mutex::new(SetCursor::new(data)),
            kind,
        }
    }

    /// Projection kind
    pub fn kind(&self) -> SetIterationKind {
        self.kind
    }

    /// Has the iterator finished
    pub fn is_done(&self) -> bool {
        self.cursor.lock().is_done()
    }

    /// Advance the cursor. The lock is released before returning.
    pub fn next_value(&self) -> Option<Value> {
        self.cursor.lock().next_value()
    }
}

impl std::fmt::Debug for SetIteratorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetIteratorState")
            .field("cursor", &*self.cursor.lock())
            .field("kind", &self.kind)
            .finish()
    }
}

/// CreateSetIterator(set, kind)
///
/// `set` must already be validated as a Set.
pub fn create_set_iterator(ncx: &NativeContext<'_>, data: Arc<SetData>, kind: SetIterationKind) -> Value {
    let proto = ncx.intrinsics().set_iterator_prototype.clone();
    let iter = JsObject::with_kind(
        Some(proto),
        ObjectKind::SetIterator(SetIteratorState::new(data, kind)),
    );
    Value::object(Arc::new(iter))
}

/// Install `next` and `@@toStringTag` on `%SetIteratorPrototype%`
pub fn init_set_iterator_prototype(intrinsics: &Intrinsics) {
    PrototypeBuilder::new(
        intrinsics.function_prototype.clone(),
        intrinsics.set_iterator_prototype.clone(),
    )
    .inherits(intrinsics.iterator_prototype.clone())
    .method("next", set_iterator_next, 0)
    .property(
        PropertyKey::Symbol(intrinsics.symbol_to_string_tag.id),
        Value::string(JsString::intern("Set Iterator")),
        PropertyAttributes::builtin_accessor(),
    )
    .build();
}

/// `%SetIteratorPrototype%.next()`
fn set_iterator_next(this: &Value, _args: &[Value], ncx: &mut NativeContext<'_>) -> VmResult<Value> {
    let state = this.as_object().and_then(|obj| match obj.kind() {
        ObjectKind::SetIterator(state) => Some(state),
        _ => None,
    });
    let Some(state) = state else {
        return Err(VmError::type_error(format!(
            "Method %SetIteratorPrototype%.next called on incompatible receiver {}",
            to_display_string(this)
        )));
    };

    let Some(value) = state.next_value() else {
        return Ok(create_iter_result_object(ncx, Value::undefined(), true));
    };
    let value = match state.kind() {
        SetIterationKind::Value => value,
        SetIterationKind::KeyAndValue => {
            Value::object(ncx.new_array(vec![value.clone(), value]))
        }
    };
    Ok(create_iter_result_object(ncx, value, false))
}
