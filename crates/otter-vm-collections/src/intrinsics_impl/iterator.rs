//! `%IteratorPrototype%`

use crate::builtin_builder::PrototypeBuilder;
use crate::intrinsics::Intrinsics;

/// Install `%IteratorPrototype%[@@iterator]`, which returns `this`
pub fn init_iterator_prototype(intrinsics: &Intrinsics) {
    PrototypeBuilder::new(
        intrinsics.function_prototype.clone(),
        intrinsics.iterator_prototype.clone(),
    )
    .symbol_method(
        &intrinsics.symbol_iterator,
        |this, _args, _ncx| Ok(this.clone()),
        0,
    )
    .build();
}
