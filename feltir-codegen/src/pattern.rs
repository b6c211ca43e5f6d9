//! # Construct combinators
//!
//! Reusable operation-stream shapes. [`if_zero`] emits the zero-test diamond
//! and [`conditional_transform`] wraps it into a complete function:
//!
//! ```text
//! entry(v) -> relabel(v) -> test(v)
//!                              |-- zero ------> join(r) -> return r
//!                              '-- nonzero(v) -> join(r)
//! ```
//!
//! The zero branch is always emitted before the nonzero branch, and the join
//! block takes its value positionally from both.

use crate::op::{FunctionSource, OpStream, VarId};
use feltir_spec::{Felt, ValueType};

/// Branch on `value == 0`.
///
/// `value` must be materialized. `on_zero` and `on_nonzero` each return a
/// materialized felt for the join block; `on_nonzero` receives the untested
/// copy of `value`. Returns the join block's value, renamed.
pub fn if_zero<Z, N>(stream: &mut OpStream, value: VarId, on_zero: Z, on_nonzero: N) -> VarId
where
    Z: FnOnce(&mut OpStream) -> VarId,
    N: FnOnce(&mut OpStream, VarId) -> VarId,
{
    let felt = ValueType::Felt252;
    let zero = stream.label();
    let nonzero = stream.label();
    let join = stream.label();

    let (tested, carried) = stream.dup(felt, value);
    let is_zero = stream.call("felt252_is_zero", &[tested], 1)[0];
    stream.cond_branch(is_zero, zero, &[], nonzero, &[carried]);

    stream.place(zero, &[]);
    let result = on_zero(stream);
    stream.branch(join, &[result]);

    let carried = stream.place(nonzero, &[felt])[0];
    let result = on_nonzero(stream, carried);
    stream.branch(join, &[result]);

    let merged = stream.place(join, &[felt])[0];
    stream.rename(felt, merged)
}

/// `if v == 0 { 0 } else { v * multiplier }` as a single-argument function
pub fn conditional_transform(name: &str, multiplier: Felt) -> FunctionSource {
    let felt = ValueType::Felt252;
    let mut s = OpStream::new(name, vec![felt]);
    let v = s.param(felt);

    // Route the argument through a relabeling block before the test
    let relabel = s.label();
    let test = s.label();
    s.branch(relabel, &[v]);
    let v = s.place(relabel, &[felt])[0];
    let v = s.rename(felt, v);
    s.branch(test, &[v]);
    let v = s.place(test, &[felt])[0];

    let result = if_zero(
        &mut s,
        v,
        |s| {
            let zero = s.constant(Felt::ZERO);
            s.store_temp(felt, zero)
        },
        |s, v| {
            let k = s.constant(multiplier);
            let product = s.call("felt252_mul", &[v, k], 1)[0];
            s.store_temp(felt, product)
        },
    );
    s.ret(&[result]);
    s.finish()
}
