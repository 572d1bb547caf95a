use std::time::{SystemTime, UNIX_EPOCH};

use crate::{function::NativeFunction, value::Value};

/// Defined in the global scope of every interpreter.
pub const NATIVES: &[NativeFunction] = &[NativeFunction { name: "clock", arity: 0, fun: clock }];

/// Milliseconds since the Unix epoch.
fn clock(_: &[Value]) -> Value {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as f64)
        .unwrap_or_default();
    Value::Number(millis)
}
