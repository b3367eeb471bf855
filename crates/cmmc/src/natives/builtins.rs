//! Built-in native functions

use super::{CallContext, NativeRegistry, OperationId, ParamType};
use crate::common::CompileResult;
use crate::types::Value;

/// Register every built-in with `registry`
pub fn register_builtins(registry: &mut NativeRegistry) -> CompileResult<()> {
    use ParamType::{Any, Float, Int, String};

    registry.register("squareroot", vec![Float], squareroot)?;
    registry.register("power", vec![Float, Float], power)?;
    registry.register("messageBox", vec![String, String], message_box)?;
    registry.register("substring", vec![String, Int, Int], substring)?;
    registry.register("size", vec![String], size)?;
    registry.register("toString", vec![Any], to_string)?;

    log::debug!("registered {} native functions", registry.len());
    Ok(())
}

/// `squareroot(float) -> float`
fn squareroot(args: &[Value], _ctx: &mut CallContext) -> Option<Value> {
    let [Value::Float(x)] = args else { return None };
    Some(Value::Float(x.sqrt()))
}

/// `power(float base, float exponent) -> float`
fn power(args: &[Value], _ctx: &mut CallContext) -> Option<Value> {
    let [Value::Float(base), Value::Float(exponent)] = args else { return None };
    Some(Value::Float(base.powf(*exponent)))
}

/// `messageBox(string, string)`, handed to code generation unchanged
fn message_box(args: &[Value], ctx: &mut CallContext) -> Option<Value> {
    ctx.emit(OperationId::MessageBox, args.to_vec());
    None
}

/// `substring(string s, int start, int length) -> string`
///
/// Counts characters. Negative numbers count as zero and the result is cut
/// short at the end of `s`.
fn substring(args: &[Value], _ctx: &mut CallContext) -> Option<Value> {
    let [Value::String(s), Value::Int(start), Value::Int(length)] = args else { return None };

    let start = usize::try_from(*start).unwrap_or(0);
    let length = usize::try_from(*length).unwrap_or(0);
    Some(Value::String(s.chars().skip(start).take(length).collect()))
}

/// `size(string) -> int`, in characters
fn size(args: &[Value], _ctx: &mut CallContext) -> Option<Value> {
    let [Value::String(s)] = args else { return None };
    Some(Value::Int(i64::try_from(s.chars().count()).unwrap_or(i64::MAX)))
}

/// `toString(int | float | string) -> string`
fn to_string(args: &[Value], _ctx: &mut CallContext) -> Option<Value> {
    let [value] = args else { return None };
    Some(Value::String(value.to_string()))
}
