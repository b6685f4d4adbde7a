//! Global builtin functions installed into every new VM.

use std::rc::Rc;

use script_core::{MarshalContext, NativeFunction, ScriptError, Trampoline, Value};

use crate::context::ExecutionContext;

/// Install `print`, `type`, and `tostring` into the context's globals.
pub fn install(ctx: &mut ExecutionContext) {
    register(ctx, "print", Rc::new(print));
    register(ctx, "type", Rc::new(type_of));
    register(ctx, "tostring", Rc::new(tostring));
}

fn register(ctx: &mut ExecutionContext, name: &str, call: Trampoline) {
    ctx.set_global(
        name,
        Value::Function(Rc::new(NativeFunction {
            name: name.to_string(),
            call,
        })),
    );
}

/// `print(...)`: writes the arguments separated by tabs.
fn print(_ctx: &mut MarshalContext<'_>, args: Vec<Value>) -> Result<Value, ScriptError> {
    let line = args
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join("\t");
    println!("{line}");
    Ok(Value::Nil)
}

/// `type(v)`: the type name of a value.
fn type_of(_ctx: &mut MarshalContext<'_>, args: Vec<Value>) -> Result<Value, ScriptError> {
    let [value] = args.as_slice() else {
        return Err(ScriptError::argument_count(1, args.len()));
    };
    Ok(Value::string(value.type_name()))
}

/// `tostring(v)`: the display form of a value.
fn tostring(_ctx: &mut MarshalContext<'_>, args: Vec<Value>) -> Result<Value, ScriptError> {
    let [value] = args.as_slice() else {
        return Err(ScriptError::argument_count(1, args.len()));
    };
    Ok(Value::string(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::Evaluator;
    use script_parser::Parser;

    fn eval(source: &str) -> Value {
        let mut ctx = ExecutionContext::new();
        install(&mut ctx);
        let block = Parser::new(source).unwrap().parse().unwrap();
        Evaluator::new(&mut ctx).run(&block).unwrap()
    }

    #[test]
    fn test_type_builtin() {
        assert_eq!(eval("return type(nil)"), Value::string("nil"));
        assert_eq!(eval("return type(1)"), Value::string("number"));
        assert_eq!(eval("return type('x')"), Value::string("string"));
        assert_eq!(eval("return type(print)"), Value::string("function"));
    }

    #[test]
    fn test_tostring_builtin() {
        assert_eq!(eval("return tostring(42)"), Value::string("42"));
        assert_eq!(eval("return tostring(true)"), Value::string("true"));
    }

    #[test]
    fn test_type_arity_checked() {
        let mut ctx = ExecutionContext::new();
        install(&mut ctx);
        let block = Parser::new("return type(1, 2)").unwrap().parse().unwrap();
        let err = Evaluator::new(&mut ctx).run(&block).unwrap_err();
        assert_eq!(err.kind, script_core::ErrorKind::ArgumentCountMismatch);
    }

    #[test]
    fn test_print_returns_nil() {
        assert_eq!(eval("return print('hello', 1)"), Value::Nil);
    }
}
