//! Class binding integration tests: registration, dispatch, object
//! lifetimes, and handle identity across the full stack.

use std::cell::Cell;
use std::cell::RefCell;
use std::rc::Rc;

use script_bindings::{class_name, ErrorKind, Owned, ScriptClass, Value, Vm};

thread_local! {
    static CONSTRUCTOR_CALLED: Cell<bool> = const { Cell::new(false) };
    static DESTRUCTOR_CALLS: Cell<u32> = const { Cell::new(0) };
    static CHECK: Cell<bool> = const { Cell::new(false) };
    static CHECK_ANIMAL: Cell<bool> = const { Cell::new(false) };
}

fn reset_flags() {
    CONSTRUCTOR_CALLED.with(|c| c.set(false));
    DESTRUCTOR_CALLS.with(|c| c.set(0));
    CHECK.with(|c| c.set(false));
    CHECK_ANIMAL.with(|c| c.set(false));
}

struct Person {
    name: String,
    surname: String,
}

impl ScriptClass for Person {}

impl Person {
    fn new(name: String, surname: String) -> Self {
        CONSTRUCTOR_CALLED.with(|c| c.set(true));
        Self { name, surname }
    }

    fn simple_call(&self) {
        CHECK.with(|c| c.set(true));
        assert_eq!(self.name, "loh");
        assert_eq!(self.surname, "bolotniy");
    }

    fn simple_call_args(&self, a: i64, b: i64) {
        CHECK.with(|c| c.set(true));
        assert_eq!(self.name, "loh");
        assert_eq!(self.surname, "bolotniy");
        assert_eq!(a, 228);
        assert_eq!(b, 322);
    }

    fn simple_call_ret(&self, a: i64, b: i64) -> i64 {
        CHECK.with(|c| c.set(true));
        assert_eq!(self.name, "loh");
        assert_eq!(self.surname, "bolotniy");
        assert_eq!(a, 228);
        assert_eq!(b, 322);
        123
    }

    fn do_xor(a: i64, b: i64) -> i64 {
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        a ^ b
    }
}

impl Drop for Person {
    fn drop(&mut self) {
        DESTRUCTOR_CALLS.with(|c| c.set(c.get() + 1));
    }
}

struct Animal {
    name: String,
}

impl ScriptClass for Animal {}

impl Animal {
    fn new(name: String) -> Self {
        Self { name }
    }

    fn check(&self) {
        assert_eq!(self.name, "azaza");
        CHECK_ANIMAL.with(|c| c.set(true));
    }
}

#[test]
fn test_class_name() {
    assert_eq!("Person", class_name::<Person>());
}

#[test]
fn test_constructor() {
    reset_flags();
    let mut vm = Vm::new();
    vm.register_class::<Person>()
        .unwrap()
        .constructor(Person::new)
        .unwrap();

    vm.do_string::<()>("print(type(Person))\np = Person:new('loh', 'bolotniy')")
        .unwrap();
    assert!(CONSTRUCTOR_CALLED.with(Cell::get));
}

#[test]
fn test_simple_call() {
    reset_flags();
    let mut vm = Vm::new();
    vm.register_class::<Person>()
        .unwrap()
        .constructor(Person::new)
        .unwrap()
        .method("simpleCall", Person::simple_call)
        .unwrap();

    vm.do_string::<()>("p = Person:new('loh', 'bolotniy')\np:simpleCall()")
        .unwrap();
    assert!(CONSTRUCTOR_CALLED.with(Cell::get));
    assert!(CHECK.with(Cell::get));
}

#[test]
fn test_args() {
    reset_flags();
    let mut vm = Vm::new();
    vm.register_class::<Person>()
        .unwrap()
        .constructor(Person::new)
        .unwrap()
        .method("simpleCallArgs", Person::simple_call_args)
        .unwrap();

    vm.do_string::<()>("p = Person:new('loh', 'bolotniy')\np:simpleCallArgs(228, 322)")
        .unwrap();
    assert!(CONSTRUCTOR_CALLED.with(Cell::get));
    assert!(CHECK.with(Cell::get));
}

#[test]
fn test_args_with_return() {
    reset_flags();
    let mut vm = Vm::new();
    vm.register_function("check", |c: i64| {
        assert_eq!(c, 123);
    });
    vm.register_class::<Person>()
        .unwrap()
        .constructor(Person::new)
        .unwrap()
        .method("simpleCallRet", Person::simple_call_ret)
        .unwrap();

    vm.do_string::<()>("p = Person:new('loh', 'bolotniy')\ncheck(p:simpleCallRet(228, 322))")
        .unwrap();
    assert!(CONSTRUCTOR_CALLED.with(Cell::get));
    assert!(CHECK.with(Cell::get));
}

#[test]
fn test_destructor() {
    reset_flags();
    {
        let mut vm = Vm::new();
        vm.register_class::<Person>()
            .unwrap()
            .constructor(Person::new)
            .unwrap()
            .method("simpleCallRet", Person::simple_call_ret)
            .unwrap();

        vm.do_string::<()>("p = Person:new('loh', 'bolotniy')")
            .unwrap();
        assert!(CONSTRUCTOR_CALLED.with(Cell::get));
        assert_eq!(DESTRUCTOR_CALLS.with(Cell::get), 0);
    }
    assert_eq!(DESTRUCTOR_CALLS.with(Cell::get), 1);
}

#[test]
fn test_return_class() {
    reset_flags();
    let mut vm = Vm::new();
    vm.register_function("check", |c: i64| {
        assert_eq!(c, 123);
    });
    vm.register_function("makePerson", || {
        Owned(Person::new("loh".to_string(), "bolotniy".to_string()))
    });
    vm.register_class::<Person>()
        .unwrap()
        .method("simpleCallRet", Person::simple_call_ret)
        .unwrap();

    vm.do_string::<()>("p = makePerson()\ncheck(p:simpleCallRet(228, 322))")
        .unwrap();
    assert!(CONSTRUCTOR_CALLED.with(Cell::get));
    assert!(CHECK.with(Cell::get));
}

#[test]
fn test_multiple_classes() {
    reset_flags();
    let mut vm = Vm::new();
    vm.register_class::<Person>()
        .unwrap()
        .constructor(Person::new)
        .unwrap()
        .method("simpleCall", Person::simple_call)
        .unwrap();
    vm.register_class::<Animal>()
        .unwrap()
        .constructor(Animal::new)
        .unwrap()
        .method("check", Animal::check)
        .unwrap();

    vm.do_string::<()>("p = Person:new('loh', 'bolotniy')\np:simpleCall()")
        .unwrap();
    assert!(CHECK.with(Cell::get));

    // Two fresh instances are distinct objects.
    let result = vm
        .do_string::<bool>(
            "p1 = Person:new('loh', 'bolotniy')\n\
             p2 = Person:new('loh', 'bolotniy')\n\
             print('p1: '..p1)\n\
             print('p2: '..p2)\n\
             return p1 == p2",
        )
        .unwrap();
    assert!(!result);

    CHECK.with(|c| c.set(false));
    vm.do_string::<()>("a = Animal:new('azaza')\na:check()")
        .unwrap();
    assert!(CHECK_ANIMAL.with(Cell::get));
    assert!(!CHECK.with(Cell::get));
    CHECK_ANIMAL.with(|c| c.set(false));
    vm.do_string::<()>("p = Person:new('loh', 'bolotniy')\np:simpleCall()")
        .unwrap();
    assert!(CHECK.with(Cell::get));
    assert!(!CHECK_ANIMAL.with(Cell::get));
    vm.do_string::<()>("a = Animal:new('azaza')\na:check()")
        .unwrap();
    assert!(CHECK_ANIMAL.with(Cell::get));
}

#[test]
fn test_method_rejects_wrong_class_receiver() {
    reset_flags();
    let mut vm = Vm::new();
    vm.register_class::<Person>()
        .unwrap()
        .constructor(Person::new)
        .unwrap()
        .method("simpleCall", Person::simple_call)
        .unwrap();
    vm.register_class::<Animal>()
        .unwrap()
        .constructor(Animal::new)
        .unwrap()
        .method("check", Animal::check)
        .unwrap();

    // The method tables never leak across classes.
    let err = vm
        .do_string::<()>("a = Animal:new('azaza')\na:simpleCall()")
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypeMismatch);
}

struct SomeClass {
    value: i64,
}

impl ScriptClass for SomeClass {}

impl SomeClass {
    fn new(value: i64) -> Self {
        Self { value }
    }

    fn get_value(&self) -> i64 {
        self.value
    }
}

impl Drop for SomeClass {
    fn drop(&mut self) {
        DESTRUCTOR_CALLS.with(|c| c.set(c.get() + 1));
    }
}

#[test]
fn test_same_object() {
    reset_flags();
    {
        let mut vm = Vm::new();

        // Externally managed singletons shared into the runtime.
        let s228 = Rc::new(RefCell::new(SomeClass::new(228)));
        let s322 = Rc::new(RefCell::new(SomeClass::new(322)));

        {
            let s228 = s228.clone();
            let s322 = s322.clone();
            vm.register_class::<SomeClass>()
                .unwrap()
                .static_function("get228", move || s228.clone())
                .unwrap()
                .static_function("get322", move || s322.clone())
                .unwrap()
                .method("getValue", SomeClass::get_value)
                .unwrap();
        }

        // Wrapping the same native object twice yields the same handle.
        let result = vm
            .do_string::<bool>(
                "v1 = SomeClass:get228()\n\
                 v2 = SomeClass:get228()\n\
                 print('v1: '..v1)\n\
                 print('v2: '..v2)\n\
                 return v1 == v2",
            )
            .unwrap();
        assert!(result);

        let result = vm
            .do_string::<bool>(
                "v1 = SomeClass:get228()\n\
                 v2 = SomeClass:get228()\n\
                 return v1:getValue() == v2:getValue()",
            )
            .unwrap();
        assert!(result);

        let result = vm
            .do_string::<bool>(
                "v1 = SomeClass:get228()\n\
                 v2 = SomeClass:get228()\n\
                 return v1 ~= v2",
            )
            .unwrap();
        assert!(!result);

        let result = vm
            .do_string::<bool>(
                "v1 = SomeClass:get228()\n\
                 v2 = SomeClass:get322()\n\
                 return v1 ~= v2",
            )
            .unwrap();
        assert!(result);

        // Externally owned: dropping the VM must not destroy them.
        drop(vm);
        assert_eq!(DESTRUCTOR_CALLS.with(Cell::get), 0);
    }
    // Both singletons die with their last co-owner.
    assert_eq!(DESTRUCTOR_CALLS.with(Cell::get), 2);
}

#[test]
fn test_static_method() {
    reset_flags();
    let mut vm = Vm::new();
    vm.register_class::<Person>()
        .unwrap()
        .static_function("doXor", Person::do_xor)
        .unwrap();

    let result = vm.do_string::<i64>("return Person:doXor(1, 2)").unwrap();
    assert_eq!(result, 1 ^ 2);
}

#[test]
fn test_duplicate_class_registration() {
    let mut vm = Vm::new();
    vm.register_class::<Person>().unwrap();
    let err = vm.register_class::<Person>().unwrap_err();
    assert_eq!(err.kind, ErrorKind::DuplicateRegistration);
}

#[test]
fn test_argument_count_mismatch() {
    reset_flags();
    let mut vm = Vm::new();
    vm.register_class::<Person>()
        .unwrap()
        .constructor(Person::new)
        .unwrap()
        .method("simpleCallArgs", Person::simple_call_args)
        .unwrap();

    let err = vm
        .do_string::<()>("p = Person:new('loh', 'bolotniy')\np:simpleCallArgs(228)")
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ArgumentCountMismatch);
}

#[test]
fn test_argument_type_mismatch() {
    reset_flags();
    let mut vm = Vm::new();
    vm.register_class::<Person>()
        .unwrap()
        .constructor(Person::new)
        .unwrap()
        .method("simpleCallArgs", Person::simple_call_args)
        .unwrap();

    let err = vm
        .do_string::<()>("p = Person:new('loh', 'bolotniy')\np:simpleCallArgs('a', 'b')")
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypeMismatch);
    assert!(err.message.contains("argument #1"));
}

#[test]
fn test_result_type_mismatch() {
    let mut vm = Vm::new();
    let err = vm.do_string::<i64>("return 'hello'").unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypeMismatch);
}

#[test]
fn test_retained_handle_goes_stale_with_vm() {
    reset_flags();
    let mut vm = Vm::new();
    vm.register_class::<Person>()
        .unwrap()
        .constructor(Person::new)
        .unwrap();
    vm.do_string::<()>("p = Person:new('loh', 'bolotniy')")
        .unwrap();

    let Some(Value::Object(handle)) = vm.global("p") else {
        panic!("expected 'p' to hold an object handle");
    };
    assert!(!handle.is_stale());

    drop(vm);
    // The runtime-owned object died with the VM.
    assert_eq!(DESTRUCTOR_CALLS.with(Cell::get), 1);
    assert!(handle.is_stale());
    let err = handle.native().unwrap_err();
    assert_eq!(err.kind, ErrorKind::StaleHandle);
}
