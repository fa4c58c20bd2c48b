#[macro_use]
mod common;

#[cfg(test)]
mod _super {
    tests! {
        bound_method is OK
        "class Base { method(arg) { print \"Base.method(\" + arg + \")\"; } }
         class Derived < Base { getMethod() { return super.method; } }
         var method = Derived().getMethod();
         method(\"arg\");" => "Base.method(arg)"
    }

    tests! {
        call_other_method is OK
        "class Base { foo() { print \"Base.foo()\"; } }
         class Derived < Base {
           bar() { print \"Derived.bar()\"; super.foo(); }
         }
         Derived().bar();" => "Derived.bar()", "Base.foo()"
    }

    tests! {
        call_same_method is OK
        "class Base { foo() { print \"Base.foo()\"; } }
         class Derived < Base {
           foo() { print \"Derived.foo()\"; super.foo(); }
         }
         Derived().foo();" => "Derived.foo()", "Base.foo()"
    }

    tests! {
        constructor is OK
        "class Base { init(a, b) { print \"Base.init(\" + a + \", \" + b + \")\"; } }
         class Derived < Base {
           init() { print \"Derived.init()\"; super.init(\"a\", \"b\"); }
         }
         Derived();" => "Derived.init()", "Base.init(a, b)"
    }

    tests! {
        extra_arguments is ERR
        "class Base { foo(a, b) { print \"Base.foo(\" + a + \", \" + b + \")\"; } }
         class Derived < Base { bar() { super.foo(1, 2, 3, 4); } }
         Derived().bar();" => "Expected 2 arguments but got 4."
    }

    tests! {
        indirectly_inherited is OK
        "class A { foo() { print \"A.foo()\"; } }
         class B < A {}
         class C < B { foo() { print \"C.foo()\"; super.foo(); } }
         C().foo();" => "C.foo()", "A.foo()"
    }

    tests! {
        missing_arguments is ERR
        "class Base { foo(a, b) {} }
         class Derived < Base { bar() { super.foo(1); } }
         Derived().bar();" => "Expected 2 arguments but got 1."
    }

    tests! {
        no_superclass_bind is ERR
        "class Base { foo() { var method = super.foo; } }" =>
        "Can't use 'super' in a class with no superclass."
    }

    tests! {
        no_superclass_call is ERR
        "class Base { foo() { super.foo(); } }" =>
        "Can't use 'super' in a class with no superclass."
    }

    tests! {
        no_superclass_method is ERR
        "class Base {}
         class Derived < Base { foo() { super.doesNotExist(1); } }
         Derived().foo();" => "Undefined property 'doesNotExist'."
    }

    tests! {
        parenthesized_super_is_a_parse_error is ERR
        "class A { foo() {} }
         class B < A { bar() { (super).foo(); } }" => "Expect '.' after 'super'."
    }

    tests! {
        super_at_top_level is ERR
        "super.foo();" => "Can't use 'super' outside of a class."
    }

    tests! {
        super_in_closure_in_inherited_method is OK
        "class Base { toString() { return \"Base\"; } }
         class Derived < Base {
           getClosure() { fun closure() { return super.toString(); } return closure; }
         }
         print Derived().getClosure()();" => "Base"
    }

    tests! {
        super_without_dot is ERR
        "class A { foo() {} }
         class B < A { bar() { super; } }" => "Expect '.' after 'super'."
    }

    tests! {
        super_without_name is ERR
        "class A { foo() {} }
         class B < A { bar() { super.; } }" => "Expect superclass method name."
    }

    tests! {
        this_in_superclass_method is OK
        "class Base { getName() { return this.name; } }
         class Derived < Base { init() { this.name = \"Derived\"; } getNameViaSuper() { return super.getName(); } }
         print Derived().getNameViaSuper();" => "Derived"
    }
}
