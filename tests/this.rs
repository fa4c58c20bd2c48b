#[macro_use]
mod common;

#[cfg(test)]
mod this {
    tests! {
        closure_over_this is OK
        "class Foo {
           getClosure() { fun closure() { return this.toString(); } return closure; }
           toString() { return \"Foo\"; }
         }
         print Foo().getClosure()();" => "Foo"
    }

    tests! {
        nested_class_each_this_binds_to_its_own_instance is OK
        "class Outer {
           method() {
             print this;
             fun f() {
               print this;
               class Inner { method() { print this; } }
               Inner().method();
             }
             f();
           }
         }
         Outer().method();" => "Outer instance", "Outer instance", "Inner instance"
    }

    tests! {
        this_at_top_level is ERR
        "print this;" => "Can't use 'this' outside of a class."
    }

    tests! {
        this_in_method is OK
        "class Foo { bar() { this.baz = \"baz\"; return this.baz; } }
         print Foo().bar();" => "baz"
    }

    tests! {
        this_in_top_level_function is ERR
        "fun notAMethod() { print this; }" => "Can't use 'this' outside of a class."
    }
}
