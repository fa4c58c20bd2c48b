#[macro_use]
mod common;

#[cfg(test)]
mod logical_operator {
    tests! {
        and_returns_the_deciding_operand is OK
        "print false and 1; print true and 1; print 1 and 2 and 3; print 1 and false;" =>
        "false", "1", "3", "false"
    }

    tests! {
        and_short_circuits_on_falsey_left is OK
        "print false and \"unreached\"; print nil and \"unreached\"; print true and \"ok\";" =>
        "false", "nil", "ok"
    }

    tests! {
        or_returns_the_deciding_operand is OK
        "print 1 or true; print false or 1; print false or false or true; print false or false;" =>
        "1", "1", "true", "false"
    }

    tests! {
        or_short_circuits_on_truthy_left is OK
        "print \"ok\" or \"unreached\"; print 1 or \"unreached\"; print false or \"s\";" =>
        "ok", "1", "s"
    }
}
