#[macro_use]
mod common;

#[cfg(test)]
mod string {
    tests! {
        literals is OK
        "print \"()\"; print \"a string\"; print \"A~\u{00b6}\u{00de}\u{0950}\u{0b83}\";" =>
        "()", "a string", "A~\u{00b6}\u{00de}\u{0950}\u{0b83}"
    }

    tests! {
        multiline is OK
        "var a = \"1\n2\n3\";
         print a;" => "1\n2\n3"
    }

    tests! {
        plus_concatenates is OK
        "print \"a\" + \"b\" + \"c\";" => "abc"
    }

    tests! {
        unterminated is ERR
        "\"unterminated" => "Unterminated string."
    }
}
