#[macro_use]
mod common;

#[cfg(test)]
mod misc {
    tests! {
        empty_file is OK "" =>
    }

    tests! {
        precedence is OK
        "print 2 + 3 * 4;
         print (2 + 3) * 4;
         print 2 - 3 - 4;
         print 2 - (3 - 4);
         print 1 < 2 == 2 < 3;
         print !true == false;
         print true and false or true;
         print 2 + 2 == 4 and 3 * 3 == 9;" =>
        "14", "20", "-5", "3", "true", "true", "true", "true"
    }

    tests! {
        unexpected_character is ERR
        "print \"ok\" |;" => "Unexpected character '|'."
    }
}
