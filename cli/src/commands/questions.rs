use wealthpath_core::questions::Question;

use crate::util::print_json;

pub fn run(questions: &[Question]) -> i32 {
    print_json(&questions)
}
