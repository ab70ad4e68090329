use wealthpath_core::error::{ErrorBody, codes};
use wealthpath_core::schema::schema_json;

use crate::util::{EXIT_OK, EXIT_USAGE, print_error};

pub fn run() -> i32 {
    match schema_json() {
        Ok(doc) => {
            println!("{doc}");
            EXIT_OK
        }
        Err(e) => {
            print_error(&ErrorBody::new(
                codes::INVALID_INPUT,
                format!("Failed to render schema: {e}"),
            ));
            EXIT_USAGE
        }
    }
}
