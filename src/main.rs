//! `itrack` - project-scoped issue tracking REST API.

use issuetrack::run;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
