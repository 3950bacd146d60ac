use anyhow::Result;

use crate::suites::all_cases;

pub fn cmd_list() -> Result<()> {
    let mut current = None;
    for case in all_cases() {
        if current != Some(case.suite) {
            println!("{}:", case.suite);
            current = Some(case.suite);
        }
        println!("  {:<22} {}", case.name, case.title);
    }
    Ok(())
}
