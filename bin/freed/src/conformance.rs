//! ---
//! freed_section: "05-networking-external-interfaces"
//! freed_subsection: "binary"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "`freed test`: offline validator conformance run."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use anyhow::{bail, Result};
use clap::Args;
use freed_validator::{run_suite, standard_cases};

#[derive(Debug, Args)]
pub struct TestCommand {
    /// Only print failing cases and the final tally
    #[arg(long, short)]
    quiet: bool,
}

impl TestCommand {
    pub fn execute(self) -> Result<()> {
        let report = run_suite(&standard_cases());
        if self.quiet {
            for result in report.results.iter().filter(|result| !result.passed()) {
                println!(
                    "[FAIL] {}: expected {}, got {} ({})",
                    result.name, result.expected, result.actual, result.detail
                );
            }
            println!("{} of {} cases passed", report.passed(), report.results.len());
        } else {
            println!("{report}");
        }
        if !report.all_passed() {
            bail!("{} conformance case(s) failed", report.failed());
        }
        Ok(())
    }
}
