//! The dedup subcommand: consecutive-duplicate cleanup

use analyzer_lib::export::{write_cleaned_csv, write_duplicates_csv};
use analyzer_lib::{dedup_actions, load_actions, DedupPolicy, LoadFilter};
use anyhow::Result;
use std::path::Path;

use crate::output::{print_info, print_success};

pub fn run(
    input: &Path,
    output: &Path,
    report: Option<&Path>,
    conservative: bool,
) -> Result<()> {
    // The cleanup path keeps rows without replica counts; only the change
    // analysis needs them.
    let loaded = load_actions(input, &LoadFilter::default(), false)?;

    let policy = if conservative {
        DedupPolicy::Conservative
    } else {
        DedupPolicy::Standard
    };
    let outcome = dedup_actions(loaded.actions, policy);

    write_cleaned_csv(output, &loaded.headers, &outcome.kept)?;
    print_success(&format!(
        "Cleaned data written to {} ({} rows kept)",
        output.display(),
        outcome.kept.len()
    ));

    if let Some(path) = report {
        write_duplicates_csv(path, &loaded.headers, &outcome.removed)?;
        print_success(&format!(
            "Duplicate audit written to {} ({} rows)",
            path.display(),
            outcome.removed.len()
        ));
    }

    print_info(&format!(
        "{} groups scanned, {} fully removed, {} duplicate rows ({:.1}%)",
        outcome.group_count,
        outcome.groups_fully_removed,
        outcome.removed.len(),
        outcome.duplicate_percentage()
    ));

    Ok(())
}
